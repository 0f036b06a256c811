//! Named grid snapshots on disk.
//!
//! # Storage Format
//!
//! One file per preset in the store directory:
//! - `<name>.json`: the grid as a JSON array of arrays of 0/1 integers,
//!   `[board][segment]`, with no envelope or version field.
//!
//! Outcomes are reported through `std::io::ErrorKind`:
//! - `NotFound`: no preset with that name,
//! - `InvalidData`: the file exists but is not a nested 0/1 array,
//! - `InvalidInput`: the name is not allowed as a file stem,
//! - anything else: the filesystem failed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{error, info, warn};

use crate::grid::Matrix;

/// File extension for preset records.
const EXTENSION: &str = "json";

/// Longest accepted preset name.
pub const MAX_NAME_LEN: usize = 64;

/// Check a preset name before it becomes part of a path.
///
/// Accepted: 1..=64 ASCII alphanumerics, space, `-`, `_` or `.`, not starting
/// with `.`. This keeps names inside the store directory and off hidden files.
pub fn validate_name(name: &str) -> io::Result<()> {
    let ok = !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.'));
    if ok {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid preset name {name:?}"),
        ))
    }
}

/// Parse preset content, rejecting anything that is not a nested 0/1 array.
pub fn decode(raw: &str) -> io::Result<Matrix> {
    let matrix: Matrix = serde_json::from_str(raw).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("failed to parse preset JSON: {e}"),
        )
    })?;
    if matrix.iter().flatten().any(|&v| v > 1) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "preset cells must be 0 or 1",
        ));
    }
    Ok(matrix)
}

/// Directory-backed preset store.
#[derive(Debug, Clone)]
pub struct PresetStore {
    dir: PathBuf,
}

impl PresetStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        if !dir.exists() {
            info!("creating presets directory at {}", dir.display());
        }
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Store directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> io::Result<PathBuf> {
        validate_name(name)?;
        Ok(self.dir.join(format!("{name}.{EXTENSION}")))
    }

    /// Write `matrix` under `name`, replacing any existing preset.
    pub fn save(&self, name: &str, matrix: &[Vec<u8>]) -> io::Result<()> {
        let path = self.path_for(name).inspect_err(|e| warn!("save rejected: {e}"))?;
        let json = serde_json::to_string(matrix).map_err(io::Error::other)?;
        let result = fs::write(&path, json).and_then(|()| share(&path));
        match &result {
            Ok(()) => info!("saved preset {name:?} to {}", path.display()),
            Err(e) => error!("error saving preset {name:?} to {}: {e}", path.display()),
        }
        result
    }

    /// Read the preset stored under `name`.
    pub fn load(&self, name: &str) -> io::Result<Matrix> {
        let path = self.path_for(name).inspect_err(|e| warn!("load rejected: {e}"))?;
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("preset not found: {}", path.display());
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("preset {name:?} not found"),
                ));
            }
            Err(e) => {
                error!("error loading preset {}: {e}", path.display());
                return Err(e);
            }
        };
        decode(&raw).inspect_err(|e| error!("corrupt preset {}: {e}", path.display()))
    }

    /// Whether a preset named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.path_for(name).is_ok_and(|p| p.is_file())
    }

    /// All preset names, sorted. Files whose stem is not a valid name are
    /// skipped, so every listed name can be loaded or deleted.
    pub fn list(&self) -> Vec<String> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                error!("error listing presets in {}: {e}", self.dir.display());
                return Vec::new();
            }
        };
        let mut names: Vec<String> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|x| x == EXTENSION))
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
            .filter(|name| match validate_name(name) {
                Ok(()) => true,
                Err(_) => {
                    warn!("skipping preset file with unusable name {name:?}");
                    false
                }
            })
            .collect();
        names.sort();
        names
    }

    /// Remove the preset named `name`.
    pub fn delete(&self, name: &str) -> io::Result<()> {
        let path = self.path_for(name).inspect_err(|e| warn!("delete rejected: {e}"))?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("deleted preset {name:?}");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("preset not found: {}", path.display());
                Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("preset {name:?} not found"),
                ))
            }
            Err(e) => {
                error!("error deleting preset {}: {e}", path.display());
                Err(e)
            }
        }
    }
}

/// Make a record world read/write so other local users can edit presets.
#[cfg(unix)]
fn share(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o666))
}

#[cfg(not(unix))]
fn share(_path: &Path) -> io::Result<()> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
