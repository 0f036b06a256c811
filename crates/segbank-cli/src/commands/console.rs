//! Line-oriented operator console.
//!
//! Reads one command per line from stdin and maps it onto [`SegmentBank`]
//! calls. Ctrl+C or end of input stops the chase and blanks the display.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use segbank_core::{
    BOARD_COUNT, Display, DriverConfig, SEGMENTS_PER_BOARD, SegmentBank, chain_to_physical,
};

const HELP: &str = "\
Commands:
  toggle BOARD SEGMENT       flip one segment (chain board 0-14, segment 0-23)
  display BOARD N on|off     light or clear display N (1-3) of a board
  clear                      turn everything off
  grid                       print the current grid
  save NAME                  store the grid as a preset
  load NAME                  restore a preset
  delete NAME                remove a preset
  presets                    list presets
  start | stop               control the chase animation
  status                     animation state and frame count
  help                       this text
  quit                       blank the display and exit";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Toggle { board: usize, segment: usize },
    Display { board: usize, display: u8, on: bool },
    Clear,
    Grid,
    Save(String),
    Load(String),
    Delete(String),
    Presets,
    Start,
    Stop,
    Status,
    Help,
    Quit,
}

fn number<T: std::str::FromStr>(word: Option<&str>, what: &str) -> Result<T, String> {
    let word = word.ok_or_else(|| format!("missing {what}"))?;
    word.parse()
        .map_err(|_| format!("{what} must be a number, got '{word}'"))
}

fn preset_name(rest: &str) -> Result<String, String> {
    let name = rest.trim();
    if name.is_empty() {
        return Err("missing preset name".into());
    }
    Ok(name.to_string())
}

fn parse(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let mut args = rest.split_whitespace();

    let cmd = match verb.to_ascii_lowercase().as_str() {
        "toggle" | "t" => Command::Toggle {
            board: number(args.next(), "board")?,
            segment: number(args.next(), "segment")?,
        },
        "display" | "d" => {
            let board = number(args.next(), "board")?;
            let display = number(args.next(), "display")?;
            let on = match args.next().map(str::to_ascii_lowercase).as_deref() {
                Some("on" | "1") => true,
                Some("off" | "0") => false,
                Some(other) => return Err(format!("expected on|off, got '{other}'")),
                None => return Err("missing on|off".into()),
            };
            Command::Display { board, display, on }
        }
        "clear" => Command::Clear,
        "grid" | "show" => Command::Grid,
        "save" => Command::Save(preset_name(rest)?),
        "load" => Command::Load(preset_name(rest)?),
        "delete" | "rm" => Command::Delete(preset_name(rest)?),
        "presets" | "ls" => Command::Presets,
        "start" => Command::Start,
        "stop" => Command::Stop,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command '{other}' (try 'help')")),
    };
    Ok(Some(cmd))
}

/// Render a grid snapshot, one row per chain position, displays in
/// harness order (1, 2, 3).
pub fn render_grid(matrix: &[Vec<u8>]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>5} {:>5}  {:<8} {:<8} {:<8}\n",
        "chain", "board", "disp 1", "disp 2", "disp 3"
    ));
    for (chain, row) in matrix.iter().enumerate().take(BOARD_COUNT) {
        let physical = chain_to_physical(chain).unwrap_or(0);
        out.push_str(&format!("{chain:>5} {physical:>5} "));
        for display in Display::ALL {
            out.push(' ');
            for cell in display.cells() {
                let lit = row.get(cell).is_some_and(|&v| v != 0);
                out.push(if lit { '#' } else { '.' });
            }
        }
        out.push('\n');
    }
    let lit = matrix.iter().flatten().filter(|&&v| v != 0).count();
    out.push_str(&format!(
        "{lit}/{} segments lit\n",
        BOARD_COUNT * SEGMENTS_PER_BOARD
    ));
    out
}

fn report(ok: bool, what: &str) {
    if ok {
        println!("ok");
    } else {
        println!("{what} failed (see log)");
    }
}

/// Execute one command. Returns `false` when the console should exit.
fn execute(bank: &SegmentBank, cmd: Command) -> bool {
    match cmd {
        Command::Toggle { board, segment } => {
            report(bank.toggle_segment(board, segment), "toggle")
        }
        Command::Display { board, display, on } => {
            report(bank.set_display(board, display, on), "display")
        }
        Command::Clear => report(bank.clear_all(), "clear"),
        Command::Grid => print!("{}", render_grid(&bank.grid_state())),
        Command::Save(name) => report(bank.save_preset(&name), "save"),
        Command::Load(name) => match bank.load_preset(&name) {
            Ok(matrix) => print!("{}", render_grid(&matrix)),
            Err(e) => println!("load failed: {e}"),
        },
        Command::Delete(name) => report(bank.delete_preset(&name), "delete"),
        Command::Presets => {
            let names = bank.list_presets();
            if names.is_empty() {
                println!("(no presets in {})", bank.presets_dir().display());
            }
            for name in names {
                println!("  {name}");
            }
        }
        Command::Start => {
            if bank.start_animation() {
                println!("chase started");
            } else {
                println!("chase already running");
            }
        }
        Command::Stop => {
            if bank.stop_animation() {
                println!("chase stopped");
            } else {
                println!("chase not running");
            }
        }
        Command::Status => println!(
            "animation: {}  frames: {}",
            bank.animation_state(),
            bank.frames()
        ),
        Command::Help => println!("{HELP}"),
        Command::Quit => return false,
    }
    true
}

pub fn run(config: &DriverConfig, dry_run: bool) {
    let bank = Arc::new(super::make_bank(config, dry_run));

    let on_interrupt = Arc::clone(&bank);
    if let Err(e) = ctrlc::set_handler(move || {
        on_interrupt.shutdown();
        std::process::exit(0);
    }) {
        eprintln!("Error installing Ctrl+C handler: {e}");
        std::process::exit(1);
    }

    println!("segbank console. Type 'help' for commands.");
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match input.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        }
        match parse(&line) {
            Ok(Some(cmd)) => {
                if !execute(&bank, cmd) {
                    break;
                }
            }
            Ok(None) => {}
            Err(msg) => println!("{msg}"),
        }
    }

    bank.shutdown();
    println!("Display blanked.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toggle() {
        assert_eq!(
            parse("toggle 3 17").unwrap(),
            Some(Command::Toggle {
                board: 3,
                segment: 17
            })
        );
        assert_eq!(
            parse("  T 0 0 ").unwrap(),
            Some(Command::Toggle {
                board: 0,
                segment: 0
            })
        );
    }

    #[test]
    fn test_parse_display() {
        assert_eq!(
            parse("display 14 3 on").unwrap(),
            Some(Command::Display {
                board: 14,
                display: 3,
                on: true
            })
        );
        assert_eq!(
            parse("d 2 1 OFF").unwrap(),
            Some(Command::Display {
                board: 2,
                display: 1,
                on: false
            })
        );
        assert!(parse("display 2 1 maybe").is_err());
        assert!(parse("display 2 1").is_err());
    }

    #[test]
    fn test_parse_preset_names_keep_spaces() {
        assert_eq!(
            parse("save my scene").unwrap(),
            Some(Command::Save("my scene".into()))
        );
        assert_eq!(
            parse("load  sunrise ").unwrap(),
            Some(Command::Load("sunrise".into()))
        );
        assert!(parse("delete").is_err());
    }

    #[test]
    fn test_parse_blank_and_comments() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("   ").unwrap(), None);
        assert_eq!(parse("# note").unwrap(), None);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("toggle x 1").is_err());
        assert!(parse("toggle 1").is_err());
        assert!(parse("explode").is_err());
    }

    #[test]
    fn test_render_grid_marks_lit_cells() {
        let mut matrix = vec![vec![0u8; SEGMENTS_PER_BOARD]; BOARD_COUNT];
        // Display 2 occupies cells 16..24.
        for cell in 16..24 {
            matrix[1][cell] = 1;
        }
        let text = render_grid(&matrix);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), BOARD_COUNT + 2);
        // Chain 1 is physical board 6.
        assert!(lines[2].starts_with("    1     6"));
        assert!(lines[2].ends_with("........ ######## ........"));
        assert!(lines.last().unwrap().starts_with("8/360"));
    }

    #[test]
    fn test_execute_against_simulated_bank() {
        let tmp = tempfile::tempdir().unwrap();
        let config = DriverConfig {
            presets_dir: tmp.path().join("presets"),
            edge_delay_us: 0,
            dwell_ms: 1,
            ..Default::default()
        };
        let bank = super::super::make_bank(&config, true);

        assert!(execute(&bank, parse("toggle 0 5").unwrap().unwrap()));
        assert_eq!(bank.grid_state()[0][5], 1);
        assert!(execute(&bank, parse("save one").unwrap().unwrap()));
        assert_eq!(bank.list_presets(), vec!["one"]);
        assert!(execute(&bank, parse("clear").unwrap().unwrap()));
        assert!(execute(&bank, parse("load one").unwrap().unwrap()));
        assert_eq!(bank.grid_state()[0][5], 1);
        assert!(!execute(&bank, Command::Quit));
    }
}
