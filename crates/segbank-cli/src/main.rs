//! CLI for segbank: drive a 15-board shift-register segment display bank.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "segbank")]
#[command(about = "segbank: drive a daisy-chained shift-register segment display bank")]
#[command(version = segbank_core::VERSION)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand.
#[derive(clap::Args)]
pub struct GlobalArgs {
    /// JSON config file (pins, timing, presets directory)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Preset directory (overrides the config file)
    #[arg(long, global = true)]
    presets_dir: Option<String>,

    /// Clock/latch edge hold time in microseconds
    #[arg(long, global = true)]
    edge_delay_us: Option<u64>,

    /// Chase dwell per display in milliseconds
    #[arg(long, global = true)]
    dwell_ms: Option<u64>,

    /// Use simulated lines instead of GPIO (always on without the `cdev` feature)
    #[arg(long, global = true)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive console: toggle segments, manage presets, run the chase
    Console,

    /// Run the chase animation until Ctrl+C
    Chase {
        /// Stop after this long (e.g. "30s", "5m"); default: until Ctrl+C
        #[arg(long)]
        duration: Option<String>,
    },

    /// Shift zeros through the whole chain and latch
    Blank,

    /// Show a preset on the display and hold it until Ctrl+C
    Apply {
        /// Preset name
        name: String,
    },

    /// Manage presets without touching the display
    Presets {
        #[command(subcommand)]
        action: PresetAction,
    },
}

#[derive(Subcommand)]
enum PresetAction {
    /// List preset names
    List,

    /// Print a preset as a grid
    Show {
        /// Preset name
        name: String,

        /// Print the raw JSON matrix instead
        #[arg(long)]
        json: bool,
    },

    /// Delete a preset
    Delete {
        /// Preset name
        name: String,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = commands::resolve_config(&cli.global);

    match cli.command {
        Commands::Console => commands::console::run(&config, cli.global.dry_run),
        Commands::Chase { duration } => {
            commands::chase::run(&config, cli.global.dry_run, duration.as_deref())
        }
        Commands::Blank => commands::blank::run(&config, cli.global.dry_run),
        Commands::Apply { name } => commands::apply::run(&config, cli.global.dry_run, &name),
        Commands::Presets { action } => match action {
            PresetAction::List => commands::presets::list(&config),
            PresetAction::Show { name, json } => commands::presets::show(&config, &name, json),
            PresetAction::Delete { name } => commands::presets::delete(&config, &name),
        },
    }
}
