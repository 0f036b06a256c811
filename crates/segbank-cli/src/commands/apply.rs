use segbank_core::DriverConfig;

pub fn run(config: &DriverConfig, dry_run: bool, name: &str) {
    let bank = super::make_bank(config, dry_run);
    let running = super::interrupt_flag();

    match bank.load_preset(name) {
        Ok(matrix) => {
            let lit: usize = matrix.iter().flatten().filter(|&&v| v != 0).count();
            println!("Showing preset '{name}' ({lit} segments lit). Press Ctrl+C to blank and exit.");
        }
        Err(e) => {
            eprintln!("Error loading preset '{name}': {e}");
            std::process::exit(1);
        }
    }

    super::hold(&running, None);
    // Dropping the bank blanks the display.
}
