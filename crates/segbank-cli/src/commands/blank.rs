use segbank_core::{ChainSerializer, DriverConfig};

pub fn run(config: &DriverConfig, dry_run: bool) {
    let mut chain = ChainSerializer::new(super::open_register(config, dry_run));
    match chain.blank() {
        Ok(()) => println!("Display blanked."),
        Err(e) => {
            eprintln!("Error blanking display: {e}");
            std::process::exit(1);
        }
    }
}
