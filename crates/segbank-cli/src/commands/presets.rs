use std::io;

use segbank_core::DriverConfig;

use super::console::render_grid;

pub fn list(config: &DriverConfig) {
    let store = super::open_store(config);
    let names = store.list();
    if names.is_empty() {
        println!("No presets in {}", store.dir().display());
        return;
    }
    println!("{} preset(s) in {}:", names.len(), store.dir().display());
    for name in names {
        println!("  {name}");
    }
}

pub fn show(config: &DriverConfig, name: &str, json: bool) {
    let store = super::open_store(config);
    let matrix = match store.load(name) {
        Ok(m) => m,
        Err(e) => fail(name, &e),
    };
    if json {
        match serde_json::to_string_pretty(&matrix) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Error encoding preset '{name}': {e}");
                std::process::exit(1);
            }
        }
    } else {
        print!("{}", render_grid(&matrix));
    }
}

pub fn delete(config: &DriverConfig, name: &str) {
    let store = super::open_store(config);
    match store.delete(name) {
        Ok(()) => println!("Deleted preset '{name}'."),
        Err(e) => fail(name, &e),
    }
}

fn fail(name: &str, e: &io::Error) -> ! {
    match e.kind() {
        io::ErrorKind::NotFound => eprintln!("No preset named '{name}'."),
        io::ErrorKind::InvalidData => eprintln!("Preset '{name}' is corrupt: {e}"),
        io::ErrorKind::InvalidInput => eprintln!("Invalid preset name '{name}': {e}"),
        _ => eprintln!("Error with preset '{name}': {e}"),
    }
    std::process::exit(1);
}
