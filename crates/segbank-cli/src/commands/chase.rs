use segbank_core::DriverConfig;

pub fn run(config: &DriverConfig, dry_run: bool, duration: Option<&str>) {
    let limit = duration.map(|d| {
        super::parse_duration(d).unwrap_or_else(|| {
            eprintln!("Invalid duration: {d}");
            std::process::exit(1);
        })
    });

    let bank = super::make_bank(config, dry_run);
    let running = super::interrupt_flag();

    if !bank.start_animation() {
        eprintln!("Chase is already running.");
        std::process::exit(1);
    }
    println!(
        "Chasing {} displays at {} ms each. Press Ctrl+C to stop.",
        segbank_core::CHAIN_ORDER_LEN,
        config.dwell_ms
    );

    super::hold(&running, limit);

    bank.stop_animation();
    println!("Chase stopped after {} frames.", bank.frames());
}
