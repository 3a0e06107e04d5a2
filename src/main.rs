use clap::Parser;
use slotpick::cli::commands::Cli;
use slotpick::cli::handlers;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let filter = match std::env::var("SLOTS_LOG") {
        Ok(directives) => EnvFilter::new(directives),
        Err(_) if verbose => EnvFilter::new("slotpick=debug"),
        Err(_) => EnvFilter::new("slotpick=warn"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
