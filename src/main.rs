use clap::Parser;
use filetidy::cli::{Cli, run_cli};
use filetidy::output::OutputFormatter;
use log::LevelFilter;

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();

    if let Err(e) = run_cli(&cli) {
        OutputFormatter::error(&e);
        std::process::exit(1);
    }
}
