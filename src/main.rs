//! Acceptance harness CLI for the citizen payments web app

use arc_e2e::{commands, common};
use clap::Parser;
use commands::Commands;

#[derive(Parser)]
#[command(name = "arc-e2e", about = "Acceptance harness for the citizen payments web app")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    common::logging::init();

    let cli = Cli::parse();

    match commands::dispatch(cli.command).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    }
}
