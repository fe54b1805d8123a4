//! sessiongate CLI entry point

use clap::Parser;
use sessiongate_cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    cli.init_tracing();

    match cli.execute().await {
        Ok(output) => println!("{output}"),
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}
