use anyhow::Result;
use clap::Parser;

use jarcompat::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run().await
}
