use anyhow::Context;
use clap::Parser;
use toll_etl::cli::{run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(cli).await.context("toll-etl failed")
}
