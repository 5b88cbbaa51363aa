use {anyhow::Result, clap::Parser, ironbox::cli::Cli};

#[tokio::main]
async fn main() -> Result<()> {
    ironbox::run(Cli::parse()).await
}
