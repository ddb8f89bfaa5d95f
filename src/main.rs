use clap::Parser;
use tracing_subscriber::EnvFilter;

use amigo_opensearch::cli::{Cli, Commands, run, serve};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        None | Some(Commands::Serve { .. }) => serve(&cli).await,
        Some(_) => {
            let output = run(cli).await?;
            if !output.is_empty() {
                println!("{output}");
            }
            Ok(())
        }
    }
}
