use std::path::PathBuf;

use clap::Parser;
use media_relay::storage::config::CONFIG_ENV;

#[derive(Debug, Parser)]
#[command(name = "media-relay", version, about = "Resolve media URLs and proxy their bytes")]
struct Args {
    /// JSON settings file.
    #[arg(long, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Overrides the configured port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = media_relay::storage::config::load_settings(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.port = port;
    }

    media_relay::init_tracing(config.log_format);
    media_relay::run(config).await
}
