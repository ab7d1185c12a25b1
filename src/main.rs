use clap::{Parser, Subcommand};
use std::io::{Read, Write};
use std::path::PathBuf;
use waltz::config::{self, ConfigError, ServerConfig, StorageKind};
use waltz::imaging::{self, CropRect, Dimensions};
use waltz::server;

#[derive(Parser)]
#[command(name = "waltz")]
#[command(about = "On-demand image resizing proxy")]
#[command(long_about = "\
On-demand image resizing proxy

Fetches originals from an object store, crops and resizes them, and streams
PNG back to the client. The same pipeline runs as a one-shot filter on
stdin/stdout.

Size grammar:

  --resize=16x16        exact size
  --resize=16           16 wide, height from the aspect ratio
  --resize=0x16         16 tall, width from the aspect ratio
  --crop=0x0,32x32      top-left and bottom-right corners, applied first

HTTP:

  GET /image/<key>?resize=WxH   resized PNG
  GET /image/<key>              redirect to the original

Run 'waltz gen-config' to generate a documented waltz.toml.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize an image from stdin and write PNG to stdout
    Resize(ResizeArgs),
    /// Serve resized images from an object store over HTTP
    Serve(ServeArgs),
    /// Print a stock waltz.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct ResizeArgs {
    /// Crop rectangle applied before resizing, e.g. 0x0,32x32
    #[arg(long)]
    crop: Option<CropRect>,

    /// Output size as W or WxH, e.g. 16x16 (0 keeps the aspect ratio)
    #[arg(long)]
    resize: Dimensions,
}

#[derive(clap::Args)]
struct ServeArgs {
    /// Config file (defaults apply when omitted)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Listen host
    #[arg(long, env = "WALTZ_HOST")]
    host: Option<String>,

    /// Listen port
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// S3 bucket holding the originals
    #[arg(long, env = "AWS_BUCKET")]
    bucket: Option<String>,

    /// S3 region
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    /// Serve originals from this directory instead of S3
    #[arg(long)]
    local_root: Option<PathBuf>,
}

impl ServeArgs {
    /// Stock defaults ← config file ← environment / flags, then validate.
    fn resolve(&self) -> Result<ServerConfig, ConfigError> {
        let mut config = config::load_config(self.config.as_deref())?;

        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(bucket) = &self.bucket {
            config.storage.bucket = bucket.clone();
        }
        if let Some(region) = &self.region {
            config.storage.region = region.clone();
        }
        if let Some(root) = &self.local_root {
            config.storage.backend = StorageKind::Local;
            config.storage.root = root.to_string_lossy().to_string();
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Resize(args) => {
            run_resize(&args, std::io::stdin().lock(), std::io::stdout().lock())?;
        }
        Command::Serve(args) => {
            let config = args.resolve()?;
            init_tracing(&config.log_level);
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(server::serve(config))?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn run_resize(args: &ResizeArgs, input: impl Read, output: impl Write) -> Result<(), String> {
    imaging::transform(input, output, args.crop, args.resize)
        .map_err(|e| format!("An error occurred performing the resize: {e}"))
}

/// Log to stderr; `RUST_LOG` wins over the configured level.
fn init_tracing(default_level: &str) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
