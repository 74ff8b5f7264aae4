use clap::Parser;
use feedfilter::{run, Settings};
use std::{path::PathBuf, process::ExitCode};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Download a product feed, keep whitelisted codes, write CSV + JSON.
#[derive(Parser, Debug)]
#[command(name = "feedfilter", version)]
struct Cli {
    /// YAML settings file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Code list, one code per line
    #[arg(long, default_value = "data/skus.txt")]
    skus: PathBuf,

    /// Feed location
    #[arg(long, env = "FEED_URL")]
    feed_url: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) run the pipeline ─────────────────────────────────────────
    let settings = Settings {
        config_path: cli.config,
        skus_path: cli.skus,
        feed_url: cli.feed_url,
    };
    match run(&settings) {
        Ok(summary) => {
            info!(
                format = %summary.format,
                read = summary.rows_read,
                "done: {} ({} items), {}",
                summary.out_csv.display(),
                summary.rows_written,
                summary.out_json.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
