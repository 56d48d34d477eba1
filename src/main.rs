//! html-sri - Subresource integrity injection for built HTML.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use html_sri::cli::{Cli, Commands, hash::hash_files, inject::inject};
use html_sri::config::SriConfig;
use html_sri::fetch::HttpFetcher;
use html_sri::plugin::SriPlugin;
use html_sri::{log, logger};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log!("error"; "{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Inject { args } => {
            let cwd = std::env::current_dir().context("failed to get current directory")?;
            let mut config = SriConfig::load(cli.config.as_deref(), &cwd)?;
            config.apply_inject_args(args);

            let fetcher = HttpFetcher::from_config(&config.fetch)?;
            let mut plugin = SriPlugin::with_fetcher(fetcher);

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("failed to start async runtime")?;
            runtime.block_on(inject(&config, &mut plugin, args.dry))
        }
        Commands::Hash { files } => hash_files(files),
    }
}
