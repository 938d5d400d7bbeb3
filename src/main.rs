use clap::Parser;
use log::*;
use std::process::ExitCode;

use release_assets::{
    Args, Result,
    cli,
    config::Config,
    forge::{config::ForgeOptions, gh::GhCli, manager::ForgeManager},
};

fn initialize_logger(debug: bool) -> Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("release_assets")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    let cli_args = Args::parse();

    initialize_logger(cli_args.debug)?;

    let config = Config::load(cli_args.config.as_deref())?;
    let remote = cli_args.remote_config(&config)?;

    let forge = GhCli::new(remote)?;
    let forge_manager = ForgeManager::new(
        Box::new(forge),
        ForgeOptions {
            dry_run: cli_args.dry_run,
        },
    );

    if cli_args.dry_run {
        warn!("dry_run: mutating gh calls will be skipped");
    }

    let success = cli::execute(&forge_manager, cli_args.command, &config).await?;

    if success {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
