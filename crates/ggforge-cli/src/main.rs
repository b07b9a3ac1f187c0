//! CLI entry point - the composition root.
//!
//! Configuration is resolved and tracing installed before anything touches
//! the host; handlers get everything else through `CliContext`.

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use ggforge_cli::{Cli, CliError, Commands, bootstrap, handlers, load_config, logging};
use ggforge_core::paths;

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    // Only install writes a log file, next to the checkout.
    let log_dir = match &command {
        Commands::Install { .. } => Some(paths::logs_dir(&handlers::install::install_base(
            &config,
        )?)),
        _ => None,
    };
    let _guard = logging::init_tracing(config.log_level, log_dir.as_deref());

    let ctx = bootstrap(config);
    logging::log_session_header(ctx.detector.host());

    match command {
        Commands::Detect => handlers::detect::execute(&ctx)?,
        Commands::Probe => handlers::probe::execute(&ctx).await?,
        Commands::ListConfigs => handlers::list_configs::execute(&ctx)?,
        Commands::Install { no_auto, .. } => handlers::install::execute(&ctx, no_auto).await?,
        Commands::CreateConfig { output, hardware } => {
            handlers::create_config::execute(&output, hardware, &ctx.translator)?;
        }
    }

    Ok(())
}
