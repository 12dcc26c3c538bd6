use anyhow::Result;
use clap::Parser;
use rust_gitdash::{
    cli::Cli,
    config::Config,
    git::Git2Backend,
    logging,
    ui::{self, App, EventHandler},
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.init_config {
        let path = Config::init_default(cli.config.as_deref())?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref())?;
    let log_path = match &cli.log_file {
        Some(path) => path.clone(),
        None => logging::default_log_path()?,
    };
    logging::init(&log_path)?;
    info!(version = env!("CARGO_PKG_VERSION"), "starting");

    ui::terminal::install_panic_hook();

    if let Err(e) = run(cli, config).await {
        error!(error = %e, "exiting with error");
        ui::terminal::restore()?;
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    let backend = Git2Backend::new()
        .with_history_limit(config.settings.history_limit)
        .with_assistant(
            config.assisted_commit.command.clone(),
            config.assisted_commit.args.clone(),
        );

    let mut terminal = ui::terminal::init()?;

    let mut app = App::new(Arc::new(backend), &config);
    app.init(cli.repo);

    let mut event_handler = EventHandler::new(Duration::from_millis(config.settings.tick_rate_ms));
    event_handler.start();

    while app.is_running() {
        app.update();

        terminal.draw(|frame| {
            app.render(frame);
        })?;

        if let Some(event) = event_handler.next().await {
            app.handle_event(event)?;
        }
    }

    ui::terminal::restore()?;
    info!("stopped");

    Ok(())
}
