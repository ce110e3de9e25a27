use anyhow::Result;
use callem::app::AppStateBuilder;
use callem::config::{Cli, Config};
use callem::version::get_version_info;
use clap::Parser;
use std::fs::File;
use tokio::select;
use tracing::{info, level_filters::LevelFilter, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // logging is configured from the config file, so a load failure can
    // only be reported after the subscriber is up
    let (config, load_error) = match cli.conf {
        Some(conf) => match Config::load(&conf) {
            Ok(config) => (config, None),
            Err(e) => (Config::default(), Some(e.to_string())),
        },
        None => (Config::default(), None),
    };

    let mut log_fmt = tracing_subscriber::fmt();
    if let Some(ref level) = config.log_level {
        if let Ok(lv) = level.as_str().parse::<LevelFilter>() {
            log_fmt = log_fmt.with_max_level(lv);
        }
    }

    if let Some(ref log_file) = config.log_file {
        let file = File::create(log_file).expect("Failed to create log file");
        let (non_blocking, _guard) = tracing_appender::non_blocking(file);
        log_fmt.with_writer(non_blocking).try_init().ok();
    } else {
        log_fmt.try_init().ok();
    }

    if let Some(error) = load_error {
        warn!("failed to load config, using defaults: {}", error);
    }

    let app = AppStateBuilder::new().config(config).build()?;

    info!(
        "starting {} against {}",
        get_version_info(),
        app.config.server_url
    );
    select! {
        _ = app.clone().run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Received CTRL+C, shutting down");
            app.token.cancel();
        }
    }
    Ok(())
}
