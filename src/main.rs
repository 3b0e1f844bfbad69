use std::path::Path;
use std::time::Duration;

use color_eyre::Result;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use padkey::config::Config;
use padkey::controller::sampler::SamplerHandle;
use padkey::profile;
use padkey::translation::engine::EngineHandle;
use padkey::translation::overtaking::OvertakingFilter;
use padkey::translation::translator::Translator;
use padkey::Snapshot;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config = Config::load_or_default(Path::new("padkey.toml"));

    // Sampler publishes the latest held-button snapshot on a watch channel
    let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::new());
    let _sampler = SamplerHandle::spawn(Some(config.sampler.clone()), snapshot_tx)?;

    // Translator with the demo mapping table and overtaking filter
    let mappings = profile::driver_button_mappings(&config);
    let translator = Translator::with_filter(mappings, OvertakingFilter::new())?;

    let tick_interval = Duration::from_millis(config.sampler.collection_interval_ms);
    let mut engine = EngineHandle::start(
        "driver".to_string(),
        translator,
        snapshot_rx,
        tick_interval,
    );

    info!("padkey running, press ctrl-c to exit");
    tokio::signal::ctrl_c().await?;

    // Shutdown fires the cleanup key-ups so nothing stays stuck
    info!("Performing cleanup actions...");
    engine.shutdown().await?;

    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;

    // Log level is driven by RUST_LOG, defaulting to info so the demo
    // callbacks are visible out of the box.
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_thread_ids(true)
        .pretty()
        .init();
    Ok(())
}
