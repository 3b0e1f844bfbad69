//! Translation engine lifecycle built on a Statum state machine.
//!
//! The engine owns the translator and drives the per-tick loop
//! `snapshot → translate → fire` as a tokio task. Its lifecycle walks
//! Initializing → Configured → Active → Deactivating → Deactivated;
//! deactivation fires the translator's cleanup actions so no host key
//! stays stuck after shutdown.

use std::time::Duration;

use statum::{machine, state};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::controller::buttons::Snapshot;
use crate::translation::translator::Translator;

/// Errors raised by the engine lifecycle. The tick itself is infallible.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine reached the active state without a translator.
    #[error("engine has no translator configured")]
    NotConfigured,

    /// A lifecycle channel was closed before its signal could be sent.
    #[error("engine channel error: {0}")]
    ChannelError(String),

    /// The engine task panicked or could not be joined.
    #[error("engine task failed: {0}")]
    TaskError(String),
}

/// Lifecycle states of a translation engine.
#[state]
#[derive(Debug, Clone)]
pub enum EngineState {
    /// Created, no translator attached yet.
    Initializing,
    /// Translator attached, not yet running.
    Configured,
    /// Running the tick loop.
    Active,
    /// Shutting down, about to run cleanup.
    Deactivating,
    /// Fully stopped.
    Deactivated,
}

/// Per-tick translation driver.
#[machine]
pub struct TranslationEngine<S: EngineState> {
    /// Latest snapshot published by the sampler.
    snapshot_rx: watch::Receiver<Snapshot>,

    /// Pause between ticks.
    tick_interval: Duration,

    /// Engine instance name, used in logs.
    name: String,

    /// The translator, attached by `configure`.
    translator: Option<Translator>,
}

impl<S: EngineState> TranslationEngine<S> {
    pub fn engine_name(&self) -> &str {
        &self.name
    }
}

impl TranslationEngine<Initializing> {
    /// Creates a new engine in the initializing state.
    pub fn create(
        snapshot_rx: watch::Receiver<Snapshot>,
        tick_interval: Duration,
        name: String,
    ) -> Self {
        info!("Initializing translation engine: {}", name);
        Self::new(snapshot_rx, tick_interval, name, None)
    }

    /// Attaches the translator and moves to the configured state.
    pub fn configure(mut self, translator: Translator) -> TranslationEngine<Configured> {
        info!(
            "Configuring translation engine {} with {} mappings",
            self.name,
            translator.mappings().len()
        );
        self.translator = Some(translator);
        self.transition()
    }
}

impl TranslationEngine<Configured> {
    pub fn activate(self) -> TranslationEngine<Active> {
        info!("Activating translation engine: {}", self.name);
        self.transition()
    }
}

impl TranslationEngine<Active> {
    /// Translates and fires the latest snapshot once.
    pub fn process_tick(&mut self) -> Result<(), EngineError> {
        let snapshot = self.snapshot_rx.borrow().clone();
        let translator = self.translator.as_mut().ok_or(EngineError::NotConfigured)?;

        let batch = translator.translate(snapshot);
        if !batch.is_empty() {
            debug!("Firing batch of {} results", batch.len());
        }
        translator.fire(&batch);
        Ok(())
    }

    /// Main loop for the active engine; runs until the shutdown signal.
    pub async fn run_until_shutdown(
        mut self,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) -> Result<TranslationEngine<Deactivating>, EngineError> {
        info!("Starting tick loop for engine: {}", self.name);

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    info!("Shutdown signal received for engine: {}", self.name);
                    break;
                }

                _ = sleep(self.tick_interval) => {
                    if let Err(e) = self.process_tick() {
                        error!("Error processing tick: {}", e);
                        return Err(e);
                    }
                }
            }
        }

        info!("Transitioning to Deactivating state: {}", self.name);
        Ok(self.transition())
    }
}

impl TranslationEngine<Deactivating> {
    /// Fires the cleanup key-ups and moves to the deactivated state.
    pub fn shutdown(mut self) -> TranslationEngine<Deactivated> {
        info!("Shutting down translation engine: {}", self.name);

        if let Some(translator) = &mut self.translator {
            let cleanup = translator.cleanup();
            if !cleanup.is_empty() {
                info!(
                    "Releasing {} held mappings during shutdown",
                    cleanup.len()
                );
            }
            translator.fire_results(&cleanup);
        }

        info!("Engine shut down successfully: {}", self.name);
        self.transition()
    }
}

impl TranslationEngine<Deactivated> {
    // No operations remain once the engine is fully stopped.
}

/// Handle for a running translation engine task.
#[derive(Debug)]
pub struct EngineHandle {
    /// Engine instance name.
    pub name: String,

    /// Join handle for the tokio task.
    task_handle: Option<JoinHandle<Result<(), EngineError>>>,

    /// Sender for the shutdown signal.
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl EngineHandle {
    /// Builds, activates and spawns an engine around the given
    /// translator. The returned handle owns the shutdown channel.
    pub fn start(
        name: String,
        translator: Translator,
        snapshot_rx: watch::Receiver<Snapshot>,
        tick_interval: Duration,
    ) -> Self {
        let engine = TranslationEngine::create(snapshot_rx, tick_interval, name.clone())
            .configure(translator)
            .activate();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let engine_name = name.clone();
        let task_handle = tokio::spawn(async move {
            info!("Spawning running engine: {}", engine_name);
            match engine.run_until_shutdown(shutdown_rx).await {
                Ok(deactivating) => {
                    info!("Engine entering deactivating state: {}", engine_name);
                    let _ = deactivating.shutdown();
                    Ok(())
                }
                Err(e) => {
                    error!("Error running engine: {} - {}", engine_name, e);
                    Err(e)
                }
            }
        });

        info!("Translation engine activated: {}", name);
        Self {
            name,
            task_handle: Some(task_handle),
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Signals shutdown and waits for the engine task to finish its
    /// cleanup pass.
    ///
    /// A closed shutdown channel means the task stopped on its own; the
    /// task is still joined so its own result surfaces first, then the
    /// channel failure is reported.
    pub async fn shutdown(&mut self) -> Result<(), EngineError> {
        debug!("Sending shutdown signal to engine: {}", self.name);

        let mut channel_error = None;
        if let Some(tx) = self.shutdown_tx.take() {
            if tx.send(()).is_err() {
                warn!("Engine task no longer listening for shutdown: {}", self.name);
                channel_error = Some(EngineError::ChannelError(format!(
                    "Shutdown channel closed for engine: {}",
                    self.name
                )));
            }
        }

        if let Some(handle) = self.task_handle.take() {
            match handle.await {
                Ok(result) => {
                    debug!("Engine task completed: {}", self.name);
                    result?;
                }
                Err(e) => {
                    error!("Engine task panicked: {} - {}", self.name, e);
                    return Err(EngineError::TaskError(format!(
                        "Engine task panicked: {}",
                        e
                    )));
                }
            }
        } else {
            debug!("Engine already shut down: {}", self.name);
        }

        match channel_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
