//! gilrs-backed snapshot sampler.
//!
//! Polls the platform gamepad API and publishes, at a configurable
//! interval, the set of virtual buttons currently held: physical buttons
//! in press order, followed by the decomposed thumbstick directions and
//! the triggers past their threshold. Snapshots are level-based (exactly
//! what is held right now, no edges, no debouncing) and duplicate-free
//! by construction, which is the contract the translator relies on.

use chrono::Local;
use gilrs::{Axis, Button, Event, EventType, Gamepad, GamepadId, Gilrs};
use serde::{Deserialize, Serialize};
use statum::{machine, state};
use tokio::sync::watch;
use tokio::time::{interval, Duration};
use tracing::{debug, error, info, warn};

use crate::controller::buttons::{Snapshot, VirtualButton};
use crate::controller::polar::{
    button_for_direction, compute_polar_pair, direction_for_polar_theta, Stick,
};

/// Sampler settings, shared with the configuration file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SamplerSettings {
    /// Interval between published snapshots in milliseconds.
    pub collection_interval_ms: u64,

    /// Minimum polar radius before a stick reports a direction (0.0-1.0).
    ///
    /// Prevents analog stick drift from registering as held directions.
    pub joystick_deadzone: f32,

    /// Minimum trigger value before a trigger reports as held (0.0-1.0).
    pub trigger_threshold: f32,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            collection_interval_ms: 8,
            joystick_deadzone: 0.25,
            trigger_threshold: 0.25,
        }
    }
}

/// Sampler errors. Anything past initialization is logged and ends the
/// sampling loop instead of propagating.
#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    #[error("Failed to initialize sampler: {0}")]
    InitializationError(String),

    #[error("Snapshot channel closed: {0}")]
    ChannelClosed(String),
}

#[state]
#[derive(Debug, Clone)]
pub enum SamplingState {
    Initializing,
    Sampling,
}

#[machine]
pub struct SnapshotSampler<S: SamplingState> {
    // Gilrs context
    gilrs: Gilrs,

    // Active gamepad
    active_gamepad: Option<GamepadId>,

    // Sampler settings
    settings: SamplerSettings,

    // Channel publishing the latest snapshot
    snapshot_tx: watch::Sender<Snapshot>,

    // Physical buttons currently held, in press order
    held_buttons: Vec<VirtualButton>,

    // Latest analog state
    left_stick: (f32, f32),
    right_stick: (f32, f32),
    left_trigger: f32,
    right_trigger: f32,
}

impl<S: SamplingState> SnapshotSampler<S> {
    pub fn settings(&self) -> &SamplerSettings {
        &self.settings
    }
}

impl SnapshotSampler<Initializing> {
    pub fn create(
        settings: Option<SamplerSettings>,
        snapshot_tx: watch::Sender<Snapshot>,
    ) -> Result<Self, SamplerError> {
        let settings = settings.unwrap_or_default();
        debug!("Creating snapshot sampler with settings: {:?}", settings);

        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(SamplerError::InitializationError(e.to_string()));
            }
        };

        Ok(Self::new(
            gilrs,
            None,
            settings,
            snapshot_tx,
            Vec::new(),
            (0.0, 0.0),
            (0.0, 0.0),
            0.0,
            0.0,
        ))
    }

    /// Selects the active gamepad and transitions to sampling.
    pub fn initialize(mut self) -> Result<SnapshotSampler<Sampling>, SamplerError> {
        let gamepads: Vec<(GamepadId, Gamepad<'_>)> = self.gilrs.gamepads().collect();

        if gamepads.is_empty() {
            warn!("No gamepad connected, continuing in idle mode");
        } else {
            info!("Found {} gamepads:", gamepads.len());
            for (idx, (id, gamepad)) in gamepads.iter().enumerate() {
                info!("  [{}] ID: {}, Name: {}", idx, id, gamepad.name());
            }
            let (id, gamepad) = &gamepads[0];
            self.active_gamepad = Some(*id);
            info!("Selected gamepad: {} ({})", gamepad.name(), id);
        }

        info!("Snapshot sampler initialized, transitioning to Sampling state");
        Ok(self.transition())
    }
}

impl SnapshotSampler<Sampling> {
    /// Drains pending gilrs events and publishes one snapshot per
    /// interval until every receiver is gone.
    pub async fn run_sampling_loop(&mut self) -> Result<(), SamplerError> {
        info!(
            "Starting sampling loop at {}ms intervals",
            self.settings.collection_interval_ms
        );
        let mut ticker = interval(Duration::from_millis(self.settings.collection_interval_ms));

        loop {
            ticker.tick().await;
            self.drain_events();

            let snapshot = self.compose_snapshot();
            if self.snapshot_tx.send(snapshot).is_err() {
                warn!("All snapshot receivers dropped, stopping sampler");
                return Err(SamplerError::ChannelClosed(
                    "all snapshot receivers dropped".to_string(),
                ));
            }
        }
    }

    fn drain_events(&mut self) {
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            if let Some(active_id) = self.active_gamepad {
                if id != active_id {
                    debug!("Skipping event from non-active gamepad: {:?}", id);
                    continue;
                }
            }
            self.apply_event(event);
        }
    }

    fn apply_event(&mut self, event: EventType) {
        let now = Local::now();

        match event {
            EventType::ButtonPressed(button, _) => {
                if let Some(vk) = map_button(button) {
                    info!(
                        "Button pressed: {} at {}",
                        vk,
                        now.format("%H:%M:%S.%3f")
                    );
                    if !self.held_buttons.contains(&vk) {
                        self.held_buttons.push(vk);
                    }
                }
            }
            EventType::ButtonReleased(button, _) => {
                if let Some(vk) = map_button(button) {
                    info!(
                        "Button released: {} at {}",
                        vk,
                        now.format("%H:%M:%S.%3f")
                    );
                    self.held_buttons.retain(|&held| held != vk);
                }
            }
            EventType::AxisChanged(axis, value, _) => {
                debug!("Axis changed: {:?} = {:.4}", axis, value);
                match axis {
                    Axis::LeftStickX => self.left_stick.0 = value,
                    Axis::LeftStickY => self.left_stick.1 = value,
                    Axis::RightStickX => self.right_stick.0 = value,
                    Axis::RightStickY => self.right_stick.1 = value,
                    Axis::LeftZ => self.left_trigger = value,
                    Axis::RightZ => self.right_trigger = value,
                    _ => debug!("Ignoring unsupported axis: {:?}", axis),
                }
            }
            EventType::Connected => {
                info!("Controller connected event detected");
            }
            EventType::Disconnected => {
                warn!("Controller disconnected event detected");
                self.held_buttons.clear();
                self.left_stick = (0.0, 0.0);
                self.right_stick = (0.0, 0.0);
                self.left_trigger = 0.0;
                self.right_trigger = 0.0;
            }
            _ => {
                debug!("Unhandled event type: {:?}", event);
            }
        }
    }

    /// Builds the held-button snapshot: physical buttons in press order,
    /// then stick directions past the deadzone, then triggers past their
    /// threshold.
    fn compose_snapshot(&self) -> Snapshot {
        let mut snapshot = self.held_buttons.clone();

        for (stick, (x, y)) in [(Stick::Left, self.left_stick), (Stick::Right, self.right_stick)] {
            let (radius, theta) = compute_polar_pair(x, y);
            if radius < self.settings.joystick_deadzone {
                continue;
            }
            if let Some(direction) = direction_for_polar_theta(theta) {
                snapshot.push(button_for_direction(direction, stick));
            }
        }

        if self.left_trigger >= self.settings.trigger_threshold {
            snapshot.push(VirtualButton::LeftTrigger);
        }
        if self.right_trigger >= self.settings.trigger_threshold {
            snapshot.push(VirtualButton::RightTrigger);
        }

        snapshot
    }
}

/// Public interface for spawning and running the sampler.
pub struct SamplerHandle {
    snapshot_rx: watch::Receiver<Snapshot>,
}

impl SamplerHandle {
    /// Creates a sampler and spawns it as a tokio task. The handle keeps
    /// a receiver for the published snapshots.
    pub fn spawn(
        settings: Option<SamplerSettings>,
        snapshot_tx: watch::Sender<Snapshot>,
    ) -> Result<Self, SamplerError> {
        info!("Spawning snapshot sampler with settings: {:?}", settings);

        let snapshot_rx = snapshot_tx.subscribe();
        let sampler = SnapshotSampler::create(settings, snapshot_tx)?;
        info!("Successfully created SnapshotSampler instance");

        tokio::spawn(async move {
            match sampler.initialize() {
                Ok(mut sampling) => {
                    info!("Sampler initialization successful, starting sampling loop");
                    if let Err(e) = sampling.run_sampling_loop().await {
                        error!("Sampler task terminated with error: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to initialize snapshot sampler: {}", e);
                }
            }
        });

        info!("Snapshot sampler successfully started");
        Ok(Self { snapshot_rx })
    }

    /// A receiver for the published snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_rx.clone()
    }
}

// Helper function to map gilrs buttons onto the virtual button space.
fn map_button(button: Button) -> Option<VirtualButton> {
    match button {
        Button::South => Some(VirtualButton::A),
        Button::East => Some(VirtualButton::B),
        Button::West => Some(VirtualButton::X),
        Button::North => Some(VirtualButton::Y),
        Button::Start => Some(VirtualButton::Start),
        Button::Select => Some(VirtualButton::Back),
        Button::LeftTrigger => Some(VirtualButton::ShoulderLeft),
        Button::RightTrigger => Some(VirtualButton::ShoulderRight),
        Button::LeftThumb => Some(VirtualButton::LeftStickClick),
        Button::RightThumb => Some(VirtualButton::RightStickClick),
        Button::DPadUp => Some(VirtualButton::DpadUp),
        Button::DPadDown => Some(VirtualButton::DpadDown),
        Button::DPadLeft => Some(VirtualButton::DpadLeft),
        Button::DPadRight => Some(VirtualButton::DpadRight),
        _ => None,
    }
}
