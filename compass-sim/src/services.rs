use std::{path::Path, time::Duration};

use anyhow::anyhow;
use clap::ValueEnum;
use compass_logic::{
    BounceAnimation, Coords, LocationService, PermissionService, PermissionStatus,
    StateUpdateSender, WatchOptions, prelude::*,
};
use log::debug;
use tokio::{
    sync::mpsc::{self, UnboundedSender},
    task::AbortHandle,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
/// How the simulated platform answers a permission call
pub enum Answer {
    Granted,
    Denied,
    Undetermined,
    /// The platform call fails
    Fail,
}

impl Answer {
    fn resolve(self, call: &str) -> Result<PermissionStatus> {
        match self {
            Answer::Granted => Ok(PermissionStatus::Granted),
            Answer::Denied => Ok(PermissionStatus::Denied),
            Answer::Undetermined => Ok(PermissionStatus::Undetermined),
            Answer::Fail => Err(anyhow!("Simulated {call} failure")),
        }
    }
}

pub struct ScriptedPermissions {
    pub check: Answer,
    pub request: Answer,
}

impl PermissionService for ScriptedPermissions {
    async fn check_permission(&self) -> Result<PermissionStatus> {
        self.check.resolve("permission check")
    }

    async fn request_permission(&self) -> Result<PermissionStatus> {
        self.request.resolve("permission request")
    }
}

/// Plays back recorded samples, one every `interval` or the watch's minimum time interval,
/// whichever is longer
pub struct ReplayLocation {
    samples: Vec<Coords>,
    interval: Duration,
}

impl ReplayLocation {
    pub fn new(samples: Vec<Coords>, interval: Duration) -> Self {
        Self { samples, interval }
    }
}

/// Stops the replay task when dropped
pub struct ReplayWatch(AbortHandle);

impl Drop for ReplayWatch {
    fn drop(&mut self) {
        debug!("Stopping replay");
        self.0.abort();
    }
}

impl LocationService for ReplayLocation {
    type Watch = ReplayWatch;

    fn watch_position(
        &self,
        options: WatchOptions,
        samples: UnboundedSender<Coords>,
    ) -> Result<ReplayWatch> {
        let recorded = self.samples.clone();
        let interval = self
            .interval
            .max(Duration::from_millis(options.min_time_interval_ms));
        let handle = tokio::spawn(async move {
            for coords in recorded {
                tokio::time::sleep(interval).await;
                if samples.send(coords).is_err() {
                    return;
                }
            }
            // Hold the sender so the stream stays open like a real device would
            std::future::pending::<()>().await;
        });
        Ok(ReplayWatch(handle.abort_handle()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    Update,
    Bounce(BounceAnimation),
}

pub struct ChannelSender(pub mpsc::UnboundedSender<SimEvent>);

impl StateUpdateSender for ChannelSender {
    fn send_update(&self) {
        self.0.send(SimEvent::Update).ok();
    }

    fn send_bounce(&self, bounce: BounceAnimation) {
        self.0.send(SimEvent::Bounce(bounce)).ok();
    }
}

/// Read a JSON array of samples, e.g. `[{"altitude": 10.0, "speed": 1.5, "heading": 90.0}]`
pub fn read_samples(path: &Path) -> Result<Vec<Coords>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read samples from {}", path.display()))?;
    parse_samples(&raw)
}

pub fn parse_samples(raw: &str) -> Result<Vec<Coords>> {
    serde_json::from_str(raw).context("Failed to parse samples")
}
