use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use crate::prelude::*;

/// A "part" of a location reading
pub type LocationComponent = f64;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, specta::Type)]
/// One sample from the device location service, every field is optional as the platform can't
/// always determine them.
pub struct Coords {
    /// Altitude in meters
    pub altitude: Option<LocationComponent>,
    /// Ground speed in meters per second
    pub speed: Option<LocationComponent>,
    /// Heading in degrees, 0 is north going clockwise
    pub heading: Option<LocationComponent>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
/// Options passed to the platform when opening a location watch
pub struct WatchOptions {
    /// Request the most accurate provider available (GPS)
    pub high_accuracy: bool,
    /// Minimum time between samples in milliseconds. Advisory, a platform may deliver samples
    /// faster or ignore this entirely.
    pub min_time_interval_ms: u64,
    /// Minimum distance moved between samples in meters. Advisory, the Tauri geolocation plugin
    /// has no distance filter so this is dropped there.
    pub min_distance_interval: f64,
}

/// Effectively "as often as the platform allows"
pub const WATCH_OPTIONS: WatchOptions = WatchOptions {
    high_accuracy: true,
    min_time_interval_ms: 1,
    min_distance_interval: 1.0,
};

/// A source of continuous location samples.
pub trait LocationService: Send + Sync {
    /// Guard for an open watch, dropping it must release the platform subscription
    type Watch: Send;

    /// Begin pushing samples into `samples` until the returned guard is dropped.
    /// Implementations should stop sending once `samples` is closed.
    fn watch_position(
        &self,
        options: WatchOptions,
        samples: UnboundedSender<Coords>,
    ) -> Result<Self::Watch>;
}
