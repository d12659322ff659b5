use compass_logic::{
    Coords, LocationService, PermissionService, PermissionStatus, WatchOptions, prelude::*,
};
use log::{error, warn};
use tauri::{AppHandle, plugin::PermissionState};
use tauri_plugin_geolocation::{GeolocationExt, PermissionType, PositionOptions, WatchEvent};
use tokio::sync::mpsc::UnboundedSender;

fn status_from_state(state: PermissionState) -> PermissionStatus {
    match state {
        PermissionState::Granted => PermissionStatus::Granted,
        PermissionState::Denied => PermissionStatus::Denied,
        // Prompt and PromptWithRationale, we're still allowed to ask
        _ => PermissionStatus::Undetermined,
    }
}

pub struct TauriPermissions(AppHandle);

impl TauriPermissions {
    pub fn new(app: AppHandle) -> Self {
        Self(app)
    }
}

impl PermissionService for TauriPermissions {
    async fn check_permission(&self) -> Result<PermissionStatus> {
        let app = self.0.clone();
        let status = tauri::async_runtime::spawn_blocking(move || {
            app.geolocation().check_permissions()
        })
        .await
        .context("Permission check task failed")?
        .context("Failed to check location permission")?;

        Ok(status_from_state(status.location))
    }

    async fn request_permission(&self) -> Result<PermissionStatus> {
        let app = self.0.clone();
        // Blocks until the user answers the system dialog
        let status = tauri::async_runtime::spawn_blocking(move || {
            app.geolocation()
                .request_permissions(Some(vec![PermissionType::Location]))
        })
        .await
        .context("Permission request task failed")?
        .context("Failed to request location permission")?;

        Ok(status_from_state(status.location))
    }
}

pub struct TauriLocation(AppHandle);

impl TauriLocation {
    pub fn new(app: AppHandle) -> Self {
        Self(app)
    }
}

/// An open geolocation watch, cleared when dropped
pub struct TauriWatch {
    app: AppHandle,
    id: u32,
}

impl Drop for TauriWatch {
    fn drop(&mut self) {
        if let Err(why) = self.app.geolocation().clear_watch(self.id) {
            error!("Failed to clear location watch {}: {why:?}", self.id);
        }
    }
}

impl LocationService for TauriLocation {
    type Watch = TauriWatch;

    fn watch_position(
        &self,
        options: WatchOptions,
        samples: UnboundedSender<Coords>,
    ) -> Result<TauriWatch> {
        // The plugin has no distance filter, a max age of 0 asks for a fresh fix every time
        let opts = PositionOptions {
            enable_high_accuracy: options.high_accuracy,
            timeout: 10000,
            maximum_age: 0,
        };

        let id = self
            .0
            .geolocation()
            .watch_position(opts, move |event| match event {
                WatchEvent::Position(pos) => {
                    let coords = pos.coords;
                    // Receiver is gone once the live screen stops tracking
                    let _ = samples.send(Coords {
                        altitude: coords.altitude,
                        speed: coords.speed,
                        heading: coords.heading,
                    });
                }
                WatchEvent::Error(why) => {
                    warn!("Location watch error: {why}");
                }
            })
            .context("Failed to open location watch")?;

        Ok(TauriWatch {
            app: self.0.clone(),
            id,
        })
    }
}
