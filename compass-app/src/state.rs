use std::sync::Arc;

use compass_logic::{BOUNCE_FRAME, BounceAnimation, Live as BaseLive, StateUpdateSender};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use tauri::{AppHandle, Manager};
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};
use tauri_specta::Event;
use tokio::sync::RwLock;

use crate::{
    Result,
    location::{TauriLocation, TauriPermissions},
};

/// The state of the live screen has changed, call `get_live_view`
#[derive(Serialize, Deserialize, Clone, Default, Debug, specta::Type, tauri_specta::Event)]
pub struct LiveStateUpdate;

/// The heading changed direction, play these scales on the direction label, one every `frame_ms`
#[derive(Serialize, Deserialize, Clone, Debug, specta::Type, tauri_specta::Event)]
pub struct DirectionBounce {
    frame_ms: u32,
    scales: Vec<f64>,
}

impl From<BounceAnimation> for DirectionBounce {
    fn from(bounce: BounceAnimation) -> Self {
        Self {
            frame_ms: BOUNCE_FRAME.as_millis() as u32,
            scales: bounce.keyframes(BOUNCE_FRAME),
        }
    }
}

pub struct TauriStateUpdateSender(AppHandle);

impl StateUpdateSender for TauriStateUpdateSender {
    fn send_update(&self) {
        if let Err(why) = LiveStateUpdate.emit(&self.0) {
            error!("Error sending live state update to UI: {why:?}");
        }
    }

    fn send_bounce(&self, bounce: BounceAnimation) {
        if let Err(why) = DirectionBounce::from(bounce).emit(&self.0) {
            warn!("Error sending direction bounce to UI: {why:?}");
        }
    }
}

type Live = BaseLive<TauriPermissions, TauriLocation, TauriStateUpdateSender>;

pub enum AppState {
    /// The live screen isn't showing, nothing is being tracked
    Idle,
    Live(Arc<Live>),
}

pub type AppStateHandle = RwLock<AppState>;

fn error_dialog(app: &AppHandle, msg: &str) {
    app.dialog()
        .message(msg)
        .kind(MessageDialogKind::Error)
        .show(|_| {});
}

impl AppState {
    pub fn get_live(&self) -> Result<Arc<Live>> {
        if let AppState::Live(live) = self {
            Ok(live.clone())
        } else {
            Err("Live screen isn't open".to_string())
        }
    }

    pub fn open_live(&mut self, app: AppHandle) {
        if let AppState::Live(_) = self {
            warn!("Live screen already open!");
            return;
        }

        let live = Arc::new(Live::new(
            TauriPermissions::new(app.clone()),
            TauriLocation::new(app.clone()),
            TauriStateUpdateSender(app.clone()),
        ));
        *self = AppState::Live(live.clone());
        Self::live_loop(app, live);
    }

    pub fn close_live(&mut self) {
        if let AppState::Live(live) = self {
            live.unmount();
            *self = AppState::Idle;
        } else {
            warn!("Live screen isn't open!");
        }
    }

    fn live_loop(app: AppHandle, live: Arc<Live>) {
        tokio::spawn(async move {
            let res = live.main_loop().await;
            match res {
                Ok(()) => {
                    info!("Left live screen");
                }
                Err(why) => {
                    error!("Location Error: {why:?}");
                    error_dialog(&app, &format!("Location Error: {why}"));

                    let state_handle = app.state::<AppStateHandle>();
                    let mut state = state_handle.write().await;
                    // Don't clobber a screen that was reopened in the meantime
                    if matches!(&*state, AppState::Live(current) if Arc::ptr_eq(current, &live)) {
                        *state = AppState::Idle;
                    }
                    drop(state);

                    if let Err(why) = LiveStateUpdate.emit(&app) {
                        warn!("Error sending live state update to UI: {why:?}");
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounce_event_carries_spring_frames() {
        let bounce = BounceAnimation::default();
        let event = DirectionBounce::from(bounce);

        assert_eq!(event.frame_ms, 16);
        assert_eq!(event.scales, bounce.keyframes(BOUNCE_FRAME));
        assert_eq!(event.scales.last(), Some(&1.0));
    }
}
