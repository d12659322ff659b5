mod location;
mod state;

use std::{borrow::Cow, path::Path};

use anyhow::anyhow;
use compass_logic::LiveView;
use log::LevelFilter;
use specta_typescript::Typescript;
use tauri::{AppHandle, State};
use tauri_specta::{ErrorHandlingMode, collect_commands, collect_events};
use tokio::sync::RwLock;

use std::result::Result as StdResult;

use crate::state::{AppState, AppStateHandle, DirectionBounce, LiveStateUpdate};

type Result<T = (), E = String> = StdResult<T, E>;

#[tauri::command]
#[specta::specta]
/// Show the live screen, this checks location permission and starts tracking once it's granted.
/// Listen for `LiveStateUpdate` and `DirectionBounce` after calling.
async fn open_live(app: AppHandle, state: State<'_, AppStateHandle>) -> Result {
    state.write().await.open_live(app);
    Ok(())
}

#[tauri::command]
#[specta::specta]
/// Leave the live screen, stops tracking location
async fn close_live(state: State<'_, AppStateHandle>) -> Result {
    state.write().await.close_live();
    Ok(())
}

#[tauri::command]
#[specta::specta]
/// (Screen: Live) Get what the live screen should render, call after receiving an update event
async fn get_live_view(state: State<'_, AppStateHandle>) -> Result<LiveView> {
    let live = state.read().await.get_live()?;
    Ok(live.get_view().await)
}

#[tauri::command]
#[specta::specta]
/// (Screen: Live) Prompt the user for location access, bound to the "Enable" button
async fn request_permission(state: State<'_, AppStateHandle>) -> Result {
    let live = state.read().await.get_live()?;
    live.request_permission().await;
    Ok(())
}

pub fn mk_specta() -> tauri_specta::Builder {
    tauri_specta::Builder::<tauri::Wry>::new()
        .error_handling(ErrorHandlingMode::Throw)
        .commands(collect_commands![
            open_live,
            close_live,
            get_live_view,
            request_permission,
        ])
        .events(collect_events![LiveStateUpdate, DirectionBounce])
}

/// Write the TypeScript bindings for every command and event the frontend uses
pub fn export_bindings(path: impl AsRef<Path>) -> anyhow::Result<()> {
    let mut lang = Typescript::new();
    lang.header = Cow::Borrowed("/* eslint @typescript-eslint/no-explicit-any: 0 */");
    mk_specta()
        .export(lang, path.as_ref())
        .map_err(|why| anyhow!("Failed to export bindings to {}: {why:?}", path.as_ref().display()))
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let state = RwLock::new(AppState::Idle);

    let builder = mk_specta();

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(
            tauri_plugin_log::Builder::new()
                .level(LevelFilter::Debug)
                .build(),
        )
        .plugin(tauri_plugin_geolocation::init())
        .invoke_handler(builder.invoke_handler())
        .manage(state)
        .setup(move |app| {
            builder.mount_events(app);
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
