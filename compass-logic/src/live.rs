use anyhow::bail;
use log::{debug, error, info};
use tokio::sync::{Notify, RwLock, mpsc};
use tokio_util::sync::CancellationToken;

use crate::{
    bounce::BounceAnimation,
    location::{Coords, LocationService, WATCH_OPTIONS},
    permission::{PermissionService, PermissionStatus},
    prelude::*,
    state::{LiveState, LiveView},
};

/// Pushes changes out to whatever is rendering the live screen
pub trait StateUpdateSender {
    /// The state changed, the UI should fetch a new [LiveView]
    fn send_update(&self);
    /// The direction changed, the UI should play this animation on the direction label
    fn send_bounce(&self, bounce: BounceAnimation);
}

/// The live compass screen. Resolves location permission with [PermissionService], follows the
/// device with [LocationService] once granted, and notifies the UI through [StateUpdateSender].
pub struct Live<P: PermissionService, L: LocationService, S: StateUpdateSender> {
    state: RwLock<LiveState>,
    permissions: P,
    location: L,
    state_update_sender: S,
    granted: Notify,
    cancel: CancellationToken,
}

impl<P: PermissionService, L: LocationService, S: StateUpdateSender> Live<P, L, S> {
    pub fn new(permissions: P, location: L, state_update_sender: S) -> Self {
        Self {
            state: RwLock::new(LiveState::default()),
            permissions,
            location,
            state_update_sender,
            granted: Notify::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub async fn get_view(&self) -> LiveView {
        self.state.read().await.as_view()
    }

    pub async fn clone_state(&self) -> LiveState {
        self.state.read().await.clone()
    }

    async fn resolve_permission(&self, status: PermissionStatus) {
        debug!("Location permission resolved to {status:?}");
        self.state.write().await.set_status(status);
        if status.is_granted() {
            // Stores a permit if the main loop isn't waiting yet, extra grants are ignored
            self.granted.notify_one();
        }
        self.state_update_sender.send_update();
    }

    async fn check_permission(&self) {
        let status = match self.permissions.check_permission().await {
            Ok(status) => status,
            Err(why) => {
                error!("Error getting location permission: {why:?}");
                PermissionStatus::Undetermined
            }
        };
        self.resolve_permission(status).await;
    }

    /// Prompt the user for location access. On failure the error is logged and the state is left
    /// as is.
    pub async fn request_permission(&self) {
        match self.permissions.request_permission().await {
            Ok(status) => self.resolve_permission(status).await,
            Err(why) => error!("Error asking location permission: {why:?}"),
        }
    }

    async fn consume_sample(&self, coords: Coords) {
        let bounce = self.state.write().await.apply_sample(coords);

        // The UI needs the new label on screen before it can animate it
        self.state_update_sender.send_update();

        if let Some(bounce) = bounce {
            self.state_update_sender.send_bounce(bounce);
        }
    }

    /// Follow the device until the sample stream ends. The platform watch is released when this
    /// future completes or is dropped.
    async fn track_location(&self) -> Result {
        let (tx, mut rx) = mpsc::unbounded_channel();

        let _watch = self
            .location
            .watch_position(WATCH_OPTIONS, tx)
            .context("Failed to start watching location")?;

        info!("Watching device location");

        while let Some(coords) = rx.recv().await {
            self.consume_sample(coords).await;
        }

        bail!("Location service stopped sending samples")
    }

    async fn run(&self) -> Result {
        self.check_permission().await;
        self.granted.notified().await;
        self.track_location().await
    }

    /// Main loop of the screen, resolves permission then consumes location samples until
    /// [Self::unmount] is called. Only returns an error if the location service fails.
    pub async fn main_loop(&self) -> Result {
        tokio::select! {
            biased;

            _ = self.cancel.cancelled() => {
                info!("Live screen unmounted");
                Ok(())
            }

            res = self.run() => res,
        }
    }

    /// Stop the main loop and release the location watch
    pub fn unmount(&self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::{task::JoinHandle, test};

    use super::*;
    use crate::{
        direction::Direction,
        tests::{MockLocation, MockPermissions, RecordingSender, settle},
    };

    type TestLive = Live<MockPermissions, MockLocation, RecordingSender>;

    struct Harness {
        live: Arc<TestLive>,
        location: MockLocation,
        sender: RecordingSender,
        handle: JoinHandle<Result>,
    }

    impl Harness {
        async fn mount(permissions: MockPermissions, location: MockLocation) -> Self {
            let sender = RecordingSender::default();
            let live = Arc::new(Live::new(permissions, location.clone(), sender.clone()));
            let handle = tokio::spawn({
                let live = live.clone();
                async move { live.main_loop().await }
            });
            settle().await;
            Self {
                live,
                location,
                sender,
                handle,
            }
        }

        async fn push(&self, heading: f64) {
            self.location.push(Coords {
                altitude: Some(100.0),
                speed: Some(10.0),
                heading: Some(heading),
            });
            settle().await;
        }

        async fn status(&self) -> PermissionStatus {
            self.live.clone_state().await.status()
        }
    }

    #[test]
    async fn test_granted_then_first_sample() {
        let h = Harness::mount(
            MockPermissions::new(Some(PermissionStatus::Granted), None),
            MockLocation::default(),
        )
        .await;

        assert_eq!(h.location.opened(), 1, "Watch should open on grant");
        assert_eq!(h.live.get_view().await, LiveView::Loading);

        h.push(0.0).await;

        let state = h.live.clone_state().await;
        assert_eq!(state.status(), PermissionStatus::Granted);
        assert_eq!(state.direction(), Some(Direction::North));
        assert!(state.coords().is_some());
        assert!(matches!(h.live.get_view().await, LiveView::Active { .. }));
        assert_eq!(h.sender.bounces().len(), 1);
    }

    #[test]
    async fn test_denied_never_subscribes() {
        let h = Harness::mount(
            MockPermissions::new(Some(PermissionStatus::Denied), Some(PermissionStatus::Denied)),
            MockLocation::default(),
        )
        .await;

        assert_eq!(h.status().await, PermissionStatus::Denied);
        assert!(matches!(h.live.get_view().await, LiveView::Denied { .. }));

        h.live.request_permission().await;
        settle().await;

        assert_eq!(h.location.opened(), 0, "Watch opened despite denial");
    }

    #[test]
    async fn test_check_failure_is_undetermined() {
        let h = Harness::mount(MockPermissions::new(None, None), MockLocation::default()).await;

        assert_eq!(h.status().await, PermissionStatus::Undetermined);
        assert_eq!(h.location.opened(), 0);
    }

    #[test]
    async fn test_request_grants_once() {
        let h = Harness::mount(
            MockPermissions::new(
                Some(PermissionStatus::Undetermined),
                Some(PermissionStatus::Granted),
            ),
            MockLocation::default(),
        )
        .await;

        assert!(matches!(
            h.live.get_view().await,
            LiveView::Undetermined { .. }
        ));
        assert_eq!(h.location.opened(), 0);

        h.live.request_permission().await;
        settle().await;
        assert_eq!(h.location.opened(), 1);

        h.live.request_permission().await;
        settle().await;
        assert_eq!(h.location.opened(), 1, "Subscriber started twice");
        assert_eq!(h.status().await, PermissionStatus::Granted);
    }

    #[test]
    async fn test_request_failure_leaves_state() {
        let h = Harness::mount(
            MockPermissions::new(Some(PermissionStatus::Undetermined), None),
            MockLocation::default(),
        )
        .await;

        let before = h.live.clone_state().await;
        let updates = h.sender.updates();

        h.live.request_permission().await;
        settle().await;

        assert_eq!(h.live.clone_state().await, before);
        assert_eq!(h.sender.updates(), updates, "No update on failed request");
        assert_eq!(h.location.opened(), 0);
    }

    #[test]
    async fn test_same_direction_single_bounce() {
        let h = Harness::mount(
            MockPermissions::new(Some(PermissionStatus::Granted), None),
            MockLocation::default(),
        )
        .await;

        h.push(10.0).await;
        let updates = h.sender.updates();
        h.push(350.0).await;

        assert_eq!(h.sender.bounces().len(), 1, "Second North sample bounced");
        assert_eq!(h.sender.updates(), updates + 1, "Second sample not committed");
        let state = h.live.clone_state().await;
        assert_eq!(state.coords().and_then(|c| c.heading), Some(350.0));

        h.push(200.0).await;
        assert_eq!(h.sender.bounces().len(), 2);
    }

    #[test]
    async fn test_bounce_follows_its_update() {
        let h = Harness::mount(
            MockPermissions::new(Some(PermissionStatus::Granted), None),
            MockLocation::default(),
        )
        .await;

        let before_first = h.sender.updates();
        h.push(0.0).await;
        h.push(90.0).await;

        assert_eq!(
            h.sender.updates_before_bounces(),
            vec![before_first + 1, before_first + 2],
            "Bounce sent before the update that shows the new direction"
        );
    }

    #[test]
    async fn test_unmount_releases_watch() {
        let h = Harness::mount(
            MockPermissions::new(Some(PermissionStatus::Granted), None),
            MockLocation::default(),
        )
        .await;

        assert_eq!(h.location.released(), 0);

        h.live.unmount();
        let res = h.handle.await.expect("Main loop panicked");

        assert!(res.is_ok(), "Unmount should exit cleanly");
        assert_eq!(h.location.released(), 1, "Watch not released on unmount");
    }

    #[test]
    async fn test_unmount_before_grant() {
        let h = Harness::mount(
            MockPermissions::new(Some(PermissionStatus::Undetermined), None),
            MockLocation::default(),
        )
        .await;

        h.live.unmount();
        let res = h.handle.await.expect("Main loop panicked");
        assert!(res.is_ok());
        assert_eq!(h.location.opened(), 0);
    }

    #[test]
    async fn test_watch_failure_is_error() {
        let h = Harness::mount(
            MockPermissions::new(Some(PermissionStatus::Granted), None),
            MockLocation::failing(),
        )
        .await;

        let res = h.handle.await.expect("Main loop panicked");
        assert!(res.is_err(), "Failed watch should end the main loop");
    }

    #[test]
    async fn test_stream_end_releases_watch() {
        let h = Harness::mount(
            MockPermissions::new(Some(PermissionStatus::Granted), None),
            MockLocation::default(),
        )
        .await;

        h.push(90.0).await;
        h.location.close();

        let res = h.handle.await.expect("Main loop panicked");
        assert!(res.is_err());
        assert_eq!(h.location.released(), 1);
    }
}
