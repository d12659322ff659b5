use serde::{Deserialize, Serialize};

use crate::{
    bounce::BounceAnimation,
    direction::Direction,
    location::Coords,
    permission::PermissionStatus,
    units::{format_altitude, format_speed},
};

pub const DENIED_MESSAGE: &str = "You denied location permissions, just fix this by visiting your settings location services for this app.";
pub const UNDETERMINED_MESSAGE: &str = "You need to enable location services for this app.";
pub const ENABLE_ACTION: &str = "Enable";
pub const ACTIVE_HEADER: &str = "You're heading";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Everything the live screen knows, replaced piece by piece as permission resolves and samples
/// arrive.
pub struct LiveState {
    status: PermissionStatus,
    coords: Option<Coords>,
    direction: Option<Direction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, specta::Type)]
/// A labelled readout under the direction
pub struct Metric {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, specta::Type)]
/// What the UI should currently render
pub enum LiveView {
    /// Waiting on the permission check or the first sample
    Loading,
    /// Permission was refused, there's nothing the app can do
    Denied { message: String },
    /// Permission can still be requested, `action` is the label of the button that should call
    /// `request_permission`
    Undetermined { message: String, action: String },
    /// Live readings
    Active {
        header: String,
        /// Empty when the platform can't determine a heading
        direction: String,
        altitude: Metric,
        speed: Metric,
    },
}

impl LiveState {
    pub fn status(&self) -> PermissionStatus {
        self.status
    }

    pub fn coords(&self) -> Option<&Coords> {
        self.coords.as_ref()
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Record the outcome of a permission check or request
    pub fn set_status(&mut self, status: PermissionStatus) {
        self.status = status;
    }

    /// Commit a new location sample. Returns the bounce to play if the derived direction changed
    /// from the last sample.
    pub fn apply_sample(&mut self, coords: Coords) -> Option<BounceAnimation> {
        let new_direction = coords.heading.and_then(Direction::from_heading);
        let changed = new_direction != self.direction;

        self.coords = Some(coords);
        self.status = PermissionStatus::Granted;
        self.direction = new_direction;

        changed.then(BounceAnimation::default)
    }

    pub fn as_view(&self) -> LiveView {
        match (self.status, &self.coords) {
            (PermissionStatus::Unknown, _) => LiveView::Loading,
            (PermissionStatus::Denied, _) => LiveView::Denied {
                message: DENIED_MESSAGE.to_string(),
            },
            (PermissionStatus::Undetermined, _) => LiveView::Undetermined {
                message: UNDETERMINED_MESSAGE.to_string(),
                action: ENABLE_ACTION.to_string(),
            },
            (PermissionStatus::Granted, None) => LiveView::Loading,
            (PermissionStatus::Granted, Some(coords)) => LiveView::Active {
                header: ACTIVE_HEADER.to_string(),
                direction: self
                    .direction
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
                altitude: Metric {
                    label: "Altitude".to_string(),
                    value: format_altitude(coords.altitude),
                },
                speed: Metric {
                    label: "Speed".to_string(),
                    value: format_speed(coords.speed),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(heading: f64) -> Coords {
        Coords {
            altitude: Some(100.0),
            speed: Some(10.0),
            heading: Some(heading),
        }
    }

    #[test]
    fn test_initial_view_is_loading() {
        let state = LiveState::default();
        assert_eq!(state.status(), PermissionStatus::Unknown);
        assert_eq!(state.coords(), None);
        assert_eq!(state.direction(), None);
        assert_eq!(state.as_view(), LiveView::Loading);
    }

    #[test]
    fn test_denied_view() {
        let mut state = LiveState::default();
        state.set_status(PermissionStatus::Denied);
        assert!(matches!(state.as_view(), LiveView::Denied { .. }));
    }

    #[test]
    fn test_undetermined_view_has_action() {
        let mut state = LiveState::default();
        state.set_status(PermissionStatus::Undetermined);
        match state.as_view() {
            LiveView::Undetermined { action, .. } => assert_eq!(action, "Enable"),
            other => panic!("Expected undetermined view, got {other:?}"),
        }
    }

    #[test]
    fn test_granted_without_sample_is_loading() {
        let mut state = LiveState::default();
        state.set_status(PermissionStatus::Granted);
        assert_eq!(state.as_view(), LiveView::Loading);
    }

    #[test]
    fn test_first_sample() {
        let mut state = LiveState::default();
        let bounce = state.apply_sample(sample(0.0));

        assert!(bounce.is_some(), "First direction should bounce");
        assert_eq!(state.status(), PermissionStatus::Granted);
        assert_eq!(state.direction(), Some(Direction::North));
        assert_eq!(state.coords(), Some(&sample(0.0)));

        assert_eq!(
            state.as_view(),
            LiveView::Active {
                header: "You're heading".to_string(),
                direction: "North".to_string(),
                altitude: Metric {
                    label: "Altitude".to_string(),
                    value: "328 Feet".to_string(),
                },
                speed: Metric {
                    label: "Speed".to_string(),
                    value: "22.4 mph".to_string(),
                },
            }
        );
    }

    #[test]
    fn test_same_direction_does_not_bounce() {
        let mut state = LiveState::default();
        assert!(state.apply_sample(sample(5.0)).is_some());

        let mut second = sample(10.0);
        second.altitude = Some(0.0);
        assert!(state.apply_sample(second).is_none());
        assert_eq!(state.coords(), Some(&second), "Coords not committed");
        assert_eq!(state.direction(), Some(Direction::North));
    }

    #[test]
    fn test_direction_change_bounces() {
        let mut state = LiveState::default();
        state.apply_sample(sample(0.0));
        let bounce = state.apply_sample(sample(90.0));
        assert_eq!(bounce, Some(BounceAnimation::default()));
        assert_eq!(state.direction(), Some(Direction::East));
    }

    #[test]
    fn test_missing_heading() {
        let mut state = LiveState::default();
        let coords = Coords {
            altitude: None,
            speed: None,
            heading: None,
        };
        assert!(state.apply_sample(coords).is_none(), "No direction, no change");
        match state.as_view() {
            LiveView::Active {
                direction,
                altitude,
                speed,
                ..
            } => {
                assert_eq!(direction, "");
                assert_eq!(altitude.value, "-- Feet");
                assert_eq!(speed.value, "-- mph");
            }
            other => panic!("Expected active view, got {other:?}"),
        }

        // Losing the heading after having one is a change
        state.apply_sample(sample(180.0));
        assert!(state.apply_sample(coords).is_some());
    }

    #[test]
    fn test_sample_overrides_status() {
        let mut state = LiveState::default();
        state.set_status(PermissionStatus::Undetermined);
        state.apply_sample(sample(45.0));
        assert_eq!(state.status(), PermissionStatus::Granted);
    }
}
