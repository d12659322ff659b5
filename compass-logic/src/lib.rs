mod bounce;
mod direction;
mod live;
mod location;
mod permission;
mod state;
mod units;

pub use bounce::{BOUNCE_FRAME, BounceAnimation};
pub use direction::Direction;
pub use live::{Live, StateUpdateSender};
pub use location::{Coords, LocationComponent, LocationService, WATCH_OPTIONS, WatchOptions};
pub use permission::{PermissionService, PermissionStatus};
pub use state::{LiveState, LiveView, Metric};
pub use units::{FEET_PER_METER, MPH_PER_MPS, format_altitude, format_speed};

pub mod prelude {
    use anyhow::Error as AnyhowError;
    use std::result::Result as StdResult;
    pub type Result<T = (), E = AnyhowError> = StdResult<T, E>;
    pub use anyhow::Context;
}
