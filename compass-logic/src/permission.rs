use serde::{Deserialize, Serialize};

use crate::prelude::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, specta::Type)]
/// Where we are in resolving location permission
pub enum PermissionStatus {
    /// The first permission check hasn't completed yet
    #[default]
    Unknown,
    /// The user allowed location access
    Granted,
    /// The user refused location access, only fixable from the system settings
    Denied,
    /// The user hasn't decided yet (or the check failed), we can still prompt them
    Undetermined,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Platform permission API for location access
pub trait PermissionService: Send + Sync {
    /// Get the current permission status without prompting the user
    fn check_permission(&self) -> impl Future<Output = Result<PermissionStatus>> + Send;
    /// Show the platform permission dialog and return the user's answer
    fn request_permission(&self) -> impl Future<Output = Result<PermissionStatus>> + Send;
}
