//! API version values

use std::fmt;
use std::str::FromStr;

use crate::error::ApiError;

/// Version used when neither configuration nor environment names one
pub const DEFAULT_API_VERSION: &str = "1.41";

/// Daemon API version, used as the `/vMAJOR.MINOR` request prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
}

impl ApiVersion {
    /// Create a version from its components
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Request path prefix for this version (e.g. `/v1.41`)
    pub fn path_prefix(&self) -> String {
        format!("/v{}", self)
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::new(1, 41)
    }
}

impl FromStr for ApiVersion {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ApiError::InvalidVersion(s.to_string());

        let trimmed = s.trim().trim_start_matches('v');
        let (major, minor) = trimmed.split_once('.').ok_or_else(invalid)?;

        let major = major.parse::<u32>().map_err(|_| invalid())?;
        let minor = minor.parse::<u32>().map_err(|_| invalid())?;

        Ok(Self { major, minor })
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
