//! Platform version gate for the console plugin.
//!
//! Only `MAJOR.MINOR` takes part in the comparison; patch levels, pre-release
//! tags and build metadata are ignored.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

/// Minimum OpenShift release that supports dynamic console plugins.
pub const DEFAULT_MIN_PLATFORM_VERSION: &str = "4.10";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlatformVersion {
    pub major: u64,
    pub minor: u64,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid platform version {0:?}: expected MAJOR.MINOR")]
pub struct VersionParseError(pub String);

impl FromStr for PlatformVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VersionParseError(s.to_string());
        let trimmed = s.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let mut parts = trimmed.split('.');
        let major = parts
            .next()
            .and_then(|p| p.parse::<u64>().ok())
            .ok_or_else(invalid)?;
        // "4.12-rc" style minors still carry a usable numeric prefix
        let minor = parts
            .next()
            .and_then(leading_number)
            .ok_or_else(invalid)?;
        Ok(Self { major, minor })
    }
}

impl fmt::Display for PlatformVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

fn leading_number(part: &str) -> Option<u64> {
    let end = part
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(part.len());
    part.get(..end).filter(|d| !d.is_empty())?.parse().ok()
}

/// `current >= minimum`, or the parse error of whichever side is malformed.
pub fn meets_minimum(
    current: &str,
    minimum: &str,
) -> Result<bool, VersionParseError> {
    let cur = current.parse::<PlatformVersion>()?;
    let min = minimum.parse::<PlatformVersion>()?;
    Ok(cur >= min)
}

/// Returns true when `current >= minimum`. Anything unparseable fails closed.
pub fn should_proceed(current: &str, minimum: &str) -> bool {
    meets_minimum(current, minimum).unwrap_or_else(|e| {
        debug!(error = %e, "version gate: unparseable version; refusing");
        false
    })
}
