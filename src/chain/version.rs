use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Minimum node JSON-RPC API version this client can talk to.
pub const REQUIRED_CHAIN_SERVER_API: Semver = Semver::new(5, 0, 0);

/// Key of the node API entry in the `version` RPC result.
pub const CHAIN_SERVER_API_KEY: &str = "fnodjsonrpcapi";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semver {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Semver {
    pub const fn new(
        major: u32,
        minor: u32,
        patch: u32,
    ) -> Self {
        Self { major, minor, patch }
    }
}

impl fmt::Display for Semver {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// `actual` satisfies `required` when the majors match and `actual` is not
/// older than `required`.
pub fn semver_compatible(
    required: Semver,
    actual: Semver,
) -> bool {
    if required.major != actual.major {
        return false;
    }
    if actual.minor != required.minor {
        return actual.minor > required.minor;
    }
    actual.patch >= required.patch
}
