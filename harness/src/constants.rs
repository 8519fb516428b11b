//! Configuration defaults for deadlines, hosts, and verbs
//!
//! Central repository for the harness defaults so individual modules do not
//! carry magic numbers. Everything here can be overridden per harness or per
//! interception scope.

use std::time::Duration;

/// Deadline constants
pub mod deadline {
    use super::Duration;

    /// Default deadline for a single run when none is given
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(4500);
}

/// Interception defaults
pub mod net {
    /// Default host that relative request paths resolve against
    pub const DEFAULT_API_HOST: &str = "https://api.github.com";
}

/// HTTP verbs accepted by interceptors
pub mod verbs {
    pub const GET: &str = "GET";
    pub const POST: &str = "POST";
    pub const PUT: &str = "PUT";
    pub const HEAD: &str = "HEAD";
    pub const PATCH: &str = "PATCH";
    pub const DELETE: &str = "DELETE";
    pub const OPTIONS: &str = "OPTIONS";

    /// Custom verb used by the GitHub merge API
    pub const MERGE: &str = "MERGE";
}
