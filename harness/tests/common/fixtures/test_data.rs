//! Common test event payloads and API paths

use serde_json::{json, Value};

/// Plain push event payload
pub fn push_payload() -> Value {
    json!({ "ref": "refs/heads/master" })
}

/// Issues event payload carrying an action
pub fn issues_payload(action: &str) -> Value {
    json!({ "action": action })
}

/// Pull request event payload carrying an action
pub fn pull_request_payload(action: &str) -> Value {
    json!({ "action": action, "number": 1 })
}

/// API paths the test application calls
pub mod paths {
    pub const COMMITS: &str = "/repos/ploys/tests/commits";
    pub const MASTER_BRANCH: &str = "/repos/ploys/tests/branches/master";
    pub const MERGES: &str = "/repos/ploys/tests/merges";
}
