use serde::{Deserialize, Serialize};

/// Caller identity resolved by the upstream gateway before the request
/// reaches this service. Authentication itself happens upstream; handlers
/// only ever see an already-verified account id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
}

impl SessionUser {
    pub fn new(id: i64) -> Self {
        Self { id }
    }
}
