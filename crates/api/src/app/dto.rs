use serde::Deserialize;

use user_service_core::{UserId, UserPatch};

// -------------------------
// Request DTOs
// -------------------------

/// v1 update body: the target id travels alongside the changed fields.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateUserRequest {
    #[serde(rename = "ID", alias = "id")]
    pub id: Option<UserId>,
    #[serde(flatten)]
    pub patch: UserPatch,
}

/// v1 delete target, read from the JSON body or the query string.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserIdRequest {
    #[serde(rename = "ID", alias = "id")]
    pub id: Option<UserId>,
}
