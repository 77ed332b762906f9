use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload of an access token issued by the identity provider.
/// Audience and issuer are checked by the validator, not read here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}
