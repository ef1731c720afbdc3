use serde::Deserialize;

/// Login result: the session token plus the metering point (CUPS) it grants access to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Session {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    pub cups: String,
}
