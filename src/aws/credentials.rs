use std::time::SystemTime;

use aws_smithy_types::{DateTime, date_time::Format};

/// Provider name reported by credentials handed to SDK clients
const PROVIDER_NAME: &str = "RoleSessionCache";

/// AWS temporary credentials structure
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: DateTime,
}

impl Credentials {
    /// Expiration as an RFC 3339 string, or "unknown" if it cannot be formatted
    pub fn expiration_string(&self) -> String {
        self.expiration
            .fmt(Format::DateTime)
            .unwrap_or_else(|_| "unknown".to_string())
    }

    /// Convert into the credential type SDK clients consume
    pub fn to_sdk_credentials(&self) -> aws_credential_types::Credentials {
        aws_credential_types::Credentials::new(
            &self.access_key_id,
            &self.secret_access_key,
            Some(self.session_token.clone()),
            SystemTime::try_from(self.expiration).ok(),
            PROVIDER_NAME,
        )
    }
}
