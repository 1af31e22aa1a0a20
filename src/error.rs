use thiserror::Error;

/// Boxed source error carried from the STS collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    /// The role ARN has no `role/` segment to build a session name from.
    #[error("role ARN '{role_arn}' does not contain 'role/'")]
    MalformedArn { role_arn: String },

    /// STS rejected the request. `source` is the original error.
    #[error("failed to assume role {role_arn}")]
    AssumeRole {
        role_arn: String,
        #[source]
        source: BoxError,
    },

    #[error("AWS STS returned no credentials for {role_arn}")]
    NoCredentials { role_arn: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
