use std::{env, path::PathBuf};

/// AWS configuration directory name
pub const AWS_CONFIG_DIR_NAME: &str = ".aws";

/// AWS configuration file name
pub const AWS_CONFIG_FILE_NAME: &str = "config";

/// Marker that precedes the role name inside a role ARN
pub const ROLE_ARN_MARKER: &str = "role/";

/// Suffix appended to the role name to form the STS session name
pub const SESSION_NAME_SUFFIX: &str = "-aws-sdk";

/// Default AWS region for STS operations when no region is configured
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

/// Version field of the `credential_process` output format
pub const CREDENTIAL_PROCESS_VERSION: u8 = 1;

/// Get the AWS config file path
/// Respects AWS_CONFIG_FILE environment variable if set
pub fn get_aws_config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var("AWS_CONFIG_FILE") {
        return Some(PathBuf::from(path));
    }

    dirs::home_dir().map(|home| home.join(AWS_CONFIG_DIR_NAME).join(AWS_CONFIG_FILE_NAME))
}
