use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_sts::Client as StsClient;
use tracing::{debug, info};

use super::Credentials;
use crate::{
    constants::DEFAULT_AWS_REGION,
    error::{Error, Result},
};

/// Parameters of a single AssumeRole exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssumeRoleRequest {
    pub role_arn: String,
    pub session_name: String,
    /// Region of the STS endpoint. `None` keeps the region of the base config.
    pub region: Option<String>,
}

/// Exchanges a role ARN for temporary credentials
#[async_trait]
pub trait RoleAssumer: Send + Sync {
    async fn assume_role(&self, request: &AssumeRoleRequest) -> Result<Credentials>;
}

/// Load the base SDK config used to call STS
///
/// Priority: explicit region -> ENV vars -> Config file -> EC2 metadata -> DEFAULT_AWS_REGION
pub async fn load_config(profile: Option<&str>, region: Option<&str>) -> SdkConfig {
    let loader = || {
        let loader = aws_config::defaults(BehaviorVersion::latest());
        match profile {
            Some(profile) => loader.profile_name(profile),
            None => loader,
        }
    };

    if let Some(region) = region {
        info!("Using region: {}", region);
        return loader().region(Region::new(region.to_string())).load().await;
    }

    let loaded = loader().load().await;
    match loaded.region() {
        Some(region) => {
            info!("Using region: {}", region);
            loaded
        }
        None => {
            info!(
                "No region configured, using default {} for STS",
                DEFAULT_AWS_REGION
            );
            loader().region(Region::new(DEFAULT_AWS_REGION)).load().await
        }
    }
}

/// [`RoleAssumer`] backed by AWS STS
#[derive(Debug, Clone)]
pub struct StsRoleAssumer {
    config: SdkConfig,
}

impl StsRoleAssumer {
    pub fn new(config: SdkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    fn client_config(&self, region: Option<&str>) -> aws_sdk_sts::Config {
        let mut builder = aws_sdk_sts::config::Builder::from(&self.config);
        if let Some(region) = region {
            builder = builder.region(Region::new(region.to_string()));
        }
        builder.build()
    }
}

#[async_trait]
impl RoleAssumer for StsRoleAssumer {
    async fn assume_role(&self, request: &AssumeRoleRequest) -> Result<Credentials> {
        info!("Calling AWS STS AssumeRole");
        debug!("Role ARN: {}", request.role_arn);
        debug!("Session name: {}", request.session_name);

        let client = StsClient::from_conf(self.client_config(request.region.as_deref()));

        let response = client
            .assume_role()
            .role_arn(&request.role_arn)
            .role_session_name(&request.session_name)
            .send()
            .await
            .map_err(|e| Error::AssumeRole {
                role_arn: request.role_arn.clone(),
                source: Box::new(e),
            })?;

        let sts_creds = response.credentials().ok_or_else(|| Error::NoCredentials {
            role_arn: request.role_arn.clone(),
        })?;

        let credentials = Credentials {
            access_key_id: sts_creds.access_key_id().to_string(),
            secret_access_key: sts_creds.secret_access_key().to_string(),
            session_token: sts_creds.session_token().to_string(),
            expiration: *sts_creds.expiration(),
        };

        info!("Successfully obtained AWS credentials");
        Ok(credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> SdkConfig {
        SdkConfig::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .build()
    }

    #[test]
    fn test_client_config_keeps_base_region() {
        let assumer = StsRoleAssumer::new(base_config());
        let config = assumer.client_config(None);
        assert_eq!(config.region(), Some(&Region::new("us-east-1")));
    }

    #[test]
    fn test_client_config_overrides_region() {
        let assumer = StsRoleAssumer::new(base_config());
        let config = assumer.client_config(Some("eu-west-1"));
        assert_eq!(config.region(), Some(&Region::new("eu-west-1")));

        // Base config is left untouched
        assert_eq!(assumer.config().region(), Some(&Region::new("us-east-1")));
    }
}
