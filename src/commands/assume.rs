use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;
use tracing::info;

use crate::{
    aws::{
        cache::{AssumeRoleOptions, AssumedRole, RoleSessionCache},
        sts::{self, StsRoleAssumer},
    },
    config::{self, ProfileConfig},
    constants::CREDENTIAL_PROCESS_VERSION,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One `credential_process` JSON object per role
    #[default]
    Json,
    /// Shell `export` statements
    Env,
}

#[derive(Debug, Clone, Default, Args)]
pub struct AssumeCommand {
    #[arg(
        value_name = "ROLE_ARN",
        help = "IAM role ARNs to assume (defaults to the profile's role_arn)"
    )]
    pub role_arns: Vec<String>,

    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json, help = "Output format")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ProcessCredentials<'a> {
    version: u8,
    access_key_id: &'a str,
    secret_access_key: &'a str,
    session_token: &'a str,
    expiration: String,
}

/// What one `assume` run works on, after merging flags with the profile
#[derive(Debug, Clone, PartialEq, Eq)]
struct Resolved {
    role_arns: Vec<String>,
    /// Profile providing the base credentials for STS
    base_profile: Option<String>,
    /// `--region`, then the profile's `region`. `None` leaves it to the SDK config.
    region: Option<String>,
}

/// Merge CLI arguments with the profile config.
///
/// Without explicit ARNs the profile's `role_arn` is assumed, and its
/// `source_profile` supplies the base credentials.
fn resolve(
    role_arns: Vec<String>,
    profile: &str,
    cli_region: Option<&str>,
    profile_config: Option<&ProfileConfig>,
) -> Result<Resolved> {
    let region = cli_region
        .map(str::to_string)
        .or_else(|| profile_config.and_then(|c| c.region.clone()));

    if !role_arns.is_empty() {
        return Ok(Resolved {
            role_arns,
            base_profile: Some(profile.to_string()),
            region,
        });
    }

    let role_arn = profile_config
        .and_then(|c| c.role_arn.clone())
        .with_context(|| {
            format!("Profile '{profile}' has no role_arn. Pass ROLE_ARN explicitly.")
        })?;

    Ok(Resolved {
        role_arns: vec![role_arn],
        base_profile: profile_config.and_then(|c| c.source_profile.clone()),
        region,
    })
}

/// Load the profile and resolve against it. The profile is only required
/// when no ARNs were given.
async fn resolve_with_config(
    role_arns: Vec<String>,
    profile: &str,
    cli_region: Option<&str>,
) -> Result<Resolved> {
    let loaded = config::load(profile).await;
    let profile_config = if role_arns.is_empty() {
        Some(loaded.with_context(|| {
            format!("Failed to load configuration for profile '{profile}'")
        })?)
    } else {
        loaded.ok()
    };

    resolve(role_arns, profile, cli_region, profile_config.as_ref())
}

impl AssumeCommand {
    pub async fn execute(self, profile: &str, region: Option<&str>) -> Result<()> {
        let resolved = resolve_with_config(self.role_arns, profile, region).await?;
        let base = sts::load_config(
            resolved.base_profile.as_deref(),
            resolved.region.as_deref(),
        )
        .await;

        let mut builder = RoleSessionCache::builder(Arc::new(StsRoleAssumer::new(base.clone())));
        if let Some(base_region) = base.region() {
            builder = builder.default_region(base_region.to_string());
        }
        let cache = builder.build();

        let options = resolved.region.map(AssumeRoleOptions::with_region);

        for role_arn in &resolved.role_arns {
            let assumed = cache
                .assume_role(role_arn, options.as_ref())
                .await
                .with_context(|| format!("Failed to assume role {role_arn}"))?;

            let output = match self.format {
                OutputFormat::Json => render_json(&assumed)?,
                OutputFormat::Env => render_env(&assumed),
            };
            println!("{output}");
        }

        info!(
            "Assumed {} role(s) with {} session(s) created",
            resolved.role_arns.len(),
            cache.len().await
        );
        Ok(())
    }
}

fn render_json(assumed: &AssumedRole) -> Result<String> {
    let credentials = assumed.credentials();
    let output = ProcessCredentials {
        version: CREDENTIAL_PROCESS_VERSION,
        access_key_id: &credentials.access_key_id,
        secret_access_key: &credentials.secret_access_key,
        session_token: &credentials.session_token,
        expiration: credentials.expiration_string(),
    };
    serde_json::to_string(&output).context("Failed to serialize credentials")
}

fn render_env(assumed: &AssumedRole) -> String {
    let credentials = assumed.credentials();
    let mut lines = vec![
        format!("# {}", assumed.session().role_arn),
        format!("export AWS_ACCESS_KEY_ID={}", credentials.access_key_id),
        format!("export AWS_SECRET_ACCESS_KEY={}", credentials.secret_access_key),
        format!("export AWS_SESSION_TOKEN={}", credentials.session_token),
        format!(
            "export AWS_CREDENTIAL_EXPIRATION={}",
            credentials.expiration_string()
        ),
    ];
    if let Some(region) = assumed.region() {
        lines.push(format!("export AWS_REGION={region}"));
    }
    lines.join("\n")
}
