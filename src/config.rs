use crate::constants;
use anyhow::{Context, Result};
use ini::{Ini, Properties};
use std::path::PathBuf;

/// Role settings of one profile in the shared AWS config file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileConfig {
    pub role_arn: Option<String>,
    pub region: Option<String>,
    pub source_profile: Option<String>,
}

impl ProfileConfig {
    fn from_ini_section(section: &Properties) -> Self {
        let value = |key: &str| {
            section
                .get(key)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        };

        Self {
            role_arn: value("role_arn"),
            region: value("region"),
            source_profile: value("source_profile"),
        }
    }
}

fn section_name(profile: &str) -> String {
    if profile == "default" {
        profile.to_string()
    } else {
        format!("profile {profile}")
    }
}

pub async fn load(profile: &str) -> Result<ProfileConfig> {
    let path = get_config_path()?;
    let ini = Ini::load_from_file(&path)
        .with_context(|| format!("Failed to load AWS config file: {}", path.display()))?;

    let section = ini
        .section(Some(section_name(profile)))
        .with_context(|| format!("Profile '{profile}' not found in config"))?;

    Ok(ProfileConfig::from_ini_section(section))
}

fn get_config_path() -> Result<PathBuf> {
    constants::get_aws_config_path().context("Failed to determine AWS config path")
}
