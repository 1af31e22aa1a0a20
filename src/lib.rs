//! Assume AWS IAM roles via STS and keep one session per role ARN.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use rolecache::{AssumeRoleOptions, RoleSessionCache, StsRoleAssumer, aws::sts};
//!
//! # async fn run() -> rolecache::Result<()> {
//! let base = sts::load_config(None, None).await;
//! let cache = RoleSessionCache::new(Arc::new(StsRoleAssumer::new(base.clone())));
//!
//! let options = AssumeRoleOptions::with_region("eu-west-1");
//! let assumed = cache
//!     .assume_role("arn:aws:iam::123456789012:role/Deployer", Some(&options))
//!     .await?;
//! let config = assumed.sdk_config(&base);
//! # let _ = config;
//! # Ok(())
//! # }
//! ```

pub mod aws;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;

pub use aws::cache::{AssumeRoleOptions, AssumedRole, RoleSessionCache};
pub use aws::session::RoleSession;
pub use aws::sts::{AssumeRoleRequest, RoleAssumer, StsRoleAssumer};
pub use aws::Credentials;
pub use error::{Error, Result};
