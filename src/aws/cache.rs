use std::{collections::HashMap, fmt, sync::Arc};

use aws_config::{Region, SdkConfig};
use aws_credential_types::provider::SharedCredentialsProvider;
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, info};

use super::{
    Credentials,
    session::{RoleSession, session_name_for},
    sts::{AssumeRoleRequest, RoleAssumer},
};
use crate::error::Result;

type SessionCell = Arc<OnceCell<Arc<RoleSession>>>;

/// Options applied on every `assume_role` call, cached or not
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssumeRoleOptions {
    pub region: Option<String>,
}

impl AssumeRoleOptions {
    pub fn with_region(region: impl Into<String>) -> Self {
        Self {
            region: Some(region.into()),
        }
    }

    fn region(&self) -> Option<&str> {
        self.region.as_deref().filter(|r| !r.is_empty())
    }
}

/// Result of [`RoleSessionCache::assume_role`]
///
/// Holds the shared session and the region the caller asked for. Install it
/// into SDK clients with [`AssumedRole::sdk_config`] or
/// [`AssumedRole::credentials_provider`].
#[derive(Debug, Clone)]
pub struct AssumedRole {
    session: Arc<RoleSession>,
    region: Option<String>,
}

impl AssumedRole {
    pub(crate) fn new(session: Arc<RoleSession>, region: Option<String>) -> Self {
        Self { session, region }
    }

    pub fn session(&self) -> &Arc<RoleSession> {
        &self.session
    }

    pub fn credentials(&self) -> &Credentials {
        &self.session.credentials
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn credentials_provider(&self) -> SharedCredentialsProvider {
        SharedCredentialsProvider::new(self.credentials().to_sdk_credentials())
    }

    /// Copy of `base` that authenticates with this session's credentials
    /// and, when one is known, targets this role's region.
    pub fn sdk_config(&self, base: &SdkConfig) -> SdkConfig {
        let mut builder = base
            .clone()
            .into_builder()
            .credentials_provider(self.credentials_provider());
        if let Some(region) = &self.region {
            builder = builder.region(Region::new(region.clone()));
        }
        builder.build()
    }
}

/// Cache of assumed-role sessions keyed by role ARN.
///
/// Keys are compared as exact strings. A session is created on the first
/// successful call for an ARN and kept for the lifetime of the cache, so
/// expired credentials are never renewed. Concurrent callers for the same
/// uncached ARN share a single STS request.
pub struct RoleSessionCache {
    assumer: Arc<dyn RoleAssumer>,
    default_region: Option<String>,
    sessions: RwLock<HashMap<String, SessionCell>>,
}

impl fmt::Debug for RoleSessionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoleSessionCache")
            .field("default_region", &self.default_region)
            .finish_non_exhaustive()
    }
}

impl RoleSessionCache {
    pub fn new(assumer: Arc<dyn RoleAssumer>) -> Self {
        Self::builder(assumer).build()
    }

    pub fn builder(assumer: Arc<dyn RoleAssumer>) -> Builder {
        Builder {
            assumer,
            default_region: None,
        }
    }

    /// Return the cached session for `role_arn`, or assume the role and cache it.
    ///
    /// A region in `options` is reported on the result whether or not the
    /// session was cached, and is used for the STS call on a cache miss.
    pub async fn assume_role(
        &self,
        role_arn: &str,
        options: Option<&AssumeRoleOptions>,
    ) -> Result<AssumedRole> {
        let region = options
            .and_then(AssumeRoleOptions::region)
            .map(str::to_string)
            .or_else(|| self.default_region.clone());

        // Malformed ARNs can never be cached, so they never get a cell
        let session_name = session_name_for(role_arn)?;

        let cell = self.cell(role_arn).await;
        if let Some(session) = cell.get() {
            debug!("Loading cached session for {}", role_arn);
            return Ok(AssumedRole::new(Arc::clone(session), region));
        }

        let result = cell
            .get_or_try_init(|| self.create_session(role_arn, session_name, region.as_deref()))
            .await
            .map(Arc::clone);

        match result {
            Ok(session) => Ok(AssumedRole::new(session, region)),
            Err(e) => {
                self.discard_failed(role_arn, cell).await;
                Err(e)
            }
        }
    }

    /// Cached session for `role_arn`, without contacting STS
    pub async fn get(&self, role_arn: &str) -> Option<Arc<RoleSession>> {
        self.sessions
            .read()
            .await
            .get(role_arn)
            .and_then(|cell| cell.get().cloned())
    }

    pub async fn contains(&self, role_arn: &str) -> bool {
        self.get(role_arn).await.is_some()
    }

    /// Number of cached sessions. Requests still in flight are not counted.
    pub async fn len(&self) -> usize {
        self.sessions
            .read()
            .await
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Role ARNs with a cached session, sorted
    pub async fn role_arns(&self) -> Vec<String> {
        let mut arns: Vec<String> = self
            .sessions
            .read()
            .await
            .iter()
            .filter(|(_, cell)| cell.initialized())
            .map(|(arn, _)| arn.clone())
            .collect();
        arns.sort();
        arns
    }

    async fn cell(&self, role_arn: &str) -> SessionCell {
        if let Some(cell) = self.sessions.read().await.get(role_arn) {
            return Arc::clone(cell);
        }

        let mut sessions = self.sessions.write().await;
        Arc::clone(sessions.entry(role_arn.to_string()).or_default())
    }

    /// Drop the empty cell left behind by a failed request.
    ///
    /// The entry stays while another caller still holds the cell: that
    /// caller is retrying inside it, and removing the entry would let a
    /// newcomer start a second request for the same ARN.
    async fn discard_failed(&self, role_arn: &str, cell: SessionCell) {
        let mut sessions = self.sessions.write().await;
        let unused = sessions.get(role_arn).is_some_and(|current| {
            Arc::ptr_eq(current, &cell) && !cell.initialized() && Arc::strong_count(&cell) == 2
        });
        if unused {
            sessions.remove(role_arn);
        }
    }

    async fn create_session(
        &self,
        role_arn: &str,
        session_name: String,
        region: Option<&str>,
    ) -> Result<Arc<RoleSession>> {
        info!("Creating new role session for {}", role_arn);

        let request = AssumeRoleRequest {
            role_arn: role_arn.to_string(),
            session_name,
            region: region.map(str::to_string),
        };
        let credentials = self.assumer.assume_role(&request).await?;
        debug!(
            "Assumed {} with access key id {}",
            role_arn, credentials.access_key_id
        );

        Ok(Arc::new(RoleSession {
            role_arn: request.role_arn,
            session_name: request.session_name,
            credentials,
        }))
    }
}

/// Builder for [`RoleSessionCache`]
pub struct Builder {
    assumer: Arc<dyn RoleAssumer>,
    default_region: Option<String>,
}

impl Builder {
    /// Region reported on results when the call's options carry none
    pub fn default_region(mut self, region: impl Into<String>) -> Self {
        self.default_region = Some(region.into());
        self
    }

    pub fn build(self) -> RoleSessionCache {
        RoleSessionCache {
            assumer: self.assumer,
            default_region: self.default_region,
            sessions: RwLock::new(HashMap::new()),
        }
    }
}
