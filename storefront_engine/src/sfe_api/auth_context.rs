use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{ActorId, Permission, ProviderId, Role},
    sfe_api::errors::{CommerceError, NO_PROVIDER_MESSAGE},
    traits::PermissionManagement,
};

/// Who is calling, resolved once per request from verified token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub actor_id: ActorId,
    pub provider_id: Option<ProviderId>,
    pub roles: Vec<Role>,
}

impl AuthContext {
    pub fn new(actor_id: ActorId) -> Self {
        Self { actor_id, provider_id: None, roles: vec![Role::User] }
    }

    pub fn with_provider(mut self, provider_id: ProviderId) -> Self {
        self.provider_id = Some(provider_id);
        self
    }

    pub fn with_roles(mut self, roles: Vec<Role>) -> Self {
        self.roles = roles;
        self
    }

    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }

    /// The provider the actor works for. Fails with `InvalidArgument` if there is none.
    pub fn require_provider(&self) -> Result<&ProviderId, CommerceError> {
        self.provider_id.as_ref().ok_or_else(|| CommerceError::InvalidArgument(NO_PROVIDER_MESSAGE.to_string()))
    }

    /// Succeeds if the actor belongs to `provider_id`, or is an admin.
    pub fn authorize_provider(&self, provider_id: &ProviderId) -> Result<(), CommerceError> {
        if self.is_admin() || self.provider_id.as_ref() == Some(provider_id) {
            Ok(())
        } else {
            debug!("🔐️ {} is not affiliated with provider {provider_id}", self.actor_id);
            Err(CommerceError::PermissionDenied(format!("You do not have access to provider {provider_id}.")))
        }
    }
}

/// Checks operator grants on top of provider affiliation.
#[derive(Debug, Clone)]
pub struct PermissionGuard<B> {
    db: B,
}

impl<B> PermissionGuard<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> PermissionGuard<B>
where B: PermissionManagement
{
    /// Succeeds if the actor belongs to `provider_id` and holds `required` (or a stronger permission) there.
    ///
    /// Admins always pass. The actor whose id is the provider id is the provider's implicit owner.
    pub async fn authorize_operator(
        &self,
        ctx: &AuthContext,
        provider_id: &ProviderId,
        required: Permission,
    ) -> Result<(), CommerceError> {
        ctx.authorize_provider(provider_id)?;
        if ctx.is_admin() || ctx.actor_id.as_str() == provider_id.as_str() {
            return Ok(());
        }
        let grants = self.db.fetch_operator_permissions(provider_id, &ctx.actor_id).await?;
        if grants.iter().any(|p| p.satisfies(required)) {
            Ok(())
        } else {
            info!("🔐️ {} lacks {required} permission on provider {provider_id}. Grants: {grants:?}", ctx.actor_id);
            Err(CommerceError::PermissionDenied(format!("You need {required} permission for this provider.")))
        }
    }
}
