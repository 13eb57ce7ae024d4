use crate::{
    db_types::{ActorId, Permission, ProviderId},
    traits::AccountApiError,
};

/// Operator grants. An operator is an actor allowed to act on behalf of a provider.
#[allow(async_fn_in_trait)]
pub trait PermissionManagement {
    async fn fetch_operator_permissions(
        &self,
        provider_id: &ProviderId,
        actor_id: &ActorId,
    ) -> Result<Vec<Permission>, AccountApiError>;

    /// Adds the permissions to the operator's grants. Existing grants are kept.
    async fn grant_operator_permissions(
        &self,
        provider_id: &ProviderId,
        actor_id: &ActorId,
        permissions: &[Permission],
    ) -> Result<(), AccountApiError>;
}
