use crate::traits::{AccountManagement, CatalogManagement, OrderLedger, OrderQueries, PermissionManagement};

/// Everything the storefront needs from a storage backend, in one bound.
///
/// Implemented for free by any cloneable type that implements the individual backend traits.
pub trait StorefrontDatabase:
    Clone + OrderLedger + OrderQueries + CatalogManagement + AccountManagement + PermissionManagement
{
    /// The URL of the database
    fn url(&self) -> &str;
}
