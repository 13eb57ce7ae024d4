use std::{fmt::Display, str::FromStr};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::db_types::ProviderId;

static DOC_PATH_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^/?(?:commerce/v1/)?providers/(?P<provider>[^/]+)/(?P<coll>productDrafts|products)/(?P<product>[^/]+)(?:/(?:skus|SKUs)/(?P<sku>[^/]+))?/?$",
    )
    .expect("DocPath regex is invalid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Not a valid catalog path: {0}")]
pub struct DocPathError(String);

/// The address of a catalog record.
///
/// Paths are written as `providers/{provider}/products/{product}/skus/{sku}` (or `productDrafts` for drafts). An
/// optional `commerce/v1/` prefix is accepted when parsing, but never written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocPath {
    ProductDraft { provider_id: ProviderId, product_id: String },
    SkuDraft { provider_id: ProviderId, product_id: String, sku_id: String },
    Product { provider_id: ProviderId, product_id: String },
    Sku { provider_id: ProviderId, product_id: String, sku_id: String },
}

impl DocPath {
    pub fn provider_id(&self) -> &ProviderId {
        match self {
            DocPath::ProductDraft { provider_id, .. } |
            DocPath::SkuDraft { provider_id, .. } |
            DocPath::Product { provider_id, .. } |
            DocPath::Sku { provider_id, .. } => provider_id,
        }
    }

    pub fn product_id(&self) -> &str {
        match self {
            DocPath::ProductDraft { product_id, .. } |
            DocPath::SkuDraft { product_id, .. } |
            DocPath::Product { product_id, .. } |
            DocPath::Sku { product_id, .. } => product_id,
        }
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, DocPath::ProductDraft { .. } | DocPath::SkuDraft { .. })
    }
}

impl FromStr for DocPath {
    type Err = DocPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = DOC_PATH_REGEX.captures(s.trim()).ok_or_else(|| DocPathError(s.to_string()))?;
        let provider_id = ProviderId::from(&caps["provider"]);
        let product_id = caps["product"].to_string();
        let draft = &caps["coll"] == "productDrafts";
        let path = match (caps.name("sku").map(|m| m.as_str().to_string()), draft) {
            (None, true) => DocPath::ProductDraft { provider_id, product_id },
            (None, false) => DocPath::Product { provider_id, product_id },
            (Some(sku_id), true) => DocPath::SkuDraft { provider_id, product_id, sku_id },
            (Some(sku_id), false) => DocPath::Sku { provider_id, product_id, sku_id },
        };
        Ok(path)
    }
}

impl Display for DocPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocPath::ProductDraft { provider_id, product_id } => {
                write!(f, "providers/{provider_id}/productDrafts/{product_id}")
            },
            DocPath::SkuDraft { provider_id, product_id, sku_id } => {
                write!(f, "providers/{provider_id}/productDrafts/{product_id}/skus/{sku_id}")
            },
            DocPath::Product { provider_id, product_id } => write!(f, "providers/{provider_id}/products/{product_id}"),
            DocPath::Sku { provider_id, product_id, sku_id } => {
                write!(f, "providers/{provider_id}/products/{product_id}/skus/{sku_id}")
            },
        }
    }
}
