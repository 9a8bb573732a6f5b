//! Two-phase action targeting: pick a verb, then pick what it applies to.

use crate::catalog::{Catalog, CatalogItem, ItemKind};

/// A universal action waiting for its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAction {
    pub action_id: String,
}

impl PendingAction {
    pub fn new(action_id: impl Into<String>) -> Self {
        Self {
            action_id: action_id.into(),
        }
    }
}

/// Target handed to the host alongside the action id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionContext {
    pub space: String,
    pub module: Option<String>,
}

/// Resolve the context for a chosen target. Only spaces and modules qualify.
pub fn resolve_target(catalog: &Catalog, target: &CatalogItem) -> Option<ActionContext> {
    match target.kind {
        ItemKind::Space => Some(ActionContext {
            space: target.id.clone(),
            module: None,
        }),
        ItemKind::Module => {
            let space = catalog.space_for(target)?;
            Some(ActionContext {
                space: space.id.clone(),
                module: Some(target.id.clone()),
            })
        }
        _ => None,
    }
}

/// Candidate targets, in registration order, filtered by `query_lower`
pub fn candidates<'a>(catalog: &'a Catalog, query_lower: &str) -> impl Iterator<Item = &'a CatalogItem> + 'a {
    let query_lower = query_lower.to_string();
    catalog
        .spaces_and_modules()
        .filter(move |item| item.matches(&query_lower))
}
