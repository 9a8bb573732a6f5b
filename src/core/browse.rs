//! Hierarchical drill-down: spaces → categories → modules.
//!
//! The level is encoded in the enum variant, so a categories level always
//! knows its space and a modules level always knows both ids.

use crate::catalog::{Catalog, CatalogItem, ItemKind};

/// Depth within the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseLevel {
    Spaces,
    Categories,
    Modules,
}

/// Where the navigator currently stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BrowseState {
    #[default]
    Spaces,
    Categories {
        space_id: String,
    },
    Modules {
        space_id: String,
        category_id: String,
    },
}

/// Outcome of selecting an item while browsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseStep {
    /// Moved one level deeper
    Descended,
    /// A module was picked; the caller commits it
    Commit,
    /// The item does not belong to the current level
    Ignored,
}

impl BrowseState {
    /// Open the navigator directly on a category's modules
    pub fn at_category(space_id: impl Into<String>, category_id: impl Into<String>) -> Self {
        BrowseState::Modules {
            space_id: space_id.into(),
            category_id: category_id.into(),
        }
    }

    pub fn level(&self) -> BrowseLevel {
        match self {
            BrowseState::Spaces => BrowseLevel::Spaces,
            BrowseState::Categories { .. } => BrowseLevel::Categories,
            BrowseState::Modules { .. } => BrowseLevel::Modules,
        }
    }

    pub fn current_space_id(&self) -> Option<&str> {
        match self {
            BrowseState::Spaces => None,
            BrowseState::Categories { space_id } | BrowseState::Modules { space_id, .. } => {
                Some(space_id.as_str())
            }
        }
    }

    pub fn current_category_id(&self) -> Option<&str> {
        match self {
            BrowseState::Modules { category_id, .. } => Some(category_id.as_str()),
            _ => None,
        }
    }

    /// Apply a selection at the current level.
    pub fn select(&mut self, item: &CatalogItem) -> BrowseStep {
        let next = match (&*self, item.kind) {
            (BrowseState::Spaces, ItemKind::Space) => BrowseState::Categories {
                space_id: item.id.clone(),
            },
            (BrowseState::Categories { space_id }, ItemKind::Category) => BrowseState::Modules {
                space_id: space_id.clone(),
                category_id: item.id.clone(),
            },
            (BrowseState::Modules { .. }, ItemKind::Module) => return BrowseStep::Commit,
            _ => return BrowseStep::Ignored,
        };

        tracing::debug!(from = ?self.level(), to = ?next.level(), id = %item.id, "browse descend");
        *self = next;
        BrowseStep::Descended
    }

    /// Go back exactly one level. Returns false when already at the top.
    pub fn pop(&mut self) -> bool {
        let next = match &*self {
            BrowseState::Spaces => return false,
            BrowseState::Categories { .. } => BrowseState::Spaces,
            BrowseState::Modules { space_id, .. } => BrowseState::Categories {
                space_id: space_id.clone(),
            },
        };
        *self = next;
        true
    }

    /// Items at the current level, in hierarchy order, filtered by `query_lower`
    pub fn items<'a>(&self, catalog: &'a Catalog, query_lower: &str) -> Vec<&'a CatalogItem> {
        let items: Vec<&CatalogItem> = match self {
            BrowseState::Spaces => catalog.spaces().iter().map(|s| &s.item).collect(),
            BrowseState::Categories { space_id } => catalog
                .space(space_id)
                .map(|s| s.categories.iter().map(|c| &c.item).collect())
                .unwrap_or_default(),
            BrowseState::Modules {
                space_id,
                category_id,
            } => catalog
                .category(space_id, category_id)
                .map(|c| c.modules.iter().collect())
                .unwrap_or_default(),
        };

        items
            .into_iter()
            .filter(|item| item.matches(query_lower))
            .collect()
    }

    /// Labels of the current space and category, outermost first
    pub fn breadcrumb<'a>(&self, catalog: &'a Catalog) -> Vec<&'a CatalogItem> {
        let mut trail = Vec::with_capacity(2);
        if let Some(space) = self.current_space_id().and_then(|id| catalog.space(id)) {
            trail.push(&space.item);
            if let Some(category) = self
                .current_category_id()
                .and_then(|id| catalog.category(&space.item.id, id))
            {
                trail.push(&category.item);
            }
        }
        trail
    }
}
