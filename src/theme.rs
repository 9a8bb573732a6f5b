//! Built-in theme entries offered by the `theme` mode.
//!
//! The palette only picks a theme id; applying it is the host's job.

use crate::catalog::{CatalogItem, ItemKind};

/// Get the list of available themes as (id, label, icon)
pub fn available_themes() -> &'static [(&'static str, &'static str, &'static str)] {
    &[
        ("light", "Thème clair", "sun"),
        ("dark", "Thème sombre", "moon"),
        ("system", "Thème du système", "monitor"),
    ]
}

/// Theme catalog items in their fixed display order
pub fn theme_items() -> Vec<CatalogItem> {
    available_themes()
        .iter()
        .map(|(id, label, icon)| {
            CatalogItem::new(*id, ItemKind::Theme, *label)
                .with_icon(*icon)
                .with_keywords([*id, "theme"])
        })
        .collect()
}
