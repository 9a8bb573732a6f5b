//! The catalog: every item the palette can address.
//!
//! The hierarchy is an ordered tree exactly three levels deep
//! (space → category → module). Siblings are sorted once at build time by
//! their explicit `order` field, declaration order breaking ties, and that
//! order is what every provider iterates. Flat lists (universal actions,
//! assistant commands, themes, quick links, recents) sit beside the tree.
//!
//! The engine never mutates a catalog on its own. Frequencies and the recent
//! feed are pushed in by the host.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::{CatalogConfig, NodeConfig, QuickLinkConfig};
use crate::error::{PaletteError, PaletteResult};
use crate::theme;

/// Universal actions as (id, label, icon, keywords), in display order.
pub const UNIVERSAL_ACTIONS: &[(&str, &str, &str, &[&str])] = &[
    ("create", "Créer", "plus", &["create", "new", "nouveau", "ajouter"]),
    ("edit", "Modifier", "pencil", &["edit", "éditer", "changer"]),
    ("import", "Importer", "upload", &["import", "charger"]),
    ("export", "Exporter", "download", &["export", "télécharger"]),
    ("analyze", "Analyser", "chart", &["analyze", "analyse", "rapport"]),
    ("publish", "Publier", "send", &["publish", "partager"]),
];

/// What a catalog item is, which decides how it is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemKind {
    Space,
    Category,
    Module,
    Action,
    AssistantCommand,
    Theme,
    Recent,
    QuickLink,
    CalculatorResult,
    History,
}

/// A single addressable entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    pub id: String,
    pub kind: ItemKind,
    pub label: String,
    pub sublabel: String,
    pub icon: String,
    pub shortcut: Option<String>,
    /// Navigation path or URL
    pub target: Option<String>,
    pub color: Option<String>,
    pub keywords: Vec<String>,
    pub parent: Option<String>,
    /// Host-supplied usage count
    pub frequency: u32,
    pub preview: Option<String>,
}

impl CatalogItem {
    pub fn new(id: impl Into<String>, kind: ItemKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            sublabel: String::new(),
            icon: String::new(),
            shortcut: None,
            target: None,
            color: None,
            keywords: Vec::new(),
            parent: None,
            frequency: 0,
            preview: None,
        }
    }

    /// A recent-activity entry pointing at `target`
    pub fn recent(id: impl Into<String>, label: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(id, ItemKind::Recent, label).with_target(target)
    }

    pub fn with_sublabel(mut self, sublabel: impl Into<String>) -> Self {
        self.sublabel = sublabel.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_preview(mut self, preview: impl Into<String>) -> Self {
        self.preview = Some(preview.into());
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    fn from_node(node: &NodeConfig, kind: ItemKind, parent: Option<&str>, default_target: Option<String>) -> Self {
        Self {
            id: node.id.clone(),
            kind,
            label: node.label.clone(),
            sublabel: node.sublabel.clone(),
            icon: node.icon.clone(),
            shortcut: node.shortcut.clone(),
            target: node.path.clone().or(default_target),
            color: node.color.clone(),
            keywords: node.keywords.clone(),
            parent: parent.map(str::to_string),
            frequency: node.frequency,
            preview: node.preview.clone(),
        }
    }

    fn from_quick_link(link: &QuickLinkConfig) -> Self {
        Self::new(link.id.clone(), ItemKind::QuickLink, link.label.clone())
            .with_sublabel(link.sublabel.clone())
            .with_icon(link.icon.clone())
            .with_target(link.url.clone())
            .with_keywords(link.keywords.iter().cloned())
    }

    /// Substring match on label, sublabel or any keyword.
    ///
    /// `query_lower` must already be lowercased. An empty query matches everything.
    pub fn matches(&self, query_lower: &str) -> bool {
        if query_lower.is_empty() {
            return true;
        }

        self.label.to_lowercase().contains(query_lower)
            || self.sublabel.to_lowercase().contains(query_lower)
            || self
                .keywords
                .iter()
                .any(|k| k.to_lowercase().contains(query_lower))
    }
}

/// A module group inside a space.
#[derive(Debug, Clone)]
pub struct CategoryNode {
    pub item: CatalogItem,
    pub modules: Vec<CatalogItem>,
}

/// A top-level space and its categories.
#[derive(Debug, Clone)]
pub struct SpaceNode {
    pub item: CatalogItem,
    pub categories: Vec<CategoryNode>,
}

/// The full read-only registry.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    spaces: Vec<SpaceNode>,
    actions: Vec<CatalogItem>,
    assistant_commands: Vec<CatalogItem>,
    themes: Vec<CatalogItem>,
    quick_links: Vec<CatalogItem>,
    recents: Vec<CatalogItem>,
}

impl Catalog {
    /// Build and validate a catalog from configuration.
    pub fn from_config(config: &CatalogConfig) -> PaletteResult<Self> {
        let mut seen = HashSet::new();
        let mut spaces = Vec::with_capacity(config.spaces.len());

        for space_cfg in ordered(&config.spaces, |s| s.node.order) {
            let space_id = register(&mut seen, &space_cfg.node, "space")?;
            let space_item = CatalogItem::from_node(
                &space_cfg.node,
                ItemKind::Space,
                None,
                Some(format!("/{}", space_id)),
            );

            let mut categories = Vec::with_capacity(space_cfg.categories.len());
            for category_cfg in ordered(&space_cfg.categories, |c| c.node.order) {
                let category_id = register(&mut seen, &category_cfg.node, "category")?;
                let category_item = CatalogItem::from_node(
                    &category_cfg.node,
                    ItemKind::Category,
                    Some(space_id.as_str()),
                    Some(format!("/{}/{}", space_id, category_id)),
                );

                let mut modules = Vec::with_capacity(category_cfg.modules.len());
                for module_cfg in ordered(&category_cfg.modules, |m| m.order) {
                    let module_id = register(&mut seen, module_cfg, "module")?;
                    modules.push(CatalogItem::from_node(
                        module_cfg,
                        ItemKind::Module,
                        Some(category_id.as_str()),
                        Some(format!("/{}/{}", space_id, module_id)),
                    ));
                }

                categories.push(CategoryNode {
                    item: category_item,
                    modules,
                });
            }

            spaces.push(SpaceNode {
                item: space_item,
                categories,
            });
        }

        let actions = match &config.actions {
            Some(nodes) => flat_list(nodes, ItemKind::Action)?,
            None => universal_actions(),
        };
        let themes = match &config.themes {
            Some(nodes) => flat_list(nodes, ItemKind::Theme)?,
            None => theme::theme_items(),
        };
        let assistant_commands = flat_list(&config.assistant_commands, ItemKind::AssistantCommand)?;
        let quick_links = config
            .quick_links
            .iter()
            .map(CatalogItem::from_quick_link)
            .collect();

        tracing::debug!(spaces = spaces.len(), "catalog built");

        Ok(Self {
            spaces,
            actions,
            assistant_commands,
            themes,
            quick_links,
            recents: Vec::new(),
        })
    }

    pub fn spaces(&self) -> &[SpaceNode] {
        &self.spaces
    }

    pub fn space(&self, space_id: &str) -> Option<&SpaceNode> {
        self.spaces.iter().find(|s| s.item.id == space_id)
    }

    pub fn category(&self, space_id: &str, category_id: &str) -> Option<&CategoryNode> {
        self.space(space_id)?
            .categories
            .iter()
            .find(|c| c.item.id == category_id)
    }

    /// The Nth top-level entry (0-based), used by quick-jump shortcuts
    pub fn top_level(&self, index: usize) -> Option<&CatalogItem> {
        self.spaces.get(index).map(|s| &s.item)
    }

    /// Every hierarchy node in registration order (pre-order walk)
    pub fn hierarchy(&self) -> impl Iterator<Item = &CatalogItem> {
        self.spaces.iter().flat_map(|space| {
            std::iter::once(&space.item).chain(space.categories.iter().flat_map(|category| {
                std::iter::once(&category.item).chain(category.modules.iter())
            }))
        })
    }

    /// Spaces and modules only, in registration order
    pub fn spaces_and_modules(&self) -> impl Iterator<Item = &CatalogItem> {
        self.hierarchy()
            .filter(|item| matches!(item.kind, ItemKind::Space | ItemKind::Module))
    }

    /// The searchable universe: hierarchy followed by quick links
    pub fn searchable(&self) -> impl Iterator<Item = &CatalogItem> {
        self.hierarchy().chain(self.quick_links.iter())
    }

    pub fn actions(&self) -> &[CatalogItem] {
        &self.actions
    }

    pub fn assistant_commands(&self) -> &[CatalogItem] {
        &self.assistant_commands
    }

    pub fn themes(&self) -> &[CatalogItem] {
        &self.themes
    }

    pub fn quick_links(&self) -> &[CatalogItem] {
        &self.quick_links
    }

    pub fn recents(&self) -> &[CatalogItem] {
        &self.recents
    }

    /// Look up a hierarchy node by id
    pub fn find(&self, id: &str) -> Option<&CatalogItem> {
        self.hierarchy().find(|item| item.id == id)
    }

    /// The space a hierarchy node belongs to (a space is its own space)
    pub fn space_for(&self, item: &CatalogItem) -> Option<&CatalogItem> {
        match item.kind {
            ItemKind::Space => self.space(&item.id).map(|s| &s.item),
            ItemKind::Category => self.space(item.parent.as_deref()?).map(|s| &s.item),
            ItemKind::Module => {
                let category_id = item.parent.as_deref()?;
                self.spaces
                    .iter()
                    .find(|s| s.categories.iter().any(|c| c.item.id == category_id))
                    .map(|s| &s.item)
            }
            _ => None,
        }
    }

    /// Replace the recent-activity feed. Items are re-tagged as [`ItemKind::Recent`].
    pub fn set_recents(&mut self, recents: Vec<CatalogItem>) {
        self.recents = recents
            .into_iter()
            .map(|mut item| {
                item.kind = ItemKind::Recent;
                item
            })
            .collect();
    }

    /// Set the frequency score of every item with `id`. Returns whether one was found.
    pub fn set_frequency(&mut self, id: &str, frequency: u32) -> bool {
        let mut found = false;
        for item in self.items_mut().filter(|item| item.id == id) {
            item.frequency = frequency;
            found = true;
        }
        found
    }

    /// Apply a batch of (id, frequency) scores
    pub fn apply_frequencies<I, S>(&mut self, scores: I)
    where
        I: IntoIterator<Item = (S, u32)>,
        S: AsRef<str>,
    {
        for (id, frequency) in scores {
            self.set_frequency(id.as_ref(), frequency);
        }
    }

    fn items_mut(&mut self) -> impl Iterator<Item = &mut CatalogItem> {
        let hierarchy = self.spaces.iter_mut().flat_map(|space| {
            std::iter::once(&mut space.item).chain(space.categories.iter_mut().flat_map(|category| {
                std::iter::once(&mut category.item).chain(category.modules.iter_mut())
            }))
        });
        hierarchy
            .chain(self.actions.iter_mut())
            .chain(self.assistant_commands.iter_mut())
            .chain(self.themes.iter_mut())
            .chain(self.quick_links.iter_mut())
    }
}

/// The built-in universal verbs
pub fn universal_actions() -> Vec<CatalogItem> {
    UNIVERSAL_ACTIONS
        .iter()
        .map(|(id, label, icon, keywords)| {
            CatalogItem::new(*id, ItemKind::Action, *label)
                .with_icon(*icon)
                .with_keywords(keywords.iter().copied())
        })
        .collect()
}

/// Stable sort by explicit order; nodes without one sort as 0.
fn ordered<T>(nodes: &[T], order: impl Fn(&T) -> Option<i32>) -> Vec<&T> {
    let mut sorted: Vec<&T> = nodes.iter().collect();
    sorted.sort_by_key(|node| order(node).unwrap_or(0));
    sorted
}

fn register(seen: &mut HashSet<String>, node: &NodeConfig, what: &str) -> PaletteResult<String> {
    if node.id.trim().is_empty() {
        return Err(PaletteError::Catalog(format!(
            "{} '{}' has an empty id",
            what, node.label
        )));
    }
    if node.label.trim().is_empty() {
        return Err(PaletteError::Catalog(format!("{} '{}' has an empty label", what, node.id)));
    }
    if !seen.insert(node.id.clone()) {
        return Err(PaletteError::Catalog(format!("duplicate id '{}'", node.id)));
    }
    Ok(node.id.clone())
}

fn flat_list(nodes: &[NodeConfig], kind: ItemKind) -> PaletteResult<Vec<CatalogItem>> {
    let mut seen = HashSet::new();
    ordered(nodes, |n| n.order)
        .into_iter()
        .map(|node| {
            register(&mut seen, node, "entry")?;
            Ok(CatalogItem::from_node(node, kind, None, None))
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::fixtures::{catalog_config, node, sample};
    use super::*;
    use crate::config::SpaceConfig;

    #[test]
    fn test_hierarchy_preorder() {
        let catalog = sample();
        let ids: Vec<&str> = catalog.hierarchy().map(|i| i.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "projects", "money", "finance", "invoices", "site", "planning", "progress",
                "admin", "people", "users"
            ]
        );
    }

    #[test]
    fn test_default_targets_and_parents() {
        let catalog = sample();
        let finance = catalog.find("finance").unwrap();
        assert_eq!(finance.target.as_deref(), Some("/projects/finance"));
        assert_eq!(finance.parent.as_deref(), Some("money"));
        assert_eq!(catalog.find("money").unwrap().target.as_deref(), Some("/projects/money"));
        assert_eq!(catalog.space_for(finance).unwrap().id, "projects");
    }

    #[test]
    fn test_explicit_order_field() {
        let mut config = catalog_config();
        config.spaces[1].node.order = Some(-1);
        let catalog = Catalog::from_config(&config).unwrap();
        assert_eq!(catalog.top_level(0).unwrap().id, "admin");
        assert_eq!(catalog.top_level(1).unwrap().id, "projects");
        assert!(catalog.top_level(2).is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut config = catalog_config();
        config.spaces.push(SpaceConfig {
            node: node("finance", "Doublon"),
            categories: Vec::new(),
        });
        let err = Catalog::from_config(&config).unwrap_err();
        assert!(matches!(err, PaletteError::Catalog(_)));
    }

    #[test]
    fn test_builtin_lists() {
        let catalog = sample();
        let labels: Vec<&str> = catalog.actions().iter().map(|a| a.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Créer", "Modifier", "Importer", "Exporter", "Analyser", "Publier"]
        );
        assert_eq!(catalog.themes().len(), 3);
        assert_eq!(catalog.quick_links()[0].kind, ItemKind::QuickLink);
    }

    #[test]
    fn test_frequency_updates() {
        let mut catalog = sample();
        assert!(catalog.set_frequency("planning", 9));
        assert!(!catalog.set_frequency("missing", 1));
        catalog.apply_frequencies([("users", 4u32)]);

        assert_eq!(catalog.find("planning").unwrap().frequency, 9);
        assert_eq!(catalog.find("users").unwrap().frequency, 4);
    }

    #[test]
    fn test_matches() {
        let catalog = sample();
        let progress = catalog.find("progress").unwrap();
        assert!(progress.matches("avance"));
        assert!(progress.matches("lots"));
        assert!(!progress.matches("finance"));
        assert!(catalog.find("projects").unwrap().matches("chantier"));
    }

    #[test]
    fn test_recents_retagged() {
        let mut catalog = sample();
        let item = CatalogItem::new("r1", ItemKind::Module, "Finance").with_target("/projects/finance");
        catalog.set_recents(vec![item]);
        assert_eq!(catalog.recents()[0].kind, ItemKind::Recent);
    }
}
