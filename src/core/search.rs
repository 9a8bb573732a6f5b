//! Result providers for every mode.
//!
//! [`SearchEngine::resolve`] is a pure function of the catalog, the history
//! and the classification: the same inputs always give the same result set.
//! Catalog search is plain substring containment (label, sublabel, keywords)
//! ranked by host-supplied frequency, ties kept in registration order.

use crate::catalog::{Catalog, CatalogItem, ItemKind};
use crate::config::Config;
use crate::services::calculator;
use crate::services::format::NumberLocale;
use crate::services::history::CommandHistory;

use super::browse::{BrowseLevel, BrowseState};
use super::mode::{Classification, Mode};
use super::targeting;

/// A titled group of results. The home view has several, every other mode one.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSection {
    pub title: &'static str,
    pub items: Vec<CatalogItem>,
}

/// Ordered sections, flattened for keyboard selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub sections: Vec<ResultSection>,
}

impl ResultSet {
    fn single(title: &'static str, items: Vec<CatalogItem>) -> Self {
        let mut set = Self::default();
        set.push(title, items);
        set
    }

    /// Add a section; empty ones are dropped.
    fn push(&mut self, title: &'static str, items: Vec<CatalogItem>) {
        if !items.is_empty() {
            self.sections.push(ResultSection { title, items });
        }
    }

    /// Every item, section after section
    pub fn flatten(&self) -> Vec<CatalogItem> {
        self.sections
            .iter()
            .flat_map(|s| s.items.iter().cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Turns a classification into results.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    max_results: usize,
    recent_limit: usize,
    locale: NumberLocale,
}

impl SearchEngine {
    /// Create a new search engine instance.
    pub fn new(config: &Config) -> Self {
        Self {
            max_results: config.behavior.max_results as usize,
            recent_limit: config.behavior.recent_limit as usize,
            locale: config.behavior.number_locale,
        }
    }

    /// Compute the results for the active mode.
    pub fn resolve(
        &self,
        catalog: &Catalog,
        history: &CommandHistory,
        browse: Option<&BrowseState>,
        classification: &Classification,
    ) -> ResultSet {
        let query_lower = classification.sub_query.to_lowercase();

        match classification.mode {
            Mode::Default => self.home(catalog),
            Mode::Search => ResultSet::single(
                "Résultats",
                rank(catalog.searchable(), &query_lower, self.max_results),
            ),
            Mode::Goto => ResultSet::single(
                "Aller à",
                rank(catalog.spaces_and_modules(), &query_lower, self.max_results),
            ),
            Mode::Create => ResultSet::single("Actions", filter(catalog.actions(), &query_lower)),
            Mode::Assistant => ResultSet::single(
                "Assistant",
                filter(catalog.assistant_commands(), &query_lower),
            ),
            Mode::Theme => ResultSet::single("Thèmes", filter(catalog.themes(), &query_lower)),
            Mode::Calculator => ResultSet::single(
                "Calcul",
                self.calculation(&classification.sub_query).into_iter().collect(),
            ),
            Mode::History => ResultSet::single("Historique", history_items(history, &query_lower)),
            Mode::ActionTargeting => ResultSet::single(
                "Choisir une cible",
                targeting::candidates(catalog, &query_lower)
                    .take(self.max_results)
                    .cloned()
                    .collect(),
            ),
            Mode::Browse => {
                let state = browse.cloned().unwrap_or_default();
                let title = match state.level() {
                    BrowseLevel::Spaces => "Espaces",
                    BrowseLevel::Categories => "Catégories",
                    BrowseLevel::Modules => "Modules",
                };
                ResultSet::single(
                    title,
                    state.items(catalog, &query_lower).into_iter().cloned().collect(),
                )
            }
        }
    }

    /// Sectioned home view: recents, top-level spaces, quick actions, quick links
    fn home(&self, catalog: &Catalog) -> ResultSet {
        let mut set = ResultSet::default();
        set.push(
            "Récents",
            catalog.recents().iter().take(self.recent_limit).cloned().collect(),
        );
        set.push(
            "Espaces",
            catalog.spaces().iter().map(|s| s.item.clone()).collect(),
        );
        set.push("Actions rapides", catalog.actions().to_vec());
        set.push("Liens rapides", catalog.quick_links().to_vec());
        set
    }

    fn calculation(&self, expression: &str) -> Option<CatalogItem> {
        let calc = calculator::calculate(expression, self.locale)?;
        // The raw value travels as the item target; it is what gets copied
        Some(
            CatalogItem::new("calculator", ItemKind::CalculatorResult, calc.display)
                .with_sublabel(calc.expression)
                .with_icon("calculator")
                .with_target(calc.raw),
        )
    }
}

/// Match and rank: descending frequency, registration order on ties, capped.
pub fn rank<'a>(
    items: impl Iterator<Item = &'a CatalogItem>,
    query_lower: &str,
    max_results: usize,
) -> Vec<CatalogItem> {
    let mut matched: Vec<&CatalogItem> = items.filter(|item| item.matches(query_lower)).collect();
    // sort_by is stable, so equal frequencies keep their registration order
    matched.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    matched.into_iter().take(max_results).cloned().collect()
}

/// Match without reordering, for fixed lists
pub fn filter(items: &[CatalogItem], query_lower: &str) -> Vec<CatalogItem> {
    items
        .iter()
        .filter(|item| item.matches(query_lower))
        .cloned()
        .collect()
}

fn history_items(history: &CommandHistory, query_lower: &str) -> Vec<CatalogItem> {
    history
        .search(query_lower)
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            CatalogItem::new(format!("history:{}", i), ItemKind::History, entry.query.clone())
                .with_icon("history")
                .with_target(entry.query.clone())
        })
        .collect()
}
