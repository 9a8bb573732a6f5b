//! Mode classification.
//!
//! `classify` turns the raw query plus the two sub-states (browse and pending
//! action) into the active [`Mode`]. It holds no state of its own: the mode is
//! recomputed on every keystroke and never stored.

use serde::{Deserialize, Serialize};

use super::browse::BrowseState;
use super::targeting::PendingAction;
use crate::services::calculator;

/// Query prefixes for create mode.
const CREATE_PREFIXES: &[&str] = &["/", ">"];
/// Query prefixes for assistant mode.
const ASSISTANT_PREFIXES: &[&str] = &["@", "nova "];
/// Query prefixes for goto mode.
const GOTO_PREFIXES: &[&str] = &["go ", "g ", "aller "];
const THEME_KEYWORD: &str = "theme";
const HISTORY_PREFIX: &str = "!";

/// The active interpretation of the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    Default,
    Search,
    Create,
    Assistant,
    Goto,
    Calculator,
    Theme,
    Browse,
    History,
    ActionTargeting,
}

/// Result of classifying a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub mode: Mode,
    /// Text left once the trigger is removed (the sanitized expression in calculator mode)
    pub sub_query: String,
}

impl Classification {
    fn new(mode: Mode, sub_query: impl Into<String>) -> Self {
        Self {
            mode,
            sub_query: sub_query.into(),
        }
    }
}

impl Default for Classification {
    fn default() -> Self {
        Self::new(Mode::Default, "")
    }
}

/// Classify a raw query against the current sub-states. First match wins:
/// calculator, create, assistant, goto, theme, history, action-targeting,
/// browse, default, search.
pub fn classify(
    raw_query: &str,
    browse: Option<&BrowseState>,
    pending: Option<&PendingAction>,
) -> Classification {
    if calculator::evaluate(raw_query).is_some() {
        return Classification::new(Mode::Calculator, calculator::sanitize(raw_query));
    }

    if let Some(rest) = strip_any_prefix(raw_query, CREATE_PREFIXES) {
        return Classification::new(Mode::Create, rest.trim());
    }
    if let Some(rest) = strip_any_prefix(raw_query, ASSISTANT_PREFIXES) {
        return Classification::new(Mode::Assistant, rest.trim());
    }
    if let Some(rest) = strip_any_prefix(raw_query, GOTO_PREFIXES) {
        return Classification::new(Mode::Goto, rest.trim());
    }
    if raw_query.eq_ignore_ascii_case(THEME_KEYWORD) {
        return Classification::new(Mode::Theme, "");
    }
    if let Some(rest) = strip_prefix_ignore_case(raw_query, "theme ") {
        return Classification::new(Mode::Theme, rest.trim());
    }
    if let Some(rest) = raw_query.strip_prefix(HISTORY_PREFIX) {
        return Classification::new(Mode::History, rest.trim());
    }

    let trimmed = raw_query.trim();
    if pending.is_some() {
        return Classification::new(Mode::ActionTargeting, trimmed);
    }
    if browse.is_some() {
        return Classification::new(Mode::Browse, trimmed);
    }
    if trimmed.is_empty() {
        return Classification::default();
    }
    Classification::new(Mode::Search, trimmed)
}

fn strip_any_prefix<'a>(query: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    prefixes
        .iter()
        .find_map(|prefix| strip_prefix_ignore_case(query, prefix))
}

/// ASCII case-insensitive `strip_prefix`
fn strip_prefix_ignore_case<'a>(query: &'a str, prefix: &str) -> Option<&'a str> {
    let head = query.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&query[prefix.len()..])
    } else {
        None
    }
}
