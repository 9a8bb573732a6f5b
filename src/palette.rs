//! The palette controller.
//!
//! [`Palette`] owns the transient UI state (query, browse position, pending
//! action, selection, history recall) and turns key presses into state changes
//! or host dispatches. Results are never cached across state changes: every
//! mutation ends in a refresh, which reclassifies the query and
//! resolves a fresh result set.

use crate::catalog::{Catalog, CatalogItem, ItemKind};
use crate::config::Config;
use crate::core::browse::{BrowseState, BrowseStep};
use crate::core::mode::{classify, Classification, Mode};
use crate::core::search::{ResultSection, SearchEngine};
use crate::core::selection::SelectionState;
use crate::core::targeting::{self, PendingAction};
use crate::error::PaletteResult;
use crate::executor::{self, ExecutionAction, Host};
use crate::services::history::{CommandHistory, HistoryEntry, RecallCursor};
use crate::shortcuts::{self, GlobalCommand, InstanceId, ShortcutRegistry};

/// Keys the palette reacts to while focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    Enter,
    Escape,
    Tab,
    Backspace,
}

/// What a key press or commit did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing changed
    Ignored,
    /// Palette state changed; the host should re-render
    Updated,
    /// An action was handed to the host and the palette closed
    Executed(ExecutionAction),
    /// The palette closed without executing anything
    Closed,
}

pub struct Palette {
    config: Config,
    catalog: Catalog,
    engine: SearchEngine,
    history: CommandHistory,
    instance: Option<InstanceId>,
    is_open: bool,
    query: String,
    browse: Option<BrowseState>,
    pending: Option<PendingAction>,
    classification: Classification,
    sections: Vec<ResultSection>,
    selection: SelectionState,
    recall: RecallCursor,
}

impl Palette {
    /// Palette over `catalog` with default settings
    pub fn new(catalog: Catalog) -> Self {
        Self::with_parts(Config::default(), catalog)
    }

    /// Validate the config and build the catalog it describes
    pub fn from_config(mut config: Config) -> PaletteResult<Self> {
        config.validate();
        let catalog = Catalog::from_config(&config.catalog)?;
        Ok(Self::with_parts(config, catalog))
    }

    fn with_parts(config: Config, catalog: Catalog) -> Self {
        Self {
            engine: SearchEngine::new(&config),
            history: CommandHistory::new(config.behavior.history_capacity as usize),
            config,
            catalog,
            instance: None,
            is_open: false,
            query: String::new(),
            browse: None,
            pending: None,
            classification: Classification::default(),
            sections: Vec::new(),
            selection: SelectionState::default(),
            recall: RecallCursor::default(),
        }
    }

    // ---- lifecycle ----

    /// Show the palette with fresh state
    pub fn open(&mut self) {
        self.reset();
        self.is_open = true;
        self.refresh();
        tracing::debug!("palette opened");
    }

    /// Hide the palette, dropping all transient state
    pub fn close<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.hide();
        host.close();
    }

    pub fn toggle<H: Host + ?Sized>(&mut self, host: &mut H) -> Outcome {
        if self.is_open {
            self.close(host);
            Outcome::Closed
        } else {
            self.open();
            Outcome::Updated
        }
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    // ---- input ----

    /// Replace the query text. Ends any history recall in progress.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.recall.reset();
        self.refresh();
    }

    pub fn handle_key<H: Host + ?Sized>(&mut self, key: Key, host: &mut H) -> Outcome {
        if !self.is_open {
            return Outcome::Ignored;
        }

        match key {
            Key::ArrowDown => {
                self.selection.move_down();
                // Leaving the top row hands the keys back to the result list
                if !self.selection.at_top() {
                    self.recall.reset();
                }
                Outcome::Updated
            }
            Key::ArrowUp => {
                if self.selection.at_top() {
                    return self.recall_older();
                }
                self.selection.move_up();
                Outcome::Updated
            }
            Key::Enter => self.commit(host),
            Key::Escape => {
                if self.pending.take().is_some() {
                    tracing::debug!("pending action cancelled");
                    self.clear_query();
                    Outcome::Updated
                } else if self.browse.as_mut().is_some_and(BrowseState::pop) {
                    self.clear_query();
                    Outcome::Updated
                } else {
                    self.close(host);
                    Outcome::Closed
                }
            }
            Key::Tab => {
                self.browse = match self.browse {
                    Some(_) => None,
                    None => Some(BrowseState::default()),
                };
                self.pending = None;
                tracing::debug!(browsing = self.browse.is_some(), "browse toggled");
                self.clear_query();
                Outcome::Updated
            }
            Key::Backspace => {
                if self.query.pop().is_some() {
                    self.recall.reset();
                    self.refresh();
                    return Outcome::Updated;
                }
                if self.pending.take().is_some() {
                    self.refresh();
                    return Outcome::Updated;
                }
                match self.browse.as_mut() {
                    Some(state) => {
                        if !state.pop() {
                            self.browse = None;
                        }
                        self.refresh();
                        Outcome::Updated
                    }
                    None => Outcome::Ignored,
                }
            }
        }
    }

    /// Route a global shortcut to this palette
    pub fn handle_global<H: Host + ?Sized>(&mut self, command: GlobalCommand, host: &mut H) -> Outcome {
        match command {
            GlobalCommand::Toggle => self.toggle(host),
            GlobalCommand::QuickJump(n) => {
                let Some(item) = n.checked_sub(1).and_then(|i| self.catalog.top_level(i)) else {
                    tracing::debug!(n, "quick-jump has no target");
                    return Outcome::Ignored;
                };
                match ExecutionAction::for_item(item, "") {
                    Some(action) => self.execute(action, host),
                    None => Outcome::Ignored,
                }
            }
        }
    }

    /// Commit the selected row. No-op on an empty list.
    pub fn commit<H: Host + ?Sized>(&mut self, host: &mut H) -> Outcome {
        match self.selection.selected().cloned() {
            Some(item) => self.commit_item(item, host),
            None => Outcome::Ignored,
        }
    }

    /// Select a row and commit it (mouse click)
    pub fn commit_index<H: Host + ?Sized>(&mut self, index: usize, host: &mut H) -> Outcome {
        if self.selection.select(index) {
            self.commit(host)
        } else {
            Outcome::Ignored
        }
    }

    /// Move the highlight to a row (mouse hover)
    pub fn select_index(&mut self, index: usize) -> bool {
        self.selection.select(index)
    }

    // ---- global shortcuts ----

    /// Claim this palette's global shortcuts. Idempotent once attached.
    pub fn attach(&mut self, registry: &mut ShortcutRegistry) -> PaletteResult<InstanceId> {
        if let Some(id) = self.instance {
            return Ok(id);
        }
        let bindings = shortcuts::bindings_from_config(&self.config.general)?;
        let id = registry.next_instance();
        registry.claim(id, &bindings)?;
        self.instance = Some(id);
        Ok(id)
    }

    /// Release this palette's global shortcuts
    pub fn detach(&mut self, registry: &mut ShortcutRegistry) {
        if let Some(id) = self.instance.take() {
            let released = registry.release(id);
            tracing::debug!(%id, released, "global shortcuts released");
        }
    }

    pub fn instance_id(&self) -> Option<InstanceId> {
        self.instance
    }

    // ---- host feeds ----

    pub fn update_frequencies<I, S>(&mut self, scores: I)
    where
        I: IntoIterator<Item = (S, u32)>,
        S: AsRef<str>,
    {
        self.catalog.apply_frequencies(scores);
        self.refresh_if_open();
    }

    pub fn set_recents(&mut self, recents: Vec<CatalogItem>) {
        self.catalog.set_recents(recents);
        self.refresh_if_open();
    }

    /// Restore history previously exported with [`CommandHistory::to_json`]
    pub fn load_history(&mut self, json: &str) -> PaletteResult<()> {
        self.history = CommandHistory::from_json(json, self.config.behavior.history_capacity as usize)?;
        Ok(())
    }

    /// Forget every committed query
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.recall.reset();
        self.refresh_if_open();
    }

    // ---- accessors ----

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn mode(&self) -> Mode {
        self.classification.mode
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    /// Flattened results, the list keyboard selection walks
    pub fn results(&self) -> &[CatalogItem] {
        self.selection.results()
    }

    pub fn sections(&self) -> &[ResultSection] {
        &self.sections
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selection.selected_index()
    }

    pub fn selected(&self) -> Option<&CatalogItem> {
        self.selection.selected()
    }

    pub fn preview(&self) -> Option<&CatalogItem> {
        self.selection.preview()
    }

    /// Current space and category while browsing, outermost first
    pub fn breadcrumb(&self) -> Vec<&CatalogItem> {
        self.browse
            .as_ref()
            .map(|state| state.breadcrumb(&self.catalog))
            .unwrap_or_default()
    }

    pub fn pending_action(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    pub fn browse_state(&self) -> Option<&BrowseState> {
        self.browse.as_ref()
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ---- internals ----

    /// Reclassify the query and recompute results
    fn refresh(&mut self) {
        let classification = classify(&self.query, self.browse.as_ref(), self.pending.as_ref());
        if classification.mode != self.classification.mode {
            tracing::debug!(from = ?self.classification.mode, to = ?classification.mode, "mode changed");
        }

        let set = self.engine.resolve(
            &self.catalog,
            &self.history,
            self.browse.as_ref(),
            &classification,
        );
        self.selection.replace(set.flatten());
        self.sections = set.sections;
        self.classification = classification;
    }

    fn refresh_if_open(&mut self) {
        if self.is_open {
            self.refresh();
        }
    }

    fn clear_query(&mut self) {
        self.query.clear();
        self.recall.reset();
        self.refresh();
    }

    fn reset(&mut self) {
        self.query.clear();
        self.browse = None;
        self.pending = None;
        self.recall.reset();
        self.classification = Classification::default();
        self.sections.clear();
        self.selection.clear();
    }

    fn hide(&mut self) {
        self.reset();
        self.is_open = false;
        tracing::debug!("palette closed");
    }

    /// Put the next older history entry in the query without executing it
    fn recall_older(&mut self) -> Outcome {
        let Some(entry) = self
            .recall
            .older(&self.history)
            .and_then(|i| self.history.get(i))
        else {
            return Outcome::Ignored;
        };
        self.query = entry.query.clone();
        self.refresh();
        Outcome::Updated
    }

    fn commit_item<H: Host + ?Sized>(&mut self, item: CatalogItem, host: &mut H) -> Outcome {
        tracing::debug!(id = %item.id, kind = ?item.kind, mode = ?self.classification.mode, "commit");

        match item.kind {
            ItemKind::Action => {
                self.pending = Some(PendingAction::new(item.id));
                self.browse = None;
                self.clear_query();
                return Outcome::Updated;
            }
            ItemKind::History => {
                self.set_query(item.target.unwrap_or(item.label));
                return Outcome::Updated;
            }
            _ => {}
        }

        match self.classification.mode {
            Mode::ActionTargeting => {
                let Some(pending) = self.pending.as_ref() else {
                    return Outcome::Ignored;
                };
                match targeting::resolve_target(&self.catalog, &item) {
                    Some(context) => {
                        let action = ExecutionAction::InvokeAction {
                            action_id: pending.action_id.clone(),
                            context,
                        };
                        self.finish(action, host)
                    }
                    None => Outcome::Ignored,
                }
            }
            Mode::Browse => {
                let mut state = self.browse.clone().unwrap_or_default();
                match state.select(&item) {
                    BrowseStep::Descended => {
                        self.browse = Some(state);
                        self.clear_query();
                        Outcome::Updated
                    }
                    BrowseStep::Commit => self.dispatch_item(&item, host),
                    BrowseStep::Ignored => Outcome::Ignored,
                }
            }
            _ if item.kind == ItemKind::Category => {
                let Some(space_id) = item.parent.clone() else {
                    return Outcome::Ignored;
                };
                self.browse = Some(BrowseState::at_category(space_id, item.id));
                self.pending = None;
                self.clear_query();
                Outcome::Updated
            }
            _ => self.dispatch_item(&item, host),
        }
    }

    fn dispatch_item<H: Host + ?Sized>(&mut self, item: &CatalogItem, host: &mut H) -> Outcome {
        match ExecutionAction::for_item(item, &self.classification.sub_query) {
            Some(action) => self.finish(action, host),
            None => Outcome::Ignored,
        }
    }

    /// A successful commit: record history, then execute
    fn finish<H: Host + ?Sized>(&mut self, action: ExecutionAction, host: &mut H) -> Outcome {
        if !self.query.trim().is_empty() {
            self.history.record(HistoryEntry::now(
                self.query.clone(),
                self.classification.mode,
                self.selection.len(),
            ));
        }
        self.execute(action, host)
    }

    /// State is reset before the host runs, so a failing callback cannot leave
    /// the palette half committed.
    fn execute<H: Host + ?Sized>(&mut self, action: ExecutionAction, host: &mut H) -> Outcome {
        self.hide();
        executor::dispatch(&action, host);
        host.close();
        Outcome::Executed(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::{catalog_config, sample};
    use crate::core::browse::BrowseLevel;
    use crate::core::targeting::ActionContext;
    use crate::error::PaletteError;
    use crate::shortcuts::Shortcut;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        clipboard_fails: bool,
    }

    impl Host for Recorder {
        fn navigate(&mut self, path: &str) {
            self.calls.push(format!("navigate {}", path));
        }
        fn invoke_action(&mut self, action_id: &str, context: &ActionContext) {
            self.calls.push(format!(
                "action {} {} {}",
                action_id,
                context.space,
                context.module.as_deref().unwrap_or("-")
            ));
        }
        fn invoke_assistant(&mut self, command_id: &str, remainder: &str) {
            self.calls.push(format!("assistant {} [{}]", command_id, remainder));
        }
        fn change_theme(&mut self, theme_id: &str) {
            self.calls.push(format!("theme {}", theme_id));
        }
        fn copy_to_clipboard(&mut self, value: &str) -> PaletteResult<()> {
            if self.clipboard_fails {
                return Err(PaletteError::Clipboard("no display".into()));
            }
            self.calls.push(format!("copy {}", value));
            Ok(())
        }
        fn open_external_link(&mut self, url: &str) {
            self.calls.push(format!("open {}", url));
        }
        fn close(&mut self) {
            self.calls.push("close".into());
        }
    }

    fn opened() -> Palette {
        let mut palette = Palette::new(sample());
        palette.open();
        palette
    }

    fn labels(palette: &Palette) -> Vec<&str> {
        palette.results().iter().map(|i| i.label.as_str()).collect()
    }

    #[test]
    fn test_create_prefix_lists_universal_actions() {
        let mut palette = opened();
        palette.set_query("/");
        assert_eq!(palette.mode(), Mode::Create);
        assert_eq!(
            labels(&palette),
            vec!["Créer", "Modifier", "Importer", "Exporter", "Analyser", "Publier"]
        );
    }

    #[test]
    fn test_calculator_commit_copies_and_closes() {
        let mut palette = opened();
        let mut host = Recorder::default();

        palette.set_query("42+8");
        assert_eq!(palette.mode(), Mode::Calculator);
        assert_eq!(palette.results()[0].label, "50");

        let outcome = palette.handle_key(Key::Enter, &mut host);
        assert_eq!(
            outcome,
            Outcome::Executed(ExecutionAction::CopyToClipboard { value: "50".into() })
        );
        assert_eq!(host.calls, vec!["copy 50", "close"]);
        assert!(!palette.is_open());
        assert_eq!(palette.query(), "");
        assert_eq!(palette.history().get(0).unwrap().mode_at_commit, Mode::Calculator);
    }

    #[test]
    fn test_goto_filters_spaces_and_modules() {
        let mut palette = opened();
        palette.set_query("go fina");
        assert_eq!(labels(&palette), vec!["Finance"]);

        palette.set_query("go zzz999");
        assert!(palette.results().is_empty());
        assert_eq!(palette.selected_index(), None);

        let mut host = Recorder::default();
        assert_eq!(palette.handle_key(Key::Enter, &mut host), Outcome::Ignored);
        assert!(host.calls.is_empty());
        assert!(palette.is_open());
    }

    #[test]
    fn test_browse_drill_down_and_escape() {
        let mut palette = opened();
        let mut host = Recorder::default();

        palette.handle_key(Key::Tab, &mut host);
        assert_eq!(palette.mode(), Mode::Browse);
        assert_eq!(labels(&palette), vec!["Projets", "Administration"]);

        palette.handle_key(Key::Enter, &mut host);
        assert_eq!(labels(&palette), vec!["Argent", "Terrain"]);
        assert_eq!(palette.selected_index(), Some(0));

        palette.handle_key(Key::Enter, &mut host);
        assert_eq!(palette.browse_state().unwrap().level(), BrowseLevel::Modules);
        let crumbs: Vec<&str> = palette.breadcrumb().iter().map(|i| i.label.as_str()).collect();
        assert_eq!(crumbs, vec!["Projets", "Argent"]);

        assert_eq!(palette.handle_key(Key::Escape, &mut host), Outcome::Updated);
        let crumbs: Vec<&str> = palette.breadcrumb().iter().map(|i| i.label.as_str()).collect();
        assert_eq!(crumbs, vec!["Projets"]);

        assert_eq!(palette.handle_key(Key::Escape, &mut host), Outcome::Updated);
        assert!(palette.breadcrumb().is_empty());
        assert!(palette.is_open());

        assert_eq!(palette.handle_key(Key::Escape, &mut host), Outcome::Closed);
        assert!(!palette.is_open());
        assert_eq!(host.calls, vec!["close"]);
    }

    #[test]
    fn test_browse_module_commit_navigates() {
        let mut palette = opened();
        let mut host = Recorder::default();

        palette.handle_key(Key::Tab, &mut host);
        palette.handle_key(Key::Enter, &mut host);
        palette.handle_key(Key::ArrowDown, &mut host);
        palette.handle_key(Key::Enter, &mut host);
        assert_eq!(labels(&palette), vec!["Planning", "Avancement"]);

        palette.set_query("avan");
        palette.handle_key(Key::Enter, &mut host);
        assert_eq!(host.calls, vec!["navigate /projects/progress", "close"]);
        assert!(palette.browse_state().is_none());
    }

    #[test]
    fn test_backspace_on_empty_query_pops_browse() {
        let mut palette = opened();
        let mut host = Recorder::default();

        palette.handle_key(Key::Tab, &mut host);
        palette.handle_key(Key::Enter, &mut host);
        palette.set_query("a");
        palette.handle_key(Key::Backspace, &mut host);
        assert_eq!(palette.query(), "");
        assert_eq!(palette.browse_state().unwrap().level(), BrowseLevel::Categories);

        palette.handle_key(Key::Backspace, &mut host);
        assert_eq!(palette.browse_state(), Some(&BrowseState::Spaces));

        palette.handle_key(Key::Backspace, &mut host);
        assert!(palette.browse_state().is_none());
        assert_eq!(palette.mode(), Mode::Default);
        assert_eq!(palette.handle_key(Key::Backspace, &mut host), Outcome::Ignored);
    }

    #[test]
    fn test_category_commit_outside_browse_enters_modules() {
        let mut palette = opened();
        let mut host = Recorder::default();

        palette.set_query("argent");
        assert_eq!(labels(&palette), vec!["Argent"]);
        assert_eq!(palette.handle_key(Key::Enter, &mut host), Outcome::Updated);

        assert_eq!(palette.mode(), Mode::Browse);
        assert_eq!(
            palette.browse_state(),
            Some(&BrowseState::at_category("projects", "money"))
        );
        assert_eq!(labels(&palette), vec!["Finance", "Factures"]);
        assert!(host.calls.is_empty());
    }

    #[test]
    fn test_keyboard_bounds() {
        let mut palette = opened();
        let mut host = Recorder::default();
        palette.set_query("/");

        palette.handle_key(Key::ArrowUp, &mut host);
        assert_eq!(palette.selected_index(), Some(0));

        for _ in 0..10 {
            palette.handle_key(Key::ArrowDown, &mut host);
        }
        assert_eq!(palette.selected_index(), Some(5));
        assert_eq!(palette.selected().unwrap().label, "Publier");
    }

    #[test]
    fn test_action_targeting_flow() {
        let mut palette = opened();
        let mut host = Recorder::default();

        palette.set_query("/");
        assert_eq!(palette.handle_key(Key::Enter, &mut host), Outcome::Updated);
        assert_eq!(palette.pending_action(), Some(&PendingAction::new("create")));
        assert_eq!(palette.query(), "");
        assert_eq!(palette.mode(), Mode::ActionTargeting);
        assert!(palette.is_open());
        assert!(palette
            .results()
            .iter()
            .all(|i| matches!(i.kind, ItemKind::Space | ItemKind::Module)));

        palette.set_query("plan");
        assert_eq!(labels(&palette), vec!["Planning"]);
        palette.handle_key(Key::Enter, &mut host);
        assert_eq!(host.calls, vec!["action create projects planning", "close"]);
        assert!(palette.pending_action().is_none());
    }

    #[test]
    fn test_action_targeting_on_space() {
        let mut palette = opened();
        let mut host = Recorder::default();

        palette.set_query("/ export");
        palette.handle_key(Key::Enter, &mut host);
        palette.set_query("admin");
        palette.handle_key(Key::Enter, &mut host);
        assert_eq!(host.calls, vec!["action export admin -", "close"]);
    }

    #[test]
    fn test_escape_cancels_pending_action_only() {
        let mut palette = opened();
        let mut host = Recorder::default();

        palette.set_query("/");
        palette.handle_key(Key::Enter, &mut host);
        assert_eq!(palette.handle_key(Key::Escape, &mut host), Outcome::Updated);
        assert!(palette.pending_action().is_none());
        assert!(palette.is_open());
        assert_eq!(palette.mode(), Mode::Default);
        assert!(host.calls.is_empty());
    }

    #[test]
    fn test_backspace_cancels_pending_action() {
        let mut palette = opened();
        let mut host = Recorder::default();

        palette.set_query("/");
        palette.handle_key(Key::Enter, &mut host);
        palette.handle_key(Key::Backspace, &mut host);
        assert!(palette.pending_action().is_none());
        assert_eq!(palette.mode(), Mode::Default);
    }

    #[test]
    fn test_tab_clears_pending_action() {
        let mut palette = opened();
        let mut host = Recorder::default();

        palette.set_query("/");
        palette.handle_key(Key::Enter, &mut host);
        palette.handle_key(Key::Tab, &mut host);
        assert!(palette.pending_action().is_none());
        assert_eq!(palette.mode(), Mode::Browse);

        palette.handle_key(Key::Tab, &mut host);
        assert!(palette.browse_state().is_none());
        assert_eq!(palette.mode(), Mode::Default);
    }

    #[test]
    fn test_clipboard_failure_still_closes() {
        let mut palette = opened();
        let mut host = Recorder {
            clipboard_fails: true,
            ..Recorder::default()
        };

        palette.set_query("12×3");
        let outcome = palette.handle_key(Key::Enter, &mut host);
        assert!(matches!(outcome, Outcome::Executed(_)));
        assert_eq!(host.calls, vec!["close"]);
        assert!(!palette.is_open());
        assert_eq!(palette.query(), "");
    }

    #[test]
    fn test_history_is_capped() {
        let mut palette = Palette::new(sample());
        let mut host = Recorder::default();

        for i in 0..51 {
            palette.open();
            palette.set_query(format!("{}+1", i));
            palette.handle_key(Key::Enter, &mut host);
        }

        let history = palette.history();
        assert_eq!(history.len(), 50);
        assert_eq!(history.get(0).unwrap().query, "50+1");
        assert_eq!(history.get(49).unwrap().query, "1+1");
    }

    #[test]
    fn test_arrow_up_recalls_history() {
        let mut palette = Palette::new(sample());
        let mut host = Recorder::default();
        for query in ["go fina", "7*6"] {
            palette.open();
            palette.set_query(query);
            palette.handle_key(Key::Enter, &mut host);
        }
        host.calls.clear();

        palette.open();
        palette.handle_key(Key::ArrowUp, &mut host);
        assert_eq!(palette.query(), "7*6");
        assert_eq!(palette.mode(), Mode::Calculator);

        palette.handle_key(Key::ArrowUp, &mut host);
        assert_eq!(palette.query(), "go fina");
        assert_eq!(palette.mode(), Mode::Goto);
        assert_eq!(palette.handle_key(Key::ArrowUp, &mut host), Outcome::Ignored);

        // Recall never executes
        assert!(host.calls.is_empty());
    }

    #[test]
    fn test_arrow_down_after_recall_moves_selection() {
        let mut palette = Palette::new(sample());
        let mut host = Recorder::default();
        palette.open();
        palette.set_query("go ");
        palette.handle_key(Key::Enter, &mut host);

        palette.open();
        palette.handle_key(Key::ArrowUp, &mut host);
        assert_eq!(palette.query(), "go ");
        assert_eq!(palette.results().len(), 7);
        assert_eq!(palette.selected_index(), Some(0));

        assert_eq!(palette.handle_key(Key::ArrowDown, &mut host), Outcome::Updated);
        assert_eq!(palette.query(), "go ");
        assert_eq!(palette.selected_index(), Some(1));

        palette.handle_key(Key::ArrowDown, &mut host);
        assert_eq!(palette.selected_index(), Some(2));
        palette.handle_key(Key::ArrowUp, &mut host);
        palette.handle_key(Key::ArrowUp, &mut host);
        assert_eq!(palette.selected_index(), Some(0));
        assert_eq!(palette.query(), "go ");
    }

    #[test]
    fn test_keys_ignored_while_closed() {
        let mut palette = Palette::new(sample());
        let mut host = Recorder::default();

        for key in [Key::Escape, Key::Enter, Key::Tab, Key::Backspace, Key::ArrowUp, Key::ArrowDown] {
            assert_eq!(palette.handle_key(key, &mut host), Outcome::Ignored);
        }
        assert!(host.calls.is_empty());
        assert!(palette.browse_state().is_none());
        assert!(!palette.is_open());
    }

    #[test]
    fn test_panicking_host_leaves_palette_reset() {
        struct PanickingHost;

        impl Host for PanickingHost {
            fn navigate(&mut self, _path: &str) {
                panic!("router exploded");
            }
            fn invoke_action(&mut self, _action_id: &str, _context: &ActionContext) {}
            fn invoke_assistant(&mut self, _command_id: &str, _remainder: &str) {}
            fn change_theme(&mut self, _theme_id: &str) {}
            fn copy_to_clipboard(&mut self, _value: &str) -> PaletteResult<()> {
                Ok(())
            }
            fn open_external_link(&mut self, _url: &str) {}
            fn close(&mut self) {}
        }

        let mut palette = opened();
        let mut host = PanickingHost;
        palette.handle_key(Key::Tab, &mut host);
        palette.handle_key(Key::Enter, &mut host);
        palette.handle_key(Key::Enter, &mut host);
        assert_eq!(palette.browse_state().unwrap().level(), BrowseLevel::Modules);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            palette.handle_key(Key::Enter, &mut host)
        }));
        assert!(result.is_err());

        assert!(!palette.is_open());
        assert_eq!(palette.query(), "");
        assert!(palette.browse_state().is_none());
        assert!(palette.pending_action().is_none());
        assert_eq!(palette.selected_index(), None);
        assert_eq!(palette.mode(), Mode::Default);
    }

    #[test]
    fn test_history_mode_replaces_query() {
        let mut palette = Palette::new(sample());
        let mut host = Recorder::default();
        palette.open();
        palette.set_query("go fina");
        palette.handle_key(Key::Enter, &mut host);
        assert_eq!(host.calls, vec!["navigate /projects/finance", "close"]);

        palette.open();
        palette.set_query("!");
        assert_eq!(labels(&palette), vec!["go fina"]);
        assert_eq!(palette.handle_key(Key::Enter, &mut host), Outcome::Updated);
        assert_eq!(palette.query(), "go fina");
        assert_eq!(palette.mode(), Mode::Goto);
        assert!(palette.is_open());
    }

    #[test]
    fn test_empty_query_commit_skips_history() {
        let mut palette = opened();
        let mut host = Recorder::default();
        // Home view: first row is the first space
        palette.handle_key(Key::Enter, &mut host);
        assert_eq!(host.calls, vec!["navigate /projects", "close"]);
        assert!(palette.history().is_empty());
    }

    #[test]
    fn test_quick_link_and_assistant_and_theme() {
        let mut palette = opened();
        let mut host = Recorder::default();

        palette.set_query("support");
        palette.handle_key(Key::Enter, &mut host);

        palette.open();
        palette.set_query("@");
        palette.handle_key(Key::Enter, &mut host);

        palette.open();
        palette.set_query("theme sombre");
        palette.handle_key(Key::Enter, &mut host);

        assert_eq!(
            host.calls,
            vec![
                "open https://help.example.com/search?q=support",
                "close",
                "assistant summarize []",
                "close",
                "theme dark",
                "close"
            ]
        );
    }

    #[test]
    fn test_quick_jump() {
        let mut palette = Palette::new(sample());
        let mut host = Recorder::default();

        let outcome = palette.handle_global(GlobalCommand::QuickJump(2), &mut host);
        assert_eq!(
            outcome,
            Outcome::Executed(ExecutionAction::Navigate { path: "/admin".into() })
        );
        assert_eq!(host.calls, vec!["navigate /admin", "close"]);

        host.calls.clear();
        assert_eq!(palette.handle_global(GlobalCommand::QuickJump(9), &mut host), Outcome::Ignored);
        assert_eq!(palette.handle_global(GlobalCommand::QuickJump(0), &mut host), Outcome::Ignored);
        assert!(host.calls.is_empty());
        assert!(palette.history().is_empty());
    }

    #[test]
    fn test_toggle() {
        let mut palette = Palette::new(sample());
        let mut host = Recorder::default();

        assert_eq!(palette.handle_global(GlobalCommand::Toggle, &mut host), Outcome::Updated);
        assert!(palette.is_open());
        assert_eq!(palette.mode(), Mode::Default);
        assert!(!palette.sections().is_empty());

        assert_eq!(palette.handle_global(GlobalCommand::Toggle, &mut host), Outcome::Closed);
        assert!(!palette.is_open());
        assert_eq!(host.calls, vec!["close"]);
    }

    #[test]
    fn test_open_resets_transient_state() {
        let mut palette = opened();
        let mut host = Recorder::default();
        palette.handle_key(Key::Tab, &mut host);
        palette.set_query("proj");
        palette.open();
        assert_eq!(palette.query(), "");
        assert!(palette.browse_state().is_none());
        assert_eq!(palette.mode(), Mode::Default);
    }

    #[test]
    fn test_single_shortcut_owner() {
        let mut registry = ShortcutRegistry::new();
        let mut first = Palette::new(sample());
        let mut second = Palette::new(sample());

        let id = first.attach(&mut registry).unwrap();
        assert_eq!(first.attach(&mut registry).unwrap(), id);
        assert!(matches!(
            second.attach(&mut registry),
            Err(PaletteError::ShortcutConflict { .. })
        ));

        let toggle: Shortcut = "<Ctrl>k".parse().unwrap();
        assert_eq!(registry.dispatch(&toggle), Some((id, GlobalCommand::Toggle)));

        first.detach(&mut registry);
        assert!(first.instance_id().is_none());
        let id = second.attach(&mut registry).unwrap();
        assert_eq!(registry.owner_of(&toggle), Some(id));
    }

    #[test]
    fn test_frequencies_and_recents_refresh_results() {
        let mut palette = opened();
        palette.set_query("f");
        assert_eq!(labels(&palette), vec!["Finance", "Factures"]);

        palette.update_frequencies([("invoices", 9)]);
        assert_eq!(labels(&palette), vec!["Factures", "Finance"]);

        palette.set_query("");
        palette.set_recents(vec![CatalogItem::recent("r1", "Facture 12", "/projects/invoices/12")]);
        assert_eq!(palette.sections()[0].title, "Récents");
        assert_eq!(palette.results()[0].kind, ItemKind::Recent);
    }

    #[test]
    fn test_preview_follows_selection() {
        let mut palette = opened();
        palette.set_query("lots");
        assert_eq!(palette.preview().unwrap().id, "progress");
        palette.set_query("plan");
        assert!(palette.preview().is_none());
    }

    #[test]
    fn test_commit_index() {
        let mut palette = opened();
        let mut host = Recorder::default();
        // Finance carries frequency 2, so it ranks ahead of Projets
        palette.set_query("go ");
        assert_eq!(palette.commit_index(99, &mut host), Outcome::Ignored);
        assert!(palette.select_index(1));
        palette.commit_index(1, &mut host);
        assert_eq!(host.calls, vec!["navigate /projects", "close"]);
    }

    #[test]
    fn test_home_quick_action_starts_targeting() {
        let mut palette = opened();
        let mut host = Recorder::default();

        // Spaces first, then the quick actions
        assert!(palette.select_index(2));
        assert_eq!(palette.selected().unwrap().label, "Créer");
        assert_eq!(palette.handle_key(Key::Enter, &mut host), Outcome::Updated);
        assert_eq!(palette.mode(), Mode::ActionTargeting);
        assert!(host.calls.is_empty());
    }

    #[test]
    fn test_clear_and_load_history() {
        let mut palette = opened();
        let mut host = Recorder::default();
        palette.set_query("7*6");
        palette.handle_key(Key::Enter, &mut host);
        let json = palette.history().to_json().unwrap();

        palette.clear_history();
        assert!(palette.history().is_empty());

        palette.load_history(&json).unwrap();
        assert_eq!(palette.history().get(0).unwrap().query, "7*6");
        assert!(palette.load_history("not json").is_err());
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            catalog: catalog_config(),
            ..Config::default()
        };
        let mut palette = Palette::from_config(config).unwrap();
        palette.open();
        assert_eq!(palette.sections().len(), 3);
        assert_eq!(palette.results().len(), 2 + 6 + 1);

        assert_eq!(palette.history().capacity(), 50);

        let mut broken = Config::default();
        broken.catalog = catalog_config();
        broken.catalog.spaces[1].node.id = "projects".into();
        assert!(Palette::from_config(broken).is_err());
    }
}
