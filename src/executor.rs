//! Result execution module - determines what action to take for each committed item
//! and hands it to the host.

use crate::catalog::{CatalogItem, ItemKind};
use crate::config;
use crate::core::targeting::ActionContext;
use crate::error::PaletteResult;

/// The action to perform when a result is executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionAction {
    /// Route the host application to a path
    Navigate { path: String },

    /// Apply a universal action to a target
    InvokeAction {
        action_id: String,
        context: ActionContext,
    },

    /// Run an assistant command with the text typed after the trigger
    InvokeAssistant { command_id: String, remainder: String },

    /// Copy a calculator result
    CopyToClipboard { value: String },

    /// Switch the host theme
    ChangeTheme { theme_id: String },

    /// Open a URL outside the application
    OpenUrl { url: String },
}

impl ExecutionAction {
    /// Map a committed item to its action.
    ///
    /// Returns `None` for items that only change palette state (actions,
    /// categories, history entries); the palette handles those itself.
    pub fn for_item(item: &CatalogItem, sub_query: &str) -> Option<Self> {
        match item.kind {
            ItemKind::Space | ItemKind::Module | ItemKind::Recent => Some(ExecutionAction::Navigate {
                path: item
                    .target
                    .clone()
                    .unwrap_or_else(|| format!("/{}", item.id)),
            }),
            ItemKind::QuickLink => {
                let url = config::resolve_url(item.target.as_deref()?, sub_query);
                if url.starts_with("http://") || url.starts_with("https://") {
                    Some(ExecutionAction::OpenUrl { url })
                } else {
                    Some(ExecutionAction::Navigate { path: url })
                }
            }
            ItemKind::AssistantCommand => Some(ExecutionAction::InvokeAssistant {
                command_id: item.id.clone(),
                remainder: sub_query.to_string(),
            }),
            ItemKind::Theme => Some(ExecutionAction::ChangeTheme {
                theme_id: item.id.clone(),
            }),
            ItemKind::CalculatorResult => Some(ExecutionAction::CopyToClipboard {
                value: item.target.clone().unwrap_or_else(|| item.label.clone()),
            }),
            ItemKind::Action | ItemKind::Category | ItemKind::History => None,
        }
    }
}

/// Callbacks the palette drives. Everything outside the engine lives behind this trait.
pub trait Host {
    fn navigate(&mut self, path: &str);

    fn invoke_action(&mut self, action_id: &str, context: &ActionContext);

    fn invoke_assistant(&mut self, command_id: &str, remainder: &str);

    fn change_theme(&mut self, theme_id: &str);

    /// May fail when no clipboard is available; the palette swallows the error
    fn copy_to_clipboard(&mut self, value: &str) -> PaletteResult<()>;

    fn open_external_link(&mut self, url: &str);

    /// The palette closed (after a commit, Escape, or the toggle shortcut)
    fn close(&mut self);
}

/// Hand an action to the host
pub fn dispatch<H: Host + ?Sized>(action: &ExecutionAction, host: &mut H) {
    tracing::debug!(?action, "dispatching");

    match action {
        ExecutionAction::Navigate { path } => host.navigate(path),
        ExecutionAction::InvokeAction { action_id, context } => {
            host.invoke_action(action_id, context)
        }
        ExecutionAction::InvokeAssistant {
            command_id,
            remainder,
        } => host.invoke_assistant(command_id, remainder),
        ExecutionAction::CopyToClipboard { value } => {
            if let Err(e) = host.copy_to_clipboard(value) {
                tracing::warn!(error = %e, "clipboard unavailable, result not copied");
            }
        }
        ExecutionAction::ChangeTheme { theme_id } => host.change_theme(theme_id),
        ExecutionAction::OpenUrl { url } => host.open_external_link(url),
    }
}
