//! Global shortcut ownership.
//!
//! Window-level combos (the open/close toggle and the numbered quick-jumps)
//! fire regardless of focus, so exactly one palette instance may own each of
//! them. The host keeps a single [`ShortcutRegistry`], every palette claims its
//! combos on mount and releases them on teardown, and the host routes key
//! events through [`ShortcutRegistry::dispatch`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::config::GeneralConfig;
use crate::error::{PaletteError, PaletteResult};

/// Modifier keys held with a shortcut.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    /// Command on macOS, Super elsewhere
    pub meta: bool,
}

/// A key combo in accelerator syntax, e.g. `<Ctrl>k` or `<Alt>space`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shortcut {
    pub modifiers: Modifiers,
    /// Lowercased key name
    pub key: String,
}

impl Shortcut {
    pub fn new(modifiers: Modifiers, key: impl Into<String>) -> Self {
        Self {
            modifiers,
            key: key.into().to_lowercase(),
        }
    }
}

impl FromStr for Shortcut {
    type Err = PaletteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut modifiers = Modifiers::default();
        let mut rest = s.trim();

        while let Some(tail) = rest.strip_prefix('<') {
            let end = tail
                .find('>')
                .ok_or_else(|| PaletteError::Shortcut(format!("unclosed modifier in '{}'", s)))?;
            match tail[..end].to_lowercase().as_str() {
                "ctrl" | "control" | "primary" => modifiers.ctrl = true,
                "alt" => modifiers.alt = true,
                "shift" => modifiers.shift = true,
                "super" | "meta" | "cmd" | "command" => modifiers.meta = true,
                other => {
                    return Err(PaletteError::Shortcut(format!(
                        "unknown modifier '{}' in '{}'",
                        other, s
                    )))
                }
            }
            rest = &tail[end + 1..];
        }

        if rest.is_empty() {
            return Err(PaletteError::Shortcut(format!("missing key in '{}'", s)));
        }
        Ok(Shortcut::new(modifiers, rest))
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.ctrl {
            f.write_str("<Ctrl>")?;
        }
        if self.modifiers.alt {
            f.write_str("<Alt>")?;
        }
        if self.modifiers.shift {
            f.write_str("<Shift>")?;
        }
        if self.modifiers.meta {
            f.write_str("<Super>")?;
        }
        f.write_str(&self.key)
    }
}

/// What a global shortcut asks the owning palette to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalCommand {
    Toggle,
    /// Jump to the Nth top-level entry (1-based)
    QuickJump(usize),
}

/// Identifies a palette instance within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Build the toggle and quick-jump bindings described by the config
pub fn bindings_from_config(general: &GeneralConfig) -> PaletteResult<Vec<(Shortcut, GlobalCommand)>> {
    let mut bindings = vec![(general.toggle_shortcut.parse()?, GlobalCommand::Toggle)];
    for n in 1..=general.quick_jump_count as usize {
        let combo = format!("{}{}", general.quick_jump_modifier, n);
        bindings.push((combo.parse()?, GlobalCommand::QuickJump(n)));
    }
    Ok(bindings)
}

/// Single-owner table of global shortcuts.
#[derive(Debug, Default)]
pub struct ShortcutRegistry {
    bindings: HashMap<Shortcut, (InstanceId, GlobalCommand)>,
    next_id: u64,
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id for a new palette instance
    pub fn next_instance(&mut self) -> InstanceId {
        self.next_id += 1;
        InstanceId(self.next_id)
    }

    /// Claim every combo for `owner`, or none of them.
    ///
    /// Fails with [`PaletteError::ShortcutConflict`] when another instance owns
    /// one of the combos. Re-claiming combos already owned by `owner` is fine.
    pub fn claim(&mut self, owner: InstanceId, bindings: &[(Shortcut, GlobalCommand)]) -> PaletteResult<()> {
        for (shortcut, _) in bindings {
            if let Some((current, _)) = self.bindings.get(shortcut) {
                if *current != owner {
                    tracing::warn!(combo = %shortcut, owner = %current, "global shortcut already owned");
                    return Err(PaletteError::ShortcutConflict {
                        combo: shortcut.to_string(),
                        owner: current.0,
                    });
                }
            }
        }

        for (shortcut, command) in bindings {
            self.bindings.insert(shortcut.clone(), (owner, *command));
        }
        tracing::debug!(%owner, count = bindings.len(), "global shortcuts claimed");
        Ok(())
    }

    /// Drop every combo owned by `owner`. Returns how many were released.
    pub fn release(&mut self, owner: InstanceId) -> usize {
        let before = self.bindings.len();
        self.bindings.retain(|_, (current, _)| *current != owner);
        before - self.bindings.len()
    }

    pub fn owner_of(&self, shortcut: &Shortcut) -> Option<InstanceId> {
        self.bindings.get(shortcut).map(|(owner, _)| *owner)
    }

    /// Route a pressed combo to its single owner
    pub fn dispatch(&self, shortcut: &Shortcut) -> Option<(InstanceId, GlobalCommand)> {
        self.bindings.get(shortcut).copied()
    }
}
