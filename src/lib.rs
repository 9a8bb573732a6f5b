//! Wayfinder - keyboard-driven command palette and navigation hub engine.
//!
//! Wayfinder interprets what the user types into a palette (search, goto,
//! create, assistant, calculator, theme and history modes), lets them drill
//! through a spaces → categories → modules hierarchy, and hands the committed
//! result to the host application. Rendering is left to the host.
//!
//! # Architecture
//!
//! - [`palette`] - The controller: query, keys, commits, global shortcuts
//! - [`core`] - Mode classification, result providers, browse and targeting state
//! - [`catalog`] - The registry of addressable items
//! - [`executor`] - Committed items → host callbacks, via the [`Host`] trait
//! - [`services`] - Calculator, number formatting, command history
//! - [`shortcuts`] - Single-owner registry for global shortcuts
//! - [`config`] - Configuration loading and management
//!
//! # Example
//!
//! ```ignore
//! use wayfinder::{Config, Key, Palette};
//!
//! let mut palette = Palette::from_config(Config::load())?;
//! palette.open();
//! palette.set_query("go fina");
//! palette.handle_key(Key::Enter, &mut host);
//! ```

pub mod catalog;
pub mod config;
pub mod core;
pub mod executor;
pub mod palette;
pub mod services;
pub mod shortcuts;
pub mod theme;

mod error;

// Re-export commonly used types for convenience
pub use catalog::{Catalog, CatalogItem, ItemKind};
pub use config::Config;
pub use core::mode::{Classification, Mode};
pub use core::targeting::{ActionContext, PendingAction};
pub use error::{PaletteError, PaletteResult};
pub use executor::{ExecutionAction, Host};
pub use palette::{Key, Outcome, Palette};
pub use shortcuts::{GlobalCommand, Shortcut, ShortcutRegistry};
