//! Core engine module - pure palette logic.
//!
//! Nothing in here touches the host. These modules hold the state machines
//! and the result providers the [`Palette`](crate::Palette) drives:
//! - Mode classification
//! - Result providers for every mode
//! - Browse (spaces → categories → modules) navigation
//! - Two-phase action targeting
//! - Keyboard selection

pub mod browse;
pub mod mode;
pub mod search;
pub mod selection;
pub mod targeting;

pub use browse::{BrowseLevel, BrowseState};
pub use mode::{classify, Classification, Mode};
pub use search::{ResultSection, ResultSet, SearchEngine};
pub use targeting::{ActionContext, PendingAction};
