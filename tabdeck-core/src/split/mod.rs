//! Split view layout
//!
//! This module provides the state machine that lets two tabs be shown side
//! by side, including the cancelable live preview shown while a tab is
//! dragged over the content area.
//!
//! # Module Structure
//!
//! - `state` - `SplitState`, divider bounds and constants
//! - `controller` - `SplitLayoutController`, the only writer of `SplitState`
//! - `animation` - divider animation toward the middle
//! - `error` - `SplitError` and the outcome enums
//!
//! # Example
//!
//! ```
//! use std::time::Instant;
//! use tabdeck_core::context::LayoutContext;
//! use tabdeck_core::eviction::IdleEvictionScheduler;
//! use tabdeck_core::split::{EnterSplitOutcome, SplitLayoutController};
//! use tabdeck_core::surface::HeadlessFactory;
//! use tabdeck_core::tabs::{TabCollection, TabStore};
//! use tabdeck_core::types::PaneSide;
//!
//! let mut tabs = TabStore::new(Box::new(HeadlessFactory::new()));
//! let a = tabs.open_tab("https://a.example");
//! let b = tabs.open_tab("https://b.example");
//! tabs.set_current_tab(Some(a));
//!
//! let mut scheduler = IdleEvictionScheduler::with_defaults();
//! let mut split = SplitLayoutController::with_defaults();
//! let mut ctx = LayoutContext::new(&mut tabs, &mut scheduler, Instant::now());
//!
//! let outcome = split.enter_split(b, PaneSide::Right, false, &mut ctx);
//! assert_eq!(outcome, EnterSplitOutcome::Entered { placed: b });
//! assert_eq!(split.state().left_tab_id(), Some(a));
//! assert_eq!(split.state().right_tab_id(), Some(b));
//! ```

mod animation;
mod controller;
mod error;
mod state;

pub use animation::{DEFAULT_ANIMATION_DURATION, DividerAnimation};
pub use controller::SplitLayoutController;
pub use error::{EnterSplitOutcome, HealOutcome, SplitError};
pub use state::{
    DEFAULT_DIVIDER_FRACTION, DEFAULT_MAX_FRACTION, DEFAULT_MIN_FRACTION, DIVIDER_EPSILON,
    FractionBounds, SplitState,
};
