//! `TabDeck` Core Library
//!
//! This crate manages the rendering surfaces of a tabbed browser window:
//! when each tab's expensive native surface is created, shown, hidden and
//! released, and the split view state machine that shows two tabs side by
//! side.
//!
//! # Crate Structure
//!
//! - [`surface`] - Surface traits, the per-tab handle and a headless backend
//! - [`tabs`] - Tab entity, the `TabCollection` collaborator and `TabStore`
//! - [`eviction`] - Idle eviction with generation-token timeouts
//! - [`split`] - Split view state machine with drag preview
//! - [`host`] - Compositor reconciliation of the window container
//! - [`window`] - The owned per-window context tying everything together
//! - [`driver`] - tokio event loop binding
//! - [`config`] - Settings and persistence
//! - [`tracing`] - Structured logging setup

// Enable missing_docs warning for public API documentation
#![warn(missing_docs)]

pub mod clock;
pub mod config;
pub mod context;
pub mod driver;
pub mod error;
pub mod eviction;
pub mod host;
pub mod split;
pub mod surface;
pub mod tabs;
pub mod tracing;
pub mod types;
pub mod visible;
pub mod window;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AppSettings, ConfigManager};
pub use context::LayoutContext;
pub use driver::{
    DriverStats, TokioClock, WindowCommand, WindowEvent, WindowHandle, command_channel, run_window,
};
pub use error::{ConfigError, ConfigResult, TabDeckError};
pub use eviction::{
    EvictionReport, EvictionToken, IdleEvictionScheduler, SchedulerStats, TimeoutOutcome,
};
pub use host::{Attachment, CompositorSurfaceHost, ReconcileReport};
pub use split::{
    EnterSplitOutcome, FractionBounds, HealOutcome, SplitError, SplitLayoutController, SplitState,
};
pub use surface::{
    HeadlessFactory, RenderSurface, RenderSurfaceHandle, SurfaceFactory, SurfaceLedger,
};
pub use tabs::{MediaActivity, Tab, TabCollection, TabKind, TabStore};
pub use tracing::{TracingConfig, TracingError, TracingLevel, TracingOutput, init_tracing};
pub use types::{PaneSide, Rect, SpaceId, TabId};
pub use visible::VisibleSet;
pub use window::{BrowserWindow, TickReport};
