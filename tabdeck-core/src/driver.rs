//! Event loop binding
//!
//! Runs a [`BrowserWindow`] on a tokio current-thread runtime. Commands from
//! the UI arrive over an unbounded channel and are applied one at a time;
//! between commands the loop sleeps until the next eviction deadline or
//! animation frame and then ticks the window. Because commands and timer
//! wake-ups are handled on the same task, a reconciliation pass always runs
//! to completion before the next mutation starts.
//!
//! The window must be built with a [`TokioClock`] so that its deadlines and
//! the loop's sleeps share one time base.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::clock::Clock;
use crate::tabs::{MediaActivity, TabCollection};
use crate::types::{PaneSide, Rect, TabId};
use crate::window::BrowserWindow;

/// Clock backed by `tokio::time`, so paused-time tests are deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}

/// A request for the window, sent from the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowCommand {
    /// Make a tab current
    Select(TabId),
    /// Restart the idle timeout of a tab
    MarkAccessed(TabId),
    /// Instantiate a tab's surface
    Load(TabId),
    /// Release a tab's surface now
    Unload(TabId),
    /// Change the idle timeout
    SetUnloadTimeout(Duration),
    /// The tab manager removed a tab
    TabClosed(TabId),
    /// Update a tab's media flags
    SetMedia {
        /// Tab to update
        tab: TabId,
        /// New flags
        media: MediaActivity,
    },
    /// Resize the container
    Resize(Rect),
    /// Place a tab in split view
    EnterSplit {
        /// Tab to place
        tab: TabId,
        /// Side to place it on
        side: PaneSide,
        /// Animate the divider to the middle
        animate: bool,
    },
    /// Leave split view keeping one side
    ExitSplit(PaneSide),
    /// Close one pane
    ClosePane(PaneSide),
    /// Exchange the panes
    SwapSides,
    /// Start a drag preview
    BeginPreview(PaneSide),
    /// Move the drag preview
    UpdatePreview(PaneSide),
    /// End the drag preview
    EndPreview {
        /// Whether the drag was cancelled
        cancel: bool,
    },
    /// Move the divider
    SetDivider(f64),
    /// Release every hidden surface without media now
    UnloadInactive,
    /// Stop the loop
    Shutdown,
}

/// Notifications sent back to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowEvent {
    /// A surface was released by the idle timeout or an explicit request
    Unloaded(TabId),
    /// The loop has stopped
    Stopped,
}

/// Counters returned when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    /// Commands applied
    pub commands: usize,
    /// Timer wake-ups handled
    pub ticks: usize,
    /// Surfaces released by idle timeouts
    pub evictions: usize,
}

/// Sending half of a window's command channel.
#[derive(Debug, Clone)]
pub struct WindowHandle {
    tx: mpsc::UnboundedSender<WindowCommand>,
}

impl WindowHandle {
    /// Queues a command. Returns `false` once the loop has stopped.
    pub fn send(&self, command: WindowCommand) -> bool {
        self.tx.send(command).is_ok()
    }

    /// Asks the loop to stop.
    pub fn shutdown(&self) {
        let _ = self.tx.send(WindowCommand::Shutdown);
    }
}

/// Creates a command channel for [`run_window`].
#[must_use]
pub fn command_channel() -> (WindowHandle, mpsc::UnboundedReceiver<WindowCommand>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (WindowHandle { tx }, rx)
}

/// Drives `window` until [`WindowCommand::Shutdown`] arrives or every
/// [`WindowHandle`] is dropped.
pub async fn run_window<T: TabCollection>(
    window: &mut BrowserWindow<T>,
    mut commands: mpsc::UnboundedReceiver<WindowCommand>,
    events: mpsc::UnboundedSender<WindowEvent>,
) -> DriverStats {
    let mut stats = DriverStats::default();
    window.reconcile();
    tracing::debug!("Window loop started");

    loop {
        let deadline = window.next_deadline();
        tokio::select! {
            command = commands.recv() => {
                match command {
                    None | Some(WindowCommand::Shutdown) => break,
                    Some(command) => {
                        stats.commands += 1;
                        for id in apply(window, command) {
                            let _ = events.send(WindowEvent::Unloaded(id));
                        }
                    }
                }
            }
            () = sleep_until(deadline) => {
                stats.ticks += 1;
                let report = window.tick();
                stats.evictions += report.evicted.len();
                for id in report.evicted {
                    let _ = events.send(WindowEvent::Unloaded(id));
                }
            }
        }
    }

    let _ = events.send(WindowEvent::Stopped);
    tracing::debug!(
        commands = stats.commands,
        ticks = stats.ticks,
        evictions = stats.evictions,
        "Window loop stopped"
    );
    stats
}

/// Applies one command. Returns the tabs it unloaded.
fn apply<T: TabCollection>(window: &mut BrowserWindow<T>, command: WindowCommand) -> Vec<TabId> {
    match command {
        WindowCommand::Select(id) => {
            window.select_tab(id);
        }
        WindowCommand::MarkAccessed(id) => {
            window.mark_tab_accessed(id);
        }
        WindowCommand::Load(id) => {
            window.load_tab(id);
        }
        WindowCommand::Unload(id) => {
            if window.unload_tab(id) {
                return vec![id];
            }
        }
        WindowCommand::SetUnloadTimeout(timeout) => window.set_unload_timeout(timeout),
        WindowCommand::TabClosed(id) => {
            window.tab_closed(id);
        }
        WindowCommand::SetMedia { tab, media } => {
            window.set_media_activity(tab, media);
        }
        WindowCommand::Resize(bounds) => {
            window.resize(bounds);
        }
        WindowCommand::EnterSplit { tab, side, animate } => {
            window.enter_split(tab, side, animate);
        }
        WindowCommand::ExitSplit(keep) => window.exit_split(keep),
        WindowCommand::ClosePane(side) => window.close_pane(side),
        WindowCommand::SwapSides => {
            window.swap_sides();
        }
        WindowCommand::BeginPreview(side) => window.begin_preview(side),
        WindowCommand::UpdatePreview(side) => window.update_preview_side(side),
        WindowCommand::EndPreview { cancel } => window.end_preview(cancel),
        WindowCommand::SetDivider(value) => {
            window.set_divider_fraction(value);
        }
        WindowCommand::UnloadInactive => return window.unload_all_inactive(),
        // Handled by the loop.
        WindowCommand::Shutdown => {}
    }
    Vec::new()
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => {
            tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
        }
        None => std::future::pending().await,
    }
}
