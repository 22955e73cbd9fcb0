//! Scenario scripts for `tabdeck simulate`
//!
//! A script declares the window size, the initial tabs and a list of steps:
//!
//! ```toml
//! [window]
//! width = 1200.0
//! height = 800.0
//!
//! [[tabs]]
//! name = "docs"
//! url = "https://docs.rs"
//!
//! [[steps]]
//! action = "select"
//! tab = "docs"
//!
//! [[steps]]
//! action = "advance"
//! secs = 301
//! ```

use std::path::Path;

use serde::Deserialize;
use tabdeck_core::tabs::TabKind;
use tabdeck_core::types::PaneSide;

use crate::error::CliError;

/// A parsed scenario.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    /// Window geometry and overrides.
    #[serde(default)]
    pub window: WindowSpec,
    /// Tabs that exist before the first step.
    #[serde(default)]
    pub tabs: Vec<TabSpec>,
    /// Steps replayed in order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Window section of a script.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowSpec {
    /// Container width.
    pub width: f64,
    /// Container height.
    pub height: f64,
    /// Overrides the configured unload timeout.
    pub unload_timeout_secs: Option<u64>,
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
            unload_timeout_secs: None,
        }
    }
}

/// A tab declared up front.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TabSpec {
    /// Name used by steps to refer to the tab.
    pub name: String,
    /// Page address.
    #[serde(default = "blank_url")]
    pub url: String,
    /// Sidebar placement.
    #[serde(default)]
    pub kind: TabKind,
    /// Tab group.
    #[serde(default)]
    pub group: Option<String>,
}

fn blank_url() -> String {
    "about:blank".to_string()
}

const fn default_pin_kind() -> TabKind {
    TabKind::Pinned
}

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Step {
    /// Open a regular tab.
    Open {
        /// Name for later steps.
        name: String,
        /// Page address.
        #[serde(default = "blank_url")]
        url: String,
    },
    /// Change a tab's sidebar placement.
    Pin {
        /// Target tab.
        tab: String,
        /// New kind.
        #[serde(default = "default_pin_kind")]
        kind: TabKind,
    },
    /// Make a tab current.
    Select {
        /// Target tab.
        tab: String,
    },
    /// Show a tab next to the current one.
    Split {
        /// Tab to place.
        tab: String,
        /// Pane to place it in.
        side: PaneSide,
        /// Animate the divider.
        #[serde(default)]
        animate: bool,
    },
    /// Leave split view keeping one pane.
    ExitSplit {
        /// Pane that survives.
        keep: PaneSide,
    },
    /// Close one pane.
    ClosePane {
        /// Pane to close.
        side: PaneSide,
    },
    /// Exchange the panes.
    Swap,
    /// Start or move a drag preview.
    Preview {
        /// Side under the pointer.
        side: PaneSide,
    },
    /// Finish a drag preview.
    EndPreview {
        /// Revert the layout.
        #[serde(default)]
        cancel: bool,
    },
    /// Move the divider.
    Divider {
        /// Requested left-pane share.
        fraction: f64,
    },
    /// Report media activity.
    Media {
        /// Target tab.
        tab: String,
        /// Audio playing.
        #[serde(default)]
        audio: bool,
        /// Video playing.
        #[serde(default)]
        video: bool,
        /// Audio content present.
        #[serde(default)]
        content: bool,
    },
    /// Close a tab.
    Close {
        /// Target tab.
        tab: String,
    },
    /// Let time pass and run due work.
    Advance {
        /// Seconds to advance.
        secs: f64,
    },
    /// Change the unload timeout.
    Timeout {
        /// New timeout in seconds.
        secs: u64,
    },
    /// Resize the container.
    Resize {
        /// New width.
        width: f64,
        /// New height.
        height: f64,
    },
    /// Release every surface that is not shown or playing media.
    UnloadInactive,
}

impl Step {
    /// The `action` tag of the step.
    pub const fn action(&self) -> &'static str {
        match self {
            Self::Open { .. } => "open",
            Self::Pin { .. } => "pin",
            Self::Select { .. } => "select",
            Self::Split { .. } => "split",
            Self::ExitSplit { .. } => "exit-split",
            Self::ClosePane { .. } => "close-pane",
            Self::Swap => "swap",
            Self::Preview { .. } => "preview",
            Self::EndPreview { .. } => "end-preview",
            Self::Divider { .. } => "divider",
            Self::Media { .. } => "media",
            Self::Close { .. } => "close",
            Self::Advance { .. } => "advance",
            Self::Timeout { .. } => "timeout",
            Self::Resize { .. } => "resize",
            Self::UnloadInactive => "unload-inactive",
        }
    }
}

impl Script {
    /// Parses a script from TOML text.
    pub fn parse(content: &str) -> Result<Self, CliError> {
        let script: Self =
            toml::from_str(content).map_err(|e| CliError::Script(e.to_string()))?;
        script.check()?;
        Ok(script)
    }

    /// Reads and parses a script file.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Script(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::parse(&content)
    }

    fn check(&self) -> Result<(), CliError> {
        let WindowSpec { width, height, .. } = self.window;
        if !(width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0) {
            return Err(CliError::Script(format!(
                "Invalid window size {width}x{height}"
            )));
        }
        let mut names = std::collections::HashSet::new();
        for tab in &self.tabs {
            if !names.insert(tab.name.as_str()) {
                return Err(CliError::Script(format!("Duplicate tab name '{}'", tab.name)));
            }
        }
        Ok(())
    }
}
