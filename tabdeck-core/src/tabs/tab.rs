//! The tab entity as seen by the surface subsystem

use serde::{Deserialize, Serialize};

use crate::surface::{RenderSurfaceHandle, SurfaceFactory};
use crate::types::TabId;

/// Where a tab lives in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TabKind {
    /// Ordinary tab in a space's regular list.
    #[default]
    Regular,
    /// Pinned tab shared across every space.
    Pinned,
    /// Pinned tab belonging to a single space.
    SpacePinned,
}

/// Media activity reported by the rendering engine.
///
/// Any set flag exempts the tab from idle eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MediaActivity {
    /// Audio is currently playing.
    pub playing_audio: bool,
    /// Video is currently playing.
    pub playing_video: bool,
    /// The page holds audio content (e.g. a paused call).
    pub has_audio_content: bool,
}

impl MediaActivity {
    /// No media activity.
    pub const IDLE: Self = Self {
        playing_audio: false,
        playing_video: false,
        has_audio_content: false,
    };

    /// Returns true if any flag is set.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.playing_audio || self.playing_video || self.has_audio_content
    }
}

/// A browser tab.
///
/// Tabs are created and destroyed by the tab manager. This subsystem only
/// manages the rendering surface inside the tab. A tab is "unloaded" exactly
/// when its surface is not instantiated.
#[derive(Debug)]
pub struct Tab {
    /// Stable identifier.
    pub id: TabId,
    /// Page address used when the surface is (re)created.
    pub url: String,
    /// Display title.
    pub title: String,
    /// Sidebar placement.
    pub kind: TabKind,
    /// Tab group (folder) membership.
    pub group: Option<String>,
    /// Current media activity.
    pub media: MediaActivity,
    surface: RenderSurfaceHandle,
}

impl Tab {
    /// Creates a new unloaded regular tab.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            id: TabId::new(),
            title: url.clone(),
            url,
            kind: TabKind::Regular,
            group: None,
            media: MediaActivity::IDLE,
            surface: RenderSurfaceHandle::new(),
        }
    }

    /// Sets the tab kind.
    #[must_use]
    pub fn with_kind(mut self, kind: TabKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the group membership.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Returns true if no surface is instantiated.
    #[must_use]
    pub fn is_unloaded(&self) -> bool {
        !self.surface.is_loaded()
    }

    /// Returns true if the tab is pinned (globally or per space).
    #[must_use]
    pub fn is_pinned(&self) -> bool {
        self.kind != TabKind::Regular
    }

    /// Pinned and grouped tabs are duplicated before being placed in a split,
    /// so that the original keeps its sidebar slot.
    #[must_use]
    pub fn needs_split_duplicate(&self) -> bool {
        self.is_pinned() || self.group.is_some()
    }

    /// Instantiates the surface if needed. Returns `true` if one was created.
    pub fn ensure_surface(&mut self, factory: &mut dyn SurfaceFactory) -> bool {
        let created = self.surface.ensure_with(factory, self.id, &self.url);
        if created {
            tracing::debug!(tab_id = %self.id, url = %self.url, "Surface instantiated");
        }
        created
    }

    /// Releases the surface. Returns `true` if one was released.
    pub fn release_surface(&mut self) -> bool {
        let released = self.surface.release();
        if released {
            tracing::debug!(tab_id = %self.id, "Surface released");
        }
        released
    }

    /// Mutable access to the surface handle.
    pub fn surface_mut(&mut self) -> &mut RenderSurfaceHandle {
        &mut self.surface
    }
}
