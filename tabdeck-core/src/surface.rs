//! Rendering surface handles
//!
//! A rendering surface is the native object that displays a tab's web
//! content. It is expensive to create and cheap to hide, so each tab holds a
//! [`RenderSurfaceHandle`] that instantiates the surface lazily and releases
//! it on demand. The native side is reached only through the
//! [`RenderSurface`] and [`SurfaceFactory`] traits.
//!
//! The [`HeadlessFactory`] backend keeps a shared [`SurfaceLedger`] instead
//! of talking to a windowing system. It backs the CLI simulator and the
//! tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::types::{Rect, TabId};

/// A native rendering surface.
///
/// Dropping the value releases the native resource.
pub trait RenderSurface {
    /// Parents the surface into the container at `frame`.
    ///
    /// Hidden surfaces stay attached so that switching back to them is cheap.
    fn place(&mut self, frame: Rect, visible: bool);

    /// Removes the surface from the container without destroying it.
    fn detach(&mut self);
}

/// Creates native rendering surfaces on demand.
pub trait SurfaceFactory {
    /// Instantiates a new surface for `tab` showing `url`.
    fn create_surface(&mut self, tab: TabId, url: &str) -> Box<dyn RenderSurface>;
}

/// Owns the lazily instantiated surface of a single tab.
#[derive(Default)]
pub struct RenderSurfaceHandle {
    surface: Option<Box<dyn RenderSurface>>,
}

impl RenderSurfaceHandle {
    /// Creates an empty handle (the tab starts unloaded).
    #[must_use]
    pub fn new() -> Self {
        Self { surface: None }
    }

    /// Returns true if a surface is currently instantiated.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.surface.is_some()
    }

    /// Instantiates the surface if needed.
    ///
    /// Returns `true` if a new surface was created.
    pub fn ensure_with(
        &mut self,
        factory: &mut dyn SurfaceFactory,
        tab: TabId,
        url: &str,
    ) -> bool {
        if self.surface.is_some() {
            return false;
        }
        self.surface = Some(factory.create_surface(tab, url));
        true
    }

    /// Releases the surface. Releasing an unloaded handle is a no-op.
    ///
    /// Returns `true` if a surface was released.
    pub fn release(&mut self) -> bool {
        match self.surface.take() {
            Some(mut surface) => {
                surface.detach();
                true
            }
            None => false,
        }
    }

    /// Returns the instantiated surface, if any.
    pub fn get_mut(&mut self) -> Option<&mut (dyn RenderSurface + 'static)> {
        self.surface.as_deref_mut()
    }
}

impl fmt::Debug for RenderSurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderSurfaceHandle")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

// ============================================================================
// Headless backend
// ============================================================================

/// Placement of a headless surface as last reported by the compositor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePlacement {
    /// Frame inside the container.
    pub frame: Rect,
    /// Whether the surface is shown.
    pub visible: bool,
}

#[derive(Debug, Default)]
struct LedgerInner {
    live: HashMap<TabId, Option<SurfacePlacement>>,
    created: usize,
    released: usize,
}

/// Shared record of every headless surface.
///
/// Cloning the ledger yields another handle to the same record.
#[derive(Debug, Clone, Default)]
pub struct SurfaceLedger {
    inner: Rc<RefCell<LedgerInner>>,
}

impl SurfaceLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if a surface exists for `tab`.
    #[must_use]
    pub fn is_live(&self, tab: TabId) -> bool {
        self.inner.borrow().live.contains_key(&tab)
    }

    /// Number of surfaces currently alive.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.inner.borrow().live.len()
    }

    /// Total number of surfaces ever created.
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.inner.borrow().created
    }

    /// Total number of surfaces released.
    #[must_use]
    pub fn released_count(&self) -> usize {
        self.inner.borrow().released
    }

    /// Current placement of the surface for `tab`, `None` if detached or absent.
    #[must_use]
    pub fn placement(&self, tab: TabId) -> Option<SurfacePlacement> {
        self.inner.borrow().live.get(&tab).copied().flatten()
    }

    /// Tabs whose surfaces are attached and visible.
    #[must_use]
    pub fn visible_tabs(&self) -> Vec<TabId> {
        let inner = self.inner.borrow();
        let mut tabs: Vec<TabId> = inner
            .live
            .iter()
            .filter(|(_, placement)| placement.is_some_and(|p| p.visible))
            .map(|(id, _)| *id)
            .collect();
        tabs.sort();
        tabs
    }

    fn record_created(&self, tab: TabId) {
        let mut inner = self.inner.borrow_mut();
        inner.live.insert(tab, None);
        inner.created += 1;
    }

    fn record_placement(&self, tab: TabId, placement: Option<SurfacePlacement>) {
        if let Some(slot) = self.inner.borrow_mut().live.get_mut(&tab) {
            *slot = placement;
        }
    }

    fn record_released(&self, tab: TabId) {
        let mut inner = self.inner.borrow_mut();
        if inner.live.remove(&tab).is_some() {
            inner.released += 1;
        }
    }
}

/// A surface that only reports its placement to a [`SurfaceLedger`].
#[derive(Debug)]
pub struct HeadlessSurface {
    tab: TabId,
    ledger: SurfaceLedger,
}

impl RenderSurface for HeadlessSurface {
    fn place(&mut self, frame: Rect, visible: bool) {
        self.ledger
            .record_placement(self.tab, Some(SurfacePlacement { frame, visible }));
    }

    fn detach(&mut self) {
        self.ledger.record_placement(self.tab, None);
    }
}

impl Drop for HeadlessSurface {
    fn drop(&mut self) {
        self.ledger.record_released(self.tab);
    }
}

/// Factory producing [`HeadlessSurface`] values.
#[derive(Debug, Clone, Default)]
pub struct HeadlessFactory {
    ledger: SurfaceLedger,
}

impl HeadlessFactory {
    /// Creates a factory with a fresh ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a factory reporting into an existing ledger.
    #[must_use]
    pub fn with_ledger(ledger: SurfaceLedger) -> Self {
        Self { ledger }
    }

    /// Returns a handle to the ledger.
    #[must_use]
    pub fn ledger(&self) -> SurfaceLedger {
        self.ledger.clone()
    }
}

impl SurfaceFactory for HeadlessFactory {
    fn create_surface(&mut self, tab: TabId, url: &str) -> Box<dyn RenderSurface> {
        tracing::trace!(tab_id = %tab, url, "Creating headless surface");
        self.ledger.record_created(tab);
        Box::new(HeadlessSurface {
            tab,
            ledger: self.ledger.clone(),
        })
    }
}
