//! Scenario replay command.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use tabdeck_core::clock::ManualClock;
use tabdeck_core::config::AppSettings;
use tabdeck_core::split::EnterSplitOutcome;
use tabdeck_core::surface::{HeadlessFactory, SurfaceLedger};
use tabdeck_core::tabs::{MediaActivity, Tab, TabCollection, TabKind, TabStore};
use tabdeck_core::tracing::span_names;
use tabdeck_core::types::{PaneSide, Rect, TabId};
use tabdeck_core::window::BrowserWindow;

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::script::{Script, Step, TabSpec};
use crate::util::load_settings;

/// Simulate command handler
pub fn cmd_simulate(
    config_path: Option<&Path>,
    script_path: &Path,
    format: OutputFormat,
) -> Result<(), CliError> {
    let settings = load_settings(config_path)?;
    let script = Script::load(script_path)?;
    let snapshots = run_script(&script, &settings)?;

    match format {
        OutputFormat::Text => print!("{}", render_text(&snapshots)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&snapshots)
                .map_err(|e| CliError::Output(format!("Failed to serialize: {e}")))?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Replays every step of `script` and returns a snapshot per step.
pub fn run_script(script: &Script, settings: &AppSettings) -> Result<Vec<StepSnapshot>, CliError> {
    let mut simulation = Simulation::new(script, settings)?;
    script
        .steps
        .iter()
        .enumerate()
        .map(|(index, step)| simulation.run_step(index + 1, step))
        .collect()
}

/// Window state after one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepSnapshot {
    /// One-based step number.
    pub step: usize,
    /// The step's action tag.
    pub action: &'static str,
    /// Simulated seconds since the start.
    pub elapsed_secs: f64,
    /// Result of a split request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<&'static str>,
    /// Current tab.
    pub current: Option<String>,
    /// Split layout, when split.
    pub split: Option<SplitSnapshot>,
    /// Tabs whose surfaces are on screen.
    pub shown: Vec<String>,
    /// Tabs with an instantiated surface.
    pub loaded: Vec<String>,
    /// Tabs released during the step.
    pub evicted: Vec<String>,
}

/// Split layout in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitSnapshot {
    /// Left pane.
    pub left: Option<String>,
    /// Right pane.
    pub right: Option<String>,
    /// Left pane share.
    pub divider: f64,
    /// Focused pane.
    pub active: PaneSide,
    /// Drag preview side.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<PaneSide>,
}

struct Simulation {
    window: BrowserWindow,
    clock: ManualClock,
    ledger: SurfaceLedger,
    ids: HashMap<String, TabId>,
    order: Vec<(TabId, String)>,
}

impl Simulation {
    fn new(script: &Script, settings: &AppSettings) -> Result<Self, CliError> {
        let mut settings = settings.clone();
        if let Some(secs) = script.window.unload_timeout_secs {
            settings.surfaces.unload_timeout_secs = secs;
        }

        let factory = HeadlessFactory::new();
        let ledger = factory.ledger();
        let clock = ManualClock::new();
        let window = BrowserWindow::from_settings(
            TabStore::new(Box::new(factory)),
            Box::new(clock.clone()),
            Rect::from_size(script.window.width, script.window.height),
            &settings,
        )?;

        let mut simulation = Self {
            window,
            clock,
            ledger,
            ids: HashMap::new(),
            order: Vec::new(),
        };
        for spec in &script.tabs {
            simulation.declare(spec)?;
        }
        Ok(simulation)
    }

    fn declare(&mut self, spec: &TabSpec) -> Result<TabId, CliError> {
        if self.ids.contains_key(&spec.name) {
            return Err(CliError::Script(format!(
                "Duplicate tab name '{}'",
                spec.name
            )));
        }
        let mut tab = Tab::new(spec.url.clone()).with_kind(spec.kind);
        if let Some(group) = &spec.group {
            tab = tab.with_group(group.clone());
        }
        let id = self.window.tabs_mut().insert_tab(tab);
        self.register(id, spec.name.clone());
        Ok(id)
    }

    fn register(&mut self, id: TabId, name: String) {
        self.ids.insert(name.clone(), id);
        self.order.push((id, name));
    }

    /// Names a split duplicate after its source tab.
    fn register_duplicate(&mut self, id: TabId, source: &str) {
        let mut name = format!("{source}'");
        while self.ids.contains_key(&name) {
            name.push('\'');
        }
        self.register(id, name);
    }

    fn resolve(&self, name: &str) -> Result<TabId, CliError> {
        self.ids
            .get(name)
            .copied()
            .ok_or_else(|| CliError::UnknownTab(name.to_string()))
    }

    fn name_of(&self, id: TabId) -> String {
        self.order
            .iter()
            .find(|(tab, _)| *tab == id)
            .map_or_else(|| id.to_string(), |(_, name)| name.clone())
    }

    fn run_step(&mut self, index: usize, step: &Step) -> Result<StepSnapshot, CliError> {
        let _span =
            tracing::info_span!(span_names::SIMULATE_STEP, step = index, action = step.action())
                .entered();

        let mut evicted = Vec::new();
        let mut outcome = None;

        match step {
            Step::Open { name, url } => {
                self.declare(&TabSpec {
                    name: name.clone(),
                    url: url.clone(),
                    kind: TabKind::Regular,
                    group: None,
                })?;
            }
            Step::Pin { tab, kind } => {
                let id = self.resolve(tab)?;
                self.window.tabs_mut().set_kind(id, *kind);
                self.window.reconcile();
            }
            Step::Select { tab } => {
                let id = self.resolve(tab)?;
                self.window.select_tab(id);
            }
            Step::Split { tab, side, animate } => {
                let id = self.resolve(tab)?;
                let result = self.window.enter_split(id, *side, *animate);
                if let Some(placed) = result.placed()
                    && placed != id
                {
                    self.register_duplicate(placed, tab);
                }
                outcome = Some(outcome_label(&result));
            }
            Step::ExitSplit { keep } => self.window.exit_split(*keep),
            Step::ClosePane { side } => self.window.close_pane(*side),
            Step::Swap => {
                self.window.swap_sides();
            }
            Step::Preview { side } => {
                if self.window.split_state().is_preview_active() {
                    self.window.update_preview_side(*side);
                } else {
                    self.window.begin_preview(*side);
                }
            }
            Step::EndPreview { cancel } => self.window.end_preview(*cancel),
            Step::Divider { fraction } => {
                self.window.set_divider_fraction(*fraction);
            }
            Step::Media {
                tab,
                audio,
                video,
                content,
            } => {
                let id = self.resolve(tab)?;
                self.window.set_media_activity(
                    id,
                    MediaActivity {
                        playing_audio: *audio,
                        playing_video: *video,
                        has_audio_content: *content,
                    },
                );
            }
            Step::Close { tab } => {
                let id = self.resolve(tab)?;
                self.window.close_tab(id);
                self.ids.remove(tab);
                self.order.retain(|(other, _)| *other != id);
            }
            Step::Advance { secs } => {
                let by = Duration::try_from_secs_f64(*secs)
                    .map_err(|e| CliError::Script(format!("Invalid advance of {secs}s: {e}")))?;
                self.clock.advance(by);
                evicted = self.window.tick().evicted;
            }
            Step::Timeout { secs } => {
                self.window.set_unload_timeout(Duration::from_secs(*secs));
            }
            Step::Resize { width, height } => {
                if !(width.is_finite() && height.is_finite() && *width >= 0.0 && *height >= 0.0) {
                    return Err(CliError::Script(format!(
                        "Invalid window size {width}x{height}"
                    )));
                }
                self.window.resize(Rect::from_size(*width, *height));
            }
            Step::UnloadInactive => evicted = self.window.unload_all_inactive(),
        }

        let snapshot = self.snapshot(index, step.action(), outcome, &evicted);
        tracing::debug!(
            shown = snapshot.shown.len(),
            loaded = snapshot.loaded.len(),
            evicted = snapshot.evicted.len(),
            "Step applied"
        );
        Ok(snapshot)
    }

    fn snapshot(
        &self,
        step: usize,
        action: &'static str,
        outcome: Option<&'static str>,
        evicted: &[TabId],
    ) -> StepSnapshot {
        let state = self.window.split_state();
        let split = state.is_split().then(|| SplitSnapshot {
            left: state.left_tab_id().map(|id| self.name_of(id)),
            right: state.right_tab_id().map(|id| self.name_of(id)),
            divider: state.divider_fraction(),
            active: state.active_side(),
            preview: state.preview_side(),
        });

        let names_where = |keep: &dyn Fn(TabId) -> bool| -> Vec<String> {
            self.order
                .iter()
                .filter(|(id, _)| keep(*id))
                .map(|(_, name)| name.clone())
                .collect()
        };

        StepSnapshot {
            step,
            action,
            elapsed_secs: self.clock.elapsed().as_secs_f64(),
            outcome,
            current: self.window.tabs().current_tab().map(|id| self.name_of(id)),
            split,
            shown: names_where(&|id| {
                self.ledger.placement(id).is_some_and(|placement| placement.visible)
            }),
            loaded: names_where(&|id| self.window.tabs().is_loaded(id)),
            evicted: evicted.iter().map(|id| self.name_of(*id)).collect(),
        }
    }
}

const fn outcome_label(outcome: &EnterSplitOutcome) -> &'static str {
    match outcome {
        EnterSplitOutcome::Entered { .. } => "entered",
        EnterSplitOutcome::Replaced { .. } => "replaced",
        EnterSplitOutcome::Swapped => "swapped",
        EnterSplitOutcome::AlreadyPlaced => "already-placed",
        EnterSplitOutcome::SelfPairing => "self-pairing",
        EnterSplitOutcome::NoCurrentTab => "no-current-tab",
        EnterSplitOutcome::UnknownTab => "unknown-tab",
    }
}

/// Renders one line per snapshot.
pub fn render_text(snapshots: &[StepSnapshot]) -> String {
    let mut out = String::new();
    for snap in snapshots {
        let _ = write!(
            out,
            "[{:>3}] t={:>8.1}s {:<15}",
            snap.step, snap.elapsed_secs, snap.action
        );
        if let Some(outcome) = snap.outcome {
            let _ = write!(out, " ({outcome})");
        }
        let _ = write!(
            out,
            " current={}",
            snap.current.as_deref().unwrap_or("-")
        );
        if let Some(split) = &snap.split {
            let _ = write!(
                out,
                " split={}|{}@{:.2}",
                split.left.as_deref().unwrap_or("-"),
                split.right.as_deref().unwrap_or("-"),
                split.divider
            );
            if let Some(preview) = split.preview {
                let _ = write!(out, " preview={preview}");
            }
        }
        let _ = write!(
            out,
            " shown=[{}] loaded=[{}]",
            snap.shown.join(","),
            snap.loaded.join(",")
        );
        if !snap.evicted.is_empty() {
            let _ = write!(out, " evicted=[{}]", snap.evicted.join(","));
        }
        out.push('\n');
    }
    out
}
