/// Ticker overlay controller
///
/// One instance per rendered ticker reference. Drives the phase machine in
/// [`OverlayPhase::next`] and performs the side effects of each transition:
/// - entering `HoverPreview` resolves the single-period preview
/// - entering or updating `ModalOpen` resolves the active timeframe and holds
///   an escape listener registration
/// - leaving `ModalOpen` drops that registration
///
/// A chart that fails to load only hides the chart element; it never moves
/// the phase.
use super::keyboard::{EscapeListener, KeyboardHub, OverlayId};
use super::state::{OverlayEvent, OverlayPhase};
use crate::arguments::is_debug_overlay_enabled;
use crate::charts::{ChartOverrides, ChartResolver, ChartSource, ExternalLink, Timeframe};
use crate::logger::{self, LogTag};
use std::sync::Arc;

/// One tab of the modal's timeframe strip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabView {
    pub timeframe: Timeframe,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalView {
    pub symbol: String,
    pub tabs: Vec<TabView>,
    pub source: ChartSource,
    pub links: Vec<ExternalLink>,
    /// Chart element hidden after a load failure
    pub chart_hidden: bool,
}

/// What an overlay instance currently renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayView {
    Hidden,
    Preview { source: ChartSource, chart_hidden: bool },
    Modal(ModalView),
}

pub struct TickerOverlay {
    id: OverlayId,
    symbol: String,
    overrides: ChartOverrides,
    preview_enabled: bool,
    resolver: Arc<ChartResolver>,
    keyboard: Arc<KeyboardHub>,
    phase: OverlayPhase,
    source: Option<ChartSource>,
    escape_listener: Option<EscapeListener>,
    chart_hidden: bool,
    resolutions: usize,
}

impl TickerOverlay {
    /// Overlay for `symbol` using the resolver's registered overrides
    pub fn new(symbol: &str, resolver: Arc<ChartResolver>, keyboard: Arc<KeyboardHub>) -> Self {
        let symbol = symbol.trim().to_uppercase();
        let overrides = resolver.overrides_for(&symbol);
        Self {
            id: keyboard.next_overlay_id(),
            symbol,
            overrides,
            preview_enabled: true,
            resolver,
            keyboard,
            phase: OverlayPhase::Idle,
            source: None,
            escape_listener: None,
            chart_hidden: false,
            resolutions: 0,
        }
    }

    /// Layer instance-level overrides over the registered ones
    pub fn with_overrides(mut self, overrides: &ChartOverrides) -> Self {
        self.overrides = self.overrides.merged_with(overrides);
        self
    }

    /// Disable the hover preview for this instance
    pub fn without_preview(mut self) -> Self {
        self.preview_enabled = false;
        self
    }

    pub fn id(&self) -> OverlayId {
        self.id
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn overrides(&self) -> &ChartOverrides {
        &self.overrides
    }

    pub fn phase(&self) -> OverlayPhase {
        self.phase
    }

    pub fn active_timeframe(&self) -> Option<Timeframe> {
        self.phase.timeframe()
    }

    /// Currently resolved chart source, if anything is shown
    pub fn source(&self) -> Option<&ChartSource> {
        self.source.as_ref()
    }

    pub fn is_chart_hidden(&self) -> bool {
        self.chart_hidden
    }

    /// Number of resolver calls made so far
    pub fn resolutions(&self) -> usize {
        self.resolutions
    }

    pub fn has_escape_listener(&self) -> bool {
        self.escape_listener.is_some()
    }

    /// Hover preview is shown only with the static backend available
    pub fn preview_available(&self) -> bool {
        self.preview_enabled && self.resolver.previews_enabled() && !self.overrides.disable_static
    }

    /// Apply an event and return the resulting phase
    pub fn handle(&mut self, event: OverlayEvent) -> OverlayPhase {
        let previous = self.phase;
        let next = previous.next(event, self.preview_available());

        if next == previous {
            if is_debug_overlay_enabled() {
                logger::debug(
                    LogTag::Overlay,
                    &format!("{} overlay {}: {:?} ignored in {}", self.symbol, self.id, event, previous),
                );
            }
            return previous;
        }

        self.enter(next);
        logger::debug(
            LogTag::Overlay,
            &format!("{} overlay {}: {} -> {}", self.symbol, self.id, previous, next),
        );
        next
    }

    pub fn pointer_enter(&mut self) -> OverlayPhase {
        self.handle(OverlayEvent::PointerEnter)
    }

    pub fn pointer_leave(&mut self) -> OverlayPhase {
        self.handle(OverlayEvent::PointerLeave)
    }

    pub fn click(&mut self) -> OverlayPhase {
        self.handle(OverlayEvent::Click)
    }

    pub fn press_escape(&mut self) -> OverlayPhase {
        self.handle(OverlayEvent::EscapeKey)
    }

    pub fn close(&mut self) -> OverlayPhase {
        self.handle(OverlayEvent::CloseAction)
    }

    pub fn backdrop_click(&mut self) -> OverlayPhase {
        self.handle(OverlayEvent::BackdropClick)
    }

    pub fn modal_body_click(&mut self) -> OverlayPhase {
        self.handle(OverlayEvent::ModalBodyClick)
    }

    pub fn select_timeframe(&mut self, timeframe: Timeframe) -> OverlayPhase {
        self.handle(OverlayEvent::SelectTimeframe(timeframe))
    }

    /// The rendered chart failed to load
    pub fn chart_failed(&mut self) {
        let Some(source) = &self.source else {
            return;
        };
        if !self.chart_hidden {
            logger::warning(
                LogTag::Overlay,
                &format!("{} chart unavailable ({:?}): {}", self.symbol, source.kind, source.url),
            );
        }
        self.chart_hidden = true;
    }

    pub fn view(&self) -> OverlayView {
        match (self.phase, &self.source) {
            (OverlayPhase::HoverPreview, Some(source)) => OverlayView::Preview {
                source: source.clone(),
                chart_hidden: self.chart_hidden,
            },
            (OverlayPhase::ModalOpen { timeframe }, Some(source)) => OverlayView::Modal(ModalView {
                symbol: self.symbol.clone(),
                tabs: Timeframe::TABS
                    .iter()
                    .map(|tf| TabView { timeframe: *tf, active: *tf == timeframe })
                    .collect(),
                source: source.clone(),
                links: self.resolver.external_links(&self.symbol, &self.overrides),
                chart_hidden: self.chart_hidden,
            }),
            _ => OverlayView::Hidden,
        }
    }

    fn enter(&mut self, next: OverlayPhase) {
        self.phase = next;
        self.chart_hidden = false;

        match next {
            OverlayPhase::Idle => {
                self.source = None;
                self.escape_listener = None;
            }
            OverlayPhase::HoverPreview => {
                self.source = self.resolver.preview(&self.symbol, &self.overrides);
                self.resolutions += 1;
            }
            OverlayPhase::ModalOpen { timeframe } => {
                if self.escape_listener.is_none() {
                    self.escape_listener = Some(self.keyboard.register(self.id));
                }
                self.source = Some(self.resolver.resolve(&self.symbol, timeframe, &self.overrides));
                self.resolutions += 1;
            }
        }
    }
}

impl std::fmt::Debug for TickerOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickerOverlay")
            .field("id", &self.id)
            .field("symbol", &self.symbol)
            .field("phase", &self.phase)
            .field("chart_hidden", &self.chart_hidden)
            .finish()
    }
}
