/// Overlay phases, input events and the pure transition table
use crate::charts::Timeframe;
use std::fmt;

/// Phase of one overlay instance
///
/// Preview and modal are variants of one enum, so an instance can never show
/// both at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OverlayPhase {
    #[default]
    Idle,
    HoverPreview,
    ModalOpen { timeframe: Timeframe },
}

impl OverlayPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, OverlayPhase::Idle)
    }

    pub fn is_preview(&self) -> bool {
        matches!(self, OverlayPhase::HoverPreview)
    }

    pub fn is_modal(&self) -> bool {
        matches!(self, OverlayPhase::ModalOpen { .. })
    }

    /// Selected tab while the modal is open
    pub fn timeframe(&self) -> Option<Timeframe> {
        match self {
            OverlayPhase::ModalOpen { timeframe } => Some(*timeframe),
            _ => None,
        }
    }

    /// Next phase for `event`; events with no transition leave the phase as is
    ///
    /// `preview_enabled` gates `Idle → HoverPreview`.
    pub fn next(self, event: OverlayEvent, preview_enabled: bool) -> OverlayPhase {
        use OverlayEvent::*;
        use OverlayPhase::*;

        match (self, event) {
            (Idle, PointerEnter) if preview_enabled => HoverPreview,
            (HoverPreview, PointerLeave) => Idle,
            (Idle | HoverPreview, Click) => ModalOpen { timeframe: Timeframe::DEFAULT },
            (ModalOpen { .. }, EscapeKey | CloseAction | BackdropClick) => Idle,
            (ModalOpen { .. }, SelectTimeframe(timeframe)) => ModalOpen { timeframe },
            (phase, _) => phase,
        }
    }
}

impl fmt::Display for OverlayPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayPhase::Idle => f.write_str("idle"),
            OverlayPhase::HoverPreview => f.write_str("hover-preview"),
            OverlayPhase::ModalOpen { timeframe } => write!(f, "modal({})", timeframe.label()),
        }
    }
}

/// User input delivered to an overlay instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayEvent {
    PointerEnter,
    PointerLeave,
    /// Click on the ticker trigger
    Click,
    EscapeKey,
    /// The modal's close button
    CloseAction,
    BackdropClick,
    /// Click inside the modal content; contained, never reaches the backdrop
    ModalBodyClick,
    SelectTimeframe(Timeframe),
}
