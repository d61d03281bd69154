/// Collection of overlay instances sharing one keyboard hub
///
/// Models a page with many rendered tickers: each mount is an independent
/// [`TickerOverlay`], and a window-level escape press is routed only to the
/// instances holding an escape listener.
use super::controller::TickerOverlay;
use super::keyboard::{KeyboardHub, OverlayId};
use super::state::{OverlayEvent, OverlayPhase};
use crate::charts::{ChartOverrides, ChartResolver};
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct OverlayBoard {
    resolver: Arc<ChartResolver>,
    keyboard: Arc<KeyboardHub>,
    overlays: BTreeMap<OverlayId, TickerOverlay>,
}

impl OverlayBoard {
    pub fn new(resolver: Arc<ChartResolver>) -> Self {
        Self {
            resolver,
            keyboard: KeyboardHub::new(),
            overlays: BTreeMap::new(),
        }
    }

    pub fn keyboard(&self) -> &Arc<KeyboardHub> {
        &self.keyboard
    }

    /// Mount an overlay for `symbol`; the same symbol may be mounted many times
    pub fn mount(&mut self, symbol: &str, overrides: &ChartOverrides) -> OverlayId {
        let overlay = TickerOverlay::new(symbol, self.resolver.clone(), self.keyboard.clone())
            .with_overrides(overrides);
        let id = overlay.id();
        self.overlays.insert(id, overlay);
        id
    }

    /// Unmount an overlay, releasing its escape listener if it held one
    pub fn unmount(&mut self, id: OverlayId) -> bool {
        self.overlays.remove(&id).is_some()
    }

    pub fn get(&self, id: OverlayId) -> Option<&TickerOverlay> {
        self.overlays.get(&id)
    }

    pub fn get_mut(&mut self, id: OverlayId) -> Option<&mut TickerOverlay> {
        self.overlays.get_mut(&id)
    }

    /// Deliver an event to one overlay; `None` if it is not mounted
    pub fn dispatch(&mut self, id: OverlayId, event: OverlayEvent) -> Option<OverlayPhase> {
        self.overlays.get_mut(&id).map(|overlay| overlay.handle(event))
    }

    /// Window-level escape press; returns the overlays it closed
    pub fn press_escape(&mut self) -> Vec<OverlayId> {
        let mut closed = Vec::new();
        for id in self.keyboard.escape_targets() {
            if let Some(overlay) = self.overlays.get_mut(&id) {
                if overlay.press_escape().is_idle() {
                    closed.push(id);
                }
            }
        }
        closed
    }

    pub fn open_modals(&self) -> Vec<OverlayId> {
        self.overlays
            .iter()
            .filter(|(_, overlay)| overlay.phase().is_modal())
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_routes_to_open_modals_only() {
        let mut board = OverlayBoard::new(Arc::new(ChartResolver::default()));
        let first = board.mount("NVDA", &ChartOverrides::none());
        let second = board.mount("NVDA", &ChartOverrides::none());
        let hovered = board.mount("AMD", &ChartOverrides::none());

        board.dispatch(first, OverlayEvent::Click);
        board.dispatch(second, OverlayEvent::Click);
        board.dispatch(hovered, OverlayEvent::PointerEnter);
        assert_eq!(board.open_modals(), vec![first, second]);

        assert_eq!(board.press_escape(), vec![first, second]);
        assert!(board.open_modals().is_empty());
        assert!(!board.keyboard().is_listening());
        assert!(board.get(hovered).unwrap().phase().is_preview());

        // Nothing listening: escape is a no-op
        assert!(board.press_escape().is_empty());
    }

    #[test]
    fn test_unmount_releases_listener() {
        let mut board = OverlayBoard::new(Arc::new(ChartResolver::default()));
        let id = board.mount("ES", &ChartOverrides::none());
        board.dispatch(id, OverlayEvent::Click);
        assert_eq!(board.keyboard().active_listeners(), 1);

        assert!(board.unmount(id));
        assert_eq!(board.keyboard().active_listeners(), 0);
        assert_eq!(board.dispatch(id, OverlayEvent::EscapeKey), None);
        assert!(board.is_empty());
    }
}
