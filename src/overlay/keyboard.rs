/// Escape-key listener registry
///
/// Stands in for the window-level keydown listener: the hub is "listening"
/// only while at least one overlay holds a registration, and every
/// registration is an RAII guard removed when the overlay leaves its modal.
use crate::arguments::is_debug_overlay_enabled;
use crate::logger::{self, LogTag};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Overlay instance ID (unique per hub)
pub type OverlayId = u64;

/// Listener registration ID
pub type ListenerId = u64;

pub struct KeyboardHub {
    /// Active escape listeners (listener_id → owning overlay)
    listeners: Mutex<BTreeMap<ListenerId, OverlayId>>,
    next_listener_id: AtomicU64,
    next_overlay_id: AtomicU64,
}

impl KeyboardHub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            listeners: Mutex::new(BTreeMap::new()),
            next_listener_id: AtomicU64::new(1),
            next_overlay_id: AtomicU64::new(1),
        })
    }

    pub fn next_overlay_id(&self) -> OverlayId {
        self.next_overlay_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Register an escape listener for `overlay`
    pub fn register(self: &Arc<Self>, overlay: OverlayId) -> EscapeListener {
        let id = self.next_listener_id.fetch_add(1, Ordering::SeqCst);
        let active = {
            let mut listeners = self.listeners.lock();
            listeners.insert(id, overlay);
            listeners.len()
        };

        if is_debug_overlay_enabled() {
            logger::debug(
                LogTag::Overlay,
                &format!(
                    "KeyboardHub: listener {} registered for overlay {} (active={})",
                    id, overlay, active
                ),
            );
        }

        EscapeListener {
            hub: Arc::clone(self),
            id,
            overlay,
        }
    }

    fn unregister(&self, id: ListenerId) {
        let active = {
            let mut listeners = self.listeners.lock();
            listeners.remove(&id);
            listeners.len()
        };

        if is_debug_overlay_enabled() {
            logger::debug(
                LogTag::Overlay,
                &format!("KeyboardHub: listener {} unregistered (active={})", id, active),
            );
        }
    }

    pub fn active_listeners(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Whether an escape key press would reach anyone
    pub fn is_listening(&self) -> bool {
        !self.listeners.lock().is_empty()
    }

    /// Overlays an escape press is delivered to, in registration order
    pub fn escape_targets(&self) -> Vec<OverlayId> {
        self.listeners.lock().values().copied().collect()
    }
}

/// Registration handle; dropping it removes the listener
pub struct EscapeListener {
    hub: Arc<KeyboardHub>,
    id: ListenerId,
    overlay: OverlayId,
}

impl EscapeListener {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn overlay(&self) -> OverlayId {
        self.overlay
    }
}

impl Drop for EscapeListener {
    fn drop(&mut self) {
        self.hub.unregister(self.id);
    }
}

impl std::fmt::Debug for EscapeListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EscapeListener")
            .field("id", &self.id)
            .field("overlay", &self.overlay)
            .finish()
    }
}
