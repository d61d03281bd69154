//! Ticker overlay controller
//!
//! Hover preview and modal chart viewer for one rendered ticker, as a single
//! phase machine (`Idle | HoverPreview | ModalOpen(timeframe)`) built on the
//! chart resolver.

pub mod board;
pub mod controller;
pub mod keyboard;
pub mod state;

pub use board::OverlayBoard;
pub use controller::{ModalView, OverlayView, TabView, TickerOverlay};
pub use keyboard::{EscapeListener, KeyboardHub, ListenerId, OverlayId};
pub use state::{OverlayEvent, OverlayPhase};
