//! Control panel model shared by every demo and every frontend.
//!
//! Demos declare their controls once; the desktop app draws them with egui
//! and the CLI can drive them by key. Widgets never touch the scene
//! directly: they write panel values and queue actions, and the owning demo
//! reads both on its next update.
//!
//! # Invariants
//! - Slider values always lie in `[min, max]` and on a `step` boundary.
//! - Every value change and button press produces exactly one action.

mod panel;

pub use panel::{Control, ControlEntry, ControlPanel, Folder, PanelAction, PanelError};
