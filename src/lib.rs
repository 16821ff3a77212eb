//! Oil GUI input
//!
//! Input subsystem of a retained-mode GUI embedded in a game: pointer and
//! keyboard dispatch through a tree of event targets, click, double-click and
//! drag-and-drop gestures, popup dismissal, and a remappable event-quantity
//! layer that turns raw device state into game actions.

/// Runtime configuration profiles and gesture thresholds
pub mod config;

/// Desktop dispatch state - queue, gestures, popups, focus and hot keys
pub mod desktop;

/// Error types
pub mod error;

/// Queued input events and modifier flags
pub mod event;

/// Integer pixel geometry
pub mod geometry;

/// Device state, attachments and event quantities
pub mod input;

/// Event target capability, listener registries and the target tree
pub mod target;
