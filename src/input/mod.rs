//! Device input: raw state snapshots and the event-quantity layer
//!
//! Device samples are normalized by the [`InputCollector`], which keeps an
//! [`InputState`] snapshot for the frame and produces discrete
//! [`InputEvent`](crate::event::InputEvent)s for the desktop queue. The same
//! snapshot drives the [`InputManager`], which turns held keys, key edges and
//! axis motion into per-event-number quantities through remappable
//! attachments.
//!
//! # Architecture
//!
//! ```text
//! Device samples → InputCollector → InputEvent → Desktop queue
//!                        ↓
//!                   InputState ──→ InputManager ←── Scene attachments
//!                                  (quantities)
//!                                        ↓
//!                         host polls get_event_quantity()
//! ```
//!
//! # Usage
//!
//! ```ignore
//! // Once per frame, after feeding device samples to the collector
//! collector.flush_into(&mut desktop);
//! let report = desktop.process_events();
//! manager.update_filtered(collector.state(), Some(&scene), elapsed_ms, &report.consumed_keys);
//! let forward = manager.get_event_quantity(MOVE_FORWARD);
//! collector.advance_frame();
//! ```

mod attachment;
mod collector;
mod key;
mod manager;
mod scene;
mod state;

pub use attachment::{AttachmentType, Axis, InputAttachment, InputAttachmentSet, InputSource};
pub use collector::InputCollector;
pub use key::{KEY_CODE_COUNT, KeyCode};
pub use manager::InputManager;
pub use scene::Scene;
pub use state::{ButtonState, InputState, JoystickState, KeyboardState, MouseButtons, MouseState};
