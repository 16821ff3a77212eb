//! Error types for programmer mistakes surfaced by the input subsystem
//!
//! Veto outcomes are not errors; see [`crate::target::Verdict`].

use thiserror::Error;

use crate::desktop::HotKey;
use crate::input::{AttachmentType, InputSource, KEY_CODE_COUNT};
use crate::target::TargetId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("key code {0} is outside the device key-code space (0..{KEY_CODE_COUNT})")]
    InvalidKeyCode(u16),

    #[error("attachment type {kind:?} cannot be bound to {input:?}")]
    AttachmentKindMismatch {
        input: InputSource,
        kind: AttachmentType,
    },

    #[error("event target {0:?} is not attached to the desktop tree")]
    UnknownTarget(TargetId),

    #[error("the desktop root cannot be removed or reparented")]
    RootTarget,

    #[error("hot key {0} is already registered")]
    DuplicateHotKey(HotKey),
}

pub type Result<T, E = InputError> = std::result::Result<T, E>;
