//! WASM bindings for encore-playback
//!
//! Browser implementations of the platform traits, plus a JavaScript-facing
//! wrapper around [`PlayerOrchestrator`](crate::PlayerOrchestrator).
//!
//! Media element and widget callbacks never call into the player directly.
//! They push tagged events into an inbox that
//! [`WasmMusicPlayer::tick`] drains, so the player is never re-entered from
//! inside one of its own calls.

pub mod dom;
pub mod logging;
pub mod player;

pub use player::WasmMusicPlayer;

use crate::backend::BackendEvent;
use crate::types::ResourceId;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Platform notifications waiting for the next tick
pub type Inbox = Rc<RefCell<VecDeque<(ResourceId, BackendEvent)>>>;
