//! Protocol engine for the Helios KWL serial bus.
//!
//! The engine sits between a byte source/sink and the console layer:
//!
//! ```text
//! bytes in ──► FrameAssembler ──► Interpreter ──► reports + SessionState
//! turn marker ─────────────────► Sequencer ────► one outbound frame
//! ```
//!
//! The [`Interpreter`](interpreter::Interpreter) decodes bursts of inbound
//! frames and maintains the shared [`SessionState`](session::SessionState);
//! the [`Sequencer`](sequencer::Sequencer) multiplexes pending get/set
//! operations onto the controller-signaled transmit windows, one frame per
//! window. Everything runs on a single execution context; the interpreter
//! and sequencer alternate per received frame, so the session state needs no
//! locking.

pub mod interpreter;
pub mod report;
pub mod sequencer;
pub mod session;

pub use interpreter::{Interpreter, Report};
pub use sequencer::{
    BypassProbe, BypassRequest, FanRequest, PendingOp, PreheatProbe, Sequencer, TimerRequest, Turn,
};
pub use session::SessionState;
