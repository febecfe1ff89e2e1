//! Transfer engines (C7): parameter, mission/fence/rally, and command
//! protocol state machines layered over the session dispatcher. Each is a
//! small, purely-synchronous state machine (spec.md §4.6): the dispatcher
//! feeds it decoded frames and periodic `poll()` calls, and acts on the
//! [`PollAction`]/outcome it returns. Keeping the transfer logic
//! synchronous mirrors the codec layer's "pure, no I/O" discipline and
//! makes the retry/timeout rules testable without a runtime.

pub mod command;
pub mod mission;
pub mod param;

use mav_proto::dialect::common::MavMessage;

/// What a transfer's `poll()` wants the dispatcher to do next.
pub enum PollAction {
    Send(MavMessage),
    Failed(u16),
    TimedOut,
    Done,
}

pub use mission::MissionItemSpec;
