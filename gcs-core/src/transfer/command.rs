//! Command execution (spec.md §4.6.3): issue `COMMAND_LONG`/`COMMAND_INT`,
//! await a matching `COMMAND_ACK`, retry on timeout, and keep waiting past
//! the normal deadline while the ack reports `MAV_RESULT_IN_PROGRESS`.

use std::time::{Duration, Instant};

use mav_proto::dialect::common::{CommandAck, CommandInt, CommandLong, MavMessage, MavResult};

use super::PollAction;

const RETRY_DELAY: Duration = Duration::from_secs(1);
const MAX_RETRIES: u32 = 3;
const IN_PROGRESS_EXTENSION: Duration = Duration::from_secs(10);

pub struct CommandExecution {
    command: u16,
    retry_count: u32,
    deadline: Instant,
    extended_until: Option<Instant>,
    msg: MavMessage,
}

impl CommandExecution {
    pub fn start_long(now: Instant, command: u16, params: [f32; 7], confirmation: u8, target_system: u8, target_component: u8) -> (Self, MavMessage) {
        let msg = MavMessage::CommandLong(CommandLong {
            param1: params[0],
            param2: params[1],
            param3: params[2],
            param4: params[3],
            param5: params[4],
            param6: params[5],
            param7: params[6],
            command,
            target_system,
            target_component,
            confirmation,
        });
        Self::start(now, command, msg)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn start_int(
        now: Instant,
        command: u16,
        params: [f32; 4],
        x: i32,
        y: i32,
        z: f32,
        frame: u8,
        target_system: u8,
        target_component: u8,
    ) -> (Self, MavMessage) {
        let msg = MavMessage::CommandInt(CommandInt {
            param1: params[0],
            param2: params[1],
            param3: params[2],
            param4: params[3],
            x,
            y,
            z,
            command,
            target_system,
            target_component,
            frame,
            current: 0,
            autocontinue: 0,
        });
        Self::start(now, command, msg)
    }

    fn start(now: Instant, command: u16, msg: MavMessage) -> (Self, MavMessage) {
        let state = Self {
            command,
            retry_count: 0,
            deadline: now + RETRY_DELAY,
            extended_until: None,
            msg: msg.clone(),
        };
        (state, msg)
    }

    /// Returns `Some(result)` once the ack is terminal (anything but
    /// in-progress, which instead extends the deadline and keeps waiting).
    pub fn on_command_ack(&mut self, ack: &CommandAck, now: Instant) -> Option<MavResult> {
        if ack.command != self.command {
            return None;
        }
        match MavResult::from_u32(ack.result as u32) {
            Ok(MavResult::InProgress) => {
                self.extended_until = Some(now + IN_PROGRESS_EXTENSION);
                None
            }
            Ok(result) => Some(result),
            Err(_) => None,
        }
    }

    pub fn poll(&mut self, now: Instant) -> Option<PollAction> {
        if let Some(until) = self.extended_until {
            if now < until {
                return None;
            }
        }
        if now < self.deadline {
            return None;
        }
        if self.retry_count >= MAX_RETRIES {
            return Some(PollAction::TimedOut);
        }
        self.retry_count += 1;
        self.deadline = now + RETRY_DELAY;
        Some(PollAction::Send(self.msg.clone()))
    }

    pub fn next_deadline(&self) -> Instant {
        self.extended_until.unwrap_or(self.deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_progress_ack_extends_the_deadline_instead_of_completing() {
        let now = Instant::now();
        let (mut exec, _) = CommandExecution::start_long(now, 400, [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0], 0, 1, 1);
        let ack = CommandAck { command: 400, result: MavResult::InProgress.as_u32() as u8, progress: 10 };
        let outcome = exec.on_command_ack(&ack, now);
        assert!(outcome.is_none());
        assert!(exec.poll(now + RETRY_DELAY).is_none());
    }

    #[test]
    fn mismatched_command_id_is_ignored() {
        let now = Instant::now();
        let (mut exec, _) = CommandExecution::start_long(now, 400, [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0], 0, 1, 1);
        let ack = CommandAck { command: 176, result: MavResult::Accepted.as_u32() as u8, progress: 0 };
        assert!(exec.on_command_ack(&ack, now).is_none());
    }

    #[test]
    fn exhausted_retries_time_out() {
        let mut now = Instant::now();
        let (mut exec, _) = CommandExecution::start_long(now, 400, [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0], 0, 1, 1);
        for _ in 0..3 {
            now += RETRY_DELAY;
            exec.poll(now);
        }
        now += RETRY_DELAY;
        assert!(matches!(exec.poll(now), Some(PollAction::TimedOut)));
    }
}
