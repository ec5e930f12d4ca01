//! Turn-based request sequencing.
//!
//! The bus is strictly half-duplex: the master may transmit only inside the
//! narrow window that follows a turn marker, and at most one frame per
//! window. The sequencer multiplexes all pending get/set operations onto
//! those windows in a fixed, total priority order. Multi-step operations
//! (fan stepping, party/quiet enable-after-set, the two-part bypass and
//! pre-heating reads, the four-channel voltage read) carry their progress as
//! explicit sub-states and advance by one wire frame per turn.

use helios_protocol::*;

use crate::session::SessionState;

/// How the bypass temperature should be changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BypassRequest {
    /// Set an explicit limit in whole degrees Celsius.
    Temperature(u8),
    /// Flip between the 18 °C and 28 °C limits based on the current value.
    /// Defers until the bypass temperature is known.
    Toggle,
}

/// How the fan level/mode should be changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanRequest {
    /// Switch to automatic mode.
    Auto,
    /// Switch to a manual level. Automatic mode is switched off on one turn
    /// and the numeric level set on a later one.
    Level {
        /// Target level 1..4.
        level: u8,
        /// Whether the disable-auto step has already gone out.
        auto_disabled: bool,
    },
    /// Raise the manual level by one. Defers until level and mode are known.
    StepUp,
    /// Lower the manual level by one. Defers until level and mode are known.
    StepDown,
}

/// How a party/quiet timer should be changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerRequest {
    /// Switch the feature off.
    Disable,
    /// Switch the feature on with the pre-selected duration.
    Enable,
    /// Set a duration in minutes; setting a duration implicitly re-enables
    /// the feature, so an enable follows on the next turn.
    Duration(u16),
}

/// Progress of the two-part bypass temperature read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BypassProbe {
    /// Read the secondary (whole-degree) value first.
    Secondary,
    /// Read the primary (tenth-degree) value.
    Primary,
}

/// Progress of the two-part pre-heating read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreheatProbe {
    /// Read the enabled flag first.
    Enabled,
    /// Read the configured temperature.
    Temperature,
}

/// One queued operation, tagged with any multi-step sub-state it carries.
///
/// Variant order is the wire priority order: when several operations are
/// pending, the first listed here goes out first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingOp {
    /// Set the time of day.
    SetTime {
        /// Hour 0..23.
        hour: u8,
        /// Minute 0..59.
        minute: u8,
    },
    /// Change the bypass temperature.
    SetBypass(BypassRequest),
    /// Change the fan level or mode.
    SetFan(FanRequest),
    /// Change the party timer.
    SetParty(TimerRequest),
    /// Change the quiet timer.
    SetQuiet(TimerRequest),
    /// Calibrate the supply/exhaust voltages of one fan level.
    SetVoltage {
        /// Fan level 1..4.
        level: u8,
        /// Voltage in tenth volts, written to both channels.
        decivolts: u16,
    },
    /// Read the bypass temperatures.
    GetBypass(BypassProbe),
    /// Read the operating hours counter.
    GetHoursOn,
    /// Read the voltage pairs of all four fan levels, one per turn.
    GetVoltage {
        /// Channels still to read, counting down from 4.
        remaining: u8,
    },
    /// Read the remaining party time.
    GetPartyRemaining,
    /// Read the pre-selected party duration.
    GetPartyTime,
    /// Read the party fan level.
    GetPartyLevel,
    /// Read the remaining quiet time.
    GetQuietRemaining,
    /// Read the pre-selected quiet duration.
    GetQuietTime,
    /// Read the quiet fan level.
    GetQuietLevel,
    /// Read one weekday's calendar.
    GetCalendar {
        /// Weekday 0 = Monday .. 6 = Sunday.
        weekday: u8,
    },
    /// Read the pre-heating configuration.
    GetPreheat(PreheatProbe),
    /// Read the run-on time.
    GetRunOnTime,
    /// Read the months until filter change.
    GetFilterTime,
}

impl PendingOp {
    fn rank(&self) -> u8 {
        match self {
            PendingOp::SetTime { .. } => 0,
            PendingOp::SetBypass(_) => 1,
            PendingOp::SetFan(_) => 2,
            PendingOp::SetParty(_) => 3,
            PendingOp::SetQuiet(_) => 4,
            PendingOp::SetVoltage { .. } => 5,
            PendingOp::GetBypass(_) => 6,
            PendingOp::GetHoursOn => 7,
            PendingOp::GetVoltage { .. } => 8,
            PendingOp::GetPartyRemaining => 9,
            PendingOp::GetPartyTime => 10,
            PendingOp::GetPartyLevel => 11,
            PendingOp::GetQuietRemaining => 12,
            PendingOp::GetQuietTime => 13,
            PendingOp::GetQuietLevel => 14,
            PendingOp::GetCalendar { .. } => 15,
            PendingOp::GetPreheat(_) => 16,
            PendingOp::GetRunOnTime => 17,
            PendingOp::GetFilterTime => 18,
        }
    }
}

/// Outcome of one transmit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// Nothing goes out this turn.
    Idle,
    /// Send exactly this request.
    Transmit(Request),
    /// All one-shot work is finished and the run is not continuous.
    Done,
}

/// Chooses at most one outbound request per detected turn marker.
#[derive(Debug)]
pub struct Sequencer {
    queue: Vec<PendingOp>,
    continuous: bool,
    turns: u32,
    initial_read_sent: bool,
}

impl Sequencer {
    /// Create a sequencer; in `continuous` mode the run never signals
    /// completion and refreshes sensor values in the background.
    pub fn new(continuous: bool) -> Self {
        Sequencer {
            queue: Vec::new(),
            continuous,
            turns: 0,
            initial_read_sent: false,
        }
    }

    /// Queue an operation.
    pub fn enqueue(&mut self, op: PendingOp) {
        self.queue.push(op);
    }

    /// Whether any operation is still pending.
    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Number of turn markers seen.
    pub fn turns(&self) -> u32 {
        self.turns
    }

    /// Act on one detected turn marker.
    ///
    /// The first window is always skipped; the second issues the one-shot
    /// sensor read. After that the highest-priority pending operation acts:
    /// it either emits one frame, advances its sub-state, or (when a
    /// prerequisite value is still unknown) consumes the turn without
    /// emitting and is retried once the interpreter supplies the value.
    pub fn on_turn(&mut self, session: &mut SessionState) -> Turn {
        self.turns += 1;
        if self.turns < 2 {
            return Turn::Idle;
        }

        if !self.initial_read_sent {
            self.initial_read_sent = true;
            return Turn::Transmit(Request::Get {
                index: VAR_SENSOR_TEMPS,
            });
        }

        let pos = match (0..self.queue.len()).min_by_key(|&i| self.queue[i].rank()) {
            Some(pos) => pos,
            None => return self.background_turn(session),
        };

        let (turn, next) = step(self.queue[pos], session);
        match next {
            Some(op) => self.queue[pos] = op,
            None => {
                self.queue.remove(pos);
            }
        }
        turn
    }

    fn background_turn(&mut self, session: &SessionState) -> Turn {
        if !self.continuous {
            return Turn::Done;
        }
        if self.turns % 4 == 3 {
            return Turn::Transmit(Request::Get {
                index: VAR_SENSOR_TEMPS,
            });
        }
        if self.turns % 8 == 2 {
            if session.party_minutes != 0 {
                return Turn::Transmit(Request::Get {
                    index: VAR_PARTY_REMAINING,
                });
            }
            if session.quiet_minutes != 0 {
                return Turn::Transmit(Request::Get {
                    index: VAR_QUIET_REMAINING,
                });
            }
        }
        Turn::Idle
    }
}

/// Advance one operation by one turn. Returns the wire action and the
/// operation's next state (`None` removes it from the queue).
fn step(op: PendingOp, session: &mut SessionState) -> (Turn, Option<PendingOp>) {
    match op {
        PendingOp::SetTime { hour, minute } => (
            transmit16(VAR_TIME, hour as u16 | (minute as u16) << 8),
            None,
        ),

        PendingOp::SetBypass(BypassRequest::Temperature(degrees)) => {
            (transmit16(VAR_BYPASS1_TEMP, degrees as u16 * 10), None)
        }

        PendingOp::SetBypass(BypassRequest::Toggle) => match session.bypass {
            // Wait until the bypass temperature is known.
            None => (Turn::Idle, Some(op)),
            Some(current) => {
                let degrees: u16 = if current < 200 { 28 } else { 18 };
                (transmit16(VAR_BYPASS1_TEMP, degrees * 10), None)
            }
        },

        PendingOp::SetFan(FanRequest::Auto) => (transmit16(VAR_FAN_LEVEL, 0x01aa), None),

        PendingOp::SetFan(FanRequest::Level {
            level,
            auto_disabled: false,
        }) => (
            transmit16(VAR_FAN_LEVEL, 0x00aa),
            Some(PendingOp::SetFan(FanRequest::Level {
                level,
                auto_disabled: true,
            })),
        ),

        PendingOp::SetFan(FanRequest::Level {
            level,
            auto_disabled: true,
        }) => (transmit16(VAR_FAN_LEVEL, 0xbb00 + level as u16), None),

        PendingOp::SetFan(dir @ (FanRequest::StepUp | FanRequest::StepDown)) => {
            let up = dir == FanRequest::StepUp;
            let (level, auto) = match (session.fan_level, session.fan_auto) {
                (Some(level), Some(auto)) => (level, auto),
                // Wait until the current fan level and mode are known.
                _ => return (Turn::Idle, Some(op)),
            };
            let valid = if up {
                (1..=3).contains(&level)
            } else {
                (2..=4).contains(&level)
            };
            if !valid {
                return (Turn::Idle, None);
            }
            let target = if up { level + 1 } else { level - 1 };
            // Force a re-read before any further stepping.
            session.fan_level = None;
            session.fan_auto = None;
            if auto {
                // Leave automatic mode first; the numeric set follows.
                (
                    transmit16(VAR_FAN_LEVEL, 0x00aa),
                    Some(PendingOp::SetFan(FanRequest::Level {
                        level: target,
                        auto_disabled: true,
                    })),
                )
            } else {
                (transmit16(VAR_FAN_LEVEL, 0xbb00 + target as u16), None)
            }
        }

        PendingOp::SetParty(request) => step_timer(
            request,
            VAR_PARTY_TIME,
            VAR_PARTY_ENABLED,
            PendingOp::SetParty,
        ),

        PendingOp::SetQuiet(request) => step_timer(
            request,
            VAR_QUIET_TIME,
            VAR_QUIET_ENABLED,
            PendingOp::SetQuiet,
        ),

        PendingOp::SetVoltage { level, decivolts } => {
            let value = decivolts as u32 | (decivolts as u32) << 16;
            (
                Turn::Transmit(Request::Set32 {
                    index: VAR_FAN1_VOLTAGE - 1 + level,
                    value,
                }),
                None,
            )
        }

        PendingOp::GetBypass(BypassProbe::Secondary) => (
            get(VAR_BYPASS2_TEMP),
            Some(PendingOp::GetBypass(BypassProbe::Primary)),
        ),
        PendingOp::GetBypass(BypassProbe::Primary) => (get(VAR_BYPASS1_TEMP), None),

        PendingOp::GetHoursOn => (get(VAR_HOURS_ON), None),

        PendingOp::GetVoltage { remaining } => {
            let action = get(VAR_FAN4_VOLTAGE + 1 - remaining);
            let next = remaining - 1;
            (
                action,
                (next > 0).then_some(PendingOp::GetVoltage { remaining: next }),
            )
        }

        PendingOp::GetPartyRemaining => (get(VAR_PARTY_REMAINING), None),
        PendingOp::GetPartyTime => (get(VAR_PARTY_TIME), None),
        PendingOp::GetPartyLevel => (get(VAR_PARTY_LEVEL), None),
        PendingOp::GetQuietRemaining => (get(VAR_QUIET_REMAINING), None),
        PendingOp::GetQuietTime => (get(VAR_QUIET_TIME), None),
        PendingOp::GetQuietLevel => (get(VAR_QUIET_LEVEL), None),

        PendingOp::GetCalendar { weekday } => (get(VAR_CALENDAR_MON + weekday), None),

        PendingOp::GetPreheat(PreheatProbe::Enabled) => (
            get(VAR_PREHEAT_ENABLED),
            Some(PendingOp::GetPreheat(PreheatProbe::Temperature)),
        ),
        PendingOp::GetPreheat(PreheatProbe::Temperature) => (get(VAR_PREHEAT_TEMP), None),

        PendingOp::GetRunOnTime => (get(VAR_RUN_ON_TIME), None),
        PendingOp::GetFilterTime => (get(VAR_CHANGE_FILTER), None),
    }
}

fn step_timer(
    request: TimerRequest,
    time_var: u8,
    enable_var: u8,
    wrap: fn(TimerRequest) -> PendingOp,
) -> (Turn, Option<PendingOp>) {
    match request {
        TimerRequest::Disable => (
            Turn::Transmit(Request::Set8 {
                index: enable_var,
                value: 0,
            }),
            None,
        ),
        TimerRequest::Enable => (
            Turn::Transmit(Request::Set8 {
                index: enable_var,
                value: 1,
            }),
            None,
        ),
        TimerRequest::Duration(minutes) => (
            transmit16(time_var, minutes),
            Some(wrap(TimerRequest::Enable)),
        ),
    }
}

fn get(index: u8) -> Turn {
    Turn::Transmit(Request::Get { index })
}

fn transmit16(index: u8, value: u16) -> Turn {
    Turn::Transmit(Request::Set16 { index, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_until_transmit(seq: &mut Sequencer, session: &mut SessionState) -> Request {
        for _ in 0..16 {
            if let Turn::Transmit(req) = seq.on_turn(session) {
                return req;
            }
        }
        panic!("no transmit within 16 turns");
    }

    /// Skip the first (idle) window and the one-shot initial sensor read.
    fn started() -> (Sequencer, SessionState) {
        let mut seq = Sequencer::new(false);
        let mut session = SessionState::new();
        assert_eq!(seq.on_turn(&mut session), Turn::Idle);
        assert_eq!(
            seq.on_turn(&mut session),
            Turn::Transmit(Request::Get {
                index: VAR_SENSOR_TEMPS
            })
        );
        (seq, session)
    }

    #[test]
    fn test_first_turn_is_idle_and_second_reads_sensors() {
        started();
    }

    #[test]
    fn test_done_when_queue_empty_and_not_continuous() {
        let (mut seq, mut session) = started();
        assert_eq!(seq.on_turn(&mut session), Turn::Done);
    }

    #[test]
    fn test_priority_is_total_and_deterministic() {
        let (mut seq, mut session) = started();
        seq.enqueue(PendingOp::GetFilterTime);
        seq.enqueue(PendingOp::GetHoursOn);
        seq.enqueue(PendingOp::SetTime { hour: 7, minute: 30 });

        assert_eq!(
            seq.on_turn(&mut session),
            Turn::Transmit(Request::Set16 {
                index: VAR_TIME,
                value: 0x1e07,
            })
        );
        assert_eq!(
            seq.on_turn(&mut session),
            Turn::Transmit(Request::Get { index: VAR_HOURS_ON })
        );
        assert_eq!(
            seq.on_turn(&mut session),
            Turn::Transmit(Request::Get {
                index: VAR_CHANGE_FILTER
            })
        );
        assert_eq!(seq.on_turn(&mut session), Turn::Done);
    }

    #[test]
    fn test_fan_step_down_emits_level_set() {
        let (mut seq, mut session) = started();
        session.fan_level = Some(2);
        session.fan_auto = Some(false);
        seq.enqueue(PendingOp::SetFan(FanRequest::StepDown));

        let req = run_until_transmit(&mut seq, &mut session);
        assert_eq!(
            req,
            Request::Set16 {
                index: VAR_FAN_LEVEL,
                value: 0xbb01,
            }
        );
        // Payload on the wire: index, level, 0xbb.
        assert_eq!(&req.encode()[3..6], &[VAR_FAN_LEVEL, 0x01, 0xbb]);
        // The step forces a re-read of the fan state.
        assert_eq!(session.fan_level, None);
        assert_eq!(session.fan_auto, None);
        assert!(!seq.has_pending());
    }

    #[test]
    fn test_fan_step_down_from_level_one_is_cleared() {
        let (mut seq, mut session) = started();
        session.fan_level = Some(1);
        session.fan_auto = Some(false);
        seq.enqueue(PendingOp::SetFan(FanRequest::StepDown));

        assert_eq!(seq.on_turn(&mut session), Turn::Idle);
        assert!(!seq.has_pending());
        // Level was not touched; the request was simply dropped.
        assert_eq!(session.fan_level, Some(1));
    }

    #[test]
    fn test_fan_step_blocks_until_level_known() {
        let (mut seq, mut session) = started();
        seq.enqueue(PendingOp::SetFan(FanRequest::StepUp));

        assert_eq!(seq.on_turn(&mut session), Turn::Idle);
        assert!(seq.has_pending());

        session.fan_level = Some(3);
        session.fan_auto = Some(false);
        let req = run_until_transmit(&mut seq, &mut session);
        assert_eq!(
            req,
            Request::Set16 {
                index: VAR_FAN_LEVEL,
                value: 0xbb04,
            }
        );
    }

    #[test]
    fn test_fan_step_from_auto_disables_auto_first() {
        let (mut seq, mut session) = started();
        session.fan_level = Some(2);
        session.fan_auto = Some(true);
        seq.enqueue(PendingOp::SetFan(FanRequest::StepUp));

        assert_eq!(
            seq.on_turn(&mut session),
            Turn::Transmit(Request::Set16 {
                index: VAR_FAN_LEVEL,
                value: 0x00aa,
            })
        );
        assert_eq!(session.fan_level, None);

        // The numeric set goes out on a later turn without waiting for the
        // re-read.
        assert_eq!(
            seq.on_turn(&mut session),
            Turn::Transmit(Request::Set16 {
                index: VAR_FAN_LEVEL,
                value: 0xbb03,
            })
        );
        assert!(!seq.has_pending());
    }

    #[test]
    fn test_fan_manual_level_disables_auto_then_sets() {
        let (mut seq, mut session) = started();
        seq.enqueue(PendingOp::SetFan(FanRequest::Level {
            level: 4,
            auto_disabled: false,
        }));

        assert_eq!(
            seq.on_turn(&mut session),
            Turn::Transmit(Request::Set16 {
                index: VAR_FAN_LEVEL,
                value: 0x00aa,
            })
        );
        assert_eq!(
            seq.on_turn(&mut session),
            Turn::Transmit(Request::Set16 {
                index: VAR_FAN_LEVEL,
                value: 0xbb04,
            })
        );
    }

    #[test]
    fn test_party_duration_requeues_enable() {
        let (mut seq, mut session) = started();
        seq.enqueue(PendingOp::SetParty(TimerRequest::Duration(45)));

        assert_eq!(
            seq.on_turn(&mut session),
            Turn::Transmit(Request::Set16 {
                index: VAR_PARTY_TIME,
                value: 45,
            })
        );
        assert_eq!(
            seq.on_turn(&mut session),
            Turn::Transmit(Request::Set8 {
                index: VAR_PARTY_ENABLED,
                value: 1,
            })
        );
        assert_eq!(seq.on_turn(&mut session), Turn::Done);
    }

    #[test]
    fn test_quiet_disable() {
        let (mut seq, mut session) = started();
        seq.enqueue(PendingOp::SetQuiet(TimerRequest::Disable));
        assert_eq!(
            seq.on_turn(&mut session),
            Turn::Transmit(Request::Set8 {
                index: VAR_QUIET_ENABLED,
                value: 0,
            })
        );
    }

    #[test]
    fn test_bypass_toggle_waits_for_temperature() {
        let (mut seq, mut session) = started();
        seq.enqueue(PendingOp::SetBypass(BypassRequest::Toggle));

        assert_eq!(seq.on_turn(&mut session), Turn::Idle);
        assert!(seq.has_pending());

        session.bypass = Some(195); // 19.5 °C, below the 20.0 °C threshold
        assert_eq!(
            seq.on_turn(&mut session),
            Turn::Transmit(Request::Set16 {
                index: VAR_BYPASS1_TEMP,
                value: 280,
            })
        );

        seq.enqueue(PendingOp::SetBypass(BypassRequest::Toggle));
        session.bypass = Some(280);
        assert_eq!(
            seq.on_turn(&mut session),
            Turn::Transmit(Request::Set16 {
                index: VAR_BYPASS1_TEMP,
                value: 180,
            })
        );
    }

    #[test]
    fn test_voltage_set_packs_both_channels() {
        let (mut seq, mut session) = started();
        seq.enqueue(PendingOp::SetVoltage {
            level: 2,
            decivolts: 45,
        });
        assert_eq!(
            seq.on_turn(&mut session),
            Turn::Transmit(Request::Set32 {
                index: VAR_FAN2_VOLTAGE,
                value: 45 | 45 << 16,
            })
        );
    }

    #[test]
    fn test_voltage_get_walks_all_four_channels() {
        let (mut seq, mut session) = started();
        seq.enqueue(PendingOp::GetVoltage { remaining: 4 });
        for index in [
            VAR_FAN1_VOLTAGE,
            VAR_FAN2_VOLTAGE,
            VAR_FAN3_VOLTAGE,
            VAR_FAN4_VOLTAGE,
        ] {
            assert_eq!(
                seq.on_turn(&mut session),
                Turn::Transmit(Request::Get { index })
            );
        }
        assert_eq!(seq.on_turn(&mut session), Turn::Done);
    }

    #[test]
    fn test_two_step_gets() {
        let (mut seq, mut session) = started();
        seq.enqueue(PendingOp::GetBypass(BypassProbe::Secondary));
        seq.enqueue(PendingOp::GetPreheat(PreheatProbe::Enabled));

        for index in [
            VAR_BYPASS2_TEMP,
            VAR_BYPASS1_TEMP,
            VAR_PREHEAT_ENABLED,
            VAR_PREHEAT_TEMP,
        ] {
            assert_eq!(
                seq.on_turn(&mut session),
                Turn::Transmit(Request::Get { index })
            );
        }
    }

    #[test]
    fn test_calendar_get_selects_weekday() {
        let (mut seq, mut session) = started();
        seq.enqueue(PendingOp::GetCalendar { weekday: 5 });
        assert_eq!(
            seq.on_turn(&mut session),
            Turn::Transmit(Request::Get {
                index: VAR_CALENDAR_SAT
            })
        );
    }

    #[test]
    fn test_continuous_background_refresh() {
        let mut seq = Sequencer::new(true);
        let mut session = SessionState::new();
        seq.on_turn(&mut session); // turn 1: idle
        seq.on_turn(&mut session); // turn 2: initial sensor read

        let mut temp_reads = 0;
        for turn in 3..=20u32 {
            match seq.on_turn(&mut session) {
                Turn::Transmit(Request::Get { index }) => {
                    assert_eq!(index, VAR_SENSOR_TEMPS);
                    assert_eq!(turn % 4, 3);
                    temp_reads += 1;
                }
                Turn::Idle => assert_ne!(turn % 4, 3),
                other => panic!("unexpected: {:?}", other),
            }
        }
        assert_eq!(temp_reads, 5);
    }

    #[test]
    fn test_continuous_party_refresh_every_eighth_turn() {
        let mut seq = Sequencer::new(true);
        let mut session = SessionState::new();
        session.party_minutes = 30;
        seq.on_turn(&mut session);
        seq.on_turn(&mut session);

        let mut party_reads = 0;
        for turn in 3..=26u32 {
            if let Turn::Transmit(Request::Get { index }) = seq.on_turn(&mut session) {
                if index == VAR_PARTY_REMAINING {
                    assert_eq!(turn % 8, 2);
                    party_reads += 1;
                }
            }
        }
        assert_eq!(party_reads, 3);
    }

    #[test]
    fn test_quiet_refresh_yields_to_party() {
        let mut seq = Sequencer::new(true);
        let mut session = SessionState::new();
        session.party_minutes = 30;
        session.quiet_minutes = 15;
        seq.on_turn(&mut session);
        seq.on_turn(&mut session);

        for turn in 3..=10u32 {
            if let Turn::Transmit(Request::Get { index }) = seq.on_turn(&mut session) {
                if turn % 8 == 2 {
                    assert_eq!(index, VAR_PARTY_REMAINING);
                }
            }
        }
    }

    #[test]
    fn test_at_most_one_frame_per_turn() {
        let (mut seq, mut session) = started();
        for op in [
            PendingOp::SetTime { hour: 1, minute: 2 },
            PendingOp::GetHoursOn,
            PendingOp::GetRunOnTime,
            PendingOp::GetFilterTime,
        ] {
            seq.enqueue(op);
        }
        let mut frames = 0;
        while frames < 16 {
            match seq.on_turn(&mut session) {
                Turn::Transmit(_) => frames += 1,
                Turn::Done => break,
                Turn::Idle => {}
            }
        }
        assert_eq!(frames, 4);
    }
}
