//! Frame interpretation.
//!
//! The interpreter consumes one accumulated burst at a time, extracts the
//! concatenated frames it holds, classifies each valid packet, updates the
//! session state, and emits reports for the console layer. It never fails on
//! malformed input: the wire format is partially reverse-engineered and
//! occasionally noisy, so bad frames are reported and skipped.

use std::time::Duration;

use tracing::debug;

use helios_protocol::{
    is_routine, Packet, Update, BROADCAST_FRAME_LEN, FOREIGN_MASTER_IDS, MIN_FRAME_LEN,
};

use crate::session::SessionState;

/// One observation worth surfacing to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// A recognized variable snapshot (already applied to the session).
    Decoded(Update),

    /// A frame that failed checksum validation, dropped.
    Invalid {
        /// The dropped bytes, checksum included.
        bytes: Vec<u8>,
    },

    /// A checksum-valid frame from a bus id outside the known device range.
    Foreign {
        /// Milliseconds of bus idle time preceding this burst.
        elapsed_ms: u64,
        /// The frame bytes.
        bytes: Vec<u8>,
    },

    /// A valid frame from a known device that matched no decoder.
    Undecoded {
        /// Milliseconds of bus idle time preceding this burst.
        elapsed_ms: u64,
        /// Sender device id.
        device: u8,
        /// The frame bytes.
        bytes: Vec<u8>,
    },
}

/// Classifies incoming packets and maintains the session state.
#[derive(Debug)]
pub struct Interpreter {
    verbose: bool,
    first_frame: bool,
    packets_received: u64,
    last_broadcast: Option<[u8; BROADCAST_FRAME_LEN]>,
}

impl Interpreter {
    /// Create an interpreter; `verbose` disables routine-frame suppression.
    pub fn new(verbose: bool) -> Self {
        Interpreter {
            verbose,
            first_frame: true,
            packets_received: 0,
            last_broadcast: None,
        }
    }

    /// Number of valid packets seen so far.
    pub fn packets_received(&self) -> u64 {
        self.packets_received
    }

    /// Process one burst of bytes delimited by an idle gap.
    ///
    /// Walks the concatenated frames in the burst; `elapsed` is the idle time
    /// that closed the previous burst, attached to diagnostics. Invalid
    /// frames end the walk: the very first frame of a run is tolerated as a
    /// truncated startup remnant and dropped silently, later ones are
    /// reported. A valid frame from a foreign bus id also ends the walk.
    pub fn handle_burst(
        &mut self,
        elapsed: Duration,
        burst: &[u8],
        session: &mut SessionState,
    ) -> Vec<Report> {
        let elapsed_ms = elapsed.as_millis() as u64;
        let mut reports = Vec::new();
        let mut rest = burst;

        loop {
            if rest.len() < MIN_FRAME_LEN {
                // Normal end of burst; a tail shorter than a frame is dropped.
                return reports;
            }

            let packet = Packet::parse(rest);
            if !packet.is_valid() {
                if self.first_frame {
                    self.first_frame = false;
                } else {
                    if let Some(err) = packet.checksum_error() {
                        debug!(frame = %hex::encode(packet.raw()), %err, "dropping frame");
                    }
                    reports.push(Report::Invalid {
                        bytes: packet.raw().to_vec(),
                    });
                }
                return reports;
            }

            self.first_frame = false;
            self.packets_received += 1;

            if !packet.is_broadcast() && !packet.is_device() {
                // A valid frame from a foreign id: other masters share the
                // bus. Their periodic pings are expected; anything else is
                // surfaced. Either way the rest of the burst is dropped.
                if !FOREIGN_MASTER_IDS.iter().any(|id| packet.is_ping(*id)) {
                    reports.push(Report::Foreign {
                        elapsed_ms,
                        bytes: packet.raw().to_vec(),
                    });
                }
                return reports;
            }

            if packet.is_broadcast() && packet.size() == BROADCAST_FRAME_LEN {
                let mut copy = [0u8; BROADCAST_FRAME_LEN];
                copy.copy_from_slice(packet.raw());
                self.last_broadcast = Some(copy);
            }

            let routine = is_routine(&packet);
            match Update::classify(&packet) {
                Some(update) => {
                    apply(&update, session);
                    if self.verbose || !routine {
                        reports.push(Report::Decoded(update));
                    }
                }
                None if self.verbose || !routine => {
                    reports.push(Report::Undecoded {
                        elapsed_ms,
                        device: packet.device_id(),
                        bytes: packet.raw().to_vec(),
                    });
                }
                None => {}
            }

            rest = &rest[packet.size()..];
        }
    }

    /// Re-decode the most recent broadcast status frame, for a final summary
    /// at shutdown.
    pub fn replay_last_status(&self) -> Option<Update> {
        let frame = self.last_broadcast.as_ref()?;
        Update::classify(&Packet::parse(frame))
    }
}

/// Apply a decoded update to the session. Status frames are the only source
/// of session mutation.
fn apply(update: &Update, session: &mut SessionState) {
    match *update {
        Update::PartyRemaining { minutes } => session.party_minutes = minutes,
        Update::QuietRemaining { minutes } => session.quiet_minutes = minutes,
        Update::BypassTemp { decidegrees } => session.bypass = Some(decidegrees),
        Update::SensorTemps { decidegrees } => {
            // Channels 1..=4 of the ten are the session temperatures.
            session.temps.copy_from_slice(&decidegrees[1..5]);
        }
        Update::Broadcast(status) => {
            session.fan_level = Some(status.fan_level);
            session.fan_auto = Some(status.fan_auto);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helios_protocol::{checksum, FanStatus, TEMP_ABSENT, VAR_BYPASS1_TEMP, VAR_SENSOR_TEMPS};

    fn frame(id: u8, dir: u8, payload: &[u8]) -> Vec<u8> {
        let mut buf = vec![id, dir, payload.len() as u8];
        buf.extend_from_slice(payload);
        buf.push(checksum(&buf));
        buf
    }

    fn broadcast(fan_level: u8, fan_auto: u8) -> Vec<u8> {
        let mut buf = vec![0xff, 0xff, 23];
        buf.extend_from_slice(&[21, 0, 3, 24, 14, 5, fan_level, fan_auto]);
        buf.extend_from_slice(&[0; 15]);
        buf.push(checksum(&buf));
        buf
    }

    fn fresh() -> (Interpreter, SessionState) {
        let mut interp = Interpreter::new(false);
        // Consume the startup-remnant tolerance so tests observe steady
        // state behavior.
        let mut session = SessionState::new();
        interp.handle_burst(Duration::ZERO, &frame(0x10, 1, &[0x11, 0, 0]), &mut session);
        (interp, SessionState::new())
    }

    #[test]
    fn test_bypass_status_updates_session() {
        let (mut interp, mut session) = fresh();
        let burst = frame(0x13, 1, &[VAR_BYPASS1_TEMP, 0xd7, 0x00]);
        let reports = interp.handle_burst(Duration::from_millis(30), &burst, &mut session);
        assert_eq!(session.bypass, Some(215));
        assert_eq!(
            reports,
            vec![Report::Decoded(Update::BypassTemp { decidegrees: 215 })]
        );
    }

    #[test]
    fn test_broadcast_updates_fan_state() {
        let (mut interp, mut session) = fresh();
        let burst = broadcast(3, 0);
        let reports = interp.handle_burst(Duration::from_millis(30), &burst, &mut session);
        assert_eq!(session.fan_level, Some(3));
        assert_eq!(session.fan_auto, Some(false));
        assert_eq!(reports.len(), 1);
        assert!(matches!(reports[0], Report::Decoded(Update::Broadcast(_))));
    }

    #[test]
    fn test_sensor_temps_fill_session_channels() {
        let (mut interp, mut session) = fresh();
        let mut payload = vec![VAR_SENSOR_TEMPS];
        for v in [100u16, 215, 190, 185, 195, 9990, 9990, 9990, 9990, 9990] {
            payload.extend_from_slice(&v.to_le_bytes());
        }
        let reports =
            interp.handle_burst(Duration::ZERO, &frame(0x10, 1, &payload), &mut session);
        assert_eq!(session.temps, [215, 190, 185, 195]);
        // Sensor temperature snapshots are routine; no report by default.
        assert!(reports.is_empty());
    }

    #[test]
    fn test_first_invalid_frame_dropped_silently() {
        let mut interp = Interpreter::new(false);
        let mut session = SessionState::new();
        let mut bad = frame(0x10, 1, &[0x11, 0, 0]);
        *bad.last_mut().unwrap() ^= 0xff;

        let reports = interp.handle_burst(Duration::ZERO, &bad, &mut session);
        assert!(reports.is_empty());

        // The tolerance applies exactly once.
        let reports = interp.handle_burst(Duration::ZERO, &bad, &mut session);
        assert_eq!(
            reports,
            vec![Report::Invalid { bytes: bad.clone() }]
        );
    }

    #[test]
    fn test_truncated_frame_consumes_remainder() {
        let (mut interp, mut session) = fresh();
        // Declares 20 payload bytes, only 3 present.
        let burst = [0x10, 1, 20, 0x3a, 0x00, 0x00];
        let reports = interp.handle_burst(Duration::ZERO, &burst, &mut session);
        assert_eq!(
            reports,
            vec![Report::Invalid {
                bytes: burst.to_vec()
            }]
        );
    }

    #[test]
    fn test_multiple_frames_per_burst() {
        let (mut interp, mut session) = fresh();
        let mut burst = frame(0x13, 1, &[VAR_BYPASS1_TEMP, 0xd7, 0x00]);
        burst.extend_from_slice(&frame(0x10, 1, &[0x35, 0x02, 0xbb]));
        let reports = interp.handle_burst(Duration::ZERO, &burst, &mut session);
        assert_eq!(reports.len(), 2);
        assert_eq!(
            reports[1],
            Report::Decoded(Update::Fan(FanStatus::Level(2)))
        );
    }

    #[test]
    fn test_device_ping_suppressed_by_default() {
        let (mut interp, mut session) = fresh();
        // The turn marker itself is a ping from the master id and must not
        // surface as a diagnostic.
        let reports = interp.handle_burst(Duration::ZERO, &frame(0x13, 0, &[]), &mut session);
        assert!(reports.is_empty());
    }

    #[test]
    fn test_foreign_ping_suppressed() {
        let (mut interp, mut session) = fresh();
        let reports = interp.handle_burst(Duration::ZERO, &frame(0x31, 0, &[]), &mut session);
        assert!(reports.is_empty());
    }

    #[test]
    fn test_foreign_frame_reported_and_ends_walk() {
        let (mut interp, mut session) = fresh();
        let mut burst = frame(0x77, 0, &[]);
        // A decodable frame behind the foreign one must not be reached.
        burst.extend_from_slice(&frame(0x13, 1, &[VAR_BYPASS1_TEMP, 0xd7, 0x00]));
        let reports = interp.handle_burst(Duration::from_millis(40), &burst, &mut session);
        assert_eq!(
            reports,
            vec![Report::Foreign {
                elapsed_ms: 40,
                bytes: frame(0x77, 0, &[]),
            }]
        );
        assert_eq!(session.bypass, None);
    }

    #[test]
    fn test_routine_frames_reported_in_verbose_mode() {
        let mut interp = Interpreter::new(true);
        let mut session = SessionState::new();
        interp.handle_burst(Duration::ZERO, &frame(0x10, 1, &[0x11, 0, 0]), &mut session);
        let reports = interp.handle_burst(Duration::ZERO, &frame(0x11, 0, &[]), &mut session);
        assert_eq!(reports.len(), 1);
    }

    #[test]
    fn test_undecoded_variable_reported_with_bytes() {
        let (mut interp, mut session) = fresh();
        let burst = frame(0x10, 1, &[0x1c, 0x20, 0x03]);
        let reports = interp.handle_burst(Duration::from_millis(26), &burst, &mut session);
        assert_eq!(
            reports,
            vec![Report::Undecoded {
                elapsed_ms: 26,
                device: 0x10,
                bytes: burst.clone(),
            }]
        );
    }

    #[test]
    fn test_replay_last_status() {
        let (mut interp, mut session) = fresh();
        assert!(interp.replay_last_status().is_none());
        interp.handle_burst(Duration::ZERO, &broadcast(2, 1), &mut session);
        match interp.replay_last_status() {
            Some(Update::Broadcast(status)) => {
                assert_eq!(status.fan_level, 2);
                assert!(status.fan_auto);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_sentinel_temps_untouched_until_reading() {
        let (_, session) = fresh();
        assert_eq!(session.temps, [TEMP_ABSENT; 4]);
    }
}
