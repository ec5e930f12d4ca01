//! Inbound variable decoding.
//!
//! One generic envelope carries every variable; a frame's meaning is pinned
//! down only by (direction, variable index, exact payload length). This
//! module classifies a checksum-valid packet into the closed [`Update`]
//! variant set using a fixed priority order, first match wins. Anything that
//! matches no known pairing is left undecoded on purpose: several indices
//! have only empirically observed constant values with no confirmed meaning.

use crate::constants::*;
use crate::packet::Packet;

/// Sub-cases of a fan level/mode status frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanStatus {
    /// No-change sentinel value {0xaa, 0xbb}.
    NoChange,
    /// Mode change to MANUAL ({0xaa, 0x00}).
    SetManual,
    /// Mode change to AUTO ({0xaa, 0x01}).
    SetAuto,
    /// Mode change with an unexpected mode code ({0xaa, n}).
    SetMode(u8),
    /// Explicit manual level ({level, 0xbb}).
    Level(u8),
    /// Level with an unexpected second byte.
    LevelRaw {
        /// Level byte.
        level: u8,
        /// Unexpected trailing byte.
        arg: u8,
    },
}

/// Decoded fields of the periodic 27-byte broadcast status frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastStatus {
    /// Day of month.
    pub day: u8,
    /// Weekday, 0 = Monday.
    pub weekday: u8,
    /// Month.
    pub month: u8,
    /// Year, two digits.
    pub year: u8,
    /// Hour.
    pub hour: u8,
    /// Minute.
    pub minute: u8,
    /// Current fan level.
    pub fan_level: u8,
    /// Whether the controller is in automatic mode.
    pub fan_auto: bool,
}

/// A recognized variable snapshot decoded from one valid packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    /// A device acknowledged a write.
    WriteAck {
        /// Variable index that was written.
        index: u8,
    },

    /// One weekday's 24-slot calendar bitmap, two packed levels per byte.
    Calendar {
        /// Weekday index, 0 = Monday.
        weekday: u8,
        /// 48 half-hour fan levels, earliest first.
        levels: [u8; 48],
    },

    /// Pre-heating temperature snapshot.
    PreheatTemp {
        /// Tenth degrees Celsius.
        decidegrees: u16,
    },

    /// Remaining party time.
    PartyRemaining {
        /// Minutes, 0 = party disabled.
        minutes: u16,
    },

    /// Pre-selected party duration.
    PartyTime {
        /// Minutes.
        minutes: u16,
    },

    /// Operating hours counter.
    HoursOn {
        /// Hours.
        hours: u32,
    },

    /// Supply/exhaust voltage pair for one fan level.
    FanVoltage {
        /// Fan level 1..4.
        fan: u8,
        /// Supply-air voltage, tenth volts.
        supply_decivolts: u16,
        /// Exhaust-air voltage, tenth volts.
        exhaust_decivolts: u16,
    },

    /// Bypass temperature (outdoor air limit).
    BypassTemp {
        /// Tenth degrees Celsius.
        decidegrees: u16,
    },

    /// Fan level/mode status.
    Fan(FanStatus),

    /// Months until the next filter change.
    FilterChange {
        /// Months.
        months: u8,
    },

    /// Temperature sensor array.
    SensorTemps {
        /// Tenth degrees Celsius per channel; 9990 = channel absent.
        decidegrees: [u16; 10],
    },

    /// CO2 sensor array.
    SensorCo2 {
        /// Raw channel values; 9999 = channel absent.
        values: [u16; 4],
    },

    /// Humidity sensor array.
    SensorHumidity {
        /// Raw channel values; 999 = channel absent.
        values: [u16; 4],
    },

    /// Party fan level.
    PartyLevel {
        /// Level.
        level: u8,
    },

    /// Run-on time.
    RunOnTime {
        /// Seconds.
        seconds: u8,
    },

    /// Pre-heating enabled flag.
    PreheatEnabled {
        /// Whether pre-heating is on.
        enabled: bool,
    },

    /// Remaining quiet time.
    QuietRemaining {
        /// Minutes, 0 = quiet disabled.
        minutes: u16,
    },

    /// Quiet enable echo.
    QuietEnabled {
        /// Whether quiet mode was switched on.
        enabled: bool,
        /// Raw flag byte.
        raw: u8,
    },

    /// Pre-selected quiet duration.
    QuietTime {
        /// Minutes.
        minutes: u8,
    },

    /// Quiet fan level.
    QuietLevel {
        /// Level.
        level: u8,
    },

    /// Secondary bypass temperature.
    Bypass2Temp {
        /// Whole degrees Celsius.
        degrees: u8,
    },

    /// Periodic broadcast status frame.
    Broadcast(BroadcastStatus),

    /// Broadcast frame of an unexpected total length.
    BroadcastBadSize {
        /// Observed total length.
        size: usize,
    },
}

impl Update {
    /// Classify a checksum-valid packet by fixed priority, first match wins.
    ///
    /// Returns `None` when no (index, exact length) pairing matches; the
    /// caller reports such frames as unrecognized rather than guessing.
    pub fn classify(p: &Packet<'_>) -> Option<Update> {
        if !p.is_valid() {
            return None;
        }

        if p.direction() == DIR_ACK && p.declared_len() == 2 && p.value_u8(0) == ACK_MAGIC {
            return Some(Update::WriteAck { index: p.variable() });
        }

        if p.direction() == DIR_WRITE && p.declared_len() == 28 && p.variable() <= VAR_CALENDAR_SUN
        {
            let mut levels = [0u8; 48];
            for i in 0..24 {
                // The first three value bytes are not part of the bitmap.
                let b = p.value_u8(3 + i);
                levels[2 * i] = b & 0xf;
                levels[2 * i + 1] = b >> 4;
            }
            return Some(Update::Calendar {
                weekday: p.variable(),
                levels,
            });
        }

        if p.is_status(VAR_PREHEAT_TEMP_STATUS, 3) {
            return Some(Update::PreheatTemp {
                decidegrees: p.value_u16(0),
            });
        }

        if p.is_status(VAR_PARTY_REMAINING, 3) {
            return Some(Update::PartyRemaining {
                minutes: p.value_u16(0),
            });
        }

        if p.is_status(VAR_PARTY_TIME, 3) {
            return Some(Update::PartyTime {
                minutes: p.value_u16(0),
            });
        }

        if p.is_status(VAR_HOURS_ON, 5) {
            return Some(Update::HoursOn { hours: p.value_u32(0) });
        }

        if p.direction() == DIR_WRITE
            && p.declared_len() == 5
            && (VAR_FAN1_VOLTAGE..=VAR_FAN4_VOLTAGE).contains(&p.variable())
        {
            return Some(Update::FanVoltage {
                fan: p.variable() - VAR_FAN1_VOLTAGE + 1,
                supply_decivolts: p.value_u16(0),
                exhaust_decivolts: p.value_u16(1),
            });
        }

        if p.is_status(VAR_BYPASS1_TEMP, 3) {
            return Some(Update::BypassTemp {
                decidegrees: p.value_u16(0),
            });
        }

        if p.is_status(VAR_FAN_LEVEL, 3) {
            let (b0, b1) = (p.value_u8(0), p.value_u8(1));
            let status = if p.is_fan_no_change() {
                FanStatus::NoChange
            } else if b0 == FAN_MODE_MAGIC && b1 == 0 {
                FanStatus::SetManual
            } else if b0 == FAN_MODE_MAGIC && b1 == 1 {
                FanStatus::SetAuto
            } else if b0 == FAN_MODE_MAGIC {
                FanStatus::SetMode(b1)
            } else if b1 == FAN_LEVEL_MAGIC {
                FanStatus::Level(b0)
            } else {
                FanStatus::LevelRaw { level: b0, arg: b1 }
            };
            return Some(Update::Fan(status));
        }

        if p.is_status(VAR_CHANGE_FILTER, 2) {
            return Some(Update::FilterChange { months: p.value_u8(0) });
        }

        if p.is_status(VAR_SENSOR_TEMPS, 21) {
            let mut decidegrees = [0u16; 10];
            for (i, v) in decidegrees.iter_mut().enumerate() {
                *v = p.value_u16(i);
            }
            return Some(Update::SensorTemps { decidegrees });
        }

        if p.is_status(VAR_SENSOR_CO2, 9) {
            let mut values = [0u16; 4];
            for (i, v) in values.iter_mut().enumerate() {
                *v = p.value_u16(i);
            }
            return Some(Update::SensorCo2 { values });
        }

        if p.is_status(VAR_SENSOR_HUMIDITY, 9) {
            let mut values = [0u16; 4];
            for (i, v) in values.iter_mut().enumerate() {
                *v = p.value_u16(i);
            }
            return Some(Update::SensorHumidity { values });
        }

        if p.is_status(VAR_PARTY_LEVEL, 2) {
            return Some(Update::PartyLevel { level: p.value_u8(0) });
        }

        if p.is_status(VAR_RUN_ON_TIME, 2) {
            return Some(Update::RunOnTime { seconds: p.value_u8(0) });
        }

        if p.is_status(VAR_PREHEAT_ENABLED, 2) {
            return Some(Update::PreheatEnabled {
                enabled: p.value_u8(0) != 0,
            });
        }

        if p.is_status(VAR_QUIET_REMAINING, 3) {
            return Some(Update::QuietRemaining {
                minutes: p.value_u16(0),
            });
        }

        if p.is_status(VAR_QUIET_ENABLED, 2) {
            return Some(Update::QuietEnabled {
                enabled: p.value_u8(0) != 0,
                raw: p.value_u8(0),
            });
        }

        if p.is_status(VAR_QUIET_TIME, 2) {
            return Some(Update::QuietTime { minutes: p.value_u8(0) });
        }

        if p.is_status(VAR_QUIET_LEVEL, 2) {
            return Some(Update::QuietLevel { level: p.value_u8(0) });
        }

        if p.is_status(VAR_BYPASS2_TEMP, 2) {
            return Some(Update::Bypass2Temp { degrees: p.value_u8(0) });
        }

        if p.is_broadcast() {
            if p.size() != BROADCAST_FRAME_LEN {
                return Some(Update::BroadcastBadSize { size: p.size() });
            }
            return Some(Update::Broadcast(BroadcastStatus {
                day: p.byte(3),
                weekday: p.byte(4),
                month: p.byte(5),
                year: p.byte(6),
                hour: p.byte(7),
                minute: p.byte(8),
                fan_level: p.byte(9),
                fan_auto: p.byte(10) > 0,
            }));
        }

        None
    }
}

/// Whether a packet is a routine/expected frame kind that is suppressed from
/// diagnostics unless a verbose mode is active.
pub fn is_routine(p: &Packet<'_>) -> bool {
    (DEVICE_ID_MIN..=DEVICE_ID_MAX).any(|id| p.is_ping(id))
        || p.is_request(VAR_FAN_LEVEL)
        || p.is_request(VAR_SENSOR_TEMPS)
        || p.is_request(VAR_SENSOR_CO2)
        || p.is_request(VAR_SENSOR_HUMIDITY)
        || (p.is_write_ack() && p.device_id() == DEVICE_ID_MIN)
        || p.is_fan_no_change()
        || p.is_status(VAR_SENSOR_TEMPS, 21)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::checksum;

    fn frame(id: u8, dir: u8, payload: &[u8]) -> Vec<u8> {
        let mut buf = vec![id, dir, payload.len() as u8];
        buf.extend_from_slice(payload);
        buf.push(checksum(&buf));
        buf
    }

    fn classify(buf: &[u8]) -> Option<Update> {
        let p = Packet::parse(buf);
        assert!(p.is_valid());
        Update::classify(&p)
    }

    #[test]
    fn test_bypass_status() {
        // 21.5 degrees Celsius encoded as 215.
        let buf = frame(0x13, DIR_WRITE, &[VAR_BYPASS1_TEMP, 0xd7, 0x00]);
        assert_eq!(
            classify(&buf),
            Some(Update::BypassTemp { decidegrees: 215 })
        );
    }

    #[test]
    fn test_exact_length_pairing_guards_decoding() {
        // Same index, wrong payload length: must not decode as bypass.
        let buf = frame(0x13, DIR_WRITE, &[VAR_BYPASS1_TEMP, 0xd7]);
        assert_eq!(classify(&buf), None);
    }

    #[test]
    fn test_write_ack() {
        let buf = frame(0x10, DIR_ACK, &[VAR_PARTY_ENABLED, ACK_MAGIC]);
        assert_eq!(
            classify(&buf),
            Some(Update::WriteAck {
                index: VAR_PARTY_ENABLED
            })
        );
    }

    #[test]
    fn test_calendar_unpacks_two_levels_per_byte() {
        let mut payload = vec![VAR_CALENDAR_WED];
        payload.extend_from_slice(&[0, 0, 0]); // leading non-bitmap bytes
        payload.extend_from_slice(&[0x21; 24]);
        let buf = frame(0x10, DIR_WRITE, &payload);
        match classify(&buf) {
            Some(Update::Calendar { weekday, levels }) => {
                assert_eq!(weekday, VAR_CALENDAR_WED);
                // Low nibble first.
                assert_eq!(levels[0], 1);
                assert_eq!(levels[1], 2);
                assert_eq!(levels[47], 2);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_fan_status_subcases() {
        let cases: [(&[u8], FanStatus); 5] = [
            (&[0xaa, 0xbb], FanStatus::NoChange),
            (&[0xaa, 0x00], FanStatus::SetManual),
            (&[0xaa, 0x01], FanStatus::SetAuto),
            (&[0xaa, 0x07], FanStatus::SetMode(7)),
            (&[0x03, 0xbb], FanStatus::Level(3)),
        ];
        for (value, expected) in cases {
            let mut payload = vec![VAR_FAN_LEVEL];
            payload.extend_from_slice(value);
            let buf = frame(0x10, DIR_WRITE, &payload);
            assert_eq!(classify(&buf), Some(Update::Fan(expected)));
        }
    }

    #[test]
    fn test_fan_voltage_pair() {
        let buf = frame(0x10, DIR_WRITE, &[VAR_FAN3_VOLTAGE, 45, 0, 50, 0]);
        assert_eq!(
            classify(&buf),
            Some(Update::FanVoltage {
                fan: 3,
                supply_decivolts: 45,
                exhaust_decivolts: 50,
            })
        );
    }

    #[test]
    fn test_sensor_temps() {
        let mut payload = vec![VAR_SENSOR_TEMPS];
        for v in [9990u16, 215, 190, 185, 195, 9990, 9990, 9990, 9990, 9990] {
            payload.extend_from_slice(&v.to_le_bytes());
        }
        let buf = frame(0x10, DIR_WRITE, &payload);
        match classify(&buf) {
            Some(Update::SensorTemps { decidegrees }) => {
                assert_eq!(decidegrees[0], TEMP_ABSENT);
                assert_eq!(decidegrees[1], 215);
                assert_eq!(decidegrees[4], 195);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_broadcast_status() {
        let mut buf = vec![0xff, 0xff, 23];
        buf.extend_from_slice(&[21, 0, 3, 24, 14, 5, 3, 0]); // day wk mo yr h m lvl auto
        buf.extend_from_slice(&[0; 15]);
        buf.push(checksum(&buf));
        assert_eq!(buf.len(), BROADCAST_FRAME_LEN);
        match classify(&buf) {
            Some(Update::Broadcast(status)) => {
                assert_eq!(status.day, 21);
                assert_eq!(status.weekday, 0);
                assert_eq!(status.hour, 14);
                assert_eq!(status.minute, 5);
                assert_eq!(status.fan_level, 3);
                assert!(!status.fan_auto);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_unconfirmed_variable_stays_undecoded() {
        // 0x1c carries a constant observed value with no confirmed meaning.
        let buf = frame(0x10, DIR_WRITE, &[0x1c, 0x20, 0x03]);
        assert_eq!(classify(&buf), None);
    }

    #[test]
    fn test_routine_kinds() {
        assert!(is_routine(&Packet::parse(&frame(0x11, DIR_READ, &[]))));
        assert!(is_routine(&Packet::parse(&frame(
            0x13,
            DIR_READ,
            &[VAR_SENSOR_TEMPS]
        ))));
        assert!(is_routine(&Packet::parse(&frame(
            0x10,
            DIR_ACK,
            &[VAR_FAN_LEVEL, ACK_MAGIC]
        ))));
        assert!(is_routine(&Packet::parse(&frame(
            0x10,
            DIR_WRITE,
            &[VAR_FAN_LEVEL, 0xaa, 0xbb]
        ))));
        // A bypass status is not routine.
        assert!(!is_routine(&Packet::parse(&frame(
            0x13,
            DIR_WRITE,
            &[VAR_BYPASS1_TEMP, 0xd7, 0x00]
        ))));
    }
}
