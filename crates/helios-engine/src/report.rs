//! Plain-text rendering of reports.
//!
//! Lines are produced without any cursor control; coloring and status-line
//! placement stay in the console layer.

use helios_protocol::{
    variable_name, BroadcastStatus, FanStatus, Update, CO2_ABSENT, HUMIDITY_ABSENT, TEMP_ABSENT,
};

use crate::interpreter::Report;
use crate::session::{SessionState, TEMP_DISPLAY_ORDER, TEMP_SYMBOLS};

const DAY_OF_WEEK: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Airflow in m³/h for a fan voltage given in tenth volts.
pub fn volume_flow(decivolts: u16) -> u32 {
    match decivolts {
        0 => 0,
        1..=23 => 60,
        24..=29 => 80,
        30..=36 => 100,
        37..=42 => 120,
        43..=49 => 140,
        50..=55 => 160,
        56..=62 => 180,
        63..=68 => 200,
        69..=75 => 220,
        76..=81 => 240,
        82..=88 => 260,
        89..=94 => 280,
        95..=99 => 300,
        _ => 315,
    }
}

/// A value stored in tenths, as "21.5".
fn tenths(value: u16) -> String {
    format!("{}.{}", value / 10, value % 10)
}

/// Frame bytes as hex, value bytes bracketed, e.g. `13 01 03 1e [ d7 00 ]`.
fn hex_frame(bytes: &[u8], with_checksum: bool) -> String {
    let shown = bytes.len() - usize::from(!with_checksum && !bytes.is_empty());
    let mut out = String::new();
    for (i, b) in bytes[..shown].iter().enumerate() {
        if i == 4 {
            out.push_str("[ ");
        }
        out.push_str(&format!("{:02x} ", b));
    }
    if bytes.len() > 4 {
        out.push(']');
    } else {
        out.pop();
    }
    out
}

/// Render a report to one printable line (possibly multi-line for the
/// calendar bitmap).
pub fn render(report: &Report, session: &SessionState) -> String {
    match report {
        Report::Decoded(update) => render_update(update, session),
        Report::Invalid { bytes } => format!("ignoring {}", hex_frame(bytes, true)),
        Report::Foreign { elapsed_ms, bytes } => {
            format!("{:4}ms unknown {}", elapsed_ms, hex_frame(bytes, false))
        }
        Report::Undecoded {
            elapsed_ms,
            device,
            bytes,
        } => format!(
            "{:4}ms ({:02x}) {}",
            elapsed_ms,
            device,
            hex_frame(bytes, false)
        ),
    }
}

/// Render one decoded update.
pub fn render_update(update: &Update, session: &SessionState) -> String {
    match update {
        Update::WriteAck { index } => {
            format!("ack '{}' ({:02x}) written", variable_name(*index), index)
        }

        Update::Calendar { levels, .. } => render_calendar(levels),

        Update::PreheatTemp { decidegrees } => {
            format!("pre-heating = {}°C", tenths(*decidegrees))
        }

        Update::PartyRemaining { minutes } => {
            if *minutes == 0 {
                "party disabled".to_string()
            } else {
                format!("party enabled for {}min", minutes)
            }
        }

        Update::PartyTime { minutes } => format!("party time = {}min", minutes),

        Update::HoursOn { hours } => {
            let decayears = u64::from(*hours) * 10 / (365 * 24);
            format!(
                "hours on = {}h ({}.{}yrs)",
                hours,
                decayears / 10,
                decayears % 10
            )
        }

        Update::FanVoltage {
            fan,
            supply_decivolts,
            exhaust_decivolts,
        } => format!(
            "voltage fan {} = {}V ({}m³/h) / {}V ({}m³/h)",
            fan,
            tenths(*supply_decivolts),
            volume_flow(*supply_decivolts),
            tenths(*exhaust_decivolts),
            volume_flow(*exhaust_decivolts),
        ),

        Update::BypassTemp { decidegrees } => {
            format!("bypass1 = {}°C", tenths(*decidegrees))
        }

        Update::Fan(status) => match status {
            FanStatus::NoChange => "fan no change".to_string(),
            FanStatus::SetManual => "set fan MANUAL".to_string(),
            FanStatus::SetAuto => "set fan AUTO".to_string(),
            FanStatus::SetMode(mode) => format!("set fan AUTO/MANUAL {}", mode),
            FanStatus::Level(level) => format!("set fan LEVEL {}", level),
            FanStatus::LevelRaw { level, arg } => format!("set fan LEVEL {} {}", level, arg),
        },

        Update::FilterChange { months } => format!("change filter = {}mth", months),

        Update::SensorTemps { decidegrees } => {
            let mut line = String::from("temp");
            for v in decidegrees.iter().filter(|v| **v != TEMP_ABSENT) {
                line.push_str(&format!(" {}°C", tenths(*v)));
            }
            line
        }

        Update::SensorCo2 { values } => {
            let mut line = String::from("CO₂");
            for v in values.iter().filter(|v| **v != CO2_ABSENT) {
                line.push_str(&format!(" {}", tenths(*v)));
            }
            line
        }

        Update::SensorHumidity { values } => {
            let mut line = String::from("humidity");
            for v in values.iter().filter(|v| **v != HUMIDITY_ABSENT) {
                line.push_str(&format!(" {}", tenths(*v)));
            }
            line
        }

        Update::PartyLevel { level } => format!("party level = {}", level),

        Update::RunOnTime { seconds } => format!("run-on time = {}s", seconds),

        Update::PreheatEnabled { enabled } => {
            format!(
                "pre-heating = {}",
                if *enabled { "enabled" } else { "disabled" }
            )
        }

        Update::QuietRemaining { minutes } => {
            if *minutes == 0 {
                "quiet disabled".to_string()
            } else {
                format!("quiet enabled for {}min", minutes)
            }
        }

        Update::QuietEnabled { enabled, raw } => format!(
            "set quiet {} ({})",
            if *enabled { "enabled" } else { "disabled" },
            raw
        ),

        Update::QuietTime { minutes } => format!("quiet time = {}min", minutes),

        Update::QuietLevel { level } => format!("quiet level = {}", level),

        Update::Bypass2Temp { degrees } => format!("bypass2 = {}°C", degrees),

        Update::Broadcast(status) => render_broadcast(status, session),

        Update::BroadcastBadSize { size } => format!("wrong broadcast size {}", size),
    }
}

fn render_calendar(levels: &[u8; 48]) -> String {
    let mut line = String::new();
    for level in levels {
        match level {
            1 => line.push_str("__"),
            2 => line.push_str("——"),
            3 => line.push_str("‾‾"),
            n => line.push_str(&format!("{:>2}", n)),
        }
    }
    line.push('\n');
    for hour in 0..24 {
        line.push_str(&format!("{:<4}", hour));
    }
    line
}

fn render_broadcast(status: &BroadcastStatus, session: &SessionState) -> String {
    let weekday = DAY_OF_WEEK
        .get(status.weekday as usize)
        .copied()
        .unwrap_or("???");
    let mut line = format!(
        "{} {:02}.{:02}.20{:02} {}:{:02} {}/{}",
        weekday,
        status.day,
        status.month,
        status.year,
        status.hour,
        status.minute,
        if status.fan_auto { "auto" } else { "MANUAL" },
        status.fan_level,
    );
    for i in 0..4 {
        if session.temps[i] != TEMP_ABSENT {
            let j = TEMP_DISPLAY_ORDER[i];
            line.push_str(&format!(" {}{}°C", TEMP_SYMBOLS[j], tenths(session.temps[j])));
        }
    }
    if let Some(bypass) = session.bypass {
        line.push_str(&format!(" bypass {}°C", tenths(bypass)));
    }
    if session.party_minutes != 0 {
        line.push_str(&format!(" party {}min", session.party_minutes));
    }
    if session.quiet_minutes != 0 {
        line.push_str(&format!(" quiet {}min", session.quiet_minutes));
    }
    line
}
