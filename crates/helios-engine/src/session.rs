//! Last-known derived device state.

use helios_protocol::TEMP_ABSENT;

/// Per-channel symbols: outdoor ↓, extract ←, exhaust ↑, supply →.
pub const TEMP_SYMBOLS: [&str; 4] = ["↓", "←", "↑", "→"];
/// Channel permutation used when rendering the four session temperatures.
pub const TEMP_DISPLAY_ORDER: [usize; 4] = [0, 3, 1, 2];

/// Cached last-known values shared between the interpreter (writer) and the
/// sequencer plus status renderer (readers).
///
/// All access happens on one execution context in strict alternation per
/// received frame; no locking is involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Outdoor, extract, exhaust, and supply air temperatures in tenth
    /// degrees Celsius; `TEMP_ABSENT` until a sensor frame arrives.
    pub temps: [u16; 4],
    /// Bypass temperature in tenth degrees Celsius, once known.
    pub bypass: Option<u16>,
    /// Remaining party minutes, 0 when off.
    pub party_minutes: u16,
    /// Remaining quiet minutes, 0 when off.
    pub quiet_minutes: u16,
    /// Current fan level, once known.
    pub fan_level: Option<u8>,
    /// Whether the controller runs in automatic mode, once known.
    pub fan_auto: Option<bool>,
}

impl SessionState {
    /// Fresh state with every value unknown.
    pub fn new() -> Self {
        SessionState {
            temps: [TEMP_ABSENT; 4],
            bypass: None,
            party_minutes: 0,
            quiet_minutes: 0,
            fan_level: None,
            fan_auto: None,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
