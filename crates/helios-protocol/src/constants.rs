//! Protocol constants
//!
//! These constants define the device addressing, frame directions, variable
//! indices, and sentinel values used on the Helios KWL serial bus.

// ============================================================================
// Device addressing
// ============================================================================

/// Lowest regular device id seen on the bus.
pub const DEVICE_ID_MIN: u8 = 0x10;
/// Highest regular device id seen on the bus.
pub const DEVICE_ID_MAX: u8 = 0x13;
/// Device id the console-side master transmits with.
pub const MASTER_ID: u8 = 0x13;
/// Both id bytes of the unsolicited broadcast status frame.
pub const BROADCAST_ID: u8 = 0xff;

/// Foreign bus ids whose empty read requests are routinely observed and
/// deliberately not decoded.
pub const FOREIGN_MASTER_IDS: [u8; 12] = [
    0x31, 0x32, 0x34, 0x38, 0x41, 0x42, 0x44, 0x48, 0x51, 0x52, 0x54, 0x58,
];

// ============================================================================
// Frame layout
// ============================================================================

/// Frame direction: read request.
pub const DIR_READ: u8 = 0;
/// Frame direction: write / status snapshot.
pub const DIR_WRITE: u8 = 1;
/// Frame direction: write acknowledge.
pub const DIR_ACK: u8 = 5;

/// Header bytes preceding the payload (id, direction, payload length).
pub const HEADER_LEN: usize = 3;
/// Smallest complete frame: header plus checksum, empty payload.
pub const MIN_FRAME_LEN: usize = HEADER_LEN + 1;
/// Total length of the broadcast status frame.
pub const BROADCAST_FRAME_LEN: usize = 27;

/// Second payload byte of every write acknowledge.
pub const ACK_MAGIC: u8 = 0x55;
/// Marker byte used in fan mode-change values ({0xaa, mode}).
pub const FAN_MODE_MAGIC: u8 = 0xaa;
/// Marker byte used in fan manual-level values ({level, 0xbb}).
pub const FAN_LEVEL_MAGIC: u8 = 0xbb;

/// Wire pattern after which the master may transmit one request. It is
/// itself a checksum-valid empty read request for the master id.
pub const TURN_MARKER: [u8; 4] = [0x13, 0x00, 0x00, 0x14];

// ============================================================================
// Sentinel values ("channel absent / no reading")
// ============================================================================

/// Temperature channel sentinel (tenth degrees Celsius).
pub const TEMP_ABSENT: u16 = 9990;
/// CO2 channel sentinel.
pub const CO2_ABSENT: u16 = 9999;
/// Humidity channel sentinel.
pub const HUMIDITY_ABSENT: u16 = 999;

// ============================================================================
// Variable indices
// ============================================================================

/// Calendar Monday, 24 x 8-bit, two packed levels per byte.
pub const VAR_CALENDAR_MON: u8 = 0x00;
/// Calendar Tuesday.
pub const VAR_CALENDAR_TUE: u8 = 0x01;
/// Calendar Wednesday.
pub const VAR_CALENDAR_WED: u8 = 0x02;
/// Calendar Thursday.
pub const VAR_CALENDAR_THU: u8 = 0x03;
/// Calendar Friday.
pub const VAR_CALENDAR_FRI: u8 = 0x04;
/// Calendar Saturday.
pub const VAR_CALENDAR_SAT: u8 = 0x05;
/// Calendar Sunday (low/high half hour).
pub const VAR_CALENDAR_SUN: u8 = 0x06;
/// Date, 24-bit ([0]=day [1]=month [2]=year).
pub const VAR_DATE: u8 = 0x07;
/// Time of day, 16-bit ([0]=hour [1]=minutes).
pub const VAR_TIME: u8 = 0x08;
/// Back-up heating, 8-bit (0=disabled, 1=enabled).
pub const VAR_BACKUP_HEATING: u8 = 0x0d;
/// Pre-heating temperature snapshot, 16-bit (requested at 0x50).
pub const VAR_PREHEAT_TEMP_STATUS: u8 = 0x0e;
/// Party enabled, 8-bit, write-only (0=disabled, 1=enabled).
pub const VAR_PARTY_ENABLED: u8 = 0x0f;
/// Party remaining time, 16-bit minutes.
pub const VAR_PARTY_REMAINING: u8 = 0x10;
/// Party pre-selected time, 16-bit minutes.
pub const VAR_PARTY_TIME: u8 = 0x11;
/// External contact, 8-bit.
pub const VAR_EXT_CONTACT: u8 = 0x14;
/// Operating hours counter, 32-bit hours.
pub const VAR_HOURS_ON: u8 = 0x15;
/// Fan level 1 voltages, 2 x 16-bit tenth volts (supply/exhaust).
pub const VAR_FAN1_VOLTAGE: u8 = 0x16;
/// Fan level 2 voltages.
pub const VAR_FAN2_VOLTAGE: u8 = 0x17;
/// Fan level 3 voltages.
pub const VAR_FAN3_VOLTAGE: u8 = 0x18;
/// Fan level 4 voltages.
pub const VAR_FAN4_VOLTAGE: u8 = 0x19;
/// Vacation start, 24-bit (day, month, year).
pub const VAR_VACATION_START: u8 = 0x1a;
/// Vacation end, 24-bit (day, month, year).
pub const VAR_VACATION_END: u8 = 0x1b;
/// Bypass temperature (outdoor air limit), 16-bit tenth degrees.
pub const VAR_BYPASS1_TEMP: u8 = 0x1e;
/// Frost protection temperature, 16-bit tenth degrees.
pub const VAR_FROST_PROTECTION: u8 = 0x1f;
/// Week-program CO2 offset, 8-bit ppm.
pub const VAR_WEEKOFFS_CO2: u8 = 0x21;
/// Week-program humidity offset, 8-bit percent.
pub const VAR_WEEKOFFS_HUMIDITY: u8 = 0x22;
/// Week-program temperature offset, 8-bit degrees.
pub const VAR_WEEKOFFS_TEMP: u8 = 0x23;
/// Current fan level, 8-bit 0..4, read-only.
pub const VAR_FAN_LEVEL: u8 = 0x35;
/// Minimum fan level, 8-bit 0..4.
pub const VAR_MIN_FAN_LEVEL: u8 = 0x37;
/// Months until filter change, 8-bit.
pub const VAR_CHANGE_FILTER: u8 = 0x38;
/// Temperature sensors, 10 x 16-bit tenth degrees.
pub const VAR_SENSOR_TEMPS: u8 = 0x3a;
/// CO2 sensors, 4 x 16-bit.
pub const VAR_SENSOR_CO2: u8 = 0x3b;
/// Humidity sensors, 4 x 16-bit.
pub const VAR_SENSOR_HUMIDITY: u8 = 0x3c;
/// Party fan level, 8-bit.
pub const VAR_PARTY_LEVEL: u8 = 0x42;
/// Supply air level, 8-bit.
pub const VAR_SUPPLY_LEVEL: u8 = 0x45;
/// Exhaust air level, 8-bit.
pub const VAR_EXHAUST_LEVEL: u8 = 0x46;
/// Software version, 16-bit.
pub const VAR_SOFTWARE_VERSION: u8 = 0x48;
/// Run-on time, 8-bit seconds.
pub const VAR_RUN_ON_TIME: u8 = 0x49;
/// Vacation enabled, 8-bit (0=off, 1=on).
pub const VAR_VACATION_ENABLED: u8 = 0x4e;
/// Pre-heating enabled, 8-bit (0=off, 1=on).
pub const VAR_PREHEAT_ENABLED: u8 = 0x4f;
/// Pre-heating temperature, 16-bit tenth degrees.
pub const VAR_PREHEAT_TEMP: u8 = 0x50;
/// Week-program offsets enabled, 8-bit (0=off, 1=on).
pub const VAR_WEEKOFFS_ENABLED: u8 = 0x52;
/// Quiet remaining time, 16-bit minutes.
pub const VAR_QUIET_REMAINING: u8 = 0x54;
/// Quiet enabled, 8-bit, write-only (0=disabled, 1=enabled).
pub const VAR_QUIET_ENABLED: u8 = 0x55;
/// Quiet pre-selected time, 8-bit minutes.
pub const VAR_QUIET_TIME: u8 = 0x56;
/// Quiet fan level, 8-bit.
pub const VAR_QUIET_LEVEL: u8 = 0x57;
/// Bypass temperature, 8-bit whole degrees.
pub const VAR_BYPASS2_TEMP: u8 = 0x60;

// Observed but unconfirmed indices, constant values seen on the wire:
// 0x1c (16-bit, 800), 0x1d (8-bit, 0x3c), 0x20 (8-bit, 1), 0x3f (8-bit, 0),
// 0x40/0x41 (8-bit, 0x0a), 0x43/0x44/0x47 (8-bit, 0), 0x4a/0x4b (8-bit,
// 0x3c), 0x4c/0x4d (8-bit, 2), 0x51 (8-bit, 2), 0x58..0x5e (26 x 8-bit
// tables), 0x5f (8-bit, 0), 0x61..0x64 (24-bit), 0x65 (16-bit, 165),
// 0x66 (16-bit, 400), 0x67 (32-bit). They are left undecoded and surface
// as unrecognized frames.

/// Human-readable name for a variable index, for diagnostics.
pub fn variable_name(index: u8) -> &'static str {
    match index {
        VAR_CALENDAR_MON => "calendar monday",
        VAR_CALENDAR_TUE => "calendar tuesday",
        VAR_CALENDAR_WED => "calendar wednesday",
        VAR_CALENDAR_THU => "calendar thursday",
        VAR_CALENDAR_FRI => "calendar friday",
        VAR_CALENDAR_SAT => "calendar saturday",
        VAR_CALENDAR_SUN => "calendar sunday",
        VAR_DATE => "date month year",
        VAR_TIME => "time hour min",
        VAR_BACKUP_HEATING => "back-up heating",
        VAR_PREHEAT_TEMP_STATUS => "pre-heating temperature",
        VAR_PARTY_ENABLED => "party enabled",
        VAR_PARTY_REMAINING => "party current time",
        VAR_PARTY_TIME => "party time",
        VAR_EXT_CONTACT => "external contact",
        VAR_HOURS_ON => "hours on",
        VAR_FAN1_VOLTAGE => "fan 1 voltage",
        VAR_FAN2_VOLTAGE => "fan 2 voltage",
        VAR_FAN3_VOLTAGE => "fan 3 voltage",
        VAR_FAN4_VOLTAGE => "fan 4 voltage",
        VAR_VACATION_START => "vacation start",
        VAR_VACATION_END => "vacation end",
        VAR_BYPASS1_TEMP => "bypass1 temperature",
        VAR_FROST_PROTECTION => "frost protection",
        VAR_WEEKOFFS_CO2 => "week offset co2",
        VAR_WEEKOFFS_HUMIDITY => "week offset humidity",
        VAR_WEEKOFFS_TEMP => "week offset temp",
        VAR_FAN_LEVEL => "fan level",
        VAR_MIN_FAN_LEVEL => "minimum fan level",
        VAR_CHANGE_FILTER => "change filter",
        VAR_SENSOR_TEMPS => "sensors temperature",
        VAR_SENSOR_CO2 => "sensors co2",
        VAR_SENSOR_HUMIDITY => "sensors humidity",
        VAR_PARTY_LEVEL => "party level",
        VAR_SUPPLY_LEVEL => "supply air level",
        VAR_EXHAUST_LEVEL => "exhaust air level",
        VAR_SOFTWARE_VERSION => "software version",
        VAR_RUN_ON_TIME => "run-on time",
        VAR_VACATION_ENABLED => "vacation enabled",
        VAR_PREHEAT_ENABLED => "pre-heating enabled",
        VAR_PREHEAT_TEMP => "pre-heating temperature",
        VAR_WEEKOFFS_ENABLED => "week offset enabled",
        VAR_QUIET_REMAINING => "quiet current time",
        VAR_QUIET_ENABLED => "quiet enabled",
        VAR_QUIET_TIME => "quiet time",
        VAR_QUIET_LEVEL => "quiet level",
        VAR_BYPASS2_TEMP => "bypass2 temperature",
        _ => "unknown",
    }
}
