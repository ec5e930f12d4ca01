//! `heliosctl`: console control tool for the Helios KWL EC 270/370 Pro.
//!
//! Maps command-line options to pending bus operations, then runs the
//! engine's read loop against the serial device: accumulate bytes into
//! bursts, decode them, and answer each transmit-turn marker with at most
//! one request.

mod console;
mod serial;

use std::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use helios_engine::{
    BypassProbe, BypassRequest, FanRequest, Interpreter, PendingOp, PreheatProbe, Sequencer,
    SessionState, TimerRequest, Turn,
};
use helios_protocol::{FrameAssembler, IDLE_GAP};

use console::Console;
use serial::SerialLink;

/// Control the Helios KWL EC 270/370 Pro over its serial bus.
#[derive(Parser, Debug)]
#[command(name = "heliosctl", version)]
struct Args {
    /// Serial device connected to the controller.
    #[arg(long, default_value = "/dev/ttyUSB0", value_name = "PATH")]
    device: PathBuf,

    /// Keep running until ctrl-c, refreshing sensor values.
    #[arg(short = 'l', long = "loop")]
    run_loop: bool,

    /// Show routine incoming frames.
    #[arg(long)]
    verbose: bool,

    /// Read everything below except the calendar.
    #[arg(long)]
    get_all: bool,

    /// Read the bypass temperatures.
    #[arg(long)]
    get_bypass: bool,

    /// Read the calendar for one day (0/Mon .. 6/Sun).
    #[arg(long, value_name = "DAY", value_parser = clap::value_parser!(u8).range(0..=6))]
    get_calendar: Option<u8>,

    /// Read the months left until filter change.
    #[arg(long)]
    get_change_filter: bool,

    /// Read the operating hours counter.
    #[arg(long)]
    get_hours_on: bool,

    /// Read the remaining party time.
    #[arg(long)]
    get_party_enabled: bool,

    /// Read the pre-selected party time.
    #[arg(long)]
    get_party_time: bool,

    /// Read the party fan level.
    #[arg(long)]
    get_party_level: bool,

    /// Read the pre-heating configuration.
    #[arg(long)]
    get_pre_heating: bool,

    /// Read the remaining quiet time.
    #[arg(long)]
    get_quiet_enabled: bool,

    /// Read the pre-selected quiet time.
    #[arg(long)]
    get_quiet_time: bool,

    /// Read the quiet fan level.
    #[arg(long)]
    get_quiet_level: bool,

    /// Read the run-on time.
    #[arg(long)]
    get_run_on_time: bool,

    /// Read the voltages of all fan levels.
    #[arg(long)]
    get_voltage: bool,

    /// Set the bypass temperature: 0 (disable, 28°C), 1 (enable, 18°C) or
    /// an explicit limit in °C (18..30).
    #[arg(short = 'b', long, value_name = "0|1|TEMP", value_parser = parse_bypass)]
    set_bypass: Option<BypassRequest>,

    /// Set the fan: a (auto), m:LEVEL (manual 1..4), up or down (one step).
    #[arg(short = 'f', long, value_name = "a|m:LEVEL|up|down", value_parser = parse_fan)]
    set_fan: Option<FanRequest>,

    /// Set party mode: 0 (disable), 1 (enable) or a duration in minutes.
    #[arg(short = 'p', long, value_name = "0|1|MIN", value_parser = parse_timer)]
    set_party: Option<TimerRequest>,

    /// Set quiet mode: 0 (disable), 1 (enable) or a duration in minutes.
    #[arg(short = 'q', long, value_name = "0|1|MIN", value_parser = parse_timer)]
    set_quiet: Option<TimerRequest>,

    /// Set the time of day.
    #[arg(short = 't', long, value_name = "HH:MM", value_parser = parse_time)]
    set_time: Option<TimeOfDay>,

    /// Calibrate the voltage of one fan level, e.g. 2:4.5.
    #[arg(short = 'v', long, value_name = "LEVEL:VOLTS", value_parser = parse_voltage)]
    set_voltage: Option<VoltageSpec>,
}

#[derive(Debug, Clone, Copy)]
struct TimeOfDay {
    hour: u8,
    minute: u8,
}

#[derive(Debug, Clone, Copy)]
struct VoltageSpec {
    level: u8,
    decivolts: u16,
}

fn parse_bypass(arg: &str) -> Result<BypassRequest, String> {
    let degrees = match arg {
        "0" => 28,
        "1" => 18,
        _ => {
            let degrees: u8 = arg.parse().map_err(|_| "expected 0, 1 or °C")?;
            if !(18..=30).contains(&degrees) {
                return Err("temperature out of range (18..30)".into());
            }
            degrees
        }
    };
    Ok(BypassRequest::Temperature(degrees))
}

fn parse_fan(arg: &str) -> Result<FanRequest, String> {
    match arg {
        "a" => Ok(FanRequest::Auto),
        "up" => Ok(FanRequest::StepUp),
        "down" => Ok(FanRequest::StepDown),
        _ => {
            let level = arg
                .strip_prefix("m:")
                .ok_or("expected a, m:LEVEL, up or down")?;
            match level.parse::<u8>() {
                Ok(level @ 1..=4) => Ok(FanRequest::Level {
                    level,
                    auto_disabled: false,
                }),
                _ => Err("manual level must be 1..4".into()),
            }
        }
    }
}

fn parse_timer(arg: &str) -> Result<TimerRequest, String> {
    match arg {
        "0" => Ok(TimerRequest::Disable),
        "1" => Ok(TimerRequest::Enable),
        _ => {
            let minutes: u16 = arg.parse().map_err(|_| "expected 0, 1 or minutes")?;
            if minutes > 120 {
                return Err("duration too long (max 120min)".into());
            }
            Ok(TimerRequest::Duration(minutes))
        }
    }
}

fn parse_time(arg: &str) -> Result<TimeOfDay, String> {
    let (hour, minute) = arg.split_once(':').ok_or("expected HH:MM")?;
    let hour: u8 = hour.parse().map_err(|_| "bad hour")?;
    let minute: u8 = minute.parse().map_err(|_| "bad minutes")?;
    if hour > 23 {
        return Err("hour out of range".into());
    }
    if minute > 59 {
        return Err("minutes out of range".into());
    }
    Ok(TimeOfDay { hour, minute })
}

fn parse_voltage(arg: &str) -> Result<VoltageSpec, String> {
    let (level, volts) = arg.split_once(':').ok_or("expected LEVEL:VOLTS")?;
    let level: u8 = level.parse().map_err(|_| "bad level")?;
    if !(1..=4).contains(&level) {
        return Err("level must be 1..4".into());
    }
    let (whole, tenth) = match volts.split_once(['.', ',']) {
        Some((whole, tenth)) => {
            if tenth.len() != 1 {
                return Err("expected one decimal digit".into());
            }
            (whole, tenth.parse::<u16>().map_err(|_| "bad voltage")?)
        }
        None => (volts, 0),
    };
    let whole: u16 = whole.parse().map_err(|_| "bad voltage")?;
    let decivolts = whole * 10 + tenth;
    if decivolts > 100 {
        return Err("voltage too high (max 10.0)".into());
    }
    Ok(VoltageSpec { level, decivolts })
}

/// Queue the operations the options ask for, in any order; the sequencer
/// applies the wire priority.
fn queue_operations(args: &Args, seq: &mut Sequencer) {
    if let Some(time) = args.set_time {
        seq.enqueue(PendingOp::SetTime {
            hour: time.hour,
            minute: time.minute,
        });
    }
    if let Some(bypass) = args.set_bypass {
        seq.enqueue(PendingOp::SetBypass(bypass));
    }
    if let Some(fan) = args.set_fan {
        seq.enqueue(PendingOp::SetFan(fan));
    }
    if let Some(party) = args.set_party {
        seq.enqueue(PendingOp::SetParty(party));
    }
    if let Some(quiet) = args.set_quiet {
        seq.enqueue(PendingOp::SetQuiet(quiet));
    }
    if let Some(voltage) = args.set_voltage {
        seq.enqueue(PendingOp::SetVoltage {
            level: voltage.level,
            decivolts: voltage.decivolts,
        });
    }

    // Changing the bypass or voltages reads the result back; a continuous
    // run only refreshes the primary bypass value.
    if args.get_bypass || args.get_all || args.set_bypass.is_some() {
        seq.enqueue(PendingOp::GetBypass(BypassProbe::Secondary));
    } else if args.run_loop {
        seq.enqueue(PendingOp::GetBypass(BypassProbe::Primary));
    }
    if args.get_hours_on || args.get_all {
        seq.enqueue(PendingOp::GetHoursOn);
    }
    if args.get_voltage || args.get_all || args.set_voltage.is_some() {
        seq.enqueue(PendingOp::GetVoltage { remaining: 4 });
    }
    if args.get_party_enabled || args.get_all || args.run_loop {
        seq.enqueue(PendingOp::GetPartyRemaining);
    }
    if args.get_party_time || args.get_all {
        seq.enqueue(PendingOp::GetPartyTime);
    }
    if args.get_party_level || args.get_all {
        seq.enqueue(PendingOp::GetPartyLevel);
    }
    if args.get_quiet_enabled || args.get_all || args.run_loop {
        seq.enqueue(PendingOp::GetQuietRemaining);
    }
    if args.get_quiet_time || args.get_all {
        seq.enqueue(PendingOp::GetQuietTime);
    }
    if args.get_quiet_level || args.get_all {
        seq.enqueue(PendingOp::GetQuietLevel);
    }
    if let Some(weekday) = args.get_calendar {
        seq.enqueue(PendingOp::GetCalendar { weekday });
    }
    if args.get_pre_heating || args.get_all {
        seq.enqueue(PendingOp::GetPreheat(PreheatProbe::Enabled));
    }
    if args.get_run_on_time || args.get_all {
        seq.enqueue(PendingOp::GetRunOnTime);
    }
    if args.get_change_filter || args.get_all {
        seq.enqueue(PendingOp::GetFilterTime);
    }
}

/// Exclusive-use marker under /var/lock, removed on drop.
struct DeviceLock {
    path: PathBuf,
}

impl DeviceLock {
    fn acquire(device: &Path) -> io::Result<DeviceLock> {
        let name = device
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "bad device path"))?;
        let path = Path::new("/var/lock").join(name);
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|err| {
                io::Error::new(
                    err.kind(),
                    format!("cannot lock {} ({})", path.display(), err),
                )
            })?;
        Ok(DeviceLock { path })
    }
}

impl Drop for DeviceLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("heliosctl: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    println!("Helios KWL control");

    let device = args.device.to_string_lossy().into_owned();
    let _lock = DeviceLock::acquire(&args.device)?;
    let mut link = SerialLink::open(&device)?;

    let terminate = Arc::new(AtomicBool::new(false));
    {
        let terminate = Arc::clone(&terminate);
        ctrlc::set_handler(move || terminate.store(true, Ordering::Relaxed))?;
    }

    let mut seq = Sequencer::new(args.run_loop);
    queue_operations(&args, &mut seq);

    let mut interp = Interpreter::new(args.verbose);
    let mut session = SessionState::new();
    let mut console = Console::new(args.run_loop);

    run_session(
        &mut link,
        &mut seq,
        &mut interp,
        &mut session,
        &mut console,
        &terminate,
    )?;

    console.finish(interp.replay_last_status(), &session);
    debug!(packets = interp.packets_received(), "session closed");
    Ok(())
}

/// The blocking read loop: one byte per iteration, burst boundaries from
/// inter-byte timing, one optional outbound frame per turn marker.
fn run_session(
    link: &mut SerialLink,
    seq: &mut Sequencer,
    interp: &mut Interpreter,
    session: &mut SessionState,
    console: &mut Console,
    terminate: &AtomicBool,
) -> io::Result<()> {
    let mut assembler = FrameAssembler::new();
    let mut last_byte = Instant::now();

    while !terminate.load(Ordering::Relaxed) {
        let byte = link.read_byte()?;

        let elapsed = last_byte.elapsed();
        if elapsed >= IDLE_GAP && !assembler.is_empty() {
            let burst = assembler.take_burst();
            for report in interp.handle_burst(elapsed, &burst, session) {
                console.print_report(&report, session);
            }
        }

        let Some(byte) = byte else { continue };
        last_byte = Instant::now();

        if let Err(err) = assembler.push(byte) {
            warn!(%err, "resynchronizing");
            console.print_error("buffer overflow");
            continue;
        }

        if assembler.at_turn_marker() {
            match seq.on_turn(session) {
                Turn::Idle => {}
                Turn::Transmit(request) => {
                    let frame = request.encode();
                    debug!(turn = seq.turns(), frame = ?frame, "transmit");
                    link.write_frame(&frame)?;
                }
                Turn::Done => break,
            }
        }
    }
    Ok(())
}
