//! Serial link to the ventilation controller.
//!
//! The bus runs at 19200 baud, 8N1, no flow control. Reads are single bytes
//! with a short timeout so the run loop can check for cancellation between
//! bytes; the timeout comfortably exceeds the 25 ms burst-boundary gap, so a
//! timed-out read always closes the current burst.

use std::io::{self, Read, Write};
use std::thread;
use std::time::Duration;

use serialport::SerialPort;

/// Settle delay before each outbound frame.
const WRITE_SETTLE: Duration = Duration::from_millis(5);
/// Read timeout; bounds how long a cancellation check can be deferred.
const READ_TIMEOUT: Duration = Duration::from_millis(200);

/// Exclusive byte source/sink for one bus session.
pub struct SerialLink {
    port: Box<dyn SerialPort>,
}

impl SerialLink {
    /// Open and configure the serial device.
    pub fn open(path: &str) -> serialport::Result<Self> {
        let port = serialport::new(path, 19_200)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(READ_TIMEOUT)
            .open()?;
        Ok(SerialLink { port })
    }

    /// Read one byte; `None` when the read timed out.
    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match self.port.read(&mut buf) {
            Ok(1) => Ok(Some(buf[0])),
            Ok(_) => Ok(None),
            Err(err) if err.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Write one whole frame.
    pub fn write_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        thread::sleep(WRITE_SETTLE);
        self.port.write_all(frame)?;
        self.port.flush()
    }
}
