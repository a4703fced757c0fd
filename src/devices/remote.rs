//! IR/RF blaster behaviour leaf (C9): classic RM devices speak the raw
//! inner codec, RM4 devices the length-prefixed one. Both share the same
//! command set and outer command code `0x6A`.

use crate::codec::{length_prefixed, raw};
use crate::error::{BroadlinkError, Result};
use crate::session::{DEFAULT_COMMAND_DEADLINE, DeviceHandle};

const OUTER_CMD: u8 = 0x6A;

const CMD_SEND: u32 = 0x02;
const CMD_ENTER_LEARNING: u32 = 0x03;
const CMD_CHECK_DATA: u32 = 0x04;
const CMD_CHECK_SENSORS_CLASSIC: u32 = 0x01;
const CMD_CHECK_SENSORS_V4: u32 = 0x24;
const CMD_SWEEP_FREQUENCY: u32 = 0x19;
const CMD_CANCEL_SWEEP: u32 = 0x1E;
const CMD_CHECK_FREQUENCY: u32 = 0x1A;
const CMD_FIND_RF_PACKET: u32 = 0x1B;

/// Which inner codec this remote's family speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteKind {
    /// Classic RM mini/pro: raw inner codec.
    Classic,
    /// RM4 mini/pro: length-prefixed inner codec.
    V4,
}

/// Temperature, and humidity where the family reports it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub temperature: f64,
    pub humidity: Option<f64>,
}

pub struct Remote<'a> {
    handle: &'a DeviceHandle,
    kind: RemoteKind,
}

impl<'a> Remote<'a> {
    pub fn new(handle: &'a DeviceHandle, kind: RemoteKind) -> Self {
        Self { handle, kind }
    }

    fn exchange(&self, cmd: u32, body: &[u8]) -> Result<Vec<u8>> {
        let inner = match self.kind {
            RemoteKind::Classic => raw::wrap(cmd, body),
            RemoteKind::V4 => length_prefixed::wrap(cmd, body),
        };
        let response = self
            .handle
            .send_command(OUTER_CMD, &inner, DEFAULT_COMMAND_DEADLINE)?;
        let unwrapped = match self.kind {
            RemoteKind::Classic => raw::unwrap(&response)?.to_vec(),
            RemoteKind::V4 => length_prefixed::unwrap(&response)?.to_vec(),
        };
        Ok(unwrapped)
    }

    /// Put the device into IR/RF learning mode.
    pub fn enter_learning(&self) -> Result<()> {
        self.exchange(CMD_ENTER_LEARNING, &[])?;
        Ok(())
    }

    /// Read back whatever code the device captured since `enter_learning`.
    /// Fails with [`BroadlinkError::StorageFull`] if nothing was captured.
    pub fn check_data(&self) -> Result<Vec<u8>> {
        let data = self.exchange(CMD_CHECK_DATA, &[])?;
        if data.is_empty() {
            return Err(BroadlinkError::StorageFull);
        }
        Ok(data)
    }

    /// Transmit a previously learned or hand-built IR/RF code.
    pub fn send_data(&self, code: &[u8]) -> Result<()> {
        self.exchange(CMD_SEND, code)?;
        Ok(())
    }

    pub fn sweep_frequency(&self) -> Result<()> {
        self.exchange(CMD_SWEEP_FREQUENCY, &[])?;
        Ok(())
    }

    pub fn cancel_sweep(&self) -> Result<()> {
        self.exchange(CMD_CANCEL_SWEEP, &[])?;
        Ok(())
    }

    pub fn check_frequency(&self) -> Result<bool> {
        let data = self.exchange(CMD_CHECK_FREQUENCY, &[])?;
        Ok(data.first().copied() == Some(1))
    }

    pub fn find_rf_packet(&self) -> Result<()> {
        self.exchange(CMD_FIND_RF_PACKET, &[])?;
        Ok(())
    }

    /// Onboard temperature (classic) or temperature + humidity (v4).
    pub fn check_sensors(&self) -> Result<SensorReading> {
        let cmd = match self.kind {
            RemoteKind::Classic => CMD_CHECK_SENSORS_CLASSIC,
            RemoteKind::V4 => CMD_CHECK_SENSORS_V4,
        };
        let data = self.exchange(cmd, &[])?;
        if data.len() < 2 {
            return Err(BroadlinkError::DataValidation(
                "sensor reading shorter than its temperature pair",
            ));
        }
        // temperature bytes are signed (struct.unpack("<bb", ...) on the source side)
        let hi = data[0] as i8 as f64;
        let lo = data[1] as i8 as f64;

        match self.kind {
            RemoteKind::Classic => Ok(SensorReading {
                temperature: hi + lo / 10.0,
                humidity: None,
            }),
            RemoteKind::V4 => {
                let humidity = (data.len() >= 4).then(|| data[2] as f64 + data[3] as f64 / 100.0);
                Ok(SensorReading {
                    temperature: hi + lo / 100.0,
                    humidity,
                })
            }
        }
    }
}
