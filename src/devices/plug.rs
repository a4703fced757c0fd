//! Smart plug behaviour leaf (C9): SP1 is fire-and-forget; SP2/SP2S/SP3/SP3S
//! add status read-back, an optional nightlight, and energy metering.
//!
//! Neither family speaks the RM-style raw inner codec (a 4-byte command
//! echoed in both directions): both send and receive one fixed 16-byte
//! packet with the command byte at offset 0 and the payload starting at
//! offset 4, undecorated by any further framing.

use crate::error::{BroadlinkError, Result};
use crate::session::{DEFAULT_COMMAND_DEADLINE, DeviceHandle};

const OUTER_CMD_SP1: u8 = 0x66;
const OUTER_CMD_SP2: u8 = 0x6A;

const CMD_SET_POWER: u8 = 0x02;
const CMD_CHECK_POWER: u8 = 0x01;
const CMD_GET_ENERGY: u8 = 0x04;

const POWER_BITS: [u8; 3] = [1, 3, 0xFD];
const NIGHTLIGHT_BITS: [u8; 3] = [2, 3, 0xFF];

fn build_packet(cmd: u8, payload: &[u8]) -> Vec<u8> {
    let mut packet = vec![0u8; 16];
    packet[0] = cmd;
    let n = payload.len().min(packet.len() - 4);
    packet[4..4 + n].copy_from_slice(&payload[..n]);
    packet
}

/// SP1: output-only, no status read, distinct outer command.
pub struct Sp1<'a> {
    handle: &'a DeviceHandle,
}

impl<'a> Sp1<'a> {
    pub fn new(handle: &'a DeviceHandle) -> Self {
        Self { handle }
    }

    pub fn set_power(&self, on: bool) -> Result<()> {
        let packet = [on as u8, 0, 0, 0];
        self.handle
            .send_command(OUTER_CMD_SP1, &packet, DEFAULT_COMMAND_DEADLINE)?;
        Ok(())
    }
}

/// SP2 and its firmware-generation siblings (SP2S/SP3/SP3S): power,
/// optional nightlight, optional energy metering.
pub struct Sp2<'a> {
    handle: &'a DeviceHandle,
}

impl<'a> Sp2<'a> {
    pub fn new(handle: &'a DeviceHandle) -> Self {
        Self { handle }
    }

    fn exchange(&self, cmd: u8, payload: &[u8]) -> Result<Vec<u8>> {
        let packet = build_packet(cmd, payload);
        self.handle
            .send_command(OUTER_CMD_SP2, &packet, DEFAULT_COMMAND_DEADLINE)
    }

    pub fn check_power(&self) -> Result<bool> {
        let data = self.exchange(CMD_CHECK_POWER, &[])?;
        let byte = *data.get(4).ok_or(BroadlinkError::DataValidation(
            "power status shorter than its status byte",
        ))?;
        Ok(POWER_BITS.contains(&byte))
    }

    pub fn check_nightlight(&self) -> Result<bool> {
        let data = self.exchange(CMD_CHECK_POWER, &[])?;
        let byte = *data.get(4).ok_or(BroadlinkError::DataValidation(
            "power status shorter than its status byte",
        ))?;
        Ok(NIGHTLIGHT_BITS.contains(&byte))
    }

    pub fn set_power(&self, on: bool) -> Result<()> {
        let nightlight = self.check_nightlight().unwrap_or(false);
        self.write_combined(on, nightlight)
    }

    pub fn set_nightlight(&self, on: bool) -> Result<()> {
        let power = self.check_power().unwrap_or(false);
        self.write_combined(power, on)
    }

    fn write_combined(&self, power: bool, nightlight: bool) -> Result<()> {
        let state = match (power, nightlight) {
            (false, false) => 0u8,
            (true, false) => 1,
            (false, true) => 2,
            (true, true) => 3,
        };
        self.exchange(CMD_SET_POWER, &[state])?;
        Ok(())
    }

    /// Cumulative energy use in kWh, decoded from a fixed 10-byte probe.
    pub fn get_energy(&self) -> Result<f64> {
        let probe = [0x08, 0, 0xFE, 0x01, 0x05, 0x01, 0x00, 0x00, 0x00, 0x2D];
        let data = self.exchange(CMD_GET_ENERGY, &probe)?;
        decode_energy(&data)
    }
}

/// The energy reading is packed BCD-like: each byte's hex digits are
/// reinterpreted as decimal digits, matching the reference firmware.
fn decode_energy(data: &[u8]) -> Result<f64> {
    if data.len() < 8 {
        return Err(BroadlinkError::DataValidation(
            "energy probe reply shorter than its three energy bytes",
        ));
    }
    let whole = format!("{:x}", data[7] as u32 * 256 + data[6] as u32)
        .parse::<f64>()
        .unwrap_or(0.0);
    let fraction = format!("{:x}", data[5]).parse::<f64>().unwrap_or(0.0) / 100.0;
    Ok(whole + fraction)
}
