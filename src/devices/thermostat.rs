//! Hysen-branded thermostat behaviour leaf (C9): CRC-framed register reads
//! and writes, plus the weekday/weekend schedule decode.
//!
//! The response `crc_framed::unwrap` hands back is the raw Modbus-style
//! reply (`addr ‖ func ‖ byte_count ‖ registers...`), indexed exactly as
//! the reference implementation indexes it — `body[3]` is the first real
//! register (`remote_lock`), not `body[2]`.

use crate::codec::crc_framed;
use crate::error::{BroadlinkError, Result};
use crate::session::{DEFAULT_COMMAND_DEADLINE, DeviceHandle};

const OUTER_CMD: u8 = 0x6A;

/// One hour:minute:temperature schedule entry.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScheduleSlot {
    pub hour: u8,
    pub minute: u8,
    pub temp: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HysenStatus {
    pub remote_lock: bool,
    pub power: bool,
    pub active: bool,
    pub temp_manual: bool,
    pub heating_cooling: bool,
    pub room_temp: f64,
    pub thermostat_temp: f64,
    pub auto_mode: u8,
    pub loop_mode: u8,
    pub sensor: u8,
    pub osv: u8,
    pub dif: u8,
    pub svh: u8,
    pub svl: u8,
    pub room_temp_adj: f64,
    pub fre: u8,
    pub poweron: u8,
    pub external_temp: f64,
    pub weekday_schedule: [ScheduleSlot; 6],
    pub weekend_schedule: [ScheduleSlot; 2],
}

/// Room/external temperature: a half-degree base reading plus a tenth-degree
/// calibration nudge carried in two other bytes of the same reply.
fn decode_temp(body: &[u8], base_index: usize) -> Result<f64> {
    let base = *body
        .get(base_index)
        .ok_or(BroadlinkError::DataValidation(
            "thermostat reply missing its temperature register",
        ))? as f64
        / 2.0;
    let add_offset = body.get(4).map(|b| (b >> 3) & 1 != 0).unwrap_or(false);
    let offset = if add_offset {
        let raw = body.get(17).map(|b| (b >> 4) & 3).unwrap_or(0);
        (raw as f64 + 1.0) / 10.0
    } else {
        0.0
    };
    Ok(base + offset)
}

fn decode_full_status(body: &[u8]) -> Result<HysenStatus> {
    if body.len() < 47 {
        return Err(BroadlinkError::DataValidation(
            "thermostat status shorter than its fixed register block",
        ));
    }

    let room_temp_adj = i16::from_be_bytes([body[13], body[14]]) as f64 / 10.0;

    let mut weekday_schedule = [ScheduleSlot::default(); 6];
    let mut weekend_schedule = [ScheduleSlot::default(); 2];
    for i in 0..8 {
        let slot = ScheduleSlot {
            hour: body[2 * i + 23],
            minute: body[2 * i + 24],
            temp: body[i + 39] as f64 / 2.0,
        };
        if i < 6 {
            weekday_schedule[i] = slot;
        } else {
            weekend_schedule[i - 6] = slot;
        }
    }

    Ok(HysenStatus {
        remote_lock: body[3] & 1 != 0,
        power: body[4] & 1 != 0,
        active: (body[4] >> 4) & 1 != 0,
        temp_manual: (body[4] >> 6) & 1 != 0,
        heating_cooling: (body[4] >> 7) & 1 != 0,
        room_temp: decode_temp(body, 5)?,
        thermostat_temp: body[6] as f64 / 2.0,
        auto_mode: body[7] & 0x0F,
        loop_mode: body[7] >> 4,
        sensor: body[8],
        osv: body[9],
        dif: body[10],
        svh: body[11],
        svl: body[12],
        room_temp_adj,
        fre: body[15],
        poweron: body[16],
        external_temp: decode_temp(body, 18)?,
        weekday_schedule,
        weekend_schedule,
    })
}

pub struct Thermostat<'a> {
    handle: &'a DeviceHandle,
}

impl<'a> Thermostat<'a> {
    pub fn new(handle: &'a DeviceHandle) -> Self {
        Self { handle }
    }

    fn exchange(&self, body: &[u8]) -> Result<Vec<u8>> {
        let inner = crc_framed::wrap(body);
        let response = self
            .handle
            .send_command(OUTER_CMD, &inner, DEFAULT_COMMAND_DEADLINE)?;
        crc_framed::unwrap(&response)
    }

    pub fn get_full_status(&self) -> Result<HysenStatus> {
        let data = self.exchange(&[0x01, 0x03, 0x00, 0x00, 0x00, 0x16])?;
        decode_full_status(&data)
    }

    /// Room temperature from a narrower 8-register read (the device ignores
    /// the requested count and always replies with its full status block).
    pub fn get_temp(&self) -> Result<f64> {
        let data = self.exchange(&[0x01, 0x03, 0x00, 0x00, 0x00, 0x08])?;
        decode_temp(&data, 5)
    }

    pub fn get_external_temp(&self) -> Result<f64> {
        let data = self.exchange(&[0x01, 0x03, 0x00, 0x00, 0x00, 0x08])?;
        decode_temp(&data, 18)
    }

    pub fn set_temp(&self, temp: f64) -> Result<()> {
        let raw = (temp * 2.0) as u8;
        self.exchange(&[0x01, 0x06, 0x00, 0x01, 0x00, raw])?;
        Ok(())
    }

    pub fn set_power(&self, power: bool, remote_lock: bool, heating_cooling: bool) -> Result<()> {
        let state = ((heating_cooling as u8) << 7) | power as u8;
        self.exchange(&[0x01, 0x06, 0x00, 0x00, remote_lock as u8, state])?;
        Ok(())
    }

    pub fn set_mode(&self, auto_mode: u8, loop_mode: u8, sensor: u8) -> Result<()> {
        let mode_byte = ((loop_mode + 1) << 4) + auto_mode;
        self.exchange(&[0x01, 0x06, 0x00, 0x02, mode_byte, sensor])?;
        Ok(())
    }

    pub fn switch_to_auto(&self) -> Result<()> {
        self.set_mode(1, 0, 0)
    }

    pub fn switch_to_manual(&self) -> Result<()> {
        self.set_mode(0, 0, 0)
    }
}
