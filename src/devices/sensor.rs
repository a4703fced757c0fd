//! A1 environmental sensor behaviour leaf (C9): one fixed probe decoded
//! into temperature, humidity, and three ordinal levels.

use crate::codec::raw;
use crate::error::{BroadlinkError, Result};
use crate::session::{DEFAULT_COMMAND_DEADLINE, DeviceHandle};

const OUTER_CMD: u8 = 0x6A;
const CMD_CHECK: u32 = 0x01;

/// A named ordinal level with an "unknown" fallback for values the sensor
/// hasn't documented. Each sensor's own ordinal table picks its variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Dark,
    Dim,
    Normal,
    Bright,
    Excellent,
    Good,
    Bad,
    Quiet,
    Noisy,
    Unknown,
}

fn decode_light(byte: u8) -> Level {
    match byte {
        0 => Level::Dark,
        1 => Level::Dim,
        2 => Level::Normal,
        3 => Level::Bright,
        _ => Level::Unknown,
    }
}

fn decode_air_quality(byte: u8) -> Level {
    match byte {
        0 => Level::Excellent,
        1 => Level::Good,
        2 => Level::Normal,
        3 => Level::Bad,
        _ => Level::Unknown,
    }
}

fn decode_noise(byte: u8) -> Level {
    match byte {
        0 => Level::Quiet,
        1 => Level::Normal,
        2 => Level::Noisy,
        _ => Level::Unknown,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub temperature: f64,
    pub humidity: f64,
    pub light: Level,
    pub air_quality: Level,
    pub noise: Level,
}

fn decode_reading(data: &[u8]) -> Result<SensorReading> {
    if data.len() < 9 {
        return Err(BroadlinkError::DataValidation(
            "a1 sensor reply shorter than its status bytes",
        ));
    }
    let temp_hi = data[0] as i8 as f64;
    let temp_lo = data[1] as i8 as f64;
    Ok(SensorReading {
        temperature: temp_hi + temp_lo / 10.0,
        humidity: data[2] as f64 + data[3] as f64 / 10.0,
        light: decode_light(data[4]),
        air_quality: decode_air_quality(data[6]),
        noise: decode_noise(data[8]),
    })
}

pub struct A1<'a> {
    handle: &'a DeviceHandle,
}

impl<'a> A1<'a> {
    pub fn new(handle: &'a DeviceHandle) -> Self {
        Self { handle }
    }

    pub fn check_sensors(&self) -> Result<SensorReading> {
        let inner = raw::wrap(CMD_CHECK, &[]);
        let response = self
            .handle
            .send_command(OUTER_CMD, &inner, DEFAULT_COMMAND_DEADLINE)?;
        let data = raw::unwrap(&response)?;
        decode_reading(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_temperature_and_humidity() {
        let mut data = [0u8; 9];
        data[0] = 22;
        data[1] = 5;
        data[2] = 48;
        data[3] = 2;
        data[4] = 2; // light -> normal
        data[6] = 0; // air_quality -> excellent
        data[8] = 2; // noise -> noisy
        let reading = decode_reading(&data).unwrap();
        assert_eq!(reading.temperature, 22.5);
        assert_eq!(reading.humidity, 48.2);
        assert_eq!(reading.light, Level::Normal);
        assert_eq!(reading.air_quality, Level::Excellent);
        assert_eq!(reading.noise, Level::Noisy);
    }

    #[test]
    fn negative_temperature_decodes_from_signed_bytes() {
        let mut data = [0u8; 9];
        data[0] = 0xFB; // -5 as i8
        data[1] = 0;
        let reading = decode_reading(&data).unwrap();
        assert_eq!(reading.temperature, -5.0);
    }

    #[test]
    fn unrecognised_ordinal_falls_back_to_unknown() {
        assert_eq!(decode_light(0xAA), Level::Unknown);
    }
}
