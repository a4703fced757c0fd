//! HVAC behaviour leaf (C9): double-framed inner codec, with inner
//! commands additionally prefixed by `((command<<4)|1) ‖ 0x01` ahead of
//! the command-specific data (§4.7).
//!
//! `HvacState`'s byte/bit layout mirrors `climate.py`'s `_parse_state`/
//! `set_state` exactly — it is not a sequential bitfield invented for this
//! crate, and interoperates with a real unit because of that.

use crate::codec::double_framed;
use crate::error::{BroadlinkError, Result};
use crate::session::{DEFAULT_COMMAND_DEADLINE, DeviceHandle};

const OUTER_CMD: u8 = 0x6A;

const COMMAND_SET_STATE: u8 = 0;
const COMMAND_GET_STATE: u8 = 1;
const COMMAND_GET_AC_INFO: u8 = 2;

const UNK0: u8 = 0b100;
const UNK1: u8 = 0b1101;
const UNK2: u8 = 0b101;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HvacState {
    pub power: bool,
    pub target_temp: f64,
    /// Raw 3-bit vertical swing code: 0 = on, 1-5 = fixed positions, 7 = off.
    pub swing_v: u8,
    /// Raw horizontal swing code: 0 = on, 7 = off.
    pub swing_h: u8,
    pub mode: u8,
    pub speed: u8,
    pub preset: u8,
    pub sleep: bool,
    pub ifeel: bool,
    pub health: bool,
    pub clean: bool,
    pub display: bool,
    pub mildew: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AcInfo {
    pub power: bool,
    pub ambient_temp: f64,
}

fn encode_state(state: &HvacState) -> [u8; 13] {
    let target_temp = (state.target_temp * 2.0).round() / 2.0;
    let half_degree = (target_temp % 1.0 - 0.5).abs() < f64::EPSILON;

    let mut data = [0u8; 13];
    data[0x00] = (((target_temp as i64 - 8) as u8) << 3) | (state.swing_v & 0b111);
    data[0x01] = (state.swing_h << 5) | UNK0;
    data[0x02] = ((half_degree as u8) << 7) | UNK1;
    data[0x03] = state.speed << 5;
    data[0x04] = state.preset << 6;
    data[0x05] = (state.mode << 5) | ((state.sleep as u8) << 2) | ((state.ifeel as u8) << 3);
    data[0x08] =
        ((state.power as u8) << 5) | ((state.clean as u8) << 2) | (if state.health { 0b11 } else { 0 });
    data[0x0A] = ((state.display as u8) << 4) | ((state.mildew as u8) << 3);
    data[0x0C] = UNK2;
    data
}

fn decode_state(data: &[u8]) -> Result<HvacState> {
    if data.len() < 13 {
        return Err(BroadlinkError::DataValidation(
            "hvac state reply shorter than its fixed status block",
        ));
    }
    Ok(HvacState {
        power: data[0x08] & (1 << 5) != 0,
        target_temp: 8.0 + (data[0x00] >> 3) as f64 + (data[0x04] >> 7) as f64 * 0.5,
        swing_v: data[0x00] & 0b111,
        swing_h: data[0x01] >> 5,
        mode: data[0x05] >> 5,
        speed: data[0x03] >> 5,
        preset: data[0x04] >> 6,
        sleep: data[0x05] & (1 << 2) != 0,
        ifeel: data[0x05] & (1 << 3) != 0,
        health: data[0x08] & (1 << 1) != 0,
        clean: data[0x08] & (1 << 2) != 0,
        display: data[0x0A] & (1 << 4) != 0,
        mildew: data[0x0A] & (1 << 3) != 0,
    })
}

pub struct Hvac<'a> {
    handle: &'a DeviceHandle,
}

impl<'a> Hvac<'a> {
    pub fn new(handle: &'a DeviceHandle) -> Self {
        Self { handle }
    }

    fn exchange(&self, command: u8, data: &[u8]) -> Result<Vec<u8>> {
        let mut payload = Vec::with_capacity(2 + data.len());
        payload.push((command << 4) | 1);
        payload.push(0x01);
        payload.extend_from_slice(data);

        let inner = double_framed::wrap(&payload);
        let response = self
            .handle
            .send_command(OUTER_CMD, &inner, DEFAULT_COMMAND_DEADLINE)?;
        let framed = double_framed::unwrap(&response)?;

        if framed.len() < 2 {
            return Err(BroadlinkError::DataValidation(
                "hvac reply shorter than its command-echo prefix",
            ));
        }
        Ok(framed[2..].to_vec())
    }

    pub fn get_state(&self) -> Result<HvacState> {
        let data = self.exchange(COMMAND_GET_STATE, &[])?;
        decode_state(&data)
    }

    pub fn set_state(&self, state: &HvacState) -> Result<HvacState> {
        let encoded = encode_state(state);
        let data = self.exchange(COMMAND_SET_STATE, &encoded)?;
        decode_state(&data)
    }

    pub fn get_ac_info(&self) -> Result<AcInfo> {
        let data = self.exchange(COMMAND_GET_AC_INFO, &[])?;
        if data.len() < 22 {
            return Err(BroadlinkError::DataValidation(
                "ac info reply shorter than its fixed status block",
            ));
        }
        let hi = data[0x05] & 0b11111;
        let lo = data[0x15] & 0b11111;
        Ok(AcInfo {
            power: data[0x01] & 1 != 0,
            ambient_temp: hi as f64 + lo as f64 / 10.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_state_roundtrip() {
        // target_temp's fractional half-degree is carried on a spare bit of
        // the preset byte (per `_parse_state`/`set_state`), so an exact
        // round trip needs preset's high bit clear; keep to a whole degree.
        let state = HvacState {
            power: true,
            target_temp: 23.0,
            swing_v: 2,
            swing_h: 0,
            mode: 0b011,
            speed: 2,
            preset: 1,
            sleep: true,
            ifeel: false,
            health: true,
            clean: false,
            display: true,
            mildew: false,
        };
        let encoded = encode_state(&state);
        let decoded = decode_state(&encoded).unwrap();
        assert_eq!(decoded, state);
    }
}
