//! BG Electrical smart outlet (BG1) behaviour leaf (C9): JSON-framed, and
//! its 14-byte envelope header is byte-identical to [`crate::codec::json`]'s
//! canonical form, so it reuses that codec directly rather than owning its
//! own header logic (contrast with [`crate::devices::hub`], whose S3
//! envelope is a different shape).

use crate::codec::json;
use crate::error::{BroadlinkError, Result};
use crate::session::{DEFAULT_COMMAND_DEADLINE, DeviceHandle};
use serde::{Deserialize, Serialize};

const OUTER_CMD: u8 = 0x6A;
const FLAG_GET: u8 = 0x01;
const FLAG_SET: u8 = 0x02;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Bg1State {
    pub pwr: Option<u8>,
    pub pwr1: Option<u8>,
    pub pwr2: Option<u8>,
    pub maxworktime: Option<u32>,
    pub maxworktime1: Option<u32>,
    pub maxworktime2: Option<u32>,
    pub idcbrightness: Option<u8>,
}

pub struct Bg1<'a> {
    handle: &'a DeviceHandle,
}

impl<'a> Bg1<'a> {
    pub fn new(handle: &'a DeviceHandle) -> Self {
        Self { handle }
    }

    fn exchange(&self, flag: u8, state: &Bg1State) -> Result<Bg1State> {
        let json_bytes = serde_json::to_vec(state)
            .map_err(|_| BroadlinkError::DataValidation("failed to serialise bg1 state"))?;
        let inner = json::wrap(flag, &json_bytes);
        let response = self
            .handle
            .send_command(OUTER_CMD, &inner, DEFAULT_COMMAND_DEADLINE)?;
        let (_flag, body) = json::unwrap(&response)?;
        serde_json::from_slice(&body)
            .map_err(|_| BroadlinkError::DataValidation("failed to parse bg1 state reply"))
    }

    pub fn get_state(&self) -> Result<Bg1State> {
        self.exchange(FLAG_GET, &Bg1State::default())
    }

    pub fn set_state(&self, state: &Bg1State) -> Result<Bg1State> {
        self.exchange(FLAG_SET, state)
    }
}
