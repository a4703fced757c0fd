//! S3 hub behaviour leaf (C9): JSON-framed like [`crate::devices::bg1`],
//! but with its own shorter 12-byte envelope header and its own checksum
//! seed — `0xBEAF` (the outer-frame seed) rather than the `0xC0AD` seed
//! [`crate::codec::json`] uses for BG1's envelope. The two are both
//! instances of the JSON-framed style but are not byte-identical, so this
//! module owns its header encode/decode instead of reusing that codec.

use crate::checksum::{SEED_OUTER, additive_sum};
use crate::error::{BroadlinkError, Result};
use crate::session::{DEFAULT_COMMAND_DEADLINE, DeviceHandle};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const OUTER_CMD: u8 = 0x6A;
const MAGIC: [u8; 4] = [0xA5, 0xA5, 0x5A, 0x5A];
const HEADER_LEN: usize = 12;

const FLAG_GET: u8 = 1;
const FLAG_SET: u8 = 2;

fn wrap(flag: u8, json: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + json.len());
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&[0x00, 0x00]); // checksum placeholder
    out.push(flag);
    out.push(0x0B);
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(json);

    let checksum = additive_sum(&out, SEED_OUTER);
    out[4..6].copy_from_slice(&checksum.to_le_bytes());
    out
}

fn unwrap(plaintext: &[u8]) -> Result<(u8, Vec<u8>)> {
    if plaintext.len() < HEADER_LEN {
        return Err(BroadlinkError::DataValidation(
            "hub inner frame shorter than its own header",
        ));
    }
    if plaintext[0..4] != MAGIC {
        return Err(BroadlinkError::DataValidation(
            "hub inner frame has an unrecognised magic",
        ));
    }

    let given_checksum = u16::from_le_bytes([plaintext[4], plaintext[5]]);
    let mut zeroed = plaintext.to_vec();
    zeroed[4..6].copy_from_slice(&[0, 0]);
    let computed_checksum = additive_sum(&zeroed, SEED_OUTER);
    if given_checksum != computed_checksum {
        return Err(BroadlinkError::DataValidation(
            "hub inner frame failed its checksum",
        ));
    }

    let flag = plaintext[6];
    let js_len = u32::from_le_bytes([plaintext[8], plaintext[9], plaintext[10], plaintext[11]]) as usize;
    let json = plaintext
        .get(HEADER_LEN..HEADER_LEN + js_len)
        .ok_or(BroadlinkError::DataValidation(
            "hub inner frame declares a JSON length past the end of the buffer",
        ))?;

    Ok((flag, json.to_vec()))
}

#[derive(Debug, Clone, Serialize)]
struct SubdevicesRequest {
    count: u32,
    index: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct SubdeviceEntry {
    did: String,
}

#[derive(Debug, Clone, Deserialize)]
struct SubdevicesPage {
    total: u32,
    list: Vec<SubdeviceEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SubdeviceState {
    pub pwr1: Option<u8>,
    pub pwr2: Option<u8>,
    pub pwr3: Option<u8>,
}

pub struct Hub<'a> {
    handle: &'a DeviceHandle,
}

impl<'a> Hub<'a> {
    pub fn new(handle: &'a DeviceHandle) -> Self {
        Self { handle }
    }

    fn exchange(&self, flag: u8, json: &[u8]) -> Result<(u8, Vec<u8>)> {
        let inner = wrap(flag, json);
        let response = self
            .handle
            .send_command(OUTER_CMD, &inner, DEFAULT_COMMAND_DEADLINE)?;
        unwrap(&response)
    }

    /// Page through sub-devices `step` at a time until every `did` the hub
    /// reports has been seen, deduplicating along the way.
    pub fn get_subdevices(&self, step: u32) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let mut dids = Vec::new();
        let mut index = 0u32;

        loop {
            let request = SubdevicesRequest { count: step, index };
            let json = serde_json::to_vec(&request)
                .map_err(|_| BroadlinkError::DataValidation("failed to serialise subdevice request"))?;
            let (_flag, body) = self.exchange(FLAG_GET, &json)?;
            let page: SubdevicesPage = serde_json::from_slice(&body)
                .map_err(|_| BroadlinkError::DataValidation("failed to parse subdevice page"))?;

            for entry in page.list {
                if seen.insert(entry.did.clone()) {
                    dids.push(entry.did);
                }
            }

            index += step;
            if dids.len() as u32 >= page.total || index >= page.total {
                break;
            }
        }

        Ok(dids)
    }

    pub fn get_state(&self, did: &str) -> Result<SubdeviceState> {
        let json = serde_json::to_vec(&serde_json::json!({ "did": did }))
            .map_err(|_| BroadlinkError::DataValidation("failed to serialise get_state request"))?;
        let (_flag, body) = self.exchange(FLAG_GET, &json)?;
        serde_json::from_slice(&body)
            .map_err(|_| BroadlinkError::DataValidation("failed to parse subdevice state"))
    }

    pub fn set_state(&self, did: &str, state: &SubdeviceState) -> Result<SubdeviceState> {
        let mut value = serde_json::to_value(state)
            .map_err(|_| BroadlinkError::DataValidation("failed to serialise set_state request"))?;
        value["did"] = serde_json::Value::String(did.to_string());
        let json = serde_json::to_vec(&value)
            .map_err(|_| BroadlinkError::DataValidation("failed to serialise set_state request"))?;
        let (_flag, body) = self.exchange(FLAG_SET, &json)?;
        serde_json::from_slice(&body)
            .map_err(|_| BroadlinkError::DataValidation("failed to parse subdevice state"))
    }
}
