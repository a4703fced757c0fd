//! Discovery and authentication (C6): broadcasts the discovery probe,
//! parses responses into [`DiscoveredDevice`]s, and exposes the per-handle
//! [`DeviceHandle::send_command`] pipeline that every behaviour leaf in
//! [`crate::devices`] is built on.

use crate::checksum::{SEED_OUTER, additive_sum};
use crate::crypto::Aes128Cbc;
use crate::error::{BroadlinkError, Result};
use crate::frame::{self, FrameContext};
use crate::registry::{self, Profile, RegistryEntry};
use crate::time::{pack_address, pack_datetime};
use crate::transport::Channel;
use chrono::Local;
use std::collections::HashSet;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const DEFAULT_COMMAND_DEADLINE: Duration = Duration::from_secs(10);
pub const DEFAULT_DISCOVERY_DEADLINE: Duration = Duration::from_secs(10);

/// One device found by [`discover`], not yet authenticated.
#[derive(Debug, Clone)]
pub struct DiscoveredDevice {
    pub remote: SocketAddr,
    pub hw_addr: [u8; 6],
    pub device_type: u16,
    pub name: String,
    pub locked: bool,
}

fn build_discovery_probe(local_ip: Ipv4Addr, local_port: u16) -> Vec<u8> {
    // Zero-filled except the fields the device actually reads; no magic
    // bytes on the discovery probe itself, unlike an authenticated frame.
    let mut packet = vec![0u8; 0x30];
    packet[0x08..0x14].copy_from_slice(&pack_datetime(Local::now()));
    packet[0x18..0x1E].copy_from_slice(&pack_address(local_ip, local_port));
    packet[0x26] = 0x06;

    let checksum = additive_sum(&packet, SEED_OUTER);
    packet[0x20..0x22].copy_from_slice(&checksum.to_le_bytes());
    packet
}

fn parse_discovery_response(data: &[u8], from: SocketAddr) -> Option<DiscoveredDevice> {
    if data.len() < 0x41 {
        return None;
    }
    let device_type = u16::from_le_bytes([data[0x34], data[0x35]]);

    let mut hw_addr = [0u8; 6];
    hw_addr.copy_from_slice(&data[0x3A..0x40]);
    hw_addr.reverse();

    let name_region = &data[0x40..data.len() - 1];
    let name_end = name_region.iter().position(|&b| b == 0).unwrap_or(name_region.len());
    let name = String::from_utf8_lossy(&name_region[..name_end]).into_owned();

    let locked = *data.last().unwrap() != 0;

    Some(DiscoveredDevice {
        remote: from,
        hw_addr,
        device_type,
        name,
        locked,
    })
}

/// A finite, restartable sequence of discovery responses. Cancel by
/// dropping it — the underlying socket is closed with it.
pub struct DiscoveryIter {
    channel: Channel,
    deadline: Duration,
    start: Instant,
    seen: HashSet<(SocketAddr, [u8; 6], u16)>,
}

impl Iterator for DiscoveryIter {
    type Item = DiscoveredDevice;

    fn next(&mut self) -> Option<DiscoveredDevice> {
        loop {
            if self.start.elapsed() > self.deadline {
                return None;
            }
            match self.channel.recv_from() {
                Ok(Some((data, from))) => match parse_discovery_response(&data, from) {
                    Some(device) => {
                        let key = (device.remote, device.hw_addr, device.device_type);
                        if self.seen.insert(key) {
                            tracing::info!(
                                device_type = device.device_type,
                                hw_addr = ?device.hw_addr,
                                "discovered device"
                            );
                            return Some(device);
                        }
                        // Already yielded this device from an earlier reply; keep polling.
                    }
                    None => {
                        tracing::warn!(?from, "discarding malformed discovery response");
                    }
                },
                Ok(None) => {} // per-attempt timeout, loop again and re-check the deadline
                Err(err) => {
                    tracing::warn!(%err, "discarding discovery read error");
                }
            }
        }
    }
}

/// Broadcast a discovery probe from `local_ip` and return a lazy iterator
/// over responses received before `deadline` elapses.
pub fn discover(
    local_ip: Ipv4Addr,
    broadcast_addr: SocketAddr,
    deadline: Duration,
) -> Result<DiscoveryIter> {
    let channel = Channel::bind(SocketAddr::new(local_ip.into(), 0))?;
    let local_port = channel.local_addr()?.port();

    let probe = build_discovery_probe(local_ip, local_port);
    channel.send_to(&probe, broadcast_addr)?;

    Ok(DiscoveryIter {
        channel,
        deadline,
        start: Instant::now(),
        seen: HashSet::new(),
    })
}

struct Session {
    cipher: Aes128Cbc,
    conn_id: u32,
    counter: u16,
}

/// A client-side session with one device (§3's `DeviceHandle`). Owns its
/// socket exclusively; a mutual-exclusion guard serialises commands.
pub struct DeviceHandle {
    channel: Channel,
    remote: SocketAddr,
    pub device_type: u16,
    pub entry: Option<RegistryEntry>,
    pub name: String,
    pub locked: bool,
    hw_addr: [u8; 6],
    session: Mutex<Session>,
}

impl DeviceHandle {
    /// Build a handle from a discovered device, looking its type up in the
    /// registry. Unknown codes get a handle with `entry = None`, which
    /// supports discovery/auth but no behaviour leaf.
    pub fn from_discovered(discovered: DiscoveredDevice) -> Result<Self> {
        let entry = registry::lookup(discovered.device_type);
        Self::build(discovered, entry)
    }

    /// Build a handle for a profile the registry doesn't carry a code for
    /// (the S3 hub — see [`crate::registry::Profile::S3`]'s doc comment).
    pub fn with_profile(discovered: DiscoveredDevice, entry: RegistryEntry) -> Result<Self> {
        Self::build(discovered, Some(entry))
    }

    fn build(discovered: DiscoveredDevice, entry: Option<RegistryEntry>) -> Result<Self> {
        let channel = Channel::bind("0.0.0.0:0".parse().unwrap())?;
        Ok(Self {
            channel,
            remote: discovered.remote,
            device_type: discovered.device_type,
            entry,
            name: discovered.name,
            locked: discovered.locked,
            hw_addr: discovered.hw_addr,
            session: Mutex::new(Session {
                cipher: Aes128Cbc::bootstrap(),
                conn_id: 0,
                counter: 0,
            }),
        })
    }

    pub fn profile(&self) -> Option<Profile> {
        self.entry.map(|e| e.profile)
    }

    pub fn model(&self) -> Option<&'static str> {
        self.entry.map(|e| e.model)
    }

    pub fn manufacturer(&self) -> Option<&'static str> {
        self.entry.map(|e| e.manufacturer)
    }

    fn device_id_bytes(&self) -> [u8; 2] {
        self.entry
            .map(|e| e.device_id_bytes)
            .unwrap_or(frame::DEFAULT_DEVICE_ID_BYTES)
    }

    /// Authenticate against the device, rekeying the session's connection
    /// id and AES key on success (§4.5).
    ///
    /// `device_id` fills the 15-character identifier at payload 0x04–0x12;
    /// `session_tag` fills the 7-byte label at 0x30–0x36. Both are
    /// truncated if longer than their slot.
    pub fn auth(&self, device_id: &str, session_tag: &str, deadline: Duration) -> Result<()> {
        let mut payload = vec![0u8; 0x50];

        let id_bytes = device_id.as_bytes();
        let id_len = id_bytes.len().min(15);
        payload[0x04..0x04 + id_len].copy_from_slice(&id_bytes[..id_len]);
        payload[0x1E] = 0x01;
        payload[0x2D] = 0x01;

        let tag_bytes = session_tag.as_bytes();
        let tag_len = tag_bytes.len().min(7);
        payload[0x30..0x30 + tag_len].copy_from_slice(&tag_bytes[..tag_len]);

        let response = self.send_command(0x65, &payload, deadline)?;
        if response.len() < 20 {
            return Err(BroadlinkError::DataValidation(
                "auth response shorter than its connection id + key",
            ));
        }

        let conn_id = u32::from_le_bytes(response[0..4].try_into().unwrap());
        let key_bytes = &response[4..20];
        if key_bytes.len() % 16 != 0 {
            return Err(BroadlinkError::DataValidation(
                "auth key length is not a multiple of 16",
            ));
        }
        let mut key = [0u8; 16];
        key.copy_from_slice(key_bytes);

        {
            let mut session = self.session.lock().unwrap_or_else(|p| p.into_inner());
            session.conn_id = conn_id;
            session.cipher.rekey(key);
        }

        tracing::info!(conn_id, "authentication succeeded");
        Ok(())
    }

    /// Run one full outer-frame round trip: increment the counter, build
    /// the request, send/receive, and decrypt the response body. Behaviour
    /// leaves apply their own inner codec's `unwrap` to the returned bytes.
    pub fn send_command(&self, cmd_code: u8, plaintext: &[u8], deadline: Duration) -> Result<Vec<u8>> {
        let mut session = self.session.lock().unwrap_or_else(|p| p.into_inner());
        session.counter = session.counter.wrapping_add(1);

        let ctx = FrameContext {
            device_id_bytes: self.device_id_bytes(),
            hw_addr: self.hw_addr,
            conn_id: session.conn_id,
        };

        let request = frame::build_request(&ctx, cmd_code, session.counter, &session.cipher, plaintext)?;
        let raw = self.channel.send_recv(&request, self.remote, deadline)?;
        let parsed = frame::parse_response(&session.cipher, &raw)?;

        Ok(parsed.plaintext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{BOOTSTRAP_KEY, Cipher};

    fn discovered(remote: SocketAddr) -> DiscoveredDevice {
        DiscoveredDevice {
            remote,
            hw_addr: [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF],
            device_type: 0x2712,
            name: "office-rm".into(),
            locked: false,
        }
    }

    #[test]
    fn discovery_response_parses_documented_offsets() {
        let mut data = vec![0u8; 0x48];
        data[0x34..0x36].copy_from_slice(&0x2712u16.to_le_bytes());
        data[0x3A..0x40].copy_from_slice(&[0xFF, 0xEE, 0xDD, 0xCC, 0xBB, 0xAA]);
        data[0x40..0x44].copy_from_slice(b"rm4\0");
        *data.last_mut().unwrap() = 1;

        let from: SocketAddr = "192.168.1.50:80".parse().unwrap();
        let device = parse_discovery_response(&data, from).unwrap();

        assert_eq!(device.device_type, 0x2712);
        assert_eq!(device.hw_addr, [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
        assert_eq!(device.name, "rm4");
        assert!(device.locked);
    }

    #[test]
    fn unknown_device_type_yields_handle_with_no_entry() {
        let remote: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        let mut d = discovered(remote);
        d.device_type = 0xDEAD;
        let handle = DeviceHandle::from_discovered(d).unwrap();
        assert!(handle.entry.is_none());
        assert_eq!(handle.device_id_bytes(), frame::DEFAULT_DEVICE_ID_BYTES);
    }

    #[test]
    fn known_device_type_carries_its_registry_entry() {
        let remote: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        let handle = DeviceHandle::from_discovered(discovered(remote)).unwrap();
        assert_eq!(handle.profile(), Some(Profile::RmPro));
    }

    #[test]
    fn auth_rekeys_connection_id_and_session_key() {
        let server = Channel::bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let server_addr = server.local_addr().unwrap();

        let worker = std::thread::spawn(move || {
            let (data, from) = server.recv_from().unwrap().expect("auth request arrives");
            let cipher = Aes128Cbc::with_key(BOOTSTRAP_KEY);
            let ciphertext = &data[frame::HEADER_LEN..];
            let _request_plaintext = cipher.decrypt(ciphertext).unwrap();

            let mut body = vec![0u8; 16];
            body[0..4].copy_from_slice(&0x04030201u32.to_le_bytes());
            body.extend_from_slice(&[0x11; 16]);

            let ctx = FrameContext {
                device_id_bytes: frame::DEFAULT_DEVICE_ID_BYTES,
                hw_addr: [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF],
                conn_id: 0,
            };
            let response = frame::build_request(&ctx, 0x65, 1, &cipher, &body).unwrap();
            server.send_to(&response, from).unwrap();
        });

        let handle = DeviceHandle::from_discovered(discovered(server_addr)).unwrap();
        handle.auth("012345678901234", "sess", Duration::from_secs(2)).unwrap();

        let session = handle.session.lock().unwrap();
        assert_eq!(session.conn_id, 0x04030201);
        worker.join().unwrap();
    }
}
