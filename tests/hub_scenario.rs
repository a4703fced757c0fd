//! §8 scenario 5: hub sub-device pagination makes exactly as many
//! round-trips as pages, and the caller sees every unique `did` once.

use broadlink::checksum::{SEED_OUTER, additive_sum};
use broadlink::crypto::{Aes128Cbc, BOOTSTRAP_KEY, Cipher};
use broadlink::devices::hub::Hub;
use broadlink::frame::{self, FrameContext};
use broadlink::session::{DeviceHandle, DiscoveredDevice};
use broadlink::transport::Channel;
use serde_json::json;

const MAGIC: [u8; 4] = [0xA5, 0xA5, 0x5A, 0x5A];

// Mirrors crate::devices::hub's private wrap/unwrap (12-byte header,
// 0xBEAF-seeded checksum) so the mock side can speak the same envelope.
fn wrap_envelope(flag: u8, json: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(12 + json.len());
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&[0, 0]);
    out.push(flag);
    out.push(0x0B);
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(json);
    let checksum = additive_sum(&out, SEED_OUTER);
    out[4..6].copy_from_slice(&checksum.to_le_bytes());
    out
}

fn unwrap_envelope(plaintext: &[u8]) -> Vec<u8> {
    let js_len = u32::from_le_bytes([plaintext[8], plaintext[9], plaintext[10], plaintext[11]]) as usize;
    plaintext[12..12 + js_len].to_vec()
}

#[test]
fn get_subdevices_pages_until_total_is_reached() {
    let server = Channel::bind("127.0.0.1:0".parse().unwrap()).unwrap();
    let server_addr = server.local_addr().unwrap();

    let worker = std::thread::spawn(move || {
        let cipher = Aes128Cbc::with_key(BOOTSTRAP_KEY);
        let ctx = FrameContext {
            device_id_bytes: frame::DEFAULT_DEVICE_ID_BYTES,
            hw_addr: [0x10, 0x20, 0x30, 0x40, 0x50, 0x60],
            conn_id: 0,
        };

        let pages: [&[&str]; 3] = [
            &["dev-1", "dev-2", "dev-3"],
            &["dev-4", "dev-5", "dev-6"],
            &["dev-7", "dev-8"],
        ];

        for (i, dids) in pages.iter().enumerate() {
            let (data, from) = server.recv_from().unwrap().expect("a page request arrives");
            let plaintext = cipher.decrypt(&data[frame::HEADER_LEN..]).unwrap();
            let request_json = unwrap_envelope(&plaintext);
            let request: serde_json::Value = serde_json::from_slice(&request_json).unwrap();
            assert_eq!(request["index"], json!((i * 3) as u32));

            let list: Vec<_> = dids.iter().map(|did| json!({ "did": did })).collect();
            let page = json!({ "total": 8, "list": list });
            let response_json = serde_json::to_vec(&page).unwrap();
            let wrapped = wrap_envelope(1, &response_json);
            let response = frame::build_request(&ctx, 0x6A, (i + 1) as u16, &cipher, &wrapped).unwrap();
            server.send_to(&response, from).unwrap();
        }
    });

    let discovered = DiscoveredDevice {
        remote: server_addr,
        hw_addr: [0x10, 0x20, 0x30, 0x40, 0x50, 0x60],
        device_type: 0x9999, // S3 hub type codes vary by OEM batch and aren't in the registry
        name: "hub".into(),
        locked: false,
    };
    let handle = DeviceHandle::from_discovered(discovered).unwrap();
    let hub = Hub::new(&handle);

    let dids = hub.get_subdevices(3).unwrap();
    assert_eq!(dids.len(), 8);
    assert_eq!(
        dids,
        vec!["dev-1", "dev-2", "dev-3", "dev-4", "dev-5", "dev-6", "dev-7", "dev-8"]
    );

    worker.join().unwrap();
}
