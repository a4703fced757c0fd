//! §8 scenario 2: the authentication handshake rekeys connection id and
//! session key from a mock response.

use broadlink::crypto::{Aes128Cbc, BOOTSTRAP_KEY, Cipher};
use broadlink::frame::{self, FrameContext};
use broadlink::session::{DeviceHandle, DiscoveredDevice};
use broadlink::transport::Channel;
use std::time::Duration;

#[test]
fn auth_rekeys_connection_id_and_session_key() {
    let server = Channel::bind("127.0.0.1:0".parse().unwrap()).unwrap();
    let server_addr = server.local_addr().unwrap();

    let worker = std::thread::spawn(move || {
        let bootstrap_cipher = Aes128Cbc::with_key(BOOTSTRAP_KEY);
        let ctx = FrameContext {
            device_id_bytes: frame::DEFAULT_DEVICE_ID_BYTES,
            hw_addr: [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF],
            conn_id: 0,
        };

        // auth request, answered with a bootstrap-encrypted rekey body
        let (data, from) = server.recv_from().unwrap().expect("auth request arrives");
        let _request_plaintext = bootstrap_cipher.decrypt(&data[frame::HEADER_LEN..]).unwrap();

        let mut body = 0x04030201u32.to_le_bytes().to_vec();
        body.extend_from_slice(&[0x11; 16]);
        let response = frame::build_request(&ctx, 0x65, 1, &bootstrap_cipher, &body).unwrap();
        server.send_to(&response, from).unwrap();

        // follow-up command: only decryptable with the rekeyed session key
        let (data, from) = server.recv_from().unwrap().expect("rekeyed request arrives");
        assert_eq!(&data[0x30..0x34], &0x04030201u32.to_le_bytes());
        let rekeyed_cipher = Aes128Cbc::with_key([0x11; 16]);
        let plaintext = rekeyed_cipher.decrypt(&data[frame::HEADER_LEN..]).unwrap();
        assert_eq!(&plaintext[..8], b"ping-cmd");

        let response = frame::build_request(&ctx, 0x6A, 2, &rekeyed_cipher, b"pong-cmd").unwrap();
        server.send_to(&response, from).unwrap();
    });

    let discovered = DiscoveredDevice {
        remote: server_addr,
        hw_addr: [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF],
        device_type: 0x2737,
        name: "rm".into(),
        locked: false,
    };
    let handle = DeviceHandle::from_discovered(discovered).unwrap();
    handle
        .auth("012345678901234", "sess-tag", Duration::from_secs(2))
        .unwrap();

    let reply = handle
        .send_command(0x6A, b"ping-cmd", Duration::from_secs(2))
        .unwrap();
    assert_eq!(&reply[..8], b"pong-cmd");

    worker.join().unwrap();
}
