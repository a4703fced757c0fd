//! §8 scenario 4: learning mode followed by a data read returns exactly
//! the captured IR burst.

use broadlink::codec::raw;
use broadlink::crypto::{Aes128Cbc, BOOTSTRAP_KEY, Cipher};
use broadlink::devices::remote::{Remote, RemoteKind};
use broadlink::frame::{self, FrameContext};
use broadlink::session::{DeviceHandle, DiscoveredDevice};
use broadlink::transport::Channel;

#[test]
fn remote_learn_round_trip_returns_captured_code() {
    let server = Channel::bind("127.0.0.1:0".parse().unwrap()).unwrap();
    let server_addr = server.local_addr().unwrap();
    let ir_code = vec![0xAAu8; 16];
    let ir_code_for_worker = ir_code.clone();

    let worker = std::thread::spawn(move || {
        let cipher = Aes128Cbc::with_key(BOOTSTRAP_KEY);
        let ctx = FrameContext {
            device_id_bytes: frame::DEFAULT_DEVICE_ID_BYTES,
            hw_addr: [0x01, 0x02, 0x03, 0x04, 0x05, 0x06],
            conn_id: 0,
        };

        let (data, from) = server.recv_from().unwrap().expect("enter_learning arrives");
        let plaintext = cipher.decrypt(&data[frame::HEADER_LEN..]).unwrap();
        assert!(raw::unwrap(&plaintext).unwrap().is_empty());
        let ack = frame::build_request(&ctx, 0x6A, 1, &cipher, &raw::wrap(0x03, &[])).unwrap();
        server.send_to(&ack, from).unwrap();

        let (data, from) = server.recv_from().unwrap().expect("check_data arrives");
        let plaintext = cipher.decrypt(&data[frame::HEADER_LEN..]).unwrap();
        assert!(raw::unwrap(&plaintext).unwrap().is_empty());
        let reply = frame::build_request(&ctx, 0x6A, 2, &cipher, &raw::wrap(0x04, &ir_code_for_worker)).unwrap();
        server.send_to(&reply, from).unwrap();
    });

    let discovered = DiscoveredDevice {
        remote: server_addr,
        hw_addr: [0x01, 0x02, 0x03, 0x04, 0x05, 0x06],
        device_type: 0x2737,
        name: "rm".into(),
        locked: false,
    };
    let handle = DeviceHandle::from_discovered(discovered).unwrap();
    let remote = Remote::new(&handle, RemoteKind::Classic);

    remote.enter_learning().unwrap();
    let code = remote.check_data().unwrap();
    assert_eq!(code, ir_code);

    worker.join().unwrap();
}
