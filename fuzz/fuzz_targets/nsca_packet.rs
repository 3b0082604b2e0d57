#![no_main]

use alertrelay_core::types::NormalizedResult;
use alertrelay_gateway::forwarder::nsca::{Encryption, PACKET_LEN, crc32, encode_packet};
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    hostname: String,
    status: u8,
    name: String,
    output: String,
    timestamp: u32,
    iv: Vec<u8>,
    password: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    let result = NormalizedResult::new(input.status, input.name, input.output);
    let packet = encode_packet(&input.hostname, &result, input.timestamp);
    assert_eq!(packet.len(), PACKET_LEN);

    // CRC 필드를 0으로 두고 다시 계산하면 기록된 값과 같아야 함
    let mut zeroed = packet;
    zeroed[4..8].fill(0);
    assert_eq!(
        crc32(&zeroed).to_be_bytes(),
        [packet[4], packet[5], packet[6], packet[7]]
    );

    let mut sealed = packet;
    Encryption::Xor.apply(&mut sealed, &input.iv, &input.password);
    Encryption::Xor.apply(&mut sealed, &input.iv, &input.password);
    assert_eq!(sealed, packet);
});
