//! NSCA v3 포워더
//!
//! 체크 결과마다 NSCA 데몬에 새 TCP 연결을 열어 패시브 체크 결과 하나를 전송합니다.
//!
//! # 프로토콜
//! 1. 서버가 132바이트 초기 패킷을 보냅니다: IV 128바이트 + 타임스탬프(u32, big-endian).
//! 2. 클라이언트가 720바이트 데이터 패킷을 보냅니다.
//!
//! | 오프셋 | 크기 | 필드                           |
//! |--------|------|--------------------------------|
//! | 0      | 2    | 패킷 버전 (i16, 3)             |
//! | 2      | 2    | 패딩                           |
//! | 4      | 4    | CRC32 (필드를 0으로 두고 계산) |
//! | 8      | 4    | 타임스탬프 (서버 값 그대로)    |
//! | 12     | 2    | 상태 코드 (i16)                |
//! | 14     | 64   | 호스트 이름                    |
//! | 78     | 128  | 서비스 이름                    |
//! | 206    | 512  | 플러그인 출력                  |
//! | 718    | 2    | 패딩                           |
//!
//! 문자열 필드는 NUL 종료되며 필드 길이 - 1 바이트에서 잘립니다.
//! 암호화는 `none`과 `xor`만 지원합니다.

use std::time::Duration;

use alertrelay_core::config::NscaConfig;
use alertrelay_core::error::{ConfigError, ForwardError, RelayError};
use alertrelay_core::pipeline::{BoxFuture, LegacyForwarder};
use alertrelay_core::types::NormalizedResult;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// 초기 패킷에 담긴 IV 길이
pub const IV_LEN: usize = 128;

/// 서버 초기 패킷 길이 (IV + 타임스탬프)
pub const INIT_PACKET_LEN: usize = IV_LEN + 4;

/// 데이터 패킷 길이
pub const PACKET_LEN: usize = 720;

const PROTOCOL_VERSION: i16 = 3;

const CRC_OFFSET: usize = 4;
const TIMESTAMP_OFFSET: usize = 8;
const STATUS_OFFSET: usize = 12;
const HOST_OFFSET: usize = 14;
const HOST_LEN: usize = 64;
const SERVICE_OFFSET: usize = HOST_OFFSET + HOST_LEN;
const SERVICE_LEN: usize = 128;
const OUTPUT_OFFSET: usize = SERVICE_OFFSET + SERVICE_LEN;
const OUTPUT_LEN: usize = 512;

/// 패킷 암호화 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encryption {
    /// 평문 전송
    None,
    /// IV와 비밀번호를 순환 XOR
    Xor,
}

impl Encryption {
    /// 설정 문자열을 해석합니다 (`none`, `xor`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "none" => Some(Self::None),
            "xor" => Some(Self::Xor),
            _ => None,
        }
    }

    /// 패킷을 제자리에서 암호화합니다. XOR은 자기 역연산입니다.
    pub fn apply(self, packet: &mut [u8], iv: &[u8], password: &[u8]) {
        if self == Self::None {
            return;
        }
        if !iv.is_empty() {
            for (byte, key) in packet.iter_mut().zip(iv.iter().cycle()) {
                *byte ^= key;
            }
        }
        if !password.is_empty() {
            for (byte, key) in packet.iter_mut().zip(password.iter().cycle()) {
                *byte ^= key;
            }
        }
    }
}

/// CRC32 (IEEE 802.3, 다항식 0xEDB88320)
pub fn crc32(bytes: &[u8]) -> u32 {
    let mut crc: u32 = 0xFFFF_FFFF;
    for &b in bytes {
        crc ^= u32::from(b);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}

fn write_field(packet: &mut [u8], offset: usize, len: usize, value: &str) {
    let bytes = value.as_bytes();
    let n = bytes.len().min(len - 1);
    packet[offset..offset + n].copy_from_slice(&bytes[..n]);
}

/// 평문 데이터 패킷을 만듭니다.
pub fn encode_packet(
    client_hostname: &str,
    result: &NormalizedResult,
    timestamp: u32,
) -> [u8; PACKET_LEN] {
    let mut packet = [0u8; PACKET_LEN];
    packet[..2].copy_from_slice(&PROTOCOL_VERSION.to_be_bytes());
    packet[TIMESTAMP_OFFSET..TIMESTAMP_OFFSET + 4].copy_from_slice(&timestamp.to_be_bytes());
    packet[STATUS_OFFSET..STATUS_OFFSET + 2]
        .copy_from_slice(&i16::from(result.status()).to_be_bytes());
    write_field(&mut packet, HOST_OFFSET, HOST_LEN, client_hostname);
    write_field(&mut packet, SERVICE_OFFSET, SERVICE_LEN, result.name());
    write_field(&mut packet, OUTPUT_OFFSET, OUTPUT_LEN, result.output());

    let crc = crc32(&packet);
    packet[CRC_OFFSET..CRC_OFFSET + 4].copy_from_slice(&crc.to_be_bytes());
    packet
}

/// NSCA v3 포워더
#[derive(Debug, Clone)]
pub struct NscaForwarder {
    addr: String,
    client_hostname: String,
    encryption: Encryption,
    password: Vec<u8>,
    timeout: Duration,
}

impl NscaForwarder {
    /// 새 포워더를 생성합니다.
    pub fn new(
        addr: impl Into<String>,
        client_hostname: impl Into<String>,
        encryption: Encryption,
        password: &[u8],
        timeout: Duration,
    ) -> Self {
        Self {
            addr: addr.into(),
            client_hostname: client_hostname.into(),
            encryption,
            password: password.to_vec(),
            timeout,
        }
    }

    /// `[nsca]` 설정에서 포워더를 생성합니다.
    pub fn from_config(config: &NscaConfig) -> Result<Self, RelayError> {
        let encryption = Encryption::from_name(&config.encryption).ok_or_else(|| {
            RelayError::Config(ConfigError::InvalidValue {
                field: "nsca.encryption".to_owned(),
                reason: format!("unsupported encryption '{}'", config.encryption),
            })
        })?;
        Ok(Self::new(
            format!("{}:{}", config.host, config.port),
            config.client_hostname.clone(),
            encryption,
            config.password.as_bytes(),
            Duration::from_secs(config.timeout_secs),
        ))
    }

    /// 대상 주소
    pub fn addr(&self) -> &str {
        &self.addr
    }

    fn timed_out(&self, stage: &str) -> ForwardError {
        ForwardError::Timeout {
            stage: stage.to_owned(),
            secs: self.timeout.as_secs(),
        }
    }

    async fn deliver(&self, result: &NormalizedResult) -> Result<(), ForwardError> {
        let mut stream = timeout(self.timeout, TcpStream::connect(&self.addr))
            .await
            .map_err(|_| self.timed_out("connecting"))?
            .map_err(|e| ForwardError::Connection {
                addr: self.addr.clone(),
                reason: e.to_string(),
            })?;

        let mut init = [0u8; INIT_PACKET_LEN];
        timeout(self.timeout, stream.read_exact(&mut init))
            .await
            .map_err(|_| self.timed_out("reading init packet"))?
            .map_err(|e| ForwardError::Protocol(format!("failed to read init packet: {e}")))?;

        let (iv, ts) = init.split_at(IV_LEN);
        let mut ts_bytes = [0u8; 4];
        ts_bytes.copy_from_slice(ts);
        let timestamp = u32::from_be_bytes(ts_bytes);

        let mut packet = encode_packet(&self.client_hostname, result, timestamp);
        self.encryption.apply(&mut packet, iv, &self.password);

        timeout(self.timeout, stream.write_all(&packet))
            .await
            .map_err(|_| self.timed_out("sending data packet"))?
            .map_err(|e| ForwardError::Protocol(format!("failed to send data packet: {e}")))?;

        // 전송은 끝났으므로 종료 실패는 무시
        let _ = stream.shutdown().await;

        debug!(
            addr = %self.addr,
            service = result.name(),
            status = result.status(),
            "check result forwarded via nsca"
        );
        Ok(())
    }
}

impl LegacyForwarder for NscaForwarder {
    fn name(&self) -> &str {
        "nsca"
    }

    fn send<'a>(&'a self, result: &'a NormalizedResult) -> BoxFuture<'a, Result<(), ForwardError>> {
        Box::pin(self.deliver(result))
    }
}
