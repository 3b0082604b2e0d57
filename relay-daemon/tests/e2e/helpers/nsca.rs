//! Fake NSCA daemon for E2E tests.
//!
//! Speaks the server side of the NSCA v3 handshake: sends the 132-byte
//! init packet, reads one 720-byte data packet per connection, and
//! decrypts it with the same XOR scheme the forwarder uses.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use alertrelay_gateway::forwarder::nsca::{Encryption, INIT_PACKET_LEN, IV_LEN, PACKET_LEN};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// A data packet as seen by the NSCA daemon after decryption.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct ReceivedPacket {
    pub status: i16,
    pub host: String,
    pub service: String,
    pub output: String,
}

impl ReceivedPacket {
    fn decode(packet: &[u8]) -> Self {
        let field = |offset: usize, len: usize| {
            let bytes = &packet[offset..offset + len];
            let end = bytes.iter().position(|&b| b == 0).unwrap_or(len);
            String::from_utf8_lossy(&bytes[..end]).into_owned()
        };
        Self {
            status: i16::from_be_bytes([packet[12], packet[13]]),
            host: field(14, 64),
            service: field(78, 128),
            output: field(206, 512),
        }
    }
}

/// Fake NSCA daemon accepting any number of connections.
#[allow(dead_code)]
pub struct FakeNsca {
    pub addr: SocketAddr,
    received: Arc<Mutex<Vec<ReceivedPacket>>>,
    task: JoinHandle<()>,
}

#[allow(dead_code)]
impl FakeNsca {
    pub async fn start(encryption: Encryption, password: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let password = password.as_bytes().to_vec();

        let task = tokio::spawn(async move {
            let mut iv = [0u8; IV_LEN];
            for (i, b) in iv.iter_mut().enumerate() {
                *b = (i * 7 + 3) as u8;
            }
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let mut init = [0u8; INIT_PACKET_LEN];
                init[..IV_LEN].copy_from_slice(&iv);
                init[IV_LEN..].copy_from_slice(&1_700_000_000u32.to_be_bytes());
                if stream.write_all(&init).await.is_err() {
                    continue;
                }
                let mut packet = [0u8; PACKET_LEN];
                if stream.read_exact(&mut packet).await.is_err() {
                    continue;
                }
                encryption.apply(&mut packet, &iv, &password);
                sink.lock().await.push(ReceivedPacket::decode(&packet));
            }
        });

        Self {
            addr,
            received,
            task,
        }
    }

    /// Packets received so far, in arrival order.
    pub async fn received(&self) -> Vec<ReceivedPacket> {
        self.received.lock().await.clone()
    }

    /// Wait until at least `count` packets arrived, or give up after 5s.
    pub async fn wait_for(&self, count: usize) -> Vec<ReceivedPacket> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let packets = self.received().await;
            if packets.len() >= count || tokio::time::Instant::now() >= deadline {
                return packets;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

impl Drop for FakeNsca {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// An address nothing is listening on.
#[allow(dead_code)]
pub async fn dead_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
