//! Optional forwarding of each normalized result to an NSCA daemon.

use alertrelay_gateway::forwarder::nsca::Encryption;

use crate::helpers::config::TestConfigBuilder;
use crate::helpers::http::RunningServer;
use crate::helpers::nsca::{FakeNsca, dead_addr};
use crate::helpers::payloads::{catchpoint_alert, decode_egress};

#[tokio::test]
async fn e2e_results_are_forwarded_and_cached() {
    // Given: an NSCA daemon expecting XOR-encrypted packets
    let nsca = FakeNsca::start(Encryption::Xor, "s3cret").await;
    let config = TestConfigBuilder::new()
        .nsca(nsca.addr, "xor", "s3cret")
        .build();
    let server = RunningServer::start(config).await;

    // When: an alert with two failures is pushed
    let alert = catchpoint_alert(
        "Checkout",
        "Critical",
        &[("London", "timeout"), ("Paris", "refused")],
    );
    let response = server
        .request("POST", "/catchpoint/alerts", alert.as_bytes())
        .await;

    // Then: each result reaches NSCA and stays available for the pull collector
    assert_eq!(response.status, 200);
    let mut packets = nsca.wait_for(2).await;
    packets.sort_by(|a, b| a.output.cmp(&b.output));
    assert_eq!(packets.len(), 2);
    assert_eq!(packets[0].host, "catchpoint");
    assert_eq!(packets[0].service, "Checkout");
    assert_eq!(packets[0].status, 2);
    assert_eq!(packets[0].output, "London: timeout");
    assert_eq!(packets[1].output, "Paris: refused");

    let drained = server.request("GET", "/sensu/results", b"").await;
    assert_eq!(decode_egress(&drained.body).len(), 2);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn e2e_unreachable_nsca_is_bad_gateway_but_cached() {
    // Given: forwarding enabled toward a closed port
    let config = TestConfigBuilder::new()
        .nsca(dead_addr().await, "none", "")
        .build();
    let server = RunningServer::start(config).await;

    // When: an alert is pushed
    let alert = catchpoint_alert("Checkout", "Critical", &[("London", "timeout")]);
    let response = server
        .request("POST", "/catchpoint/alerts", alert.as_bytes())
        .await;

    // Then: the push fails with 502 but the result is still cached
    assert_eq!(response.status, 502);
    assert_eq!(server.cache.len().await, 1);

    server.stop().await.unwrap();
}
