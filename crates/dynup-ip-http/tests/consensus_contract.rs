//! Resolution contract tests against local mock echo services
//!
//! Constraints verified:
//! - the fan-out waits for every endpoint before deciding
//! - configured order, not completion order, drives the tie-break
//! - per-endpoint failures (status, empty body, deadline) only exclude that
//!   endpoint from the vote

use dynup_core::Error;
use dynup_ip_http::ConsensusIpSource;
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

const IP_A: &str = "203.0.113.5";
const IP_B: &str = "203.0.113.9";

async fn echo_server(body: &str, delay: Option<Duration>) -> MockServer {
    let server = MockServer::start().await;
    let mut template = ResponseTemplate::new(200).set_body_string(body);
    if let Some(delay) = delay {
        template = template.set_delay(delay);
    }
    Mock::given(method("GET")).respond_with(template).mount(&server).await;
    server
}

async fn failing_server(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;
    server
}

fn source(endpoints: Vec<String>, timeout: Duration) -> ConsensusIpSource {
    ConsensusIpSource::with_deadline(endpoints, timeout).expect("client builds")
}

#[tokio::test]
async fn agreement_across_services() {
    let a = echo_server(&format!("{}\n", IP_A), None).await;
    let b = echo_server(&format!("{}\n", IP_A), None).await;

    let resolved = source(vec![a.uri(), b.uri()], Duration::from_secs(5))
        .resolve()
        .await
        .expect("resolution succeeds");

    assert_eq!(resolved, IP_A.parse::<Ipv4Addr>().unwrap());
}

#[tokio::test]
async fn disagreement_trusts_configured_order_not_arrival_order() {
    // The first configured endpoint answers last; its value must still win.
    let a = echo_server(IP_A, Some(Duration::from_millis(300))).await;
    let b = echo_server(IP_B, None).await;

    let resolved = source(vec![a.uri(), b.uri()], Duration::from_secs(5))
        .resolve()
        .await
        .expect("resolution succeeds");

    assert_eq!(
        resolved,
        IP_A.parse::<Ipv4Addr>().unwrap(),
        "first configured endpoint must win the tie-break regardless of completion order"
    );
}

#[tokio::test]
async fn single_success_fallback() {
    let a = failing_server(500).await;
    let b = echo_server(IP_A, None).await;

    let resolved = source(vec![a.uri(), b.uri()], Duration::from_secs(5))
        .resolve()
        .await
        .expect("one healthy endpoint is enough");

    assert_eq!(resolved, IP_A.parse::<Ipv4Addr>().unwrap());
}

#[tokio::test]
async fn all_sources_failing_is_fatal() {
    let a = failing_server(500).await;
    let b = failing_server(503).await;

    let err = source(vec![a.uri(), b.uri()], Duration::from_secs(5))
        .resolve()
        .await
        .expect_err("no endpoint succeeded");

    assert!(matches!(err, Error::AllSourcesFailed));
}

#[tokio::test]
async fn empty_body_is_excluded_from_the_vote() {
    let a = echo_server("  \n", None).await;
    let b = echo_server(IP_B, None).await;

    let resolved = source(vec![a.uri(), b.uri()], Duration::from_secs(5))
        .resolve()
        .await
        .expect("remaining endpoint carries the vote");

    assert_eq!(resolved, IP_B.parse::<Ipv4Addr>().unwrap());
}

#[tokio::test]
async fn garbage_body_is_excluded_from_the_vote() {
    let a = echo_server("<html>not an ip</html>", None).await;
    let b = echo_server(IP_B, None).await;

    let resolved = source(vec![a.uri(), b.uri()], Duration::from_secs(5))
        .resolve()
        .await
        .expect("remaining endpoint carries the vote");

    assert_eq!(resolved, IP_B.parse::<Ipv4Addr>().unwrap());
}

#[tokio::test]
async fn waits_for_every_endpoint_before_deciding() {
    let delay = Duration::from_millis(250);
    let a = echo_server(IP_A, None).await;
    let b = echo_server(IP_A, Some(delay)).await;

    let started = Instant::now();
    let resolved = source(vec![a.uri(), b.uri()], Duration::from_secs(5))
        .resolve()
        .await
        .expect("resolution succeeds");
    let elapsed = started.elapsed();

    assert_eq!(resolved, IP_A.parse::<Ipv4Addr>().unwrap());
    assert!(
        elapsed >= delay,
        "resolve returned after {:?}, before the slowest endpoint settled",
        elapsed
    );
}

#[tokio::test]
async fn deadline_excludes_hung_endpoint() {
    // The first configured endpoint hangs past the shared deadline; only the
    // second one votes.
    let a = echo_server(IP_A, Some(Duration::from_secs(5))).await;
    let b = echo_server(IP_B, None).await;

    let started = Instant::now();
    let resolved = source(vec![a.uri(), b.uri()], Duration::from_secs(1))
        .resolve()
        .await
        .expect("healthy endpoint still wins");
    let elapsed = started.elapsed();

    assert_eq!(resolved, IP_B.parse::<Ipv4Addr>().unwrap());
    assert!(
        elapsed < Duration::from_secs(5),
        "resolution must settle at the deadline, not wait out the hung endpoint"
    );
}

#[tokio::test]
async fn surrounding_whitespace_is_trimmed() {
    let a = echo_server(&format!("  {}\r\n", IP_A), None).await;
    let b = echo_server(&format!("{}\n", IP_A), None).await;

    let resolved = source(vec![a.uri(), b.uri()], Duration::from_secs(5))
        .resolve()
        .await
        .expect("resolution succeeds");

    assert_eq!(resolved, IP_A.parse::<Ipv4Addr>().unwrap());
}
