//! Tests for the LND client and the in-memory node

use super::{status_from_state, InMemoryNode, InvoiceService, LndClient};
use crate::token::{generate_preimage, payment_hash_of};
use crate::types::{InvoiceRequest, InvoiceStatus, NodeConfig};
use crate::PaywallError;
use base64::{engine::general_purpose, Engine as _};
use http::StatusCode;
use mockito::{Matcher, Server};
use serde_json::json;

const MACAROON: &str = "0201036c6e64";

fn client_for(server: &Server) -> LndClient {
    LndClient::new(NodeConfig::new(server.url()).with_macaroon(MACAROON)).unwrap()
}

#[test]
fn test_lnd_client_creation() {
    let client = LndClient::new(NodeConfig::new("https://localhost:8080/")).unwrap();
    assert_eq!(client.url(), "https://localhost:8080");
    assert!(LndClient::new(NodeConfig::new("localhost")).is_err());
}

#[test]
fn test_status_from_state() {
    assert_eq!(status_from_state("OPEN"), Some(InvoiceStatus::Unpaid));
    assert_eq!(status_from_state("CANCELED"), Some(InvoiceStatus::Unpaid));
    assert_eq!(status_from_state("ACCEPTED"), Some(InvoiceStatus::Held));
    assert_eq!(status_from_state("SETTLED"), Some(InvoiceStatus::Paid));
    assert_eq!(status_from_state("SOMETHING"), None);
}

#[tokio::test]
async fn test_lnd_create_standard_invoice() {
    let mut server = Server::new_async().await;
    let hash = payment_hash_of(&generate_preimage()).unwrap();
    let r_hash = general_purpose::STANDARD.encode(hex::decode(&hash).unwrap());

    let mock = server
        .mock("POST", "/v1/invoices")
        .match_header("Grpc-Metadata-macaroon", MACAROON)
        .match_body(Matcher::PartialJson(json!({
            "value": "25",
            "memo": "API access"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "r_hash": r_hash,
                "payment_request": "lnbcrt250n1test",
                "add_index": "7"
            })
            .to_string(),
        )
        .create();

    let client = client_for(&server);
    let invoice = client
        .create(&InvoiceRequest::new(25, "API access"))
        .await
        .unwrap();

    mock.assert();
    assert_eq!(invoice.payment_hash, hash);
    assert_eq!(invoice.payment_request, "lnbcrt250n1test");
}

#[tokio::test]
async fn test_lnd_create_hodl_invoice() {
    let mut server = Server::new_async().await;
    let hash = payment_hash_of(&generate_preimage()).unwrap();
    let encoded_hash = general_purpose::STANDARD.encode(hex::decode(&hash).unwrap());

    let mock = server
        .mock("POST", "/v2/invoices/hodl")
        .match_body(Matcher::PartialJson(json!({ "hash": encoded_hash })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "payment_request": "lnbcrt10n1hodl" }).to_string())
        .create();

    let client = client_for(&server);
    let invoice = client
        .create(&InvoiceRequest::new(1, "hodl").with_hodl(Some(hash.clone())))
        .await
        .unwrap();

    mock.assert();
    assert_eq!(invoice.payment_hash, hash);
    assert_eq!(invoice.payment_request, "lnbcrt10n1hodl");
}

#[tokio::test]
async fn test_lnd_create_hodl_without_hash_fails() {
    let server = Server::new_async().await;
    let client = client_for(&server);

    let result = client
        .create(&InvoiceRequest::new(1, "hodl").with_hodl(None))
        .await;
    assert!(matches!(result, Err(PaywallError::InvoiceCreate { .. })));
}

#[tokio::test]
async fn test_lnd_create_failure() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/invoices")
        .with_status(503)
        .with_body("unavailable")
        .create();

    let client = client_for(&server);
    let result = client.create(&InvoiceRequest::new(1, "memo")).await;
    assert!(matches!(result, Err(PaywallError::InvoiceCreate { .. })));
}

#[tokio::test]
async fn test_lnd_lookup_states() {
    let mut server = Server::new_async().await;
    let hash = "ab".repeat(32);
    let _mock = server
        .mock("GET", format!("/v1/invoice/{}", hash).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "state": "ACCEPTED",
                "payment_request": "lnbcrt10n1held"
            })
            .to_string(),
        )
        .create();

    let client = client_for(&server);
    let snapshot = client.lookup(&hash).await.unwrap();
    assert_eq!(snapshot.status, Some(InvoiceStatus::Held));
    assert_eq!(snapshot.payment_request.as_deref(), Some("lnbcrt10n1held"));
}

#[tokio::test]
async fn test_lnd_lookup_rejects_malformed_hash() {
    let mut server = Server::new_async().await;
    let getinfo = server
        .mock("GET", "/v1/getinfo")
        .match_header("grpc-metadata-macaroon", MACAROON)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "state": "SETTLED", "payment_request": "lnbc1" }).to_string())
        .expect(0)
        .create();

    let not_hex = "zz".repeat(32);
    let short = "ab".repeat(31);
    let hashes: [&str; 4] = ["../getinfo", "ab?x=1", &not_hex, &short];

    let client = client_for(&server);
    for hash in hashes {
        let err = client.lookup(hash).await.unwrap_err();
        assert!(matches!(err, PaywallError::InvoiceLookup { .. }));
    }
    getinfo.assert();
}

#[tokio::test]
async fn test_lnd_lookup_partial_record() {
    let mut server = Server::new_async().await;
    let hash = "cd".repeat(32);
    let _mock = server
        .mock("GET", format!("/v1/invoice/{}", hash).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "state": "OPEN" }).to_string())
        .create();

    let client = client_for(&server);
    let snapshot = client.lookup(&hash).await.unwrap();
    assert_eq!(snapshot.status, Some(InvoiceStatus::Unpaid));
    assert!(snapshot.complete().is_none());
}

#[tokio::test]
async fn test_lnd_lookup_not_found() {
    let mut server = Server::new_async().await;
    let hash = "ef".repeat(32);
    let _mock = server
        .mock("GET", format!("/v1/invoice/{}", hash).as_str())
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(json!({ "code": 5, "message": "unable to locate invoice" }).to_string())
        .create();

    let client = client_for(&server);
    let err = client.lookup(&hash).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_lnd_lookup_grpc_not_found_with_500() {
    let mut server = Server::new_async().await;
    let hash = "01".repeat(32);
    let _mock = server
        .mock("GET", format!("/v1/invoice/{}", hash).as_str())
        .with_status(500)
        .with_body(json!({ "code": 5, "message": "there are no existing invoices" }).to_string())
        .create();

    let client = client_for(&server);
    assert!(client.lookup(&hash).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_lnd_lookup_server_error() {
    let mut server = Server::new_async().await;
    let hash = "02".repeat(32);
    let _mock = server
        .mock("GET", format!("/v1/invoice/{}", hash).as_str())
        .with_status(500)
        .with_body(json!({ "code": 2, "message": "boom" }).to_string())
        .create();

    let client = client_for(&server);
    let err = client.lookup(&hash).await.unwrap_err();
    assert!(matches!(err, PaywallError::InvoiceLookup { .. }));
}

#[tokio::test]
async fn test_lnd_settle_success() {
    let mut server = Server::new_async().await;
    let preimage = generate_preimage();
    let encoded = general_purpose::STANDARD.encode(hex::decode(&preimage).unwrap());

    let mock = server
        .mock("POST", "/v2/invoices/settle")
        .match_body(Matcher::Json(json!({ "preimage": encoded })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{}")
        .create();

    let client = client_for(&server);
    client.settle(&preimage).await.unwrap();
    mock.assert();
}

#[tokio::test]
async fn test_lnd_settle_structured_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v2/invoices/settle")
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "code": 2,
                "message": "invoice still open",
                "details": [{ "hint": "pay first" }]
            })
            .to_string(),
        )
        .create();

    let client = client_for(&server);
    match client.settle(&generate_preimage()).await.unwrap_err() {
        PaywallError::Settlement {
            status,
            message,
            details,
        } => {
            assert_eq!(status, Some(StatusCode::INTERNAL_SERVER_ERROR));
            assert_eq!(message.as_deref(), Some("invoice still open"));
            assert!(details.unwrap().contains("pay first"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_lnd_settle_unstructured_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v2/invoices/settle")
        .with_status(502)
        .with_body("bad gateway")
        .create();

    let client = client_for(&server);
    match client.settle(&generate_preimage()).await.unwrap_err() {
        PaywallError::Settlement { message, .. } => assert!(message.is_none()),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_lnd_node_info() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/v1/getinfo")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "identity_pubkey": "02abc",
                "alias": "paywall",
                "uris": ["02abc@127.0.0.1:9735"],
                "num_active_channels": 3
            })
            .to_string(),
        )
        .create();

    let client = client_for(&server);
    let info = client.node_info().await.unwrap();
    assert_eq!(info.pubkey, "02abc");
    assert_eq!(info.alias, "paywall");
    assert_eq!(info.uris, vec!["02abc@127.0.0.1:9735".to_string()]);
}

#[tokio::test]
async fn test_memory_node_standard_flow() {
    let node = InMemoryNode::new();
    assert!(node.is_empty().await);

    let invoice = node.create(&InvoiceRequest::new(5, "memo")).await.unwrap();
    assert_eq!(node.len().await, 1);

    let snapshot = node.lookup(&invoice.payment_hash).await.unwrap();
    assert_eq!(snapshot.status, Some(InvoiceStatus::Unpaid));

    let preimage = node.mark_paid(&invoice.payment_hash).await.unwrap();
    assert_eq!(payment_hash_of(&preimage).unwrap(), invoice.payment_hash);
    let snapshot = node.lookup(&invoice.payment_hash).await.unwrap();
    assert_eq!(snapshot.status, Some(InvoiceStatus::Paid));
}

#[tokio::test]
async fn test_memory_node_hodl_flow() {
    let node = InMemoryNode::new();
    let preimage = generate_preimage();
    let hash = payment_hash_of(&preimage).unwrap();

    node.create(&InvoiceRequest::new(5, "memo").with_hodl(Some(hash.clone())))
        .await
        .unwrap();

    // Settling before the payer locks funds is refused
    assert!(node.settle(&preimage).await.is_err());

    node.mark_held(&hash).await.unwrap();
    assert_eq!(
        node.lookup(&hash).await.unwrap().status,
        Some(InvoiceStatus::Held)
    );

    node.settle(&preimage).await.unwrap();
    assert_eq!(
        node.lookup(&hash).await.unwrap().status,
        Some(InvoiceStatus::Paid)
    );

    // A second settlement errors and leaves the invoice paid
    let err = node.settle(&preimage).await.unwrap_err();
    assert!(matches!(
        err,
        PaywallError::Settlement {
            status: Some(StatusCode::CONFLICT),
            ..
        }
    ));
    assert_eq!(
        node.lookup(&hash).await.unwrap().status,
        Some(InvoiceStatus::Paid)
    );
}

#[tokio::test]
async fn test_memory_node_rejects_overflowing_amount() {
    let node = InMemoryNode::new();
    let err = node
        .create(&InvoiceRequest::new(u64::MAX / 5, "memo"))
        .await
        .unwrap_err();
    assert!(matches!(err, PaywallError::InvoiceCreate { .. }));
    assert!(node.is_empty().await);
}

#[tokio::test]
async fn test_memory_node_hash_case_insensitive() {
    let node = InMemoryNode::new();
    let invoice = node.create(&InvoiceRequest::new(5, "memo")).await.unwrap();
    let upper = invoice.payment_hash.to_uppercase();
    assert!(node.mark_paid(&upper).await.is_ok());
    assert_eq!(
        node.lookup(&upper).await.unwrap().status,
        Some(InvoiceStatus::Paid)
    );

    let preimage = generate_preimage();
    let hash = payment_hash_of(&preimage).unwrap();
    node.create(&InvoiceRequest::new(5, "memo").with_hodl(Some(hash.clone())))
        .await
        .unwrap();
    node.mark_held(&hash.to_uppercase()).await.unwrap();
    assert_eq!(
        node.lookup(&hash).await.unwrap().status,
        Some(InvoiceStatus::Held)
    );
}

#[tokio::test]
async fn test_memory_node_errors() {
    let node = InMemoryNode::new();
    assert!(node.lookup("00").await.unwrap_err().is_not_found());
    assert!(node
        .create(&InvoiceRequest::new(1, "memo").with_hodl(None))
        .await
        .is_err());
    assert!(node
        .create(&InvoiceRequest::new(1, "memo").with_hodl(Some("zz".to_string())))
        .await
        .is_err());

    let invoice = node.create(&InvoiceRequest::new(1, "memo")).await.unwrap();
    assert!(node.mark_held(&invoice.payment_hash).await.is_err());
}
