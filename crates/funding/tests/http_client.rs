//! HTTP faucet client against a local stub server

use relaypay_core::{Amount, Keypair};
use relaypay_funding::{FundingError, FundingService, HttpFundingClient};
use rust_decimal_macros::dec;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve exactly one canned response; the handle yields the request line.
async fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        String::from_utf8_lossy(&buf)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string()
    });

    (url, handle)
}

fn client(url: &str) -> HttpFundingClient {
    HttpFundingClient::new(url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_create_account_success() {
    let (url, server) = serve_once("200 OK", r#"{"hash":"abc123","ledger":42}"#).await;
    let address = Keypair::generate().address();

    let receipt = client(&url).create_account(&address).await.unwrap();

    assert_eq!(receipt.transaction.as_deref(), Some("abc123"));
    let request_line = server.await.unwrap();
    assert!(request_line.starts_with("GET /?addr="));
    assert!(request_line.contains(address.as_str()));
}

#[tokio::test]
async fn test_fund_hits_fund_endpoint() {
    let (url, server) = serve_once("200 OK", r#"{"success":true}"#).await;
    let address = Keypair::generate().address();

    let receipt = client(&url)
        .fund(&address, Amount::new(dec!(250)).unwrap())
        .await
        .unwrap();

    assert!(receipt.transaction.is_none());
    let request_line = server.await.unwrap();
    assert!(request_line.starts_with("GET /fund?addr="));
    assert!(request_line.contains("amount=250"));
}

#[tokio::test]
async fn test_non_success_status() {
    let (url, server) = serve_once("400 Bad Request", r#"{"detail":"invalid address"}"#).await;
    let address = Keypair::generate().address();

    let result = client(&url).create_account(&address).await;

    match result {
        Err(FundingError::Status { status, body }) => {
            assert_eq!(status, 400);
            assert!(body.contains("invalid address"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn test_existing_account_status() {
    let (url, server) = serve_once("400 Bad Request", r#"{"detail":"op_already_exists"}"#).await;
    let address = Keypair::generate().address();

    let result = client(&url).create_account(&address).await;

    assert!(matches!(result, Err(FundingError::AlreadyExists(_))));
    server.await.unwrap();
}

#[tokio::test]
async fn test_existing_account_rejection_body() {
    let (url, server) = serve_once(
        "200 OK",
        r#"{"success":false,"error":"account already exists"}"#,
    )
    .await;
    let address = Keypair::generate().address();

    let result = client(&url).create_account(&address).await;

    assert!(matches!(result, Err(FundingError::AlreadyExists(_))));
    server.await.unwrap();
}

#[tokio::test]
async fn test_malformed_body() {
    let (url, server) = serve_once("200 OK", "<html>gateway</html>").await;
    let address = Keypair::generate().address();

    let result = client(&url).create_account(&address).await;

    assert!(matches!(result, Err(FundingError::Malformed(_))));
    server.await.unwrap();
}

#[tokio::test]
async fn test_json_without_outcome_is_malformed() {
    let (url, server) = serve_once("200 OK", r#"{"ledger":42}"#).await;
    let address = Keypair::generate().address();

    let result = client(&url).create_account(&address).await;

    assert!(matches!(result, Err(FundingError::Malformed(_))));
    server.await.unwrap();
}

#[tokio::test]
async fn test_explicit_rejection() {
    let (url, server) = serve_once("200 OK", r#"{"success":false,"error":"faucet empty"}"#).await;
    let address = Keypair::generate().address();

    let result = client(&url).create_account(&address).await;

    match result {
        Err(FundingError::Rejected(reason)) => assert_eq!(reason, "faucet empty"),
        other => panic!("expected rejection, got {:?}", other),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn test_unreachable_service() {
    // Bind then drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let result = client(&url)
        .create_account(&Keypair::generate().address())
        .await;

    assert!(matches!(result, Err(FundingError::Transport { .. })));
    assert!(result.unwrap_err().is_retryable());
}
