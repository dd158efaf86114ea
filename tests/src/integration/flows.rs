//! # Request/Response Flows
//!
//! Service and client over an in-process `MemoryNetwork`, exercising every
//! crate on the request path: command parsing, issuing, codec, transport,
//! dispatch, cipher registry, correlation.

#[cfg(test)]
mod tests {
    use crate::integration::harness::{ClientHandle, ServiceHandle, WAIT};
    use ec_01_cipher_methods::{AlgorithmRegistry, ReverseCipher, ShiftCipher};
    use ec_02_wire_codec::{MessageCodec, TextEncoding};
    use ec_03_datagram_transport::{MemoryNetwork, Transport, TransportConfig, TransportError};
    use ec_04_response_correlator::{
        IssueError, PendingRequestStore, RequestIssuer, ResponseCorrelator, ResponseRouter,
    };
    use ec_05_crypto_service::CryptoService;
    use ec_06_crypto_client::Command;
    use shared_types::{Operation, RequestId, Response, ResultCode};
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    const SERVER_ADDR: &str = "10.0.0.1:10000";
    const CLIENT_ADDR: &str = "10.0.0.2:10001";

    fn addr(s: &str) -> SocketAddr {
        s.parse().unwrap()
    }

    struct Setup {
        network: MemoryNetwork,
        service: ServiceHandle<ec_03_datagram_transport::MemoryTransport>,
        client: ClientHandle<ec_03_datagram_transport::MemoryTransport>,
    }

    fn setup_with(server_encoding: TextEncoding, client_encoding: TextEncoding) -> Setup {
        let network = MemoryNetwork::new();
        let server_transport = network
            .bind(addr(SERVER_ADDR), TransportConfig::default())
            .unwrap();
        let client_transport = network
            .bind(addr(CLIENT_ADDR), TransportConfig::default())
            .unwrap();

        let service = ServiceHandle::spawn(server_transport, server_encoding);
        let client = ClientHandle::start(client_transport, client_encoding, addr(SERVER_ADDR));
        Setup {
            network,
            service,
            client,
        }
    }

    fn setup() -> Setup {
        setup_with(TextEncoding::Utf16, TextEncoding::Utf16)
    }

    fn encrypt(method: &str, text: &str) -> Command {
        Command::Encrypt {
            method: method.to_string(),
            text: text.to_string(),
        }
    }

    fn decrypt(method: &str, text: &str) -> Command {
        Command::Decrypt {
            method: method.to_string(),
            text: text.to_string(),
        }
    }

    // =========================================================================
    // CLIENT SESSION FLOWS
    // =========================================================================

    #[tokio::test]
    async fn test_encrypt_then_unknown_method_decrypt() {
        let s = setup();

        let first = s.client.session.execute(&encrypt("rot13", "Hello, World!")).await;
        assert_eq!(first.unwrap(), Some(RequestId::new(0)));
        let second = s.client.session.execute(&decrypt("unknown-cipher", "abc")).await;
        assert_eq!(second.unwrap(), Some(RequestId::new(1)));

        let responses = s.client.recorder.wait_for(2).await;
        let ok = responses.iter().find(|r| r.id == RequestId::new(0)).unwrap();
        assert_eq!(ok.operation, Operation::Encrypt);
        assert_eq!(ok.result, ResultCode::Success);
        assert_eq!(ok.data, "Uryyb, Jbeyq!");

        let failed = responses.iter().find(|r| r.id == RequestId::new(1)).unwrap();
        assert_eq!(failed.operation, Operation::Decrypt);
        assert_ne!(failed.result.code(), 0);
        assert_eq!(failed.result, ResultCode::UnknownMethod);
        assert!(failed.diagnostic().is_some());

        s.client.session.stop().await;
        s.service.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_capabilities_lists_builtin_methods() {
        let s = setup();

        s.client.session.execute(&Command::Capabilities).await.unwrap();
        let responses = s.client.recorder.wait_for(1).await;

        assert_eq!(responses[0].operation, Operation::Capabilities);
        assert!(responses[0].is_success());
        assert_eq!(responses[0].capability_names(), vec!["rot13", "caesar", "reverse"]);

        s.client.session.stop().await;
        s.service.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_every_builtin_method_round_trips_through_service() {
        let s = setup();
        let plaintext = "Grüße, 世界!";

        for method in ["rot13", "caesar", "reverse"] {
            s.client.session.execute(&encrypt(method, plaintext)).await.unwrap();
        }
        let encrypted = s.client.recorder.wait_for(3).await;
        assert!(encrypted.iter().all(|r| r.is_success()));

        for (method, response) in ["rot13", "caesar", "reverse"].iter().zip(&encrypted) {
            s.client
                .session
                .execute(&decrypt(method, &response.data))
                .await
                .unwrap();
        }
        let all = s.client.recorder.wait_for(6).await;
        for decrypted in &all[3..] {
            assert!(decrypted.is_success());
            assert_eq!(decrypted.data, plaintext);
        }

        s.client.session.stop().await;
        s.service.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_ids_increase_per_issued_request() {
        let s = setup();

        for expected in 0..5u64 {
            let id = s.client.session.execute(&encrypt("reverse", "abc")).await.unwrap();
            assert_eq!(id, Some(RequestId::new(expected)));
        }
        let mut ids: Vec<u64> = s
            .client
            .recorder
            .wait_for(5)
            .await
            .iter()
            .map(|r| r.id.value())
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);

        s.client.session.stop().await;
        s.service.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_help_and_quit_send_nothing() {
        let s = setup();

        assert_eq!(s.client.session.execute(&Command::Help).await.unwrap(), None);
        assert_eq!(s.client.session.execute(&Command::Quit).await.unwrap(), None);
        assert_eq!(s.client.session.issuer().peek_next_id(), RequestId::new(0));

        sleep(Duration::from_millis(50)).await;
        assert!(s.client.recorder.snapshot().is_empty());

        s.client.session.stop().await;
        s.service.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_stopped_session_cannot_issue() {
        let s = setup();

        s.client.session.execute(&encrypt("rot13", "first")).await.unwrap();
        s.client.recorder.wait_for(1).await;
        s.client.session.stop().await;

        let issued = s.client.session.execute(&encrypt("rot13", "late")).await;
        assert!(
            matches!(issued, Err(IssueError::Transport(TransportError::Closed))),
            "unexpected: {issued:?}"
        );

        sleep(Duration::from_millis(50)).await;
        assert_eq!(s.client.recorder.snapshot().len(), 1);

        s.service.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_mismatched_encodings_never_reach_observer() {
        let s = setup_with(TextEncoding::Utf16, TextEncoding::Utf8);

        s.client.session.execute(&encrypt("rot13", "Hello")).await.unwrap();
        sleep(Duration::from_millis(100)).await;

        assert!(s.client.recorder.snapshot().is_empty());

        s.client.session.stop().await;
        s.service.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_releases_endpoints() {
        let s = setup();
        assert_eq!(s.network.endpoint_count(), 2);

        s.client.session.stop().await;
        s.service.shutdown().await.unwrap();
        drop(s.client);

        assert_eq!(s.network.endpoint_count(), 0);
    }

    #[tokio::test]
    async fn test_custom_registry_served_to_client() {
        let network = MemoryNetwork::new();
        let mut registry = AlgorithmRegistry::new();
        registry.register(ShiftCipher::new("rot1", 1));
        registry.register(ReverseCipher::new());
        let service = ServiceHandle::spawn_with(
            network.bind(addr(SERVER_ADDR), TransportConfig::default()).unwrap(),
            TextEncoding::Utf16,
            CryptoService::new(Arc::new(registry)),
        );
        let client = ClientHandle::start(
            network.bind(addr(CLIENT_ADDR), TransportConfig::default()).unwrap(),
            TextEncoding::Utf16,
            addr(SERVER_ADDR),
        );

        client.session.execute(&Command::Capabilities).await.unwrap();
        client.session.execute(&encrypt("rot1", "HAL")).await.unwrap();
        client.session.execute(&encrypt("rot13", "HAL")).await.unwrap();

        let responses = client.recorder.wait_for(3).await;
        let by_id = |id: u64| responses.iter().find(|r| r.id == RequestId::new(id)).unwrap();
        assert_eq!(by_id(0).capability_names(), vec!["rot1", "reverse"]);
        assert_eq!(by_id(1).data, "IBM");
        assert_eq!(by_id(2).result, ResultCode::UnknownMethod);

        client.session.stop().await;
        service.shutdown().await.unwrap();
    }

    // =========================================================================
    // TRACKED REQUESTS
    // =========================================================================

    #[tokio::test]
    async fn test_tracked_requests_resolve_through_router() {
        let network = MemoryNetwork::new();
        let service = ServiceHandle::spawn(
            network.bind(addr(SERVER_ADDR), TransportConfig::default()).unwrap(),
            TextEncoding::Utf16,
        );

        let client_transport = Arc::new(
            network
                .bind(addr(CLIENT_ADDR), TransportConfig::default())
                .unwrap(),
        );
        let codec = MessageCodec::default();
        let store = Arc::new(PendingRequestStore::new(Duration::from_secs(5)));
        let issuer = RequestIssuer::new(Arc::clone(&client_transport), codec, addr(SERVER_ADDR))
            .with_pending(Arc::clone(&store));
        let correlator = ResponseCorrelator::new(Arc::clone(&client_transport), codec);
        correlator
            .start(ResponseRouter::new(Arc::clone(&store), |_: Response| {}))
            .unwrap();

        let (id, rx) = issuer
            .issue_tracked(Operation::Encrypt, Some("caesar"), "abc", None)
            .await
            .unwrap();
        let response = timeout(WAIT, rx).await.unwrap().unwrap();
        assert_eq!(response.id, id);
        assert_eq!(response.data, "def");

        let (_, rx) = issuer
            .issue_tracked(Operation::Decrypt, Some("caesar"), &response.data, None)
            .await
            .unwrap();
        assert_eq!(timeout(WAIT, rx).await.unwrap().unwrap().data, "abc");
        assert_eq!(store.pending_count(), 0);

        correlator.stop().await;
        service.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_unanswered_tracked_request_expires() {
        let network = MemoryNetwork::new();
        // Nothing bound at the server address: the datagram is lost.
        let client_transport = Arc::new(
            network
                .bind(addr(CLIENT_ADDR), TransportConfig::default())
                .unwrap(),
        );
        let store = Arc::new(PendingRequestStore::new(Duration::from_millis(10)));
        let issuer = RequestIssuer::new(
            Arc::clone(&client_transport),
            MessageCodec::default(),
            addr(SERVER_ADDR),
        )
        .with_pending(Arc::clone(&store));

        let (id, rx) = issuer
            .issue_tracked(Operation::Capabilities, None, "", None)
            .await
            .unwrap();
        assert!(store.is_pending(&id));

        sleep(Duration::from_millis(30)).await;
        assert_eq!(store.remove_expired(), 1);
        assert!(rx.await.is_err());
    }

    // =========================================================================
    // RAW WIRE
    // =========================================================================

    #[tokio::test]
    async fn test_raw_utf16_request_gets_utf16_response() {
        let network = MemoryNetwork::new();
        let service = ServiceHandle::spawn(
            network.bind(addr(SERVER_ADDR), TransportConfig::default()).unwrap(),
            TextEncoding::Utf16,
        );
        let raw = network
            .bind(addr(CLIENT_ADDR), TransportConfig::default())
            .unwrap();

        let document = r#"{"id":7,"operation":"encrypt","method":"rot13","data":"Hello, World!"}"#;
        raw.send(&TextEncoding::Utf16.encode(document), addr(SERVER_ADDR))
            .await
            .unwrap();

        let (bytes, from) = timeout(WAIT, raw.receive()).await.unwrap().unwrap();
        assert_eq!(from, addr(SERVER_ADDR));
        assert_eq!(&bytes[..2], &[0xFE, 0xFF]);

        let text = TextEncoding::Utf16.decode(&bytes).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["operation"], "encrypt");
        assert_eq!(value["result"], 0);
        assert_eq!(value["data"], "Uryyb, Jbeyq!");

        service.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_raw_request_without_method_is_invalid() {
        let network = MemoryNetwork::new();
        let service = ServiceHandle::spawn(
            network.bind(addr(SERVER_ADDR), TransportConfig::default()).unwrap(),
            TextEncoding::Utf8,
        );
        let raw = network
            .bind(addr(CLIENT_ADDR), TransportConfig::default())
            .unwrap();

        raw.send(br#"{"id":3,"operation":"decrypt","data":"x"}"#, addr(SERVER_ADDR))
            .await
            .unwrap();

        let (bytes, _) = timeout(WAIT, raw.receive()).await.unwrap().unwrap();
        let response = MessageCodec::new(TextEncoding::Utf8)
            .decode_response(&bytes)
            .unwrap();
        assert_eq!(response.id, RequestId::new(3));
        assert_eq!(response.result, ResultCode::InvalidRequest);

        service.shutdown().await.unwrap();
    }
}
