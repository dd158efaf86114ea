//! # UDP Loopback Flows
//!
//! The client/service exchange over real sockets bound to `127.0.0.1:0`.

#[cfg(test)]
mod tests {
    use crate::integration::harness::{ClientHandle, ServiceHandle};
    use ec_02_wire_codec::TextEncoding;
    use ec_03_datagram_transport::{Transport, TransportConfig, UdpTransport};
    use ec_06_crypto_client::Command;
    use shared_types::{Operation, RequestId, ResultCode};
    use std::net::SocketAddr;

    async fn loopback() -> UdpTransport {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        UdpTransport::bind(addr, TransportConfig::default())
            .await
            .unwrap()
    }

    async fn setup(
        encoding: TextEncoding,
    ) -> (ServiceHandle<UdpTransport>, ClientHandle<UdpTransport>) {
        let server = loopback().await;
        let server_addr = server.local_addr();
        let service = ServiceHandle::spawn(server, encoding);
        let client = ClientHandle::start(loopback().await, encoding, server_addr);
        (service, client)
    }

    #[tokio::test]
    async fn test_udp_encrypt_and_unknown_method() {
        let (service, client) = setup(TextEncoding::Utf16).await;

        client
            .session
            .execute(&Command::Encrypt {
                method: "rot13".to_string(),
                text: "Hello, World!".to_string(),
            })
            .await
            .unwrap();
        client
            .session
            .execute(&Command::Decrypt {
                method: "unknown-cipher".to_string(),
                text: "abc".to_string(),
            })
            .await
            .unwrap();

        let responses = client.recorder.wait_for(2).await;
        let ok = responses.iter().find(|r| r.id == RequestId::new(0)).unwrap();
        assert_eq!(ok.result, ResultCode::Success);
        assert_eq!(ok.data, "Uryyb, Jbeyq!");

        let failed = responses.iter().find(|r| r.id == RequestId::new(1)).unwrap();
        assert_eq!(failed.operation, Operation::Decrypt);
        assert_ne!(failed.result.code(), 0);

        client.session.stop().await;
        service.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_udp_utf8_capabilities() {
        let (service, client) = setup(TextEncoding::Utf8).await;

        client.session.execute(&Command::Capabilities).await.unwrap();
        let responses = client.recorder.wait_for(1).await;
        assert_eq!(responses[0].capability_names(), vec!["rot13", "caesar", "reverse"]);

        client.session.stop().await;
        service.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_udp_service_shutdown_closes_socket() {
        let (service, client) = setup(TextEncoding::Utf16).await;
        let server_transport = std::sync::Arc::clone(&service.transport);

        service.shutdown().await.unwrap();
        assert!(server_transport.is_closed());

        client.session.stop().await;
    }
}
