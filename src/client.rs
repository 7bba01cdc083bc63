//! Token client operations
//!
//! Each operation builds one request frame, runs one session exchange against
//! the response layout it expects, checks the type tag and returns the
//! trailing field:
//! - Individual token request (type 1 -> 2)
//! - Individual token validation (type 3 -> 4)
//! - Group token request (type 5 -> 6)
//! - Group token validation (type 7 -> 8)

use crate::config::ClientConfig;
use crate::error::{FormatError, ProtocolError, TokenWireError};
use crate::protocol::messages;
use crate::protocol::{Decoded, FieldKind, FieldValue, Gas, GroupTail, Layout, MessageType, Sas, WireCodec};
use crate::transport::Session;

/// Access-token protocol client
#[derive(Debug, Clone)]
pub struct TokenClient {
    /// Server host name or address
    host: String,
    /// Server UDP port
    port: u16,
    config: ClientConfig,
    codec: WireCodec,
}

impl TokenClient {
    /// Create a new client for `host:port`
    pub fn new(host: impl Into<String>, port: u16, config: ClientConfig) -> Result<Self, TokenWireError> {
        config.validate()?;
        Ok(Self {
            host: host.into(),
            port,
            codec: WireCodec::new(config.descriptor),
            config,
        })
    }

    /// Request a token for one student. Returns the SAS `student_id:nonce:token`.
    pub async fn individual_token_request(&self, student_id: &str, nonce: i32) -> Result<String, TokenWireError> {
        tracing::info!("Requesting individual token for {} (nonce {})", student_id, nonce);

        let request = messages::individual_token_request(&self.codec, student_id, nonce)?;
        let decoded = self
            .exchange(
                &request,
                Layout::individual_token_response(),
                MessageType::IndividualTokenResponse,
            )
            .await?;

        let token = token_tail(&decoded)?;
        Ok(format!("{}:{}:{}", student_id, nonce, token))
    }

    /// Validate one SAS. Returns the server status code.
    pub async fn individual_token_validation(&self, sas: &str) -> Result<i8, TokenWireError> {
        let sas: Sas = sas.parse()?;
        tracing::info!("Validating SAS of {} (nonce {})", sas.student_id, sas.nonce);

        let request = messages::individual_token_validation(&self.codec, &sas)?;
        let decoded = self
            .exchange(
                &request,
                Layout::individual_token_status(),
                MessageType::IndividualTokenStatus,
            )
            .await?;

        status_tail(&decoded)
    }

    /// Request a group token for `n` SAS entries. Returns the GAS
    /// `sas+...+sas+group_token` built from the given SAS text.
    pub async fn group_token_request<S: AsRef<str>>(&self, n: usize, sas_list: &[S]) -> Result<String, TokenWireError> {
        if sas_list.len() != n {
            return Err(FormatError::CountMismatch {
                expected: n,
                got: sas_list.len(),
            }
            .into());
        }
        tracing::info!("Requesting group token for {} SAS entries", n);

        let entries = sas_list
            .iter()
            .map(|sas| sas.as_ref().parse::<Sas>())
            .collect::<Result<Vec<_>, _>>()?;

        let request = messages::group_token_request(&self.codec, &entries)?;
        let decoded = self
            .exchange(
                &request,
                Layout::group(n, GroupTail::GroupToken),
                MessageType::GroupTokenResponse,
            )
            .await?;

        let group_token = token_tail(&decoded)?;
        let mut gas = String::new();
        for sas in sas_list {
            gas.push_str(sas.as_ref());
            gas.push('+');
        }
        gas.push_str(&group_token);
        Ok(gas)
    }

    /// Validate a GAS. Returns the server status code.
    pub async fn group_token_validation(&self, gas: &str) -> Result<i8, TokenWireError> {
        let gas: Gas = gas.parse()?;
        tracing::info!("Validating GAS with {} SAS entries", gas.len());

        let request = messages::group_token_validation(&self.codec, &gas)?;
        let decoded = self
            .exchange(
                &request,
                Layout::group(gas.len(), GroupTail::GroupTokenStatus),
                MessageType::GroupTokenStatus,
            )
            .await?;

        status_tail(&decoded)
    }

    /// One session round trip: check the type tag, then decode against `layout`
    async fn exchange(&self, request: &[u8], layout: Layout, expected: MessageType) -> Result<Decoded, TokenWireError> {
        let expected_len = layout.width(self.codec.descriptor());

        let mut session = Session::open(&self.host, self.port, &self.config).await?;
        let response = session.exchange(request, expected_len).await?;

        // Nothing past the tag is trusted until the tag matches
        expected.check(self.codec.peek_type(&response)?)?;
        let decoded = self.codec.decode(&layout, &response)?;

        tracing::debug!("Received {:?} from {}", expected, session.peer());
        Ok(decoded)
    }
}

fn token_tail(decoded: &Decoded) -> Result<String, ProtocolError> {
    match decoded.last() {
        Some(FieldValue::Token(token)) | Some(FieldValue::GroupToken(token)) => Ok(token.clone()),
        _ => Err(ProtocolError::MalformedField {
            field: FieldKind::Token.name(),
            reason: "not the last field".to_string(),
        }),
    }
}

fn status_tail(decoded: &Decoded) -> Result<i8, TokenWireError> {
    match decoded.last() {
        Some(FieldValue::Status(status)) => {
            tracing::info!("Status: {}", status);
            Ok(*status)
        }
        _ => Err(ProtocolError::MalformedField {
            field: FieldKind::Status.name(),
            reason: "not the last field".to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetworkError;
    use crate::protocol::ProtocolDescriptor;
    use crate::transport::mock::MockServer;
    use std::time::Duration;

    const TOKEN: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";
    const GROUP_TOKEN: &str = "fedcba9876543210fedcba9876543210fedcba9876543210fedcba9876543210";

    fn codec() -> WireCodec {
        WireCodec::new(ProtocolDescriptor::STANDARD)
    }

    fn client(server: &MockServer) -> TokenClient {
        let config = ClientConfig::default().with_timeout(Duration::from_millis(100));
        TokenClient::new("127.0.0.1", server.addr.port(), config).unwrap()
    }

    /// Echo the request body back under `tag`, followed by `tail`
    fn reply(tag: i16, request: &[u8], tail: &[u8]) -> Vec<u8> {
        let mut frame = codec().encode_type(tag).to_vec();
        frame.extend_from_slice(&request[2..]);
        frame.extend_from_slice(tail);
        frame
    }

    #[tokio::test]
    async fn test_individual_token_request() {
        let server = MockServer::start(|_, req| Some(reply(2, req, TOKEN.as_bytes()))).await;

        let sas = client(&server)
            .individual_token_request("2021031726", 1234)
            .await
            .unwrap();
        assert_eq!(sas, format!("2021031726:1234:{}", TOKEN));

        let sent = server.received();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].len(), 18);
        assert_eq!(&sent[0][..2], &[0, 1]);
        assert_eq!(&sent[0][2..14], b"2021031726  ");
        assert_eq!(&sent[0][14..], &1234i32.to_be_bytes());
    }

    #[tokio::test]
    async fn test_individual_token_validation() {
        let server = MockServer::start(|_, req| Some(reply(4, req, &[0]))).await;
        let sas = format!("2021031726:1234:{}", TOKEN);

        let status = client(&server).individual_token_validation(&sas).await.unwrap();
        assert_eq!(status, 0);

        let sent = server.received();
        assert_eq!(sent[0].len(), 82);
        assert_eq!(&sent[0][..2], &[0, 3]);
        assert_eq!(&sent[0][18..], TOKEN.as_bytes());
    }

    #[tokio::test]
    async fn test_group_token_request() {
        let server = MockServer::start(|_, req| Some(reply(6, req, GROUP_TOKEN.as_bytes()))).await;
        let sas_list = vec![format!("a:1:{}", TOKEN), format!("b:2:{}", TOKEN)];

        let gas = client(&server).group_token_request(2, &sas_list).await.unwrap();
        assert_eq!(gas, format!("{}+{}+{}", sas_list[0], sas_list[1], GROUP_TOKEN));

        let sent = server.received();
        assert_eq!(sent[0].len(), 4 + 160);
        assert_eq!(&sent[0][..4], &[0, 5, 0, 2]);
    }

    #[tokio::test]
    async fn test_group_token_request_count_mismatch() {
        let server = MockServer::silent().await;
        let err = client(&server)
            .group_token_request(3, &["a:1:T"])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TokenWireError::Format(FormatError::CountMismatch { expected: 3, got: 1 })
        ));
        assert!(server.received().is_empty());
    }

    #[tokio::test]
    async fn test_group_token_validation() {
        let server = MockServer::start(|_, req| {
            assert_eq!(req.len(), 4 + 160 + 64);
            Some(reply(8, req, &[1]))
        })
        .await;

        let status = client(&server)
            .group_token_validation("a:1:T+b:2:U+GROUPTOKEN64")
            .await
            .unwrap();
        assert_eq!(status, 1);

        let sent = server.received();
        let frame = &sent[0];
        assert_eq!(&frame[..4], &[0, 7, 0, 2]);
        assert_eq!(&frame[4..16], b"a           ");
        assert_eq!(&frame[16..20], &1i32.to_be_bytes());
        assert_eq!(&frame[84..96], b"b           ");
        assert_eq!(&frame[164..176], b"GROUPTOKEN64");
        // Reply was type 8 of 4 + 160 + 64 + 1 bytes
        assert_eq!(reply(8, frame, &[1]).len(), 229);
    }

    #[tokio::test]
    async fn test_unexpected_response_type() {
        let server = MockServer::start(|_, req| Some(reply(6, req, TOKEN.as_bytes()))).await;

        let err = client(&server)
            .individual_token_request("2021031726", 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TokenWireError::Protocol(ProtocolError::UnexpectedResponseType { expected: 2, got: 6 })
        ));
    }

    #[tokio::test]
    async fn test_type_checked_before_body() {
        let server = MockServer::start(|_, req| Some(reply(6, req, &[0xFF; 64]))).await;

        let err = client(&server)
            .individual_token_request("2021031726", 1234)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TokenWireError::Protocol(ProtocolError::UnexpectedResponseType { expected: 2, got: 6 })
        ));
    }

    #[tokio::test]
    async fn test_group_token_validation_without_entries() {
        let server = MockServer::start(|_, req| Some(reply(8, req, &[0]))).await;

        let status = client(&server).group_token_validation("GROUPTOKEN").await.unwrap();
        assert_eq!(status, 0);

        let sent = server.received();
        assert_eq!(sent[0].len(), 4 + 64);
        assert_eq!(reply(8, &sent[0], &[0]).len(), 69);
        assert_eq!(&sent[0][..4], &[0, 7, 0, 0]);
        assert_eq!(&sent[0][4..14], b"GROUPTOKEN");
    }

    #[tokio::test]
    async fn test_server_error_frame() {
        let server = MockServer::start(|_, _| Some(vec![0x01, 0x00, 0x00, 0x02])).await;

        let err = client(&server)
            .individual_token_validation(&format!("x:9:{}", TOKEN))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TokenWireError::Protocol(ProtocolError::ServerError { msg_type: 256, code: 2 })
        ));
        assert_eq!(err.exit_code(), 4);
    }

    #[tokio::test]
    async fn test_silent_server() {
        let server = MockServer::silent().await;

        let err = client(&server)
            .group_token_validation("a:1:T+G")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TokenWireError::Network(NetworkError::TooManyAttempts { attempts: 4 })
        ));
        assert_eq!(server.received().len(), 4);
    }

    #[tokio::test]
    async fn test_invalid_input_never_sent() {
        let server = MockServer::silent().await;
        let client = client(&server);

        let err = client.individual_token_validation("no-colons").await.unwrap_err();
        assert!(matches!(err, TokenWireError::Format(FormatError::InvalidSas { .. })));

        let err = client.group_token_validation("a:1:T+").await.unwrap_err();
        assert!(matches!(err, TokenWireError::Format(FormatError::InvalidGas { .. })));

        let long_token = "t".repeat(65);
        let err = client
            .individual_token_validation(&format!("a:1:{}", long_token))
            .await
            .unwrap_err();
        assert!(matches!(err, TokenWireError::Format(FormatError::Encoding { .. })));

        assert!(server.received().is_empty());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = ClientConfig::default().with_max_attempts(0);
        assert!(TokenClient::new("127.0.0.1", 1, config).is_err());
    }
}
