//! Transport session
//!
//! Owns one UDP socket connected to the token server and performs a single
//! request/response exchange with bounded retry. The socket is released when
//! the exchange finishes, whatever the outcome.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use tokio::net::{lookup_host, UdpSocket};

use crate::config::ClientConfig;
use crate::error::{NetworkError, ProtocolError, TokenWireError};
use crate::protocol::{FieldValue, Layout, WireCodec};

use super::retry::{with_retries, RetryError, RetryPolicy};

/// Buffer size for replies; larger than any frame so oversize replies are seen whole
const BUFFER_SIZE: usize = 65535;

/// One-shot exchange session with the token server
#[derive(Debug)]
pub struct Session {
    /// Connected socket, `None` once closed
    socket: Option<UdpSocket>,
    /// Resolved server endpoint
    peer: SocketAddr,
    codec: WireCodec,
    policy: RetryPolicy,
}

impl Session {
    /// Resolve `host:port` and connect a UDP socket to it.
    ///
    /// IPv6 endpoints are preferred when the resolver returns one.
    pub async fn open(host: &str, port: u16, config: &ClientConfig) -> Result<Self, TokenWireError> {
        let unreachable = || NetworkError::UnreachableHost {
            host: host.to_string(),
            port,
        };

        let addrs: Vec<SocketAddr> = lookup_host((host, port))
            .await
            .map_err(|e| {
                tracing::debug!("Resolving {}:{} failed: {}", host, port, e);
                unreachable()
            })?
            .collect();
        tracing::debug!("Resolved {}:{} to {:?}", host, port, addrs);

        let peer = addrs
            .iter()
            .find(|addr| addr.is_ipv6())
            .or_else(|| addrs.first())
            .copied()
            .ok_or_else(unreachable)?;

        let local: SocketAddr = if peer.is_ipv6() {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(local).await.map_err(|e| NetworkError::BindFailed {
            addr: local.to_string(),
            reason: e.to_string(),
        })?;

        socket.connect(peer).await.map_err(|e| {
            tracing::debug!("Connecting to {} failed: {}", peer, e);
            unreachable()
        })?;

        tracing::debug!("Session open: {} -> {}", local, peer);

        Ok(Self {
            socket: Some(socket),
            peer,
            codec: WireCodec::new(config.descriptor),
            policy: config.retry_policy(),
        })
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn is_closed(&self) -> bool {
        self.socket.is_none()
    }

    /// Release the socket. Returns `false` if it was already released.
    pub fn close(&mut self) -> bool {
        match self.socket.take() {
            Some(socket) => {
                drop(socket);
                tracing::debug!("Session to {} closed", self.peer);
                true
            }
            None => false,
        }
    }

    /// Send `request` and return a reply of exactly `expected_len` bytes.
    ///
    /// The session is closed when this returns.
    pub async fn exchange(&mut self, request: &[u8], expected_len: usize) -> Result<Vec<u8>, TokenWireError> {
        let result = self.round_trip(request, expected_len).await;
        self.close();
        result
    }

    async fn round_trip(&self, request: &[u8], expected_len: usize) -> Result<Vec<u8>, TokenWireError> {
        let socket = self.socket.as_ref().ok_or(NetworkError::SessionClosed)?;
        let max_attempts = self.policy.max_attempts;

        let response = with_retries(self.policy, move |attempt| async move {
            tracing::debug!(
                "Sending {} bytes to {} (attempt {}/{})",
                request.len(),
                self.peer,
                attempt,
                max_attempts
            );
            socket.send(request).await.map_err(|e| NetworkError::SendFailed {
                reason: e.to_string(),
            })?;

            let mut buf = vec![0u8; BUFFER_SIZE];
            let len = socket.recv(&mut buf).await.map_err(|e| NetworkError::ReceiveFailed {
                reason: e.to_string(),
            })?;
            buf.truncate(len);
            Ok::<_, NetworkError>(buf)
        })
        .await
        .map_err(|e| match e {
            RetryError::Exhausted { attempts } => NetworkError::TooManyAttempts { attempts },
            RetryError::Failed(e) => e,
        })?;

        tracing::debug!("Received {} bytes: {}", response.len(), hex::encode(&response));
        self.classify(response, expected_len)
    }

    /// Error frame first, then exact length
    fn classify(&self, response: Vec<u8>, expected_len: usize) -> Result<Vec<u8>, TokenWireError> {
        if response.len() == self.codec.descriptor().error_frame_len() {
            let decoded = self.codec.decode(&Layout::error_frame(), &response)?;
            if let [FieldValue::MessageType(msg_type), FieldValue::ErrorCode(code)] = decoded.fields() {
                return Err(ProtocolError::ServerError {
                    msg_type: *msg_type,
                    code: *code,
                }
                .into());
            }
        }

        if response.len() != expected_len {
            return Err(ProtocolError::MalformedMessage {
                expected: expected_len,
                got: response.len(),
            }
            .into());
        }

        Ok(response)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}
