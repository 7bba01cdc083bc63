//! In-process UDP token server for tests

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

/// Replies to each datagram with whatever the handler returns.
///
/// The handler gets the 0-based index of the datagram and its bytes; `None`
/// drops the datagram without a reply.
pub(crate) struct MockServer {
    pub addr: SocketAddr,
    received: Arc<Mutex<Vec<Vec<u8>>>>,
    task: JoinHandle<()>,
}

impl MockServer {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(usize, &[u8]) -> Option<Vec<u8>> + Send + 'static,
    {
        let socket = UdpSocket::bind("127.0.0.1:0").await.expect("bind mock server");
        let addr = socket.local_addr().expect("mock server addr");
        let received = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&received);

        let task = tokio::spawn(async move {
            let mut buf = [0u8; 2048];
            loop {
                let Ok((len, from)) = socket.recv_from(&mut buf).await else {
                    return;
                };
                let index = {
                    let mut log = log.lock().expect("mock log");
                    log.push(buf[..len].to_vec());
                    log.len() - 1
                };
                if let Some(reply) = handler(index, &buf[..len]) {
                    let _ = socket.send_to(&reply, from).await;
                }
            }
        });

        Self { addr, received, task }
    }

    /// Silent server: never replies
    pub async fn silent() -> Self {
        Self::start(|_, _| None).await
    }

    pub fn received(&self) -> Vec<Vec<u8>> {
        self.received.lock().expect("mock log").clone()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
