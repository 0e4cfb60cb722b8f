//! Persistent TCP connection with a dedicated receive task.

use crate::error::TransportError;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Fixed size of one receive-loop read.
///
/// One read is not one message: payloads larger than this arrive as
/// multiple chunks and are not reassembled by this layer.
pub const RECV_BUFFER_SIZE: usize = 256;

/// Default timeout for connection establishment.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Trait for receiving raw bytes from the connection's receive task.
pub trait ChunkReceiver: Send + Sync {
    /// Called with the bytes of one read, on the receive task.
    ///
    /// # Arguments
    /// * `chunk` - The bytes returned by one read; never empty
    fn on_chunk(&self, chunk: &[u8]);

    /// Called exactly once when the receive task stops on EOF or an IO
    /// error. Not called when the connection is closed locally.
    ///
    /// # Arguments
    /// * `reason` - `Closed` for peer EOF, `Io` for a read failure
    fn on_closed(&self, _reason: TransportError) {}
}

/// Wrapper to convert a closure into a ChunkReceiver.
pub struct FnReceiver<F> {
    receiver: F,
}

impl<F> FnReceiver<F>
where
    F: Fn(&[u8]) + Send + Sync,
{
    /// Creates a new function receiver.
    pub fn new(receiver: F) -> Self {
        Self { receiver }
    }
}

impl<F> ChunkReceiver for FnReceiver<F>
where
    F: Fn(&[u8]) + Send + Sync,
{
    fn on_chunk(&self, chunk: &[u8]) {
        (self.receiver)(chunk);
    }
}

/// Persistent TCP connection to one server.
///
/// Owns the socket's write half; the read half lives on a spawned receive
/// task that hands every read to the receiver injected at connect time.
/// `close` cancels the receive task cooperatively, interrupting an
/// in-flight read.
pub struct Connection {
    writer: tokio::sync::Mutex<OwnedWriteHalf>,
    cancel: CancellationToken,
    recv_task: Mutex<Option<JoinHandle<()>>>,
    peer_addr: std::net::SocketAddr,
}

impl Connection {
    /// Connects to `host:port` with the default timeout.
    ///
    /// On success the connection immediately sends a single space character
    /// as a handshake probe, then starts the receive task with `receiver`
    /// installed.
    ///
    /// # Errors
    /// Returns `TransportError::Connect` if the remote is unreachable or
    /// the address is invalid, and `ConnectTimeout` on timeout.
    pub async fn connect(
        host: &str,
        port: u16,
        receiver: Arc<dyn ChunkReceiver>,
    ) -> Result<Self, TransportError> {
        Self::connect_with_timeout(host, port, DEFAULT_CONNECT_TIMEOUT, receiver).await
    }

    /// Connects to `host:port` with an explicit timeout.
    ///
    /// # Errors
    /// Returns `TransportError` if connection fails.
    pub async fn connect_with_timeout(
        host: &str,
        port: u16,
        timeout: Duration,
        receiver: Arc<dyn ChunkReceiver>,
    ) -> Result<Self, TransportError> {
        let stream = tokio::time::timeout(timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| TransportError::ConnectTimeout)?
            .map_err(TransportError::Connect)?;

        stream.set_nodelay(true)?;
        let peer_addr = stream.peer_addr()?;

        let (reader, mut writer) = stream.into_split();

        // Handshake probe; also unblocks a read-first loop on the peer.
        writer.write_all(b" ").await?;

        let cancel = CancellationToken::new();
        let task = tokio::spawn(recv_loop(reader, receiver, cancel.clone()));

        tracing::info!(peer = %peer_addr, "connected");

        Ok(Self {
            writer: tokio::sync::Mutex::new(writer),
            cancel,
            recv_task: Mutex::new(Some(task)),
            peer_addr,
        })
    }

    /// Sends `text` as UTF-8 bytes, written fully to the stream.
    ///
    /// # Errors
    /// Returns `TransportError::Closed` if the connection was closed, and
    /// `Io` if the write fails.
    pub async fn send(&self, text: &str) -> Result<(), TransportError> {
        if self.cancel.is_cancelled() {
            return Err(TransportError::Closed);
        }

        let mut writer = self.writer.lock().await;
        writer.write_all(text.as_bytes()).await?;
        Ok(())
    }

    /// Closes the connection.
    ///
    /// Cancels the receive task; an in-flight read is interrupted rather
    /// than awaited. Idempotent.
    pub fn close(&self) {
        if !self.cancel.is_cancelled() {
            tracing::info!(peer = %self.peer_addr, "closing connection");
        }
        self.cancel.cancel();
    }

    /// Returns true once `close` has been called or the receive task has
    /// stopped on EOF or an IO error.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Waits for the receive task to terminate.
    ///
    /// Returns immediately if the task already finished or was awaited
    /// before.
    pub async fn closed(&self) {
        let task = self.recv_task.lock().take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }

    /// Returns the peer address.
    #[must_use]
    pub fn peer_addr(&self) -> std::net::SocketAddr {
        self.peer_addr
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Receive loop: one fixed-size read per iteration, raced against the
/// cancellation token. EOF and read errors are reported once through
/// `on_closed`, then the loop exits and the read half is dropped.
async fn recv_loop(
    mut reader: OwnedReadHalf,
    receiver: Arc<dyn ChunkReceiver>,
    cancel: CancellationToken,
) {
    let mut buf = [0u8; RECV_BUFFER_SIZE];

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("receive task cancelled");
                break;
            }
            read = reader.read(&mut buf) => match read {
                Ok(0) => {
                    tracing::info!("peer closed connection");
                    receiver.on_closed(TransportError::Closed);
                    cancel.cancel();
                    break;
                }
                Ok(n) => receiver.on_chunk(&buf[..n]),
                Err(e) => {
                    tracing::error!(error = %e, "receive failed");
                    receiver.on_closed(TransportError::Io(e));
                    cancel.cancel();
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    const TIMEOUT: Duration = Duration::from_secs(5);

    struct NullReceiver;

    impl ChunkReceiver for NullReceiver {
        fn on_chunk(&self, _chunk: &[u8]) {}
    }

    struct CountingReceiver {
        chunks: mpsc::UnboundedSender<Vec<u8>>,
        closed: AtomicUsize,
    }

    impl CountingReceiver {
        fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Vec<u8>>) {
            let (tx, rx) = mpsc::unbounded_channel();
            (
                Arc::new(Self {
                    chunks: tx,
                    closed: AtomicUsize::new(0),
                }),
                rx,
            )
        }
    }

    impl ChunkReceiver for CountingReceiver {
        fn on_chunk(&self, chunk: &[u8]) {
            let _ = self.chunks.send(chunk.to_vec());
        }

        fn on_closed(&self, _reason: TransportError) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn local_listener() -> (TcpListener, u16) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, port)
    }

    #[tokio::test]
    async fn test_connect_sends_handshake_probe() {
        let (listener, port) = local_listener().await;

        let conn = Connection::connect("127.0.0.1", port, Arc::new(NullReceiver))
            .await
            .unwrap();

        let (mut server, _) = listener.accept().await.unwrap();
        let mut byte = [0u8; 1];
        server.read_exact(&mut byte).await.unwrap();
        assert_eq!(byte[0], b' ');

        conn.close();
    }

    #[tokio::test]
    async fn test_send_writes_text_after_probe() {
        let (listener, port) = local_listener().await;

        let conn = Connection::connect("127.0.0.1", port, Arc::new(NullReceiver))
            .await
            .unwrap();
        conn.send("hello").await.unwrap();

        let (mut server, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 6];
        server.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b" hello");

        conn.close();
    }

    #[tokio::test]
    async fn test_receive_delivers_chunks() {
        let (listener, port) = local_listener().await;
        let (tx, mut chunks) = mpsc::unbounded_channel();
        let receiver = Arc::new(FnReceiver::new(move |chunk: &[u8]| {
            let _ = tx.send(chunk.to_vec());
        }));

        let conn = Connection::connect("127.0.0.1", port, receiver).await.unwrap();

        let (mut server, _) = listener.accept().await.unwrap();
        server.write_all(b"payload").await.unwrap();

        let chunk = tokio::time::timeout(TIMEOUT, chunks.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(chunk, b"payload");

        conn.close();
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let (listener, port) = local_listener().await;
        drop(listener);

        let result = Connection::connect("127.0.0.1", port, Arc::new(NullReceiver)).await;
        assert!(matches!(result, Err(TransportError::Connect(_))));
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_stops_task() {
        let (listener, port) = local_listener().await;

        let conn = Connection::connect("127.0.0.1", port, Arc::new(NullReceiver))
            .await
            .unwrap();
        let (_server, _) = listener.accept().await.unwrap();

        conn.close();
        conn.close();
        assert!(conn.is_closed());

        tokio::time::timeout(TIMEOUT, conn.closed()).await.unwrap();
        // Second wait returns immediately.
        tokio::time::timeout(TIMEOUT, conn.closed()).await.unwrap();
    }

    #[tokio::test]
    async fn test_send_after_close_fails() {
        let (listener, port) = local_listener().await;

        let conn = Connection::connect("127.0.0.1", port, Arc::new(NullReceiver))
            .await
            .unwrap();
        let (_server, _) = listener.accept().await.unwrap();

        conn.close();
        let result = conn.send("late").await;
        assert!(matches!(result, Err(TransportError::Closed)));
    }

    #[tokio::test]
    async fn test_peer_eof_reports_closed_once() {
        let (listener, port) = local_listener().await;
        let (receiver, _chunks) = CountingReceiver::new();

        let conn = Connection::connect("127.0.0.1", port, receiver.clone())
            .await
            .unwrap();

        let (server, _) = listener.accept().await.unwrap();
        drop(server);

        tokio::time::timeout(TIMEOUT, conn.closed()).await.unwrap();
        assert_eq!(receiver.closed.load(Ordering::SeqCst), 1);
        assert!(conn.is_closed());
    }
}
