//! WebSocket peers over `tokio-tungstenite`.
//!
//! The stream is split after the upgrade. Each half sits behind its own
//! lock, so a reader parked in `next_frame` never delays `send_frame`.

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use crate::{FrameStream, Handshake, Listener, PeerId, TransportError};

type Socket = WebSocketStream<TcpStream>;

/// How long a new connection gets to send its upgrade request.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Accepts WebSocket peers on a TCP port.
pub struct WsListener {
    tcp: TcpListener,
    handshake_timeout: Duration,
}

impl WsListener {
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let tcp = TcpListener::bind(addr)
            .await
            .map_err(|source| TransportError::Bind {
                addr: addr.to_owned(),
                source,
            })?;
        tracing::info!(addr, "listening for websocket peers");
        Ok(Self {
            tcp,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        })
    }

    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }
}

impl Listener for WsListener {
    type Incoming = WsIncoming;

    async fn accept(&mut self) -> Result<WsIncoming, TransportError> {
        let (stream, addr) = self.tcp.accept().await.map_err(TransportError::Accept)?;
        tracing::trace!(%addr, "tcp connection accepted");
        Ok(WsIncoming {
            stream,
            addr,
            timeout: self.handshake_timeout,
        })
    }

    fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.tcp.local_addr()
    }
}

/// A TCP connection waiting for its WebSocket upgrade.
pub struct WsIncoming {
    stream: TcpStream,
    addr: SocketAddr,
    timeout: Duration,
}

impl Handshake for WsIncoming {
    type Peer = WsPeer;

    async fn upgrade(self) -> Result<WsPeer, TransportError> {
        let addr = self.addr;
        let socket = tokio::time::timeout(self.timeout, tokio_tungstenite::accept_async(self.stream))
            .await
            .map_err(|_| TransportError::HandshakeTimeout(self.timeout))?
            .map_err(|e| TransportError::Upgrade(e.to_string()))?;

        let id = PeerId::next();
        tracing::debug!(peer = %id, %addr, "websocket peer connected");

        let (sink, stream) = socket.split();
        Ok(WsPeer {
            id,
            addr,
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
        })
    }

    fn peer_addr(&self) -> SocketAddr {
        self.addr
    }
}

/// One upgraded WebSocket connection.
pub struct WsPeer {
    id: PeerId,
    addr: SocketAddr,
    sink: Mutex<SplitSink<Socket, Message>>,
    stream: Mutex<SplitStream<Socket>>,
}

fn socket_error(e: WsError) -> TransportError {
    match e {
        WsError::ConnectionClosed | WsError::AlreadyClosed => TransportError::Closed,
        other => TransportError::Socket(other.to_string()),
    }
}

impl FrameStream for WsPeer {
    async fn send_frame(&self, frame: &str) -> Result<(), TransportError> {
        let mut sink = self.sink.lock().await;
        sink.send(Message::Text(frame.to_owned().into())).await.map_err(socket_error)
    }

    async fn next_frame(&self) -> Result<Option<String>, TransportError> {
        let mut stream = self.stream.lock().await;
        while let Some(message) = stream.next().await {
            match message.map_err(socket_error)? {
                Message::Text(text) => return Ok(Some(text.as_str().to_owned())),
                // Some browsers' helpers ship JSON as binary.
                Message::Binary(bytes) => {
                    return String::from_utf8(bytes.to_vec())
                        .map(Some)
                        .map_err(|_| TransportError::NotText);
                }
                Message::Close(_) => return Ok(None),
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
        Ok(None)
    }

    async fn close(&self) -> Result<(), TransportError> {
        let mut sink = self.sink.lock().await;
        match sink.close().await {
            Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(socket_error(e)),
        }
    }

    fn peer_id(&self) -> PeerId {
        self.id
    }

    fn peer_addr(&self) -> SocketAddr {
        self.addr
    }
}
