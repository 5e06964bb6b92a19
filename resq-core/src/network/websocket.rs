// SPDX-FileCopyrightText: 2026 Resq Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! WebSocket Transport
//!
//! Real transport implementation using tungstenite. Frames are JSON text
//! (the dispatch server speaks the `{type, data}` envelope). Supports
//! both native-tls and rustls TLS backends.

use std::net::TcpStream;
use std::time::Duration;

use log::warn;

#[cfg(all(feature = "network-native-tls", not(feature = "network-rustls")))]
use native_tls::TlsConnector;

#[cfg(feature = "network-rustls")]
use rustls::pki_types::ServerName;
#[cfg(feature = "network-rustls")]
use std::sync::Arc;

use tungstenite::client::IntoClientRequest;
use tungstenite::protocol::frame::coding::CloseCode;
use tungstenite::protocol::CloseFrame;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

use super::error::NetworkError;
use super::message::{ClientMessage, ServerMessage};
use super::protocol::{decode_message, encode_message, MAX_MESSAGE_SIZE};
use super::transport::{ConnectionState, Transport, TransportConfig, TransportResult};

/// WebSocket transport for the dispatch connection.
///
/// Supports both ws:// (plaintext) and wss:// (TLS) connections.
pub struct WebSocketTransport {
    socket: Option<WebSocket<MaybeTlsStream<TcpStream>>>,
    config: TransportConfig,
    state: ConnectionState,
}

impl WebSocketTransport {
    /// Creates a new WebSocket transport.
    pub fn new() -> Self {
        WebSocketTransport {
            socket: None,
            config: TransportConfig::default(),
            state: ConnectionState::Closed,
        }
    }

    /// Parses a WebSocket URL into host and port.
    fn parse_url(url: &str) -> Result<(String, u16, bool), NetworkError> {
        let is_tls = url.starts_with("wss://");
        let url_without_scheme = url
            .strip_prefix("wss://")
            .or_else(|| url.strip_prefix("ws://"))
            .ok_or_else(|| {
                NetworkError::ConnectionFailed(
                    "Invalid URL scheme (expected ws:// or wss://)".into(),
                )
            })?;

        let host_port = url_without_scheme
            .split('/')
            .next()
            .unwrap_or(url_without_scheme);

        let (host, port) = if let Some(colon_pos) = host_port.rfind(':') {
            let host = &host_port[..colon_pos];
            let port_str = &host_port[colon_pos + 1..];
            let port: u16 = port_str.parse().map_err(|_| {
                NetworkError::ConnectionFailed(format!("Invalid port: {}", port_str))
            })?;
            (host.to_string(), port)
        } else {
            let default_port = if is_tls { 443 } else { 80 };
            (host_port.to_string(), default_port)
        };

        Ok((host, port, is_tls))
    }

    /// Create a TLS stream using native-tls
    #[cfg(all(feature = "network-native-tls", not(feature = "network-rustls")))]
    fn create_tls_stream(
        host: &str,
        tcp_stream: TcpStream,
    ) -> Result<MaybeTlsStream<TcpStream>, NetworkError> {
        let connector = TlsConnector::new()
            .map_err(|e| NetworkError::ConnectionFailed(format!("TLS error: {}", e)))?;
        let tls_stream = connector
            .connect(host, tcp_stream)
            .map_err(|e| NetworkError::ConnectionFailed(format!("TLS handshake failed: {}", e)))?;
        Ok(MaybeTlsStream::NativeTls(tls_stream))
    }

    /// Create a TLS stream using rustls
    #[cfg(feature = "network-rustls")]
    fn create_tls_stream(
        host: &str,
        tcp_stream: TcpStream,
    ) -> Result<MaybeTlsStream<TcpStream>, NetworkError> {
        let mut root_store = rustls::RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let server_name: ServerName<'_> = host.try_into().map_err(|_| {
            NetworkError::ConnectionFailed(format!("Invalid server name: {}", host))
        })?;

        let tls_conn = rustls::ClientConnection::new(Arc::new(config), server_name.to_owned())
            .map_err(|e| NetworkError::ConnectionFailed(format!("TLS setup failed: {}", e)))?;

        let tls_stream = rustls::StreamOwned::new(tls_conn, tcp_stream);
        Ok(MaybeTlsStream::Rustls(tls_stream))
    }
}

impl Default for WebSocketTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for WebSocketTransport {
    fn connect(&mut self, config: &TransportConfig) -> TransportResult<()> {
        if matches!(self.state, ConnectionState::Open) {
            return Ok(());
        }

        self.state = ConnectionState::Connecting;
        self.config = config.clone();

        let (host, port, is_tls) = Self::parse_url(&config.server_url).inspect_err(|_| {
            self.state = ConnectionState::Closed;
        })?;
        let addr = format!("{}:{}", host, port);

        // Connect with an explicit timeout; a hung dial counts as a
        // failed attempt subject to the supervisor's retry policy.
        let socket_addr = std::net::ToSocketAddrs::to_socket_addrs(&addr)
            .map_err(|e| {
                self.state = ConnectionState::Closed;
                NetworkError::ConnectionFailed(e.to_string())
            })?
            .next()
            .ok_or_else(|| {
                self.state = ConnectionState::Closed;
                NetworkError::ConnectionFailed(format!("no address for {}", addr))
            })?;
        let tcp_stream = TcpStream::connect_timeout(
            &socket_addr,
            Duration::from_millis(config.connect_timeout_ms),
        )
        .map_err(|e| {
            self.state = ConnectionState::Closed;
            if e.kind() == std::io::ErrorKind::TimedOut {
                NetworkError::Timeout
            } else {
                NetworkError::ConnectionFailed(e.to_string())
            }
        })?;

        tcp_stream
            .set_read_timeout(Some(Duration::from_millis(config.io_timeout_ms)))
            .map_err(|e| NetworkError::ConnectionFailed(e.to_string()))?;
        tcp_stream
            .set_write_timeout(Some(Duration::from_millis(config.io_timeout_ms)))
            .map_err(|e| NetworkError::ConnectionFailed(e.to_string()))?;

        let stream: MaybeTlsStream<TcpStream> = if is_tls {
            Self::create_tls_stream(&host, tcp_stream).inspect_err(|_| {
                self.state = ConnectionState::Closed;
            })?
        } else {
            MaybeTlsStream::Plain(tcp_stream)
        };

        let request = config
            .server_url
            .as_str()
            .into_client_request()
            .map_err(|e| {
                self.state = ConnectionState::Closed;
                NetworkError::ConnectionFailed(format!("Invalid WebSocket request: {}", e))
            })?;

        let (socket, _response) = tungstenite::client(request, stream).map_err(|e| {
            self.state = ConnectionState::Closed;
            NetworkError::ConnectionFailed(format!("WebSocket handshake failed: {}", e))
        })?;

        self.socket = Some(socket);
        self.state = ConnectionState::Open;

        Ok(())
    }

    fn disconnect(&mut self, code: u16, reason: &str) -> TransportResult<()> {
        if let Some(mut socket) = self.socket.take() {
            self.state = ConnectionState::Closing;
            let frame = CloseFrame {
                code: CloseCode::from(code),
                reason: reason.to_string().into(),
            };
            let _ = socket.close(Some(frame)); // Ignore errors on close
        }
        self.state = ConnectionState::Closed;
        Ok(())
    }

    fn state(&self) -> ConnectionState {
        self.state
    }

    fn send(&mut self, message: &ClientMessage) -> TransportResult<()> {
        let socket = self.socket.as_mut().ok_or(NetworkError::NotConnected)?;

        let encoded = encode_message(message)?;
        if encoded.len() > MAX_MESSAGE_SIZE {
            return Err(NetworkError::InvalidMessage(format!(
                "outbound {} frame exceeds size limit",
                message.kind()
            )));
        }

        socket.send(Message::Text(encoded.into())).map_err(|e| {
            if matches!(
                e,
                tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed
            ) {
                self.state = ConnectionState::Closed;
                NetworkError::ConnectionClosed
            } else {
                NetworkError::SendFailed(e.to_string())
            }
        })?;

        socket
            .flush()
            .map_err(|e| NetworkError::SendFailed(format!("Flush failed: {}", e)))?;

        Ok(())
    }

    fn receive(&mut self) -> TransportResult<Option<ServerMessage>> {
        let socket = self.socket.as_mut().ok_or(NetworkError::NotConnected)?;

        match socket.read() {
            Ok(Message::Text(text)) => match decode_message(text.as_str()) {
                Ok(message) => Ok(Some(message)),
                // Malformed frames are logged and dropped; the session
                // survives.
                Err(e) => {
                    warn!("dropping malformed frame: {}", e);
                    Ok(None)
                }
            },
            Ok(Message::Ping(data)) => {
                let _ = socket.send(Message::Pong(data));
                Ok(None)
            }
            Ok(Message::Pong(_)) => Ok(None),
            Ok(Message::Close(_)) => {
                self.state = ConnectionState::Closed;
                Err(NetworkError::ConnectionClosed)
            }
            Ok(Message::Binary(_)) => {
                warn!("dropping unexpected binary frame");
                Ok(None)
            }
            Ok(Message::Frame(_)) => Ok(None),
            Err(tungstenite::Error::Io(ref e))
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                Ok(None)
            }
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                self.state = ConnectionState::Closed;
                Err(NetworkError::ConnectionClosed)
            }
            Err(e) => Err(NetworkError::ReceiveFailed(e.to_string())),
        }
    }

    fn has_pending(&self) -> bool {
        // WebSocket doesn't provide a non-blocking check easily.
        // Return false; caller should use receive() with timeout.
        false
    }
}
