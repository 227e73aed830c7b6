//! Framed IRC transport over TCP and client-side TLS.

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_util::codec::Framed;
use tracing::warn;

use crate::error::Result;
use crate::irc::IrcCodec;
use crate::Message;

/// IRC transport over a plain or TLS-encrypted client connection.
///
/// Both variants speak the same framed [`IrcCodec`]; callers stay agnostic
/// to which transport a session currently holds. Split into sink and stream
/// halves before driving I/O, so reads can be awaited while writes happen.
#[allow(clippy::large_enum_variant)]
#[non_exhaustive]
pub enum Transport {
    /// Plain TCP transport.
    Tcp {
        /// The framed codec for TCP.
        framed: Framed<TcpStream, IrcCodec>,
    },
    /// Client-side TLS-encrypted transport.
    Tls {
        /// The framed codec for client-side TLS.
        framed: Framed<TlsStream<TcpStream>, IrcCodec>,
    },
}

/// Write half of a split [`Transport`].
pub enum TransportSink {
    /// Write half of a plain TCP transport.
    Tcp(SplitSink<Framed<TcpStream, IrcCodec>, Message>),
    /// Write half of a TLS transport.
    Tls(SplitSink<Framed<TlsStream<TcpStream>, IrcCodec>, Message>),
}

/// Read half of a split [`Transport`].
pub enum TransportStream {
    /// Read half of a plain TCP transport.
    Tcp(SplitStream<Framed<TcpStream, IrcCodec>>),
    /// Read half of a TLS transport.
    Tls(SplitStream<Framed<TlsStream<TcpStream>, IrcCodec>>),
}

impl Transport {
    /// Create a new TCP transport from a connected stream.
    pub fn tcp(stream: TcpStream) -> Self {
        if let Err(e) = Self::enable_keepalive(&stream) {
            warn!("failed to enable TCP keepalive: {}", e);
        }

        Self::Tcp {
            framed: Framed::new(stream, IrcCodec::new()),
        }
    }

    /// Create a new client-side TLS transport from an established TLS stream.
    pub fn tls(stream: TlsStream<TcpStream>) -> Self {
        Self::Tls {
            framed: Framed::new(stream, IrcCodec::new()),
        }
    }

    fn enable_keepalive(stream: &TcpStream) -> std::io::Result<()> {
        use socket2::{SockRef, TcpKeepalive};
        use std::time::Duration;

        let sock = SockRef::from(stream);
        let keepalive = TcpKeepalive::new()
            .with_time(Duration::from_secs(120))
            .with_interval(Duration::from_secs(30));

        sock.set_tcp_keepalive(&keepalive)
    }

    /// Check if this transport uses TLS encryption.
    pub fn is_tls(&self) -> bool {
        matches!(self, Self::Tls { .. })
    }

    /// Split into independently usable write and read halves.
    pub fn split(self) -> (TransportSink, TransportStream) {
        match self {
            Transport::Tcp { framed } => {
                let (sink, stream) = framed.split();
                (TransportSink::Tcp(sink), TransportStream::Tcp(stream))
            }
            Transport::Tls { framed } => {
                let (sink, stream) = framed.split();
                (TransportSink::Tls(sink), TransportStream::Tls(stream))
            }
        }
    }
}

impl TransportSink {
    /// Write an IRC message to the transport.
    pub async fn write_message(&mut self, message: &Message) -> Result<()> {
        match self {
            TransportSink::Tcp(sink) => sink.send(message.clone()).await,
            TransportSink::Tls(sink) => sink.send(message.clone()).await,
        }
    }
}

impl TransportStream {
    /// Read the next IRC message from the transport.
    ///
    /// Returns `Ok(None)` when the connection is closed.
    pub async fn read_message(&mut self) -> Result<Option<Message>> {
        macro_rules! read_framed {
            ($stream:expr) => {
                match $stream.next().await {
                    Some(Ok(msg)) => Ok(Some(msg)),
                    Some(Err(e)) => Err(e),
                    None => Ok(None),
                }
            };
        }

        match self {
            TransportStream::Tcp(stream) => read_framed!(stream),
            TransportStream::Tls(stream) => read_framed!(stream),
        }
    }
}
