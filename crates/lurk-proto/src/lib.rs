//! # lurk-proto
//!
//! A small Rust library for parsing and serializing IRC client-protocol
//! messages, with framed tokio transports over TCP and TLS.
//!
//! The surface is deliberately narrow: the command subset a responding bot
//! needs (registration, channel join, ping/pong, channel messages, kick
//! notices), a buffering line codec, and a transport enum that hides
//! plain-vs-TLS from the session layer.
//!
//! ## Quick Start
//!
//! ```rust
//! use lurk_proto::{Command, Message};
//!
//! // Construct messages
//! let join = Message::join_with_key("#channel", "sekrit");
//! let reply = Message::privmsg("#channel", "Hello, world!");
//!
//! // Parse a server line
//! let msg: Message = ":nick!user@host PRIVMSG #channel :Hello!".parse().unwrap();
//! assert!(matches!(msg.command, Command::PRIVMSG(_, _)));
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod command;
pub mod error;
#[cfg(feature = "tokio")]
pub mod irc;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;
pub mod prefix;
#[cfg(feature = "tokio")]
pub mod transport;

pub use self::command::{Command, ERR_NICKNAMEINUSE, RPL_WELCOME};
pub use self::error::ProtocolError;
#[cfg(feature = "tokio")]
pub use self::irc::IrcCodec;
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;
pub use self::message::Message;
pub use self::prefix::Prefix;
#[cfg(feature = "tokio")]
pub use self::transport::{Transport, TransportSink, TransportStream};
