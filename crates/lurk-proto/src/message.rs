//! IRC message parsing and construction.
//!
//! A [`Message`] is the parsed form of one protocol line: an optional
//! prefix identifying the origin, and a command with its parameters.
//! Parsing uses nom; serialization goes through `Display` and appends the
//! `\r\n` terminator.
//!
//! IRCv3 tags are tolerated on incoming lines but discarded: this library
//! never negotiates capabilities, so no conforming server will send them.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use nom::{
    bytes::complete::{take_until, take_while1},
    character::complete::{char, space0},
    combinator::opt,
    error::ErrorKind,
    sequence::preceded,
    IResult,
};

use crate::command::Command;
use crate::error::{MessageParseError, ProtocolError};
use crate::prefix::Prefix;

/// An owned IRC message.
///
/// # Example
///
/// ```
/// use lurk_proto::Message;
///
/// // Parse a message
/// let msg: Message = ":nick!user@host PRIVMSG #channel :Hello!".parse().unwrap();
///
/// // Construct a message
/// let msg = Message::privmsg("#channel", "Hello!");
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct Message {
    /// Message prefix/source (e.g., `nick!user@host`).
    pub prefix: Option<Prefix>,
    /// The IRC command and its parameters.
    pub command: Command,
}

impl Message {
    /// Get the nickname from the message prefix, if present.
    pub fn source_nickname(&self) -> Option<&str> {
        self.prefix.as_ref().and_then(Prefix::nick)
    }

    /// Create a PRIVMSG message to a target with text.
    #[must_use]
    pub fn privmsg<T, M>(target: T, text: M) -> Self
    where
        T: Into<String>,
        M: Into<String>,
    {
        Command::PRIVMSG(target.into(), text.into()).into()
    }

    /// Create a JOIN message for a channel.
    #[must_use]
    pub fn join<C>(channel: C) -> Self
    where
        C: Into<String>,
    {
        Command::JOIN(channel.into(), None).into()
    }

    /// Create a JOIN message for a channel with a key.
    #[must_use]
    pub fn join_with_key<C, K>(channel: C, key: K) -> Self
    where
        C: Into<String>,
        K: Into<String>,
    {
        Command::JOIN(channel.into(), Some(key.into())).into()
    }

    /// Create a NICK message to change nickname.
    #[must_use]
    pub fn nick<N>(nickname: N) -> Self
    where
        N: Into<String>,
    {
        Command::NICK(nickname.into()).into()
    }

    /// Create a PASS message carrying the server password.
    #[must_use]
    pub fn pass<P>(password: P) -> Self
    where
        P: Into<String>,
    {
        Command::PASS(password.into()).into()
    }

    /// Create a USER message for registration.
    #[must_use]
    pub fn user<U, R>(username: U, realname: R) -> Self
    where
        U: Into<String>,
        R: Into<String>,
    {
        Command::USER(username.into(), "0".into(), realname.into()).into()
    }

    /// Create a PONG message in response to a PING.
    #[must_use]
    pub fn pong<T>(token: T) -> Self
    where
        T: Into<String>,
    {
        Command::PONG(token.into(), None).into()
    }
}

impl From<Command> for Message {
    fn from(cmd: Command) -> Message {
        Message {
            prefix: None,
            command: cmd,
        }
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(ref prefix) = self.prefix {
            write!(f, ":{} ", prefix)?;
        }
        write!(f, "{}\r\n", self.command)
    }
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Message, Self::Err> {
        if s.is_empty() {
            return Err(ProtocolError::InvalidMessage {
                string: s.to_owned(),
                cause: MessageParseError::EmptyMessage,
            });
        }

        let invalid = |cause| ProtocolError::InvalidMessage {
            string: s.to_owned(),
            cause,
        };

        let (_rest, split) =
            split_message(s).map_err(|_| invalid(MessageParseError::InvalidCommand))?;

        let prefix = split.prefix.map(Prefix::new_from_str);
        let command = Command::new(split.command, split.params).map_err(invalid)?;

        Ok(Message { prefix, command })
    }
}

/// A raw message split into its components, borrowing from the input.
struct SplitMessage<'a> {
    prefix: Option<&'a str>,
    command: &'a str,
    params: Vec<&'a str>,
}

/// Skip IRCv3 message tags (the part after `@` and before the first space).
fn split_tags(input: &str) -> IResult<&str, &str> {
    preceded(char('@'), take_until(" "))(input)
}

/// Take the message prefix (the part after `:` and before the first space).
fn split_prefix(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), take_while1(|c| c != ' '))(input)
}

/// Take the command token (1*letter or 3digit).
fn split_command(input: &str) -> IResult<&str, &str> {
    let (rest, cmd) = take_while1(|c: char| c.is_alphanumeric())(input)?;

    // RFC 2812: command = 1*letter / 3digit
    let is_all_letters = cmd.chars().all(|c| c.is_ascii_alphabetic());
    let is_three_digits = cmd.len() == 3 && cmd.chars().all(|c| c.is_ascii_digit());

    if is_all_letters || is_three_digits {
        Ok((rest, cmd))
    } else {
        Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::AlphaNumeric,
        )))
    }
}

/// Split parameters from the remaining input after the command.
///
/// Handles regular space-separated parameters and the trailing parameter
/// (prefixed with `:`) which may contain spaces. Runs of spaces count as a
/// single separator.
fn split_params(input: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut rest = input;

    while rest.as_bytes().first() == Some(&b' ') {
        while rest.as_bytes().first() == Some(&b' ') {
            rest = &rest[1..];
        }

        if rest.is_empty() || rest.starts_with('\r') || rest.starts_with('\n') {
            break;
        }

        if let Some(after_colon) = rest.strip_prefix(':') {
            // Trailing parameter - everything until line end
            let end = after_colon.find(['\r', '\n']).unwrap_or(after_colon.len());
            params.push(&after_colon[..end]);
            break;
        }

        let end = rest.find([' ', '\r', '\n']).unwrap_or(rest.len());
        params.push(&rest[..end]);
        rest = &rest[end..];
    }

    params
}

/// Split a complete IRC line into its components.
///
/// ```text
/// [@tags] [:prefix] <command> [params...] [:trailing]
/// ```
fn split_message(input: &str) -> IResult<&str, SplitMessage<'_>> {
    let (input, _tags) = opt(split_tags)(input)?;
    let (input, _) = space0(input)?;

    let (input, prefix) = opt(split_prefix)(input)?;
    let (input, _) = space0(input)?;

    let (input, command) = split_command(input)?;
    let params = split_params(input);

    Ok((
        "",
        SplitMessage {
            prefix,
            command,
            params,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::RPL_WELCOME;

    #[test]
    fn test_parse_privmsg_with_prefix() {
        let msg: Message = ":nick!user@host PRIVMSG #channel :Hello".parse().unwrap();
        assert_eq!(msg.source_nickname(), Some("nick"));
        assert_eq!(
            msg.command,
            Command::PRIVMSG("#channel".into(), "Hello".into())
        );
    }

    #[test]
    fn test_parse_numeric_welcome() {
        let msg: Message = ":server 001 bot :Welcome to the network".parse().unwrap();
        assert_eq!(msg.prefix, Some(Prefix::ServerName("server".into())));
        assert_eq!(
            msg.command,
            Command::Response(
                RPL_WELCOME,
                vec!["bot".into(), "Welcome to the network".into()]
            )
        );
    }

    #[test]
    fn test_parse_ping_strips_marker() {
        let msg: Message = "PING :abc123".parse().unwrap();
        assert_eq!(msg.command, Command::PING("abc123".into(), None));
    }

    #[test]
    fn test_parse_kick() {
        let msg: Message = ":op!o@h KICK #room bot :flooding".parse().unwrap();
        assert_eq!(
            msg.command,
            Command::KICK("#room".into(), "bot".into(), Some("flooding".into()))
        );
    }

    #[test]
    fn test_parse_with_crlf() {
        let msg: Message = "PING :server\r\n".parse().unwrap();
        assert_eq!(msg.command, Command::PING("server".into(), None));
    }

    #[test]
    fn test_parse_tags_are_discarded() {
        let msg: Message = "@time=2023-01-01T00:00:00Z :nick PRIVMSG #ch :Hi"
            .parse()
            .unwrap();
        assert_eq!(msg.command, Command::PRIVMSG("#ch".into(), "Hi".into()));
    }

    #[test]
    fn test_parse_empty_is_error() {
        assert!("".parse::<Message>().is_err());
    }

    #[test]
    fn test_parse_garbage_is_error() {
        assert!("12".parse::<Message>().is_err());
        assert!("1234 x".parse::<Message>().is_err());
    }

    #[test]
    fn test_privmsg_round_trip() {
        let msg = Message::privmsg("#room", "hello there");
        let raw = msg.to_string();
        assert_eq!(raw, "PRIVMSG #room :hello there\r\n");

        let parsed: Message = raw.parse().unwrap();
        assert_eq!(parsed.command, msg.command);
    }

    #[test]
    fn test_user_message_wire_format() {
        let msg = Message::user("bot", "bot");
        assert_eq!(msg.to_string(), "USER bot 0 * :bot\r\n");
    }

    #[test]
    fn test_multiple_spaces_between_params() {
        let msg: Message = ":server  001  bot  :Welcome".parse().unwrap();
        assert_eq!(
            msg.command,
            Command::Response(RPL_WELCOME, vec!["bot".into(), "Welcome".into()])
        );
    }
}
