//! IRC command types.
//!
//! Type-safe representations of the client-protocol subset this library
//! speaks. Unknown commands are captured in the `Raw` variant rather than
//! rejected, so a single unrecognized server line never faults a connection.
//!
//! # Reference
//! - RFC 2812: Internet Relay Chat: Client Protocol

use std::fmt::{self, Write};

use crate::error::MessageParseError;

/// Numeric reply: welcome message sent after successful registration.
pub const RPL_WELCOME: u16 = 1;

/// Numeric reply: the requested nickname is already in use.
pub const ERR_NICKNAMEINUSE: u16 = 433;

/// IRC command with its parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Command {
    /// `PASS password`
    PASS(String),
    /// `NICK nickname`
    NICK(String),
    /// `USER username mode realname`
    USER(String, String, String),
    /// `JOIN channel [key]`
    JOIN(String, Option<String>),
    /// `PRIVMSG target text`
    PRIVMSG(String, String),
    /// `KICK channel user [comment]`
    KICK(String, String, Option<String>),
    /// `PING token [server2]`
    PING(String, Option<String>),
    /// `PONG token [server2]`
    PONG(String, Option<String>),
    /// Numeric reply from the server: `<code> <params...>`.
    Response(u16, Vec<String>),
    /// Any command this library does not model.
    Raw(String, Vec<String>),
}

impl Command {
    /// Construct a `Command` from a command token and its parameters.
    ///
    /// Numeric tokens become [`Command::Response`]; unrecognized names
    /// become [`Command::Raw`].
    pub fn new(cmd: &str, params: Vec<&str>) -> Result<Command, MessageParseError> {
        let owned = |s: &&str| (*s).to_owned();

        let missing = |command: &'static str, expected: usize| MessageParseError::MissingParams {
            command,
            expected,
            actual: params.len(),
        };

        Ok(
            if cmd.len() == 3 && cmd.chars().all(|c| c.is_ascii_digit()) {
                let code: u16 = cmd.parse().map_err(|_| MessageParseError::InvalidCommand)?;
                Command::Response(code, params.iter().map(owned).collect())
            } else {
                match cmd.to_ascii_uppercase().as_str() {
                    "PASS" => match params.as_slice() {
                        [pass] => Command::PASS((*pass).to_owned()),
                        _ => return Err(missing("PASS", 1)),
                    },
                    "NICK" => match params.as_slice() {
                        [nick] => Command::NICK((*nick).to_owned()),
                        _ => return Err(missing("NICK", 1)),
                    },
                    "USER" => match params.as_slice() {
                        [user, mode, _unused, realname] => Command::USER(
                            (*user).to_owned(),
                            (*mode).to_owned(),
                            (*realname).to_owned(),
                        ),
                        _ => return Err(missing("USER", 4)),
                    },
                    "JOIN" => match params.as_slice() {
                        [chan] => Command::JOIN((*chan).to_owned(), None),
                        [chan, key, ..] => {
                            Command::JOIN((*chan).to_owned(), Some((*key).to_owned()))
                        }
                        _ => return Err(missing("JOIN", 1)),
                    },
                    "PRIVMSG" => match params.as_slice() {
                        [target, text] => {
                            Command::PRIVMSG((*target).to_owned(), (*text).to_owned())
                        }
                        _ => return Err(missing("PRIVMSG", 2)),
                    },
                    "KICK" => match params.as_slice() {
                        [chan, user] => Command::KICK((*chan).to_owned(), (*user).to_owned(), None),
                        [chan, user, comment, ..] => Command::KICK(
                            (*chan).to_owned(),
                            (*user).to_owned(),
                            Some((*comment).to_owned()),
                        ),
                        _ => return Err(missing("KICK", 2)),
                    },
                    "PING" => match params.as_slice() {
                        [token] => Command::PING((*token).to_owned(), None),
                        [token, server2, ..] => {
                            Command::PING((*token).to_owned(), Some((*server2).to_owned()))
                        }
                        _ => return Err(missing("PING", 1)),
                    },
                    "PONG" => match params.as_slice() {
                        [token] => Command::PONG((*token).to_owned(), None),
                        [token, server2, ..] => {
                            Command::PONG((*token).to_owned(), Some((*server2).to_owned()))
                        }
                        _ => return Err(missing("PONG", 1)),
                    },
                    _ => Command::Raw(cmd.to_owned(), params.iter().map(owned).collect()),
                }
            },
        )
    }
}

/// True when a parameter must be sent as a trailing (`:`-prefixed) argument.
fn needs_colon_prefix(param: &str) -> bool {
    param.is_empty() || param.contains(' ') || param.starts_with(':')
}

/// Write `CMD a b c`, colon-prefixing the final argument only when required.
fn write_cmd(f: &mut fmt::Formatter<'_>, cmd: &str, args: &[&str]) -> fmt::Result {
    f.write_str(cmd)?;
    for (i, arg) in args.iter().enumerate() {
        f.write_char(' ')?;
        if i == args.len() - 1 && needs_colon_prefix(arg) {
            f.write_char(':')?;
        }
        f.write_str(arg)?;
    }
    Ok(())
}

/// Write `CMD a b :c` with the final argument always sent as trailing.
fn write_cmd_trailing(f: &mut fmt::Formatter<'_>, cmd: &str, args: &[&str]) -> fmt::Result {
    f.write_str(cmd)?;
    for (i, arg) in args.iter().enumerate() {
        f.write_char(' ')?;
        if i == args.len() - 1 {
            f.write_char(':')?;
        }
        f.write_str(arg)?;
    }
    Ok(())
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::PASS(p) => write_cmd(f, "PASS", &[p]),
            Command::NICK(n) => write_cmd(f, "NICK", &[n]),
            Command::USER(u, m, r) => write_cmd_trailing(f, "USER", &[u, m, "*", r]),
            Command::JOIN(c, Some(k)) => write_cmd(f, "JOIN", &[c, k]),
            Command::JOIN(c, None) => write_cmd(f, "JOIN", &[c]),
            Command::PRIVMSG(t, m) => write_cmd_trailing(f, "PRIVMSG", &[t, m]),
            Command::KICK(c, n, Some(r)) => write_cmd_trailing(f, "KICK", &[c, n, r]),
            Command::KICK(c, n, None) => write_cmd(f, "KICK", &[c, n]),
            Command::PING(t, Some(s)) => write_cmd(f, "PING", &[t, s]),
            Command::PING(t, None) => write_cmd(f, "PING", &[t]),
            Command::PONG(t, Some(s)) => write_cmd(f, "PONG", &[t, s]),
            Command::PONG(t, None) => write_cmd(f, "PONG", &[t]),
            Command::Response(code, args) => {
                write!(f, "{:03}", code)?;
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                for (i, arg) in args.iter().enumerate() {
                    f.write_char(' ')?;
                    if i == args.len() - 1 && needs_colon_prefix(arg) {
                        f.write_char(':')?;
                    }
                    f.write_str(arg)?;
                }
                Ok(())
            }
            Command::Raw(cmd, args) => {
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                write_cmd(f, cmd, &args)
            }
        }
    }
}
