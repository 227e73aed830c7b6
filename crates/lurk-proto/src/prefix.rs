//! IRC message prefix.
//!
//! A prefix identifies the origin of a message: either a server name or a
//! user's nick!user@host mask.

use std::fmt;

/// IRC message prefix - identifies the origin of a message.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum Prefix {
    /// Server name (e.g., "irc.example.com")
    ServerName(String),
    /// User prefix: (nickname, username, hostname)
    Nickname(String, String, String),
}

impl Prefix {
    /// Parse a prefix string into a Prefix.
    ///
    /// This is a lenient parser that does not validate the components.
    pub fn new_from_str(s: &str) -> Self {
        // nick!user@host beats servername; a dot before any ! or @ means server
        if let Some(at) = s.find('@') {
            let (before, host) = (&s[..at], &s[at + 1..]);
            let (nick, user) = match before.find('!') {
                Some(bang) => (&before[..bang], &before[bang + 1..]),
                None => (before, ""),
            };
            Prefix::Nickname(nick.to_owned(), user.to_owned(), host.to_owned())
        } else if let Some(bang) = s.find('!') {
            Prefix::Nickname(s[..bang].to_owned(), s[bang + 1..].to_owned(), String::new())
        } else if s.contains('.') {
            Prefix::ServerName(s.to_owned())
        } else {
            Prefix::Nickname(s.to_owned(), String::new(), String::new())
        }
    }

    /// Get the nickname if this is a user prefix.
    pub fn nick(&self) -> Option<&str> {
        match self {
            Prefix::Nickname(nick, _, _) if !nick.is_empty() => Some(nick),
            _ => None,
        }
    }

    /// Get the hostname.
    pub fn host(&self) -> Option<&str> {
        match self {
            Prefix::ServerName(name) => Some(name),
            Prefix::Nickname(_, _, host) if !host.is_empty() => Some(host),
            _ => None,
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::ServerName(name) => write!(f, "{}", name),
            Prefix::Nickname(nick, user, host) => {
                write!(f, "{}", nick)?;
                if !user.is_empty() {
                    write!(f, "!{}", user)?;
                }
                if !host.is_empty() {
                    write!(f, "@{}", host)?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Prefix {
    fn from(s: &str) -> Self {
        Prefix::new_from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server_name() {
        let p = Prefix::new_from_str("irc.example.com");
        assert_eq!(p, Prefix::ServerName("irc.example.com".into()));
    }

    #[test]
    fn test_parse_nick_user_host() {
        let p = Prefix::new_from_str("nick!user@host.com");
        assert_eq!(
            p,
            Prefix::Nickname("nick".into(), "user".into(), "host.com".into())
        );
        assert_eq!(p.nick(), Some("nick"));
        assert_eq!(p.host(), Some("host.com"));
    }

    #[test]
    fn test_parse_nick_only() {
        let p = Prefix::new_from_str("nickname");
        assert_eq!(p, Prefix::Nickname("nickname".into(), "".into(), "".into()));
        assert_eq!(p.nick(), Some("nickname"));
        assert_eq!(p.host(), None);
    }

    #[test]
    fn test_display_round_trip() {
        for raw in ["irc.example.com", "nick!user@host.com", "nickname"] {
            assert_eq!(Prefix::new_from_str(raw).to_string(), raw);
        }
    }
}
