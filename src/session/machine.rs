//! Sans-IO session state machine.
//!
//! Consumes parsed server messages and timer events, produces actions
//! (messages to send, timers to start, listener dispatches to run). No
//! network calls, no clocks: the driver in [`super`] performs the I/O and
//! owns the delays, which keeps every transition unit-testable.

use lurk_proto::{Command, Message, ERR_NICKNAMEINUSE, RPL_WELCOME};
use tracing::info;

use crate::config::ConnectionConfig;

/// Suffix appended to the nickname on a collision.
const NICK_SUFFIX: char = '_';

/// Connection phase as seen by the state machine.
///
/// Dialing and the reconnect wait are driver concerns; the machine only
/// distinguishes the protocol-visible phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No transport; registration not started.
    Disconnected,
    /// Registration burst sent, waiting for the server's welcome.
    AwaitingRegistration,
    /// Welcome received; channel joins have been issued.
    Registered,
}

/// One-shot timer events, posted back to the machine when their delay elapses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    /// Try to take the configured nickname back after a collision.
    ///
    /// Carries the nickname generation it was scheduled under; if another
    /// collision has bumped the generation since, the event is stale and
    /// must not undo the newer state.
    RevertNick {
        /// Nickname generation at scheduling time.
        generation: u64,
    },
    /// Rejoin a channel after a forced removal.
    Rejoin {
        /// Index into the configured channel list.
        channel: usize,
    },
}

/// Actions produced by the machine. The driver performs them in order.
#[derive(Clone, Debug)]
pub enum Action {
    /// Send this message to the server.
    ///
    /// Boxed to reduce enum size variance.
    Send(Box<Message>),
    /// Start a one-shot timer that posts the event back after its delay.
    Start(TimerEvent),
    /// Run the listener fan-out for a channel message and reply with the
    /// output lines.
    Dispatch {
        /// Index into the configured channel list.
        channel: usize,
        /// The message text.
        text: String,
    },
}

/// State machine for one server connection.
pub struct SessionMachine {
    config: ConnectionConfig,
    phase: Phase,
    nick: String,
    /// Bumped on every collision and on reset; stale revert timers compare
    /// against it and no-op.
    nick_generation: u64,
}

impl SessionMachine {
    /// Create a machine for the given connection configuration.
    pub fn new(config: ConnectionConfig) -> Self {
        let nick = config.nick.clone();
        Self {
            config,
            phase: Phase::Disconnected,
            nick,
            nick_generation: 0,
        }
    }

    /// Current connection phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The nickname the session currently answers to.
    pub fn nick(&self) -> &str {
        &self.nick
    }

    /// The connection configuration this machine was built from.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Start registration on a fresh transport.
    ///
    /// Returns the registration burst in its mandatory order: PASS when a
    /// server password is configured, then NICK, then USER. Servers reject
    /// USER before NICK.
    #[must_use]
    pub fn start(&mut self) -> Vec<Action> {
        self.phase = Phase::AwaitingRegistration;

        let mut actions = Vec::new();
        if let Some(ref password) = self.config.server_password {
            actions.push(send(Message::pass(password.clone())));
        }
        actions.push(send(Message::nick(self.nick.clone())));
        actions.push(send(Message::user(self.nick.clone(), self.nick.clone())));
        actions
    }

    /// Return to the disconnected phase after the transport is gone.
    ///
    /// The nickname resets to the configured one: the next registration
    /// starts from scratch, and bumping the generation retires any revert
    /// timer still in flight.
    pub fn reset(&mut self) {
        self.phase = Phase::Disconnected;
        self.nick = self.config.nick.clone();
        self.nick_generation += 1;
    }

    /// Feed one parsed server message to the machine.
    #[must_use]
    pub fn feed(&mut self, msg: &Message) -> Vec<Action> {
        match &msg.command {
            Command::PING(token, _) => vec![send(Message::pong(token.clone()))],
            Command::Response(RPL_WELCOME, params) => self.handle_welcome(params),
            Command::Response(ERR_NICKNAMEINUSE, _) => self.handle_nick_collision(),
            Command::PRIVMSG(target, text) => self.handle_privmsg(target, text),
            Command::KICK(channel, victim, reason) => self.handle_kick(channel, victim, reason),
            _ => vec![],
        }
    }

    /// Feed one elapsed timer to the machine.
    #[must_use]
    pub fn timer(&mut self, event: TimerEvent) -> Vec<Action> {
        match event {
            TimerEvent::RevertNick { generation } => {
                if generation != self.nick_generation || self.nick == self.config.nick {
                    return vec![];
                }
                info!(
                    host = %self.config.host,
                    nick = %self.config.nick,
                    "attempting to take the configured nickname back"
                );
                self.nick = self.config.nick.clone();
                vec![send(Message::nick(self.nick.clone()))]
            }
            TimerEvent::Rejoin { channel } => {
                // The channel list is fixed, but the connection may have
                // dropped while the timer ran; registration rejoins
                // everything anyway in that case.
                if self.phase != Phase::Registered {
                    return vec![];
                }
                match self.config.channels.get(channel) {
                    Some(chan) => vec![send(join_message(&chan.name, chan.key.as_deref()))],
                    None => vec![],
                }
            }
        }
    }

    fn handle_welcome(&mut self, params: &[String]) -> Vec<Action> {
        info!(
            host = %self.config.host,
            welcome = %params.last().map(String::as_str).unwrap_or_default(),
            "registered"
        );
        self.phase = Phase::Registered;

        self.config
            .channels
            .iter()
            .map(|chan| send(join_message(&chan.name, chan.key.as_deref())))
            .collect()
    }

    fn handle_nick_collision(&mut self) -> Vec<Action> {
        let previous = self.nick.clone();
        self.nick.push(NICK_SUFFIX);
        self.nick_generation += 1;

        info!(
            host = %self.config.host,
            previous = %previous,
            nick = %self.nick,
            "nickname in use, switching to suffixed nickname"
        );

        vec![
            send(Message::nick(self.nick.clone())),
            Action::Start(TimerEvent::RevertNick {
                generation: self.nick_generation,
            }),
        ]
    }

    fn handle_privmsg(&mut self, target: &str, text: &str) -> Vec<Action> {
        if self.phase != Phase::Registered {
            return vec![];
        }
        match self.channel_index(target) {
            Some(channel) => vec![Action::Dispatch {
                channel,
                text: text.to_owned(),
            }],
            // Private messages and unknown targets are not dispatched.
            None => vec![],
        }
    }

    fn handle_kick(&mut self, channel: &str, victim: &str, reason: &Option<String>) -> Vec<Action> {
        if victim != self.nick {
            return vec![];
        }
        let Some(index) = self.channel_index(channel) else {
            return vec![];
        };

        info!(
            host = %self.config.host,
            channel,
            reason = %reason.as_deref().unwrap_or_default(),
            "kicked from channel, scheduling rejoin"
        );
        vec![Action::Start(TimerEvent::Rejoin { channel: index })]
    }

    fn channel_index(&self, name: &str) -> Option<usize> {
        self.config.channels.iter().position(|c| c.name == name)
    }
}

fn send(msg: Message) -> Action {
    Action::Send(Box::new(msg))
}

fn join_message(name: &str, key: Option<&str>) -> Message {
    match key {
        Some(key) => Message::join_with_key(name, key),
        None => Message::join(name),
    }
}
