//! Session lifecycle: one long-lived task per configured server.
//!
//! The driver owns the transport and the clocks; every protocol decision is
//! delegated to the sans-IO [`machine::SessionMachine`]. A session never
//! gives up: any transport failure funnels into the reconnect wait and a
//! fresh dial.

pub mod machine;

use std::sync::Arc;

use lurk_proto::{Message, TransportSink};
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info};

use crate::config::{ConnectionConfig, TimingConfig};
use crate::error::{Result, SessionError};
use crate::listeners::ListenerSet;
use crate::net::Connector;

use self::machine::{Action, Phase, SessionMachine, TimerEvent};

/// One managed connection to one chat server.
pub struct Session {
    machine: SessionMachine,
    timing: TimingConfig,
    listeners: Arc<ListenerSet>,
}

impl Session {
    /// Create a session from its connection config and shared listener set.
    pub fn new(
        config: ConnectionConfig,
        timing: TimingConfig,
        listeners: Arc<ListenerSet>,
    ) -> Self {
        Self {
            machine: SessionMachine::new(config),
            timing,
            listeners,
        }
    }

    /// Run the session forever, reconnecting after every failure.
    pub async fn run(mut self) {
        loop {
            let host = self.machine.config().host.clone();

            match self.connect_and_drive().await {
                Err(SessionError::Closed) => info!(host = %host, "connection closed"),
                Err(e) => error!(host = %host, error = %e, "connection failed"),
                Ok(never) => match never {},
            }

            self.machine.reset();
            info!(
                host = %host,
                delay_secs = self.timing.reconnect_secs,
                "reconnecting after delay"
            );
            sleep(self.timing.reconnect()).await;
        }
    }

    /// Dial, register, and process traffic until the connection dies.
    async fn connect_and_drive(&mut self) -> Result<std::convert::Infallible> {
        let transport = Connector::new(self.machine.config()).connect().await?;
        info!(
            host = %self.machine.config().host,
            port = self.machine.config().effective_port(),
            tls = transport.is_tls(),
            "connected"
        );

        let (mut sink, mut stream) = transport.split();
        let (timer_tx, mut timer_rx) = mpsc::unbounded_channel();

        let actions = self.machine.start();
        self.perform_all(actions, &mut sink, &timer_tx).await?;

        loop {
            tokio::select! {
                Some(event) = timer_rx.recv() => {
                    let actions = self.machine.timer(event);
                    self.perform_all(actions, &mut sink, &timer_tx).await?;
                }
                read = timeout(self.timing.idle_timeout(), stream.read_message()) => {
                    match read {
                        Err(_) => return Err(SessionError::IdleTimeout(self.timing.idle_timeout())),
                        Ok(Ok(None)) => return Err(SessionError::Closed),
                        Ok(Err(e)) => return Err(e.into()),
                        Ok(Ok(Some(msg))) => {
                            debug!(host = %self.machine.config().host, message = %msg.to_string().trim_end(), "received");
                            let actions = self.machine.feed(&msg);
                            self.perform_all(actions, &mut sink, &timer_tx).await?;
                        }
                    }
                }
            }
        }
    }

    async fn perform_all(
        &mut self,
        actions: Vec<Action>,
        sink: &mut TransportSink,
        timer_tx: &mpsc::UnboundedSender<TimerEvent>,
    ) -> Result<()> {
        for action in actions {
            match action {
                Action::Send(msg) => self.send(sink, &msg).await?,
                Action::Start(event) => self.start_timer(event, timer_tx),
                Action::Dispatch { channel, text } => {
                    let replies = self.run_dispatch(channel, &text).await;
                    // The reply target is fixed when the dispatch starts; a
                    // kick arriving mid-dispatch does not redirect the output.
                    let target = self.machine.config().channels[channel].name.clone();
                    for line in replies {
                        if line.is_empty() {
                            continue;
                        }
                        self.send(sink, &Message::privmsg(target.clone(), line))
                            .await?;
                    }
                }
            }
        }
        Ok(())
    }

    async fn run_dispatch(&self, channel: usize, text: &str) -> Vec<String> {
        let chan = &self.machine.config().channels[channel];
        debug_assert_eq!(self.machine.phase(), Phase::Registered);

        self.listeners
            .dispatch(text, self.machine.nick(), &chan.disabled_listeners)
            .await
    }

    fn start_timer(&self, event: TimerEvent, timer_tx: &mpsc::UnboundedSender<TimerEvent>) {
        let delay = match event {
            TimerEvent::RevertNick { .. } => self.timing.nick_revert(),
            TimerEvent::Rejoin { .. } => self.timing.rejoin(),
        };
        let timer_tx = timer_tx.clone();
        tokio::spawn(async move {
            sleep(delay).await;
            // The receiver is gone once the connection drops; a stale timer
            // then has nothing to report to.
            let _ = timer_tx.send(event);
        });
    }

    async fn send(&self, sink: &mut TransportSink, msg: &Message) -> Result<()> {
        let host = &self.machine.config().host;
        debug!(host = %host, message = %msg.to_string().trim_end(), "sending");
        sink.write_message(msg).await?;
        debug!(host = %host, "message successfully sent");
        Ok(())
    }
}
