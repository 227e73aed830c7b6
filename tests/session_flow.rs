//! End-to-end session tests against a scripted server.
//!
//! Each test binds a local listener, spawns the bot binary pointed at it,
//! and plays the server side of the conversation line by line.

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::time::timeout;

const RECV_TIMEOUT: Duration = Duration::from_secs(15);

/// The bot binary under test, killed on drop.
struct BotProcess {
    child: Child,
    _dir: tempfile::TempDir,
}

impl BotProcess {
    /// Spawn the bot with a minimal config pointing at a local port.
    fn spawn(port: u16) -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let config_path = dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            format!(
                r##"
[timing]
reconnect_secs = 0
rejoin_secs = 0
nick_revert_secs = 1
idle_timeout_secs = 30

[[connections]]
host = "127.0.0.1"
port = {port}
nick = "bot"

[[connections.channels]]
name = "#room"
"##
            ),
        )?;

        // Binary in the workspace target dir, built by `cargo test`.
        let binary = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("target/debug/lurkbot");
        let child = Command::new(&binary)
            .arg(&config_path)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        Ok(Self { child, _dir: dir })
    }
}

impl Drop for BotProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// The server side of one accepted connection.
struct ServerConn {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl ServerConn {
    async fn accept(listener: &TcpListener) -> ServerConn {
        let (stream, _) = timeout(RECV_TIMEOUT, listener.accept())
            .await
            .expect("timed out waiting for the bot to connect")
            .expect("accept failed");
        let (read, writer) = stream.into_split();
        ServerConn {
            reader: BufReader::new(read),
            writer,
        }
    }

    async fn recv(&mut self) -> String {
        let mut line = String::new();
        let n = timeout(RECV_TIMEOUT, self.reader.read_line(&mut line))
            .await
            .expect("timed out waiting for a line from the bot")
            .expect("read failed");
        assert!(n > 0, "bot closed the connection unexpectedly");
        line.trim_end().to_string()
    }

    async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{line}\r\n").as_bytes())
            .await
            .expect("write failed");
    }

    async fn expect_registration(&mut self) {
        assert_eq!(self.recv().await, "NICK bot");
        assert_eq!(self.recv().await, "USER bot 0 * :bot");
    }
}

#[tokio::test]
async fn welcome_joins_channel_and_silent_dispatch_sends_nothing() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let _bot = BotProcess::spawn(port).unwrap();

    let mut server = ServerConn::accept(&listener).await;
    server.expect_registration().await;

    server.send(":server 001 bot :Welcome to the test network").await;
    assert_eq!(server.recv().await, "JOIN #room");

    // A channel message with no matching listener produces no output; the
    // PONG answering the next PING must be the very next line.
    server.send(":user!u@h PRIVMSG #room :hello").await;
    server.send("PING :sync").await;
    assert_eq!(server.recv().await, "PONG sync");
}

#[tokio::test]
async fn ping_is_answered_during_registration() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let _bot = BotProcess::spawn(port).unwrap();

    let mut server = ServerConn::accept(&listener).await;
    server.expect_registration().await;

    server.send("PING :early").await;
    assert_eq!(server.recv().await, "PONG early");
}

#[tokio::test]
async fn kick_leads_to_rejoin() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let _bot = BotProcess::spawn(port).unwrap();

    let mut server = ServerConn::accept(&listener).await;
    server.expect_registration().await;

    server.send(":server 001 bot :Welcome").await;
    assert_eq!(server.recv().await, "JOIN #room");

    server.send(":op!o@h KICK #room bot :begone").await;
    assert_eq!(server.recv().await, "JOIN #room");
}

#[tokio::test]
async fn dropped_connection_is_redialed_and_reregistered() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let _bot = BotProcess::spawn(port).unwrap();

    let server = ServerConn::accept(&listener).await;
    drop(server);

    let mut server = ServerConn::accept(&listener).await;
    server.expect_registration().await;
}
