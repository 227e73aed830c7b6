//! Integration tests for framed decoding over an in-memory stream.
//!
//! Exercises the codec the way a live connection does: bytes arrive in
//! arbitrary chunks, and messages must come out whole and in order.

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio_util::codec::FramedRead;

use lurk_proto::{Command, IrcCodec};

#[tokio::test]
async fn messages_survive_chunked_writes() {
    let (mut client, server) = tokio::io::duplex(64);
    let mut reader = FramedRead::new(server, IrcCodec::new());

    // One message delivered over three writes, terminator split across two.
    client.write_all(b"PING :to").await.unwrap();
    client.write_all(b"ken\r").await.unwrap();
    client.write_all(b"\n").await.unwrap();

    let msg = reader.next().await.unwrap().unwrap();
    assert_eq!(msg.command, Command::PING("token".into(), None));
}

#[tokio::test]
async fn mixed_terminators_yield_every_line_in_order() {
    let (mut client, server) = tokio::io::duplex(256);
    let mut reader = FramedRead::new(server, IrcCodec::new());

    client
        .write_all(b":s 001 bot :Welcome\r\nPING :a\n:u!u@h PRIVMSG #room :hi\r\n")
        .await
        .unwrap();
    drop(client);

    let mut commands = Vec::new();
    while let Some(msg) = reader.next().await {
        commands.push(msg.unwrap().command);
    }

    assert_eq!(commands.len(), 3);
    assert!(matches!(commands[0], Command::Response(1, _)));
    assert!(matches!(commands[1], Command::PING(_, _)));
    assert!(matches!(commands[2], Command::PRIVMSG(_, _)));
}

#[tokio::test]
async fn blank_lines_are_not_surfaced() {
    let (mut client, server) = tokio::io::duplex(256);
    let mut reader = FramedRead::new(server, IrcCodec::new());

    client.write_all(b"\r\n\r\nPING :x\r\n\n").await.unwrap();
    drop(client);

    let mut commands = Vec::new();
    while let Some(msg) = reader.next().await {
        commands.push(msg.unwrap().command);
    }

    assert_eq!(commands, vec![Command::PING("x".into(), None)]);
}
