//! Fake chat server.
//!
//! Listens on a loopback port, accepts the bot's connection, and lets a test
//! play the server side of the line protocol.

use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpListener;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

const ACCEPT_TIMEOUT: Duration = Duration::from_secs(10);
const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// A listening fake server.
pub struct ChatServer {
    listener: TcpListener,
}

impl ChatServer {
    /// Bind to an ephemeral loopback port.
    pub async fn bind() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        Ok(Self { listener })
    }

    /// Address to put in the bot's config.
    pub fn address(&self) -> String {
        // Bound above, so the local address is always available.
        let addr = self.listener.local_addr().expect("listener address");
        addr.to_string()
    }

    /// Wait for the bot to connect.
    pub async fn accept(&self) -> anyhow::Result<ChatSession> {
        let (stream, _) = timeout(ACCEPT_TIMEOUT, self.listener.accept()).await??;
        let (read_half, write_half) = stream.into_split();
        Ok(ChatSession {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        })
    }
}

/// The server side of one bot connection.
pub struct ChatSession {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl ChatSession {
    /// Send a raw line, adding `\r\n` when missing.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        if !line.ends_with("\r\n") {
            self.writer.write_all(b"\r\n").await?;
        }
        self.writer.flush().await?;
        Ok(())
    }

    /// Deliver a channel message from `user`.
    pub async fn privmsg_from(&mut self, user: &str, channel: &str, text: &str) -> anyhow::Result<()> {
        self.send_raw(&format!(
            ":{user}!{user}@{user}.tmi.twitch.tv PRIVMSG #{channel} :{text}"
        ))
        .await
    }

    /// Deliver a whisper from `user` to `recipient`.
    pub async fn whisper_from(&mut self, user: &str, recipient: &str, text: &str) -> anyhow::Result<()> {
        self.send_raw(&format!(
            ":{user}!{user}@{user}.tmi.twitch.tv WHISPER {recipient} :{text}"
        ))
        .await
    }

    /// Receive one raw line, terminator included. Empty once the bot has
    /// closed the connection.
    pub async fn recv(&mut self) -> anyhow::Result<String> {
        self.recv_timeout(RECV_TIMEOUT).await
    }

    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        let mut line = String::new();
        timeout(dur, self.reader.read_line(&mut line)).await??;
        Ok(line)
    }

    /// Receive the registration burst: PASS, NICK, one JOIN per channel,
    /// then CAP REQ.
    pub async fn expect_registration(&mut self, channels: usize) -> anyhow::Result<Vec<String>> {
        let mut lines = Vec::with_capacity(channels + 3);
        for _ in 0..channels + 3 {
            lines.push(self.recv().await?);
        }
        Ok(lines)
    }
}
