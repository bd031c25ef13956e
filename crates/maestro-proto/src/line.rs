//! Line-based codec for tokio.
//!
//! Reads newline-terminated lines and writes [`Frame`]s terminated with
//! `\r\n`. Inbound bytes are decoded lossily; a line longer than the limit
//! is dropped in full (up to and including its newline) instead of failing
//! the stream, so one bad line never ends the connection.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use crate::error;
use crate::frame::Frame;
use crate::MAX_LINE_LEN;

/// Line-based codec that handles newline-terminated messages.
#[derive(Debug)]
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length
    max_len: usize,
    /// Set while skipping the remainder of an oversized line
    discarding: bool,
}

impl LineCodec {
    /// Create a codec with the default line limit ([`MAX_LINE_LEN`]).
    pub fn new() -> Self {
        Self::with_max_len(MAX_LINE_LEN)
    }

    /// Create a codec with a custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
            discarding: false,
        }
    }

    /// Configured maximum line length.
    pub fn max_len(&self) -> usize {
        self.max_len
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        loop {
            // Look for newline starting from where we left off
            if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
                let line = src.split_to(self.next_index + offset + 1);
                self.next_index = 0;

                if std::mem::take(&mut self.discarding) {
                    continue;
                }
                if line.len() > self.max_len {
                    warn!(len = line.len(), limit = self.max_len, "discarding oversized line");
                    continue;
                }

                let data = String::from_utf8_lossy(&line);
                let data = data.trim_end_matches(['\r', '\n']);
                if data.is_empty() {
                    continue;
                }
                return Ok(Some(data.to_owned()));
            }

            if self.discarding {
                src.clear();
                self.next_index = 0;
                return Ok(None);
            }

            if src.len() > self.max_len {
                warn!(len = src.len(), limit = self.max_len, "discarding oversized line");
                self.discarding = true;
                src.clear();
                self.next_index = 0;
                return Ok(None);
            }

            // No complete line yet - remember where we stopped
            self.next_index = src.len();
            return Ok(None);
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        self.next_index = 0;
        if std::mem::take(&mut self.discarding) || src.is_empty() {
            src.clear();
            return Ok(None);
        }
        let rest = src.split();
        let data = String::from_utf8_lossy(&rest);
        let data = data.trim_end_matches('\r');
        Ok((!data.is_empty()).then(|| data.to_owned()))
    }
}

impl Encoder<Frame> for LineCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> error::Result<()> {
        let line = frame.to_string();
        dst.reserve(line.len() + 2);
        dst.extend_from_slice(line.as_bytes());
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_complete_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :tmi.twitch.tv\r\n");

        let result = codec.decode(&mut buf).unwrap();
        assert_eq!(result, Some("PING :tmi.twitch.tv".to_string()));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_partial_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :");

        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"tmi.twitch.tv\n");
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some("PING :tmi.twitch.tv".to_string())
        );
    }

    #[test]
    fn test_decode_multiple_lines_in_one_read() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("first\r\nsecond\r\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some("first".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("second".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_decode_skips_blank_lines() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("\r\n\r\nPING :x\r\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING :x".to_string()));
    }

    #[test]
    fn test_oversized_line_is_dropped_not_fatal() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::from("this is way too long\nPING :ok\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING :ok".to_string()));
    }

    #[test]
    fn test_oversized_partial_line_is_discarded_until_newline() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::from("0123456789abcdef");

        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        assert!(buf.is_empty());

        buf.extend_from_slice(b"still the same line\nPING :ok\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING :ok".to_string()));
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"PRIVMSG #c :caf\xff\r\n"[..]);

        let line = codec.decode(&mut buf).unwrap().unwrap();
        assert!(line.starts_with("PRIVMSG #c :caf"));
    }

    #[test]
    fn test_decode_eof_flushes_unterminated_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :last");

        assert_eq!(
            codec.decode_eof(&mut buf).unwrap(),
            Some("PING :last".to_string())
        );
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_encode_appends_crlf() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();

        codec.encode(Frame::pong("tmi.twitch.tv"), &mut buf).unwrap();
        assert_eq!(&buf[..], b"PONG :tmi.twitch.tv\r\n");
    }
}
