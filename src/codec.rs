use std::io;

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::serial::SerialMessage;

/// Splits a byte stream into commands at a delimiter,
/// and writes responses as they are.
///
/// Decoded commands keep their delimiter so the simulator sees them as a
/// serial line would deliver them.
#[derive(Debug, Clone)]
pub struct LinesCodec {
    /// How far we have looked for a delimiter into the buffer
    cursor: usize,

    /// How to delimit incoming byte streams.
    delimiter: u8,
}

impl LinesCodec {
    /// Create a new codec.
    pub fn new(delimiter: u8) -> Self {
        Self {
            cursor: 0,
            delimiter,
        }
    }
}

impl Default for LinesCodec {
    fn default() -> Self {
        Self::new(b'\n')
    }
}

impl Decoder for LinesCodec {
    type Item = SerialMessage;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let read_to = src.len();

        let look_at = &src[self.cursor..read_to];

        if let Some(position) = look_at.iter().position(|&byte| byte == self.delimiter) {
            // Since we might "start late" in the buffer (from the cursor),
            // the "global" position within the buffer has to be calculated.
            let actual_position = self.cursor + position;

            // Next time we need to start over.
            self.cursor = 0;

            let line = src.split_to(actual_position + 1);

            Ok(Some(SerialMessage::new_lossy(&line[..])))
        } else {
            // Don't re-read what we've already looked at when more bytes arrive.
            self.cursor = read_to;

            Ok(None)
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }

        // An unterminated last line is still a command.
        self.cursor = 0;
        if src.is_empty() {
            Ok(None)
        } else {
            let line = SerialMessage::new_lossy(&src[..]);
            src.advance(src.len());

            Ok(Some(line))
        }
    }
}

impl Encoder<Vec<u8>> for LinesCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Vec<u8>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(&item);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn keeps_delimiter() {
        let mut codec = LinesCodec::default();
        let mut buf = BytesMut::from(&b"G0 X1\n?\n"[..]);

        assert_eq!(codec.decode(&mut buf).unwrap(), Some("G0 X1\n".into()));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("?\n".into()));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn partial_then_rest() {
        let mut codec = LinesCodec::default();
        let mut buf = BytesMut::from(&b"$"[..]);

        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"$\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("$$\n".into()));
    }

    #[test]
    fn unterminated_last_line() {
        let mut codec = LinesCodec::default();
        let mut buf = BytesMut::from(&b"ok\nlast"[..]);

        assert_eq!(codec.decode_eof(&mut buf).unwrap(), Some("ok\n".into()));
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), Some("last".into()));
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
    }

    #[test]
    fn custom_delimiter() {
        let mut codec = LinesCodec::new(b'\r');
        let mut buf = BytesMut::from(&b"a\rb"[..]);

        assert_eq!(codec.decode(&mut buf).unwrap(), Some("a\r".into()));
    }

    #[test]
    fn encode_as_is() {
        let mut codec = LinesCodec::default();
        let mut buf = BytesMut::new();

        codec.encode(b"ok\n".to_vec(), &mut buf).unwrap();

        assert_eq!(&buf[..], b"ok\n");
    }
}
