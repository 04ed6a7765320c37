/*!
Length-framed message exchange over a reliable byte stream.

Every frame is an 8-byte unsigned big-endian length prefix followed by
exactly that many payload bytes. Frames are ordered and never interleaved;
a close or short read anywhere inside a frame surfaces as
[`Error::TransportClosed`], never as an empty-but-valid frame.
*/

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ByteOrder};
use bytes::Bytes;

use crate::core::constants::sizes::LENGTH_PREFIX;
use crate::core::error::{Error, Result};

/// Framed message stream over an underlying byte-stream connection
#[derive(Debug)]
pub struct FramedStream<S> {
    inner: S,
}

impl<S> FramedStream<S> {
    /// Wrap a byte-stream connection
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Get a reference to the underlying stream
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Unwrap the underlying stream
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Write> FramedStream<S> {
    /// Write one frame: length prefix, then the payload
    pub fn send_frame(&mut self, payload: &[u8]) -> Result<()> {
        let mut prefix = [0u8; LENGTH_PREFIX];
        BigEndian::write_u64(&mut prefix, payload.len() as u64);
        self.inner.write_all(&prefix)?;
        self.inner.write_all(payload)?;
        self.inner.flush()?;
        Ok(())
    }

    /// Write one UTF-8 text frame
    pub fn send_text(&mut self, text: &str) -> Result<()> {
        self.send_frame(text.as_bytes())
    }
}

impl<S: Read> FramedStream<S> {
    /// Read one full frame, blocking until the prefix and payload have
    /// both arrived
    ///
    /// A connection close or short read at any point yields
    /// [`Error::TransportClosed`]; callers must treat that as "peer
    /// disconnected" and abort the session.
    pub fn recv_frame(&mut self) -> Result<Bytes> {
        let mut prefix = [0u8; LENGTH_PREFIX];
        self.read_exact_or_closed(&mut prefix)?;
        let len = BigEndian::read_u64(&prefix) as usize;

        let mut payload = vec![0u8; len];
        self.read_exact_or_closed(&mut payload)?;
        Ok(Bytes::from(payload))
    }

    /// Read one frame and decode it as UTF-8
    pub fn recv_text(&mut self) -> Result<String> {
        let frame = self.recv_frame()?;
        String::from_utf8(frame.to_vec())
            .map_err(|_| Error::format("frame is not valid UTF-8"))
    }

    fn read_exact_or_closed(&mut self, buf: &mut [u8]) -> Result<()> {
        match self.inner.read_exact(buf) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                Err(Error::TransportClosed)
            }
            Err(err) => Err(Error::Io(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn roundtrip(payload: &[u8]) -> Bytes {
        let mut tx = FramedStream::new(Vec::new());
        tx.send_frame(payload).unwrap();
        let mut rx = FramedStream::new(Cursor::new(tx.into_inner()));
        rx.recv_frame().unwrap()
    }

    #[test]
    fn test_frame_roundtrip() {
        assert_eq!(roundtrip(b""), Bytes::new());
        assert_eq!(roundtrip(b"Z X Z X"), Bytes::from_static(b"Z X Z X"));

        let large = vec![0xA5u8; 1_000_000];
        assert_eq!(roundtrip(&large), Bytes::from(large.clone()));
    }

    #[test]
    fn test_frames_stay_ordered() {
        let mut tx = FramedStream::new(Vec::new());
        tx.send_text("first").unwrap();
        tx.send_text("second").unwrap();
        tx.send_frame(b"").unwrap();

        let mut rx = FramedStream::new(Cursor::new(tx.into_inner()));
        assert_eq!(rx.recv_text().unwrap(), "first");
        assert_eq!(rx.recv_text().unwrap(), "second");
        assert_eq!(rx.recv_frame().unwrap(), Bytes::new());
    }

    #[test]
    fn test_truncated_prefix_is_transport_closed() {
        let mut rx = FramedStream::new(Cursor::new(vec![0u8; 3]));
        assert!(matches!(rx.recv_frame(), Err(Error::TransportClosed)));

        let mut rx = FramedStream::new(Cursor::new(Vec::new()));
        assert!(matches!(rx.recv_frame(), Err(Error::TransportClosed)));
    }

    #[test]
    fn test_truncated_payload_is_transport_closed() {
        let mut tx = FramedStream::new(Vec::new());
        tx.send_frame(b"complete frame").unwrap();
        let mut bytes = tx.into_inner();
        bytes.truncate(bytes.len() - 5);

        let mut rx = FramedStream::new(Cursor::new(bytes));
        assert!(matches!(rx.recv_frame(), Err(Error::TransportClosed)));
    }

    #[test]
    fn test_text_frame_rejects_invalid_utf8() {
        let mut tx = FramedStream::new(Vec::new());
        tx.send_frame(&[0xff, 0xfe]).unwrap();
        let mut rx = FramedStream::new(Cursor::new(tx.into_inner()));
        assert!(matches!(rx.recv_text(), Err(Error::InvalidFormat(_))));
    }
}
