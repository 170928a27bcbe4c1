pub mod local_channel;
pub mod net_channel;

pub use local_channel::{local_channel_pair, LocalChannel};
pub use net_channel::{ChannelConfig, NetChannel};

use std::io::{Error, ErrorKind, Read, Result, Write};

use crate::Block;

/// Largest frame either side will accept. A 32-bit comparator session
/// is a few hundred kilobytes end to end; anything near this cap is a
/// framing violation.
pub const MAX_FRAME_LEN: usize = 1 << 24;

/// A trait for the I/O channel connecting the two parties.
pub trait IOChannel {
    /// Write a byte slice to the channel.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;
    /// Read exactly `bytes.len()` bytes from the channel.
    fn read_bytes(&mut self, bytes: &mut [u8]) -> Result<()>;
    /// Flush the channel.
    fn flush(&mut self) -> Result<()>;

    /// Write a `bool` to the channel.
    #[inline]
    fn write_bool(&mut self, b: bool) -> Result<()> {
        self.write_bytes(&[b as u8])
    }

    /// Read a `bool` from the channel.
    #[inline]
    fn read_bool(&mut self) -> Result<bool> {
        let mut data = [0u8; 1];
        self.read_bytes(&mut data)?;
        Ok(data[0] != 0)
    }

    /// Write a `Block` to the channel.
    #[inline]
    fn write_block(&mut self, blk: &Block) -> Result<()> {
        self.write_bytes(blk.as_ref())
    }

    /// Read a `Block` from the channel.
    #[inline]
    fn read_block(&mut self) -> Result<Block> {
        let mut bytes = [0u8; Block::LEN];
        self.read_bytes(&mut bytes)?;
        Ok(Block::from(bytes))
    }

    /// Write a length-framed payload: 4-byte big-endian length, then the
    /// payload bytes.
    fn write_frame(&mut self, payload: &[u8]) -> Result<()> {
        if payload.len() > MAX_FRAME_LEN {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("frame of {} bytes exceeds cap", payload.len()),
            ));
        }
        self.write_bytes(&(payload.len() as u32).to_be_bytes())?;
        self.write_bytes(payload)
    }

    /// Read a length-framed payload written by [`IOChannel::write_frame`].
    fn read_frame(&mut self) -> Result<Vec<u8>> {
        let mut len = [0u8; 4];
        self.read_bytes(&mut len)?;
        let len = u32::from_be_bytes(len) as usize;
        if len > MAX_FRAME_LEN {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("frame of {len} bytes exceeds cap"),
            ));
        }
        let mut payload = vec![0u8; len];
        self.read_bytes(&mut payload)?;
        Ok(payload)
    }
}

/// A symmetric channel over any `Read + Write` stream.
pub struct SymChannel<S> {
    stream: S,
    read_bytes: usize,
    write_bytes: usize,
}

impl<S: Read + Write> SymChannel<S> {
    /// New a `SymChannel`.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            read_bytes: 0,
            write_bytes: 0,
        }
    }

    /// Total bytes read so far.
    pub fn bytes_read(&self) -> usize {
        self.read_bytes
    }

    /// Total bytes written so far.
    pub fn bytes_written(&self) -> usize {
        self.write_bytes
    }
}

impl<S: Read + Write> IOChannel for SymChannel<S> {
    #[inline]
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream.write_all(bytes)?;
        self.write_bytes += bytes.len();
        Ok(())
    }

    #[inline]
    fn read_bytes(&mut self, bytes: &mut [u8]) -> Result<()> {
        self.stream.read_exact(bytes)?;
        self.read_bytes += bytes.len();
        Ok(())
    }

    #[inline]
    fn flush(&mut self) -> Result<()> {
        self.stream.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn frame_roundtrip() {
        let (mut tx, mut rx) = local_channel_pair();
        let payload = (0..=255u8).collect::<Vec<u8>>();
        let sent = payload.clone();
        let handle = thread::spawn(move || {
            tx.write_frame(&sent).unwrap();
            tx.write_frame(&[]).unwrap();
            tx.flush().unwrap();
        });
        assert_eq!(rx.read_frame().unwrap(), payload);
        assert_eq!(rx.read_frame().unwrap(), Vec::<u8>::new());
        handle.join().unwrap();
    }

    #[test]
    fn oversized_frame_rejected() {
        let (mut tx, mut rx) = local_channel_pair();
        let handle = thread::spawn(move || {
            // A length prefix past the cap, no payload behind it.
            tx.write_bytes(&(MAX_FRAME_LEN as u32 + 1).to_be_bytes())
                .unwrap();
            tx.flush().unwrap();
        });
        let err = rx.read_frame().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        handle.join().unwrap();
    }
}
