use std::io::{BufReader, BufWriter, Error, ErrorKind, Read, Result, Write};
use std::net::{TcpListener, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use crate::IOChannel;

/// Timeout policy for a session's channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Per-message timeout applied to each blocking read and write.
    pub message_timeout: Option<Duration>,
    /// Overall session deadline, measured from channel construction.
    pub session_deadline: Option<Duration>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            message_timeout: Some(Duration::from_secs(30)),
            session_deadline: None,
        }
    }
}

/// A TCP channel between the two parties.
///
/// The evaluator listens, the garbler connects. Every blocking operation
/// honors the per-message timeout and the session deadline; expiry
/// surfaces as `ErrorKind::TimedOut`.
pub struct NetChannel {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    message_timeout: Option<Duration>,
    deadline: Option<Instant>,
    read_bytes: usize,
    write_bytes: usize,
}

impl NetChannel {
    /// Bind `addr`, accept a single peer connection.
    pub fn accept<A: ToSocketAddrs>(addr: A, config: ChannelConfig) -> Result<Self> {
        let listener = TcpListener::bind(addr)?;
        let (stream, peer) = listener.accept()?;
        log::debug!("accepted connection from {peer}");
        Self::from_stream(stream, config)
    }

    /// Connect to a listening peer at `addr`.
    pub fn connect<A: ToSocketAddrs>(addr: A, config: ChannelConfig) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        log::debug!("connected to {}", stream.peer_addr()?);
        Self::from_stream(stream, config)
    }

    fn from_stream(stream: TcpStream, config: ChannelConfig) -> Result<Self> {
        stream.set_nodelay(true)?;
        Ok(Self {
            reader: BufReader::new(stream.try_clone()?),
            writer: BufWriter::new(stream),
            message_timeout: config.message_timeout,
            deadline: config.session_deadline.map(|d| Instant::now() + d),
            read_bytes: 0,
            write_bytes: 0,
        })
    }

    /// Remaining time before the session deadline, if one is set.
    /// `Err(TimedOut)` once it has passed.
    fn remaining(&self) -> Result<Option<Duration>> {
        match self.deadline {
            None => Ok(None),
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    Err(Error::new(ErrorKind::TimedOut, "session deadline exceeded"))
                } else {
                    Ok(Some(deadline - now))
                }
            }
        }
    }

    /// The effective timeout for the next blocking call: the smaller of
    /// the per-message timeout and the time left until the deadline.
    fn next_timeout(&self) -> Result<Option<Duration>> {
        Ok(match (self.message_timeout, self.remaining()?) {
            (None, None) => None,
            (Some(t), None) | (None, Some(t)) => Some(t),
            (Some(a), Some(b)) => Some(a.min(b)),
        })
    }
}

/// SO_RCVTIMEO / SO_SNDTIMEO expiry shows up as `WouldBlock` on Unix.
fn as_timeout(e: Error) -> Error {
    if e.kind() == ErrorKind::WouldBlock {
        Error::new(ErrorKind::TimedOut, "message timeout exceeded")
    } else {
        e
    }
}

impl IOChannel for NetChannel {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let timeout = self.next_timeout()?;
        self.writer.get_ref().set_write_timeout(timeout)?;
        self.writer.write_all(bytes).map_err(as_timeout)?;
        self.write_bytes += bytes.len();
        Ok(())
    }

    fn read_bytes(&mut self, bytes: &mut [u8]) -> Result<()> {
        let timeout = self.next_timeout()?;
        self.reader.get_ref().set_read_timeout(timeout)?;
        self.reader.read_exact(bytes).map_err(as_timeout)?;
        self.read_bytes += bytes.len();
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let timeout = self.next_timeout()?;
        self.writer.get_ref().set_write_timeout(timeout)?;
        self.writer.flush().map_err(as_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn read_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        // Peer connects and then stays silent.
        let handle = thread::spawn(move || {
            let _stream = TcpStream::connect(addr).unwrap();
            thread::sleep(Duration::from_millis(300));
        });
        let (stream, _) = listener.accept().unwrap();
        let config = ChannelConfig {
            message_timeout: Some(Duration::from_millis(50)),
            session_deadline: None,
        };
        let mut channel = NetChannel::from_stream(stream, config).unwrap();
        let mut buf = [0u8; 1];
        let err = channel.read_bytes(&mut buf).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TimedOut);
        handle.join().unwrap();
    }

    #[test]
    fn deadline_expires() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let _stream = TcpStream::connect(addr).unwrap();
            thread::sleep(Duration::from_millis(100));
        });
        let (stream, _) = listener.accept().unwrap();
        let config = ChannelConfig {
            message_timeout: None,
            session_deadline: Some(Duration::from_millis(1)),
        };
        let mut channel = NetChannel::from_stream(stream, config).unwrap();
        thread::sleep(Duration::from_millis(5));
        let mut buf = [0u8; 1];
        let err = channel.read_bytes(&mut buf).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TimedOut);
        handle.join().unwrap();
    }

    #[test]
    fn blocked_write_is_bounded_by_the_deadline() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        // Peer connects but never reads, so a large enough write must
        // block once the socket buffers fill.
        let handle = thread::spawn(move || {
            let _stream = TcpStream::connect(addr).unwrap();
            thread::sleep(Duration::from_millis(500));
        });
        let (stream, _) = listener.accept().unwrap();
        let config = ChannelConfig {
            message_timeout: None,
            session_deadline: Some(Duration::from_millis(100)),
        };
        let mut channel = NetChannel::from_stream(stream, config).unwrap();
        let payload = vec![0u8; 64 << 20];
        let start = Instant::now();
        let err = channel.write_bytes(&payload).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TimedOut);
        assert!(start.elapsed() < Duration::from_secs(5));
        handle.join().unwrap();
    }

    #[test]
    fn write_rejected_past_deadline() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let _stream = TcpStream::connect(addr).unwrap();
            thread::sleep(Duration::from_millis(100));
        });
        let (stream, _) = listener.accept().unwrap();
        let config = ChannelConfig {
            message_timeout: Some(Duration::from_secs(30)),
            session_deadline: Some(Duration::from_millis(1)),
        };
        let mut channel = NetChannel::from_stream(stream, config).unwrap();
        thread::sleep(Duration::from_millis(5));
        let err = channel.write_bytes(&[0u8; 1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TimedOut);
        handle.join().unwrap();
    }
}
