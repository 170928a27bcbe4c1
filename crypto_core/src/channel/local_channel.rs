use std::os::unix::net::UnixStream;

use crate::SymChannel;

/// An in-process channel pair for tests, one endpoint per party.
pub type LocalChannel = SymChannel<UnixStream>;

pub fn local_channel_pair() -> (LocalChannel, LocalChannel) {
    let (tx, rx) = UnixStream::pair().expect("socketpair");
    (SymChannel::new(tx), SymChannel::new(rx))
}
