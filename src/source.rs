//! Bit transport layer.
//!
//! The beacon stream arrives as bit-bytes: one byte per channel bit,
//! only the low bit significant. Sources buffer whatever the transport
//! hands them and replay it one bit at a time.

use std::io::{ErrorKind, Read};
use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket};

use log::error;
use socket2::{Domain, Protocol, Socket, Type};

/// Largest datagram accepted from the socket.
const RECV_BUFFER_BYTES: usize = 10240;

/// A blocking supplier of stream bits.
pub trait BitSource {
    /// Pulls `count` bits. Blocks until enough data arrives; returns
    /// fewer than `count` only when the transport has closed.
    fn get(&mut self, count: usize) -> Vec<u8>;
}

/// Bits received from a UDP multicast group.
pub struct UdpBitSource {
    socket: UdpSocket,
    buffer: Vec<u8>,
    cursor: usize,
}

impl UdpBitSource {
    /// Binds `port` with address reuse and joins `group` on INADDR_ANY,
    /// so several decoder instances can share one stream.
    pub fn multicast(group: Ipv4Addr, port: u16) -> std::io::Result<Self> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;
        socket.bind(&SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port).into())?;
        socket.join_multicast_v4(&group, &Ipv4Addr::UNSPECIFIED)?;
        Ok(Self {
            socket: socket.into(),
            buffer: Vec::new(),
            cursor: 0,
        })
    }
}

impl BitSource for UdpBitSource {
    fn get(&mut self, count: usize) -> Vec<u8> {
        let mut bits = Vec::with_capacity(count);
        while bits.len() < count {
            if self.cursor == self.buffer.len() {
                let mut datagram = [0u8; RECV_BUFFER_BYTES];
                match self.socket.recv(&mut datagram) {
                    // An empty datagram carries nothing; wait for more.
                    Ok(0) => continue,
                    Ok(received) => {
                        self.buffer.clear();
                        self.buffer.extend_from_slice(&datagram[..received]);
                        self.cursor = 0;
                    }
                    Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                    Err(err) => {
                        error!("receive failed: {}", err);
                        break;
                    }
                }
            }
            let take = (count - bits.len()).min(self.buffer.len() - self.cursor);
            bits.extend_from_slice(&self.buffer[self.cursor..self.cursor + take]);
            self.cursor += take;
        }
        bits
    }
}

/// Bits replayed from any byte reader, e.g. a capture file.
pub struct ReadBitSource<R> {
    reader: R,
}

impl<R: Read> ReadBitSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: Read> BitSource for ReadBitSource<R> {
    fn get(&mut self, count: usize) -> Vec<u8> {
        let mut bits = vec![0u8; count];
        let mut filled = 0;
        while filled < count {
            match self.reader.read(&mut bits[filled..]) {
                Ok(0) => break,
                Ok(read) => filled += read,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    error!("read failed: {}", err);
                    break;
                }
            }
        }
        bits.truncate(filled);
        bits
    }
}
