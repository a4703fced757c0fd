//! A single non-connected UDP socket shared by one device handle: send the
//! request, then loop on receive with a 1-second per-attempt timeout until
//! either a reply arrives or the overall deadline elapses.

use crate::error::{BroadlinkError, Result};
use socket2::{Domain, Socket, Type};
use std::net::{SocketAddr, UdpSocket};
use std::sync::Mutex;
use std::time::{Duration, Instant};

const PER_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(1);

/// The UDP half of a device handle. One socket, one [`Mutex`] guarding it so
/// at most one command is in flight at a time (§5).
pub struct Channel {
    socket: UdpSocket,
    guard: Mutex<()>,
}

impl Channel {
    /// Bind a socket at `local` (use `0.0.0.0:0` for an ephemeral port) with
    /// `SO_REUSEADDR` and `SO_BROADCAST` set, as the protocol requires.
    pub fn bind(local: SocketAddr) -> Result<Self> {
        let raw = Socket::new(Domain::for_address(local), Type::DGRAM, None)?;
        raw.set_reuse_address(true)?;
        raw.set_broadcast(true)?;
        raw.bind(&local.into())?;
        let socket: UdpSocket = raw.into();
        socket.set_read_timeout(Some(PER_ATTEMPT_TIMEOUT))?;

        Ok(Self {
            socket,
            guard: Mutex::new(()),
        })
    }

    /// The ephemeral port this channel ended up bound to, if any was
    /// requested with port `0`.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Send `packet` to `remote`, then receive until a reply arrives or
    /// `overall_deadline` has elapsed since the first send. Re-sends the
    /// packet on every per-attempt timeout, mirroring the source's retry
    /// loop.
    pub fn send_recv(
        &self,
        packet: &[u8],
        remote: SocketAddr,
        overall_deadline: Duration,
    ) -> Result<Vec<u8>> {
        let _permit = self.guard.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let start = Instant::now();
        let mut buf = [0u8; 2048];

        loop {
            self.socket
                .send_to(packet, remote)
                .map_err(|_| BroadlinkError::SendError)?;

            match self.socket.recv_from(&mut buf) {
                Ok((n, _from)) => return Ok(buf[..n].to_vec()),
                Err(e) if is_timeout(&e) => {
                    if start.elapsed() > overall_deadline {
                        tracing::error!(?overall_deadline, "no response within the overall deadline");
                        return Err(BroadlinkError::NetworkTimeout);
                    }
                    continue;
                }
                Err(e) => return Err(BroadlinkError::Io(e)),
            }
        }
    }

    /// Send without waiting for a reply, used by the discovery broadcast
    /// which collects responses out-of-band.
    pub fn send_to(&self, packet: &[u8], remote: SocketAddr) -> Result<()> {
        self.socket
            .send_to(packet, remote)
            .map_err(|_| BroadlinkError::SendError)?;
        Ok(())
    }

    /// A single receive attempt, honouring the channel's per-attempt
    /// timeout. Returns `Ok(None)` on timeout rather than an error, since
    /// discovery treats a quiet network as "no more responses yet" rather
    /// than failure.
    pub fn recv_from(&self) -> Result<Option<(Vec<u8>, SocketAddr)>> {
        let mut buf = [0u8; 2048];
        match self.socket.recv_from(&mut buf) {
            Ok((n, from)) => Ok(Some((buf[..n].to_vec(), from))),
            Err(e) if is_timeout(&e) => Ok(None),
            Err(e) => Err(BroadlinkError::Io(e)),
        }
    }
}

fn is_timeout(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
    )
}
