use std::io::{self, Read};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use anyhow::Result;
use etherparse::{IpNumber, Ipv4Header};
use log::{debug, error};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use tokio::io::unix::AsyncFd;
use tokio::sync::broadcast;
use crate::icmp::{Family, Message};
use super::ping::Mode;
use super::probe::{Probe, Token};
use super::state::State;

pub struct Sock {
    sock: Arc<AsyncFd<Socket>>,
}

impl Sock {
    pub fn new(
        family: Family,
        mode: Mode,
        state: Arc<State>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<Self> {
        let (domain, proto) = match family {
            Family::V4 => (Domain::IPV4, Protocol::ICMPV4),
            Family::V6 => (Domain::IPV6, Protocol::ICMPV6),
        };

        let kind = match mode {
            Mode::Raw   => Type::RAW,
            Mode::Dgram => Type::DGRAM,
        };

        let sock = Socket::new(domain, kind, Some(proto))?;
        sock.set_nonblocking(true)?;

        let sock = Arc::new(AsyncFd::new(sock)?);
        let rx = sock.clone();

        tokio::spawn(async move {
            match recv(rx, family, state, shutdown).await {
                Ok(()) => debug!("recv finished"),
                Err(e) => error!("recv failed: {}", e),
            }
        });

        Ok(Self { sock })
    }

    pub async fn send(&self, probe: &Probe) -> Result<Instant> {
        let pkt  = probe.encode();
        let addr = SockAddr::from(SocketAddr::new(probe.addr, 0));

        loop {
            let mut guard = self.sock.writable().await?;
            if let Ok(result) = guard.try_io(|s| s.get_ref().send_to(&pkt, &addr)) {
                result?;
                return Ok(Instant::now());
            }
        }
    }
}

async fn recv(
    sock: Arc<AsyncFd<Socket>>,
    family: Family,
    state: Arc<State>,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let mut pkt = vec![0u8; 65536];
    loop {
        tokio::select! {
            result = read(&sock, &mut pkt) => {
                let n = result?;
                let now = Instant::now();

                if let Err(e) = dispatch(family, &pkt[..n], now, &state) {
                    debug!("discarding packet: {}", e);
                }
            }
            _ = shutdown.recv() => {
                break;
            }
        }
    }
    Ok(())
}

async fn read(sock: &AsyncFd<Socket>, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        let mut guard = sock.readable().await?;
        let result = guard.try_io(|s| {
            let mut sock: &Socket = s.get_ref();
            sock.read(buf)
        });
        if let Ok(result) = result {
            return result;
        }
    }
}

fn dispatch(family: Family, pkt: &[u8], now: Instant, state: &State) -> Result<()> {
    // raw IPv4 sockets deliver the IP header, everything else starts at ICMP
    let pkt = match pkt.first() {
        Some(b) if family == Family::V4 && *b >> 4 == 4 => {
            match Ipv4Header::from_slice(pkt)? {
                (Ipv4Header { protocol: ICMP4, .. }, tail) => tail,
                _                                          => return Ok(()),
            }
        }
        _ => pkt,
    };

    if let Message::EchoReply(echo) = Message::decode(family, pkt)? {
        if let Some(token) = Token::from_payload(echo.data) {
            if let Some(tx) = state.remove(&token) {
                let _ = tx.send(now);
            }
        }
    }

    Ok(())
}

const ICMP4: u8 = IpNumber::Icmp as u8;
