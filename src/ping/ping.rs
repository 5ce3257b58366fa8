use std::{
    net::IpAddr,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Result;
use futures::future::join_all;
use log::debug;
use rand::random;
use tokio::{sync::broadcast, time::sleep};

use super::{probe::Probe, sock::Sock, state::State};
use crate::{icmp::Family, stats::Statistics};

#[derive(Copy, Clone, Debug)]
pub struct Ping {
    pub addr:     IpAddr,
    pub count:    usize,
    pub interval: Duration,
    pub expiry:   Duration,
    pub size:     usize,
}

/// Socket flavour used for echo requests. `Raw` needs elevated privileges,
/// `Dgram` uses the unprivileged ICMP datagram sockets.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Mode {
    Raw,
    Dgram,
}

pub struct Pinger {
    sock: Sock,
    state: Arc<State>,
    shutdown: broadcast::Sender<()>,
}

impl Mode {
    pub fn new(privileged: bool) -> Self {
        match privileged {
            true  => Mode::Raw,
            false => Mode::Dgram,
        }
    }
}

impl Pinger {
    pub async fn new(family: Family, mode: Mode) -> Result<Self> {
        let state = Arc::new(State::default());

        let (notify_shutdown, _) = broadcast::channel(1);

        let sock = Sock::new(family, mode, state.clone(), notify_shutdown.subscribe())?;

        Ok(Self {
            sock,
            state,
            shutdown: notify_shutdown,
        })
    }

    /// Sends `count` echo requests spaced by `interval` and waits for each
    /// reply up to `expiry` after its own send time. Samples come back in
    /// arrival order.
    pub async fn ping(&self, ping: &Ping) -> Statistics {
        let Ping {
            addr,
            count,
            interval,
            expiry,
            size,
        } = *ping;

        let ident = random();
        let mut sent = 0;
        let mut pending = Vec::with_capacity(count);

        for n in 0..count {
            if n > 0 {
                sleep(interval).await;
            }

            let seq = n as u16;
            let probe = Probe::new(addr, ident, seq, size);
            let lease = self.state.insert(probe.token);

            match self.sock.send(&probe).await {
                Ok(at) => {
                    sent += 1;
                    pending.push(async move {
                        let when = lease.reply(at + expiry).await?;
                        Some((when, when.saturating_duration_since(at)))
                    });
                }
                Err(e) => debug!("seq {} send failed: {}", seq, e),
            }
        }

        let rtts = by_arrival(join_all(pending).await);

        debug!("{} of {} probes to {} answered", rtts.len(), sent, addr);

        Statistics::new(sent, rtts)
    }
}

/// Round trip times of the answered probes, ordered by reply arrival
/// rather than by send order.
fn by_arrival<I>(replies: I) -> Vec<Duration>
where
    I: IntoIterator<Item = Option<(Instant, Duration)>>,
{
    let mut replies = replies.into_iter().flatten().collect::<Vec<_>>();
    replies.sort_by_key(|(when, _)| *when);
    replies.into_iter().map(|(_, rtt)| rtt).collect()
}

impl Drop for Pinger {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown.send(()) {
            debug!("background task already stopped: {}", e);
        }
    }
}
