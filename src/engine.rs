use std::io;
use std::net::IpAddr;
use tokio::net::lookup_host;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::oneshot;
use crate::config::ProbeConfig;
use crate::icmp::Family;
use crate::ping::{Mode, Ping, Pinger};
use crate::stats::Statistics;
use crate::Error;

/// The echo transport as seen by the driver: name resolution and one
/// blocking echo session.
pub trait Engine {
    fn resolve(&self, host: &str) -> Result<Target, Error>;

    fn run(&self, target: &Target, config: &ProbeConfig) -> Result<Statistics, Error>;
}

/// A resolved destination.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Target {
    host: String,
    addr: IpAddr,
}

/// ICMP engine driving the async pinger on a private current-thread runtime.
pub struct NetEngine {
    runtime: Runtime,
}

impl Target {
    pub fn new(host: &str, addr: IpAddr) -> Self {
        Self { host: host.to_owned(), addr }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn addr(&self) -> IpAddr {
        self.addr
    }
}

impl NetEngine {
    pub fn new() -> Result<Self, Error> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self { runtime })
    }
}

impl Engine for NetEngine {
    fn resolve(&self, host: &str) -> Result<Target, Error> {
        let addr = self.runtime.block_on(async {
            lookup_host((host, 0)).await?.next().ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "no addresses found")
            })
        });

        match addr {
            Ok(addr) => Ok(Target::new(host, addr.ip())),
            Err(source) => Err(Error::Resolve { host: host.to_owned(), source }),
        }
    }

    fn run(&self, target: &Target, config: &ProbeConfig) -> Result<Statistics, Error> {
        let ping = Ping {
            addr:     target.addr(),
            count:    config.count,
            interval: config.interval,
            expiry:   config.timeout,
            size:     config.size,
        };
        let mode = Mode::new(config.privileged);

        let session = async move {
            let pinger = Pinger::new(Family::of(&ping.addr), mode).await?;
            let (done, finished) = oneshot::channel();

            tokio::spawn(async move {
                let stats = pinger.ping(&ping).await;
                let _ = done.send(stats);
            });

            Ok::<_, anyhow::Error>(finished.await?)
        };

        self.runtime.block_on(session).map_err(|e| Error::Setup(format!("{:#}", e)))
    }
}
