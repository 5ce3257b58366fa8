use std::convert::TryFrom;
use std::time::Duration;
use gumdrop::Options;
use crate::Error;

#[derive(Debug, Options)]
pub struct Args {
    #[options(help = "print this help message")]
    help:       bool,
    #[options(short = "v", help = "show version")]
    version:    bool,
    #[options(no_short, help = "hostname to ping", meta = "HOST")]
    host:       Option<String>,
    #[options(no_short, default = "1000", help = "timeout millisec per ping")]
    timeout:    u64,
    #[options(no_short, default = "10", help = "sleep millisec after every ping")]
    interval:   u64,
    #[options(no_short, default = "10", help = "count sending ping")]
    count:      usize,
    #[options(no_short, default = "56", help = "payload size")]
    size:       usize,
    #[options(no_short, help = "use privileged ICMP raw socket")]
    privileged: bool,
    #[options(no_short, help = "metric key prefix", meta = "PREFIX")]
    key_prefix: Option<String>,
}

/// Validated settings for a single measurement run.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbeConfig {
    pub host:       String,
    pub timeout:    Duration,
    pub interval:   Duration,
    pub count:      usize,
    pub size:       usize,
    pub privileged: bool,
    pub key_prefix: String,
}

#[derive(Debug, PartialEq)]
pub enum Command {
    Version,
    Help,
    Probe(ProbeConfig),
}

impl Command {
    /// Parses the arguments following the program name. A version flag
    /// wins over any parse or validation error.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, Error> {
        let version = || args.iter().any(|a| matches!(a.as_ref(), "-v" | "--version"));

        match Args::parse_args_default(args) {
            Ok(args) if args.version => Ok(Command::Version),
            Ok(args) if args.help    => Ok(Command::Help),
            Ok(args)                 => ProbeConfig::try_from(args).map(Command::Probe),
            Err(_) if version()      => Ok(Command::Version),
            Err(e)                   => Err(Error::Config(e.to_string())),
        }
    }
}

impl TryFrom<Args> for ProbeConfig {
    type Error = Error;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let Args { host, timeout, interval, count, size, privileged, key_prefix, .. } = args;

        let host = host.ok_or_else(|| {
            Error::Config("missing required option `--host`".to_string())
        })?;
        let key_prefix = key_prefix.ok_or_else(|| {
            Error::Config("missing required option `--key-prefix`".to_string())
        })?;

        Ok(Self {
            host,
            timeout:  Duration::from_millis(timeout),
            interval: Duration::from_millis(interval),
            count,
            size,
            privileged,
            key_prefix,
        })
    }
}

pub fn usage(program: &str) -> String {
    format!("Usage: {} [OPTIONS]\n\n{}", program, Args::usage())
}
