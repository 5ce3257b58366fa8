use std::cell::Cell;
use std::io::{self, Write};
use std::net::IpAddr;
use std::time::Duration;
use pinging::{driver, Engine, Error, ProbeConfig, Statistics, Target};

/// Scripted engine: resolves to loopback unless told otherwise and replays
/// fixed round trip times, optionally failing session setup.
struct Scripted {
    resolves: bool,
    setup:    bool,
    rtts:     Vec<u64>,
    runs:     Cell<usize>,
}

impl Scripted {
    fn replying(rtts: &[u64]) -> Self {
        Self { resolves: true, setup: true, rtts: rtts.to_vec(), runs: Cell::new(0) }
    }

    fn unresolvable() -> Self {
        Self { resolves: false, ..Self::replying(&[]) }
    }

    fn broken() -> Self {
        Self { setup: false, ..Self::replying(&[]) }
    }
}

impl Engine for Scripted {
    fn resolve(&self, host: &str) -> Result<Target, Error> {
        match self.resolves {
            true  => Ok(Target::new(host, IpAddr::from([127, 0, 0, 1]))),
            false => Err(Error::Resolve {
                host:   host.to_owned(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such host"),
            }),
        }
    }

    fn run(&self, _target: &Target, config: &ProbeConfig) -> Result<Statistics, Error> {
        self.runs.set(self.runs.get() + 1);

        if !self.setup {
            return Err(Error::Setup("operation not permitted".to_string()));
        }

        let rtts = self.rtts.iter().copied().map(Duration::from_micros).collect();
        Ok(Statistics::new(config.count, rtts))
    }
}

fn args(list: &[&str]) -> Vec<String> {
    std::iter::once("pinging").chain(list.iter().copied()).map(String::from).collect()
}

fn execute(engine: Scripted, list: &[&str]) -> (Result<(), Error>, String) {
    let mut out = Vec::new();
    let result = driver::execute(&args(list), &mut out, || Ok(engine));
    (result, String::from_utf8(out).unwrap())
}

fn probe(engine: &Scripted, list: &[&str]) -> (Result<(), Error>, Vec<Vec<String>>) {
    let config = match pinging::Command::parse(list).unwrap() {
        pinging::Command::Probe(config) => config,
        other => panic!("expected probe, got {:?}", other),
    };

    let mut out = Vec::new();
    let result = driver::probe(engine, &config, &mut out);

    let lines = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|l| l.split('\t').map(String::from).collect())
        .collect();

    (result, lines)
}

#[test]
fn successful_run_emits_six_lines() {
    let engine = Scripted::replying(&[1200, 800, 1500, 950, 1000, 1100, 700, 900, 1300, 1050]);
    let (result, lines) = probe(&engine, &["--host=localhost", "--key-prefix=test"]);

    assert!(result.is_ok());

    let keys = lines.iter().map(|l| l[0].as_str()).collect::<Vec<_>>();
    assert_eq!(keys, vec![
        "pinging.test_rtt_count.success",
        "pinging.test_rtt_count.error",
        "pinging.test_rtt_ms.max",
        "pinging.test_rtt_ms.min",
        "pinging.test_rtt_ms.average",
        "pinging.test_rtt_ms.90_percentile",
    ]);

    let values = lines.iter().map(|l| l[1].as_str()).collect::<Vec<_>>();
    assert_eq!(values, vec!["10", "0", "1.5", "0.7", "1.05", "1.3"]);

    let stamp = &lines[0][2];
    assert!(stamp.parse::<u64>().is_ok());
    assert!(lines.iter().all(|l| l.len() == 3 && &l[2] == stamp));
}

#[test]
fn partial_loss_counts_errors() {
    let engine = Scripted::replying(&[500, 600, 700]);
    let (result, lines) = probe(&engine, &["--host=h", "--key-prefix=p", "--count=5"]);

    assert!(result.is_ok());
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0][1], "3");
    assert_eq!(lines[1][1], "2");
    assert_eq!(lines[5][1], "0.7");
}

#[test]
fn total_loss_emits_counts_only() {
    let engine = Scripted::replying(&[]);
    let (result, lines) = probe(&engine, &["--host=h", "--key-prefix=test"]);

    assert!(result.is_ok());
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0][..2], ["pinging.test_rtt_count.success", "0"]);
    assert_eq!(lines[1][..2], ["pinging.test_rtt_count.error", "10"]);
}

#[test]
fn unresolvable_host_reports_full_loss() {
    let engine = Scripted::unresolvable();
    let (result, lines) = probe(&engine, &["--host=invalid", "--key-prefix=test"]);

    assert!(matches!(result, Err(Error::Resolve { .. })));
    assert_eq!(engine.runs.get(), 0);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0][..2], ["pinging.test_rtt_count.success", "0"]);
    assert_eq!(lines[1][..2], ["pinging.test_rtt_count.error", "10"]);
}

#[test]
fn setup_failure_is_not_fatal() {
    let engine = Scripted::broken();
    let (result, lines) = probe(&engine, &["--host=h", "--key-prefix=test", "--count=4"]);

    assert!(result.is_ok());
    assert_eq!(engine.runs.get(), 1);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0][1], "0");
    assert_eq!(lines[1][1], "4");
}

#[test]
fn missing_flags_fail_without_output() {
    for list in [&["--host=localhost"][..], &["--key-prefix=test"][..], &[][..]] {
        let (result, out) = execute(Scripted::replying(&[1000]), list);
        assert!(matches!(result, Err(Error::Config(_))));
        assert!(out.is_empty());
    }
}

#[test]
fn version_short_circuits() {
    for list in [&["--version"][..], &["-v", "--count=nope"][..]] {
        let (result, out) = execute(Scripted::replying(&[1000]), list);
        assert!(result.is_ok());
        assert!(out.starts_with("pinging "));
        assert!(out.contains(env!("CARGO_PKG_VERSION")));
        assert!(out.contains("Compiler: "));
        assert!(!out.contains("rtt_count"));
    }
}

#[test]
fn engine_is_not_built_for_version() {
    let mut out = Vec::new();
    let result = driver::execute(&args(&["-v"]), &mut out, || -> Result<Scripted, Error> {
        panic!("engine built for --version")
    });
    assert!(result.is_ok());
}

#[test]
fn full_run_through_execute() {
    let (result, out) = execute(
        Scripted::replying(&[2000, 1000]),
        &["--host=localhost", "--key-prefix=test", "--count=2"],
    );

    assert!(result.is_ok());
    assert_eq!(out.lines().count(), 6);
    assert!(out.contains("pinging.test_rtt_ms.90_percentile\t1\t"));
}

#[test]
fn zero_count_sends_nothing() {
    let engine = Scripted::replying(&[]);
    let (result, lines) = probe(&engine, &["--host=h", "--key-prefix=z", "--count=0"]);

    assert!(result.is_ok());
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0][1], "0");
    assert_eq!(lines[1][1], "0");
}

#[test]
fn negative_count_exits_before_probing() {
    let (result, out) = execute(Scripted::replying(&[1000]), &["--host=h", "--key-prefix=z", "--count=-1"]);
    assert!(matches!(result, Err(Error::Config(_))));
    assert!(out.is_empty());
}

/// Accepts writes but refuses to flush.
struct Unflushable(Vec<u8>);

impl Write for Unflushable {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }
}

#[test]
fn flush_failure_is_reported() {
    let mut out = Unflushable(Vec::new());
    let result = driver::execute(&args(&["--version"]), &mut out, || Ok(Scripted::replying(&[])));

    assert!(matches!(result, Err(Error::Io(_))));
    assert!(!out.0.is_empty());
}
