use std::io::Write;
use log::{info, warn};
use crate::config::{usage, Command, ProbeConfig};
use crate::emit::{emit, unix_now};
use crate::engine::{Engine, Target};
use crate::stats::{Statistics, Summary};
use crate::Error;

/// Runs the program for `args` (program name first), writing metric lines
/// or version/help text to `out`. The engine is only built when probing.
pub fn execute<E, F, W>(args: &[String], out: &mut W, engine: F) -> Result<(), Error>
where
    E: Engine,
    F: FnOnce() -> Result<E, Error>,
    W: Write,
{
    let program = args.first().map(String::as_str).unwrap_or(env!("CARGO_PKG_NAME"));

    let result = match Command::parse(args.get(1..).unwrap_or_default())? {
        Command::Version       => writeln!(out, "{}", version(program)).map_err(Error::from),
        Command::Help          => writeln!(out, "{}", usage(program)).map_err(Error::from),
        Command::Probe(config) => engine().and_then(|engine| probe(&engine, &config, out)),
    };

    // lines already written on the failure path still have to reach stdout
    out.flush()?;
    result
}

/// Resolves, probes and emits. A resolution failure still reports the
/// whole run as lost before returning the error.
pub fn probe<E: Engine, W: Write>(engine: &E, config: &ProbeConfig, out: &mut W) -> Result<(), Error> {
    let ProbeConfig { host, count, key_prefix, .. } = config;

    let target = match engine.resolve(host) {
        Ok(target) => target,
        Err(e) => {
            emit(out, key_prefix, &Summary::failed(*count), unix_now())?;
            return Err(e);
        }
    };

    info!("pinging {} ({})", target.host(), target.addr());

    let stats = run(engine, &target, config);
    let summary = Summary::reduce(&stats, *count);

    emit(out, key_prefix, &summary, unix_now())?;

    Ok(())
}

/// One echo session. Setup failures degrade to an empty snapshot.
pub fn run<E: Engine>(engine: &E, target: &Target, config: &ProbeConfig) -> Statistics {
    match engine.run(target, config) {
        Ok(stats) => stats,
        Err(e) => {
            warn!("error in preflight: {}", e);
            Statistics::default()
        }
    }
}

pub fn version(program: &str) -> String {
    format!(
        "{} {}\nCompiler: {}",
        program,
        env!("CARGO_PKG_VERSION"),
        env!("PINGING_RUSTC_VERSION"),
    )
}
