//! Graphite-style metric lines: `<key>\t<value>\t<unix seconds>`.

use std::fmt;
use std::io::{self, Write};
use std::time::{SystemTime, UNIX_EPOCH};
use crate::stats::Summary;

#[derive(Clone, Debug, PartialEq)]
pub struct MetricLine {
    pub name:      String,
    pub value:     Value,
    pub timestamp: u64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Value {
    Count(usize),
    Millis(f64),
}

/// Builds the lines for `summary` in emission order: the two counts, then
/// max, min, average and 90th percentile when any reply arrived.
pub fn lines(prefix: &str, summary: &Summary, timestamp: u64) -> Vec<MetricLine> {
    let count = |key: &str, n| MetricLine {
        name:  format!("pinging.{}_rtt_count.{}", prefix, key),
        value: Value::Count(n),
        timestamp,
    };
    let rtt = |key: &str, ms| MetricLine {
        name:  format!("pinging.{}_rtt_ms.{}", prefix, key),
        value: Value::Millis(ms),
        timestamp,
    };

    let mut lines = vec![
        count("success", summary.success),
        count("error",   summary.error),
    ];

    if let Some(t) = &summary.timing {
        lines.push(rtt("max",           t.max));
        lines.push(rtt("min",           t.min));
        lines.push(rtt("average",       t.average));
        lines.push(rtt("90_percentile", t.p90));
    }

    lines
}

pub fn emit<W: Write>(out: &mut W, prefix: &str, summary: &Summary, timestamp: u64) -> io::Result<()> {
    for line in lines(prefix, summary, timestamp) {
        writeln!(out, "{}", line)?;
    }
    out.flush()
}

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

impl fmt::Display for MetricLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.name, self.value, self.timestamp)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Count(n)  => write!(f, "{}", n),
            Value::Millis(v) => write!(f, "{}", v),
        }
    }
}
