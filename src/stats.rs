use std::time::Duration;

/// Final snapshot of one echo session, delivered once on completion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Statistics {
    pub packets_sent: usize,
    pub rtts:         Vec<Duration>,
    pub min_rtt:      Duration,
    pub max_rtt:      Duration,
    pub avg_rtt:      Duration,
}

/// Reduced view of a session: counts, and timings in milliseconds when
/// at least one reply arrived.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub success: usize,
    pub error:   usize,
    pub timing:  Option<Timing>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Timing {
    pub max:     f64,
    pub min:     f64,
    pub average: f64,
    pub p90:     f64,
}

impl Statistics {
    /// `rtts` must be in arrival order.
    pub fn new(packets_sent: usize, rtts: Vec<Duration>) -> Self {
        let min_rtt = rtts.iter().min().copied().unwrap_or_default();
        let max_rtt = rtts.iter().max().copied().unwrap_or_default();
        let avg_rtt = match rtts.len() {
            0 => Duration::default(),
            n => rtts.iter().sum::<Duration>() / n as u32,
        };

        Self { packets_sent, rtts, min_rtt, max_rtt, avg_rtt }
    }
}

impl Summary {
    pub fn reduce(stats: &Statistics, count: usize) -> Self {
        let success = stats.rtts.len();
        let error   = count.saturating_sub(success);

        let timing = match success {
            0 => None,
            n => Some(Timing {
                max:     rtt_ms(stats.max_rtt),
                min:     rtt_ms(stats.min_rtt),
                average: rtt_ms(stats.avg_rtt),
                // indexed in arrival order, the samples are not sorted
                p90:     rtt_ms(stats.rtts[p90_index(n)]),
            }),
        };

        Self { success, error, timing }
    }

    /// A run that never reached the probing stage.
    pub fn failed(count: usize) -> Self {
        Self { success: 0, error: count, timing: None }
    }
}

/// Nearest rank, zero-indexed: `round(x) - 1`, ties away from zero.
pub fn nearest_rank(x: f64) -> i64 {
    x.round() as i64 - 1
}

/// Index of the 90th percentile sample among `n > 0` samples.
pub fn p90_index(n: usize) -> usize {
    nearest_rank(n as f64 * 0.90).max(0) as usize
}

pub fn rtt_ms(rtt: Duration) -> f64 {
    rtt.as_nanos() as f64 / 1_000_000.0
}
