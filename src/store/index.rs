use std::collections::BTreeMap;

use crate::model::TickMetric;

/// Positions in the append-only metric log, grouped by tick.
///
/// Covers `metrics[..indexed]`. Rows pushed onto the log directly (a Postgres
/// fetch, a hand-built test world) are scanned linearly until the next
/// `catch_up`.
#[derive(Debug, Default)]
pub(crate) struct MetricIndex {
    by_tick: BTreeMap<u64, Vec<usize>>,
    indexed: usize,
}

impl MetricIndex {
    /// Index every row appended since the last call.
    pub(crate) fn catch_up(&mut self, metrics: &[TickMetric]) {
        if self.indexed > metrics.len() {
            // The log was replaced or truncated
            *self = Self::default();
        }
        for (pos, metric) in metrics.iter().enumerate().skip(self.indexed) {
            self.by_tick.entry(metric.tick).or_default().push(pos);
        }
        self.indexed = metrics.len();
    }

    /// Rows that may fall within `from..=to`, in creation order.
    ///
    /// Unindexed rows are always included; callers still apply their filter.
    pub(crate) fn candidates<'a>(
        &self,
        metrics: &'a [TickMetric],
        from: Option<u64>,
        to: Option<u64>,
    ) -> Vec<&'a TickMetric> {
        if self.indexed > metrics.len() || (from.is_none() && to.is_none()) {
            return metrics.iter().collect();
        }
        let lo = from.unwrap_or(0);
        let hi = to.unwrap_or(u64::MAX);
        let mut positions: Vec<usize> = if lo <= hi {
            self.by_tick
                .range(lo..=hi)
                .flat_map(|(_, p)| p.iter().copied())
                .collect()
        } else {
            Vec::new()
        };
        positions.sort_unstable();
        positions
            .into_iter()
            .map(|pos| &metrics[pos])
            .chain(metrics[self.indexed..].iter())
            .collect()
    }
}
