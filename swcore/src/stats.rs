//! Counters describing what the transform did.
use enum_map::{Enum, EnumMap};
use parking_lot::Mutex;
use strum::{EnumIter, IntoEnumIterator};

/// Events counted by the transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, EnumIter)]
pub enum Statistic {
    /// A call was guarded by a single comparison.
    WrappedOneCond,
    /// A call was guarded by the disjunction of two comparisons.
    WrappedTwoCond,
}

impl Statistic {
    pub fn description(&self) -> &'static str {
        match self {
            Statistic::WrappedOneCond => "Number of One-Condition Wrappers Inserted",
            Statistic::WrappedTwoCond => "Number of Two-Condition Wrappers Inserted",
        }
    }

    /// Statistic matching a guard made of `terms` comparisons.
    pub fn for_term_count(terms: usize) -> Option<Self> {
        match terms {
            1 => Some(Statistic::WrappedOneCond),
            2 => Some(Statistic::WrappedTwoCond),
            _ => None,
        }
    }
}

/// Receiver of [`Statistic`] events.
pub trait StatisticsSink: Sync {
    fn record(&self, stat: Statistic);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoStatistics;

impl StatisticsSink for NoStatistics {
    fn record(&self, _stat: Statistic) {}
}

/// Thread-safe in-memory counters.
#[derive(Debug, Default)]
pub struct PassStatistics {
    counters: Mutex<EnumMap<Statistic, u64>>,
}

impl PassStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, stat: Statistic) -> u64 {
        self.counters.lock()[stat]
    }

    pub fn snapshot(&self) -> EnumMap<Statistic, u64> {
        *self.counters.lock()
    }

    pub fn reset(&self) {
        *self.counters.lock() = EnumMap::default();
    }
}

impl StatisticsSink for PassStatistics {
    fn record(&self, stat: Statistic) {
        self.counters.lock()[stat] += 1;
    }
}

impl std::fmt::Display for PassStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counters = self.snapshot();
        for stat in Statistic::iter() {
            writeln!(f, "{:>6} libcalls-shrinkwrap - {}", counters[stat], stat.description())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_and_reset() {
        let stats = PassStatistics::new();
        stats.record(Statistic::WrappedTwoCond);
        stats.record(Statistic::WrappedTwoCond);
        stats.record(Statistic::WrappedOneCond);
        assert_eq!(stats.get(Statistic::WrappedOneCond), 1);
        assert_eq!(stats.get(Statistic::WrappedTwoCond), 2);

        stats.reset();
        assert_eq!(stats.snapshot().values().sum::<u64>(), 0);
    }

    #[test]
    fn report_lists_every_counter() {
        let stats = PassStatistics::new();
        stats.record(Statistic::WrappedOneCond);
        let report = stats.to_string();
        assert!(
            report.contains("1 libcalls-shrinkwrap - Number of One-Condition Wrappers Inserted")
        );
        assert!(
            report.contains("0 libcalls-shrinkwrap - Number of Two-Condition Wrappers Inserted")
        );
    }
}
