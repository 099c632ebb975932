//! Wall-clock timings for the engine's phases

use std::fmt;
use std::time::{Duration, Instant};

/// Phases the engine times
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatType {
    /// Whole `load_sheet` call
    Overall,
    /// Vertex creation and edge wiring
    GraphBuild,
    /// Topological sort and cycle isolation
    TopSort,
    /// Evaluation passes (accumulated across edits)
    Evaluation,
}

impl StatType {
    pub const ALL: [StatType; 4] = [
        StatType::Overall,
        StatType::GraphBuild,
        StatType::TopSort,
        StatType::Evaluation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StatType::Overall => "OVERALL",
            StatType::GraphBuild => "GRAPH_BUILD",
            StatType::TopSort => "TOP_SORT",
            StatType::Evaluation => "EVALUATION",
        }
    }

    fn slot(self) -> usize {
        match self {
            StatType::Overall => 0,
            StatType::GraphBuild => 1,
            StatType::TopSort => 2,
            StatType::Evaluation => 3,
        }
    }
}

/// Timing collector
///
/// Durations accumulate until [`Statistics::reset`]; a phase that was
/// started but never ended contributes nothing.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    durations: [Duration; 4],
    started: [Option<Instant>; 4],
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn start(&mut self, stat: StatType) {
        self.started[stat.slot()] = Some(Instant::now());
    }

    pub fn end(&mut self, stat: StatType) {
        if let Some(started) = self.started[stat.slot()].take() {
            self.durations[stat.slot()] += started.elapsed();
        }
    }

    /// Run `f`, adding its wall-clock time to `stat`
    pub fn measure<T>(&mut self, stat: StatType, f: impl FnOnce() -> T) -> T {
        let started = Instant::now();
        let result = f();
        self.durations[stat.slot()] += started.elapsed();
        result
    }

    pub fn duration(&self, stat: StatType) -> Duration {
        self.durations[stat.slot()]
    }
}

/// Snapshot returned by [`Engine::get_stats`](crate::Engine::get_stats)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineStats {
    pub overall: Duration,
    pub graph_build: Duration,
    pub top_sort: Duration,
    pub evaluation: Duration,
    /// Vertices in the graph, ranges and empty cells included
    pub vertex_count: usize,
    pub edge_count: usize,
    pub formula_count: usize,
    /// Formula vertices sitting on a dependency cycle
    pub cycled_count: usize,
    /// Full evaluation passes since the last load
    pub evaluation_passes: usize,
}

impl EngineStats {
    pub fn duration(&self, stat: StatType) -> Duration {
        match stat {
            StatType::Overall => self.overall,
            StatType::GraphBuild => self.graph_build,
            StatType::TopSort => self.top_sort,
            StatType::Evaluation => self.evaluation,
        }
    }
}

impl fmt::Display for EngineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stat in StatType::ALL {
            writeln!(f, "{:<12} {:?}", stat.name(), self.duration(stat))?;
        }
        writeln!(f, "vertices     {}", self.vertex_count)?;
        writeln!(f, "edges        {}", self.edge_count)?;
        writeln!(f, "formulas     {}", self.formula_count)?;
        writeln!(f, "cycled       {}", self.cycled_count)?;
        write!(f, "passes       {}", self.evaluation_passes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_returns_result_and_accumulates() {
        let mut stats = Statistics::new();
        let value = stats.measure(StatType::TopSort, || {
            std::thread::sleep(Duration::from_millis(2));
            42
        });
        assert_eq!(value, 42);
        let first = stats.duration(StatType::TopSort);
        assert!(first >= Duration::from_millis(2));

        stats.measure(StatType::TopSort, || ());
        assert!(stats.duration(StatType::TopSort) >= first);
        assert_eq!(stats.duration(StatType::Evaluation), Duration::ZERO);
    }

    #[test]
    fn test_start_end_and_reset() {
        let mut stats = Statistics::new();
        stats.end(StatType::Overall);
        assert_eq!(stats.duration(StatType::Overall), Duration::ZERO);

        stats.start(StatType::Overall);
        std::thread::sleep(Duration::from_millis(1));
        stats.end(StatType::Overall);
        assert!(stats.duration(StatType::Overall) > Duration::ZERO);

        stats.reset();
        assert_eq!(stats.duration(StatType::Overall), Duration::ZERO);
    }

    #[test]
    fn test_snapshot_display_lists_every_phase() {
        let text = EngineStats::default().to_string();
        for stat in StatType::ALL {
            assert!(text.contains(stat.name()));
        }
        assert!(text.ends_with("passes       0"));
    }
}
