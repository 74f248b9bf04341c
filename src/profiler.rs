use std::cell::RefCell;
use std::collections::HashMap;
use std::thread_local;
use std::time::{Duration, Instant};

/// Per-thread stage timings for loading and analysis.
#[derive(Debug, Default)]
pub struct Profiler {
    timers: HashMap<String, Instant>,
    measurements: HashMap<String, Vec<Duration>>,
}

impl Profiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_timer(&mut self, name: &str) {
        tracing::trace!(timer = name, "start_timer");
        self.timers.insert(name.to_string(), Instant::now());
    }

    pub fn end_timer(&mut self, name: &str) {
        if let Some(start) = self.timers.remove(name) {
            let duration = start.elapsed();
            tracing::debug!(timer = name, duration_ms = ?duration.as_millis(), "end_timer");
            self.add_measurement(name, duration);
        }
    }

    pub fn add_measurement(&mut self, name: &str, duration: Duration) {
        self.measurements.entry(name.to_string()).or_default().push(duration);
    }

    pub fn get_stats(&self) -> ProfilerStats {
        let measurements = self
            .measurements
            .iter()
            .filter_map(|(name, durations)| {
                let min = *durations.iter().min()?;
                let max = *durations.iter().max()?;
                let total: Duration = durations.iter().sum();
                Some((
                    name.clone(),
                    MeasurementStats {
                        count: durations.len(),
                        total_time: total,
                        average_time: total / durations.len() as u32,
                        min_time: min,
                        max_time: max,
                    },
                ))
            })
            .collect();

        ProfilerStats { measurements }
    }

    /// Returns the stats gathered so far and starts over.
    pub fn take_stats(&mut self) -> ProfilerStats {
        let stats = self.get_stats();
        self.reset();
        stats
    }

    pub fn reset(&mut self) {
        self.timers.clear();
        self.measurements.clear();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementStats {
    pub count: usize,
    pub total_time: Duration,
    pub average_time: Duration,
    pub min_time: Duration,
    pub max_time: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct ProfilerStats {
    pub measurements: HashMap<String, MeasurementStats>,
}

impl ProfilerStats {
    /// Logs one line per stage, sorted by name.
    pub fn log_summary(&self) {
        let mut names: Vec<_> = self.measurements.keys().collect();
        names.sort();
        for name in names {
            let stats = &self.measurements[name];
            tracing::debug!(
                stage = name.as_str(),
                count = stats.count,
                average_ms = stats.average_time.as_secs_f64() * 1000.0,
                max_ms = stats.max_time.as_secs_f64() * 1000.0,
                "timing"
            );
        }
    }
}

thread_local! {
    static PROFILER: RefCell<Profiler> = RefCell::new(Profiler::new());
}

pub fn with_profiler<F, R>(f: F) -> R
where
    F: FnOnce(&mut Profiler) -> R,
{
    PROFILER.with(|p| f(&mut p.borrow_mut()))
}
