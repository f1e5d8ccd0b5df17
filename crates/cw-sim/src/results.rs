//! Daily time series collected during a run.

use serde::Serialize;

use crate::people::Census;

/// Daily results, already multiplied by the population scale factor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Results {
    /// Simulation day.
    pub t: Vec<f64>,
    /// Susceptible count.
    pub susceptible: Vec<f64>,
    /// Exposed (incubating) count.
    pub exposed: Vec<f64>,
    /// Infectious count.
    pub infectious: Vec<f64>,
    /// Recovered count.
    pub recovered: Vec<f64>,
    /// Cumulative deaths.
    pub dead: Vec<f64>,
    /// New infections on the day.
    pub new_infections: Vec<f64>,
    /// Cumulative infections including the seeded ones.
    pub cum_infections: Vec<f64>,
    /// New deaths on the day.
    pub new_deaths: Vec<f64>,
}

/// Unscaled flows for one day.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct DailyFlows {
    pub new_infections: usize,
    pub cum_infections: usize,
    pub new_deaths: usize,
}

/// Final-day totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    /// Number of simulated days.
    pub n_days: usize,
    /// Total infections.
    pub cum_infections: f64,
    /// Total deaths.
    pub deaths: f64,
    /// Largest infectious count on a single day.
    pub peak_infectious: f64,
    /// Day of the infectious peak.
    pub peak_day: usize,
}

impl Results {
    pub(crate) fn with_capacity(n_days: usize) -> Self {
        let v = || Vec::with_capacity(n_days);
        Self {
            t: v(),
            susceptible: v(),
            exposed: v(),
            infectious: v(),
            recovered: v(),
            dead: v(),
            new_infections: v(),
            cum_infections: v(),
            new_deaths: v(),
        }
    }

    pub(crate) fn record(&mut self, t: usize, census: Census, flows: DailyFlows, scale: f64) {
        self.t.push(t as f64);
        self.susceptible.push(census.susceptible as f64 * scale);
        self.exposed.push(census.exposed as f64 * scale);
        self.infectious.push(census.infectious as f64 * scale);
        self.recovered.push(census.recovered as f64 * scale);
        self.dead.push(census.dead as f64 * scale);
        self.new_infections.push(flows.new_infections as f64 * scale);
        self.cum_infections.push(flows.cum_infections as f64 * scale);
        self.new_deaths.push(flows.new_deaths as f64 * scale);
    }

    /// Number of recorded days.
    pub fn len(&self) -> usize {
        self.t.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Totals at the end of the run.
    pub fn summary(&self) -> Summary {
        let (peak_day, peak_infectious) = self
            .infectious
            .iter()
            .copied()
            .enumerate()
            .fold((0, 0.0), |best, (i, v)| if v > best.1 { (i, v) } else { best });
        Summary {
            n_days: self.len(),
            cum_infections: self.cum_infections.last().copied().unwrap_or(0.0),
            deaths: self.dead.last().copied().unwrap_or(0.0),
            peak_infectious,
            peak_day,
        }
    }
}
