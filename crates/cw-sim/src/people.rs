//! Agent population and disease progression.

use cw_core::{Error, Result};
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::parameters::Validated;

/// Disease state of one agent. Day fields are absolute simulation days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Never infected.
    Susceptible,
    /// Infected, not yet infectious.
    Exposed {
        /// Day the agent becomes infectious.
        infectious_on: usize,
        /// Day the infection ends.
        ends_on: usize,
        /// Whether the infection ends in death.
        dies: bool,
    },
    /// Able to infect contacts.
    Infectious {
        /// Day the infection ends.
        ends_on: usize,
        /// Whether the infection ends in death.
        dies: bool,
    },
    /// Recovered and immune.
    Recovered,
    /// Died of the infection.
    Dead,
}

/// Per-day state counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Census {
    /// Susceptible agents.
    pub susceptible: usize,
    /// Exposed agents.
    pub exposed: usize,
    /// Infectious agents.
    pub infectious: usize,
    /// Recovered agents.
    pub recovered: usize,
    /// Dead agents.
    pub dead: usize,
}

/// Draws incubation and infection durations.
struct Progression {
    incubation: Normal<f64>,
    duration: Normal<f64>,
    cfr: f64,
    timetodie: f64,
}

impl Progression {
    fn new(v: &Validated) -> Result<Self> {
        let incubation = Normal::new(v.incub, v.incub_std)
            .map_err(|e| Error::Validation(format!("incubation distribution: {e}")))?;
        let duration = Normal::new(v.dur, v.dur_std)
            .map_err(|e| Error::Validation(format!("duration distribution: {e}")))?;
        Ok(Self { incubation, duration, cfr: v.cfr, timetodie: v.timetodie })
    }

    /// Status for an agent exposed on day `t`. Sampled periods are at least one day.
    fn expose(&self, t: usize, rng: &mut StdRng) -> Status {
        let incub = self.incubation.sample(rng).round().max(1.0) as usize;
        let infectious_on = t.saturating_add(incub);
        let dies = rng.random::<f64>() < self.cfr;
        let ends_on = if dies {
            t.saturating_add(self.timetodie.round() as usize).max(infectious_on.saturating_add(1))
        } else {
            infectious_on.saturating_add(self.duration.sample(rng).round().max(1.0) as usize)
        };
        Status::Exposed { infectious_on, ends_on, dies }
    }
}

/// The simulated population.
pub struct People {
    status: Vec<Status>,
    progression: Progression,
}

impl People {
    /// Population of `v.n` susceptibles with `v.n_infected` seeded as infectious on day 0.
    pub(crate) fn seeded(v: &Validated, rng: &mut StdRng) -> Result<Self> {
        let progression = Progression::new(v)?;
        let mut status = vec![Status::Susceptible; v.n];
        for s in status.iter_mut().take(v.n_infected) {
            *s = match progression.expose(0, rng) {
                Status::Exposed { infectious_on, ends_on, dies } => {
                    Status::Infectious { ends_on: ends_on.saturating_sub(infectious_on), dies }
                }
                other => other,
            };
        }
        Ok(Self { status, progression })
    }

    /// Advance disease states to day `t`; returns deaths that occurred.
    pub(crate) fn progress(&mut self, t: usize) -> usize {
        let mut deaths = 0;
        for s in &mut self.status {
            if let Status::Exposed { infectious_on, ends_on, dies } = *s
                && infectious_on <= t
            {
                *s = Status::Infectious { ends_on, dies };
            }
            if let Status::Infectious { ends_on, dies } = *s
                && ends_on <= t
            {
                if dies {
                    deaths += 1;
                    *s = Status::Dead;
                } else {
                    *s = Status::Recovered;
                }
            }
        }
        deaths
    }

    /// Random contacts of every infectious agent on day `t`; returns new infections.
    pub(crate) fn transmit(&mut self, t: usize, beta: f64, contacts: usize, rng: &mut StdRng) -> usize {
        if beta <= 0.0 || contacts == 0 {
            return 0;
        }
        let n = self.status.len();
        let sources = self.status.iter().filter(|s| matches!(s, Status::Infectious { .. })).count();

        let mut infections = 0;
        for _ in 0..sources.saturating_mul(contacts) {
            let target = rng.random_range(0..n);
            if self.status[target] == Status::Susceptible && rng.random::<f64>() < beta {
                self.status[target] = self.progression.expose(t, rng);
                infections += 1;
            }
        }
        infections
    }

    /// Count agents per state.
    pub fn census(&self) -> Census {
        let mut c = Census::default();
        for s in &self.status {
            match s {
                Status::Susceptible => c.susceptible += 1,
                Status::Exposed { .. } => c.exposed += 1,
                Status::Infectious { .. } => c.infectious += 1,
                Status::Recovered => c.recovered += 1,
                Status::Dead => c.dead += 1,
            }
        }
        c
    }

    /// Population size.
    pub fn len(&self) -> usize {
        self.status.len()
    }

    /// Whether the population is empty.
    pub fn is_empty(&self) -> bool {
        self.status.is_empty()
    }
}
