//! Model parameters and their defaults.

use cw_core::{Error, FlatParameters, Result};
use serde::Serialize;

/// Every key [`Parameters::update`] accepts, in declaration order.
pub const PARAMETER_KEYS: [&str; 16] = [
    "scale",
    "n",
    "n_infected",
    "n_days",
    "intervene",
    "unintervene",
    "intervention_eff",
    "seed",
    "r0",
    "contacts",
    "incub",
    "incub_std",
    "dur",
    "dur_std",
    "cfr",
    "timetodie",
];

/// Largest population (and initial infection count) the engine accepts.
pub const MAX_AGENTS: f64 = 1e7;
/// Longest run, and longest incubation or infection period, in days.
pub const MAX_DAYS: f64 = 10_000.0;
/// Most daily contacts per infectious agent.
pub const MAX_CONTACTS: f64 = 1_000.0;

/// Full parameter set of the model.
///
/// Counts and days are stored as floats so overrides arrive unchanged;
/// they are rounded when the simulation is validated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameters {
    /// Multiplier applied to every reported count.
    pub scale: f64,
    /// Number of simulated agents.
    pub n: f64,
    /// Agents infectious on day 0.
    pub n_infected: f64,
    /// Simulated days.
    pub n_days: f64,
    /// First intervention day; negative disables the intervention.
    pub intervene: f64,
    /// Day the intervention is lifted; negative means never.
    pub unintervene: f64,
    /// Fractional transmission reduction while the intervention is active.
    pub intervention_eff: f64,
    /// Random seed.
    pub seed: f64,
    /// Basic reproduction number.
    pub r0: f64,
    /// Daily contacts per infectious agent.
    pub contacts: f64,
    /// Mean incubation period (days).
    pub incub: f64,
    /// Incubation period standard deviation (days).
    pub incub_std: f64,
    /// Mean infectious period (days).
    pub dur: f64,
    /// Infectious period standard deviation (days).
    pub dur_std: f64,
    /// Case fatality rate.
    pub cfr: f64,
    /// Days from exposure to death for fatal cases.
    pub timetodie: f64,
    /// Emit per-day progress logs.
    pub verbose: bool,
}

/// Default parameters.
pub fn make_pars() -> Parameters {
    Parameters {
        scale: 100.0,
        n: 35_000.0,
        n_infected: 20.0,
        n_days: 60.0,
        intervene: 30.0,
        unintervene: 44.0,
        intervention_eff: 0.9,
        seed: 1.0,
        r0: 2.0,
        contacts: 20.0,
        incub: 5.0,
        incub_std: 1.0,
        dur: 8.0,
        dur_std: 2.0,
        cfr: 0.02,
        timetodie: 22.0,
        verbose: false,
    }
}

impl Default for Parameters {
    fn default() -> Self {
        make_pars()
    }
}

/// Parameters after rounding and consistency checks.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Validated {
    pub scale: f64,
    pub n: usize,
    pub n_infected: usize,
    pub n_days: usize,
    pub intervene: Option<usize>,
    pub unintervene: Option<usize>,
    pub intervention_eff: f64,
    pub seed: u64,
    pub beta: f64,
    pub contacts: usize,
    pub incub: f64,
    pub incub_std: f64,
    pub dur: f64,
    pub dur_std: f64,
    pub cfr: f64,
    pub timetodie: f64,
}

impl Parameters {
    /// Value of a parameter by key.
    pub fn get(&self, key: &str) -> Option<f64> {
        let v = match key {
            "scale" => self.scale,
            "n" => self.n,
            "n_infected" => self.n_infected,
            "n_days" => self.n_days,
            "intervene" => self.intervene,
            "unintervene" => self.unintervene,
            "intervention_eff" => self.intervention_eff,
            "seed" => self.seed,
            "r0" => self.r0,
            "contacts" => self.contacts,
            "incub" => self.incub,
            "incub_std" => self.incub_std,
            "dur" => self.dur,
            "dur_std" => self.dur_std,
            "cfr" => self.cfr,
            "timetodie" => self.timetodie,
            _ => return None,
        };
        Some(v)
    }

    fn slot(&mut self, key: &str) -> Option<&mut f64> {
        let slot = match key {
            "scale" => &mut self.scale,
            "n" => &mut self.n,
            "n_infected" => &mut self.n_infected,
            "n_days" => &mut self.n_days,
            "intervene" => &mut self.intervene,
            "unintervene" => &mut self.unintervene,
            "intervention_eff" => &mut self.intervention_eff,
            "seed" => &mut self.seed,
            "r0" => &mut self.r0,
            "contacts" => &mut self.contacts,
            "incub" => &mut self.incub,
            "incub_std" => &mut self.incub_std,
            "dur" => &mut self.dur,
            "dur_std" => &mut self.dur_std,
            "cfr" => &mut self.cfr,
            "timetodie" => &mut self.timetodie,
            _ => return None,
        };
        Some(slot)
    }

    /// Apply overrides. Either every key is applied or none is.
    pub fn update(&mut self, pars: &FlatParameters) -> Result<()> {
        if let Some((key, _)) = pars.iter().find(|(k, _)| !PARAMETER_KEYS.contains(k)) {
            return Err(Error::UnknownParameter(key.to_string()));
        }
        for (key, value) in pars.iter() {
            if let Some(slot) = self.slot(key) {
                *slot = value;
            }
        }
        self.verbose = pars.verbose;
        Ok(())
    }

    pub(crate) fn validate(&self) -> Result<Validated> {
        if let Some(key) = PARAMETER_KEYS.iter().find(|k| !self.get(k).is_some_and(f64::is_finite)) {
            return Err(Error::Validation(format!("parameter '{key}' is not a finite number")));
        }

        let count = |key: &str, v: f64, min: f64, max: f64| -> Result<usize> {
            let r = v.round();
            if r < min || r > max {
                return Err(Error::Validation(format!("{key} must lie in [{min}, {max}], got {v}")));
            }
            Ok(r as usize)
        };
        let day = |v: f64| (v >= 0.0).then(|| v.round() as usize);
        let unit = |key: &str, v: f64| -> Result<f64> {
            if !(0.0..=1.0).contains(&v) {
                return Err(Error::Validation(format!("{key} must lie in [0, 1], got {v}")));
            }
            Ok(v)
        };
        let positive = |key: &str, v: f64| -> Result<f64> {
            if v <= 0.0 {
                return Err(Error::Validation(format!("{key} must be positive, got {v}")));
            }
            Ok(v)
        };
        let period = |key: &str, v: f64, min_exclusive: bool| -> Result<f64> {
            if (min_exclusive && v <= 0.0) || v < 0.0 || v > MAX_DAYS {
                let lo = if min_exclusive { "(0" } else { "[0" };
                return Err(Error::Validation(format!("{key} must lie in {lo}, {MAX_DAYS}] days, got {v}")));
            }
            Ok(v)
        };
        let non_negative = |key: &str, v: f64| -> Result<f64> {
            if v < 0.0 {
                return Err(Error::Validation(format!("{key} must be non-negative, got {v}")));
            }
            Ok(v)
        };

        let n = count("n", self.n, 1.0, MAX_AGENTS)?;
        let n_infected = count("n_infected", self.n_infected, 1.0, MAX_AGENTS)?;
        if n_infected > n {
            return Err(Error::Validation(format!(
                "n_infected ({n_infected}) cannot exceed population size n ({n})"
            )));
        }
        let contacts = count("contacts", self.contacts, 0.0, MAX_CONTACTS)?;
        let dur = period("dur", self.dur, true)?;
        let r0 = non_negative("r0", self.r0)?;
        let beta = if contacts == 0 { 0.0 } else { (r0 / (contacts as f64 * dur)).min(1.0) };

        Ok(Validated {
            scale: positive("scale", self.scale)?,
            n,
            n_infected,
            n_days: count("n_days", self.n_days, 1.0, MAX_DAYS)?,
            intervene: day(self.intervene),
            unintervene: day(self.unintervene),
            intervention_eff: unit("intervention_eff", self.intervention_eff)?,
            seed: count("seed", self.seed, 0.0, u64::MAX as f64)? as u64,
            beta,
            contacts,
            incub: period("incub", self.incub, true)?,
            incub_std: period("incub_std", self.incub_std, false)?,
            dur,
            dur_std: period("dur_std", self.dur_std, false)?,
            cfr: unit("cfr", self.cfr)?,
            timetodie: period("timetodie", self.timetodie, true)?,
        })
    }
}

impl Validated {
    /// Per-contact transmission probability on day `t`.
    pub fn beta_on(&self, t: usize) -> f64 {
        let active = match (self.intervene, self.unintervene) {
            (Some(start), Some(end)) => t >= start && t < end,
            (Some(start), None) => t >= start,
            (None, _) => false,
        };
        if active { self.beta * (1.0 - self.intervention_eff) } else { self.beta }
    }
}
