//! Simulation driver.

use cw_core::{Error, FlatParameters, Result};
use cw_viz::{Figure, PlotOptions};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::parameters::{make_pars, Parameters};
use crate::people::People;
use crate::plotting;
use crate::results::{DailyFlows, Results, Summary};

/// One simulation: parameters plus the results of the last run.
#[derive(Debug, Clone, Default)]
pub struct Sim {
    pars: Parameters,
    results: Option<Results>,
}

impl Sim {
    /// Simulation with default parameters.
    pub fn new() -> Self {
        Self { pars: make_pars(), results: None }
    }

    /// Current parameters.
    pub fn pars(&self) -> &Parameters {
        &self.pars
    }

    /// Override parameters. Unknown keys are rejected and nothing is applied.
    pub fn update_pars(&mut self, pars: &FlatParameters) -> Result<()> {
        self.pars.update(pars)?;
        self.results = None;
        Ok(())
    }

    /// Run the model to completion.
    ///
    /// On failure the previous results are discarded.
    pub fn run(&mut self) -> Result<()> {
        self.results = None;
        let v = self.pars.validate()?;
        let mut rng = StdRng::seed_from_u64(v.seed);
        let mut people = People::seeded(&v, &mut rng)?;
        let mut results = Results::with_capacity(v.n_days);
        let mut cum_infections = v.n_infected;

        for t in 0..v.n_days {
            let new_deaths = people.progress(t);
            let new_infections = people.transmit(t, v.beta_on(t), v.contacts, &mut rng);
            cum_infections += new_infections;
            let census = people.census();
            if self.pars.verbose {
                tracing::debug!(
                    day = t,
                    new_infections,
                    new_deaths,
                    infectious = census.infectious,
                    "sim day"
                );
            }
            results.record(t, census, DailyFlows { new_infections, cum_infections, new_deaths }, v.scale);
        }

        if self.pars.verbose {
            let s = results.summary();
            tracing::info!(
                n_days = s.n_days,
                cum_infections = s.cum_infections,
                deaths = s.deaths,
                peak_day = s.peak_day,
                "sim finished"
            );
        }
        self.results = Some(results);
        Ok(())
    }

    /// Results of the last successful run.
    pub fn results(&self) -> Option<&Results> {
        self.results.as_ref()
    }

    /// Final-day totals of the last successful run.
    pub fn summary(&self) -> Option<Summary> {
        self.results.as_ref().map(Results::summary)
    }

    /// Multi-panel figure of the last run.
    pub fn plot(&self, options: &PlotOptions) -> Result<Figure> {
        let results = self
            .results
            .as_ref()
            .ok_or_else(|| Error::Computation("no results to plot; run the sim first".into()))?;
        Ok(plotting::plot_results(results, options))
    }
}
