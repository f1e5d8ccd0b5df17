//! Collaborator interface to the simulation engine.
//!
//! The orchestrator only talks to engines through these traits, so the
//! bundled [`cw_sim::Sim`] can be swapped for another implementation.

use cw_core::{FlatParameters, Result};
use cw_viz::{Figure, PlotOptions};

/// One simulation instance.
pub trait Simulation: Send {
    /// Apply parameter overrides on top of the engine defaults.
    fn update_pars(&mut self, pars: &FlatParameters) -> Result<()>;

    /// Run to completion without plotting.
    fn run(&mut self) -> Result<()>;

    /// Multi-panel figure of the current results.
    fn plot(&self, options: &PlotOptions) -> Result<Figure>;
}

/// Creates simulations with built-in defaults.
pub trait SimulationFactory: Send + Sync {
    fn construct(&self) -> Box<dyn Simulation>;

    /// Engine version plus release date.
    fn version(&self) -> String;
}

impl Simulation for cw_sim::Sim {
    fn update_pars(&mut self, pars: &FlatParameters) -> Result<()> {
        cw_sim::Sim::update_pars(self, pars)
    }

    fn run(&mut self) -> Result<()> {
        cw_sim::Sim::run(self)
    }

    fn plot(&self, options: &PlotOptions) -> Result<Figure> {
        cw_sim::Sim::plot(self, options)
    }
}

/// Factory for the bundled agent-based engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledEngine;

impl SimulationFactory for BundledEngine {
    fn construct(&self) -> Box<dyn Simulation> {
        Box::new(cw_sim::Sim::new())
    }

    fn version(&self) -> String {
        format!("{} ({})", cw_sim::VERSION, cw_sim::VERSION_DATE)
    }
}
