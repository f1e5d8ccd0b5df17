//! Declarative parameter schema rendered by the UI as input controls.

use cw_core::{ParameterGroup, ParameterSpec};
use serde::Serialize;

const MAX_POP: f64 = 1e5;
const MAX_DAYS: f64 = 365.0;

/// Both parameter groups, serialized as `{sim_pars: {...}, epi_pars: {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Defaults {
    pub sim_pars: ParameterGroup,
    pub epi_pars: ParameterGroup,
}

/// The parameter schema. Pure; identical on every call.
pub fn get_defaults() -> Defaults {
    let sim_pars = ParameterGroup::new("sim_pars")
        .with(ParameterSpec::new("scale", 100.0, 1.0, 1e9, "Population scale factor"))
        .with(ParameterSpec::new("n", 35_000.0, 1.0, MAX_POP, "Population size"))
        .with(ParameterSpec::new("n_infected", 20.0, 1.0, MAX_POP, "Initial infections"))
        .with(ParameterSpec::new("n_days", 60.0, 1.0, MAX_DAYS, "Duration (days)"))
        .with(ParameterSpec::new("intervene", 30.0, -1.0, MAX_DAYS, "Intervention start (day)"))
        .with(ParameterSpec::new("unintervene", 44.0, -1.0, MAX_DAYS, "Intervention end (day)"))
        .with(ParameterSpec::new("intervention_eff", 0.9, 0.0, 1.0, "Intervention effectiveness"))
        .with(ParameterSpec::new("seed", 1.0, 1.0, 1e9, "Random seed"));

    let epi_pars = ParameterGroup::new("epi_pars")
        .with(ParameterSpec::new("r0", 2.0, 0.0, 5.0, "R0 (infectiousness)"))
        .with(ParameterSpec::new("contacts", 20.0, 0.0, 100.0, "Number of contacts"))
        .with(ParameterSpec::new("incub", 5.0, 1.0, 30.0, "Incubation period (days)"))
        .with(ParameterSpec::new("incub_std", 1.0, 0.0, 30.0, "Incubation variability (days)"))
        .with(ParameterSpec::new("dur", 8.0, 1.0, 30.0, "Infection duration (days)"))
        .with(ParameterSpec::new("dur_std", 2.0, 0.0, 30.0, "Infection variability (days)"))
        .with(ParameterSpec::new("cfr", 0.02, 0.0, 1.0, "Case fatality rate"))
        .with(ParameterSpec::new("timetodie", 22.0, 1.0, 60.0, "Days until death"));

    Defaults { sim_pars, epi_pars }
}
