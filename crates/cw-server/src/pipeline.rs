//! Run orchestration: normalize, configure, execute, render.
//!
//! Each stage is guarded on its own; a failing stage records a
//! [`StageError`] and the pipeline moves on with whatever state exists.
//! The pipeline itself always returns a [`RunOutcome`].

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use cw_core::FlatParameters;
use cw_viz::{FigureSerializer, Plugin, PlotOptions};
use serde::Serialize;
use serde_json::{json, Value};

use crate::engine::{Simulation, SimulationFactory};
use crate::normalize::normalize;
use crate::schema::Defaults;

/// Stage that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageErrorKind {
    ParameterConversion,
    Configuration,
    Execution,
    Render,
}

impl StageErrorKind {
    fn prefix(self) -> &'static str {
        match self {
            StageErrorKind::ParameterConversion => "Parameter conversion failed!",
            StageErrorKind::Configuration => "Sim configuration failed!",
            StageErrorKind::Execution => "Sim run failed!",
            StageErrorKind::Render => "Plotting failed!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageError {
    pub kind: StageErrorKind,
    pub message: String,
}

impl StageError {
    pub fn new(kind: StageErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kind.prefix(), self.message)
    }
}

/// Raw `plot_sim` arguments as received from the client.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub sim_pars: Option<Value>,
    pub epi_pars: Option<Value>,
    pub verbose: bool,
}

/// Everything a run produced, including failures.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Serialized figure, or an empty object if rendering failed.
    pub graph: Value,
    /// Errors in stage order.
    pub errors: Vec<StageError>,
    /// Parameters handed to the engine.
    pub pars: FlatParameters,
}

impl RunOutcome {
    /// All errors flattened into one message; empty on full success.
    pub fn err_text(&self) -> String {
        self.errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_response(self) -> PlotResponse {
        let err = self.err_text();
        PlotResponse { graph: self.graph, err }
    }
}

/// Response body of `plot_sim`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotResponse {
    pub graph: Value,
    pub err: String,
}

impl PlotResponse {
    /// Response for a run that could not be carried out at all.
    pub fn failed(err: String) -> Self {
        Self { graph: json!({}), err }
    }
}

/// Collaborators and fixed settings of the pipeline.
pub struct Pipeline<'a> {
    pub engine: &'a dyn SimulationFactory,
    pub serializer: &'a dyn FigureSerializer,
    pub schema: &'a Defaults,
    pub plot_options: &'a PlotOptions,
}

impl Pipeline<'_> {
    /// Run all stages. Never panics outward and never returns an error.
    pub fn run(&self, req: &RunRequest) -> RunOutcome {
        let mut errors = Vec::new();

        // 1. Normalize
        let normalized = normalize(req.sim_pars.as_ref(), req.epi_pars.as_ref(), req.verbose, self.schema);
        errors.extend(
            normalized.errors.iter().map(|e| StageError::new(StageErrorKind::ParameterConversion, e.to_string())),
        );
        let pars = normalized.pars;
        if req.verbose {
            tracing::info!(pars = ?pars, "input parameters");
        }

        // 2. Construct & configure
        let mut sim: Option<Box<dyn Simulation>> = None;
        record(&mut errors, StageErrorKind::Configuration, || {
            let mut s = self.engine.construct();
            let applied = s.update_pars(&pars).map_err(|e| e.to_string());
            sim = Some(s);
            applied
        });

        // 3. Execute
        match sim.as_mut() {
            Some(s) => {
                record(&mut errors, StageErrorKind::Execution, || s.run().map_err(|e| e.to_string()));
            }
            None => errors.push(StageError::new(StageErrorKind::Execution, "no simulation was constructed")),
        }

        // 4. Render
        let graph = match sim.as_deref() {
            Some(s) => record(&mut errors, StageErrorKind::Render, || self.render(s)),
            None => {
                errors.push(StageError::new(StageErrorKind::Render, "no simulation was constructed"));
                None
            }
        };

        RunOutcome { graph: graph.unwrap_or_else(|| json!({})), errors, pars }
    }

    fn render(&self, sim: &dyn Simulation) -> Result<Value, String> {
        let mut fig = sim.plot(self.plot_options).map_err(|e| e.to_string())?;
        fig.connect(Plugin::mouse_position(self.plot_options.font_size, ".4r"));
        self.serializer.serialize(&fig).map_err(|e| e.to_string())
    }
}

/// Run one stage, converting errors and panics into a recorded [`StageError`].
fn record<T>(errors: &mut Vec<StageError>, kind: StageErrorKind, f: impl FnOnce() -> Result<T, String>) -> Option<T> {
    let err = match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(v)) => return Some(v),
        Ok(Err(msg)) => StageError::new(kind, msg),
        Err(panic) => StageError::new(kind, format!("panicked: {}", panic_message(&*panic))),
    };
    tracing::warn!(stage = ?kind, error = %err.message, "{}", kind.prefix());
    errors.push(err);
    None
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::BundledEngine;
    use crate::schema::get_defaults;
    use cw_core::{Error, Result};
    use cw_viz::{Figure, JsonFigureSerializer, Panel};

    /// Engine whose stages fail on demand.
    #[derive(Default)]
    struct FakeEngine {
        fail_update: bool,
        fail_run: bool,
        panic_run: bool,
        fail_plot: bool,
    }

    struct FakeSim {
        fail_update: bool,
        fail_run: bool,
        panic_run: bool,
        fail_plot: bool,
        ran: bool,
    }

    impl Simulation for FakeSim {
        fn update_pars(&mut self, _pars: &FlatParameters) -> Result<()> {
            if self.fail_update { Err(Error::Validation("bad pars".into())) } else { Ok(()) }
        }

        fn run(&mut self) -> Result<()> {
            if self.panic_run {
                panic!("numeric blow-up");
            }
            if self.fail_run {
                return Err(Error::Computation("diverged".into()));
            }
            self.ran = true;
            Ok(())
        }

        fn plot(&self, options: &PlotOptions) -> Result<Figure> {
            if self.fail_plot || !self.ran {
                return Err(Error::Computation("nothing to plot".into()));
            }
            let mut fig = Figure::new(options);
            fig.add_panel(Panel::new("p", "x", "y").line("s", vec![0.0, 1.0], vec![1.0, 2.0]));
            Ok(fig)
        }
    }

    impl SimulationFactory for FakeEngine {
        fn construct(&self) -> Box<dyn Simulation> {
            Box::new(FakeSim {
                fail_update: self.fail_update,
                fail_run: self.fail_run,
                panic_run: self.panic_run,
                fail_plot: self.fail_plot,
                ran: false,
            })
        }

        fn version(&self) -> String {
            "fake".into()
        }
    }

    fn run_with(engine: &dyn SimulationFactory, req: &RunRequest) -> RunOutcome {
        let schema = get_defaults();
        let opts = PlotOptions::default();
        Pipeline { engine, serializer: &JsonFigureSerializer, schema: &schema, plot_options: &opts }.run(req)
    }

    fn full_request() -> RunRequest {
        let v = serde_json::to_value(get_defaults()).unwrap();
        RunRequest { sim_pars: Some(v["sim_pars"].clone()), epi_pars: Some(v["epi_pars"].clone()), verbose: false }
    }

    fn kinds(outcome: &RunOutcome) -> Vec<StageErrorKind> {
        outcome.errors.iter().map(|e| e.kind).collect()
    }

    #[test]
    fn all_stages_succeed() {
        let out = run_with(&FakeEngine::default(), &full_request());
        assert!(out.is_success());
        assert_eq!(out.err_text(), "");
        assert_eq!(out.graph["plugins"][0]["type"], "mouseposition");
        assert_eq!(out.graph["plugins"][0]["fmt"], ".4r");
    }

    #[test]
    fn conversion_error_does_not_stop_the_run() {
        let mut req = full_request();
        req.epi_pars.as_mut().unwrap()["r0"] = json!({"best": "not-a-number"});
        let out = run_with(&FakeEngine::default(), &req);

        assert_eq!(kinds(&out), vec![StageErrorKind::ParameterConversion]);
        assert!(out.err_text().starts_with("Parameter conversion failed!"));
        assert!(out.graph["axes"].is_array());
        assert!(!out.pars.contains_key("r0"));
    }

    #[test]
    fn execution_failure_still_attempts_render() {
        let engine = FakeEngine { fail_run: true, ..Default::default() };
        let out = run_with(&engine, &full_request());
        assert_eq!(kinds(&out), vec![StageErrorKind::Execution, StageErrorKind::Render]);
        assert_eq!(out.graph, json!({}));
        let text = out.err_text();
        assert!(text.contains("Sim run failed! (Computation error: diverged)"));
        assert!(text.find("Sim run failed!") < text.find("Plotting failed!"));
    }

    #[test]
    fn engine_panic_is_contained() {
        let engine = FakeEngine { panic_run: true, ..Default::default() };
        let out = run_with(&engine, &full_request());
        assert_eq!(out.errors[0].kind, StageErrorKind::Execution);
        assert!(out.errors[0].message.contains("numeric blow-up"));
    }

    #[test]
    fn configuration_failure_continues_with_defaults() {
        let engine = FakeEngine { fail_update: true, ..Default::default() };
        let out = run_with(&engine, &full_request());
        assert_eq!(kinds(&out), vec![StageErrorKind::Configuration]);
        assert!(out.graph["axes"].is_array());
    }

    #[test]
    fn render_failure_yields_empty_graph() {
        let engine = FakeEngine { fail_plot: true, ..Default::default() };
        let resp = run_with(&engine, &full_request()).into_response();
        assert_eq!(resp.graph, json!({}));
        assert!(resp.err.starts_with("Plotting failed!"));
    }

    #[test]
    fn errors_are_ordered_by_stage() {
        let engine = FakeEngine { fail_run: true, ..Default::default() };
        let req = RunRequest { sim_pars: Some(json!({"n": {"best": []}})), ..Default::default() };
        let out = run_with(&engine, &req);
        assert_eq!(
            kinds(&out),
            vec![StageErrorKind::ParameterConversion, StageErrorKind::Execution, StageErrorKind::Render]
        );
    }

    #[test]
    fn bundled_engine_end_to_end() {
        let mut req = full_request();
        req.sim_pars.as_mut().unwrap()["n"] = json!({"best": 3000});
        let out = run_with(&BundledEngine, &req);
        assert!(out.is_success(), "{}", out.err_text());
        assert_eq!(out.graph["axes"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn bundled_engine_invalid_state_reports_execution_error() {
        let mut req = full_request();
        req.sim_pars.as_mut().unwrap()["n_infected"] = json!({"best": 1e9});
        let out = run_with(&BundledEngine, &req);
        assert_eq!(kinds(&out), vec![StageErrorKind::Execution, StageErrorKind::Render]);
        assert!(out.err_text().contains("n_infected"));
        assert_eq!(out.graph, json!({}));
    }

    #[test]
    fn huge_population_is_rejected_before_allocating() {
        let mut req = full_request();
        req.sim_pars.as_mut().unwrap()["n"] = json!({"best": 1e13});
        let out = run_with(&BundledEngine, &req);
        assert_eq!(kinds(&out), vec![StageErrorKind::Execution, StageErrorKind::Render]);
        assert!(out.err_text().starts_with("Sim run failed! (Validation error: n must lie in"), "{}", out.err_text());
    }

    #[test]
    fn huge_period_is_a_validation_error_not_a_panic() {
        let mut req = full_request();
        req.epi_pars.as_mut().unwrap()["timetodie"] = json!({"best": 1e300});
        let out = run_with(&BundledEngine, &req);
        assert_eq!(out.errors[0].kind, StageErrorKind::Execution);
        assert!(out.errors[0].message.contains("timetodie"), "{}", out.errors[0].message);
        assert!(!out.err_text().contains("panicked"));
    }
}
