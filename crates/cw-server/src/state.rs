//! Shared application state for the web app server.

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::Instant;

use cw_viz::{FigureSerializer, JsonFigureSerializer, PlotOptions};

use crate::engine::{BundledEngine, SimulationFactory};
use crate::pipeline::Pipeline;
use crate::schema::{get_defaults, Defaults};
use crate::sessions::SessionStore;

/// Shared state available to all request handlers.
pub struct AppState {
    /// Per-client sessions.
    pub sessions: SessionStore,

    /// Simulation engine collaborator.
    pub engine: Arc<dyn SimulationFactory>,

    /// Figure serialization collaborator.
    pub serializer: Arc<dyn FigureSerializer>,

    /// Parameter schema, built once.
    pub schema: Defaults,

    /// Fixed figure layout for `plot_sim`.
    pub plot_options: PlotOptions,

    /// Server start time (for uptime reporting).
    pub started_at: Instant,

    /// Total RPC calls served (for /api/health).
    pub total_requests: AtomicU64,
}

impl AppState {
    pub fn new(engine: Arc<dyn SimulationFactory>, serializer: Arc<dyn FigureSerializer>) -> Self {
        Self {
            sessions: SessionStore::new(),
            engine,
            serializer,
            schema: get_defaults(),
            plot_options: PlotOptions::default(),
            started_at: Instant::now(),
            total_requests: AtomicU64::new(0),
        }
    }

    /// State wired to the bundled engine and the JSON figure serializer.
    pub fn bundled() -> Self {
        Self::new(Arc::new(BundledEngine), Arc::new(JsonFigureSerializer))
    }

    pub fn pipeline(&self) -> Pipeline<'_> {
        Pipeline {
            engine: self.engine.as_ref(),
            serializer: self.serializer.as_ref(),
            schema: &self.schema,
            plot_options: &self.plot_options,
        }
    }
}

/// Type alias used in axum handlers.
pub type SharedState = Arc<AppState>;
