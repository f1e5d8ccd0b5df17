//! Figure construction from run results.

use cw_viz::{Figure, Panel, PlotOptions};

use crate::results::Results;

/// Three stacked panels: cumulative counts, daily counts, current state.
pub fn plot_results(results: &Results, options: &PlotOptions) -> Figure {
    let t = &results.t;
    let mut fig = Figure::new(options);

    fig.add_panel(
        Panel::new("Cumulative counts", "Day", "Count")
            .line("Cumulative infections", t.clone(), results.cum_infections.clone())
            .line("Cumulative deaths", t.clone(), results.dead.clone()),
    );
    fig.add_panel(
        Panel::new("Daily counts", "Day", "Count")
            .line("New infections", t.clone(), results.new_infections.clone())
            .line("New deaths", t.clone(), results.new_deaths.clone()),
    );
    fig.add_panel(
        Panel::new("Current state", "Day", "Count")
            .line("Susceptible", t.clone(), results.susceptible.clone())
            .line("Exposed", t.clone(), results.exposed.clone())
            .line("Infectious", t.clone(), results.infectious.clone())
            .line("Recovered", t.clone(), results.recovered.clone()),
    );
    fig
}
