use approx::assert_abs_diff_eq;
use cw_viz::{Figure, FigureSerializer, JsonFigureSerializer, Panel, PlotOptions};

fn bbox(v: &serde_json::Value, i: usize) -> Vec<f64> {
    v["axes"][i]["bbox"]
        .as_array()
        .expect("bbox should be an array")
        .iter()
        .map(|x| x.as_f64().expect("bbox entries are numbers"))
        .collect()
}

#[test]
fn stacked_axes_respect_margins_and_order() {
    let opts = PlotOptions::default();
    let mut fig = Figure::new(&opts);
    for title in ["top", "middle", "bottom"] {
        fig.add_panel(Panel::new(title, "Day", "Count").line("s", vec![0.0, 1.0], vec![0.0, 1.0]));
    }

    let v = JsonFigureSerializer.serialize(&fig).expect("serialize");
    let (top, bottom) = (bbox(&v, 0), bbox(&v, 2));

    assert_abs_diff_eq!(top[0], opts.margins.left, epsilon = 1e-12);
    assert_abs_diff_eq!(top[1] + top[3], opts.margins.top, epsilon = 1e-12);
    assert_abs_diff_eq!(bottom[1], opts.margins.bottom, epsilon = 1e-12);
    assert_eq!(v["axes"][0]["texts"][0]["text"], "top");
    assert_eq!(v["axes"][0]["axes"][0]["fontsize"], 12.0);
}

#[test]
fn figure_ids_are_unique() {
    let mut fig = Figure::new(&PlotOptions::default());
    fig.add_panel(Panel::new("a", "x", "y").line("s", vec![0.0], vec![0.0]));
    let a = JsonFigureSerializer.serialize(&fig).unwrap();
    let b = JsonFigureSerializer.serialize(&fig).unwrap();
    assert_ne!(a["id"], b["id"]);
}
