use serde_json::{json, Map, Value};

use crate::chart::{ChartKind, ChartSpec, Series, TITLE_FONT_SIZE};

pub fn config(spec: &ChartSpec) -> Value {
    let (kind, datasets): (&str, Vec<Value>) = match spec.kind {
        ChartKind::Line => (
            "line",
            spec.series
                .iter()
                .map(|s| dataset(s, s.points.iter().map(|p| json!(p.y)).collect()))
                .collect(),
        ),
        ChartKind::Scatter => (
            "scatter",
            spec.series
                .iter()
                .map(|s| {
                    dataset(
                        s,
                        s.points.iter().map(|p| json!({ "x": p.x, "y": p.y })).collect(),
                    )
                })
                .collect(),
        ),
    };

    let mut data = Map::new();
    if spec.kind == ChartKind::Line {
        data.insert("labels".into(), json!(spec.labels));
    }
    data.insert("datasets".into(), Value::Array(datasets));

    let mut legend = json!({ "display": spec.show_legend });
    if spec.show_legend {
        legend["position"] = json!("top");
    }

    json!({
        "type": kind,
        "data": data,
        "options": {
            "responsive": spec.responsive,
            "maintainAspectRatio": spec.maintain_aspect_ratio,
            "plugins": {
                "title": {
                    "display": true,
                    "text": spec.title,
                    "font": { "size": TITLE_FONT_SIZE }
                },
                "legend": legend
            },
            "scales": {
                "x": { "title": { "display": true, "text": spec.x_title } },
                "y": { "title": { "display": true, "text": spec.y_title } }
            }
        }
    })
}

fn dataset(series: &Series, data: Vec<Value>) -> Value {
    let mut out = json!({
        "label": series.label,
        "data": data,
        "borderColor": series.border_color,
        "backgroundColor": series.background_color,
        "pointRadius": series.point_radius,
        "pointHoverRadius": series.point_hover_radius,
    });
    if series.border_width != 1 {
        out["borderWidth"] = json!(series.border_width);
    }
    if let Some(color) = &series.point_background_color {
        out["pointBackgroundColor"] = json!(color);
    }
    if let Some(color) = &series.point_border_color {
        out["pointBorderColor"] = json!(color);
    }
    out
}
