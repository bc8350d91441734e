use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use cluster_view::{html_escape, MetricSlot, SurfaceState};

use crate::plot::WrittenChart;

pub fn write_summary<W: Write>(state: &SurfaceState, out: &mut W) -> Result<()> {
    for slot in MetricSlot::ALL {
        writeln!(out, "{:<22} {}", format!("{}:", slot.caption()), state.metric(slot))?;
    }
    for card in &state.cards {
        writeln!(out)?;
        writeln!(out, "{} ({})", card.label, card.count_badge())?;
        for member in &card.members {
            writeln!(out, "  - {member}")?;
        }
    }
    Ok(())
}

pub fn render_html(state: &SurfaceState, charts: &[WrittenChart]) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Clustering Results</title>\n<style>\n");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n<h1>Clustering Results</h1>\n");
    html.push_str(&format!(
        "<p class=\"generated\">Generated {}</p>\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));

    html.push_str("<div class=\"metrics\">\n");
    for slot in MetricSlot::ALL {
        html.push_str(&format!(
            "  <div class=\"metric\"><span class=\"metric-label\">{}</span><span class=\"metric-value\">{}</span></div>\n",
            slot.caption(),
            html_escape(state.metric(slot))
        ));
    }
    html.push_str("</div>\n");

    if !charts.is_empty() {
        html.push_str("<div class=\"charts\">\n");
        for chart in charts {
            let file = chart
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            html.push_str(&format!(
                "  <img src=\"{}\" alt=\"{}\">\n",
                html_escape(&file),
                html_escape(&chart.title)
            ));
        }
        html.push_str("</div>\n");
    }

    html.push_str("<div class=\"clusters\">\n");
    for card in &state.cards {
        html.push_str(&card.to_html());
    }
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

pub fn write_html(state: &SurfaceState, charts: &[WrittenChart], path: &Path) -> Result<()> {
    fs::write(path, render_html(state, charts))
        .with_context(|| format!("failed to write {}", path.display()))
}

const STYLE: &str = r#"body { font-family: sans-serif; margin: 2rem; color: #333; }
.metrics { display: flex; gap: 1rem; flex-wrap: wrap; }
.metric { border: 1px solid #ddd; border-radius: 8px; padding: 0.75rem 1rem; }
.metric-label { display: block; font-size: 0.8rem; color: #777; }
.metric-value { font-size: 1.4rem; font-weight: bold; }
.charts img { max-width: 48%; margin: 1rem 1% 0 0; }
.clusters { display: grid; grid-template-columns: repeat(auto-fill, minmax(260px, 1fr)); gap: 1rem; margin-top: 1rem; }
.cluster-card { border: 2px solid; border-radius: 8px; padding: 0.75rem; }
.cluster-header { display: flex; justify-content: space-between; margin-bottom: 0.5rem; }
.cluster-title { font-weight: bold; }
.cluster-count { color: white; border-radius: 12px; padding: 0 0.6rem; }
.person-item { border-left: 3px solid; padding-left: 0.5rem; margin: 0.2rem 0; }
.generated { color: #999; font-size: 0.8rem; }
"#;
