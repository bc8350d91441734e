use tracing::debug;

use crate::error::ChartError;
use crate::palette::{color_of, fill_of};
use crate::response::{ElbowData, PcaData};

pub const ELBOW_TITLE: &str = "Elbow Method for Optimal K";
pub const SCATTER_TITLE: &str = "PCA Visualization of Clusters";
pub const TITLE_FONT_SIZE: u32 = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChartSlot {
    Elbow,
    Pca,
}

impl ChartSlot {
    pub fn name(self) -> &'static str {
        match self {
            ChartSlot::Elbow => "elbow",
            ChartSlot::Pca => "pca",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Scatter,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    pub label: String,
    pub border_color: String,
    pub background_color: String,
    pub border_width: u32,
    pub point_radius: u32,
    pub point_hover_radius: u32,
    pub point_background_color: Option<String>,
    pub point_border_color: Option<String>,
    pub points: Vec<Point>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub show_legend: bool,
    /// Categorical x ticks; empty for numeric axes.
    pub labels: Vec<String>,
    pub series: Vec<Series>,
    pub responsive: bool,
    pub maintain_aspect_ratio: bool,
}

/// Line chart of inertia against k, one point per k value in order.
pub fn elbow_spec(elbow: &ElbowData) -> ChartSpec {
    let points = elbow
        .k_values
        .iter()
        .zip(elbow.inertias.iter())
        .map(|(&k, &inertia)| Point {
            x: k as f64,
            y: inertia,
        })
        .collect();
    ChartSpec {
        kind: ChartKind::Line,
        title: ELBOW_TITLE.to_string(),
        x_title: "Number of Clusters (k)".to_string(),
        y_title: "Inertia".to_string(),
        show_legend: false,
        labels: elbow.k_values.iter().map(|k| k.to_string()).collect(),
        series: vec![Series {
            label: "Inertia".to_string(),
            border_color: "#667eea".to_string(),
            background_color: "rgba(102, 126, 234, 0.1)".to_string(),
            border_width: 2,
            point_radius: 5,
            point_hover_radius: 7,
            point_background_color: Some("#764ba2".to_string()),
            point_border_color: Some("#667eea".to_string()),
            points,
        }],
        responsive: true,
        maintain_aspect_ratio: true,
    }
}

/// Scatter chart with one series per cluster id, in order of first occurrence.
pub fn scatter_spec(pca: &PcaData) -> ChartSpec {
    let mut series: Vec<(u64, Series)> = Vec::new();
    for ((&x, &y), &cluster) in pca.x.iter().zip(pca.y.iter()).zip(pca.clusters.iter()) {
        let idx = match series.iter().position(|(id, _)| *id == cluster) {
            Some(idx) => idx,
            None => {
                series.push((
                    cluster,
                    Series {
                        label: format!("Cluster {cluster}"),
                        border_color: color_of(cluster).to_string(),
                        background_color: fill_of(cluster),
                        border_width: 1,
                        point_radius: 5,
                        point_hover_radius: 7,
                        point_background_color: None,
                        point_border_color: None,
                        points: Vec::new(),
                    },
                ));
                series.len() - 1
            }
        };
        series[idx].1.points.push(Point { x, y });
    }
    ChartSpec {
        kind: ChartKind::Scatter,
        title: SCATTER_TITLE.to_string(),
        x_title: "PCA Component 1".to_string(),
        y_title: "PCA Component 2".to_string(),
        show_legend: true,
        labels: Vec::new(),
        series: series.into_iter().map(|(_, s)| s).collect(),
        responsive: true,
        maintain_aspect_ratio: true,
    }
}

/// Construct/destroy capability over a concrete charting library.
pub trait ChartBackend {
    type Handle;

    fn construct(&mut self, slot: ChartSlot, spec: &ChartSpec) -> Result<Self::Handle, ChartError>;

    fn destroy(&mut self, handle: Self::Handle);
}

/// Owns at most one live chart per slot and replaces it on every render.
pub struct ChartLifecycleManager<B: ChartBackend> {
    backend: B,
    elbow: Option<B::Handle>,
    pca: Option<B::Handle>,
}

impl<B: ChartBackend> ChartLifecycleManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            elbow: None,
            pca: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn is_live(&self, slot: ChartSlot) -> bool {
        match slot {
            ChartSlot::Elbow => self.elbow.is_some(),
            ChartSlot::Pca => self.pca.is_some(),
        }
    }

    pub fn render_elbow(&mut self, elbow: &ElbowData) -> Result<(), ChartError> {
        self.replace(ChartSlot::Elbow, &elbow_spec(elbow))
    }

    pub fn render_scatter(&mut self, pca: &PcaData) -> Result<(), ChartError> {
        self.replace(ChartSlot::Pca, &scatter_spec(pca))
    }

    /// Destroys the slot's current instance, then builds a new one. On
    /// construction failure the slot is left empty.
    fn replace(&mut self, slot: ChartSlot, spec: &ChartSpec) -> Result<(), ChartError> {
        let held = match slot {
            ChartSlot::Elbow => &mut self.elbow,
            ChartSlot::Pca => &mut self.pca,
        };
        if let Some(old) = held.take() {
            debug!(slot = slot.name(), "destroying previous chart");
            self.backend.destroy(old);
        }
        let handle = self.backend.construct(slot, spec)?;
        debug!(
            slot = slot.name(),
            series = spec.series.len(),
            "chart constructed"
        );
        *held = Some(handle);
        Ok(())
    }

    /// Releases both slots.
    pub fn clear(&mut self) {
        for held in [self.elbow.take(), self.pca.take()].into_iter().flatten() {
            self.backend.destroy(held);
        }
    }
}

impl<B: ChartBackend> Drop for ChartLifecycleManager<B> {
    fn drop(&mut self) {
        self.clear();
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingBackend;
    use super::*;

    fn elbow(k: &[i64], inertia: &[f64]) -> ElbowData {
        ElbowData {
            k_values: k.to_vec(),
            inertias: inertia.to_vec(),
        }
    }

    #[test]
    fn elbow_keeps_point_order() {
        let spec = elbow_spec(&elbow(&[2, 3, 4], &[10.0, 6.0, 4.0]));
        assert_eq!(spec.kind, ChartKind::Line);
        assert_eq!(spec.title, ELBOW_TITLE);
        assert!(!spec.show_legend);
        assert_eq!(spec.labels, ["2", "3", "4"]);
        assert_eq!(spec.series.len(), 1);
        let ys: Vec<f64> = spec.series[0].points.iter().map(|p| p.y).collect();
        assert_eq!(ys, [10.0, 6.0, 4.0]);
    }

    #[test]
    fn scatter_groups_by_first_occurrence() {
        let pca = PcaData {
            x: vec![0.0, 1.0, 2.0, 3.0],
            y: vec![0.0, 1.0, 0.0, 5.0],
            clusters: vec![3, 0, 3, 11],
        };
        let spec = scatter_spec(&pca);
        let labels: Vec<&str> = spec.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["Cluster 3", "Cluster 0", "Cluster 11"]);
        assert_eq!(spec.series[0].points, [Point { x: 0.0, y: 0.0 }, Point { x: 2.0, y: 0.0 }]);
        assert_eq!(spec.series[2].border_color, color_of(3));
        assert_eq!(spec.series[2].background_color, fill_of(11));
        assert!(spec.show_legend);
    }

    #[test]
    fn rerender_destroys_before_constructing() {
        let mut charts = ChartLifecycleManager::new(RecordingBackend::default());
        charts.render_elbow(&elbow(&[2, 3, 4], &[10.0, 6.0, 4.0])).unwrap();
        charts.render_elbow(&elbow(&[2, 3], &[8.0, 5.0])).unwrap();
        assert_eq!(
            charts.backend().log,
            ["construct elbow #1", "destroy elbow #1", "construct elbow #2"]
        );
        assert_eq!(charts.backend().live_in(ChartSlot::Elbow), 1);
        assert!(!charts.is_live(ChartSlot::Pca));
    }

    #[test]
    fn slots_are_independent() {
        let mut charts = ChartLifecycleManager::new(RecordingBackend::default());
        let pca = PcaData {
            x: vec![0.0],
            y: vec![0.0],
            clusters: vec![0],
        };
        charts.render_scatter(&pca).unwrap();
        charts.render_elbow(&elbow(&[2], &[1.0])).unwrap();
        charts.render_scatter(&pca).unwrap();
        assert_eq!(charts.backend().live_in(ChartSlot::Elbow), 1);
        assert_eq!(charts.backend().live_in(ChartSlot::Pca), 1);
        charts.clear();
        assert!(charts.backend().live.is_empty());
    }

    #[test]
    fn failed_construct_leaves_slot_empty() {
        let mut charts = ChartLifecycleManager::new(RecordingBackend::default());
        charts.render_elbow(&elbow(&[2], &[1.0])).unwrap();
        charts.backend.fail_on = Some(ChartSlot::Elbow);
        assert!(charts.render_elbow(&elbow(&[2], &[1.0])).is_err());
        assert!(!charts.is_live(ChartSlot::Elbow));
        assert!(charts.backend().live.is_empty());
    }
}
