use tracing::{debug, info};

use crate::cards::ClusterCard;
use crate::chart::{ChartBackend, ChartLifecycleManager, ChartSlot};
use crate::error::RenderFault;
use crate::response::UploadResponse;
use crate::surface::{MetricSlot, Region, Surface};

pub struct ResultsRenderer;

impl ResultsRenderer {
    /// Renders metrics, cards and charts, then reveals the results region.
    ///
    /// Alignment invariants are checked before any slot is touched, so a
    /// fault leaves the page as it was. A chart construction failure can
    /// still occur after the cards were written; callers hide the region.
    pub fn render<S, B>(
        surface: &S,
        charts: &mut ChartLifecycleManager<B>,
        response: &UploadResponse,
    ) -> Result<(), RenderFault>
    where
        S: Surface + ?Sized,
        B: ChartBackend,
    {
        response.check()?;

        surface.set_metric(MetricSlot::ClusterCount, &response.num_clusters.to_string());
        surface.set_metric(
            MetricSlot::Silhouette,
            &response.metrics.silhouette_score.to_string(),
        );
        surface.set_metric(
            MetricSlot::DaviesBouldin,
            &response.metrics.davies_bouldin_index.to_string(),
        );
        surface.set_metric(MetricSlot::PersonTotal, &response.total_persons.to_string());

        surface.clear_cluster_cards();
        for (label, members) in &response.clusters {
            surface.append_cluster_card(&ClusterCard::new(label, members));
        }
        debug!(cards = response.clusters.len(), "cluster cards rendered");

        if let Some(elbow) = response.elbow_data.as_ref().filter(|e| !e.is_empty()) {
            charts
                .render_elbow(elbow)
                .map_err(|source| RenderFault::Chart {
                    slot: ChartSlot::Elbow.name(),
                    source,
                })?;
        }
        if let Some(pca) = &response.pca_data {
            charts
                .render_scatter(pca)
                .map_err(|source| RenderFault::Chart {
                    slot: ChartSlot::Pca.name(),
                    source,
                })?;
        }

        surface.set_results_visible(true);
        surface.scroll_into_view(Region::Results);
        info!(
            clusters = response.num_clusters,
            persons = response.total_persons,
            "results rendered"
        );
        Ok(())
    }
}
