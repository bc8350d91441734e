use std::cell::{Cell, RefCell};

use tracing::{debug, info, warn};

use crate::chart::{ChartBackend, ChartLifecycleManager};
use crate::error::{SelectionError, UploadError};
use crate::presenter::ErrorPresenter;
use crate::render::ResultsRenderer;
use crate::response::UploadResponse;
use crate::selection::{FileSelectionController, SelectedFile, SelectionOrigin};
use crate::surface::Surface;
use crate::transport::{decode_reply, Transport, UploadRequest};

/// How a `submit` call ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Rendered(UploadResponse),
    Failed(UploadError),
    /// A request was already outstanding; nothing happened.
    Busy,
}

/// Owns the selection, the in-flight flag and both chart slots.
///
/// All methods take `&self` so the controller can be shared (`Rc`) between
/// event handlers; no interior borrow is held across the network await.
pub struct UploadOrchestrator<T, S, B>
where
    T: Transport,
    S: Surface,
    B: ChartBackend,
{
    transport: T,
    surface: S,
    selection: FileSelectionController,
    charts: RefCell<ChartLifecycleManager<B>>,
    in_flight: Cell<bool>,
}

/// Marks a request as in flight; releasing it (on drop) hides the loading
/// indicator and re-enables submission, whichever way the cycle ends.
struct InFlight<'a, S: Surface> {
    surface: &'a S,
    selection: &'a FileSelectionController,
    flag: &'a Cell<bool>,
}

impl<'a, S: Surface> InFlight<'a, S> {
    fn acquire(
        surface: &'a S,
        selection: &'a FileSelectionController,
        flag: &'a Cell<bool>,
    ) -> Option<Self> {
        if flag.replace(true) {
            return None;
        }
        selection.hold_submit(true);
        surface.set_submit_enabled(false);
        Some(Self {
            surface,
            selection,
            flag,
        })
    }
}

impl<S: Surface> Drop for InFlight<'_, S> {
    fn drop(&mut self) {
        self.selection.hold_submit(false);
        self.surface.set_loading_visible(false);
        self.surface.set_submit_enabled(true);
        self.flag.set(false);
    }
}

impl<T, S, B> UploadOrchestrator<T, S, B>
where
    T: Transport,
    S: Surface,
    B: ChartBackend,
{
    pub fn new(transport: T, surface: S, backend: B) -> Self {
        Self {
            transport,
            surface,
            selection: FileSelectionController::new(),
            charts: RefCell::new(ChartLifecycleManager::new(backend)),
            in_flight: Cell::new(false),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.get()
    }

    pub fn with_charts<R>(&self, f: impl FnOnce(&ChartLifecycleManager<B>) -> R) -> R {
        f(&self.charts.borrow())
    }

    pub fn select_file(&self, candidate: Option<SelectedFile>) -> Result<(), SelectionError> {
        self.selection
            .select(&self.surface, candidate, SelectionOrigin::Picker)
    }

    pub fn drop_files(&self, files: Vec<SelectedFile>) -> Result<(), SelectionError> {
        self.selection.drop_files(&self.surface, files)
    }

    pub fn drag_enter(&self) {
        self.surface.set_drag_active(true);
    }

    pub fn drag_leave(&self) {
        self.surface.set_drag_active(false);
    }

    /// Uploads the current selection and renders the outcome.
    pub async fn submit(&self) -> SubmitOutcome {
        let banner = ErrorPresenter::new(&self.surface);
        let Some(file) = self.selection.current() else {
            let err = SelectionError::NothingSelected;
            banner.show(&err.to_string());
            return SubmitOutcome::Failed(err.into());
        };
        let Some(guard) = InFlight::acquire(&self.surface, &self.selection, &self.in_flight) else {
            debug!("submit ignored: request already in flight");
            return SubmitOutcome::Busy;
        };

        banner.hide();
        self.surface.set_loading_visible(true);
        self.surface.set_results_visible(false);

        let request = UploadRequest::for_file(&file);
        info!(file = %request.file_name, bytes = request.bytes.len(), "uploading dataset");
        let outcome = match self.transport.send(&request).await {
            Ok(reply) => decode_reply(&reply).map_err(UploadError::from),
            Err(err) => Err(err.into()),
        };

        let outcome = outcome.and_then(|response| {
            let mut charts = self.charts.borrow_mut();
            match ResultsRenderer::render(&self.surface, &mut charts, &response) {
                Ok(()) => Ok(response),
                Err(fault) => {
                    warn!(error = %fault, "render fault after successful upload");
                    self.surface.set_results_visible(false);
                    Err(UploadError::Render(fault))
                }
            }
        });
        drop(guard);

        match outcome {
            Ok(response) => SubmitOutcome::Rendered(response),
            Err(err) => {
                banner.show(&err.to_string());
                SubmitOutcome::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use futures::executor::block_on;

    use super::*;
    use crate::chart::testing::RecordingBackend;
    use crate::chart::ChartSlot;
    use crate::error::{RenderFault, TransportError, GENERIC_FAILURE};
    use crate::surface::{MemorySurface, MetricSlot};
    use crate::transport::HttpReply;

    /// Replays canned replies and records what was sent.
    #[derive(Default)]
    struct ScriptedTransport {
        replies: RefCell<VecDeque<Result<HttpReply, TransportError>>>,
        sent: RefCell<Vec<UploadRequest>>,
    }

    impl ScriptedTransport {
        fn replying(replies: Vec<Result<HttpReply, TransportError>>) -> Self {
            Self {
                replies: RefCell::new(replies.into()),
                sent: RefCell::default(),
            }
        }
    }

    #[async_trait(?Send)]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: &UploadRequest) -> Result<HttpReply, TransportError> {
            self.sent.borrow_mut().push(request.clone());
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Network {
                    detail: "no scripted reply".into(),
                }))
        }
    }

    fn ok(body: &str) -> Result<HttpReply, TransportError> {
        Ok(HttpReply {
            status: 200,
            body: body.as_bytes().to_vec(),
        })
    }

    fn status(code: u16, body: &str) -> Result<HttpReply, TransportError> {
        Ok(HttpReply {
            status: code,
            body: body.as_bytes().to_vec(),
        })
    }

    const TWO_CLUSTERS: &str = r#"{
        "num_clusters": 2,
        "metrics": {"silhouette_score": 0.5, "davies_bouldin_index": 1.2},
        "total_persons": 10,
        "clusters": {"Cluster 0": ["a", "b"], "Cluster 1": ["c"]},
        "elbow_data": {"k_values": [2, 3, 4], "inertias": [10, 6, 4]},
        "pca_data": {"x": [0, 1, 2], "y": [0, 1, 0], "clusters": [0, 1, 0]}
    }"#;

    type Controller = UploadOrchestrator<ScriptedTransport, MemorySurface, RecordingBackend>;

    fn controller(replies: Vec<Result<HttpReply, TransportError>>) -> Controller {
        UploadOrchestrator::new(
            ScriptedTransport::replying(replies),
            MemorySurface::new(),
            RecordingBackend::default(),
        )
    }

    fn csv() -> SelectedFile {
        SelectedFile::new("data.csv", None, b"name,x\nann,1\n".to_vec())
    }

    fn assert_idle(ctrl: &Controller) {
        let state = ctrl.surface().snapshot();
        assert!(!state.loading_visible);
        assert!(state.submit_enabled);
        assert!(!ctrl.is_in_flight());
    }

    #[test]
    fn submit_without_selection_sends_nothing() {
        let ctrl = controller(vec![ok(TWO_CLUSTERS)]);
        let outcome = block_on(ctrl.submit());
        assert_eq!(
            outcome,
            SubmitOutcome::Failed(SelectionError::NothingSelected.into())
        );
        assert!(ctrl.transport().sent.borrow().is_empty());
        assert_eq!(
            ctrl.surface().snapshot().visible_error(),
            Some("Please select a file first")
        );
    }

    #[test]
    fn successful_upload_renders_everything() {
        let ctrl = controller(vec![ok(TWO_CLUSTERS)]);
        ctrl.select_file(Some(csv())).unwrap();
        let outcome = block_on(ctrl.submit());
        assert!(matches!(outcome, SubmitOutcome::Rendered(_)));

        let sent = ctrl.transport().sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].field, "file");
        assert_eq!(sent[0].file_name, "data.csv");

        let state = ctrl.surface().snapshot();
        assert_eq!(state.cards.len(), 2);
        assert_eq!(state.metric(MetricSlot::PersonTotal), "10");
        assert!(state.results_visible);
        assert_eq!(state.visible_error(), None);
        assert_idle(&ctrl);
        ctrl.with_charts(|charts| {
            assert!(charts.is_live(ChartSlot::Elbow));
            assert!(charts.is_live(ChartSlot::Pca));
        });
    }

    #[test]
    fn numeric_member_ids_render_as_cards() {
        let body = r#"{
            "num_clusters": 2,
            "metrics": {"silhouette_score": 0.5, "davies_bouldin_index": 1.2},
            "total_persons": 3,
            "clusters": {"Cluster 0": [101, 102], "Cluster 1": [103]}
        }"#;
        let ctrl = controller(vec![ok(body)]);
        ctrl.select_file(Some(csv())).unwrap();
        assert!(matches!(block_on(ctrl.submit()), SubmitOutcome::Rendered(_)));

        let state = ctrl.surface().snapshot();
        assert_eq!(state.visible_error(), None);
        assert_eq!(state.cards.len(), 2);
        assert_eq!(state.cards[0].members, ["101", "102"]);
        assert_eq!(state.cards[0].count_badge(), "2 persons");
        assert_eq!(state.cards[1].members, ["103"]);
    }

    #[test]
    fn rejected_upload_shows_server_message() {
        let ctrl = controller(vec![status(400, r#"{"error": "bad file"}"#)]);
        ctrl.select_file(Some(csv())).unwrap();
        let outcome = block_on(ctrl.submit());
        assert!(matches!(outcome, SubmitOutcome::Failed(UploadError::Transport(_))));
        let state = ctrl.surface().snapshot();
        assert_eq!(state.visible_error(), Some("bad file"));
        assert!(!state.results_visible);
        assert_idle(&ctrl);
    }

    #[test]
    fn unparsable_failure_uses_generic_message() {
        let ctrl = controller(vec![status(500, "Internal Server Error")]);
        ctrl.select_file(Some(csv())).unwrap();
        block_on(ctrl.submit());
        assert_eq!(
            ctrl.surface().snapshot().visible_error(),
            Some(GENERIC_FAILURE)
        );
        assert_idle(&ctrl);
    }

    #[test]
    fn network_fault_restores_idle_state() {
        let ctrl = controller(vec![Err(TransportError::Network {
            detail: "connection reset".into(),
        })]);
        ctrl.select_file(Some(csv())).unwrap();
        block_on(ctrl.submit());
        assert_eq!(
            ctrl.surface().snapshot().visible_error(),
            Some(GENERIC_FAILURE)
        );
        assert_idle(&ctrl);
    }

    #[test]
    fn render_fault_is_reported_like_transport_error() {
        let misaligned = r#"{
            "num_clusters": 1,
            "metrics": {"silhouette_score": 0.1, "davies_bouldin_index": 2.0},
            "total_persons": 1,
            "clusters": {"Cluster 0": ["a"]},
            "elbow_data": {"k_values": [2, 3], "inertias": [4]}
        }"#;
        let ctrl = controller(vec![ok(misaligned)]);
        ctrl.select_file(Some(csv())).unwrap();
        let outcome = block_on(ctrl.submit());
        assert!(matches!(
            outcome,
            SubmitOutcome::Failed(UploadError::Render(RenderFault::ElbowMisaligned { .. }))
        ));
        let state = ctrl.surface().snapshot();
        assert!(!state.results_visible);
        assert!(state.error_visible);
        assert_idle(&ctrl);
    }

    #[test]
    fn chart_failure_hides_partial_results() {
        let ctrl = controller(vec![ok(TWO_CLUSTERS)]);
        ctrl.charts.borrow_mut().backend_mut().fail_on = Some(ChartSlot::Pca);
        ctrl.select_file(Some(csv())).unwrap();
        let outcome = block_on(ctrl.submit());
        assert!(matches!(
            outcome,
            SubmitOutcome::Failed(UploadError::Render(RenderFault::Chart { .. }))
        ));
        let state = ctrl.surface().snapshot();
        assert!(!state.results_visible);
        assert!(state.error_visible);
        assert_idle(&ctrl);
    }

    #[test]
    fn repeated_uploads_keep_one_chart_per_slot() {
        let ctrl = controller(vec![ok(TWO_CLUSTERS), ok(TWO_CLUSTERS)]);
        ctrl.select_file(Some(csv())).unwrap();
        block_on(ctrl.submit());
        block_on(ctrl.submit());
        ctrl.with_charts(|charts| {
            assert_eq!(charts.backend().live_in(ChartSlot::Elbow), 1);
            assert_eq!(charts.backend().live_in(ChartSlot::Pca), 1);
            assert_eq!(
                charts.backend().log,
                [
                    "construct elbow #1",
                    "construct pca #2",
                    "destroy elbow #1",
                    "construct elbow #3",
                    "destroy pca #2",
                    "construct pca #4",
                ]
            );
        });
    }

    #[test]
    fn error_from_previous_cycle_is_cleared_on_success() {
        let ctrl = controller(vec![status(400, r#"{"error": "bad file"}"#), ok(TWO_CLUSTERS)]);
        ctrl.select_file(Some(csv())).unwrap();
        block_on(ctrl.submit());
        assert!(ctrl.surface().snapshot().error_visible);
        block_on(ctrl.submit());
        let state = ctrl.surface().snapshot();
        assert!(!state.error_visible);
        assert!(state.results_visible);
    }

    #[test]
    fn submit_while_in_flight_is_refused() {
        let ctrl = controller(vec![ok(TWO_CLUSTERS)]);
        ctrl.select_file(Some(csv())).unwrap();
        ctrl.in_flight.set(true);
        assert_eq!(block_on(ctrl.submit()), SubmitOutcome::Busy);
        assert!(ctrl.transport().sent.borrow().is_empty());
    }

    #[test]
    fn picking_a_file_mid_upload_keeps_submit_disabled() {
        let ctrl = controller(Vec::new());
        ctrl.select_file(Some(csv())).unwrap();
        let guard = InFlight::acquire(&ctrl.surface, &ctrl.selection, &ctrl.in_flight).unwrap();

        let next = SelectedFile::new("next.csv", None, b"name,x\nbob,2\n".to_vec());
        ctrl.select_file(Some(next.clone())).unwrap();
        ctrl.drop_files(vec![next]).unwrap();
        let state = ctrl.surface().snapshot();
        assert!(!state.submit_enabled);
        assert_eq!(state.badge.map(|b| b.file_name).as_deref(), Some("next.csv"));

        drop(guard);
        assert_idle(&ctrl);
    }

    #[test]
    fn drag_state_toggles() {
        let ctrl = controller(Vec::new());
        ctrl.drag_enter();
        assert!(ctrl.surface().snapshot().drag_active);
        ctrl.drag_leave();
        assert!(!ctrl.surface().snapshot().drag_active);
    }
}
