//! Client-side controller for a dataset clustering tool.
//!
//! The crate validates a chosen CSV, uploads it to the clustering service,
//! and turns the reply into metric fields, cluster cards and two charts (an
//! elbow curve and a PCA scatter). The page, the charting library and the
//! HTTP stack sit behind the [`Surface`], [`ChartBackend`] and [`Transport`]
//! traits so the same pipeline drives the browser front end, the CLI and the
//! tests.

pub mod cards;
pub mod chart;
pub mod chartjs;
pub mod error;
pub mod orchestrator;
pub mod palette;
pub mod presenter;
pub mod render;
pub mod response;
pub mod selection;
pub mod surface;
pub mod transport;

pub use cards::{cluster_id_from_label, html_escape, ClusterCard};
pub use chart::{
    elbow_spec, scatter_spec, ChartBackend, ChartKind, ChartLifecycleManager, ChartSlot,
    ChartSpec, Point, Series,
};
pub use error::{ChartError, RenderFault, SelectionError, TransportError, UploadError};
pub use orchestrator::{SubmitOutcome, UploadOrchestrator};
pub use palette::{color_of, fill_of, PALETTE};
pub use presenter::ErrorPresenter;
pub use render::ResultsRenderer;
pub use response::{ElbowData, Metrics, PcaData, UploadResponse};
pub use selection::{FileSelectionController, SelectedFile, SelectionOrigin};
pub use surface::{FileBadge, MemorySurface, MetricSlot, Region, Surface, SurfaceState};
pub use transport::{decode_reply, ClientConfig, HttpReply, HttpTransport, Transport, UploadRequest};
