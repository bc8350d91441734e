use thiserror::Error;

/// Generic message used whenever the server does not supply one.
pub const GENERIC_FAILURE: &str = "An error occurred";

/// Rejections raised before any network activity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Please select a file first")]
    NothingSelected,
    #[error("Please select a valid CSV file")]
    NotCsv,
    #[error("Please upload a CSV file")]
    DroppedNotCsv,
}

/// Failures of the request/response exchange.
///
/// `Display` yields the exact text shown in the error banner; the detail
/// fields are for logs only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("{}", GENERIC_FAILURE)]
    Network { detail: String },
    #[error("{}", GENERIC_FAILURE)]
    Decode { detail: String },
}

/// A response that parsed but cannot be rendered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderFault {
    #[error("elbow data is misaligned: {k_values} k values vs {inertias} inertias")]
    ElbowMisaligned { k_values: usize, inertias: usize },
    #[error("projection data is misaligned: x={x}, y={y}, clusters={clusters}")]
    ProjectionMisaligned { x: usize, y: usize, clusters: usize },
    #[error("failed to draw {slot} chart: {source}")]
    Chart {
        slot: &'static str,
        #[source]
        source: ChartError,
    },
}

/// Raised by a chart backend when it cannot construct an instance.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChartError {
    #[error("chart target '{0}' not found")]
    MissingTarget(String),
    #[error("charting backend failure: {0}")]
    Backend(String),
}

/// Everything that can end an upload cycle without results.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Render(#[from] RenderFault),
}
