use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::RenderFault;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Metrics {
    pub silhouette_score: f64,
    pub davies_bouldin_index: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ElbowData {
    pub k_values: Vec<i64>,
    pub inertias: Vec<f64>,
}

impl ElbowData {
    pub fn is_empty(&self) -> bool {
        self.k_values.is_empty()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PcaData {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub clusters: Vec<u64>,
}

/// Successful clustering result. `clusters` keeps the server's key order.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UploadResponse {
    pub num_clusters: u64,
    pub metrics: Metrics,
    pub total_persons: u64,
    /// Members arrive as whatever the identifying column held; numbers are
    /// kept as their JSON text.
    #[serde(deserialize_with = "members_as_text")]
    pub clusters: IndexMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elbow_data: Option<ElbowData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pca_data: Option<PcaData>,
}

impl UploadResponse {
    /// Checks the index-alignment invariants the renderer relies on.
    pub fn check(&self) -> Result<(), RenderFault> {
        if let Some(elbow) = &self.elbow_data {
            if elbow.k_values.len() != elbow.inertias.len() {
                return Err(RenderFault::ElbowMisaligned {
                    k_values: elbow.k_values.len(),
                    inertias: elbow.inertias.len(),
                });
            }
        }
        if let Some(pca) = &self.pca_data {
            if pca.x.len() != pca.y.len() || pca.x.len() != pca.clusters.len() {
                return Err(RenderFault::ProjectionMisaligned {
                    x: pca.x.len(),
                    y: pca.y.len(),
                    clusters: pca.clusters.len(),
                });
            }
        }
        Ok(())
    }
}

fn members_as_text<'de, D>(deserializer: D) -> Result<IndexMap<String, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = IndexMap::<String, Vec<Value>>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(label, members)| (label, members.into_iter().map(member_text).collect()))
        .collect())
}

fn member_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

/// Failure body: `{ "error": "..." }`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clusters_keep_server_order() {
        let body = r#"{
            "num_clusters": 3,
            "metrics": {"silhouette_score": 0.41, "davies_bouldin_index": 0.9},
            "total_persons": 4,
            "clusters": {"Cluster 2": ["z"], "Cluster 0": ["a", "b"], "Cluster 1": ["c"]}
        }"#;
        let response: UploadResponse = serde_json::from_str(body).unwrap();
        let labels: Vec<&str> = response.clusters.keys().map(String::as_str).collect();
        assert_eq!(labels, ["Cluster 2", "Cluster 0", "Cluster 1"]);
        assert!(response.elbow_data.is_none());
        assert!(response.pca_data.is_none());
        assert!(response.check().is_ok());
    }

    #[test]
    fn misaligned_projection_is_a_render_fault() {
        let response = UploadResponse {
            num_clusters: 1,
            metrics: Metrics {
                silhouette_score: 0.0,
                davies_bouldin_index: 0.0,
            },
            total_persons: 0,
            clusters: IndexMap::new(),
            elbow_data: None,
            pca_data: Some(PcaData {
                x: vec![0.0, 1.0],
                y: vec![0.0],
                clusters: vec![0, 0],
            }),
        };
        assert_eq!(
            response.check(),
            Err(RenderFault::ProjectionMisaligned {
                x: 2,
                y: 1,
                clusters: 2
            })
        );
    }

    #[test]
    fn misaligned_elbow_is_a_render_fault() {
        let body = r#"{
            "num_clusters": 0,
            "metrics": {"silhouette_score": 0, "davies_bouldin_index": 0},
            "total_persons": 0,
            "clusters": {},
            "elbow_data": {"k_values": [2, 3], "inertias": [1.5]}
        }"#;
        let response: UploadResponse = serde_json::from_str(body).unwrap();
        assert!(matches!(
            response.check(),
            Err(RenderFault::ElbowMisaligned { k_values: 2, inertias: 1 })
        ));
    }

    #[test]
    fn numeric_member_ids_are_kept_as_text() {
        let body = r#"{
            "num_clusters": 2,
            "metrics": {"silhouette_score": 0.3, "davies_bouldin_index": 1.1},
            "total_persons": 3,
            "clusters": {"Cluster 0": [101, 102], "Cluster 1": ["carol"]}
        }"#;
        let response: UploadResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.clusters["Cluster 0"], ["101", "102"]);
        assert_eq!(response.clusters["Cluster 1"], ["carol"]);
    }

    #[test]
    fn error_body_tolerates_missing_field() {
        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert!(body.error.is_none());
        let body: ErrorBody = serde_json::from_str(r#"{"error": "bad file"}"#).unwrap();
        assert_eq!(body.error.as_deref(), Some("bad file"));
    }
}
