use crate::palette::color_of;

pub const LABEL_PREFIX: &str = "Cluster ";

/// Numeric id carried by a `Cluster <n>` label, if any.
pub fn cluster_id_from_label(label: &str) -> Option<u64> {
    label.strip_prefix(LABEL_PREFIX)?.trim().parse().ok()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterCard {
    pub label: String,
    pub cluster_id: Option<u64>,
    pub color: &'static str,
    pub members: Vec<String>,
}

impl ClusterCard {
    /// Labels without a parsable id fall back to the first palette color.
    pub fn new(label: &str, members: &[String]) -> Self {
        let cluster_id = cluster_id_from_label(label);
        Self {
            label: label.to_string(),
            cluster_id,
            color: color_of(cluster_id.unwrap_or(0)),
            members: members.to_vec(),
        }
    }

    pub fn count_badge(&self) -> String {
        format!("{} persons", self.members.len())
    }

    /// Markup fragment for the card; all server-supplied text is escaped.
    pub fn to_html(&self) -> String {
        let color = self.color;
        let mut out = String::new();
        out.push_str(&format!(
            "<div class=\"cluster-card\" style=\"border-color: {color}\">\n"
        ));
        out.push_str("  <div class=\"cluster-header\">\n");
        out.push_str(&format!(
            "    <span class=\"cluster-title\" style=\"color: {color}\">{}</span>\n",
            html_escape(&self.label)
        ));
        out.push_str(&format!(
            "    <span class=\"cluster-count\" style=\"background: {color}\">{}</span>\n",
            self.count_badge()
        ));
        out.push_str("  </div>\n  <div class=\"persons-list\">\n");
        for member in &self.members {
            out.push_str(&format!(
                "    <div class=\"person-item\" style=\"border-left-color: {color}\">{}</div>\n",
                html_escape(member)
            ));
        }
        out.push_str("  </div>\n</div>\n");
        out
    }
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
