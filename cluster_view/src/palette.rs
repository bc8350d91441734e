/// Display colors, indexed by `cluster_id % PALETTE.len()`.
pub const PALETTE: [&str; 8] = [
    "#667eea", "#764ba2", "#f093fb", "#4facfe", "#00f2fe", "#43e97b", "#fa709a", "#fee140",
];

/// Hex alpha suffix applied to scatter point fills.
pub const FILL_ALPHA: &str = "80";

pub fn color_of(cluster_id: u64) -> &'static str {
    PALETTE[(cluster_id % PALETTE.len() as u64) as usize]
}

/// `color_of` with the translucent fill suffix appended (`#rrggbbaa`).
pub fn fill_of(cluster_id: u64) -> String {
    format!("{}{}", color_of(cluster_id), FILL_ALPHA)
}
