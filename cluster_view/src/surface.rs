use std::cell::RefCell;

use crate::cards::ClusterCard;

/// Metric display fields in the results region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetricSlot {
    ClusterCount,
    Silhouette,
    DaviesBouldin,
    PersonTotal,
}

impl MetricSlot {
    pub const ALL: [MetricSlot; 4] = [
        MetricSlot::ClusterCount,
        MetricSlot::Silhouette,
        MetricSlot::DaviesBouldin,
        MetricSlot::PersonTotal,
    ];

    pub fn caption(self) -> &'static str {
        match self {
            MetricSlot::ClusterCount => "Clusters",
            MetricSlot::Silhouette => "Silhouette Score",
            MetricSlot::DaviesBouldin => "Davies-Bouldin Index",
            MetricSlot::PersonTotal => "Total Persons",
        }
    }

    pub fn index(self) -> usize {
        match self {
            MetricSlot::ClusterCount => 0,
            MetricSlot::Silhouette => 1,
            MetricSlot::DaviesBouldin => 2,
            MetricSlot::PersonTotal => 3,
        }
    }
}

/// Regions that can be scrolled into view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    Error,
    Results,
}

/// What the upload affordance shows after a valid selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileBadge {
    pub glyph: &'static str,
    pub file_name: String,
    pub hint: &'static str,
}

pub const SELECTED_GLYPH: &str = "✅";
pub const SELECTED_HINT: &str = "File selected. Click \"Process Dataset\" to continue.";

impl FileBadge {
    pub fn for_file(file_name: &str) -> Self {
        Self {
            glyph: SELECTED_GLYPH,
            file_name: file_name.to_string(),
            hint: SELECTED_HINT,
        }
    }
}

/// Host UI slots the controller writes into. Methods take `&self`;
/// implementations keep their own interior state.
pub trait Surface {
    fn show_selected_file(&self, badge: &FileBadge);
    fn set_drag_active(&self, active: bool);
    fn set_submit_enabled(&self, enabled: bool);
    fn set_loading_visible(&self, visible: bool);
    fn set_error_text(&self, text: &str);
    fn set_error_visible(&self, visible: bool);
    fn set_results_visible(&self, visible: bool);
    fn set_metric(&self, slot: MetricSlot, text: &str);
    fn clear_cluster_cards(&self);
    fn append_cluster_card(&self, card: &ClusterCard);
    fn scroll_into_view(&self, region: Region);
}

/// Snapshot of every slot held by a [`MemorySurface`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurfaceState {
    pub badge: Option<FileBadge>,
    pub drag_active: bool,
    pub submit_enabled: bool,
    pub loading_visible: bool,
    pub error_text: String,
    pub error_visible: bool,
    pub results_visible: bool,
    pub metrics: [String; 4],
    pub cards: Vec<ClusterCard>,
    pub scrolled_to: Vec<Region>,
}

impl SurfaceState {
    pub fn metric(&self, slot: MetricSlot) -> &str {
        &self.metrics[slot.index()]
    }

    /// Banner text if the banner is currently shown.
    pub fn visible_error(&self) -> Option<&str> {
        self.error_visible.then_some(self.error_text.as_str())
    }
}

/// Headless surface that records slot writes. Submission starts disabled, as
/// on a freshly loaded page.
#[derive(Debug, Default)]
pub struct MemorySurface {
    state: RefCell<SurfaceState>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> SurfaceState {
        self.state.borrow().clone()
    }
}

impl Surface for MemorySurface {
    fn show_selected_file(&self, badge: &FileBadge) {
        self.state.borrow_mut().badge = Some(badge.clone());
    }

    fn set_drag_active(&self, active: bool) {
        self.state.borrow_mut().drag_active = active;
    }

    fn set_submit_enabled(&self, enabled: bool) {
        self.state.borrow_mut().submit_enabled = enabled;
    }

    fn set_loading_visible(&self, visible: bool) {
        self.state.borrow_mut().loading_visible = visible;
    }

    fn set_error_text(&self, text: &str) {
        self.state.borrow_mut().error_text = text.to_string();
    }

    fn set_error_visible(&self, visible: bool) {
        self.state.borrow_mut().error_visible = visible;
    }

    fn set_results_visible(&self, visible: bool) {
        self.state.borrow_mut().results_visible = visible;
    }

    fn set_metric(&self, slot: MetricSlot, text: &str) {
        self.state.borrow_mut().metrics[slot.index()] = text.to_string();
    }

    fn clear_cluster_cards(&self) {
        self.state.borrow_mut().cards.clear();
    }

    fn append_cluster_card(&self, card: &ClusterCard) {
        self.state.borrow_mut().cards.push(card.clone());
    }

    fn scroll_into_view(&self, region: Region) {
        self.state.borrow_mut().scrolled_to.push(region);
    }
}
