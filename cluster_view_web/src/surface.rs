use cluster_view::{ClusterCard, FileBadge, MetricSlot, Region, Surface};
use leptos::*;
use web_sys::{ScrollBehavior, ScrollIntoViewOptions};

pub const ERROR_SECTION_ID: &str = "errorSection";
pub const RESULTS_SECTION_ID: &str = "resultsSection";

/// Read halves consumed by the view.
#[derive(Clone, Copy)]
pub struct PageSignals {
    pub badge: ReadSignal<Option<FileBadge>>,
    pub drag_active: ReadSignal<bool>,
    pub submit_enabled: ReadSignal<bool>,
    pub loading_visible: ReadSignal<bool>,
    pub error_text: ReadSignal<String>,
    pub error_visible: ReadSignal<bool>,
    pub results_visible: ReadSignal<bool>,
    pub metrics: [ReadSignal<String>; 4],
    pub cards: ReadSignal<Vec<ClusterCard>>,
}

/// Write halves handed to the controller.
#[derive(Clone, Copy)]
pub struct SignalSurface {
    badge: WriteSignal<Option<FileBadge>>,
    drag_active: WriteSignal<bool>,
    submit_enabled: WriteSignal<bool>,
    loading_visible: WriteSignal<bool>,
    error_text: WriteSignal<String>,
    error_visible: WriteSignal<bool>,
    results_visible: WriteSignal<bool>,
    metrics: [WriteSignal<String>; 4],
    cards: WriteSignal<Vec<ClusterCard>>,
}

pub fn create_page_signals() -> (PageSignals, SignalSurface) {
    let (badge, set_badge) = create_signal(None);
    let (drag_active, set_drag_active) = create_signal(false);
    let (submit_enabled, set_submit_enabled) = create_signal(false);
    let (loading_visible, set_loading_visible) = create_signal(false);
    let (error_text, set_error_text) = create_signal(String::new());
    let (error_visible, set_error_visible) = create_signal(false);
    let (results_visible, set_results_visible) = create_signal(false);
    let metrics = MetricSlot::ALL.map(|_| create_signal(String::new()));
    let (cards, set_cards) = create_signal(Vec::new());
    (
        PageSignals {
            badge,
            drag_active,
            submit_enabled,
            loading_visible,
            error_text,
            error_visible,
            results_visible,
            metrics: metrics.map(|(read, _)| read),
            cards,
        },
        SignalSurface {
            badge: set_badge,
            drag_active: set_drag_active,
            submit_enabled: set_submit_enabled,
            loading_visible: set_loading_visible,
            error_text: set_error_text,
            error_visible: set_error_visible,
            results_visible: set_results_visible,
            metrics: metrics.map(|(_, write)| write),
            cards: set_cards,
        },
    )
}

impl Surface for SignalSurface {
    fn show_selected_file(&self, badge: &FileBadge) {
        self.badge.set(Some(badge.clone()));
    }

    fn set_drag_active(&self, active: bool) {
        self.drag_active.set(active);
    }

    fn set_submit_enabled(&self, enabled: bool) {
        self.submit_enabled.set(enabled);
    }

    fn set_loading_visible(&self, visible: bool) {
        self.loading_visible.set(visible);
    }

    fn set_error_text(&self, text: &str) {
        self.error_text.set(text.to_string());
    }

    fn set_error_visible(&self, visible: bool) {
        self.error_visible.set(visible);
    }

    fn set_results_visible(&self, visible: bool) {
        self.results_visible.set(visible);
    }

    fn set_metric(&self, slot: MetricSlot, text: &str) {
        self.metrics[slot.index()].set(text.to_string());
    }

    fn clear_cluster_cards(&self) {
        self.cards.update(|cards| cards.clear());
    }

    fn append_cluster_card(&self, card: &ClusterCard) {
        self.cards.update(|cards| cards.push(card.clone()));
    }

    fn scroll_into_view(&self, region: Region) {
        let id = match region {
            Region::Error => ERROR_SECTION_ID,
            Region::Results => RESULTS_SECTION_ID,
        };
        let Some(element) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        else {
            return;
        };
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        element.scroll_into_view_with_scroll_into_view_options(&options);
    }
}
