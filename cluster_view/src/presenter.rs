use tracing::debug;

use crate::surface::{Region, Surface};

/// Shows and hides the single error banner. Both directions are idempotent.
pub struct ErrorPresenter<'a, S: Surface + ?Sized> {
    surface: &'a S,
}

impl<'a, S: Surface + ?Sized> ErrorPresenter<'a, S> {
    pub fn new(surface: &'a S) -> Self {
        Self { surface }
    }

    pub fn show(&self, message: &str) {
        debug!(message, "showing error banner");
        self.surface.set_error_text(message);
        self.surface.set_error_visible(true);
        self.surface.scroll_into_view(Region::Error);
    }

    pub fn hide(&self) {
        self.surface.set_error_visible(false);
    }
}
