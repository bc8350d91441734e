use std::cell::{Cell, RefCell};

use tracing::{debug, info};

use crate::error::SelectionError;
use crate::presenter::ErrorPresenter;
use crate::surface::{FileBadge, Surface};

pub const CSV_MEDIA_TYPE: &str = "text/csv";
pub const CSV_SUFFIX: &str = ".csv";

/// A user-chosen file, read into memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    /// Browser-reported media type; empty or absent when unknown.
    pub media_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, media_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type,
            bytes,
        }
    }

    pub fn is_csv(&self) -> bool {
        self.media_type.as_deref() == Some(CSV_MEDIA_TYPE) || self.name.ends_with(CSV_SUFFIX)
    }
}

/// How the candidate reached the controller; decides the rejection text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionOrigin {
    Picker,
    Drop,
}

/// Holds the current selection and applies the validation predicate.
#[derive(Debug, Default)]
pub struct FileSelectionController {
    current: RefCell<Option<SelectedFile>>,
    submit_held: Cell<bool>,
}

impl FileSelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<SelectedFile> {
        self.current.borrow().clone()
    }

    pub fn has_selection(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// While held, accepting a file does not re-enable submission.
    pub fn hold_submit(&self, held: bool) {
        self.submit_held.set(held);
    }

    /// Accepts a CSV candidate or leaves the prior selection untouched.
    /// Rejection never changes the submit control.
    pub fn select<S: Surface + ?Sized>(
        &self,
        surface: &S,
        candidate: Option<SelectedFile>,
        origin: SelectionOrigin,
    ) -> Result<(), SelectionError> {
        let banner = ErrorPresenter::new(surface);
        match candidate {
            Some(file) if file.is_csv() => {
                info!(file = %file.name, bytes = file.bytes.len(), "file selected");
                surface.show_selected_file(&FileBadge::for_file(&file.name));
                if !self.submit_held.get() {
                    surface.set_submit_enabled(true);
                }
                banner.hide();
                *self.current.borrow_mut() = Some(file);
                Ok(())
            }
            rejected => {
                let err = match origin {
                    SelectionOrigin::Picker => SelectionError::NotCsv,
                    SelectionOrigin::Drop => SelectionError::DroppedNotCsv,
                };
                debug!(
                    file = rejected.as_ref().map(|f| f.name.as_str()).unwrap_or("<none>"),
                    "selection rejected"
                );
                banner.show(&err.to_string());
                Err(err)
            }
        }
    }

    /// Drag-and-drop entry point: only the first dropped file is considered.
    pub fn drop_files<S: Surface + ?Sized>(
        &self,
        surface: &S,
        files: Vec<SelectedFile>,
    ) -> Result<(), SelectionError> {
        surface.set_drag_active(false);
        self.select(surface, files.into_iter().next(), SelectionOrigin::Drop)
    }
}
