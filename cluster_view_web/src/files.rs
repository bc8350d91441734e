use cluster_view::SelectedFile;
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, FileList};

/// First file of a list, read only when it passes the CSV heuristics.
/// Rejected candidates are returned without their bytes so the controller
/// can still report them.
pub async fn first_candidate(list: Option<FileList>) -> Option<SelectedFile> {
    let file = list?.item(0)?;
    Some(read_candidate(file).await)
}

async fn read_candidate(file: File) -> SelectedFile {
    let media_type = Some(file.type_()).filter(|t| !t.is_empty());
    let mut candidate = SelectedFile::new(file.name(), media_type, Vec::new());
    if !candidate.is_csv() {
        return candidate;
    }
    if let Ok(buf) = JsFuture::from(file.array_buffer()).await {
        candidate.bytes = js_sys::Uint8Array::new(&buf).to_vec();
    }
    candidate
}
