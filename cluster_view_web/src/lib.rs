use std::rc::Rc;

use cluster_view::{ChartSlot, ClientConfig, HttpTransport, MetricSlot, UploadOrchestrator};
use leptos::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlInputElement;

mod charts;
mod files;
mod surface;

use charts::{canvas_id, ChartJsBackend};
use surface::{create_page_signals, PageSignals, SignalSurface, ERROR_SECTION_ID, RESULTS_SECTION_ID};

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_COMMIT: &str = env!("GIT_COMMIT_HASH");

type Controller = UploadOrchestrator<HttpTransport, SignalSurface, ChartJsBackend>;

/// `<origin>/upload`, or the bare path when the origin is unavailable.
fn upload_url(origin: Option<String>) -> String {
    let path = ClientConfig::default().endpoint;
    match origin {
        Some(origin) if !origin.is_empty() && origin != "null" => {
            format!("{}{}", origin.trim_end_matches('/'), path)
        }
        _ => path,
    }
}

fn page_origin() -> Option<String> {
    web_sys::window().and_then(|w| w.location().origin().ok())
}

#[component]
pub fn App() -> impl IntoView {
    let (page, surface) = create_page_signals();
    let transport = match HttpTransport::new(ClientConfig::with_endpoint(upload_url(page_origin()))) {
        Ok(transport) => transport,
        Err(err) => {
            logging::error!("failed to build HTTP client: {err:?}");
            return view! { <p class="error-message">{err.to_string()}</p> }.into_view();
        }
    };
    let controller: Rc<Controller> =
        Rc::new(UploadOrchestrator::new(transport, surface, ChartJsBackend));
    let file_input = create_node_ref::<html::Input>();

    let on_pick = {
        let controller = Rc::clone(&controller);
        move |ev: leptos::ev::Event| {
            let Some(input) = ev
                .target()
                .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
            else {
                return;
            };
            let controller = Rc::clone(&controller);
            spawn_local(async move {
                let candidate = files::first_candidate(input.files()).await;
                let _ = controller.select_file(candidate);
            });
        }
    };

    let on_drop = {
        let controller = Rc::clone(&controller);
        move |ev: leptos::ev::DragEvent| {
            ev.prevent_default();
            let list = ev.data_transfer().and_then(|dt| dt.files());
            let controller = Rc::clone(&controller);
            spawn_local(async move {
                let dropped = files::first_candidate(list).await;
                let _ = controller.drop_files(dropped.into_iter().collect());
            });
        }
    };

    let on_drag_over = {
        let controller = Rc::clone(&controller);
        move |ev: leptos::ev::DragEvent| {
            ev.prevent_default();
            controller.drag_enter();
        }
    };

    let on_drag_leave = {
        let controller = Rc::clone(&controller);
        move |_ev: leptos::ev::DragEvent| controller.drag_leave()
    };

    let on_submit = {
        let controller = Rc::clone(&controller);
        move |_ev: leptos::ev::MouseEvent| {
            let controller = Rc::clone(&controller);
            spawn_local(async move {
                let _ = controller.submit().await;
            });
        }
    };

    let open_picker = move |_ev: leptos::ev::MouseEvent| {
        if let Some(input) = file_input.get() {
            input.click();
        }
    };

    view! {
        <main class="container">
            <header>
                <h1>"Dataset Clustering"</h1>
                <p class="subtitle">"Upload a CSV dataset to group similar records into clusters."</p>
            </header>
            <section class="upload-section">
                <div
                    id="uploadBox"
                    class="upload-box"
                    class:dragover=move || page.drag_active.get()
                    on:click=open_picker
                    on:dragover=on_drag_over
                    on:dragleave=on_drag_leave
                    on:drop=on_drop
                >
                    {move || upload_affordance(page)}
                </div>
                <input
                    id="fileInput"
                    type="file"
                    accept=".csv,text/csv"
                    style="display: none;"
                    node_ref=file_input
                    on:change=on_pick
                />
                <button
                    id="processBtn"
                    class="btn"
                    disabled=move || !page.submit_enabled.get()
                    on:click=on_submit
                >
                    "Process Dataset"
                </button>
            </section>
            <section id="loadingSection" class="loading" style:display=move || display(page.loading_visible.get())>
                <div class="spinner"></div>
                <p>"Processing your dataset…"</p>
            </section>
            <section id={ERROR_SECTION_ID} class="error" style:display=move || display(page.error_visible.get())>
                <p id="errorMessage">{move || page.error_text.get()}</p>
            </section>
            <section id={RESULTS_SECTION_ID} class="results" style:display=move || display(page.results_visible.get())>
                <div class="metrics">
                    {metric_view(page, MetricSlot::ClusterCount, "numClusters")}
                    {metric_view(page, MetricSlot::Silhouette, "silhouetteScore")}
                    {metric_view(page, MetricSlot::DaviesBouldin, "dbIndex")}
                    {metric_view(page, MetricSlot::PersonTotal, "totalPersons")}
                </div>
                <div class="charts">
                    <div class="chart-container"><canvas id={canvas_id(ChartSlot::Elbow)}></canvas></div>
                    <div class="chart-container"><canvas id={canvas_id(ChartSlot::Pca)}></canvas></div>
                </div>
                <div id="clustersContainer" class="clusters">
                    {move || cluster_cards(page)}
                </div>
            </section>
            <footer>
                <p class="note">{"Web version "}{APP_VERSION}{" ("}{APP_COMMIT}{")"}</p>
            </footer>
        </main>
    }
    .into_view()
}

fn display(visible: bool) -> &'static str {
    if visible {
        "block"
    } else {
        "none"
    }
}

fn upload_affordance(page: PageSignals) -> View {
    match page.badge.get() {
        Some(badge) => view! {
            <div class="upload-icon">{badge.glyph}</div>
            <p><strong>{badge.file_name}</strong></p>
            <p class="file-info">{badge.hint}</p>
        }
        .into_view(),
        None => view! {
            <div class="upload-icon">"📁"</div>
            <p>"Click to upload or drag and drop"</p>
            <p class="file-info">"CSV files only"</p>
        }
        .into_view(),
    }
}

fn metric_view(page: PageSignals, slot: MetricSlot, id: &'static str) -> impl IntoView {
    let value = page.metrics[slot.index()];
    view! {
        <div class="metric-card">
            <span class="metric-label">{slot.caption()}</span>
            <span id={id} class="metric-value">{move || value.get()}</span>
        </div>
    }
}

/// Member names and labels are inserted as text nodes, never as markup.
fn cluster_cards(page: PageSignals) -> View {
    page.cards
        .get()
        .into_iter()
        .map(|card| {
            let color = card.color;
            let badge = card.count_badge();
            let members = card
                .members
                .into_iter()
                .map(|member| {
                    view! {
                        <div class="person-item" style={format!("border-left-color: {color}")}>{member}</div>
                    }
                })
                .collect_view();
            view! {
                <div class="cluster-card" style={format!("border-color: {color}")}>
                    <div class="cluster-header">
                        <span class="cluster-title" style={format!("color: {color}")}>{card.label}</span>
                        <span class="cluster-count" style={format!("background: {color}")}>{badge}</span>
                    </div>
                    <div class="persons-list">{members}</div>
                </div>
            }
        })
        .collect_view()
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    leptos::mount_to_body(|| view! { <App/> });
}
