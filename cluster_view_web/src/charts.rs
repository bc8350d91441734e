use cluster_view::{chartjs, ChartBackend, ChartError, ChartSlot, ChartSpec};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};

pub fn canvas_id(slot: ChartSlot) -> &'static str {
    match slot {
        ChartSlot::Elbow => "elbowChart",
        ChartSlot::Pca => "pcaChart",
    }
}

/// Builds `new Chart(canvas, config)` instances from the page-global `Chart`.
#[derive(Default)]
pub struct ChartJsBackend;

impl ChartBackend for ChartJsBackend {
    type Handle = JsValue;

    fn construct(&mut self, slot: ChartSlot, spec: &ChartSpec) -> Result<JsValue, ChartError> {
        let id = canvas_id(slot);
        let canvas = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
            .ok_or_else(|| ChartError::MissingTarget(id.to_string()))?;

        let config = chartjs::config(spec)
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| ChartError::Backend(e.to_string()))?;

        let ctor = js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("Chart"))
            .ok()
            .and_then(|v| v.dyn_into::<js_sys::Function>().ok())
            .ok_or_else(|| ChartError::Backend("Chart.js is not loaded".to_string()))?;

        let args = js_sys::Array::of2(&JsValue::from(canvas), &config);
        js_sys::Reflect::construct(&ctor, &args).map_err(|e| ChartError::Backend(format!("{e:?}")))
    }

    fn destroy(&mut self, handle: JsValue) {
        if let Ok(destroy) = js_sys::Reflect::get(&handle, &JsValue::from_str("destroy"))
            .and_then(|v| v.dyn_into::<js_sys::Function>())
        {
            let _ = destroy.call0(&handle);
        }
    }
}
