use js_sys::Reflect;
use wasm_bindgen::JsValue;
use watch_core::ChartConfig;

/// Page globals the host page may set before loading the bundle.
const API_BASE_GLOBAL: &str = "WATCH_API_BASE";
const PADDING_GLOBAL: &str = "WATCH_GRAPH_PADDING";
const RADIUS_GLOBAL: &str = "WATCH_GRAPH_RADIUS";

fn read_global(key: &str) -> Option<JsValue> {
    Reflect::get(&js_sys::global(), &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

fn read_number(key: &str) -> Option<f64> {
    let value = read_global(key)?;
    value
        .as_f64()
        .or_else(|| value.as_string()?.trim().parse().ok())
        .filter(|v: &f64| v.is_finite() && *v >= 0.0)
}

pub fn api_base() -> String {
    read_global(API_BASE_GLOBAL)
        .and_then(|v| v.as_string())
        .unwrap_or_default()
}

pub fn chart_config() -> ChartConfig {
    let mut config = ChartConfig::default();
    if let Some(padding) = read_number(PADDING_GLOBAL) {
        config.padding = padding;
    }
    if let Some(radius) = read_number(RADIUS_GLOBAL) {
        config.radius = radius;
        config.hover_radius = radius * 1.5;
    }
    config
}
