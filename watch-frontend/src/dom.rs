use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

const SVG_NS: &str = "http://www.w3.org/2000/svg";

pub fn svg_element(document: &Document, tag: &str) -> Result<Element, JsValue> {
    document.create_element_ns(Some(SVG_NS), tag)
}

/// Create `tag` with the given attributes.
pub fn element_with(
    document: &Document,
    tag: &str,
    attrs: &[(&str, &str)],
) -> Result<Element, JsValue> {
    let el = document.create_element(tag)?;
    for (name, value) in attrs {
        el.set_attribute(name, value)?;
    }
    Ok(el)
}

/// Detach every descendant of `parent` matching `selector`.
pub fn remove_all(parent: &Element, selector: &str) -> Result<(), JsValue> {
    let nodes = parent.query_selector_all(selector)?;
    for i in 0..nodes.length() {
        if let Some(el) = nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
            el.remove();
        }
    }
    Ok(())
}
