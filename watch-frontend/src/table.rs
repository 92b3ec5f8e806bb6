use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, Window};

use watch_core::{fill_height, parse_load_id, Cell, TableModel, UNKNOWN_LABEL};

use crate::dom::{element_with, remove_all};

/// Replace the table's head and body with `model`.
pub fn render_table(document: &Document, table: &Element, model: &TableModel) -> Result<(), JsValue> {
    remove_all(table, "thead, tbody")?;
    let thead = document.create_element("thead")?;
    let tbody = document.create_element("tbody")?;
    table.append_child(&thead)?;
    table.append_child(&tbody)?;

    let TableModel::Rows { columns, rows } = model else {
        return append_message_row(document, &tbody, watch_core::NO_DATA_LABEL);
    };

    let header = document.create_element("tr")?;
    for column in columns {
        let th = document.create_element("th")?;
        th.set_text_content(Some(&column.name));
        header.append_child(&th)?;
    }
    thead.append_child(&header)?;

    for row in rows {
        let tr = document.create_element("tr")?;
        for cell in row {
            let td = document.create_element("td")?;
            fill_cell(document, &td, cell)?;
            tr.append_child(&td)?;
        }
        tbody.append_child(&tr)?;
    }
    Ok(())
}

/// Table showing a single italic message in place of any rows.
pub fn render_table_message(document: &Document, table: &Element, message: &str) -> Result<(), JsValue> {
    remove_all(table, "thead, tbody")?;
    let tbody = document.create_element("tbody")?;
    table.append_child(&tbody)?;
    append_message_row(document, &tbody, message)
}

fn append_message_row(document: &Document, tbody: &Element, message: &str) -> Result<(), JsValue> {
    let tr = document.create_element("tr")?;
    let td = document.create_element("td")?;
    let text = italic(document, message)?;
    td.append_child(&text)?;
    tr.append_child(&td)?;
    tbody.append_child(&tr)?;
    Ok(())
}

fn italic(document: &Document, text: &str) -> Result<Element, JsValue> {
    let el = document.create_element("i")?;
    el.set_text_content(Some(text));
    Ok(el)
}

fn fill_cell(document: &Document, td: &Element, cell: &Cell) -> Result<(), JsValue> {
    match cell {
        Cell::Text(text) => td.set_text_content(Some(text)),
        Cell::Unknown => {
            let text = italic(document, UNKNOWN_LABEL)?;
            td.append_child(&text)?;
        }
        Cell::Load { .. } => {
            let group = element_with(
                document,
                "div",
                &[("class", "btn-group btn-group-xs"), ("role", "group")],
            )?;
            let element_id = cell.element_id().unwrap_or_default();
            let button = element_with(
                document,
                "a",
                &[
                    ("href", "#"),
                    ("class", "btn btn-default watch-load"),
                    ("id", element_id.as_str()),
                    ("role", "button"),
                ],
            )?;
            button.set_text_content(Some("Load"));
            group.append_child(&button)?;
            td.append_child(&group)?;
        }
    }
    Ok(())
}

/// One delegated listener for every "Load" control the table will ever hold.
pub fn install_load_handler(table: &Element, on_load: impl Fn(String) + 'static) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |event: Event| {
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        let Ok(Some(control)) = target.closest(".watch-load") else {
            return;
        };
        event.prevent_default();
        match parse_load_id(&control.id()) {
            Some(id) => on_load(id.to_string()),
            None => log::warn!("load control without id: {:?}", control.id()),
        }
    }));
    table.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Keep the table body between its top edge and `fraction` of the viewport,
/// scrolling inside, so the header stays visible.
pub fn fit_body(window: &Window, table: &Element, fraction: f64) -> Result<(), JsValue> {
    let Some(tbody) = table.query_selector("tbody")? else {
        return Ok(());
    };
    let tbody: HtmlElement = tbody.dyn_into()?;
    let viewport = window.inner_height()?.as_f64().unwrap_or(0.0);
    let top = tbody.get_bounding_client_rect().top();
    let style = tbody.style();
    style.set_property("overflow-y", "auto")?;
    style.set_property("height", &format!("{}px", fill_height(viewport, top, fraction)))?;
    Ok(())
}

pub fn install_body_resize(window: &Window, table: &Element, fraction: f64) -> Result<(), JsValue> {
    let (win, table) = (window.clone(), table.clone());
    let closure = Closure::<dyn FnMut()>::wrap(Box::new(move || {
        if let Err(err) = fit_body(&win, &table, fraction) {
            log::error!("table resize failed: {err:?}");
        }
    }));
    window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}
