//! Browser view layer: the watch table and the per-watch price chart.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

mod api;
mod board;
mod chart;
mod config;
mod dom;
mod table;

pub use api::ApiClient;
pub use board::WatchBoard;
pub use chart::ChartHandle;

thread_local! {
    static BOARD: RefCell<Option<Rc<WatchBoard>>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    // Already set when the module is instantiated twice; keep the first.
    let _ = console_log::init_with_level(log::Level::Info);

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let board = WatchBoard::mount(window)?;
    board.start()?;
    BOARD.with(|slot| *slot.borrow_mut() = Some(board));
    Ok(())
}

/// Load the chart for watch `id`, same as clicking its "Load" control.
#[wasm_bindgen]
pub fn load_watch(id: &str) -> Result<(), JsValue> {
    let board = BOARD
        .with(|slot| slot.borrow().clone())
        .ok_or_else(|| JsValue::from_str("watch board not started"))?;
    board.load_chart(id.to_string());
    Ok(())
}
