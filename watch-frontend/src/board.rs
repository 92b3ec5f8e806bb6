use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Window};

use watch_core::{ChartConfig, ChartSlot, LoadSequencer, LoadTicket, TableModel};

use crate::api::ApiClient;
use crate::chart::{self, ChartHandle};
use crate::{config, table};

pub const TABLE_ID: &str = "watch-table";
pub const GRAPH_ID: &str = "watch-graph";

const TABLE_FAILED: &str = "Failed to load watches";
const CHART_FAILED: &str = "Failed to load data";

/// The page: watch table on one side, price chart on the other.
pub struct WatchBoard {
    window: Window,
    document: Document,
    table: Element,
    graph: Element,
    api: ApiClient,
    config: ChartConfig,
    chart: RefCell<ChartSlot<ChartHandle>>,
    loads: RefCell<LoadSequencer>,
}

impl WatchBoard {
    /// Bind to the `#watch-table` and `#watch-graph` containers of the page.
    pub fn mount(window: Window) -> Result<Rc<Self>, JsValue> {
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let table = document
            .get_element_by_id(TABLE_ID)
            .ok_or_else(|| JsValue::from_str("#watch-table not found"))?;
        let graph = document
            .get_element_by_id(GRAPH_ID)
            .ok_or_else(|| JsValue::from_str("#watch-graph not found"))?;

        Ok(Rc::new(Self {
            window,
            document,
            table,
            graph,
            api: ApiClient::new(&config::api_base()),
            config: config::chart_config(),
            chart: RefCell::new(ChartSlot::new()),
            loads: RefCell::new(LoadSequencer::new()),
        }))
    }

    /// Install the page-lifetime listeners and kick off the table fetch.
    pub fn start(self: &Rc<Self>) -> Result<(), JsValue> {
        let board = self.clone();
        table::install_load_handler(&self.table, move |id| board.load_chart(id))?;
        table::install_body_resize(&self.window, &self.table, self.config.height_fraction)?;

        let board = self.clone();
        spawn_local(async move { board.load_table().await });
        Ok(())
    }

    async fn load_table(&self) {
        let rendered = match self.api.fetch_watches().await {
            Ok(records) => {
                log::info!("loaded {} watches", records.len());
                let model = TableModel::derive(&records);
                table::render_table(&self.document, &self.table, &model)
            }
            Err(err) => {
                log::error!("{err}");
                table::render_table_message(&self.document, &self.table, TABLE_FAILED)
            }
        };
        let fitted = rendered
            .and_then(|_| table::fit_body(&self.window, &self.table, self.config.height_fraction));
        if let Err(err) = fitted {
            log::error!("table render failed: {err:?}");
        }
    }

    /// Fetch and draw the series of watch `id`. Overlapping calls resolve in
    /// favour of the latest one.
    pub fn load_chart(self: &Rc<Self>, id: String) {
        let ticket = self.loads.borrow_mut().begin(id);
        let board = self.clone();
        spawn_local(async move { board.finish_chart(ticket).await });
    }

    async fn finish_chart(&self, ticket: LoadTicket) {
        let result = self.api.fetch_items(ticket.id()).await;
        if !self.loads.borrow().is_current(&ticket) {
            log::debug!("discarding stale series for watch {}", ticket.id());
            return;
        }

        self.chart.borrow_mut().clear();
        let rendered = match result {
            Ok(points) => {
                chart::render_chart(&self.window, &self.document, &self.graph, points, self.config)
                    .map(|handle| {
                        if let Some(handle) = handle {
                            log::info!("watch {}: {} points", ticket.id(), handle.point_count());
                            self.chart.borrow_mut().replace(handle);
                        }
                    })
            }
            Err(err) => {
                log::error!("{err}");
                chart::render_message(&self.document, &self.graph, CHART_FAILED)
            }
        };
        if let Err(err) = rendered {
            log::error!("chart render failed: {err:?}");
        }
    }
}
