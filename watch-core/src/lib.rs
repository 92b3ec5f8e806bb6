//! Platform-independent model and layout logic for the watch board.
//!
//! Everything in here is plain Rust so it can be unit tested natively; the
//! browser crate only glues these pieces to the DOM.

pub mod error;
pub mod format;
pub mod lifecycle;
pub mod paths;
pub mod record;
pub mod scale;
pub mod table;

pub use error::ViewError;
pub use format::{
    format_currency, format_date, format_price, format_tick_date, point_label, round_cents,
    UNKNOWN_LABEL,
};
pub use lifecycle::{build_or_discard, ChartSlot, Detach, LoadSequencer, LoadTicket};
pub use paths::{is_uri_safe, items_path, ITEMS_ROUTE, WATCHES_PATH};
pub use record::{parse_date, parse_points, parse_records, Parsed, PricePoint, WatchRecord};
pub use scale::{extent, fill_height, AxisMapping, ChartConfig, LinearScale, PlotArea};
pub use table::{
    load_element_id, parse_load_id, Cell, ColumnKind, ColumnSpec, TableModel, NO_DATA_LABEL,
};

/// Milliseconds since Unix epoch.
pub type Timestamp = i64;
