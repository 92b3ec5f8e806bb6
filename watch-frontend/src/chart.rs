use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, Window};

use watch_core::{
    build_or_discard, fill_height, format_price, format_tick_date, point_label, AxisMapping,
    ChartConfig, Detach, PlotArea, PricePoint, NO_DATA_LABEL,
};

use crate::dom::{remove_all, svg_element};

pub const SVG_ID: &str = "watch-svg";
const MARKER_FILL: &str = "black";
const MARKER_HOVER_FILL: &str = "steelblue";
const AXIS_STROKE: &str = "#555";

/// DOM nodes of one rendered series and the data they stand for.
struct ChartView {
    window: Window,
    svg: Element,
    axes: Element,
    markers: Vec<Element>,
    points: Vec<PricePoint>,
    config: ChartConfig,
}

impl ChartView {
    /// Size the svg to the viewport and move every marker to its mapped spot.
    fn layout(&self) -> Result<(), JsValue> {
        let viewport = self.window.inner_height()?.as_f64().unwrap_or(0.0);
        let rect = self.svg.get_bounding_client_rect();
        let height = fill_height(viewport, rect.top(), self.config.height_fraction);
        self.svg.set_attribute("height", &height.to_string())?;

        let area = PlotArea::from_container(rect.width(), height, self.config.padding);
        let Some(mapping) = AxisMapping::fit(&self.points, area) else {
            return Ok(());
        };
        for (marker, point) in self.markers.iter().zip(&self.points) {
            let (x, y) = mapping.position(point);
            marker.set_attribute("transform", &format!("translate({x},{y})"))?;
        }
        self.draw_axes(&mapping)
    }

    fn draw_axes(&self, mapping: &AxisMapping) -> Result<(), JsValue> {
        self.axes.set_inner_html("");
        let document = self.document()?;
        let area = mapping.area;

        self.line(&document, (area.left, area.bottom), (area.right, area.bottom))?;
        self.line(&document, (area.left, area.top), (area.left, area.bottom))?;

        for ts in mapping.x.ticks(self.config.tick_count) {
            let x = mapping.x.map(ts);
            self.line(&document, (x, area.bottom), (x, area.bottom + 6.0))?;
            self.label(&document, x, area.bottom + 20.0, "middle", &format_tick_date(ts))?;
        }
        for price in mapping.y.ticks(self.config.tick_count) {
            let y = mapping.y.map(price);
            self.line(&document, (area.left - 6.0, y), (area.left, y))?;
            self.label(&document, area.left - 8.0, y + 4.0, "end", &format_price(price))?;
        }
        Ok(())
    }

    fn document(&self) -> Result<Document, JsValue> {
        self.svg
            .owner_document()
            .ok_or_else(|| JsValue::from_str("svg is not attached to a document"))
    }

    fn line(&self, document: &Document, from: (f64, f64), to: (f64, f64)) -> Result<(), JsValue> {
        let line = svg_element(document, "line")?;
        line.set_attribute("x1", &from.0.to_string())?;
        line.set_attribute("y1", &from.1.to_string())?;
        line.set_attribute("x2", &to.0.to_string())?;
        line.set_attribute("y2", &to.1.to_string())?;
        line.set_attribute("stroke", AXIS_STROKE)?;
        self.axes.append_child(&line)?;
        Ok(())
    }

    fn label(&self, document: &Document, x: f64, y: f64, anchor: &str, text: &str) -> Result<(), JsValue> {
        let el = svg_element(document, "text")?;
        el.set_attribute("x", &x.to_string())?;
        el.set_attribute("y", &y.to_string())?;
        el.set_attribute("text-anchor", anchor)?;
        el.set_attribute("font-size", "11")?;
        el.set_text_content(Some(text));
        self.axes.append_child(&el)?;
        Ok(())
    }
}

/// A chart on screen. Owns its resize listener and marker callbacks;
/// detaching removes the listener and the svg.
pub struct ChartHandle {
    view: Rc<ChartView>,
    resize: Option<Closure<dyn FnMut()>>,
    _marker_events: Vec<Closure<dyn FnMut(Event)>>,
}

impl ChartHandle {
    pub fn point_count(&self) -> usize {
        self.view.points.len()
    }
}

impl Detach for ChartHandle {
    fn detach(&mut self) {
        if let Some(resize) = self.resize.take() {
            if let Err(err) = self
                .view
                .window
                .remove_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())
            {
                log::warn!("failed to remove chart resize listener: {err:?}");
            }
        }
        self.view.svg.remove();
    }
}

impl Drop for ChartHandle {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Drop any previous chart markup from the panel.
pub fn clear_panel(panel: &Element) -> Result<(), JsValue> {
    remove_all(panel, "h1, svg")
}

pub fn render_message(document: &Document, panel: &Element, message: &str) -> Result<(), JsValue> {
    clear_panel(panel)?;
    let h1 = document.create_element("h1")?;
    h1.set_attribute("style", "text-align:center;")?;
    let small = document.create_element("small")?;
    small.set_text_content(Some(message));
    h1.append_child(&small)?;
    panel.append_child(&h1)?;
    Ok(())
}

/// Draw `points` into `panel`. An empty series leaves a "No Data" heading
/// and no handle.
pub fn render_chart(
    window: &Window,
    document: &Document,
    panel: &Element,
    points: Vec<PricePoint>,
    config: ChartConfig,
) -> Result<Option<ChartHandle>, JsValue> {
    if points.is_empty() {
        render_message(document, panel, NO_DATA_LABEL)?;
        return Ok(None);
    }
    clear_panel(panel)?;

    let svg = svg_element(document, "svg")?;
    svg.set_attribute("width", "100%")?;
    svg.set_attribute("id", SVG_ID)?;
    panel.append_child(&svg)?;

    // A half-built svg would keep markers whose closures are already gone.
    let stale = svg.clone();
    build_or_discard(
        || populate_chart(window, document, svg, points, config),
        || stale.remove(),
    )
    .map(Some)
}

fn populate_chart(
    window: &Window,
    document: &Document,
    svg: Element,
    points: Vec<PricePoint>,
    config: ChartConfig,
) -> Result<ChartHandle, JsValue> {
    let axes = svg_element(document, "g")?;
    axes.set_attribute("class", "axes")?;
    svg.append_child(&axes)?;
    let layer = svg_element(document, "g")?;
    layer.set_attribute("class", "points")?;
    svg.append_child(&layer)?;

    let mut markers = Vec::with_capacity(points.len());
    let mut marker_events = Vec::with_capacity(points.len() * 3);
    for point in &points {
        let group = svg_element(document, "g")?;
        group.set_attribute("class", "point")?;
        let circle = svg_element(document, "circle")?;
        circle.set_attribute("r", &config.radius.to_string())?;
        circle.set_attribute("fill", MARKER_FILL)?;
        group.append_child(&circle)?;
        layer.append_child(&group)?;

        marker_events.extend(bind_marker(window, document, &group, &circle, point, &config)?);
        markers.push(group);
    }

    let view = Rc::new(ChartView {
        window: window.clone(),
        svg,
        axes,
        markers,
        points,
        config,
    });
    view.layout()?;

    let resize_view = view.clone();
    let resize = Closure::<dyn FnMut()>::wrap(Box::new(move || {
        if let Err(err) = resize_view.layout() {
            log::error!("chart layout failed: {err:?}");
        }
    }));
    window.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())?;

    Ok(ChartHandle {
        view,
        resize: Some(resize),
        _marker_events: marker_events,
    })
}

/// Click opens the point's link; hover grows the marker and shows its label.
fn bind_marker(
    window: &Window,
    document: &Document,
    group: &Element,
    circle: &Element,
    point: &PricePoint,
    config: &ChartConfig,
) -> Result<Vec<Closure<dyn FnMut(Event)>>, JsValue> {
    let mut events = Vec::with_capacity(3);

    {
        let window = window.clone();
        let url = point.url.clone();
        let closure = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |_event: Event| {
            let Some(url) = url.as_deref() else {
                return;
            };
            match window.open_with_url_and_target(url, "_blank") {
                Ok(Some(tab)) => {
                    let _ = tab.focus();
                }
                Ok(None) => log::warn!("browser refused to open {url}"),
                Err(err) => log::error!("failed to open {url}: {err:?}"),
            }
        }));
        group.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        events.push(closure);
    }

    {
        let (document, group_el, circle) = (document.clone(), group.clone(), circle.clone());
        let label = point_label(point);
        let (radius, hover_radius) = (config.radius, config.hover_radius);
        let closure = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |_event: Event| {
            let shown = (|| -> Result<(), JsValue> {
                circle.set_attribute("r", &hover_radius.to_string())?;
                circle.set_attribute("fill", MARKER_HOVER_FILL)?;
                remove_all(&group_el, "text")?;
                let text = svg_element(&document, "text")?;
                text.set_attribute("dx", &radius.to_string())?;
                text.set_attribute("dy", &(radius * 2.0).to_string())?;
                text.set_text_content(Some(&label));
                group_el.append_child(&text)?;
                Ok(())
            })();
            if let Err(err) = shown {
                log::error!("failed to show point label: {err:?}");
            }
        }));
        group.add_event_listener_with_callback("mouseover", closure.as_ref().unchecked_ref())?;
        events.push(closure);
    }

    {
        let (group_el, circle) = (group.clone(), circle.clone());
        let radius = config.radius;
        let closure = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |_event: Event| {
            let _ = circle.set_attribute("r", &radius.to_string());
            let _ = circle.set_attribute("fill", MARKER_FILL);
            if let Err(err) = remove_all(&group_el, "text") {
                log::error!("failed to hide point label: {err:?}");
            }
        }));
        group.add_event_listener_with_callback("mouseout", closure.as_ref().unchecked_ref())?;
        events.push(closure);
    }

    Ok(events)
}
