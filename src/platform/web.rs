//! The browser platform: `Date`, `requestAnimationFrame`/`setTimeout` and
//! the live DOM.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{Local, NaiveTime};
use glam::Vec2;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, Window};

use super::{
    Clock, FrameCallback, FrameHandle, OverlayContent, Platform, Scheduler, Stage, TimerCallback,
    TimerHandle, WidgetId, WidgetTreatment,
};
use crate::calendar::MonthDay;
use crate::error::{Error, Result};
use crate::render::canvas::{CanvasSurface, window_size};
use crate::render::{Layer, Surface, SurfaceSpec};

pub const CONTAINER_ID: &str = "birthday-module-container";
pub const CONTAINER_CLASS: &str = "birthday-module";
pub const OVERLAY_ID: &str = "birthday-celebration-overlay";
const BACKDROP_CLASS: &str = "birthday-dim-overlay";
const WIDGET_SELECTOR: &str = ".module:not(.birthday-module)";

pub fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| Error::Js("no window".into()))
}

fn document(window: &Window) -> Result<Document> {
    window
        .document()
        .ok_or_else(|| Error::Js("no document".into()))
}

/// Every element matching `selector`.
fn select_all(document: &Document, selector: &str) -> Vec<Element> {
    let Ok(nodes) = document.query_selector_all(selector) else {
        log::warn!("Bad selector {}", selector);
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn set_styles(element: &HtmlElement, styles: &[(&str, &str)]) {
    let css = element.style();
    for (name, value) in styles {
        if let Err(err) = css.set_property(name, value) {
            log::debug!("Could not set {}: {:?}", name, err);
        }
    }
}

pub struct WebClock;

impl Clock for WebClock {
    fn now(&self) -> f64 {
        js_sys::Date::now()
    }

    fn today(&self) -> MonthDay {
        MonthDay::of(Local::now().date_naive())
    }

    fn time_of_day(&self) -> NaiveTime {
        Local::now().time()
    }
}

pub struct WebScheduler {
    window: Window,
}

impl Scheduler for WebScheduler {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle {
        let js = Closure::once_into_js(move |_timestamp: f64| callback(js_sys::Date::now()));
        match self.window.request_animation_frame(js.unchecked_ref()) {
            Ok(id) => FrameHandle(id),
            Err(err) => {
                log::error!("requestAnimationFrame failed: {:?}", err);
                FrameHandle(-1)
            }
        }
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        if let Err(err) = self.window.cancel_animation_frame(handle.0) {
            log::debug!("cancelAnimationFrame failed: {:?}", err);
        }
    }

    fn set_timeout(&self, delay_ms: u32, callback: TimerCallback) -> TimerHandle {
        let js = Closure::once_into_js(move || callback());
        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(js.unchecked_ref(), delay)
        {
            Ok(id) => TimerHandle(id),
            Err(err) => {
                log::error!("setTimeout failed: {:?}", err);
                TimerHandle(-1)
            }
        }
    }

    fn clear_timeout(&self, handle: TimerHandle) {
        self.window.clear_timeout_with_handle(handle.0);
    }
}

/// The dashboard page.
///
/// Widgets are handed out as indices into the list found by the last
/// [`Stage::widgets`] call.
pub struct WebStage {
    window: Window,
    document: Document,
    widgets: RefCell<Vec<HtmlElement>>,
}

impl WebStage {
    pub fn new(window: Window) -> Result<Self> {
        let document = document(&window)?;
        Ok(Self {
            window,
            document,
            widgets: RefCell::new(Vec::new()),
        })
    }

    fn create_div(&self) -> Result<HtmlElement> {
        self.document
            .create_element("div")?
            .dyn_into::<HtmlElement>()
            .map_err(|_| Error::Js("div is not an HtmlElement".into()))
    }

    fn body(&self) -> Result<HtmlElement> {
        self.document
            .body()
            .ok_or_else(|| Error::Js("document has no body".into()))
    }

    /// A fresh message overlay: fixed, centered and above everything else.
    /// The host's own container is left where it is.
    fn overlay(&self) -> Result<HtmlElement> {
        self.remove_overlay();
        let overlay = self.create_div()?;
        let layer = Layer::CONFETTI.0.to_string();
        overlay.set_id(OVERLAY_ID);
        overlay.set_class_name(CONTAINER_CLASS);
        set_styles(
            &overlay,
            &[
                ("position", "fixed"),
                ("top", "50%"),
                ("left", "50%"),
                ("transform", "translate(-50%, -50%)"),
                ("z-index", layer.as_str()),
                ("pointer-events", "none"),
                ("display", "block"),
                ("background-color", "transparent"),
                ("background", "none"),
            ],
        );
        self.body()?.append_child(&overlay)?;
        Ok(overlay)
    }

    fn fill_overlay(&self, content: &OverlayContent) -> Result<()> {
        let container = self.overlay()?;

        let message = self.create_div()?;
        message.set_class_name("birthday-message");
        message.set_text_content(Some(&content.message));
        container.append_child(&message)?;

        if let Some(lines) = &content.debug {
            let panel = self.create_div()?;
            panel.set_class_name("debug-info");
            for line in lines {
                let p = self.document.create_element("p")?;
                p.set_text_content(Some(line));
                panel.append_child(&p)?;
            }
            container.append_child(&panel)?;
        }
        Ok(())
    }

    fn add_backdrop(&self) -> Result<()> {
        let backdrop = self.create_div()?;
        let layer = Layer::BACKDROP.0.to_string();
        backdrop.set_class_name(BACKDROP_CLASS);
        set_styles(
            &backdrop,
            &[
                ("position", "fixed"),
                ("top", "0"),
                ("left", "0"),
                ("width", "100%"),
                ("height", "100%"),
                ("background-color", "rgba(0, 0, 0, 0.7)"),
                ("z-index", layer.as_str()),
                ("pointer-events", "none"),
            ],
        );
        self.body()?.append_child(&backdrop)?;
        Ok(())
    }
}

impl Stage for WebStage {
    fn viewport(&self) -> Vec2 {
        window_size(&self.window)
    }

    fn create_surface(&self, spec: SurfaceSpec) -> Result<Box<dyn Surface>> {
        let surface = CanvasSurface::new(self.window.clone(), self.document.clone(), spec)?;
        Ok(Box::new(surface))
    }

    fn remove_surfaces(&self, marker: &str) -> usize {
        let found = select_all(&self.document, &format!("canvas.{}", marker));
        for element in &found {
            element.remove();
        }
        found.len()
    }

    fn show_overlay(&self, content: &OverlayContent) {
        if let Err(err) = self.fill_overlay(content) {
            log::error!("[Birthday] Could not show message: {}", err);
        }
    }

    fn remove_overlay(&self) {
        if let Some(overlay) = self.document.get_element_by_id(OVERLAY_ID) {
            overlay.remove();
        }
    }

    fn show_backdrop(&self) {
        self.remove_backdrop();
        if let Err(err) = self.add_backdrop() {
            log::error!("[Birthday] Could not dim the page: {}", err);
        }
    }

    fn remove_backdrop(&self) {
        for element in select_all(&self.document, &format!(".{}", BACKDROP_CLASS)) {
            element.remove();
        }
    }

    fn widgets(&self) -> Vec<WidgetId> {
        let found: Vec<HtmlElement> = select_all(&self.document, WIDGET_SELECTOR)
            .into_iter()
            .filter_map(|e| e.dyn_into::<HtmlElement>().ok())
            .collect();
        let ids = (0..found.len()).map(|i| WidgetId(i.to_string())).collect();
        *self.widgets.borrow_mut() = found;
        ids
    }

    fn treat_widget(&self, widget: &WidgetId, treatment: WidgetTreatment) {
        let widgets = self.widgets.borrow();
        let Some(element) = widget.0.parse::<usize>().ok().and_then(|i| widgets.get(i)) else {
            log::debug!("Unknown widget {:?}", widget);
            return;
        };
        match treatment {
            WidgetTreatment::Dimmed => set_styles(
                element,
                &[
                    ("filter", "brightness(30%)"),
                    ("transition", "filter 0.5s ease-in-out"),
                    ("z-index", "1"),
                ],
            ),
            WidgetTreatment::Normal => set_styles(
                element,
                &[
                    ("filter", ""),
                    ("opacity", "1"),
                    ("visibility", "visible"),
                    ("display", "block"),
                    ("z-index", "1"),
                ],
            ),
        }
    }
}

/// The platform for the current page.
pub fn platform() -> Result<Platform> {
    let window = window()?;
    Ok(Platform {
        clock: Rc::new(WebClock),
        scheduler: Rc::new(WebScheduler {
            window: window.clone(),
        }),
        stage: Rc::new(WebStage::new(window)?),
    })
}
