//! [`Surface`] backed by a full-window `<canvas>` and its 2D context.

use std::cell::Cell;
use std::f64::consts::TAU;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, Window};

use super::{Blend, Fill, Layer, Path, Shape, Stroke, Style, Surface, SurfaceSpec};
use crate::error::{Error, Result};

pub fn window_size(window: &Window) -> Vec2 {
    let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    Vec2::new(width as f32, height as f32)
}

pub struct CanvasSurface {
    marker: &'static str,
    window: Window,
    document: Document,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    size: Rc<Cell<Vec2>>,
    on_resize: Option<Closure<dyn FnMut()>>,
}

impl CanvasSurface {
    pub fn new(window: Window, document: Document, spec: SurfaceSpec) -> Result<Self> {
        let canvas = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| Error::SurfaceUnavailable(format!("{} is not a canvas", spec.marker)))?;
        canvas.set_class_name(spec.marker);
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| {
                Error::SurfaceUnavailable(format!("no 2d context for {}", spec.marker))
            })?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| {
                Error::SurfaceUnavailable(format!("bad 2d context for {}", spec.marker))
            })?;
        style_overlay(&canvas, spec.layer)?;

        let surface = Self {
            marker: spec.marker,
            window,
            document,
            canvas,
            ctx,
            size: Rc::new(Cell::new(Vec2::ZERO)),
            on_resize: None,
        };
        surface.fit();
        Ok(surface)
    }

    fn fit(&self) {
        let size = window_size(&self.window);
        self.canvas.set_width(size.x as u32);
        self.canvas.set_height(size.y as u32);
        self.size.set(size);
    }

    fn apply(&self, style: &Style) -> std::result::Result<(), JsValue> {
        self.ctx.set_global_alpha(style.alpha.clamp(0.0, 1.0) as f64);
        self.ctx.set_global_composite_operation(match style.blend {
            Blend::Normal => "source-over",
            Blend::Additive => "lighter",
        })?;
        if let Some(shadow) = style.shadow {
            self.ctx.set_shadow_blur(shadow.blur as f64);
            self.ctx.set_shadow_color(&shadow.color.to_string());
        }
        if let Some(transform) = style.transform {
            self.ctx
                .translate(transform.translate.x as f64, transform.translate.y as f64)?;
            self.ctx.rotate(transform.rotation as f64)?;
        }
        Ok(())
    }

    fn set_fill(&self, fill: &Fill) -> std::result::Result<(), JsValue> {
        match fill {
            Fill::Solid(color) => self.ctx.set_fill_style_str(&color.to_string()),
            Fill::Linear {
                from,
                to,
                start,
                end,
            } => {
                let gradient = self.ctx.create_linear_gradient(
                    from.x as f64,
                    from.y as f64,
                    to.x as f64,
                    to.y as f64,
                );
                gradient.add_color_stop(0.0, &start.to_string())?;
                gradient.add_color_stop(1.0, &end.to_string())?;
                self.ctx.set_fill_style_canvas_gradient(&gradient);
            }
            Fill::Radial {
                center,
                inner,
                outer,
                start,
                end,
            } => {
                let (x, y) = (center.x as f64, center.y as f64);
                let gradient = self.ctx.create_radial_gradient(
                    x,
                    y,
                    *inner as f64,
                    x,
                    y,
                    *outer as f64,
                )?;
                gradient.add_color_stop(0.0, &start.to_string())?;
                gradient.add_color_stop(1.0, &end.to_string())?;
                self.ctx.set_fill_style_canvas_gradient(&gradient);
            }
        }
        Ok(())
    }

    fn trace_polyline(&self, points: &[Vec2]) {
        if let Some((first, rest)) = points.split_first() {
            self.ctx.move_to(first.x as f64, first.y as f64);
            for p in rest {
                self.ctx.line_to(p.x as f64, p.y as f64);
            }
        }
    }

    fn draw_fill(
        &self,
        shape: &Shape<'_>,
        fill: &Fill,
        style: &Style,
    ) -> std::result::Result<(), JsValue> {
        self.apply(style)?;
        self.set_fill(fill)?;
        self.ctx.begin_path();
        match *shape {
            Shape::Circle { center, radius } => {
                self.ctx
                    .arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU)?;
            }
            Shape::Arc {
                center,
                radius,
                start,
                end,
            } => {
                self.ctx.arc_with_anticlockwise(
                    center.x as f64,
                    center.y as f64,
                    radius as f64,
                    start as f64,
                    end as f64,
                    true,
                )?;
            }
            Shape::Rect { origin, size } => {
                self.ctx
                    .rect(origin.x as f64, origin.y as f64, size.x as f64, size.y as f64);
            }
            Shape::Polygon(points) => {
                self.trace_polyline(points);
                self.ctx.close_path();
            }
        }
        self.ctx.fill();
        Ok(())
    }

    fn draw_stroke(
        &self,
        path: &Path<'_>,
        stroke: &Stroke,
        style: &Style,
    ) -> std::result::Result<(), JsValue> {
        self.apply(style)?;
        self.ctx.set_stroke_style_str(&stroke.color.to_string());
        self.ctx.set_line_width(stroke.width as f64);
        self.ctx.set_line_cap("round");
        self.ctx.begin_path();
        match *path {
            Path::Polyline { points, closed } => {
                self.trace_polyline(points);
                if closed {
                    self.ctx.close_path();
                }
            }
            Path::Bezier { from, c1, c2, to } => {
                self.ctx.move_to(from.x as f64, from.y as f64);
                self.ctx.bezier_curve_to(
                    c1.x as f64,
                    c1.y as f64,
                    c2.x as f64,
                    c2.y as f64,
                    to.x as f64,
                    to.y as f64,
                );
            }
            Path::Circle { center, radius } => {
                self.ctx
                    .arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU)?;
            }
        }
        self.ctx.stroke();
        Ok(())
    }
}

/// Fixed, full-window and click-through, stacked at `layer`.
fn style_overlay(canvas: &HtmlCanvasElement, layer: Layer) -> Result<()> {
    let style = canvas.style();
    for (name, value) in [
        ("position", "fixed"),
        ("top", "0"),
        ("left", "0"),
        ("pointer-events", "none"),
    ] {
        style.set_property(name, value)?;
    }
    style.set_property("z-index", &layer.0.to_string())?;
    Ok(())
}

impl Surface for CanvasSurface {
    fn marker(&self) -> &str {
        self.marker
    }

    fn size(&self) -> Vec2 {
        self.size.get()
    }

    fn is_attached(&self) -> bool {
        self.canvas.is_connected()
    }

    fn attach(&mut self) -> Result<()> {
        if !self.is_attached() {
            let body = self
                .document
                .body()
                .ok_or_else(|| Error::SurfaceUnavailable("document has no body".into()))?;
            body.append_child(&self.canvas)?;
        }
        self.fit();
        if self.on_resize.is_none() {
            let window = self.window.clone();
            let canvas = self.canvas.clone();
            let size = Rc::clone(&self.size);
            let on_resize = Closure::<dyn FnMut()>::new(move || {
                let fitted = window_size(&window);
                canvas.set_width(fitted.x as u32);
                canvas.set_height(fitted.y as u32);
                size.set(fitted);
            });
            self.window
                .add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
            self.on_resize = Some(on_resize);
        }
        Ok(())
    }

    fn detach(&mut self) {
        if let Some(on_resize) = self.on_resize.take() {
            let removed = self
                .window
                .remove_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref());
            if let Err(err) = removed {
                log::debug!("Could not remove resize listener: {:?}", err);
            }
        }
        self.canvas.remove();
    }

    fn clear(&mut self) {
        let size = self.size.get();
        self.ctx.clear_rect(0.0, 0.0, size.x as f64, size.y as f64);
    }

    fn fill(&mut self, shape: &Shape<'_>, fill: &Fill, style: &Style) {
        self.ctx.save();
        if let Err(err) = self.draw_fill(shape, fill, style) {
            log::debug!("[{}] fill failed: {:?}", self.marker, err);
        }
        self.ctx.restore();
    }

    fn stroke(&mut self, path: &Path<'_>, stroke: &Stroke, style: &Style) {
        self.ctx.save();
        if let Err(err) = self.draw_stroke(path, stroke, style) {
            log::debug!("[{}] stroke failed: {:?}", self.marker, err);
        }
        self.ctx.restore();
    }
}

impl Drop for CanvasSurface {
    fn drop(&mut self) {
        self.detach();
    }
}
