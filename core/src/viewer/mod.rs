//! Interactive slice viewers.
//!
//! A viewer never talks to a GUI toolkit directly. It drives the
//! [`RenderSurface`], [`Slider`] and [`SpectrumSurface`] collaborators a
//! front-end hands it, and reacts to [`ViewerEvent`]s that the slider's change
//! callback (or the front-end, for pixel clicks) posts to the viewer's queue.
//! The front-end's event loop calls `process_events` once per iteration; every
//! handler runs to completion before the next event is looked at.

mod err;
pub mod multi;
mod slice;

#[cfg(test)]
pub(crate) mod testing;

use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

pub use err::ConfigError;
pub use slice::{EventSender, SliceViewer};

use crate::{
    colormap::{ColorScale, Colormap},
    projection::{with_unit, AxesDescriptor},
};

/// Where a viewer draws frames.
pub trait RenderSurface {
    fn set_image(&mut self, frame: ArrayView2<'_, f32>, scale: &ColorScale);
    fn set_title(&mut self, title: &str);
    fn request_redraw(&mut self);

    /// Called once when a viewer is bound to the surface.
    fn set_axes(&mut self, _axes: &AxesDescriptor) {}
}

pub type ChangeCallback = Box<dyn FnMut(f64)>;

/// A continuous control the user drags through frame indices.
pub trait Slider {
    fn set_range(&mut self, min: f64, max: f64, step: f64);
    /// Moves the control without firing change callbacks.
    fn set_value(&mut self, value: f64);
    fn current_value(&self) -> f64;
    /// Registers `callback` to run with the raw value whenever the user moves the control.
    fn on_change(&mut self, callback: ChangeCallback);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpectrumLabels {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

impl SpectrumLabels {
    /// Labels for the spectrum of pixel `(x, y)`, with the flux unit if known.
    pub fn for_pixel(x: usize, y: usize, unit: Option<&str>) -> Self {
        Self {
            title: format!("Spectrum at pixel ({x}, {y})"),
            x_label: "Slice index".to_string(),
            y_label: with_unit("Flux", unit),
        }
    }
}

/// Secondary surface showing the values of one pixel across all frames.
pub trait SpectrumSurface {
    fn set_series(&mut self, values: ArrayView1<'_, f32>, labels: &SpectrumLabels);
    fn request_redraw(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerEvent {
    /// Raw slider value, not yet rounded or clamped.
    SliderMoved(f64),
    /// Pixel in frame coordinates, `y` counting from the bottom row.
    PixelSelected { x: usize, y: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewerState {
    /// Always within `[0, frame_count - 1]` of the bound cube.
    pub current_index: usize,
    pub color_scale: ColorScale,
}

impl ViewerState {
    pub fn colormap(&self) -> Colormap {
        self.color_scale.colormap
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewerOptions {
    pub color_scale: ColorScale,
    /// Clamped into the cube's frame range when the viewer opens.
    pub initial_index: usize,
    /// Prepended to the frame title, e.g. `Cube 2` gives `Cube 2 - Slice 14`.
    pub title_prefix: Option<String>,
}

impl ViewerOptions {
    pub fn new(color_scale: ColorScale) -> Self {
        Self {
            color_scale,
            ..Self::default()
        }
    }

    pub fn with_initial_index(mut self, initial_index: usize) -> Self {
        self.initial_index = initial_index;
        self
    }

    pub fn with_title_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.title_prefix = Some(prefix.into());
        self
    }
}
