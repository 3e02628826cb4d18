//! Collaborator doubles for viewer tests.

use std::{cell::RefCell, rc::Rc};

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use super::{ChangeCallback, RenderSurface, Slider, SpectrumLabels, SpectrumSurface};
use crate::{
    colormap::ColorScale,
    projection::AxesDescriptor,
    render::{render_frame, RenderedImage},
};

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Image(Array2<f32>, ColorScale),
    Title(String),
    Redraw,
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub calls: Vec<SurfaceCall>,
    pub rendered: Vec<RenderedImage>,
    pub axes: Option<AxesDescriptor>,
}

impl RecordingSurface {
    pub fn images(&self) -> Vec<&Array2<f32>> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                SurfaceCall::Image(frame, _) => Some(frame),
                _ => None,
            })
            .collect()
    }

    pub fn last_title(&self) -> Option<&str> {
        self.calls.iter().rev().find_map(|call| match call {
            SurfaceCall::Title(title) => Some(title.as_str()),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.calls.clear();
        self.rendered.clear();
    }
}

impl RenderSurface for RecordingSurface {
    fn set_image(&mut self, frame: ArrayView2<'_, f32>, scale: &ColorScale) {
        self.rendered.push(render_frame(frame, scale));
        self.calls.push(SurfaceCall::Image(frame.to_owned(), *scale));
    }

    fn set_title(&mut self, title: &str) {
        self.calls.push(SurfaceCall::Title(title.to_string()));
    }

    fn request_redraw(&mut self) {
        self.calls.push(SurfaceCall::Redraw);
    }

    fn set_axes(&mut self, axes: &AxesDescriptor) {
        self.axes = Some(axes.clone());
    }
}

/// Slider moved by the test through [`ManualSlider::drag`].
#[derive(Default)]
pub struct ManualSlider {
    pub range: Option<(f64, f64, f64)>,
    pub value: f64,
    callbacks: Vec<ChangeCallback>,
}

impl ManualSlider {
    /// Simulates the user dragging the control to `value`.
    pub fn drag(&mut self, value: f64) {
        self.value = value;
        for callback in &mut self.callbacks {
            callback(value);
        }
    }
}

impl Slider for ManualSlider {
    fn set_range(&mut self, min: f64, max: f64, step: f64) {
        self.range = Some((min, max, step));
    }

    fn set_value(&mut self, value: f64) {
        self.value = value;
    }

    fn current_value(&self) -> f64 {
        self.value
    }

    fn on_change(&mut self, callback: ChangeCallback) {
        self.callbacks.push(callback);
    }
}

pub type SpectrumLog = Rc<RefCell<Vec<(Array1<f32>, SpectrumLabels)>>>;

/// Spectrum surface writing into a log the test keeps a handle to.
#[derive(Default)]
pub struct RecordingSpectrum {
    pub log: SpectrumLog,
}

impl SpectrumSurface for RecordingSpectrum {
    fn set_series(&mut self, values: ArrayView1<'_, f32>, labels: &SpectrumLabels) {
        self.log
            .borrow_mut()
            .push((values.to_owned(), labels.clone()));
    }

    fn request_redraw(&mut self) {}
}
