use std::{cell::RefCell, rc::Rc};

use egui::{ColorImage, RichText, TextureHandle, TextureOptions, Ui};
use miri_cube_core::{
    render_frame, AxesDescriptor, ChangeCallback, ColorScale, Colorbar, RenderSurface, Slider,
    SpectrumLabels, SpectrumSurface,
};
use ndarray::{ArrayView1, ArrayView2};

/// Frame display backed by an egui texture.
///
/// Frames are colored on `set_image` and uploaded the next time the panel is shown.
pub struct ImageSurface {
    name: String,
    pending: Option<ColorImage>,
    texture: Option<TextureHandle>,
    size: [usize; 2],
    title: String,
    axes: Option<AxesDescriptor>,
    colorbar: Option<Colorbar>,
    redraw_requested: bool,
}

impl ImageSurface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pending: None,
            texture: None,
            size: [0, 0],
            title: String::new(),
            axes: None,
            colorbar: None,
            redraw_requested: false,
        }
    }

    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    /// Draws the panel; returns the clicked pixel, `y` counted from the bottom row.
    pub fn show(&mut self, ui: &mut Ui, zoom: f32) -> Option<(usize, usize)> {
        if let Some(image) = self.pending.take() {
            match &mut self.texture {
                Some(texture) => texture.set(image, TextureOptions::NEAREST),
                None => {
                    self.texture =
                        Some(ui.ctx().load_texture(&self.name, image, TextureOptions::NEAREST))
                }
            }
        }

        ui.label(RichText::new(&self.title).strong());

        let texture = self.texture.as_ref()?;
        let [width, height] = self.size;
        let size = egui::vec2(width as f32 * zoom, height as f32 * zoom);
        let value_label = self.axes.as_ref().map_or("Flux", |a| a.value_label.as_str());
        let response = ui
            .horizontal(|ui| {
                let response = ui
                    .image(texture.id(), size)
                    .interact(egui::Sense::click());
                if let Some(colorbar) = &self.colorbar {
                    colorbar_ui(ui, colorbar, size.y, value_label);
                }
                response
            })
            .inner;

        if let Some(axes) = &self.axes {
            ui.label(format!(
                "{}: {:.6} to {:.6}    {}: {:.6} to {:.6}",
                axes.x_title(),
                axes.x_extent[0],
                axes.x_extent[1],
                axes.y_title(),
                axes.y_extent[0],
                axes.y_extent[1],
            ));
        }

        if !response.clicked() {
            return None;
        }
        let position = response.interact_pointer_pos()?;
        pixel_at(
            (position - response.rect.min) / response.rect.size(),
            width,
            height,
        )
    }
}

/// Frame pixel under a position given relative to the image rect (`0..=1`, top-left origin).
///
/// The returned `y` counts from the bottom row, matching the frame layout.
fn pixel_at(relative: egui::Vec2, width: usize, height: usize) -> Option<(usize, usize)> {
    if width == 0 || height == 0 {
        return None;
    }
    if !(0.0..=1.0).contains(&relative.x) || !(0.0..=1.0).contains(&relative.y) {
        return None;
    }
    let x = ((relative.x * width as f32) as usize).min(width - 1);
    let row_from_top = ((relative.y * height as f32) as usize).min(height - 1);
    Some((x, height - 1 - row_from_top))
}

fn format_value(value: f32) -> String {
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-2..1e4).contains(&magnitude) {
        format!("{value:.3e}")
    } else {
        format!("{value:.3}")
    }
}

fn colorbar_ui(ui: &mut Ui, colorbar: &Colorbar, height: f32, label: &str) {
    const STEPS: usize = 64;

    let (rect, _) = ui.allocate_exact_size(egui::vec2(14.0, height), egui::Sense::hover());
    let step = rect.height() / STEPS as f32;
    for (i, [r, g, b]) in colorbar.gradient(STEPS).into_iter().enumerate() {
        // Minimum at the bottom
        let bottom = rect.bottom() - i as f32 * step;
        let strip = egui::Rect::from_min_max(
            egui::pos2(rect.left(), bottom - step),
            egui::pos2(rect.right(), bottom),
        );
        ui.painter()
            .rect_filled(strip, 0.0, egui::Color32::from_rgb(r, g, b));
    }

    ui.vertical(|ui| {
        let row = ui.text_style_height(&egui::TextStyle::Body) + ui.spacing().item_spacing.y;
        let gap = ((height - 3.0 * row) / 2.0).max(0.0);
        ui.label(format_value(colorbar.range.max));
        ui.add_space(gap);
        ui.weak(label);
        ui.add_space(gap);
        ui.label(format_value(colorbar.range.min));
    });
}

impl RenderSurface for ImageSurface {
    fn set_image(&mut self, frame: ArrayView2<'_, f32>, scale: &ColorScale) {
        let image = render_frame(frame, scale);
        self.size = [image.width, image.height];
        self.colorbar = Colorbar::new(frame, *scale);
        self.pending = Some(ColorImage::from_rgba_unmultiplied(
            [image.width, image.height],
            &image.pixels,
        ));
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }

    fn set_axes(&mut self, axes: &AxesDescriptor) {
        self.axes = Some(axes.clone());
    }
}

/// Frame slider; fires change callbacks when the user drags it.
pub struct FrameSlider {
    label: String,
    value: f64,
    min: f64,
    max: f64,
    step: f64,
    callbacks: Vec<ChangeCallback>,
}

impl FrameSlider {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: 0.0,
            min: 0.0,
            max: 0.0,
            step: 1.0,
            callbacks: Vec::new(),
        }
    }

    pub fn show(&mut self, ui: &mut Ui) {
        let response = ui.add(
            egui::Slider::new(&mut self.value, self.min..=self.max)
                .step_by(self.step)
                .text(self.label.clone()),
        );
        if response.changed() {
            let value = self.value;
            for callback in &mut self.callbacks {
                callback(value);
            }
        }
    }
}

impl Slider for FrameSlider {
    fn set_range(&mut self, min: f64, max: f64, step: f64) {
        self.min = min;
        self.max = max;
        self.step = step;
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

#[derive(Debug, Default)]
pub struct SpectrumPlot {
    labels: Option<SpectrumLabels>,
    points: Vec<[f64; 2]>,
}

impl SpectrumPlot {
    pub fn show(&self, ui: &mut Ui, id: usize) {
        let Some(labels) = &self.labels else {
            ui.weak("Click a pixel to plot its spectrum");
            return;
        };

        ui.label(RichText::new(&labels.title).strong());
        egui::plot::Plot::new(("spectrum", id))
            .height(160.0)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.line(egui::plot::Line::new(egui::plot::PlotPoints::new(
                    self.points.clone(),
                )))
            });
        ui.weak(format!("x: {}    y: {}", labels.x_label, labels.y_label));
    }
}

/// Spectrum surface writing into a plot the app shows below the panel.
pub struct SpectrumSink {
    plot: Rc<RefCell<SpectrumPlot>>,
}

impl SpectrumSink {
    pub fn new(plot: Rc<RefCell<SpectrumPlot>>) -> Self {
        Self { plot }
    }
}

impl SpectrumSurface for SpectrumSink {
    fn set_series(&mut self, values: ArrayView1<'_, f32>, labels: &SpectrumLabels) {
        let mut plot = self.plot.borrow_mut();
        plot.points = values
            .iter()
            .enumerate()
            .map(|(i, &v)| [i as f64, v as f64])
            .collect();
        plot.labels = Some(labels.clone());
    }

    // The plot is redrawn with the rest of the window every frame
    fn request_redraw(&mut self) {}
}

#[cfg(test)]
mod tests {
    use egui::vec2;

    use super::{format_value, pixel_at};

    #[test]
    fn clicks_map_to_bottom_origin_pixels() {
        assert_eq!(pixel_at(vec2(0.0, 0.0), 45, 44), Some((0, 43)));
        assert_eq!(pixel_at(vec2(1.0, 1.0), 45, 44), Some((44, 0)));
        assert_eq!(pixel_at(vec2(0.0, 1.0), 45, 44), Some((0, 0)));
        // Centre of pixel (2, 1) in a 4 x 4 frame
        assert_eq!(pixel_at(vec2(0.625, 0.625), 4, 4), Some((2, 1)));
    }

    #[test]
    fn clicks_outside_the_image_are_ignored() {
        for relative in [vec2(-0.01, 0.5), vec2(0.5, 1.01), vec2(1.5, -2.0)] {
            assert_eq!(pixel_at(relative, 10, 10), None);
        }
        assert_eq!(pixel_at(vec2(f32::NAN, 0.5), 10, 10), None);
        assert_eq!(pixel_at(vec2(0.5, 0.5), 0, 10), None);
    }

    #[test]
    fn colorbar_labels_switch_to_exponents() {
        assert_eq!(format_value(12.5), "12.500");
        assert_eq!(format_value(0.0), "0.000");
        assert_eq!(format_value(123456.0), "1.235e5");
    }
}
