use std::{cell::RefCell, rc::Rc};

use eframe::egui;
use miri_cube_core::{
    Arrangement, ColorScale, Colormap, MultiSliceViewer, Stretch, ViewerEvent,
};
use tracing::debug;

use crate::widgets::{FrameSlider, ImageSurface, SpectrumPlot, SpectrumSink};

pub type Viewer = MultiSliceViewer<ImageSurface, FrameSlider>;

pub struct CubeViewerApp {
    viewer: Viewer,
    spectra: Vec<Rc<RefCell<SpectrumPlot>>>,
    color_scale: ColorScale,
    zoom: f32,
}

impl CubeViewerApp {
    pub fn new(mut viewer: Viewer, color_scale: ColorScale) -> Self {
        let spectra = viewer
            .panels_mut()
            .iter_mut()
            .map(|panel| {
                let plot = Rc::new(RefCell::new(SpectrumPlot::default()));
                panel.set_spectrum_surface(Box::new(SpectrumSink::new(plot.clone())));
                plot
            })
            .collect();

        Self {
            viewer,
            spectra,
            color_scale,
            zoom: 4.0,
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        let mut scale = self.color_scale;
        ui.horizontal(|ui| {
            egui::ComboBox::from_label("Colormap")
                .selected_text(scale.colormap.to_string())
                .show_ui(ui, |ui| {
                    for colormap in Colormap::ALL {
                        ui.selectable_value(&mut scale.colormap, colormap, colormap.name());
                    }
                });
            egui::ComboBox::from_label("Stretch")
                .selected_text(scale.stretch.to_string())
                .show_ui(ui, |ui| {
                    for stretch in [Stretch::Linear, Stretch::Log] {
                        ui.selectable_value(&mut scale.stretch, stretch, stretch.to_string());
                    }
                });
            ui.add(egui::Slider::new(&mut self.zoom, 1.0..=16.0).text("Zoom"));
        });

        if scale != self.color_scale {
            debug!(colormap = %scale.colormap, stretch = %scale.stretch, "Color scale changed");
            self.color_scale = scale;
            for panel in self.viewer.panels_mut() {
                panel.set_color_scale(scale);
            }
        }
    }

    fn panel(&mut self, ui: &mut egui::Ui, index: usize) {
        let zoom = self.zoom;
        let Some(panel) = self.viewer.panel_mut(index) else {
            return;
        };

        ui.vertical(|ui| {
            if let Some((x, y)) = panel.surface_mut().show(ui, zoom) {
                panel.event_sender().send(ViewerEvent::PixelSelected { x, y });
            }
            panel.slider_mut().show(ui);
            if let Some(plot) = self.spectra.get(index) {
                plot.borrow().show(ui, index);
            }
        });
    }
}

impl eframe::App for CubeViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both().show(ui, |ui| {
                let count = self.viewer.len();
                match self.viewer.layout().arrangement {
                    Arrangement::Vertical => {
                        for index in 0..count {
                            self.panel(ui, index);
                            ui.separator();
                        }
                    }
                    Arrangement::Horizontal => {
                        ui.horizontal_top(|ui| {
                            for index in 0..count {
                                self.panel(ui, index);
                                ui.separator();
                            }
                        });
                    }
                }
            });
        });

        let handled = self.viewer.process_events();
        let mut dirty = false;
        for panel in self.viewer.panels_mut() {
            dirty |= panel.surface_mut().take_redraw_request();
        }
        if handled > 0 || dirty {
            ctx.request_repaint();
        }
    }
}
