use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, trace, warn};

use super::{
    RenderSurface, Slider, SpectrumLabels, SpectrumSurface, ViewerEvent, ViewerOptions,
    ViewerState,
};
use crate::{
    colormap::ColorScale,
    cube::{CubeStore, IndexError, LoadError},
    source::CubeSource,
};

/// Posts events to one viewer. Sends after the viewer is dropped are discarded.
#[derive(Debug, Clone)]
pub struct EventSender(UnboundedSender<ViewerEvent>);

impl EventSender {
    pub fn send(&self, event: ViewerEvent) {
        if self.0.send(event).is_err() {
            trace!(?event, "Viewer closed, dropping event");
        }
    }
}

/// One cube bound to one slider and one surface.
pub struct SliceViewer<S, C> {
    cube: CubeStore,
    state: ViewerState,
    surface: S,
    slider: C,
    spectrum: Option<Box<dyn SpectrumSurface>>,
    title_prefix: Option<String>,
    sender: EventSender,
    events: UnboundedReceiver<ViewerEvent>,
}

impl<S: RenderSurface, C: Slider> SliceViewer<S, C> {
    /// Binds `cube` to `surface` and `slider` and draws the initial frame.
    pub fn open(cube: CubeStore, mut surface: S, mut slider: C, options: ViewerOptions) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let sender = EventSender(tx);

        let current_index = cube.clamp_index(options.initial_index as f64);
        slider.set_range(0.0, (cube.frame_count() - 1) as f64, 1.0);
        slider.set_value(current_index as f64);
        let callback_sender = sender.clone();
        slider.on_change(Box::new(move |value| {
            callback_sender.send(ViewerEvent::SliderMoved(value))
        }));

        surface.set_axes(&cube.axes());

        let mut viewer = Self {
            cube,
            state: ViewerState {
                current_index,
                color_scale: options.color_scale,
            },
            surface,
            slider,
            spectrum: None,
            title_prefix: options.title_prefix,
            sender,
            events,
        };
        viewer.redraw();
        viewer
    }

    /// Loads the science cube of `source` and opens a viewer on it.
    ///
    /// Nothing is drawn if loading fails.
    pub fn load(
        source: &impl CubeSource,
        surface: S,
        slider: C,
        options: ViewerOptions,
    ) -> Result<Self, LoadError> {
        let cube = CubeStore::load(source)?;
        Ok(Self::open(cube, surface, slider, options))
    }

    /// Enables spectrum mode: pixel selections plot into `spectrum`.
    pub fn set_spectrum_surface(&mut self, spectrum: Box<dyn SpectrumSurface>) {
        self.spectrum = Some(spectrum);
    }

    pub fn with_spectrum_surface(mut self, spectrum: impl SpectrumSurface + 'static) -> Self {
        self.set_spectrum_surface(Box::new(spectrum));
        self
    }

    /// Handles a raw slider value: clamps it, stores it and redraws.
    ///
    /// Returns the index now displayed.
    pub fn on_slider_changed(&mut self, raw: f64) -> usize {
        let index = self.cube.clamp_index(raw);
        debug!(raw, index, "Slider moved");
        self.state.current_index = index;
        self.redraw();
        index
    }

    /// Plots the values of pixel `(x, y)` across all frames into the spectrum surface.
    ///
    /// Does nothing outside spectrum mode. The displayed frame is left as is.
    pub fn select_pixel(&mut self, x: usize, y: usize) -> Result<(), IndexError> {
        let values = self.cube.spectrum_at(x, y)?;
        let Some(spectrum) = self.spectrum.as_mut() else {
            debug!(x, y, "Pixel selected outside spectrum mode");
            return Ok(());
        };

        let labels = SpectrumLabels::for_pixel(x, y, self.cube.unit());
        spectrum.set_series(values, &labels);
        spectrum.request_redraw();
        Ok(())
    }

    pub fn handle(&mut self, event: ViewerEvent) {
        match event {
            ViewerEvent::SliderMoved(raw) => {
                self.on_slider_changed(raw);
            }
            ViewerEvent::PixelSelected { x, y } => {
                if let Err(err) = self.select_pixel(x, y) {
                    warn!(%err, "Ignoring pixel selection");
                }
            }
        }
    }

    /// Handles every queued event in the order it was posted.
    ///
    /// Returns the number of events handled.
    pub fn process_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            self.handle(event);
            handled += 1;
        }
        handled
    }

    /// Draws the current frame. The output depends only on the cube and the state.
    pub fn redraw(&mut self) {
        let index = self.state.current_index;
        let frame = self.cube.clamped_frame(index);
        self.surface.set_image(frame, &self.state.color_scale);
        let title = self.title();
        self.surface.set_title(&title);
        self.surface.request_redraw();
    }

    pub fn set_color_scale(&mut self, color_scale: ColorScale) {
        if self.state.color_scale != color_scale {
            self.state.color_scale = color_scale;
            self.redraw();
        }
    }

    pub fn title(&self) -> String {
        let index = self.state.current_index;
        match &self.title_prefix {
            Some(prefix) => format!("{prefix} - Slice {index}"),
            None => format!("Slice {index}"),
        }
    }

    /// Handle for posting events, e.g. pixel clicks, from the front-end.
    pub fn event_sender(&self) -> EventSender {
        self.sender.clone()
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    pub fn cube(&self) -> &CubeStore {
        &self.cube
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn slider(&self) -> &C {
        &self.slider
    }

    pub fn slider_mut(&mut self) -> &mut C {
        &mut self.slider
    }

    pub fn has_spectrum(&self) -> bool {
        self.spectrum.is_some()
    }
}
