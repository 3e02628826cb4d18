#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{eyre, Result, WrapErr};
use eframe::egui;
use miri_cube_core::{
    Arrangement, Colormap, CubeStore, FitsSource, Header, MemorySource, MultiSliceViewer, Stretch,
    ViewerConfig,
};
use ndarray::Array3;
use tracing::info;

mod app;
mod widgets;

use app::CubeViewerApp;
use widgets::{FrameSlider, ImageSurface};

/// Browse the frames of FITS spectral cubes.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// FITS files to open, one panel each.
    files: Vec<PathBuf>,

    #[arg(short, long, default_value_t = Arrangement::Vertical)]
    layout: Arrangement,

    /// Defaults to inferno for one cube and magma for several.
    #[arg(short, long)]
    colormap: Option<Colormap>,

    #[arg(short, long, default_value_t = Stretch::Linear)]
    stretch: Stretch,

    /// Cube axis to step through with the slider.
    #[arg(short, long, default_value_t = 0)]
    axis: usize,

    /// Extension holding the cube.
    #[arg(short, long, default_value_t = CubeStore::SCIENCE_EXTENSION)]
    extension: usize,

    #[arg(long, default_value_t = 0)]
    initial_index: usize,

    /// Open synthetic cubes instead of files.
    #[arg(long)]
    demo: bool,
}

impl Args {
    fn panel_count(&self) -> usize {
        if self.demo {
            DEMO_CUBES
        } else {
            self.files.len()
        }
    }

    fn config(&self) -> ViewerConfig {
        ViewerConfig {
            colormap: self
                .colormap
                .unwrap_or_else(|| Colormap::default_for_panels(self.panel_count())),
            stretch: self.stretch,
            arrangement: self.layout,
            axis: self.axis,
            extension: self.extension,
            initial_index: self.initial_index,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = args.config();

    let cubes = if args.demo {
        demo_cubes()?
            .into_iter()
            .map(|cube| config.prepare(cube))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        args.files
            .iter()
            .map(|path| -> Result<CubeStore> {
                let source = FitsSource::open(path)
                    .wrap_err_with(|| format!("Failed to open {}", path.display()))?;
                let cube = CubeStore::load_extension(&source, config.extension)
                    .wrap_err_with(|| format!("Failed to load cube from {}", path.display()))?;
                Ok(config.prepare(cube)?)
            })
            .collect::<Result<Vec<_>>>()?
    };
    info!(cubes = cubes.len(), "Loaded cubes");

    let projections = cubes.iter().map(|c| c.projection().cloned()).collect();
    let viewer = MultiSliceViewer::build(
        cubes,
        Some(projections),
        config.arrangement,
        &config.viewer_options(),
        |i, _cell| (ImageSurface::new(format!("panel-{i}")), FrameSlider::new("Frame")),
    )?;
    let app = CubeViewerApp::new(viewer, config.color_scale());

    let options = eframe::NativeOptions {
        initial_window_size: Some(egui::vec2(900.0, 700.0)),
        ..Default::default()
    };
    eframe::run_native("MIRI cube viewer", options, Box::new(|_cc| Box::new(app)))
        .map_err(|e| eyre!("{e}"))
}

const DEMO_CUBES: usize = 2;

/// Small cubes with a Gaussian source drifting across the field.
fn demo_cubes() -> Result<Vec<CubeStore>> {
    let header = Header::new()
        .with("BUNIT", "MJy/sr")
        .with("CTYPE1", "RA---TAN")
        .with("CTYPE2", "DEC--TAN")
        .with("CUNIT1", "deg")
        .with("CUNIT2", "deg")
        .with("CRPIX1", 16.0)
        .with("CRPIX2", 16.0)
        .with("CRVAL1", 83.822)
        .with("CRVAL2", -5.391)
        .with("CDELT1", -3.6e-5)
        .with("CDELT2", 3.6e-5);

    let shapes: [(usize, usize, f32); DEMO_CUBES] = [(40, 32, 0.5), (25, 32, -0.8)];
    shapes
        .into_iter()
        .enumerate()
        .map(|(k, (frames, size, drift))| {
            let cube = Array3::from_shape_fn((frames, size, size), |(t, y, x)| {
                let cx = size as f32 / 2.0 + drift * (t as f32 - frames as f32 / 2.0);
                let cy = size as f32 / 2.0;
                let r2 = (x as f32 - cx).powi(2) + (y as f32 - cy).powi(2);
                let line = 1.0 + 4.0 * (-(t as f32 - frames as f32 / 3.0).powi(2) / 20.0).exp();
                line * (-r2 / 18.0).exp() + 0.01
            });
            let source = MemorySource::with_science_cube(cube, header.clone());
            Ok(CubeStore::load(&source)?.with_name(format!("demo-{}", k + 1)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use miri_cube_core::Colormap;

    use super::Args;

    #[test]
    fn colormap_default_depends_on_panel_count() {
        let single = Args::parse_from(["viewer", "a.fits"]);
        assert_eq!(single.config().colormap, Colormap::Inferno);

        let several = Args::parse_from(["viewer", "a.fits", "b.fits"]);
        assert_eq!(several.config().colormap, Colormap::Magma);

        let demo = Args::parse_from(["viewer", "--demo"]);
        assert_eq!(demo.config().colormap, Colormap::Magma);

        let chosen = Args::parse_from(["viewer", "a.fits", "b.fits", "--colormap", "viridis"]);
        assert_eq!(chosen.config().colormap, Colormap::Viridis);
    }
}
