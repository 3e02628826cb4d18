// #![warn(clippy::pedantic)]

// #![warn(clippy::nursery)]
// #![warn(clippy::cargo)]
#![warn(clippy::complexity)]
#![warn(clippy::correctness)]
#![warn(clippy::perf)]
#![warn(clippy::style)]
#![warn(clippy::suspicious)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
// #![warn(clippy::todo)]
// #![warn(clippy::unimplemented)]
// #![warn(clippy::dbg_macro)]

// #![warn(clippy::unwrap_used)]
// #![warn(clippy::expect_used)]

pub mod colormap;
pub mod common;
pub mod config;
pub mod cube;
pub mod projection;
pub mod render;
pub mod source;
pub mod survey;
pub mod viewer;

pub use colormap::{ColorScale, Colormap, Rgb, Stretch};
pub use config::ViewerConfig;
pub use cube::{CubeStore, IndexError, LoadError};
pub use projection::{AxesDescriptor, Projection};
pub use render::{render_frame, Colorbar, RenderedImage};
pub use source::{CubeSource, FitsSource, Header, HeaderValue, MemorySource, SourceError};
pub use survey::{survey, HeaderRecord};
pub use viewer::{
    multi::{Arrangement, GridCell, MultiSliceViewer, MultiViewerLayout},
    ChangeCallback, ConfigError, EventSender, RenderSurface, SliceViewer, Slider, SpectrumLabels,
    SpectrumSurface, ViewerEvent, ViewerOptions, ViewerState,
};
