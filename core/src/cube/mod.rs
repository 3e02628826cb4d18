mod err;


use get_size::GetSize;
use ndarray::{Array3, ArrayView1, ArrayView2, Axis, Ix3};
use tracing::{debug, instrument};

pub use err::{IndexError, LoadError};

use crate::{
    projection::{with_unit, AxesDescriptor, Projection},
    source::CubeSource,
    viewer::ConfigError,
};

/// An immutable stack of equally sized frames, indexed along the first axis.
///
/// Always holds at least one frame of at least one pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeStore {
    /// `(frame, y, x)`
    frames: Array3<f32>,
    projection: Option<Projection>,
    name: Option<String>,
    unit: Option<String>,
}

impl GetSize for CubeStore {
    fn get_heap_size(&self) -> usize {
        self.frames.len() * std::mem::size_of::<f32>()
            + self.name.get_heap_size()
            + self.unit.get_heap_size()
    }
}

impl CubeStore {
    /// Extension holding the science cube of a calibrated product.
    pub const SCIENCE_EXTENSION: usize = 1;

    /// Loads the science cube (extension 1) of `source`.
    pub fn load(source: &impl CubeSource) -> Result<Self, LoadError> {
        Self::load_extension(source, Self::SCIENCE_EXTENSION)
    }

    #[instrument(skip(source))]
    pub fn load_extension(source: &impl CubeSource, extension: usize) -> Result<Self, LoadError> {
        let count = source.extension_count();
        if extension >= count {
            return Err(LoadError::MissingExtension {
                index: extension,
                count,
            });
        }

        let data = source
            .data_array_at(extension)?
            .ok_or(LoadError::NoData { index: extension })?;
        if data.ndim() != 3 {
            return Err(LoadError::NotACube {
                ndim: data.ndim(),
                shape: data.shape().to_vec(),
            });
        }
        let frames = data.into_dimensionality::<Ix3>()?;

        let header = source.header_at(extension)?;
        let projection = Projection::from_header(&header);

        let mut cube = Self::from_frames(frames, projection)?;
        cube.name = header.get_str("EXTNAME").map(str::to_string);
        cube.unit = header.get_str("BUNIT").map(str::to_string);

        debug!(
            shape = ?cube.frames.dim(),
            projected = cube.projection.is_some(),
            heap_size = cube.get_heap_size(),
            "Loaded cube"
        );
        Ok(cube)
    }

    pub fn from_frames(
        frames: Array3<f32>,
        projection: Option<Projection>,
    ) -> Result<Self, LoadError> {
        let (count, height, width) = frames.dim();
        if count == 0 || height == 0 || width == 0 {
            return Err(LoadError::EmptyCube {
                shape: [count, height, width],
            });
        }
        Ok(Self {
            frames,
            projection,
            name: None,
            unit: None,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len_of(Axis(0))
    }

    /// `(height, width)` of every frame.
    pub fn frame_shape(&self) -> (usize, usize) {
        let (_, height, width) = self.frames.dim();
        (height, width)
    }

    pub fn frame_at(&self, index: usize) -> Result<ArrayView2<'_, f32>, IndexError> {
        let count = self.frame_count();
        if index >= count {
            return Err(IndexError::Frame { index, count });
        }
        Ok(self.frames.index_axis(Axis(0), index))
    }

    /// Frame at `index` clamped into range; never fails since cubes are non-empty.
    pub(crate) fn clamped_frame(&self, index: usize) -> ArrayView2<'_, f32> {
        let index = index.min(self.frame_count() - 1);
        self.frames.index_axis(Axis(0), index)
    }

    /// Values of pixel `(x, y)` across all frames, i.e. `frames[.., y, x]`.
    pub fn spectrum_at(&self, x: usize, y: usize) -> Result<ArrayView1<'_, f32>, IndexError> {
        let (height, width) = self.frame_shape();
        if x >= width || y >= height {
            return Err(IndexError::Pixel {
                x,
                y,
                width,
                height,
            });
        }
        Ok(self.frames.slice(ndarray::s![.., y, x]))
    }

    /// Maps a raw control value to a frame index: `max(0, min(N-1, round(v)))`.
    ///
    /// NaN maps to 0, infinities to the nearest end.
    pub fn clamp_index(&self, raw: f64) -> usize {
        let last = (self.frame_count() - 1) as f64;
        // `as` saturates and sends NaN to 0
        raw.round().clamp(0.0, last) as usize
    }

    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    pub fn with_projection(mut self, projection: Option<Projection>) -> Self {
        self.projection = projection;
        self
    }

    pub fn axes(&self) -> AxesDescriptor {
        let (height, width) = self.frame_shape();
        AxesDescriptor::new(self.projection(), width, height)
            .with_value_label(with_unit("Flux", self.unit()))
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Re-slices the cube so frames are taken along `axis` instead of axis 0.
    ///
    /// The projection describes the original pixel axes and is dropped unless `axis` is 0.
    pub fn along_axis(self, axis: usize) -> Result<Self, ConfigError> {
        match axis {
            0 => Ok(self),
            1 | 2 => {
                let mut frames = self.frames;
                frames.swap_axes(0, axis);
                let frames = frames.as_standard_layout().into_owned();
                debug!(axis, shape = ?frames.dim(), "Re-sliced cube");
                Ok(Self {
                    frames,
                    projection: None,
                    name: self.name,
                    unit: self.unit,
                })
            }
            _ => Err(ConfigError::InvalidAxis { axis }),
        }
    }
}
