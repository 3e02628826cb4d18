use serde::{Deserialize, Serialize};

use crate::{
    colormap::{ColorScale, Colormap, Stretch},
    cube::CubeStore,
    viewer::{multi::Arrangement, ConfigError, ViewerOptions},
};

/// Settings shared by the front-ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub colormap: Colormap,
    pub stretch: Stretch,
    pub arrangement: Arrangement,
    /// Cube axis frames are taken along.
    pub axis: usize,
    /// Extension holding the cube.
    pub extension: usize,
    pub initial_index: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            colormap: Colormap::Inferno,
            stretch: Stretch::Linear,
            arrangement: Arrangement::Vertical,
            axis: 0,
            extension: CubeStore::SCIENCE_EXTENSION,
            initial_index: 0,
        }
    }
}

impl ViewerConfig {
    pub fn color_scale(&self) -> ColorScale {
        ColorScale::new(self.colormap, self.stretch)
    }

    pub fn viewer_options(&self) -> ViewerOptions {
        ViewerOptions::new(self.color_scale()).with_initial_index(self.initial_index)
    }

    /// Re-slices `cube` along the configured axis.
    pub fn prepare(&self, cube: CubeStore) -> Result<CubeStore, ConfigError> {
        cube.along_axis(self.axis)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array3;

    use super::ViewerConfig;
    use crate::{cube::CubeStore, viewer::ConfigError, Colormap, Stretch};

    #[test]
    fn defaults_match_science_products() {
        let config = ViewerConfig::default();
        assert_eq!(config.extension, 1);
        assert_eq!(config.colormap, Colormap::Inferno);
        assert_eq!(config.viewer_options().initial_index, 0);
    }

    #[test]
    fn prepare_applies_axis() {
        let cube = CubeStore::from_frames(Array3::zeros((4, 3, 2)), None).unwrap();
        let config = ViewerConfig {
            axis: 1,
            stretch: Stretch::Log,
            ..ViewerConfig::default()
        };
        assert_eq!(config.prepare(cube.clone()).unwrap().frame_count(), 3);
        assert_eq!(config.color_scale().stretch, Stretch::Log);

        let config = ViewerConfig {
            axis: 5,
            ..ViewerConfig::default()
        };
        assert_eq!(
            config.prepare(cube).unwrap_err(),
            ConfigError::InvalidAxis { axis: 5 }
        );
    }
}
