use ndarray::{Array3, ArrayD};

use super::{check_extension, CubeSource, Header, SourceError};

#[derive(Debug, Clone, Default)]
pub struct MemoryExtension {
    pub header: Header,
    pub data: Option<ArrayD<f32>>,
}

/// [`CubeSource`] backed by arrays held in memory.
///
/// Used for synthetic cubes and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    extensions: Vec<MemoryExtension>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Header-only primary extension followed by a `SCI` extension holding `cube`,
    /// the layout of a calibrated spectral cube product.
    pub fn with_science_cube(cube: Array3<f32>, header: Header) -> Self {
        let (frames, rows, columns) = cube.dim();
        let header = header
            .with("EXTNAME", "SCI")
            .with("NAXIS", 3i64)
            .with("NAXIS1", columns as i64)
            .with("NAXIS2", rows as i64)
            .with("NAXIS3", frames as i64);
        Self::new()
            .push(Header::new().with("NAXIS", 0i64), None)
            .push(header, Some(cube.into_dyn()))
    }

    pub fn push(mut self, header: Header, data: Option<ArrayD<f32>>) -> Self {
        self.extensions.push(MemoryExtension { header, data });
        self
    }
}

impl CubeSource for MemorySource {
    fn extension_count(&self) -> usize {
        self.extensions.len()
    }

    fn data_array_at(&self, extension: usize) -> Result<Option<ArrayD<f32>>, SourceError> {
        check_extension(extension, self.extensions.len())?;
        Ok(self.extensions[extension].data.clone())
    }

    fn header_at(&self, extension: usize) -> Result<Header, SourceError> {
        check_extension(extension, self.extensions.len())?;
        Ok(self.extensions[extension].header.clone())
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array3;

    use super::MemorySource;
    use crate::source::{CubeSource, Header, SourceError};

    #[test]
    fn science_cube_lands_in_extension_one() {
        let source = MemorySource::with_science_cube(Array3::zeros((4, 3, 2)), Header::new());
        assert_eq!(source.extension_count(), 2);
        assert!(source.data_array_at(0).unwrap().is_none());

        let info = source.describe().unwrap();
        assert_eq!(info[1].name.as_deref(), Some("SCI"));
        assert_eq!(info[1].shape, vec![4, 3, 2]);
    }

    #[test]
    fn missing_extension_is_an_error() {
        let source = MemorySource::new();
        assert!(matches!(
            source.header_at(1),
            Err(SourceError::ExtensionOutOfRange { index: 1, count: 0 })
        ));
    }
}
