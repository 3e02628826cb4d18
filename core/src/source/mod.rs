//! Opened multi-extension image containers.
//!
//! A [`CubeSource`] is the narrow view the rest of the crate has on a file:
//! how many extensions it carries, the data array of an extension and its
//! header. Parsing the container format is left to the implementation.

mod err;
pub mod fits;
mod header;
pub mod memory;

use ndarray::ArrayD;
use serde::Serialize;

pub use err::SourceError;
pub use fits::FitsSource;
pub use header::{Header, HeaderValue};
pub use memory::MemorySource;

pub trait CubeSource {
    fn extension_count(&self) -> usize;

    /// The data array of an extension in row-major order (slowest axis first).
    ///
    /// Returns `Ok(None)` for header-only extensions such as an empty primary HDU.
    fn data_array_at(&self, extension: usize) -> Result<Option<ArrayD<f32>>, SourceError>;

    fn header_at(&self, extension: usize) -> Result<Header, SourceError>;

    fn header_value(
        &self,
        extension: usize,
        key: &str,
    ) -> Result<Option<HeaderValue>, SourceError> {
        Ok(self.header_at(extension)?.get(key).cloned())
    }

    /// One line per extension, like `HDUList.info()`.
    fn describe(&self) -> Result<Vec<ExtensionInfo>, SourceError> {
        (0..self.extension_count())
            .map(|index| {
                let header = self.header_at(index)?;
                let mut shape = header.axes();
                shape.reverse();
                Ok(ExtensionInfo {
                    index,
                    name: header.get_str("EXTNAME").map(str::to_string),
                    shape,
                })
            })
            .collect()
    }
}

impl<T: CubeSource + ?Sized> CubeSource for &T {
    fn extension_count(&self) -> usize {
        (**self).extension_count()
    }

    fn data_array_at(&self, extension: usize) -> Result<Option<ArrayD<f32>>, SourceError> {
        (**self).data_array_at(extension)
    }

    fn header_at(&self, extension: usize) -> Result<Header, SourceError> {
        (**self).header_at(extension)
    }

    fn header_value(
        &self,
        extension: usize,
        key: &str,
    ) -> Result<Option<HeaderValue>, SourceError> {
        (**self).header_value(extension, key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionInfo {
    pub index: usize,
    pub name: Option<String>,
    /// Row-major shape, e.g. `[1400, 44, 45]` for a spectral cube.
    pub shape: Vec<usize>,
}

fn check_extension(index: usize, count: usize) -> Result<(), SourceError> {
    if index < count {
        Ok(())
    } else {
        Err(SourceError::ExtensionOutOfRange { index, count })
    }
}
