use std::path::{Path, PathBuf};

use fitrs::{Fits, FitsData, FitsDataArray, Hdu};
use ndarray::{ArrayD, IxDyn};
use tracing::{debug, instrument};

use super::{check_extension, CubeSource, Header, HeaderValue, SourceError};

/// Keywords copied into [`Header`]s besides `NAXISn` and the per-axis WCS keys.
const KEYWORDS: &[&str] = &[
    "SIMPLE", "XTENSION", "EXTNAME", "BITPIX", "NAXIS", "BUNIT", "BSCALE", "BZERO", "TELESCOP",
    "INSTRUME", "DETECTOR", "CHANNEL", "BAND", "FILTER", "EXP_TYPE", "TARGNAME", "DATE-OBS",
    "WCSAXES", "RADESYS", "EQUINOX",
];

const AXIS_KEYWORDS: &[&str] = &["NAXIS", "CTYPE", "CUNIT", "CRPIX", "CRVAL", "CDELT"];

/// [`CubeSource`] over a FITS file.
pub struct FitsSource {
    path: PathBuf,
    fits: Fits,
    count: usize,
}

impl std::fmt::Debug for FitsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FitsSource")
            .field("path", &self.path)
            .field("count", &self.count)
            .finish()
    }
}

impl FitsSource {
    #[instrument]
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let fits = Fits::open(path)?;
        let count = fits.iter().count();
        debug!(count, "Opened FITS file");
        Ok(Self {
            path: path.to_path_buf(),
            fits,
            count,
        })
    }

    fn hdu(&self, index: usize) -> Result<Hdu, SourceError> {
        check_extension(index, self.count)?;
        self.fits
            .get(index)
            .ok_or(SourceError::ExtensionOutOfRange {
                index,
                count: self.count,
            })
    }
}

fn convert_value(value: &fitrs::HeaderValue) -> HeaderValue {
    match value {
        fitrs::HeaderValue::CharacterString(s) => HeaderValue::Text(s.clone()),
        fitrs::HeaderValue::Logical(b) => HeaderValue::Logical(*b),
        fitrs::HeaderValue::IntegerNumber(i) => HeaderValue::Integer(i64::from(*i)),
        fitrs::HeaderValue::RealFloatingNumber(f) => HeaderValue::Real(*f),
        other => HeaderValue::Text(format!("{other:?}")),
    }
}

fn hdu_value(hdu: &Hdu, key: &str) -> Option<HeaderValue> {
    hdu.value(key).map(convert_value)
}

fn flatten<T: Copy>(
    index: usize,
    array: &FitsDataArray<T>,
    expected: usize,
    convert: impl Fn(T) -> f32,
) -> Result<Vec<f32>, SourceError> {
    if array.data.len() != expected {
        return Err(SourceError::DataSizeMismatch {
            index,
            expected,
            found: array.data.len(),
        });
    }
    Ok(array.data.iter().copied().map(convert).collect())
}

impl CubeSource for FitsSource {
    fn extension_count(&self) -> usize {
        self.count
    }

    fn data_array_at(&self, extension: usize) -> Result<Option<ArrayD<f32>>, SourceError> {
        let hdu = self.hdu(extension)?;
        let header = self.header_at(extension)?;

        // FITS lists the fastest varying axis first
        let mut shape = header.axes();
        if shape.is_empty() || shape.contains(&0) {
            return Ok(None);
        }
        shape.reverse();
        let expected = shape.iter().product();

        let data = hdu.read_data();
        let values = match &data {
            FitsData::FloatingPoint32(array) => flatten(extension, array, expected, |v| v)?,
            FitsData::FloatingPoint64(array) => {
                flatten(extension, array, expected, |v| v as f32)?
            }
            // BLANK pixels come through as `None`
            FitsData::IntegersI32(array) => flatten(extension, array, expected, |v| {
                v.map_or(f32::NAN, |v| v as f32)
            })?,
            FitsData::IntegersU32(array) => flatten(extension, array, expected, |v| {
                v.map_or(f32::NAN, |v| v as f32)
            })?,
            #[allow(unreachable_patterns)]
            other => {
                return Err(SourceError::UnsupportedData {
                    index: extension,
                    kind: format!("{:?}", std::mem::discriminant(other)),
                })
            }
        };

        // Length was checked against the shape above
        let array = ArrayD::from_shape_vec(IxDyn(&shape), values).map_err(|_| {
            SourceError::DataSizeMismatch {
                index: extension,
                expected,
                found: 0,
            }
        })?;
        Ok(Some(array))
    }

    fn header_at(&self, extension: usize) -> Result<Header, SourceError> {
        let hdu = self.hdu(extension)?;
        let mut header = Header::new();

        for key in KEYWORDS {
            if let Some(value) = hdu_value(&hdu, key) {
                header.insert(key, value);
            }
        }

        let naxis = header.get_i64("NAXIS").unwrap_or(0).max(0);
        for i in 1..=naxis {
            for prefix in AXIS_KEYWORDS {
                let key = format!("{prefix}{i}");
                if let Some(value) = hdu_value(&hdu, &key) {
                    header.insert(&key, value);
                }
            }
            for j in 1..=naxis {
                for prefix in ["PC", "CD"] {
                    let key = format!("{prefix}{i}_{j}");
                    if let Some(value) = hdu_value(&hdu, &key) {
                        header.insert(&key, value);
                    }
                }
            }
        }

        Ok(header)
    }

    fn header_value(
        &self,
        extension: usize,
        key: &str,
    ) -> Result<Option<HeaderValue>, SourceError> {
        let hdu = self.hdu(extension)?;
        Ok(hdu_value(&hdu, &key.to_ascii_uppercase()))
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use super::FitsSource;
    use crate::source::CubeSource;

    const BLOCK: usize = 2880;

    fn card(text: &str) -> String {
        format!("{text:<80}")
    }

    fn header_block(cards: &[String]) -> Vec<u8> {
        let mut bytes: Vec<u8> = cards
            .iter()
            .chain(std::iter::once(&card("END")))
            .flat_map(|c| c.bytes())
            .collect();
        let padded = bytes.len().div_ceil(BLOCK) * BLOCK;
        bytes.resize(padded, b' ');
        bytes
    }

    /// Writes a primary HDU without data followed by a float32 `SCI` cube of shape (2, 2, 3).
    fn write_test_file(name: &str) -> PathBuf {
        let mut bytes = header_block(&[
            card("SIMPLE  =                    T"),
            card("BITPIX  =                    8"),
            card("NAXIS   =                    0"),
            card("EXTEND  =                    T"),
            card("CHANNEL = '3       '"),
        ]);
        bytes.extend(header_block(&[
            card("XTENSION= 'IMAGE   '"),
            card("BITPIX  =                  -32"),
            card("NAXIS   =                    3"),
            card("NAXIS1  =                    3"),
            card("NAXIS2  =                    2"),
            card("NAXIS3  =                    2"),
            card("PCOUNT  =                    0"),
            card("GCOUNT  =                    1"),
            card("EXTNAME = 'SCI     '"),
            card("BUNIT   = 'MJy/sr  '"),
        ]));
        let mut data: Vec<u8> = (0..12)
            .flat_map(|i| (i as f32).to_be_bytes())
            .collect();
        data.resize(BLOCK, 0);
        bytes.extend(data);

        let path = std::env::temp_dir().join(format!(
            "miri-cube-core-{}-{name}.fits",
            std::process::id()
        ));
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn reads_science_cube_in_row_major_order() {
        let path = write_test_file("science");
        let source = FitsSource::open(&path).unwrap();

        assert_eq!(source.extension_count(), 2);
        assert!(source.data_array_at(0).unwrap().is_none());

        let cube = source.data_array_at(1).unwrap().unwrap();
        assert_eq!(cube.shape(), &[2, 2, 3]);
        assert_eq!(cube[[0, 0, 2]], 2.0);
        assert_eq!(cube[[0, 1, 0]], 3.0);
        assert_eq!(cube[[1, 1, 2]], 11.0);

        let header = source.header_at(1).unwrap();
        assert_eq!(header.get_str("EXTNAME"), Some("SCI"));
        assert_eq!(header.get_str("BUNIT"), Some("MJy/sr"));

        let info = source.describe().unwrap();
        assert_eq!(info[1].name.as_deref(), Some("SCI"));
        assert_eq!(info[1].shape, vec![2, 2, 3]);

        fs::remove_file(path).ok();
    }

    #[test]
    fn header_value_reads_arbitrary_keys() {
        let path = write_test_file("keys");
        let source = FitsSource::open(&path).unwrap();
        let channel = source.header_value(0, "channel").unwrap().unwrap();
        assert_eq!(channel.to_string(), "3");
        assert!(source.header_value(0, "BAND").unwrap().is_none());
        assert!(source.header_at(2).is_err());
        fs::remove_file(path).ok();
    }
}
