//! Pixel to sky mapping used for axis labels.
//!
//! Only the linear part of a FITS world coordinate system is evaluated
//! (reference pixel, reference value and the CD / PC·CDELT matrix). That is
//! enough to label the axes of a cube a few dozen pixels across; it is not a
//! substitute for a full spherical projection.

use serde::{Deserialize, Serialize};

use crate::source::Header;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// 1-based reference pixel, FITS convention.
    crpix: [f64; 2],
    crval: [f64; 2],
    /// Maps pixel offsets from `crpix` to world offsets from `crval`.
    matrix: [[f64; 2]; 2],
    ctype: [Option<String>; 2],
    cunit: [Option<String>; 2],
}

impl Projection {
    pub fn new(crpix: [f64; 2], crval: [f64; 2], matrix: [[f64; 2]; 2]) -> Self {
        Self {
            crpix,
            crval,
            matrix,
            ctype: [None, None],
            cunit: [None, None],
        }
    }

    pub fn with_types(mut self, ctype: [&str; 2]) -> Self {
        self.ctype = ctype.map(|t| Some(t.to_string()));
        self
    }

    /// Reads the celestial axes (1 and 2) of a header.
    ///
    /// Returns `None` if the header does not carry `CRVAL1` and `CRVAL2`.
    pub fn from_header(header: &Header) -> Option<Self> {
        let crval = [header.get_f64("CRVAL1")?, header.get_f64("CRVAL2")?];
        let crpix = [
            header.get_f64("CRPIX1").unwrap_or(0.0),
            header.get_f64("CRPIX2").unwrap_or(0.0),
        ];

        let key = |prefix: &str, i: usize, j: usize| format!("{prefix}{}_{}", i + 1, j + 1);
        let has_cd = (0..2).any(|i| (0..2).any(|j| header.contains_key(&key("CD", i, j))));

        let mut matrix = [[0.0; 2]; 2];
        for (i, row) in matrix.iter_mut().enumerate() {
            let cdelt = header.get_f64(&format!("CDELT{}", i + 1)).unwrap_or(1.0);
            for (j, value) in row.iter_mut().enumerate() {
                let identity = if i == j { 1.0 } else { 0.0 };
                *value = if has_cd {
                    header.get_f64(&key("CD", i, j)).unwrap_or(0.0)
                } else {
                    cdelt * header.get_f64(&key("PC", i, j)).unwrap_or(identity)
                };
            }
        }

        let ctype = [1, 2].map(|i| header.get_str(&format!("CTYPE{i}")).map(str::to_string));
        let cunit = [1, 2].map(|i| header.get_str(&format!("CUNIT{i}")).map(str::to_string));

        Some(Self {
            crpix,
            crval,
            matrix,
            ctype,
            cunit,
        })
    }

    /// World coordinates of a 0-based pixel position.
    pub fn pixel_to_world(&self, x: f64, y: f64) -> (f64, f64) {
        let dx = x + 1.0 - self.crpix[0];
        let dy = y + 1.0 - self.crpix[1];
        let m = &self.matrix;
        (
            self.crval[0] + m[0][0] * dx + m[0][1] * dy,
            self.crval[1] + m[1][0] * dx + m[1][1] * dy,
        )
    }

    /// Short axis name, e.g. `RA` for `RA---TAN`.
    pub fn axis_name(&self, axis: usize) -> String {
        let ctype = self.ctype.get(axis).and_then(|t| t.as_deref());
        match ctype.map(|t| t.split('-').next().unwrap_or(t).trim()) {
            Some("RA") | None if axis == 0 => "RA".to_string(),
            Some("DEC") | None if axis == 1 => "Dec".to_string(),
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Axis {}", axis + 1),
        }
    }

    pub fn axis_unit(&self, axis: usize) -> Option<&str> {
        self.cunit.get(axis).and_then(|u| u.as_deref())
    }
}

/// Labels and extents of the two displayed axes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxesDescriptor {
    pub x_label: String,
    pub y_label: String,
    pub x_unit: Option<String>,
    pub y_unit: Option<String>,
    /// Label of the pixel values, e.g. `Flux (MJy/sr)`.
    pub value_label: String,
    /// Coordinate at the left and right pixel edges.
    pub x_extent: [f64; 2],
    /// Coordinate at the bottom and top pixel edges.
    pub y_extent: [f64; 2],
    pub projected: bool,
}

impl AxesDescriptor {
    /// `width` and `height` are the frame size in pixels.
    pub fn new(projection: Option<&Projection>, width: usize, height: usize) -> Self {
        let (left, bottom) = (-0.5, -0.5);
        let (right, top) = (width as f64 - 0.5, height as f64 - 0.5);

        match projection {
            Some(projection) => {
                let (x0, y0) = projection.pixel_to_world(left, bottom);
                let (x1, y1) = projection.pixel_to_world(right, top);
                Self {
                    x_label: projection.axis_name(0),
                    y_label: projection.axis_name(1),
                    x_unit: projection.axis_unit(0).map(str::to_string),
                    y_unit: projection.axis_unit(1).map(str::to_string),
                    value_label: "Flux".to_string(),
                    x_extent: [x0, x1],
                    y_extent: [y0, y1],
                    projected: true,
                }
            }
            None => Self {
                x_label: "X".to_string(),
                y_label: "Y".to_string(),
                x_unit: None,
                y_unit: None,
                value_label: "Flux".to_string(),
                x_extent: [left, right],
                y_extent: [bottom, top],
                projected: false,
            },
        }
    }

    pub fn with_value_label(mut self, label: impl Into<String>) -> Self {
        self.value_label = label.into();
        self
    }

    /// Horizontal axis title with its unit, e.g. `RA (deg)`.
    pub fn x_title(&self) -> String {
        with_unit(&self.x_label, self.x_unit.as_deref())
    }

    pub fn y_title(&self) -> String {
        with_unit(&self.y_label, self.y_unit.as_deref())
    }
}

pub(crate) fn with_unit(label: &str, unit: Option<&str>) -> String {
    match unit {
        Some(unit) if !unit.trim().is_empty() => format!("{label} ({})", unit.trim()),
        _ => label.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{AxesDescriptor, Projection};
    use crate::source::Header;

    fn miri_header() -> Header {
        Header::new()
            .with("CTYPE1", "RA---TAN")
            .with("CTYPE2", "DEC--TAN")
            .with("CRPIX1", 23.0)
            .with("CRPIX2", 22.0)
            .with("CRVAL1", 60.0)
            .with("CRVAL2", -30.0)
            .with("CDELT1", -0.0001)
            .with("CDELT2", 0.0001)
            .with("CUNIT1", "deg")
            .with("CUNIT2", "deg")
    }

    #[test]
    fn reference_pixel_maps_to_reference_value() {
        let projection = Projection::from_header(&miri_header()).unwrap();
        let (ra, dec) = projection.pixel_to_world(22.0, 21.0);
        assert!((ra - 60.0).abs() < 1e-12);
        assert!((dec + 30.0).abs() < 1e-12);

        let (ra, _) = projection.pixel_to_world(23.0, 21.0);
        assert!((ra - 59.9999).abs() < 1e-9);
    }

    #[test]
    fn cd_matrix_overrides_cdelt() {
        let header = miri_header().with("CD1_1", 2.0).with("CD2_2", 3.0);
        let projection = Projection::from_header(&header).unwrap();
        let (ra, dec) = projection.pixel_to_world(23.0, 22.0);
        assert!((ra - 62.0).abs() < 1e-12);
        assert!((dec + 27.0).abs() < 1e-12);
    }

    #[test]
    fn missing_reference_value_means_no_projection() {
        let header = Header::new().with("CRVAL1", 1.0);
        assert!(Projection::from_header(&header).is_none());
    }

    #[test]
    fn axes_labels_depend_on_projection() {
        let plain = AxesDescriptor::new(None, 10, 5);
        assert_eq!((plain.x_label.as_str(), plain.y_label.as_str()), ("X", "Y"));
        assert_eq!(plain.x_title(), "X");
        assert_eq!(plain.x_extent, [-0.5, 9.5]);
        assert_eq!(plain.y_extent, [-0.5, 4.5]);

        let projection = Projection::from_header(&miri_header()).unwrap();
        let sky = AxesDescriptor::new(Some(&projection), 45, 44);
        assert_eq!((sky.x_label.as_str(), sky.y_label.as_str()), ("RA", "Dec"));
        assert!(sky.projected);
        assert_eq!(sky.x_title(), "RA (deg)");
        assert_eq!(sky.y_title(), "Dec (deg)");
        // RA grows to the left
        assert!(sky.x_extent[0] > sky.x_extent[1]);
    }
}
