use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::viewer::ConfigError;

/// Scalar to color mapping, named after the matplotlib colormaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colormap {
    #[default]
    Inferno,
    Magma,
    Viridis,
    Gray,
}

pub type Rgb = [u8; 3];

impl Colormap {
    pub const ALL: [Colormap; 4] = [
        Colormap::Inferno,
        Colormap::Magma,
        Colormap::Viridis,
        Colormap::Gray,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Colormap::Inferno => "inferno",
            Colormap::Magma => "magma",
            Colormap::Viridis => "viridis",
            Colormap::Gray => "gray",
        }
    }

    /// Default colormap for a viewer with `panels` panels: magma when comparing cubes.
    pub fn default_for_panels(panels: usize) -> Self {
        if panels > 1 {
            Colormap::Magma
        } else {
            Colormap::Inferno
        }
    }

    fn gradient(&self) -> Option<colorous::Gradient> {
        match self {
            Colormap::Inferno => Some(colorous::INFERNO),
            Colormap::Magma => Some(colorous::MAGMA),
            Colormap::Viridis => Some(colorous::VIRIDIS),
            // Linear ramp, unlike colorous::GREYS
            Colormap::Gray => None,
        }
    }

    /// Color of a normalized value; `t` is clamped to `[0, 1]`.
    pub fn map(&self, t: f32) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self.gradient() {
            Some(gradient) => {
                let color = gradient.eval_continuous(f64::from(t));
                [color.r, color.g, color.b]
            }
            None => {
                let v = (t * 255.0).round() as u8;
                [v, v, v]
            }
        }
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Colormap {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        let s = if s == "grey" { "gray" } else { s.as_str() };
        Self::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| ConfigError::UnknownColormap(s.to_string()))
    }
}

/// Transfer function applied to normalized values before color lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stretch {
    #[default]
    Linear,
    /// `log(a·x + 1) / log(a + 1)` with `a = 1000`, as astropy's `LogStretch`.
    Log,
}

impl Stretch {
    const LOG_A: f32 = 1000.0;

    pub fn apply(&self, t: f32) -> f32 {
        match self {
            Stretch::Linear => t,
            Stretch::Log => (Self::LOG_A * t + 1.0).ln() / (Self::LOG_A + 1.0).ln(),
        }
    }
}

impl fmt::Display for Stretch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stretch::Linear => "linear",
            Stretch::Log => "log",
        })
    }
}

impl FromStr for Stretch {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Stretch::Linear),
            "log" => Ok(Stretch::Log),
            other => Err(ConfigError::UnknownStretch(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ColorScale {
    pub colormap: Colormap,
    pub stretch: Stretch,
}

impl ColorScale {
    pub fn new(colormap: Colormap, stretch: Stretch) -> Self {
        Self { colormap, stretch }
    }

    pub fn color(&self, t: f32) -> Rgb {
        self.colormap.map(self.stretch.apply(t.clamp(0.0, 1.0)))
    }
}

impl From<Colormap> for ColorScale {
    fn from(colormap: Colormap) -> Self {
        Self::new(colormap, Stretch::default())
    }
}

#[cfg(test)]
mod tests {
    use super::{ColorScale, Colormap, Stretch};

    #[test]
    fn matches_matplotlib_colormaps() {
        for (colormap, gradient) in [
            (Colormap::Inferno, colorous::INFERNO),
            (Colormap::Magma, colorous::MAGMA),
            (Colormap::Viridis, colorous::VIRIDIS),
        ] {
            for i in 0..=255 {
                let t = i as f32 / 255.0;
                let expected = gradient.eval_continuous(f64::from(t));
                assert_eq!(
                    colormap.map(t),
                    [expected.r, expected.g, expected.b],
                    "{colormap} at {t}"
                );
            }
        }

        // Samples of matplotlib's inferno and viridis tables
        let close = |a: [u8; 3], b: [u8; 3]| a.iter().zip(b).all(|(&a, b)| a.abs_diff(b) <= 2);
        assert!(close(Colormap::Inferno.map(0.0), [0, 0, 4]));
        assert!(close(Colormap::Inferno.map(1.0), [252, 255, 164]));
        assert!(close(Colormap::Viridis.map(1.0), [253, 231, 37]));
    }

    #[test]
    fn comparisons_default_to_magma() {
        assert_eq!(Colormap::default_for_panels(1), Colormap::Inferno);
        assert_eq!(Colormap::default_for_panels(3), Colormap::Magma);
    }

    #[test]
    fn gray_is_a_linear_ramp() {
        assert_eq!(Colormap::Gray.map(0.0), [0, 0, 0]);
        assert_eq!(Colormap::Gray.map(0.5), [128, 128, 128]);
        assert_eq!(Colormap::Gray.map(1.0), [255, 255, 255]);
    }

    #[test]
    fn out_of_range_values_clamp() {
        assert_eq!(Colormap::Magma.map(-3.0), Colormap::Magma.map(0.0));
        assert_eq!(Colormap::Magma.map(7.0), Colormap::Magma.map(1.0));
        assert_eq!(Colormap::Magma.map(f32::NAN), Colormap::Magma.map(0.0));
    }

    #[test]
    fn parses_names() {
        assert_eq!("Magma".parse::<Colormap>().unwrap(), Colormap::Magma);
        assert_eq!("grey".parse::<Colormap>().unwrap(), Colormap::Gray);
        assert!("jet".parse::<Colormap>().is_err());
        assert_eq!("log".parse::<Stretch>().unwrap(), Stretch::Log);
    }

    #[test]
    fn log_stretch_keeps_endpoints() {
        assert_eq!(Stretch::Log.apply(0.0), 0.0);
        assert!((Stretch::Log.apply(1.0) - 1.0).abs() < 1e-6);
        assert!(Stretch::Log.apply(0.1) > 0.1);

        let scale = ColorScale::new(Colormap::Gray, Stretch::Linear);
        assert_eq!(scale.color(0.0), [0, 0, 0]);
    }
}
