use ndarray::ArrayView2;

use crate::{
    colormap::{ColorScale, Rgb},
    common::{arr_meta::ArrayStats, range::RangeIncl},
};

/// An RGBA8 image, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderedImage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl RenderedImage {
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }
}

/// Value range used to normalize `frame`, `None` if it holds no finite value.
pub fn value_range(frame: ArrayView2<f32>) -> Option<RangeIncl<f32>> {
    ArrayStats::new_f32(frame.iter().copied()).map(|stats| stats.range)
}

/// Colors `frame` with `scale`, normalizing between its finite minimum and maximum.
///
/// Frame row 0 ends up at the bottom of the image. Non-finite pixels are
/// fully transparent. The output depends only on the inputs.
pub fn render_frame(frame: ArrayView2<f32>, scale: &ColorScale) -> RenderedImage {
    let (height, width) = frame.dim();
    let range = value_range(frame);

    let mut pixels = Vec::with_capacity(width * height * 4);
    for row in (0..height).rev() {
        for col in 0..width {
            let value = frame[[row, col]];
            match range {
                Some(range) if value.is_finite() => {
                    let t = if range.width() > 0.0 {
                        range.map(value)
                    } else {
                        0.0
                    };
                    let [r, g, b] = scale.color(t);
                    pixels.extend_from_slice(&[r, g, b, 255]);
                }
                _ => pixels.extend_from_slice(&[0, 0, 0, 0]),
            }
        }
    }

    RenderedImage {
        width,
        height,
        pixels,
    }
}

/// Value to color legend of a rendered frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Colorbar {
    pub range: RangeIncl<f32>,
    pub scale: ColorScale,
}

impl Colorbar {
    /// Legend matching [`render_frame`] for the same inputs, `None` without finite values.
    pub fn new(frame: ArrayView2<f32>, scale: ColorScale) -> Option<Self> {
        value_range(frame).map(|range| Self { range, scale })
    }

    /// `steps` colors from the minimum to the maximum value.
    pub fn gradient(&self, steps: usize) -> Vec<Rgb> {
        let last = steps.saturating_sub(1).max(1) as f32;
        (0..steps)
            .map(|i| self.scale.color(i as f32 / last))
            .collect()
    }

    /// Data value at relative position `t` along the bar.
    pub fn value_at(&self, t: f32) -> f32 {
        self.range.min + self.range.width() * t
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::{render_frame, Colorbar};
    use crate::{
        colormap::{ColorScale, Colormap, Stretch},
        common::range::RangeIncl,
    };

    #[test]
    fn origin_is_lower_left() {
        let frame = array![[0.0_f32, 0.0], [1.0, 1.0]];
        let image = render_frame(frame.view(), &ColorScale::new(Colormap::Gray, Stretch::Linear));
        assert_eq!((image.width, image.height), (2, 2));
        // Frame row 1 (the brightest) is drawn on top
        assert_eq!(image.pixel(0, 0), [255, 255, 255, 255]);
        assert_eq!(image.pixel(1, 1), [0, 0, 0, 255]);
    }

    #[test]
    fn nan_pixels_are_transparent() {
        let frame = array![[f32::NAN, 2.0], [4.0, 6.0]];
        let image = render_frame(frame.view(), &Colormap::Gray.into());
        assert_eq!(image.pixel(0, 1), [0, 0, 0, 0]);
        assert_eq!(image.pixel(1, 1)[3], 255);
    }

    #[test]
    fn constant_frame_renders_low_end() {
        let frame = array![[5.0_f32, 5.0], [5.0, 5.0]];
        let image = render_frame(frame.view(), &Colormap::Inferno.into());
        let [r, g, b] = Colormap::Inferno.map(0.0);
        assert_eq!(image.pixel(0, 0), [r, g, b, 255]);
    }

    #[test]
    fn colorbar_spans_frame_range() {
        let frame = array![[f32::NAN, 2.0], [4.0, 6.0]];
        let scale = ColorScale::new(Colormap::Gray, Stretch::Linear);
        let colorbar = Colorbar::new(frame.view(), scale).unwrap();

        assert_eq!(colorbar.range, RangeIncl::new(2.0, 6.0));
        assert_eq!(colorbar.value_at(0.5), 4.0);

        let steps = colorbar.gradient(5);
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[0], [0, 0, 0]);
        assert_eq!(steps[4], [255, 255, 255]);

        // Same colors as the rendered pixels at both ends
        let image = render_frame(frame.view(), &scale);
        assert_eq!(image.pixel(1, 0)[..3], steps[4][..]);
        assert_eq!(image.pixel(1, 1)[..3], steps[0][..]);
    }

    #[test]
    fn colorbar_needs_finite_values() {
        let frame = array![[f32::NAN, f32::INFINITY]];
        assert!(Colorbar::new(frame.view(), Colormap::Gray.into()).is_none());
    }
}
