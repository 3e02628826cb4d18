use std::path::Path;

use color_eyre::eyre::Result;
use miri_cube_core::{render_frame, AxesDescriptor, ColorScale, Colorbar, SpectrumLabels};
use ndarray::{ArrayView1, ArrayView2};
use plotters::prelude::*;

const COLORBAR_WIDTH: u32 = 130;

/// Draws a frame as a heatmap with world or pixel coordinates on the axes and a colorbar.
pub fn frame_png(
    path: &Path,
    frame: ArrayView2<f32>,
    scale: &ColorScale,
    axes: &AxesDescriptor,
    caption: &str,
) -> Result<()> {
    let image = render_frame(frame, scale);
    let (width, height) = (image.width as f64, image.height as f64);

    let plot_size = (
        (image.width as u32 * 12).clamp(300, 1200) + 120,
        (image.height as u32 * 12).clamp(300, 1200) + 100,
    );
    let root = BitMapBackend::new(path, (plot_size.0 + COLORBAR_WIDTH, plot_size.1))
        .into_drawing_area();
    root.fill(&WHITE)?;
    let (frame_area, bar_area) = root.split_horizontally(plot_size.0);

    let mut chart = ChartBuilder::on(&frame_area)
        .caption(caption, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..width, 0.0..height)?;

    let to_world_x = |v: f64| axes.x_extent[0] + (axes.x_extent[1] - axes.x_extent[0]) * v / width;
    let to_world_y =
        |v: f64| axes.y_extent[0] + (axes.y_extent[1] - axes.y_extent[0]) * v / height;
    let x_formatter = |v: &f64| format!("{:.4}", to_world_x(*v));
    let y_formatter = |v: &f64| format!("{:.4}", to_world_y(*v));

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(axes.x_title())
        .y_desc(axes.y_title())
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&y_formatter)
        .draw()?;

    // Rendered rows run top to bottom
    chart.draw_series(
        (0..image.height)
            .flat_map(|row| (0..image.width).map(move |col| (col, row)))
            .filter_map(|(col, row)| {
                let [r, g, b, a] = image.pixel(col, row);
                if a == 0 {
                    return None;
                }
                let x = col as f64;
                let y = (image.height - 1 - row) as f64;
                Some(Rectangle::new(
                    [(x, y), (x + 1.0, y + 1.0)],
                    RGBColor(r, g, b).filled(),
                ))
            }),
    )?;

    if let Some(colorbar) = Colorbar::new(frame, *scale) {
        draw_colorbar(&bar_area, &colorbar, &axes.value_label)?;
    }

    root.present()?;
    Ok(())
}

fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    colorbar: &Colorbar,
    label: &str,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    const STEPS: usize = 128;

    let (min, max) = (colorbar.range.min as f64, colorbar.range.max as f64);
    // A constant frame still gets a bar of non-zero height
    let (low, high) = if max > min { (min, max) } else { (min - 0.5, min + 0.5) };

    let mut chart = ChartBuilder::on(area)
        .margin_top(40)
        .margin_bottom(50)
        .margin_right(10)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..1.0, low..high)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_desc(label)
        .draw()?;

    let step = (high - low) / STEPS as f64;
    chart.draw_series(colorbar.gradient(STEPS).into_iter().enumerate().map(
        |(i, [r, g, b])| {
            let bottom = low + i as f64 * step;
            Rectangle::new(
                [(0.0, bottom), (1.0, bottom + step)],
                RGBColor(r, g, b).filled(),
            )
        },
    ))?;
    Ok(())
}

pub fn spectrum_png(path: &Path, values: ArrayView1<f32>, labels: &SpectrumLabels) -> Result<()> {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let (min, max) = finite.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let (min, max) = if min <= max {
        let pad = ((max - min) * 0.05).max(f32::EPSILON);
        (min - pad, max + pad)
    } else {
        (0.0, 1.0)
    };

    let root = BitMapBackend::new(path, (800, 480)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&labels.title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..values.len().max(1) as f32, min..max)?;

    chart
        .configure_mesh()
        .x_desc(labels.x_label.as_str())
        .y_desc(labels.y_label.as_str())
        .draw()?;

    chart.draw_series(LineSeries::new(
        values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(i, &v)| (i as f32, v)),
        &BLUE,
    ))?;

    root.present()?;
    Ok(())
}
