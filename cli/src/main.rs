use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result, WrapErr};
use get_size::GetSize;
use miri_cube_core::{
    common::arr_meta::ArrayStats, survey, Colormap, CubeSource, CubeStore, FitsSource,
    HeaderRecord, SpectrumLabels, Stretch, ViewerConfig,
};
use ndarray::ArrayView1;
use serde::Serialize;
use tracing::info;

mod plot;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the extensions of a FITS file and summarize its cube.
    Info {
        file: PathBuf,
        #[arg(short, long, default_value_t = CubeStore::SCIENCE_EXTENSION)]
        extension: usize,
        /// Also print the header keywords of the extension.
        #[arg(long)]
        header: bool,
    },
    /// Tabulate primary header keywords over a directory of FITS files as CSV.
    Headers {
        dir: PathBuf,
        /// Keyword to read, may be repeated.
        #[arg(short, long = "keyword", required = true)]
        keywords: Vec<String>,
        /// Only files whose name contains this text.
        #[arg(short, long)]
        name_contains: Option<String>,
    },
    /// Save one frame of a cube as a PNG.
    Render {
        file: PathBuf,
        #[arg(short, long, default_value_t = 0)]
        frame: usize,
        #[arg(short, long, value_name = "PNG")]
        output: PathBuf,
        #[command(flatten)]
        cube: CubeArgs,
    },
    /// Extract the values of one pixel across all frames.
    Spectrum {
        file: PathBuf,
        #[arg(short, long)]
        x: usize,
        #[arg(short, long)]
        y: usize,
        /// Plot the spectrum into this PNG.
        #[arg(short, long, value_name = "PNG")]
        output: Option<PathBuf>,
        /// Write `index,value` rows to this file, `-` for stdout.
        #[arg(long, value_name = "CSV")]
        csv: Option<PathBuf>,
        #[command(flatten)]
        cube: CubeArgs,
    },
}

#[derive(clap::Args)]
struct CubeArgs {
    #[arg(short, long, default_value_t = CubeStore::SCIENCE_EXTENSION)]
    extension: usize,
    /// Cube axis frames are taken along.
    #[arg(short, long, default_value_t = 0)]
    axis: usize,
    #[arg(short, long, default_value_t = Colormap::Inferno)]
    colormap: Colormap,
    #[arg(short, long, default_value_t = Stretch::Linear)]
    stretch: Stretch,
}

impl CubeArgs {
    fn config(&self) -> ViewerConfig {
        ViewerConfig {
            colormap: self.colormap,
            stretch: self.stretch,
            axis: self.axis,
            extension: self.extension,
            ..Default::default()
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    match Cli::parse().command {
        Command::Info {
            file,
            extension,
            header,
        } => {
            let source = open(&file)?;
            let mut out = io::stdout().lock();
            print_info(&source, extension, &mut out)?;
            if header {
                print_header(&source, extension, &mut out)?;
            }
        }
        Command::Headers {
            dir,
            keywords,
            name_contains,
        } => {
            let records = survey(&dir, &keywords, name_contains.as_deref())
                .wrap_err_with(|| format!("Failed to read {}", dir.display()))?;
            info!(files = records.len(), "Surveyed headers");
            write_headers_csv(&records, &keywords, io::stdout().lock())?;
        }
        Command::Render {
            file,
            frame,
            output,
            cube,
        } => {
            let config = cube.config();
            let store = load_cube(&file, &config)?;
            let view = store.frame_at(frame)?;
            let caption = match store.name() {
                Some(name) => format!("{name} - Slice {frame}"),
                None => format!("Slice {frame}"),
            };
            plot::frame_png(&output, view, &config.color_scale(), &store.axes(), &caption)?;
            info!(output = %output.display(), "Wrote frame");
        }
        Command::Spectrum {
            file,
            x,
            y,
            output,
            csv,
            cube,
        } => {
            if output.is_none() && csv.is_none() {
                return Err(eyre!("Nothing to do, pass --output and/or --csv"));
            }
            let store = load_cube(&file, &cube.config())?;
            let values = store.spectrum_at(x, y)?;
            if let Some(output) = output {
                let labels = SpectrumLabels::for_pixel(x, y, store.unit());
                plot::spectrum_png(&output, values, &labels)?;
                info!(output = %output.display(), "Wrote spectrum plot");
            }
            match csv.as_deref() {
                Some(path) if path == Path::new("-") => {
                    write_spectrum_csv(values, io::stdout().lock())?
                }
                Some(path) => write_spectrum_csv(
                    values,
                    std::fs::File::create(path)
                        .wrap_err_with(|| format!("Failed to create {}", path.display()))?,
                )?,
                None => {}
            }
        }
    }

    Ok(())
}

fn open(path: &Path) -> Result<FitsSource> {
    FitsSource::open(path).wrap_err_with(|| format!("Failed to open {}", path.display()))
}

fn load_cube(path: &Path, config: &ViewerConfig) -> Result<CubeStore> {
    let source = open(path)?;
    let cube = CubeStore::load_extension(&source, config.extension)
        .wrap_err_with(|| format!("Failed to load cube from {}", path.display()))?;
    Ok(config.prepare(cube)?)
}

fn print_info(source: &impl CubeSource, extension: usize, out: &mut impl Write) -> Result<()> {
    writeln!(out, "No.  Name        Dimensions")?;
    for ext in source.describe()? {
        let dims = ext
            .shape
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" x ");
        writeln!(
            out,
            "{:<4} {:<11} {}",
            ext.index,
            ext.name.as_deref().unwrap_or("PRIMARY"),
            if dims.is_empty() { "-" } else { dims.as_str() }
        )?;
    }

    let cube = match CubeStore::load_extension(source, extension) {
        Ok(cube) => cube,
        Err(e) => {
            writeln!(out, "\nExtension {extension} holds no cube: {e}")?;
            return Ok(());
        }
    };
    let (height, width) = cube.frame_shape();
    writeln!(out)?;
    writeln!(out, "Frames:     {}", cube.frame_count())?;
    writeln!(out, "Frame size: {width} x {height}")?;
    if let Some(unit) = cube.unit() {
        writeln!(out, "Unit:       {unit}")?;
    }
    let axes = cube.axes();
    writeln!(
        out,
        "Axes:       {} [{:.6}, {:.6}], {} [{:.6}, {:.6}]",
        axes.x_label,
        axes.x_extent[0],
        axes.x_extent[1],
        axes.y_label,
        axes.y_extent[0],
        axes.y_extent[1]
    )?;
    let stats = ArrayStats::new_f32(
        (0..cube.frame_count())
            .filter_map(|i| cube.frame_at(i).ok())
            .flat_map(|frame| frame.into_iter().copied()),
    );
    match stats {
        Some(stats) => writeln!(
            out,
            "Values:     {} finite, min {}, max {}, mean {:.4}, std {:.4}",
            stats.count, stats.range.min, stats.range.max, stats.mean, stats.std_dev
        )?,
        None => writeln!(out, "Values:     no finite values")?,
    }
    writeln!(out, "Memory:     {} bytes", cube.get_size())?;
    Ok(())
}

fn print_header(source: &impl CubeSource, extension: usize, out: &mut impl Write) -> Result<()> {
    writeln!(out, "\nHeader of extension {extension}:")?;
    for (key, value) in source.header_at(extension)?.iter() {
        writeln!(out, "{key:<8} = {value}")?;
    }
    Ok(())
}

fn write_headers_csv(
    records: &[HeaderRecord],
    keywords: &[String],
    out: impl Write,
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(std::iter::once("file").chain(keywords.iter().map(String::as_str)))?;
    for record in records {
        let mut row = vec![record.file_name.clone()];
        row.extend(
            keywords
                .iter()
                .map(|k| record.get(k).map(ToString::to_string).unwrap_or_default()),
        );
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct SpectrumRow {
    index: usize,
    value: f32,
}

fn write_spectrum_csv(values: ArrayView1<f32>, out: impl Write) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for (index, &value) in values.iter().enumerate() {
        writer.serialize(SpectrumRow { index, value })?;
    }
    writer.flush()?;
    Ok(())
}
