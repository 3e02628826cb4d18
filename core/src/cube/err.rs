use miette::Diagnostic;
use ndarray::ShapeError;
use thiserror::Error;

use crate::source::SourceError;

#[derive(Error, Debug, Diagnostic)]
pub enum LoadError {
    #[error("Extension {index} is missing, the source has {count} extensions")]
    #[diagnostic(
        code(miri_cube::load::missing_extension),
        help("Calibrated cubes keep the science data in extension 1 (SCI)")
    )]
    MissingExtension { index: usize, count: usize },

    #[error("Extension {index} has no data array")]
    #[diagnostic(code(miri_cube::load::no_data))]
    NoData { index: usize },

    #[error("Expected a 3-dimensional data array, found {ndim} dimensions with shape {shape:?}")]
    #[diagnostic(
        code(miri_cube::load::not_a_cube),
        help("Single images and tables cannot be scrolled through")
    )]
    NotACube { ndim: usize, shape: Vec<usize> },

    #[error("Cube of shape {shape:?} holds no frames")]
    #[diagnostic(code(miri_cube::load::empty))]
    EmptyCube { shape: [usize; 3] },

    #[error("Source error: {0}")]
    #[diagnostic(code(miri_cube::load::source))]
    Source(#[from] SourceError),

    #[error("Reshaping the data array failed: {0}")]
    #[diagnostic(code(miri_cube::load::shape))]
    Shape(#[from] ShapeError),
}

/// An index outside the bounds of a cube, only reachable through direct API calls.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexError {
    #[error("Frame index {index} is out of bounds for a cube of {count} frames")]
    Frame { index: usize, count: usize },
    #[error("Pixel ({x}, {y}) is outside the {width}x{height} frame")]
    Pixel {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}
