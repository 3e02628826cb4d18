use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No cubes to display")]
    #[diagnostic(
        code(miri_cube::config::no_cubes),
        help("Pass at least one cube")
    )]
    NoCubes,

    #[error("Got {projections} projections for {cubes} cubes")]
    #[diagnostic(
        code(miri_cube::config::mismatched_projections),
        help("Give one (possibly absent) projection per cube, or none at all")
    )]
    MismatchedProjections { cubes: usize, projections: usize },

    #[error("Panel {index} does not exist, the viewer has {count} panels")]
    #[diagnostic(code(miri_cube::config::no_such_panel))]
    NoSuchPanel { index: usize, count: usize },

    #[error("Cannot slice along axis {axis}, cubes have 3 axes")]
    #[diagnostic(code(miri_cube::config::invalid_axis))]
    InvalidAxis { axis: usize },

    #[error("Unknown colormap '{0}'")]
    #[diagnostic(
        code(miri_cube::config::unknown_colormap),
        help("Available colormaps: inferno, magma, viridis, gray")
    )]
    UnknownColormap(String),

    #[error("Unknown stretch '{0}'")]
    #[diagnostic(
        code(miri_cube::config::unknown_stretch),
        help("Available stretches: linear, log")
    )]
    UnknownStretch(String),

    #[error("Unknown arrangement '{0}'")]
    #[diagnostic(
        code(miri_cube::config::unknown_arrangement),
        help("Use 'vertical' or 'horizontal'")
    )]
    UnknownArrangement(String),
}
