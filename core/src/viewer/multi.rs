use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{ConfigError, RenderSurface, SliceViewer, Slider, ViewerEvent, ViewerOptions};
use crate::{cube::CubeStore, projection::Projection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arrangement {
    /// One row per cube.
    #[default]
    Vertical,
    /// One column per cube.
    Horizontal,
}

impl fmt::Display for Arrangement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Arrangement::Vertical => "vertical",
            Arrangement::Horizontal => "horizontal",
        })
    }
}

impl FromStr for Arrangement {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vertical" => Ok(Arrangement::Vertical),
            "horizontal" => Ok(Arrangement::Horizontal),
            other => Err(ConfigError::UnknownArrangement(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GridCell {
    pub row: usize,
    pub column: usize,
}

/// Placement of panels in the window, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiViewerLayout {
    pub arrangement: Arrangement,
    pub rows: usize,
    pub columns: usize,
    pub cells: Vec<GridCell>,
}

impl MultiViewerLayout {
    pub fn new(arrangement: Arrangement, panels: usize) -> Self {
        let cells = (0..panels)
            .map(|i| match arrangement {
                Arrangement::Vertical => GridCell { row: i, column: 0 },
                Arrangement::Horizontal => GridCell { row: 0, column: i },
            })
            .collect();
        let (rows, columns) = match arrangement {
            Arrangement::Vertical => (panels, 1),
            Arrangement::Horizontal => (1, panels),
        };
        Self {
            arrangement,
            rows,
            columns,
            cells,
        }
    }
}

/// Independent [`SliceViewer`]s sharing one window.
///
/// Each panel keeps its own index, slider range and event queue; an event
/// only ever reaches the panel whose slider or surface produced it.
pub struct MultiSliceViewer<S, C> {
    layout: MultiViewerLayout,
    panels: Vec<SliceViewer<S, C>>,
}

impl<S: RenderSurface, C: Slider> MultiSliceViewer<S, C> {
    /// Opens one panel per cube.
    ///
    /// `projections`, if given, must hold one entry per cube and replaces the
    /// cubes' own projections; without it every panel is unprojected.
    /// `make_panel` creates the surface and slider for panel `i` at its grid cell.
    #[instrument(skip_all, fields(cubes = cubes.len(), arrangement = %arrangement))]
    pub fn build(
        cubes: Vec<CubeStore>,
        projections: Option<Vec<Option<Projection>>>,
        arrangement: Arrangement,
        options: &ViewerOptions,
        mut make_panel: impl FnMut(usize, GridCell) -> (S, C),
    ) -> Result<Self, ConfigError> {
        if cubes.is_empty() {
            return Err(ConfigError::NoCubes);
        }

        let projections = match projections {
            Some(projections) if projections.len() != cubes.len() => {
                return Err(ConfigError::MismatchedProjections {
                    cubes: cubes.len(),
                    projections: projections.len(),
                })
            }
            Some(projections) => projections,
            None => vec![None; cubes.len()],
        };

        let layout = MultiViewerLayout::new(arrangement, cubes.len());
        let panels = cubes
            .into_iter()
            .zip(projections)
            .zip(&layout.cells)
            .enumerate()
            .map(|(i, ((cube, projection), &cell))| {
                let (surface, slider) = make_panel(i, cell);
                let options = ViewerOptions {
                    title_prefix: Some(format!("Cube {}", i + 1)),
                    ..options.clone()
                };
                debug!(panel = i, frames = cube.frame_count(), ?cell, "Opening panel");
                SliceViewer::open(cube.with_projection(projection), surface, slider, options)
            })
            .collect();

        Ok(Self { layout, panels })
    }

    pub fn layout(&self) -> &MultiViewerLayout {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    /// Always false, a built viewer has at least one panel.
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn panels(&self) -> &[SliceViewer<S, C>] {
        &self.panels
    }

    pub fn panels_mut(&mut self) -> &mut [SliceViewer<S, C>] {
        &mut self.panels
    }

    pub fn panel(&self, index: usize) -> Option<&SliceViewer<S, C>> {
        self.panels.get(index)
    }

    pub fn panel_mut(&mut self, index: usize) -> Option<&mut SliceViewer<S, C>> {
        self.panels.get_mut(index)
    }

    /// Handles `event` on panel `index` only.
    pub fn dispatch(&mut self, index: usize, event: ViewerEvent) -> Result<(), ConfigError> {
        let count = self.panels.len();
        let panel = self
            .panels
            .get_mut(index)
            .ok_or(ConfigError::NoSuchPanel { index, count })?;
        panel.handle(event);
        Ok(())
    }

    /// Drains every panel's queue; returns the total number of events handled.
    pub fn process_events(&mut self) -> usize {
        self.panels.iter_mut().map(SliceViewer::process_events).sum()
    }

    pub fn current_indices(&self) -> Vec<usize> {
        self.panels.iter().map(SliceViewer::current_index).collect()
    }
}
