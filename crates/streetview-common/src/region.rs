//! Named rectangular areas and their sampling plans.

use serde::{Deserialize, Serialize};

use crate::{
    calculate_grid_steps, create_folder_name, generate_grid, Coordinate, GridError, GridPoint,
    GridResult, GridSpec,
};

/// A user-named area delimited by two corners.
///
/// The corners may be given in any order; the walking direction is derived
/// from `top_left` toward `bottom_right`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub top_left: Coordinate,
    pub bottom_right: Coordinate,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Grid computed for one region.
#[derive(Debug, Clone)]
pub struct RegionPlan {
    pub folder_name: String,
    pub spec: GridSpec,
    pub points: Vec<GridPoint>,
}

impl Region {
    pub fn new(name: impl Into<String>, top_left: Coordinate, bottom_right: Coordinate) -> Self {
        Self {
            name: name.into(),
            top_left,
            bottom_right,
            enabled: true,
        }
    }

    /// Directory name for this region's images.
    pub fn folder_name(&self) -> String {
        create_folder_name(&self.name)
    }

    /// Check the corners are usable WGS84 positions.
    pub fn validate(&self) -> GridResult<()> {
        for corner in [self.top_left, self.bottom_right] {
            if !corner.is_valid() {
                return Err(GridError::InvalidCoordinate(format!(
                    "{} in region '{}'",
                    corner, self.name
                )));
            }
        }
        Ok(())
    }

    /// Compute the step vector and sampled points for this region.
    pub fn plan(&self, num_points_major: usize, sample_interval: usize) -> GridResult<RegionPlan> {
        self.validate()?;
        let spec = calculate_grid_steps(self.top_left, self.bottom_right, num_points_major)?;
        let points = generate_grid(self.top_left, num_points_major, &spec, sample_interval);

        Ok(RegionPlan {
            folder_name: self.folder_name(),
            spec,
            points,
        })
    }
}
