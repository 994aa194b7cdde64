//! Common types and utilities for the street-level imagery harvester.

pub mod coord;
pub mod error;
pub mod grid;
pub mod naming;
pub mod region;

pub use coord::{Coordinate, Heading, HEADINGS};
pub use error::{GridError, GridResult};
pub use grid::{calculate_grid_steps, generate_grid, GridPoint, GridSpec, MajorAxis};
pub use naming::{create_folder_name, image_file_name, sanitize_component};
pub use region::{Region, RegionPlan};
