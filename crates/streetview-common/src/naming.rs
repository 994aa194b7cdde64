//! Filesystem-safe names for region directories and image files.

use crate::{Coordinate, Heading};

/// Characters removed from region labels.
const FORBIDDEN: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Placeholder for metadata fields the API left out.
const UNKNOWN: &str = "unknown";

/// Turn a human-readable region label into a directory name.
///
/// Spaces become hyphens, then every character in `\ / * ? : " < > |` is
/// dropped.
pub fn create_folder_name(name: &str) -> String {
    name.replace(' ', "-")
        .chars()
        .filter(|c| !FORBIDDEN.contains(c))
        .collect()
}

/// Make a metadata value safe to embed in a file name.
///
/// Keeps ASCII alphanumerics, `-`, `_` and `.`; anything else becomes `_`.
pub fn sanitize_component(value: &str) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        UNKNOWN.to_string()
    } else {
        cleaned
    }
}

/// File name for one downloaded image.
///
/// `streetview_<pano_id>_<date>_<lat>_<lon>_heading<heading>.jpg`
///
/// Coordinates use the shortest `Display` form of `f64`: `10.0` prints as
/// `10` and `0.00005` as `0.00005`, never in exponent notation.
pub fn image_file_name(
    pano_id: Option<&str>,
    date: Option<&str>,
    point: Coordinate,
    heading: Heading,
) -> String {
    format!(
        "streetview_{}_{}_{}_{}_heading{}.jpg",
        sanitize_component(pano_id.unwrap_or(UNKNOWN)),
        sanitize_component(date.unwrap_or(UNKNOWN)),
        point.lat,
        point.lon,
        heading.degrees()
    )
}
