use crate::{datatypes::Vertex, error::StressmapError};

/// Index of the nearest source point by squared distance, first minimum wins
fn nearest_index(query: &Vertex, source_points: &[Vertex]) -> usize {
    let mut best_index = 0;
    let mut best_dist = f64::INFINITY;

    for (i, p) in source_points.iter().enumerate() {
        let dist = f64::powi(query.x - p.x, 2)
            + f64::powi(query.y - p.y, 2)
            + f64::powi(query.z - p.z, 2);
        if dist < best_dist {
            best_dist = dist;
            best_index = i;
        }
    }

    best_index
}

/// Resamples a scalar field from one point set onto another
///
/// For every target point the value of the nearest source point is copied,
/// using a brute-force squared-distance scan. Ties go to the
/// first-encountered minimum, so the result is deterministic for any input
/// ordering. Transferring a field onto its own point set returns the field
/// unchanged.
///
/// # Arguments
/// * `source_points` - Points the field was computed on
/// * `source_values` - One scalar per source point
/// * `target_points` - Points to resample onto
///
/// # Returns
/// One scalar per target point
pub fn transfer(
    source_points: &[Vertex],
    source_values: &[f64],
    target_points: &[Vertex],
) -> Result<Vec<f64>, StressmapError> {
    if source_points.len() != source_values.len() {
        return Err(StressmapError::Input(format!(
            "Field transfer got {} source points but {} values",
            source_points.len(),
            source_values.len()
        )));
    }
    if source_points.is_empty() {
        return Err(StressmapError::Input(
            "Field transfer requires at least one source point".to_owned(),
        ));
    }

    Ok(target_points
        .iter()
        .map(|q| source_values[nearest_index(q, source_points)])
        .collect())
}
