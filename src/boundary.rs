use crate::{
    datatypes::{LandmarkPoint, Vertex},
    mesh::Mesh,
};

/// Finds mesh nodes near each landmark
///
/// A node belongs to a landmark's set when its xy-distance to the landmark is
/// strictly less than `radius` and, when a z-range is given, its z coordinate
/// lies inside `[z_min, z_max]` inclusive. Landmarks are resolved
/// independently, so overlapping landmarks may share nodes. Sets may come
/// back empty; callers are expected to fall back to a geometric rule before
/// running the estimator.
///
/// # Arguments
/// * `nodes` - The mesh node coordinates
/// * `landmarks` - Feature centers to search around
/// * `radius` - Search radius in the xy-plane
/// * `z_range` - Optional inclusive z filter
///
/// # Returns
/// One vector of node indices per landmark, in mesh node order
pub fn locate(
    nodes: &[Vertex],
    landmarks: &[LandmarkPoint],
    radius: f64,
    z_range: Option<(f64, f64)>,
) -> Vec<Vec<usize>> {
    let mut sets: Vec<Vec<usize>> = Vec::with_capacity(landmarks.len());

    for landmark in landmarks {
        let mut indices: Vec<usize> = Vec::new();

        for (i, node) in nodes.iter().enumerate() {
            if node.xy_distance_to(landmark.x, landmark.y) >= radius {
                continue;
            }
            if let Some((z_min, z_max)) = z_range {
                if node.z < z_min || node.z > z_max {
                    continue;
                }
            }
            indices.push(i);
        }

        sets.push(indices);
    }

    sets
}

/// Fallback fixed set: nodes in the bottom band of the mesh (z within 1.0 of
/// the minimum)
pub fn fallback_fixed_nodes(mesh: &Mesh) -> Vec<usize> {
    let z_min = mesh.z_min();
    mesh.nodes()
        .iter()
        .enumerate()
        .filter(|(_, node)| node.z < z_min + 1.0)
        .map(|(i, _)| i)
        .collect()
}

/// Fallback load set: nodes in the top band of the mesh (z within 1.0 of the
/// maximum)
pub fn fallback_load_nodes(mesh: &Mesh) -> Vec<usize> {
    let z_max = mesh.z_max();
    mesh.nodes()
        .iter()
        .enumerate()
        .filter(|(_, node)| node.z > z_max - 1.0)
        .map(|(i, _)| i)
        .collect()
}
