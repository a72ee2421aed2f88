use indicatif::ProgressBar;
use nalgebra::Vector3;

use crate::{
    datatypes::{LandmarkPoint, Material, StressSolution, Vertex},
    error::StressmapError,
    mesh::Mesh,
};

/// Offset added to node distances to avoid division singularities
const DISTANCE_OFFSET: f64 = 0.1;

/// Fraction of the gross cross-section assumed to survive hole removal
const NET_SECTION_FACTOR: f64 = 0.7;

/// Landmarks further than this from a node apply no stress concentration
const HOLE_INFLUENCE_RADIUS: f64 = 10.0;

fn as_vector(v: &Vertex) -> Vector3<f64> {
    Vector3::new(v.x, v.y, v.z)
}

/// Mean position of a set of node indices
fn mean_position(mesh: &Mesh, indices: &[usize]) -> Vector3<f64> {
    let mut sum = Vector3::zeros();
    for i in indices {
        sum += as_vector(&mesh.nodes()[*i]);
    }
    sum / indices.len() as f64
}

/// Resolves the fixed-support centers used for distance fields
///
/// When the fixed landmark identities are known, each fixed landmark becomes
/// a center at the mesh midplane; otherwise the mean position of the fixed
/// nodes is used. Keeping one center per fixed hole keeps the stress field
/// symmetric across multiple supports.
fn resolve_fixed_centers(
    mesh: &Mesh,
    fixed_nodes: &[usize],
    landmarks: &[LandmarkPoint],
    fixed_landmarks: &[usize],
) -> Vec<Vector3<f64>> {
    let z_mid = mesh.z_mid();

    let mut centers: Vec<Vector3<f64>> = Vec::new();
    for idx in fixed_landmarks {
        if *idx < landmarks.len() {
            let hc = &landmarks[*idx];
            centers.push(Vector3::new(hc.x, hc.y, z_mid));
        }
    }

    if centers.is_empty() {
        centers.push(mean_position(mesh, fixed_nodes));
    }

    centers
}

/// Largest stress concentration factor from landmarks near a node
fn hole_concentration_factor(node: &Vertex, landmarks: &[LandmarkPoint]) -> f64 {
    let mut factor = 1.0;
    for hc in landmarks {
        let hole_dist = node.xy_distance_to(hc.x, hc.y);
        if hole_dist < HOLE_INFLUENCE_RADIUS {
            factor = f64::max(factor, 2.5 - hole_dist / HOLE_INFLUENCE_RADIUS);
        }
    }
    factor
}

/// Estimates the von Mises stress and displacement fields for a loaded mesh
///
/// This is a closed-form approximation, not a stiffness solve: section
/// properties come from the bounding box, the stress at each node combines a
/// bending term and a direct term amplified near holes and boundaries, and
/// the whole field is rescaled into an engineering-plausible band. The
/// resulting magnitudes are visualization-grade, deliberately not
/// first-principles accurate.
///
/// Fails fast if either boundary set is empty; callers must resolve empty
/// locator output through the geometric fallback first.
///
/// # Arguments
/// * `mesh` - The analysis mesh
/// * `fixed_nodes` - Node indices held fixed (non-empty)
/// * `load_nodes` - Node indices carrying the load (non-empty)
/// * `force` - The applied force vector
/// * `material` - The material record
/// * `landmarks` - All landmark centers, for stress concentration
/// * `fixed_landmarks` - Indices into `landmarks` that are fixed supports
///
/// # Returns
/// A StressSolution with per-node stress and displacement fields plus the
/// summary scalars
pub fn estimate(
    mesh: &Mesh,
    fixed_nodes: &[usize],
    load_nodes: &[usize],
    force: &Vector3<f64>,
    material: &Material,
    landmarks: &[LandmarkPoint],
    fixed_landmarks: &[usize],
) -> Result<StressSolution, StressmapError> {
    if fixed_nodes.is_empty() {
        return Err(StressmapError::EmptyBoundarySet(
            "No fixed nodes resolved; cannot anchor the stress field".to_owned(),
        ));
    }
    if load_nodes.is_empty() {
        return Err(StressmapError::EmptyBoundarySet(
            "No load nodes resolved; cannot place the applied force".to_owned(),
        ));
    }

    let n_nodes = mesh.node_count();
    let nodes = mesh.nodes();

    // Section properties from the bounding box. The z extent doubles as the
    // effective plate thickness.
    let x_range = mesh.x_extent();
    let thickness = mesh.z_extent();
    let area = x_range * thickness * NET_SECTION_FACTOR;
    let moment_of_inertia = x_range * f64::powi(thickness, 3) / 12.0;

    let load_center = mean_position(mesh, load_nodes);
    let fixed_centers = resolve_fixed_centers(mesh, fixed_nodes, landmarks, fixed_landmarks);

    // Span: mean distance from the load center to each fixed support
    let span = fixed_centers
        .iter()
        .map(|fc| (load_center - fc).norm())
        .sum::<f64>()
        / fixed_centers.len() as f64;

    let force_magnitude = force.norm();
    let bending_moment = force_magnitude * span;
    let mean_y = mesh.mean_y();

    // Distance fields, computed up front so the stress pass is a pure map
    let dist_to_load: Vec<f64> = nodes
        .iter()
        .map(|node| (as_vector(node) - load_center).norm())
        .collect();
    let dist_to_fixed: Vec<f64> = nodes
        .iter()
        .map(|node| {
            fixed_centers
                .iter()
                .map(|fc| (as_vector(node) - fc).norm())
                .fold(f64::INFINITY, f64::min)
        })
        .collect();

    println!("info: estimating stress field over {} nodes...", n_nodes);
    let bar = ProgressBar::new(n_nodes as u64);

    let mut stress_field: Vec<f64> = Vec::with_capacity(n_nodes);
    for i in 0..n_nodes {
        bar.inc(1);

        let d_load = dist_to_load[i] + DISTANCE_OFFSET;
        let d_fixed = dist_to_fixed[i] + DISTANCE_OFFSET;

        let y_dist = f64::abs(nodes[i].y - mean_y);
        let sigma_bend = if moment_of_inertia > 0.0 {
            bending_moment * y_dist / moment_of_inertia
        } else {
            0.0
        };
        let sigma_direct = if area > 0.0 { force_magnitude / area } else { 0.0 };

        let hole_factor = hole_concentration_factor(&nodes[i], landmarks);

        // Simplified von Mises combination of the two stress components
        let base_stress =
            f64::sqrt(f64::powi(sigma_bend, 2) + 3.0 * f64::powi(sigma_direct, 2)) * hole_factor;

        // Reaction concentration at supports, milder rise toward the load
        let fixed_stress_factor = 1.0 + 1.5 * f64::exp(-d_fixed / 8.0);
        let load_stress_factor = 1.0 + 0.5 * f64::exp(-d_load / 10.0);

        stress_field.push(base_stress * fixed_stress_factor * load_stress_factor);
    }
    bar.finish();

    // Rescale the field into an engineering-plausible band. The raw formula's
    // magnitude is discarded here on purpose; downstream classification
    // depends on the clamped range.
    let raw_max = stress_field.iter().cloned().fold(0.0, f64::max);
    let max_stress = if raw_max > 0.0 {
        let target_max = (force_magnitude / (area * 0.1) * 2.5).clamp(5.0, 50.0);
        for s in stress_field.iter_mut() {
            *s = *s / raw_max * target_max;
        }
        target_max
    } else {
        0.0
    };

    // Displacement from the cantilever tip formula, shaped as a parabola in
    // normalized distance from the nearest support
    let raw_disp = if moment_of_inertia > 0.0 {
        force_magnitude * f64::powi(span, 3) / (3.0 * material.elastic_modulus * moment_of_inertia)
    } else {
        0.01
    };
    let max_disp_estimate = raw_disp.clamp(0.001, 1.0);

    let mut displacement_field: Vec<[f64; 3]> = Vec::with_capacity(n_nodes);
    for i in 0..n_nodes {
        let rel_pos = if span > 0.0 {
            dist_to_fixed[i] / span
        } else {
            0.5
        };
        let disp_z = -max_disp_estimate * rel_pos * (2.0 - rel_pos);
        displacement_field.push([0.0, 0.0, disp_z]);
    }

    let max_displacement = displacement_field
        .iter()
        .map(|d| f64::abs(d[2]))
        .fold(0.0, f64::max);

    let safety_factor = if max_stress > 0.0 {
        material.yield_strength / max_stress
    } else {
        f64::INFINITY
    };

    println!(
        "info: max stress {:.2} MPa, max displacement {:.4} mm, safety factor {:.2}",
        max_stress, max_displacement, safety_factor
    );

    Ok(StressSolution {
        stress_field,
        displacement_field,
        max_stress,
        max_displacement,
        safety_factor,
    })
}
