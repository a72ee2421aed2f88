//! Approximate structural analysis over triangulated surface meshes.
//!
//! Given a cleaned mesh, landmark points (e.g. bolt-hole centers), a
//! material, and an applied force, this crate scores mesh quality, resolves
//! boundary node sets by geometric proximity, estimates per-node von Mises
//! stress and displacement fields with closed-form approximations, and
//! classifies the result by safety factor. There is no stiffness solve; the
//! fields are monotonic, geometrically plausible approximations for
//! visualization and rough sizing, not certification-grade analysis.

pub mod boundary;
pub mod datatypes;
pub mod error;
pub mod materials;
pub mod mesh;
pub mod post_processor;
pub mod quality;
pub mod solver;
pub mod transfer;

use nalgebra::Vector3;

use crate::{
    datatypes::{AnalysisOptions, AnalysisResult, LandmarkPoint},
    error::StressmapError,
    materials::MaterialLibrary,
    mesh::Mesh,
};

/// Runs the full analysis pipeline on a mesh
///
/// Looks up the material, scores mesh quality, resolves fixed and load node
/// sets from the landmarks (falling back to the bottom/top node bands when a
/// landmark search comes back empty), runs the stress/displacement
/// estimator, and aggregates everything into an AnalysisResult.
///
/// # Arguments
/// * `mesh` - The cleaned analysis mesh
/// * `landmarks` - Feature centers, e.g. bolt-hole positions
/// * `fixed_landmarks` - Indices into `landmarks` that are fixed supports
/// * `load_landmark` - Index into `landmarks` where the force is applied
/// * `force` - The applied force vector
/// * `material_name` - Registry key of the material
/// * `library` - The material registry
/// * `options` - Search radius and displacement limit
///
/// # Returns
/// The aggregated AnalysisResult
pub fn run_analysis(
    mesh: &Mesh,
    landmarks: &[LandmarkPoint],
    fixed_landmarks: &[usize],
    load_landmark: usize,
    force: &Vector3<f64>,
    material_name: &str,
    library: &MaterialLibrary,
    options: &AnalysisOptions,
) -> Result<AnalysisResult, StressmapError> {
    let material = library.get(material_name)?;

    println!(
        "info: analyzing {} nodes / {} elements with material {}",
        mesh.node_count(),
        mesh.element_count(),
        material.name
    );

    let quality = quality::score(mesh);
    println!(
        "info: mesh quality {:.2}, aspect ratio {:.2} ({:.2} - {:.2}), min angle {:.1} deg",
        quality.quality_score,
        quality.avg_aspect_ratio,
        quality.min_aspect_ratio,
        quality.max_aspect_ratio,
        quality.min_angle
    );

    let z_range = (mesh.z_min(), mesh.z_max());
    let hole_sets = boundary::locate(mesh.nodes(), landmarks, options.hole_radius, Some(z_range));
    println!(
        "info: landmark node counts: {:?}",
        hole_sets.iter().map(|s| s.len()).collect::<Vec<usize>>()
    );

    let mut fixed_nodes: Vec<usize> = Vec::new();
    for idx in fixed_landmarks {
        if *idx < hole_sets.len() {
            fixed_nodes.extend(&hole_sets[*idx]);
        }
    }

    let mut load_nodes: Vec<usize> = match hole_sets.get(load_landmark) {
        Some(set) => set.clone(),
        None => Vec::new(),
    };

    if fixed_nodes.is_empty() {
        println!("warning: no nodes near fixed landmarks; falling back to bottom node band");
        fixed_nodes = boundary::fallback_fixed_nodes(mesh);
    }
    if load_nodes.is_empty() {
        println!("warning: no nodes near load landmark; falling back to top node band");
        load_nodes = boundary::fallback_load_nodes(mesh);
    }

    println!(
        "info: {} fixed nodes, {} load nodes",
        fixed_nodes.len(),
        load_nodes.len()
    );

    let solution = solver::estimate(
        mesh,
        &fixed_nodes,
        &load_nodes,
        force,
        material,
        landmarks,
        fixed_landmarks,
    )?;

    Ok(post_processor::build(
        mesh,
        material,
        quality,
        solution,
        options.displacement_limit,
    ))
}
