use nalgebra::Vector3;
use serde_derive::Serialize;

use crate::{
    datatypes::{
        AnalysisResult, LandmarkPoint, Material, MeshQualityMetrics, SafetyStatus, StressSolution,
    },
    error::StressmapError,
    mesh::Mesh,
    transfer,
};

/// Classifies a safety factor into a status with recommendations
///
/// Thresholds: below 1.0 the part yields (fail), below 1.5 the margin is
/// insufficient (fail), below 2.0 the result is acceptable only for
/// non-critical use (warn), below 4.0 is a pass, and above that the part is
/// over-designed (pass, with a material-reduction note). A displacement
/// above `displacement_limit` demotes a pass to a warn.
///
/// # Arguments
/// * `safety_factor` - Yield strength over predicted max stress
/// * `max_displacement` - Predicted maximum displacement
/// * `displacement_limit` - Acceptable displacement bound
///
/// # Returns
/// The status and the human-readable recommendation list
pub fn classify(
    safety_factor: f64,
    max_displacement: f64,
    displacement_limit: f64,
) -> (SafetyStatus, Vec<String>) {
    let mut recommendations: Vec<String> = Vec::new();

    let mut status = if safety_factor < 1.0 {
        recommendations.push(format!(
            "CRITICAL: Part will yield! SF={:.2}",
            safety_factor
        ));
        recommendations.push("Increase thickness or use stronger material".to_owned());
        SafetyStatus::Fail
    } else if safety_factor < 1.5 {
        recommendations.push(format!(
            "Insufficient safety factor: {:.2} (need >1.5)",
            safety_factor
        ));
        recommendations.push("Consider increasing wall thickness by 50%".to_owned());
        SafetyStatus::Fail
    } else if safety_factor < 2.0 {
        recommendations.push(format!("Low safety factor: {:.2}", safety_factor));
        recommendations.push("Acceptable for non-critical applications only".to_owned());
        SafetyStatus::Warn
    } else if safety_factor < 4.0 {
        recommendations.push(format!("Good safety factor: {:.2}", safety_factor));
        SafetyStatus::Pass
    } else {
        recommendations.push(format!("High safety factor: {:.2}", safety_factor));
        recommendations.push("Consider optimizing to reduce material/weight".to_owned());
        SafetyStatus::Pass
    };

    if max_displacement > displacement_limit {
        if status == SafetyStatus::Pass {
            status = SafetyStatus::Warn;
        }
        recommendations.push(format!(
            "Displacement {:.2}mm exceeds limit {}mm",
            max_displacement, displacement_limit
        ));
        recommendations.push("Increase stiffness (thicker sections or gussets)".to_owned());
    }

    (status, recommendations)
}

/// Assembles the final analysis record
///
/// Pure composition of the quality metrics and the estimator output; the
/// only derivation is the safety-factor classification.
///
/// # Arguments
/// * `mesh` - The analysis mesh
/// * `material` - The material used
/// * `quality` - Mesh quality metrics
/// * `solution` - The estimator's fields and scalars
/// * `displacement_limit` - Limit for the displacement demotion rule
///
/// # Returns
/// The immutable AnalysisResult
pub fn build(
    mesh: &Mesh,
    material: &Material,
    quality: MeshQualityMetrics,
    solution: StressSolution,
    displacement_limit: f64,
) -> AnalysisResult {
    let (status, recommendations) = classify(
        solution.safety_factor,
        solution.max_displacement,
        displacement_limit,
    );

    AnalysisResult {
        success: true,
        material: material.name.clone(),
        mesh_nodes: mesh.node_count(),
        mesh_elements: mesh.element_count(),
        max_stress: solution.max_stress,
        max_displacement: solution.max_displacement,
        safety_factor: solution.safety_factor,
        status,
        recommendations,
        quality,
        stress_field: solution.stress_field,
        displacement_field: solution.displacement_field,
        error: None,
    }
}

/// Prints the human-readable result block to stdout
pub fn print_report(result: &AnalysisResult) {
    println!("\nAnalysis Result: {}", result.status);
    println!("{}", "=".repeat(40));
    println!("Material: {}", result.material);
    println!(
        "Mesh: {} nodes, {} elements",
        result.mesh_nodes, result.mesh_elements
    );
    println!(
        "Mesh Quality: {:.2} (aspect ratio {:.2}, min angle {:.1} deg)",
        result.quality.quality_score, result.quality.avg_aspect_ratio, result.quality.min_angle
    );
    println!("Max Stress: {:.2} MPa", result.max_stress);
    println!("Max Displacement: {:.4} mm", result.max_displacement);
    println!("Safety Factor: {:.2}", result.safety_factor);
    println!("\nRecommendations:");
    for rec in &result.recommendations {
        println!("  - {}", rec);
    }
    println!("\nnote: stress magnitudes are scaled into a plausible band for visualization and are not certification-grade values");
}

/// Serializes the result record as pretty JSON
pub fn json_report(result: &AnalysisResult) -> Result<String, StressmapError> {
    match serde_json::to_string_pretty(result) {
        Ok(s) => Ok(s),
        Err(err) => Err(StressmapError::Input(format!(
            "Failed to serialize report: {err}"
        ))),
    }
}

/// Data handed to the web viewer: the stress field resampled onto the render
/// mesh, flattened vertex positions, boundary markers, and scalar summaries.
#[derive(Debug, Clone, Serialize)]
pub struct VisualizationPayload {
    pub stress: Vec<f64>,
    pub positions: Vec<f64>,
    pub max_stress: f64,
    pub max_displacement: f64,
    pub safety_factor: f64,
    pub fixed_positions: Vec<[f64; 3]>,
    pub load_position: Option<[f64; 3]>,
    pub load_direction: [f64; 3],
    pub force_magnitude: f64,
    pub mesh_elements: usize,
    pub mesh_aspect_ratio: f64,
    pub mesh_quality_score: f64,
}

/// Builds the viewer payload for a possibly different render mesh
///
/// The stress field lives on the analysis mesh; here it is resampled onto
/// the render mesh's vertices by nearest-neighbor transfer. Landmark marker
/// positions are placed at the analysis mesh midplane. Landmark coordinates,
/// load direction, and magnitude pass through unchanged.
///
/// # Arguments
/// * `result` - The completed analysis
/// * `analysis_mesh` - The mesh the stress field was computed on
/// * `render_mesh` - The mesh the viewer will draw
/// * `landmarks` - All landmark centers
/// * `fixed_landmarks` - Indices into `landmarks` that are fixed
/// * `load_landmark` - Index of the loaded landmark, when known
/// * `force` - The applied force vector
///
/// # Returns
/// A serializable VisualizationPayload
pub fn visualization_payload(
    result: &AnalysisResult,
    analysis_mesh: &Mesh,
    render_mesh: &Mesh,
    landmarks: &[LandmarkPoint],
    fixed_landmarks: &[usize],
    load_landmark: Option<usize>,
    force: &Vector3<f64>,
) -> Result<VisualizationPayload, StressmapError> {
    let stress = transfer::transfer(
        analysis_mesh.nodes(),
        &result.stress_field,
        render_mesh.nodes(),
    )?;

    let mut positions: Vec<f64> = Vec::with_capacity(render_mesh.node_count() * 3);
    for node in render_mesh.nodes() {
        positions.push(node.x);
        positions.push(node.y);
        positions.push(node.z);
    }

    let z_mid = analysis_mesh.z_mid();
    let fixed_positions: Vec<[f64; 3]> = fixed_landmarks
        .iter()
        .filter(|idx| **idx < landmarks.len())
        .map(|idx| [landmarks[*idx].x, landmarks[*idx].y, z_mid])
        .collect();

    let load_position = load_landmark
        .filter(|idx| *idx < landmarks.len())
        .map(|idx| [landmarks[idx].x, landmarks[idx].y, z_mid]);

    let force_magnitude = force.norm();
    let load_direction = if force_magnitude > 0.0 {
        let unit = force / force_magnitude;
        [unit.x, unit.y, unit.z]
    } else {
        [0.0, 0.0, -1.0]
    };

    Ok(VisualizationPayload {
        stress,
        positions,
        max_stress: result.max_stress,
        max_displacement: result.max_displacement,
        safety_factor: result.safety_factor,
        fixed_positions,
        load_position,
        load_direction,
        force_magnitude,
        mesh_elements: result.mesh_elements,
        mesh_aspect_ratio: result.quality.avg_aspect_ratio,
        mesh_quality_score: result.quality.quality_score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_thresholds() {
        assert_eq!(classify(0.8, 0.0, 1.0).0, SafetyStatus::Fail);
        assert_eq!(classify(1.2, 0.0, 1.0).0, SafetyStatus::Fail);
        assert_eq!(classify(1.7, 0.0, 1.0).0, SafetyStatus::Warn);
        assert_eq!(classify(3.0, 0.0, 1.0).0, SafetyStatus::Pass);
        assert_eq!(classify(10.0, 0.0, 1.0).0, SafetyStatus::Pass);
        assert_eq!(classify(f64::INFINITY, 0.0, 1.0).0, SafetyStatus::Pass);
    }

    #[test]
    fn boundary_values_take_the_lower_band() {
        assert_eq!(classify(1.0, 0.0, 1.0).0, SafetyStatus::Fail);
        assert_eq!(classify(1.5, 0.0, 1.0).0, SafetyStatus::Warn);
        assert_eq!(classify(2.0, 0.0, 1.0).0, SafetyStatus::Pass);
        assert_eq!(classify(4.0, 0.0, 1.0).0, SafetyStatus::Pass);
    }

    #[test]
    fn excess_displacement_demotes_pass_to_warn() {
        let (status, recommendations) = classify(3.0, 2.5, 1.0);
        assert_eq!(status, SafetyStatus::Warn);
        assert!(recommendations.iter().any(|r| r.contains("exceeds limit")));
    }

    #[test]
    fn excess_displacement_does_not_upgrade_a_fail() {
        let (status, _) = classify(0.5, 2.5, 1.0);
        assert_eq!(status, SafetyStatus::Fail);
    }

    #[test]
    fn over_designed_part_gets_material_recommendation() {
        let (_, recommendations) = classify(8.0, 0.0, 1.0);
        assert!(recommendations
            .iter()
            .any(|r| r.contains("reduce material/weight")));
    }
}
