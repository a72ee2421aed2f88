use serde_derive::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vertex {
    pub fn distance_to(&self, other: &Vertex) -> f64 {
        f64::sqrt(
            f64::powi(self.x - other.x, 2)
                + f64::powi(self.y - other.y, 2)
                + f64::powi(self.z - other.z, 2),
        )
    }

    /// Distance in the xy-plane only, ignoring z
    pub fn xy_distance_to(&self, x: f64, y: f64) -> f64 {
        f64::sqrt(f64::powi(self.x - x, 2) + f64::powi(self.y - y, 2))
    }
}

/// A 2D feature center (e.g. a bolt-hole axis), supplied by the caller
/// in model coordinates. Landmarks are independent of any mesh.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LandmarkPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Material {
    pub name: String,
    pub elastic_modulus: f64,
    pub poisson_ratio: f64,
    pub yield_strength: f64,
    pub density: f64,
}

/// Aggregate quality metrics for a triangle mesh.
///
/// `avg_angle` is the mean of per-element *minimum* interior angles, matching
/// the quality score's min-angle term.
#[derive(Debug, Clone, Serialize)]
pub struct MeshQualityMetrics {
    pub n_nodes: usize,
    pub n_elements: usize,
    pub min_aspect_ratio: f64,
    pub max_aspect_ratio: f64,
    pub avg_aspect_ratio: f64,
    pub min_angle: f64,
    pub max_angle: f64,
    pub avg_angle: f64,
    pub quality_score: f64,
}

/// Raw output of the stress/displacement estimator, before aggregation.
#[derive(Debug, Clone)]
pub struct StressSolution {
    pub stress_field: Vec<f64>,
    pub displacement_field: Vec<[f64; 3]>,
    pub max_stress: f64,
    pub max_displacement: f64,
    pub safety_factor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SafetyStatus {
    Pass,
    Warn,
    Fail,
}

impl std::fmt::Display for SafetyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SafetyStatus::Pass => "PASS",
            SafetyStatus::Warn => "WARN",
            SafetyStatus::Fail => "FAIL",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub success: bool,
    pub material: String,
    pub mesh_nodes: usize,
    pub mesh_elements: usize,
    pub max_stress: f64,
    pub max_displacement: f64,
    pub safety_factor: f64,
    pub status: SafetyStatus,
    pub recommendations: Vec<String>,
    pub quality: MeshQualityMetrics,
    pub stress_field: Vec<f64>,
    pub displacement_field: Vec<[f64; 3]>,
    pub error: Option<String>,
}

/// Caller-tunable knobs for the analysis pipeline.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisOptions {
    /// Search radius around each landmark when resolving boundary nodes
    pub hole_radius: f64,
    /// Displacement above this demotes a passing result to a warning
    pub displacement_limit: f64,
}

impl Default for AnalysisOptions {
    fn default() -> AnalysisOptions {
        AnalysisOptions {
            hole_radius: 5.0,
            displacement_limit: 1.0,
        }
    }
}
