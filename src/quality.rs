use crate::{datatypes::MeshQualityMetrics, mesh::Mesh};

/// Edges at or below this length are treated as degenerate
const DEGENERATE_EDGE: f64 = 1e-10;

/// Interior angle at the vertex where edges of length `a` and `b` meet,
/// opposite the edge of length `c`, in degrees. The cosine is clamped to
/// [-1, 1] to absorb floating-point overshoot.
fn angle_at_vertex(a: f64, b: f64, c: f64) -> f64 {
    let cos_angle = (a * a + b * b - c * c) / (2.0 * a * b + DEGENERATE_EDGE);
    f64::acos(cos_angle.clamp(-1.0, 1.0)).to_degrees()
}

/// Scores the geometric quality of a triangle mesh
///
/// Per element, computes the aspect ratio (longest edge over shortest edge)
/// and the three interior angles via the law of cosines. Elements with a
/// degenerate shortest edge contribute no aspect ratio; elements with any
/// degenerate edge contribute no angles.
///
/// The overall score averages three [0,1] sub-scores: aspect ratio (1.0 at
/// ratio 1, 0 at ratio 5 or worse), mean minimum angle (1.0 at 30° or
/// better), and mean maximum angle (1.0 at 60°, 0 at 120° or worse).
///
/// A mesh whose elements are all degenerate scores a neutral 1.0 with angles
/// defaulted to 60° rather than dividing by zero.
///
/// # Arguments
/// * `mesh` - The mesh to score
///
/// # Returns
/// A MeshQualityMetrics instance
pub fn score(mesh: &Mesh) -> MeshQualityMetrics {
    let nodes = mesh.nodes();

    let mut aspect_ratios: Vec<f64> = Vec::new();
    let mut min_angles: Vec<f64> = Vec::new();
    let mut max_angles: Vec<f64> = Vec::new();

    for element in mesh.elements() {
        let p0 = &nodes[element[0]];
        let p1 = &nodes[element[1]];
        let p2 = &nodes[element[2]];

        let e0 = p0.distance_to(p1);
        let e1 = p1.distance_to(p2);
        let e2 = p2.distance_to(p0);

        let mut edges = [e0, e1, e2];
        edges.sort_by(|a, b| a.total_cmp(b));

        if edges[0] > DEGENERATE_EDGE {
            aspect_ratios.push(edges[2] / edges[0]);
        }

        if e0 > DEGENERATE_EDGE && e1 > DEGENERATE_EDGE && e2 > DEGENERATE_EDGE {
            let a0 = angle_at_vertex(e0, e2, e1);
            let a1 = angle_at_vertex(e0, e1, e2);
            let a2 = angle_at_vertex(e1, e2, e0);

            min_angles.push(a0.min(a1).min(a2));
            max_angles.push(a0.max(a1).max(a2));
        }
    }

    if aspect_ratios.is_empty() {
        // No measurable element; report a neutral record instead of
        // propagating a division by zero.
        return MeshQualityMetrics {
            n_nodes: mesh.node_count(),
            n_elements: mesh.element_count(),
            min_aspect_ratio: 1.0,
            max_aspect_ratio: 1.0,
            avg_aspect_ratio: 1.0,
            min_angle: 60.0,
            max_angle: 60.0,
            avg_angle: 60.0,
            quality_score: 1.0,
        };
    }

    let mean = |values: &[f64]| values.iter().sum::<f64>() / values.len() as f64;

    let avg_aspect_ratio = mean(&aspect_ratios);
    let avg_min_angle = if min_angles.is_empty() {
        60.0
    } else {
        mean(&min_angles)
    };
    let avg_max_angle = if max_angles.is_empty() {
        60.0
    } else {
        mean(&max_angles)
    };

    let aspect_score = f64::max(0.0, 1.0 - (avg_aspect_ratio - 1.0) / 4.0);
    let min_angle_score = f64::min(avg_min_angle / 30.0, 1.0);
    let max_angle_score = f64::max(0.0, 1.0 - (avg_max_angle - 60.0) / 60.0);

    let quality_score = (aspect_score + min_angle_score + max_angle_score) / 3.0;

    let fold_min = |values: &[f64]| values.iter().cloned().fold(f64::INFINITY, f64::min);
    let fold_max = |values: &[f64]| values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    MeshQualityMetrics {
        n_nodes: mesh.node_count(),
        n_elements: mesh.element_count(),
        min_aspect_ratio: fold_min(&aspect_ratios),
        max_aspect_ratio: fold_max(&aspect_ratios),
        avg_aspect_ratio,
        min_angle: if min_angles.is_empty() {
            60.0
        } else {
            fold_min(&min_angles)
        },
        max_angle: if max_angles.is_empty() {
            60.0
        } else {
            fold_max(&max_angles)
        },
        avg_angle: avg_min_angle,
        quality_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::Vertex;

    fn v(x: f64, y: f64, z: f64) -> Vertex {
        Vertex { x, y, z }
    }

    fn single_triangle(p0: Vertex, p1: Vertex, p2: Vertex) -> Mesh {
        Mesh::new(vec![p0, p1, p2], vec![[0, 1, 2]]).unwrap()
    }

    #[test]
    fn equilateral_triangle_scores_perfect() {
        let mesh = single_triangle(
            v(0.0, 0.0, 0.0),
            v(1.0, 0.0, 0.0),
            v(0.5, f64::sqrt(3.0) / 2.0, 0.0),
        );
        let metrics = score(&mesh);

        assert!((metrics.quality_score - 1.0).abs() < 1e-9);
        assert!((metrics.avg_aspect_ratio - 1.0).abs() < 1e-9);
        assert!((metrics.min_angle - 60.0).abs() < 1e-6);
        assert!((metrics.max_angle - 60.0).abs() < 1e-6);
    }

    #[test]
    fn interior_angles_sum_to_half_turn() {
        let mesh = single_triangle(v(0.0, 0.0, 0.0), v(4.0, 0.0, 0.0), v(0.5, 2.5, 1.0));
        let metrics = score(&mesh);

        // One element, so min/max/avg angles reconstruct the triple.
        let third = 180.0 - metrics.min_angle - metrics.max_angle;
        assert!(third > 0.0);
        let total = metrics.min_angle + metrics.max_angle + third;
        assert!((total - 180.0).abs() < 1e-6);
    }

    #[test]
    fn aspect_ratio_invariant_under_vertex_relabeling() {
        let (p0, p1, p2) = (v(0.0, 0.0, 0.0), v(3.0, 0.0, 0.0), v(0.2, 1.1, 0.0));

        let reference = score(&single_triangle(p0, p1, p2)).avg_aspect_ratio;
        for (a, b, c) in [
            (p0, p2, p1),
            (p1, p0, p2),
            (p1, p2, p0),
            (p2, p0, p1),
            (p2, p1, p0),
        ] {
            let relabeled = score(&single_triangle(a, b, c)).avg_aspect_ratio;
            assert!((relabeled - reference).abs() < 1e-12);
        }
    }

    #[test]
    fn score_stays_in_unit_interval_for_sliver() {
        let mesh = single_triangle(v(0.0, 0.0, 0.0), v(10.0, 0.0, 0.0), v(5.0, 0.01, 0.0));
        let metrics = score(&mesh);

        assert!(metrics.quality_score >= 0.0);
        assert!(metrics.quality_score <= 1.0);
        assert!(metrics.avg_aspect_ratio > 5.0);
    }

    #[test]
    fn degenerate_mesh_yields_neutral_metrics() {
        let p = v(1.0, 1.0, 1.0);
        let mesh = Mesh::new(vec![p, p, p], vec![[0, 1, 2]]).unwrap();
        let metrics = score(&mesh);

        assert!((metrics.quality_score - 1.0).abs() < f64::EPSILON);
        assert!((metrics.min_angle - 60.0).abs() < f64::EPSILON);
        assert!((metrics.avg_aspect_ratio - 1.0).abs() < f64::EPSILON);
    }
}
