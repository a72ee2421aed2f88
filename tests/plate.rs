use nalgebra::Vector3;

use stressmap::{
    datatypes::{AnalysisOptions, LandmarkPoint, SafetyStatus, Vertex},
    materials::MaterialLibrary,
    mesh::Mesh,
    post_processor, run_analysis, transfer,
};

/// Builds a flat rectangular plate as two triangulated grid layers, one at
/// z = 0 and one at z = thickness.
fn build_plate_mesh(width: f64, height: f64, thickness: f64, divisions: usize) -> Mesh {
    let mut nodes: Vec<Vertex> = Vec::new();
    let mut elements: Vec<[usize; 3]> = Vec::new();

    let cols = divisions + 1;
    for layer in 0..2 {
        let z = thickness * layer as f64;
        for j in 0..=divisions {
            for i in 0..=divisions {
                nodes.push(Vertex {
                    x: -width / 2.0 + width * i as f64 / divisions as f64,
                    y: -height / 2.0 + height * j as f64 / divisions as f64,
                    z,
                });
            }
        }
    }

    for layer in 0..2usize {
        let base = layer * cols * cols;
        for j in 0..divisions {
            for i in 0..divisions {
                let a = base + j * cols + i;
                let b = a + 1;
                let c = a + cols;
                let d = c + 1;
                elements.push([a, b, c]);
                elements.push([b, d, c]);
            }
        }
    }

    Mesh::new(nodes, elements).unwrap()
}

fn bracket_landmarks() -> Vec<LandmarkPoint> {
    vec![
        LandmarkPoint { x: -40.0, y: -23.0 },
        LandmarkPoint { x: 40.0, y: -23.0 },
        LandmarkPoint { x: 0.0, y: 27.0 },
    ]
}

#[test]
fn aluminum_plate_end_to_end() {
    let mesh = build_plate_mesh(80.0, 40.0, 6.0, 8);
    let library = MaterialLibrary::builtin();
    let force = Vector3::new(0.0, 0.0, -100.0);

    let result = run_analysis(
        &mesh,
        &bracket_landmarks(),
        &[0, 1],
        2,
        &force,
        "aluminum",
        &library,
        &AnalysisOptions::default(),
    )
    .expect("plate analysis succeeds");

    assert!(result.success);
    assert_eq!(result.mesh_nodes, mesh.node_count());
    assert_eq!(result.mesh_elements, mesh.element_count());
    assert_eq!(result.stress_field.len(), mesh.node_count());
    assert_eq!(result.displacement_field.len(), mesh.node_count());

    // Normalization keeps the peak in the engineering-plausible band
    assert!(result.max_stress >= 5.0 && result.max_stress <= 50.0);
    let field_max = result.stress_field.iter().cloned().fold(0.0, f64::max);
    assert!((field_max - result.max_stress).abs() < 1e-9);
    assert!(result.stress_field.iter().all(|s| *s >= 0.0));

    // Safety factor follows directly from the aluminum yield strength
    assert!((result.safety_factor - 276.0 / result.max_stress).abs() < 1e-9);
    assert!(matches!(
        result.status,
        SafetyStatus::Warn | SafetyStatus::Pass
    ));

    assert!(result.quality.quality_score >= 0.0 && result.quality.quality_score <= 1.0);
}

#[test]
fn degenerate_mesh_end_to_end() {
    let p = Vertex {
        x: 2.0,
        y: 2.0,
        z: 2.0,
    };
    let mesh = Mesh::new(vec![p; 3], vec![[0, 1, 2]]).unwrap();
    let library = MaterialLibrary::builtin();

    let result = run_analysis(
        &mesh,
        &[],
        &[],
        0,
        &Vector3::new(0.0, 0.0, -100.0),
        "aluminum",
        &library,
        &AnalysisOptions::default(),
    )
    .expect("degenerate mesh must not fail");

    assert!((result.quality.quality_score - 1.0).abs() < f64::EPSILON);
    assert_eq!(result.max_stress, 0.0);
    assert!(result.safety_factor.is_infinite());
    assert_eq!(result.status, SafetyStatus::Pass);
}

#[test]
fn stress_field_transfers_onto_render_mesh() {
    let mesh = build_plate_mesh(80.0, 40.0, 6.0, 8);
    let library = MaterialLibrary::builtin();
    let force = Vector3::new(0.0, 0.0, -100.0);

    let result = run_analysis(
        &mesh,
        &bracket_landmarks(),
        &[0, 1],
        2,
        &force,
        "aluminum",
        &library,
        &AnalysisOptions::default(),
    )
    .unwrap();

    // A coarser, independently built render mesh of the same plate
    let render_mesh = build_plate_mesh(80.0, 40.0, 6.0, 4);
    let resampled = transfer::transfer(
        mesh.nodes(),
        &result.stress_field,
        render_mesh.nodes(),
    )
    .unwrap();

    assert_eq!(resampled.len(), render_mesh.node_count());
    assert!(resampled
        .iter()
        .all(|s| *s >= 0.0 && *s <= result.max_stress + 1e-9));

    // Every render node here coincides with an analysis node, so the
    // resampled values are exact copies
    for (node, value) in render_mesh.nodes().iter().zip(&resampled) {
        let exact = mesh
            .nodes()
            .iter()
            .position(|n| n.distance_to(node) < 1e-9)
            .expect("render node coincides with an analysis node");
        assert_eq!(*value, result.stress_field[exact]);
    }
}

#[test]
fn viewer_payload_carries_markers_and_scalars() {
    let mesh = build_plate_mesh(80.0, 40.0, 6.0, 6);
    let library = MaterialLibrary::builtin();
    let force = Vector3::new(0.0, 0.0, -100.0);
    let landmarks = bracket_landmarks();

    let result = run_analysis(
        &mesh,
        &landmarks,
        &[0, 1],
        2,
        &force,
        "aluminum",
        &library,
        &AnalysisOptions::default(),
    )
    .unwrap();

    let payload = post_processor::visualization_payload(
        &result,
        &mesh,
        &mesh,
        &landmarks,
        &[0, 1],
        Some(2),
        &force,
    )
    .unwrap();

    assert_eq!(payload.stress, result.stress_field);
    assert_eq!(payload.positions.len(), mesh.node_count() * 3);

    // Fixed markers land at the landmark xy, at the midplane z
    assert_eq!(payload.fixed_positions.len(), 2);
    assert_eq!(payload.fixed_positions[0], [-40.0, -23.0, 3.0]);
    assert_eq!(payload.load_position, Some([0.0, 27.0, 3.0]));

    assert_eq!(payload.load_direction, [0.0, 0.0, -1.0]);
    assert!((payload.force_magnitude - 100.0).abs() < 1e-12);
    assert!((payload.max_stress - result.max_stress).abs() < f64::EPSILON);
}
