use crate::{datatypes::Vertex, error::StressmapError};

/// An immutable triangulated surface mesh.
///
/// Nodes are 3D points; elements are index triples into the node list. Every
/// element index is validated against the node count at construction, so
/// downstream stages can index without bounds anxiety.
#[derive(Debug, Clone)]
pub struct Mesh {
    nodes: Vec<Vertex>,
    elements: Vec<[usize; 3]>,
}

impl Mesh {
    /// Builds a mesh, rejecting any element that references a missing node
    ///
    /// # Arguments
    /// * `nodes` - The node coordinate list
    /// * `elements` - Triangles as node index triples
    ///
    /// # Returns
    /// A validated Mesh instance
    pub fn new(nodes: Vec<Vertex>, elements: Vec<[usize; 3]>) -> Result<Mesh, StressmapError> {
        for (i, element) in elements.iter().enumerate() {
            for idx in element {
                if *idx >= nodes.len() {
                    return Err(StressmapError::Input(format!(
                        "Element {} references node {} but mesh has only {} nodes",
                        i,
                        idx,
                        nodes.len()
                    )));
                }
            }
        }

        Ok(Mesh { nodes, elements })
    }

    pub fn nodes(&self) -> &[Vertex] {
        &self.nodes
    }

    pub fn elements(&self) -> &[[usize; 3]] {
        &self.elements
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Bounding-box extent along x
    pub fn x_extent(&self) -> f64 {
        let (min, max) = self.axis_bounds(|v| v.x);
        max - min
    }

    /// Bounding-box extent along y
    pub fn y_extent(&self) -> f64 {
        let (min, max) = self.axis_bounds(|v| v.y);
        max - min
    }

    /// Bounding-box extent along z; doubles as the effective plate thickness
    pub fn z_extent(&self) -> f64 {
        let (min, max) = self.axis_bounds(|v| v.z);
        max - min
    }

    pub fn z_min(&self) -> f64 {
        self.axis_bounds(|v| v.z).0
    }

    pub fn z_max(&self) -> f64 {
        self.axis_bounds(|v| v.z).1
    }

    /// Midplane z coordinate, used to place landmark markers in 3D
    pub fn z_mid(&self) -> f64 {
        let (min, max) = self.axis_bounds(|v| v.z);
        (min + max) / 2.0
    }

    pub fn mean_y(&self) -> f64 {
        if self.nodes.is_empty() {
            return 0.0;
        }
        self.nodes.iter().map(|v| v.y).sum::<f64>() / self.nodes.len() as f64
    }

    fn axis_bounds(&self, axis: impl Fn(&Vertex) -> f64) -> (f64, f64) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for node in &self.nodes {
            let c = axis(node);
            if c < min {
                min = c;
            }
            if c > max {
                max = c;
            }
        }
        if self.nodes.is_empty() {
            (0.0, 0.0)
        } else {
            (min, max)
        }
    }
}

/// Parses a nodes CSV file into a list of vertices
///
/// The file must carry `x`, `y`, and `z` columns; column order is resolved
/// from the header line.
///
/// # Arguments
/// * `csv_file` - The path to the input csv file
///
/// # Returns
/// An ordered vector of Vertex objects
pub fn parse_nodes_csv(csv_file: &str) -> Result<Vec<Vertex>, StressmapError> {
    let contents = match std::fs::read_to_string(csv_file) {
        Ok(c) => c,
        Err(_err) => {
            return Err(StressmapError::Input(format!(
                "Unable to open nodes csv file {}",
                csv_file
            )))
        }
    };

    let mut headers: Vec<&str> = Vec::new();
    let mut x_index: usize = 0;
    let mut y_index: usize = 0;
    let mut z_index: usize = 0;
    let mut vertices: Vec<Vertex> = Vec::new();

    for line in contents.split("\n") {
        if line.is_empty() {
            continue;
        }

        if headers.len() == 0 {
            headers = line.split(",").map(|x| x.trim()).collect();

            if !headers.contains(&"x") || !headers.contains(&"y") || !headers.contains(&"z") {
                return Err(StressmapError::Input(
                    "Error in nodes csv file: Missing x, y, and/or z field".to_string(),
                ));
            }

            x_index = headers.iter().position(|f| f == &"x").unwrap();
            y_index = headers.iter().position(|f| f == &"y").unwrap();
            z_index = headers.iter().position(|f| f == &"z").unwrap();
        } else {
            let mut line_contents: Vec<f64> = Vec::new();
            for field in line.split(",") {
                match field.trim().parse() {
                    Ok(v) => line_contents.push(v),
                    Err(_err) => {
                        return Err(StressmapError::Input(format!(
                            "Non-float value in nodes csv: {}",
                            field
                        )))
                    }
                }
            }

            if line_contents.len() != headers.len() {
                return Err(StressmapError::Input(format!(
                    "Nodes csv row has {} fields, expected {}",
                    line_contents.len(),
                    headers.len()
                )));
            }

            vertices.push(Vertex {
                x: line_contents[x_index],
                y: line_contents[y_index],
                z: line_contents[z_index],
            });
        }
    }

    Ok(vertices)
}

/// Parses an elements CSV file into triangle index triples
///
/// The file must carry `n0`, `n1`, and `n2` columns; column order is resolved
/// from the header line.
///
/// # Arguments
/// * `csv_file` - The path to the input csv file
///
/// # Returns
/// An ordered vector of node index triples
pub fn parse_elements_csv(csv_file: &str) -> Result<Vec<[usize; 3]>, StressmapError> {
    let contents = match std::fs::read_to_string(csv_file) {
        Ok(c) => c,
        Err(_err) => {
            return Err(StressmapError::Input(format!(
                "Unable to open elements csv file {}",
                csv_file
            )))
        }
    };

    let mut headers: Vec<&str> = Vec::new();
    let mut n0_index: usize = 0;
    let mut n1_index: usize = 0;
    let mut n2_index: usize = 0;
    let mut elements: Vec<[usize; 3]> = Vec::new();

    for line in contents.split("\n") {
        if line.is_empty() {
            continue;
        }

        if headers.len() == 0 {
            headers = line.split(",").map(|x| x.trim()).collect();

            if !headers.contains(&"n0") || !headers.contains(&"n1") || !headers.contains(&"n2") {
                return Err(StressmapError::Input(
                    "Error in elements csv file: Missing n0, n1, and/or n2 field".to_string(),
                ));
            }

            n0_index = headers.iter().position(|f| f == &"n0").unwrap();
            n1_index = headers.iter().position(|f| f == &"n1").unwrap();
            n2_index = headers.iter().position(|f| f == &"n2").unwrap();
        } else {
            let mut line_contents: Vec<usize> = Vec::new();
            for field in line.split(",") {
                match field.trim().parse() {
                    Ok(v) => line_contents.push(v),
                    Err(_err) => {
                        return Err(StressmapError::Input(format!(
                            "Non-integer value in elements csv: {}",
                            field
                        )))
                    }
                }
            }

            if line_contents.len() != headers.len() {
                return Err(StressmapError::Input(format!(
                    "Elements csv row has {} fields, expected {}",
                    line_contents.len(),
                    headers.len()
                )));
            }

            elements.push([
                line_contents[n0_index],
                line_contents[n1_index],
                line_contents[n2_index],
            ]);
        }
    }

    Ok(elements)
}

/// Loads a mesh from the node/element CSV pair
///
/// # Arguments
/// * `nodes_csv` - Path to the nodes csv (x,y,z columns)
/// * `elements_csv` - Path to the elements csv (n0,n1,n2 columns)
///
/// # Returns
/// A validated Mesh instance
pub fn load_mesh(nodes_csv: &str, elements_csv: &str) -> Result<Mesh, StressmapError> {
    let nodes = parse_nodes_csv(nodes_csv)?;
    let elements = parse_elements_csv(elements_csv)?;

    let mesh = Mesh::new(nodes, elements)?;
    println!(
        "info: loaded {} nodes and {} elements",
        mesh.node_count(),
        mesh.element_count()
    );

    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> Vec<Vertex> {
        vec![
            Vertex {
                x: 0.0,
                y: 0.0,
                z: 0.0,
            },
            Vertex {
                x: 1.0,
                y: 0.0,
                z: 0.0,
            },
            Vertex {
                x: 0.0,
                y: 1.0,
                z: 2.0,
            },
        ]
    }

    #[test]
    fn rejects_out_of_range_element_index() {
        let result = Mesh::new(unit_triangle(), vec![[0, 1, 3]]);
        assert!(matches!(result, Err(StressmapError::Input(_))));
    }

    #[test]
    fn extents_follow_bounding_box() {
        let mesh = Mesh::new(unit_triangle(), vec![[0, 1, 2]]).unwrap();
        assert!((mesh.x_extent() - 1.0).abs() < 1e-12);
        assert!((mesh.y_extent() - 1.0).abs() < 1e-12);
        assert!((mesh.z_extent() - 2.0).abs() < 1e-12);
        assert!((mesh.z_mid() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_mesh_has_zero_extents() {
        let mesh = Mesh::new(Vec::new(), Vec::new()).unwrap();
        assert_eq!(mesh.x_extent(), 0.0);
        assert_eq!(mesh.z_extent(), 0.0);
    }
}
