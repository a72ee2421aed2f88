use std::collections::BTreeMap;

use crate::{datatypes::Material, error::StressmapError};

/// An immutable material registry keyed by short name.
///
/// The registry is an explicit value passed into the pipeline rather than
/// global state, so separate analyses can carry separate custom materials.
#[derive(Debug, Clone)]
pub struct MaterialLibrary {
    materials: BTreeMap<String, Material>,
}

impl MaterialLibrary {
    /// Creates an empty library
    pub fn empty() -> MaterialLibrary {
        MaterialLibrary {
            materials: BTreeMap::new(),
        }
    }

    /// Creates a library seeded with the built-in engineering materials
    ///
    /// Elastic moduli and yield strengths are in MPa, densities in kg/m³.
    pub fn builtin() -> MaterialLibrary {
        let mut library = MaterialLibrary::empty();

        library.register("aluminum", "Aluminum 6061-T6", 68900.0, 0.33, 276.0, 2700.0);
        library.register("steel", "Steel AISI 304", 193000.0, 0.29, 215.0, 8000.0);
        library.register("pla", "PLA", 3500.0, 0.36, 50.0, 1240.0);
        library.register("petg", "PETG", 2100.0, 0.37, 28.0, 1270.0);
        library.register("abs", "ABS", 2300.0, 0.35, 40.0, 1050.0);
        library.register("nylon", "Nylon PA12", 2700.0, 0.40, 75.0, 1150.0);

        library
    }

    /// Registers a material under a lookup key, replacing any existing entry
    pub fn register(
        &mut self,
        key: &str,
        name: &str,
        elastic_modulus: f64,
        poisson_ratio: f64,
        yield_strength: f64,
        density: f64,
    ) {
        self.materials.insert(
            key.to_string(),
            Material {
                name: name.to_string(),
                elastic_modulus,
                poisson_ratio,
                yield_strength,
                density,
            },
        );
    }

    /// Looks up a material by key
    ///
    /// # Arguments
    /// * `key` - The short material name, e.g. "aluminum"
    ///
    /// # Returns
    /// The material record, or an UnknownMaterial error listing what is
    /// available
    pub fn get(&self, key: &str) -> Result<&Material, StressmapError> {
        match self.materials.get(key) {
            Some(material) => Ok(material),
            None => Err(StressmapError::UnknownMaterial(format!(
                "{}. Available: {}",
                key,
                self.keys().join(", ")
            ))),
        }
    }

    /// Lists the registered lookup keys in sorted order
    pub fn keys(&self) -> Vec<String> {
        self.materials.keys().cloned().collect()
    }

    /// Iterates registered (key, material) pairs in sorted key order
    pub fn entries(&self) -> impl Iterator<Item = (&String, &Material)> {
        self.materials.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_aluminum_matches_datasheet() {
        let library = MaterialLibrary::builtin();
        let aluminum = library.get("aluminum").unwrap();

        assert_eq!(aluminum.name, "Aluminum 6061-T6");
        assert!((aluminum.elastic_modulus - 68900.0).abs() < f64::EPSILON);
        assert!((aluminum.poisson_ratio - 0.33).abs() < f64::EPSILON);
        assert!((aluminum.yield_strength - 276.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_material_lists_available_keys() {
        let library = MaterialLibrary::builtin();
        let err = library.get("unobtanium").unwrap_err();

        let message = err.to_string();
        assert!(message.contains("unobtanium"));
        assert!(message.contains("aluminum"));
        assert!(message.contains("steel"));
    }

    #[test]
    fn custom_material_overrides_builtin() {
        let mut library = MaterialLibrary::builtin();
        library.register("aluminum", "Aluminum 7075-T6", 71700.0, 0.33, 503.0, 2810.0);

        let aluminum = library.get("aluminum").unwrap();
        assert_eq!(aluminum.name, "Aluminum 7075-T6");
        assert!((aluminum.yield_strength - 503.0).abs() < f64::EPSILON);
    }
}
