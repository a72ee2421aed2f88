use std::fmt::Display;

#[derive(Debug)]
pub enum StressmapError {
    Input(String),
    UnknownMaterial(String),
    EmptyBoundarySet(String),
}

impl Display for StressmapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (err_name, value) = match self {
            StressmapError::Input(v) => ("Input", v),
            StressmapError::UnknownMaterial(v) => ("Unknown Material", v),
            StressmapError::EmptyBoundarySet(v) => ("Empty Boundary Set", v),
        };

        write!(f, "{} error: {}", err_name, value)
    }
}

impl std::error::Error for StressmapError {}
