use clap::Parser;
use json::JsonValue;
use nalgebra::Vector3;

use stressmap::{
    datatypes::{AnalysisOptions, LandmarkPoint},
    error::StressmapError,
    materials::MaterialLibrary,
    mesh, post_processor, run_analysis,
};

#[derive(Parser)]
#[command(
    name = "stressmap",
    about = "Approximate structural analysis of triangulated surface meshes"
)]
struct Cli {
    /// Nodes csv of the analysis mesh (x,y,z columns)
    nodes_csv: Option<String>,

    /// Elements csv of the analysis mesh (n0,n1,n2 columns)
    elements_csv: Option<String>,

    /// Job json with landmarks, boundary assignment, force, and material
    job: Option<String>,

    /// Print the result record as JSON instead of the text report
    #[arg(long)]
    json: bool,

    /// Nodes csv of a separate render mesh for the viewer payload
    #[arg(long)]
    render_nodes: Option<String>,

    /// Elements csv of the render mesh
    #[arg(long, requires = "render_nodes")]
    render_elements: Option<String>,

    /// Write the viewer payload json to this path
    #[arg(long)]
    viz_json: Option<String>,

    /// List available materials and exit
    #[arg(long)]
    list_materials: bool,
}

struct Job {
    landmarks: Vec<LandmarkPoint>,
    fixed_landmarks: Vec<usize>,
    load_landmark: usize,
    force: Vector3<f64>,
    material: String,
    options: AnalysisOptions,
}

/// Parses the job json, registering any custom materials into the library
///
/// # Arguments
/// * `job_file` - The path to the job json file
/// * `library` - The material library to extend with custom entries
///
/// # Returns
/// A Job instance
fn load_job_file(job_file: &str, library: &mut MaterialLibrary) -> Result<Job, StressmapError> {
    let file_string = match std::fs::read_to_string(job_file) {
        Ok(f) => f,
        Err(_err) => {
            return Err(StressmapError::Input(format!(
                "Unable to open job file {}",
                job_file
            )))
        }
    };

    let job_json = match json::parse(&file_string) {
        Ok(f) => f,
        Err(err) => {
            return Err(StressmapError::Input(format!("Error in job json: {err}")))
        }
    };

    for key in ["landmarks", "fixed_landmarks", "load_landmark", "force", "material"] {
        if !job_json.has_key(key) {
            return Err(StressmapError::Input(format!(
                "Job json missing {} field",
                key
            )));
        }
    }

    let mut landmarks: Vec<LandmarkPoint> = Vec::new();
    for entry in job_json["landmarks"].members() {
        match (entry[0].as_f64(), entry[1].as_f64()) {
            (Some(x), Some(y)) => landmarks.push(LandmarkPoint { x, y }),
            _ => {
                return Err(StressmapError::Input(
                    "Bad landmark entry in job json; expected [x, y]".to_owned(),
                ))
            }
        }
    }

    let mut fixed_landmarks: Vec<usize> = Vec::new();
    for entry in job_json["fixed_landmarks"].members() {
        match entry.as_usize() {
            Some(idx) => fixed_landmarks.push(idx),
            None => {
                return Err(StressmapError::Input(
                    "Bad fixed_landmarks entry in job json; expected an index".to_owned(),
                ))
            }
        }
    }

    let load_landmark = match job_json["load_landmark"].as_usize() {
        Some(idx) => idx,
        None => {
            return Err(StressmapError::Input(
                "Bad load_landmark in job json; expected an index".to_owned(),
            ))
        }
    };

    let force_json = &job_json["force"];
    let force = match (
        force_json[0].as_f64(),
        force_json[1].as_f64(),
        force_json[2].as_f64(),
    ) {
        (Some(fx), Some(fy), Some(fz)) => Vector3::new(fx, fy, fz),
        _ => {
            return Err(StressmapError::Input(
                "Bad force in job json; expected [fx, fy, fz]".to_owned(),
            ))
        }
    };

    let material = match job_json["material"].as_str() {
        Some(m) => m.to_string(),
        None => {
            return Err(StressmapError::Input(
                "Bad material in job json; expected a string".to_owned(),
            ))
        }
    };

    let mut options = AnalysisOptions::default();
    if let Some(radius) = job_json["hole_radius"].as_f64() {
        options.hole_radius = radius;
    }
    if let Some(limit) = job_json["displacement_limit"].as_f64() {
        options.displacement_limit = limit;
    }

    if job_json.has_key("materials") {
        for (key, entry) in job_json["materials"].entries() {
            register_custom_material(library, key, entry)?;
        }
    }

    Ok(Job {
        landmarks,
        fixed_landmarks,
        load_landmark,
        force,
        material,
        options,
    })
}

fn register_custom_material(
    library: &mut MaterialLibrary,
    key: &str,
    entry: &JsonValue,
) -> Result<(), StressmapError> {
    for field in ["elastic_modulus", "poisson_ratio", "yield_strength", "density"] {
        if !entry.has_key(field) {
            return Err(StressmapError::Input(format!(
                "Custom material {} is missing {} field",
                key, field
            )));
        }
    }

    let name = entry["name"].as_str().unwrap_or(key);
    let values: Vec<f64> = ["elastic_modulus", "poisson_ratio", "yield_strength", "density"]
        .iter()
        .map(|field| entry[*field].as_f64())
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(|| {
            StressmapError::Input(format!("Non-float property on custom material {}", key))
        })?;

    library.register(key, name, values[0], values[1], values[2], values[3]);
    println!("info: registered custom material {}", key);

    Ok(())
}

fn run(cli: &Cli) -> Result<(), StressmapError> {
    let mut library = MaterialLibrary::builtin();

    if cli.list_materials {
        println!("Available Materials:\n");
        for (key, material) in library.entries() {
            println!("  {}: {}", key, material.name);
            println!(
                "    E = {} MPa, Yield = {} MPa\n",
                material.elastic_modulus, material.yield_strength
            );
        }
        return Ok(());
    }

    let (nodes_csv, elements_csv, job_file) = match (&cli.nodes_csv, &cli.elements_csv, &cli.job) {
        (Some(n), Some(e), Some(j)) => (n, e, j),
        _ => {
            return Err(StressmapError::Input(
                "usage: stressmap <nodes_csv> <elements_csv> <job_json> (or --list-materials)"
                    .to_owned(),
            ))
        }
    };

    let mesh = mesh::load_mesh(nodes_csv, elements_csv)?;
    let job = load_job_file(job_file, &mut library)?;

    let result = run_analysis(
        &mesh,
        &job.landmarks,
        &job.fixed_landmarks,
        job.load_landmark,
        &job.force,
        &job.material,
        &library,
        &job.options,
    )?;

    if cli.json {
        println!("{}", post_processor::json_report(&result)?);
    } else {
        post_processor::print_report(&result);
    }

    if let Some(viz_path) = &cli.viz_json {
        let render_mesh = match (&cli.render_nodes, &cli.render_elements) {
            (Some(n), Some(e)) => Some(mesh::load_mesh(n, e)?),
            _ => None,
        };
        // Without a separate render mesh the payload resamples onto the
        // analysis mesh itself, which is the identity transfer.
        let render_mesh = render_mesh.as_ref().unwrap_or(&mesh);

        let payload = post_processor::visualization_payload(
            &result,
            &mesh,
            render_mesh,
            &job.landmarks,
            &job.fixed_landmarks,
            Some(job.load_landmark),
            &job.force,
        )?;

        let payload_json = match serde_json::to_string(&payload) {
            Ok(s) => s,
            Err(err) => {
                return Err(StressmapError::Input(format!(
                    "Failed to serialize viewer payload: {err}"
                )))
            }
        };
        if let Err(err) = std::fs::write(viz_path, payload_json) {
            return Err(StressmapError::Input(format!(
                "Failed to write viewer payload to {}: {}",
                viz_path, err
            )));
        }
        println!("info: wrote viewer payload to {}", viz_path);
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
