//! rugo CLI - mesh surface roughness analyzer
//!
//! Loads a GLB mesh, runs the roughness pipeline, and reports Sa/Sq/Sz
//! either as text or as the JSON document viewers consume.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use rugo_core::{analyze, AnalyzeConfig, SelectionConfig};
use rugo_materials::Material;
use rugo_mesh::{load_glb, MeshData};

#[derive(Parser)]
#[command(name = "rugo")]
#[command(about = "Geometric surface roughness from triangle meshes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the top-surface roughness of a mesh
    Analyze {
        /// Input mesh file (.glb or .gltf)
        file: PathBuf,
        /// Print the full JSON report instead of a text summary
        #[arg(long)]
        json: bool,
        /// Native length unit of the mesh; metrics are reported in meters
        #[arg(long, value_enum, default_value_t = Units::Mm)]
        units: Units,
        /// Height percentile for the strict reference pass
        #[arg(long, default_value_t = 85.0)]
        ref_height_pct: f64,
        /// Height percentile for the relaxed measurement pass
        #[arg(long, default_value_t = 75.0)]
        meas_height_pct: f64,
        /// Normal alignment threshold for the reference pass
        #[arg(long, default_value_t = 0.9)]
        ref_normal_thresh: f64,
        /// Normal alignment threshold for the measurement pass
        #[arg(long, default_value_t = 0.75)]
        meas_normal_thresh: f64,
        /// Material table to attach to the report
        #[arg(long, default_value = "AlSi10Mg")]
        material: String,
    },
    /// Display information about a mesh file
    Info {
        /// Input mesh file (.glb or .gltf)
        file: PathBuf,
    },
}

/// Native length unit of the input mesh.
#[derive(Clone, Copy, ValueEnum)]
enum Units {
    /// Millimeters (the usual 3D-printing export unit)
    Mm,
    /// Meters
    M,
}

impl Units {
    /// Conversion factor to meters, the report unit.
    fn scale_to_meters(self) -> f64 {
        match self {
            Units::Mm => 1e-3,
            Units::M => 1.0,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            file,
            json,
            units,
            ref_height_pct,
            meas_height_pct,
            ref_normal_thresh,
            meas_normal_thresh,
            material,
        } => {
            let config = AnalyzeConfig {
                selection: SelectionConfig {
                    ref_height_pct,
                    meas_height_pct,
                    ref_normal_thresh,
                    meas_normal_thresh,
                },
                unit_scale: units.scale_to_meters(),
            };
            run_analyze(&file, &config, &material, json)?;
        }
        Commands::Info { file } => {
            show_info(&file)?;
        }
    }

    Ok(())
}

fn run_analyze(
    file: &PathBuf,
    config: &AnalyzeConfig,
    material_name: &str,
    json: bool,
) -> Result<()> {
    let material = Material::by_name(material_name)
        .with_context(|| format!("unknown material: {material_name}"))?;

    let mesh = load_glb(file).with_context(|| format!("loading {}", file.display()))?;
    let report = analyze(&mesh.vertices, &mesh.normals, config)
        .with_context(|| format!("analyzing {}", file.display()))?;

    if json {
        let doc = json_report(&mesh, &report, material);
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        println!("Mesh: {}", file.display());
        println!(
            "  {} vertices, {} faces",
            mesh.num_vertices(),
            mesh.num_faces()
        );
        println!(
            "  reference set: {} vertices, measurement set: {} vertices",
            report.selection.reference_indices.len(),
            report.selection.measurement_indices.len()
        );
        println!("Roughness (m):");
        println!("  Sa = {:.6e}", report.roughness.sa);
        println!("  Sq = {:.6e}", report.roughness.sq);
        println!("  Sz = {:.6e}", report.roughness.sz);
        println!("Material: {}", material.name);
    }

    Ok(())
}

/// Assemble the wire-format report: units, material, metrics, the mesh
/// for display, and the per-vertex roughness field over the measurement
/// set.
fn json_report(
    mesh: &MeshData,
    report: &rugo_core::RoughnessReport,
    material: &Material,
) -> serde_json::Value {
    let residuals = &report.roughness.residuals;
    let (min, max) = residuals.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(lo, hi), &r| (lo.min(r), hi.max(r)),
    );

    serde_json::json!({
        "units": "m",
        "material": material,
        "metrics": {
            "Sa": report.roughness.sa,
            "Sq": report.roughness.sq,
            "Sz": report.roughness.sz,
        },
        "orientation": report.orientation,
        "mesh": {
            "vertices": mesh.vertices.iter().map(|v| [v.x, v.y, v.z]).collect::<Vec<_>>(),
            "faces": mesh.faces,
        },
        "roughness": {
            "mapping": "vertex",
            "values": residuals,
            "indices": report.selection.measurement_indices,
            "min": min,
            "max": max,
        },
    })
}

fn show_info(file: &PathBuf) -> Result<()> {
    let mesh = load_glb(file).with_context(|| format!("loading {}", file.display()))?;

    println!("Mesh: {}", file.display());
    println!("  vertices: {}", mesh.num_vertices());
    println!("  faces:    {}", mesh.num_faces());
    if let Some((min, max)) = mesh.bounds() {
        println!(
            "  bounds:   [{:.3}, {:.3}, {:.3}] .. [{:.3}, {:.3}, {:.3}]",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }

    match rugo_core::detect_orientation(&mesh.vertices) {
        Ok(orientation) => {
            let axis = orientation.height_axis;
            println!(
                "  height axis: [{:.4}, {:.4}, {:.4}]",
                axis.x, axis.y, axis.z
            );
            let (lo, hi) = orientation.height_range;
            println!("  height range: {:.4}", hi - lo);
        }
        Err(err) => println!("  orientation: {err}"),
    }

    Ok(())
}
