//! LOD report for a procedural tree
//!
//! Builds a two-material model (a bark trunk and a ring of leaf cards),
//! runs the LOD pipeline over it and prints one row per level.
//!
//! ```text
//! cargo run --bin lod_report -- --levels 4 --mode 1
//! RUST_LOG=lodcrate_simplification=debug cargo run --bin lod_report
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lodcrate_core::{MaterialId, Point3f, SubMesh, Transform3D, TriangleMesh, UnitQuaternion, Vector3};
use lodcrate_lod::{LodConfig, LodPipeline, MeshFragment};
use lodcrate_simplification::DecimationMode;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Generate and summarize LOD levels for a procedural tree.
#[derive(Parser, Debug)]
#[command(name = "lod_report", about = "Print the LOD table of a procedural tree")]
struct Args {
    /// JSON configuration file (overrides --levels and --mode).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Decimated levels per material.
    #[arg(long, default_value_t = 3)]
    levels: usize,

    /// Traversal mode: 0 = smallest-first, 1 = distributed.
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
    mode: u8,

    /// Segments around the trunk.
    #[arg(long, default_value_t = 16)]
    segments: usize,

    /// Print the summary as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();
}

/// Tapered trunk: the body is sub-mesh 0, the top cap sub-mesh 1.
fn build_trunk(segments: usize, rings: usize) -> TriangleMesh {
    let mut mesh = TriangleMesh::new();
    let stride = segments + 1;

    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let radius = 0.35 - 0.15 * v;
        for seg in 0..=segments {
            let u = seg as f32 / segments as f32;
            let angle = u * std::f32::consts::TAU;
            mesh.add_vertex(
                Point3f::new(angle.cos() * radius, v * 5.0, angle.sin() * radius),
                [u, v * 4.0],
            );
        }
    }
    for ring in 0..rings {
        for seg in 0..segments {
            let a = ring * stride + seg;
            let c = a + stride;
            mesh.add_face([a, c, a + 1]);
            mesh.add_face([a + 1, c, c + 1]);
        }
    }
    let body_faces = mesh.face_count();

    // Cap fan over the top ring
    let top = rings * stride;
    let center = mesh.add_vertex(Point3f::new(0.0, 5.0, 0.0), [0.5, 0.5]);
    for seg in 0..segments {
        mesh.add_face([top + seg, center, top + seg + 1]);
    }

    mesh.submeshes = vec![
        SubMesh::new(0, body_faces),
        SubMesh::new(body_faces, segments),
    ];
    mesh
}

/// Subdivided leaf card in its local frame, stem at the origin
fn build_leaf_card(subdivisions: usize) -> TriangleMesh {
    let n = subdivisions.max(1);
    let mut mesh = TriangleMesh::new();
    for y in 0..=n {
        for x in 0..=n {
            let (u, v) = (x as f32 / n as f32, y as f32 / n as f32);
            mesh.add_vertex(Point3f::new((u - 0.5) * 0.8, v * 1.2, 0.0), [u, v]);
        }
    }
    for y in 0..n {
        for x in 0..n {
            let a = y * (n + 1) + x;
            mesh.add_face([a, a + 1, a + n + 2]);
            mesh.add_face([a, a + n + 2, a + n + 1]);
        }
    }
    mesh
}

fn build_tree(segments: usize) -> Vec<MeshFragment> {
    let bark = MaterialId::from("bark");
    let end_grain = MaterialId::from("end_grain");
    let leaf = MaterialId::from("leaf");

    let mut fragments = vec![MeshFragment::new(
        build_trunk(segments, segments / 2 + 2),
        vec![bark, end_grain],
    )];

    let card = build_leaf_card(4);
    let cards = (segments / 2).max(3);
    for i in 0..cards {
        let yaw = i as f32 / cards as f32 * std::f32::consts::TAU;
        let height = 3.0 + 1.5 * (i % 3) as f32 / 2.0;
        let pose = Transform3D::from_translation_rotation(
            Vector3::new(yaw.cos() * 0.3, height, yaw.sin() * 0.3),
            UnitQuaternion::from_euler_angles(0.0, -yaw, -0.7),
        );
        fragments.push(MeshFragment::single(card.clone(), leaf.clone()).with_transform(pose));
    }
    fragments
}

fn build_config(args: &Args, material_count: usize) -> Result<LodConfig> {
    if let Some(path) = &args.config {
        return LodConfig::load(path)
            .with_context(|| format!("Failed to load LOD config from {}", path.display()));
    }
    let mode = DecimationMode::try_from(args.mode).context("Invalid decimation mode")?;
    let ratios: Vec<f32> = (1..=args.levels)
        .map(|k| k as f32 / (args.levels + 1) as f32)
        .collect();
    Ok(LodConfig::uniform(material_count, &ratios, mode, 0.6, 0.02))
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let fragments = build_tree(args.segments.max(3));
    info!(fragments = fragments.len(), "Built procedural tree");

    // bark, end_grain, leaf
    let config = build_config(&args, 3)?;
    let pipeline = LodPipeline::new(config).context("Invalid LOD configuration")?;
    let spec = pipeline.run(&fragments).context("LOD generation failed")?;
    let summary = spec.summary();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("LOD report");
    println!("==========");
    if let Some(entry) = spec.entries.first() {
        let names: Vec<&str> = entry.materials.iter().map(MaterialId::as_str).collect();
        println!("Materials: {}", names.join(", "));
    }
    println!("{:>5}  {:>9}  {:>7}  {:>8}", "level", "threshold", "faces", "vertices");
    for row in &summary {
        println!(
            "{:>5}  {:>9.4}  {:>7}  {:>8}",
            row.level, row.threshold, row.faces, row.vertices
        );
    }

    Ok(())
}
