// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: import a CityJSON file and report what it contains
//!
//! Usage:
//!   cityjson-import <file.city.json> [options]

use cityjson_lite_processing::{
    CityJsonImporter, ImportConfig, ImportResult, MaterialStrategy,
};
use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::process::ExitCode;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            env::var("RUST_LOG").unwrap_or_else(|_| "info,cityjson_lite_processing=debug".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return ExitCode::SUCCESS;
    }

    let input_path = &args[1];

    // Flags override the environment
    let mut config = ImportConfig::from_env();
    let mut json_path: Option<String> = None;
    let mut triangulate = false;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--materials" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    eprintln!("--materials needs a value");
                    return ExitCode::FAILURE;
                };
                match value.parse::<MaterialStrategy>() {
                    Ok(strategy) => config = config.with_materials(strategy),
                    Err(e) => {
                        eprintln!("{}", e);
                        return ExitCode::FAILURE;
                    }
                }
            }
            "--sequential" => {
                config = config.with_parallel(false);
            }
            "--json" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    eprintln!("--json needs an output path");
                    return ExitCode::FAILURE;
                };
                json_path = Some(value.clone());
            }
            "--triangulate" => {
                triangulate = true;
            }
            other => {
                eprintln!("Unknown option: {}", other);
                print_usage();
                return ExitCode::FAILURE;
            }
        }
        i += 1;
    }

    println!("=== CityJSON Import ===");
    println!("Input: {}", input_path);
    println!("Materials: {}", config.materials);
    println!("Parallel: {}", config.parallel);
    println!();

    let mut importer = CityJsonImporter::new(config);
    let result = match importer.import_path(input_path) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Import failed ({:?}): {}", e.kind(), e);
            return ExitCode::FAILURE;
        }
    };

    print_summary(&result);

    if triangulate {
        let mut triangles = 0;
        for mesh in &result.meshes {
            match mesh.to_triangle_mesh() {
                Ok(tri) => triangles += tri.triangle_count(),
                Err(e) => eprintln!("  {}: triangulation failed: {}", mesh.name, e),
            }
        }
        println!("Triangles: {}", triangles);
    }

    if let Some(path) = json_path {
        let written = File::create(&path)
            .map_err(|e| e.to_string())
            .and_then(|file| {
                serde_json::to_writer_pretty(BufWriter::new(file), &result)
                    .map_err(|e| e.to_string())
            });
        match written {
            Ok(()) => println!("Wrote {}", path),
            Err(e) => {
                eprintln!("Failed to write {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

fn print_summary(result: &ImportResult) {
    let stats = &result.stats;
    if let Some(version) = &result.version {
        println!("CityJSON version: {}", version);
    }
    println!("Objects:   {}", stats.objects);
    println!("Meshes:    {}", stats.meshes);
    println!("Faces:     {} ({} empty surfaces skipped)", stats.faces, stats.skipped_surfaces);
    println!("Vertices:  {}", stats.vertices);
    println!("Materials: {}", stats.materials);
    println!(
        "Shift:     ({:.3}, {:.3}, {:.3})",
        result.shift.x, result.shift.y, result.shift.z
    );
    println!(
        "Time:      {} ms (decode {} ms, resolve {} ms, hierarchy {} ms)",
        stats.total_time_ms, stats.decode_time_ms, stats.resolve_time_ms, stats.hierarchy_time_ms
    );

    let roots = result.hierarchy.roots().count();
    println!("Roots:     {}", roots);

    let groups = result.lod_groups();
    if !groups.is_empty() {
        println!();
        println!("LoD groups:");
        for (name, members) in &groups {
            println!("  {}: {} meshes", name, members.len());
        }
    }

    if !result.diagnostics.is_empty() {
        println!();
        println!("Diagnostics:");
        for diagnostic in &result.diagnostics {
            println!("  {}", diagnostic);
        }
    }
}

fn print_usage() {
    eprintln!("Usage: cityjson-import <file.city.json> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --materials <strategy>  surfaces, reuse or type (default: reuse)");
    eprintln!("  --sequential            Decode objects on one thread");
    eprintln!("  --json <path>           Write the full result as JSON");
    eprintln!("  --triangulate           Triangulate every mesh and report triangle count");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  CITYJSON_MATERIALS      Default material strategy");
    eprintln!("  CITYJSON_PARALLEL       true/false, default true");
    eprintln!("  RUST_LOG                Log filter");
}
