//! MDL CLI commands
//!
//! Commands for inspecting, dumping, and batch-loading MDL files.

use std::io::Write;
use std::path::Path;
use std::time::Instant;

use console::style;

use crate::batch::{find_mdl_files, load_models};
use crate::cli::progress::{CUBE, DISK, LOOKING_GLASS, batch_bar, print_done, print_step};
use crate::formats::mdl::{LoadOptions, MdlInfo, inspect_mdl, read_mdl};

/// Inspect an MDL file and display its structure.
pub fn inspect(path: &Path, json: bool) -> anyhow::Result<()> {
    let info = inspect_mdl(path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Inspecting MDL file: {}", path.display());
    println!();
    print_summary(&info);
    Ok(())
}

fn print_summary(info: &MdlInfo) {
    println!("MDL File Information");
    println!("====================");
    println!("Name:        {}", info.name);
    println!("Supermodel:  {}", info.supermodel);
    println!("Game:        {:?}", info.game);
    println!("Platform:    {:?}", info.platform);
    println!("Class:       {:?}", info.classification);
    println!(
        "Nodes:       {} (header declares {})",
        info.node_count, info.declared_node_count
    );
    println!("Animations:  {}", info.animation_count);
    println!(
        "Geometry:    {} meshes, {} vertices, {} faces",
        info.mesh_count, info.total_vertices, info.total_faces
    );
    println!();

    println!("Node types:");
    for (node_type, count) in &info.node_types {
        println!("  {node_type:<12} {count}");
    }
    println!();

    println!("Node tree:");
    println!("----------");
    for node in &info.nodes {
        let indent = "  ".repeat(node.depth + 1);
        let mut line = format!("{indent}{} ({})", node.name, node.node_type);
        if node.vertex_count > 0 || node.face_count > 0 {
            line.push_str(&format!(
                " - {} vertices, {} faces",
                node.vertex_count, node.face_count
            ));
        }
        if let Some(texture) = &node.texture {
            line.push_str(&format!(" [{texture}]"));
        }
        if !node.controller_types.is_empty() {
            line.push_str(&format!(" {{controllers: {:?}}}", node.controller_types));
        }
        println!("{line}");
    }
}

/// Decode an MDL file and write the full model as JSON.
pub fn dump(path: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let model = read_mdl(path)?;
    let json = serde_json::to_string_pretty(&model)?;

    match output {
        Some(output) => {
            std::fs::write(output, json)?;
            println!("{DISK}Written to: {}", output.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

/// Decode every MDL file under a directory in parallel.
pub fn batch(dir: &Path, structure_only: bool, max_depth: usize, quiet: bool) -> anyhow::Result<()> {
    let start = Instant::now();

    if !quiet {
        print_step(1, 2, LOOKING_GLASS, &format!("Scanning {}...", dir.display()));
    }
    let files = find_mdl_files(dir);
    if files.is_empty() {
        println!("No MDL files found in {}", dir.display());
        return Ok(());
    }

    if !quiet {
        print_step(2, 2, CUBE, &format!("Loading {} models...", files.len()));
    }
    let options = LoadOptions::new()
        .with_read_vertices(!structure_only)
        .with_max_depth(max_depth);

    let pb = if quiet {
        None
    } else {
        Some(batch_bar(files.len() as u64)?)
    };
    let result = load_models(&files, &options, |progress| {
        if let Some(pb) = &pb {
            pb.set_position(progress.current as u64);
            if let Some(ref name) = progress.current_file {
                pb.set_message(name.clone());
            }
        }
    });
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    println!();
    println!("Load complete:");
    println!("  Success: {}", style(result.success_count).green());
    println!("  Failed: {}", style(result.fail_count).red());

    if result.fail_count > 0 {
        println!();
        println!("Failures:");
        for (path, message) in &result.failures {
            let display = path.strip_prefix(dir).unwrap_or(path);
            println!("  {}: {message}", display.display());
        }
    }

    if !quiet {
        println!();
        print_done(start.elapsed());
    }
    Ok(())
}
