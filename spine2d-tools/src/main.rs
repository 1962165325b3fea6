//! spine2d-tool - merge, rename and inspect Spine skeleton JSON from the command line.

use spine2d_doc::{RenameBoneOptions, SkeletonDocument, SkeletonJson};
use spine2d_tools::{EditorConfig, Result, SpineEditor, alpha};
use std::env;
use std::path::Path;
use std::process::ExitCode;

fn print_help() {
    println!("spine2d-tool - edit Spine 3.8 skeleton JSON");
    println!();
    println!("Usage: spine2d-tool [-v] <command> [args]");
    println!();
    println!("Document commands:");
    println!("  merge <primary.json> <secondary.json> <out.json>");
    println!("  rename <kind> <file.json> <old> <new> <out.json>");
    println!("  prefix <kind> <file.json> <prefix> <out.json>");
    println!("  durations <file.json>");
    println!("  extend <file.json> <animation> <count> <out.json>");
    println!();
    println!("  kind: bone | slot | attachment | animation | ik | transform | path");
    println!();
    println!("Texture commands:");
    println!("  unpremultiply <in.png> <out.png>");
    println!();
    println!("Editor commands (config: {{ \"editor\": ..., \"export_settings\": ... }}):");
    println!("  rescale <config.json> <skeleton> <out.spine> <scale>");
    println!("  export-json <config.json> <project> <out.json>");
    println!("  unpack <config.json> <png folder> <out> <atlas>");
}

fn load(path: &str) -> Result<SkeletonDocument> {
    Ok(SkeletonDocument::from_wire(SkeletonJson::from_json_file(path)?)?)
}

fn save(doc: &SkeletonDocument, path: &str) -> Result<()> {
    doc.to_wire()?.to_json_file(path)?;
    log::info!("wrote '{path}'");
    Ok(())
}

fn editor(config: &str) -> Result<SpineEditor> {
    Ok(SpineEditor::new(EditorConfig::from_json_file(config)?))
}

/// Applies `rename` to one identifier class. Returns `false` for an unknown kind.
fn rename_kind(
    doc: &mut SkeletonDocument,
    kind: &str,
    rename: impl Fn(&str) -> String,
) -> Result<bool> {
    match kind {
        "bone" => doc.rename_bones(rename, RenameBoneOptions::default())?,
        "slot" => doc.rename_slots(rename),
        "attachment" => doc.rename_attachments(rename),
        "animation" => doc.rename_animations(rename),
        "ik" => doc.rename_ik_constraints(rename),
        "transform" => doc.rename_transform_constraints(rename),
        "path" => doc.rename_path_constraints(rename),
        _ => return Ok(false),
    }
    Ok(true)
}

fn usage(message: &str) -> ExitCode {
    eprintln!("Error: {message}");
    eprintln!("Run 'spine2d-tool help' for usage.");
    ExitCode::from(2)
}

fn run(args: &[&str]) -> Result<Option<ExitCode>> {
    match args {
        ["merge", primary, secondary, out] => {
            let mut doc = load(primary)?;
            doc.merge(load(secondary)?)?;
            save(&doc, out)?;
        }
        ["rename", kind, file, old, new, out] => {
            let mut doc = load(file)?;
            let rename = |name: &str| {
                if name == *old {
                    new.to_string()
                } else {
                    name.to_string()
                }
            };
            if !rename_kind(&mut doc, kind, rename)? {
                return Ok(Some(usage(&format!("unknown identifier kind '{kind}'"))));
            }
            save(&doc, out)?;
        }
        ["prefix", kind, file, prefix, out] => {
            let mut doc = load(file)?;
            if !rename_kind(&mut doc, kind, |name| format!("{prefix}{name}"))? {
                return Ok(Some(usage(&format!("unknown identifier kind '{kind}'"))));
            }
            save(&doc, out)?;
        }
        ["durations", file] => {
            let doc = load(file)?;
            for (name, duration) in doc.animation_durations() {
                println!("{name}\t{duration:.4}");
            }
        }
        ["extend", file, animation, count, out] => {
            let Ok(count) = count.parse::<u32>() else {
                return Ok(Some(usage(&format!("invalid repeat count '{count}'"))));
            };
            let mut doc = load(file)?;
            doc.extend_animation(animation, count)?;
            save(&doc, out)?;
        }
        ["unpremultiply", input, output] => {
            alpha::unpremultiply_file(Path::new(input), Path::new(output))?;
        }
        ["rescale", config, skeleton, out, scale] => {
            let Ok(scale) = scale.parse::<f64>() else {
                return Ok(Some(usage(&format!("invalid scale '{scale}'"))));
            };
            editor(config)?.import_and_rescale(Path::new(skeleton), Path::new(out), scale)?;
        }
        ["export-json", config, project, out] => {
            editor(config)?.import_and_export_json(Path::new(project), Path::new(out))?;
        }
        ["unpack", config, folder, out, atlas] => {
            editor(config)?.unpack_texture(Path::new(folder), Path::new(out), Path::new(atlas))?;
        }
        [] | ["help" | "-h" | "--help"] => print_help(),
        [command, ..] => {
            return Ok(Some(usage(&format!(
                "unknown command or wrong arguments for '{command}'"
            ))));
        }
    }
    Ok(None)
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut verbose = false;
    let mut filtered: Vec<&str> = Vec::new();
    for arg in &args {
        match arg.as_str() {
            "-v" | "--verbose" => verbose = true,
            other => filtered.push(other),
        }
    }

    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&filtered) {
        Ok(Some(code)) => code,
        Ok(None) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
