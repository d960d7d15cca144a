#![forbid(unsafe_code)]

use std::process::exit;

use saphyr_unity::{from_str_with_options, BudgetReport, Catalogue, Options, Scene};
use tracing_subscriber::EnvFilter;

fn report_budget(report: &BudgetReport) {
    println!(
        "Budget report: {} events, {} documents, {} nodes, depth {}, {} scalar bytes",
        report.events, report.documents, report.nodes, report.max_depth, report.total_scalar_bytes
    );
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load a Unity scene file with the built-in catalogue and list what was decoded.
/// Single parameter is the file name. Set `RUST_LOG=debug` to trace every document.
fn main() {
    init_tracing();

    let path = match std::env::args()
        .nth(1)
        .ok_or("Lists the objects of a Unity scene file. Expected a path to a .unity file as the first argument")
    {
        Ok(path) => path,
        Err(err) => {
            eprintln!("{err}");
            exit(1);
        }
    };

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) => {
            eprintln!("Failed to read {path}: {err}");
            exit(2);
        }
    };

    let options = Options {
        budget_report: Some(report_budget),
        ..Options::default()
    };

    let scene = match from_str_with_options(&content, &Catalogue::unity(), options) {
        Ok(scene) => scene,
        Err(err) => {
            eprintln!("{path} invalid:\n{err}");
            exit(3);
        }
    };

    for object in &scene.objects {
        println!(
            "#{:<4} &{:<12} {:<28} {}",
            object.document,
            object.anchor.as_deref().unwrap_or("-"),
            object.class_name(),
            object.tag.as_deref().unwrap_or("")
        );
    }
    print!("{}", scene.unknown_tags);
    if scene.unresolved_references > 0 {
        println!("{} reference(s) left unresolved", scene.unresolved_references);
    }
    println!("{}", summary(&scene));
}

fn summary(scene: &Scene) -> String {
    format!("Done, loaded {} objects.", scene.objects.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_decoded_objects_only() {
        let yaml = "--- !u!1 &1\nGameObject:\n  m_Name: A\n--- !u!9999 &2\nMystery:\n  m_X: 1\n";
        let yaml = format!("%TAG !u! tag:unity3d.com,2011:\n{yaml}");
        let scene = saphyr_unity::from_str(&yaml, &Catalogue::unity()).unwrap();
        assert_eq!(summary(&scene), "Done, loaded 1 objects.");
    }
}
