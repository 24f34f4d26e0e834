/// Image derivative generator
///
/// Finds which configured sources exist, dispatches every derivative job
/// at once, then waits for all of them before reporting. Nothing is left
/// running when `run` returns.

use std::sync::Arc;
use tokio::task::JoinSet;

use crate::derivative::{loader, plan, processor};
use crate::error::{OptimizeError, Result};
use crate::state::config::Config;
use crate::state::data::{DerivativeKind, DerivativeOutcome, DerivativeSpec, RunReport, SourceImage};
use crate::state::manifest::Manifest;

const RULE_WIDTH: usize = 50;

/// Configured sources that exist as files in `config.source_dir`, in list order
pub fn discover(config: &Config) -> Vec<SourceImage> {
    config
        .sources
        .iter()
        .filter(|name| config.source_dir.join(name).is_file())
        .map(|name| plan::source_image(name, config))
        .collect()
}

/// Run a full pass over the configured sources
///
/// Returns `NoImagesFound` when none of them exist; otherwise a report
/// covering every dispatched derivative, successful or not.
pub async fn run(config: &Config) -> Result<RunReport> {
    config.validate()?;

    println!("🔄 Optimizing existing images only...\n");

    let found = discover(config);
    if found.is_empty() {
        return Err(OptimizeError::NoImagesFound {
            dir: config.source_dir.clone(),
        });
    }

    println!(
        "✅ Found {}/{} existing images:\n",
        found.len(),
        config.sources.len()
    );
    for source in &found {
        println!("   • {}", source.filename);
    }
    println!();

    // Dispatch everything before waiting on anything
    let mut jobs = JoinSet::new();
    for (index, source) in found.iter().enumerate() {
        let specs = plan::derivatives_for(source.class, config);

        println!("🎯 Optimizing: {}", source.filename);
        for spec in &specs {
            println!("   → {} ({})", spec.file_name(&source.base_name), spec.label());
        }
        println!();

        jobs.spawn(process_source(index, source.clone(), specs));
    }

    let mut report = RunReport {
        found,
        candidates: config.sources.len(),
        ..RunReport::default()
    };

    while let Some(joined) = jobs.join_next().await {
        match joined {
            Ok(outcomes) => report.outcomes.extend(outcomes),
            Err(e) => {
                tracing::warn!("source job did not finish: {}", e);
                report.run_errors.push(e.to_string());
            }
        }
    }

    report
        .outcomes
        .sort_by_key(|o| (o.source_index, o.spec.kind));

    if config.write_manifest {
        match Manifest::from_report(&report).write(&config.source_dir).await {
            Ok(path) => println!("📄 Manifest saved: {}", path.display()),
            Err(e) => {
                tracing::warn!("manifest not written: {}", e);
                report.run_errors.push(e.to_string());
            }
        }
    }

    print_summary(&report, config);
    print_failures(&report);

    Ok(report)
}

/// Decode one source, then render all of its derivatives concurrently
async fn process_source(
    index: usize,
    source: SourceImage,
    specs: Vec<DerivativeSpec>,
) -> Vec<DerivativeOutcome> {
    let outcome = |spec: DerivativeSpec, result: std::result::Result<usize, String>| {
        DerivativeOutcome {
            source_index: index,
            source: source.filename.clone(),
            base_name: source.base_name.clone(),
            output: source
                .path
                .with_file_name(spec.file_name(&source.base_name)),
            spec,
            result,
        }
    };

    let img = match loader::load_source(source.path.clone()).await {
        Ok(img) => Arc::new(img),
        Err(e) => {
            // Every derivative of an unreadable source fails the same way
            let reason = e.to_string();
            return specs
                .into_iter()
                .map(|spec| outcome(spec, Err(reason.clone())))
                .collect();
        }
    };

    let expected = specs.clone();
    let mut jobs = JoinSet::new();
    for spec in specs {
        let pending = outcome(spec, Ok(0));
        let img = Arc::clone(&img);

        jobs.spawn(async move {
            let result = processor::generate_derivative(img, pending.spec, pending.output.clone())
                .await
                .map_err(|e| e.to_string());

            if result.is_ok() {
                println!("   ✅ {} ({})", pending.file_name(), pending.spec.label());
            }

            DerivativeOutcome { result, ..pending }
        });
    }

    let mut outcomes = Vec::with_capacity(jobs.len());
    while let Some(joined) = jobs.join_next().await {
        match joined {
            Ok(done) => outcomes.push(done),
            Err(e) => tracing::warn!("derivative job for {} did not finish: {}", source.filename, e),
        }
    }

    // A job that vanished still has to show up as a failure
    for spec in expected {
        if !outcomes.iter().any(|o| o.spec.kind == spec.kind) {
            outcomes.push(outcome(spec, Err("derivative job did not finish".to_string())));
        }
    }

    outcomes
}

fn print_summary(report: &RunReport, config: &Config) {
    let rule = "=".repeat(RULE_WIDTH);

    println!();
    println!("{}", rule);
    if report.is_success() {
        println!("🎉 EXISTING IMAGES OPTIMIZATION COMPLETE!");
    } else {
        println!("⚠️  OPTIMIZATION FINISHED WITH ERRORS");
    }
    println!("{}", rule);

    println!(
        "\n📊 {}/{} derivatives written for {}/{} image(s)",
        report.succeeded(),
        report.outcomes.len(),
        report.found.len(),
        report.candidates
    );

    let mut kinds = vec![DerivativeKind::Google, DerivativeKind::Optimized];
    if config.thumbnails {
        kinds.push(DerivativeKind::Thumbnail);
    }

    println!("\n📁 GENERATED FILES:");
    for (i, kind) in kinds.iter().enumerate() {
        let branch = if i + 1 == kinds.len() { "└──" } else { "├──" };
        let name = format!("[name]{}", kind.suffix());
        println!("{} {:<22} → {}", branch, name, kind.purpose());
    }
}

fn print_failures(report: &RunReport) {
    let failures: Vec<_> = report.failures().collect();
    if failures.is_empty() && report.run_errors.is_empty() {
        return;
    }

    eprintln!(
        "\n⚠️  {} failure(s):",
        failures.len() + report.run_errors.len()
    );
    for failure in failures {
        if let Err(reason) = &failure.result {
            eprintln!("❌ {} (from {}): {}", failure.file_name(), failure.source, reason);
        }
    }
    for error in &report.run_errors {
        eprintln!("❌ {}", error);
    }
}
