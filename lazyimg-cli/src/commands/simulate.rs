//! `simulate` command: replay a scroll scenario against the engine.
//!
//! Each image in the scenario gets its own [`LazyImage`] on a shared
//! [`SimulatedPage`]. After the initial layout pass, every scroll offset is
//! applied and followed by exactly one rendering frame; outstanding loads are
//! then driven to completion and the final state of each image is printed.

use std::path::Path;
use std::rc::Rc;

use lazyimg::host::SimulatedPage;
use lazyimg::loader::{LoaderConfig, ProbeLoader, StaticLoader};
use lazyimg::{Diagnostic, ImageLoader, LazyImage, LazyImageConfig, LifecycleState, Presentation};

use super::build_runtime;
use crate::error::CliError;
use crate::scenario::Scenario;

/// Final outcome for one scenario image.
#[derive(Debug, Clone)]
pub struct ImageReport {
    pub name: String,
    pub state: LifecycleState,
    pub presentation: Presentation,
    pub diagnostics: Vec<Diagnostic>,
    pub checks: u64,
}

/// Run the `simulate` command.
pub fn run(path: &Path, offline: bool, loader_config: LoaderConfig) -> Result<(), CliError> {
    let scenario = Scenario::load(path)?;
    let loader: Rc<dyn ImageLoader> = if offline {
        Rc::new(offline_loader(&scenario))
    } else {
        Rc::new(ProbeLoader::from_config(loader_config)?)
    };

    let runtime = build_runtime()?;
    let reports = runtime.block_on(simulate(&scenario, loader));

    println!(
        "Simulated {} image(s), viewport {}px, {} scroll step(s)",
        reports.len(),
        scenario.viewport_height,
        scenario.offsets.len()
    );
    println!();
    for report in &reports {
        print_report(report);
    }
    Ok(())
}

/// Loader that fails exactly the images marked `fail = true`.
pub fn offline_loader(scenario: &Scenario) -> StaticLoader {
    scenario
        .failing_sources()
        .fold(StaticLoader::new(), |loader, source| loader.with_failure(source))
}

/// Mount every image, replay the scroll offsets, and settle the loads.
pub async fn simulate(scenario: &Scenario, loader: Rc<dyn ImageLoader>) -> Vec<ImageReport> {
    let page = SimulatedPage::new(scenario.viewport_height);
    let base = match &scenario.placeholder {
        Some(placeholder) => LazyImageConfig::new().with_placeholder(placeholder.clone()),
        None => LazyImageConfig::new(),
    };

    let images: Vec<(String, LazyImage)> = scenario
        .images
        .iter()
        .map(|entry| {
            let element = page.element(
                entry.kind.clone(),
                entry.src.as_deref(),
                entry.top,
                entry.height,
                None,
            );
            let name = entry.name.clone();
            let config = base
                .clone()
                .on_visible(move || tracing::info!(image = %name, "Image became visible"));
            let image = LazyImage::new(page.clone(), Rc::clone(&loader), element, config);
            image.mount();
            (entry.name.clone(), image)
        })
        .collect();

    page.run_after_layout();
    for offset in &scenario.offsets {
        page.scroll_to(*offset);
        page.run_frame();
        tracing::debug!(offset, frames = page.frames_run(), "Scroll step applied");
    }
    page.settle().await;

    images
        .iter()
        .map(|(name, image)| ImageReport {
            name: name.clone(),
            state: image.state(),
            presentation: image.presentation(),
            diagnostics: image.diagnostics(),
            checks: image.check_count(),
        })
        .collect()
}

fn print_report(report: &ImageReport) {
    println!("[{}]", report.name);
    println!("  state:        {}", report.state);
    println!("  presentation: {}", report.presentation);
    println!("  checks:       {}", report.checks);
    for diagnostic in &report.diagnostics {
        println!("  diagnostic:   {}", diagnostic);
    }
}
