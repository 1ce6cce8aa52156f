//! Integration tests for the lazy image lifecycle.
//!
//! These tests drive the public API end to end on a simulated page:
//! - Mount → scroll → frame → load → reveal
//! - Load failures degrade to a diagnostic, never an error
//! - Scroll bursts coalesce to one check per frame
//! - Containers and lazily provided contexts
//! - Real loads from disk through the probe loader
//!
//! Run with: `cargo test --test lifecycle_integration`

use std::cell::Cell;
use std::io::Cursor;
use std::rc::Rc;

use image::{ImageFormat, Rgba, RgbaImage};
use tempfile::TempDir;

use lazyimg::host::{ContextSource, ElementKind, ObservationContext, SimulatedPage};
use lazyimg::loader::{LoaderConfig, ProbeLoader, StaticLoader};
use lazyimg::{Diagnostic, LazyImage, LazyImageConfig, LifecycleState, Presentation};

// ============================================================================
// Helper Functions
// ============================================================================

const VIEWPORT_HEIGHT: f64 = 800.0;

/// Mount a controller and run the page's layout pass.
fn mount(
    page: &Rc<SimulatedPage>,
    loader: &Rc<StaticLoader>,
    src: &str,
    top: f64,
    height: f64,
    config: LazyImageConfig,
) -> LazyImage {
    let element = page.image(src, top, height);
    let image = LazyImage::new(page.clone(), loader.clone(), element, config);
    image.mount();
    page.run_after_layout();
    image
}

/// Write a small PNG to `dir` and return its path as a string.
fn write_png(dir: &TempDir, name: &str, width: u32, height: u32) -> String {
    let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png).unwrap();

    let path = dir.path().join(name);
    std::fs::write(&path, bytes.into_inner()).unwrap();
    path.to_string_lossy().into_owned()
}

// ============================================================================
// Integration Tests
// ============================================================================

/// An image below the fold loads after scrolling it into view.
///
/// Viewport 800, element at 900 with height 100:
/// 1. Initial check: 900 > 0 + 800, stays placeholder
/// 2. Scroll to 200: 900 <= 1000 and 1000 > 200, becomes visible
/// 3. Load resolves, real source revealed at full opacity
#[tokio::test]
async fn test_scroll_into_view_reveals_real_source() {
    let page = SimulatedPage::new(VIEWPORT_HEIGHT);
    let loader = Rc::new(StaticLoader::new());
    let visible = Rc::new(Cell::new(0));
    let counter = Rc::clone(&visible);

    let image = mount(
        &page,
        &loader,
        "https://cdn.example.com/photo.jpg",
        900.0,
        100.0,
        LazyImageConfig::new()
            .with_placeholder("blur.jpg")
            .on_visible(move || counter.set(counter.get() + 1)),
    );
    assert_eq!(image.state(), LifecycleState::Placeholder);
    assert_eq!(
        image.presentation(),
        Presentation::placeholder(Some("blur.jpg"))
    );

    page.scroll_to(200.0);
    page.run_frame();
    page.settle().await;

    assert_eq!(image.state(), LifecycleState::VisibleLoaded);
    assert!(image.is_settled());
    assert_eq!(
        image.presentation(),
        Presentation::revealed(Some("https://cdn.example.com/photo.jpg"))
    );
    assert_eq!(visible.get(), 1);
    assert_eq!(loader.request_count("https://cdn.example.com/photo.jpg"), 1);
}

/// A failed load leaves the placeholder up and records exactly one diagnostic.
#[tokio::test]
async fn test_failed_load_records_one_diagnostic() {
    let page = SimulatedPage::new(VIEWPORT_HEIGHT);
    let url = "https://cdn.example.com/missing.jpg";
    let loader = Rc::new(StaticLoader::new().with_failure(url));

    let image = mount(
        &page,
        &loader,
        url,
        900.0,
        100.0,
        LazyImageConfig::new().with_placeholder("blur.jpg"),
    );
    page.scroll_to(200.0);
    page.run_frame();
    page.settle().await;

    assert_eq!(image.state(), LifecycleState::VisibleErrored);
    let presentation = image.presentation();
    assert_eq!(presentation.source.as_deref(), Some("blur.jpg"));
    assert_eq!(presentation.opacity, 1.0);

    let diagnostics = image.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    match &diagnostics[0] {
        Diagnostic::LoadFailed { source, .. } => assert_eq!(source, url),
        other => panic!("unexpected diagnostic: {}", other),
    }
}

/// Many scroll events inside one frame produce exactly one visibility check.
#[test]
fn test_scroll_burst_single_check_per_frame() {
    let page = SimulatedPage::new(VIEWPORT_HEIGHT);
    let loader = Rc::new(StaticLoader::new());
    let image = mount(
        &page,
        &loader,
        "far.jpg",
        10_000.0,
        100.0,
        LazyImageConfig::new(),
    );

    for frame in 0..5 {
        let checks_before = image.check_count();
        for step in 0..20 {
            page.scroll_to((frame * 100 + step) as f64);
        }
        assert_eq!(page.pending_frames(), 1);
        page.run_frame();
        assert_eq!(image.check_count(), checks_before + 1);
    }
    assert_eq!(image.state(), LifecycleState::Placeholder);
}

/// Several images on one page each load once, in the order they are reached.
#[tokio::test]
async fn test_feed_of_images_loads_each_once() {
    let page = SimulatedPage::new(VIEWPORT_HEIGHT);
    let loader = Rc::new(StaticLoader::new());

    let images: Vec<LazyImage> = (0..6)
        .map(|i| {
            mount(
                &page,
                &loader,
                &format!("img-{}.jpg", i),
                i as f64 * 600.0,
                400.0,
                LazyImageConfig::new(),
            )
        })
        .collect();

    for offset in [0.0, 400.0, 800.0, 1200.0, 800.0, 0.0, 2000.0, 3000.0] {
        page.scroll_to(offset);
        page.run_frame();
    }
    page.settle().await;

    for (i, image) in images.iter().enumerate() {
        assert_eq!(image.state(), LifecycleState::VisibleLoaded, "image {}", i);
        assert_eq!(loader.request_count(&format!("img-{}.jpg", i)), 1);
    }
    assert_eq!(page.viewport_context().listener_count(), 0);
}

/// A provider-supplied container receives the listeners and drives the check.
#[test]
fn test_provided_container_context() {
    let page = SimulatedPage::new(VIEWPORT_HEIGHT);
    let feed = page.container("feed");
    let provided = Rc::clone(&feed);
    let loader = Rc::new(StaticLoader::new());

    let element = page.element(
        ElementKind::Image,
        Some("card.jpg"),
        1000.0,
        200.0,
        Some(feed.clone()),
    );
    let provider = ContextSource::Provider(Rc::new(move || {
        Some(provided.clone() as Rc<dyn ObservationContext>)
    }));
    let image = LazyImage::new(
        page.clone(),
        loader.clone(),
        element,
        LazyImageConfig::new().with_context(provider),
    );
    image.mount();
    page.run_after_layout();

    assert_eq!(feed.listener_count(), 2);
    page.scroll_container(&feed, 400.0);
    page.run_frame();

    assert_eq!(image.state(), LifecycleState::VisibleLoading);
    assert_eq!(feed.listener_count(), 0);
    assert_eq!(loader.requests(), vec!["card.jpg"]);
}

/// Unmounting before the image is reached leaves nothing behind.
#[test]
fn test_drop_before_visible_leaves_no_listeners() {
    let page = SimulatedPage::new(VIEWPORT_HEIGHT);
    let loader = Rc::new(StaticLoader::new());
    let image = mount(&page, &loader, "late.jpg", 3000.0, 100.0, LazyImageConfig::new());

    page.scroll_to(100.0);
    drop(image);
    page.run_frame();
    page.scroll_to(3000.0);
    page.run_frame();

    assert_eq!(page.viewport_context().listener_count(), 0);
    assert!(loader.requests().is_empty());
}

/// The probe loader reads and decodes a real file from disk.
#[tokio::test]
async fn test_probe_loader_reveals_local_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_png(&temp_dir, "tile.png", 4, 3);

    let page = SimulatedPage::new(VIEWPORT_HEIGHT);
    let loader = Rc::new(ProbeLoader::from_config(LoaderConfig::default()).unwrap());
    let element = page.image(&path, 100.0, 100.0);
    let image = LazyImage::new(page.clone(), loader, element.clone(), LazyImageConfig::new());
    image.mount();
    page.run_after_layout();
    page.settle().await;

    assert_eq!(image.state(), LifecycleState::VisibleLoaded);
    assert_eq!(
        element.last_presentation(),
        Some(Presentation::revealed(Some(path.as_str())))
    );
}

/// A corrupt file surfaces as a load diagnostic naming the path.
#[tokio::test]
async fn test_probe_loader_corrupt_file_errors() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.png");
    std::fs::write(&path, b"definitely not a png").unwrap();
    let path = path.to_string_lossy().into_owned();

    let page = SimulatedPage::new(VIEWPORT_HEIGHT);
    let loader = Rc::new(ProbeLoader::from_config(LoaderConfig::default()).unwrap());
    let image = LazyImage::new(
        page.clone(),
        loader,
        page.image(&path, 0.0, 100.0),
        LazyImageConfig::new().with_placeholder("blur.jpg"),
    );
    image.mount();
    page.run_after_layout();
    page.settle().await;

    assert_eq!(image.state(), LifecycleState::VisibleErrored);
    let diagnostics = image.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].to_string().contains(&path));
}
