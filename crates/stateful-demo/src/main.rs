//! Stateful demo - main entry point.
//!
//! Runs a scripted load cycle against a headless hierarchy and logs the overlay
//! tree after every step. Fades are driven by a tokio interval at the
//! configured frame rate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use stateful_controller::{ContentHooks, LoadError, StatefulController};
use stateful_core::AppConfig;
use stateful_overlay::{HeadlessHierarchy, ViewId};
use tokio::time::Instant;

type Controller = StatefulController<HeadlessHierarchy, ContentHooks>;

// =============================================================================
// Configuration
// =============================================================================

/// Load config.toml, falling back to defaults on any error.
fn load_config() -> AppConfig {
    match AppConfig::load_default() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Failed to load config: {} - using defaults", e);
            AppConfig::default()
        }
    }
}

// =============================================================================
// Frame Loop
// =============================================================================

/// Drive the in-flight fade to completion, one frame per interval tick.
async fn settle(controller: &mut Controller, config: &AppConfig) {
    let mut interval = tokio::time::interval(config.transition.frame_interval());
    let mut last_frame = Instant::now();
    let mut frames = 0u32;

    while controller.is_transitioning() {
        interval.tick().await;
        let now = Instant::now();
        controller.tick(now - last_frame);
        last_frame = now;
        frames += 1;
    }

    tracing::debug!("Fade settled after {} frames", frames);
}

fn log_tree(step: &str, controller: &Controller, host: &HeadlessHierarchy) {
    match serde_json::to_string(&host.snapshot()) {
        Ok(tree) => tracing::info!(
            "[{}] state='{}' tree={}",
            step,
            controller.current_state(),
            tree
        ),
        Err(e) => tracing::error!("Failed to serialize hierarchy: {}", e),
    }
}

// =============================================================================
// Scenario
// =============================================================================

async fn run(config: AppConfig) -> Result<(), String> {
    let host = HeadlessHierarchy::new();
    let base = host.create_view("content");
    let views: [(&str, ViewId); 3] = [
        ("loading", host.create_view("spinner")),
        ("error", host.create_view("error message")),
        ("empty", host.create_view("nothing here yet")),
    ];

    let has_content = Arc::new(AtomicBool::new(false));
    let hooks = ContentHooks::new(
        {
            let has_content = has_content.clone();
            move || has_content.load(Ordering::SeqCst)
        },
        |error: &LoadError| tracing::warn!("Showing banner: {}", error),
    );

    let mut controller = StatefulController::with_config(host.clone(), base, hooks, &config);
    for (key, view) in views {
        controller.set_placeholder_view(key, view);
    }
    controller.did_appear().map_err(|e| e.to_string())?;
    log_tree("appear", &controller, &host);

    // First load finds nothing.
    controller.start_loading(true).map_err(|e| e.to_string())?;
    settle(&mut controller, &config).await;
    log_tree("loading", &controller, &host);

    controller.end_loading(true, None).map_err(|e| e.to_string())?;
    settle(&mut controller, &config).await;
    log_tree("empty", &controller, &host);

    // Second load fails.
    controller.start_loading(true).map_err(|e| e.to_string())?;
    settle(&mut controller, &config).await;
    controller
        .end_loading(true, Some("connection reset".into()))
        .map_err(|e| e.to_string())?;
    settle(&mut controller, &config).await;
    log_tree("error", &controller, &host);

    // Third load brings content, then a refresh fails over it.
    controller.start_loading(true).map_err(|e| e.to_string())?;
    has_content.store(true, Ordering::SeqCst);
    controller.end_loading(true, None).map_err(|e| e.to_string())?;
    settle(&mut controller, &config).await;
    log_tree("content", &controller, &host);

    controller.start_loading(false).map_err(|e| e.to_string())?;
    controller
        .end_loading(true, Some("refresh failed".into()))
        .map_err(|e| e.to_string())?;
    settle(&mut controller, &config).await;
    log_tree("refresh failed", &controller, &host);

    Ok(())
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Stateful demo starting...");

    let config = load_config();
    tracing::info!(
        "Fade: {}ms at {}ms frames ({:?})",
        config.transition.duration_ms,
        config.transition.frame_interval_ms,
        config.transition.easing
    );

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(config)) {
        tracing::error!("Demo failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Stateful demo finished");
}
