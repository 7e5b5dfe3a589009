// =============================================================================
// VULKAN BRING-UP CHAPTERS
// =============================================================================
//
// Small programs that each take Vulkan setup one step further:
//
//   ch02_instance   instance only
//   ch04_devices    + devices, window, event loop
//   ch05_surface    + surface and color format
//   ch08_swapchain  + swapchain
//
// The binaries are one-liners over `run_chapter`; the shared code lives here.
//
// =============================================================================

pub mod app;
pub mod backend;
pub mod config;
pub mod error;
pub mod platform;
pub mod report;
pub mod window;

pub use app::Stage;
pub use config::Config;
pub use error::SetupError;

/// Entry point shared by every chapter binary. Exits the process on error.
pub fn run_chapter(stage: Stage) {
    let (config, source) = Config::load();

    report::init_logging(&config);
    source.log();
    log::info!(
        "Window: {}x{} \"{}\"",
        config.window.width,
        config.window.height,
        config.window.title
    );

    let title = config.window.title.clone();
    if let Err(err) = app::run(stage, config) {
        report::exit_on_error(&title, &err);
    }
}
