// =============================================================================
// CHAPTER DRIVER
// =============================================================================
//
// Every chapter runs the same bring-up sequence and stops after its stage:
//
//   Instance  -> create instance, done (no window)
//   Devices   -> + physical/logical device, window, event loop
//   Surface   -> + surface, color format
//   Swapchain -> + swapchain and image views
//
// Teardown is the reverse of creation and falls out of the field order of
// `Session`.
//
// =============================================================================

use anyhow::{Context, Result};
use raw_window_handle::HasDisplayHandle;
use std::fmt;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::backend::{Surface, SurfaceFormat, Swapchain, VulkanDevice, VulkanInstance};
use crate::config::Config;
use crate::error::SetupError;
use crate::platform::Platform;
use crate::window::{action_for, window_attributes, LoopAction};

/// How far a chapter takes the bring-up sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Instance,
    Devices,
    Surface,
    Swapchain,
}

impl Stage {
    pub fn opens_window(self) -> bool {
        self >= Stage::Devices
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Instance => "instance",
            Stage::Devices => "devices",
            Stage::Surface => "surface",
            Stage::Swapchain => "swapchain",
        };
        f.write_str(name)
    }
}

/// Run a chapter to completion
pub fn run(stage: Stage, config: Config) -> Result<()> {
    log::info!("Running chapter stage: {}", stage);

    if !stage.opens_window() {
        let instance = VulkanInstance::new(&config.instance, validation_requested(&config), &[])?;
        log::info!(
            "Instance ready (validation {})",
            if instance.validation_enabled { "on" } else { "off" }
        );
        return Ok(());
    }

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    // Block until the window system has something for us
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = Tutorial::new(stage, config);
    event_loop.run_app(&mut app)?;

    app.finish()
}

fn validation_requested(config: &Config) -> bool {
    cfg!(debug_assertions) && config.debug.validation_layers
}

// =============================================================================
// SESSION STATE
// =============================================================================

/// Live Vulkan objects of a windowed chapter.
///
/// IMPORTANT: Field order is drop order. The surface must go before the
/// window it was created from, and everything before the device.
struct Session {
    swapchain: Option<Swapchain>,
    surface: Option<Surface>,
    surface_format: Option<SurfaceFormat>,
    window: Window,
    device: Arc<VulkanDevice>,
}

impl Session {
    fn create(stage: Stage, config: &Config, event_loop: &ActiveEventLoop) -> Result<Self> {
        // ─────────────────────────────────────────────────────────────────────
        // STEP 1: Instance with the surface extensions of this window system
        // ─────────────────────────────────────────────────────────────────────
        let display = event_loop
            .display_handle()
            .context("Failed to get display handle")?
            .as_raw();
        let platform = Platform::from_display(display)?;
        log::info!("Window system: {:?}", platform);

        let instance = VulkanInstance::new(
            &config.instance,
            validation_requested(config),
            &platform.instance_extensions(),
        )?;

        // ─────────────────────────────────────────────────────────────────────
        // STEP 2: Physical + logical device
        // ─────────────────────────────────────────────────────────────────────
        let device = VulkanDevice::new(instance.clone(), config.device.index)?;

        // ─────────────────────────────────────────────────────────────────────
        // STEP 3: Window
        // ─────────────────────────────────────────────────────────────────────
        let screen = event_loop.primary_monitor().map(|monitor| monitor.size());
        let window = event_loop
            .create_window(window_attributes(&config.window, screen))
            .map_err(|e| SetupError::WindowCreation(e.to_string()))?;
        window.focus_window();

        let mut session = Self {
            swapchain: None,
            surface: None,
            surface_format: None,
            window,
            device,
        };

        if stage < Stage::Surface {
            return Ok(session);
        }

        // ─────────────────────────────────────────────────────────────────────
        // STEP 4: Surface + color format
        // ─────────────────────────────────────────────────────────────────────
        let surface = Surface::new(instance, platform, &session.window)?;

        let physical_device = session.device.physical_device;
        if !surface.supports_present(physical_device, session.device.graphics_queue_family)? {
            return Err(SetupError::PresentUnsupported.into());
        }

        let surface_format = surface.select_format(physical_device)?;
        session.surface_format = Some(surface_format);

        if stage < Stage::Swapchain {
            session.surface = Some(surface);
            return Ok(session);
        }

        // ─────────────────────────────────────────────────────────────────────
        // STEP 5: Swapchain
        // ─────────────────────────────────────────────────────────────────────
        let size = session.window.inner_size();
        let swapchain = Swapchain::new(
            session.device.clone(),
            &surface,
            surface_format,
            config.present_mode(),
            size.width,
            size.height,
        )?;

        session.surface = Some(surface);
        session.swapchain = Some(swapchain);

        Ok(session)
    }
}

// =============================================================================
// EVENT HANDLING
// =============================================================================

pub struct Tutorial {
    stage: Stage,
    config: Config,
    session: Option<Session>,
    failure: Option<anyhow::Error>,
}

impl Tutorial {
    pub fn new(stage: Stage, config: Config) -> Self {
        Self {
            stage,
            config,
            session: None,
            failure: None,
        }
    }

    fn release(&mut self) {
        if let Some(session) = self.session.take() {
            // VulkanDevice waits for idle in its own Drop
            log::info!("Cleaning up Vulkan resources...");
            drop(session);
            log::info!("Cleanup complete");
        }
    }

    /// Release anything still alive and surface any setup error
    fn finish(&mut self) -> Result<()> {
        self.release();

        match self.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl ApplicationHandler for Tutorial {
    /// Called when the application is ready to create windows.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.is_some() || self.failure.is_some() {
            return;
        }

        match Session::create(self.stage, &self.config, event_loop) {
            Ok(session) => {
                log::info!(
                    "{} ready on {}{}",
                    self.stage,
                    session.device.name(),
                    session
                        .surface_format
                        .map(|f| format!(" ({:?})", f.format))
                        .unwrap_or_default()
                );
                if let Some(ref swapchain) = session.swapchain {
                    log::info!(
                        "{} swapchain images, {:?}",
                        swapchain.images.len(),
                        swapchain.present_mode
                    );
                }
                self.session = Some(session);
            }
            Err(e) => {
                log::error!("Setup failed: {:#}", e);
                self.failure = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if action_for(&event) == LoopAction::Close {
            log::info!("Close requested, shutting down...");
            event_loop.exit();
        }
    }

    /// Windows must be gone before the event loop shuts down.
    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_cumulative() {
        assert!(Stage::Instance < Stage::Devices);
        assert!(Stage::Devices < Stage::Surface);
        assert!(Stage::Surface < Stage::Swapchain);
    }

    #[test]
    fn only_the_instance_chapter_is_headless() {
        assert!(!Stage::Instance.opens_window());
        assert!(Stage::Devices.opens_window());
        assert!(Stage::Swapchain.opens_window());
    }

    #[test]
    fn finish_reports_stored_failure() {
        let mut app = Tutorial::new(Stage::Surface, Config::default());
        app.failure = Some(SetupError::SurfaceFormats.into());

        let err = app.finish().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SetupError>(),
            Some(SetupError::SurfaceFormats)
        ));
        assert!(app.finish().is_ok());
    }
}
