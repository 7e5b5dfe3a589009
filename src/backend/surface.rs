// Surface - the window's presentable drawing target
//
// Created through the platform branch, then queried for presentation
// support and color formats.

use anyhow::{Context, Result};
use ash::extensions::khr;
use ash::vk;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::sync::Arc;

use super::VulkanInstance;
use crate::error::SetupError;
use crate::platform::Platform;

/// Chosen color format and color space for presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceFormat {
    pub format: vk::Format,
    pub color_space: vk::ColorSpaceKHR,
}

/// Vulkan surface wrapper for presentation
pub struct Surface {
    pub surface: vk::SurfaceKHR,
    pub loader: khr::Surface,
    pub platform: Platform,
    // Keeps the instance alive until the surface is gone
    _instance: Arc<VulkanInstance>,
}

impl Surface {
    /// Create a surface for `window`. The window must outlive the surface.
    pub fn new<W>(instance: Arc<VulkanInstance>, platform: Platform, window: &W) -> Result<Self>
    where
        W: HasWindowHandle + HasDisplayHandle,
    {
        let window_handle = window
            .window_handle()
            .context("Failed to get window handle")?
            .as_raw();
        let display_handle = window
            .display_handle()
            .context("Failed to get display handle")?
            .as_raw();

        let surface = unsafe {
            platform.create_surface(&instance.entry, &instance.instance, display_handle, window_handle)?
        };

        let loader = khr::Surface::new(&instance.entry, &instance.instance);

        log::info!("Created {:?} surface", platform);

        Ok(Self {
            surface,
            loader,
            platform,
            _instance: instance,
        })
    }

    /// Check if a queue family supports presentation to this surface
    pub fn supports_present(&self, physical_device: vk::PhysicalDevice, queue_family: u32) -> Result<bool> {
        let supported = unsafe {
            self.loader
                .get_physical_device_surface_support(physical_device, queue_family, self.surface)
        }
        .context("Failed to query surface support")?;

        Ok(supported)
    }

    /// Query the device's formats for this surface and pick one
    pub fn select_format(&self, physical_device: vk::PhysicalDevice) -> Result<SurfaceFormat> {
        let formats = unsafe {
            self.loader
                .get_physical_device_surface_formats(physical_device, self.surface)
        }
        .map_err(|_| SetupError::SurfaceFormats)?;

        let chosen = choose_surface_format(&formats)?;
        log::info!(
            "Surface format: {:?} / {:?} ({} available)",
            chosen.format,
            chosen.color_space,
            formats.len()
        );

        Ok(chosen)
    }

    pub fn capabilities(&self, physical_device: vk::PhysicalDevice) -> Result<vk::SurfaceCapabilitiesKHR> {
        let caps = unsafe {
            self.loader
                .get_physical_device_surface_capabilities(physical_device, self.surface)
        }
        .context("Failed to get surface capabilities")?;

        Ok(caps)
    }

    pub fn present_modes(&self, physical_device: vk::PhysicalDevice) -> Result<Vec<vk::PresentModeKHR>> {
        let modes = unsafe {
            self.loader
                .get_physical_device_surface_present_modes(physical_device, self.surface)
        }
        .context("Failed to get surface present modes")?;

        Ok(modes)
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        log::info!("Destroying surface...");
        unsafe {
            self.loader.destroy_surface(self.surface, None);
        }
    }
}

/// A lone `UNDEFINED` entry means the surface has no preference, so we use
/// `B8G8R8A8_UNORM`. Otherwise the first reported format wins.
pub fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> Result<SurfaceFormat, SetupError> {
    let first = formats.first().ok_or(SetupError::SurfaceFormats)?;

    let format = if formats.len() == 1 && first.format == vk::Format::UNDEFINED {
        vk::Format::B8G8R8A8_UNORM
    } else {
        first.format
    };

    Ok(SurfaceFormat {
        format,
        color_space: first.color_space,
    })
}
