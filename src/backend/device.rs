// Vulkan Device - Core GPU interface
//
// Responsibilities:
// - Physical device enumeration (and printing what we found)
// - Physical device selection (by index, first by default)
// - Logical device + graphics queue creation

use anyhow::Result;
use ash::extensions::khr;
use ash::vk;
use std::fmt;
use std::sync::Arc;

use super::instance::missing_extensions;
use super::{fixed_c_str, VulkanInstance};
use crate::error::SetupError;

/// Vulkan device wrapper with automatic cleanup
pub struct VulkanDevice {
    pub device: ash::Device,
    pub physical_device: vk::PhysicalDevice,

    // Queue handles
    pub graphics_queue: vk::Queue,
    pub graphics_queue_family: u32,

    // Device properties (cached)
    pub properties: vk::PhysicalDeviceProperties,

    // Keeps the instance alive until the device is gone
    pub instance: Arc<VulkanInstance>,
}

impl VulkanDevice {
    /// Enumerate GPUs, print them, and open the one at `device_index`
    pub fn new(instance: Arc<VulkanInstance>, device_index: usize) -> Result<Arc<Self>> {
        let devices = unsafe { instance.instance.enumerate_physical_devices() }
            .map_err(SetupError::DeviceEnumeration)?;

        if devices.is_empty() {
            return Err(SetupError::NoDevices.into());
        }

        let summaries: Vec<DeviceSummary> = devices
            .iter()
            .map(|&device| {
                let props = unsafe { instance.instance.get_physical_device_properties(device) };
                DeviceSummary::from_properties(&props)
            })
            .collect();

        for summary in &summaries {
            println!("{}", summary);
        }

        let physical_device = select_device(&devices, device_index)?;
        log::info!("Selected GPU: {}", summaries[device_index].name);

        let queue_families = unsafe {
            instance
                .instance
                .get_physical_device_queue_family_properties(physical_device)
        };
        let graphics_queue_family =
            graphics_queue_family(&queue_families).ok_or(SetupError::NoGraphicsQueue)?;

        let (device, graphics_queue) =
            Self::create_logical_device(&instance, physical_device, graphics_queue_family)?;

        let properties = unsafe { instance.instance.get_physical_device_properties(physical_device) };

        Ok(Arc::new(Self {
            device,
            physical_device,
            graphics_queue,
            graphics_queue_family,
            properties,
            instance,
        }))
    }

    fn create_logical_device(
        instance: &VulkanInstance,
        physical_device: vk::PhysicalDevice,
        graphics_queue_family: u32,
    ) -> Result<(ash::Device, vk::Queue)> {
        let queue_priorities = [1.0];
        let queue_create_info = vk::DeviceQueueCreateInfo::builder()
            .queue_family_index(graphics_queue_family)
            .queue_priorities(&queue_priorities)
            .build();

        // Required device extensions
        let required = [khr::Swapchain::name()];

        let available = unsafe {
            instance
                .instance
                .enumerate_device_extension_properties(physical_device)
        }
        .map_err(SetupError::DeviceCreation)?;
        let missing = missing_extensions(&required, &available);
        if !missing.is_empty() {
            return Err(SetupError::MissingExtensions(missing).into());
        }

        let extension_names: Vec<_> = required.iter().map(|name| name.as_ptr()).collect();

        let create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(std::slice::from_ref(&queue_create_info))
            .enabled_extension_names(&extension_names);

        let device = unsafe {
            instance
                .instance
                .create_device(physical_device, &create_info, None)
        }
        .map_err(SetupError::DeviceCreation)?;

        let graphics_queue = unsafe { device.get_device_queue(graphics_queue_family, 0) };

        log::info!("Logical device created (queue family {})", graphics_queue_family);

        Ok((device, graphics_queue))
    }

    pub fn name(&self) -> String {
        fixed_c_str(&self.properties.device_name)
    }

    /// Wait for device to be idle (e.g., before cleanup)
    pub fn wait_idle(&self) -> Result<()> {
        unsafe { self.device.device_wait_idle() }?;
        Ok(())
    }
}

impl Drop for VulkanDevice {
    fn drop(&mut self) {
        log::info!("Destroying Vulkan device...");

        let _ = self.wait_idle();

        unsafe {
            self.device.destroy_device(None);
        }
    }
}

/// What we print for every enumerated GPU
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSummary {
    pub name: String,
    pub device_type: vk::PhysicalDeviceType,
    pub driver_version: u32,
    pub api_version: u32,
}

impl DeviceSummary {
    pub fn from_properties(props: &vk::PhysicalDeviceProperties) -> Self {
        Self {
            name: fixed_c_str(&props.device_name),
            device_type: props.device_type,
            driver_version: props.driver_version,
            api_version: props.api_version,
        }
    }
}

impl fmt::Display for DeviceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<16}{}", "Device Name:", self.name)?;
        writeln!(f, "{:<16}{:?}", "Device Type:", self.device_type)?;
        writeln!(f, "{:<16}{}", "Driver Version:", self.driver_version)?;
        write!(
            f,
            "{:<16}{}.{}.{}",
            "API Version:",
            vk::api_version_major(self.api_version),
            vk::api_version_minor(self.api_version),
            vk::api_version_patch(self.api_version)
        )
    }
}

fn select_device<T: Copy>(devices: &[T], index: usize) -> Result<T, SetupError> {
    devices
        .get(index)
        .copied()
        .ok_or(SetupError::DeviceIndexOutOfRange {
            index,
            count: devices.len(),
        })
}

/// First queue family that can do graphics
fn graphics_queue_family(families: &[vk::QueueFamilyProperties]) -> Option<u32> {
    families
        .iter()
        .position(|family| family.queue_count > 0 && family.queue_flags.contains(vk::QueueFlags::GRAPHICS))
        .map(|index| index as u32)
}
