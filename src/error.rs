// Setup errors
//
// Every failure during bring-up is terminal. The Display text of each
// variant is what the user sees in the error dialog / on stderr.

use ash::vk;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Failed to load the Vulkan library. Is Vulkan installed? ({0})")]
    LoaderUnavailable(String),

    #[error(
        "Cannot find a compatible Vulkan installable client driver (ICD). \
         Please make sure your driver supports Vulkan before continuing. \
         The call to vkCreateInstance failed."
    )]
    IncompatibleDriver,

    #[error(
        "The call to vkCreateInstance failed ({0}). Please make sure you have a \
         Vulkan installable client driver (ICD) before continuing."
    )]
    InstanceCreation(vk::Result),

    #[error("Required Vulkan extensions are not available: {}", .0.join(", "))]
    MissingExtensions(Vec<String>),

    #[error("Failed to enumerate physical devices in the system ({0}).")]
    DeviceEnumeration(vk::Result),

    #[error(
        "vkEnumeratePhysicalDevices did not report any available devices that \
         support Vulkan. Do you have a compatible Vulkan installable client driver (ICD)?"
    )]
    NoDevices,

    #[error("Physical device index {index} is out of range ({count} devices found).")]
    DeviceIndexOutOfRange { index: usize, count: usize },

    #[error("The selected physical device has no queue family with graphics support.")]
    NoGraphicsQueue,

    #[error("Failed to create a Vulkan logical device ({0}).")]
    DeviceCreation(vk::Result),

    #[error("Unsupported windowing platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Failed to create window: {0}")]
    WindowCreation(String),

    #[error("Failed to create VkSurfaceKHR ({0}).")]
    SurfaceCreation(vk::Result),

    #[error("The selected queue family cannot present to this surface.")]
    PresentUnsupported,

    #[error("Failed to get device surface formats.")]
    SurfaceFormats,

    #[error("Failed to create the swapchain ({0}).")]
    SwapchainCreation(vk::Result),
}

impl SetupError {
    /// Map a failed `vkCreateInstance` result to the message shown to the user
    pub fn from_instance_result(result: vk::Result) -> Self {
        match result {
            vk::Result::ERROR_INCOMPATIBLE_DRIVER => Self::IncompatibleDriver,
            other => Self::InstanceCreation(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incompatible_driver_gets_its_own_message() {
        let err = SetupError::from_instance_result(vk::Result::ERROR_INCOMPATIBLE_DRIVER);
        assert!(matches!(err, SetupError::IncompatibleDriver));
        assert!(err.to_string().starts_with("Cannot find a compatible Vulkan installable client driver"));
    }

    #[test]
    fn other_instance_failures_are_generic() {
        let err = SetupError::from_instance_result(vk::Result::ERROR_INITIALIZATION_FAILED);
        assert!(matches!(
            err,
            SetupError::InstanceCreation(vk::Result::ERROR_INITIALIZATION_FAILED)
        ));
        assert!(err.to_string().starts_with("The call to vkCreateInstance failed"));
    }

    #[test]
    fn missing_extensions_are_listed() {
        let err = SetupError::MissingExtensions(vec![
            "VK_KHR_surface".to_string(),
            "VK_KHR_xcb_surface".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Required Vulkan extensions are not available: VK_KHR_surface, VK_KHR_xcb_surface"
        );
    }
}
