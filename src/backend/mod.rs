// Backend module - Vulkan objects in creation order
//
// Design: thin RAII wrappers around ash; each object keeps its parent alive
// through an Arc so drops always run child-first.

pub mod device;
pub mod instance;
pub mod surface;
pub mod swapchain;

pub use device::{DeviceSummary, VulkanDevice};
pub use instance::VulkanInstance;
pub use surface::{Surface, SurfaceFormat};
pub use swapchain::Swapchain;

use std::ffi::c_char;

/// Read a fixed-size, NUL-terminated name array (device, layer or extension name)
pub(crate) fn fixed_c_str(chars: &[c_char]) -> String {
    let bytes: Vec<u8> = chars
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}
