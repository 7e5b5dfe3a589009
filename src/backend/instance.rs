// Vulkan Instance - connection to the Vulkan implementation
//
// Responsibilities:
// - Loading the Vulkan library
// - Checking that requested instance extensions exist
// - Instance creation (optionally with validation layers)
// - Routing validation messages into `log`

use anyhow::{Context, Result};
use ash::extensions::ext::DebugUtils;
use ash::{vk, Entry};
use std::ffi::{CStr, CString};
use std::sync::Arc;

use super::fixed_c_str;
use crate::config::InstanceConfig;
use crate::error::SetupError;

const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

/// Every severity is forwarded; `log`'s filter decides what is shown
const MESSENGER_SEVERITIES: vk::DebugUtilsMessageSeverityFlagsEXT = vk::DebugUtilsMessageSeverityFlagsEXT::from_raw(
    vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE.as_raw()
        | vk::DebugUtilsMessageSeverityFlagsEXT::INFO.as_raw()
        | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING.as_raw()
        | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR.as_raw(),
);

/// Vulkan instance wrapper with automatic cleanup
pub struct VulkanInstance {
    // Destroyed before the instance in Drop
    debug_utils: Option<(DebugUtils, vk::DebugUtilsMessengerEXT)>,
    pub instance: ash::Instance,
    pub entry: Entry,
    pub validation_enabled: bool,
}

impl VulkanInstance {
    /// Create the instance
    ///
    /// # Arguments
    /// * `config` - Application/engine names and API version
    /// * `enable_validation` - Request `VK_LAYER_KHRONOS_validation` if installed
    /// * `extensions` - Instance extensions the chapter needs (surface extensions)
    pub fn new(
        config: &InstanceConfig,
        enable_validation: bool,
        extensions: &[&'static CStr],
    ) -> Result<Arc<Self>> {
        log::info!("Creating Vulkan instance: {}", config.application_name);

        let entry = unsafe { Entry::load() }
            .map_err(|e| SetupError::LoaderUnavailable(e.to_string()))?;

        let validation_enabled = enable_validation && Self::validation_available(&entry)?;

        let mut requested: Vec<&CStr> = extensions.to_vec();
        if validation_enabled {
            requested.push(DebugUtils::name());
        }

        let available = entry
            .enumerate_instance_extension_properties(None)
            .map_err(SetupError::InstanceCreation)?;
        let missing = missing_extensions(&requested, &available);
        if !missing.is_empty() {
            return Err(SetupError::MissingExtensions(missing).into());
        }

        let instance = Self::create_instance(&entry, config, &requested, validation_enabled)?;

        let debug_utils = if validation_enabled {
            Some(Self::setup_debug_messenger(&entry, &instance)?)
        } else {
            None
        };

        Ok(Arc::new(Self {
            debug_utils,
            instance,
            entry,
            validation_enabled,
        }))
    }

    fn validation_available(entry: &Entry) -> Result<bool> {
        let layers = entry
            .enumerate_instance_layer_properties()
            .context("Failed to enumerate instance layers")?;

        let found = layers
            .iter()
            .any(|layer| fixed_c_str(&layer.layer_name) == VALIDATION_LAYER.to_string_lossy());

        if !found {
            log::warn!(
                "{} requested but not installed, continuing without validation",
                VALIDATION_LAYER.to_string_lossy()
            );
        }

        Ok(found)
    }

    fn create_instance(
        entry: &Entry,
        config: &InstanceConfig,
        extensions: &[&CStr],
        enable_validation: bool,
    ) -> Result<ash::Instance> {
        let app_name = CString::new(config.application_name.as_str())?;
        let engine_name = CString::new(config.engine_name.as_str())?;

        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name)
            .engine_name(&engine_name)
            .api_version(config.packed_api_version()?);

        let extension_names: Vec<_> = extensions.iter().map(|name| name.as_ptr()).collect();

        let layer_names = if enable_validation {
            vec![VALIDATION_LAYER.as_ptr()]
        } else {
            vec![]
        };

        let create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extension_names)
            .enabled_layer_names(&layer_names);

        let instance = unsafe { entry.create_instance(&create_info, None) }
            .map_err(SetupError::from_instance_result)?;

        log::info!(
            "Instance created (API {}.{}.{}, {} extensions)",
            config.api_version[0],
            config.api_version[1],
            config.api_version[2],
            extensions.len()
        );

        Ok(instance)
    }

    fn setup_debug_messenger(
        entry: &Entry,
        instance: &ash::Instance,
    ) -> Result<(DebugUtils, vk::DebugUtilsMessengerEXT)> {
        let debug_utils = DebugUtils::new(entry, instance);

        let create_info = vk::DebugUtilsMessengerCreateInfoEXT::builder()
            .message_severity(MESSENGER_SEVERITIES)
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(debug_callback));

        let messenger = unsafe { debug_utils.create_debug_utils_messenger(&create_info, None) }
            .context("Failed to create debug messenger")?;

        Ok((debug_utils, messenger))
    }
}

impl Drop for VulkanInstance {
    fn drop(&mut self) {
        log::info!("Destroying Vulkan instance...");

        unsafe {
            if let Some((debug_utils, messenger)) = self.debug_utils.take() {
                debug_utils.destroy_debug_utils_messenger(messenger, None);
            }

            self.instance.destroy_instance(None);
        }
    }
}

/// Names from `required` that are absent from `available`
pub(crate) fn missing_extensions(
    required: &[&CStr],
    available: &[vk::ExtensionProperties],
) -> Vec<String> {
    let available: Vec<String> = available
        .iter()
        .map(|ext| fixed_c_str(&ext.extension_name))
        .collect();

    required
        .iter()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !available.contains(name))
        .collect()
}

fn log_level_for(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> log::Level {
    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        log::Level::Error
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        log::Level::Warn
    } else {
        log::Level::Debug
    }
}

// Debug callback for validation layers
unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    _message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _p_user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    let message = CStr::from_ptr((*p_callback_data).p_message);

    log::log!(log_level_for(message_severity), "[Vulkan] {}", message.to_string_lossy());

    vk::FALSE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::tests::extension;

    #[test]
    fn nothing_missing_when_all_present() {
        let available = [extension("VK_KHR_surface"), extension("VK_KHR_xlib_surface")];
        let required = [c"VK_KHR_surface", c"VK_KHR_xlib_surface"];
        assert!(missing_extensions(&required, &available).is_empty());
    }

    #[test]
    fn reports_only_absent_names_in_request_order() {
        let available = [extension("VK_KHR_surface")];
        let required = [c"VK_KHR_win32_surface", c"VK_KHR_surface", c"VK_EXT_debug_utils"];
        assert_eq!(
            missing_extensions(&required, &available),
            vec!["VK_KHR_win32_surface".to_string(), "VK_EXT_debug_utils".to_string()]
        );
    }

    #[test]
    fn messenger_forwards_every_severity() {
        assert!(MESSENGER_SEVERITIES.contains(
            vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
                | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
        ));
    }

    #[test]
    fn severities_map_to_log_levels() {
        use vk::DebugUtilsMessageSeverityFlagsEXT as Severity;

        assert_eq!(log_level_for(Severity::ERROR), log::Level::Error);
        assert_eq!(log_level_for(Severity::WARNING), log::Level::Warn);
        assert_eq!(log_level_for(Severity::INFO), log::Level::Debug);
        assert_eq!(log_level_for(Severity::VERBOSE), log::Level::Debug);
    }

    #[test]
    fn empty_request_needs_nothing() {
        assert!(missing_extensions(&[], &[]).is_empty());
    }
}
