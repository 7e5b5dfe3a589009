// =============================================================================
// CONFIGURATION - Load settings from config.toml
// =============================================================================
//
// Every chapter reads the same file. Missing sections or fields fall back to
// the values the tutorial has always used (1280x720, Vulkan 1.0.3, first GPU).

use anyhow::{Context, Result};
use ash::vk;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable pointing at an alternative config file
pub const CONFIG_PATH_VAR: &str = "VK_CHAPTERS_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Root configuration structure
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub instance: InstanceConfig,
    pub device: DeviceConfig,
    pub swapchain: SwapchainConfig,
    pub debug: DebugConfig,
}

/// Window settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Center the window on the primary monitor
    pub centered: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Vulkan Example".to_string(),
            width: 1280,
            height: 720,
            centered: true,
        }
    }
}

/// Values passed to `vkCreateInstance` through `VkApplicationInfo`
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct InstanceConfig {
    pub application_name: String,
    pub engine_name: String,
    /// `[major, minor, patch]`
    pub api_version: [u32; 3],
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            application_name: "Vulkan Example".to_string(),
            engine_name: "Vulkan Engine".to_string(),
            api_version: [1, 0, 3],
        }
    }
}

impl InstanceConfig {
    /// Packed version as expected by `VkApplicationInfo::apiVersion`.
    /// Components wider than their bit field (7/10/12 bits) are rejected.
    pub fn packed_api_version(&self) -> Result<u32> {
        let [major, minor, patch] = self.api_version;

        if major > 0x7F || minor > 0x3FF || patch > 0xFFF {
            anyhow::bail!(
                "instance.api_version {}.{}.{} does not fit a Vulkan version (max 127.1023.4095)",
                major,
                minor,
                patch
            );
        }

        Ok(vk::make_api_version(0, major, minor, patch))
    }
}

/// Physical device selection
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct DeviceConfig {
    /// Index into the enumerated physical devices
    pub index: usize,
}

/// Swapchain settings (chapter 8)
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SwapchainConfig {
    pub present_mode: String,
}

impl Default for SwapchainConfig {
    fn default() -> Self {
        Self {
            present_mode: "fifo".to_string(),
        }
    }
}

/// Debug settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub validation_layers: bool,
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            validation_layers: false,
            log_level: "info".to_string(),
        }
    }
}

/// Where the configuration came from.
///
/// Config is read before the logger exists, so the outcome is kept and
/// reported with [`ConfigSource::log`] once logging is up.
#[derive(Debug)]
pub enum ConfigSource {
    File(PathBuf),
    Missing(PathBuf),
    Invalid { path: PathBuf, error: anyhow::Error },
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            Self::File(path) | Self::Missing(path) | Self::Invalid { path, .. } => path,
        }
    }

    pub fn log(&self) {
        match self {
            Self::File(path) => log::info!("Loaded configuration from {:?}", path),
            Self::Missing(path) => log::info!("Config file not found at {:?}, using defaults", path),
            Self::Invalid { path, error } => {
                log::warn!("Failed to load {:?}: {:#}. Using defaults.", path, error)
            }
        }
    }
}

/// `override_path` (the value of `$VK_CHAPTERS_CONFIG`) if set, else `config.toml`
pub fn config_path(override_path: Option<OsString>) -> PathBuf {
    override_path
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

impl Config {
    /// Load configuration from `$VK_CHAPTERS_CONFIG` or `config.toml`,
    /// falling back to defaults on any error
    pub fn load() -> (Self, ConfigSource) {
        Self::load_or_default(config_path(std::env::var_os(CONFIG_PATH_VAR)))
    }

    /// Load from `path`; a missing or broken file yields defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> (Self, ConfigSource) {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            return (Config::default(), ConfigSource::Missing(path));
        }

        match Self::load_from_path(&path) {
            Ok(config) => (config, ConfigSource::File(path)),
            Err(error) => (Config::default(), ConfigSource::Invalid { path, error }),
        }
    }

    /// Load configuration from a specific path; a missing file yields defaults
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Requested present mode as Vulkan enum
    pub fn present_mode(&self) -> vk::PresentModeKHR {
        match self.swapchain.present_mode.to_lowercase().as_str() {
            "immediate" => vk::PresentModeKHR::IMMEDIATE,
            "mailbox" => vk::PresentModeKHR::MAILBOX,
            "fifo" => vk::PresentModeKHR::FIFO,
            "fifo_relaxed" => vk::PresentModeKHR::FIFO_RELAXED,
            _ => {
                log::warn!(
                    "Unknown present mode '{}', defaulting to FIFO",
                    self.swapchain.present_mode
                );
                vk::PresentModeKHR::FIFO
            }
        }
    }

    /// Default filter for env_logger, `RUST_LOG` still wins
    pub fn log_level(&self) -> log::LevelFilter {
        self.debug.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.instance.application_name, "Vulkan Example");
        assert_eq!(config.instance.engine_name, "Vulkan Engine");
        assert_eq!(config.device.index, 0);
        assert!(!config.debug.validation_layers);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = Config::from_toml(
            r#"
            [window]
            width = 800

            [device]
            index = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.window.title, "Vulkan Example");
        assert_eq!(config.device.index, 2);
    }

    #[test]
    fn api_version_is_packed() {
        let config = Config::default();
        let packed = config.instance.packed_api_version().unwrap();
        assert_eq!(vk::api_version_major(packed), 1);
        assert_eq!(vk::api_version_minor(packed), 0);
        assert_eq!(vk::api_version_patch(packed), 3);
    }

    #[test]
    fn oversized_api_version_is_rejected() {
        let mut config = InstanceConfig::default();

        config.api_version = [1, 1024, 0];
        assert!(config.packed_api_version().is_err());

        config.api_version = [128, 0, 0];
        assert!(config.packed_api_version().is_err());

        config.api_version = [1, 3, 4096];
        assert!(config.packed_api_version().is_err());

        config.api_version = [127, 1023, 4095];
        assert!(config.packed_api_version().is_ok());
    }

    #[test]
    fn present_mode_names() {
        let mut config = Config::default();
        assert_eq!(config.present_mode(), vk::PresentModeKHR::FIFO);

        config.swapchain.present_mode = "Mailbox".to_string();
        assert_eq!(config.present_mode(), vk::PresentModeKHR::MAILBOX);

        config.swapchain.present_mode = "triple".to_string();
        assert_eq!(config.present_mode(), vk::PresentModeKHR::FIFO);
    }

    #[test]
    fn log_level_falls_back_to_info() {
        let mut config = Config::default();
        config.debug.log_level = "trace".to_string();
        assert_eq!(config.log_level(), log::LevelFilter::Trace);

        config.debug.log_level = "loud".to_string();
        assert_eq!(config.log_level(), log::LevelFilter::Info);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(Config::from_toml("[window\nwidth = ").is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = Config::load_from_path("definitely/not/here.toml").unwrap();
        assert_eq!(config.window.title, "Vulkan Example");

        let (config, source) = Config::load_or_default("definitely/not/here.toml");
        assert_eq!(config.window.width, 1280);
        assert!(matches!(source, ConfigSource::Missing(_)));
    }

    #[test]
    fn broken_file_yields_defaults_and_keeps_the_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[window\nwidth = ").unwrap();

        let (config, source) = Config::load_or_default(file.path());

        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.title, "Vulkan Example");
        assert_eq!(source.path(), file.path());
        match source {
            ConfigSource::Invalid { error, .. } => {
                assert!(format!("{:#}", error).contains("Failed to parse config file"));
            }
            other => panic!("expected an invalid config, got {:?}", other),
        }
    }

    #[test]
    fn valid_file_is_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[window]\nwidth = 640").unwrap();

        let (config, source) = Config::load_or_default(file.path());

        assert_eq!(config.window.width, 640);
        assert!(matches!(source, ConfigSource::File(ref path) if path == file.path()));
    }

    #[test]
    fn override_path_wins_over_default_file() {
        assert_eq!(config_path(None), PathBuf::from("config.toml"));
        assert_eq!(config_path(Some(OsString::new())), PathBuf::from("config.toml"));
        assert_eq!(
            config_path(Some(OsString::from("/etc/vk/chapter.toml"))),
            PathBuf::from("/etc/vk/chapter.toml")
        );
    }
}
