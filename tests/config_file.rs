use ash::vk;
use vk_chapters::Config;

#[test]
fn shipped_config_parses() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml");
    let config = Config::load_from_path(path).unwrap();

    assert_eq!(config.window.title, "Vulkan Example");
    assert_eq!((config.window.width, config.window.height), (1280, 720));
    assert_eq!(config.instance.engine_name, "Vulkan Engine");
    assert_eq!(config.instance.api_version, [1, 0, 3]);
    assert_eq!(config.device.index, 0);
    assert_eq!(config.present_mode(), vk::PresentModeKHR::FIFO);
    assert!(config.debug.validation_layers);
}

#[test]
fn shipped_config_matches_defaults_where_it_overlaps() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml");
    let shipped = Config::load_from_path(path).unwrap();
    let defaults = Config::default();

    assert_eq!(shipped.window.title, defaults.window.title);
    assert_eq!(shipped.instance.application_name, defaults.instance.application_name);
    assert_eq!(
        shipped.instance.packed_api_version().unwrap(),
        defaults.instance.packed_api_version().unwrap()
    );
}
