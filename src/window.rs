// Window setup and event translation
//
// Everything here is plain data so it can be tested without a display.

use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::WindowEvent;
use winit::window::WindowAttributes;

use crate::config::WindowConfig;

/// What the event loop should do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    Continue,
    Close,
}

/// Only close requests end the loop; nothing is drawn, so redraws are no-ops.
pub fn action_for(event: &WindowEvent) -> LoopAction {
    match event {
        WindowEvent::CloseRequested | WindowEvent::Destroyed => LoopAction::Close,
        _ => LoopAction::Continue,
    }
}

/// Top-left corner that centers `window` on a screen of size `screen`
pub fn centered_position(screen: PhysicalSize<u32>, window: PhysicalSize<u32>) -> PhysicalPosition<i32> {
    let x = screen.width as i32 / 2 - window.width as i32 / 2;
    let y = screen.height as i32 / 2 - window.height as i32 / 2;
    PhysicalPosition::new(x, y)
}

/// Attributes for the chapter window; `screen` is the primary monitor size if known
pub fn window_attributes(config: &WindowConfig, screen: Option<PhysicalSize<u32>>) -> WindowAttributes {
    let size = PhysicalSize::new(config.width, config.height);

    let mut attributes = WindowAttributes::default()
        .with_title(&config.title)
        .with_inner_size(size);

    if config.centered {
        if let Some(screen) = screen {
            attributes = attributes.with_position(centered_position(screen, size));
        }
    }

    attributes
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::Position;

    #[test]
    fn close_requested_ends_the_loop() {
        assert_eq!(action_for(&WindowEvent::CloseRequested), LoopAction::Close);
        assert_eq!(action_for(&WindowEvent::Destroyed), LoopAction::Close);
    }

    #[test]
    fn other_events_keep_running() {
        assert_eq!(action_for(&WindowEvent::RedrawRequested), LoopAction::Continue);
        assert_eq!(
            action_for(&WindowEvent::Resized(PhysicalSize::new(640, 480))),
            LoopAction::Continue
        );
        assert_eq!(action_for(&WindowEvent::Focused(true)), LoopAction::Continue);
    }

    #[test]
    fn window_is_centered() {
        let pos = centered_position(PhysicalSize::new(1920, 1080), PhysicalSize::new(1280, 720));
        assert_eq!(pos, PhysicalPosition::new(320, 180));
    }

    #[test]
    fn oversized_window_goes_negative() {
        let pos = centered_position(PhysicalSize::new(1024, 768), PhysicalSize::new(1280, 720));
        assert_eq!(pos, PhysicalPosition::new(-128, 24));
    }

    #[test]
    fn attributes_follow_config() {
        let config = WindowConfig::default();
        let attributes = window_attributes(&config, Some(PhysicalSize::new(1920, 1080)));

        assert_eq!(attributes.title, "Vulkan Example");
        assert_eq!(
            attributes.position,
            Some(Position::Physical(PhysicalPosition::new(320, 180)))
        );
    }

    #[test]
    fn no_monitor_means_no_position() {
        let config = WindowConfig::default();
        assert!(window_attributes(&config, None).position.is_none());

        let config = WindowConfig {
            centered: false,
            ..WindowConfig::default()
        };
        assert!(window_attributes(&config, Some(PhysicalSize::new(1920, 1080)))
            .position
            .is_none());
    }
}
