// Platform selection - which window-system surface path we use
//
// The window system is known as soon as the event loop exists, before any
// window is opened, so the instance can be created with the right surface
// extension up front.

use anyhow::Result;
use ash::extensions::khr;
use ash::{vk, Entry};
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};
use std::ffi::{c_void, CStr};

use crate::error::SetupError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Win32,
    Xlib,
    Xcb,
    Wayland,
}

impl Platform {
    /// Pick the platform from the display handle of the running event loop
    pub fn from_display(display: RawDisplayHandle) -> Result<Self, SetupError> {
        match display {
            RawDisplayHandle::Windows(_) => Ok(Self::Win32),
            RawDisplayHandle::Xlib(_) => Ok(Self::Xlib),
            RawDisplayHandle::Xcb(_) => Ok(Self::Xcb),
            RawDisplayHandle::Wayland(_) => Ok(Self::Wayland),
            other => Err(SetupError::UnsupportedPlatform(format!("{:?}", other))),
        }
    }

    pub fn surface_extension(self) -> &'static CStr {
        match self {
            Self::Win32 => khr::Win32Surface::name(),
            Self::Xlib => khr::XlibSurface::name(),
            Self::Xcb => khr::XcbSurface::name(),
            Self::Wayland => khr::WaylandSurface::name(),
        }
    }

    /// Instance extensions needed to present on this platform
    pub fn instance_extensions(self) -> Vec<&'static CStr> {
        vec![khr::Surface::name(), self.surface_extension()]
    }

    /// Create a `VkSurfaceKHR` for a window.
    ///
    /// # Safety
    /// The handles must belong to a live window that outlives the surface,
    /// and `instance` must have been created with [`Self::instance_extensions`].
    pub unsafe fn create_surface(
        self,
        entry: &Entry,
        instance: &ash::Instance,
        display: RawDisplayHandle,
        window: RawWindowHandle,
    ) -> Result<vk::SurfaceKHR> {
        let surface = match (self, display, window) {
            (Self::Win32, RawDisplayHandle::Windows(_), RawWindowHandle::Win32(handle)) => {
                let hinstance = handle.hinstance.map(|h| h.get()).unwrap_or(0) as *const c_void;
                let hwnd = handle.hwnd.get() as *const c_void;
                let create_info = vk::Win32SurfaceCreateInfoKHR::builder()
                    .hinstance(hinstance)
                    .hwnd(hwnd);
                khr::Win32Surface::new(entry, instance).create_win32_surface(&create_info, None)
            }
            (Self::Xlib, RawDisplayHandle::Xlib(display), RawWindowHandle::Xlib(handle)) => {
                let dpy = display
                    .display
                    .ok_or_else(|| SetupError::UnsupportedPlatform("Xlib without a display connection".into()))?;
                let create_info = vk::XlibSurfaceCreateInfoKHR::builder()
                    .dpy(dpy.as_ptr().cast())
                    .window(handle.window);
                khr::XlibSurface::new(entry, instance).create_xlib_surface(&create_info, None)
            }
            (Self::Xcb, RawDisplayHandle::Xcb(display), RawWindowHandle::Xcb(handle)) => {
                let connection = display
                    .connection
                    .ok_or_else(|| SetupError::UnsupportedPlatform("XCB without a server connection".into()))?;
                let create_info = vk::XcbSurfaceCreateInfoKHR::builder()
                    .connection(connection.as_ptr().cast())
                    .window(handle.window.get());
                khr::XcbSurface::new(entry, instance).create_xcb_surface(&create_info, None)
            }
            (Self::Wayland, RawDisplayHandle::Wayland(display), RawWindowHandle::Wayland(handle)) => {
                let create_info = vk::WaylandSurfaceCreateInfoKHR::builder()
                    .display(display.display.as_ptr().cast())
                    .surface(handle.surface.as_ptr().cast());
                khr::WaylandSurface::new(entry, instance).create_wayland_surface(&create_info, None)
            }
            (platform, _, window) => {
                return Err(SetupError::UnsupportedPlatform(format!(
                    "{:?} window handle on {:?}",
                    window, platform
                ))
                .into());
            }
        };

        Ok(surface.map_err(SetupError::SurfaceCreation)?)
    }
}
