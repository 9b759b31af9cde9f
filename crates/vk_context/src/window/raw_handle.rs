//! Surfaces for windows exposed through `raw-window-handle`

use ash::{vk, Entry};
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};
use std::ffi::CStr;

use super::{WindowError, WindowResult, WindowSystem};

/// Adapts any window that exposes raw display and window handles (winit, SDL, ...)
///
/// Surface creation goes through `ash-window`, which needs the entry loader
/// to rebuild the instance function table from the raw instance handle.
pub struct RawWindowSurface<W> {
    entry: Entry,
    window: W,
}

impl<W> RawWindowSurface<W>
where
    W: HasRawWindowHandle + HasRawDisplayHandle,
{
    /// Wrap `window`, loading surface functions through `entry`
    pub fn new(entry: Entry, window: W) -> Self {
        Self { entry, window }
    }

    /// The wrapped window
    pub fn window(&self) -> &W {
        &self.window
    }
}

impl<W> WindowSystem for RawWindowSurface<W>
where
    W: HasRawWindowHandle + HasRawDisplayHandle,
{
    fn required_instance_extensions(&self) -> WindowResult<Vec<String>> {
        let names = ash_window::enumerate_required_extensions(self.window.raw_display_handle())
            .map_err(|e| WindowError::VulkanUnsupported(format!("{:?}", e)))?;

        Ok(names
            .iter()
            .map(|&name| unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned())
            .collect())
    }

    fn create_surface(
        &mut self,
        instance: vk::Instance,
        allocator: Option<&vk::AllocationCallbacks>,
    ) -> WindowResult<vk::SurfaceKHR> {
        let instance = unsafe { ash::Instance::load(self.entry.static_fn(), instance) };

        unsafe {
            ash_window::create_surface(
                &self.entry,
                &instance,
                self.window.raw_display_handle(),
                self.window.raw_window_handle(),
                allocator,
            )
        }
        .map_err(WindowError::SurfaceCreation)
    }
}
