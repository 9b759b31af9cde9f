//! Windowing collaborators
//!
//! The bootstrap only asks the windowing system for two things: the instance
//! extensions the platform needs, and a presentation surface bound to an
//! instance. [`WindowSystem`] is that contract; [`Window`] implements it with
//! GLFW and [`RawWindowSurface`] with any `raw-window-handle` window.

use ash::vk;
use thiserror::Error;

mod glfw_window;
mod raw_handle;

pub use glfw_window::Window;
pub use raw_handle::RawWindowSurface;

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// GLFW could not be initialized
    #[error("GLFW initialization failed")]
    InitializationFailed,

    /// The native window could not be created
    #[error("Window creation failed")]
    CreationFailed,

    /// The platform reports no Vulkan support
    #[error("Vulkan is not supported by the windowing system: {0}")]
    VulkanUnsupported(String),

    /// Surface creation returned an error status
    #[error("Surface creation failed: {0:?}")]
    SurfaceCreation(vk::Result),
}

/// Result type for window operations
pub type WindowResult<T> = Result<T, WindowError>;

/// What the bootstrap needs from a windowing system
pub trait WindowSystem {
    /// Instance extensions the platform requires for presentation
    fn required_instance_extensions(&self) -> WindowResult<Vec<String>>;

    /// Create a presentation surface bound to `instance`
    ///
    /// Ownership of the returned surface passes to the caller.
    fn create_surface(
        &mut self,
        instance: vk::Instance,
        allocator: Option<&vk::AllocationCallbacks>,
    ) -> WindowResult<vk::SurfaceKHR>;
}
