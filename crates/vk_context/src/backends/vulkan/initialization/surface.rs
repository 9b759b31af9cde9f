//! Vulkan surface binding
//!
//! The surface itself is created by the windowing system; binding only asks
//! for it and hands ownership to the context.

use ash::vk;

use crate::backends::vulkan::{VulkanError, VulkanResult};
use crate::window::WindowSystem;

/// Platform instance extensions reported by the windowing system
pub fn platform_instance_extensions<W: WindowSystem + ?Sized>(window: &W) -> VulkanResult<Vec<String>> {
    window
        .required_instance_extensions()
        .map_err(|e| VulkanError::InitializationFailed(format!("Failed to get required extensions: {}", e)))
}

/// Ask the windowing system for a presentation surface bound to `instance`
pub fn bind_surface<W: WindowSystem + ?Sized>(
    window: &mut W,
    instance: vk::Instance,
    allocator: Option<&vk::AllocationCallbacks>,
) -> VulkanResult<vk::SurfaceKHR> {
    let surface = window
        .create_surface(instance, allocator)
        .map_err(|e| VulkanError::SurfaceCreationFailed(e.to_string()))?;

    if surface == vk::SurfaceKHR::null() {
        return Err(VulkanError::SurfaceCreationFailed(
            "windowing system returned a null surface".to_string(),
        ));
    }

    log::debug!("Bound presentation surface {:?}", surface);
    Ok(surface)
}
