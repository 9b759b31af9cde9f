//! Instance creation, validation layers and the debug messenger

use ash::vk;
use std::ffi::{CStr, CString};

use super::extensions::{to_cstrings, PORTABILITY_ENUMERATION_EXTENSION};
use crate::backends::vulkan::driver::{
    GraphicsDriver, InstanceDescriptor, MessengerDescriptor, CREATE_DEBUG_MESSENGER_FN,
};
use crate::backends::vulkan::{VulkanError, VulkanResult};

/// Khronos validation layer, enabled whenever validation is requested
pub const VALIDATION_LAYER: &str = "VK_LAYER_KHRONOS_validation";

/// Parameters for instance creation
#[derive(Clone, Copy)]
pub struct InstanceRequest<'a> {
    /// Application name, also used as the engine name
    pub application_name: &'a str,
    /// Packed application version
    pub application_version: u32,
    /// Packed API version
    pub api_version: u32,
    /// Instance extensions, already resolved
    pub extensions: &'a [String],
    /// Enable the validation layer
    pub validation: bool,
    /// Diagnostics sink; ignored unless validation is enabled
    pub diagnostics_callback: vk::PFN_vkDebugUtilsMessengerCallbackEXT,
}

impl InstanceRequest<'_> {
    /// Messenger parameters, present only when validation and a callback are both set
    pub fn messenger_descriptor(&self) -> Option<MessengerDescriptor> {
        if self.validation && self.diagnostics_callback.is_some() {
            Some(MessengerDescriptor::new(self.diagnostics_callback))
        } else {
            None
        }
    }
}

/// Create the API instance
///
/// Status codes from the driver are returned unchanged. Nothing is created on failure.
pub fn create_instance<D: GraphicsDriver>(driver: &mut D, request: &InstanceRequest<'_>) -> VulkanResult<vk::Instance> {
    let application_name = CString::new(request.application_name).map_err(|_| VulkanError::InvalidOperation {
        reason: "application name contains an interior NUL".to_string(),
    })?;
    let extensions = to_cstrings(request.extensions)?;
    let layers = if request.validation {
        to_cstrings(&[VALIDATION_LAYER.to_string()])?
    } else {
        Vec::new()
    };

    let flags = if request
        .extensions
        .iter()
        .any(|name| name == PORTABILITY_ENUMERATION_EXTENSION)
    {
        vk::InstanceCreateFlags::ENUMERATE_PORTABILITY_KHR
    } else {
        vk::InstanceCreateFlags::empty()
    };

    let descriptor = InstanceDescriptor {
        application_name: &application_name,
        application_version: request.application_version,
        api_version: request.api_version,
        flags,
        extensions: &extensions,
        layers: &layers,
        messenger: request.messenger_descriptor(),
    };

    let instance = driver.create_instance(&descriptor)?;
    log::info!(
        "Created Vulkan instance for '{}' ({} extensions, validation {})",
        request.application_name,
        extensions.len(),
        if request.validation { "on" } else { "off" }
    );
    Ok(instance)
}

/// Create the standalone debug messenger, if validation and diagnostics are both enabled
///
/// The creation function is an extension function resolved at runtime; when it
/// cannot be resolved this fails with [`VulkanError::ExtensionNotPresent`].
pub fn create_debug_messenger<D: GraphicsDriver>(
    driver: &mut D,
    instance: vk::Instance,
    request: &InstanceRequest<'_>,
) -> VulkanResult<Option<vk::DebugUtilsMessengerEXT>> {
    let Some(descriptor) = request.messenger_descriptor() else {
        return Ok(None);
    };

    if !driver.instance_function_available(instance, CREATE_DEBUG_MESSENGER_FN) {
        return Err(VulkanError::ExtensionNotPresent {
            name: CREATE_DEBUG_MESSENGER_FN.to_string(),
        });
    }

    let messenger = driver.create_debug_messenger(instance, &descriptor)?;
    log::debug!("Debug messenger registered");
    Ok(Some(messenger))
}

/// Diagnostics sink that forwards validation messages to the `log` facade
///
/// # Safety
///
/// Only the Vulkan loader calls this, with valid callback data.
pub unsafe extern "system" fn log_debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    if callback_data.is_null() || (*callback_data).p_message.is_null() {
        return vk::FALSE;
    }
    let message = CStr::from_ptr((*callback_data).p_message).to_string_lossy();

    if message_severity >= vk::DebugUtilsMessageSeverityFlagsEXT::ERROR {
        log::error!("[Vulkan] {:?} - {}", message_type, message);
    } else if message_severity >= vk::DebugUtilsMessageSeverityFlagsEXT::WARNING {
        log::warn!("[Vulkan] {:?} - {}", message_type, message);
    } else if message_severity >= vk::DebugUtilsMessageSeverityFlagsEXT::INFO {
        log::info!("[Vulkan] {:?} - {}", message_type, message);
    } else {
        log::debug!("[Vulkan] {:?} - {}", message_type, message);
    }

    vk::FALSE
}
