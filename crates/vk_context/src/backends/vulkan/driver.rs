//! Graphics driver boundary
//!
//! Every call the bootstrap makes into the Vulkan API goes through
//! [`GraphicsDriver`]. Handles cross the boundary as raw `vk` handles so the
//! bootstrap logic can be driven by [`AshDriver`](super::AshDriver) against a
//! real loader, or by a recording driver in tests.

use ash::vk;
use std::ffi::CString;

use super::error::VulkanResult;

/// Name of the dynamically-resolved messenger creation function
pub const CREATE_DEBUG_MESSENGER_FN: &str = "vkCreateDebugUtilsMessengerEXT";

/// Name of the dynamically-resolved messenger destruction function
pub const DESTROY_DEBUG_MESSENGER_FN: &str = "vkDestroyDebugUtilsMessengerEXT";

/// Parameters of the debug messenger, chained onto instance creation and used again
/// to create the standalone messenger
#[derive(Clone, Copy)]
pub struct MessengerDescriptor {
    /// Severities forwarded to the callback
    pub severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    /// Message types forwarded to the callback
    pub message_types: vk::DebugUtilsMessageTypeFlagsEXT,
    /// Diagnostics sink
    pub callback: vk::PFN_vkDebugUtilsMessengerCallbackEXT,
}

impl MessengerDescriptor {
    /// Verbose, warning and error messages of every type
    pub fn new(callback: vk::PFN_vkDebugUtilsMessengerCallbackEXT) -> Self {
        Self {
            severity: vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            message_types: vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            callback,
        }
    }
}

impl std::fmt::Debug for MessengerDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessengerDescriptor")
            .field("severity", &self.severity)
            .field("message_types", &self.message_types)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// Everything needed to create an instance
#[derive(Debug)]
pub struct InstanceDescriptor<'a> {
    /// Application and engine name
    pub application_name: &'a CString,
    /// Packed application version
    pub application_version: u32,
    /// Packed API version the instance is pinned to
    pub api_version: u32,
    /// Instance creation flags
    pub flags: vk::InstanceCreateFlags,
    /// Enabled instance extensions, in order
    pub extensions: &'a [CString],
    /// Enabled layers
    pub layers: &'a [CString],
    /// Messenger chained onto instance creation, if diagnostics are on
    pub messenger: Option<MessengerDescriptor>,
}

/// Everything needed to create a logical device with a single queue family
#[derive(Debug)]
pub struct DeviceDescriptor<'a> {
    /// Queue family the queues are created from
    pub queue_family_index: u32,
    /// One priority per queue
    pub queue_priorities: &'a [f32],
    /// Enabled device extensions
    pub extensions: &'a [CString],
}

/// Calls the bootstrap makes into the graphics API
///
/// Implementations own whatever loader state they need; callers only ever see
/// raw handles. Destroy calls are never issued twice for the same handle.
pub trait GraphicsDriver {
    /// Create the API instance
    fn create_instance(&mut self, descriptor: &InstanceDescriptor<'_>) -> VulkanResult<vk::Instance>;

    /// Capability lookup for an instance-level extension function
    fn instance_function_available(&self, instance: vk::Instance, name: &str) -> bool;

    /// Create a debug messenger on `instance`
    fn create_debug_messenger(
        &mut self,
        instance: vk::Instance,
        descriptor: &MessengerDescriptor,
    ) -> VulkanResult<vk::DebugUtilsMessengerEXT>;

    /// Physical devices exposed by `instance`, in driver order
    fn enumerate_physical_devices(&self, instance: vk::Instance) -> VulkanResult<Vec<vk::PhysicalDevice>>;

    /// Queue families of `physical_device`, indexed by family index
    fn queue_family_properties(&self, physical_device: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties>;

    /// Names of the extensions `physical_device` supports
    fn device_extension_names(&self, physical_device: vk::PhysicalDevice) -> VulkanResult<Vec<String>>;

    /// Human-readable device name
    fn physical_device_name(&self, physical_device: vk::PhysicalDevice) -> String;

    /// Create a logical device
    fn create_device(
        &mut self,
        physical_device: vk::PhysicalDevice,
        descriptor: &DeviceDescriptor<'_>,
    ) -> VulkanResult<vk::Device>;

    /// Queue `queue_index` of family `queue_family_index`
    fn device_queue(&self, device: vk::Device, queue_family_index: u32, queue_index: u32) -> vk::Queue;

    /// Host allocation callbacks passed to every create and destroy call
    fn allocation_callbacks(&self) -> Option<&vk::AllocationCallbacks>;

    /// Destroy a debug messenger
    fn destroy_debug_messenger(
        &mut self,
        instance: vk::Instance,
        messenger: vk::DebugUtilsMessengerEXT,
    ) -> VulkanResult<()>;

    /// Destroy a surface created by the windowing system
    fn destroy_surface(&mut self, instance: vk::Instance, surface: vk::SurfaceKHR);

    /// Destroy a logical device
    fn destroy_device(&mut self, device: vk::Device);

    /// Destroy the instance
    fn destroy_instance(&mut self, instance: vk::Instance);
}
