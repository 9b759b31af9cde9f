//! Recording driver and window for tests that run without a GPU

use ash::vk::{self, Handle};
use std::cell::RefCell;
use std::rc::Rc;

use crate::backends::vulkan::driver::{DeviceDescriptor, GraphicsDriver, InstanceDescriptor, MessengerDescriptor};
use crate::backends::vulkan::{VulkanError, VulkanResult};
use crate::window::{WindowError, WindowResult, WindowSystem};

pub const INSTANCE: u64 = 0x1000;
pub const DEVICE: u64 = 0x2000;
pub const MESSENGER: u64 = 0x3000;
pub const SURFACE: u64 = 0x4000;
const QUEUE_BASE: u64 = 0x5000;

/// One observed call across the driver and window boundary
#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    CreateInstance {
        extensions: Vec<String>,
        layers: Vec<String>,
        flags: vk::InstanceCreateFlags,
        chained_messenger: bool,
    },
    CreateDebugMessenger,
    CreateDevice {
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
        priorities: Vec<f32>,
        extensions: Vec<String>,
    },
    CreateSurface,
    DestroyDebugMessenger(vk::DebugUtilsMessengerEXT),
    DestroySurface(vk::SurfaceKHR),
    DestroyDevice(vk::Device),
    DestroyInstance(vk::Instance),
}

impl DriverCall {
    fn is_destroy(&self) -> bool {
        matches!(
            self,
            Self::DestroyDebugMessenger(_) | Self::DestroySurface(_) | Self::DestroyDevice(_) | Self::DestroyInstance(_)
        )
    }
}

pub type CallLog = Rc<RefCell<Vec<DriverCall>>>;

pub fn destroy_calls(log: &CallLog) -> Vec<DriverCall> {
    log.borrow().iter().filter(|call| call.is_destroy()).cloned().collect()
}

fn to_strings(names: &[std::ffi::CString]) -> Vec<String> {
    names.iter().map(|name| name.to_string_lossy().into_owned()).collect()
}

/// A physical device as the mock driver reports it
#[derive(Debug, Clone)]
pub struct MockDevice {
    pub handle: vk::PhysicalDevice,
    pub name: String,
    pub queue_families: Vec<vk::QueueFamilyProperties>,
    pub extensions: Vec<String>,
}

impl MockDevice {
    pub fn new(raw: u64, name: &str) -> Self {
        Self {
            handle: vk::PhysicalDevice::from_raw(raw),
            name: name.to_string(),
            queue_families: Vec::new(),
            extensions: Vec::new(),
        }
    }

    pub fn with_queue_family(mut self, flags: vk::QueueFlags, count: u32) -> Self {
        self.queue_families.push(vk::QueueFamilyProperties {
            queue_flags: flags,
            queue_count: count,
            ..Default::default()
        });
        self
    }

    pub fn with_extensions(mut self, names: &[&str]) -> Self {
        self.extensions.extend(names.iter().map(|name| name.to_string()));
        self
    }
}

pub struct MockDriver {
    pub devices: Vec<MockDevice>,
    pub fail_instance: Option<vk::Result>,
    pub fail_device: Option<vk::Result>,
    pub fail_enumeration: Option<vk::Result>,
    pub debug_functions_available: bool,
    calls: CallLog,
}

impl MockDriver {
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
            fail_instance: None,
            fail_device: None,
            fail_enumeration: None,
            debug_functions_available: true,
            calls: CallLog::default(),
        }
    }

    pub fn with_devices(mut self, devices: Vec<MockDevice>) -> Self {
        self.devices = devices;
        self
    }

    pub fn instance_handle(&self) -> vk::Instance {
        vk::Instance::from_raw(INSTANCE)
    }

    /// Shared handle on the call log, still readable after the driver is dropped
    pub fn call_log(&self) -> CallLog {
        Rc::clone(&self.calls)
    }

    pub fn calls(&self) -> Vec<DriverCall> {
        self.calls.borrow().clone()
    }

    pub fn destroy_calls(&self) -> Vec<DriverCall> {
        destroy_calls(&self.calls)
    }

    fn device(&self, handle: vk::PhysicalDevice) -> Option<&MockDevice> {
        self.devices.iter().find(|device| device.handle == handle)
    }

    fn record(&self, call: DriverCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl GraphicsDriver for MockDriver {
    fn create_instance(&mut self, descriptor: &InstanceDescriptor<'_>) -> VulkanResult<vk::Instance> {
        if let Some(result) = self.fail_instance {
            return Err(VulkanError::Api(result));
        }
        self.record(DriverCall::CreateInstance {
            extensions: to_strings(descriptor.extensions),
            layers: to_strings(descriptor.layers),
            flags: descriptor.flags,
            chained_messenger: descriptor.messenger.is_some(),
        });
        Ok(vk::Instance::from_raw(INSTANCE))
    }

    fn instance_function_available(&self, instance: vk::Instance, _name: &str) -> bool {
        self.debug_functions_available && instance != vk::Instance::null()
    }

    fn create_debug_messenger(
        &mut self,
        _instance: vk::Instance,
        _descriptor: &MessengerDescriptor,
    ) -> VulkanResult<vk::DebugUtilsMessengerEXT> {
        self.record(DriverCall::CreateDebugMessenger);
        Ok(vk::DebugUtilsMessengerEXT::from_raw(MESSENGER))
    }

    fn enumerate_physical_devices(&self, _instance: vk::Instance) -> VulkanResult<Vec<vk::PhysicalDevice>> {
        if let Some(result) = self.fail_enumeration {
            return Err(VulkanError::from_enumeration(result));
        }
        Ok(self.devices.iter().map(|device| device.handle).collect())
    }

    fn queue_family_properties(&self, physical_device: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties> {
        self.device(physical_device)
            .map(|device| device.queue_families.clone())
            .unwrap_or_default()
    }

    fn device_extension_names(&self, physical_device: vk::PhysicalDevice) -> VulkanResult<Vec<String>> {
        Ok(self
            .device(physical_device)
            .map(|device| device.extensions.clone())
            .unwrap_or_default())
    }

    fn physical_device_name(&self, physical_device: vk::PhysicalDevice) -> String {
        self.device(physical_device)
            .map(|device| device.name.clone())
            .unwrap_or_default()
    }

    fn create_device(
        &mut self,
        physical_device: vk::PhysicalDevice,
        descriptor: &DeviceDescriptor<'_>,
    ) -> VulkanResult<vk::Device> {
        if let Some(result) = self.fail_device {
            return Err(VulkanError::Api(result));
        }
        self.record(DriverCall::CreateDevice {
            physical_device,
            queue_family_index: descriptor.queue_family_index,
            priorities: descriptor.queue_priorities.to_vec(),
            extensions: to_strings(descriptor.extensions),
        });
        Ok(vk::Device::from_raw(DEVICE))
    }

    fn device_queue(&self, _device: vk::Device, queue_family_index: u32, queue_index: u32) -> vk::Queue {
        vk::Queue::from_raw(QUEUE_BASE + u64::from(queue_family_index) * 0x100 + u64::from(queue_index) + 1)
    }

    fn allocation_callbacks(&self) -> Option<&vk::AllocationCallbacks> {
        None
    }

    fn destroy_debug_messenger(
        &mut self,
        _instance: vk::Instance,
        messenger: vk::DebugUtilsMessengerEXT,
    ) -> VulkanResult<()> {
        self.record(DriverCall::DestroyDebugMessenger(messenger));
        Ok(())
    }

    fn destroy_surface(&mut self, _instance: vk::Instance, surface: vk::SurfaceKHR) {
        self.record(DriverCall::DestroySurface(surface));
    }

    fn destroy_device(&mut self, device: vk::Device) {
        self.record(DriverCall::DestroyDevice(device));
    }

    fn destroy_instance(&mut self, instance: vk::Instance) {
        self.record(DriverCall::DestroyInstance(instance));
    }
}

pub struct MockWindow {
    pub extensions: Vec<String>,
    pub fail_extensions: bool,
    pub fail_surface: bool,
    calls: CallLog,
}

impl MockWindow {
    pub fn new() -> Self {
        Self {
            extensions: vec!["VK_KHR_surface".to_string(), "VK_KHR_xcb_surface".to_string()],
            fail_extensions: false,
            fail_surface: false,
            calls: CallLog::default(),
        }
    }

    /// Record surface creation into a driver's log so ordering can be asserted across both
    pub fn with_call_log(mut self, calls: CallLog) -> Self {
        self.calls = calls;
        self
    }
}

impl WindowSystem for MockWindow {
    fn required_instance_extensions(&self) -> WindowResult<Vec<String>> {
        if self.fail_extensions {
            return Err(WindowError::VulkanUnsupported("mock".to_string()));
        }
        Ok(self.extensions.clone())
    }

    fn create_surface(
        &mut self,
        _instance: vk::Instance,
        _allocator: Option<&vk::AllocationCallbacks>,
    ) -> WindowResult<vk::SurfaceKHR> {
        if self.fail_surface {
            return Err(WindowError::SurfaceCreation(vk::Result::ERROR_INITIALIZATION_FAILED));
        }
        self.calls.borrow_mut().push(DriverCall::CreateSurface);
        Ok(vk::SurfaceKHR::from_raw(SURFACE))
    }
}
