//! Driver backed by the system Vulkan loader through `ash`

use ash::extensions::{ext::DebugUtils, khr};
use ash::{vk, Device, Entry, Instance};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use super::driver::{DeviceDescriptor, GraphicsDriver, InstanceDescriptor, MessengerDescriptor};
use super::error::{VulkanError, VulkanResult};

/// Real Vulkan driver
///
/// Holds the entry loader plus the instance and device function tables once
/// they exist. Extension loaders are built lazily the first time they are needed.
pub struct AshDriver {
    entry: Entry,
    instance: Option<Instance>,
    device: Option<Device>,
    debug_utils: Option<DebugUtils>,
    surface_loader: Option<khr::Surface>,
    allocation_callbacks: Option<vk::AllocationCallbacks>,
}

impl AshDriver {
    /// Load the Vulkan library
    pub fn load() -> VulkanResult<Self> {
        let entry = unsafe { Entry::load() }
            .map_err(|e| VulkanError::InitializationFailed(format!("Failed to load Vulkan: {:?}", e)))?;
        Ok(Self::with_entry(entry))
    }

    /// Wrap an already loaded entry
    pub fn with_entry(entry: Entry) -> Self {
        Self {
            entry,
            instance: None,
            device: None,
            debug_utils: None,
            surface_loader: None,
            allocation_callbacks: None,
        }
    }

    /// Use external host allocation callbacks for every create and destroy call
    ///
    /// # Safety
    ///
    /// The callbacks and their user data must stay valid until the driver is dropped.
    pub unsafe fn with_allocation_callbacks(mut self, callbacks: vk::AllocationCallbacks) -> Self {
        self.allocation_callbacks = Some(callbacks);
        self
    }

    /// Get a reference to the Vulkan entry
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    /// Instance function table, once the instance exists
    pub fn instance(&self) -> Option<&Instance> {
        self.instance.as_ref()
    }

    /// Device function table, once the logical device exists
    pub fn device(&self) -> Option<&Device> {
        self.device.as_ref()
    }

    fn loaded_instance(&self, instance: vk::Instance) -> VulkanResult<&Instance> {
        match &self.instance {
            Some(loaded) if loaded.handle() == instance => Ok(loaded),
            _ => Err(VulkanError::InvalidOperation {
                reason: format!("instance {:?} was not created by this driver", instance),
            }),
        }
    }

    fn debug_utils(&mut self, instance: vk::Instance) -> VulkanResult<&DebugUtils> {
        if self.debug_utils.is_none() {
            let loader = DebugUtils::new(&self.entry, self.loaded_instance(instance)?);
            self.debug_utils = Some(loader);
        }
        self.debug_utils.as_ref().ok_or_else(|| VulkanError::ExtensionNotPresent {
            name: DebugUtils::name().to_string_lossy().into_owned(),
        })
    }
}

fn messenger_create_info(descriptor: &MessengerDescriptor) -> vk::DebugUtilsMessengerCreateInfoEXT {
    vk::DebugUtilsMessengerCreateInfoEXT::builder()
        .message_severity(descriptor.severity)
        .message_type(descriptor.message_types)
        .pfn_user_callback(descriptor.callback)
        .build()
}

fn name_pointers(names: &[CString]) -> Vec<*const c_char> {
    names.iter().map(|name| name.as_ptr()).collect()
}

impl GraphicsDriver for AshDriver {
    fn create_instance(&mut self, descriptor: &InstanceDescriptor<'_>) -> VulkanResult<vk::Instance> {
        if self.instance.is_some() {
            return Err(VulkanError::InvalidOperation {
                reason: "driver already owns an instance".to_string(),
            });
        }

        let app_info = vk::ApplicationInfo::builder()
            .application_name(descriptor.application_name)
            .application_version(descriptor.application_version)
            .engine_name(descriptor.application_name)
            .engine_version(descriptor.application_version)
            .api_version(descriptor.api_version);

        let extensions = name_pointers(descriptor.extensions);
        let layers = name_pointers(descriptor.layers);

        // Chaining the messenger covers messages emitted during instance creation itself
        let mut messenger_info = descriptor.messenger.as_ref().map(messenger_create_info);

        let mut create_info = vk::InstanceCreateInfo::builder()
            .flags(descriptor.flags)
            .application_info(&app_info)
            .enabled_extension_names(&extensions)
            .enabled_layer_names(&layers);

        if let Some(info) = messenger_info.as_mut() {
            create_info = create_info.push_next(info);
        }

        let instance = unsafe {
            self.entry
                .create_instance(&create_info, self.allocation_callbacks.as_ref())
                .map_err(VulkanError::Api)?
        };

        let handle = instance.handle();
        self.instance = Some(instance);
        Ok(handle)
    }

    fn instance_function_available(&self, instance: vk::Instance, name: &str) -> bool {
        let Ok(name) = CString::new(name) else {
            return false;
        };
        let function = unsafe { self.entry.get_instance_proc_addr(instance, name.as_ptr()) };
        function.is_some()
    }

    fn create_debug_messenger(
        &mut self,
        instance: vk::Instance,
        descriptor: &MessengerDescriptor,
    ) -> VulkanResult<vk::DebugUtilsMessengerEXT> {
        let allocator = self.allocation_callbacks;
        let create_info = messenger_create_info(descriptor);
        let debug_utils = self.debug_utils(instance)?;

        unsafe {
            debug_utils
                .create_debug_utils_messenger(&create_info, allocator.as_ref())
                .map_err(VulkanError::Api)
        }
    }

    fn enumerate_physical_devices(&self, instance: vk::Instance) -> VulkanResult<Vec<vk::PhysicalDevice>> {
        let loader = self.loaded_instance(instance)?;
        unsafe { loader.enumerate_physical_devices() }.map_err(VulkanError::from_enumeration)
    }

    fn queue_family_properties(&self, physical_device: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties> {
        match &self.instance {
            Some(loader) => unsafe { loader.get_physical_device_queue_family_properties(physical_device) },
            None => Vec::new(),
        }
    }

    fn device_extension_names(&self, physical_device: vk::PhysicalDevice) -> VulkanResult<Vec<String>> {
        let Some(loader) = &self.instance else {
            return Err(VulkanError::InvalidOperation {
                reason: "no instance to query device extensions from".to_string(),
            });
        };

        let properties = unsafe { loader.enumerate_device_extension_properties(physical_device) }
            .map_err(VulkanError::from_enumeration)?;

        let mut names = Vec::new();
        names.try_reserve_exact(properties.len())?;
        names.extend(properties.iter().map(|property| {
            unsafe { CStr::from_ptr(property.extension_name.as_ptr()) }
                .to_string_lossy()
                .into_owned()
        }));
        Ok(names)
    }

    fn physical_device_name(&self, physical_device: vk::PhysicalDevice) -> String {
        match &self.instance {
            Some(loader) => {
                let properties = unsafe { loader.get_physical_device_properties(physical_device) };
                unsafe { CStr::from_ptr(properties.device_name.as_ptr()) }
                    .to_string_lossy()
                    .into_owned()
            }
            None => format!("{:?}", physical_device),
        }
    }

    fn create_device(
        &mut self,
        physical_device: vk::PhysicalDevice,
        descriptor: &DeviceDescriptor<'_>,
    ) -> VulkanResult<vk::Device> {
        if self.device.is_some() {
            return Err(VulkanError::InvalidOperation {
                reason: "driver already owns a logical device".to_string(),
            });
        }
        let Some(loader) = &self.instance else {
            return Err(VulkanError::InvalidOperation {
                reason: "no instance to create a device from".to_string(),
            });
        };

        let queue_infos = [vk::DeviceQueueCreateInfo::builder()
            .queue_family_index(descriptor.queue_family_index)
            .queue_priorities(descriptor.queue_priorities)
            .build()];

        let extensions = name_pointers(descriptor.extensions);

        let create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(&queue_infos)
            .enabled_extension_names(&extensions);

        let device = unsafe {
            loader
                .create_device(physical_device, &create_info, self.allocation_callbacks.as_ref())
                .map_err(VulkanError::Api)?
        };

        let handle = device.handle();
        self.device = Some(device);
        Ok(handle)
    }

    fn device_queue(&self, device: vk::Device, queue_family_index: u32, queue_index: u32) -> vk::Queue {
        match &self.device {
            Some(loaded) if loaded.handle() == device => unsafe {
                loaded.get_device_queue(queue_family_index, queue_index)
            },
            _ => vk::Queue::null(),
        }
    }

    fn allocation_callbacks(&self) -> Option<&vk::AllocationCallbacks> {
        self.allocation_callbacks.as_ref()
    }

    fn destroy_debug_messenger(
        &mut self,
        instance: vk::Instance,
        messenger: vk::DebugUtilsMessengerEXT,
    ) -> VulkanResult<()> {
        let allocator = self.allocation_callbacks;
        let debug_utils = self.debug_utils(instance)?;
        unsafe {
            debug_utils.destroy_debug_utils_messenger(messenger, allocator.as_ref());
        }
        Ok(())
    }

    fn destroy_surface(&mut self, instance: vk::Instance, surface: vk::SurfaceKHR) {
        if self.surface_loader.is_none() {
            let created = self
                .loaded_instance(instance)
                .map(|loader| khr::Surface::new(&self.entry, loader));
            match created {
                Ok(loader) => self.surface_loader = Some(loader),
                Err(e) => {
                    log::warn!("Cannot destroy surface {:?}: {}", surface, e);
                    return;
                }
            }
        }
        if let Some(surface_loader) = &self.surface_loader {
            unsafe {
                surface_loader.destroy_surface(surface, self.allocation_callbacks.as_ref());
            }
        }
    }

    fn destroy_device(&mut self, device: vk::Device) {
        match self.device.take() {
            Some(loaded) if loaded.handle() == device => unsafe {
                // Ensure device is idle before destruction
                let _ = loaded.device_wait_idle();
                loaded.destroy_device(self.allocation_callbacks.as_ref());
            },
            other => {
                log::warn!("Device {:?} was not created by this driver", device);
                self.device = other;
            }
        }
    }

    fn destroy_instance(&mut self, instance: vk::Instance) {
        match self.instance.take() {
            Some(loaded) if loaded.handle() == instance => {
                self.debug_utils = None;
                self.surface_loader = None;
                unsafe {
                    loaded.destroy_instance(self.allocation_callbacks.as_ref());
                }
            }
            other => {
                log::warn!("Instance {:?} was not created by this driver", instance);
                self.instance = other;
            }
        }
    }
}
