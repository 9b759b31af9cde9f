//! Ownership registry and teardown
//!
//! Each owned handle is registered the moment it is created. The registry keeps
//! entries in teardown order (messenger, surface, device, instance) no matter
//! which order they were registered in, so teardown of a partially built
//! context is just draining it. The physical device is never registered: it is
//! a reference into the driver's enumeration, not something this crate owns.

use ash::vk::{self, Handle};

use crate::backends::vulkan::driver::{GraphicsDriver, DESTROY_DEBUG_MESSENGER_FN};
use crate::backends::vulkan::{VulkanError, VulkanResult};

/// A handle owned by the context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnedResource {
    /// Debug messenger, destroyed first
    DebugMessenger(vk::DebugUtilsMessengerEXT),
    /// Presentation surface
    Surface(vk::SurfaceKHR),
    /// Logical device
    Device(vk::Device),
    /// Instance, destroyed last
    Instance(vk::Instance),
}

impl OwnedResource {
    /// Position in teardown order, lowest first
    pub fn teardown_rank(&self) -> u8 {
        match self {
            Self::DebugMessenger(_) => 0,
            Self::Surface(_) => 1,
            Self::Device(_) => 2,
            Self::Instance(_) => 3,
        }
    }

    fn raw(&self) -> u64 {
        match self {
            Self::DebugMessenger(handle) => handle.as_raw(),
            Self::Surface(handle) => handle.as_raw(),
            Self::Device(handle) => handle.as_raw(),
            Self::Instance(handle) => handle.as_raw(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::DebugMessenger(_) => "debug messenger",
            Self::Surface(_) => "surface",
            Self::Device(_) => "logical device",
            Self::Instance(_) => "instance",
        }
    }
}

/// Owned handles, kept in teardown order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OwnedResources {
    entries: Vec<OwnedResource>,
}

impl OwnedResources {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a freshly created handle
    ///
    /// Null handles and a second handle of the same kind are rejected.
    pub fn register(&mut self, resource: OwnedResource) -> VulkanResult<()> {
        if resource.raw() == 0 {
            return Err(VulkanError::InvalidOperation {
                reason: format!("cannot take ownership of a null {}", resource.kind()),
            });
        }

        let rank = resource.teardown_rank();
        if self.entries.iter().any(|entry| entry.teardown_rank() == rank) {
            return Err(VulkanError::InvalidOperation {
                reason: format!("context already owns a {}", resource.kind()),
            });
        }

        let position = self.entries.partition_point(|entry| entry.teardown_rank() < rank);
        self.entries.insert(position, resource);
        Ok(())
    }

    /// Owned instance
    pub fn instance(&self) -> Option<vk::Instance> {
        self.entries.iter().find_map(|entry| match entry {
            OwnedResource::Instance(handle) => Some(*handle),
            _ => None,
        })
    }

    /// Owned logical device
    pub fn device(&self) -> Option<vk::Device> {
        self.entries.iter().find_map(|entry| match entry {
            OwnedResource::Device(handle) => Some(*handle),
            _ => None,
        })
    }

    /// Owned surface
    pub fn surface(&self) -> Option<vk::SurfaceKHR> {
        self.entries.iter().find_map(|entry| match entry {
            OwnedResource::Surface(handle) => Some(*handle),
            _ => None,
        })
    }

    /// Owned debug messenger
    pub fn debug_messenger(&self) -> Option<vk::DebugUtilsMessengerEXT> {
        self.entries.iter().find_map(|entry| match entry {
            OwnedResource::DebugMessenger(handle) => Some(*handle),
            _ => None,
        })
    }

    /// Owned handles in teardown order
    pub fn iter(&self) -> impl Iterator<Item = &OwnedResource> {
        self.entries.iter()
    }

    /// Number of owned handles
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is owned
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn take_next(&mut self) -> Option<OwnedResource> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0))
        }
    }
}

/// Destroy every owned handle in teardown order, leaving the registry empty
///
/// Never fails. A messenger whose destroy function cannot be resolved is
/// forgotten with a warning. Returns the number of handles destroyed.
pub fn teardown<D: GraphicsDriver>(driver: &mut D, resources: &mut OwnedResources) -> usize {
    let instance = resources.instance().unwrap_or_else(vk::Instance::null);
    let mut destroyed = 0;

    while let Some(resource) = resources.take_next() {
        match resource {
            OwnedResource::DebugMessenger(messenger) => {
                if !driver.instance_function_available(instance, DESTROY_DEBUG_MESSENGER_FN) {
                    log::warn!(
                        "{} unavailable, debug messenger {:?} not destroyed",
                        DESTROY_DEBUG_MESSENGER_FN,
                        messenger
                    );
                    continue;
                }
                if let Err(e) = driver.destroy_debug_messenger(instance, messenger) {
                    log::warn!("Failed to destroy debug messenger: {}", e);
                    continue;
                }
            }
            OwnedResource::Surface(surface) => driver.destroy_surface(instance, surface),
            OwnedResource::Device(device) => driver.destroy_device(device),
            OwnedResource::Instance(handle) => driver.destroy_instance(handle),
        }
        log::debug!("Destroyed {}", resource.kind());
        destroyed += 1;
    }

    destroyed
}
