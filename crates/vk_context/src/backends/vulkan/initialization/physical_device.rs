//! Physical device selection
//!
//! Selection is first-match-wins: devices are examined in the order the driver
//! enumerates them and the first one that offers a qualifying queue family and
//! every required device extension is taken. There is no scoring, so on a
//! machine with an integrated and a discrete GPU the driver's order decides.
//! Ranking devices belongs in a layer above this one.

use ash::vk;

use crate::backends::vulkan::driver::GraphicsDriver;
use crate::backends::vulkan::{VulkanError, VulkanResult};

/// How many queues to take from the selected family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueCount {
    /// Any family qualifies; take every queue it has
    All,
    /// The family must have at least this many queues
    Exactly(u32),
}

impl From<u32> for QueueCount {
    fn from(count: u32) -> Self {
        match count {
            0 => Self::All,
            n => Self::Exactly(n),
        }
    }
}

/// Queue capabilities and count the selected family must satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueRequest {
    /// Flags the family must contain, all of them
    pub flags: vk::QueueFlags,
    /// Requested queue count
    pub count: QueueCount,
}

impl QueueRequest {
    /// Request `count` queues (0 for all) from a family offering `flags`
    pub fn new(flags: vk::QueueFlags, count: u32) -> Self {
        Self {
            flags,
            count: count.into(),
        }
    }

    /// Queue count to create from `family`, or `None` when the family does not qualify
    pub fn resolve(&self, family: &vk::QueueFamilyProperties) -> Option<u32> {
        if family.queue_count == 0 || !family.queue_flags.contains(self.flags) {
            return None;
        }
        match self.count {
            QueueCount::All => Some(family.queue_count),
            QueueCount::Exactly(requested) if family.queue_count >= requested => Some(requested),
            QueueCount::Exactly(_) => None,
        }
    }
}

/// Result of physical device selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalDeviceSelection {
    /// Selected device; a reference into driver-enumerated devices, never destroyed
    pub physical_device: vk::PhysicalDevice,
    /// Index of the qualifying queue family
    pub queue_family_index: u32,
    /// Number of queues to create from that family
    pub queue_count: u32,
}

/// First queue family of `physical_device` satisfying `request`, with the resolved queue count
pub fn find_queue_family<D: GraphicsDriver>(
    driver: &D,
    physical_device: vk::PhysicalDevice,
    request: &QueueRequest,
) -> Option<(u32, u32)> {
    driver
        .queue_family_properties(physical_device)
        .iter()
        .enumerate()
        .find_map(|(index, family)| request.resolve(family).map(|count| (index as u32, count)))
}

/// Required extensions `physical_device` does not support (exact, case-sensitive names)
pub fn missing_device_extensions<D: GraphicsDriver>(
    driver: &D,
    physical_device: vk::PhysicalDevice,
    required: &[String],
) -> VulkanResult<Vec<String>> {
    if required.is_empty() {
        return Ok(Vec::new());
    }
    let supported = driver.device_extension_names(physical_device)?;
    Ok(required
        .iter()
        .filter(|name| !supported.iter().any(|supported| supported == *name))
        .cloned()
        .collect())
}

/// Pick the first physical device meeting the queue and extension requirements
///
/// Fails with [`VulkanError::FeatureNotPresent`] when the instance exposes no
/// devices or none qualifies.
pub fn select_physical_device<D: GraphicsDriver>(
    driver: &D,
    instance: vk::Instance,
    request: &QueueRequest,
    required_extensions: &[String],
) -> VulkanResult<PhysicalDeviceSelection> {
    let devices = driver.enumerate_physical_devices(instance)?;
    if devices.is_empty() {
        log::warn!("No Vulkan physical devices found");
        return Err(VulkanError::FeatureNotPresent);
    }

    for physical_device in devices {
        let name = driver.physical_device_name(physical_device);

        let Some((queue_family_index, queue_count)) = find_queue_family(driver, physical_device, request) else {
            log::debug!("Rejected GPU {}: no queue family offers {:?} x {:?}", name, request.flags, request.count);
            continue;
        };

        let missing = missing_device_extensions(driver, physical_device, required_extensions)?;
        if !missing.is_empty() {
            log::debug!("Rejected GPU {}: missing device extensions {:?}", name, missing);
            continue;
        }

        log::info!(
            "Selected GPU: {} (queue family {}, {} queue(s))",
            name,
            queue_family_index,
            queue_count
        );
        return Ok(PhysicalDeviceSelection {
            physical_device,
            queue_family_index,
            queue_count,
        });
    }

    Err(VulkanError::FeatureNotPresent)
}
