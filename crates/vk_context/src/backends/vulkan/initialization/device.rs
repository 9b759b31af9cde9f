//! Logical device creation

use ash::vk;

use super::extensions::to_cstrings;
use super::queues::QueueAllocation;
use crate::backends::vulkan::driver::{DeviceDescriptor, GraphicsDriver};
use crate::backends::vulkan::VulkanResult;

/// Logical device and the queues retrieved from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalDevice {
    /// Owned device handle
    pub device: vk::Device,
    /// Queues of the allocated family, in queue index order
    pub queues: Vec<vk::Queue>,
}

/// Create the logical device with a single queue family and the given extensions enabled
///
/// Creation failures are passed through unchanged.
pub fn create_logical_device<D: GraphicsDriver>(
    driver: &mut D,
    physical_device: vk::PhysicalDevice,
    allocation: &QueueAllocation,
    device_extensions: &[String],
) -> VulkanResult<LogicalDevice> {
    let extensions = to_cstrings(device_extensions)?;

    let descriptor = DeviceDescriptor {
        queue_family_index: allocation.queue_family_index,
        queue_priorities: &allocation.priorities,
        extensions: &extensions,
    };

    let device = driver.create_device(physical_device, &descriptor)?;

    let queues = (0..allocation.queue_count())
        .map(|index| driver.device_queue(device, allocation.queue_family_index, index))
        .collect();

    log::debug!(
        "Created logical device with {} queue(s) from family {}",
        allocation.queue_count(),
        allocation.queue_family_index
    );

    Ok(LogicalDevice { device, queues })
}
