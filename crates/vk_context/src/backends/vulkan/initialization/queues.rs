//! Queue priorities for the selected family

use super::physical_device::PhysicalDeviceSelection;
use crate::backends::vulkan::{VulkanError, VulkanResult};

/// Queues to create from a single family
#[derive(Debug, Clone, PartialEq)]
pub struct QueueAllocation {
    /// Family the queues come from
    pub queue_family_index: u32,
    /// One priority per queue
    pub priorities: Vec<f32>,
}

impl QueueAllocation {
    /// Equal-weighted allocation for the selected family
    pub fn for_selection(selection: &PhysicalDeviceSelection) -> VulkanResult<Self> {
        Ok(Self {
            queue_family_index: selection.queue_family_index,
            priorities: queue_priorities(selection.queue_count)?,
        })
    }

    /// Number of queues
    pub fn queue_count(&self) -> u32 {
        self.priorities.len() as u32
    }
}

/// `count` priorities of `1.0 / count` each
///
/// The priorities are a scheduling hint and always sum to one.
pub fn queue_priorities(count: u32) -> VulkanResult<Vec<f32>> {
    if count == 0 {
        return Err(VulkanError::InvalidOperation {
            reason: "at least one queue is required".to_string(),
        });
    }

    let mut priorities = Vec::new();
    priorities.try_reserve_exact(count as usize)?;
    priorities.resize(count as usize, 1.0 / count as f32);
    Ok(priorities)
}
