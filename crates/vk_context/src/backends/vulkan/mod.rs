//! Vulkan backend implementation
//!
//! Organized into the driver boundary and the initialization pipeline built on it.

/// Error types shared by the backend
pub mod error;

/// The boundary between bootstrap logic and the Vulkan API
pub mod driver;

/// `ash`-backed driver
pub mod ash_driver;

/// Context bootstrap (extensions, instance, device selection, queues, device, surface, teardown)
pub mod initialization;

pub use ash_driver::AshDriver;
pub use driver::{DeviceDescriptor, GraphicsDriver, InstanceDescriptor, MessengerDescriptor};
pub use error::{VulkanError, VulkanResult};

// Re-export core initialization types
pub use initialization::context::{ContextDescriptor, GraphicsContext};
pub use initialization::lifecycle::{OwnedResource, OwnedResources};
pub use initialization::physical_device::{PhysicalDeviceSelection, QueueCount, QueueRequest};
pub use initialization::queues::QueueAllocation;
