//! Vulkan bootstrap error types

use ash::vk;
use thiserror::Error;

/// Vulkan-specific error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VulkanError {
    /// Status code returned by an instance or device creation call, passed through unchanged
    #[error("Vulkan API error: {0:?}")]
    Api(vk::Result),

    /// A working buffer could not be allocated
    #[error("Out of host memory")]
    OutOfHostMemory,

    /// A required extension, or the dynamically-resolved function needed to use it, is unavailable
    #[error("Extension not present: {name}")]
    ExtensionNotPresent {
        /// Name of the missing extension or extension function
        name: String,
    },

    /// No physical device satisfies the queue and extension requirements
    #[error("No physical device satisfies the requested queue and extension requirements")]
    FeatureNotPresent,

    /// The windowing system could not bind a presentation surface
    #[error("Surface creation failed: {0}")]
    SurfaceCreationFailed(String),

    /// Invalid operation attempted
    #[error("Invalid operation: {reason}")]
    InvalidOperation {
        /// Description of why the operation is invalid
        reason: String,
    },

    /// Vulkan loader or platform initialization failed
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),
}

/// Result type for Vulkan operations
pub type VulkanResult<T> = Result<T, VulkanError>;

impl VulkanError {
    /// Map an enumeration status code, folding host-memory exhaustion into [`VulkanError::OutOfHostMemory`]
    pub fn from_enumeration(result: vk::Result) -> Self {
        match result {
            vk::Result::ERROR_OUT_OF_HOST_MEMORY => Self::OutOfHostMemory,
            other => Self::Api(other),
        }
    }

    /// Closest `vk::Result` status for this error
    pub fn vk_result(&self) -> vk::Result {
        match self {
            Self::Api(result) => *result,
            Self::OutOfHostMemory => vk::Result::ERROR_OUT_OF_HOST_MEMORY,
            Self::ExtensionNotPresent { .. } => vk::Result::ERROR_EXTENSION_NOT_PRESENT,
            Self::FeatureNotPresent => vk::Result::ERROR_FEATURE_NOT_PRESENT,
            Self::SurfaceCreationFailed(_) => vk::Result::ERROR_SURFACE_LOST_KHR,
            Self::InvalidOperation { .. } | Self::InitializationFailed(_) => {
                vk::Result::ERROR_INITIALIZATION_FAILED
            }
        }
    }
}

impl From<std::collections::TryReserveError> for VulkanError {
    fn from(_: std::collections::TryReserveError) -> Self {
        Self::OutOfHostMemory
    }
}
