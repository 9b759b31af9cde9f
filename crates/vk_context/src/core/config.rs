//! # Bootstrap Configuration
//!
//! Serializable settings for context bootstrap and the host window. Everything
//! here is plain data; [`ContextDescriptor`](crate::ContextDescriptor) turns it
//! into the runtime request handed to the bootstrap.
//!
//! ## Example (TOML)
//!
//! ```toml
//! application_name = "catan"
//! enable_validation = true
//! device_extensions = ["VK_KHR_swapchain"]
//!
//! [queue]
//! capabilities = ["graphics"]
//! count = 0
//! ```

use ash::vk;
use serde::{Deserialize, Serialize};

use crate::config::{Config, ConfigError};

/// Swapchain extension, the minimal device extension a presenting context needs
pub const SWAPCHAIN_EXTENSION: &str = "VK_KHR_swapchain";

/// Queue capability a selected queue family must offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueCapability {
    /// Graphics commands
    Graphics,
    /// Compute dispatches
    Compute,
    /// Transfer operations
    Transfer,
    /// Sparse memory binding
    SparseBinding,
}

impl QueueCapability {
    /// Matching Vulkan queue flag
    pub fn flag(self) -> vk::QueueFlags {
        match self {
            Self::Graphics => vk::QueueFlags::GRAPHICS,
            Self::Compute => vk::QueueFlags::COMPUTE,
            Self::Transfer => vk::QueueFlags::TRANSFER,
            Self::SparseBinding => vk::QueueFlags::SPARSE_BINDING,
        }
    }
}

/// Queue requirements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Capabilities the queue family must offer, all of them
    pub capabilities: Vec<QueueCapability>,
    /// Number of queues to create; 0 takes every queue the chosen family has
    pub count: u32,
}

impl QueueConfig {
    /// Union of the required capability flags
    pub fn flags(&self) -> vk::QueueFlags {
        self.capabilities
            .iter()
            .fold(vk::QueueFlags::empty(), |flags, capability| flags | capability.flag())
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capabilities: vec![QueueCapability::Graphics],
            count: 0,
        }
    }
}

/// # Context Bootstrap Configuration
///
/// Application metadata, validation, and the requirements the physical device
/// must meet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Application name, also used as the engine name
    pub application_name: String,
    /// Application version (major, minor, patch)
    pub application_version: (u32, u32, u32),
    /// API version the instance is pinned to (major, minor)
    pub api_version: (u32, u32),
    /// Whether to enable Vulkan validation layers; `None` follows the build type
    pub enable_validation: Option<bool>,
    /// Register the logging diagnostics sink when validation is on
    pub diagnostics: bool,
    /// Enumerate portability (non-conformant) implementations such as MoltenVK
    pub portability_enumeration: bool,
    /// Queue requirements
    pub queue: QueueConfig,
    /// Device extensions that must all be supported and are enabled on the device
    pub device_extensions: Vec<String>,
}

impl BootstrapConfig {
    /// Create a configuration with defaults for `app_name`
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            application_name: app_name.into(),
            application_version: (1, 0, 0),
            api_version: (1, 3),
            enable_validation: None,
            diagnostics: true,
            portability_enumeration: true,
            queue: QueueConfig::default(),
            device_extensions: vec![SWAPCHAIN_EXTENSION.to_string()],
        }
    }

    /// Set application version
    pub fn with_version(mut self, major: u32, minor: u32, patch: u32) -> Self {
        self.application_version = (major, minor, patch);
        self
    }

    /// Enable or disable validation layers
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.enable_validation = Some(enabled);
        self
    }

    /// Request `count` queues with the given capabilities (0 for all of the family's queues)
    pub fn with_queues(mut self, capabilities: Vec<QueueCapability>, count: u32) -> Self {
        self.queue = QueueConfig { capabilities, count };
        self
    }

    /// Replace the required device extensions
    pub fn with_device_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.device_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Resolved validation setting: explicit value, or on in debug builds
    pub fn validation_enabled(&self) -> bool {
        self.enable_validation.unwrap_or(cfg!(debug_assertions))
    }

    /// Packed application version
    pub fn packed_application_version(&self) -> u32 {
        let (major, minor, patch) = self.application_version;
        vk::make_api_version(0, major, minor, patch)
    }

    /// Packed API version
    pub fn packed_api_version(&self) -> u32 {
        let (major, minor) = self.api_version;
        vk::make_api_version(0, major, minor, 0)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.application_name.is_empty() {
            return Err(ConfigError::Invalid("Application name cannot be empty".to_string()));
        }
        if self.application_name.contains('\0') {
            return Err(ConfigError::Invalid("Application name cannot contain NUL".to_string()));
        }
        if self.queue.capabilities.is_empty() {
            return Err(ConfigError::Invalid("At least one queue capability is required".to_string()));
        }
        if let Some(name) = self.device_extensions.iter().find(|name| name.is_empty() || name.contains('\0')) {
            return Err(ConfigError::Invalid(format!("Invalid device extension name {:?}", name)));
        }
        Ok(())
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self::new("Vulkan Application")
    }
}

impl Config for BootstrapConfig {}

/// Host window settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Width in screen coordinates
    pub width: u32,
    /// Height in screen coordinates
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Vulkan Application".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Everything the demo application reads at startup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Context bootstrap settings
    pub bootstrap: BootstrapConfig,
    /// Window settings
    pub window: WindowConfig,
}

impl Config for ApplicationConfig {}
