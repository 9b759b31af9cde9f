//! Instance and device extension lists

use std::ffi::CString;

use crate::backends::vulkan::{VulkanError, VulkanResult};

/// Lets the loader enumerate portability implementations
pub const PORTABILITY_ENUMERATION_EXTENSION: &str = "VK_KHR_portability_enumeration";

/// Debug messenger support
pub const DEBUG_UTILS_EXTENSION: &str = "VK_EXT_debug_utils";

/// Builds the ordered instance extension list
///
/// Platform names come first, in the order the windowing system reported them,
/// followed by portability enumeration and the diagnostics extension when enabled.
#[derive(Debug, Clone, Default)]
pub struct ExtensionResolver {
    platform: Vec<String>,
    portability_enumeration: bool,
    diagnostics: bool,
}

impl ExtensionResolver {
    /// Start from the extensions the windowing system requires
    pub fn new(platform: Vec<String>) -> Self {
        Self {
            platform,
            portability_enumeration: false,
            diagnostics: false,
        }
    }

    /// Append the portability enumeration extension
    pub fn with_portability_enumeration(mut self, enabled: bool) -> Self {
        self.portability_enumeration = enabled;
        self
    }

    /// Append the debug utils extension
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    /// Final instance extension list
    pub fn instance_extensions(&self) -> Vec<String> {
        let mut extensions = self.platform.clone();
        if self.portability_enumeration {
            extensions.push(PORTABILITY_ENUMERATION_EXTENSION.to_string());
        }
        if self.diagnostics {
            extensions.push(DEBUG_UTILS_EXTENSION.to_string());
        }
        extensions
    }
}

/// Convert extension or layer names to NUL-terminated strings for the API
pub fn to_cstrings(names: &[String]) -> VulkanResult<Vec<CString>> {
    names
        .iter()
        .map(|name| {
            CString::new(name.as_str()).map_err(|_| VulkanError::InvalidOperation {
                reason: format!("name {:?} contains an interior NUL", name),
            })
        })
        .collect()
}
