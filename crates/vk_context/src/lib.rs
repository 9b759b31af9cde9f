//! # vk_context
//!
//! Vulkan context bootstrap: creates the instance, optionally attaches the
//! validation layer and a diagnostics messenger, selects a physical device that
//! meets queue and extension requirements, creates the logical device and its
//! queues, and binds a presentation surface supplied by the windowing system.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vk_context::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     vk_context::foundation::logging::init();
//!
//!     let config = BootstrapConfig::new("catan");
//!     let mut window = Window::new(&config.application_name, 1280, 720)?;
//!     let driver = AshDriver::load()?;
//!
//!     let mut context = GraphicsContext::bootstrap(driver, &ContextDescriptor::from_config(&config), &mut window)?;
//!     // ... use context.device() and context.queues() ...
//!     context.teardown();
//!     Ok(())
//! }
//! ```
//!
//! Device selection takes the first device, in driver order, that qualifies.
//! Nothing ranks discrete over integrated GPUs.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod backends;
pub mod config;
pub mod core;
pub mod foundation;
pub mod window;

#[cfg(test)]
mod testing;

pub use backends::vulkan::{
    AshDriver, ContextDescriptor, GraphicsContext, GraphicsDriver, VulkanError, VulkanResult,
};

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        backends::vulkan::{
            AshDriver, ContextDescriptor, GraphicsContext, GraphicsDriver, PhysicalDeviceSelection,
            QueueRequest, VulkanError, VulkanResult,
        },
        config::{Config, ConfigError},
        core::config::{ApplicationConfig, BootstrapConfig, QueueCapability, QueueConfig, WindowConfig},
        window::{Window, WindowError, WindowSystem},
    };
}
