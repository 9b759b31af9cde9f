//! Context bootstrap pipeline, one module per step

/// Aggregate context and the bootstrap sequence
pub mod context;

/// Logical device factory
pub mod device;

/// Instance extension resolution
pub mod extensions;

/// Instance, validation layer and debug messenger
pub mod instance;

/// Owned handle registry and ordered teardown
pub mod lifecycle;

/// Physical device and queue family selection
pub mod physical_device;

/// Queue priorities
pub mod queues;

/// Presentation surface binding
pub mod surface;
