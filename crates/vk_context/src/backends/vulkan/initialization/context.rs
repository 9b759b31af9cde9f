//! Vulkan context management
//!
//! [`GraphicsContext`] is the aggregate a caller owns: instance, optional debug
//! messenger, selected physical device, logical device with its queues, and
//! the presentation surface. Bootstrap runs
//! extensions → instance → messenger → device selection → queues →
//! logical device → surface, and stops at the first failure, tearing down
//! whatever was built before returning the original error.

use ash::vk;

use super::device::create_logical_device;
use super::extensions::ExtensionResolver;
use super::instance::{create_debug_messenger, create_instance, log_debug_callback, InstanceRequest};
use super::lifecycle::{teardown, OwnedResource, OwnedResources};
use super::physical_device::{select_physical_device, QueueRequest};
use super::queues::QueueAllocation;
use super::surface::{bind_surface, platform_instance_extensions};
use crate::backends::vulkan::driver::GraphicsDriver;
use crate::backends::vulkan::{VulkanError, VulkanResult};
use crate::core::config::BootstrapConfig;
use crate::window::WindowSystem;

/// Runtime bootstrap request
#[derive(Clone)]
pub struct ContextDescriptor {
    /// Application name, also used as the engine name
    pub application_name: String,
    /// Packed application version
    pub application_version: u32,
    /// Packed API version the instance is pinned to
    pub api_version: u32,
    /// Enable validation layers and the diagnostics extension
    pub validation: bool,
    /// Append the portability enumeration extension
    pub portability_enumeration: bool,
    /// Diagnostics sink registered when validation is on
    pub diagnostics_callback: vk::PFN_vkDebugUtilsMessengerCallbackEXT,
    /// Queue capability and count requirements
    pub queue_request: QueueRequest,
    /// Device extensions that must be supported, enabled on the logical device
    pub device_extensions: Vec<String>,
}

impl ContextDescriptor {
    /// Build the request described by `config`
    pub fn from_config(config: &BootstrapConfig) -> Self {
        let validation = config.validation_enabled();
        Self {
            application_name: config.application_name.clone(),
            application_version: config.packed_application_version(),
            api_version: config.packed_api_version(),
            validation,
            portability_enumeration: config.portability_enumeration,
            diagnostics_callback: if validation && config.diagnostics {
                Some(log_debug_callback)
            } else {
                None
            },
            queue_request: QueueRequest::new(config.queue.flags(), config.queue.count),
            device_extensions: config.device_extensions.clone(),
        }
    }

    /// Replace the diagnostics sink
    pub fn with_diagnostics_callback(mut self, callback: vk::PFN_vkDebugUtilsMessengerCallbackEXT) -> Self {
        self.diagnostics_callback = callback;
        self
    }
}

impl std::fmt::Debug for ContextDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextDescriptor")
            .field("application_name", &self.application_name)
            .field("validation", &self.validation)
            .field("portability_enumeration", &self.portability_enumeration)
            .field("diagnostics_callback", &self.diagnostics_callback.is_some())
            .field("queue_request", &self.queue_request)
            .field("device_extensions", &self.device_extensions)
            .finish_non_exhaustive()
    }
}

/// Main Vulkan context that owns all core Vulkan resources
///
/// Single-threaded: no operation may run concurrently with another on the same context.
pub struct GraphicsContext<D: GraphicsDriver> {
    driver: D,
    resources: OwnedResources,
    physical_device: vk::PhysicalDevice,
    queue_family_index: u32,
    queue_count: u32,
    queues: Vec<vk::Queue>,
    required_instance_extensions: Vec<String>,
    required_device_extensions: Vec<String>,
    validation_enabled: bool,
    bound: bool,
}

impl<D: GraphicsDriver> GraphicsContext<D> {
    /// Empty context; every handle is null until [`initialize`](Self::initialize) runs
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            resources: OwnedResources::new(),
            physical_device: vk::PhysicalDevice::null(),
            queue_family_index: 0,
            queue_count: 0,
            queues: Vec::new(),
            required_instance_extensions: Vec::new(),
            required_device_extensions: Vec::new(),
            validation_enabled: false,
            bound: false,
        }
    }

    /// Create and fully initialize a context, tearing down on failure
    pub fn bootstrap<W: WindowSystem + ?Sized>(
        driver: D,
        descriptor: &ContextDescriptor,
        window: &mut W,
    ) -> VulkanResult<Self> {
        let mut context = Self::new(driver);
        context.initialize(descriptor, window)?;
        Ok(context)
    }

    /// Run the bootstrap sequence on a fresh context
    ///
    /// On failure everything created so far is torn down and the original error
    /// is returned. A context bootstraps at most once: any later call, including
    /// one after teardown, fails with [`VulkanError::InvalidOperation`].
    pub fn initialize<W: WindowSystem + ?Sized>(
        &mut self,
        descriptor: &ContextDescriptor,
        window: &mut W,
    ) -> VulkanResult<()> {
        if self.bound {
            return Err(VulkanError::InvalidOperation {
                reason: "context has already been initialized".to_string(),
            });
        }
        self.bound = true;

        let result = self.run_bootstrap(descriptor, window);
        if let Err(e) = &result {
            log::error!("Vulkan context initialization failed: {}", e);
            self.teardown();
        }
        result
    }

    fn run_bootstrap<W: WindowSystem + ?Sized>(
        &mut self,
        descriptor: &ContextDescriptor,
        window: &mut W,
    ) -> VulkanResult<()> {
        let platform = platform_instance_extensions(&*window)?;
        self.required_instance_extensions = ExtensionResolver::new(platform)
            .with_portability_enumeration(descriptor.portability_enumeration)
            .with_diagnostics(descriptor.validation)
            .instance_extensions();
        self.required_device_extensions = descriptor.device_extensions.clone();
        self.validation_enabled = descriptor.validation;

        let request = InstanceRequest {
            application_name: &descriptor.application_name,
            application_version: descriptor.application_version,
            api_version: descriptor.api_version,
            extensions: &self.required_instance_extensions,
            validation: descriptor.validation,
            diagnostics_callback: descriptor.diagnostics_callback,
        };

        let instance = create_instance(&mut self.driver, &request)?;
        self.resources.register(OwnedResource::Instance(instance))?;

        if let Some(messenger) = create_debug_messenger(&mut self.driver, instance, &request)? {
            self.resources.register(OwnedResource::DebugMessenger(messenger))?;
        }

        let selection = select_physical_device(
            &self.driver,
            instance,
            &descriptor.queue_request,
            &self.required_device_extensions,
        )?;
        self.physical_device = selection.physical_device;
        self.queue_family_index = selection.queue_family_index;
        self.queue_count = selection.queue_count;

        let allocation = QueueAllocation::for_selection(&selection)?;
        let logical = create_logical_device(
            &mut self.driver,
            selection.physical_device,
            &allocation,
            &self.required_device_extensions,
        )?;
        self.resources.register(OwnedResource::Device(logical.device))?;
        self.queues = logical.queues;

        let surface = bind_surface(window, instance, self.driver.allocation_callbacks())?;
        self.resources.register(OwnedResource::Surface(surface))?;

        log::info!("Vulkan context ready ({} queue(s))", self.queue_count);
        Ok(())
    }

    /// Destroy every owned handle in messenger → surface → device → instance order
    ///
    /// Safe on a partially initialized context and idempotent: a second call finds
    /// nothing left to destroy.
    pub fn teardown(&mut self) {
        let destroyed = teardown(&mut self.driver, &mut self.resources);
        if destroyed > 0 {
            log::debug!("Vulkan context torn down ({} handles destroyed)", destroyed);
        }
        self.physical_device = vk::PhysicalDevice::null();
        self.queue_family_index = 0;
        self.queue_count = 0;
        self.queues.clear();
    }

    /// Get the instance handle (null until created)
    pub fn instance(&self) -> vk::Instance {
        self.resources.instance().unwrap_or_else(vk::Instance::null)
    }

    /// Get the physical device info (null until selected)
    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    /// Get the logical device handle (null until created)
    pub fn device(&self) -> vk::Device {
        self.resources.device().unwrap_or_else(vk::Device::null)
    }

    /// Get the surface handle (null until bound)
    pub fn surface(&self) -> vk::SurfaceKHR {
        self.resources.surface().unwrap_or_else(vk::SurfaceKHR::null)
    }

    /// Get the debug messenger handle (null when diagnostics are off)
    pub fn debug_messenger(&self) -> vk::DebugUtilsMessengerEXT {
        self.resources
            .debug_messenger()
            .unwrap_or_else(vk::DebugUtilsMessengerEXT::null)
    }

    /// Get the graphics queue family index
    pub fn queue_family_index(&self) -> u32 {
        self.queue_family_index
    }

    /// Number of queues created on the logical device
    pub fn queue_count(&self) -> u32 {
        self.queue_count
    }

    /// Queues of the selected family
    pub fn queues(&self) -> &[vk::Queue] {
        &self.queues
    }

    /// Instance extensions the context was created with
    pub fn required_instance_extensions(&self) -> &[String] {
        &self.required_instance_extensions
    }

    /// Device extensions required of and enabled on the device
    pub fn required_device_extensions(&self) -> &[String] {
        &self.required_device_extensions
    }

    /// Whether validation layers were requested
    pub fn validation_enabled(&self) -> bool {
        self.validation_enabled
    }

    /// Handles currently owned, in teardown order
    pub fn owned_resources(&self) -> &OwnedResources {
        &self.resources
    }

    /// Get the driver, e.g. to reach the `ash` function tables
    pub fn driver(&self) -> &D {
        &self.driver
    }
}

impl<D: GraphicsDriver> Drop for GraphicsContext<D> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::vulkan::initialization::extensions::{
        DEBUG_UTILS_EXTENSION, PORTABILITY_ENUMERATION_EXTENSION,
    };
    use crate::backends::vulkan::initialization::instance::VALIDATION_LAYER;
    use crate::core::config::QueueCapability;
    use crate::testing::{DriverCall, MockDevice, MockDriver, MockWindow, DEVICE, INSTANCE, MESSENGER, SURFACE};
    use ash::vk::Handle;

    const SWAPCHAIN: &str = "VK_KHR_swapchain";

    fn descriptor(count: u32) -> ContextDescriptor {
        let config = BootstrapConfig::new("catan")
            .with_validation(true)
            .with_queues(vec![QueueCapability::Graphics], count);
        ContextDescriptor::from_config(&config)
    }

    fn two_devices() -> Vec<MockDevice> {
        vec![
            MockDevice::new(1, "lacks swapchain").with_queue_family(vk::QueueFlags::GRAPHICS, 4),
            MockDevice::new(2, "full support")
                .with_queue_family(vk::QueueFlags::TRANSFER, 1)
                .with_queue_family(vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE, 2)
                .with_extensions(&[SWAPCHAIN]),
        ]
    }

    #[test]
    fn test_bootstrap_selects_second_device() {
        let driver = MockDriver::new().with_devices(two_devices());
        let calls = driver.call_log();
        let mut window = MockWindow::new().with_call_log(calls.clone());

        let context = GraphicsContext::bootstrap(driver, &descriptor(2), &mut window).unwrap();

        assert_eq!(context.instance(), vk::Instance::from_raw(INSTANCE));
        assert_eq!(context.debug_messenger(), vk::DebugUtilsMessengerEXT::from_raw(MESSENGER));
        assert_eq!(context.physical_device(), vk::PhysicalDevice::from_raw(2));
        assert_eq!(context.device(), vk::Device::from_raw(DEVICE));
        assert_eq!(context.surface(), vk::SurfaceKHR::from_raw(SURFACE));
        assert_eq!(context.queue_family_index(), 1);
        assert_eq!(context.queue_count(), 2);
        assert_eq!(context.queues().len(), 2);

        let calls = calls.borrow();
        assert!(calls.contains(&DriverCall::CreateDevice {
            physical_device: vk::PhysicalDevice::from_raw(2),
            queue_family_index: 1,
            priorities: vec![0.5, 0.5],
            extensions: vec![SWAPCHAIN.to_string()],
        }));
        assert_eq!(calls.last(), Some(&DriverCall::CreateSurface));
    }

    #[test]
    fn test_instance_extensions_resolved() {
        let driver = MockDriver::new().with_devices(two_devices());
        let calls = driver.call_log();
        let mut window = MockWindow::new();

        let context = GraphicsContext::bootstrap(driver, &descriptor(0), &mut window).unwrap();

        let expected = vec![
            "VK_KHR_surface".to_string(),
            "VK_KHR_xcb_surface".to_string(),
            PORTABILITY_ENUMERATION_EXTENSION.to_string(),
            DEBUG_UTILS_EXTENSION.to_string(),
        ];
        assert_eq!(context.required_instance_extensions(), expected.as_slice());
        assert_eq!(
            calls.borrow()[0],
            DriverCall::CreateInstance {
                extensions: expected,
                layers: vec![VALIDATION_LAYER.to_string()],
                flags: vk::InstanceCreateFlags::ENUMERATE_PORTABILITY_KHR,
                chained_messenger: true,
            }
        );
        assert_eq!(context.queue_count(), 2);
    }

    #[test]
    fn test_teardown_order_and_idempotence() {
        let driver = MockDriver::new().with_devices(two_devices());
        let calls = driver.call_log();
        let mut window = MockWindow::new();
        let mut context = GraphicsContext::bootstrap(driver, &descriptor(1), &mut window).unwrap();

        context.teardown();
        context.teardown();
        drop(context);

        assert_eq!(
            crate::testing::destroy_calls(&calls),
            vec![
                DriverCall::DestroyDebugMessenger(vk::DebugUtilsMessengerEXT::from_raw(MESSENGER)),
                DriverCall::DestroySurface(vk::SurfaceKHR::from_raw(SURFACE)),
                DriverCall::DestroyDevice(vk::Device::from_raw(DEVICE)),
                DriverCall::DestroyInstance(vk::Instance::from_raw(INSTANCE)),
            ]
        );
    }

    #[test]
    fn test_handles_null_after_teardown() {
        let driver = MockDriver::new().with_devices(two_devices());
        let mut window = MockWindow::new();
        let mut context = GraphicsContext::bootstrap(driver, &descriptor(1), &mut window).unwrap();

        context.teardown();

        assert_eq!(context.instance(), vk::Instance::null());
        assert_eq!(context.device(), vk::Device::null());
        assert_eq!(context.surface(), vk::SurfaceKHR::null());
        assert_eq!(context.debug_messenger(), vk::DebugUtilsMessengerEXT::null());
        assert_eq!(context.physical_device(), vk::PhysicalDevice::null());
        assert!(context.queues().is_empty());
    }

    #[test]
    fn test_instance_failure_leaves_context_empty() {
        let mut driver = MockDriver::new().with_devices(two_devices());
        driver.fail_instance = Some(vk::Result::ERROR_LAYER_NOT_PRESENT);
        let calls = driver.call_log();
        let mut window = MockWindow::new();
        let mut context = GraphicsContext::new(driver);

        let result = context.initialize(&descriptor(1), &mut window);

        assert_eq!(result, Err(VulkanError::Api(vk::Result::ERROR_LAYER_NOT_PRESENT)));
        assert_eq!(context.instance(), vk::Instance::null());
        assert_eq!(context.physical_device(), vk::PhysicalDevice::null());
        assert_eq!(context.device(), vk::Device::null());
        assert_eq!(context.surface(), vk::SurfaceKHR::null());
        assert_eq!(context.queue_count(), 0);

        context.teardown();
        assert!(crate::testing::destroy_calls(&calls).is_empty());
    }

    #[test]
    fn test_selection_failure_tears_down_instance_and_messenger() {
        let driver = MockDriver::new().with_devices(vec![
            MockDevice::new(1, "compute only").with_queue_family(vk::QueueFlags::COMPUTE, 1)
        ]);
        let calls = driver.call_log();
        let mut window = MockWindow::new();

        let result = GraphicsContext::bootstrap(driver, &descriptor(1), &mut window);

        assert!(matches!(result, Err(VulkanError::FeatureNotPresent)));
        assert_eq!(
            crate::testing::destroy_calls(&calls),
            vec![
                DriverCall::DestroyDebugMessenger(vk::DebugUtilsMessengerEXT::from_raw(MESSENGER)),
                DriverCall::DestroyInstance(vk::Instance::from_raw(INSTANCE)),
            ]
        );
    }

    #[test]
    fn test_surface_failure_tears_down_everything() {
        let driver = MockDriver::new().with_devices(two_devices());
        let calls = driver.call_log();
        let mut window = MockWindow::new();
        window.fail_surface = true;

        let result = GraphicsContext::bootstrap(driver, &descriptor(1), &mut window);

        assert!(matches!(result, Err(VulkanError::SurfaceCreationFailed(_))));
        assert_eq!(
            crate::testing::destroy_calls(&calls),
            vec![
                DriverCall::DestroyDebugMessenger(vk::DebugUtilsMessengerEXT::from_raw(MESSENGER)),
                DriverCall::DestroyDevice(vk::Device::from_raw(DEVICE)),
                DriverCall::DestroyInstance(vk::Instance::from_raw(INSTANCE)),
            ]
        );
    }

    #[test]
    fn test_missing_messenger_function_aborts_bootstrap() {
        let mut driver = MockDriver::new().with_devices(two_devices());
        driver.debug_functions_available = false;
        let calls = driver.call_log();
        let mut window = MockWindow::new();

        let result = GraphicsContext::bootstrap(driver, &descriptor(1), &mut window);

        assert!(matches!(result, Err(VulkanError::ExtensionNotPresent { .. })));
        assert_eq!(
            crate::testing::destroy_calls(&calls),
            vec![DriverCall::DestroyInstance(vk::Instance::from_raw(INSTANCE))]
        );
    }

    #[test]
    fn test_validation_off_skips_layer_and_messenger() {
        let driver = MockDriver::new().with_devices(two_devices());
        let calls = driver.call_log();
        let mut window = MockWindow::new();
        let config = BootstrapConfig::new("catan").with_validation(false);

        let context =
            GraphicsContext::bootstrap(driver, &ContextDescriptor::from_config(&config), &mut window).unwrap();

        assert!(!context.validation_enabled());
        assert_eq!(context.debug_messenger(), vk::DebugUtilsMessengerEXT::null());
        assert!(!context
            .required_instance_extensions()
            .contains(&DEBUG_UTILS_EXTENSION.to_string()));
        assert!(!calls.borrow().contains(&DriverCall::CreateDebugMessenger));
    }

    #[test]
    fn test_second_initialize_rejected() {
        let driver = MockDriver::new().with_devices(two_devices());
        let calls = driver.call_log();
        let mut window = MockWindow::new();
        let mut context = GraphicsContext::bootstrap(driver, &descriptor(1), &mut window).unwrap();

        let result = context.initialize(&descriptor(1), &mut window);

        assert!(matches!(result, Err(VulkanError::InvalidOperation { .. })));
        assert_eq!(context.physical_device(), vk::PhysicalDevice::from_raw(2));
        assert!(crate::testing::destroy_calls(&calls).is_empty());
    }

    #[test]
    fn test_initialize_after_teardown_rejected() {
        let driver = MockDriver::new().with_devices(two_devices());
        let calls = driver.call_log();
        let mut window = MockWindow::new();
        let mut context = GraphicsContext::bootstrap(driver, &descriptor(1), &mut window).unwrap();
        context.teardown();

        let result = context.initialize(&descriptor(1), &mut window);

        assert!(matches!(result, Err(VulkanError::InvalidOperation { .. })));
        assert_eq!(context.physical_device(), vk::PhysicalDevice::null());
        let instances_created = calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, DriverCall::CreateInstance { .. }))
            .count();
        assert_eq!(instances_created, 1);
    }

    #[test]
    fn test_initialize_after_failed_bootstrap_rejected() {
        let mut driver = MockDriver::new().with_devices(two_devices());
        driver.fail_instance = Some(vk::Result::ERROR_INCOMPATIBLE_DRIVER);
        let mut window = MockWindow::new();
        let mut context = GraphicsContext::new(driver);

        assert!(context.initialize(&descriptor(1), &mut window).is_err());
        assert!(matches!(
            context.initialize(&descriptor(1), &mut window),
            Err(VulkanError::InvalidOperation { .. })
        ));
    }

    #[test]
    fn test_device_failure_tears_down_instance_and_messenger() {
        let mut driver = MockDriver::new().with_devices(two_devices());
        driver.fail_device = Some(vk::Result::ERROR_TOO_MANY_OBJECTS);
        let calls = driver.call_log();
        let mut window = MockWindow::new().with_call_log(calls.clone());

        let result = GraphicsContext::bootstrap(driver, &descriptor(1), &mut window);

        assert_eq!(result.err(), Some(VulkanError::Api(vk::Result::ERROR_TOO_MANY_OBJECTS)));
        assert_eq!(
            crate::testing::destroy_calls(&calls),
            vec![
                DriverCall::DestroyDebugMessenger(vk::DebugUtilsMessengerEXT::from_raw(MESSENGER)),
                DriverCall::DestroyInstance(vk::Instance::from_raw(INSTANCE)),
            ]
        );
        assert!(!calls.borrow().contains(&DriverCall::CreateSurface));
    }
}
