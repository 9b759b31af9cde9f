//! Context bootstrap demo application
//!
//! Opens a window, bootstraps a Vulkan context for it and keeps the window
//! alive until it is closed or Escape is pressed. Settings are read from
//! `context_app.toml` (or `.ron`) next to the working directory when present.

use glfw::{Action, Key, WindowEvent};
use std::process::ExitCode;

use vk_context::prelude::*;

const CONFIG_PATHS: [&str; 2] = ["context_app.toml", "context_app.ron"];

fn load_config() -> Result<ApplicationConfig, ConfigError> {
    let config = match CONFIG_PATHS.iter().find(|path| std::path::Path::new(path).exists()) {
        Some(path) => {
            log::info!("Loading configuration from {}", path);
            ApplicationConfig::load_from_file(path)?
        }
        None => {
            let mut config = ApplicationConfig::default();
            config.bootstrap.application_name = "catan".to_string();
            config.window.title = "catan".to_string();
            config
        }
    };
    config.bootstrap.validate()?;
    Ok(config)
}

fn main_loop(window: &mut Window) {
    while !window.should_close() {
        window.poll_events();
        let mut close = false;
        for (_, event) in window.flush_events() {
            match event {
                WindowEvent::Key(Key::Escape, _, Action::Press, _) => close = true,
                WindowEvent::FramebufferSize(..) => {
                    let (width, height) = window.get_framebuffer_size();
                    log::debug!("Framebuffer resized to {}x{}", width, height);
                }
                _ => {}
            }
        }
        if close {
            window.set_should_close(true);
        }
        // render
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;

    let mut window = Window::new(&config.window.title, config.window.width, config.window.height)?;
    let driver = AshDriver::load()?;
    let descriptor = ContextDescriptor::from_config(&config.bootstrap);

    let mut context = GraphicsContext::bootstrap(driver, &descriptor, &mut window)?;
    log::info!(
        "Context ready: {} queue(s) on family {}",
        context.queue_count(),
        context.queue_family_index()
    );

    let (width, height) = window.get_framebuffer_size();
    log::info!("Framebuffer {}x{}", width, height);

    main_loop(&mut window);

    context.teardown();
    Ok(())
}

fn main() -> ExitCode {
    vk_context::foundation::logging::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
