use crate::config::AppConfig;
use crate::render::gl::GlApi;
use crate::scenes::{self, Scene};
use anyhow::{anyhow, Context, Result};
use glutin::{
    config::ConfigTemplateBuilder,
    context::{ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version},
    display::{GetGlDisplay, GlDisplay},
    prelude::*,
    surface::{Surface, SwapInterval, WindowSurface},
};
use glutin_winit::{DisplayBuilder, GlWindow};
use log::{error, info, warn};
use raw_window_handle::HasRawWindowHandle;
use std::{ffi::CString, num::NonZeroU32, rc::Rc, time::Instant};
use winit::{
    dpi::LogicalSize,
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::{EventLoop, EventLoopBuilder},
    keyboard::{Key, NamedKey},
    window::{Window, WindowBuilder},
};

/// Window, GL context and the running exercise.
pub struct App {
    // dropped first so its GPU objects go while the context is still alive
    scene: Option<Box<dyn Scene>>,
    gl: Rc<glow::Context>,
    gl_surface: Surface<WindowSurface>,
    gl_context: PossiblyCurrentContext,
    window: Window,
    config: AppConfig,
    started: Instant,
    frame_error: Option<anyhow::Error>,
}

/// The candidate with the most multisample samples, the first one on ties.
fn most_samples<C>(configs: impl Iterator<Item = C>, samples: impl Fn(&C) -> u8) -> Option<C> {
    configs.reduce(|accum, config| {
        if samples(&config) > samples(&accum) {
            config
        } else {
            accum
        }
    })
}

impl App {
    /// Opens the window, creates the GL context and sets up the configured
    /// exercise.
    ///
    /// # Panics
    ///
    /// Panics if the display hands the config picker an empty candidate list.
    pub fn new(config: AppConfig) -> Result<(Self, EventLoop<()>)> {
        info!("Initializing application...");

        let event_loop = EventLoopBuilder::new().build()?;
        let window_builder = WindowBuilder::new()
            .with_title(config.window_title())
            .with_inner_size(LogicalSize::new(config.window.width, config.window.height));

        let template = ConfigTemplateBuilder::new().with_alpha_size(8);
        let display_builder = DisplayBuilder::new().with_window_builder(Some(window_builder));

        let (window, gl_config) = display_builder
            .build(&event_loop, template, |configs| {
                most_samples(configs, |config| config.num_samples())
                    .expect("display offered no GL configs")
            })
            .map_err(|e| anyhow!("Failed to create window: {}", e))?;

        let window = window.ok_or_else(|| anyhow!("Display builder returned no window"))?;
        let raw_window_handle = window.raw_window_handle();

        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(
                config.render.gl_major,
                config.render.gl_minor,
            ))))
            .with_profile(GlProfile::Core)
            .build(Some(raw_window_handle));

        let gl_display = gl_config.display();
        let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
            .context("Failed to create OpenGL context")?;

        let attrs = window.build_surface_attributes(<_>::default());
        let gl_surface = unsafe { gl_display.create_window_surface(&gl_config, &attrs) }
            .context("Failed to create GL surface")?;

        let gl_context = not_current
            .make_current(&gl_surface)
            .context("Failed to make context current")?;

        let interval = if config.window.vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(e) = gl_surface.set_swap_interval(&gl_context, interval) {
            warn!("Failed to set swap interval: {}", e);
        }

        // Load OpenGL functions
        let gl = Rc::new(unsafe {
            glow::Context::from_loader_function(|symbol| match CString::new(symbol) {
                Ok(symbol) => gl_display.get_proc_address(symbol.as_c_str()) as *const _,
                Err(_) => std::ptr::null(),
            })
        });
        info!("OpenGL {}", unsafe {
            glow::HasContext::get_parameter_string(gl.as_ref(), glow::VERSION)
        });

        let size = window.inner_size();
        gl.viewport(size.width as i32, size.height as i32);

        let scene = scenes::load_scene(&gl, config.exercise, &config.scene_settings())
            .with_context(|| format!("Failed to set up exercise {}", config.exercise))?;

        Ok((
            Self {
                scene: Some(scene),
                gl,
                gl_surface,
                gl_context,
                window,
                config,
                started: Instant::now(),
                frame_error: None,
            },
            event_loop,
        ))
    }

    /// Returns `true` when the application should exit.
    fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CloseRequested => true,
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => true,
            WindowEvent::Resized(size) => {
                if let (Some(width), Some(height)) =
                    (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                {
                    self.gl_surface.resize(&self.gl_context, width, height);
                    self.gl.viewport(size.width as i32, size.height as i32);
                }
                false
            }
            WindowEvent::RedrawRequested => match self.render() {
                Ok(()) => false,
                Err(e) => {
                    error!("{:#}", e);
                    self.frame_error = Some(e);
                    true
                }
            },
            _ => false,
        }
    }

    fn render(&mut self) -> Result<()> {
        self.gl.clear_color(self.config.render.clear_color);
        self.gl.clear();

        if let Some(scene) = self.scene.as_mut() {
            let time = self.started.elapsed().as_secs_f32();
            scene
                .draw(time)
                .with_context(|| format!("Frame aborted in exercise {}", scene.exercise()))?;
        }

        self.gl_surface
            .swap_buffers(&self.gl_context)
            .context("Failed to swap buffers")
    }

    /// Runs the render loop until the window closes or a frame fails.
    pub fn run(mut self, event_loop: EventLoop<()>) -> Result<()> {
        event_loop.run(|event, elwt| match event {
            Event::WindowEvent { event, .. } => {
                if self.handle_window_event(&event) {
                    elwt.exit();
                }
            }
            Event::AboutToWait => self.window.request_redraw(),
            Event::LoopExiting => {
                self.scene = None;
                info!("Shutting down");
            }
            _ => (),
        })?;

        match self.frame_error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
