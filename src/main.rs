mod cli;
mod error;
mod frame;
mod framepace;
mod gpu;
mod motion;
mod particle;
mod render;
mod utils;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use frame::FrameDriver;
use framepace::Framepacer;
use rand::{rngs::StdRng, SeedableRng};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

/// The display cadence frames are paced to
pub const TARGET_FRAMERATE: u32 = 60;

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    // Collect Arguments
    let args = cli::Args::parse();

    // Setup Winit
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    // State
    let mut app_state = AppState {
        tokio_rt: tokio::runtime::Runtime::new()?,
        args,
        driver: None,
        framepace: Framepacer::new(TARGET_FRAMERATE),
        startup_error: None,
    };

    event_loop.run_app(&mut app_state)?;

    match app_state.startup_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct AppState {
    tokio_rt: tokio::runtime::Runtime,
    args: cli::Args,
    driver: Option<FrameDriver>,
    framepace: Framepacer,

    startup_error: Option<anyhow::Error>,
}

impl AppState {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<FrameDriver> {
        let window = Arc::new(
            event_loop
                .create_window(Window::default_attributes().with_title("Point Swarm"))
                .context("failed to create the window")?,
        );

        let particles = match self.args.seed {
            Some(seed) => {
                particle::generate_particles(&mut StdRng::seed_from_u64(seed), self.args.particles)
            }
            None => particle::generate_particles(&mut rand::thread_rng(), self.args.particles),
        };

        let driver = self
            .tokio_rt
            .block_on(FrameDriver::new(window, &particles))
            .context("failed to set up the GPU")?;

        Ok(driver)
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.driver.is_some() {
            return;
        }

        match self.init(event_loop) {
            Ok(driver) => self.driver = Some(driver),
            Err(err) => {
                self.startup_error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(driver) = &mut self.driver else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                driver.resize(new_size.width, new_size.height);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let (ElementState::Pressed, PhysicalKey::Code(KeyCode::Escape)) =
                    (event.state, event.physical_key)
                {
                    event_loop.exit();
                }
            }

            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        let Some(driver) = &mut self.driver else {
            return;
        };

        self.framepace.begin_frame();
        driver.render_frame();
        self.framepace.end_frame();
    }
}
