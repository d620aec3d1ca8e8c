use std::sync::Arc;

use log::{debug, info, trace};
use winit::window::Window;

use crate::{
    error::InitError,
    gpu::GpuContext,
    motion::{self, MotionModule},
    particle::Particle,
    render::RenderModule,
};

/// Where the driver is within the current frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrameStage {
    #[default]
    Idle,
    ComputeDispatched,
    RenderDispatched,
    Presented,
}

impl FrameStage {
    pub fn next(self) -> Self {
        match self {
            Self::Idle => Self::ComputeDispatched,
            Self::ComputeDispatched => Self::RenderDispatched,
            Self::RenderDispatched => Self::Presented,
            Self::Presented => Self::Idle,
        }
    }
}

/// What to do with the surface after it refused to hand out a texture
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceRecovery {
    /// Try again next tick as is
    Skip,
    /// The swapchain no longer matches the window, configure it before the next tick
    Reconfigure,
}

impl SurfaceRecovery {
    pub fn for_error(err: &wgpu::SurfaceError) -> Self {
        match err {
            wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost => Self::Reconfigure,
            _ => Self::Skip,
        }
    }
}

/// Stage bookkeeping for one frame at a time
#[derive(Debug, Default)]
pub struct FrameCycle {
    stage: FrameStage,
}

impl FrameCycle {
    pub fn stage(&self) -> FrameStage {
        self.stage
    }

    pub fn advance(&mut self) {
        self.stage = self.stage.next();
        trace!("Frame stage: {:?}", self.stage);
    }

    /// Drops the frame before anything was encoded, leaving the cycle idle
    pub fn skip(&mut self, err: &wgpu::SurfaceError) -> SurfaceRecovery {
        debug_assert_eq!(self.stage, FrameStage::Idle);
        debug!("Skipping frame: {err}");

        SurfaceRecovery::for_error(err)
    }
}

/// Owns every GPU resource and turns one call into one frame.
///
/// The caller decides when frames happen; the driver never sleeps or spawns.
pub struct FrameDriver {
    gpu: GpuContext,
    motion: MotionModule,
    render: RenderModule,

    cycle: FrameCycle,
}

impl FrameDriver {
    pub async fn new(window: Arc<Window>, particles: &[Particle]) -> Result<Self, InitError> {
        let gpu = GpuContext::new(window).await?;

        let requested = particles.len() as u32;
        let supported = motion::max_particles(&gpu.device.limits());
        if requested > supported {
            return Err(InitError::TooManyParticles {
                requested,
                supported,
            });
        }

        gpu.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let motion = MotionModule::new(&gpu.device, particles);
        let render = RenderModule::new(&gpu.device, gpu.config.format);
        if let Some(err) = gpu.device.pop_error_scope().await {
            return Err(InitError::Pipeline(err.to_string()));
        }

        info!("Simulating {} particles", motion.num_particles());

        Ok(Self {
            gpu,
            motion,
            render,

            cycle: FrameCycle::default(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        // A minimized window reports a zero size, which can't be configured
        if width == 0 || height == 0 {
            return;
        }

        debug!("Resizing surface to {width}x{height}");
        self.gpu.config.width = width;
        self.gpu.config.height = height;
        self.gpu.reconfigure_surface();
    }

    /// Advances the particles, draws them and presents the result.
    ///
    /// When the surface has no texture to hand out the frame is dropped and
    /// nothing is submitted.
    pub fn render_frame(&mut self) {
        let frame = match self.gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(err) => {
                if self.cycle.skip(&err) == SurfaceRecovery::Reconfigure {
                    self.gpu.reconfigure_surface();
                }
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });

        self.motion.encode(&mut encoder);
        self.cycle.advance();

        self.render.encode(
            &mut encoder,
            &view,
            self.motion.particle_buffer(),
            self.motion.num_particles(),
        );
        self.cycle.advance();

        self.gpu.queue.submit(Some(encoder.finish()));
        frame.present();
        self.cycle.advance();

        self.cycle.advance();
    }
}
