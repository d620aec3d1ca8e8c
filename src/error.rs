/// Failures that stop the application before the first frame.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("failed to create a drawing surface for the window")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no graphics adapter is compatible with the window surface")]
    NoAdapter,

    #[error("adapter `{0}` does not support compute shaders")]
    ComputeUnsupported(String),

    #[error("failed to create a logical device")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("the window surface is not supported by adapter `{0}`")]
    UnsupportedSurface(String),

    #[error("{requested} particles requested but the device supports at most {supported}")]
    TooManyParticles { requested: u32, supported: u32 },

    #[error("failed to build the GPU pipelines: {0}")]
    Pipeline(String),
}
