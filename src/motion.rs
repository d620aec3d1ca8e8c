use std::borrow::Cow;

use wgpu::util::DeviceExt;

use crate::{particle::Particle, utils::workgroup_count};

/// Must match `@workgroup_size` in `motion.wgsl`
pub const PARTICLES_PER_WORKGROUP: u32 = 64;

/// Largest swarm one storage binding and one dispatch row can hold
pub fn max_particles(limits: &wgpu::Limits) -> u32 {
    let by_binding = limits.max_storage_buffer_binding_size as u64 / Particle::STRIDE;
    let by_buffer = limits.max_buffer_size / Particle::STRIDE;
    let by_dispatch =
        limits.max_compute_workgroups_per_dimension as u64 * PARTICLES_PER_WORKGROUP as u64;

    by_binding
        .min(by_buffer)
        .min(by_dispatch)
        .try_into()
        .unwrap_or(u32::MAX)
}

/// Compute stage: owns the particle buffer and advances it in place.
pub struct MotionModule {
    particle_buffer: wgpu::Buffer,
    num_particles: u32,

    bind_group: wgpu::BindGroup,
    pipeline: wgpu::ComputePipeline,
}

impl MotionModule {
    pub fn new(device: &wgpu::Device, particles: &[Particle]) -> Self {
        let motion_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("motion"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("motion.wgsl"))),
        });

        // Read by the compute pass as storage and by the render pass as vertices
        let particle_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Buffer"),
            contents: bytemuck::cast_slice(particles),
            usage: wgpu::BufferUsages::VERTEX
                | wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("motion"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: false },
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(Particle::STRIDE),
                },
                count: None,
            }],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("motion"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: particle_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("motion"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("motion"),
            layout: Some(&pipeline_layout),
            module: &motion_shader,
            entry_point: "main",
        });

        Self {
            particle_buffer,
            num_particles: particles.len() as u32,

            bind_group,
            pipeline,
        }
    }

    pub fn particle_buffer(&self) -> &wgpu::Buffer {
        &self.particle_buffer
    }

    pub fn num_particles(&self) -> u32 {
        self.num_particles
    }

    /// Records one integration step. Passes recorded later in the same
    /// encoder observe the updated positions.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("motion"),
            timestamp_writes: None,
        });

        cpass.set_pipeline(&self.pipeline);
        cpass.set_bind_group(0, &self.bind_group, &[]);
        cpass.dispatch_workgroups(
            workgroup_count(self.num_particles, PARTICLES_PER_WORKGROUP),
            1,
            1,
        );
    }
}

#[cfg(test)]
impl MotionModule {
    fn read_back(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> Option<Vec<Particle>> {
        let size = self.num_particles as u64 * Particle::STRIDE;
        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: None,
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        encoder.copy_buffer_to_buffer(&self.particle_buffer, 0, &staging_buffer, 0, size);
        queue.submit(Some(encoder.finish()));

        let slice = staging_buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::sync_channel(1);
        slice.map_async(wgpu::MapMode::Read, move |v| tx.send(v).unwrap());

        device.poll(wgpu::Maintain::wait()).panic_on_timeout();
        if let Ok(Ok(())) = rx.recv() {
            let data = slice.get_mapped_range();
            let particles = bytemuck::pod_collect_to_vec(&data[..]);

            drop(data);
            staging_buffer.unmap();
            Some(particles)
        } else {
            None
        }
    }
}
