use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::collections::HashMap;
use wgpu::util::DeviceExt;
use vizlab_common::Color;
use vizlab_scene::{Geometry, Light, Material, MeshData, Scene};

const MAX_LIGHTS: usize = 4;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    ambient: [f32; 4],
    light_dirs: [[f32; 4]; MAX_LIGHTS],
    light_colors: [[f32; 4]; MAX_LIGHTS],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
    params: [f32; 4],
}

/// How a node is rasterized. Determines the pipeline and index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Pass {
    Solid,
    DoubleSided,
    Wireframe,
}

fn shading_mode(material: &Material) -> f32 {
    match material {
        Material::Standard { .. } => 0.0,
        Material::Normal => 1.0,
        Material::Basic { .. } => 2.0,
    }
}

fn pass_for(material: &Material) -> Pass {
    if material.wireframe() {
        Pass::Wireframe
    } else if material.double_sided() {
        Pass::DoubleSided
    } else {
        Pass::Solid
    }
}

/// Vertex buffer shared by the triangle and edge index buffers of one geometry.
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    triangle_buffer: wgpu::Buffer,
    triangle_count: u32,
    edge_buffer: wgpu::Buffer,
    edge_count: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, geometry: &Geometry) -> Self {
        let mesh: MeshData = geometry.tessellate();
        let vertices: Vec<Vertex> = mesh
            .positions
            .iter()
            .zip(&mesh.normals)
            .map(|(&position, &normal)| Vertex { position, normal })
            .collect();
        let edges = mesh.edges();

        let label = geometry.label();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let triangle_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("triangle_index_buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let edge_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("edge_index_buffer"),
            contents: bytemuck::cast_slice(&edges),
            usage: wgpu::BufferUsages::INDEX,
        });
        tracing::debug!(
            geometry = label,
            vertices = vertices.len(),
            triangles = mesh.triangle_count(),
            edges = edges.len() / 2,
            "uploaded mesh"
        );

        Self {
            vertex_buffer,
            triangle_buffer,
            triangle_count: mesh.indices.len() as u32,
            edge_buffer,
            edge_count: edges.len() as u32,
        }
    }
}

/// A run of instances sharing one geometry and one pass.
struct Batch {
    geometry: Geometry,
    pass: Pass,
    instances: std::ops::Range<u32>,
}

/// Pack the light list into shader uniforms. Only directional lights take a
/// slot; ambient lights are summed.
fn light_uniforms(lights: &[Light]) -> ([f32; 4], [[f32; 4]; MAX_LIGHTS], [[f32; 4]; MAX_LIGHTS]) {
    let mut ambient = Vec3::ZERO;
    let mut dirs = [[0.0; 4]; MAX_LIGHTS];
    let mut colors = [[0.0; 4]; MAX_LIGHTS];
    let mut count = 0;

    for light in lights {
        match *light {
            Light::Ambient { color, intensity } => {
                ambient += Vec3::from(color.to_linear()) * intensity;
            }
            Light::Directional {
                color,
                intensity,
                position,
                target,
            } => {
                if count == MAX_LIGHTS {
                    continue;
                }
                let dir = (position - target).try_normalize().unwrap_or(Vec3::Y);
                dirs[count] = dir.extend(0.0).to_array();
                colors[count] = (Vec3::from(color.to_linear()) * intensity).extend(1.0).to_array();
                count += 1;
            }
        }
    }
    (ambient.extend(count as f32).to_array(), dirs, colors)
}

fn clear_color(background: Option<Color>) -> wgpu::Color {
    match background {
        Some(color) => {
            let [r, g, b] = color.to_linear();
            wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: 1.0,
            }
        }
        None => wgpu::Color::TRANSPARENT,
    }
}

/// wgpu renderer for a [`Scene`].
///
/// Geometry is tessellated and uploaded the first time a descriptor is seen
/// and reused afterwards. Visible nodes are drawn instanced, one draw per
/// geometry and pass.
pub struct WgpuRenderer {
    solid_pipeline: wgpu::RenderPipeline,
    double_sided_pipeline: wgpu::RenderPipeline,
    wireframe_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    meshes: HashMap<Geometry, GpuMesh>,
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat, width: u32, height: u32) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let pipeline = |label: &str, topology: wgpu::PrimitiveTopology, cull_mode: Option<wgpu::Face>| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[
                        wgpu::VertexBufferLayout {
                            array_stride: std::mem::size_of::<Vertex>() as u64,
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes: &wgpu::vertex_attr_array![
                                0 => Float32x3,
                                1 => Float32x3,
                            ],
                        },
                        wgpu::VertexBufferLayout {
                            array_stride: std::mem::size_of::<InstanceData>() as u64,
                            step_mode: wgpu::VertexStepMode::Instance,
                            attributes: &wgpu::vertex_attr_array![
                                2 => Float32x4,
                                3 => Float32x4,
                                4 => Float32x4,
                                5 => Float32x4,
                                6 => Float32x4,
                                7 => Float32x4,
                            ],
                        },
                    ],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    cull_mode,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: wgpu::TextureFormat::Depth32Float,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            })
        };

        let solid_pipeline = pipeline("solid_pipeline", wgpu::PrimitiveTopology::TriangleList, Some(wgpu::Face::Back));
        let double_sided_pipeline = pipeline("double_sided_pipeline", wgpu::PrimitiveTopology::TriangleList, None);
        let wireframe_pipeline = pipeline("wireframe_pipeline", wgpu::PrimitiveTopology::LineList, None);

        let max_instances = 4_096u32;
        let instance_buffer = Self::create_instance_buffer(device, max_instances);
        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            solid_pipeline,
            double_sided_pipeline,
            wireframe_pipeline,
            uniform_buffer,
            uniform_bind_group,
            meshes: HashMap::new(),
            instance_buffer,
            max_instances,
            depth_texture,
            surface_format,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Number of distinct geometries uploaded so far.
    pub fn cached_meshes(&self) -> usize {
        self.meshes.len()
    }

    /// Render one frame of `scene` at the given aspect ratio.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        scene: &Scene,
        aspect: f32,
    ) {
        let (ambient, light_dirs, light_colors) = light_uniforms(&scene.lights);
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: scene.camera.view_projection(aspect).to_cols_array_2d(),
                view: scene.camera.view_matrix().to_cols_array_2d(),
                ambient,
                light_dirs,
                light_colors,
            }),
        );

        // Sort visible nodes into (pass, geometry) runs.
        let mut runs: Vec<((Pass, u64), Geometry, InstanceData)> = Vec::with_capacity(scene.node_count());
        let mut keys: HashMap<Geometry, u64> = HashMap::new();
        for (_, node) in scene.visible_nodes() {
            let next = keys.len() as u64;
            let key = *keys.entry(node.geometry).or_insert(next);
            let cols = node.transform.matrix().to_cols_array_2d();
            let [r, g, b] = node.material.color().unwrap_or(Color::WHITE).to_linear();
            runs.push((
                (pass_for(&node.material), key),
                node.geometry,
                InstanceData {
                    model_0: cols[0],
                    model_1: cols[1],
                    model_2: cols[2],
                    model_3: cols[3],
                    color: [r, g, b, 1.0],
                    params: [shading_mode(&node.material), 0.0, 0.0, 0.0],
                },
            ));
        }
        runs.sort_by_key(|(key, _, _)| *key);

        let mut batches: Vec<Batch> = Vec::new();
        let mut instances: Vec<InstanceData> = Vec::with_capacity(runs.len());
        for ((pass, _), geometry, instance) in runs {
            let index = instances.len() as u32;
            instances.push(instance);
            match batches.last_mut() {
                Some(batch) if batch.pass == pass && batch.geometry == geometry => batch.instances.end = index + 1,
                _ => batches.push(Batch {
                    geometry,
                    pass,
                    instances: index..index + 1,
                }),
            }
        }

        for batch in &batches {
            self.meshes
                .entry(batch.geometry)
                .or_insert_with(|| GpuMesh::upload(device, &batch.geometry));
        }

        if instances.len() as u32 > self.max_instances {
            self.max_instances = (instances.len() as u32).next_power_of_two();
            self.instance_buffer = Self::create_instance_buffer(device, self.max_instances);
            tracing::debug!(capacity = self.max_instances, "grew instance buffer");
        }
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(scene.background)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));

            for batch in &batches {
                let Some(mesh) = self.meshes.get(&batch.geometry) else {
                    continue;
                };
                let (pipeline, indices, count) = match batch.pass {
                    Pass::Solid => (&self.solid_pipeline, &mesh.triangle_buffer, mesh.triangle_count),
                    Pass::DoubleSided => (&self.double_sided_pipeline, &mesh.triangle_buffer, mesh.triangle_count),
                    Pass::Wireframe => (&self.wireframe_pipeline, &mesh.edge_buffer, mesh.edge_count),
                };
                if count == 0 {
                    continue;
                }
                pass.set_pipeline(pipeline);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..count, 0, batch.instances.clone());
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_instance_buffer(device: &wgpu::Device, capacity: u32) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (capacity.max(1) as u64) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_layout_matches_shader() {
        assert_eq!(std::mem::size_of::<InstanceData>(), 6 * 16);
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
        assert_eq!(std::mem::size_of::<Uniforms>() % 16, 0);
    }

    #[test]
    fn wireframe_takes_precedence_over_double_sided() {
        let mut m = Material::basic(Color::WHITE).with_double_sided();
        assert_eq!(pass_for(&m), Pass::DoubleSided);
        m.set_wireframe(true);
        assert_eq!(pass_for(&m), Pass::Wireframe);
        assert_eq!(pass_for(&Material::Normal), Pass::Solid);
    }

    #[test]
    fn lights_pack_into_slots() {
        let lights = [
            Light::directional(Color::from_hex(0x404040), 100.0),
            Light::Ambient {
                color: Color::WHITE,
                intensity: 0.25,
            },
        ];
        let (ambient, dirs, colors) = light_uniforms(&lights);
        assert_eq!(ambient, [0.25, 0.25, 0.25, 1.0]);
        assert_eq!(dirs[0], [0.0, 1.0, 0.0, 0.0]);
        assert!(colors[0][0] > 1.0);
        assert_eq!(colors[1], [0.0; 4]);
    }

    #[test]
    fn extra_directional_lights_are_dropped() {
        let lights = vec![Light::directional(Color::WHITE, 1.0); MAX_LIGHTS + 2];
        let (ambient, _, _) = light_uniforms(&lights);
        assert_eq!(ambient[3], MAX_LIGHTS as f32);
    }

    #[test]
    fn missing_background_clears_transparent() {
        assert_eq!(clear_color(None), wgpu::Color::TRANSPARENT);
        let black = clear_color(Some(Color::BLACK));
        assert_eq!((black.r, black.g, black.b, black.a), (0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn normal_material_ignores_colour() {
        assert_eq!(shading_mode(&Material::Normal), 1.0);
        assert_eq!(shading_mode(&Material::standard(Color::WHITE)), 0.0);
    }
}
