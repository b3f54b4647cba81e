//! End-to-end meshing pipeline tests against a real device.
//!
//! Every test acquires its own headless device and skips cleanly when the
//! host has no usable adapter. Readback here is test instrumentation only;
//! the pipeline itself never maps a buffer for read.

use ember_engine::wgpu;
use ember_engine::{
    BlockId, Camera, ChunkPos, DrawParameters, GpuContext, WorldRenderer, WorldRendererConfig,
    DEPTH_FORMAT, DRAW_PARAMETERS_SIZE,
};

const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

fn test_context() -> Option<GpuContext> {
    let _ = env_logger::builder().is_test(true).try_init();
    match GpuContext::new_headless() {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            eprintln!("skipping GPU test: {}", e);
            None
        }
    }
}

fn world(ctx: &GpuContext, positions: Vec<ChunkPos>) -> WorldRenderer {
    WorldRenderer::new(
        ctx,
        &WorldRendererConfig {
            chunk_positions: positions,
            color_format: COLOR_FORMAT,
        },
    )
    .expect("world renderer creation failed")
}

fn read_buffer_bytes(ctx: &GpuContext, buffer: &wgpu::Buffer, offset: u64, size: u64) -> Vec<u8> {
    let staging = ctx.device().create_buffer(&wgpu::BufferDescriptor {
        label: Some("Test Readback Buffer"),
        size,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = ctx
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Test Readback Encoder"),
        });
    encoder.copy_buffer_to_buffer(buffer, offset, &staging, 0, size);
    ctx.queue().submit(std::iter::once(encoder.finish()));

    let slice = staging.slice(..);
    let (sender, receiver) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });
    ctx.device().poll(wgpu::Maintain::Wait);
    receiver
        .recv()
        .expect("map callback dropped")
        .expect("buffer mapping failed");

    let bytes = slice.get_mapped_range().to_vec();
    staging.unmap();
    bytes
}

fn read_draw_params(ctx: &GpuContext, renderer: &WorldRenderer, slot: u32) -> DrawParameters {
    let layout = *renderer.assembler().slot_layout();
    let bytes = read_buffer_bytes(
        ctx,
        renderer.assembler().indirect_buffer(),
        layout.param_offset(slot),
        DRAW_PARAMETERS_SIZE,
    );
    bytemuck::pod_read_unaligned(&bytes)
}

#[test]
fn air_chunk_meshes_to_zero_indices() {
    let Some(ctx) = test_context() else { return };
    let mut renderer = world(&ctx, vec![ChunkPos::new(0, 0, 0)]);

    let meshed = renderer.mesh_all_dirty(&ctx).unwrap();
    assert_eq!(meshed, 1);

    let params = read_draw_params(&ctx, &renderer, 0);
    assert_eq!(params.index_count, 0);
    assert_eq!(params.vertex_count, 0);
    assert_eq!(params.instance_count, 1);
}

#[test]
fn lone_block_meshes_to_six_faces() {
    let Some(ctx) = test_context() else { return };
    let mut renderer = world(&ctx, vec![ChunkPos::new(0, 0, 0)]);

    renderer
        .store_mut()
        .get_mut(0)
        .unwrap()
        .set_block(8, 8, 8, BlockId::STONE);
    renderer.mesh_all_dirty(&ctx).unwrap();

    let params = read_draw_params(&ctx, &renderer, 0);
    assert_eq!(params.vertex_count, 24);
    assert_eq!(params.index_count, 36);
    assert_eq!(params.instance_count, 1);
    assert_eq!(params.first_index, 0);
    assert_eq!(params.base_vertex, 0);
}

#[test]
fn grid_boundary_counts_as_empty() {
    let Some(ctx) = test_context() else { return };
    let mut renderer = world(&ctx, vec![ChunkPos::new(0, 0, 0)]);

    // A corner block still emits all six faces: three against neighbors
    // inside the grid, three against the boundary
    renderer
        .store_mut()
        .get_mut(0)
        .unwrap()
        .set_block(0, 0, 0, BlockId::DIRT);
    renderer.mesh_all_dirty(&ctx).unwrap();

    let params = read_draw_params(&ctx, &renderer, 0);
    assert_eq!(params.vertex_count, 24);
    assert_eq!(params.index_count, 36);
}

#[test]
fn solid_chunk_keeps_only_boundary_faces() {
    let Some(ctx) = test_context() else { return };
    let mut renderer = world(&ctx, vec![ChunkPos::new(0, 0, 0)]);

    renderer.store_mut().get_mut(0).unwrap().fill(BlockId::STONE);
    renderer.mesh_all_dirty(&ctx).unwrap();

    // 6 faces of 16x16 cells survive neighbor culling
    let params = read_draw_params(&ctx, &renderer, 0);
    assert_eq!(params.vertex_count, 6 * 16 * 16 * 4);
    assert_eq!(params.index_count, 6 * 16 * 16 * 6);
}

#[test]
fn remeshing_identical_input_is_reproducible() {
    let Some(ctx) = test_context() else { return };
    let mut renderer = world(&ctx, vec![ChunkPos::new(0, 0, 0)]);

    {
        let chunk = renderer.store_mut().get_mut(0).unwrap();
        for x in 0..16 {
            for z in 0..16 {
                chunk.set_block(x, 0, z, BlockId::GRASS);
            }
        }
        chunk.set_block(8, 1, 8, BlockId::WOOD);
    }

    renderer.mesh_all_dirty(&ctx).unwrap();
    let first_params = read_draw_params(&ctx, &renderer, 0);
    let first_vertices = read_vertex_multiset(&ctx, &renderer, 0, first_params.vertex_count);

    renderer.store_mut().mark_dirty(0).unwrap();
    renderer.mesh_all_dirty(&ctx).unwrap();
    let second_params = read_draw_params(&ctx, &renderer, 0);
    let second_vertices = read_vertex_multiset(&ctx, &renderer, 0, second_params.vertex_count);

    assert_eq!(
        bytemuck::bytes_of(&first_params),
        bytemuck::bytes_of(&second_params)
    );
    assert_eq!(first_vertices, second_vertices);
}

/// Vertex records for a slot, sorted so invocation scheduling order does
/// not affect the comparison.
fn read_vertex_multiset(
    ctx: &GpuContext,
    renderer: &WorldRenderer,
    slot: u32,
    vertex_count: u32,
) -> Vec<[u8; 32]> {
    let layout = *renderer.assembler().slot_layout();
    let bytes = read_buffer_bytes(
        ctx,
        renderer.assembler().vertex_buffer(),
        layout.vertex_offset(slot),
        vertex_count as u64 * 32,
    );
    let mut records: Vec<[u8; 32]> = bytes
        .chunks_exact(32)
        .map(|chunk| chunk.try_into().unwrap())
        .collect();
    records.sort_unstable();
    records
}

#[test]
fn four_chunk_world_draws_every_slot_indirect() {
    let Some(ctx) = test_context() else { return };

    // 2x2 chunk grid, checkerboard-filled chunks alternating with air-only
    let positions = vec![
        ChunkPos::new(0, 0, 0),
        ChunkPos::new(1, 0, 0),
        ChunkPos::new(0, 0, 1),
        ChunkPos::new(1, 0, 1),
    ];
    let mut renderer = world(&ctx, positions);

    for slot in [0u32, 3u32] {
        let chunk = renderer.store_mut().get_mut(slot).unwrap();
        for x in 0..16 {
            for y in 0..16 {
                for z in 0..16 {
                    if (x + y + z) % 2 == 0 {
                        chunk.set_block(x, y, z, BlockId::STONE);
                    }
                }
            }
        }
    }

    let meshed = renderer.mesh_all_dirty(&ctx).unwrap();
    assert_eq!(meshed, 4);

    // Every slot reads its own aligned argument block
    let layout = *renderer.assembler().slot_layout();
    let alignment = ctx.storage_alignment() as u64;
    for slot in 0..4 {
        assert_eq!(layout.param_offset(slot) % alignment, 0);
        let params = read_draw_params(&ctx, &renderer, slot);
        assert_eq!(params.instance_count, 1);
        if slot == 0 || slot == 3 {
            // 2048 isolated voxels, nothing culled
            assert_eq!(params.index_count, 2048 * 6 * 6);
        } else {
            assert_eq!(params.index_count, 0);
        }
    }

    // The frame records a draw per slot regardless of geometry; the error
    // scope turns any validation failure into a test failure
    let color = ctx.device().create_texture(&wgpu::TextureDescriptor {
        label: Some("Test Color Target"),
        size: wgpu::Extent3d {
            width: 64,
            height: 64,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: COLOR_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth = ctx.device().create_texture(&wgpu::TextureDescriptor {
        label: Some("Test Depth Target"),
        size: wgpu::Extent3d {
            width: 64,
            height: 64,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
    let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

    renderer.update_camera(&ctx, &Camera::default().uniform(1.0));

    ctx.device().push_error_scope(wgpu::ErrorFilter::Validation);

    let mut encoder = ctx
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Test Frame Encoder"),
        });
    {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Test Frame Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        renderer.draw_all(&mut pass);
    }
    ctx.queue().submit(std::iter::once(encoder.finish()));
    ctx.device().poll(wgpu::Maintain::Wait);

    let validation_error = pollster::block_on(ctx.device().pop_error_scope());
    assert!(
        validation_error.is_none(),
        "frame validation failed: {:?}",
        validation_error
    );
}

#[test]
fn unmeshed_slot_draws_zero_geometry() {
    let Some(ctx) = test_context() else { return };
    let renderer = world(&ctx, vec![ChunkPos::new(0, 0, 0)]);

    // Never meshed: the argument block is still zero-initialized, which
    // draws nothing rather than stale geometry
    let params = read_draw_params(&ctx, &renderer, 0);
    assert_eq!(params.index_count, 0);
    assert_eq!(params.instance_count, 0);
}
