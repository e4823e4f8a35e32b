mod support;

use std::sync::Arc;
use std::sync::mpsc;

use canvas_bridge::prelude::*;
use canvas_bridge::render::frame::Frame;
use canvas_bridge::render::texture::PresentationTexture;
use support::RecordingEngine;

const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

fn headless_device() -> (wgpu::Device, Arc<wgpu::Queue>) {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let adapter = pollster::block_on(instance.request_adapter(
        &wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            force_fallback_adapter: true,
            compatible_surface: None,
        },
    ))
    .expect("expected a headless adapter for GPU smoke tests");

    let (device, queue) = pollster::block_on(adapter.request_device(
        &wgpu::DeviceDescriptor {
            label: Some("canvas-bridge-test-device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::default(),
        },
    ))
    .expect("request device");

    (device, Arc::new(queue))
}

fn snapshot(size: SurfaceSize, row_order: RowOrder) -> PixelBuffer {
    let mut engine = RecordingEngine {
        row_order,
        ..RecordingEngine::default()
    };
    let mut registry = SurfaceRegistry::new();
    registry.create(&mut engine, size).expect("create surface");

    let mut pixels = PixelBridge::new(size);
    pixels
        .transfer(&registry, &mut engine)
        .expect("transfer")
        .clone()
}

/// Draws `buffer` full-frame into an offscreen target and reads it back as
/// tightly packed top-down RGBA rows.
fn present_and_read(buffer: &PixelBuffer) -> Vec<u8> {
    let (device, queue) = headless_device();
    let size = buffer.size();

    let mut presentation =
        PresentationTexture::new(&device, TARGET_FORMAT, size)
            .expect("built-in shader compiles");
    presentation.upload(&queue, buffer).expect("upload");

    let target = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("canvas-bridge-test-target"),
        size: wgpu::Extent3d {
            width: size.width,
            height: size.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TARGET_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });

    let unpadded = size.bytes_per_row();
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let padded = unpadded.div_ceil(align) * align;

    let readback = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("canvas-bridge-test-readback"),
        size: u64::from(padded) * u64::from(size.height),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let view = target.create_view(&wgpu::TextureViewDescriptor::default());
    let mut frame = Frame::offscreen(&device, queue.clone(), view);
    presentation.draw(&mut frame, wgpu::Color::RED);
    frame.encoder().copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture: &target,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &readback,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded),
                rows_per_image: Some(size.height),
            },
        },
        wgpu::Extent3d {
            width: size.width,
            height: size.height,
            depth_or_array_layers: 1,
        },
    );
    frame.submit();

    let slice = readback.slice(..);
    let (tx, rx) = mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    let _ = device.poll(wgpu::PollType::Wait);
    rx.recv().expect("map callback").expect("map readback");

    let data = slice.get_mapped_range();
    data.chunks(padded as usize)
        .flat_map(|row| row[..unpadded as usize].to_vec())
        .collect()
}

fn assert_close(actual: &[u8], expected: [u8; 4], at: (u32, u32)) {
    for (a, e) in actual.iter().zip(expected) {
        assert!(
            a.abs_diff(e) <= 1,
            "pixel {:?}: got {:?}, expected {:?}",
            at,
            actual,
            expected
        );
    }
}

fn check_upright(buffer: &PixelBuffer) {
    let size = buffer.size();
    let pixels = present_and_read(buffer);

    for y in 0..size.height {
        for x in 0..size.width {
            let offset = ((y * size.width + x) * 4) as usize;
            let expected = buffer.pixel(x, y).expect("pixel in range");
            assert_close(&pixels[offset..offset + 4], expected, (x, y));
        }
    }
}

#[test]
fn top_down_snapshot_is_presented_upright() {
    if !support::gpu_tests_enabled() {
        eprintln!(
            "Skipping GPU smoke test. Set CANVAS_BRIDGE_RUN_GPU_TESTS=1 to run."
        );
        return;
    }

    check_upright(&snapshot(SurfaceSize::new(6, 4), RowOrder::TopDown));
}

#[test]
fn bottom_up_snapshot_is_presented_upright() {
    if !support::gpu_tests_enabled() {
        eprintln!(
            "Skipping GPU smoke test. Set CANVAS_BRIDGE_RUN_GPU_TESTS=1 to run."
        );
        return;
    }

    check_upright(&snapshot(SurfaceSize::new(6, 4), RowOrder::BottomUp));
}

#[test]
fn mismatched_upload_is_rejected() {
    if !support::gpu_tests_enabled() {
        eprintln!(
            "Skipping GPU smoke test. Set CANVAS_BRIDGE_RUN_GPU_TESTS=1 to run."
        );
        return;
    }

    let (device, queue) = headless_device();
    let mut presentation =
        PresentationTexture::new(&device, TARGET_FORMAT, SurfaceSize::new(4, 4))
            .expect("built-in shader compiles");

    let buffer = snapshot(SurfaceSize::new(8, 4), RowOrder::TopDown);
    let err = presentation
        .upload(&queue, &buffer)
        .expect_err("size mismatch");
    assert!(matches!(err, PresentError::SizeMismatch { .. }));

    presentation.resize(&device, SurfaceSize::new(8, 4));
    presentation
        .upload(&queue, &buffer)
        .expect("upload after resize");
}

#[test]
fn broken_custom_shader_is_a_shader_error() {
    if !support::gpu_tests_enabled() {
        eprintln!(
            "Skipping GPU smoke test. Set CANVAS_BRIDGE_RUN_GPU_TESTS=1 to run."
        );
        return;
    }

    let (device, _) = headless_device();
    let result = PresentationTexture::with_shader(
        &device,
        TARGET_FORMAT,
        SurfaceSize::new(4, 4),
        "@fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }",
    );

    assert!(matches!(result, Err(ShaderError::Pipeline(_))));
}
