use std::sync::Arc;

/// One frame's command encoder and its target view.
///
/// Built around a swapchain texture by the runner, or around any texture view
/// for headless rendering.
pub struct Frame {
    pub target_view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
    output: Option<wgpu::SurfaceTexture>,
    queue: Arc<wgpu::Queue>,
}

impl Frame {
    pub fn new(
        device: &wgpu::Device,
        queue: Arc<wgpu::Queue>,
        output: wgpu::SurfaceTexture,
    ) -> Self {
        let target_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut frame = Self::offscreen(device, queue, target_view);
        frame.output = Some(output);
        frame
    }

    pub fn offscreen(
        device: &wgpu::Device,
        queue: Arc<wgpu::Queue>,
        target_view: wgpu::TextureView,
    ) -> Self {
        let encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("canvas-bridge-frame-encoder"),
            });

        Self {
            target_view,
            encoder,
            output: None,
            queue,
        }
    }

    pub fn encoder(&mut self) -> &mut wgpu::CommandEncoder {
        &mut self.encoder
    }

    /// Submits the recorded commands and presents the swapchain texture, if
    /// there is one.
    pub fn submit(self) {
        self.queue.submit(Some(self.encoder.finish()));

        if let Some(output) = self.output {
            output.present();
        }
    }
}
