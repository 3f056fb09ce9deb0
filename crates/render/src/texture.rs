//! 2D texture handle with late pixel upload.
//!
//! Image decoding happens outside the render core and may finish long
//! after the first frame. The handle therefore starts as an allocated
//! 1x1 placeholder that is immediately drawable; once decoded pixels
//! arrive, [`Texture::write_pixels`] swaps them in. The renderer does
//! no synchronization for this, it draws whatever the handle holds.

use tracing::debug;

pub struct Texture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    width: u32,
    height: u32,
}

impl Texture {
    /// Allocate a 1x1 mid-grey placeholder, usable for sampling from
    /// the first frame on.
    pub fn placeholder(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("surface sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let (texture, view) = create_storage(device, 1, 1);
        let mut this = Self {
            texture,
            view,
            sampler,
            width: 1,
            height: 1,
        };
        this.upload(queue, &[128, 128, 128, 255]);
        this
    }

    /// Swap in decoded RGBA8 pixels. Reallocates the GPU storage when
    /// the extent changes; callers must rebind the texture on any
    /// program sampling it afterwards.
    pub fn write_pixels(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) {
        debug_assert_eq!(pixels.len(), (width * height * 4) as usize);
        if (width, height) != (self.width, self.height) {
            let (texture, view) = create_storage(device, width, height);
            self.texture = texture;
            self.view = view;
            self.width = width;
            self.height = height;
        }
        self.upload(queue, pixels);
        debug!(width, height, "texture pixels swapped in");
    }

    fn upload(&mut self, queue: &wgpu::Queue, pixels: &[u8]) {
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * self.width),
                rows_per_image: Some(self.height),
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub(crate) fn bind_group(
        &self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &str,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} texture bind group")),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&self.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }
}

fn create_storage(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("surface texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}
