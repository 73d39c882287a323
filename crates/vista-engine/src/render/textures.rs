use std::collections::HashMap;

use crate::scene::{TexelFormat, TextureData, TextureDesc, TextureDim, TextureId, TextureOp};

use super::RenderCtx;

/// A resident texture and its upload format.
pub struct GpuTexture {
    pub desc: TextureDesc,
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub format: wgpu::TextureFormat,
}

/// Owns every data texture referenced by draw commands.
///
/// 1-D textures are stored as `width x 1` 2-D textures so every sampler
/// path can use explicit-LOD sampling. Float data falls back to 8-bit
/// storage when the device cannot filter 32-bit floats.
pub struct TexturePool {
    textures: HashMap<TextureId, GpuTexture>,
    linear: Option<wgpu::Sampler>,
    nearest: Option<wgpu::Sampler>,
    white_2d: Option<wgpu::TextureView>,
    white_3d: Option<wgpu::TextureView>,
    warned_quantize: bool,
}

impl Default for TexturePool {
    fn default() -> Self {
        Self {
            textures: HashMap::new(),
            linear: None,
            nearest: None,
            white_2d: None,
            white_3d: None,
            warned_quantize: false,
        }
    }
}

impl TexturePool {
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn get(&self, id: TextureId) -> Option<&GpuTexture> {
        self.textures.get(&id)
    }

    /// Applies texture ops in order. Invalid ops are logged and skipped.
    pub fn apply(&mut self, ctx: &RenderCtx<'_>, ops: Vec<TextureOp>) {
        for op in ops {
            match op {
                TextureOp::Create { id, desc, data } => self.create(ctx, id, desc, &data),
                TextureOp::Update { id, data } => self.update(ctx, id, &data),
                TextureOp::SetFilter { id, linear } => {
                    if let Some(t) = self.textures.get_mut(&id) {
                        t.desc.linear = linear;
                    }
                }
                TextureOp::Destroy { id } => {
                    if let Some(t) = self.textures.remove(&id) {
                        t.texture.destroy();
                    }
                }
            }
        }
    }

    fn create(&mut self, ctx: &RenderCtx<'_>, id: TextureId, desc: TextureDesc, data: &TextureData) {
        if data.len() != desc.value_count() {
            log::warn!(
                "texture {id:?}: {} values supplied for a {:?} texture of {} values; skipped",
                data.len(),
                desc.size,
                desc.value_count()
            );
            return;
        }
        let max = ctx.caps.max_texture(desc.dim.ndim());
        if desc.size.iter().take(desc.dim.ndim()).any(|&s| s == 0 || s > max) {
            log::warn!("texture {id:?}: size {:?} exceeds device limit {max}; skipped", desc.size);
            return;
        }
        if desc.dim == TextureDim::D3 && !ctx.caps.textures_3d {
            return;
        }

        let (format, quantize) = gpu_format(desc.format, ctx.caps.float32_filterable);
        if quantize && !self.warned_quantize {
            log::info!("32-bit float textures are not filterable here; storing data as 8-bit");
            self.warned_quantize = true;
        }

        if let Some(old) = self.textures.remove(&id) {
            old.texture.destroy();
        }

        let (dimension, view_dim) = match desc.dim {
            TextureDim::D1 | TextureDim::D2 => (wgpu::TextureDimension::D2, wgpu::TextureViewDimension::D2),
            TextureDim::D3 => (wgpu::TextureDimension::D3, wgpu::TextureViewDimension::D3),
        };
        let size = extent(&desc);

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("vista data texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            dimension: Some(view_dim),
            ..Default::default()
        });

        let tex = GpuTexture { desc, texture, view, format };
        write_texels(ctx, &tex, data);
        self.textures.insert(id, tex);
    }

    fn update(&mut self, ctx: &RenderCtx<'_>, id: TextureId, data: &TextureData) {
        let Some(tex) = self.textures.get(&id) else {
            log::debug!("texture {id:?}: update for unknown texture ignored");
            return;
        };
        if data.len() != tex.desc.value_count() {
            log::warn!("texture {id:?}: update size mismatch; skipped");
            return;
        }
        write_texels(ctx, tex, data);
    }

    pub fn sampler(&mut self, device: &wgpu::Device, linear: bool) -> wgpu::Sampler {
        let slot = if linear { &mut self.linear } else { &mut self.nearest };
        slot.get_or_insert_with(|| {
            let filter = if linear { wgpu::FilterMode::Linear } else { wgpu::FilterMode::Nearest };
            device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("vista data sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: filter,
                min_filter: filter,
                mipmap_filter: wgpu::MipmapFilterMode::Nearest,
                ..Default::default()
            })
        })
        .clone()
    }

    /// 1x1 white stand-in for optional 2-D bindings (no colormap, no sprite).
    pub fn white_2d(&mut self, ctx: &RenderCtx<'_>) -> wgpu::TextureView {
        self.white_2d
            .get_or_insert_with(|| white_texture(ctx, wgpu::TextureDimension::D2))
            .clone()
    }

    pub fn white_3d(&mut self, ctx: &RenderCtx<'_>) -> wgpu::TextureView {
        self.white_3d
            .get_or_insert_with(|| white_texture(ctx, wgpu::TextureDimension::D3))
            .clone()
    }
}

fn extent(desc: &TextureDesc) -> wgpu::Extent3d {
    match desc.dim {
        TextureDim::D1 => wgpu::Extent3d { width: desc.size[0], height: 1, depth_or_array_layers: 1 },
        TextureDim::D2 => wgpu::Extent3d { width: desc.size[0], height: desc.size[1], depth_or_array_layers: 1 },
        TextureDim::D3 => wgpu::Extent3d {
            width: desc.size[0],
            height: desc.size[1],
            depth_or_array_layers: desc.size[2],
        },
    }
}

fn write_texels(ctx: &RenderCtx<'_>, tex: &GpuTexture, data: &TextureData) {
    let bytes = texel_bytes(data, tex.format);
    let size = extent(&tex.desc);
    let texel_size = bytes_per_texel(tex.format);
    ctx.queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &tex.texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &bytes,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(size.width * texel_size),
            rows_per_image: Some(size.height),
        },
        size,
    );
}

fn white_texture(ctx: &RenderCtx<'_>, dimension: wgpu::TextureDimension) -> wgpu::TextureView {
    let size = wgpu::Extent3d { width: 1, height: 1, depth_or_array_layers: 1 };
    let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("vista white texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    ctx.queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &[255u8; 4],
        wgpu::TexelCopyBufferLayout { offset: 0, bytes_per_row: Some(4), rows_per_image: Some(1) },
        size,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// GPU format for a texel layout, and whether float data must be quantized.
pub(crate) fn gpu_format(format: TexelFormat, float_filterable: bool) -> (wgpu::TextureFormat, bool) {
    match format {
        TexelFormat::R8 => (wgpu::TextureFormat::R8Unorm, false),
        TexelFormat::Rgba8 => (wgpu::TextureFormat::Rgba8Unorm, false),
        TexelFormat::R32F if float_filterable => (wgpu::TextureFormat::R32Float, false),
        TexelFormat::Rgba32F if float_filterable => (wgpu::TextureFormat::Rgba32Float, false),
        TexelFormat::R32F => (wgpu::TextureFormat::R8Unorm, true),
        TexelFormat::Rgba32F => (wgpu::TextureFormat::Rgba8Unorm, true),
    }
}

fn bytes_per_texel(format: wgpu::TextureFormat) -> u32 {
    match format {
        wgpu::TextureFormat::R8Unorm => 1,
        wgpu::TextureFormat::R32Float | wgpu::TextureFormat::Rgba8Unorm => 4,
        _ => 16,
    }
}

/// Converts host data to the byte layout of `format`.
///
/// Floats headed for a unorm texture are clamped to `[0, 1]` and rounded.
pub(crate) fn texel_bytes(data: &TextureData, format: wgpu::TextureFormat) -> Vec<u8> {
    let is_float_target = matches!(format, wgpu::TextureFormat::R32Float | wgpu::TextureFormat::Rgba32Float);
    match (data, is_float_target) {
        (TextureData::F32(v), true) => bytemuck::cast_slice(v).to_vec(),
        (TextureData::F32(v), false) => v.iter().map(|&x| quantize(x)).collect(),
        (TextureData::U8(v), false) => v.clone(),
        (TextureData::U8(v), true) => {
            let f: Vec<f32> = v.iter().map(|&b| b as f32 / 255.0).collect();
            bytemuck::cast_slice(&f).to_vec()
        }
    }
}

#[inline]
pub(crate) fn quantize(x: f32) -> u8 {
    if x.is_nan() {
        return 0;
    }
    (x.clamp(0.0, 1.0) * 255.0).round() as u8
}
