use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};

use crate::scene::{DrawState, GlyphsCmd};
use crate::text::{FontId, FontSystem};

use super::common::{
    blend_constant, mat4_cols, physical_viewport, sampler_entry, texture_entry, uniform_buffer,
    uniform_entry, vertex_buffer, DrawCall, PipelineKey, PreparedDraw, QuadBuffers, QuadVertex,
};
use super::program::ProgramPipelines;
use super::RenderCtx;

// ── atlas constants ────────────────────────────────────────────────────────

const ATLAS_SIZE: u32 = 2048;
const GLYPH_PADDING: u32 = 1; // pixels between glyphs in the atlas

// ── cached glyph ──────────────────────────────────────────────────────────

/// Font, glyph index and raster size in physical pixels (as bits).
type GlyphKey = (FontId, u16, u32);

#[derive(Debug, Copy, Clone)]
struct CachedGlyph {
    uv_min: [f32; 2],
    uv_max: [f32; 2],
    /// Bitmap offset from the pen position, logical pixels, +Y down.
    left: f32,
    top: f32,
    width: f32,
    height: f32,
}

/// Shelf packer for the glyph atlas.
#[derive(Debug)]
pub(crate) struct ShelfPacker {
    cursor_x: u32,
    cursor_y: u32,
    row_height: u32,
    full: bool,
}

impl Default for ShelfPacker {
    fn default() -> Self {
        Self { cursor_x: GLYPH_PADDING, cursor_y: GLYPH_PADDING, row_height: 0, full: false }
    }
}

impl ShelfPacker {
    /// Reserves a `w x h` cell and returns its top-left corner.
    pub fn place(&mut self, w: u32, h: u32) -> Option<(u32, u32)> {
        if self.full {
            return None;
        }

        // Advance to a new shelf row when the glyph doesn't fit horizontally.
        if self.cursor_x + w + GLYPH_PADDING > ATLAS_SIZE {
            self.cursor_y += self.row_height + GLYPH_PADDING;
            self.cursor_x = GLYPH_PADDING;
            self.row_height = 0;
        }

        if self.cursor_y + h + GLYPH_PADDING > ATLAS_SIZE {
            log::warn!("glyph atlas is full ({ATLAS_SIZE}x{ATLAS_SIZE}); some glyphs will not be rendered");
            self.full = true;
            return None;
        }

        let at = (self.cursor_x, self.cursor_y);
        self.cursor_x += w + GLYPH_PADDING;
        self.row_height = self.row_height.max(h);
        Some(at)
    }
}

// ── renderer ──────────────────────────────────────────────────────────────

/// Renderer for `DrawCmd::Glyphs`.
///
/// Maintains a 2048 x 2048 R8Unorm coverage atlas. Glyphs are rasterized
/// with fontdue at physical resolution on first use and cached for the
/// renderer's lifetime, keyed by font, glyph index and pixel size.
pub(crate) struct GlyphRenderer {
    pipelines: ProgramPipelines,
    quad: QuadBuffers,

    atlas_texture: Option<wgpu::Texture>,
    atlas_view: Option<wgpu::TextureView>,
    sampler: Option<wgpu::Sampler>,
    packer: ShelfPacker,

    glyph_cache: HashMap<GlyphKey, Option<CachedGlyph>>,
}

impl Default for GlyphRenderer {
    fn default() -> Self {
        Self {
            pipelines: ProgramPipelines::new("vista glyphs", include_str!("shaders/glyphs.wgsl")),
            quad: QuadBuffers::default(),
            atlas_texture: None,
            atlas_view: None,
            sampler: None,
            packer: ShelfPacker::default(),
            glyph_cache: HashMap::new(),
        }
    }
}

/// Instance data layout (48 bytes):
///
///  offset  0  dst_min  [f32; 2]   loc 1
///  offset  8  dst_max  [f32; 2]   loc 2
///  offset 16  uv_min   [f32; 2]   loc 3
///  offset 24  uv_max   [f32; 2]   loc 4
///  offset 32  skew     f32        loc 5
///  offset 36  z        f32        loc 6
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct GlyphInstance {
    dst_min: [f32; 2],
    dst_max: [f32; 2],
    uv_min: [f32; 2],
    uv_max: [f32; 2],
    skew: f32,
    z: f32,
}

impl GlyphInstance {
    const ATTRS: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        1 => Float32x2, // dst_min
        2 => Float32x2, // dst_max
        3 => Float32x2, // uv_min
        4 => Float32x2, // uv_max
        5 => Float32,   // skew
        6 => Float32    // z
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GlyphInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct GlyphUniform {
    transform: [[f32; 4]; 4],
    color: [f32; 4],
}

impl GlyphRenderer {
    pub fn prepare(
        &mut self,
        ctx: &RenderCtx<'_>,
        fonts: &FontSystem,
        state: &DrawState,
        cmd: &GlyphsCmd,
    ) -> Option<PreparedDraw> {
        let viewport = physical_viewport(ctx, state.viewport)?;
        if fonts.get(cmd.font).is_none() {
            log::debug!("glyph run uses unknown {:?}; skipped", cmd.font);
            return None;
        }
        self.ensure_atlas(ctx);

        let mut instances = Vec::with_capacity(cmd.glyphs.len());
        for q in &cmd.glyphs {
            let Some(g) = self.glyph(ctx, fonts, cmd.font, q.ch, q.size) else { continue };
            let baseline = q.y + fonts.ascent(cmd.font, q.size);
            let x = q.x + g.left;
            let y = baseline + g.top;
            let inst = GlyphInstance {
                dst_min: [x, y],
                dst_max: [x + g.width, y + g.height],
                uv_min: g.uv_min,
                uv_max: g.uv_max,
                skew: q.skew,
                z: cmd.z,
            };
            instances.push(inst);
            if q.bold {
                instances.push(GlyphInstance {
                    dst_min: [x + 1.0, y],
                    dst_max: [x + 1.0 + g.width, y + g.height],
                    ..inst
                });
            }
        }
        if instances.is_empty() {
            return None;
        }

        let group0 = [uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)];
        let group1 = [texture_entry(0, wgpu::TextureViewDimension::D2), sampler_entry(1)];
        let pipeline = self.pipelines.pipeline(
            ctx.device,
            PipelineKey::new(ctx, state),
            &[&group0, &group1],
            &[QuadVertex::layout(), GlyphInstance::layout()],
            wgpu::PrimitiveTopology::TriangleList,
        )?;

        let uniform = GlyphUniform { transform: mat4_cols(state.transform), color: cmd.color.to_array() };
        let ubo = uniform_buffer(ctx.device, "vista glyphs ubo", &uniform);
        let atlas_view = self.atlas_view.clone()?;
        let sampler = self.sampler.clone()?;

        let layouts = self.pipelines.groups(ctx.device, &[&group0, &group1]);
        let uniforms = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vista glyphs ubo bind group"),
            layout: &layouts[0],
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: ubo.as_entire_binding() }],
        });
        let textures = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vista glyphs atlas bind group"),
            layout: &layouts[1],
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(&atlas_view) },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(&sampler) },
            ],
        });

        let (quad_vbo, quad_ibo) = self.quad.get(ctx.device);
        let instance_vbo = vertex_buffer(ctx.device, "vista glyph instances", &instances);

        Some(PreparedDraw {
            pipeline,
            bind_groups: vec![uniforms, textures],
            vertex_buffers: vec![quad_vbo, instance_vbo],
            call: DrawCall::Indexed {
                index: quad_ibo,
                format: wgpu::IndexFormat::Uint16,
                count: 6,
                instances: instances.len() as u32,
            },
            viewport,
            blend_constant: blend_constant(state),
        })
    }

    // ── atlas helpers ──────────────────────────────────────────────────────

    /// Looks up or rasterizes a glyph. Whitespace and failed placements are
    /// cached as `None`.
    fn glyph(&mut self, ctx: &RenderCtx<'_>, fonts: &FontSystem, id: FontId, ch: char, size: f32) -> Option<CachedGlyph> {
        let font = fonts.get(id)?;
        let scale = ctx.scale_factor.max(0.01);
        let px = size * scale;
        let index = font.lookup_glyph_index(ch);
        let key = (id, index, px.to_bits());
        if let Some(cached) = self.glyph_cache.get(&key) {
            return *cached;
        }

        let (metrics, bitmap) = font.rasterize_indexed(index, px);
        let entry = if metrics.width == 0 || metrics.height == 0 {
            None
        } else {
            let (w, h) = (metrics.width as u32, metrics.height as u32);
            self.upload(ctx, &bitmap, w, h).map(|(uv_min, uv_max)| CachedGlyph {
                uv_min,
                uv_max,
                left: metrics.xmin as f32 / scale,
                top: -(metrics.ymin as f32 + metrics.height as f32) / scale,
                width: metrics.width as f32 / scale,
                height: metrics.height as f32 / scale,
            })
        };
        self.glyph_cache.insert(key, entry);
        entry
    }

    fn upload(&mut self, ctx: &RenderCtx<'_>, bitmap: &[u8], w: u32, h: u32) -> Option<([f32; 2], [f32; 2])> {
        let atlas = self.atlas_texture.as_ref()?;
        let (gx, gy) = self.packer.place(w, h)?;

        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: atlas,
                mip_level: 0,
                origin: wgpu::Origin3d { x: gx, y: gy, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            bitmap,
            wgpu::TexelCopyBufferLayout { offset: 0, bytes_per_row: Some(w), rows_per_image: Some(h) },
            wgpu::Extent3d { width: w, height: h, depth_or_array_layers: 1 },
        );

        let atlas_f = ATLAS_SIZE as f32;
        Some((
            [gx as f32 / atlas_f, gy as f32 / atlas_f],
            [(gx + w) as f32 / atlas_f, (gy + h) as f32 / atlas_f],
        ))
    }

    fn ensure_atlas(&mut self, ctx: &RenderCtx<'_>) {
        if self.atlas_texture.is_some() {
            return;
        }

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("vista glyph atlas"),
            size: wgpu::Extent3d { width: ATLAS_SIZE, height: ATLAS_SIZE, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.atlas_view = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        self.atlas_texture = Some(texture);
        self.packer = ShelfPacker::default();
        self.glyph_cache.clear();
        self.sampler = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("vista glyph sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packer_wraps_to_next_shelf() {
        let mut p = ShelfPacker::default();
        assert_eq!(p.place(1000, 10), Some((1, 1)));
        assert_eq!(p.place(1000, 20), Some((1002, 1)));
        assert_eq!(p.place(100, 5), Some((1, 22)));
    }

    #[test]
    fn packer_reports_full() {
        let mut p = ShelfPacker::default();
        assert!(p.place(2000, 2000).is_some());
        assert!(p.place(2000, 100).is_none());
        assert!(p.place(1, 1).is_none());
    }
}
