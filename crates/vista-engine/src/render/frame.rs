use crate::paint::Color;
use crate::scene::{DrawCmd, DrawList};
use crate::text::FontSystem;

use super::common::PreparedDraw;
use super::glyphs::GlyphRenderer;
use super::image::ImageRenderer;
use super::lines::LineRenderer;
use super::mesh::MeshRenderer;
use super::points::PointRenderer;
use super::volume::VolumeRenderer;
use super::{RenderCtx, RenderTarget, TexturePool};

/// Draws a [`DrawList`] into a frame.
///
/// Each frame runs in two phases: texture ops are applied and every command
/// is prepared (pipelines, buffers, bind groups), then all prepared draws
/// are recorded in paint order into one render pass that clears color and
/// depth. Commands a renderer cannot prepare are skipped.
pub struct Renderer {
    textures: TexturePool,
    lines: LineRenderer,
    points: PointRenderer,
    mesh: MeshRenderer,
    image: ImageRenderer,
    volume: VolumeRenderer,
    glyphs: GlyphRenderer,
    warned_no_shaders: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            textures: TexturePool::default(),
            lines: LineRenderer::default(),
            points: PointRenderer::default(),
            mesh: MeshRenderer::default(),
            image: ImageRenderer::default(),
            volume: VolumeRenderer::default(),
            glyphs: GlyphRenderer::default(),
            warned_no_shaders: false,
        }
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn textures(&self) -> &TexturePool {
        &self.textures
    }

    /// Images are being drawn with the plain fallback program.
    pub fn images_degraded(&self) -> bool {
        self.image.is_degraded()
    }

    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        draw_list: &mut DrawList,
        fonts: &FontSystem,
    ) {
        let ops = draw_list.take_texture_ops();
        self.textures.apply(ctx, ops);
        let clear = draw_list.clear_color().unwrap_or(Color::WHITE);

        let mut prepared: Vec<PreparedDraw> = Vec::with_capacity(draw_list.len());
        if ctx.caps.shaders {
            for item in draw_list.iter_in_paint_order() {
                let state = &item.state;
                let draw = match &item.cmd {
                    DrawCmd::Lines(c) => self.lines.prepare(ctx, state, c),
                    DrawCmd::Points(c) => self.points.prepare_points(ctx, &mut self.textures, state, c),
                    DrawCmd::Sprites(c) => self.points.prepare_sprites(ctx, &mut self.textures, state, c),
                    DrawCmd::Mesh(c) => self.mesh.prepare(ctx, state, c),
                    DrawCmd::Image(c) => self.image.prepare(ctx, &mut self.textures, state, c),
                    DrawCmd::Volume(c) => self.volume.prepare(ctx, &mut self.textures, state, c),
                    DrawCmd::Glyphs(c) => self.glyphs.prepare(ctx, fonts, state, c),
                };
                match draw {
                    Some(d) => prepared.push(d),
                    None => log::trace!("skipped {} command", item.cmd.name()),
                }
            }
        } else if !self.warned_no_shaders {
            log::error!("device has no programmable shading; frames are cleared only");
            self.warned_no_shaders = true;
        }

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("vista frame pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations { load: wgpu::LoadOp::Clear(clear.to_wgpu()), store: wgpu::StoreOp::Store },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view,
                depth_ops: Some(wgpu::Operations { load: wgpu::LoadOp::Clear(1.0), store: wgpu::StoreOp::Store }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        for draw in &prepared {
            draw.record(&mut rpass);
        }
    }
}
