//! Two-dimensional data textures (images).

use glam::DVec3;
use vista_engine::scene::{ImageCmd, TextureDim, TextureOp};
use vista_math::Range;

use crate::draw::DrawContext;
use crate::error::Result;
use crate::node::{Behavior, Bounds, NodeCx};
use crate::texture::colormap::{Colormap, ColormapSpec};
use crate::texture::upload::{DataTexture, TextureSource};
use crate::texture::{aa_sigma, aa_weights};

/// An image drawn as a textured quad in data space.
///
/// Pixel centres sit at integer multiples of the sampling (plus origin),
/// so the quad spans half a sample beyond them on every side.
#[derive(Debug, Clone)]
pub struct Texture2D {
    tex: DataTexture,
    colormap: Colormap,
    /// Smoothing kernel half-width, `0..=3`.
    pub aa: u32,
    failure_logged: bool,
}

impl Texture2D {
    pub fn new(source: impl Into<TextureSource>) -> Result<Self> {
        Ok(Self {
            tex: DataTexture::new(TextureDim::D2, source.into())?,
            colormap: Colormap::gray(),
            aa: 0,
            failure_logged: false,
        })
    }

    pub fn texture(&self) -> &DataTexture {
        &self.tex
    }

    pub fn set_data(&mut self, source: impl Into<TextureSource>) -> Result<()> {
        self.failure_logged = false;
        self.tex.set_data(source.into())
    }

    pub fn clim(&self) -> Range {
        self.tex.clim()
    }

    pub fn set_clim(&mut self, clim: Range) -> Result<()> {
        self.tex.set_clim(clim)
    }

    pub fn set_interpolate(&mut self, on: bool) {
        self.tex.set_interpolate(on);
    }

    pub fn colormap(&self) -> &Colormap {
        &self.colormap
    }

    pub fn set_colormap(&mut self, spec: &ColormapSpec) -> Result<()> {
        self.colormap = Colormap::new(spec)?;
        Ok(())
    }

    /// Selects a smoothing kernel by name, `"aa0"` to `"aa3"`.
    pub fn set_shader(&mut self, name: &str) -> Result<()> {
        match name.strip_prefix("aa").and_then(|n| n.parse::<u32>().ok()) {
            Some(n) if n <= super::MAX_AA => {
                self.aa = n;
                Ok(())
            }
            _ => Err(crate::error::VistaError::invalid(format!("unknown image shader {name:?}"))),
        }
    }

    /// Data-space corners, row 0 first.
    pub fn corners(&self) -> [[f32; 3]; 4] {
        let src = self.tex.source();
        let (shape, sampling, origin) = (src.shape(), src.sampling(), src.origin());
        let (h, w) = (shape[0] as f64, shape[1] as f64);
        let x0 = origin[1] - 0.5 * sampling[1];
        let x1 = origin[1] + (w - 0.5) * sampling[1];
        let y0 = origin[0] - 0.5 * sampling[0];
        let y1 = origin[0] + (h - 0.5) * sampling[0];
        let c = |x: f64, y: f64| [x as f32, y as f32, 0.0];
        [c(x0, y0), c(x1, y0), c(x1, y1), c(x0, y1)]
    }

    fn pixels_per_texel(&self, ctx: &DrawContext<'_>) -> f64 {
        let [a, ..] = self.corners();
        let sx = self.tex.source().sampling()[1];
        let p0 = DVec3::new(a[0] as f64, a[1] as f64, 0.0);
        match (ctx.project(p0), ctx.project(p0 + DVec3::new(sx, 0.0, 0.0))) {
            (Some(p), Some(q)) => (q.truncate() - p.truncate()).length(),
            _ => 0.0,
        }
    }
}

impl Behavior for Texture2D {
    fn type_name(&self) -> &'static str {
        "Texture2D"
    }

    fn on_draw(&mut self, _node: NodeCx<'_>, ctx: &mut DrawContext<'_>) -> Result<()> {
        let caps = *ctx.caps();
        let texture = match self.tex.prepare(&caps, ctx.resources, ctx.list) {
            Ok(Some(id)) => id,
            Ok(None) => return Ok(()),
            Err(e) => {
                if !self.failure_logged {
                    log::error!("image not drawn: {e}");
                    self.failure_logged = true;
                }
                return Ok(());
            }
        };
        let Some(up) = self.tex.uploaded() else { return Ok(()) };
        let (size, uv) = (up.desc.size, up.uv_scale);
        let colormap = (up.host.channels == 1).then(|| ctx.colormap(self.colormap.table()));
        let (clim_scale, clim_bias) = self.tex.clim_transfer();
        // Fast frames skip the smoothing kernel.
        let taps = if ctx.is_fast() { 0 } else { self.aa };
        let aa_weights = aa_weights(aa_sigma(self.pixels_per_texel(ctx)), taps);
        let cmd = ImageCmd {
            texture,
            colormap,
            corners: self.corners(),
            uv_scale: [uv[0], uv[1]],
            clim_scale,
            clim_bias,
            aa_weights,
            aa_taps: taps,
            texel: [1.0 / size[0] as f32, 1.0 / size[1] as f32],
            plain: false,
        };
        let state = ctx.world_state();
        ctx.list.push_image(state, cmd);
        Ok(())
    }

    fn on_draw_shape(&mut self, _node: NodeCx<'_>, ctx: &mut DrawContext<'_>) -> Result<()> {
        let state = ctx.world_state();
        let color = ctx.shape_color();
        ctx.list.push_quad(state, self.corners(), color);
        Ok(())
    }

    fn on_destroy_gpu(&mut self, releases: &mut Vec<TextureOp>) {
        self.tex.release(releases);
    }

    fn bounds(&self) -> Option<Bounds> {
        let [a, _, c, _] = self.corners();
        Some([
            Range::new(a[0] as f64, c[0] as f64),
            Range::new(a[1] as f64, c[1] as f64),
            Range::new(0.0, 0.0),
        ])
    }

    fn has_attribute(&self, name: &str) -> bool {
        matches!(name, "clim" | "colormap" | "interpolate")
    }
}
