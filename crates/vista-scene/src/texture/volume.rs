//! Three-dimensional data textures rendered by ray marching.

use glam::DVec3;
use vista_engine::scene::{CullMode, MeshCmd, TextureDim, TextureOp, VolumeCmd, VolumeStyle};
use vista_math::Range;

use crate::draw::DrawContext;
use crate::error::{Result, VistaError};
use crate::node::{Behavior, Bounds, NodeCx};
use crate::texture::colormap::{Colormap, ColormapSpec};
use crate::texture::upload::{DataTexture, HostImage, TextureSource};
use crate::widgets::Axes;

/// Step ratio of interactive frames.
pub const FAST_STEP_RATIO: f32 = 0.4;
const MAX_STEPS: usize = 4096;

/// Result of marching one ray on the host.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RaySample {
    /// Data value of the deciding sample (max, first crossing, or last
    /// sample for ray casting).
    pub value: f64,
    /// Value after the clim window, in `[0, 1]`.
    pub level: f32,
    pub color: [u8; 4],
}

/// A volume drawn as the front faces of its bounding box; each fragment
/// marches the view ray through the data.
#[derive(Debug, Clone)]
pub struct Texture3D {
    tex: DataTexture,
    colormap: Colormap,
    style: VolumeStyle,
    iso_threshold: f64,
    /// Samples per texel along the ray in normal frames.
    pub step_ratio: f32,
    failure_logged: bool,
}

impl Texture3D {
    pub fn new(source: impl Into<TextureSource>) -> Result<Self> {
        let tex = DataTexture::new(TextureDim::D3, source.into())?;
        let iso_threshold = tex.clim_ref().center();
        Ok(Self {
            tex,
            colormap: Colormap::gray(),
            style: VolumeStyle::Mip,
            iso_threshold,
            step_ratio: 1.0,
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

    pub fn style(&self) -> VolumeStyle {
        self.style
    }

    pub fn set_style(&mut self, style: VolumeStyle) {
        self.style = style;
    }

    /// Selects the render style by name: `mip`, `iso` (or `isosurface`),
    /// `ray` (or `raycasting`).
    pub fn set_style_name(&mut self, name: &str) -> Result<()> {
        self.style = match name {
            "mip" => VolumeStyle::Mip,
            "iso" | "isosurface" => VolumeStyle::Iso,
            "ray" | "raycasting" => VolumeStyle::Ray,
            _ => return Err(VistaError::invalid(format!("unknown volume render style {name:?}"))),
        };
        Ok(())
    }

    pub fn iso_threshold(&self) -> f64 {
        self.iso_threshold
    }

    pub fn set_iso_threshold(&mut self, v: f64) {
        self.iso_threshold = v;
    }

    /// Threshold in stored (`clim_ref`-normalized) units.
    fn normalized_threshold(&self) -> f32 {
        let r = self.tex.clim_ref();
        if r.range() == 0.0 { 0.0 } else { ((self.iso_threshold - r.min) / r.range()) as f32 }
    }

    /// Data-space box; voxel centres sit half a sample inside it.
    pub fn box_range(&self) -> (DVec3, DVec3) {
        let src = self.tex.source();
        let (shape, s, o) = (src.shape(), src.sampling(), src.origin());
        // Array order is (z, y, x).
        let lo = DVec3::new(o[2] - 0.5 * s[2], o[1] - 0.5 * s[1], o[0] - 0.5 * s[0]);
        let size = DVec3::new(shape[2] as f64 * s[2], shape[1] as f64 * s[1], shape[0] as f64 * s[0]);
        (lo, lo + size)
    }

    fn host(&self) -> Result<HostImage> {
        match self.tex.uploaded() {
            Some(up) => Ok(up.host.clone()),
            None => self.tex.host_image(),
        }
    }

    fn window(&self, v: f32) -> f32 {
        let (scale, bias) = self.tex.clim_transfer();
        ((v + bias) * scale).clamp(0.0, 1.0)
    }

    fn colorize(&self, level: f32) -> [f32; 4] {
        self.colormap.lookup(level)
    }

    /// Marches the ray from `near` to `far` (data space) through the volume
    /// with the active style, as the fragment program does.
    pub fn sample_ray(&self, near: DVec3, far: DVec3, step_ratio: f32) -> Result<Option<RaySample>> {
        let host = self.host()?;
        let (bmin, bmax) = self.box_range();
        let dir = far - near;
        let safe = |d: f64| if d.abs() < 1e-20 { 1e-20 } else { d };
        let inv = DVec3::new(1.0 / safe(dir.x), 1.0 / safe(dir.y), 1.0 / safe(dir.z));
        let ta = (bmin - near) * inv;
        let tb = (bmax - near) * inv;
        let t0 = ta.min(tb).max_element().max(0.0);
        let t1 = ta.max(tb).min_element();
        if t1 <= t0 {
            return Ok(None);
        }
        let extent = bmax - bmin;
        let n0 = (near + dir * t0 - bmin) / extent;
        let n1 = (near + dir * t1 - bmin) / extent;
        let (d, h, w) = (host.shape[0], host.shape[1], host.shape[2]);
        let step_len = 1.0 / (w.max(h).max(d) as f64 * step_ratio.max(0.01) as f64);
        let steps = ((n1 - n0).length() / step_len).ceil() as usize;
        if steps == 0 {
            return Ok(None);
        }
        let steps = steps.min(MAX_STEPS);
        let delta = (n1 - n0) / steps as f64;
        let voxel = |tc: DVec3| -> [isize; 3] {
            let ix = |t: f64, n: usize| ((t * n as f64).floor() as isize).clamp(0, n as isize - 1);
            [ix(tc.z, d), ix(tc.y, h), ix(tc.x, w)]
        };
        let sample = |tc: DVec3| host.at(&voxel(tc), 0);
        let r = self.tex.clim_ref();
        let to_data = |v: f32| r.min + v as f64 * r.range();
        let finish = |v: f32, rgba: [f32; 4]| {
            let level = self.window(v);
            RaySample { value: to_data(v), level, color: rgba.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8) }
        };

        match self.style {
            VolumeStyle::Mip => {
                let vmax = (0..=steps).map(|i| sample(n0 + delta * i as f64)).fold(0.0f32, f32::max);
                let c = self.colorize(self.window(vmax));
                Ok(Some(finish(vmax, [c[0], c[1], c[2], 1.0])))
            }
            VolumeStyle::Iso => {
                let th = self.normalized_threshold();
                let texel = DVec3::new(1.0 / w as f64, 1.0 / h as f64, 1.0 / d as f64);
                for i in 0..=steps {
                    let tc = n0 + delta * i as f64;
                    let v = sample(tc);
                    if v >= th {
                        let axis = |e: DVec3| (sample(tc + e) - sample(tc - e)) as f64;
                        let g = DVec3::new(
                            axis(DVec3::new(texel.x, 0.0, 0.0)),
                            axis(DVec3::new(0.0, texel.y, 0.0)),
                            axis(DVec3::new(0.0, 0.0, texel.z)),
                        );
                        let lit = if g.length_squared() > 1e-12 {
                            (0.3 + 0.7 * g.normalize().dot(dir.normalize()).abs()) as f32
                        } else {
                            1.0
                        };
                        let c = self.colorize(self.window(v));
                        return Ok(Some(finish(v, [c[0] * lit, c[1] * lit, c[2] * lit, 1.0])));
                    }
                }
                Ok(None)
            }
            VolumeStyle::Ray => {
                let mut acc = [0.0f32; 4];
                let mut last = 0.0;
                for i in 0..=steps {
                    let v = sample(n0 + delta * i as f64);
                    last = v;
                    let c = self.colorize(self.window(v));
                    let a = 1.0 - (1.0 - c[3].clamp(0.0, 1.0)).powf(1.0 / step_ratio.max(0.01));
                    for k in 0..3 {
                        acc[k] += (1.0 - acc[3]) * a * c[k];
                    }
                    acc[3] += (1.0 - acc[3]) * a;
                    if acc[3] > 0.99 {
                        break;
                    }
                }
                if acc[3] <= 0.0 {
                    return Ok(None);
                }
                Ok(Some(finish(last, [acc[0] / acc[3], acc[1] / acc[3], acc[2] / acc[3], acc[3]])))
            }
        }
    }
}

/// Cull mode that keeps front faces under a data aspect that may mirror.
pub fn volume_cull(daspect: DVec3) -> CullMode {
    if daspect.x * daspect.y * daspect.z < 0.0 { CullMode::Front } else { CullMode::Back }
}

fn box_corners(lo: DVec3, hi: DVec3) -> [[f32; 3]; 8] {
    std::array::from_fn(|i| {
        [
            if i & 1 == 0 { lo.x } else { hi.x } as f32,
            if i & 2 == 0 { lo.y } else { hi.y } as f32,
            if i & 4 == 0 { lo.z } else { hi.z } as f32,
        ]
    })
}

impl Behavior for Texture3D {
    fn type_name(&self) -> &'static str {
        "Texture3D"
    }

    fn on_draw(&mut self, node: NodeCx<'_>, ctx: &mut DrawContext<'_>) -> Result<()> {
        let caps = *ctx.caps();
        let texture = match self.tex.prepare(&caps, ctx.resources, ctx.list) {
            Ok(Some(id)) => id,
            Ok(None) => return Ok(()),
            Err(e) => {
                if !self.failure_logged {
                    log::error!("volume not drawn: {e}");
                    self.failure_logged = true;
                }
                return Ok(());
            }
        };
        let Some(up) = self.tex.uploaded() else { return Ok(()) };
        let (size, uv) = (up.desc.size, up.uv_scale);
        let colormap = Some(ctx.colormap(self.colormap.table()));
        let (clim_scale, clim_bias) = self.tex.clim_transfer();
        let (lo, hi) = self.box_range();
        let daspect = node.ancestor::<Axes>().map_or(DVec3::ONE, |(_, a)| a.daspect());
        let cmd = VolumeCmd {
            texture,
            colormap,
            box_min: lo.as_vec3().to_array(),
            box_max: hi.as_vec3().to_array(),
            shape: size.map(|s| s as f32),
            uv_scale: uv,
            clim_scale,
            clim_bias,
            style: self.style,
            threshold: self.normalized_threshold(),
            step_ratio: if ctx.is_fast() { FAST_STEP_RATIO } else { self.step_ratio },
        };
        let state = ctx.world_state().with_cull(volume_cull(daspect));
        ctx.list.push_volume(state, cmd);
        Ok(())
    }

    fn on_draw_shape(&mut self, node: NodeCx<'_>, ctx: &mut DrawContext<'_>) -> Result<()> {
        let (lo, hi) = self.box_range();
        let daspect = node.ancestor::<Axes>().map_or(DVec3::ONE, |(_, a)| a.daspect());
        let state = ctx.world_state().with_cull(volume_cull(daspect));
        let color = ctx.shape_color();
        ctx.list.push_mesh(
            state,
            MeshCmd {
                positions: box_corners(lo, hi).to_vec(),
                normals: None,
                indices: VolumeCmd::FACE_INDICES.to_vec(),
                color,
                lit: false,
            },
        );
        Ok(())
    }

    fn on_destroy_gpu(&mut self, releases: &mut Vec<TextureOp>) {
        self.tex.release(releases);
    }

    fn bounds(&self) -> Option<Bounds> {
        let (lo, hi) = self.box_range();
        Some([Range::new(lo.x, hi.x), Range::new(lo.y, hi.y), Range::new(lo.z, hi.z)])
    }

    fn has_attribute(&self, name: &str) -> bool {
        matches!(name, "clim" | "colormap" | "render_style" | "iso_threshold")
    }
}
