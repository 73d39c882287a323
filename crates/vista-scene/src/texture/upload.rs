//! Host side of texture uploads.
//!
//! Source arrays are converted to an upload buffer (channel layout, value
//! mapping by `clim_ref`), downsampled while they exceed the device limits,
//! padded to powers of two on devices without NPOT support, and recorded as
//! texture ops. An upload with an unchanged shape becomes an in-place
//! update.

use vista_engine::device::GpuCaps;
use vista_engine::scene::{DrawList, TexelFormat, TextureData, TextureDesc, TextureDim, TextureId, TextureOp};
use vista_math::{Aarray, Point, Range};

use crate::draw::Resources;
use crate::error::{Result, VistaError};

/// Number of halvings tried before an upload fails.
pub const MAX_DOWNSAMPLES: usize = 8;

/// Source array of a texture, in any element type accepted at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureSource {
    U8(Aarray<u8>),
    I8(Aarray<i8>),
    U16(Aarray<u16>),
    I16(Aarray<i16>),
    U32(Aarray<u32>),
    I32(Aarray<i32>),
    F32(Aarray<f32>),
    F64(Aarray<f64>),
    Bool(Aarray<bool>),
}

macro_rules! source_from {
    ($($variant:ident => $t:ty),*) => {
        $(impl From<Aarray<$t>> for TextureSource {
            fn from(a: Aarray<$t>) -> Self {
                TextureSource::$variant(a)
            }
        })*
    };
}

source_from!(U8 => u8, I8 => i8, U16 => u16, I16 => i16, U32 => u32, I32 => i32, F32 => f32, F64 => f64, Bool => bool);

macro_rules! each {
    ($self:expr, $a:ident => $body:expr) => {
        match $self {
            TextureSource::U8($a) => $body,
            TextureSource::I8($a) => $body,
            TextureSource::U16($a) => $body,
            TextureSource::I16($a) => $body,
            TextureSource::U32($a) => $body,
            TextureSource::I32($a) => $body,
            TextureSource::F32($a) => $body,
            TextureSource::F64($a) => $body,
            TextureSource::Bool($a) => $body,
        }
    };
}

impl TextureSource {
    pub fn shape(&self) -> &[usize] {
        each!(self, a => a.shape())
    }

    pub fn sampling(&self) -> &[f64] {
        each!(self, a => a.sampling())
    }

    pub fn origin(&self) -> &[f64] {
        each!(self, a => a.origin())
    }

    pub fn min_max(&self) -> Option<(f64, f64)> {
        each!(self, a => a.min_max())
    }

    /// Nearest value at a world point; `None` outside the array.
    pub fn sample(&self, p: Point) -> Option<f64> {
        use vista_math::Scalar;
        each!(self, a => a.sample(p).ok().map(|v| v.to_f64()))
    }

    /// Value range the upload maps onto `[0, 1]`.
    ///
    /// Bytes and booleans are stored as normalized bytes. Other integers
    /// span their type's range. Floats span the data extrema.
    pub fn clim_ref(&self) -> Range {
        let full = |lo: f64, hi: f64| Range::new(lo, hi);
        match self {
            TextureSource::U8(_) | TextureSource::Bool(_) => full(0.0, 255.0),
            TextureSource::I8(_) => full(i8::MIN as f64, i8::MAX as f64),
            TextureSource::U16(_) => full(0.0, u16::MAX as f64),
            TextureSource::I16(_) => full(i16::MIN as f64, i16::MAX as f64),
            TextureSource::U32(_) => full(0.0, u32::MAX as f64),
            TextureSource::I32(_) => full(i32::MIN as f64, i32::MAX as f64),
            TextureSource::F32(_) | TextureSource::F64(_) => {
                let (lo, hi) = self.min_max().unwrap_or((0.0, 1.0));
                full(lo, hi)
            }
        }
    }

    fn is_bytes(&self) -> bool {
        matches!(self, TextureSource::U8(_) | TextureSource::Bool(_))
    }

    /// Values in array order, widened to `f32`.
    fn values(&self) -> Vec<f32> {
        match self {
            TextureSource::U8(a) => a.data().iter().map(|&v| v as f32).collect(),
            TextureSource::Bool(a) => a.data().iter().map(|&v| if v { 1.0 } else { 0.0 }).collect(),
            TextureSource::F32(a) => a.data().to_vec(),
            other => {
                use vista_math::Scalar;
                each!(other, a => a.data().iter().map(|v| v.to_f64() as f32).collect())
            }
        }
    }
}

/// Upload progress of a texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum UploadState {
    #[default]
    NeedsUpload,
    NeedsUploadWithPadding,
    UploadedOk,
    UploadedPaddedOk,
    Failed,
}

impl UploadState {
    pub fn is_uploaded(self) -> bool {
        matches!(self, UploadState::UploadedOk | UploadState::UploadedPaddedOk)
    }

    pub fn needs_upload(self) -> bool {
        matches!(self, UploadState::NeedsUpload | UploadState::NeedsUploadWithPadding)
    }
}

/// Spatial shape (array order) and channel count of a source for a kind.
pub fn split_channels(shape: &[usize], dim: TextureDim) -> Result<(Vec<usize>, usize)> {
    let n = dim.ndim();
    let bad = || VistaError::invalid(format!("shape {shape:?} cannot be a {n}-D texture"));
    if shape.iter().any(|&s| s == 0) {
        return Err(bad());
    }
    match shape.len() {
        l if l == n => Ok((shape.to_vec(), 1)),
        l if l == n + 1 => match shape[n] {
            1 => Ok((shape[..n].to_vec(), 1)),
            3 | 4 if dim != TextureDim::D3 => Ok((shape[..n].to_vec(), shape[n])),
            _ => Err(bad()),
        },
        _ => Err(bad()),
    }
}

/// Interleaved host buffer in array order, `channels` values per texel.
#[derive(Debug, Clone, PartialEq)]
pub struct HostImage {
    pub values: Vec<f32>,
    /// Spatial shape, array order (`[h, w]`, `[d, h, w]`).
    pub shape: Vec<usize>,
    pub channels: usize,
}

impl HostImage {
    fn texels(&self) -> usize {
        self.shape.iter().product()
    }

    fn offset(&self, idx: &[usize]) -> usize {
        idx.iter().zip(&self.shape).fold(0, |acc, (&i, &s)| acc * s + i)
    }

    /// Value of one channel at a clamped spatial index.
    pub fn at(&self, idx: &[isize], c: usize) -> f32 {
        let clamped: Vec<usize> =
            idx.iter().zip(&self.shape).map(|(&i, &s)| i.clamp(0, s as isize - 1) as usize).collect();
        self.values[self.offset(&clamped) * self.channels + c]
    }

    /// Halves every spatial dimension with a cross-shaped low-pass:
    /// 0.4 at the centre and the rest spread over the direct neighbours
    /// (0.15 each in 2-D, 0.1 each in 3-D).
    pub fn downsample(&self) -> HostImage {
        let nd = self.shape.len();
        let side = match nd {
            1 => 0.3,
            2 => 0.15,
            _ => 0.1,
        };
        let shape: Vec<usize> = self.shape.iter().map(|&s| s.div_ceil(2)).collect();
        let count: usize = shape.iter().product();
        let mut values = Vec::with_capacity(count * self.channels);
        let mut idx = vec![0usize; nd];
        for _ in 0..count {
            let src: Vec<isize> = idx.iter().map(|&i| 2 * i as isize).collect();
            for c in 0..self.channels {
                let mut v = 0.4 * self.at(&src, c);
                for d in 0..nd {
                    for step in [-1isize, 1] {
                        let mut n = src.clone();
                        n[d] += step;
                        v += side * self.at(&n, c);
                    }
                }
                values.push(v);
            }
            // Row-major increment.
            for d in (0..nd).rev() {
                idx[d] += 1;
                if idx[d] < shape[d] {
                    break;
                }
                idx[d] = 0;
            }
        }
        HostImage { values, shape, channels: self.channels }
    }

    /// Zero-pads every spatial dimension up to a power of two.
    pub fn padded(&self) -> HostImage {
        let shape: Vec<usize> = self.shape.iter().map(|s| s.next_power_of_two()).collect();
        if shape == self.shape {
            return self.clone();
        }
        let count: usize = shape.iter().product();
        let mut values = vec![0.0; count * self.channels];
        let mut idx = vec![0usize; self.shape.len()];
        for t in 0..self.texels() {
            let dst = idx.iter().zip(&shape).fold(0, |acc, (&i, &s)| acc * s + i);
            values[dst * self.channels..(dst + 1) * self.channels]
                .copy_from_slice(&self.values[t * self.channels..(t + 1) * self.channels]);
            for d in (0..idx.len()).rev() {
                idx[d] += 1;
                if idx[d] < self.shape[d] {
                    break;
                }
                idx[d] = 0;
            }
        }
        HostImage { values, shape, channels: self.channels }
    }
}

/// Geometry of what is resident on the device.
#[derive(Debug, Clone, PartialEq)]
pub struct Uploaded {
    pub desc: TextureDesc,
    /// Extent of the data inside the (possibly padded) texture, per texture
    /// axis `(x, y, z)`.
    pub uv_scale: [f32; 3],
    /// Halvings applied to fit the device.
    pub downsamples: usize,
    /// The mapped host data before padding; kept for host-side sampling.
    pub host: HostImage,
}

/// GPU residency of one data texture.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTexture {
    dim: TextureDim,
    id: Option<TextureId>,
    source: TextureSource,
    state: UploadState,
    clim_ref: Range,
    clim: Range,
    interpolate: bool,
    uploaded: Option<Uploaded>,
    creates: usize,
    updates: usize,
    warned_unsupported: bool,
}

impl DataTexture {
    pub fn new(dim: TextureDim, source: TextureSource) -> Result<Self> {
        split_channels(source.shape(), dim)?;
        let clim_ref = source.clim_ref();
        let clim = match source.min_max() {
            Some((lo, hi)) if lo < hi => Range::new(lo, hi),
            _ => clim_ref,
        };
        Ok(Self {
            dim,
            id: None,
            source,
            state: UploadState::NeedsUpload,
            clim_ref,
            clim,
            interpolate: false,
            uploaded: None,
            creates: 0,
            updates: 0,
            warned_unsupported: false,
        })
    }

    pub fn dim(&self) -> TextureDim {
        self.dim
    }

    pub fn id(&self) -> Option<TextureId> {
        self.id
    }

    pub fn source(&self) -> &TextureSource {
        &self.source
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    pub fn uploaded(&self) -> Option<&Uploaded> {
        self.uploaded.as_ref()
    }

    /// Texture creations recorded so far.
    pub fn creates(&self) -> usize {
        self.creates
    }

    /// In-place updates recorded so far.
    pub fn updates(&self) -> usize {
        self.updates
    }

    /// Replaces the data; the next prepare uploads it.
    pub fn set_data(&mut self, source: TextureSource) -> Result<()> {
        split_channels(source.shape(), self.dim)?;
        self.clim_ref = source.clim_ref();
        self.source = source;
        self.state = UploadState::NeedsUpload;
        Ok(())
    }

    pub fn clim(&self) -> Range {
        self.clim
    }

    pub fn clim_ref(&self) -> Range {
        self.clim_ref
    }

    pub fn interpolate(&self) -> bool {
        self.interpolate
    }

    /// Linear filtering on or off; a resident texture is re-uploaded.
    pub fn set_interpolate(&mut self, on: bool) {
        if self.interpolate != on {
            self.interpolate = on;
            if self.state.is_uploaded() {
                self.state = UploadState::NeedsUpload;
            }
        }
    }

    /// Sets the display window. Re-marks the texture for upload since the
    /// transfer mapping is rebuilt.
    pub fn set_clim(&mut self, clim: Range) -> Result<()> {
        if !clim.is_finite() {
            return Err(VistaError::invalid(format!("clim {clim:?} is not finite")));
        }
        self.clim = clim;
        if self.state != UploadState::Failed {
            self.state = UploadState::NeedsUpload;
        }
        Ok(())
    }

    /// `(scale, bias)` applied by the shaders: `(t + bias) · scale`.
    pub fn clim_transfer(&self) -> (f32, f32) {
        let r = self.clim_ref.range();
        let c = self.clim.range();
        if r == 0.0 || c == 0.0 {
            return (1.0, 0.0);
        }
        ((r / c) as f32, ((self.clim_ref.min - self.clim.min) / r) as f32)
    }

    /// Builds the mapped host image at full resolution.
    pub(crate) fn host_image(&self) -> Result<HostImage> {
        let (shape, channels) = split_channels(self.source.shape(), self.dim)?;
        let mut values = self.source.values();
        let r = self.clim_ref;
        if self.source.is_bytes() {
            // Stored as bytes; normalization happens on the device.
        } else if r.range() != 0.0 {
            let (lo, w) = (r.min as f32, r.range() as f32);
            values.iter_mut().for_each(|v| *v = (*v - lo) / w);
        } else {
            values.iter_mut().for_each(|v| *v = 0.0);
        }
        // RGB widens to RGBA with opaque alpha.
        if channels == 3 {
            let full = if self.source.is_bytes() { 255.0 } else { 1.0 };
            let rgba = values.chunks_exact(3).flat_map(|c| [c[0], c[1], c[2], full]).collect();
            return Ok(HostImage { values: rgba, shape, channels: 4 });
        }
        Ok(HostImage { values, shape, channels })
    }

    /// Makes the texture resident, recording the needed ops into `list`.
    ///
    /// Returns `Ok(None)` when the device cannot hold this kind of texture
    /// at all; logs that once.
    pub fn prepare(&mut self, caps: &GpuCaps, resources: &mut Resources, list: &mut DrawList) -> Result<Option<TextureId>> {
        if self.dim == TextureDim::D3 && !caps.textures_3d {
            if !self.warned_unsupported {
                log::warn!("device has no 3-D textures; volume not drawn");
                self.warned_unsupported = true;
            }
            return Ok(None);
        }
        match self.state {
            UploadState::Failed => return Ok(None),
            s if s.is_uploaded() => return Ok(self.id),
            _ => {}
        }
        if !caps.npot_textures {
            self.state = UploadState::NeedsUploadWithPadding;
        }
        match self.upload(caps, resources, list) {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                self.state = UploadState::Failed;
                Err(e)
            }
        }
    }

    fn upload(&mut self, caps: &GpuCaps, resources: &mut Resources, list: &mut DrawList) -> Result<TextureId> {
        let max = caps.max_texture(self.dim.ndim()) as usize;
        let mut host = self.host_image()?;
        let mut downsamples = 0;
        while host.shape.iter().any(|&s| s > max) {
            if downsamples == MAX_DOWNSAMPLES {
                return Err(VistaError::UploadFailure(format!(
                    "out of texture memory: {:?} still exceeds {max} after {MAX_DOWNSAMPLES} downsamples",
                    host.shape
                )));
            }
            host = host.downsample();
            downsamples += 1;
        }
        if downsamples > 0 {
            log::warn!("texture downsampled {downsamples} times to {:?} to fit the device", host.shape);
        }
        let padding = self.state == UploadState::NeedsUploadWithPadding;
        let device_image = if padding { host.padded() } else { host.clone() };

        // Texture axes are (x, y, z): array order reversed.
        let mut size = [1u32; 3];
        let mut uv_scale = [1.0f32; 3];
        for (i, (&real, &dev)) in host.shape.iter().rev().zip(device_image.shape.iter().rev()).enumerate() {
            size[i] = dev as u32;
            uv_scale[i] = real as f32 / dev as f32;
        }
        let bytes = self.source.is_bytes();
        let format = match (bytes, device_image.channels) {
            (true, 1) => TexelFormat::R8,
            (true, _) => TexelFormat::Rgba8,
            (false, 1) => TexelFormat::R32F,
            (false, _) => TexelFormat::Rgba32F,
        };
        let linear = self.interpolate && (bytes || caps.float32_filterable);
        let desc = TextureDesc { dim: self.dim, size, format, linear };
        let data = if bytes {
            TextureData::U8(device_image.values.iter().map(|v| v.round().clamp(0.0, 255.0) as u8).collect())
        } else {
            TextureData::F32(device_image.values)
        };

        let id = match (self.id, &self.uploaded) {
            (Some(id), Some(prev)) if prev.desc.size == desc.size && prev.desc.format == desc.format && prev.desc.dim == desc.dim => {
                list.push_texture_op(TextureOp::Update { id, data });
                if prev.desc.linear != desc.linear {
                    list.push_texture_op(TextureOp::SetFilter { id, linear: desc.linear });
                }
                self.updates += 1;
                id
            }
            (old, _) => {
                if let Some(old) = old {
                    list.push_texture_op(TextureOp::Destroy { id: old });
                }
                let id = resources.alloc_texture();
                list.push_texture_op(TextureOp::Create { id, desc, data });
                self.creates += 1;
                log::debug!("created {:?} texture {id:?} of {:?}", self.dim, desc.size);
                id
            }
        };
        self.id = Some(id);
        self.uploaded = Some(Uploaded { desc, uv_scale, downsamples, host });
        self.state = if padding { UploadState::UploadedPaddedOk } else { UploadState::UploadedOk };
        Ok(id)
    }

    /// Queues destruction of the device texture.
    pub fn release(&mut self, out: &mut Vec<TextureOp>) {
        if let Some(id) = self.id.take() {
            out.push(TextureOp::Destroy { id });
        }
        self.uploaded = None;
        if self.state != UploadState::Failed {
            self.state = UploadState::NeedsUpload;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps() -> GpuCaps {
        GpuCaps::desktop()
    }

    fn image(w: usize, h: usize) -> TextureSource {
        let data: Vec<f32> = (0..w * h).map(|i| i as f32).collect();
        Aarray::new(data, vec![h, w]).unwrap().into()
    }

    fn prepare(t: &mut DataTexture, caps: &GpuCaps, list: &mut DrawList) -> Result<Option<TextureId>> {
        let mut res = Resources::default();
        t.prepare(caps, &mut res, list)
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn channel_layouts() {
        assert_eq!(split_channels(&[4, 5], TextureDim::D2).unwrap(), (vec![4, 5], 1));
        assert_eq!(split_channels(&[4, 5, 3], TextureDim::D2).unwrap(), (vec![4, 5], 3));
        assert_eq!(split_channels(&[4, 5, 1], TextureDim::D2).unwrap(), (vec![4, 5], 1));
        assert!(split_channels(&[4, 5, 2], TextureDim::D2).is_err());
        assert!(split_channels(&[2, 2, 2, 3], TextureDim::D3).is_err());
        assert!(split_channels(&[0, 5], TextureDim::D2).is_err());
    }

    // ── upload ────────────────────────────────────────────────────────────

    #[test]
    fn one_by_one_uploads_as_luminance() {
        let src: TextureSource = Aarray::new(vec![7u8], vec![1, 1]).unwrap().into();
        let mut t = DataTexture::new(TextureDim::D2, src).unwrap();
        let mut list = DrawList::new();
        prepare(&mut t, &caps(), &mut list).unwrap();
        assert_eq!(t.state(), UploadState::UploadedOk);
        match &list.texture_ops()[0] {
            TextureOp::Create { desc, data, .. } => {
                assert_eq!(desc.format, TexelFormat::R8);
                assert_eq!(desc.size, [1, 1, 1]);
                assert_eq!(data, &TextureData::U8(vec![7]));
            }
            op => panic!("unexpected {op:?}"),
        }
    }

    #[test]
    fn same_shape_updates_in_place() {
        let mut t = DataTexture::new(TextureDim::D2, image(4, 3)).unwrap();
        let mut list = DrawList::new();
        let mut res = Resources::default();
        t.prepare(&caps(), &mut res, &mut list).unwrap();
        t.set_data(image(4, 3)).unwrap();
        t.prepare(&caps(), &mut res, &mut list).unwrap();
        assert_eq!(t.creates(), 1);
        assert_eq!(t.updates(), 1);
        assert!(matches!(list.texture_ops()[1], TextureOp::Update { .. }));
    }

    #[test]
    fn floats_are_mapped_by_clim_ref() {
        let mut t = DataTexture::new(TextureDim::D2, image(2, 2)).unwrap();
        let mut list = DrawList::new();
        prepare(&mut t, &caps(), &mut list).unwrap();
        assert_eq!(t.clim_ref(), Range::new(0.0, 3.0));
        match &list.texture_ops()[0] {
            TextureOp::Create { data: TextureData::F32(v), desc, .. } => {
                assert_eq!(desc.format, TexelFormat::R32F);
                assert!((v[3] - 1.0).abs() < 1e-6 && v[0] == 0.0);
            }
            op => panic!("unexpected {op:?}"),
        }
    }

    #[test]
    fn rgb_widens_to_rgba() {
        let src: TextureSource = Aarray::new(vec![1u8, 2, 3], vec![1, 1, 3]).unwrap().into();
        let mut t = DataTexture::new(TextureDim::D2, src).unwrap();
        let mut list = DrawList::new();
        prepare(&mut t, &caps(), &mut list).unwrap();
        match &list.texture_ops()[0] {
            TextureOp::Create { data, desc, .. } => {
                assert_eq!(desc.format, TexelFormat::Rgba8);
                assert_eq!(data, &TextureData::U8(vec![1, 2, 3, 255]));
            }
            op => panic!("unexpected {op:?}"),
        }
    }

    #[test]
    fn oversized_textures_are_downsampled() {
        let caps = GpuCaps { max_texture_2d: 4, ..caps() };
        let mut t = DataTexture::new(TextureDim::D2, image(9, 3)).unwrap();
        let mut list = DrawList::new();
        prepare(&mut t, &caps, &mut list).unwrap();
        let up = t.uploaded().unwrap();
        assert_eq!(up.downsamples, 2);
        assert_eq!(up.desc.size, [3, 1, 1]);
    }

    #[test]
    fn hopeless_textures_fail_and_stay_failed() {
        let caps = GpuCaps { max_texture_2d: 0, ..caps() };
        let mut t = DataTexture::new(TextureDim::D2, image(4, 4)).unwrap();
        let mut list = DrawList::new();
        assert!(matches!(prepare(&mut t, &caps, &mut list), Err(VistaError::UploadFailure(_))));
        assert_eq!(t.state(), UploadState::Failed);
        assert_eq!(prepare(&mut t, &GpuCaps::desktop(), &mut list).unwrap(), None);
    }

    #[test]
    fn npot_less_devices_get_padding() {
        let caps = GpuCaps { npot_textures: false, ..caps() };
        let mut t = DataTexture::new(TextureDim::D2, image(5, 3)).unwrap();
        let mut list = DrawList::new();
        prepare(&mut t, &caps, &mut list).unwrap();
        assert_eq!(t.state(), UploadState::UploadedPaddedOk);
        let up = t.uploaded().unwrap();
        assert_eq!(up.desc.size, [8, 4, 1]);
        assert_eq!(up.uv_scale, [5.0 / 8.0, 3.0 / 4.0, 1.0]);
    }

    #[test]
    fn volumes_skip_silently_without_3d_support() {
        let src: TextureSource = Aarray::new(vec![0.0f32; 8], vec![2, 2, 2]).unwrap().into();
        let mut t = DataTexture::new(TextureDim::D3, src).unwrap();
        let caps = GpuCaps { textures_3d: false, ..caps() };
        let mut list = DrawList::new();
        assert_eq!(prepare(&mut t, &caps, &mut list).unwrap(), None);
        assert!(list.texture_ops().is_empty());
    }

    // ── clim ──────────────────────────────────────────────────────────────

    #[test]
    fn clim_transfer_maps_the_window() {
        let mut t = DataTexture::new(TextureDim::D2, image(2, 2)).unwrap();
        assert_eq!(t.clim_transfer(), (1.0, 0.0));
        t.set_clim(Range::new(1.0, 2.0)).unwrap();
        assert_eq!(t.state(), UploadState::NeedsUpload);
        let (scale, bias) = t.clim_transfer();
        // Data value 1.5 is stored as 0.5 and lands mid-window.
        assert!(((0.5 + bias) * scale - 0.5).abs() < 1e-6);
    }

    // ── host image ────────────────────────────────────────────────────────

    #[test]
    fn downsampling_a_constant_keeps_it() {
        let img = HostImage { values: vec![2.0; 5 * 4], shape: vec![5, 4], channels: 1 };
        let d = img.downsample();
        assert_eq!(d.shape, vec![3, 2]);
        assert!(d.values.iter().all(|v| (v - 2.0).abs() < 1e-6));
        let vol = HostImage { values: vec![1.0; 27], shape: vec![3, 3, 3], channels: 1 };
        assert!(vol.downsample().values.iter().all(|v| (v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn padding_keeps_values_in_place() {
        let img = HostImage { values: vec![1.0, 2.0, 3.0], shape: vec![1, 3], channels: 1 };
        let p = img.padded();
        assert_eq!(p.shape, vec![1, 4]);
        assert_eq!(p.values, vec![1.0, 2.0, 3.0, 0.0]);
    }
}
