/// Handle to a texture owned by the renderer's texture pool.
///
/// Ids are allocated by the caller (the scene graph) and stay valid until a
/// matching [`TextureOp::Destroy`] is recorded.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TextureId(pub u64);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextureDim {
    D1,
    D2,
    D3,
}

impl TextureDim {
    pub fn ndim(self) -> usize {
        match self {
            TextureDim::D1 => 1,
            TextureDim::D2 => 2,
            TextureDim::D3 => 3,
        }
    }
}

/// Texel layout of a data texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TexelFormat {
    /// One normalized byte per texel (luminance or alpha).
    R8,
    Rgba8,
    /// One float per texel, already mapped into `[0, 1]`.
    R32F,
    Rgba32F,
}

impl TexelFormat {
    pub fn channels(self) -> usize {
        match self {
            TexelFormat::R8 | TexelFormat::R32F => 1,
            TexelFormat::Rgba8 | TexelFormat::Rgba32F => 4,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, TexelFormat::R32F | TexelFormat::Rgba32F)
    }
}

/// Shape and sampling description of a texture.
///
/// `size` is `[width, height, depth]`; unused trailing extents are 1.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureDesc {
    pub dim: TextureDim,
    pub size: [u32; 3],
    pub format: TexelFormat,
    /// Linear filtering when true, nearest otherwise.
    pub linear: bool,
}

impl TextureDesc {
    pub fn texel_count(&self) -> usize {
        self.size.iter().map(|&s| s as usize).product()
    }

    pub fn value_count(&self) -> usize {
        self.texel_count() * self.format.channels()
    }
}

/// Texel payload, row-major with x fastest.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureData {
    U8(Vec<u8>),
    F32(Vec<f32>),
}

impl TextureData {
    pub fn len(&self) -> usize {
        match self {
            TextureData::U8(v) => v.len(),
            TextureData::F32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resource mutation recorded alongside draw commands.
///
/// Ops are applied in order before the frame's draws, so a command may
/// reference a texture created in the same frame.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureOp {
    Create { id: TextureId, desc: TextureDesc, data: TextureData },
    /// In-place update of an existing texture with identical shape.
    Update { id: TextureId, data: TextureData },
    SetFilter { id: TextureId, linear: bool },
    Destroy { id: TextureId },
}

impl TextureOp {
    pub fn id(&self) -> TextureId {
        match self {
            TextureOp::Create { id, .. }
            | TextureOp::Update { id, .. }
            | TextureOp::SetFilter { id, .. }
            | TextureOp::Destroy { id } => *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_count_includes_channels() {
        let d = TextureDesc { dim: TextureDim::D2, size: [4, 3, 1], format: TexelFormat::Rgba8, linear: false };
        assert_eq!(d.texel_count(), 12);
        assert_eq!(d.value_count(), 48);
    }

    #[test]
    fn op_id() {
        assert_eq!(TextureOp::Destroy { id: TextureId(7) }.id(), TextureId(7));
    }
}
