use glam::Mat4;

use crate::coords::Rect;

/// Depth handling for a draw command.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum DepthMode {
    /// No depth test, no depth write.
    Off,
    /// Test against the depth buffer without writing.
    Test,
    /// Test and write.
    #[default]
    TestWrite,
}

impl DepthMode {
    #[inline]
    pub fn tests(self) -> bool {
        !matches!(self, DepthMode::Off)
    }

    #[inline]
    pub fn writes(self) -> bool {
        matches!(self, DepthMode::TestWrite)
    }
}

/// Color blending for a draw command.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub enum BlendMode {
    /// Source replaces destination.
    Opaque,
    /// Straight-alpha blending using the fragment alpha.
    #[default]
    Alpha,
    /// Blends against a constant alpha (for translucent strokes).
    ConstantAlpha(f32),
}

impl BlendMode {
    /// Hashable identity used for pipeline caching. The constant value itself
    /// is set per draw and does not select a pipeline.
    pub(crate) fn kind(self) -> u8 {
        match self {
            BlendMode::Opaque => 0,
            BlendMode::Alpha => 1,
            BlendMode::ConstantAlpha(_) => 2,
        }
    }
}

/// Face culling for a draw command.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum CullMode {
    #[default]
    None,
    /// Drop back faces (counter-clockwise is front).
    Back,
    /// Drop front faces; used when the model transform mirrors geometry.
    Front,
}

/// Fixed-function state captured with every draw command.
///
/// `transform` maps command positions to clip space (`projection * modelview`),
/// `viewport` is the target rectangle in logical pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawState {
    pub transform: Mat4,
    pub viewport: Rect,
    pub depth: DepthMode,
    pub blend: BlendMode,
    pub cull: CullMode,
}

impl DrawState {
    pub fn new(transform: Mat4, viewport: Rect) -> Self {
        Self {
            transform,
            viewport,
            depth: DepthMode::default(),
            blend: BlendMode::default(),
            cull: CullMode::default(),
        }
    }

    /// Pixel-space state: positions are logical pixels relative to the
    /// top-left of `viewport`, +Y down, z in `[-depth, depth]`.
    pub fn pixels(viewport: Rect, depth: f32) -> Self {
        let transform = Mat4::orthographic_rh_gl(0.0, viewport.w.max(1.0), viewport.h.max(1.0), 0.0, -depth, depth);
        Self { depth: DepthMode::Off, ..Self::new(transform, viewport) }
    }

    #[inline]
    pub fn with_depth(mut self, depth: DepthMode) -> Self {
        self.depth = depth;
        self
    }

    #[inline]
    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    #[inline]
    pub fn with_cull(mut self, cull: CullMode) -> Self {
        self.cull = cull;
        self
    }

    /// Projects a command-space position to window coordinates.
    ///
    /// Returns `(x, y, depth)` with `x, y` in logical pixels relative to the
    /// window's top-left and `depth` in `[0, 1]`, or `None` behind the eye.
    pub fn project(&self, p: [f32; 3]) -> Option<(f32, f32, f32)> {
        let clip = self.transform * glam::Vec4::new(p[0], p[1], p[2], 1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        let x = self.viewport.x + (ndc.x + 1.0) * 0.5 * self.viewport.w;
        let y = self.viewport.y + (1.0 - ndc.y) * 0.5 * self.viewport.h;
        let z = (ndc.z + 1.0) * 0.5;
        Some((x, y, z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool { (a - b).abs() < 1e-4 }

    // ── project ───────────────────────────────────────────────────────────

    #[test]
    fn pixel_state_is_identity_in_window_coords() {
        let s = DrawState::pixels(Rect::new(10.0, 20.0, 200.0, 100.0), 1000.0);
        let (x, y, z) = s.project([50.0, 25.0, 0.0]).unwrap();
        assert!(close(x, 60.0));
        assert!(close(y, 45.0));
        assert!(close(z, 0.5));
    }

    #[test]
    fn pixel_state_disables_depth() {
        let s = DrawState::pixels(Rect::new(0.0, 0.0, 10.0, 10.0), 1.0);
        assert_eq!(s.depth, DepthMode::Off);
        assert!(!s.depth.tests());
    }

    #[test]
    fn behind_eye_is_none() {
        let proj = Mat4::perspective_rh_gl(1.0, 1.0, 0.1, 100.0);
        let s = DrawState::new(proj, Rect::new(0.0, 0.0, 100.0, 100.0));
        assert!(s.project([0.0, 0.0, 5.0]).is_none());
        assert!(s.project([0.0, 0.0, -5.0]).is_some());
    }

    // ── modes ─────────────────────────────────────────────────────────────

    #[test]
    fn blend_kind_ignores_constant() {
        assert_eq!(BlendMode::ConstantAlpha(0.2).kind(), BlendMode::ConstantAlpha(0.7).kind());
        assert_ne!(BlendMode::Alpha.kind(), BlendMode::Opaque.kind());
    }
}
