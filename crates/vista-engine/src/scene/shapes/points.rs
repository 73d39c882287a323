use crate::paint::Color;
use crate::scene::{DrawCmd, DrawList, DrawState, TextureId};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PointShape {
    Square,
    Circle,
}

/// Plain points: screen-aligned squares or discs of `size` logical pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct PointsCmd {
    pub positions: Vec<[f32; 3]>,
    pub color: Color,
    pub size: f32,
    pub shape: PointShape,
}

/// Point sprites: each position is drawn as a `size` pixel patch of the
/// `sprite` alpha texture tinted with `color`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpritesCmd {
    pub positions: Vec<[f32; 3]>,
    pub color: Color,
    pub size: f32,
    pub sprite: TextureId,
}

impl DrawList {
    pub fn push_points(
        &mut self,
        state: DrawState,
        positions: Vec<[f32; 3]>,
        color: Color,
        size: f32,
        shape: PointShape,
    ) {
        if positions.is_empty() || size <= 0.0 {
            return;
        }
        self.push(state, DrawCmd::Points(PointsCmd { positions, color, size, shape }));
    }

    pub fn push_sprites(
        &mut self,
        state: DrawState,
        positions: Vec<[f32; 3]>,
        color: Color,
        size: f32,
        sprite: TextureId,
    ) {
        if positions.is_empty() || size <= 0.0 {
            return;
        }
        self.push(state, DrawCmd::Sprites(SpritesCmd { positions, color, size, sprite }));
    }
}
