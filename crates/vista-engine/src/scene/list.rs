use crate::paint::Color;

use super::{DrawCmd, DrawState, SortKey, TextureOp, ZIndex};

/// A single draw item: sort key + command + captured fixed-function state.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub key: SortKey,
    pub cmd: DrawCmd,
    pub state: DrawState,
}

/// Recorded draw stream for a frame.
///
/// Performance characteristics:
/// - `push()` is O(1)
/// - paint-order iteration reuses an internal index buffer; no per-frame allocation once warmed
///
/// Items are painted by layer, then in insertion order, so the scene graph's
/// traversal order is the paint order within a layer. Texture mutations are
/// recorded separately and applied before any item is drawn.
#[derive(Debug, Default)]
pub struct DrawList {
    items: Vec<DrawItem>,
    next_order: u32,
    layer: ZIndex,

    sorted_indices: Vec<usize>,
    sorted_dirty: bool,

    texture_ops: Vec<TextureOp>,
    clear_color: Option<Color>,
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears recorded items and pending texture ops. Keeps allocated capacity for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
        self.next_order = 0;
        self.layer = ZIndex::default();
        self.sorted_dirty = true;
        self.sorted_indices.clear();
        self.texture_ops.clear();
        self.clear_color = None;
    }

    /// Returns items in insertion order.
    #[inline]
    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sets the layer for subsequently pushed items.
    #[inline]
    pub fn set_layer(&mut self, z: ZIndex) {
        self.layer = z;
    }

    #[inline]
    pub fn layer(&self) -> ZIndex {
        self.layer
    }

    /// Pushes a draw command on the current layer.
    #[inline]
    pub fn push(&mut self, state: DrawState, cmd: DrawCmd) {
        let order = self.next_order;
        self.next_order = self.next_order.wrapping_add(1);

        self.items.push(DrawItem { key: SortKey::new(self.layer, order), cmd, state });
        self.sorted_dirty = true;
    }

    /// Records a texture mutation.
    #[inline]
    pub fn push_texture_op(&mut self, op: TextureOp) {
        self.texture_ops.push(op);
    }

    #[inline]
    pub fn texture_ops(&self) -> &[TextureOp] {
        &self.texture_ops
    }

    /// Removes and returns pending texture ops in recording order.
    pub fn take_texture_ops(&mut self) -> Vec<TextureOp> {
        std::mem::take(&mut self.texture_ops)
    }

    /// Color the frame is cleared to before the first item. `None` keeps
    /// the renderer's default (white).
    #[inline]
    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = Some(color);
    }

    #[inline]
    pub fn clear_color(&self) -> Option<Color> {
        self.clear_color
    }

    /// Returns indices into `items` in paint order (back-to-front).
    ///
    /// This buffer is owned by `DrawList` and reused across frames.
    pub fn indices_in_paint_order(&mut self) -> &[usize] {
        if self.sorted_dirty {
            self.rebuild_sorted_indices();
        }
        &self.sorted_indices
    }

    /// Iterates items in paint order without cloning draw commands.
    pub fn iter_in_paint_order(&mut self) -> impl Iterator<Item = &DrawItem> {
        if self.sorted_dirty {
            self.rebuild_sorted_indices();
        }

        self.sorted_indices.iter().map(|&i| &self.items[i])
    }

    fn rebuild_sorted_indices(&mut self) {
        self.sorted_indices.clear();
        self.sorted_indices.extend(0..self.items.len());

        // Stable ordering is ensured by SortKey including insertion order.
        self.sorted_indices
            .sort_by(|&a, &b| self.items[a].key.cmp(&self.items[b].key));

        self.sorted_dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::scene::shapes::PointShape;

    fn state() -> DrawState {
        DrawState::pixels(Rect::new(0.0, 0.0, 100.0, 100.0), 1.0)
    }

    fn push_point(list: &mut DrawList, x: f32) {
        list.push_points(state(), vec![[x, 0.0, 0.0]], Color::BLACK, 1.0, PointShape::Square);
    }

    fn xs(list: &mut DrawList) -> Vec<f32> {
        list.iter_in_paint_order()
            .map(|it| match &it.cmd {
                DrawCmd::Points(p) => p.positions[0][0],
                _ => f32::NAN,
            })
            .collect()
    }

    // ── ordering ──────────────────────────────────────────────────────────

    #[test]
    fn insertion_order_within_layer() {
        let mut l = DrawList::new();
        push_point(&mut l, 1.0);
        push_point(&mut l, 2.0);
        push_point(&mut l, 3.0);
        assert_eq!(xs(&mut l), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn higher_layer_paints_last() {
        let mut l = DrawList::new();
        l.set_layer(ZIndex(1));
        push_point(&mut l, 1.0);
        l.set_layer(ZIndex(0));
        push_point(&mut l, 2.0);
        assert_eq!(xs(&mut l), vec![2.0, 1.0]);
    }

    // ── push filters ──────────────────────────────────────────────────────

    #[test]
    fn degenerate_commands_are_dropped() {
        let mut l = DrawList::new();
        l.push_points(state(), vec![], Color::BLACK, 1.0, PointShape::Square);
        l.push_lines(state(), vec![[0.0; 3]], Color::BLACK, 1.0, None, crate::scene::LineTopology::Strip);
        assert!(l.is_empty());
    }

    // ── clear ─────────────────────────────────────────────────────────────

    #[test]
    fn clear_drops_items_and_ops() {
        let mut l = DrawList::new();
        push_point(&mut l, 1.0);
        l.push_texture_op(TextureOp::Destroy { id: crate::scene::TextureId(1) });
        l.set_clear_color(Color::WHITE);
        l.clear();
        assert!(l.is_empty());
        assert!(l.texture_ops().is_empty());
        assert_eq!(l.clear_color(), None);
    }
}
