//! Object picking.
//!
//! Every frame assigns draw ids to the live tree in pre-order with the root
//! at 0. The shape pass paints each hit-testable node's silhouette in its id
//! color over a black clear, so reading one pixel back identifies the
//! deepest node under the cursor and empty space resolves to the root.

use vista_engine::paint::Color;
use vista_engine::render::PickBuffer;

use crate::node::{NodeId, Scene};

/// Packs draw ids into colors for a target with the given channel depths.
///
/// The id is written in base `2^bits` per channel, red least significant.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct IdCodec {
    bits: [u8; 3],
}

impl IdCodec {
    pub fn new(bits: [u8; 3]) -> Self {
        Self { bits: bits.map(|b| b.min(8)) }
    }

    /// Number of distinct ids, the root's included.
    pub fn capacity(&self) -> u64 {
        1u64 << self.bits.iter().map(|&b| b as u32).sum::<u32>()
    }

    pub fn encode(&self, id: u32) -> Color {
        let mut rest = id;
        let mut ch = [0.0f32; 3];
        for (c, &b) in ch.iter_mut().zip(&self.bits) {
            let levels = (1u32 << b) - 1;
            if levels == 0 {
                continue;
            }
            *c = (rest & levels) as f32 / levels as f32;
            rest >>= b;
        }
        Color::rgb(ch[0], ch[1], ch[2])
    }

    /// Inverse of [`IdCodec::encode`] for an 8-bit readback.
    pub fn decode(&self, rgb: [u8; 3]) -> u32 {
        let mut id = 0u32;
        let mut shift = 0u32;
        for (&v, &b) in rgb.iter().zip(&self.bits) {
            let levels = (1u32 << b) - 1;
            let q = (v as f32 * levels as f32 / 255.0).round() as u32;
            id |= q.min(levels) << shift;
            shift += b as u32;
        }
        id
    }
}

/// Assigns draw ids in pre-order from the root. Nodes past the codec's
/// capacity get no id and cannot be picked; returns how many were left out.
pub fn assign_draw_ids(scene: &mut Scene, codec: &IdCodec) -> usize {
    let order = scene.preorder(scene.root());
    let cap = codec.capacity();
    let mut skipped = 0;
    for (i, id) in order.into_iter().enumerate() {
        let draw_id = ((i as u64) < cap).then_some(i as u32);
        if draw_id.is_none() {
            skipped += 1;
        }
        scene.set_draw_id(id, draw_id);
    }
    skipped
}

/// Path from the root to the node holding `target`.
///
/// Descends into the last child whose id does not exceed the target, which
/// relies on pre-order numbering keeping each subtree contiguous.
pub fn pick_chain(scene: &Scene, target: u32) -> Vec<NodeId> {
    let mut chain = Vec::new();
    let mut cur = scene.root();
    loop {
        let Some(node) = scene.get(cur) else { break };
        chain.push(cur);
        if node.draw_id == Some(target) {
            return chain;
        }
        let next = node
            .children
            .iter()
            .copied()
            .filter(|&c| scene.get(c).and_then(|n| n.draw_id).is_some_and(|d| d <= target))
            .last();
        match next {
            Some(c) => cur = c,
            None => break,
        }
    }
    // A stale id (tree changed since the frame) resolves to the root.
    chain.truncate(1);
    chain
}

/// Hit chain under a figure pixel of the last shape pass.
pub fn hit_chain(scene: &Scene, codec: &IdCodec, buffer: Option<&PickBuffer>, x: f32, y: f32) -> Vec<NodeId> {
    let target = buffer.and_then(|b| b.pixel(x.floor() as i32, y.floor() as i32)).map_or(0, |rgb| codec.decode(rgb));
    pick_chain(scene, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Behavior, Position};

    struct Plain;

    impl Behavior for Plain {
        fn type_name(&self) -> &'static str {
            "Plain"
        }
    }

    // ── codec ─────────────────────────────────────────────────────────────

    #[test]
    fn red_is_least_significant() {
        let c = IdCodec::new([8, 8, 8]);
        assert_eq!(c.encode(1).to_rgb8(), [1, 0, 0]);
        assert_eq!(c.encode(256).to_rgb8(), [0, 1, 0]);
        assert_eq!(c.decode([4, 2, 1]), 4 + 2 * 256 + 65536);
    }

    #[test]
    fn five_bit_channels_survive_readback() {
        let c = IdCodec::new([5, 6, 5]);
        assert_eq!(c.capacity(), 1 << 16);
        for id in [0u32, 1, 31, 32, 2047, 65535] {
            assert_eq!(c.decode(c.encode(id).to_rgb8()), id);
        }
    }

    // ── ids ───────────────────────────────────────────────────────────────

    fn tree() -> (Scene, [NodeId; 4]) {
        let mut s = Scene::new(None, (10.0, 10.0));
        let a = s.add_widget(s.root(), Position::fill(), Box::new(Plain)).unwrap();
        let a1 = s.add_world(a, Box::new(Plain)).unwrap();
        let a2 = s.add_world(a, Box::new(Plain)).unwrap();
        let b = s.add_widget(s.root(), Position::fill(), Box::new(Plain)).unwrap();
        (s, [a, a1, a2, b])
    }

    #[test]
    fn ids_follow_preorder() {
        let (mut s, [a, a1, a2, b]) = tree();
        assert_eq!(assign_draw_ids(&mut s, &IdCodec::new([8, 8, 8])), 0);
        let ids: Vec<_> = [s.root(), a, a1, a2, b].iter().map(|&n| s.node(n).unwrap().draw_id()).collect();
        assert_eq!(ids, vec![Some(0), Some(1), Some(2), Some(3), Some(4)]);
    }

    #[test]
    fn lookup_walk_builds_chain() {
        let (mut s, [a, _a1, a2, b]) = tree();
        assign_draw_ids(&mut s, &IdCodec::new([8, 8, 8]));
        assert_eq!(pick_chain(&s, 3), vec![s.root(), a, a2]);
        assert_eq!(pick_chain(&s, 4), vec![s.root(), b]);
        assert_eq!(pick_chain(&s, 0), vec![s.root()]);
        assert_eq!(pick_chain(&s, 99), vec![s.root()]);
    }

    #[test]
    fn overflow_leaves_nodes_without_id() {
        let (mut s, [_, _, a2, b]) = tree();
        assert_eq!(assign_draw_ids(&mut s, &IdCodec::new([1, 1, 0])), 1);
        assert_eq!(s.node(a2).unwrap().draw_id(), Some(3));
        assert_eq!(s.node(b).unwrap().draw_id(), None);
    }

    #[test]
    fn empty_pixel_hits_root() {
        let (mut s, _) = tree();
        let codec = IdCodec::new([8, 8, 8]);
        assign_draw_ids(&mut s, &codec);
        let buf = PickBuffer::new(4, 4, [0, 0, 0]);
        assert_eq!(hit_chain(&s, &codec, Some(&buf), 1.0, 1.0), vec![s.root()]);
        assert_eq!(hit_chain(&s, &codec, None, 1.0, 1.0), vec![s.root()]);
    }
}
