/// Paint layer. Higher layers are painted over lower ones.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct ZIndex(pub i32);

/// Stable sort key for draw items: layer first, then insertion order.
///
/// Field order matters; the derived `Ord` compares `z` before `order`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SortKey {
    pub z: ZIndex,
    pub order: u32,
}

impl SortKey {
    #[inline]
    pub const fn new(z: ZIndex, order: u32) -> Self {
        Self { z, order }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_dominates_order() {
        assert!(SortKey::new(ZIndex(0), 9) < SortKey::new(ZIndex(1), 0));
        assert!(SortKey::new(ZIndex(0), 1) < SortKey::new(ZIndex(0), 2));
    }
}
