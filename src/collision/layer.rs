/// A set of collision layers a collider is willing to interact with.
///
/// There are 64 layers, numbered 0 to 63.
/// Each collider lives on exactly one layer and carries a mask of the layers it looks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
pub struct LayerMask(pub u64);

impl LayerMask {
    pub const ALL: LayerMask = LayerMask(u64::MAX);
    pub const NONE: LayerMask = LayerMask(0);

    /// Number of layers a mask can hold.
    pub const LAYER_COUNT: usize = 64;

    /// A mask containing only the given layer.
    ///
    /// # Panics
    /// Panics if the layer index is 64 or higher.
    #[inline]
    pub fn single(layer: usize) -> Self {
        assert!(layer < Self::LAYER_COUNT, "Collision layer out of range");
        LayerMask(1 << layer)
    }

    /// Check whether the given layer is in the mask.
    /// Layers outside the valid range are never in the mask.
    #[inline]
    pub fn get(&self, layer: usize) -> bool {
        layer < Self::LAYER_COUNT && self.0 & (1 << layer) != 0
    }

    #[inline]
    pub fn with(self, layer: usize) -> Self {
        LayerMask(self.0 | Self::single(layer).0)
    }

    #[inline]
    pub fn without(self, layer: usize) -> Self {
        LayerMask(self.0 & !Self::single(layer).0)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}
