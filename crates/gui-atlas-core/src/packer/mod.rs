use crate::model::Rect;

pub mod guillotine;

/// A rectangle placed by a packer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement<K> {
    pub key: K,
    /// Placed rectangle within the page.
    pub frame: Rect,
}

/// A packer places rectangles into a page.
///
/// Implementations must ensure no overlaps and keep every placement inside the page.
/// `pack` returns `None` if the rectangle cannot be placed on the current page.
pub trait Packer<K> {
    fn can_pack(&self, w: u32, h: u32) -> bool;
    fn pack(&mut self, key: K, w: u32, h: u32) -> Option<Placement<K>>;
}
