//! Simple stack-based layout system

use std::collections::HashMap;

/// A rectangular region (0-based)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    /// Whether a 1-based screen position falls inside this rect
    pub fn contains(&self, row: u16, col: u16) -> bool {
        let (row, col) = (row.saturating_sub(1), col.saturating_sub(1));
        row >= self.y && row < self.y + self.height && col >= self.x && col < self.x + self.width
    }
}

/// Size constraint along the stacking axis
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Size {
    /// Fixed size in characters
    Fixed(u16),
    /// Share of the remaining space, by weight
    Flex(u16),
}

#[derive(Clone, Debug)]
pub enum LayoutNode {
    VStack(Vec<LayoutItem>),
    HStack(Vec<LayoutItem>),
    Leaf(&'static str),
}

/// A layout item with its size along the parent's axis
#[derive(Clone, Debug)]
pub struct LayoutItem {
    pub node: LayoutNode,
    pub size: Size,
}

impl LayoutItem {
    pub fn vstack(children: Vec<LayoutItem>) -> Self {
        Self { node: LayoutNode::VStack(children), size: Size::Flex(1) }
    }

    pub fn hstack(children: Vec<LayoutItem>) -> Self {
        Self { node: LayoutNode::HStack(children), size: Size::Flex(1) }
    }

    pub fn leaf(id: &'static str) -> Self {
        Self { node: LayoutNode::Leaf(id), size: Size::Flex(1) }
    }

    pub fn fixed(mut self, n: u16) -> Self {
        self.size = Size::Fixed(n);
        self
    }

    pub fn flex(mut self, weight: u16) -> Self {
        self.size = Size::Flex(weight);
        self
    }
}

/// Computed layout results
#[derive(Clone, Debug, Default)]
pub struct ComputedLayout {
    rects: HashMap<&'static str, Rect>,
}

impl ComputedLayout {
    pub fn get(&self, id: &str) -> Rect {
        self.rects.get(id).copied().unwrap_or_default()
    }

    pub fn hit_test(&self, row: u16, col: u16) -> Option<&'static str> {
        self.rects
            .iter()
            .find(|(_, rect)| rect.contains(row, col))
            .map(|(id, _)| *id)
    }
}

pub fn compute_layout(item: &LayoutItem, bounds: Rect) -> ComputedLayout {
    let mut result = ComputedLayout::default();
    compute_node(item, bounds, &mut result);
    result
}

fn compute_node(item: &LayoutItem, bounds: Rect, result: &mut ComputedLayout) {
    match &item.node {
        LayoutNode::VStack(children) => {
            let heights = distribute(children, bounds.height);
            let mut y = bounds.y;
            for (child, height) in children.iter().zip(heights) {
                compute_node(child, Rect::new(bounds.x, y, bounds.width, height), result);
                y += height;
            }
        }
        LayoutNode::HStack(children) => {
            let widths = distribute(children, bounds.width);
            let mut x = bounds.x;
            for (child, width) in children.iter().zip(widths) {
                compute_node(child, Rect::new(x, bounds.y, width, bounds.height), result);
                x += width;
            }
        }
        LayoutNode::Leaf(id) => {
            result.rects.insert(*id, bounds);
        }
    }
}

/// Split `available` cells among children. Fixed children are served first;
/// flex children share the rest, the last one taking any rounding remainder.
fn distribute(children: &[LayoutItem], available: u16) -> Vec<u16> {
    let mut fixed_total = 0u16;
    let mut flex_total = 0u16;
    for child in children {
        match child.size {
            Size::Fixed(n) => fixed_total = fixed_total.saturating_add(n),
            Size::Flex(w) => flex_total += w,
        }
    }

    let mut remaining = available;
    let mut flex_space = available.saturating_sub(fixed_total);
    let mut flex_left = flex_total;
    let mut sizes = Vec::with_capacity(children.len());

    for child in children {
        let size = match child.size {
            Size::Fixed(n) => n.min(remaining),
            Size::Flex(w) if flex_left == w => flex_space.min(remaining),
            Size::Flex(w) => {
                let share = (flex_space as u32 * w as u32 / flex_left.max(1) as u32) as u16;
                flex_space -= share;
                flex_left -= w;
                share.min(remaining)
            }
        };
        remaining -= size;
        sizes.push(size);
    }
    sizes
}

/// Editor on top, console and its input line below, status bar last
pub fn main_screen_layout(console_height: u16) -> LayoutItem {
    LayoutItem::vstack(vec![
        LayoutItem::leaf("editor").flex(1),
        LayoutItem::leaf("console_title").fixed(1),
        LayoutItem::leaf("console").fixed(console_height),
        LayoutItem::leaf("console_input").fixed(1),
        LayoutItem::leaf("status_bar").fixed(1),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_layout_fills_screen() {
        let layout = compute_layout(&main_screen_layout(8), Rect::new(0, 0, 80, 25));
        assert_eq!(layout.get("editor"), Rect::new(0, 0, 80, 14));
        assert_eq!(layout.get("console_title"), Rect::new(0, 14, 80, 1));
        assert_eq!(layout.get("console"), Rect::new(0, 15, 80, 8));
        assert_eq!(layout.get("console_input"), Rect::new(0, 23, 80, 1));
        assert_eq!(layout.get("status_bar"), Rect::new(0, 24, 80, 1));
    }

    #[test]
    fn test_small_screen_starves_flex_first() {
        let layout = compute_layout(&main_screen_layout(8), Rect::new(0, 0, 40, 6));
        assert_eq!(layout.get("editor").height, 0);
        assert_eq!(layout.get("status_bar").height, 0);
        assert_eq!(layout.get("console").height, 5);
    }

    #[test]
    fn test_flex_weights_split_remainder() {
        let item = LayoutItem::hstack(vec![
            LayoutItem::leaf("a").flex(1),
            LayoutItem::leaf("b").fixed(2),
            LayoutItem::leaf("c").flex(2),
        ]);
        let layout = compute_layout(&item, Rect::new(0, 0, 11, 1));
        assert_eq!(layout.get("a").width, 3);
        assert_eq!(layout.get("b"), Rect::new(3, 0, 2, 1));
        assert_eq!(layout.get("c"), Rect::new(5, 0, 6, 1));
    }

    #[test]
    fn test_hit_test_uses_screen_coordinates() {
        let layout = compute_layout(&main_screen_layout(8), Rect::new(0, 0, 80, 25));
        assert_eq!(layout.hit_test(1, 1), Some("editor"));
        assert_eq!(layout.hit_test(24, 10), Some("console_input"));
        assert_eq!(layout.hit_test(30, 1), None);
    }
}
