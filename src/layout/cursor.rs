use crate::page::Page;
use crate::rect::Rect;
use crate::units::Pt;

/// The running write position used to lay out successive text blocks
/// without overlap. A cursor starts at the top-left corner of a page's
/// content box and only ever moves down: each composition stage draws at
/// the current position and advances, never revisiting earlier vertical
/// space. One cursor belongs to exactly one render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    pub x: Pt,
    pub y: Pt,
    bounds: Rect,
}

impl Cursor {
    /// A cursor positioned at the top-left corner of the page's content box
    pub fn at_top(page: &Page) -> Cursor {
        Cursor {
            x: page.content_box.x1,
            y: page.content_box.y2,
            bounds: page.content_box,
        }
    }

    /// Move the cursor down by `dy`. There is no overflow detection: content
    /// laid out past the bottom of the page simply runs off the canvas.
    pub fn advance(&mut self, dy: Pt) {
        self.y -= dy;
    }

    /// The left edge of the content box
    pub fn left(&self) -> Pt {
        self.bounds.x1
    }

    /// The right edge of the content box
    pub fn right(&self) -> Pt {
        self.bounds.x2
    }

    /// The bottom edge of the content box
    pub fn bottom(&self) -> Pt {
        self.bounds.y1
    }

    /// The width available between the margins
    pub fn width(&self) -> Pt {
        self.bounds.width()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Margins;
    use crate::pagesize;

    #[test]
    fn starts_at_the_top_left_of_the_content_box() {
        let page = Page::new(pagesize::A4, Some(Margins::symmetric(Pt(60.0), Pt(50.0))));
        let cursor = Cursor::at_top(&page);
        assert_eq!(cursor.x, Pt(50.0));
        assert_eq!(cursor.y, Pt(841.89 - 60.0));
        assert_eq!(cursor.left(), Pt(50.0));
        assert_eq!(cursor.right(), Pt(595.28 - 50.0));
    }

    #[test]
    fn advance_only_moves_down() {
        let page = Page::new(pagesize::A4, None);
        let mut cursor = Cursor::at_top(&page);
        let top = cursor.y;
        cursor.advance(Pt(15.0));
        cursor.advance(Pt(15.0));
        assert_eq!(cursor.y, top - Pt(30.0));
    }
}
