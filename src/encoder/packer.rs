//! Shelf packer for sprite-sheet regions.
//!
//! Regions are laid left to right on the current shelf; a region that does
//! not fit opens a new shelf below the tallest region of the previous one.

pub struct ShelfPacker {
    width: u32,
    cursor_x: u32,
    shelf_y: u32,
    shelf_h: u32,
}

impl ShelfPacker {
    pub fn new(width: u32) -> Self {
        Self { width, cursor_x: 0, shelf_y: 0, shelf_h: 0 }
    }

    /// Reserve a `w × h` slot and return its top-left corner.
    ///
    /// A region wider than the sheet gets a shelf of its own.
    pub fn place(&mut self, w: u32, h: u32) -> (u32, u32) {
        if self.cursor_x > 0 && self.cursor_x + w > self.width {
            self.shelf_y += self.shelf_h;
            self.cursor_x = 0;
            self.shelf_h = 0;
        }
        let pos = (self.cursor_x, self.shelf_y);
        self.cursor_x += w;
        self.shelf_h = self.shelf_h.max(h);
        pos
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Sheet height needed for everything placed so far.
    pub fn height(&self) -> u32 {
        self.shelf_y + self.shelf_h
    }
}
