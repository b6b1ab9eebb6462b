/// Cursor into a vertical list whose length changes under it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListCursor {
    index: usize,
}

impl ListCursor {
    pub fn index(self) -> usize {
        self.index
    }

    pub fn up(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    pub fn down(&mut self, len: usize) {
        if self.index + 1 < len {
            self.index += 1;
        }
    }

    /// Keeps the cursor on a valid row after the list shrinks.
    pub fn clamp(&mut self, len: usize) {
        self.index = self.index.min(len.saturating_sub(1));
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// First row to draw so the cursor stays inside a `height`-row window.
    pub fn scroll_offset(self, height: usize) -> usize {
        if height == 0 {
            return self.index;
        }
        (self.index + 1).saturating_sub(height)
    }
}
