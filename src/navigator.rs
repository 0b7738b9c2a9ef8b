/// Remote-control directional input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Up,
    Right,
    Down,
}

/// Linear focus cursor over the currently visible focusable items.
///
/// Direction collapses to previous/next on one wraparound ring —
/// Left/Up step back, Right/Down step forward. There is no 2-D grid
/// awareness; that simplification is intentional and kept.
///
/// The ring only tracks which item is focused. Highlighting and
/// scrolling the focused item is the rendering layer's job.
#[derive(Debug, Clone, Default)]
pub struct FocusRing<T> {
    items: Vec<T>,
    index: usize,
}

impl<T> FocusRing<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            index: 0,
        }
    }

    /// Replace the focusable set after a structural change (screen
    /// switch, list re-render). The index is kept when still in range
    /// and reset to 0 otherwise.
    pub fn rebuild(&mut self, items: Vec<T>) {
        self.items = items;
        if self.index >= self.items.len() {
            self.index = 0;
        }
    }

    /// Step the cursor; no-op when the ring is empty
    pub fn step(&mut self, direction: Direction) {
        let n = self.items.len();
        if n == 0 {
            return;
        }
        self.index = match direction {
            Direction::Left | Direction::Up => (self.index + n - 1) % n,
            Direction::Right | Direction::Down => (self.index + 1) % n,
        };
    }

    pub fn focused(&self) -> Option<&T> {
        self.items.get(self.index)
    }

    /// Index of the focused item, for the renderer's highlight
    pub fn focused_index(&self) -> Option<usize> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.index)
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_loop_returns_to_start() {
        for n in 1..=5 {
            let mut ring = FocusRing::new();
            ring.rebuild((0..n).collect());
            ring.step(Direction::Right);
            ring.step(Direction::Right);
            let start = ring.focused_index().unwrap();
            for _ in 0..n {
                ring.step(Direction::Right);
            }
            assert_eq!(ring.focused_index(), Some(start));
        }
    }

    #[test]
    fn test_left_and_up_are_equivalent() {
        let mut a = FocusRing::new();
        let mut b = FocusRing::new();
        a.rebuild(vec![1, 2, 3]);
        b.rebuild(vec![1, 2, 3]);
        a.step(Direction::Left);
        b.step(Direction::Up);
        assert_eq!(a.focused_index(), b.focused_index());
        assert_eq!(a.focused_index(), Some(2));
    }

    #[test]
    fn test_empty_ring_is_inert() {
        let mut ring: FocusRing<u8> = FocusRing::new();
        ring.step(Direction::Right);
        ring.step(Direction::Left);
        assert_eq!(ring.focused(), None);
        assert_eq!(ring.focused_index(), None);
    }

    #[test]
    fn test_rebuild_shorter_resets_index() {
        let mut ring = FocusRing::new();
        ring.rebuild(vec![1, 2, 3, 4, 5]);
        for _ in 0..4 {
            ring.step(Direction::Down);
        }
        assert_eq!(ring.focused_index(), Some(4));
        ring.rebuild(vec![1, 2]);
        assert_eq!(ring.focused_index(), Some(0));
    }

    #[test]
    fn test_rebuild_keeps_index_in_range() {
        let mut ring = FocusRing::new();
        ring.rebuild(vec![1, 2, 3]);
        ring.step(Direction::Right);
        ring.rebuild(vec![4, 5, 6]);
        assert_eq!(ring.focused_index(), Some(1));
        assert_eq!(ring.focused(), Some(&5));
    }
}
