/// Save/restore stack that can never become empty.
///
/// Entry 0 is the floor: the ambient default that every unbalanced `pop` falls
/// back to. `push` installs a new active value (replacing, not composing) and
/// `pop` restores whatever was active before it.
#[derive(Debug, Clone)]
pub struct FloorStack<T: Copy> {
    // invariant: never empty, items[0] is the floor
    items: Vec<T>,
}

impl<T: Copy> FloorStack<T> {
    pub fn new(floor: T) -> Self {
        Self { items: vec![floor] }
    }

    /// Makes `value` the active entry.
    #[inline]
    pub fn push(&mut self, value: T) {
        self.items.push(value);
    }

    /// Restores the previously active entry and returns it.
    ///
    /// At the floor this changes nothing and returns the floor.
    #[inline]
    pub fn pop(&mut self) -> T {
        if self.items.len() > 1 {
            self.items.pop();
        }
        self.peek()
    }

    /// The active entry.
    #[inline]
    pub fn peek(&self) -> T {
        // len >= 1 by invariant
        self.items[self.items.len() - 1]
    }

    #[inline]
    pub fn floor(&self) -> T {
        self.items[0]
    }

    /// Number of entries above the floor.
    #[inline]
    pub fn depth(&self) -> usize {
        self.items.len() - 1
    }

    /// Drops every pushed entry and replaces the floor.
    pub fn reset(&mut self, floor: T) {
        self.items.clear();
        self.items.push(floor);
    }
}
