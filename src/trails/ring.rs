/// A fixed number of slots, addressed through a movable head cursor.
///
/// Logical index `i` lives in physical slot `(head + i) % len`. Rotating only
/// moves the cursor, so recycling the oldest entries to the end never moves or
/// reallocates anything.
#[derive(Debug, Clone)]
pub struct VertexRing<T> {
    slots: Vec<T>,
    head: usize,
}

impl<T: Copy> VertexRing<T> {
    pub fn new(slots: Vec<T>) -> Self {
        assert!(!slots.is_empty(), "A vertex ring needs at least one slot");
        VertexRing { slots, head: 0 }
    }

    pub fn filled(value: T, len: usize) -> Self {
        Self::new(vec![value; len])
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn physical(&self, i: usize) -> usize {
        assert!(i < self.slots.len(), "Index {} out of range", i);
        (self.head + i) % self.slots.len()
    }

    pub fn get(&self, i: usize) -> T {
        self.slots[self.physical(i)]
    }

    pub fn set(&mut self, i: usize, value: T) {
        let idx = self.physical(i);
        self.slots[idx] = value;
    }

    /// Moves the first `k` entries to the end, keeping their order.
    pub fn rotate(&mut self, k: usize) {
        self.head = (self.head + k) % self.slots.len();
    }

    /// Sets every slot from logical index `start` onwards.
    pub fn fill_from(&mut self, start: usize, value: T) {
        for i in start..self.len() {
            self.set(i, value);
        }
    }

    /// Replaces the contents in place. The length can't change.
    pub fn rebuild(&mut self, values: &[T]) {
        assert_eq!(
            values.len(),
            self.slots.len(),
            "A vertex ring can't be resized"
        );
        self.slots.copy_from_slice(values);
        self.head = 0;
    }

    /// Iterates in logical order, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_wraps_around() {
        let mut ring = VertexRing::new(vec![0, 1, 2, 3, 4]);
        ring.rotate(3);
        assert_eq!(ring.iter().collect::<Vec<_>>(), vec![3, 4, 0, 1, 2]);

        ring.set(4, 9);
        ring.rotate(4);
        assert_eq!(ring.iter().collect::<Vec<_>>(), vec![9, 3, 4, 0, 1]);
    }

    #[test]
    fn test_fill_and_rebuild() {
        let mut ring = VertexRing::filled(0, 4);
        ring.rotate(1);
        ring.fill_from(2, 7);
        assert_eq!(ring.iter().collect::<Vec<_>>(), vec![0, 0, 7, 7]);

        ring.rebuild(&[1, 2, 3, 4]);
        assert_eq!(ring.get(0), 1);
        assert_eq!(ring.len(), 4);
    }

    #[test]
    #[should_panic]
    fn test_rebuild_rejects_new_length() {
        let mut ring = VertexRing::filled(0, 4);
        ring.rebuild(&[1, 2, 3]);
    }
}
