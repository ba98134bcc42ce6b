//! Fixed-capacity storage with reusable slots

use heapless::Vec;

pub(crate) struct Slab<T, const N: usize> {
    slots: Vec<Option<T>, N>,
}

impl<T, const N: usize> Slab<T, N> {
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Store `value` and return its slot index, `None` when full.
    pub fn insert(&mut self, value: T) -> Option<usize> {
        if let Some(index) = self.slots.iter().position(Option::is_none) {
            self.slots[index] = Some(value);
            return Some(index);
        }
        let index = self.slots.len();
        self.slots.push(Some(value)).ok()?;
        Some(index)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)?.as_ref()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)?.as_mut()
    }

    pub fn remove(&mut self, index: usize) -> Option<T> {
        self.slots.get_mut(index)?.take()
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}
