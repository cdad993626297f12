use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Arena slot with generation tracking to prevent stale handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Slot {
    index: u32,
    generation: u32,
}

impl Slot {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl Default for Slot {
    fn default() -> Self {
        Self::new(u32::MAX, 0)
    }
}

/// Handle to a body owned by a [`Space`](crate::space::Space).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord, Default,
)]
pub struct BodyId(pub(crate) Slot);

/// Handle to a joint owned by a [`Space`](crate::space::Space).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord, Default,
)]
pub struct JointId(pub(crate) Slot);

/// Generational arena. Slots stay stable across removals and a removed slot's
/// handle can never alias whatever reuses its index.
pub struct Arena<T> {
    items: Vec<Option<T>>,
    generations: Vec<u32>,
    free_list: VecDeque<usize>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            generations: Vec::new(),
            free_list: VecDeque::new(),
        }
    }

    pub fn insert(&mut self, item: T) -> Slot {
        if let Some(index) = self.free_list.pop_front() {
            let generation = self.generations[index];
            self.items[index] = Some(item);
            return Slot::new(index as u32, generation);
        }

        let index = self.items.len();
        self.items.push(Some(item));
        self.generations.push(0);
        Slot::new(index as u32, 0)
    }

    pub fn get(&self, slot: Slot) -> Option<&T> {
        if self.is_valid(slot) {
            self.items.get(slot.index()).and_then(|entry| entry.as_ref())
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, slot: Slot) -> Option<&mut T> {
        if self.is_valid(slot) {
            self.items
                .get_mut(slot.index())
                .and_then(|entry| entry.as_mut())
        } else {
            None
        }
    }

    /// Disjoint mutable access to two slots at once, as the solver needs for
    /// every body pair it touches. Returns `None` if the slots alias or either
    /// is stale.
    pub fn get2_mut(&mut self, a: Slot, b: Slot) -> Option<(&mut T, &mut T)> {
        if a.index() == b.index() {
            return None;
        }
        if !self.is_valid(a) || !self.is_valid(b) {
            return None;
        }

        let (first, second, flipped) = if a.index() < b.index() {
            (a, b, false)
        } else {
            (b, a, true)
        };

        let (left, right) = self.items.split_at_mut(second.index());
        let first_item = left[first.index()].as_mut()?;
        let second_item = right[0].as_mut()?;

        if flipped {
            Some((second_item, first_item))
        } else {
            Some((first_item, second_item))
        }
    }

    pub fn remove(&mut self, slot: Slot) -> Option<T> {
        if !self.is_valid(slot) {
            return None;
        }
        let entry = self.items.get_mut(slot.index())?;
        if entry.is_some() {
            self.generations[slot.index()] = self.generations[slot.index()].wrapping_add(1);
            self.free_list.push_back(slot.index());
        }
        entry.take()
    }

    pub fn contains(&self, slot: Slot) -> bool {
        self.is_valid(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter().filter_map(|entry| entry.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut().filter_map(|entry| entry.as_mut())
    }

    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        self.items.iter().enumerate().filter_map(|(index, entry)| {
            entry
                .as_ref()
                .map(|_| Slot::new(index as u32, self.generations[index]))
        })
    }

    pub fn len(&self) -> usize {
        self.items.len() - self.free_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        for (index, entry) in self.items.iter_mut().enumerate() {
            if entry.take().is_some() {
                self.generations[index] = self.generations[index].wrapping_add(1);
                self.free_list.push_back(index);
            }
        }
    }

    fn is_valid(&self, slot: Slot) -> bool {
        self.generations
            .get(slot.index())
            .map(|generation| *generation == slot.generation())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_slots_are_invalidated() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        let b = arena.insert(2);

        assert_eq!(arena.remove(a), Some(1));
        assert!(arena.get(a).is_none());
        assert_eq!(arena.get(b), Some(&2));

        // Reused index gets a fresh generation; the old handle stays dead.
        let c = arena.insert(3);
        assert_eq!(c.index(), a.index());
        assert_ne!(c.generation(), a.generation());
        assert!(arena.get(a).is_none());
        assert_eq!(arena.get(c), Some(&3));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn get2_mut_returns_disjoint_references() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        let b = arena.insert(2);

        let (x, y) = arena.get2_mut(b, a).unwrap();
        assert_eq!((*x, *y), (2, 1));

        assert!(arena.get2_mut(a, a).is_none());
    }
}
