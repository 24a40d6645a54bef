//! Shuffled traversal order over queue positions.
//!
//! Shuffle never reorders the queue itself. Instead the engine walks a
//! permutation of queue indices; each full pass visits every track exactly
//! once. Removing or moving tracks remaps the permutation rather than
//! regenerating it, so a pass in progress keeps its remaining order.

use rand::Rng;
use rand::seq::SliceRandom;

use super::queue::moved_index;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShuffleOrder {
    order: Vec<usize>,
}

impl ShuffleOrder {
    /// A fresh permutation of `0..len`. When `anchor` is given it is placed
    /// first so the pass starts from the track already playing.
    pub fn new<R: Rng + ?Sized>(len: usize, anchor: Option<usize>, rng: &mut R) -> Self {
        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(rng);
        if let Some(a) = anchor {
            if let Some(pos) = order.iter().position(|&i| i == a) {
                order.swap(0, pos);
            }
        }
        Self { order }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }

    fn position_of(&self, index: usize) -> Option<usize> {
        self.order.iter().position(|&i| i == index)
    }

    /// Queue index visited after `index` in this pass.
    pub fn after(&self, index: usize) -> Option<usize> {
        let pos = self.position_of(index)?;
        self.order.get(pos + 1).copied()
    }

    /// Queue index visited before `index` in this pass.
    pub fn before(&self, index: usize) -> Option<usize> {
        let pos = self.position_of(index)?;
        pos.checked_sub(1).map(|p| self.order[p])
    }

    pub fn first(&self) -> Option<usize> {
        self.order.first().copied()
    }

    pub fn last(&self) -> Option<usize> {
        self.order.last().copied()
    }

    /// Drop queue index `removed` and shift the indices above it down.
    ///
    /// When the removal also moved the queue's current track, pass its new
    /// index as `new_current`: its entry takes the removed entry's slot, so
    /// everything that was still to come stays after it.
    pub fn remove(&mut self, removed: usize, new_current: Option<usize>) {
        let slot = self.position_of(removed);
        self.order.retain(|&i| i != removed);
        for i in &mut self.order {
            if *i > removed {
                *i -= 1;
            }
        }

        let (Some(slot), Some(current)) = (slot, new_current) else {
            return;
        };
        let Some(at) = self.position_of(current) else {
            return;
        };
        let entry = self.order.remove(at);
        let slot = if at < slot { slot - 1 } else { slot };
        self.order.insert(slot.min(self.order.len()), entry);
    }

    /// Follow a queue move from `from` to `to`.
    pub fn moved(&mut self, from: usize, to: usize) {
        for i in &mut self.order {
            *i = moved_index(*i, from, to);
        }
    }
}
