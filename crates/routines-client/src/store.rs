//! In-memory routine list held by a view.
//!
//! Mirrors server mutations locally so the list does not need a refetch
//! after every create or delete.

use crate::types::Routine;

/// Ordered list of routines, newest first after local inserts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutineList {
    items: Vec<Routine>,
}

impl RoutineList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole list with a fresh fetch.
    pub fn replace(&mut self, routines: Vec<Routine>) {
        self.items = routines;
    }

    /// Insert a newly created routine at the front.
    pub fn prepend(&mut self, routine: Routine) {
        self.items.insert(0, routine);
    }

    /// Remove the routine with `id`, keeping the rest in order.
    pub fn remove(&mut self, id: i64) -> Option<Routine> {
        let index = self.items.iter().position(|r| r.id == id)?;
        Some(self.items.remove(index))
    }

    /// Swap in an updated routine, or prepend it if it is not listed yet.
    pub fn upsert(&mut self, routine: Routine) {
        match self.items.iter_mut().find(|r| r.id == routine.id) {
            Some(existing) => *existing = routine,
            None => self.prepend(routine),
        }
    }

    pub fn get(&self, id: i64) -> Option<&Routine> {
        self.items.iter().find(|r| r.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Routine> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[Routine] {
        &self.items
    }
}

impl From<Vec<Routine>> for RoutineList {
    fn from(items: Vec<Routine>) -> Self {
        Self { items }
    }
}

impl IntoIterator for RoutineList {
    type Item = Routine;
    type IntoIter = std::vec::IntoIter<Routine>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
