//! Live set of player-controlled entities
//!
//! Order is spawn order, which keeps heading broadcast and bounds
//! computation deterministic.

use super::state::EntityId;

#[derive(Debug, Clone, Default)]
pub struct Roster {
    members: Vec<EntityId>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member. Returns false if it was already present.
    pub fn add(&mut self, id: EntityId) -> bool {
        if self.members.contains(&id) {
            return false;
        }
        self.members.push(id);
        true
    }

    /// Remove a member. Returns false if it was not present.
    pub fn remove(&mut self, id: EntityId) -> bool {
        let before = self.members.len();
        self.members.retain(|&m| m != id);
        self.members.len() != before
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.members.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.members.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_is_unique() {
        let mut roster = Roster::new();
        assert!(roster.add(EntityId(1)));
        assert!(!roster.add(EntityId(1)));
        assert!(roster.add(EntityId(2)));
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut roster = Roster::new();
        roster.add(EntityId(1));
        roster.add(EntityId(2));
        assert!(roster.remove(EntityId(1)));
        assert!(!roster.remove(EntityId(1)));
        assert_eq!(roster.iter().collect::<Vec<_>>(), vec![EntityId(2)]);
        roster.clear();
        assert!(roster.is_empty());
    }
}
