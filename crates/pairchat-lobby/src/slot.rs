//! The single-capacity waiting slot.

use pairchat_common::ConnectionId;

/// Holds at most one connection awaiting a partner.
#[derive(Debug, Default)]
pub struct WaitingSlot {
    occupant: Option<ConnectionId>,
}

impl WaitingSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn occupant(&self) -> Option<&ConnectionId> {
        self.occupant.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }

    pub fn holds(&self, id: &ConnectionId) -> bool {
        self.occupant.as_ref() == Some(id)
    }

    /// Take the occupant and leave the slot empty in the same step.
    pub fn claim(&mut self) -> Option<ConnectionId> {
        self.occupant.take()
    }

    /// Install `id` only if nobody is waiting. Never evicts.
    pub fn install_if_empty(&mut self, id: &ConnectionId) -> bool {
        if self.occupant.is_some() {
            return false;
        }
        self.occupant = Some(id.clone());
        true
    }

    /// Clear the slot only if `id` is the occupant.
    pub fn clear_if(&mut self, id: &ConnectionId) -> bool {
        if self.holds(id) {
            self.occupant = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let slot = WaitingSlot::new();
        assert!(slot.is_empty());
        assert!(slot.occupant().is_none());
    }

    #[test]
    fn claim_takes_and_clears() {
        let mut slot = WaitingSlot::new();
        let a = ConnectionId::from("a");
        assert!(slot.install_if_empty(&a));

        assert_eq!(slot.claim(), Some(a));
        assert!(slot.is_empty());
        assert_eq!(slot.claim(), None);
    }

    #[test]
    fn install_never_evicts() {
        let mut slot = WaitingSlot::new();
        let a = ConnectionId::from("a");
        let b = ConnectionId::from("b");
        assert!(slot.install_if_empty(&a));
        assert!(!slot.install_if_empty(&b));
        assert!(slot.holds(&a));
    }

    #[test]
    fn clear_if_only_matches_occupant() {
        let mut slot = WaitingSlot::new();
        let a = ConnectionId::from("a");
        let b = ConnectionId::from("b");
        slot.install_if_empty(&a);

        assert!(!slot.clear_if(&b));
        assert!(slot.holds(&a));
        assert!(slot.clear_if(&a));
        assert!(slot.is_empty());
    }
}
