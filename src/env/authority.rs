use std::collections::BTreeSet;

use crate::domain::AccountId;
use crate::traits::{Action, Authority};

/// Grants every privileged action to a fixed set of managers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyAuthority {
    managers: BTreeSet<AccountId>,
}

impl PolicyAuthority {
    /// Authority over the given managers.
    pub fn new(managers: impl IntoIterator<Item = AccountId>) -> Self {
        Self {
            managers: managers.into_iter().collect(),
        }
    }

    /// Adds a manager.
    pub fn grant(&mut self, account: AccountId) {
        self.managers.insert(account);
    }

    /// Removes a manager.
    pub fn revoke(&mut self, account: &AccountId) {
        self.managers.remove(account);
    }
}

impl Authority for PolicyAuthority {
    fn is_authorized(&self, caller: &AccountId, _action: Action) -> bool {
        self.managers.contains(caller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn managers_are_authorized() {
        let manager = AccountId::from_bytes([9; 32]);
        let mut authority = PolicyAuthority::new([manager]);
        assert!(authority.is_authorized(&manager, Action::CreatePool));
        assert!(!authority.is_authorized(&AccountId::from_bytes([1; 32]), Action::CreatePool));
        authority.revoke(&manager);
        assert!(!authority.is_authorized(&manager, Action::CreateRewardPool));
    }
}
