use crate::{
    error::LedgerSourceError,
    model::{GroupId, GroupLedger},
};
use indexmap::IndexMap;
use splitease_domain::MemberId;

/// Read access to the persisted group ledgers.
pub trait GroupLedgerSource: Send + Sync {
    fn load_group(&self, group_id: &GroupId) -> Result<GroupLedger, LedgerSourceError>;

    /// Groups `member` belongs to, in a stable order.
    fn groups_of(&self, member: &MemberId) -> Result<Vec<GroupId>, LedgerSourceError>;
}

/// Ledger store held entirely in memory, in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryLedgerSource {
    groups: IndexMap<GroupId, GroupLedger>,
}

impl InMemoryLedgerSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ledger: GroupLedger) {
        self.groups.insert(ledger.id.clone(), ledger);
    }

    pub fn groups(&self) -> impl Iterator<Item = &GroupLedger> + '_ {
        self.groups.values()
    }
}

impl FromIterator<GroupLedger> for InMemoryLedgerSource {
    fn from_iter<T: IntoIterator<Item = GroupLedger>>(iter: T) -> Self {
        let mut source = Self::new();
        for ledger in iter {
            source.insert(ledger);
        }
        source
    }
}

impl GroupLedgerSource for InMemoryLedgerSource {
    fn load_group(&self, group_id: &GroupId) -> Result<GroupLedger, LedgerSourceError> {
        self.groups
            .get(group_id)
            .cloned()
            .ok_or_else(|| LedgerSourceError::NotFound(group_id.clone()))
    }

    fn groups_of(&self, member: &MemberId) -> Result<Vec<GroupId>, LedgerSourceError> {
        Ok(self
            .groups
            .values()
            .filter(|ledger| ledger.is_member(member))
            .map(|ledger| ledger.id.clone())
            .collect())
    }
}
