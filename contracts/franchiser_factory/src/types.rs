use soroban_sdk::{contracttype, Address, BytesN, Vec};

/// Per-(owner, delegatee) delegation instance. Balances are held in the
/// factory's custody; each record only books its own share. Records are
/// never deleted: a drained franchiser stays dormant and re-fundable.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Franchiser {
    pub owner: Address,
    pub delegatee: Address,
    pub balance: i128,
    pub quota: u32,          // max concurrent sub-delegations from this node
    pub depth: u32,          // 0 for top-level instances
    pub parent: Option<BytesN<32>>,
    pub sub_delegatees: Vec<BytesN<32>>,
}
