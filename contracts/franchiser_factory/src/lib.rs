#![no_std]

mod errors;
mod identity;
mod permit;
mod storage;
mod types;


use soroban_sdk::{contract, contractimpl, symbol_short, token, Address, BytesN, Env, Vec};

pub use crate::errors::FactoryError;
pub use crate::permit::{Permit, PermitClient};
pub use crate::types::Franchiser;

/// Sub-delegation capacity of a freshly created top-level franchiser.
/// Halves at each nesting level (8, 4, 2, 1, 0), so nested re-delegation
/// bottoms out at a bounded depth.
pub const INITIAL_MAXIMUM_SUB_DELEGATEES: u32 = 8;

#[contract]
pub struct FranchiserFactory;

#[contractimpl]
impl FranchiserFactory {
    /// One-time initializer binding the factory to its voting token.
    pub fn init(e: Env, token: Address) -> Result<(), FactoryError> {
        if storage::has_token(&e) {
            return Err(FactoryError::AlreadyInitialized);
        }
        storage::put_token(&e, &token);
        e.events().publish((symbol_short!("init"),), token);
        Ok(())
    }

    pub fn token(e: Env) -> Option<Address> {
        storage::get_token(&e)
    }

    pub fn initial_maximum_sub_delegatees() -> u32 {
        INITIAL_MAXIMUM_SUB_DELEGATEES
    }

    /// Identity of the (owner, delegatee) franchiser, whether or not it
    /// has been materialized yet.
    pub fn get_franchiser(e: Env, owner: Address, delegatee: Address) -> BytesN<32> {
        identity::franchiser_id(&e, &owner, &delegatee)
    }

    pub fn get_instance(e: Env, id: BytesN<32>) -> Option<Franchiser> {
        storage::get_franchiser(&e, &id)
    }

    /// Expiration registry, readable by anyone. Absence means the instance
    /// holds nothing waiting to be reclaimed.
    pub fn expiration_of(e: Env, id: BytesN<32>) -> Option<u64> {
        storage::get_expiration(&e, &id)
    }

    /// Pull `amount` from `owner`, credit the (owner, delegatee) franchiser
    /// (creating it on first use) and overwrite its expiration.
    pub fn fund(
        e: Env,
        owner: Address,
        delegatee: Address,
        amount: i128,
        expiration: u64,
    ) -> Result<BytesN<32>, FactoryError> {
        owner.require_auth();
        let token = storage::get_token(&e).ok_or(FactoryError::NotInitialized)?;
        storage::extend_instance_ttl(&e);
        Self::fund_one(&e, &token, &owner, &delegatee, amount, expiration)
    }

    /// Fund several delegatees in one call. All-or-nothing: any failing
    /// element aborts the whole batch.
    pub fn fund_many(
        e: Env,
        owner: Address,
        delegatees: Vec<Address>,
        amounts: Vec<i128>,
        expiration: u64,
    ) -> Result<Vec<BytesN<32>>, FactoryError> {
        owner.require_auth();
        if delegatees.len() != amounts.len() {
            return Err(FactoryError::LengthMismatch);
        }
        let token = storage::get_token(&e).ok_or(FactoryError::NotInitialized)?;
        storage::extend_instance_ttl(&e);
        let mut ids = Vec::new(&e);
        for (delegatee, amount) in delegatees.iter().zip(amounts.iter()) {
            ids.push_back(Self::fund_one(&e, &token, &owner, &delegatee, amount, expiration)?);
        }
        Ok(ids)
    }

    /// As `fund`, but authorized by a one-shot permit signature instead of
    /// a standing allowance.
    pub fn permit_and_fund(
        e: Env,
        owner: Address,
        delegatee: Address,
        amount: i128,
        expiration: u64,
        deadline: u64,
        signature: BytesN<64>,
    ) -> Result<BytesN<32>, FactoryError> {
        owner.require_auth();
        if e.ledger().timestamp() > deadline {
            return Err(FactoryError::ExpiredPermit);
        }
        let token = storage::get_token(&e).ok_or(FactoryError::NotInitialized)?;
        storage::extend_instance_ttl(&e);
        let me = e.current_contract_address();
        PermitClient::new(&e, &token).permit(&owner, &me, &amount, &deadline, &signature);
        Self::fund_one(&e, &token, &owner, &delegatee, amount, expiration)
    }

    /// Batch permit funding. The signature must cover the sum of `amounts`.
    pub fn permit_and_fund_many(
        e: Env,
        owner: Address,
        delegatees: Vec<Address>,
        amounts: Vec<i128>,
        expiration: u64,
        deadline: u64,
        signature: BytesN<64>,
    ) -> Result<Vec<BytesN<32>>, FactoryError> {
        owner.require_auth();
        if delegatees.len() != amounts.len() {
            return Err(FactoryError::LengthMismatch);
        }
        if e.ledger().timestamp() > deadline {
            return Err(FactoryError::ExpiredPermit);
        }
        let token = storage::get_token(&e).ok_or(FactoryError::NotInitialized)?;
        storage::extend_instance_ttl(&e);
        let mut total: i128 = 0;
        for amount in amounts.iter() {
            total += amount;
        }
        let me = e.current_contract_address();
        PermitClient::new(&e, &token).permit(&owner, &me, &total, &deadline, &signature);
        let mut ids = Vec::new(&e);
        for (delegatee, amount) in delegatees.iter().zip(amounts.iter()) {
            ids.push_back(Self::fund_one(&e, &token, &owner, &delegatee, amount, expiration)?);
        }
        Ok(ids)
    }

    /// Return the whole balance of the (owner, delegatee) franchiser,
    /// including everything nested under it, to `to`. No-op when the
    /// instance was never funded. The owner may recall at any time.
    pub fn recall(
        e: Env,
        owner: Address,
        delegatee: Address,
        to: Address,
    ) -> Result<(), FactoryError> {
        owner.require_auth();
        let token = storage::get_token(&e).ok_or(FactoryError::NotInitialized)?;
        storage::extend_instance_ttl(&e);
        Self::recall_one(&e, &token, &owner, &delegatee, &to);
        Ok(())
    }

    pub fn recall_many(
        e: Env,
        owner: Address,
        delegatees: Vec<Address>,
        tos: Vec<Address>,
    ) -> Result<(), FactoryError> {
        owner.require_auth();
        if delegatees.len() != tos.len() {
            return Err(FactoryError::LengthMismatch);
        }
        let token = storage::get_token(&e).ok_or(FactoryError::NotInitialized)?;
        storage::extend_instance_ttl(&e);
        for (delegatee, to) in delegatees.iter().zip(tos.iter()) {
            Self::recall_one(&e, &token, &owner, &delegatee, &to);
        }
        Ok(())
    }

    /// Reclaim an expired franchiser back to its owner. Callable by
    /// anyone: the recorded expiration, not the caller, is the authority.
    /// An absent expiration entry is not "already expired" and fails the
    /// same way a future one does.
    pub fn recall_expired(e: Env, owner: Address, delegatee: Address) -> Result<(), FactoryError> {
        let token = storage::get_token(&e).ok_or(FactoryError::NotInitialized)?;
        storage::extend_instance_ttl(&e);
        Self::recall_expired_one(&e, &token, &owner, &delegatee)
    }

    pub fn recall_many_expired(
        e: Env,
        owners: Vec<Address>,
        delegatees: Vec<Address>,
    ) -> Result<(), FactoryError> {
        if owners.len() != delegatees.len() {
            return Err(FactoryError::LengthMismatch);
        }
        let token = storage::get_token(&e).ok_or(FactoryError::NotInitialized)?;
        storage::extend_instance_ttl(&e);
        for (owner, delegatee) in owners.iter().zip(delegatees.iter()) {
            Self::recall_expired_one(&e, &token, &owner, &delegatee)?;
        }
        Ok(())
    }

    /// Move part of a franchiser's balance into a nested franchiser for
    /// `sub_delegatee`, creating it with half the parent's quota on first
    /// use. Authorized by the instance's delegatee.
    pub fn sub_delegate(
        e: Env,
        owner: Address,
        delegatee: Address,
        sub_delegatee: Address,
        amount: i128,
    ) -> Result<BytesN<32>, FactoryError> {
        delegatee.require_auth();
        storage::extend_instance_ttl(&e);
        let parent_id = identity::franchiser_id(&e, &owner, &delegatee);
        Self::sub_delegate_one(&e, &parent_id, &sub_delegatee, amount)
    }

    pub fn sub_delegate_many(
        e: Env,
        owner: Address,
        delegatee: Address,
        sub_delegatees: Vec<Address>,
        amounts: Vec<i128>,
    ) -> Result<Vec<BytesN<32>>, FactoryError> {
        delegatee.require_auth();
        if sub_delegatees.len() != amounts.len() {
            return Err(FactoryError::LengthMismatch);
        }
        storage::extend_instance_ttl(&e);
        let parent_id = identity::franchiser_id(&e, &owner, &delegatee);
        let mut ids = Vec::new(&e);
        for (sub_delegatee, amount) in sub_delegatees.iter().zip(amounts.iter()) {
            ids.push_back(Self::sub_delegate_one(&e, &parent_id, &sub_delegatee, amount)?);
        }
        Ok(ids)
    }

    /// As `sub_delegate`, addressed by instance id so nested franchisers
    /// can re-delegate their own share. Authorized by the instance's
    /// delegatee; quota halving applies at every level.
    pub fn sub_delegate_from(
        e: Env,
        parent_id: BytesN<32>,
        sub_delegatee: Address,
        amount: i128,
    ) -> Result<BytesN<32>, FactoryError> {
        let parent =
            storage::get_franchiser(&e, &parent_id).ok_or(FactoryError::UnknownFranchiser)?;
        parent.delegatee.require_auth();
        storage::extend_instance_ttl(&e);
        Self::sub_delegate_one(&e, &parent_id, &sub_delegatee, amount)
    }

    /// As `un_sub_delegate`, addressed by instance id.
    pub fn un_sub_delegate_from(
        e: Env,
        parent_id: BytesN<32>,
        sub_delegatee: Address,
    ) -> Result<(), FactoryError> {
        let parent =
            storage::get_franchiser(&e, &parent_id).ok_or(FactoryError::UnknownFranchiser)?;
        parent.delegatee.require_auth();
        storage::extend_instance_ttl(&e);
        Self::un_sub_delegate_one(&e, &parent_id, &sub_delegatee)
    }

    /// Pull a nested franchiser's balance (and everything under it) back
    /// into the parent and detach it, freeing a quota slot. No-op when the
    /// child was never attached.
    pub fn un_sub_delegate(
        e: Env,
        owner: Address,
        delegatee: Address,
        sub_delegatee: Address,
    ) -> Result<(), FactoryError> {
        delegatee.require_auth();
        storage::extend_instance_ttl(&e);
        let parent_id = identity::franchiser_id(&e, &owner, &delegatee);
        Self::un_sub_delegate_one(&e, &parent_id, &sub_delegatee)
    }

    pub fn un_sub_delegate_many(
        e: Env,
        owner: Address,
        delegatee: Address,
        sub_delegatees: Vec<Address>,
    ) -> Result<(), FactoryError> {
        delegatee.require_auth();
        storage::extend_instance_ttl(&e);
        let parent_id = identity::franchiser_id(&e, &owner, &delegatee);
        for sub_delegatee in sub_delegatees.iter() {
            Self::un_sub_delegate_one(&e, &parent_id, &sub_delegatee)?;
        }
        Ok(())
    }

    // One fund element. Tokens are pulled before any record is written;
    // the host reverts everything on a failed pull.
    fn fund_one(
        e: &Env,
        token: &Address,
        owner: &Address,
        delegatee: &Address,
        amount: i128,
        expiration: u64,
    ) -> Result<BytesN<32>, FactoryError> {
        if amount <= 0 {
            return Err(FactoryError::InvalidAmount);
        }
        let id = identity::franchiser_id(e, owner, delegatee);
        let mut rec = match storage::get_franchiser(e, &id) {
            Some(rec) => rec,
            None => Franchiser {
                owner: owner.clone(),
                delegatee: delegatee.clone(),
                balance: 0,
                quota: INITIAL_MAXIMUM_SUB_DELEGATEES,
                depth: 0,
                parent: None,
                sub_delegatees: Vec::new(e),
            },
        };
        let me = e.current_contract_address();
        token::Client::new(e, token).transfer_from(&me, owner, &me, &amount);
        rec.balance += amount;
        storage::put_franchiser(e, &id, &rec);
        storage::put_expiration(e, &id, expiration);
        e.events().publish(
            (symbol_short!("fund"), id.clone()),
            (owner.clone(), delegatee.clone(), amount, expiration),
        );
        Ok(id)
    }

    // One recall element. Records are zeroed and the expiration entry
    // cleared before tokens leave custody.
    fn recall_one(e: &Env, token: &Address, owner: &Address, delegatee: &Address, to: &Address) {
        let id = identity::franchiser_id(e, owner, delegatee);
        if storage::get_franchiser(e, &id).is_none() {
            // never funded
            return;
        }
        let total = Self::drain_subtree(e, &id);
        storage::clear_expiration(e, &id);
        if total > 0 {
            token::Client::new(e, token).transfer(&e.current_contract_address(), to, &total);
        }
        e.events().publish(
            (symbol_short!("recall"), id),
            (owner.clone(), to.clone(), total),
        );
    }

    fn recall_expired_one(
        e: &Env,
        token: &Address,
        owner: &Address,
        delegatee: &Address,
    ) -> Result<(), FactoryError> {
        let id = identity::franchiser_id(e, owner, delegatee);
        let expiration = storage::get_expiration(e, &id).ok_or(FactoryError::NotExpired)?;
        if e.ledger().timestamp() < expiration {
            return Err(FactoryError::NotExpired);
        }
        let total = Self::drain_subtree(e, &id);
        storage::clear_expiration(e, &id);
        if total > 0 {
            token::Client::new(e, token).transfer(&e.current_contract_address(), owner, &total);
        }
        e.events().publish(
            (symbol_short!("expired"), id),
            (owner.clone(), delegatee.clone(), total),
        );
        Ok(())
    }

    fn sub_delegate_one(
        e: &Env,
        parent_id: &BytesN<32>,
        sub_delegatee: &Address,
        amount: i128,
    ) -> Result<BytesN<32>, FactoryError> {
        let mut parent =
            storage::get_franchiser(e, parent_id).ok_or(FactoryError::UnknownFranchiser)?;
        if amount <= 0 {
            return Err(FactoryError::InvalidAmount);
        }
        if amount > parent.balance {
            return Err(FactoryError::InsufficientBalance);
        }
        let child_id = identity::sub_franchiser_id(e, parent_id, sub_delegatee);
        let mut child = match storage::get_franchiser(e, &child_id) {
            Some(child) => child,
            None => Franchiser {
                owner: parent.owner.clone(),
                delegatee: sub_delegatee.clone(),
                balance: 0,
                quota: parent.quota / 2,
                depth: parent.depth + 1,
                parent: Some(parent_id.clone()),
                sub_delegatees: Vec::new(e),
            },
        };
        if parent.sub_delegatees.first_index_of(&child_id).is_none() {
            if parent.sub_delegatees.len() >= parent.quota {
                return Err(FactoryError::SubDelegationLimit);
            }
            parent.sub_delegatees.push_back(child_id.clone());
        }
        parent.balance -= amount;
        child.balance += amount;
        storage::put_franchiser(e, parent_id, &parent);
        storage::put_franchiser(e, &child_id, &child);
        e.events().publish(
            (symbol_short!("sub_del"), parent_id.clone()),
            (sub_delegatee.clone(), child_id.clone(), amount),
        );
        Ok(child_id)
    }

    fn un_sub_delegate_one(
        e: &Env,
        parent_id: &BytesN<32>,
        sub_delegatee: &Address,
    ) -> Result<(), FactoryError> {
        let mut parent =
            storage::get_franchiser(e, parent_id).ok_or(FactoryError::UnknownFranchiser)?;
        let child_id = identity::sub_franchiser_id(e, parent_id, sub_delegatee);
        let index = match parent.sub_delegatees.first_index_of(&child_id) {
            Some(index) => index,
            None => return Ok(()), // never attached
        };
        let total = Self::drain_subtree(e, &child_id);
        let _ = parent.sub_delegatees.remove(index);
        parent.balance += total;
        storage::put_franchiser(e, parent_id, &parent);
        e.events().publish(
            (symbol_short!("unsub_del"), parent_id.clone()),
            (child_id, total),
        );
        Ok(())
    }

    // Zero every balance in the subtree rooted at `root` and return the
    // sum. Iterative walk over the child arena; records keep their quota,
    // depth and links and stay re-fundable.
    fn drain_subtree(e: &Env, root: &BytesN<32>) -> i128 {
        let mut total: i128 = 0;
        let mut stack: Vec<BytesN<32>> = Vec::new(e);
        stack.push_back(root.clone());
        while let Some(id) = stack.pop_back() {
            if let Some(mut rec) = storage::get_franchiser(e, &id) {
                total += rec.balance;
                rec.balance = 0;
                for child in rec.sub_delegatees.iter() {
                    stack.push_back(child);
                }
                storage::put_franchiser(e, &id, &rec);
            }
        }
        total
    }
}
