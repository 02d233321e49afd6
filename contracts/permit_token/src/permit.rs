use soroban_sdk::{xdr::ToXdr, Address, Bytes, BytesN, Env};

use crate::storage_types::{DataKey, BALANCE_BUMP_AMOUNT, BALANCE_LIFETIME_THRESHOLD};

pub fn read_nonce(e: &Env, owner: &Address) -> u64 {
    e.storage()
        .persistent()
        .get(&DataKey::Nonce(owner.clone()))
        .unwrap_or(0)
}

pub fn bump_nonce(e: &Env, owner: &Address) {
    let key = DataKey::Nonce(owner.clone());
    let nonce = read_nonce(e, owner);
    e.storage().persistent().set(&key, &(nonce + 1));
    e.storage()
        .persistent()
        .extend_ttl(&key, BALANCE_LIFETIME_THRESHOLD, BALANCE_BUMP_AMOUNT);
}

pub fn read_signing_key(e: &Env, owner: &Address) -> Option<BytesN<32>> {
    e.storage()
        .persistent()
        .get(&DataKey::SigningKey(owner.clone()))
}

pub fn write_signing_key(e: &Env, owner: &Address, key: &BytesN<32>) {
    let storage_key = DataKey::SigningKey(owner.clone());
    e.storage().persistent().set(&storage_key, key);
    e.storage()
        .persistent()
        .extend_ttl(&storage_key, BALANCE_LIFETIME_THRESHOLD, BALANCE_BUMP_AMOUNT);
}

/// Signing preimage of a permit: XDR of the token address, owner, spender,
/// amount, deadline and the owner's nonce, in that order. Folding the
/// nonce in makes every signature single-use; the token address scopes it
/// to this contract.
pub fn permit_message(
    e: &Env,
    owner: &Address,
    spender: &Address,
    amount: i128,
    deadline: u64,
    nonce: u64,
) -> Bytes {
    let mut msg = Bytes::new(e);
    msg.append(&e.current_contract_address().to_xdr(e));
    msg.append(&owner.clone().to_xdr(e));
    msg.append(&spender.clone().to_xdr(e));
    msg.append(&amount.to_xdr(e));
    msg.append(&deadline.to_xdr(e));
    msg.append(&nonce.to_xdr(e));
    msg
}
