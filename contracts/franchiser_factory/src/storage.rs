use soroban_sdk::{contracttype, Address, BytesN, Env};

use crate::types::Franchiser;

pub(crate) const DAY_IN_LEDGERS: u32 = 17280;
pub(crate) const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
pub(crate) const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;
pub(crate) const RECORD_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub(crate) const RECORD_LIFETIME_THRESHOLD: u32 = RECORD_BUMP_AMOUNT - DAY_IN_LEDGERS;

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Token,
    Franchiser(BytesN<32>),
    Expiration(BytesN<32>),
}

pub fn extend_instance_ttl(e: &Env) {
    e.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn has_token(e: &Env) -> bool {
    e.storage().instance().has(&DataKey::Token)
}

pub fn put_token(e: &Env, token: &Address) {
    e.storage().instance().set(&DataKey::Token, token);
}

pub fn get_token(e: &Env) -> Option<Address> {
    e.storage().instance().get(&DataKey::Token)
}

pub fn get_franchiser(e: &Env, id: &BytesN<32>) -> Option<Franchiser> {
    let key = DataKey::Franchiser(id.clone());
    let rec: Option<Franchiser> = e.storage().persistent().get(&key);
    if rec.is_some() {
        e.storage()
            .persistent()
            .extend_ttl(&key, RECORD_LIFETIME_THRESHOLD, RECORD_BUMP_AMOUNT);
    }
    rec
}

pub fn put_franchiser(e: &Env, id: &BytesN<32>, rec: &Franchiser) {
    let key = DataKey::Franchiser(id.clone());
    e.storage().persistent().set(&key, rec);
    e.storage()
        .persistent()
        .extend_ttl(&key, RECORD_LIFETIME_THRESHOLD, RECORD_BUMP_AMOUNT);
}

pub fn get_expiration(e: &Env, id: &BytesN<32>) -> Option<u64> {
    let key = DataKey::Expiration(id.clone());
    let ts: Option<u64> = e.storage().persistent().get(&key);
    if ts.is_some() {
        e.storage()
            .persistent()
            .extend_ttl(&key, RECORD_LIFETIME_THRESHOLD, RECORD_BUMP_AMOUNT);
    }
    ts
}

pub fn put_expiration(e: &Env, id: &BytesN<32>, expiration: u64) {
    let key = DataKey::Expiration(id.clone());
    e.storage().persistent().set(&key, &expiration);
    e.storage()
        .persistent()
        .extend_ttl(&key, RECORD_LIFETIME_THRESHOLD, RECORD_BUMP_AMOUNT);
}

pub fn clear_expiration(e: &Env, id: &BytesN<32>) {
    e.storage().persistent().remove(&DataKey::Expiration(id.clone()));
}
