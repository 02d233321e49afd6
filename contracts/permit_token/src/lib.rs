#![no_std]

mod admin;
mod allowance;
mod balance;
mod metadata;
mod permit;
mod storage_types;

#[cfg(test)]
mod test;

use soroban_sdk::token::{self, Interface as _};
use soroban_sdk::{contract, contractimpl, Address, Bytes, BytesN, Env, String};
use soroban_token_sdk::metadata::TokenMetadata;
use soroban_token_sdk::TokenUtils;

use crate::admin::{has_administrator, read_administrator, write_administrator};
use crate::allowance::{read_allowance, spend_allowance, write_allowance};
use crate::balance::{read_balance, receive_balance, spend_balance};
use crate::metadata::{read_decimal, read_name, read_symbol, write_metadata};
use crate::storage_types::{DAY_IN_LEDGERS, INSTANCE_BUMP_AMOUNT, INSTANCE_LIFETIME_THRESHOLD};

fn check_nonnegative_amount(amount: i128) {
    if amount < 0 {
        panic!("negative-amount");
    }
}

fn extend_instance_ttl(e: &Env) {
    e.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

#[contract]
pub struct PermitToken;

#[contractimpl]
impl PermitToken {
    pub fn initialize(e: Env, admin: Address, decimal: u32, name: String, symbol: String) {
        if has_administrator(&e) {
            panic!("already-initialized");
        }
        write_administrator(&e, &admin);
        if decimal > u8::MAX.into() {
            panic!("decimal-overflow");
        }
        write_metadata(
            &e,
            TokenMetadata {
                decimal,
                name,
                symbol,
            },
        );
    }

    pub fn mint(e: Env, to: Address, amount: i128) {
        check_nonnegative_amount(amount);
        let admin = read_administrator(&e);
        admin.require_auth();
        extend_instance_ttl(&e);
        receive_balance(&e, to.clone(), amount);
        TokenUtils::new(&e).events().mint(admin, to, amount);
    }

    /// Register the ed25519 key allowed to sign permits for `owner`.
    pub fn set_signing_key(e: Env, owner: Address, key: BytesN<32>) {
        owner.require_auth();
        extend_instance_ttl(&e);
        permit::write_signing_key(&e, &owner, &key);
    }

    pub fn signing_key(e: Env, owner: Address) -> Option<BytesN<32>> {
        permit::read_signing_key(&e, &owner)
    }

    pub fn nonce(e: Env, owner: Address) -> u64 {
        permit::read_nonce(&e, &owner)
    }

    /// Exact bytes a wallet signs to permit `spender` to move `amount`
    /// until `deadline`, under the owner's current nonce.
    pub fn permit_message(
        e: Env,
        owner: Address,
        spender: Address,
        amount: i128,
        deadline: u64,
    ) -> Bytes {
        let nonce = permit::read_nonce(&e, &owner);
        permit::permit_message(&e, &owner, &spender, amount, deadline, nonce)
    }

    /// Consume a permit signature and install the allowance it authorizes.
    /// The nonce bump makes replaying a consumed signature fail
    /// verification.
    pub fn permit(
        e: Env,
        owner: Address,
        spender: Address,
        amount: i128,
        deadline: u64,
        signature: BytesN<64>,
    ) {
        check_nonnegative_amount(amount);
        if e.ledger().timestamp() > deadline {
            panic!("permit-expired");
        }
        extend_instance_ttl(&e);
        let key = permit::read_signing_key(&e, &owner).expect("no-signing-key");
        let nonce = permit::read_nonce(&e, &owner);
        let msg = permit::permit_message(&e, &owner, &spender, amount, deadline, nonce);
        e.crypto().ed25519_verify(&key, &msg, &signature);
        permit::bump_nonce(&e, &owner);
        let expiration_ledger = e.ledger().sequence() + DAY_IN_LEDGERS;
        write_allowance(&e, owner.clone(), spender.clone(), amount, expiration_ledger);
        TokenUtils::new(&e)
            .events()
            .approve(owner, spender, amount, expiration_ledger);
    }
}

#[contractimpl]
impl token::Interface for PermitToken {
    fn allowance(e: Env, from: Address, spender: Address) -> i128 {
        extend_instance_ttl(&e);
        read_allowance(&e, from, spender).amount
    }

    fn approve(e: Env, from: Address, spender: Address, amount: i128, expiration_ledger: u32) {
        from.require_auth();
        check_nonnegative_amount(amount);
        extend_instance_ttl(&e);
        write_allowance(&e, from.clone(), spender.clone(), amount, expiration_ledger);
        TokenUtils::new(&e)
            .events()
            .approve(from, spender, amount, expiration_ledger);
    }

    fn balance(e: Env, id: Address) -> i128 {
        extend_instance_ttl(&e);
        read_balance(&e, id)
    }

    fn transfer(e: Env, from: Address, to: Address, amount: i128) {
        from.require_auth();
        check_nonnegative_amount(amount);
        extend_instance_ttl(&e);
        spend_balance(&e, from.clone(), amount);
        receive_balance(&e, to.clone(), amount);
        TokenUtils::new(&e).events().transfer(from, to, amount);
    }

    fn transfer_from(e: Env, spender: Address, from: Address, to: Address, amount: i128) {
        spender.require_auth();
        check_nonnegative_amount(amount);
        extend_instance_ttl(&e);
        spend_allowance(&e, from.clone(), spender, amount);
        spend_balance(&e, from.clone(), amount);
        receive_balance(&e, to.clone(), amount);
        TokenUtils::new(&e).events().transfer(from, to, amount);
    }

    fn burn(e: Env, from: Address, amount: i128) {
        from.require_auth();
        check_nonnegative_amount(amount);
        extend_instance_ttl(&e);
        spend_balance(&e, from.clone(), amount);
        TokenUtils::new(&e).events().burn(from, amount);
    }

    fn burn_from(e: Env, spender: Address, from: Address, amount: i128) {
        spender.require_auth();
        check_nonnegative_amount(amount);
        extend_instance_ttl(&e);
        spend_allowance(&e, from.clone(), spender, amount);
        spend_balance(&e, from.clone(), amount);
        TokenUtils::new(&e).events().burn(from, amount);
    }

    fn decimals(e: Env) -> u32 {
        read_decimal(&e)
    }

    fn name(e: Env) -> String {
        read_name(&e)
    }

    fn symbol(e: Env) -> String {
        read_symbol(&e)
    }
}
