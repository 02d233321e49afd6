#![cfg(test)]
extern crate std;

use ed25519_dalek::{Signer, SigningKey};
use soroban_sdk::testutils::{Address as _, Ledger};
use soroban_sdk::{Address, Bytes, BytesN, Env, IntoVal, String};

use crate::{PermitToken, PermitTokenClient};

fn create_token<'a>(e: &Env, admin: &Address) -> PermitTokenClient<'a> {
    let token = PermitTokenClient::new(e, &e.register_contract(None, PermitToken));
    token.initialize(admin, &7, &"Vote Token".into_val(e), &"VOTE".into_val(e));
    token
}

fn signer(seed: u8) -> SigningKey {
    SigningKey::from_bytes(&[seed; 32])
}

fn verifying_key(e: &Env, sk: &SigningKey) -> BytesN<32> {
    BytesN::from_array(e, &sk.verifying_key().to_bytes())
}

fn sign(e: &Env, sk: &SigningKey, msg: &Bytes) -> BytesN<64> {
    let mut buf = [0u8; 256];
    let len = msg.len() as usize;
    msg.copy_into_slice(&mut buf[..len]);
    BytesN::from_array(e, &sk.sign(&buf[..len]).to_bytes())
}

#[test]
fn test_initialize_and_metadata() {
    let e = Env::default();
    let admin = Address::generate(&e);
    let token = create_token(&e, &admin);

    assert_eq!(token.decimals(), 7);
    assert_eq!(token.name(), String::from_str(&e, "Vote Token"));
    assert_eq!(token.symbol(), String::from_str(&e, "VOTE"));
}

#[test]
#[should_panic(expected = "already-initialized")]
fn test_double_initialize_panics() {
    let e = Env::default();
    let admin = Address::generate(&e);
    let token = create_token(&e, &admin);

    token.initialize(&admin, &7, &"Vote Token".into_val(&e), &"VOTE".into_val(&e));
}

#[test]
fn test_mint_and_transfer() {
    let e = Env::default();
    e.mock_all_auths();
    let admin = Address::generate(&e);
    let user1 = Address::generate(&e);
    let user2 = Address::generate(&e);
    let token = create_token(&e, &admin);

    token.mint(&user1, &1000);
    assert_eq!(token.balance(&user1), 1000);

    token.transfer(&user1, &user2, &300);
    assert_eq!(token.balance(&user1), 700);
    assert_eq!(token.balance(&user2), 300);
}

#[test]
fn test_approve_and_transfer_from() {
    let e = Env::default();
    e.mock_all_auths();
    let admin = Address::generate(&e);
    let user1 = Address::generate(&e);
    let user2 = Address::generate(&e);
    let spender = Address::generate(&e);
    let token = create_token(&e, &admin);

    token.mint(&user1, &1000);
    token.approve(&user1, &spender, &500, &200);
    assert_eq!(token.allowance(&user1, &spender), 500);

    token.transfer_from(&spender, &user1, &user2, &400);
    assert_eq!(token.balance(&user1), 600);
    assert_eq!(token.balance(&user2), 400);
    assert_eq!(token.allowance(&user1, &spender), 100);
}

#[test]
fn test_burn() {
    let e = Env::default();
    e.mock_all_auths();
    let admin = Address::generate(&e);
    let user1 = Address::generate(&e);
    let token = create_token(&e, &admin);

    token.mint(&user1, &100);
    token.burn(&user1, &40);
    assert_eq!(token.balance(&user1), 60);
}

#[test]
fn test_permit_installs_allowance() {
    let e = Env::default();
    e.mock_all_auths();
    e.ledger().with_mut(|li| li.timestamp = 100);
    let admin = Address::generate(&e);
    let owner = Address::generate(&e);
    let recipient = Address::generate(&e);
    let spender = Address::generate(&e);
    let token = create_token(&e, &admin);
    let sk = signer(1);

    token.mint(&owner, &1000);
    token.set_signing_key(&owner, &verifying_key(&e, &sk));
    assert_eq!(token.nonce(&owner), 0);

    // deadline exactly now is still valid
    let msg = token.permit_message(&owner, &spender, &500, &100);
    token.permit(&owner, &spender, &500, &100, &sign(&e, &sk, &msg));

    assert_eq!(token.allowance(&owner, &spender), 500);
    assert_eq!(token.nonce(&owner), 1);

    token.transfer_from(&spender, &owner, &recipient, &500);
    assert_eq!(token.balance(&owner), 500);
    assert_eq!(token.balance(&recipient), 500);
}

#[test]
#[should_panic]
fn test_permit_replay_rejected() {
    let e = Env::default();
    e.mock_all_auths();
    e.ledger().with_mut(|li| li.timestamp = 100);
    let admin = Address::generate(&e);
    let owner = Address::generate(&e);
    let spender = Address::generate(&e);
    let token = create_token(&e, &admin);
    let sk = signer(1);

    token.mint(&owner, &1000);
    token.set_signing_key(&owner, &verifying_key(&e, &sk));

    let msg = token.permit_message(&owner, &spender, &500, &150);
    let sig = sign(&e, &sk, &msg);
    token.permit(&owner, &spender, &500, &150, &sig);

    // the nonce moved on, so the same signature no longer verifies
    token.permit(&owner, &spender, &500, &150, &sig);
}

#[test]
#[should_panic(expected = "permit-expired")]
fn test_permit_past_deadline_panics() {
    let e = Env::default();
    e.mock_all_auths();
    e.ledger().with_mut(|li| li.timestamp = 100);
    let admin = Address::generate(&e);
    let owner = Address::generate(&e);
    let spender = Address::generate(&e);
    let token = create_token(&e, &admin);
    let sk = signer(1);

    token.set_signing_key(&owner, &verifying_key(&e, &sk));
    let msg = token.permit_message(&owner, &spender, &500, &99);
    token.permit(&owner, &spender, &500, &99, &sign(&e, &sk, &msg));
}

#[test]
#[should_panic(expected = "no-signing-key")]
fn test_permit_without_signing_key_panics() {
    let e = Env::default();
    e.mock_all_auths();
    let admin = Address::generate(&e);
    let owner = Address::generate(&e);
    let spender = Address::generate(&e);
    let token = create_token(&e, &admin);
    let sk = signer(1);

    let msg = token.permit_message(&owner, &spender, &500, &100);
    token.permit(&owner, &spender, &500, &100, &sign(&e, &sk, &msg));
}

#[test]
#[should_panic]
fn test_permit_wrong_signer_rejected() {
    let e = Env::default();
    e.mock_all_auths();
    let admin = Address::generate(&e);
    let owner = Address::generate(&e);
    let spender = Address::generate(&e);
    let token = create_token(&e, &admin);

    token.set_signing_key(&owner, &verifying_key(&e, &signer(1)));
    let msg = token.permit_message(&owner, &spender, &500, &100);
    token.permit(&owner, &spender, &500, &100, &sign(&e, &signer(2), &msg));
}

#[test]
#[should_panic(expected = "insufficient-allowance")]
fn test_transfer_from_without_allowance_panics() {
    let e = Env::default();
    e.mock_all_auths();
    let admin = Address::generate(&e);
    let user1 = Address::generate(&e);
    let user2 = Address::generate(&e);
    let spender = Address::generate(&e);
    let token = create_token(&e, &admin);

    token.mint(&user1, &1000);
    token.transfer_from(&spender, &user1, &user2, &1);
}

#[test]
#[should_panic(expected = "insufficient-balance")]
fn test_transfer_more_than_balance_panics() {
    let e = Env::default();
    e.mock_all_auths();
    let admin = Address::generate(&e);
    let user1 = Address::generate(&e);
    let user2 = Address::generate(&e);
    let token = create_token(&e, &admin);

    token.mint(&user1, &10);
    token.transfer(&user1, &user2, &11);
}

#[test]
#[should_panic(expected = "negative-amount")]
fn test_negative_amount_panics() {
    let e = Env::default();
    e.mock_all_auths();
    let admin = Address::generate(&e);
    let user1 = Address::generate(&e);
    let user2 = Address::generate(&e);
    let token = create_token(&e, &admin);

    token.mint(&user1, &10);
    token.transfer(&user1, &user2, &-1);
}
