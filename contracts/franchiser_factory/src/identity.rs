use soroban_sdk::{xdr::ToXdr, Address, Bytes, BytesN, Env};

/// Identity of the (owner, delegatee) franchiser under this factory.
/// Pure function of its inputs: the XDR framing keeps the preimage
/// unambiguous and the factory address scopes ids to one deployment, so
/// the id is stable and collision-free whether or not the instance has
/// been materialized yet.
pub fn franchiser_id(e: &Env, owner: &Address, delegatee: &Address) -> BytesN<32> {
    let mut preimage = Bytes::new(e);
    preimage.append(&e.current_contract_address().to_xdr(e));
    preimage.append(&owner.clone().to_xdr(e));
    preimage.append(&delegatee.clone().to_xdr(e));
    e.crypto().sha256(&preimage).into()
}

/// Identity of a nested franchiser, keyed by its parent instance rather
/// than an owner address.
pub fn sub_franchiser_id(e: &Env, parent: &BytesN<32>, sub_delegatee: &Address) -> BytesN<32> {
    let mut preimage = Bytes::new(e);
    preimage.append(&e.current_contract_address().to_xdr(e));
    preimage.append(&parent.clone().to_xdr(e));
    preimage.append(&sub_delegatee.clone().to_xdr(e));
    e.crypto().sha256(&preimage).into()
}
