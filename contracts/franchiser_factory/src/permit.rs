use soroban_sdk::{contractclient, Address, BytesN, Env};

/// One-shot signature authorization exposed by the voting token. A valid
/// permit installs an allowance for `spender` over exactly `amount`; the
/// token consumes the signature so it cannot authorize a second transfer.
/// Signature validity and replay protection live behind this boundary.
#[contractclient(name = "PermitClient")]
pub trait Permit {
    fn permit(
        env: Env,
        owner: Address,
        spender: Address,
        amount: i128,
        deadline: u64,
        signature: BytesN<64>,
    );
}
