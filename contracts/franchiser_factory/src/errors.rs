use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum FactoryError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    LengthMismatch = 3,
    InvalidAmount = 4,
    NotExpired = 5,
    ExpiredPermit = 6,
    UnknownFranchiser = 7,
    SubDelegationLimit = 8,
    InsufficientBalance = 9,
}
