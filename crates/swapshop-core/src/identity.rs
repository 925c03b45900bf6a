// crates/swapshop-core/src/identity.rs
//
// Identity aliases. The identity provider authenticates users upstream;
// this subsystem trusts the id it is handed.

use uuid::Uuid;

/// Identity of a marketplace user. Unique and immutable.
pub type UserId = Uuid;

/// Reference to a lending/borrowing transaction owned by the transaction service.
pub type TransactionRef = Uuid;

/// Reference to an item request owned by the request service.
pub type RequestRef = Uuid;
