pub mod record;
pub mod transaction;

pub use record::{BankRecord, Flow};
pub use transaction::{TxKind, UserTransaction};
