//! Protocol types and errors shared by the transaction-vault service and its clients.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
