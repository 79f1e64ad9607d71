//! GrantFlow AML Flag Register
//!
//! Append-only log of compliance flags attached to spending requests. The
//! detection process that produces flags is an external service; this core
//! only records its deliveries and answers read queries. A flag is never
//! mutated or deleted once written, and a `high`-severity flag permanently
//! gates the request it refers to out of payment.

mod error;
mod flag;
mod register;

pub use error::FlagError;
pub use flag::{AmlFlag, Severity};
pub use register::FlagRegister;
