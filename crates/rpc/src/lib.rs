//! GrantFlow RPC - wires the components together and exposes the
//! role-scoped command surface consumed by the CLI.

pub mod commands;
mod context;

pub use context::AppContext;
