//! Persistence layer.
//!
//! Handlers never write SQL themselves; every read and write goes through
//! these modules so the cross-cutting invariants hold on every path:
//! plaintext passwords are hashed before any write, account deletion cascades
//! to the account's tasks and tokens in one transaction, and task access is
//! always scoped to the owning user.

pub mod tasks;
pub mod users;
