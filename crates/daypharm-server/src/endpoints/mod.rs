//! Route handlers, one module per dashboard area.

pub mod chat;
pub mod health;
pub mod patient;
pub mod pharmacist;
pub mod sessions;
