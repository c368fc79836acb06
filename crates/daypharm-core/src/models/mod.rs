//! Domain models for the DayPharm system.

mod chat;
mod medication;
mod patient;
mod schedule;

pub use chat::*;
pub use medication::*;
pub use patient::*;
pub use schedule::*;
