// Survivor pool engine: pick records, derived facts, locking, validation.

pub mod engine;
pub mod facts;
pub mod lock;
pub mod pick;
