//! In-memory backend for the Rota entity store.
//!
//! Every entity kind lives in its own table behind its own lock, so writes to
//! one kind never wait on another. Nothing survives a restart.

mod store;
mod table;

pub use store::MemoryStore;

#[cfg(test)]
mod tests;
