//! Adapters layer for the shift-swap subsystem.
//!
//! In-memory implementations of the outbound ports, used by the portal in
//! single-process deployments and by tests. A database-backed store is an
//! external collaborator wired in at deployment time.

pub mod cache;
pub mod memory;

pub use cache::NoopCacheInvalidator;
pub use memory::MemoryScheduleStore;
