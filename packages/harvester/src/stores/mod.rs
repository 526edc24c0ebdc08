//! Record store implementations.

pub mod memory;

#[cfg(feature = "supabase")]
pub mod supabase;

pub use memory::MemoryStore;

#[cfg(feature = "supabase")]
pub use supabase::SupabaseStore;
