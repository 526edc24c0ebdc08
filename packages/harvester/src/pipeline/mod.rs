//! The orchestration pipeline: batch processing, normalization,
//! persistence, URL derivation, and the workbench facade.

pub mod batch;
pub mod derive;
pub mod normalize;
pub mod persist;
pub mod workbench;

pub use batch::{run_batch, BatchReport, BatchRun};
pub use derive::{derive_site_url, resolve_seeds, DeriveReport};
pub use normalize::normalize;
pub use persist::save_checked;
pub use workbench::Workbench;
