//! Error types for the Supabase client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupabaseError {
    /// Transport-level failure
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-success status; the body is passed through
    /// unmodified.
    #[error("Supabase API error: {status} - {message}")]
    Api { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, SupabaseError>;
