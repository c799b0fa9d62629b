//! PartMix backend client
//!
//! Async REST client for the PartMix backend: songs, part uploads, mix
//! creation, mix packages and zipped downloads of background tasks.

pub mod backend;
pub mod error;
pub mod song;
pub mod zip;

pub use backend::Backend;
pub use error::ClientError;
pub use song::SongClient;
pub use zip::zip_song;

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
