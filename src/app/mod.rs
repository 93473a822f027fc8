pub mod cancel;
pub mod context;
pub mod error;

pub use cancel::CancellationToken;
pub use context::AppContext;
pub use error::{ErrorKind, PodcastError, Result};
