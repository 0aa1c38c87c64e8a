//! Generation service client.
//!
//! The public surface is [`ImageClient`]; submission, polling and error
//! normalization live in their own submodules and can be used directly by
//! callers that need finer control.

pub mod builder;
pub mod core;
pub mod endpoint;
pub mod error_normalizer;
pub mod poller;
pub mod submit;

pub use builder::ImageClientBuilder;
pub use self::core::ImageClient;
pub use error_normalizer::{normalize, ErrorPayload, NormalizedError};
pub use poller::{PollSettings, Poller};
pub use submit::JobSubmitter;
