//! Gives text-only agents the ability to "see": validates an inline
//! base64 image string and delegates its interpretation to a remote
//! vision-language model endpoint.

pub mod config;
pub mod vision;

pub use config::{Config, LoggingConfig, VisionConfig};
pub use vision::{ImageFormat, ImagePayload, VisionClient, VisionError, VisionService};
