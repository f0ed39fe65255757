pub mod client;
pub mod error;
pub mod payload;

pub use client::VisionClient;
pub use error::VisionError;
pub use payload::{ImageFormat, ImagePayload};

use crate::config::Config;

/// Image description capability backed by a remote VLM endpoint.
///
/// This is the unit a host embeds: validate the inline image string,
/// then delegate interpretation to the configured model.
pub struct VisionService {
    client: VisionClient,
}

impl VisionService {
    pub fn new(config: &Config) -> Result<Self, VisionError> {
        Ok(Self {
            client: VisionClient::new(config.vision.clone())?,
        })
    }

    /// Describe an inline `data:image/...;base64,...` image.
    ///
    /// Validation failures surface before any network I/O.
    pub async fn describe_image(&self, image_data: &str) -> Result<String, VisionError> {
        let payload = ImagePayload::parse(image_data)?;
        self.client.describe(&payload).await
    }
}
