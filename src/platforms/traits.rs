use async_trait::async_trait;
use relay_core::models::media::MediaDescriptor;
use relay_core::RelayError;

#[async_trait]
pub trait PlatformExtractor: Send + Sync {
    fn name(&self) -> &str;
    async fn extract(&self, url: &str) -> Result<MediaDescriptor, RelayError>;
}
