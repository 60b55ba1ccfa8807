/// Asset upload operation

use bytes::Bytes;

use crate::auth::session::RequestContext;
use crate::error::{ServiceError, ServiceResult};
use crate::upload::{check_size, AssetUploader};

/// Uploads an image for the actor and returns its public URL
///
/// Empty and oversized bodies are `BAD_USER_INPUT`; anything the asset store
/// does wrong is `UPLOAD_FAILED`.
pub async fn upload_asset(
    uploader: &dyn AssetUploader,
    ctx: &RequestContext,
    content: Bytes,
    content_type: &str,
    max_bytes: usize,
) -> ServiceResult<String> {
    let actor = ctx.actor()?;
    check_size(&content, max_bytes).map_err(|e| ServiceError::BadUserInput(e.to_string()))?;

    let size = content.len();
    let url = uploader.upload(content, content_type).await?;

    tracing::info!(user_id = %actor.id, size, "Asset uploaded");
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserProfile;
    use crate::upload::{DisabledUploader, UploadError};
    use async_trait::async_trait;
    use uuid::Uuid;

    struct FixedUploader;

    #[async_trait]
    impl AssetUploader for FixedUploader {
        async fn upload(&self, _content: Bytes, _content_type: &str) -> Result<String, UploadError> {
            Ok("https://assets.example.com/a.png".to_string())
        }
    }

    fn signed_in() -> RequestContext {
        RequestContext::new(
            Some(UserProfile {
                id: Uuid::new_v4(),
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            }),
            "test",
        )
    }

    #[tokio::test]
    async fn test_upload_returns_url() {
        let url = upload_asset(&FixedUploader, &signed_in(), Bytes::from_static(b"png"), "image/png", 10)
            .await
            .unwrap();
        assert_eq!(url, "https://assets.example.com/a.png");
    }

    #[tokio::test]
    async fn test_upload_requires_actor() {
        let result = upload_asset(
            &FixedUploader,
            &RequestContext::anonymous(),
            Bytes::from_static(b"png"),
            "image/png",
            10,
        )
        .await;
        assert!(matches!(result, Err(ServiceError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_oversized_upload_is_bad_input() {
        let result =
            upload_asset(&FixedUploader, &signed_in(), Bytes::from_static(b"too big"), "image/png", 3).await;
        assert!(matches!(result, Err(ServiceError::BadUserInput(_))));
    }

    #[tokio::test]
    async fn test_disabled_store_fails_upload() {
        let result =
            upload_asset(&DisabledUploader, &signed_in(), Bytes::from_static(b"png"), "image/png", 10).await;
        assert!(matches!(result, Err(ServiceError::UploadFailed(_))));
    }
}
