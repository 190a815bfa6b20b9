use crate::config::upload_delay_ms;
use crate::core::errors::StoreError;
use crate::core::helpers::{local_object_url, new_id};
use crate::models::models::{Attachment, AttachmentKind};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub fn kind_for(file_name: &str) -> AttachmentKind {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" | "jpg" | "jpeg" | "gif" | "webp" | "avif" => AttachmentKind::Image,
        "mp4" | "webm" | "mov" => AttachmentKind::Video,
        _ => AttachmentKind::File,
    }
}

/// Pretends to upload a locally picked file. The result points at a local
/// object URL; nothing leaves the device.
pub async fn simulate_upload(file_name: &str, token: &CancellationToken) -> Result<Attachment, StoreError> {
    upload_after(file_name, Duration::from_millis(upload_delay_ms()), token).await
}

pub async fn upload_after(
    file_name: &str,
    delay: Duration,
    token: &CancellationToken,
) -> Result<Attachment, StoreError> {
    let name = file_name.trim();
    if name.is_empty() {
        return Err(StoreError::Validation("File name is required".to_string()));
    }

    tokio::select! {
        biased;
        _ = token.cancelled() => {
            debug!(file = %name, "upload cancelled");
            Err(StoreError::Cancelled)
        }
        _ = tokio::time::sleep(delay) => Ok(Attachment {
            id: new_id(),
            kind: kind_for(name),
            url: local_object_url(),
            name: name.to_string(),
        }),
    }
}
