//! aws-sdk-s3 backed [`ObjectSink`].
//!
//! The upload-target endpoint is pre-authorized: it embeds the authorization
//! in its path, so the sink signs requests with deliberately non-functional
//! placeholder credentials and uses path-style addressing against the
//! endpoint as-is.

use std::io::SeekFrom;
use std::time::Instant;

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_sdk_s3::{Client, Config};
use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::target::TransferTarget;
use crate::traits::{
    ByteSource, MultipartProgress, ObjectSink, TransferError, TransferResult, UploadOutcome,
};

/// Single-request upload ceiling; larger payloads go multipart immediately.
const SIMPLE_UPLOAD_LIMIT: u64 = 5 * 1024 * 1024 * 1024; // 5GB
/// Part size for multipart transfers (minimum is 5MB except the last part).
const PART_SIZE: usize = 5 * 1024 * 1024; // 5MB

/// S3-compatible object-storage sink.
#[derive(Clone, Debug, Default)]
pub struct S3Sink;

impl S3Sink {
    pub fn new() -> Self {
        Self
    }

    fn client_for(target: &TransferTarget) -> Client {
        let credentials = Credentials::new("placeholder", "placeholder", None, None, "uplink");
        let config = Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .endpoint_url(target.endpoint.clone())
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();
        Client::from_conf(config)
    }

    async fn begin_multipart(
        client: &Client,
        target: &TransferTarget,
        key: &str,
    ) -> TransferResult<UploadOutcome> {
        let created = client
            .create_multipart_upload()
            .bucket(&target.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %target.bucket,
                    key = %key,
                    "Failed to create multipart upload"
                );
                TransferError::Upload(e.to_string())
            })?;

        let upload_id = created.upload_id().ok_or_else(|| {
            TransferError::Upload("No upload ID returned from storage".to_string())
        })?;

        Ok(UploadOutcome::Incomplete(MultipartProgress {
            upload_id: upload_id.to_string(),
            completed: Vec::new(),
        }))
    }
}

#[async_trait]
impl ObjectSink for S3Sink {
    async fn simple_upload(
        &self,
        target: &TransferTarget,
        key: &str,
        source: &mut (dyn ByteSource),
    ) -> TransferResult<UploadOutcome> {
        let start = Instant::now();
        let client = Self::client_for(target);

        let mut buffer = Vec::new();
        source.read_to_end(&mut buffer).await?;
        let size = buffer.len() as u64;

        if size > SIMPLE_UPLOAD_LIMIT {
            tracing::debug!(
                bucket = %target.bucket,
                key = %key,
                size_bytes = size,
                "Payload exceeds simple-upload limit, starting multipart upload"
            );
            return Self::begin_multipart(&client, target, key).await;
        }

        let result = client
            .put_object()
            .bucket(&target.bucket)
            .key(key)
            .body(ByteStream::from(Bytes::from(buffer)))
            .send()
            .await;

        match result {
            Ok(_) => {
                tracing::info!(
                    bucket = %target.bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Simple upload successful"
                );
                Ok(UploadOutcome::Complete)
            }
            Err(e) if e.as_service_error().and_then(|se| se.code()) == Some("EntityTooLarge") => {
                tracing::debug!(
                    bucket = %target.bucket,
                    key = %key,
                    size_bytes = size,
                    "Storage rejected simple upload as too large, starting multipart upload"
                );
                Self::begin_multipart(&client, target, key).await
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %target.bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Simple upload failed"
                );
                Err(TransferError::Upload(e.to_string()))
            }
        }
    }

    async fn resume_multipart(
        &self,
        target: &TransferTarget,
        key: &str,
        source: &mut (dyn ByteSource),
        progress: MultipartProgress,
    ) -> TransferResult<UploadOutcome> {
        let start = Instant::now();
        let client = Self::client_for(target);

        // Parts already stored are a contiguous run of full-size parts from
        // part 1; seek past their bytes instead of re-reading them.
        let mut parts: Vec<CompletedPart> = progress
            .completed
            .iter()
            .map(|p| {
                CompletedPart::builder()
                    .part_number(p.part_number)
                    .e_tag(p.etag.as_str())
                    .build()
            })
            .collect();
        let stored = progress.completed.len();
        let mut total_size = (stored * PART_SIZE) as u64;
        source.seek(SeekFrom::Start(total_size)).await?;

        let mut part_number = stored as i32 + 1;
        let mut part_buffer = vec![0u8; PART_SIZE];

        loop {
            let mut bytes_in_part = 0usize;
            while bytes_in_part < PART_SIZE {
                let bytes_read = source.read(&mut part_buffer[bytes_in_part..]).await?;
                if bytes_read == 0 {
                    break;
                }
                bytes_in_part += bytes_read;
            }

            if bytes_in_part == 0 {
                break;
            }
            total_size += bytes_in_part as u64;

            let body = ByteStream::from(Bytes::copy_from_slice(&part_buffer[..bytes_in_part]));
            let uploaded = client
                .upload_part()
                .bucket(&target.bucket)
                .key(key)
                .upload_id(&progress.upload_id)
                .part_number(part_number)
                .body(body)
                .send()
                .await
                .map_err(|e| {
                    tracing::error!(
                        error = %e,
                        bucket = %target.bucket,
                        key = %key,
                        part_number = part_number,
                        "Failed to upload part"
                    );
                    TransferError::Upload(e.to_string())
                })?;

            let etag = uploaded
                .e_tag()
                .ok_or_else(|| {
                    TransferError::Upload(format!("No ETag returned for part {}", part_number))
                })?
                .to_string();

            parts.push(
                CompletedPart::builder()
                    .part_number(part_number)
                    .e_tag(etag)
                    .build(),
            );
            part_number += 1;

            if bytes_in_part < PART_SIZE {
                break;
            }
        }

        let completed_parts = CompletedMultipartUpload::builder()
            .set_parts(Some(parts))
            .build();

        client
            .complete_multipart_upload()
            .bucket(&target.bucket)
            .key(key)
            .upload_id(&progress.upload_id)
            .multipart_upload(completed_parts)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %target.bucket,
                    key = %key,
                    "Failed to complete multipart upload"
                );
                TransferError::Upload(e.to_string())
            })?;

        tracing::info!(
            bucket = %target.bucket,
            key = %key,
            size_bytes = total_size,
            parts = part_number - 1,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Multipart upload successful"
        );
        Ok(UploadOutcome::Complete)
    }
}
