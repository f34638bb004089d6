use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tokio::fs::File;
use tokio::io::AsyncSeekExt;
use uplink_core::UploadSession;

use crate::target::TransferTarget;
use crate::traits::{MultipartProgress, ObjectSink, TransferError, TransferResult, UploadOutcome};

/// Drives one file through the data plane: a simple upload first, escalated
/// to a resumable multipart transfer when the sink signals the payload needs
/// one, looping until the object is durably stored.
///
/// Two states, one transition: `Simple --incomplete--> Chunked`. Once
/// escalated, every further attempt resumes the multipart transfer with the
/// latest captured progress. Faithful to the source behavior the loop is
/// unbounded by default; [`with_max_attempts`](Self::with_max_attempts) caps
/// it as a documented deviation.
pub struct ResumableUploader {
    sink: Arc<dyn ObjectSink>,
    max_attempts: Option<usize>,
}

impl ResumableUploader {
    pub fn new(sink: Arc<dyn ObjectSink>) -> Self {
        Self {
            sink,
            max_attempts: None,
        }
    }

    /// Cap the number of transfer attempts. Exceeding the cap yields
    /// [`TransferError::AttemptsExhausted`].
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Upload one local file to the session's current upload target.
    ///
    /// The destination key is `{prefix}/{file name}`. The session is never
    /// mutated; a failure aborts this file only.
    pub async fn upload_file(
        &self,
        session: &UploadSession,
        path: &Path,
    ) -> TransferResult<()> {
        let target = TransferTarget::parse(&session.upload_target)?;

        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| TransferError::InvalidPath(path.display().to_string()))?;
        let key = format!("{}/{}", target.prefix, filename);

        let mut file = File::open(path).await?;
        let start = Instant::now();

        let mut pending: Option<MultipartProgress> = None;
        let mut attempts = 0usize;

        loop {
            if let Some(max) = self.max_attempts {
                if attempts == max {
                    tracing::error!(
                        bucket = %target.bucket,
                        key = %key,
                        attempts = max,
                        "Transfer attempt cap reached"
                    );
                    return Err(TransferError::AttemptsExhausted(max));
                }
            }
            attempts += 1;

            // Every attempt starts from a rewound stream; the sink seeks
            // forward itself past parts it will not re-send.
            file.rewind().await?;

            let outcome = match pending.take() {
                None => self.sink.simple_upload(&target, &key, &mut file).await?,
                Some(progress) => {
                    self.sink
                        .resume_multipart(&target, &key, &mut file, progress)
                        .await?
                }
            };

            match outcome {
                UploadOutcome::Complete => break,
                UploadOutcome::Incomplete(progress) => {
                    tracing::debug!(
                        bucket = %target.bucket,
                        key = %key,
                        attempt = attempts,
                        parts_stored = progress.completed.len(),
                        "Transfer incomplete, resuming as multipart"
                    );
                    pending = Some(progress);
                }
            }
        }

        tracing::info!(
            bucket = %target.bucket,
            key = %key,
            attempts,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload complete"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{ByteSource, CompletedPartRecord};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::io::Write;
    use std::sync::Mutex;
    use tokio::io::AsyncReadExt;

    #[derive(Debug, PartialEq, Eq)]
    enum Call {
        Simple {
            key: String,
            start_position: u64,
        },
        Resume {
            key: String,
            start_position: u64,
            progress: MultipartProgress,
        },
    }

    /// Sink that replays a scripted outcome per attempt and records every
    /// call together with the stream position it observed.
    struct ScriptedSink {
        outcomes: Mutex<VecDeque<TransferResult<UploadOutcome>>>,
        calls: Mutex<Vec<Call>>,
        /// Bytes each attempt consumes before returning, to prove rewinds.
        consume: usize,
    }

    impl ScriptedSink {
        fn new(outcomes: Vec<TransferResult<UploadOutcome>>, consume: usize) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: Mutex::new(Vec::new()),
                consume,
            }
        }

        async fn next_outcome(
            &self,
            source: &mut (dyn ByteSource),
        ) -> (u64, TransferResult<UploadOutcome>) {
            let position = source.stream_position().await.unwrap();
            let mut scratch = vec![0u8; self.consume];
            source.read_exact(&mut scratch).await.unwrap();
            let outcome = self
                .outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(UploadOutcome::Complete));
            (position, outcome)
        }

        fn calls(&self) -> Vec<Call> {
            std::mem::take(&mut self.calls.lock().unwrap())
        }
    }

    #[async_trait]
    impl ObjectSink for ScriptedSink {
        async fn simple_upload(
            &self,
            _target: &TransferTarget,
            key: &str,
            source: &mut (dyn ByteSource),
        ) -> TransferResult<UploadOutcome> {
            let (start_position, outcome) = self.next_outcome(source).await;
            self.calls.lock().unwrap().push(Call::Simple {
                key: key.to_string(),
                start_position,
            });
            outcome
        }

        async fn resume_multipart(
            &self,
            _target: &TransferTarget,
            key: &str,
            source: &mut (dyn ByteSource),
            progress: MultipartProgress,
        ) -> TransferResult<UploadOutcome> {
            let (start_position, outcome) = self.next_outcome(source).await;
            self.calls.lock().unwrap().push(Call::Resume {
                key: key.to_string(),
                start_position,
                progress,
            });
            outcome
        }
    }

    fn session_with_target(target: &str) -> UploadSession {
        UploadSession {
            id: "1".to_string(),
            folder_id: "f".to_string(),
            session_id: "s".to_string(),
            upload_target: target.to_string(),
            state: 0,
        }
    }

    fn write_fixture(dir: &tempfile::TempDir, name: &str, len: usize) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&vec![0xAB; len]).unwrap();
        path
    }

    fn progress(upload_id: &str, parts: usize) -> MultipartProgress {
        MultipartProgress {
            upload_id: upload_id.to_string(),
            completed: (1..=parts as i32)
                .map(|n| CompletedPartRecord {
                    part_number: n,
                    etag: format!("etag-{n}"),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn simple_upload_success_makes_one_attempt() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "clip.mp4", 64);
        let sink = Arc::new(ScriptedSink::new(vec![Ok(UploadOutcome::Complete)], 16));

        let uploader = ResumableUploader::new(sink.clone());
        uploader
            .upload_file(
                &session_with_target("https://svc.example.com/videos/bucket123/prefix"),
                &path,
            )
            .await
            .unwrap();

        let calls = sink.calls();
        assert_eq!(
            calls,
            vec![Call::Simple {
                key: "prefix/clip.mp4".to_string(),
                start_position: 0,
            }]
        );
    }

    #[tokio::test]
    async fn escalates_once_with_rewind_and_exact_progress() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "clip.mp4", 64);

        let captured = progress("mp-upload-9", 2);
        let sink = Arc::new(ScriptedSink::new(
            vec![
                Ok(UploadOutcome::Incomplete(captured.clone())),
                Ok(UploadOutcome::Complete),
            ],
            16,
        ));

        let uploader = ResumableUploader::new(sink.clone());
        uploader
            .upload_file(&session_with_target("host/bucket/prefix"), &path)
            .await
            .unwrap();

        let calls = sink.calls();
        assert_eq!(calls.len(), 2);
        // The first attempt consumed bytes; the second still starts at 0.
        assert_eq!(
            calls[1],
            Call::Resume {
                key: "prefix/clip.mp4".to_string(),
                start_position: 0,
                progress: captured,
            }
        );
    }

    #[tokio::test]
    async fn stays_chunked_after_escalation() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "clip.mp4", 64);

        let sink = Arc::new(ScriptedSink::new(
            vec![
                Ok(UploadOutcome::Incomplete(progress("mp-1", 0))),
                Ok(UploadOutcome::Incomplete(progress("mp-1", 3))),
                Ok(UploadOutcome::Complete),
            ],
            8,
        ));

        let uploader = ResumableUploader::new(sink.clone());
        uploader
            .upload_file(&session_with_target("host/bucket/prefix"), &path)
            .await
            .unwrap();

        let calls = sink.calls();
        assert_eq!(calls.len(), 3);
        assert!(matches!(calls[0], Call::Simple { .. }));
        // Never falls back to a simple attempt once escalated, and each
        // resume carries the latest captured progress.
        match (&calls[1], &calls[2]) {
            (
                Call::Resume {
                    progress: first, ..
                },
                Call::Resume {
                    progress: second, ..
                },
            ) => {
                assert_eq!(first.completed.len(), 0);
                assert_eq!(second.completed.len(), 3);
            }
            other => panic!("expected two resume calls, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn persistently_incomplete_sink_exhausts_attempt_cap() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "clip.mp4", 64);

        // Script more Incomplete outcomes than the cap allows.
        let outcomes = (0..10)
            .map(|_| Ok(UploadOutcome::Incomplete(progress("mp-loop", 0))))
            .collect();
        let sink = Arc::new(ScriptedSink::new(outcomes, 4));

        let uploader = ResumableUploader::new(sink.clone()).with_max_attempts(5);
        let err = uploader
            .upload_file(&session_with_target("host/bucket/prefix"), &path)
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::AttemptsExhausted(5)));
        // Exactly one attempt per allowed slot: the loop itself is unbounded,
        // only the external cap stopped it.
        assert_eq!(sink.calls().len(), 5);
    }

    #[tokio::test]
    async fn sink_error_propagates_unmodified() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "clip.mp4", 64);

        let sink = Arc::new(ScriptedSink::new(
            vec![Err(TransferError::Upload("access denied".to_string()))],
            0,
        ));

        let uploader = ResumableUploader::new(sink);
        let err = uploader
            .upload_file(&session_with_target("host/bucket/prefix"), &path)
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::Upload(msg) if msg == "access denied"));
    }

    #[tokio::test]
    async fn malformed_target_fails_before_opening_the_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "clip.mp4", 8);
        let sink = Arc::new(ScriptedSink::new(vec![], 0));

        let uploader = ResumableUploader::new(sink.clone());
        let err = uploader
            .upload_file(&session_with_target("host/bucket"), &path)
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::MalformedTarget(_)));
        assert!(sink.calls().is_empty());
    }
}
