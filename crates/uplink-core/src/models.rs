use serde::{Deserialize, Serialize};

/// Lifecycle state written by this client when all files have been uploaded.
/// Other state values are remote-defined and read-only observations.
pub const STATE_FINISHED_UPLOADING: i32 = 1;

/// Remote upload-session resource.
///
/// A value of this type is always a complete snapshot returned by the control
/// plane. The client never patches individual fields server-side: every
/// "mutation" sends a modified copy and replaces the local value with the
/// server's response, because the control plane may rotate fields (e.g. the
/// upload target) between calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSession {
    /// Resource identifier on the session REST surface.
    #[serde(rename = "Id")]
    pub id: String,
    /// Destination folder, set at creation and never mutated.
    #[serde(rename = "FolderId")]
    pub folder_id: String,
    /// Correlation identifier for the eventual processed recording. Lives in
    /// a different namespace than `id` and is the key for deletion.
    #[serde(rename = "SessionId")]
    pub session_id: String,
    /// Opaque data-plane locator: `<endpoint>/<bucket>/<prefix>`, where the
    /// endpoint may itself contain slashes.
    #[serde(rename = "UploadTarget")]
    pub upload_target: String,
    /// Remote lifecycle code. 0 = in progress, 1 = finished uploading.
    #[serde(rename = "State")]
    pub state: i32,
}

impl UploadSession {
    /// Copy of this snapshot marked finished-uploading, ready to be sent back
    /// to the control plane.
    pub fn finished(&self) -> Self {
        let mut next = self.clone();
        next.state = STATE_FINISHED_UPLOADING;
        next
    }
}
