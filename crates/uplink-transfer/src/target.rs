use crate::traits::{TransferError, TransferResult};

/// Transfer coordinates decoded from a session's upload-target locator.
///
/// Ephemeral: recomputed from the session snapshot on every upload, so a
/// session refreshed between files redirects subsequent transfers without
/// extra API calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferTarget {
    /// Service endpoint base, scheme included. May itself contain slashes
    /// (`https://host/path`); authorization is embedded in this path.
    pub endpoint: String,
    pub bucket: String,
    /// Object-key prefix under the bucket. Destination keys are
    /// `{prefix}/{filename}`.
    pub prefix: String,
}

impl TransferTarget {
    /// Decode `<endpoint>/<bucket>/<prefix>`.
    ///
    /// The parse is right-to-left: pop exactly one prefix segment, then
    /// exactly one bucket segment, and everything remaining is the endpoint.
    /// The endpoint is not assumed to be slash-free, so a left-to-right split
    /// would misattribute its path segments.
    pub fn parse(locator: &str) -> TransferResult<Self> {
        let mut segments: Vec<&str> = locator.split('/').collect();
        if segments.len() < 3 {
            return Err(TransferError::MalformedTarget(locator.to_string()));
        }

        let prefix = segments.pop().unwrap_or_default().to_string();
        let bucket = segments.pop().unwrap_or_default().to_string();
        let endpoint = segments.join("/");

        if prefix.is_empty() || bucket.is_empty() || endpoint.is_empty() {
            return Err(TransferError::MalformedTarget(locator.to_string()));
        }

        Ok(Self {
            endpoint,
            bucket,
            prefix,
        })
    }
}
