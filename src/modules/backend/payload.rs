//! Raw file payloads handed to the upload transport.
//!
//! Platform pickers produce either a whole blob in memory (web) or a
//! local file reference (native). The transport decides how each is
//! uploaded; core logic stays platform-agnostic.

/// Progress event for an in-flight transfer
#[derive(Debug, Clone, Copy)]
pub struct UploadProgress {
    pub loaded: u64,
    pub total: u64,
}

impl UploadProgress {
    /// Progress percentage, floored, clamped to 0..=100
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.loaded * 100) / self.total).min(100) as u8
    }
}

/// Callback invoked by transports that report incremental progress
pub type ProgressFn = Box<dyn Fn(UploadProgress) + Send + Sync>;

/// A whole payload held in memory. Uploads atomically; progress jumps
/// straight to 100% on completion.
#[derive(Debug, Clone)]
pub struct BufferPayload {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// A payload read from a local source in chunks. Transports report
/// incremental progress as chunks complete.
#[derive(Debug, Clone)]
pub struct StreamPayload {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    /// Local source the platform adapter reads from (file path or URI)
    pub uri: String,
}

/// Platform-independent description of a file to upload
#[derive(Debug, Clone)]
pub enum PayloadSource {
    Buffer(BufferPayload),
    Stream(StreamPayload),
}

impl PayloadSource {
    pub fn buffer(name: &str, mime_type: &str, data: Vec<u8>) -> Self {
        PayloadSource::Buffer(BufferPayload {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            data,
        })
    }

    pub fn stream(name: &str, mime_type: &str, size: u64, uri: &str) -> Self {
        PayloadSource::Stream(StreamPayload {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            size,
            uri: uri.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        match self {
            PayloadSource::Buffer(p) => &p.name,
            PayloadSource::Stream(p) => &p.name,
        }
    }

    pub fn mime_type(&self) -> &str {
        match self {
            PayloadSource::Buffer(p) => &p.mime_type,
            PayloadSource::Stream(p) => &p.mime_type,
        }
    }

    pub fn size(&self) -> u64 {
        match self {
            PayloadSource::Buffer(p) => p.data.len() as u64,
            PayloadSource::Stream(p) => p.size,
        }
    }

    /// File extension derived from the payload name
    pub fn extension(&self) -> String {
        self.name()
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_string()
    }
}
