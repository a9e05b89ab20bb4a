//! Knowledge source binding
//!
//! A session has at most one active source. Binding a new one replaces
//! whatever was there before; nothing is merged.

use serde::Serialize;
use std::fmt;
use std::path::Path;

/// The only document kind the answering service can index
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// The single active knowledge source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceBinding {
    #[default]
    Empty,
    Document {
        name: String,
        size_bytes: u64,
    },
    Video {
        video_id: String,
    },
}

impl SourceBinding {
    pub fn is_empty(&self) -> bool {
        matches!(self, SourceBinding::Empty)
    }

    /// Detach locally. The answering service is not told.
    pub fn clear(&mut self) {
        *self = SourceBinding::Empty;
    }
}

impl fmt::Display for SourceBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceBinding::Empty => write!(f, "no source"),
            SourceBinding::Document { name, size_bytes } => {
                write!(f, "PDF {name} ({})", human_size(*size_bytes))
            }
            SourceBinding::Video { video_id } => write!(f, "YouTube video {video_id}"),
        }
    }
}

#[allow(clippy::cast_precision_loss)] // display only
fn human_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// A candidate document picked by the user, not yet uploaded
#[derive(Clone, PartialEq, Eq)]
pub struct DocumentFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl DocumentFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Read a document from disk, guessing its kind from the extension the
    /// same way a browser file picker would.
    pub async fn load(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let media_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or(FALLBACK_MEDIA_TYPE);

        Ok(Self::new(name, media_type, bytes))
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_accepted(&self) -> bool {
        self.media_type.eq_ignore_ascii_case(PDF_MEDIA_TYPE)
    }
}

impl fmt::Debug for DocumentFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentFile")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("size_bytes", &self.size_bytes())
            .finish()
    }
}
