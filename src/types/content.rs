//! Local content and the references handed out to callers

use bytes::Bytes;

/// Materialized asset bytes together with the filename and content type
/// they were staged under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalContent {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl LocalContent {
    pub fn new(
        bytes: impl Into<Bytes>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Wrap bytes, deriving the content type from the filename extension
    pub fn from_filename(bytes: impl Into<Bytes>, filename: &str, fallback_type: &str) -> Self {
        Self::new(bytes, filename, content_type_for(filename, fallback_type))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A transient, caller-usable reference to an asset's local content
///
/// Derived from the handle owned by the asset record each time it is
/// requested. The `url` stops resolving once the record releases its handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRef {
    pub url: String,
    pub content: LocalContent,
}

impl ContentRef {
    pub fn bytes(&self) -> &Bytes {
        &self.content.bytes
    }

    pub fn filename(&self) -> &str {
        &self.content.filename
    }

    pub fn content_type(&self) -> &str {
        &self.content.content_type
    }
}

/// Guess a content type from a filename extension
pub fn content_type_for(filename: &str, fallback: &str) -> String {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "ktx2" => "image/ktx2",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "glb" => "model/gltf-binary",
        "gltf" => "model/gltf+json",
        "obj" => "model/obj",
        "json" => "application/json",
        "txt" => "text/plain",
        "html" => "text/html",
        "js" => "text/javascript",
        "wasm" => "application/wasm",
        _ => fallback,
    };
    mime.to_string()
}
