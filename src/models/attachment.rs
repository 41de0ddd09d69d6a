/// A file (receipt, image) linked to an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub id: Option<i64>,
    pub entry_id: i64,
    pub file_path: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub uploaded_at: Option<i64>,
    pub created_at: i64,
}

impl Attachment {
    /// File name and mime type are derived from the path when possible.
    pub fn new(entry_id: i64, file_path: String) -> Self {
        let path = std::path::Path::new(&file_path);
        let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned());
        let mime_type = path
            .extension()
            .and_then(|e| guess_mime_type(&e.to_string_lossy()))
            .map(str::to_string);
        Self {
            id: None,
            entry_id,
            file_path,
            file_name,
            mime_type,
            uploaded_at: None,
            created_at: super::now_millis(),
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type
            .as_deref()
            .is_some_and(|m| m.starts_with("image/"))
    }
}

fn guess_mime_type(extension: &str) -> Option<&'static str> {
    match extension.to_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        "pdf" => Some("application/pdf"),
        "mp4" => Some("video/mp4"),
        "txt" => Some("text/plain"),
        _ => None,
    }
}
