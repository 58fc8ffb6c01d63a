use std::path::Path;

/// Broad category of a file, picked from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Document,
    Spreadsheet,
    Presentation,
    Archive,
    Audio,
    Video,
    Code,
    Font,
    Other,
}

impl FileKind {
    pub fn from_name(name: &str) -> Self {
        let ext = match Path::new(name).extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.to_lowercase(),
            None => return FileKind::Other,
        };

        match ext.as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "svg" | "webp" | "bmp" | "ico" => FileKind::Image,
            "doc" | "docx" | "pdf" | "txt" | "rtf" | "odt" | "md" => FileKind::Document,
            "xls" | "xlsx" | "csv" | "ods" => FileKind::Spreadsheet,
            "ppt" | "pptx" | "odp" | "key" => FileKind::Presentation,
            "zip" | "rar" | "tar" | "gz" | "7z" | "iso" => FileKind::Archive,
            "mp3" | "wav" | "ogg" | "flac" | "m4a" | "aac" => FileKind::Audio,
            "mp4" | "avi" | "mov" | "wmv" | "mkv" | "flv" | "webm" => FileKind::Video,
            "html" | "css" | "js" | "php" | "py" | "java" | "cpp" | "h" | "c" | "cs" | "rb"
            | "go" | "ts" | "json" | "xml" | "rs" | "toml" => FileKind::Code,
            "ttf" | "otf" | "woff" | "woff2" | "eot" => FileKind::Font,
            _ => FileKind::Other,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            FileKind::Image => "🖼",
            FileKind::Document => "📄",
            FileKind::Spreadsheet => "📊",
            FileKind::Presentation => "📽",
            FileKind::Archive => "🗄",
            FileKind::Audio => "🎵",
            FileKind::Video => "🎞",
            FileKind::Code => "💻",
            FileKind::Font => "🔤",
            FileKind::Other => "📁",
        }
    }
}
