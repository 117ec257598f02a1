//! Content categories

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Text,
    Image,
    Audio,
    Video,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Text,
        Category::Image,
        Category::Audio,
        Category::Video,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Text => "text",
            Category::Image => "image",
            Category::Audio => "audio",
            Category::Video => "video",
            Category::Other => "other",
        }
    }

    /// Infer the category of a resource from the extension of its path.
    ///
    /// Paths without an extension, or with one not listed here, are text.
    pub fn from_path(path: &str) -> Self {
        let file_name = path.rsplit('/').next().unwrap_or("");
        let extension = match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
            _ => return Category::Text,
        };

        match extension.as_str() {
            "avif" | "bmp" | "gif" | "ico" | "jpeg" | "jpg" | "png" | "svg" | "tif" | "tiff"
            | "webp" => Category::Image,

            "aac" | "flac" | "m4a" | "mid" | "midi" | "mp3" | "oga" | "ogg" | "opus" | "wav"
            | "weba" => Category::Audio,

            "avi" | "m4v" | "mkv" | "mov" | "mp4" | "mpeg" | "mpg" | "ogv" | "webm" => {
                Category::Video
            }

            "7z" | "bin" | "bz2" | "deb" | "dmg" | "eot" | "exe" | "gz" | "iso" | "otf" | "pdf"
            | "rar" | "tar" | "ttf" | "woff" | "woff2" | "xz" | "zip" => Category::Other,

            _ => Category::Text,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Category::Text),
            "image" => Ok(Category::Image),
            "audio" => Ok(Category::Audio),
            "video" => Ok(Category::Video),
            "other" => Ok(Category::Other),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(Category::from_path("/index.html"), Category::Text);
        assert_eq!(Category::from_path("/"), Category::Text);
        assert_eq!(Category::from_path("/about"), Category::Text);
        assert_eq!(Category::from_path("/assets/logo.PNG"), Category::Image);
        assert_eq!(Category::from_path("/media/theme.ogg"), Category::Audio);
        assert_eq!(Category::from_path("/media/intro.webm"), Category::Video);
        assert_eq!(Category::from_path("/files/report.pdf"), Category::Other);
        assert_eq!(Category::from_path("/files/data.unknownext"), Category::Text);
    }

    #[test]
    fn test_dotfile_is_text() {
        assert_eq!(Category::from_path("/.png"), Category::Text);
        assert_eq!(Category::from_path("/v1.2/page"), Category::Text);
    }

    #[test]
    fn test_parse() {
        assert_eq!("IMAGE".parse::<Category>().unwrap(), Category::Image);
        assert!("font".parse::<Category>().is_err());
    }
}
