//! Media descriptors and the inline markup Anki expects for them.

use crate::record::lenient;
use serde::Deserialize;

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "webp", "svg"];
const PLAYBACK_EXTENSIONS: [&str; 1] = ["mp4"];

/// `mediaContent` as found in a question or answer document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaDescriptor {
    #[serde(deserialize_with = "lenient")]
    pub media_url: Option<String>,
    /// Name the fetch step stored the asset under.
    #[serde(deserialize_with = "lenient")]
    pub print_media_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Playback,
    Link,
}

impl MediaDescriptor {
    pub fn from_file_name(name: &str) -> Self {
        Self {
            media_url: None,
            print_media_name: Some(name.to_string()),
        }
    }

    /// Local file name of the asset. `printMediaName` wins over the URL.
    pub fn file_name(&self) -> Option<String> {
        self.print_media_name
            .as_deref()
            .and_then(base_name)
            .or_else(|| self.media_url.as_deref().and_then(url_base_name))
    }

    pub fn reference(&self) -> String {
        match self.file_name() {
            Some(name) => MediaKind::classify(&name).markup(&name),
            None => String::new(),
        }
    }
}

impl MediaKind {
    pub fn classify(file_name: &str) -> MediaKind {
        let extension = match file_name.rsplit_once('.') {
            Some((_, ext)) => ext.to_ascii_lowercase(),
            None => return MediaKind::Link,
        };
        if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            MediaKind::Image
        } else if PLAYBACK_EXTENSIONS.contains(&extension.as_str()) {
            MediaKind::Playback
        } else {
            MediaKind::Link
        }
    }

    pub fn markup(self, file_name: &str) -> String {
        match self {
            MediaKind::Image => format!(r#"<img src="{file_name}" alt="{file_name}">"#),
            MediaKind::Playback => format!("[sound:{file_name}]"),
            MediaKind::Link => format!(r#"<a href="{file_name}">{file_name}</a>"#),
        }
    }
}

/// Renders a bare file name, path or URL as inline markup. Directory parts
/// are dropped first, so the reference always names a file in the media
/// folder.
pub fn resolve(descriptor: Option<&str>) -> String {
    match descriptor.and_then(url_base_name) {
        Some(name) => MediaKind::classify(&name).markup(&name),
        None => String::new(),
    }
}

/// Last path segment, split on both separators. Tabs and line breaks
/// become spaces. `.` and `..` are rejected.
pub fn base_name(path: &str) -> Option<String> {
    let segment = path.rsplit(['/', '\\']).next().unwrap_or_default();
    let name = segment.replace(['\t', '\n', '\r'], " ");
    match name.trim() {
        "" | "." | ".." => None,
        name => Some(name.to_string()),
    }
}

/// Like [`base_name`], with any query string or fragment cut off first.
pub fn url_base_name(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    base_name(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn image_markup_names_file_twice() {
        assert_eq!(
            resolve(Some("sign7.png")),
            r#"<img src="sign7.png" alt="sign7.png">"#
        );
    }

    #[test]
    fn extension_match_ignores_case() {
        assert_eq!(MediaKind::classify("PHOTO.JPEG"), MediaKind::Image);
        assert_eq!(MediaKind::classify("clip.MP4"), MediaKind::Playback);
    }

    #[test]
    fn gif_is_an_image() {
        assert_eq!(MediaKind::classify("anim.gif"), MediaKind::Image);
    }

    #[test]
    fn mp4_becomes_sound_cue() {
        assert_eq!(resolve(Some("clip.mp4")), "[sound:clip.mp4]");
    }

    #[test]
    fn unknown_extension_becomes_link() {
        assert_eq!(
            resolve(Some("notes.pdf")),
            r#"<a href="notes.pdf">notes.pdf</a>"#
        );
        assert_eq!(resolve(Some("README")), r#"<a href="README">README</a>"#);
    }

    #[test]
    fn absent_descriptor_is_empty() {
        assert_eq!(resolve(None), "");
        assert_eq!(resolve(Some("")), "");
        assert_eq!(MediaDescriptor::default().reference(), "");
    }

    #[test]
    fn directories_are_stripped() {
        assert_eq!(
            resolve(Some("https://example.org/media/q/12.png?v=3")),
            r#"<img src="12.png" alt="12.png">"#
        );
        assert_eq!(base_name("..\\..\\evil.svg").as_deref(), Some("evil.svg"));
        assert_eq!(base_name("../.."), None);
        assert_eq!(base_name("dir/"), None);
    }

    #[test]
    fn line_breaks_in_names_become_spaces() {
        assert_eq!(base_name("a\tb.png").as_deref(), Some("a b.png"));
        assert_eq!(base_name("x/\r\nc\nd.mp4\n").as_deref(), Some("c d.mp4"));
        assert_eq!(base_name("\t\n"), None);
        assert_eq!(resolve(Some("c\nd.mp4")), "[sound:c d.mp4]");
    }

    #[test]
    fn print_media_name_is_preferred() {
        let descriptor = MediaDescriptor {
            media_url: Some("https://example.org/files/abc123".into()),
            print_media_name: Some("sign7.png".into()),
        };
        assert_eq!(descriptor.file_name().as_deref(), Some("sign7.png"));
        assert_eq!(descriptor.reference(), r#"<img src="sign7.png" alt="sign7.png">"#);
    }

    #[test]
    fn falls_back_to_url() {
        let descriptor = MediaDescriptor {
            media_url: Some("/img/q/55.jpg".into()),
            print_media_name: Some(String::new()),
        };
        assert_eq!(descriptor.file_name().as_deref(), Some("55.jpg"));
    }
}
