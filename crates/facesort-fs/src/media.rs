//! Media type table.
//!
//! Extension lists are embedded at compile time from
//! `contrib/media_types.toml`.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

const MEDIA_TYPES_TOML: &str = include_str!("../../../contrib/media_types.toml");

static MEDIA_TABLE: OnceLock<MediaTable> = OnceLock::new();

#[derive(Debug, Clone, Deserialize)]
struct ExtensionList {
    extensions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct MediaTableFile {
    video: ExtensionList,
    image: ExtensionList,
}

/// Lowercased extension sets, without the leading dot.
#[derive(Debug, Clone, Default)]
pub struct MediaTable {
    video: HashSet<String>,
    image: HashSet<String>,
}

impl MediaTable {
    fn parse(src: &str) -> Result<Self, toml::de::Error> {
        let file: MediaTableFile = toml::from_str(src)?;
        let lower = |list: ExtensionList| -> HashSet<String> {
            list.extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect()
        };
        Ok(Self {
            video: lower(file.video),
            image: lower(file.image),
        })
    }

    /// Suffix match on the file name, so a bare `.jpg` counts as an image.
    pub fn kind_of(&self, path: &Path) -> MediaKind {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return MediaKind::Other;
        };
        let name = name.to_lowercase();
        let Some((_, ext)) = name.rsplit_once('.') else {
            return MediaKind::Other;
        };

        if self.video.contains(ext) {
            MediaKind::Video
        } else if self.image.contains(ext) {
            MediaKind::Image
        } else {
            MediaKind::Other
        }
    }
}

/// The embedded table. A malformed embedded table is a build defect; it is
/// logged and yields an empty table so every file is skipped.
pub fn media_table() -> &'static MediaTable {
    MEDIA_TABLE.get_or_init(|| {
        MediaTable::parse(MEDIA_TYPES_TOML).unwrap_or_else(|e| {
            tracing::error!(error = %e, "bad embedded media type table");
            MediaTable::default()
        })
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Image,
    Other,
}

impl MediaKind {
    pub fn of(path: &Path) -> Self {
        media_table().kind_of(path)
    }
}
