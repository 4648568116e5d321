use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier carried by an upstream icon record. Upstream APIs use both
/// numeric and string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NativeId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for NativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeId::Number(n) => write!(f, "{}", n),
            NativeId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for NativeId {
    fn from(s: &str) -> Self {
        NativeId::Text(s.to_string())
    }
}

impl From<u64> for NativeId {
    fn from(n: u64) -> Self {
        NativeId::Number(n.into())
    }
}

/// An icon as returned by the search API.
///
/// Fields this crate does not interpret are kept in `extra`, so a record
/// stored as a favorite serializes back with everything the upstream sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IconRecord {
    #[serde(default, alias = "icon_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<NativeId>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, alias = "rasterSizes", skip_serializing_if = "Vec::is_empty")]
    pub raster_sizes: Vec<RasterSize>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One rendered pixel size of an icon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RasterSize {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(default)]
    pub formats: Vec<IconFormat>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IconFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, alias = "previewUrl", skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IconRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<NativeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_preview(mut self, size: u32, preview_url: impl Into<String>) -> Self {
        self.raster_sizes.push(RasterSize {
            size: Some(size),
            formats: vec![IconFormat {
                format: Some("png".to_string()),
                preview_url: Some(preview_url.into()),
                extra: Map::new(),
            }],
            extra: Map::new(),
        });
        self
    }

    pub fn first_tag(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }

    /// Preview URL of the largest raster size.
    ///
    /// Upstream lists raster sizes in ascending order, so the last entry is
    /// taken, and within it the first format.
    pub fn preview_url(&self) -> Option<&str> {
        self.raster_sizes
            .last()?
            .formats
            .first()?
            .preview_url
            .as_deref()
    }

    /// Name to show in listings, falling back to the first tag.
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else {
            self.first_tag().unwrap_or("Untitled icon")
        }
    }
}
