use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::icon::{IconRecord, NativeId};

/// Token used in place of an empty icon name.
pub const NAME_FALLBACK: &str = "icon";
/// Token used in place of a missing first tag.
pub const TAG_FALLBACK: &str = "untagged";

/// Key of one icon within the favorites store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteId(String);

impl FavoriteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FavoriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FavoriteId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FavoriteId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FavoriteId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Suffix that separates synthesized ids of records sharing a name and tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disambiguator {
    /// Position of the record in the list being rendered.
    Index(usize),
    /// Milliseconds since the Unix epoch at resolution time.
    Timestamp(i64),
}

impl fmt::Display for Disambiguator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disambiguator::Index(i) => write!(f, "{}", i),
            Disambiguator::Timestamp(ms) => write!(f, "{}", ms),
        }
    }
}

/// Source of epoch milliseconds for [`IdResolver::Timestamp`].
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Strategy for deriving a [`FavoriteId`] from an icon record.
///
/// Records with a native id always resolve to it. The strategies only differ
/// for records without one:
///
/// - `Positional` appends the list index (0 when none is given). Resolving
///   the same record at the same position always yields the same id.
/// - `Timestamp` appends the current time. Two resolutions of the same record
///   generally disagree, which breaks toggling; it is kept so that behavior
///   can be reproduced and tested, and is never used by the server.
#[derive(Clone, Default)]
pub enum IdResolver {
    #[default]
    Positional,
    Timestamp(Clock),
}

impl fmt::Debug for IdResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdResolver::Positional => f.write_str("Positional"),
            IdResolver::Timestamp(_) => f.write_str("Timestamp(..)"),
        }
    }
}

impl IdResolver {
    /// Timestamp resolver reading the system clock.
    pub fn system_timestamp() -> Self {
        IdResolver::Timestamp(Arc::new(current_epoch_ms))
    }

    pub fn resolve(&self, record: &IconRecord, index: Option<usize>) -> FavoriteId {
        if let Some(id) = native_id(record) {
            return id;
        }
        let disambiguator = match self {
            IdResolver::Positional => Disambiguator::Index(index.unwrap_or(0)),
            IdResolver::Timestamp(clock) => Disambiguator::Timestamp(clock()),
        };
        synthesize(record, disambiguator)
    }
}

/// The record's own id as a [`FavoriteId`], if it carries a non-empty one.
pub fn native_id(record: &IconRecord) -> Option<FavoriteId> {
    match record.id.as_ref()? {
        NativeId::Text(s) if s.is_empty() => None,
        id => Some(FavoriteId(id.to_string())),
    }
}

/// Build `{name}-{first tag}-{disambiguator}` with fallback tokens.
pub fn synthesize(record: &IconRecord, disambiguator: Disambiguator) -> FavoriteId {
    let name = if record.name.is_empty() {
        NAME_FALLBACK
    } else {
        &record.name
    };
    let tag = record
        .first_tag()
        .filter(|t| !t.is_empty())
        .unwrap_or(TAG_FALLBACK);
    FavoriteId(format!("{}-{}-{}", name, tag, disambiguator))
}

/// Get current time as milliseconds since Unix epoch.
pub fn current_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
