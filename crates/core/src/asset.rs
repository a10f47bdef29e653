//! Asset reference model.
//!
//! An asset row tracks one externally stored media object referenced by a
//! document. Rows move `active -> pending_delete -> tombstoned`; the last
//! step is a separate flag owned by the sweeper, never a status value.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// How a document references an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Referenced from a post body.
    Inline,
    /// A post's cover image.
    Cover,
    /// Referenced from the about page body.
    About,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Cover => "cover",
            Self::About => "about",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inline" => Ok(Self::Inline),
            "cover" => Ok(Self::Cover),
            "about" => Ok(Self::About),
            other => Err(Error::InvalidAssetKind(other.to_string())),
        }
    }
}

/// Lifecycle status of a live (non-tombstoned) asset row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    Active,
    PendingDelete,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::PendingDelete => "pending_delete",
        }
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "pending_delete" => Ok(Self::PendingDelete),
            other => Err(Error::InvalidAssetStatus(other.to_string())),
        }
    }
}

/// Owner of a group of asset rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetScope {
    /// Assets belonging to one post.
    Post(Uuid),
    /// The singleton about page; stored with a NULL owner.
    Global,
}

impl AssetScope {
    /// Owning post id, or `None` for the global scope.
    pub fn post_id(&self) -> Option<Uuid> {
        match self {
            Self::Post(id) => Some(*id),
            Self::Global => None,
        }
    }
}

impl From<Option<Uuid>> for AssetScope {
    fn from(owner: Option<Uuid>) -> Self {
        owner.map_or(Self::Global, Self::Post)
    }
}
