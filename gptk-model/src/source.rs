use crate::keys::AlbumKey;

/// Collection a run reads its candidate items from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "camelCase")
)]
pub enum Source {
    Library,
    Search { query: String },
    Trash,
    LockedFolder,
    Favorites,
    PartnerShared,
    SharedLinks,
    Albums { albums: Vec<AlbumKey> },
}

/// Payload-free tag of a [`Source`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Library,
    Search,
    Trash,
    LockedFolder,
    Favorites,
    PartnerShared,
    SharedLinks,
    Albums,
}

kebab_enum!(SourceKind, "source", {
    Library => "library",
    Search => "search",
    Trash => "trash",
    LockedFolder => "locked-folder",
    Favorites => "favorites",
    PartnerShared => "partner-shared",
    SharedLinks => "shared-links",
    Albums => "albums",
});

impl Source {
    pub fn kind(&self) -> SourceKind {
        match self {
            Source::Library => SourceKind::Library,
            Source::Search { .. } => SourceKind::Search,
            Source::Trash => SourceKind::Trash,
            Source::LockedFolder => SourceKind::LockedFolder,
            Source::Favorites => SourceKind::Favorites,
            Source::PartnerShared => SourceKind::PartnerShared,
            Source::SharedLinks => SourceKind::SharedLinks,
            Source::Albums { .. } => SourceKind::Albums,
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind().as_str())
    }
}
