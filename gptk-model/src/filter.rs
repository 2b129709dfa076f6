//! User-facing filter configuration.
//!
//! Every criterion is optional and independent of the others. The filter chain
//! in `gptk-core` applies whatever is set; contradictory combinations are
//! rejected there by validation, not by construction here.

use crate::keys::AlbumKey;

/// Which timestamp a date window applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum DateType {
    #[default]
    Taken,
    Uploaded,
}

/// Whether a window keeps what falls inside it or what falls outside it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum IntervalType {
    #[default]
    Include,
    Exclude,
}

/// Regex match semantics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum MatchType {
    #[default]
    Include,
    Exclude,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum MediaTypeFilter {
    #[default]
    All,
    Image,
    Video,
    #[cfg_attr(feature = "serde", serde(rename = "live"))]
    LivePhoto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Quality {
    Original,
    StorageSaver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum SpaceConsumption {
    Consuming,
    NonConsuming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum UploadStatus {
    Full,
    Partial,
}

/// Flat record of optional criteria.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct Filter {
    pub date_type: DateType,
    /// `YYYY-MM-DD` or RFC 3339. Unparseable values count as unbounded.
    pub lower_boundary_date: Option<String>,
    pub higher_boundary_date: Option<String>,
    pub interval_type: IntervalType,
    /// Bytes.
    pub lower_boundary_size: Option<u64>,
    pub higher_boundary_size: Option<u64>,
    pub file_name_regex: Option<String>,
    pub file_name_match_type: MatchType,
    pub description_regex: Option<String>,
    pub description_match_type: MatchType,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub media_type: MediaTypeFilter,
    pub quality: Option<Quality>,
    pub space: Option<SpaceConsumption>,
    pub archived: Option<bool>,
    pub favorite: Option<bool>,
    pub owned: Option<bool>,
    pub upload_status: Option<UploadStatus>,
    pub exclude_albums: Vec<AlbumKey>,
    pub exclude_shared: bool,
    /// Group near-duplicates and keep only members of groups with a partner.
    pub similarity_threshold: Option<f64>,
    /// Thumbnail height requested for hashing; also fixes the hash size.
    pub image_height: Option<u32>,
    pub sort_by_size: bool,
}

impl Filter {
    pub fn has_date_bounds(&self) -> bool {
        self.lower_boundary_date.is_some() || self.higher_boundary_date.is_some()
    }

    pub fn has_size_bounds(&self) -> bool {
        self.lower_boundary_size.is_some() || self.higher_boundary_size.is_some()
    }

    /// Criteria that read fields only the bulk info lookup provides.
    pub fn needs_enrichment(&self) -> bool {
        self.file_name_regex.is_some()
            || self.description_regex.is_some()
            || self.has_size_bounds()
            || self.quality.is_some()
            || self.space.is_some()
            || self.sort_by_size
    }
}

kebab_enum!(DateType, "date type", { Taken => "taken", Uploaded => "uploaded" });
kebab_enum!(IntervalType, "interval type", { Include => "include", Exclude => "exclude" });
kebab_enum!(MatchType, "match type", { Include => "include", Exclude => "exclude" });
kebab_enum!(MediaTypeFilter, "media type", {
    All => "all",
    Image => "image",
    Video => "video",
    LivePhoto => "live",
});
kebab_enum!(Quality, "quality", { Original => "original", StorageSaver => "storage-saver" });
kebab_enum!(SpaceConsumption, "space consumption", {
    Consuming => "consuming",
    NonConsuming => "non-consuming",
});
kebab_enum!(UploadStatus, "upload status", { Full => "full", Partial => "partial" });

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_needs_nothing() {
        let filter = Filter::default();
        assert!(!filter.has_date_bounds());
        assert!(!filter.needs_enrichment());
    }

    #[test]
    fn size_sort_forces_enrichment() {
        let filter = Filter {
            sort_by_size: true,
            ..Filter::default()
        };
        assert!(filter.needs_enrichment());
    }

    #[test]
    fn enum_names_round_through_from_str() {
        assert_eq!("storage-saver".parse(), Ok(Quality::StorageSaver));
        assert_eq!("LIVE".parse(), Ok(MediaTypeFilter::LivePhoto));
        assert!("sometimes".parse::<UploadStatus>().is_err());
    }
}
