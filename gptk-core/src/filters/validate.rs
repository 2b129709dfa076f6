use gptk_model::{Filter, Source, SourceKind};

use super::extended::compile;
use crate::{
    actions::Action,
    error::ConfigError,
    window::{Edge, parse_boundary},
};

/// Rejects run configurations that cannot be carried out. Runs before the
/// run state is entered and before any remote call.
pub fn validate(
    source: &Source,
    filter: &Filter,
    action: Option<&Action>,
) -> Result<(), ConfigError> {
    validate_filter(filter)?;
    validate_source(source)?;
    if let Some(action) = action {
        validate_action(source.kind(), action)?;
    }
    Ok(())
}

pub fn validate_filter(filter: &Filter) -> Result<(), ConfigError> {
    if let Some(pattern) = &filter.file_name_regex {
        compile("file name", pattern)?;
    }
    if let Some(pattern) = &filter.description_regex {
        compile("description", pattern)?;
    }

    if let (Some(lower), Some(upper)) = (filter.lower_boundary_size, filter.higher_boundary_size)
        && lower > upper
    {
        return Err(ConfigError::InvertedSizeBounds { lower, upper });
    }

    let lower = parse_boundary(filter.lower_boundary_date.as_deref(), Edge::Lower);
    let upper = parse_boundary(filter.higher_boundary_date.as_deref(), Edge::Upper);
    if let (Some(lower_ms), Some(upper_ms)) = (lower, upper)
        && lower_ms > upper_ms
    {
        return Err(ConfigError::InvertedDateBounds {
            lower: filter.lower_boundary_date.clone().unwrap_or_default(),
            upper: filter.higher_boundary_date.clone().unwrap_or_default(),
        });
    }

    if let Some(threshold) = filter.similarity_threshold
        && !(0.0..=1.0).contains(&threshold)
    {
        return Err(ConfigError::InvalidThreshold(threshold));
    }

    Ok(())
}

fn validate_source(source: &Source) -> Result<(), ConfigError> {
    match source {
        Source::Search { query } if query.trim().is_empty() => {
            Err(ConfigError::MissingTarget("search query"))
        }
        Source::Albums { albums } if albums.is_empty() => {
            Err(ConfigError::MissingTarget("source album"))
        }
        _ => Ok(()),
    }
}

fn validate_action(kind: SourceKind, action: &Action) -> Result<(), ConfigError> {
    match action {
        Action::Restore if kind != SourceKind::Trash => Err(ConfigError::ActionUnavailable {
            action: action.name(),
            kind,
        }),
        Action::Unlock if kind != SourceKind::LockedFolder => {
            Err(ConfigError::ActionUnavailable {
                action: action.name(),
                kind,
            })
        }
        Action::AddToAlbum { album, .. } if album.as_str().trim().is_empty() => {
            Err(ConfigError::MissingTarget("target album"))
        }
        Action::AddToNewAlbum { title, .. } if title.trim().is_empty() => {
            Err(ConfigError::MissingTarget("album title"))
        }
        _ => Ok(()),
    }
}
