//! Part ordering, slug derivation and field validation.

use std::collections::HashSet;

use serde::Deserialize;

use crate::edition::Part;
use crate::error::{CoreError, InvalidPart};

/// A part as submitted by an editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PartInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Derived from the title when blank.
    #[serde(default)]
    pub slug: Option<String>,
    /// Submitted position; parts without one keep their list position.
    #[serde(default)]
    pub order: Option<i32>,
}

impl PartInput {
    pub fn new(title: &str, body: &str, slug: Option<&str>) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
            slug: slug.map(str::to_string),
            order: None,
        }
    }
}

impl From<&Part> for PartInput {
    fn from(part: &Part) -> Self {
        Self {
            title: part.title.clone(),
            body: part.body.clone(),
            slug: Some(part.slug.clone()),
            order: Some(part.order),
        }
    }
}

// ---------------------------------------------------------------------------
// Slugs
// ---------------------------------------------------------------------------

/// Generate a URL-safe slug from a part title.
///
/// Transliterates to ASCII, lowercases, replaces anything but ASCII
/// alphanumerics with hyphens, collapses runs of hyphens and trims them from
/// both ends.
pub fn generate_slug(title: &str) -> String {
    let ascii = deunicode::deunicode(title);
    let mut result = String::with_capacity(ascii.len());
    let mut prev_hyphen = false;
    for c in ascii.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c);
            prev_hyphen = false;
        } else if !prev_hyphen {
            result.push('-');
            prev_hyphen = true;
        }
    }
    result.trim_matches('-').to_string()
}

/// First of `base`, `base-2`, `base-3`, ... not already in `taken`.
pub fn unique_slug(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

fn is_valid_slug(slug: &str) -> bool {
    slug.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Turn submitted parts into the stored part list.
///
/// Parts are stably sorted by submitted order, renumbered `1..=n`, and
/// blank slugs are derived from titles, suffixed until unique among the
/// edition's slugs. Parts left out of `inputs` are simply gone.
pub fn normalize_parts(inputs: &[PartInput]) -> Vec<Part> {
    let mut indexed: Vec<(usize, &PartInput)> = inputs.iter().enumerate().collect();
    indexed.sort_by_key(|(position, input)| (input.order.unwrap_or(*position as i32 + 1), *position));

    let mut taken: HashSet<String> = inputs
        .iter()
        .filter_map(|p| p.slug.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    indexed
        .into_iter()
        .enumerate()
        .map(|(index, (_, input))| {
            let explicit = input.slug.as_deref().map(str::trim).unwrap_or_default();
            let slug = if explicit.is_empty() {
                let base = generate_slug(&input.title);
                if base.is_empty() {
                    base
                } else {
                    let slug = unique_slug(&base, &taken);
                    taken.insert(slug.clone());
                    slug
                }
            } else {
                explicit.to_string()
            };
            Part {
                title: input.title.trim().to_string(),
                slug,
                body: input.body.clone(),
                order: index as i32 + 1,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check every part has a title, body and a unique, well-formed slug.
///
/// Reports all failing parts at once.
pub fn validate_parts(parts: &[Part]) -> Result<(), CoreError> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut invalid = Vec::new();

    for (index, part) in parts.iter().enumerate() {
        let mut errors = Vec::new();
        if part.title.trim().is_empty() {
            errors.push("title can't be blank".to_string());
        }
        if part.body.trim().is_empty() {
            errors.push("body can't be blank".to_string());
        }
        if part.slug.is_empty() {
            errors.push("slug can't be blank".to_string());
        } else if !is_valid_slug(&part.slug) {
            errors.push("slug must contain only lowercase letters, digits and hyphens".to_string());
        } else if !seen.insert(part.slug.as_str()) {
            errors.push(format!("slug '{}' is already used by another part", part.slug));
        }

        if !errors.is_empty() {
            invalid.push(InvalidPart {
                position: index + 1,
                title: part.title.clone(),
                errors,
            });
        }
    }

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(CoreError::InvalidParts(invalid))
    }
}
