//! Library catalog: a JSON file listing comic entries and optional section
//! groupings. Entries are sanitized on load; malformed ones are dropped
//! rather than failing the whole catalog.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::errors::CatalogError;

pub const FALLBACK_THUMBNAIL: &str = "assets/thumbnails/placeholder.svg";

#[derive(Debug, Default, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    manga: Vec<serde_json::Value>,
    #[serde(default)]
    sections: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawEntry {
    id: String,
    title: String,
    archive: String,
    thumbnail: String,
    groups: Vec<String>,
    genres: Vec<String>,
    description: String,
    long_description: Vec<String>,
    author: String,
    age_rating: String,
    status: String,
    rating: Option<f64>,
    rating_count: Option<u32>,
    volumes: Vec<VolumeSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawSection {
    id: String,
    title: String,
}

/// Declared volume of an entry; all fields optional in the JSON.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct VolumeSpec {
    pub id: String,
    pub title: String,
    pub date: String,
    pub archive: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub id: String,
    pub title: String,
    pub archive: String,
    pub thumbnail: String,
    pub groups: Vec<String>,
    pub genres: Vec<String>,
    pub description: String,
    pub long_description: Vec<String>,
    pub author: String,
    pub age_rating: String,
    pub status: String,
    pub rating: Option<f64>,
    pub rating_count: Option<u32>,
    pub volumes: Vec<VolumeSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub entries: Vec<CatalogEntry>,
    pub sections: Vec<Section>,
}

impl Catalog {
    pub fn entry(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn entries_in_section<'a>(&'a self, section_id: &str) -> Vec<&'a CatalogEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.groups.iter().any(|group| group == section_id))
            .collect()
    }
}

fn trimmed(value: &str) -> String {
    value.trim().to_string()
}

fn trimmed_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| trimmed(v))
        .filter(|v| !v.is_empty())
        .collect()
}

/// Entries missing an id, title, or archive are rejected.
fn sanitize_entry(value: &serde_json::Value) -> Option<CatalogEntry> {
    let raw: RawEntry = serde_json::from_value(value.clone()).ok()?;

    let id = trimmed(&raw.id);
    let title = trimmed(&raw.title);
    let archive = trimmed(&raw.archive);
    if id.is_empty() || title.is_empty() || archive.is_empty() {
        return None;
    }

    let thumbnail = trimmed(&raw.thumbnail);
    Some(CatalogEntry {
        id,
        title,
        archive,
        thumbnail: if thumbnail.is_empty() {
            FALLBACK_THUMBNAIL.to_string()
        } else {
            thumbnail
        },
        groups: trimmed_list(&raw.groups),
        genres: trimmed_list(&raw.genres),
        description: trimmed(&raw.description),
        long_description: trimmed_list(&raw.long_description),
        author: trimmed(&raw.author),
        age_rating: trimmed(&raw.age_rating),
        status: trimmed(&raw.status),
        rating: raw.rating,
        rating_count: raw.rating_count,
        volumes: raw.volumes,
    })
}

fn sanitize_section(value: &serde_json::Value) -> Option<Section> {
    let raw: RawSection = serde_json::from_value(value.clone()).ok()?;
    let id = trimmed(&raw.id);
    let title = trimmed(&raw.title);
    if id.is_empty() || title.is_empty() {
        return None;
    }
    Some(Section { id, title })
}

/// "slice-of-life" / "slice_of_life" -> "Slice Of Life".
fn title_case_group(group_id: &str) -> String {
    group_id
        .replace(['-', '_'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn parse_catalog(json: &str, path_label: &str) -> Result<Catalog, CatalogError> {
    let raw: RawCatalog = serde_json::from_str(json).map_err(|source| CatalogError::Parse {
        path: path_label.to_string(),
        source,
    })?;

    let dropped = raw
        .manga
        .iter()
        .filter(|value| sanitize_entry(value).is_none())
        .count();
    if dropped > 0 {
        debug!("dropped {dropped} malformed catalog entries");
    }

    let entries: Vec<CatalogEntry> = raw.manga.iter().filter_map(sanitize_entry).collect();
    if entries.is_empty() {
        return Err(CatalogError::Empty {
            path: path_label.to_string(),
        });
    }

    let mut sections: Vec<Section> = raw.sections.iter().filter_map(sanitize_section).collect();

    // Groups referenced by entries but not declared get discovered sections
    // with a readable name derived from the id.
    let mut known: HashSet<String> = sections.iter().map(|s| s.id.clone()).collect();
    for entry in &entries {
        for group in &entry.groups {
            if known.insert(group.clone()) {
                sections.push(Section {
                    id: group.clone(),
                    title: title_case_group(group),
                });
            }
        }
    }

    Ok(Catalog { entries, sections })
}

pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let label = path.display().to_string();
    let json = fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: label.clone(),
        source,
    })?;
    parse_catalog(&json, &label)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "manga": [
            {
                "id": "petal-storm",
                "title": "  Petal Storm  ",
                "archive": "petal-storm/v1.cbz",
                "groups": ["new-releases", "action"],
                "genres": ["Action", " ", "Drama"]
            },
            {
                "id": "",
                "title": "Broken",
                "archive": "broken.cbz"
            },
            {
                "id": "moon-court",
                "title": "Moon Court",
                "archive": "moon-court/v1.cbz",
                "thumbnail": "moon.png",
                "groups": ["new-releases"]
            },
            42
        ],
        "sections": [
            { "id": "new-releases", "title": "New Releases" },
            { "id": "", "title": "Nameless" }
        ]
    }"#;

    #[test]
    fn entries_are_sanitized_and_malformed_ones_dropped() {
        let catalog = parse_catalog(SAMPLE, "catalog.json").unwrap();
        assert_eq!(catalog.entries.len(), 2);

        let petal = &catalog.entries[0];
        assert_eq!(petal.title, "Petal Storm");
        assert_eq!(petal.thumbnail, FALLBACK_THUMBNAIL);
        assert_eq!(petal.genres, vec!["Action", "Drama"]);

        assert_eq!(catalog.entries[1].thumbnail, "moon.png");
    }

    #[test]
    fn undeclared_groups_become_discovered_sections() {
        let catalog = parse_catalog(SAMPLE, "catalog.json").unwrap();
        let ids: Vec<&str> = catalog.sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["new-releases", "action"]);
        assert_eq!(catalog.sections[1].title, "Action");
    }

    #[test]
    fn discovered_section_titles_are_title_cased() {
        assert_eq!(title_case_group("slice-of-life"), "Slice Of Life");
        assert_eq!(title_case_group("staff_picks"), "Staff Picks");
    }

    #[test]
    fn section_membership_lookup() {
        let catalog = parse_catalog(SAMPLE, "catalog.json").unwrap();
        let in_new = catalog.entries_in_section("new-releases");
        assert_eq!(in_new.len(), 2);
        assert_eq!(catalog.entries_in_section("action").len(), 1);
        assert!(catalog.entry("moon-court").is_some());
        assert!(catalog.entry("nope").is_none());
    }

    #[test]
    fn all_entries_invalid_is_a_distinct_error() {
        let json = r#"{ "manga": [ { "title": "no id or archive" } ] }"#;
        let err = parse_catalog(json, "catalog.json").unwrap_err();
        assert!(matches!(err, CatalogError::Empty { .. }));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = parse_catalog("{", "catalog.json").unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));
    }
}
