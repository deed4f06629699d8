//! Detail view-model for a single catalog entry: normalized description
//! paragraphs, metadata labels, and the volume list.

use crate::catalog::CatalogEntry;

const DEFAULT_VOLUME_DATES: &[&str] = &[
    "October 1, 2025",
    "November 5, 2025",
    "December 3, 2025",
    "January 7, 2026",
    "February 4, 2026",
    "March 4, 2026",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    pub id: String,
    pub title: String,
    pub date: String,
    pub archive: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub title: String,
    pub paragraphs: Vec<String>,
    pub genres: Vec<String>,
    pub author: String,
    pub age_rating: String,
    pub status: String,
    pub rating_label: String,
    pub volumes: Vec<Volume>,
}

impl DetailView {
    pub fn from_entry(entry: &CatalogEntry) -> Self {
        Self {
            title: entry.title.clone(),
            paragraphs: normalize_paragraphs(entry),
            genres: if entry.genres.is_empty() {
                vec!["Manga".to_string()]
            } else {
                entry.genres.clone()
            },
            author: or_default(&entry.author, "Unknown"),
            age_rating: or_default(&entry.age_rating, "18+"),
            status: or_default(&entry.status, "Ongoing"),
            rating_label: rating_label(entry),
            volumes: normalize_volumes(entry),
        }
    }
}

fn or_default(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

fn rating_label(entry: &CatalogEntry) -> String {
    match (entry.rating, entry.rating_count) {
        (Some(rating), Some(count)) => format!("{rating} ({count} reviews)"),
        (Some(rating), None) => rating.to_string(),
        _ => "4.8".to_string(),
    }
}

fn normalize_paragraphs(entry: &CatalogEntry) -> Vec<String> {
    if !entry.long_description.is_empty() {
        return entry.long_description.clone();
    }
    let paragraphs: Vec<String> = entry
        .description
        .split("\n\n")
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect();
    if paragraphs.is_empty() {
        vec!["Description coming soon.".to_string()]
    } else {
        paragraphs
    }
}

fn normalize_volumes(entry: &CatalogEntry) -> Vec<Volume> {
    if !entry.volumes.is_empty() {
        return entry
            .volumes
            .iter()
            .enumerate()
            .map(|(index, spec)| Volume {
                id: or_default(&spec.id, &format!("v{}", index + 1)),
                title: or_default(&spec.title, &format!("Volume {}", index + 1)),
                date: spec.date.clone(),
                archive: or_default(&spec.archive, &entry.archive),
            })
            .collect();
    }

    // Entries without an explicit volume list get the stock scaffold, all
    // pointing at the entry archive.
    DEFAULT_VOLUME_DATES
        .iter()
        .enumerate()
        .map(|(index, date)| Volume {
            id: format!("v{}", index + 1),
            title: format!("Volume {}", index + 1),
            date: (*date).to_string(),
            archive: entry.archive.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::VolumeSpec;

    fn entry() -> CatalogEntry {
        CatalogEntry {
            id: "petal-storm".to_string(),
            title: "Petal Storm".to_string(),
            archive: "petal-storm/v1.cbz".to_string(),
            thumbnail: "thumb.png".to_string(),
            groups: vec![],
            genres: vec![],
            description: String::new(),
            long_description: vec![],
            author: String::new(),
            age_rating: String::new(),
            status: String::new(),
            rating: None,
            rating_count: None,
            volumes: vec![],
        }
    }

    #[test]
    fn empty_entry_gets_stock_metadata() {
        let view = DetailView::from_entry(&entry());
        assert_eq!(view.author, "Unknown");
        assert_eq!(view.age_rating, "18+");
        assert_eq!(view.status, "Ongoing");
        assert_eq!(view.rating_label, "4.8");
        assert_eq!(view.genres, vec!["Manga"]);
        assert_eq!(view.paragraphs, vec!["Description coming soon."]);
    }

    #[test]
    fn description_splits_on_blank_lines() {
        let mut e = entry();
        e.description = "First part.\n\nSecond part.\n\n\n".to_string();
        let view = DetailView::from_entry(&e);
        assert_eq!(view.paragraphs, vec!["First part.", "Second part."]);
    }

    #[test]
    fn long_description_wins_over_description() {
        let mut e = entry();
        e.description = "short".to_string();
        e.long_description = vec!["a".to_string(), "b".to_string()];
        let view = DetailView::from_entry(&e);
        assert_eq!(view.paragraphs, vec!["a", "b"]);
    }

    #[test]
    fn default_volume_scaffold_points_at_the_entry_archive() {
        let view = DetailView::from_entry(&entry());
        assert_eq!(view.volumes.len(), 6);
        assert_eq!(view.volumes[0].title, "Volume 1");
        assert!(view.volumes.iter().all(|v| v.archive == "petal-storm/v1.cbz"));
    }

    #[test]
    fn declared_volumes_fill_in_missing_fields() {
        let mut e = entry();
        e.volumes = vec![
            VolumeSpec {
                id: String::new(),
                title: String::new(),
                date: "May 2026".to_string(),
                archive: String::new(),
            },
            VolumeSpec {
                id: "special".to_string(),
                title: "Omake".to_string(),
                date: String::new(),
                archive: "petal-storm/omake.cbz".to_string(),
            },
        ];
        let view = DetailView::from_entry(&e);
        assert_eq!(view.volumes[0].id, "v1");
        assert_eq!(view.volumes[0].title, "Volume 1");
        assert_eq!(view.volumes[0].archive, "petal-storm/v1.cbz");
        assert_eq!(view.volumes[1].title, "Omake");
        assert_eq!(view.volumes[1].archive, "petal-storm/omake.cbz");
    }

    #[test]
    fn rating_label_includes_review_count_when_present() {
        let mut e = entry();
        e.rating = Some(4.6);
        e.rating_count = Some(210);
        assert_eq!(DetailView::from_entry(&e).rating_label, "4.6 (210 reviews)");
        e.rating_count = None;
        assert_eq!(DetailView::from_entry(&e).rating_label, "4.6");
    }
}
