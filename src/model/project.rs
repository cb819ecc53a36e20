use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two portfolio sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Architecture,
    Photography,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Architecture, Category::Photography];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Architecture => "architecture",
            Self::Photography => "photography",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "architecture" => Ok(Self::Architecture),
            "photography" => Ok(Self::Photography),
            other => Err(format!(
                "unknown category '{other}' (expected 'architecture' or 'photography')"
            )),
        }
    }
}

/// A portfolio entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub category: Category,
    /// Key of the image shown on the gallery card.
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub long_description: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub project_type: String,
    /// Image keys in display order.
    #[serde(default)]
    pub images: Vec<String>,
    /// Position within the category; sequential after a reorder.
    pub rank: i64,
}

impl Project {
    /// URL slug derived from the title (`"Cedar House"` → `"cedar-house"`).
    #[must_use]
    pub fn slug(&self) -> String {
        crate::utils::slugify(&self.title)
    }

    /// All image keys this project points at, thumbnail first, without
    /// duplicates.
    #[must_use]
    pub fn referenced_images(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::with_capacity(self.images.len() + 1);
        for key in self.thumbnail.iter().chain(self.images.iter()) {
            if !keys.contains(&key.as_str()) {
                keys.push(key);
            }
        }
        keys
    }
}

/// Editable project fields, as submitted by the admin UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDraft {
    #[serde(default)]
    pub title: String,
    pub category: Category,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub long_description: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub project_type: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl ProjectDraft {
    /// Builds the stored project from this draft.
    #[must_use]
    pub fn into_project(self, id: i64, rank: i64) -> Project {
        Project {
            id,
            title: self.title.trim().to_string(),
            category: self.category,
            thumbnail: self.thumbnail.filter(|t| !t.trim().is_empty()),
            short_description: self.short_description,
            long_description: self.long_description,
            year: self.year,
            location: self.location,
            project_type: self.project_type,
            images: self.images,
            rank,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(title: &str) -> Project {
        ProjectDraft {
            title: title.to_string(),
            category: Category::Architecture,
            thumbnail: Some("a".to_string()),
            short_description: String::new(),
            long_description: String::new(),
            year: String::new(),
            location: String::new(),
            project_type: String::new(),
            images: vec!["a".to_string(), "b".to_string()],
        }
        .into_project(1, 0)
    }

    #[test]
    fn test_slug() {
        assert_eq!(project("Cedar House").slug(), "cedar-house");
        assert_eq!(project("  Loft / Studio 2 ").slug(), "loft-studio-2");
    }

    #[test]
    fn test_referenced_images_dedupes() {
        assert_eq!(project("x").referenced_images(), vec!["a", "b"]);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("Architecture".parse::<Category>(), Ok(Category::Architecture));
        assert!("interiors".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serde_lowercase() {
        let json = serde_json::to_string(&Category::Photography).unwrap();
        assert_eq!(json, "\"photography\"");
    }
}
