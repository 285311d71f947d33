//! Origin tags for proficiencies, features, and resources.

use serde::{Deserialize, Serialize};

/// Which selection produced a grant. Enables scoped removal when a
/// background, race, or class selection changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SourceTag {
    #[serde(rename = "background")]
    Background,
    #[serde(rename = "race")]
    Race,
    #[serde(rename = "class-primary")]
    ClassPrimary,
    #[serde(rename = "class-secondary")]
    ClassSecondary,
    #[serde(rename = "feat")]
    Feat,
    #[serde(rename = "trait")]
    Trait,
    #[serde(rename = "manual")]
    Manual,
    #[serde(rename = "custom")]
    Custom,
}

impl SourceTag {
    pub fn code(&self) -> &'static str {
        match self {
            SourceTag::Background => "background",
            SourceTag::Race => "race",
            SourceTag::ClassPrimary => "class-primary",
            SourceTag::ClassSecondary => "class-secondary",
            SourceTag::Feat => "feat",
            SourceTag::Trait => "trait",
            SourceTag::Manual => "manual",
            SourceTag::Custom => "custom",
        }
    }
}

impl std::fmt::Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_through_their_persisted_names() {
        for tag in [
            SourceTag::Background,
            SourceTag::Race,
            SourceTag::ClassPrimary,
            SourceTag::Feat,
            SourceTag::Manual,
        ] {
            let json = serde_json::to_string(&tag).unwrap();
            assert_eq!(json, format!("\"{}\"", tag.code()));
            let back: SourceTag = serde_json::from_str(&json).unwrap();
            assert_eq!(back, tag);
        }
    }
}
