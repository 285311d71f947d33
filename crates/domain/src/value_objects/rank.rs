//! Skill proficiency ranks.

use serde::{Deserialize, Serialize};

/// Proficiency level for a skill, persisted as 0/1/2.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(from = "u8", into = "u8")]
pub enum ProficiencyRank {
    #[default]
    Untrained,
    Proficient,
    Expertise,
}

impl ProficiencyRank {
    pub fn is_trained(&self) -> bool {
        !matches!(self, ProficiencyRank::Untrained)
    }

    /// One step down. Expertise gained elsewhere survives a single strip.
    pub fn stepped_down(self) -> ProficiencyRank {
        match self {
            ProficiencyRank::Expertise => ProficiencyRank::Proficient,
            _ => ProficiencyRank::Untrained,
        }
    }
}

impl From<u8> for ProficiencyRank {
    fn from(v: u8) -> Self {
        match v {
            0 => ProficiencyRank::Untrained,
            1 => ProficiencyRank::Proficient,
            _ => ProficiencyRank::Expertise,
        }
    }
}

impl From<ProficiencyRank> for u8 {
    fn from(r: ProficiencyRank) -> Self {
        match r {
            ProficiencyRank::Untrained => 0,
            ProficiencyRank::Proficient => 1,
            ProficiencyRank::Expertise => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_persist_as_integers() {
        assert_eq!(
            serde_json::to_string(&ProficiencyRank::Expertise).unwrap(),
            "2"
        );
        let r: ProficiencyRank = serde_json::from_str("1").unwrap();
        assert_eq!(r, ProficiencyRank::Proficient);
    }

    #[test]
    fn out_of_range_rank_clamps_to_expertise() {
        let r: ProficiencyRank = serde_json::from_str("9").unwrap();
        assert_eq!(r, ProficiencyRank::Expertise);
    }

    #[test]
    fn step_down_is_one_step_only() {
        assert_eq!(
            ProficiencyRank::Expertise.stepped_down(),
            ProficiencyRank::Proficient
        );
        assert_eq!(
            ProficiencyRank::Proficient.stepped_down(),
            ProficiencyRank::Untrained
        );
        assert_eq!(
            ProficiencyRank::Untrained.stepped_down(),
            ProficiencyRank::Untrained
        );
    }
}
