//! Source-scoped removal.
//!
//! Every grant carries a [`SourceTag`]; when the selection that produced it
//! changes (new background, new race, a level-up recomputing class grants),
//! [`strip_source`] removes exactly that source's contributions and nothing
//! else. Manually-entered proficiencies survive because they were never
//! attributed to the stripped source.

use crate::character::CharacterRecord;
use crate::value_objects::SourceTag;

/// Removes everything attributed to `source`: features, tool and language
/// entries, custom resource pools, and skill/tool/language attributions.
/// A skill whose attribution is removed steps down one rank, so expertise
/// gained on top of a stripped proficiency degrades to proficient rather
/// than vanishing.
pub fn strip_source(mut record: CharacterRecord, source: SourceTag) -> CharacterRecord {
    record.features.retain(|f| f.source != source);
    record.tool_proficiencies.retain(|x| x.source != source);
    record.language_proficiencies.retain(|x| x.source != source);
    record.resources.custom.retain(|r| r.source != Some(source));

    let stripped: Vec<_> = record
        .prof_sources
        .skills
        .iter()
        .filter(|(_, tag)| **tag == source)
        .map(|(skill, _)| *skill)
        .collect();
    for skill in stripped {
        record.prof_sources.skills.remove(&skill);
        let rank = record.skill_rank(skill);
        record.skills.insert(skill, rank.stepped_down());
    }

    record.prof_sources.tools.retain(|_, tag| *tag != source);
    record.prof_sources.languages.retain(|_, tag| *tag != source);

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{CustomResource, Feature, SourcedValue};
    use crate::value_objects::{ProficiencyRank, ResetRule, Skill};

    fn record_with_background_grants() -> CharacterRecord {
        let mut c = CharacterRecord::default();
        c.features.push(Feature {
            key: "bg:acolyte".into(),
            source: SourceTag::Background,
            name: "Shelter of the Faithful".into(),
            text: String::new(),
            grant_id: None,
        });
        c.features.push(Feature {
            key: "race:tiefling:darkvision".into(),
            source: SourceTag::Race,
            name: "Darkvision".into(),
            text: String::new(),
            grant_id: None,
        });
        c.skills.insert(Skill::Religion, ProficiencyRank::Proficient);
        c.prof_sources
            .skills
            .insert(Skill::Religion, SourceTag::Background);
        c.language_proficiencies.push(SourcedValue {
            value: "Celestial".into(),
            source: SourceTag::Background,
        });
        c
    }

    #[test]
    fn strip_removes_only_the_named_source() {
        let c = strip_source(record_with_background_grants(), SourceTag::Background);
        assert_eq!(c.features.len(), 1);
        assert_eq!(c.features[0].source, SourceTag::Race);
        assert!(c.language_proficiencies.is_empty());
        assert_eq!(c.skill_rank(Skill::Religion), ProficiencyRank::Untrained);
        assert!(!c.prof_sources.skills.contains_key(&Skill::Religion));
    }

    #[test]
    fn expertise_steps_down_to_proficient() {
        let mut c = record_with_background_grants();
        c.skills.insert(Skill::Religion, ProficiencyRank::Expertise);
        let c = strip_source(c, SourceTag::Background);
        assert_eq!(c.skill_rank(Skill::Religion), ProficiencyRank::Proficient);
    }

    #[test]
    fn unattributed_skills_survive() {
        let mut c = record_with_background_grants();
        c.skills.insert(Skill::Arcana, ProficiencyRank::Proficient);
        let c = strip_source(c, SourceTag::Background);
        assert_eq!(c.skill_rank(Skill::Arcana), ProficiencyRank::Proficient);
    }

    #[test]
    fn strip_removes_owned_resource_pools() {
        let mut c = CharacterRecord::default();
        c.resources.custom.push(CustomResource {
            name: "Mystic Arcanum (6th)".into(),
            cur: 1,
            max: 1,
            reset: ResetRule::Long,
            source: Some(SourceTag::ClassPrimary),
        });
        c.resources.custom.push(CustomResource {
            name: "Bardic Dice".into(),
            cur: 2,
            max: 3,
            reset: ResetRule::Long,
            source: None,
        });
        let c = strip_source(c, SourceTag::ClassPrimary);
        assert_eq!(c.resources.custom.len(), 1);
        assert_eq!(c.resources.custom[0].name, "Bardic Dice");
    }
}
