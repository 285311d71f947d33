//! Value objects shared across the rules engine.
//!
//! Everything here is a small, copyable, serde-round-trippable type with no
//! behavior beyond lookups and conversions. The closed enums exist so rule
//! dispatch happens by pattern match instead of string comparison.

mod ability;
mod die;
mod rank;
mod reset;
mod skill;
mod source;

pub use ability::{ability_modifier, Ability, AbilityScores, SaveProficiencies};
pub use die::DieSize;
pub use rank::ProficiencyRank;
pub use reset::ResetRule;
pub use skill::Skill;
pub use source::SourceTag;

/// Total integer clamp. Never panics: an inverted range collapses to `min`.
///
/// Every numeric field in the character record has a documented domain and is
/// funneled through this on derive, so out-of-range persisted values degrade
/// to the nearest legal value instead of failing the load.
pub fn clamp_int(v: i32, min: i32, max: i32) -> i32 {
    if min > max {
        return min;
    }
    v.min(max).max(min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_int_clamps_both_ends() {
        assert_eq!(clamp_int(-5, 0, 10), 0);
        assert_eq!(clamp_int(15, 0, 10), 10);
        assert_eq!(clamp_int(7, 0, 10), 7);
    }

    #[test]
    fn clamp_int_inverted_range_falls_back_to_min() {
        assert_eq!(clamp_int(5, 10, 0), 10);
    }
}
