//! Reset cadence for custom resource pools.

use serde::{Deserialize, Serialize};

/// When a custom resource refills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetRule {
    #[default]
    None,
    Short,
    Long,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_rules_are_lowercase_strings() {
        assert_eq!(serde_json::to_string(&ResetRule::Short).unwrap(), "\"short\"");
        let r: ResetRule = serde_json::from_str("\"long\"").unwrap();
        assert_eq!(r, ResetRule::Long);
    }
}
