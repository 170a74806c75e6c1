//! Stage registry: the ordered, build-time list of wizard milestones.
//!
//! Stage keys double as the persistence keys a resumed session matches
//! against, so they never change once shipped.

use serde::{Deserialize, Serialize};

/// A named milestone in the signup flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Zipcode,
    Address,
    Plan,
    Billing,
    SecurityQuestions,
    PromonInfo,
    PromonPermit,
    PromonTestCall,
}

/// Signup registry, in traversal order
pub const SIGNUP_STAGES: &[Stage] = &[
    Stage::Zipcode,
    Stage::Address,
    Stage::Plan,
    Stage::Billing,
    Stage::SecurityQuestions,
    Stage::PromonInfo,
    Stage::PromonPermit,
    Stage::PromonTestCall,
];

impl Stage {
    /// The stage's persistence key
    pub fn key(self) -> &'static str {
        match self {
            Stage::Zipcode => "web:zipcode",
            Stage::Address => "web:address",
            Stage::Plan => "web:plan",
            Stage::Billing => "web:billing",
            Stage::SecurityQuestions => "web:security-questions",
            Stage::PromonInfo => "web:promon.info",
            Stage::PromonPermit => "web:promon.permit",
            Stage::PromonTestCall => "web:promon.test-call",
        }
    }

    pub fn from_key(key: &str) -> Option<Stage> {
        SIGNUP_STAGES.iter().copied().find(|s| s.key() == key)
    }

    pub fn title(self) -> &'static str {
        match self {
            Stage::Zipcode => "Your ZIP code",
            Stage::Address => "Home address",
            Stage::Plan => "Service plan",
            Stage::Billing => "Billing",
            Stage::SecurityQuestions => "Security questions & PIN",
            Stage::PromonInfo => "About professional monitoring",
            Stage::PromonPermit => "Alarm permit",
            Stage::PromonTestCall => "Test call",
        }
    }

    /// Position in the registry (order is implicit by position)
    pub fn order(self) -> Option<usize> {
        SIGNUP_STAGES.iter().position(|s| *s == self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_unique_and_round_trip() {
        for (i, stage) in SIGNUP_STAGES.iter().enumerate() {
            assert_eq!(Stage::from_key(stage.key()), Some(*stage));
            assert_eq!(stage.order(), Some(i));
        }
        assert_eq!(Stage::from_key("web:unknown"), None);
    }

    #[test]
    fn test_promon_stages_follow_security_questions() {
        let promon_start = Stage::PromonInfo.order().unwrap();
        assert!(Stage::SecurityQuestions.order().unwrap() < promon_start);
        assert_eq!(Stage::PromonPermit.order().unwrap(), promon_start + 1);
        assert_eq!(Stage::PromonTestCall.order().unwrap(), promon_start + 2);
    }
}
