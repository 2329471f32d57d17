//! Content cues that decide which capabilities a query needs

use crate::agents::capability::{EVIDENCE_CHECKER, MATH_VALIDATOR};

/// Words that mark a query as numeric even without digits
const STRONG_NUMERIC_CUES: &[&str] = &[
    "percent",
    "percentage",
    "statistic",
    "statistics",
    "statistical",
    "average",
    "median",
    "probability",
    "calculate",
    "calculation",
];

/// Words that mark digits in a query as quantities
const NUMERIC_CUES: &[&str] = &[
    "mean", "ratio", "rate", "sum", "total", "thousand", "million", "billion", "trillion",
    "half", "double", "twice", "triple", "times", "increase", "increased", "decrease",
    "decreased", "equals", "multiplied", "divided", "plus", "minus",
];

const VERIFICATION_CUES: &[&str] = &[
    "fact-check",
    "fact check",
    "verify",
    "verification",
    "is it true",
    "is this true",
    "is that true",
    "check if",
    "true or false",
    "confirm",
    "evidence",
    "source",
    "sources",
    "debunk",
    "misinformation",
    "disinformation",
    "fake news",
];

/// Capabilities a query calls for, judged from its wording
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoutingPlan {
    /// Numerical or statistical language is present
    pub numeric: bool,
    /// The caller asks for external verification
    pub verification: bool,
}

impl RoutingPlan {
    pub fn from_query(query: &str) -> Self {
        let lower = query.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !(c.is_alphanumeric() || c == '-'))
            .filter(|w| !w.is_empty())
            .collect();
        let has_word = |cue: &str| words.iter().any(|w| *w == cue);

        let has_digit = query.chars().any(|c| c.is_ascii_digit());
        let has_symbol = query.contains('%') || has_arithmetic(query);

        let numeric = STRONG_NUMERIC_CUES.iter().any(|cue| has_word(cue))
            || (has_digit && (has_symbol || NUMERIC_CUES.iter().any(|cue| has_word(cue))));

        let verification = VERIFICATION_CUES.iter().any(|cue| {
            if cue.contains(' ') {
                lower.contains(cue)
            } else {
                has_word(cue)
            }
        });

        Self {
            numeric,
            verification,
        }
    }

    /// Capability names this plan requires
    pub fn required(&self) -> Vec<&'static str> {
        let mut required = Vec::new();
        if self.numeric {
            required.push(MATH_VALIDATOR);
        }
        if self.verification {
            required.push(EVIDENCE_CHECKER);
        }
        required
    }

    /// Routing notes for the supervisor, limited to capabilities on offer
    pub fn guidance(&self, available: &[&str]) -> Option<String> {
        let mut notes = Vec::new();
        if self.numeric && available.contains(&MATH_VALIDATOR) {
            notes.push(format!(
                "- The text contains numerical or statistical language: verify it with {}.",
                MATH_VALIDATOR
            ));
        }
        if self.verification && available.contains(&EVIDENCE_CHECKER) {
            notes.push(format!(
                "- The request asks for external verification: check the claims with {}.",
                EVIDENCE_CHECKER
            ));
        }

        if notes.is_empty() {
            None
        } else {
            Some(format!("Routing notes:\n{}", notes.join("\n")))
        }
    }
}

/// Digits joined by an arithmetic operator, e.g. `2+2`, `3 * 4`, `10 / 5 = 2`.
/// A dash is left out so ranges like `2019-2020` do not count.
fn has_arithmetic(query: &str) -> bool {
    let compact: Vec<char> = query.chars().filter(|c| !c.is_whitespace()).collect();
    compact.windows(3).any(|w| {
        w[0].is_ascii_digit() && matches!(w[1], '+' | '*' | '/' | '=' | '×' | '÷') && w[2].is_ascii_digit()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_is_numeric() {
        let plan = RoutingPlan::from_query("12% of 250 is 40");
        assert!(plan.numeric);
        assert!(!plan.verification);
        assert_eq!(plan.required(), vec![MATH_VALIDATOR]);
    }

    #[test]
    fn test_statistical_language_without_digits() {
        assert!(RoutingPlan::from_query("The average person swallows spiders").numeric);
    }

    #[test]
    fn test_arithmetic_expression() {
        assert!(RoutingPlan::from_query("Everyone knows 2 + 2 = 5").numeric);
    }

    #[test]
    fn test_bare_year_is_not_numeric() {
        let plan = RoutingPlan::from_query("Neil Armstrong walked on the moon in 1969");
        assert!(!plan.numeric);
        assert!(plan.required().is_empty());
    }

    #[test]
    fn test_verification_request() {
        let plan = RoutingPlan::from_query("Can you fact-check this: the Great Wall is visible from space?");
        assert!(plan.verification);
        assert_eq!(plan.required(), vec![EVIDENCE_CHECKER]);
    }

    #[test]
    fn test_guidance_skips_unavailable() {
        let plan = RoutingPlan {
            numeric: true,
            verification: true,
        };
        let notes = plan.guidance(&[MATH_VALIDATOR]).unwrap();
        assert!(notes.contains(MATH_VALIDATOR));
        assert!(!notes.contains(EVIDENCE_CHECKER));
        assert!(RoutingPlan::default().guidance(&[MATH_VALIDATOR]).is_none());
    }
}
