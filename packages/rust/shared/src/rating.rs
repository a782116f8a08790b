//! The closed verdict vocabulary and its opposite table.
//!
//! Every rating a fact-check article can carry is enumerated here, and
//! every rating has exactly one designated opposite. The table is not a
//! symmetry guarantee: vague verdicts collapse to [`Rating::True`], and
//! neutral verdicts are their own opposite.

use serde::{Deserialize, Serialize};

use crate::error::{CounterclaimError, Result};

/// A claim's verdict, drawn from the fixed vocabulary published by the
/// fact-check source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rating {
    True,
    False,
    #[serde(rename = "Mostly True")]
    MostlyTrue,
    #[serde(rename = "Mostly False")]
    MostlyFalse,
    Legit,
    Fake,
    #[serde(rename = "Correct Attribution")]
    CorrectAttribution,
    Misattributed,
    Unproven,
    Unfounded,
    Outdated,
    Miscaptioned,
    Legend,
    Scam,
    #[serde(rename = "Labeled Satire")]
    LabeledSatire,
    #[serde(rename = "Originated as Satire")]
    OriginatedAsSatire,
    #[serde(rename = "Research in Progress")]
    ResearchInProgress,
    Mixture,
    #[serde(rename = "Lost Legend")]
    LostLegend,
    Recall,
}

/// Every member of the vocabulary, for iteration in tests and tooling.
pub const VOCABULARY: [Rating; 20] = [
    Rating::True,
    Rating::False,
    Rating::MostlyTrue,
    Rating::MostlyFalse,
    Rating::Legit,
    Rating::Fake,
    Rating::CorrectAttribution,
    Rating::Misattributed,
    Rating::Unproven,
    Rating::Unfounded,
    Rating::Outdated,
    Rating::Miscaptioned,
    Rating::Legend,
    Rating::Scam,
    Rating::LabeledSatire,
    Rating::OriginatedAsSatire,
    Rating::ResearchInProgress,
    Rating::Mixture,
    Rating::LostLegend,
    Rating::Recall,
];

impl Rating {
    /// The verdict string as published by the source.
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::True => "True",
            Rating::False => "False",
            Rating::MostlyTrue => "Mostly True",
            Rating::MostlyFalse => "Mostly False",
            Rating::Legit => "Legit",
            Rating::Fake => "Fake",
            Rating::CorrectAttribution => "Correct Attribution",
            Rating::Misattributed => "Misattributed",
            Rating::Unproven => "Unproven",
            Rating::Unfounded => "Unfounded",
            Rating::Outdated => "Outdated",
            Rating::Miscaptioned => "Miscaptioned",
            Rating::Legend => "Legend",
            Rating::Scam => "Scam",
            Rating::LabeledSatire => "Labeled Satire",
            Rating::OriginatedAsSatire => "Originated as Satire",
            Rating::ResearchInProgress => "Research in Progress",
            Rating::Mixture => "Mixture",
            Rating::LostLegend => "Lost Legend",
            Rating::Recall => "Recall",
        }
    }

    /// The designated opposite of this rating.
    ///
    /// Strict pairs flip both ways. Vague verdicts (Unproven, Scam, the
    /// satire categories, ...) all map to `True`: the spoof asserts the
    /// claim is simply true. Neutral verdicts map to themselves.
    pub fn opposite(&self) -> Rating {
        match self {
            // Strict opposites
            Rating::True => Rating::False,
            Rating::False => Rating::True,
            Rating::MostlyTrue => Rating::MostlyFalse,
            Rating::MostlyFalse => Rating::MostlyTrue,
            Rating::Legit => Rating::Fake,
            Rating::Fake => Rating::Legit,
            Rating::CorrectAttribution => Rating::Misattributed,
            Rating::Misattributed => Rating::CorrectAttribution,

            // Vague verdicts collapse to an unqualified True
            Rating::Unproven
            | Rating::Unfounded
            | Rating::Outdated
            | Rating::Miscaptioned
            | Rating::Legend
            | Rating::Scam
            | Rating::LabeledSatire
            | Rating::OriginatedAsSatire => Rating::True,

            // Neutral verdicts stay the same
            Rating::ResearchInProgress => Rating::ResearchInProgress,
            Rating::Mixture => Rating::Mixture,
            Rating::LostLegend => Rating::LostLegend,
            Rating::Recall => Rating::Recall,
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Rating {
    type Err = CounterclaimError;

    fn from_str(s: &str) -> Result<Self> {
        VOCABULARY
            .iter()
            .find(|r| r.as_str() == s)
            .copied()
            .ok_or_else(|| CounterclaimError::invalid_rating(s))
    }
}
