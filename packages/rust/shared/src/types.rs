//! Core domain types: articles, spoofs, and their shared claim shape.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::rating::Rating;

/// The claim a fact-check article examines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// The question the article answers, e.g. "Did X really say Y?".
    pub question: String,
    /// The verdict the article arrives at.
    pub rating: Rating,
    /// Optional free-text context published alongside the verdict.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// A fact-check article as scraped from the source.
///
/// Identity is the `slug`, the last path segment of the article URL.
/// Articles are created once per distinct slug and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub slug: String,
    pub title: String,
    pub subtitle: String,
    /// Publish date of the source article.
    pub date: NaiveDate,
    pub claim: Claim,
    /// Ordered paragraph-level text blocks of the article body.
    pub content: Vec<String>,
}

impl Article {
    /// Build the counter-article for this article.
    ///
    /// `new_content` is the inverted body from the content transformer.
    /// Everything else is copied verbatim, except the rating, which is
    /// flipped through the opposite table. The spoof starts unpublished.
    pub fn to_spoof(&self, new_content: Vec<String>) -> Spoof {
        Spoof {
            slug: self.slug.clone(),
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            date: self.date,
            claim: Claim {
                question: self.claim.question.clone(),
                rating: self.claim.rating.opposite(),
                context: self.claim.context.clone(),
            },
            content: new_content,
            published: false,
        }
    }
}

/// The generated counter-article. Same shape as [`Article`], same slug,
/// inverted verdict, replaced body.
///
/// `published` means "the record store believes the rendered artifact
/// exists in the publication target". Only the ingestion and
/// reconciliation stages flip it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spoof {
    pub slug: String,
    pub title: String,
    pub subtitle: String,
    pub date: NaiveDate,
    pub claim: Claim,
    pub content: Vec<String>,
    #[serde(default)]
    pub published: bool,
}

/// A listing-sized view of a spoof, for the recent-items index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpoofStub {
    pub slug: String,
    pub title: String,
    pub subtitle: String,
    pub date: NaiveDate,
}
