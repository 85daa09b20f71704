//! Core types for qpmatch-core.
//!
//! This module defines the data shared across every pipeline stage: the
//! [`Token`] and [`Span`] units produced from the input text, the
//! [`CandidateHit`] values returned by a lookup, and the [`MatchedItem`] /
//! [`Transformation`] values handed back to the caller.

use serde::{Deserialize, Serialize};

/// One word of the tokenized input, with its 0-based position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub index: usize,
}

/// A contiguous run of tokens `[start, end]` (inclusive) considered as one
/// phrase for lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    /// Token texts joined by a single space.
    pub text: String,
}

impl Span {
    pub fn size(&self) -> usize {
        self.end - self.start + 1
    }

    /// Token indices covered by this span.
    pub fn indices(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Whether an identifier names an entity or a relation (property).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HitKind {
    Entity,
    Property,
}

impl HitKind {
    /// Infer the kind from the identifier prefix (`P123` is a property,
    /// everything else an entity).
    pub fn from_id(id: &str) -> Self {
        if id.starts_with('P') {
            HitKind::Property
        } else {
            HitKind::Entity
        }
    }
}

impl std::fmt::Display for HitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HitKind::Entity => write!(f, "entity"),
            HitKind::Property => write!(f, "property"),
        }
    }
}

/// How a hit matched the searched phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Fuzzy,
}

/// Restricts a lookup to entities, relations, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindFilter {
    Entity,
    Relation,
    Both,
}

impl KindFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            KindFilter::Entity => "entity",
            KindFilter::Relation => "relation",
            KindFilter::Both => "both",
        }
    }

    /// Whether a hit of `kind` is admitted by this filter.
    pub fn admits(&self, kind: HitKind) -> bool {
        match self {
            KindFilter::Entity => kind == HitKind::Entity,
            KindFilter::Relation => kind == HitKind::Property,
            KindFilter::Both => true,
        }
    }
}

impl std::fmt::Display for KindFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for KindFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entity" => Ok(KindFilter::Entity),
            "relation" => Ok(KindFilter::Relation),
            "both" => Ok(KindFilter::Both),
            other => Err(format!("unknown kind filter {other:?}")),
        }
    }
}

/// A raw search hit as returned by a lookup backend, before it is tagged
/// with a [`MatchType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One result of a disambiguation search: a [`Hit`] tagged with its kind and
/// match type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateHit {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub kind: HitKind,
    pub match_type: MatchType,
}

impl CandidateHit {
    pub fn from_hit(hit: Hit, match_type: MatchType) -> Self {
        let kind = HitKind::from_id(&hit.id);
        Self {
            id: hit.id,
            label: hit.label,
            description: hit.description,
            kind,
            match_type,
        }
    }
}

/// Kind of an emitted [`MatchedItem`]: resolved to one identifier, or an
/// ambiguous disambiguation set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Entity,
    Property,
    Ambiguous,
}

impl From<HitKind> for ItemKind {
    fn from(kind: HitKind) -> Self {
        match kind {
            HitKind::Entity => ItemKind::Entity,
            HitKind::Property => ItemKind::Property,
        }
    }
}

/// The engine's output unit.
///
/// `id` is either a single identifier or a bracketed alternation such as
/// `[Q782 or Q18094 or Q131750]`. For ambiguous items `alternatives` holds the
/// full candidate list in the same order; for resolved items it is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub kind: ItemKind,
    pub alternatives: Vec<CandidateHit>,
    /// The span this item was matched from.
    pub span: Span,
}

impl MatchedItem {
    pub fn is_ambiguous(&self) -> bool {
        self.kind == ItemKind::Ambiguous
    }
}

/// A best-effort single-path reading of an ambiguous sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternativeSequence {
    pub sequence: String,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
}

/// Result of a `transform` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transformation {
    pub original: String,
    pub tokens: Vec<Token>,
    pub sequence: Vec<MatchedItem>,
    /// Item ids joined by a single space, in reading order.
    pub formatted: String,
    pub formatted_with_links: String,
    pub alternatives: Vec<AlternativeSequence>,
}
