// ---------------------------------------------------------------------------
// Scoring strategies — preference match and item similarity
// ---------------------------------------------------------------------------
//
// Pure scoring functions plus two strategies over a borrowed catalog.
// Strategies hold no state beyond their weights; the engine builds one per
// request.
// ---------------------------------------------------------------------------

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::cosine::{cosine_similarity, weighted_dot_product};
use crate::profile::UserPreference;
use crate::taste::{TASTE_ARITY, TasteProfile};
use crate::types::{ScoredId, Whiskey};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Default minimum overall similarity for an item-similarity candidate.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.5;

/// Per-dimension weights for the preference dot product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreferenceWeights {
	pub sweetness: f64,
	pub smoky: f64,
	pub fruity: f64,
	pub spicy: f64,
}

impl Default for PreferenceWeights {
	fn default() -> Self {
		Self {
			sweetness: 1.0,
			smoky: 1.0,
			fruity: 1.0,
			spicy: 1.0,
		}
	}
}

impl PreferenceWeights {
	/// Same order as `TasteDimension::ALL`.
	pub fn as_array(&self) -> [f64; TASTE_ARITY] {
		[self.sweetness, self.smoky, self.fruity, self.spicy]
	}
}

/// Feature weights for item similarity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityWeights {
	pub taste: f64,
	pub price: f64,
}

impl Default for SimilarityWeights {
	fn default() -> Self {
		Self {
			taste: 0.7,
			price: 0.3,
		}
	}
}

impl SimilarityWeights {
	/// Negative or non-finite weights count as 0. Returns `None` when
	/// nothing is left to weight.
	pub fn normalized(&self) -> Option<SimilarityWeights> {
		let sanitize = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
		let taste = sanitize(self.taste);
		let price = sanitize(self.price);
		let total = taste + price;
		if total == 0.0 {
			return None;
		}
		Some(SimilarityWeights {
			taste: taste / total,
			price: price / total,
		})
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityConfig {
	pub weights: SimilarityWeights,
	pub threshold: f64,
}

impl Default for SimilarityConfig {
	fn default() -> Self {
		Self {
			weights: SimilarityWeights::default(),
			threshold: DEFAULT_SIMILARITY_THRESHOLD,
		}
	}
}

// ---------------------------------------------------------------------------
// Individual scoring functions
// ---------------------------------------------------------------------------

/// Weighted dot product of preference and taste, floored at 0.
///
/// Returns `None` when the whiskey's price falls outside the preferred
/// range: such items are excluded, not merely scored low. A whiskey with
/// no price is never filtered.
pub fn preference_match_score(
	preference: &UserPreference,
	whiskey: &Whiskey,
	weights: &PreferenceWeights,
) -> Option<f64> {
	if let Some(price) = whiskey.price {
		if preference.price_range.excludes(price) {
			return None;
		}
	}
	let pref = preference.taste.to_f64();
	let taste = whiskey.taste.to_f64();
	let score = weighted_dot_product(&pref, &taste, &weights.as_array());
	Some(score.max(0.0))
}

/// Cosine similarity of two taste vectors, clamped to [0, 1].
/// A zero vector on either side yields 0.
pub fn taste_similarity(a: &TasteProfile, b: &TasteProfile) -> f64 {
	cosine_similarity(&a.to_f64(), &b.to_f64()).clamp(0.0, 1.0)
}

/// `1 - |p1 - p2| / max(p1, p2)`, clamped to [0, 1].
/// Missing or non-positive prices yield 0.
pub fn price_similarity(a: Option<f64>, b: Option<f64>) -> f64 {
	let (Some(p1), Some(p2)) = (a, b) else {
		return 0.0;
	};
	if p1 <= 0.0 || p2 <= 0.0 {
		return 0.0;
	}
	let sim = 1.0 - (p1 - p2).abs() / p1.max(p2);
	if !sim.is_finite() {
		return 0.0;
	}
	sim.clamp(0.0, 1.0)
}

/// Per-feature breakdown of an item-to-item comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityBreakdown {
	pub taste: f64,
	pub price: f64,
	pub overall: f64,
}

/// Weighted average of taste and price similarity, normalized by the
/// weight total and clamped to [0, 1].
pub fn overall_similarity(a: &Whiskey, b: &Whiskey, weights: &SimilarityWeights) -> SimilarityBreakdown {
	let taste = taste_similarity(&a.taste, &b.taste);
	let price = price_similarity(a.price, b.price);
	let overall = match weights.normalized() {
		Some(w) => (taste * w.taste + price * w.price).clamp(0.0, 1.0),
		None => 0.0,
	};
	SimilarityBreakdown {
		taste,
		price,
		overall,
	}
}

/// Stable sort by descending score, then keep the first `count`.
/// Equal scores keep their incoming (catalog) order.
fn rank(mut scored: Vec<ScoredId>, count: usize) -> Vec<ScoredId> {
	scored.sort_by(|a, b| b.score.total_cmp(&a.score));
	scored.truncate(count);
	scored
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StrategyKind {
	PreferenceMatch,
	ItemSimilarity,
}

impl StrategyKind {
	pub fn parse(s: &str) -> Option<Self> {
		match s.trim().to_lowercase().as_str() {
			"preference" | "preferencematch" | "preference_match" | "preference-match" => {
				Some(Self::PreferenceMatch)
			}
			"similar" | "similarity" | "itemsimilarity" | "item_similarity" | "item-similarity" => {
				Some(Self::ItemSimilarity)
			}
			_ => None,
		}
	}
}

impl fmt::Display for StrategyKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::PreferenceMatch => f.write_str("preference"),
			Self::ItemSimilarity => f.write_str("similar"),
		}
	}
}

/// Common contract: ids ranked highest score first, at most `count`.
pub trait ScoringStrategy {
	fn recommend(&self, count: usize) -> Vec<ScoredId>;
}

/// Ranks the whole catalog against a user's taste preferences.
pub struct PreferenceMatch<'a> {
	preference: &'a UserPreference,
	catalog: &'a Catalog,
	weights: PreferenceWeights,
}

impl<'a> PreferenceMatch<'a> {
	pub fn new(preference: &'a UserPreference, catalog: &'a Catalog, weights: PreferenceWeights) -> Self {
		Self {
			preference,
			catalog,
			weights,
		}
	}
}

impl ScoringStrategy for PreferenceMatch<'_> {
	fn recommend(&self, count: usize) -> Vec<ScoredId> {
		if count == 0 {
			return Vec::new();
		}
		let mut filtered = 0usize;
		let scored: Vec<ScoredId> = self
			.catalog
			.iter()
			.filter_map(|w| match preference_match_score(self.preference, w, &self.weights) {
				Some(score) => Some(ScoredId {
					id: w.id.clone(),
					score,
				}),
				None => {
					filtered += 1;
					None
				}
			})
			.collect();
		tracing::debug!(
			candidates = scored.len(),
			price_filtered = filtered,
			"Preference match scored"
		);
		rank(scored, count)
	}
}

/// Ranks the catalog by similarity to one reference whiskey.
pub struct ItemSimilarity<'a> {
	reference: &'a Whiskey,
	catalog: &'a Catalog,
	config: SimilarityConfig,
}

impl<'a> ItemSimilarity<'a> {
	pub fn new(reference: &'a Whiskey, catalog: &'a Catalog, config: SimilarityConfig) -> Self {
		Self {
			reference,
			catalog,
			config,
		}
	}
}

impl ScoringStrategy for ItemSimilarity<'_> {
	fn recommend(&self, count: usize) -> Vec<ScoredId> {
		if count == 0 {
			return Vec::new();
		}
		let scored: Vec<ScoredId> = self
			.catalog
			.iter()
			.filter(|w| w.id != self.reference.id)
			.filter_map(|w| {
				let sim = overall_similarity(self.reference, w, &self.config.weights);
				tracing::debug!(
					id = %w.id,
					taste = sim.taste,
					price = sim.price,
					overall = sim.overall,
					"Similarity candidate"
				);
				(sim.overall >= self.config.threshold).then(|| ScoredId {
					id: w.id.clone(),
					score: sim.overall,
				})
			})
			.collect();
		rank(scored, count)
	}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
