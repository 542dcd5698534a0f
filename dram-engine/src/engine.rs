// ---------------------------------------------------------------------------
// Recommendation engine — strategy selection and id resolution
// ---------------------------------------------------------------------------
//
// Holds only configuration. A strategy instance is built per request from
// the kind the caller asks for, then its ranked ids are resolved back into
// display records through the catalog.
// ---------------------------------------------------------------------------

use crate::catalog::Catalog;
use crate::error::DramError;
use crate::profile::UserProfile;
use crate::recommendation::{
	ItemSimilarity, PreferenceMatch, PreferenceWeights, ScoringStrategy, SimilarityConfig,
	StrategyKind,
};
use crate::types::{ScoredId, Whiskey, WhiskeyInfo};

#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
	preference_weights: PreferenceWeights,
	similarity: SimilarityConfig,
}

impl RecommendationEngine {
	pub fn new(preference_weights: PreferenceWeights, similarity: SimilarityConfig) -> Self {
		Self {
			preference_weights,
			similarity,
		}
	}

	pub fn preference_weights(&self) -> &PreferenceWeights {
		&self.preference_weights
	}

	pub fn similarity(&self) -> &SimilarityConfig {
		&self.similarity
	}

	/// Recommend up to `count` whiskeys as display records.
	///
	/// Fails only when there is no profile. An unresolvable reference gives
	/// an empty list, and ids the catalog no longer knows are dropped.
	pub fn recommend(
		&self,
		profile: Option<&UserProfile>,
		catalog: &Catalog,
		count: usize,
		kind: StrategyKind,
		reference_id: Option<&str>,
	) -> Result<Vec<WhiskeyInfo>, DramError> {
		let profile = profile.ok_or(DramError::NoActiveProfile)?;
		let ranked = self.rank(profile, catalog, count, kind, reference_id);
		Ok(resolve(catalog, &ranked))
	}

	/// Ranked ids with scores, before resolution.
	pub fn rank(
		&self,
		profile: &UserProfile,
		catalog: &Catalog,
		count: usize,
		kind: StrategyKind,
		reference_id: Option<&str>,
	) -> Vec<ScoredId> {
		let ranked = match kind {
			StrategyKind::PreferenceMatch => {
				PreferenceMatch::new(&profile.preference, catalog, self.preference_weights)
					.recommend(count)
			}
			StrategyKind::ItemSimilarity => {
				let Some(reference) = resolve_reference(profile, catalog, reference_id) else {
					return Vec::new();
				};
				ItemSimilarity::new(reference, catalog, self.similarity).recommend(count)
			}
		};
		tracing::info!(
			strategy = %kind,
			requested = count,
			returned = ranked.len(),
			"Recommendations ranked"
		);
		ranked
	}
}

/// Explicit reference if given, otherwise the most recently viewed item.
fn resolve_reference<'a>(
	profile: &UserProfile,
	catalog: &'a Catalog,
	reference_id: Option<&str>,
) -> Option<&'a Whiskey> {
	let id = match reference_id {
		Some(id) => id,
		None => match profile.history.most_recent() {
			Some(id) => id,
			None => {
				tracing::info!("No reference whiskey and no viewing history");
				return None;
			}
		},
	};
	let found = catalog.get(id);
	if found.is_none() {
		tracing::warn!(id, "Reference whiskey not in catalog");
	}
	found
}

/// Map ranked ids to display records, dropping stale ids.
pub fn resolve(catalog: &Catalog, ranked: &[ScoredId]) -> Vec<WhiskeyInfo> {
	ranked
		.iter()
		.filter_map(|s| match catalog.get(&s.id) {
			Some(w) => Some(w.basic_info()),
			None => {
				tracing::warn!(id = %s.id, "Recommended whiskey not found; dropped");
				None
			}
		})
		.collect()
}
