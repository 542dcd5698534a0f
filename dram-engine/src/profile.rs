// ---------------------------------------------------------------------------
// User profile — preferences, price range, history
// ---------------------------------------------------------------------------

use std::collections::{BTreeSet, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::taste::{TASTE_ARITY, TASTE_MAX, TasteDimension, TasteProfile};

/// Default liking on every taste dimension for a fresh profile.
pub const DEFAULT_PREFERENCE: u8 = 3;

/// Default number of recently viewed entries kept.
pub const DEFAULT_VIEWED_CAPACITY: usize = 20;

// ---------------------------------------------------------------------------
// Preference
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceRange {
	pub min: Option<f64>,
	pub max: Option<f64>,
}

impl PriceRange {
	/// True when `price` violates a declared bound.
	pub fn excludes(&self, price: f64) -> bool {
		self.min.is_some_and(|min| price < min) || self.max.is_some_and(|max| price > max)
	}

	pub fn as_tuple(&self) -> (Option<f64>, Option<f64>) {
		(self.min, self.max)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceUpdate {
	Updated { dimension: TasteDimension, value: u8 },
	UnknownDimension,
	/// NaN or infinite input; the previous value is kept.
	InvalidValue,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceRangeUpdate {
	Updated(PriceRange),
	/// min was greater than max and the bounds were exchanged.
	Swapped(PriceRange),
	/// A bound was NaN or infinite; the range is unchanged.
	InvalidValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreference {
	pub taste: TasteProfile,
	pub price_range: PriceRange,
}

impl Default for UserPreference {
	fn default() -> Self {
		Self {
			taste: TasteProfile::new(
				DEFAULT_PREFERENCE,
				DEFAULT_PREFERENCE,
				DEFAULT_PREFERENCE,
				DEFAULT_PREFERENCE,
			),
			price_range: PriceRange::default(),
		}
	}
}

impl UserPreference {
	/// Set one dimension. The value is truncated toward zero and clamped
	/// into 0..=5.
	pub fn update_preference(&mut self, dimension: &str, value: f64) -> PreferenceUpdate {
		if !value.is_finite() {
			tracing::warn!(dimension, value, "Invalid preference value; keeping previous");
			return PreferenceUpdate::InvalidValue;
		}
		let Some(dim) = TasteDimension::parse(dimension) else {
			tracing::warn!(dimension, "Unknown preference dimension");
			return PreferenceUpdate::UnknownDimension;
		};
		let clamped = value.trunc().clamp(0.0, f64::from(TASTE_MAX)) as u8;
		self.taste.set(dim, clamped);
		PreferenceUpdate::Updated {
			dimension: dim,
			value: clamped,
		}
	}

	/// Replace the price range. Negative bounds become 0; an inverted pair
	/// is swapped rather than rejected.
	pub fn update_price_range(&mut self, min: Option<f64>, max: Option<f64>) -> PriceRangeUpdate {
		if min.is_some_and(|v| !v.is_finite()) || max.is_some_and(|v| !v.is_finite()) {
			tracing::warn!(?min, ?max, "Invalid price range values; not updated");
			return PriceRangeUpdate::InvalidValue;
		}
		let mut lo = min.map(|v| v.max(0.0));
		let mut hi = max.map(|v| v.max(0.0));
		let mut swapped = false;
		if let (Some(a), Some(b)) = (lo, hi) {
			if a > b {
				tracing::warn!(min = a, max = b, "Price range inverted; swapping");
				lo = Some(b);
				hi = Some(a);
				swapped = true;
			}
		}
		self.price_range = PriceRange { min: lo, max: hi };
		if swapped {
			PriceRangeUpdate::Swapped(self.price_range)
		} else {
			PriceRangeUpdate::Updated(self.price_range)
		}
	}

	pub fn preference_score(&self, dimension: TasteDimension) -> u8 {
		self.taste.get(dimension)
	}

	/// Same index order as `Whiskey::taste.vector()`.
	pub fn preference_vector(&self) -> [u8; TASTE_ARITY] {
		self.taste.vector()
	}

	pub fn price_range(&self) -> (Option<f64>, Option<f64>) {
		self.price_range.as_tuple()
	}
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewedEntry {
	pub whiskey_id: String,
	pub viewed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserHistory {
	capacity: usize,
	/// Oldest first; reads reverse it.
	viewed: VecDeque<ViewedEntry>,
	collection: Vec<String>,
	reviewed: BTreeSet<String>,
}

impl Default for UserHistory {
	fn default() -> Self {
		Self::with_capacity(DEFAULT_VIEWED_CAPACITY)
	}
}

impl UserHistory {
	pub fn with_capacity(capacity: usize) -> Self {
		let capacity = capacity.max(1);
		Self {
			capacity,
			viewed: VecDeque::with_capacity(capacity),
			collection: Vec::new(),
			reviewed: BTreeSet::new(),
		}
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	pub fn record_view(&mut self, whiskey_id: &str) {
		self.push_viewed(whiskey_id, Utc::now());
	}

	/// Append a view with an explicit time, evicting the oldest on overflow.
	pub fn push_viewed(&mut self, whiskey_id: &str, viewed_at: DateTime<Utc>) {
		if self.viewed.len() == self.capacity {
			self.viewed.pop_front();
		}
		self.viewed.push_back(ViewedEntry {
			whiskey_id: whiskey_id.to_string(),
			viewed_at,
		});
	}

	/// Most recent first. `None` or `Some(0)` returns everything.
	pub fn recently_viewed(&self, count: Option<usize>) -> Vec<ViewedEntry> {
		let limit = match count {
			Some(n) if n > 0 => n,
			_ => self.viewed.len(),
		};
		self.viewed.iter().rev().take(limit).cloned().collect()
	}

	pub fn most_recent(&self) -> Option<&str> {
		self.viewed.back().map(|e| e.whiskey_id.as_str())
	}

	/// Oldest first, as persisted.
	pub fn viewed_in_order(&self) -> impl Iterator<Item = &ViewedEntry> {
		self.viewed.iter()
	}

	/// Returns `false` if the id was already collected.
	pub fn add_to_collection(&mut self, whiskey_id: &str) -> bool {
		if self.is_in_collection(whiskey_id) {
			return false;
		}
		self.collection.push(whiskey_id.to_string());
		true
	}

	pub fn remove_from_collection(&mut self, whiskey_id: &str) -> bool {
		let before = self.collection.len();
		self.collection.retain(|id| id != whiskey_id);
		self.collection.len() != before
	}

	pub fn is_in_collection(&self, whiskey_id: &str) -> bool {
		self.collection.iter().any(|id| id == whiskey_id)
	}

	pub fn collection(&self) -> &[String] {
		&self.collection
	}

	pub fn mark_reviewed(&mut self, whiskey_id: &str) {
		self.reviewed.insert(whiskey_id.to_string());
	}

	pub fn unmark_reviewed(&mut self, whiskey_id: &str) {
		self.reviewed.remove(whiskey_id);
	}

	pub fn reviewed(&self) -> &BTreeSet<String> {
		&self.reviewed
	}

	pub fn clear_reviewed(&mut self) {
		self.reviewed.clear();
	}

	pub fn clear(&mut self, viewed: bool, collection: bool) {
		if viewed {
			self.viewed.clear();
		}
		if collection {
			self.collection.clear();
		}
	}
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
	pub user_id: String,
	pub user_name: String,
	pub user_age: Option<u32>,
	/// `true` male, `false` female, `None` undisclosed.
	pub user_sex: Option<bool>,
}

/// Partial update for [`UserProfile::update_info`]. `user_age` and
/// `user_sex` use `Some(None)` to clear.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoUpdate {
	pub user_name: Option<String>,
	#[serde(default, deserialize_with = "some_or_null")]
	pub user_age: Option<Option<u32>>,
	#[serde(default, deserialize_with = "some_or_null")]
	pub user_sex: Option<Option<bool>>,
}

fn some_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
	D: serde::Deserializer<'de>,
	T: Deserialize<'de>,
{
	Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
	pub info: UserInfo,
	pub preference: UserPreference,
	pub history: UserHistory,
	pub review_ids: Vec<String>,
}

impl UserProfile {
	pub fn new(user_id: impl Into<String>, user_name: impl Into<String>, viewed_capacity: usize) -> Self {
		Self {
			info: UserInfo {
				user_id: user_id.into(),
				user_name: user_name.into(),
				user_age: None,
				user_sex: None,
			},
			preference: UserPreference::default(),
			history: UserHistory::with_capacity(viewed_capacity),
			review_ids: Vec::new(),
		}
	}

	pub fn user_id(&self) -> &str {
		&self.info.user_id
	}

	pub fn update_info(&mut self, update: UserInfoUpdate) {
		if let Some(name) = update.user_name {
			if name.trim().is_empty() {
				tracing::warn!(user_id = %self.info.user_id, "Ignoring empty user name");
			} else {
				self.info.user_name = name;
			}
		}
		if let Some(age) = update.user_age {
			self.info.user_age = age;
		}
		if let Some(sex) = update.user_sex {
			self.info.user_sex = sex;
		}
	}

	pub fn add_review_id(&mut self, review_id: &str) {
		if !self.review_ids.iter().any(|r| r == review_id) {
			self.review_ids.push(review_id.to_string());
		}
	}

	pub fn remove_review_id(&mut self, review_id: &str) {
		self.review_ids.retain(|r| r != review_id);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	#[test]
	fn fresh_preference_defaults_to_three() {
		let p = UserPreference::default();
		assert_eq!(p.preference_vector(), [3, 3, 3, 3]);
		assert_eq!(p.price_range(), (None, None));
	}

	#[test]
	fn update_preference_clamps() {
		let mut p = UserPreference::default();
		for (input, expected) in [(-3.0, 0u8), (0.0, 0), (4.0, 4), (5.0, 5), (9.0, 5), (2.9, 2)] {
			let outcome = p.update_preference("smoky", input);
			assert_eq!(
				outcome,
				PreferenceUpdate::Updated {
					dimension: TasteDimension::Smoky,
					value: expected
				}
			);
			assert_eq!(p.preference_score(TasteDimension::Smoky), expected);
		}
	}

	#[test]
	fn update_preference_non_finite_keeps_previous() {
		let mut p = UserPreference::default();
		p.update_preference("fruity", 1.0);
		assert_eq!(p.update_preference("fruity", f64::NAN), PreferenceUpdate::InvalidValue);
		assert_eq!(
			p.update_preference("fruity", f64::INFINITY),
			PreferenceUpdate::InvalidValue
		);
		assert_eq!(p.preference_score(TasteDimension::Fruity), 1);
	}

	#[test]
	fn update_preference_unknown_dimension_is_noop() {
		let mut p = UserPreference::default();
		assert_eq!(p.update_preference("peaty", 5.0), PreferenceUpdate::UnknownDimension);
		assert_eq!(p.preference_vector(), [3, 3, 3, 3]);
	}

	#[test]
	fn price_range_swaps_inverted_bounds() {
		let mut p = UserPreference::default();
		let outcome = p.update_price_range(Some(100.0), Some(20.0));
		assert!(matches!(outcome, PriceRangeUpdate::Swapped(_)));
		assert_eq!(p.price_range(), (Some(20.0), Some(100.0)));
	}

	#[test]
	fn price_range_clamps_negative() {
		let mut p = UserPreference::default();
		p.update_price_range(Some(-10.0), None);
		assert_eq!(p.price_range(), (Some(0.0), None));
		p.update_price_range(Some(-10.0), Some(-5.0));
		assert_eq!(p.price_range(), (Some(0.0), Some(0.0)));
	}

	#[test]
	fn price_range_invalid_leaves_range() {
		let mut p = UserPreference::default();
		p.update_price_range(Some(10.0), Some(50.0));
		assert_eq!(
			p.update_price_range(Some(f64::NAN), Some(60.0)),
			PriceRangeUpdate::InvalidValue
		);
		assert_eq!(p.price_range(), (Some(10.0), Some(50.0)));
	}

	#[test]
	fn price_range_excludes() {
		let r = PriceRange {
			min: Some(20.0),
			max: Some(60.0),
		};
		assert!(r.excludes(19.99));
		assert!(r.excludes(60.01));
		assert!(!r.excludes(20.0));
		assert!(!r.excludes(60.0));
		assert!(!PriceRange::default().excludes(1_000_000.0));
	}

	#[test]
	fn history_evicts_oldest_and_reads_newest_first() {
		let mut h = UserHistory::with_capacity(3);
		for id in ["a", "b", "c", "d"] {
			h.record_view(id);
		}
		let ids: Vec<String> = h
			.recently_viewed(None)
			.into_iter()
			.map(|e| e.whiskey_id)
			.collect();
		assert_eq!(ids, vec!["d", "c", "b"]);
		assert_eq!(h.most_recent(), Some("d"));
		assert_eq!(h.recently_viewed(Some(1)).len(), 1);
		assert_eq!(h.recently_viewed(Some(0)).len(), 3);
	}

	#[test]
	fn history_keeps_explicit_timestamps() {
		let mut h = UserHistory::default();
		let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
		h.push_viewed("w1", at);
		assert_eq!(h.recently_viewed(None)[0].viewed_at, at);
	}

	#[test]
	fn collection_has_no_duplicates() {
		let mut h = UserHistory::default();
		assert!(h.add_to_collection("w1"));
		assert!(!h.add_to_collection("w1"));
		assert!(h.add_to_collection("w2"));
		assert_eq!(h.collection(), ["w1", "w2"]);
		assert!(h.remove_from_collection("w1"));
		assert!(!h.remove_from_collection("w1"));
		assert!(!h.is_in_collection("w1"));
	}

	#[test]
	fn clear_is_selective() {
		let mut h = UserHistory::default();
		h.record_view("w1");
		h.add_to_collection("w2");
		h.clear(true, false);
		assert!(h.recently_viewed(None).is_empty());
		assert_eq!(h.collection().len(), 1);
		h.clear(false, true);
		assert!(h.collection().is_empty());
	}

	#[test]
	fn update_info_is_partial() {
		let mut p = UserProfile::new("u1", "Alex", DEFAULT_VIEWED_CAPACITY);
		p.update_info(UserInfoUpdate {
			user_age: Some(Some(34)),
			..Default::default()
		});
		assert_eq!(p.info.user_name, "Alex");
		assert_eq!(p.info.user_age, Some(34));
		p.update_info(UserInfoUpdate {
			user_name: Some("  ".into()),
			user_age: Some(None),
			user_sex: Some(Some(false)),
		});
		assert_eq!(p.info.user_name, "Alex");
		assert_eq!(p.info.user_age, None);
		assert_eq!(p.info.user_sex, Some(false));
	}

	#[test]
	fn review_ids_deduplicate() {
		let mut p = UserProfile::new("u1", "Alex", 5);
		p.add_review_id("r1");
		p.add_review_id("r1");
		assert_eq!(p.review_ids, vec!["r1"]);
		p.remove_review_id("r1");
		assert!(p.review_ids.is_empty());
	}
}
