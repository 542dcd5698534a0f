// ---------------------------------------------------------------------------
// Reviews — the single owner of review records
// ---------------------------------------------------------------------------
//
// Profiles and whiskeys hold review ids only. Everything that needs the
// review body resolves it through the store.
// ---------------------------------------------------------------------------

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inclusive bounds of the rating scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingScale {
	pub min: u8,
	pub max: u8,
}

impl Default for RatingScale {
	fn default() -> Self {
		Self { min: 1, max: 5 }
	}
}

impl RatingScale {
	/// Inverted bounds are swapped.
	pub fn new(min: u8, max: u8) -> Self {
		Self {
			min: min.min(max),
			max: min.max(max),
		}
	}

	/// Clamp into the scale, logging when the input was out of range.
	pub fn clamp(&self, rating: i64) -> u8 {
		let bounds = Self::new(self.min, self.max);
		let clamped = rating.clamp(i64::from(bounds.min), i64::from(bounds.max));
		if clamped != rating {
			tracing::warn!(rating, clamped, "Rating outside scale; clamped");
		}
		clamped as u8
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
	pub review_id: String,
	pub user_id: String,
	pub whiskey_id: String,
	pub rating: u8,
	pub review_text: String,
	pub review_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewStore {
	reviews: BTreeMap<String, Review>,
	scale: RatingScale,
}

impl ReviewStore {
	pub fn new(scale: RatingScale) -> Self {
		Self {
			reviews: BTreeMap::new(),
			scale: RatingScale::new(scale.min, scale.max),
		}
	}

	pub fn scale(&self) -> RatingScale {
		self.scale
	}

	/// Create and store a review with a fresh id and the current time.
	pub fn create(&mut self, user_id: &str, whiskey_id: &str, rating: i64, text: &str) -> Review {
		let review = Review {
			review_id: format!("rev-{}", Uuid::new_v4()),
			user_id: user_id.to_string(),
			whiskey_id: whiskey_id.to_string(),
			rating: self.scale.clamp(rating),
			review_text: text.to_string(),
			review_date: Utc::now(),
		};
		self.reviews.insert(review.review_id.clone(), review.clone());
		tracing::info!(review_id = %review.review_id, whiskey_id, "Review created");
		review
	}

	/// Insert an already-built review (used by the loader). Replaces any
	/// review with the same id.
	pub fn insert(&mut self, review: Review) {
		self.reviews.insert(review.review_id.clone(), review);
	}

	pub fn get(&self, review_id: &str) -> Option<&Review> {
		self.reviews.get(review_id)
	}

	/// Change rating and/or text. Author, target and date never change.
	pub fn update(&mut self, review_id: &str, rating: Option<i64>, text: Option<String>) -> Option<&Review> {
		let scale = self.scale;
		let review = self.reviews.get_mut(review_id)?;
		if let Some(r) = rating {
			review.rating = scale.clamp(r);
		}
		if let Some(t) = text {
			review.review_text = t;
		}
		Some(&*review)
	}

	pub fn remove(&mut self, review_id: &str) -> Option<Review> {
		self.reviews.remove(review_id)
	}

	pub fn for_whiskey(&self, whiskey_id: &str) -> Vec<&Review> {
		self.reviews
			.values()
			.filter(|r| r.whiskey_id == whiskey_id)
			.collect()
	}

	pub fn by_user(&self, user_id: &str) -> Vec<&Review> {
		self.reviews.values().filter(|r| r.user_id == user_id).collect()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Review> {
		self.reviews.values()
	}

	pub fn len(&self) -> usize {
		self.reviews.len()
	}

	pub fn is_empty(&self) -> bool {
		self.reviews.is_empty()
	}

	pub fn clear(&mut self) {
		self.reviews.clear();
	}
}
