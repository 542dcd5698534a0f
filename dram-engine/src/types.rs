use std::fmt;

use serde::{Deserialize, Serialize};

use crate::taste::TasteProfile;

// ---------------------------------------------------------------------------
// Whiskey type
// ---------------------------------------------------------------------------

/// Closed set of whiskey categories. Persisted by variant name
/// (`SINGLE_MALT`), displayed by label (`Single Malt`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WhiskeyType {
	SingleMalt,
	Blended,
	Bourbon,
	Rye,
	Irish,
	Japanese,
	Other,
}

impl WhiskeyType {
	pub const ALL: [WhiskeyType; 7] = [
		Self::SingleMalt,
		Self::Blended,
		Self::Bourbon,
		Self::Rye,
		Self::Irish,
		Self::Japanese,
		Self::Other,
	];

	pub fn name(self) -> &'static str {
		match self {
			Self::SingleMalt => "SINGLE_MALT",
			Self::Blended => "BLENDED",
			Self::Bourbon => "BOURBON",
			Self::Rye => "RYE",
			Self::Irish => "IRISH",
			Self::Japanese => "JAPANESE",
			Self::Other => "OTHER",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Self::SingleMalt => "Single Malt",
			Self::Blended => "Blended",
			Self::Bourbon => "Bourbon",
			Self::Rye => "Rye",
			Self::Irish => "Irish",
			Self::Japanese => "Japanese",
			Self::Other => "Other",
		}
	}

	/// Accepts either the variant name or the display label, ignoring case.
	pub fn parse(s: &str) -> Option<Self> {
		let s = s.trim();
		Self::ALL
			.into_iter()
			.find(|t| t.name().eq_ignore_ascii_case(s) || t.label().eq_ignore_ascii_case(s))
	}
}

impl fmt::Display for WhiskeyType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

// ---------------------------------------------------------------------------
// Whiskey
// ---------------------------------------------------------------------------

/// A catalog item. `id` never changes after insertion; reviews are
/// referenced by id only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Whiskey {
	pub id: String,
	pub name: String,
	pub taste: TasteProfile,
	#[serde(default)]
	pub origin: Option<String>,
	#[serde(default)]
	pub price: Option<f64>,
	#[serde(default)]
	pub alcohol_percentage: f64,
	#[serde(rename = "type")]
	pub whiskey_type: WhiskeyType,
	#[serde(default)]
	pub image_path: Option<String>,
	#[serde(default)]
	pub age_years: Option<u32>,
	#[serde(default)]
	pub user_review_ids: Vec<String>,
}

impl Whiskey {
	pub fn new(
		id: impl Into<String>,
		name: impl Into<String>,
		taste: TasteProfile,
		whiskey_type: WhiskeyType,
	) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
			taste,
			origin: None,
			price: None,
			alcohol_percentage: 0.0,
			whiskey_type,
			image_path: None,
			age_years: None,
			user_review_ids: Vec::new(),
		}
	}

	pub fn with_price(mut self, price: f64) -> Self {
		self.price = Some(price);
		self
	}

	pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
		self.origin = Some(origin.into());
		self
	}

	pub fn with_strength(mut self, alcohol_percentage: f64) -> Self {
		self.alcohol_percentage = alcohol_percentage;
		self
	}

	pub fn with_age(mut self, age_years: u32) -> Self {
		self.age_years = Some(age_years);
		self
	}

	pub fn with_image(mut self, image_path: impl Into<String>) -> Self {
		self.image_path = Some(image_path.into());
		self
	}

	pub fn add_review_id(&mut self, review_id: &str) {
		if !self.user_review_ids.iter().any(|r| r == review_id) {
			self.user_review_ids.push(review_id.to_string());
		}
	}

	pub fn remove_review_id(&mut self, review_id: &str) {
		self.user_review_ids.retain(|r| r != review_id);
	}

	pub fn basic_info(&self) -> WhiskeyInfo {
		WhiskeyInfo {
			id: self.id.clone(),
			name: self.name.clone(),
			whiskey_type: self.whiskey_type.label().to_string(),
			origin: self.origin.clone(),
		}
	}

	pub fn details(&self) -> WhiskeyDetails {
		WhiskeyDetails {
			id: self.id.clone(),
			name: self.name.clone(),
			taste_profile: self.taste.to_string(),
			taste_vector: self.taste.vector(),
			origin: self.origin.clone(),
			price: self.price,
			alcohol_percentage: self.alcohol_percentage,
			whiskey_type: self.whiskey_type.label().to_string(),
			image_path: self.image_path.clone(),
			age_years: self.age_years,
			user_review_ids: self.user_review_ids.clone(),
		}
	}
}

impl fmt::Display for Whiskey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} ({})", self.name, self.whiskey_type)
	}
}

// ---------------------------------------------------------------------------
// Display records
// ---------------------------------------------------------------------------

/// Lightweight record handed to the presentation layer for lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhiskeyInfo {
	pub id: String,
	pub name: String,
	#[serde(rename = "type")]
	pub whiskey_type: String,
	pub origin: Option<String>,
}

/// Every field of a whiskey, for a detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhiskeyDetails {
	pub id: String,
	pub name: String,
	pub taste_profile: String,
	pub taste_vector: [u8; 4],
	pub origin: Option<String>,
	pub price: Option<f64>,
	pub alcohol_percentage: f64,
	#[serde(rename = "type")]
	pub whiskey_type: String,
	pub image_path: Option<String>,
	pub age_years: Option<u32>,
	pub user_review_ids: Vec<String>,
}

/// A ranked id with the score that placed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredId {
	pub id: String,
	pub score: f64,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn whiskey_type_parses_name_and_label() {
		assert_eq!(WhiskeyType::parse("SINGLE_MALT"), Some(WhiskeyType::SingleMalt));
		assert_eq!(WhiskeyType::parse("single malt"), Some(WhiskeyType::SingleMalt));
		assert_eq!(WhiskeyType::parse("Bourbon"), Some(WhiskeyType::Bourbon));
		assert_eq!(WhiskeyType::parse("moonshine"), None);
	}

	#[test]
	fn whiskey_type_serializes_by_variant_name() {
		let json = serde_json::to_string(&WhiskeyType::SingleMalt).unwrap();
		assert_eq!(json, "\"SINGLE_MALT\"");
		let back: WhiskeyType = serde_json::from_str("\"JAPANESE\"").unwrap();
		assert_eq!(back, WhiskeyType::Japanese);
	}

	#[test]
	fn review_ids_have_no_duplicates() {
		let mut w = Whiskey::new("w1", "Test", TasteProfile::default(), WhiskeyType::Other);
		w.add_review_id("r1");
		w.add_review_id("r1");
		w.add_review_id("r2");
		assert_eq!(w.user_review_ids, vec!["r1", "r2"]);
		w.remove_review_id("r1");
		assert_eq!(w.user_review_ids, vec!["r2"]);
	}

	#[test]
	fn basic_info_uses_label() {
		let w = Whiskey::new("w1", "Lagavulin 16", TasteProfile::new(2, 5, 1, 2), WhiskeyType::SingleMalt)
			.with_origin("Scotland");
		let info = w.basic_info();
		assert_eq!(info.whiskey_type, "Single Malt");
		assert_eq!(info.origin.as_deref(), Some("Scotland"));
		assert_eq!(w.to_string(), "Lagavulin 16 (Single Malt)");
	}

	#[test]
	fn details_carry_all_fields() {
		let w = Whiskey::new("w2", "Hibiki", TasteProfile::new(4, 1, 4, 1), WhiskeyType::Japanese)
			.with_price(90.0)
			.with_strength(43.0)
			.with_age(17)
			.with_image("img/hibiki.png");
		let d = w.details();
		assert_eq!(d.taste_vector, [4, 1, 4, 1]);
		assert_eq!(d.price, Some(90.0));
		assert_eq!(d.age_years, Some(17));
		assert_eq!(d.image_path.as_deref(), Some("img/hibiki.png"));
		assert_eq!(d.whiskey_type, "Japanese");
	}
}
