// ---------------------------------------------------------------------------
// Taste profile — the fixed-order attribute vector
// ---------------------------------------------------------------------------
//
// Items and user preferences share one dimension order. Every dot product
// and cosine in the recommendation module relies on `TasteDimension::ALL`
// being the index order of `TasteProfile::vector`.
// ---------------------------------------------------------------------------

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of taste dimensions.
pub const TASTE_ARITY: usize = 4;

/// Upper bound of the conventional 0–5 taste scale.
pub const TASTE_MAX: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TasteDimension {
	Sweetness,
	Smoky,
	Fruity,
	Spicy,
}

impl TasteDimension {
	pub const ALL: [TasteDimension; TASTE_ARITY] =
		[Self::Sweetness, Self::Smoky, Self::Fruity, Self::Spicy];

	pub fn index(self) -> usize {
		match self {
			Self::Sweetness => 0,
			Self::Smoky => 1,
			Self::Fruity => 2,
			Self::Spicy => 3,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Sweetness => "sweetness",
			Self::Smoky => "smoky",
			Self::Fruity => "fruity",
			Self::Spicy => "spicy",
		}
	}

	/// Case-insensitive lookup by name. Returns `None` for unknown names.
	pub fn parse(name: &str) -> Option<Self> {
		let lower = name.trim().to_lowercase();
		Self::ALL.into_iter().find(|d| d.as_str() == lower)
	}
}

impl fmt::Display for TasteDimension {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Per-dimension intensity of a whiskey (or a user's liking of it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TasteProfile {
	pub sweetness: u8,
	pub smoky: u8,
	pub fruity: u8,
	pub spicy: u8,
}

impl TasteProfile {
	pub fn new(sweetness: u8, smoky: u8, fruity: u8, spicy: u8) -> Self {
		Self {
			sweetness,
			smoky,
			fruity,
			spicy,
		}
	}

	/// Components above `TASTE_MAX` are clamped down to it.
	pub fn from_vector(v: [u8; TASTE_ARITY]) -> Self {
		let v = v.map(|c| c.min(TASTE_MAX));
		Self::new(v[0], v[1], v[2], v[3])
	}

	pub fn vector(&self) -> [u8; TASTE_ARITY] {
		[self.sweetness, self.smoky, self.fruity, self.spicy]
	}

	pub fn to_f64(&self) -> [f64; TASTE_ARITY] {
		self.vector().map(f64::from)
	}

	pub fn get(&self, dimension: TasteDimension) -> u8 {
		self.vector()[dimension.index()]
	}

	pub fn set(&mut self, dimension: TasteDimension, value: u8) {
		match dimension {
			TasteDimension::Sweetness => self.sweetness = value,
			TasteDimension::Smoky => self.smoky = value,
			TasteDimension::Fruity => self.fruity = value,
			TasteDimension::Spicy => self.spicy = value,
		}
	}
}

impl fmt::Display for TasteProfile {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"Sweet: {}, Smoky: {}, Fruity: {}, Spicy: {}",
			self.sweetness, self.smoky, self.fruity, self.spicy
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn dimension_order_matches_vector_order() {
		let taste = TasteProfile::new(1, 2, 3, 4);
		for (i, dim) in TasteDimension::ALL.iter().enumerate() {
			assert_eq!(dim.index(), i);
			assert_eq!(taste.get(*dim), taste.vector()[i]);
		}
	}

	#[test]
	fn parse_is_case_insensitive() {
		assert_eq!(TasteDimension::parse("Smoky"), Some(TasteDimension::Smoky));
		assert_eq!(TasteDimension::parse(" SPICY "), Some(TasteDimension::Spicy));
		assert_eq!(TasteDimension::parse("peaty"), None);
	}

	#[test]
	fn set_updates_single_dimension() {
		let mut taste = TasteProfile::default();
		taste.set(TasteDimension::Fruity, 4);
		assert_eq!(taste.vector(), [0, 0, 4, 0]);
	}

	#[test]
	fn from_vector_clamps_to_max() {
		let taste = TasteProfile::from_vector([9, 5, 0, 255]);
		assert_eq!(taste.vector(), [TASTE_MAX, 5, 0, TASTE_MAX]);
	}

	#[test]
	fn display_labels_every_dimension() {
		let taste = TasteProfile::new(5, 0, 2, 1);
		assert_eq!(taste.to_string(), "Sweet: 5, Smoky: 0, Fruity: 2, Spicy: 1");
	}
}
