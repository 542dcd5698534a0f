// ---------------------------------------------------------------------------
// Catalog — whiskeys keyed by id
// ---------------------------------------------------------------------------
//
// Iteration order is ascending id. Recommendation tie-breaks depend on it,
// so the backing map stays ordered.
// ---------------------------------------------------------------------------

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::{Whiskey, WhiskeyType};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
	Inserted,
	/// An item with this id already exists; the catalog is unchanged.
	Duplicate,
}

// ---------------------------------------------------------------------------
// Sort keys
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
	Name,
	Price,
	Strength,
	Age,
}

impl SortKey {
	pub fn parse(key: &str) -> Option<Self> {
		match key.trim().to_lowercase().as_str() {
			"name" => Some(Self::Name),
			"price" => Some(Self::Price),
			"strength" | "alcohol_percentage" | "abv" => Some(Self::Strength),
			"age" | "age_years" => Some(Self::Age),
			_ => None,
		}
	}
}

/// Partial update applied by [`Catalog::update`]. `None` fields are left
/// alone; for `age_years`, `Some(None)` clears the age.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhiskeyUpdate {
	pub name: Option<String>,
	pub price: Option<f64>,
	#[serde(default, deserialize_with = "double_option")]
	pub age_years: Option<Option<u32>>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<u32>>, D::Error>
where
	D: serde::Deserializer<'de>,
{
	Option::<u32>::deserialize(deserializer).map(Some)
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Catalog {
	items: BTreeMap<String, Whiskey>,
}

impl Catalog {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a whiskey. A second insert with the same id is ignored.
	pub fn insert(&mut self, whiskey: Whiskey) -> InsertOutcome {
		if self.items.contains_key(&whiskey.id) {
			tracing::warn!(id = %whiskey.id, "Whiskey id already exists; not added");
			return InsertOutcome::Duplicate;
		}
		self.items.insert(whiskey.id.clone(), whiskey);
		InsertOutcome::Inserted
	}

	pub fn get(&self, id: &str) -> Option<&Whiskey> {
		self.items.get(id)
	}

	pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Whiskey> {
		self.items.get_mut(id)
	}

	pub fn contains(&self, id: &str) -> bool {
		self.items.contains_key(id)
	}

	/// Copy of the whole catalog. Mutating the copy does not touch the catalog.
	pub fn all(&self) -> BTreeMap<String, Whiskey> {
		self.items.clone()
	}

	/// Borrowing iterator in catalog order.
	pub fn iter(&self) -> impl Iterator<Item = &Whiskey> {
		self.items.values()
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Case-insensitive substring match on name. An empty or absent term
	/// matches everything.
	pub fn search(&self, term: Option<&str>) -> Vec<&Whiskey> {
		let term = term.unwrap_or_default();
		if term.is_empty() {
			return self.items.values().collect();
		}
		let needle = term.to_lowercase();
		let results: Vec<&Whiskey> = self
			.items
			.values()
			.filter(|w| w.name.to_lowercase().contains(&needle))
			.collect();
		tracing::debug!(term, found = results.len(), "Catalog search");
		results
	}

	pub fn filter_by_type(&self, whiskey_type: WhiskeyType) -> Vec<&Whiskey> {
		self.items
			.values()
			.filter(|w| w.whiskey_type == whiskey_type)
			.collect()
	}

	/// Apply a partial update. Returns `false` if the id is unknown.
	pub fn update(&mut self, id: &str, update: WhiskeyUpdate) -> bool {
		let Some(whiskey) = self.items.get_mut(id) else {
			tracing::warn!(id, "Whiskey not found for update");
			return false;
		};
		if let Some(name) = update.name {
			if name.trim().is_empty() {
				tracing::warn!(id, "Ignoring empty name in update");
			} else {
				whiskey.name = name;
			}
		}
		if let Some(price) = update.price {
			if price.is_finite() && price >= 0.0 {
				whiskey.price = Some(price);
			} else {
				tracing::warn!(id, price, "Ignoring invalid price in update");
			}
		}
		if let Some(age) = update.age_years {
			match age {
				Some(0) => tracing::warn!(id, "Ignoring zero age in update"),
				other => whiskey.age_years = other,
			}
		}
		true
	}

	/// Administrative removal. Absent ids are a no-op.
	pub fn remove(&mut self, id: &str) -> Option<Whiskey> {
		let removed = self.items.remove(id);
		match &removed {
			Some(w) => tracing::info!(id, name = %w.name, "Whiskey removed"),
			None => tracing::warn!(id, "Whiskey not found for removal"),
		}
		removed
	}
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Sort by a named key. Unknown keys return the input unchanged.
pub fn sort_whiskeys<'a>(items: Vec<&'a Whiskey>, key: &str, descending: bool) -> Vec<&'a Whiskey> {
	match SortKey::parse(key) {
		Some(k) => sort_by_key(items, k, descending),
		None => {
			tracing::warn!(key, "Unknown sort key; returning input order");
			items
		}
	}
}

/// Stable sort. Items missing the key go last in either direction.
pub fn sort_by_key<'a>(items: Vec<&'a Whiskey>, key: SortKey, descending: bool) -> Vec<&'a Whiskey> {
	if key == SortKey::Name {
		let mut sorted = items;
		sorted.sort_by(|a, b| {
			let ord = a.name.to_lowercase().cmp(&b.name.to_lowercase());
			if descending { ord.reverse() } else { ord }
		});
		return sorted;
	}

	let value = |w: &Whiskey| -> Option<f64> {
		match key {
			SortKey::Price => w.price,
			SortKey::Strength => Some(w.alcohol_percentage),
			SortKey::Age => w.age_years.map(f64::from),
			SortKey::Name => None,
		}
	};

	let (mut present, absent): (Vec<&Whiskey>, Vec<&Whiskey>) =
		items.into_iter().partition(|w| value(w).is_some());

	present.sort_by(|a, b| {
		let ord = match (value(a), value(b)) {
			(Some(x), Some(y)) => x.total_cmp(&y),
			_ => Ordering::Equal,
		};
		if descending { ord.reverse() } else { ord }
	});
	present.extend(absent);
	present
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::taste::TasteProfile;

	fn whiskey(id: &str, name: &str, price: Option<f64>, age: Option<u32>) -> Whiskey {
		let mut w = Whiskey::new(id, name, TasteProfile::default(), WhiskeyType::SingleMalt)
			.with_strength(40.0 + id.len() as f64);
		w.price = price;
		w.age_years = age;
		w
	}

	fn sample() -> Catalog {
		let mut c = Catalog::new();
		c.insert(whiskey("a", "Ardbeg Ten", Some(55.0), Some(10)));
		c.insert(whiskey("b", "Buffalo Trace", Some(30.0), None));
		c.insert(whiskey("c", "caol ila 12", None, Some(12)));
		c.insert(whiskey("d", "Dalmore", Some(80.0), Some(15)));
		c
	}

	fn ids(items: &[&Whiskey]) -> Vec<String> {
		items.iter().map(|w| w.id.clone()).collect()
	}

	#[test]
	fn duplicate_insert_keeps_first() {
		let mut c = Catalog::new();
		assert_eq!(c.insert(whiskey("w1", "First", None, None)), InsertOutcome::Inserted);
		assert_eq!(c.insert(whiskey("w1", "Second", None, None)), InsertOutcome::Duplicate);
		assert_eq!(c.len(), 1);
		assert_eq!(c.get("w1").unwrap().name, "First");
	}

	#[test]
	fn get_missing_is_none() {
		assert!(sample().get("zzz").is_none());
	}

	#[test]
	fn all_is_a_copy() {
		let c = sample();
		let mut copy = c.all();
		copy.remove("a");
		copy.get_mut("b").unwrap().name = "Changed".into();
		assert_eq!(c.len(), 4);
		assert_eq!(c.get("b").unwrap().name, "Buffalo Trace");
	}

	#[test]
	fn empty_search_returns_everything() {
		let c = sample();
		assert_eq!(c.search(Some("")).len(), 4);
		assert_eq!(c.search(None).len(), 4);
	}

	#[test]
	fn search_is_case_insensitive_substring() {
		let c = sample();
		let found = c.search(Some("CAOL"));
		assert_eq!(ids(&found), vec!["c"]);
		let found = c.search(Some("a"));
		// Every name containing an "a" in any case.
		assert_eq!(ids(&found), vec!["a", "b", "c", "d"]);
		assert!(c.search(Some("glen")).is_empty());
	}

	#[test]
	fn search_term_whitespace_is_significant() {
		let mut c = Catalog::new();
		c.insert(Whiskey::new("a", "Sweet One", TasteProfile::default(), WhiskeyType::Bourbon));
		c.insert(Whiskey::new("b", "Sweetness", TasteProfile::default(), WhiskeyType::Bourbon));
		assert_eq!(ids(&c.search(Some("sweet "))), vec!["a"]);
		assert!(c.search(Some("   ")).is_empty());
		assert_eq!(c.search(Some("")).len(), 2);
	}

	#[test]
	fn sort_by_name_ignores_case() {
		let c = sample();
		let sorted = sort_whiskeys(c.search(None), "name", false);
		assert_eq!(ids(&sorted), vec!["a", "b", "c", "d"]);
		let sorted = sort_whiskeys(c.search(None), "name", true);
		assert_eq!(ids(&sorted), vec!["d", "c", "b", "a"]);
	}

	#[test]
	fn sort_price_absent_last_both_directions() {
		let c = sample();
		let asc = sort_whiskeys(c.search(None), "price", false);
		assert_eq!(ids(&asc), vec!["b", "a", "d", "c"]);
		let desc = sort_whiskeys(c.search(None), "price", true);
		assert_eq!(ids(&desc), vec!["d", "a", "b", "c"]);
	}

	#[test]
	fn sort_age_absent_last_both_directions() {
		let c = sample();
		let asc = sort_whiskeys(c.search(None), "age", false);
		assert_eq!(ids(&asc), vec!["a", "c", "d", "b"]);
		let desc = sort_whiskeys(c.search(None), "age", true);
		assert_eq!(ids(&desc), vec!["d", "c", "a", "b"]);
	}

	#[test]
	fn sort_strength() {
		let mut c = Catalog::new();
		c.insert(whiskey("x", "X", None, None).with_strength(46.0));
		c.insert(whiskey("y", "Y", None, None).with_strength(40.0));
		let sorted = sort_whiskeys(c.search(None), "strength", false);
		assert_eq!(ids(&sorted), vec!["y", "x"]);
	}

	#[test]
	fn unknown_sort_key_returns_input() {
		let c = sample();
		let input = c.search(None);
		let expected = ids(&input);
		let sorted = sort_whiskeys(input, "colour", true);
		assert_eq!(ids(&sorted), expected);
	}

	#[test]
	fn remove_and_remove_missing() {
		let mut c = sample();
		assert!(c.remove("a").is_some());
		assert!(c.remove("a").is_none());
		assert_eq!(c.len(), 3);
	}

	#[test]
	fn update_applies_valid_fields_only() {
		let mut c = sample();
		let ok = c.update(
			"a",
			WhiskeyUpdate {
				name: Some("Ardbeg 10".into()),
				price: Some(-5.0),
				age_years: Some(None),
			},
		);
		assert!(ok);
		let a = c.get("a").unwrap();
		assert_eq!(a.name, "Ardbeg 10");
		assert_eq!(a.price, Some(55.0));
		assert_eq!(a.age_years, None);
		assert!(!c.update("missing", WhiskeyUpdate::default()));
	}

	#[test]
	fn filter_by_type_matches_category() {
		let mut c = sample();
		c.insert(Whiskey::new("e", "Redbreast", TasteProfile::default(), WhiskeyType::Irish));
		let irish = c.filter_by_type(WhiskeyType::Irish);
		assert_eq!(ids(&irish), vec!["e"]);
	}
}
