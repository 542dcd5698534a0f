// ---------------------------------------------------------------------------
// Persistence — JSON record files with per-record tolerance
// ---------------------------------------------------------------------------
//
// Three files, one per stream:
//
//   whiskey_catalog.json   { "<id>": { name, taste_profile: [4], ... } }
//   user_data.json         { user_info, preference, history, review_ids }
//   reviews.json           { "<review id>": { user_id, whiskey_id, ... } }
//
// A missing file is "nothing to load". A file whose top level is not the
// expected shape is a stream-level `Corruption`. Inside a stream, any
// record that fails to deserialize is skipped and counted.
//
// Writes go to a sibling `.tmp` file which is then renamed over the target.
// ---------------------------------------------------------------------------

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::profile::UserProfile;
use crate::review::{RatingScale, Review, ReviewStore};
use crate::taste::{TASTE_ARITY, TasteDimension, TasteProfile};
use crate::types::{Whiskey, WhiskeyType};

pub const CATALOG_FILE: &str = "whiskey_catalog.json";
pub const PROFILE_FILE: &str = "user_data.json";
pub const REVIEWS_FILE: &str = "reviews.json";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PersistenceError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Corruption: {0}")]
	Corruption(String),
	#[error("Serialization: {0}")]
	Serialization(String),
}

/// Records that survived a load plus how many were skipped.
#[derive(Debug)]
pub struct LoadedRecords<T> {
	pub records: Vec<T>,
	pub skipped: usize,
}

impl<T> Default for LoadedRecords<T> {
	fn default() -> Self {
		Self {
			records: Vec::new(),
			skipped: 0,
		}
	}
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

pub fn format_timestamp(at: &DateTime<Utc>) -> String {
	at.to_rfc3339()
}

/// RFC 3339, or a naive ISO-8601 date-time taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
	if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
		return Some(dt.with_timezone(&Utc));
	}
	NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
		.or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
		.ok()
		.map(|naive| naive.and_utc())
}

// ---------------------------------------------------------------------------
// Record shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct CatalogRecord {
	name: String,
	taste_profile: [u8; TASTE_ARITY],
	#[serde(default)]
	origin: Option<String>,
	#[serde(default)]
	price: Option<f64>,
	#[serde(default)]
	alcohol_percentage: f64,
	#[serde(rename = "type")]
	whiskey_type: WhiskeyType,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	image_path: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	age_years: Option<u32>,
	#[serde(default)]
	user_review_ids: Vec<String>,
}

impl CatalogRecord {
	fn from_whiskey(w: &Whiskey) -> Self {
		Self {
			name: w.name.clone(),
			taste_profile: w.taste.vector(),
			origin: w.origin.clone(),
			price: w.price,
			alcohol_percentage: w.alcohol_percentage,
			whiskey_type: w.whiskey_type,
			image_path: w.image_path.clone(),
			age_years: w.age_years,
			user_review_ids: w.user_review_ids.clone(),
		}
	}

	fn into_whiskey(self, id: &str) -> Whiskey {
		let mut w = Whiskey::new(
			id,
			self.name,
			TasteProfile::from_vector(self.taste_profile),
			self.whiskey_type,
		);
		w.origin = self.origin;
		w.price = self.price;
		w.alcohol_percentage = self.alcohol_percentage;
		w.image_path = self.image_path;
		w.age_years = self.age_years;
		w.user_review_ids = self.user_review_ids;
		w
	}
}

#[derive(Debug, Serialize, Deserialize)]
struct ReviewRecord {
	user_id: String,
	whiskey_id: String,
	rating: i64,
	#[serde(default)]
	review_text: String,
	review_date: String,
}

// Profile sections are written typed and read back field by field, so a
// single bad value never costs the whole user.

#[derive(Debug, Serialize)]
struct UserInfoRecord {
	user_id: String,
	user_name: Option<String>,
	user_age: Option<u32>,
	user_sex: Option<bool>,
}

#[derive(Debug, Serialize)]
struct PreferenceRecord {
	sweetness: Option<f64>,
	smoky: Option<f64>,
	fruity: Option<f64>,
	spicy: Option<f64>,
	price_range: [Option<f64>; 2],
}

#[derive(Debug, Serialize)]
struct HistoryRecord {
	viewed: Vec<serde_json::Value>,
	collection: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ProfileRecord {
	user_info: UserInfoRecord,
	preference: PreferenceRecord,
	history: HistoryRecord,
	review_ids: Vec<String>,
}

// ---------------------------------------------------------------------------
// File I/O helpers
// ---------------------------------------------------------------------------

/// Read and parse a JSON file. `Ok(None)` if the file does not exist.
fn read_json(path: &Path) -> Result<Option<serde_json::Value>, PersistenceError> {
	let text = match fs::read_to_string(path) {
		Ok(t) => t,
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
			tracing::info!(path = %path.display(), "No file to load");
			return Ok(None);
		}
		Err(e) => return Err(PersistenceError::Io(e)),
	};
	serde_json::from_str(&text)
		.map(Some)
		.map_err(|e| PersistenceError::Corruption(format!("Invalid JSON in {}: {}", path.display(), e)))
}

fn read_object(path: &Path) -> Result<Option<serde_json::Map<String, serde_json::Value>>, PersistenceError> {
	match read_json(path)? {
		None => Ok(None),
		Some(serde_json::Value::Object(map)) => Ok(Some(map)),
		Some(_) => Err(PersistenceError::Corruption(format!(
			"Expected a JSON object at top level of {}",
			path.display()
		))),
	}
}

fn temp_path(path: &Path) -> PathBuf {
	let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
	name.push(".tmp");
	path.with_file_name(name)
}

/// Serialize `value` to a sibling temp file, then rename over `path`.
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistenceError> {
	if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
		fs::create_dir_all(parent)?;
	}
	let json = serde_json::to_vec_pretty(value)
		.map_err(|e| PersistenceError::Serialization(format!("Failed to serialize {}: {}", path.display(), e)))?;

	let tmp = temp_path(path);
	let mut file = fs::File::create(&tmp)?;
	file.write_all(&json)?;
	file.sync_all()?;
	drop(file);
	fs::rename(&tmp, path)?;
	Ok(())
}

// ---------------------------------------------------------------------------
// Catalog stream
// ---------------------------------------------------------------------------

pub fn save_catalog(path: &Path, catalog: &Catalog) -> Result<(), PersistenceError> {
	let records: serde_json::Map<String, serde_json::Value> = catalog
		.iter()
		.map(|w| {
			serde_json::to_value(CatalogRecord::from_whiskey(w))
				.map(|v| (w.id.clone(), v))
				.map_err(|e| PersistenceError::Serialization(e.to_string()))
		})
		.collect::<Result<_, _>>()?;
	write_json_atomic(path, &records)?;
	tracing::info!(path = %path.display(), count = records.len(), "Catalog saved");
	Ok(())
}

/// `Ok(None)` if the file does not exist.
pub fn load_catalog(path: &Path) -> Result<Option<LoadedRecords<Whiskey>>, PersistenceError> {
	let Some(map) = read_object(path)? else {
		return Ok(None);
	};
	let mut loaded = LoadedRecords::default();
	for (id, value) in map {
		match serde_json::from_value::<CatalogRecord>(value) {
			Ok(record) => loaded.records.push(record.into_whiskey(&id)),
			Err(e) => {
				tracing::warn!(id = %id, error = %e, "Skipping invalid whiskey record");
				loaded.skipped += 1;
			}
		}
	}
	tracing::info!(
		loaded = loaded.records.len(),
		skipped = loaded.skipped,
		"Catalog loaded"
	);
	Ok(Some(loaded))
}

// ---------------------------------------------------------------------------
// Review stream
// ---------------------------------------------------------------------------

pub fn save_reviews(path: &Path, reviews: &ReviewStore) -> Result<(), PersistenceError> {
	let records: serde_json::Map<String, serde_json::Value> = reviews
		.iter()
		.map(|r| {
			let record = ReviewRecord {
				user_id: r.user_id.clone(),
				whiskey_id: r.whiskey_id.clone(),
				rating: i64::from(r.rating),
				review_text: r.review_text.clone(),
				review_date: format_timestamp(&r.review_date),
			};
			serde_json::to_value(record)
				.map(|v| (r.review_id.clone(), v))
				.map_err(|e| PersistenceError::Serialization(e.to_string()))
		})
		.collect::<Result<_, _>>()?;
	write_json_atomic(path, &records)?;
	tracing::info!(path = %path.display(), count = records.len(), "Reviews saved");
	Ok(())
}

/// `Ok(None)` if the file does not exist. Ratings are clamped into `scale`.
pub fn load_reviews(
	path: &Path,
	scale: RatingScale,
) -> Result<Option<LoadedRecords<Review>>, PersistenceError> {
	let Some(map) = read_object(path)? else {
		return Ok(None);
	};
	let mut loaded = LoadedRecords::default();
	for (id, value) in map {
		let record = match serde_json::from_value::<ReviewRecord>(value) {
			Ok(r) => r,
			Err(e) => {
				tracing::warn!(id = %id, error = %e, "Skipping invalid review record");
				loaded.skipped += 1;
				continue;
			}
		};
		let Some(review_date) = parse_timestamp(&record.review_date) else {
			tracing::warn!(id = %id, date = %record.review_date, "Skipping review with bad date");
			loaded.skipped += 1;
			continue;
		};
		loaded.records.push(Review {
			review_id: id,
			user_id: record.user_id,
			whiskey_id: record.whiskey_id,
			rating: scale.clamp(record.rating),
			review_text: record.review_text,
			review_date,
		});
	}
	tracing::info!(
		loaded = loaded.records.len(),
		skipped = loaded.skipped,
		"Reviews loaded"
	);
	Ok(Some(loaded))
}

// ---------------------------------------------------------------------------
// Profile stream
// ---------------------------------------------------------------------------

pub fn save_profile(path: &Path, profile: &UserProfile) -> Result<(), PersistenceError> {
	let taste = profile.preference.taste;
	let (min, max) = profile.preference.price_range();
	let record = ProfileRecord {
		user_info: UserInfoRecord {
			user_id: profile.info.user_id.clone(),
			user_name: Some(profile.info.user_name.clone()),
			user_age: profile.info.user_age,
			user_sex: profile.info.user_sex,
		},
		preference: PreferenceRecord {
			sweetness: Some(f64::from(taste.sweetness)),
			smoky: Some(f64::from(taste.smoky)),
			fruity: Some(f64::from(taste.fruity)),
			spicy: Some(f64::from(taste.spicy)),
			price_range: [min, max],
		},
		history: HistoryRecord {
			viewed: profile
				.history
				.viewed_in_order()
				.map(|e| serde_json::json!([e.whiskey_id, format_timestamp(&e.viewed_at)]))
				.collect(),
			collection: profile.history.collection().to_vec(),
		},
		review_ids: profile.review_ids.clone(),
	};
	write_json_atomic(path, &record)?;
	tracing::info!(path = %path.display(), user_id = %profile.info.user_id, "Profile saved");
	Ok(())
}

/// Load the single-user profile.
///
/// `Ok(None)` if the file is missing. A file without a usable `user_info`
/// is `Corruption`. Everything else is read value by value: a missing or
/// malformed section falls back to defaults, and a bad preference value,
/// price bound, viewed entry, collection id or review id is skipped with a
/// warning.
pub fn load_profile(path: &Path, viewed_capacity: usize) -> Result<Option<UserProfile>, PersistenceError> {
	let Some(record) = read_object(path)? else {
		return Ok(None);
	};

	let info = record
		.get("user_info")
		.and_then(serde_json::Value::as_object)
		.ok_or_else(|| PersistenceError::Corruption("Profile record has no user_info object".into()))?;
	let user_id = info
		.get("user_id")
		.and_then(serde_json::Value::as_str)
		.filter(|id| !id.trim().is_empty())
		.ok_or_else(|| PersistenceError::Corruption("Profile user_info has no valid user_id".into()))?;
	let user_name = info
		.get("user_name")
		.and_then(serde_json::Value::as_str)
		.unwrap_or("Unknown");

	let mut profile = UserProfile::new(user_id, user_name, viewed_capacity);
	profile.info.user_age = optional_field(info, "user_age", |v| {
		v.as_u64().and_then(|n| u32::try_from(n).ok())
	});
	profile.info.user_sex = optional_field(info, "user_sex", serde_json::Value::as_bool);

	match record.get("preference") {
		Some(serde_json::Value::Object(pref)) => apply_preference(&mut profile, pref),
		None | Some(serde_json::Value::Null) => {}
		Some(other) => tracing::warn!(value = %other, "Ignoring malformed preference section"),
	}

	let empty = serde_json::Map::new();
	let history = match record.get("history") {
		Some(serde_json::Value::Object(h)) => h,
		None | Some(serde_json::Value::Null) => &empty,
		Some(other) => {
			tracing::warn!(value = %other, "Ignoring malformed history section");
			&empty
		}
	};

	let mut skipped_views = 0usize;
	for entry in array_field(history, "viewed") {
		match serde_json::from_value::<(String, String)>(entry.clone()) {
			Ok((id, at)) => match parse_timestamp(&at) {
				Some(viewed_at) => profile.history.push_viewed(&id, viewed_at),
				None => {
					tracing::warn!(id = %id, at = %at, "Skipping viewed entry with bad timestamp");
					skipped_views += 1;
				}
			},
			Err(e) => {
				tracing::warn!(error = %e, "Skipping malformed viewed entry");
				skipped_views += 1;
			}
		}
	}
	for id in string_entries(array_field(history, "collection"), "collection") {
		profile.history.add_to_collection(id);
	}
	for id in string_entries(array_field(&record, "review_ids"), "review_ids") {
		profile.add_review_id(id);
	}

	tracing::info!(
		user_id = %profile.info.user_id,
		viewed = profile.history.recently_viewed(None).len(),
		skipped_views,
		"Profile loaded"
	);
	Ok(Some(profile))
}

/// Absent or `null` is `None`; a value `parse` rejects is logged and `None`.
fn optional_field<T>(
	map: &serde_json::Map<String, serde_json::Value>,
	key: &str,
	parse: impl Fn(&serde_json::Value) -> Option<T>,
) -> Option<T> {
	match map.get(key) {
		None | Some(serde_json::Value::Null) => None,
		Some(value) => {
			let parsed = parse(value);
			if parsed.is_none() {
				tracing::warn!(key, value = %value, "Ignoring invalid profile field");
			}
			parsed
		}
	}
}

fn array_field<'a>(
	map: &'a serde_json::Map<String, serde_json::Value>,
	key: &str,
) -> &'a [serde_json::Value] {
	match map.get(key) {
		Some(serde_json::Value::Array(items)) => items,
		None | Some(serde_json::Value::Null) => &[],
		Some(other) => {
			tracing::warn!(key, value = %other, "Expected an array; ignoring");
			&[]
		}
	}
}

fn string_entries<'a>(items: &'a [serde_json::Value], key: &'a str) -> impl Iterator<Item = &'a str> {
	items.iter().filter_map(move |item| {
		let id = item.as_str();
		if id.is_none() {
			tracing::warn!(key, value = %item, "Skipping non-string entry");
		}
		id
	})
}

/// Each dimension and price bound is applied on its own; a bad one keeps
/// the value already in place.
fn apply_preference(profile: &mut UserProfile, pref: &serde_json::Map<String, serde_json::Value>) {
	for dim in TasteDimension::ALL {
		if let Some(v) = optional_field(pref, dim.as_str(), serde_json::Value::as_f64) {
			profile.preference.update_preference(dim.as_str(), v);
		}
	}

	let (mut min, mut max) = profile.preference.price_range();
	match pref.get("price_range") {
		Some(serde_json::Value::Array(bounds)) if bounds.len() == 2 => {
			for (slot, bound) in [&mut min, &mut max].into_iter().zip(bounds) {
				match bound {
					serde_json::Value::Null => *slot = None,
					other => match other.as_f64() {
						Some(v) => *slot = Some(v),
						None => tracing::warn!(value = %other, "Ignoring invalid price bound"),
					},
				}
			}
		}
		None | Some(serde_json::Value::Null) => {}
		Some(other) => tracing::warn!(value = %other, "Ignoring malformed price_range"),
	}
	profile.preference.update_price_range(min, max);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
