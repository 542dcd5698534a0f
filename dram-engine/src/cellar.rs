// ---------------------------------------------------------------------------
// Cellar — aggregate root and collaborator-facing operations
// ---------------------------------------------------------------------------
//
// Owns the catalog, the (single) active profile, the review store and the
// recommendation engine. The entry point builds one and passes it by
// reference; nothing here is global.
//
// Reviews are the only cross-aggregate links. Creating or deleting one
// keeps three places in step: the review store, the whiskey's review ids
// and the profile's review ids (plus the history's reviewed set).
// ---------------------------------------------------------------------------

use crate::catalog::{Catalog, InsertOutcome, WhiskeyUpdate, sort_whiskeys};
use crate::config::DramConfig;
use crate::engine::RecommendationEngine;
use crate::error::DramError;
use crate::persistence;
use crate::profile::{PreferenceUpdate, PriceRangeUpdate, UserInfoUpdate, UserProfile, ViewedEntry};
use crate::recommendation::StrategyKind;
use crate::review::{Review, ReviewStore};
use crate::types::{Whiskey, WhiskeyDetails, WhiskeyInfo, WhiskeyType};

/// Per-stream outcome of [`Cellar::load_state_with_report`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
	/// `None` if no catalog file existed or it could not be read.
	pub whiskeys_loaded: Option<usize>,
	pub whiskeys_skipped: usize,
	pub profile_loaded: bool,
	pub reviews_loaded: Option<usize>,
	pub reviews_skipped: usize,
}

pub struct Cellar {
	config: DramConfig,
	catalog: Catalog,
	profile: Option<UserProfile>,
	reviews: ReviewStore,
	engine: RecommendationEngine,
}

impl Cellar {
	pub fn new(config: DramConfig) -> Self {
		let engine = RecommendationEngine::new(config.preference_weights, config.similarity);
		let reviews = ReviewStore::new(config.rating_scale);
		Self {
			config,
			catalog: Catalog::new(),
			profile: None,
			reviews,
			engine,
		}
	}

	/// Build and immediately load whatever the data directory holds.
	pub fn open(config: DramConfig) -> Self {
		let mut cellar = Self::new(config);
		cellar.load_state();
		cellar
	}

	pub fn config(&self) -> &DramConfig {
		&self.config
	}

	pub fn catalog(&self) -> &Catalog {
		&self.catalog
	}

	pub fn reviews(&self) -> &ReviewStore {
		&self.reviews
	}

	fn profile_mut(&mut self) -> Result<&mut UserProfile, DramError> {
		self.profile.as_mut().ok_or(DramError::NoActiveProfile)
	}

	fn profile_ref(&self) -> Result<&UserProfile, DramError> {
		self.profile.as_ref().ok_or(DramError::NoActiveProfile)
	}

	// -- Users ---------------------------------------------------------------

	/// Register the single active user. Saves right away when a data
	/// directory is configured; a failed save is logged, not returned.
	pub fn register_user(
		&mut self,
		user_id: &str,
		user_name: &str,
		user_age: Option<u32>,
		user_sex: Option<bool>,
	) -> Result<&UserProfile, DramError> {
		let user_id = user_id.trim();
		let user_name = user_name.trim();
		if user_id.is_empty() || user_name.is_empty() {
			return Err(DramError::InvalidUser("user id and name are required".into()));
		}
		if let Some(active) = &self.profile {
			return Err(DramError::UserAlreadyActive(active.user_id().to_string()));
		}

		let mut profile = UserProfile::new(user_id, user_name, self.config.viewed_capacity);
		profile.info.user_age = user_age;
		profile.info.user_sex = user_sex;
		tracing::info!(user_id, "User registered");
		self.profile = Some(profile);

		if self.config.data_dir.is_some() {
			if let Err(e) = self.save_state() {
				tracing::warn!(error = %e, "Failed to save state after registration");
			}
		}
		self.profile_ref()
	}

	pub fn current_profile(&self) -> Option<&UserProfile> {
		self.profile.as_ref()
	}

	pub fn update_user_info(&mut self, update: UserInfoUpdate) -> Result<&UserProfile, DramError> {
		let profile = self.profile_mut()?;
		profile.update_info(update);
		Ok(&*profile)
	}

	pub fn update_preference(&mut self, dimension: &str, value: f64) -> Result<PreferenceUpdate, DramError> {
		Ok(self.profile_mut()?.preference.update_preference(dimension, value))
	}

	pub fn update_price_range(
		&mut self,
		min: Option<f64>,
		max: Option<f64>,
	) -> Result<PriceRangeUpdate, DramError> {
		Ok(self.profile_mut()?.preference.update_price_range(min, max))
	}

	/// Returns `false` if the whiskey was already collected.
	pub fn add_to_collection(&mut self, whiskey_id: &str) -> Result<bool, DramError> {
		if !self.catalog.contains(whiskey_id) {
			return Err(DramError::ItemNotFound(whiskey_id.to_string()));
		}
		Ok(self.profile_mut()?.history.add_to_collection(whiskey_id))
	}

	pub fn remove_from_collection(&mut self, whiskey_id: &str) -> Result<bool, DramError> {
		Ok(self.profile_mut()?.history.remove_from_collection(whiskey_id))
	}

	pub fn recently_viewed(&self, count: Option<usize>) -> Result<Vec<ViewedEntry>, DramError> {
		Ok(self.profile_ref()?.history.recently_viewed(count))
	}

	pub fn clear_history(&mut self, viewed: bool, collection: bool) -> Result<(), DramError> {
		self.profile_mut()?.history.clear(viewed, collection);
		Ok(())
	}

	// -- Catalog -------------------------------------------------------------

	pub fn add_whiskey(&mut self, whiskey: Whiskey) -> InsertOutcome {
		self.catalog.insert(whiskey)
	}

	pub fn update_whiskey(&mut self, id: &str, update: WhiskeyUpdate) -> bool {
		self.catalog.update(id, update)
	}

	/// Administrative removal. Reviews of the item stay in the store; later
	/// recommendations simply never see the id again.
	pub fn remove_whiskey(&mut self, id: &str) -> Option<Whiskey> {
		self.catalog.remove(id)
	}

	pub fn list_catalog(&self) -> Vec<WhiskeyInfo> {
		self.catalog.iter().map(Whiskey::basic_info).collect()
	}

	pub fn whiskey_details(&self, id: &str) -> Option<WhiskeyDetails> {
		self.catalog.get(id).map(Whiskey::details)
	}

	/// Details plus a history entry for the active user, if any.
	pub fn view_whiskey(&mut self, id: &str) -> Option<WhiskeyDetails> {
		let details = self.catalog.get(id).map(Whiskey::details)?;
		if let Some(profile) = self.profile.as_mut() {
			profile.history.record_view(id);
		}
		Some(details)
	}

	/// Substring search, optionally sorted. An unknown sort key leaves the
	/// search order as is.
	pub fn search(&self, term: Option<&str>, sort_key: Option<&str>, descending: bool) -> Vec<WhiskeyInfo> {
		let found = self.catalog.search(term);
		let ordered = match sort_key {
			Some(key) => sort_whiskeys(found, key, descending),
			None => found,
		};
		ordered.into_iter().map(Whiskey::basic_info).collect()
	}

	pub fn filter_by_type(&self, whiskey_type: WhiskeyType) -> Vec<WhiskeyInfo> {
		self.catalog
			.filter_by_type(whiskey_type)
			.into_iter()
			.map(Whiskey::basic_info)
			.collect()
	}

	// -- Reviews -------------------------------------------------------------

	pub fn create_review(&mut self, whiskey_id: &str, rating: i64, text: &str) -> Result<Review, DramError> {
		let user_id = self.profile_ref()?.user_id().to_string();
		let Some(whiskey) = self.catalog.get_mut(whiskey_id) else {
			return Err(DramError::ItemNotFound(whiskey_id.to_string()));
		};
		let review = self.reviews.create(&user_id, whiskey_id, rating, text);
		whiskey.add_review_id(&review.review_id);
		let profile = self.profile_mut()?;
		profile.add_review_id(&review.review_id);
		profile.history.mark_reviewed(whiskey_id);
		Ok(review)
	}

	pub fn update_review(
		&mut self,
		review_id: &str,
		rating: Option<i64>,
		text: Option<String>,
	) -> Result<Review, DramError> {
		self.reviews
			.update(review_id, rating, text)
			.cloned()
			.ok_or_else(|| DramError::ReviewNotFound(review_id.to_string()))
	}

	/// Delete a review and every back-reference to it.
	pub fn delete_review(&mut self, review_id: &str) -> Result<Review, DramError> {
		let review = self
			.reviews
			.remove(review_id)
			.ok_or_else(|| DramError::ReviewNotFound(review_id.to_string()))?;
		if let Some(whiskey) = self.catalog.get_mut(&review.whiskey_id) {
			whiskey.remove_review_id(review_id);
		}
		let still_reviewed = self
			.reviews
			.iter()
			.any(|r| r.user_id == review.user_id && r.whiskey_id == review.whiskey_id);
		if let Some(profile) = self.profile.as_mut() {
			if profile.user_id() == review.user_id {
				profile.remove_review_id(review_id);
				if !still_reviewed {
					profile.history.unmark_reviewed(&review.whiskey_id);
				}
			}
		}
		tracing::info!(review_id, whiskey_id = %review.whiskey_id, "Review deleted");
		Ok(review)
	}

	pub fn reviews_for_whiskey(&self, whiskey_id: &str) -> Vec<Review> {
		self.reviews.for_whiskey(whiskey_id).into_iter().cloned().collect()
	}

	pub fn reviews_by_user(&self, user_id: &str) -> Vec<Review> {
		self.reviews.by_user(user_id).into_iter().cloned().collect()
	}

	// -- Recommendations -----------------------------------------------------

	pub fn recommend(
		&self,
		count: usize,
		kind: StrategyKind,
		reference_id: Option<&str>,
	) -> Result<Vec<WhiskeyInfo>, DramError> {
		self.engine
			.recommend(self.profile.as_ref(), &self.catalog, count, kind, reference_id)
	}

	// -- State ---------------------------------------------------------------

	/// Write every stream to the data directory.
	///
	/// Returns `Ok(false)` when there is no data directory. The profile file
	/// is only written while a user is active.
	pub fn save_state(&self) -> Result<bool, DramError> {
		let (Some(catalog_path), Some(profile_path), Some(reviews_path)) = (
			self.config.catalog_path(),
			self.config.profile_path(),
			self.config.reviews_path(),
		) else {
			tracing::info!("No data directory configured; nothing saved");
			return Ok(false);
		};

		persistence::save_catalog(&catalog_path, &self.catalog)?;
		match &self.profile {
			Some(profile) => persistence::save_profile(&profile_path, profile)?,
			None => tracing::info!("No active user; profile not saved"),
		}
		persistence::save_reviews(&reviews_path, &self.reviews)?;
		Ok(true)
	}

	/// Load every stream. The result is whether a profile was loaded.
	pub fn load_state(&mut self) -> bool {
		self.load_state_with_report().profile_loaded
	}

	/// Load every stream independently. A failing stream is logged and
	/// leaves the others alone.
	pub fn load_state_with_report(&mut self) -> LoadReport {
		let mut report = LoadReport::default();
		let (Some(catalog_path), Some(profile_path), Some(reviews_path)) = (
			self.config.catalog_path(),
			self.config.profile_path(),
			self.config.reviews_path(),
		) else {
			tracing::info!("No data directory configured; nothing loaded");
			return report;
		};

		match persistence::load_catalog(&catalog_path) {
			Ok(Some(loaded)) => {
				let mut catalog = Catalog::new();
				for whiskey in loaded.records {
					catalog.insert(whiskey);
				}
				report.whiskeys_loaded = Some(catalog.len());
				report.whiskeys_skipped = loaded.skipped;
				self.catalog = catalog;
			}
			Ok(None) => {}
			Err(e) => tracing::warn!(error = %e, "Catalog load failed; keeping current catalog"),
		}

		match persistence::load_profile(&profile_path, self.config.viewed_capacity) {
			Ok(Some(profile)) => {
				self.profile = Some(profile);
				report.profile_loaded = true;
			}
			Ok(None) => {}
			Err(e) => {
				tracing::warn!(error = %e, "Profile load failed");
				self.profile = None;
			}
		}

		match persistence::load_reviews(&reviews_path, self.config.rating_scale) {
			Ok(Some(loaded)) => {
				self.reviews.clear();
				report.reviews_loaded = Some(loaded.records.len());
				report.reviews_skipped = loaded.skipped;
				for review in loaded.records {
					self.reviews.insert(review);
				}
			}
			Ok(None) => {}
			Err(e) => tracing::warn!(error = %e, "Review load failed"),
		}

		self.sync_reviewed();
		tracing::info!(?report, "State loaded");
		report
	}

	/// Rebuild the active user's reviewed set from the review store.
	fn sync_reviewed(&mut self) {
		let Some(profile) = self.profile.as_mut() else {
			return;
		};
		profile.history.clear_reviewed();
		for review in self.reviews.by_user(profile.user_id()) {
			profile.history.mark_reviewed(&review.whiskey_id);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::taste::TasteProfile;

	fn stocked(config: DramConfig) -> Cellar {
		let mut cellar = Cellar::new(config);
		cellar.add_whiskey(
			Whiskey::new("w1", "Glenlivet 12", TasteProfile::new(4, 0, 4, 1), WhiskeyType::SingleMalt)
				.with_price(40.0),
		);
		cellar.add_whiskey(
			Whiskey::new("w2", "Laphroaig 10", TasteProfile::new(1, 5, 1, 2), WhiskeyType::SingleMalt)
				.with_price(50.0),
		);
		cellar
	}

	#[test]
	fn registration_rules() {
		let mut cellar = stocked(DramConfig::default());
		assert!(matches!(
			cellar.register_user("", "Alex", None, None),
			Err(DramError::InvalidUser(_))
		));
		let profile = cellar.register_user("u1", "Alex", Some(30), None).unwrap();
		assert_eq!(profile.preference.preference_vector(), [3, 3, 3, 3]);
		assert!(matches!(
			cellar.register_user("u2", "Sam", None, None),
			Err(DramError::UserAlreadyActive(ref id)) if id == "u1"
		));
	}

	#[test]
	fn profile_operations_need_a_user() {
		let mut cellar = stocked(DramConfig::default());
		assert!(matches!(
			cellar.update_preference("smoky", 5.0),
			Err(DramError::NoActiveProfile)
		));
		assert!(matches!(
			cellar.create_review("w1", 5, "x"),
			Err(DramError::NoActiveProfile)
		));
		assert!(matches!(
			cellar.recommend(3, StrategyKind::PreferenceMatch, None),
			Err(DramError::NoActiveProfile)
		));
	}

	#[test]
	fn review_lifecycle_keeps_back_references() {
		let mut cellar = stocked(DramConfig::default());
		cellar.register_user("u1", "Alex", None, None).unwrap();

		assert!(matches!(
			cellar.create_review("nope", 4, ""),
			Err(DramError::ItemNotFound(_))
		));

		let review = cellar.create_review("w1", 7, "Honeyed").unwrap();
		assert_eq!(review.rating, 5);
		assert_eq!(cellar.catalog().get("w1").unwrap().user_review_ids, vec![review.review_id.clone()]);
		let profile = cellar.current_profile().unwrap();
		assert_eq!(profile.review_ids, vec![review.review_id.clone()]);
		assert!(profile.history.reviewed().contains("w1"));

		let updated = cellar.update_review(&review.review_id, Some(3), None).unwrap();
		assert_eq!(updated.rating, 3);
		assert_eq!(updated.review_text, "Honeyed");

		cellar.delete_review(&review.review_id).unwrap();
		assert!(cellar.catalog().get("w1").unwrap().user_review_ids.is_empty());
		let profile = cellar.current_profile().unwrap();
		assert!(profile.review_ids.is_empty());
		assert!(!profile.history.reviewed().contains("w1"));
		assert!(matches!(
			cellar.delete_review(&review.review_id),
			Err(DramError::ReviewNotFound(_))
		));
	}

	#[test]
	fn viewing_records_history() {
		let mut cellar = stocked(DramConfig::default());
		assert!(cellar.view_whiskey("w1").is_some());
		cellar.register_user("u1", "Alex", None, None).unwrap();
		cellar.view_whiskey("w1");
		cellar.view_whiskey("w2");
		assert!(cellar.view_whiskey("missing").is_none());
		let viewed: Vec<String> = cellar
			.recently_viewed(None)
			.unwrap()
			.into_iter()
			.map(|e| e.whiskey_id)
			.collect();
		assert_eq!(viewed, vec!["w2", "w1"]);
	}

	#[test]
	fn collection_requires_known_whiskey() {
		let mut cellar = stocked(DramConfig::default());
		cellar.register_user("u1", "Alex", None, None).unwrap();
		assert!(cellar.add_to_collection("w2").unwrap());
		assert!(!cellar.add_to_collection("w2").unwrap());
		assert!(matches!(
			cellar.add_to_collection("ghost"),
			Err(DramError::ItemNotFound(_))
		));
		assert!(cellar.remove_from_collection("w2").unwrap());
	}

	#[test]
	fn search_with_sort() {
		let cellar = stocked(DramConfig::default());
		let by_price: Vec<String> = cellar
			.search(Some(""), Some("price"), true)
			.into_iter()
			.map(|w| w.id)
			.collect();
		assert_eq!(by_price, vec!["w2", "w1"]);
		assert_eq!(cellar.search(Some("LAPH"), None, false).len(), 1);
	}

	#[test]
	fn save_without_data_dir_is_noop() {
		let cellar = stocked(DramConfig::default());
		assert!(!cellar.save_state().unwrap());
	}

	#[test]
	fn registration_saves_when_data_dir_set() {
		let dir = tempfile::tempdir().unwrap();
		let config = DramConfig::default().with_data_dir(dir.path());
		let mut cellar = stocked(config.clone());
		cellar.register_user("u1", "Alex", None, None).unwrap();
		assert!(dir.path().join(persistence::PROFILE_FILE).exists());
		assert!(dir.path().join(persistence::CATALOG_FILE).exists());

		let reopened = Cellar::open(config);
		assert_eq!(reopened.current_profile().unwrap().user_id(), "u1");
		assert_eq!(reopened.catalog().len(), 2);
	}

	#[test]
	fn corrupt_profile_does_not_block_reviews() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join(persistence::PROFILE_FILE), "[]").unwrap();
		std::fs::write(
			dir.path().join(persistence::REVIEWS_FILE),
			r#"{"rev-1": {"user_id": "u1", "whiskey_id": "w1", "rating": 4, "review_date": "2024-01-01T00:00:00"}}"#,
		)
		.unwrap();
		let mut cellar = Cellar::new(DramConfig::default().with_data_dir(dir.path()));
		let report = cellar.load_state_with_report();
		assert!(!report.profile_loaded);
		assert_eq!(report.reviews_loaded, Some(1));
		assert_eq!(report.whiskeys_loaded, None);
		assert_eq!(cellar.reviews().len(), 1);
	}

	#[test]
	fn reload_drops_reviewed_ids_without_reviews() {
		let dir = tempfile::tempdir().unwrap();
		let config = DramConfig::default().with_data_dir(dir.path());
		let mut cellar = stocked(config);
		cellar.register_user("u1", "Alex", None, None).unwrap();
		cellar.create_review("w1", 4, "unsaved").unwrap();
		assert!(cellar.current_profile().unwrap().history.reviewed().contains("w1"));

		// Registration saved an empty review file; the profile file goes away
		// so the in-memory profile survives the reload.
		std::fs::remove_file(dir.path().join(persistence::PROFILE_FILE)).unwrap();
		let report = cellar.load_state_with_report();
		assert!(!report.profile_loaded);
		assert_eq!(report.reviews_loaded, Some(0));
		assert!(cellar.current_profile().unwrap().history.reviewed().is_empty());
	}

	#[test]
	fn duplicate_whiskey_is_ignored() {
		let mut cellar = stocked(DramConfig::default());
		let outcome = cellar.add_whiskey(Whiskey::new(
			"w1",
			"Impostor",
			TasteProfile::default(),
			WhiskeyType::Other,
		));
		assert_eq!(outcome, InsertOutcome::Duplicate);
		assert_eq!(cellar.catalog().get("w1").unwrap().name, "Glenlivet 12");
	}
}
