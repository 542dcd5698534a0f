// ---------------------------------------------------------------------------
// DramServer — JSON-RPC dispatcher
// ---------------------------------------------------------------------------
//
// Reads JSON-RPC 2.0 requests (NDJSON over stdin), routes them to `Cellar`
// operations, and writes one response per request. A `dispatch()` match
// plus free-standing handler functions per method. State is saved when
// stdin closes.
// ---------------------------------------------------------------------------

use std::io::{self, BufRead};

use serde::Serialize;

use crate::cellar::Cellar;
use crate::error::DramError;
use crate::profile::{PreferenceUpdate, PriceRangeUpdate, UserInfoUpdate};
use crate::protocol::*;
use crate::recommendation::StrategyKind;
use crate::taste::TasteProfile;
use crate::transport::NdjsonTransport;
use crate::types::{Whiskey, WhiskeyType};

const DEFAULT_RECOMMEND_COUNT: usize = 5;

pub struct DramServer {
	transport: NdjsonTransport,
	cellar: Cellar,
}

impl DramServer {
	pub fn new(transport: NdjsonTransport, cellar: Cellar) -> Self {
		Self { transport, cellar }
	}

	/// Main loop: one request per line until stdin closes.
	pub fn run(&mut self) -> Result<(), DramError> {
		let stdin = io::stdin();
		let reader = stdin.lock();

		for line_result in reader.lines() {
			let line = line_result?;
			if line.trim().is_empty() {
				continue;
			}

			let request: JsonRpcRequest = match serde_json::from_str(&line) {
				Ok(r) => r,
				Err(e) => {
					tracing::error!("Failed to parse request: {}", e);
					continue;
				}
			};

			self.dispatch(request);
		}

		tracing::info!("stdin closed; saving state");
		self.cellar.save_state()?;
		Ok(())
	}

	// ── Dispatch ──────────────────────────────────────────────────────────

	fn dispatch(&mut self, req: JsonRpcRequest) {
		let id = req.id;
		let c = &mut self.cellar;
		let result = match req.method.as_str() {
			// -- User ----------------------------------------------------
			"user/register" => handle_register(c, req.params),
			"user/current" => to_json(&c.current_profile()),
			"user/update" => {
				parse_params::<UserInfoUpdate>(req.params).and_then(|p| to_json(c.update_user_info(p)?))
			}
			"user/updatePreference" => handle_update_preference(c, req.params),
			"user/updatePriceRange" => handle_update_price_range(c, req.params),
			"user/addToCollection" => parse_params::<IdParams>(req.params).and_then(|p| {
				let added = c.add_to_collection(&p.id)?;
				Ok(serde_json::json!({ "added": added }))
			}),
			"user/removeFromCollection" => parse_params::<IdParams>(req.params).and_then(|p| {
				let removed = c.remove_from_collection(&p.id)?;
				Ok(serde_json::json!({ "removed": removed }))
			}),
			"user/recentlyViewed" => parse_params::<RecentlyViewedParams>(req.params)
				.and_then(|p| to_json(&c.recently_viewed(p.count)?)),
			"user/clearHistory" => parse_params::<ClearHistoryParams>(req.params).and_then(|p| {
				c.clear_history(p.viewed.unwrap_or(true), p.collection.unwrap_or(false))?;
				Ok(serde_json::json!({}))
			}),

			// -- Catalog -------------------------------------------------
			"catalog/list" => to_json(&c.list_catalog()),
			"catalog/get" => {
				parse_params::<IdParams>(req.params).and_then(|p| to_json(&c.whiskey_details(&p.id)))
			}
			"catalog/view" => {
				parse_params::<IdParams>(req.params).and_then(|p| to_json(&c.view_whiskey(&p.id)))
			}
			"catalog/search" => parse_params::<SearchParams>(req.params).and_then(|p| {
				to_json(&c.search(
					p.term.as_deref(),
					p.sort_by.as_deref(),
					p.descending.unwrap_or(false),
				))
			}),
			"catalog/filterByType" => handle_filter_by_type(c, req.params),
			"catalog/add" => handle_add_whiskey(c, req.params),
			"catalog/update" => parse_params::<UpdateWhiskeyParams>(req.params).and_then(|p| {
				let updated = c.update_whiskey(&p.id, p.update);
				Ok(serde_json::json!({ "updated": updated }))
			}),
			"catalog/remove" => parse_params::<IdParams>(req.params).and_then(|p| {
				let removed = c.remove_whiskey(&p.id).is_some();
				Ok(serde_json::json!({ "removed": removed }))
			}),

			// -- Reviews -------------------------------------------------
			"review/create" => parse_params::<CreateReviewParams>(req.params).and_then(|p| {
				let review = c.create_review(&p.whiskey_id, p.rating, p.text.as_deref().unwrap_or(""))?;
				to_json(&review)
			}),
			"review/update" => parse_params::<UpdateReviewParams>(req.params)
				.and_then(|p| to_json(&c.update_review(&p.review_id, p.rating, p.text)?)),
			"review/delete" => parse_params::<ReviewIdParams>(req.params)
				.and_then(|p| to_json(&c.delete_review(&p.review_id)?)),
			"review/forItem" => {
				parse_params::<IdParams>(req.params).and_then(|p| to_json(&c.reviews_for_whiskey(&p.id)))
			}
			"review/byUser" => handle_reviews_by_user(c, req.params),

			// -- Recommendations -----------------------------------------
			"recommend/get" => handle_recommend(c, req.params),

			// -- State ---------------------------------------------------
			"state/save" => c
				.save_state()
				.map(|saved| serde_json::json!({ "saved": saved })),
			"state/load" => {
				let report = c.load_state_with_report();
				Ok(serde_json::json!({
					"success": report.profile_loaded,
					"whiskeysLoaded": report.whiskeys_loaded,
					"whiskeysSkipped": report.whiskeys_skipped,
					"reviewsLoaded": report.reviews_loaded,
					"reviewsSkipped": report.reviews_skipped,
				}))
			}

			// -- Unknown -------------------------------------------------
			_ => {
				self.transport.write_method_not_found(id, &req.method);
				return;
			}
		};

		self.transport.write_outcome(id, result);
	}
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_params<T: serde::de::DeserializeOwned>(params: serde_json::Value) -> Result<T, DramError> {
	// Methods without params may send nothing at all.
	let params = if params.is_null() {
		serde_json::json!({})
	} else {
		params
	};
	serde_json::from_value(params).map_err(|e| DramError::Serialization(format!("Invalid params: {}", e)))
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, DramError> {
	serde_json::to_value(value).map_err(|e| DramError::Serialization(e.to_string()))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn handle_register(cellar: &mut Cellar, params: serde_json::Value) -> Result<serde_json::Value, DramError> {
	let p: RegisterParams = parse_params(params)?;
	let profile = cellar.register_user(&p.user_id, &p.user_name, p.user_age, p.user_sex)?;
	to_json(profile)
}

fn handle_update_preference(
	cellar: &mut Cellar,
	params: serde_json::Value,
) -> Result<serde_json::Value, DramError> {
	let p: UpdatePreferenceParams = parse_params(params)?;
	let value = match cellar.update_preference(&p.dimension, p.value)? {
		PreferenceUpdate::Updated { dimension, value } => serde_json::json!({
			"updated": true,
			"dimension": dimension.as_str(),
			"value": value,
		}),
		PreferenceUpdate::UnknownDimension => serde_json::json!({
			"updated": false,
			"reason": "unknownDimension",
		}),
		PreferenceUpdate::InvalidValue => serde_json::json!({
			"updated": false,
			"reason": "invalidValue",
		}),
	};
	Ok(value)
}

fn handle_update_price_range(
	cellar: &mut Cellar,
	params: serde_json::Value,
) -> Result<serde_json::Value, DramError> {
	let p: PriceRangeParams = parse_params(params)?;
	let value = match cellar.update_price_range(p.min, p.max)? {
		PriceRangeUpdate::Updated(range) => serde_json::json!({
			"updated": true, "swapped": false, "min": range.min, "max": range.max,
		}),
		PriceRangeUpdate::Swapped(range) => serde_json::json!({
			"updated": true, "swapped": true, "min": range.min, "max": range.max,
		}),
		PriceRangeUpdate::InvalidValue => serde_json::json!({
			"updated": false, "reason": "invalidValue",
		}),
	};
	Ok(value)
}

fn parse_whiskey_type(raw: &str) -> Result<WhiskeyType, DramError> {
	WhiskeyType::parse(raw).ok_or_else(|| DramError::Serialization(format!("Unknown whiskey type: {}", raw)))
}

fn handle_filter_by_type(cellar: &Cellar, params: serde_json::Value) -> Result<serde_json::Value, DramError> {
	let p: FilterByTypeParams = parse_params(params)?;
	let whiskey_type = parse_whiskey_type(&p.whiskey_type)?;
	to_json(&cellar.filter_by_type(whiskey_type))
}

fn handle_add_whiskey(cellar: &mut Cellar, params: serde_json::Value) -> Result<serde_json::Value, DramError> {
	let p: AddWhiskeyParams = parse_params(params)?;
	let whiskey_type = parse_whiskey_type(&p.whiskey_type)?;
	if p.id.trim().is_empty() || p.name.trim().is_empty() {
		return Err(DramError::Serialization("Whiskey id and name are required".into()));
	}
	let taste = TasteProfile::from_vector(p.taste_profile);

	let mut whiskey = Whiskey::new(p.id, p.name, taste, whiskey_type);
	whiskey.origin = p.origin;
	whiskey.price = p.price.filter(|v| v.is_finite() && *v >= 0.0);
	whiskey.alcohol_percentage = p.alcohol_percentage.unwrap_or_default();
	whiskey.age_years = p.age_years.filter(|&a| a > 0);
	whiskey.image_path = p.image_path;

	let outcome = cellar.add_whiskey(whiskey);
	Ok(serde_json::json!({ "added": outcome == crate::catalog::InsertOutcome::Inserted }))
}

fn handle_reviews_by_user(cellar: &Cellar, params: serde_json::Value) -> Result<serde_json::Value, DramError> {
	let p: UserIdParams = parse_params(params)?;
	let user_id = match p.user_id {
		Some(id) => id,
		None => cellar
			.current_profile()
			.map(|profile| profile.user_id().to_string())
			.ok_or(DramError::NoActiveProfile)?,
	};
	to_json(&cellar.reviews_by_user(&user_id))
}

fn handle_recommend(cellar: &Cellar, params: serde_json::Value) -> Result<serde_json::Value, DramError> {
	let p: RecommendParams = parse_params(params)?;
	let kind = match p.strategy.as_deref() {
		None => StrategyKind::PreferenceMatch,
		Some(raw) => StrategyKind::parse(raw)
			.ok_or_else(|| DramError::Serialization(format!("Unknown strategy: {}", raw)))?,
	};
	let count = p.count.unwrap_or(DEFAULT_RECOMMEND_COUNT);
	let results = cellar.recommend(count, kind, p.reference_id.as_deref())?;
	to_json(&results)
}
