use serde::Deserialize;

use crate::catalog::WhiskeyUpdate;

// JSON-RPC 2.0 error codes
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const DRAM_ERROR: i32 = -32000;

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
	pub id: u64,
	pub method: String,
	#[serde(default)]
	pub params: serde_json::Value,
}

// ── User ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterParams {
	pub user_id: String,
	pub user_name: String,
	pub user_age: Option<u32>,
	pub user_sex: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferenceParams {
	pub dimension: String,
	pub value: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRangeParams {
	pub min: Option<f64>,
	pub max: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentlyViewedParams {
	pub count: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearHistoryParams {
	pub viewed: Option<bool>,
	pub collection: Option<bool>,
}

// ── Catalog ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdParams {
	pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
	pub term: Option<String>,
	pub sort_by: Option<String>,
	pub descending: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterByTypeParams {
	#[serde(rename = "type")]
	pub whiskey_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWhiskeyParams {
	pub id: String,
	pub name: String,
	pub taste_profile: [u8; 4],
	#[serde(rename = "type")]
	pub whiskey_type: String,
	pub origin: Option<String>,
	pub price: Option<f64>,
	pub alcohol_percentage: Option<f64>,
	pub age_years: Option<u32>,
	pub image_path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWhiskeyParams {
	pub id: String,
	#[serde(flatten)]
	pub update: WhiskeyUpdate,
}

// ── Reviews ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewParams {
	pub whiskey_id: String,
	pub rating: i64,
	pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewParams {
	pub review_id: String,
	pub rating: Option<i64>,
	pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewIdParams {
	pub review_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdParams {
	pub user_id: Option<String>,
}

// ── Recommendations ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendParams {
	pub count: Option<usize>,
	pub strategy: Option<String>,
	pub reference_id: Option<String>,
}
