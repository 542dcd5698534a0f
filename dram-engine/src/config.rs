use std::path::PathBuf;

use clap::Parser;

use crate::persistence::{CATALOG_FILE, PROFILE_FILE, REVIEWS_FILE};
use crate::profile::DEFAULT_VIEWED_CAPACITY;
use crate::recommendation::{
	DEFAULT_SIMILARITY_THRESHOLD, PreferenceWeights, SimilarityConfig, SimilarityWeights,
};
use crate::review::RatingScale;

// ---------------------------------------------------------------------------
// Library configuration
// ---------------------------------------------------------------------------

/// Runtime configuration for a [`crate::cellar::Cellar`].
///
/// `data_dir: None` keeps everything in memory; save and load become no-ops.
#[derive(Debug, Clone)]
pub struct DramConfig {
	pub data_dir: Option<PathBuf>,
	pub viewed_capacity: usize,
	pub preference_weights: PreferenceWeights,
	pub similarity: SimilarityConfig,
	pub rating_scale: RatingScale,
}

impl Default for DramConfig {
	fn default() -> Self {
		Self {
			data_dir: None,
			viewed_capacity: DEFAULT_VIEWED_CAPACITY,
			preference_weights: PreferenceWeights::default(),
			similarity: SimilarityConfig::default(),
			rating_scale: RatingScale::default(),
		}
	}
}

impl DramConfig {
	pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.data_dir = Some(dir.into());
		self
	}

	pub fn catalog_path(&self) -> Option<PathBuf> {
		self.data_dir.as_ref().map(|d| d.join(CATALOG_FILE))
	}

	pub fn profile_path(&self) -> Option<PathBuf> {
		self.data_dir.as_ref().map(|d| d.join(PROFILE_FILE))
	}

	pub fn reviews_path(&self) -> Option<PathBuf> {
		self.data_dir.as_ref().map(|d| d.join(REVIEWS_FILE))
	}
}

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "dram-engine", about = "Whisky catalog and recommendation engine over NDJSON stdio")]
pub struct CliArgs {
	/// Directory holding whiskey_catalog.json, user_data.json and reviews.json
	/// (defaults to the platform data directory)
	#[arg(long, env = "DRAM_DATA_DIR")]
	pub data_dir: Option<PathBuf>,

	/// Keep state in memory only; never read or write the data directory
	#[arg(long)]
	pub in_memory: bool,

	/// Log level (trace, debug, info, warn, error)
	#[arg(long, default_value = "info", env = "DRAM_LOG_LEVEL")]
	pub log_level: String,

	/// Number of recently viewed whiskeys kept per user
	#[arg(long, default_value_t = DEFAULT_VIEWED_CAPACITY)]
	pub viewed_capacity: usize,

	/// Minimum overall similarity for similar-item recommendations
	#[arg(long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
	pub similarity_threshold: f64,

	/// Weight of taste similarity in the overall score
	#[arg(long, default_value = "0.7")]
	pub taste_weight: f64,

	/// Weight of price similarity in the overall score
	#[arg(long, default_value = "0.3")]
	pub price_weight: f64,

	#[arg(long, default_value = "1.0")]
	pub sweetness_weight: f64,

	#[arg(long, default_value = "1.0")]
	pub smoky_weight: f64,

	#[arg(long, default_value = "1.0")]
	pub fruity_weight: f64,

	#[arg(long, default_value = "1.0")]
	pub spicy_weight: f64,
}

impl CliArgs {
	pub fn into_config(self) -> DramConfig {
		let data_dir = if self.in_memory {
			None
		} else {
			self.data_dir.or_else(default_data_dir)
		};
		DramConfig {
			data_dir,
			viewed_capacity: self.viewed_capacity,
			preference_weights: PreferenceWeights {
				sweetness: self.sweetness_weight,
				smoky: self.smoky_weight,
				fruity: self.fruity_weight,
				spicy: self.spicy_weight,
			},
			similarity: SimilarityConfig {
				weights: SimilarityWeights {
					taste: self.taste_weight,
					price: self.price_weight,
				},
				threshold: self.similarity_threshold,
			},
			rating_scale: RatingScale::default(),
		}
	}
}

/// `<platform data dir>/dram`, e.g. `~/.local/share/dram` on Linux.
pub fn default_data_dir() -> Option<PathBuf> {
	dirs::data_dir().map(|d| d.join("dram"))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_library_defaults() {
		let args = CliArgs::parse_from(["dram-engine", "--data-dir", "/tmp/dram-test"]);
		let config = args.into_config();
		let defaults = DramConfig::default();
		assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/dram-test")));
		assert_eq!(config.viewed_capacity, defaults.viewed_capacity);
		assert_eq!(config.preference_weights, defaults.preference_weights);
		assert_eq!(config.similarity, defaults.similarity);
	}

	#[test]
	fn weights_come_from_flags() {
		let args = CliArgs::parse_from([
			"dram-engine",
			"--in-memory",
			"--taste-weight",
			"1",
			"--price-weight",
			"0",
			"--smoky-weight",
			"2.5",
			"--similarity-threshold",
			"0.8",
			"--viewed-capacity",
			"5",
		]);
		let config = args.into_config();
		assert!(config.data_dir.is_none());
		assert_eq!(config.viewed_capacity, 5);
		assert_eq!(config.preference_weights.smoky, 2.5);
		assert_eq!(config.similarity.weights.taste, 1.0);
		assert_eq!(config.similarity.weights.price, 0.0);
		assert_eq!(config.similarity.threshold, 0.8);
	}

	#[test]
	fn file_paths_follow_data_dir() {
		let config = DramConfig::default().with_data_dir("/srv/dram");
		assert_eq!(
			config.reviews_path(),
			Some(PathBuf::from("/srv/dram/reviews.json"))
		);
		assert!(DramConfig::default().catalog_path().is_none());
	}
}
