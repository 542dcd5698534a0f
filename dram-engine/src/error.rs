use thiserror::Error;

use crate::persistence::PersistenceError;

#[derive(Debug, Error)]
pub enum DramError {
	#[error("No active profile: register or load a user first")]
	NoActiveProfile,
	#[error("User already active: {0}")]
	UserAlreadyActive(String),
	#[error("Invalid user: {0}")]
	InvalidUser(String),
	#[error("Whiskey not found: {0}")]
	ItemNotFound(String),
	#[error("Review not found: {0}")]
	ReviewNotFound(String),
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Serialization error: {0}")]
	Serialization(String),
	#[error("Storage corruption: {0}")]
	Corruption(String),
}

impl DramError {
	pub fn code(&self) -> &str {
		match self {
			Self::NoActiveProfile => "DRAM_NO_PROFILE",
			Self::UserAlreadyActive(_) => "DRAM_USER_ACTIVE",
			Self::InvalidUser(_) => "DRAM_INVALID_USER",
			Self::ItemNotFound(_) => "DRAM_ITEM_NOT_FOUND",
			Self::ReviewNotFound(_) => "DRAM_REVIEW_NOT_FOUND",
			Self::Io(_) => "DRAM_IO",
			Self::Serialization(_) => "DRAM_SERIALIZATION",
			Self::Corruption(_) => "DRAM_CORRUPT",
		}
	}

	pub fn to_json_rpc_error(&self) -> serde_json::Value {
		serde_json::json!({
			"dramCode": self.code(),
			"message": self.to_string(),
		})
	}
}

impl From<PersistenceError> for DramError {
	fn from(err: PersistenceError) -> Self {
		match err {
			PersistenceError::Io(io) => Self::Io(io),
			PersistenceError::Corruption(msg) => Self::Corruption(msg),
			PersistenceError::Serialization(msg) => Self::Serialization(msg),
		}
	}
}
