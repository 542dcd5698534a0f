// ---------------------------------------------------------------------------
// NDJSON transport — one JSON-RPC response per line
// ---------------------------------------------------------------------------
//
// Owns the mapping from handler outcomes to JSON-RPC frames, including the
// `DramError` -> error object conversion. Writes to stdout in the binary and
// to a buffer in tests.
// ---------------------------------------------------------------------------

use std::io::{self, Write};

use serde::Serialize;

use crate::error::DramError;
use crate::protocol::{DRAM_ERROR, METHOD_NOT_FOUND};

#[derive(Serialize)]
struct JsonRpcResponse<'a> {
	jsonrpc: &'a str,
	id: u64,
	#[serde(skip_serializing_if = "Option::is_none")]
	result: Option<serde_json::Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	error: Option<JsonRpcErrorBody>,
}

#[derive(Serialize)]
struct JsonRpcErrorBody {
	code: i32,
	message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	data: Option<serde_json::Value>,
}

pub struct NdjsonTransport<W: Write = io::Stdout> {
	writer: W,
}

impl NdjsonTransport<io::Stdout> {
	pub fn new() -> Self {
		Self::with_writer(io::stdout())
	}
}

impl Default for NdjsonTransport<io::Stdout> {
	fn default() -> Self {
		Self::new()
	}
}

impl<W: Write> NdjsonTransport<W> {
	pub fn with_writer(writer: W) -> Self {
		Self { writer }
	}

	/// Write either the result or the `DramError` frame for request `id`.
	pub fn write_outcome(&mut self, id: u64, outcome: Result<serde_json::Value, DramError>) {
		match outcome {
			Ok(value) => self.write_response(id, value),
			Err(e) => {
				tracing::debug!(id, code = e.code(), "Request failed: {}", e);
				self.write_error(id, DRAM_ERROR, e.to_string(), Some(e.to_json_rpc_error()));
			}
		}
	}

	pub fn write_method_not_found(&mut self, id: u64, method: &str) {
		tracing::warn!(id, method, "Unknown method");
		self.write_error(id, METHOD_NOT_FOUND, format!("Unknown method: {}", method), None);
	}

	pub fn write_response(&mut self, id: u64, result: serde_json::Value) {
		self.write_line(&JsonRpcResponse {
			jsonrpc: "2.0",
			id,
			result: Some(result),
			error: None,
		});
	}

	pub fn write_error(&mut self, id: u64, code: i32, message: impl Into<String>, data: Option<serde_json::Value>) {
		self.write_line(&JsonRpcResponse {
			jsonrpc: "2.0",
			id,
			result: None,
			error: Some(JsonRpcErrorBody {
				code,
				message: message.into(),
				data,
			}),
		});
	}

	/// Serialize the whole frame first so a failure never leaves half a line.
	fn write_line(&mut self, frame: &JsonRpcResponse<'_>) {
		let mut line = match serde_json::to_vec(frame) {
			Ok(bytes) => bytes,
			Err(e) => {
				tracing::error!(id = frame.id, "Failed to serialize response: {}", e);
				return;
			}
		};
		line.push(b'\n');
		if let Err(e) = self.writer.write_all(&line).and_then(|()| self.writer.flush()) {
			tracing::error!(id = frame.id, "Failed to write response: {}", e);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn frames(transport: &NdjsonTransport<Vec<u8>>) -> Vec<serde_json::Value> {
		String::from_utf8(transport.writer.clone())
			.unwrap()
			.lines()
			.map(|l| serde_json::from_str(l).unwrap())
			.collect()
	}

	#[test]
	fn success_frame_has_result_only() {
		let mut t = NdjsonTransport::with_writer(Vec::new());
		t.write_outcome(7, Ok(serde_json::json!({ "added": true })));
		let out = frames(&t);
		assert_eq!(out.len(), 1);
		assert_eq!(out[0]["jsonrpc"], "2.0");
		assert_eq!(out[0]["id"], 7);
		assert_eq!(out[0]["result"]["added"], true);
		assert!(out[0].get("error").is_none());
	}

	#[test]
	fn dram_error_carries_code_in_data() {
		let mut t = NdjsonTransport::with_writer(Vec::new());
		t.write_outcome(3, Err(DramError::ItemNotFound("w9".into())));
		let out = frames(&t);
		assert_eq!(out[0]["error"]["code"], DRAM_ERROR);
		assert_eq!(out[0]["error"]["data"]["dramCode"], "DRAM_ITEM_NOT_FOUND");
		assert!(out[0].get("result").is_none());
	}

	#[test]
	fn unknown_method_has_no_data() {
		let mut t = NdjsonTransport::with_writer(Vec::new());
		t.write_method_not_found(1, "cellar/teleport");
		t.write_response(2, serde_json::Value::Null);
		let out = frames(&t);
		assert_eq!(out.len(), 2);
		assert_eq!(out[0]["error"]["code"], METHOD_NOT_FOUND);
		assert!(out[0]["error"].get("data").is_none());
		assert_eq!(out[1]["id"], 2);
	}
}
