pub mod catalog;
pub mod cellar;
pub mod config;
pub mod cosine;
pub mod engine;
pub mod error;
pub mod persistence;
pub mod profile;
pub mod protocol;
pub mod recommendation;
pub mod review;
pub mod server;
pub mod taste;
pub mod transport;
pub mod types;
