pub mod bet_ledger;
pub mod config;
pub mod corpus;
pub mod corpus_cache;
pub mod decay;
pub mod error;
pub mod fake_corpus;
pub mod fixtures_fetch;
pub mod http_client;
pub mod logging;
pub mod markets;
pub mod predict;
pub mod scoreline;
pub mod source;
pub mod strength;
pub mod teams;

pub use corpus::{MatchCorpus, MatchRecord};
pub use error::PredictError;
pub use predict::{Fixture, PredictConfig, Prediction, predict, predict_many};
