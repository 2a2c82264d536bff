//! Sentree turns morpheme-tagged Korean sentences into display-ready constituency trees.
//!
//! The pipeline is tag → [`normalize`] → [`syntax`] → [`tree`], with [`phrases`] and
//! [`definitions`] decorating each parsed sentence. [`engine::Engine`] runs it for a
//! whole request.

pub use crate::errors::{ParseFailure, SentreeError};

pub mod cli;
pub mod config;
pub mod definitions;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod normalize;
pub mod phrases;
pub mod syntax;
pub mod tagging;
pub mod tree;
