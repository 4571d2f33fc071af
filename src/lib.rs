//! World Dashboard core: dataset loading, country-name normalisation,
//! reshaping, and the per-view queries the UI renders.

pub mod config;
pub mod data;
pub mod error;
pub mod flags;
pub mod view;
