//! Plotting and reshaping helpers for electrochemistry (CP, EIS) and
//! diffraction / pair-distribution-function (XRD, PDF) data.
//!
//! The core is [`data::store::SeriesStore`]: tagged groups of parallel
//! series, cut into fixed-length cycles by [`data::partition`] and converted
//! between 2θ and Q by [`data::transform`]. [`figure`] turns stored groups
//! into renderer-independent figures.

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod figure;
pub mod format;

pub use error::SeriesError;
