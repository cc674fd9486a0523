//! Core library for the energy-prep command line application.
//!
//! The library normalizes energy-balance statistics from several sources into
//! one multi-year profile dataset. Classification tables live in
//! [`energy::prep::taxonomy`], per-source readers under
//! [`energy::prep::extract`], the metric rules in [`energy::prep::derive`]
//! and [`energy::prep::prune`], and the publishing steps in
//! [`energy::prep::assemble`], [`energy::prep::shard`] and
//! [`energy::prep::workflow`].

pub mod energy;

pub use energy::prep::{
    PrepError, Result, accumulate, assemble, chart_meta, derive, error, extract, io, model,
    overlay, profile, prune, shard, taxonomy, units, validate, workflow,
};
