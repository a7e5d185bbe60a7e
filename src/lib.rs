//! Core library for the poxc-merge command line application.
//!
//! The library joins per-sample workbooks against a key (treatment) workbook
//! on the (plot, depth) pair and consolidates the result. Workbook and CSV
//! adapters live under [`poxc::merge::io`], row and key types inside
//! [`poxc::merge::model`], the join in [`poxc::merge::join`], and the run
//! orchestration under [`poxc::merge::pipeline`].

pub mod poxc;

pub use poxc::merge::{
    MergeError, Result, config, consolidate, discover, error, io, join, keys, model, pipeline,
    prompt, report, validate,
};
