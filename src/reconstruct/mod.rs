//! Rank & Question Reconstruction (SPEC_FULL.md §4.5), grounded on
//! `original_source/app/core/rank.py`.

pub mod question;
pub mod rank;
