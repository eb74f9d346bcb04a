//! contest_predictor — crawls LeetCode-style contest data from CN/US
//! upstreams, computes Elo-style rating deltas, and reconstructs
//! minute-by-minute rank and question-finish histories.
//!
//! The process is a single long-running scheduler (`scheduler`) that wakes
//! on a wall-clock tick and dispatches named jobs (`handlers`) built from
//! three collaborating layers: upstream adapters (`upstream`) that fetch and
//! parse contest data, a document-store persistence layer (`store`), and a
//! pure rating/reconstruction core (`rating`, `reconstruct`) with no I/O.

#![deny(unsafe_op_in_unsafe_fn)]

pub mod config;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod handlers;
pub mod logging;
pub mod rating;
pub mod reconstruct;
pub mod scheduler;
pub mod store;
pub mod time_util;
pub mod upstream;
