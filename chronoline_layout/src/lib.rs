// Copyright 2025 the Chronoline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Temporal-aware callout layout for timelines.
//!
//! Given a handful of timestamped points with text attached, this crate picks
//! for each point:
//! - a horizontal position that tracks elapsed time as closely as possible,
//! - a callout length (how far its text sits from the axis),
//! - the side of the axis its text goes on (alternating by index).
//!
//! Text blocks are kept from overlapping where that can be done without
//! distorting time too much; the opening burst of events (the *temporal
//! cluster*) is allowed to crowd a little so it stays readable.
//!
//! ## Pipeline
//!
//! [`TimelineLayout::run`] (and the [`compute_layout`] shorthand) runs:
//! 1. [`ideal_positions`]: timestamps mapped linearly onto a [`TimelineSpan`].
//! 2. [`ClusterScope::detect`]: the prefix of points within two hours of the first.
//! 3. A search over [`candidate_patterns`] of callout lengths for the cluster,
//!    scored by [`temporal_distortion`] of simulated positions.
//! 4. An iterative minimum-separation solve (see [`SolverPass`]).
//! 5. Pairwise collision resolution (see [`choose_rule`]).
//! 6. [`enforce_invariants`]: bounds, marker spacing and chronological order.
//!
//! The last step always wins, even if it reintroduces overlap.
//!
//! ## Text
//!
//! Layout needs text extents, not glyphs. Measurement is injected as a
//! [`TextMeasurer`]; [`HeuristicTextMeasurer`] is the dependency-free default,
//! and `chronoline_text_parley` provides real shaping.
//!
//! This crate is `no_std` and performs no I/O.

#![no_std]

extern crate alloc;

#[cfg(any(feature = "std", test))]
#[cfg_attr(test, macro_use)]
extern crate std;

mod cluster;
mod config;
mod context;
mod engine;
#[cfg(not(any(feature = "std", test)))]
mod float;
mod ideal;
mod optimizer;
mod point;
mod resolver;
mod solver;
mod text_block;

pub use chronoline_text::{HeuristicTextMeasurer, TextExtent, TextMeasurer};
pub use cluster::{CLUSTER_THRESHOLD_MILLIS, ClusterScope, PairMembership};
pub use config::{LayoutConfig, Margins, SeparationBuffers, Size, TextElement};
pub use engine::{
    CalloutPlacement, LayoutOutcome, LayoutReport, LayoutState, TimelineLayout, compute_layout,
    compute_layout_from_ideal,
};
pub use ideal::{TimelineSpan, ideal_positions};
pub use optimizer::{callout_options, candidate_patterns, temporal_distortion};
pub use point::{MILLIS_PER_HOUR, TimePoint, Timestamp};
pub use resolver::{
    MAX_RESOLVER_PASSES, PairFacts, ResolutionRule, choose_rule, enforce_invariants,
};
pub use solver::{MarkerFloor, SolverPass};
pub use text_block::{
    CalloutSide, PlacedText, StackedText, TextBlock, TextStack, boxes_overlap, overlap_extent,
};
