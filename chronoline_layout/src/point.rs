// Copyright 2025 the Chronoline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;

use hashbrown::HashMap;

/// Milliseconds in one hour.
pub const MILLIS_PER_HOUR: i64 = 3_600_000;

/// An instant on the timeline, in milliseconds since the Unix epoch.
///
/// The engine only ever compares and subtracts timestamps, so any consistent
/// epoch works; parsing calendar formats is the caller's job.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from milliseconds.
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Creates a timestamp from whole seconds (saturating).
    #[must_use]
    pub const fn from_seconds(seconds: i64) -> Self {
        Self(seconds.saturating_mul(1000))
    }

    /// Returns the raw millisecond value.
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Signed milliseconds from `earlier` to `self` (saturating).
    #[must_use]
    pub const fn millis_since(self, earlier: Self) -> i64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Absolute distance to `other`, in milliseconds.
    #[must_use]
    pub const fn abs_gap_millis(self, other: Self) -> u64 {
        self.0.abs_diff(other.0)
    }
}

/// One event on the timeline.
///
/// Besides its timestamp a point carries named text attributes (`title`,
/// `notes`, ...). Text elements in [`LayoutConfig`](crate::LayoutConfig) look
/// their content up here by name; the display form of the timestamp is expected
/// under the `timestamp` attribute.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimePoint {
    /// When the event happened.
    pub timestamp: Timestamp,
    attributes: HashMap<String, String>,
}

impl TimePoint {
    /// Creates a point without attributes.
    #[must_use]
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            attributes: HashMap::new(),
        }
    }

    /// Sets an attribute, builder style.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Sets (or replaces) an attribute.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Returns the attribute value for `name`, if present.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Iterates all attributes in unspecified order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
