//! Per-frame and per-sequence statistics as published on the asset host.
//!
//! Produced externally and consumed read-only. The semantic and instance
//! annotation blobs have no fixed shape and stay as [`serde_json::Value`].

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Class name → percentage of the frame, in document order. Entries whose
/// value is `null` are dropped on load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassPercentages(pub Vec<(String, f64)>);

impl ClassPercentages {
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn get(&self, class: &str) -> Option<f64> {
        self.0.iter().find(|(k, _)| k == class).map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for ClassPercentages {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        ClassPercentages(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl Serialize for ClassPercentages {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ClassPercentages {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = ClassPercentages;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of class name to percentage")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((k, v)) = access.next_entry::<String, Option<f64>>()? {
                    if let Some(v) = v {
                        entries.push((k, v));
                    }
                }
                Ok(ClassPercentages(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EgoMotion {
    pub acceleration: f64,
    pub direction: String,
    pub speed: f64,
}

/// Statistics for one video frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameSummary {
    #[serde(default)]
    pub class_percentages: ClassPercentages,
    #[serde(default)]
    pub ego_motion: EgoMotion,
    #[serde(default)]
    pub semantic_data: Value,
    #[serde(default)]
    pub instance_data: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub timestamp: f64,
    #[serde(default)]
    pub class_percentages: ClassPercentages,
    // Exporters write these as either `2` or `2.0`.
    #[serde(default)]
    pub car_count: f64,
    #[serde(default)]
    pub person_count: f64,
}

/// Aggregates over every frame of a sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceSummary {
    pub total_frames: f64,
    pub total_duration: f64,
    pub total_distance: f64,
    pub average_speed: f64,
    pub min_speed: f64,
    pub max_speed: f64,
    pub average_speed_from_frames: f64,
    #[serde(default)]
    pub average_class_percentages: ClassPercentages,
    #[serde(default)]
    pub total_unique_classes: Vec<String>,
    #[serde(default)]
    pub time_series: Vec<TimeSeriesPoint>,
}

/// Both stat documents for one sequence, as loaded on selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequenceStats {
    pub frames: Vec<FrameSummary>,
    pub summary: SequenceSummary,
}
