//! The fixed gallery of driving sequences and their remote asset layout.

use serde::{Deserialize, Serialize};

/// Sequence ids published on the asset host. `08` has no capture.
pub const SEQUENCE_IDS: [&str; 10] = ["00", "01", "02", "03", "04", "05", "06", "07", "09", "10"];

pub const FRAME_SUMMARIES_PATH: &str = "stats/frame_summaries.json";
pub const SEQUENCE_SUMMARY_PATH: &str = "stats/sequence_summary.json";
pub const THUMBNAIL_PATH: &str = "thumbnail.png";

const DESCRIPTION: &str = "Driving sequence capture with various road elements";

/// One recorded driving session with its remote assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    pub id: String,
    pub name: String,
    pub thumbnail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub frame_summaries_url: String,
    pub sequence_summary_url: String,
}

/// Plain-text side files stored next to each sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuxiliaryKind {
    Poses,
    Calibration,
    Times,
}

impl AuxiliaryKind {
    pub fn file_name(self) -> &'static str {
        match self {
            AuxiliaryKind::Poses => "poses.txt",
            AuxiliaryKind::Calibration => "calib.txt",
            AuxiliaryKind::Times => "times.txt",
        }
    }
}

impl std::fmt::Display for AuxiliaryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuxiliaryKind::Poses => write!(f, "poses"),
            AuxiliaryKind::Calibration => write!(f, "calib"),
            AuxiliaryKind::Times => write!(f, "times"),
        }
    }
}

/// `{base}/scene_{id}/{path}`, with `id` zero-padded to two digits.
pub fn scene_url(base: &str, id: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    format!("{base}/scene_{:0>2}/{path}", id)
}

impl Sequence {
    /// Build the catalog entry for `id` rooted at `base`.
    pub fn from_id(base: &str, id: &str) -> Self {
        let padded = format!("{:0>2}", id);
        Sequence {
            name: format!("Driving Sequence #{padded}"),
            thumbnail: scene_url(base, &padded, THUMBNAIL_PATH),
            description: Some(DESCRIPTION.to_string()),
            date: None,
            video_url: Some(scene_url(base, &padded, &format!("{padded}.mp4"))),
            frame_summaries_url: scene_url(base, &padded, FRAME_SUMMARIES_PATH),
            sequence_summary_url: scene_url(base, &padded, SEQUENCE_SUMMARY_PATH),
            id: padded,
        }
    }

    /// URL of one of the plain-text side files. Derived from the frame
    /// summaries URL so a relocated sequence keeps its files together.
    pub fn auxiliary_url(&self, kind: AuxiliaryKind) -> String {
        let root = self
            .frame_summaries_url
            .strip_suffix(FRAME_SUMMARIES_PATH)
            .unwrap_or(&self.frame_summaries_url);
        format!("{}{}", root, kind.file_name())
    }
}

/// Immutable list of sequences, fixed at construction.
#[derive(Debug, Clone)]
pub struct Catalog {
    sequences: Vec<Sequence>,
}

impl Catalog {
    /// The published gallery rooted at `base`.
    pub fn new(base: &str) -> Self {
        Self { sequences: SEQUENCE_IDS.iter().map(|id| Sequence::from_id(base, id)).collect() }
    }

    pub fn from_sequences(sequences: Vec<Sequence>) -> Self {
        Self { sequences }
    }

    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    /// Look up by id; `"7"` and `"07"` both match.
    pub fn get(&self, id: &str) -> Option<&Sequence> {
        let padded = format!("{:0>2}", id.trim());
        self.sequences.iter().find(|s| s.id == padded)
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}
