//! Low-token text encoding of sequence statistics.
//!
//! The output is read by the language model, never decoded by this crate.
//! Layout is described to the model in [`crate::prompt::SYSTEM_PROMPT`]:
//!
//! ```text
//! frames   = frame (";" frame)*
//! frame    = classes "|" "acceleration:" a ",direction:" d ",speed:" s "|" json "|" json
//! classes  = (name ":" value ("," name ":" value)*)?
//! summary  = "total_frames:" n "," ... "," "average_class_percentages:" classes
//! ```
//!
//! Delimiters inside class names, the direction string or the JSON blobs are
//! written through unchanged.

use serde_json::Value;

use crate::stats::{ClassPercentages, EgoMotion, FrameSummary, SequenceSummary};

pub const FRAME_SEPARATOR: char = ';';
pub const FIELD_SEPARATOR: char = '|';

/// Render a number the way the prompt's examples show it: `100`, `0.5`.
pub fn format_number(v: f64) -> String {
    if v.is_infinite() {
        return if v > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() };
    }
    if v == 0.0 {
        return "0".to_string();
    }
    v.to_string()
}

/// `name:value` pairs joined with `,`.
pub fn compact_class_percentages(classes: &ClassPercentages) -> String {
    classes
        .iter()
        .map(|(name, value)| format!("{name}:{}", format_number(value)))
        .collect::<Vec<_>>()
        .join(",")
}

fn compact_ego_motion(ego: &EgoMotion) -> String {
    format!(
        "acceleration:{},direction:{},speed:{}",
        format_number(ego.acceleration),
        ego.direction,
        format_number(ego.speed)
    )
}

fn compact_blob(blob: &Value) -> String {
    // Serializing a Value cannot fail: keys are always strings.
    serde_json::to_string(blob).unwrap_or_else(|_| "null".to_string())
}

fn compact_frame(frame: &FrameSummary) -> String {
    [
        compact_class_percentages(&frame.class_percentages),
        compact_ego_motion(&frame.ego_motion),
        compact_blob(&frame.semantic_data),
        compact_blob(&frame.instance_data),
    ]
    .join("|")
}

/// One record per frame in original order, joined with `;`.
pub fn compact_frame_summaries(frames: &[FrameSummary]) -> String {
    frames.iter().map(compact_frame).collect::<Vec<_>>().join(";")
}

/// Eight `key:value` fields joined with `,`; the last embeds the average
/// class percentages.
pub fn compact_sequence_summary(summary: &SequenceSummary) -> String {
    let fields = [
        format!("total_frames:{}", format_number(summary.total_frames)),
        format!("total_duration:{}", format_number(summary.total_duration)),
        format!("total_distance:{}", format_number(summary.total_distance)),
        format!("average_speed:{}", format_number(summary.average_speed)),
        format!("min_speed:{}", format_number(summary.min_speed)),
        format!("max_speed:{}", format_number(summary.max_speed)),
        format!(
            "average_speed_from_frames:{}",
            format_number(summary.average_speed_from_frames)
        ),
        format!(
            "average_class_percentages:{}",
            compact_class_percentages(&summary.average_class_percentages)
        ),
    ];
    fields.join(",")
}
