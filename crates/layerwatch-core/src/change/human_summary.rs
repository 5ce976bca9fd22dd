//! Human-readable rendering of a change list.

use crate::change::model::ChangeRecord;
use serde_json::Value;

/// Render the operator-facing change listing.
///
/// One line per change, followed by one indented `field: old -> new` line per
/// changed field. Values are shown as compact JSON, except strings which are
/// shown bare.
pub fn render_human_summary(changes: &[ChangeRecord]) -> String {
    if changes.is_empty() {
        return "No changes detected.\n".to_string();
    }

    let mut out = format!("Detected {} change(s):\n\n", changes.len());
    for change in changes {
        out.push_str(&format!("- {}\n", change));
        for (field, values) in change.changed_fields().iter() {
            out.push_str(&format!(
                "    {}: {} -> {}\n",
                field,
                display_value(values.old()),
                display_value(values.new_value())
            ));
        }
    }
    out
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
