//! Capability interface over an external graph node's widgets.
//!
//! The resolver and the binding accessors never touch the host node type
//! directly; they speak to a `{get, set}` capability implemented by an
//! adapter. [`JsonNodeWidgets`] is the adapter used by tests and the demo
//! binary; a real host wraps its own node handle the same way.

use promptdex_core::binding::{BindingMode, QueryBinding};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Widget names
// ---------------------------------------------------------------------------

pub const WIDGET_MODE: &str = "mode";
pub const WIDGET_ENTRY_ID: &str = "entry_id";
pub const WIDGET_QUERY: &str = "query";
pub const WIDGET_TITLE: &str = "title";
pub const WIDGET_TAGS: &str = "tags";
pub const WIDGET_MODEL: &str = "model";
pub const WIDGET_TOP_K: &str = "top_k";

/// Bounds of the `top_k` widget.
pub const TOP_K_MIN: i64 = 1;
pub const TOP_K_MAX: i64 = 50;

// ---------------------------------------------------------------------------
// Capability trait
// ---------------------------------------------------------------------------

/// Widget access on a host graph node.
///
/// `set` must trigger the node's own change notification; the adapter owns
/// how that happens.
pub trait NodeWidgets {
    /// Read a widget value by name. `None` when the widget is absent.
    fn get(&self, name: &str) -> Option<Value>;

    /// Write a widget value by name, creating it if absent.
    fn set(&mut self, name: &str, value: Value);
}

// ---------------------------------------------------------------------------
// Binding accessors
// ---------------------------------------------------------------------------

fn widget_string(widgets: &dyn NodeWidgets, name: &str) -> String {
    match widgets.get(name) {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn widget_int(widgets: &dyn NodeWidgets, name: &str, default: i64) -> i64 {
    match widgets.get(name) {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(default),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
        _ => default,
    }
}

/// Snapshot the node's query widgets into a [`QueryBinding`].
pub fn read_binding(widgets: &dyn NodeWidgets) -> QueryBinding {
    QueryBinding {
        mode: BindingMode::parse(&widget_string(widgets, WIDGET_MODE)),
        entry_id: widget_string(widgets, WIDGET_ENTRY_ID),
        query: widget_string(widgets, WIDGET_QUERY),
        title: widget_string(widgets, WIDGET_TITLE),
        tags: widget_string(widgets, WIDGET_TAGS),
        model: widget_string(widgets, WIDGET_MODEL),
        top_k: widget_int(widgets, WIDGET_TOP_K, TOP_K_MIN).clamp(TOP_K_MIN, TOP_K_MAX),
    }
}

/// Commit a resolved entry id back into the node as a lock.
///
/// After this call the binding reads as `locked` on `entry_id`; the soft
/// criteria widgets are left untouched so unlocking restores them.
pub fn commit_lock(widgets: &mut dyn NodeWidgets, entry_id: &str) {
    widgets.set(WIDGET_MODE, Value::String(BindingMode::Locked.as_str().into()));
    widgets.set(WIDGET_ENTRY_ID, Value::String(entry_id.into()));
}

// ---------------------------------------------------------------------------
// JSON adapter
// ---------------------------------------------------------------------------

/// Widget adapter over a plain JSON object map.
///
/// Records which widgets were written so callers can observe the change
/// notifications a real host node would fire.
#[derive(Debug, Default)]
pub struct JsonNodeWidgets {
    values: serde_json::Map<String, Value>,
    changed: Vec<String>,
}

impl JsonNodeWidgets {
    pub fn new(values: serde_json::Map<String, Value>) -> Self {
        Self {
            values,
            changed: Vec::new(),
        }
    }

    /// Convenience constructor from a JSON literal; panics when the value
    /// is not an object (callers pass literals).
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::new(map),
            other => panic!("node widgets must be a JSON object, got {other}"),
        }
    }

    /// Names of widgets written through [`NodeWidgets::set`], in order.
    pub fn changed(&self) -> &[String] {
        &self.changed
    }
}

impl NodeWidgets for JsonNodeWidgets {
    fn get(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }

    fn set(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
        self.changed.push(name.to_string());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn read_binding_snapshots_all_widgets() {
        let widgets = JsonNodeWidgets::from_value(json!({
            "mode": "auto",
            "entry_id": "",
            "query": "warm light",
            "title": "Portrait A",
            "tags": "a,b",
            "model": "SDXL",
            "top_k": 3,
        }));
        let binding = read_binding(&widgets);
        assert_eq!(binding.mode, BindingMode::Auto);
        assert_eq!(binding.query, "warm light");
        assert_eq!(binding.title, "Portrait A");
        assert_eq!(binding.top_k, 3);
    }

    #[test]
    fn missing_widgets_read_as_defaults() {
        let widgets = JsonNodeWidgets::from_value(json!({}));
        let binding = read_binding(&widgets);
        assert_eq!(binding.mode, BindingMode::Auto);
        assert!(binding.entry_id.is_empty());
        assert_eq!(binding.top_k, TOP_K_MIN);
    }

    #[test]
    fn top_k_is_clamped_to_widget_bounds() {
        let widgets = JsonNodeWidgets::from_value(json!({"top_k": 500}));
        assert_eq!(read_binding(&widgets).top_k, TOP_K_MAX);

        let widgets = JsonNodeWidgets::from_value(json!({"top_k": 0}));
        assert_eq!(read_binding(&widgets).top_k, TOP_K_MIN);
    }

    #[test]
    fn commit_lock_writes_mode_and_id_only() {
        let mut widgets = JsonNodeWidgets::from_value(json!({
            "mode": "auto",
            "entry_id": "",
            "title": "Portrait A",
        }));
        commit_lock(&mut widgets, "entry_abc");

        let binding = read_binding(&widgets);
        assert_eq!(binding.mode, BindingMode::Locked);
        assert_eq!(binding.entry_id, "entry_abc");
        // Soft criteria survive so unlocking restores them.
        assert_eq!(binding.title, "Portrait A");
        assert_eq!(widgets.changed(), ["mode", "entry_id"]);
    }
}
