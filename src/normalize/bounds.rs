//! Numeric format bounds.
//!
//! Maps known integer/float width formats to their exact two's-complement /
//! IEEE 754 bounds, setting `minimum`/`maximum` when absent and clamping
//! user-supplied bounds that fall outside the representable range. A bound
//! already inside the range is never narrowed.

use serde_json::{Map, Number, Value};

fn known_bounds(format: &str) -> Option<(Value, Value)> {
    let (minimum, maximum) = match format {
        "int8" => (Value::from(-128i64), Value::from(127i64)),
        "int16" => (Value::from(-32_768i64), Value::from(32_767i64)),
        "int32" => (Value::from(i64::from(i32::MIN)), Value::from(i64::from(i32::MAX))),
        "int64" => (Value::from(i64::MIN), Value::from(i64::MAX)),
        "uint8" => (Value::from(0u64), Value::from(255u64)),
        "uint16" => (Value::from(0u64), Value::from(65_535u64)),
        "uint32" => (Value::from(0u64), Value::from(u64::from(u32::MAX))),
        "uint64" => (Value::from(0u64), Value::from(u64::MAX)),
        "float" => (
            Value::Number(Number::from_f64(-3.402_823_466_385_288_6e38)?),
            Value::Number(Number::from_f64(3.402_823_466_385_288_6e38)?),
        ),
        "double" => (
            Value::Number(Number::from_f64(f64::MIN)?),
            Value::Number(Number::from_f64(f64::MAX)?),
        ),
        _ => return None,
    };
    Some((minimum, maximum))
}

/// Set or clamp `minimum`/`maximum` on a node whose `format` names a known
/// numeric width.
pub fn apply_format_bounds(node: &mut Map<String, Value>) {
    let Some(format) = node.get("format").and_then(Value::as_str) else {
        return;
    };
    let Some((minimum, maximum)) = known_bounds(format) else {
        return;
    };

    let min_f = minimum.as_f64().unwrap_or(f64::MIN);
    let max_f = maximum.as_f64().unwrap_or(f64::MAX);

    match node.get("minimum").and_then(Value::as_f64) {
        Some(user) if user >= min_f && user <= max_f => {}
        _ => {
            node.insert("minimum".to_string(), minimum);
        }
    }
    match node.get("maximum").and_then(Value::as_f64) {
        Some(user) if user <= max_f && user >= min_f => {}
        _ => {
            node.insert("maximum".to_string(), maximum);
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn run(schema: Value) -> Value {
        let mut node = schema.as_object().unwrap().clone();
        apply_format_bounds(&mut node);
        Value::Object(node)
    }

    #[test]
    fn test_int8_bounds_set() {
        let out = run(json!({ "type": "integer", "format": "int8" }));
        assert_eq!(out["minimum"], -128);
        assert_eq!(out["maximum"], 127);
    }

    #[test]
    fn test_out_of_range_clamped() {
        let out = run(json!({
            "type": "integer",
            "format": "int8",
            "minimum": -500,
            "maximum": 500
        }));
        assert_eq!(out["minimum"], -128);
        assert_eq!(out["maximum"], 127);
    }

    #[test]
    fn test_in_range_untouched() {
        let out = run(json!({
            "type": "integer",
            "format": "int8",
            "minimum": 0,
            "maximum": 100
        }));
        assert_eq!(out["minimum"], 0);
        assert_eq!(out["maximum"], 100);
    }

    #[test]
    fn test_uint32() {
        let out = run(json!({ "type": "integer", "format": "uint32" }));
        assert_eq!(out["minimum"], 0);
        assert_eq!(out["maximum"], 4_294_967_295u64);
    }

    #[test]
    fn test_int64_exact() {
        let out = run(json!({ "type": "integer", "format": "int64" }));
        assert_eq!(out["minimum"], i64::MIN);
        assert_eq!(out["maximum"], i64::MAX);
    }

    #[test]
    fn test_unknown_format_ignored() {
        let out = run(json!({ "type": "string", "format": "date-time" }));
        assert!(out.get("minimum").is_none());
        assert!(out.get("maximum").is_none());
    }

    #[test]
    fn test_double_bounds() {
        let out = run(json!({ "type": "number", "format": "double" }));
        assert_eq!(out["minimum"], f64::MIN);
        assert_eq!(out["maximum"], f64::MAX);
    }
}
