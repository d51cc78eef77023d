//! Conversion between gNMI typed values and [`TelemetryValue`].

use fpkit_common::TelemetryValue;

use crate::gnmi::{self, TypedValue, typed_value::Value};

/// Decode the value carried by an update.
pub fn extract_value(update: &gnmi::Update) -> Option<TelemetryValue> {
    if let Some(val) = &update.val {
        typed_value_to_telemetry(val)
    } else {
        // Deprecated field, but some implementations still use it
        update
            .value
            .as_ref()
            .map(|val| decode_json_bytes(&val.value))
    }
}

/// Convert a gNMI typed value. `None` when the oneof is unset.
pub fn typed_value_to_telemetry(val: &TypedValue) -> Option<TelemetryValue> {
    let value = match val.value.as_ref()? {
        Value::StringVal(s) => TelemetryValue::Text(s.clone()),
        Value::IntVal(i) => TelemetryValue::Integer(*i),
        Value::UintVal(u) => TelemetryValue::Counter(*u),
        Value::BoolVal(b) => TelemetryValue::Boolean(*b),
        Value::BytesVal(b) => TelemetryValue::Binary(b.clone()),
        Value::FloatVal(f) => TelemetryValue::Gauge(f64::from(*f)),
        Value::DoubleVal(d) => TelemetryValue::Gauge(*d),
        Value::DecimalVal(d) => {
            TelemetryValue::Gauge(d.digits as f64 * 10f64.powi(-(d.precision as i32)))
        }
        Value::LeaflistVal(ll) => {
            let values: Vec<serde_json::Value> = ll
                .element
                .iter()
                .filter_map(typed_value_to_telemetry)
                .map(|v| v.to_json())
                .collect();
            TelemetryValue::Json(serde_json::Value::Array(values))
        }
        Value::AnyVal(any) => TelemetryValue::Binary(any.value.clone()),
        Value::JsonVal(j) | Value::JsonIetfVal(j) => decode_json_bytes(j),
        Value::AsciiVal(a) => TelemetryValue::Text(a.clone()),
        Value::ProtoBytes(p) => TelemetryValue::Binary(p.clone()),
    };
    Some(value)
}

/// Encode a value for a Set request.
///
/// Scalars use their native oneof member; JSON subtrees are sent as
/// JSON_IETF.
pub fn telemetry_to_typed_value(value: &TelemetryValue) -> TypedValue {
    let value = match value {
        TelemetryValue::Counter(u) => Value::UintVal(*u),
        TelemetryValue::Integer(i) => Value::IntVal(*i),
        TelemetryValue::Gauge(g) => Value::DoubleVal(*g),
        TelemetryValue::Text(s) => Value::StringVal(s.clone()),
        TelemetryValue::Boolean(b) => Value::BoolVal(*b),
        TelemetryValue::Binary(b) => Value::BytesVal(b.clone()),
        TelemetryValue::Json(v) => Value::JsonIetfVal(v.to_string().into_bytes()),
    };
    TypedValue { value: Some(value) }
}

/// JSON payloads carrying a scalar decode to that scalar.
fn decode_json_bytes(bytes: &[u8]) -> TelemetryValue {
    match serde_json::from_slice::<serde_json::Value>(bytes) {
        Ok(json) => TelemetryValue::from_json(json),
        Err(_) => TelemetryValue::Text(String::from_utf8_lossy(bytes).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gnmi::{Decimal64, ScalarArray};
    use serde_json::json;

    fn typed(value: Value) -> TypedValue {
        TypedValue { value: Some(value) }
    }

    #[test]
    fn test_scalar_values() {
        assert_eq!(
            typed_value_to_telemetry(&typed(Value::StringVal("SN123".into()))),
            Some(TelemetryValue::Text("SN123".into()))
        );
        assert_eq!(
            typed_value_to_telemetry(&typed(Value::UintVal(193100000))),
            Some(TelemetryValue::Counter(193100000))
        );
        assert_eq!(
            typed_value_to_telemetry(&typed(Value::BoolVal(false))),
            Some(TelemetryValue::Boolean(false))
        );
        assert_eq!(typed_value_to_telemetry(&TypedValue { value: None }), None);
    }

    #[test]
    fn test_decimal_value() {
        let value = typed(Value::DecimalVal(Decimal64 {
            digits: -350,
            precision: 2,
        }));
        assert_eq!(
            typed_value_to_telemetry(&value),
            Some(TelemetryValue::Gauge(-3.5))
        );
    }

    #[test]
    fn test_json_ietf_scalar_unwraps() {
        let value = typed(Value::JsonIetfVal(br#""openconfig-platform-types:TRANSCEIVER""#.to_vec()));
        assert_eq!(
            typed_value_to_telemetry(&value),
            Some(TelemetryValue::Text(
                "openconfig-platform-types:TRANSCEIVER".into()
            ))
        );

        let value = typed(Value::JsonIetfVal(br#"{"name":"och1"}"#.to_vec()));
        assert_eq!(
            typed_value_to_telemetry(&value),
            Some(TelemetryValue::Json(json!({"name": "och1"})))
        );
    }

    #[test]
    fn test_leaflist_value() {
        let value = typed(Value::LeaflistVal(ScalarArray {
            element: vec![typed(Value::StringVal("a".into())), typed(Value::IntVal(2))],
        }));
        assert_eq!(
            typed_value_to_telemetry(&value),
            Some(TelemetryValue::Json(json!(["a", 2])))
        );
    }

    #[test]
    fn test_encode_for_set() {
        assert_eq!(
            telemetry_to_typed_value(&TelemetryValue::Boolean(false)).value,
            Some(Value::BoolVal(false))
        );
        assert_eq!(
            telemetry_to_typed_value(&TelemetryValue::Json(json!({"name": "T1"}))).value,
            Some(Value::JsonIetfVal(br#"{"name":"T1"}"#.to_vec()))
        );
    }
}
