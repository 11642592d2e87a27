//! Attribute values
//!
//! Scene attributes are dynamically typed, so they are carried as TOML
//! values the same way scene files spell them.

/// A dynamically typed attribute value
pub type AttrValue = toml::Value;

/// Read a value as a float, accepting integers and booleans
pub fn as_f64(value: &AttrValue) -> Option<f64> {
    match value {
        toml::Value::Float(f) => Some(*f),
        toml::Value::Integer(i) => Some(*i as f64),
        toml::Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Read a value as a boolean, accepting numbers (non-zero is true)
pub fn as_bool(value: &AttrValue) -> Option<bool> {
    match value {
        toml::Value::Boolean(b) => Some(*b),
        toml::Value::Integer(i) => Some(*i != 0),
        toml::Value::Float(f) => Some(*f != 0.0),
        _ => None,
    }
}

/// Compare two values, treating numeric types as interchangeable
pub fn values_match(a: &AttrValue, b: &AttrValue) -> bool {
    match (as_f64(a), as_f64(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(as_f64(&toml::Value::Integer(3)), Some(3.0));
        assert_eq!(as_f64(&toml::Value::Float(0.5)), Some(0.5));
        assert_eq!(as_f64(&toml::Value::Boolean(true)), Some(1.0));
        assert_eq!(as_f64(&toml::Value::String("x".into())), None);
    }

    #[test]
    fn test_bool_coercion() {
        assert_eq!(as_bool(&toml::Value::Integer(0)), Some(false));
        assert_eq!(as_bool(&toml::Value::Integer(1)), Some(true));
        assert_eq!(as_bool(&toml::Value::Boolean(true)), Some(true));
    }

    #[test]
    fn test_values_match_across_numeric_types() {
        assert!(values_match(&toml::Value::Integer(1), &toml::Value::Float(1.0)));
        assert!(!values_match(&toml::Value::Integer(1), &toml::Value::Float(1.5)));
        assert!(values_match(
            &toml::Value::String("map1".into()),
            &toml::Value::String("map1".into())
        ));
    }
}
