use serde_json::Value as Json;

use crate::schema::ColumnType;

/// A single cell of a relation
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Boolean(bool),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Reals and integers both read as f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The type this value carries, `None` for null
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            Value::Null => None,
            Value::Integer(_) => Some(ColumnType::Integer),
            Value::Real(_) => Some(ColumnType::Real),
            Value::Text(_) => Some(ColumnType::Text),
            Value::Boolean(_) => Some(ColumnType::Boolean),
        }
    }

    /// Convert to the requested type, `None` when the value does not fit.
    /// Null always converts to null; the caller checks nullability.
    pub fn coerce(&self, target: ColumnType) -> Option<Value> {
        match (self, target) {
            (Value::Null, _) => Some(Value::Null),
            (Value::Integer(i), ColumnType::Integer) => Some(Value::Integer(*i)),
            (Value::Integer(i), ColumnType::Real) => Some(Value::Real(*i as f64)),
            (Value::Integer(0), ColumnType::Boolean) => Some(Value::Boolean(false)),
            (Value::Integer(1), ColumnType::Boolean) => Some(Value::Boolean(true)),
            (Value::Real(f), ColumnType::Real) => Some(Value::Real(*f)),
            (Value::Real(f), ColumnType::Integer)
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 =>
            {
                Some(Value::Integer(*f as i64))
            }
            (Value::Text(s), ColumnType::Text) => Some(Value::Text(s.clone())),
            (Value::Boolean(b), ColumnType::Boolean) => Some(Value::Boolean(*b)),
            _ => None,
        }
    }

    pub fn bind_to(&self, idx: usize, stmt: &mut rusqlite::Statement) -> rusqlite::Result<()> {
        match self {
            Value::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null)?,
            Value::Integer(i) => stmt.raw_bind_parameter(idx, i)?,
            Value::Real(f) => stmt.raw_bind_parameter(idx, f)?,
            Value::Text(s) => stmt.raw_bind_parameter(idx, s.as_str())?,
            Value::Boolean(b) => stmt.raw_bind_parameter(idx, i64::from(*b))?,
        }
        Ok(())
    }
}

impl From<&Json> for Value {
    fn from(json: &Json) -> Self {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Boolean(*b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => n.as_f64().map(Value::Real).unwrap_or(Value::Null),
            },
            Json::String(s) => Value::Text(s.clone()),
            // Nested arrays/objects are kept as their JSON text
            other => Value::Text(other.to_string()),
        }
    }
}

impl From<&Value> for Json {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Json::Null,
            Value::Integer(i) => Json::from(*i),
            // Non-finite reals have no JSON form
            Value::Real(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Text(s) => Json::String(s.clone()),
            Value::Boolean(b) => Json::Bool(*b),
        }
    }
}

impl From<rusqlite::types::ValueRef<'_>> for Value {
    fn from(value: rusqlite::types::ValueRef<'_>) -> Self {
        use rusqlite::types::ValueRef;
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Text(String::from_utf8_lossy(b).into_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_widening_and_narrowing() {
        assert_eq!(Value::Integer(7).coerce(ColumnType::Real), Some(Value::Real(7.0)));
        assert_eq!(Value::Real(45.0).coerce(ColumnType::Integer), Some(Value::Integer(45)));
        assert_eq!(Value::Real(0.7).coerce(ColumnType::Integer), None);
        assert_eq!(Value::Integer(1).coerce(ColumnType::Boolean), Some(Value::Boolean(true)));
        assert_eq!(Value::Integer(2).coerce(ColumnType::Boolean), None);
        assert_eq!(Value::Text("x".into()).coerce(ColumnType::Integer), None);
        assert_eq!(Value::Null.coerce(ColumnType::Integer), Some(Value::Null));
    }

    #[test]
    fn test_from_json() {
        assert_eq!(Value::from(&json!(5120)), Value::Integer(5120));
        assert_eq!(Value::from(&json!(0.7)), Value::Real(0.7));
        assert_eq!(Value::from(&json!(false)), Value::Boolean(false));
        assert_eq!(
            Value::from(&json!(["Overgrow", "Chlorophyll"])),
            Value::Text(r#"["Overgrow","Chlorophyll"]"#.to_string())
        );
    }

    #[test]
    fn test_nan_serializes_as_null() {
        assert_eq!(Json::from(&Value::Real(f64::NAN)), Json::Null);
    }
}
