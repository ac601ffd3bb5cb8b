use rusqlite::types::Value;

use crate::error::DataAccessError;
use crate::executor::BoundParam;
use crate::types::{ParamType, RowValues};

fn mismatch(param: &BoundParam) -> DataAccessError {
    DataAccessError::ExecutionError(format!(
        "parameter :{} cannot be bound as {:?}: {:?}",
        param.name, param.ty, param.value
    ))
}

fn as_text(value: &RowValues) -> Value {
    match value {
        RowValues::Int(i) => Value::Text(i.to_string()),
        RowValues::Float(f) => Value::Text(f.to_string()),
        RowValues::Text(s) => Value::Text(s.clone()),
        RowValues::Bool(b) => Value::Text(if *b { "1" } else { "0" }.to_string()),
        RowValues::Timestamp(dt) => Value::Text(dt.format("%F %T%.f").to_string()),
        RowValues::Null => Value::Null,
        RowValues::JSON(json) => Value::Text(json.to_string()),
        RowValues::Blob(bytes) => Value::Blob(bytes.clone()),
    }
}

/// Convert a bound parameter into the rusqlite value it is sent as.
///
/// The value is coerced to the parameter's bind type: `Integer` accepts
/// integers, booleans and numeric text; `Boolean` accepts booleans and
/// integers; `Null` always sends NULL; `String` renders scalars as text.
///
/// # Errors
///
/// Returns `DataAccessError::ExecutionError` if the value cannot take the bind type.
pub fn to_sqlite_value(param: &BoundParam) -> Result<Value, DataAccessError> {
    match param.ty {
        ParamType::Null => Ok(Value::Null),
        ParamType::Integer => match &param.value {
            RowValues::Int(i) => Ok(Value::Integer(*i)),
            RowValues::Bool(b) => Ok(Value::Integer(i64::from(*b))),
            RowValues::Text(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| mismatch(param)),
            RowValues::Null => Ok(Value::Null),
            _ => Err(mismatch(param)),
        },
        ParamType::Boolean => match &param.value {
            RowValues::Bool(b) => Ok(Value::Integer(i64::from(*b))),
            RowValues::Int(i) => Ok(Value::Integer(i64::from(*i != 0))),
            RowValues::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "1" | "true" => Ok(Value::Integer(1)),
                "0" | "false" | "" => Ok(Value::Integer(0)),
                _ => Err(mismatch(param)),
            },
            RowValues::Null => Ok(Value::Null),
            _ => Err(mismatch(param)),
        },
        ParamType::String => Ok(as_text(&param.value)),
    }
}
