//! Forward conversion: BindValue → MySQLValue

use mysql_async::{Params, Value};
use workload_core::BindValue;

/// MySQL value wrapper for bound statement arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct MySQLValue(pub Value);

impl MySQLValue {
    /// Get the inner mysql_async::Value.
    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl From<BindValue> for MySQLValue {
    fn from(value: BindValue) -> Self {
        match value {
            BindValue::Null => MySQLValue(Value::NULL),
            BindValue::Int(i) => MySQLValue(Value::Int(i)),
            BindValue::Text(s) => MySQLValue(Value::Bytes(s.into_bytes())),
        }
    }
}

/// Positional parameters for a bound statement.
pub fn to_params(args: Vec<BindValue>) -> Params {
    if args.is_empty() {
        return Params::Empty;
    }
    Params::Positional(
        args.into_iter()
            .map(|arg| MySQLValue::from(arg).into_inner())
            .collect(),
    )
}
