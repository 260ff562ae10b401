//! # Value Codec
//!
//! Converts between wire JSON and the native [`Value`] representation. Decoding always follows
//! the *declared* [`FieldType`] of the field being read, never the shape of the JSON that came
//! back: a `41` read from a `double` field is a [`Value::Float`], and a `"41"` read from an
//! `int32` field is an error.
//!
//! Object-typed values are not handled here. They need a schema lookup and are materialized by
//! [`crate::ObjectFactory::decode`], which delegates every other type back to this module.
//!
//! ## Chunked arrays
//!
//! Bulk numeric arrays are written as a stream of [`ArrayChunk`]s: a header naming the field and
//! the total element count, data chunks of at most [`CHUNK_SIZE`] elements, and an empty
//! terminator. [`chunk_array`] builds such a stream and [`concat_chunks`] reassembles one.
use crate::{
    object::ProxyObject,
    schema::{FieldType, ScalarType},
    transport::{ArrayChunk, FieldAddress, FieldReply},
};
use serde_json::json;

/// Maximum number of elements carried by one data chunk.
pub const CHUNK_SIZE: usize = 4096;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Type mismatch: expected '{expected}', found '{found}'")]
    TypeMismatch { expected: String, found: String },
    #[error("Value '{value}' is out of range for '{target}'")]
    OutOfRange { value: String, target: String },
    #[error("Values of type '{0}' must be converted through an object factory")]
    ObjectType(FieldType),
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

/// A homogeneous primitive array.
#[derive(Debug, Clone, PartialEq)]
pub enum Array {
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Int64(Vec<i64>),
    UInt64(Vec<u64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Bool(Vec<bool>),
    String(Vec<String>),
}

macro_rules! each_array {
    ($array:expr, $values:ident => $body:expr) => {
        match $array {
            Array::Int32($values) => $body,
            Array::UInt32($values) => $body,
            Array::Int64($values) => $body,
            Array::UInt64($values) => $body,
            Array::Float($values) => $body,
            Array::Double($values) => $body,
            Array::Bool($values) => $body,
            Array::String($values) => $body,
        }
    };
}

macro_rules! split_array {
    ($array:expr, $size:expr; $($variant:ident),*) => {
        match $array {
            $(Array::$variant(values) => values
                .chunks($size)
                .map(|chunk| Array::$variant(chunk.to_vec()))
                .collect(),)*
        }
    };
}

impl Array {
    pub fn empty(element: ScalarType) -> Self {
        match element {
            ScalarType::Int32 => Array::Int32(Vec::new()),
            ScalarType::UInt32 => Array::UInt32(Vec::new()),
            ScalarType::Int64 => Array::Int64(Vec::new()),
            ScalarType::UInt64 => Array::UInt64(Vec::new()),
            ScalarType::Float => Array::Float(Vec::new()),
            ScalarType::Double => Array::Double(Vec::new()),
            ScalarType::Bool => Array::Bool(Vec::new()),
            ScalarType::String => Array::String(Vec::new()),
        }
    }

    pub fn element_type(&self) -> ScalarType {
        match self {
            Array::Int32(_) => ScalarType::Int32,
            Array::UInt32(_) => ScalarType::UInt32,
            Array::Int64(_) => ScalarType::Int64,
            Array::UInt64(_) => ScalarType::UInt64,
            Array::Float(_) => ScalarType::Float,
            Array::Double(_) => ScalarType::Double,
            Array::Bool(_) => ScalarType::Bool,
            Array::String(_) => ScalarType::String,
        }
    }

    pub fn len(&self) -> usize {
        each_array!(self, values => values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Splits the array into consecutive pieces of at most `size` elements.
    pub fn chunks(&self, size: usize) -> Vec<Array> {
        split_array!(self, size.max(1); Int32, UInt32, Int64, UInt64, Float, Double, Bool, String)
    }

    /// Appends `other` to the end of this array. Both must share the element type.
    pub fn append(&mut self, other: Array) -> Result<(), CodecError> {
        match (self, other) {
            (Array::Int32(a), Array::Int32(b)) => a.extend(b),
            (Array::UInt32(a), Array::UInt32(b)) => a.extend(b),
            (Array::Int64(a), Array::Int64(b)) => a.extend(b),
            (Array::UInt64(a), Array::UInt64(b)) => a.extend(b),
            (Array::Float(a), Array::Float(b)) => a.extend(b),
            (Array::Double(a), Array::Double(b)) => a.extend(b),
            (Array::Bool(a), Array::Bool(b)) => a.extend(b),
            (Array::String(a), Array::String(b)) => a.extend(b),
            (this, other) => {
                return Err(CodecError::TypeMismatch {
                    expected: format!("{}[]", this.element_type()),
                    found: format!("{}[]", other.element_type()),
                });
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> serde_json::Value {
        each_array!(self, values => json!(values))
    }

    pub fn from_json(json: &serde_json::Value, element: ScalarType) -> Result<Self, CodecError> {
        let items = json.as_array().ok_or_else(|| CodecError::TypeMismatch {
            expected: format!("{element}[]"),
            found: json.to_string(),
        })?;

        fn collect<T>(
            items: &[serde_json::Value],
            f: impl Fn(&serde_json::Value) -> Result<T, CodecError>,
        ) -> Result<Vec<T>, CodecError> {
            items.iter().map(f).collect()
        }

        Ok(match element {
            ScalarType::Int32 => Array::Int32(collect(items, decode_i32)?),
            ScalarType::UInt32 => Array::UInt32(collect(items, decode_u32)?),
            ScalarType::Int64 => Array::Int64(collect(items, decode_i64)?),
            ScalarType::UInt64 => Array::UInt64(collect(items, decode_u64)?),
            ScalarType::Float => Array::Float(collect(items, decode_f32)?),
            ScalarType::Double => Array::Double(collect(items, decode_f64)?),
            ScalarType::Bool => Array::Bool(collect(items, decode_bool)?),
            ScalarType::String => Array::String(collect(items, decode_string)?),
        })
    }
}

/// A native field, argument or return value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Array(Array),
    Object(ProxyObject),
    Objects(Vec<ProxyObject>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt(u) => Some(*u),
            Value::Int(i) => u64::try_from(*i).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            Value::UInt(u) => Some(*u as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ProxyObject> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_objects(&self) -> Option<&[ProxyObject]> {
        match self {
            Value::Objects(objects) => Some(objects),
            _ => None,
        }
    }

    /// Short description of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Objects(_) => "object[]",
        }
    }
}

macro_rules! value_from {
    ($($source:ty => |$v:ident| $body:expr),* $(,)?) => {
        $(impl From<$source> for Value {
            fn from($v: $source) -> Self {
                $body
            }
        })*
    };
}

value_from! {
    bool => |v| Value::Bool(v),
    i32 => |v| Value::Int(v.into()),
    i64 => |v| Value::Int(v),
    u32 => |v| Value::UInt(v.into()),
    u64 => |v| Value::UInt(v),
    f32 => |v| Value::Float(v.into()),
    f64 => |v| Value::Float(v),
    &str => |v| Value::String(v.to_string()),
    String => |v| Value::String(v),
    Array => |v| Value::Array(v),
    Vec<i32> => |v| Value::Array(Array::Int32(v)),
    Vec<u32> => |v| Value::Array(Array::UInt32(v)),
    Vec<i64> => |v| Value::Array(Array::Int64(v)),
    Vec<u64> => |v| Value::Array(Array::UInt64(v)),
    Vec<f32> => |v| Value::Array(Array::Float(v)),
    Vec<f64> => |v| Value::Array(Array::Double(v)),
    Vec<bool> => |v| Value::Array(Array::Bool(v)),
    Vec<String> => |v| Value::Array(Array::String(v)),
    ProxyObject => |v| Value::Object(v),
    Vec<ProxyObject> => |v| Value::Objects(v),
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Decodes a wire value of a non-object type.
pub fn decode(json: &serde_json::Value, field_type: FieldType) -> Result<Value, CodecError> {
    if json.is_null() {
        return Ok(Value::Null);
    }

    match field_type {
        FieldType::Scalar(scalar) => decode_scalar(json, scalar),
        FieldType::Array(element) => Array::from_json(json, element).map(Value::Array),
        object_type => Err(CodecError::ObjectType(object_type)),
    }
}

/// Decodes the reply of a field read, concatenating chunked arrays in arrival order.
pub fn decode_reply(reply: FieldReply, field_type: FieldType) -> Result<Value, CodecError> {
    match (reply, field_type) {
        (FieldReply::Value(json), field_type) => decode(&json, field_type),
        (FieldReply::Chunks(chunks), FieldType::Array(element)) => {
            concat_chunks(element, chunks).map(Value::Array)
        }
        (FieldReply::Chunks(_), field_type) => Err(CodecError::TypeMismatch {
            expected: field_type.to_string(),
            found: "chunked array".to_string(),
        }),
    }
}

/// Encodes a native value of a non-object type.
pub fn encode(value: &Value, field_type: FieldType) -> Result<serde_json::Value, CodecError> {
    match (field_type, value) {
        (_, Value::Null) => Ok(serde_json::Value::Null),
        (FieldType::Scalar(scalar), value) => encode_scalar(value, scalar),
        (FieldType::Array(element), Value::Array(array)) if array.element_type() == element => {
            Ok(array.to_json())
        }
        (FieldType::Array(_), value) => Err(mismatch(field_type, value)),
        (object_type, _) => Err(CodecError::ObjectType(object_type)),
    }
}

/// Builds the chunk stream writing `array` into `field`.
pub fn chunk_array(field: FieldAddress, array: &Array) -> Vec<ArrayChunk> {
    let data = array.chunks(CHUNK_SIZE);
    let mut chunks = Vec::with_capacity(data.len() + 2);

    chunks.push(ArrayChunk::Header {
        field,
        value_count: array.len() as u64,
    });
    chunks.extend(data.into_iter().map(ArrayChunk::Data));
    chunks.push(ArrayChunk::End);
    chunks
}

/// Concatenates received chunks, in order, into one array of `element`s.
pub fn concat_chunks(
    element: ScalarType,
    chunks: impl IntoIterator<Item = Array>,
) -> Result<Array, CodecError> {
    let mut array = Array::empty(element);
    for chunk in chunks {
        array.append(chunk)?;
    }
    Ok(array)
}

fn decode_scalar(json: &serde_json::Value, scalar: ScalarType) -> Result<Value, CodecError> {
    match scalar {
        ScalarType::Int32 => decode_i32(json).map(Value::from),
        ScalarType::UInt32 => decode_u32(json).map(Value::from),
        ScalarType::Int64 => decode_i64(json).map(Value::from),
        ScalarType::UInt64 => decode_u64(json).map(Value::from),
        ScalarType::Float => decode_f32(json).map(Value::from),
        ScalarType::Double => decode_f64(json).map(Value::from),
        ScalarType::Bool => decode_bool(json).map(Value::from),
        ScalarType::String => decode_string(json).map(Value::from),
    }
}

fn encode_scalar(value: &Value, scalar: ScalarType) -> Result<serde_json::Value, CodecError> {
    let field_type = FieldType::Scalar(scalar);
    let out_of_range = || CodecError::OutOfRange {
        value: format!("{value:?}"),
        target: scalar.to_string(),
    };

    match scalar {
        ScalarType::Int32 => {
            let i = integer(value, field_type)?;
            i32::try_from(i).map(|i| json!(i)).map_err(|_| out_of_range())
        }
        ScalarType::UInt32 => {
            let u = unsigned(value, field_type)?;
            u32::try_from(u).map(|u| json!(u)).map_err(|_| out_of_range())
        }
        ScalarType::Int64 => integer(value, field_type).map(|i| json!(i)),
        ScalarType::UInt64 => unsigned(value, field_type).map(|u| json!(u)),
        ScalarType::Float => value
            .as_f64()
            .map(|f| json!(f as f32))
            .ok_or_else(|| mismatch(field_type, value)),
        ScalarType::Double => value
            .as_f64()
            .map(|f| json!(f))
            .ok_or_else(|| mismatch(field_type, value)),
        ScalarType::Bool => value
            .as_bool()
            .map(|b| json!(b))
            .ok_or_else(|| mismatch(field_type, value)),
        ScalarType::String => value
            .as_str()
            .map(|s| json!(s))
            .ok_or_else(|| mismatch(field_type, value)),
    }
}

fn integer(value: &Value, field_type: FieldType) -> Result<i64, CodecError> {
    match value {
        Value::Int(i) => Ok(*i),
        Value::UInt(u) => i64::try_from(*u).map_err(|_| CodecError::OutOfRange {
            value: u.to_string(),
            target: field_type.to_string(),
        }),
        other => Err(mismatch(field_type, other)),
    }
}

fn unsigned(value: &Value, field_type: FieldType) -> Result<u64, CodecError> {
    match value {
        Value::UInt(u) => Ok(*u),
        Value::Int(i) => u64::try_from(*i).map_err(|_| CodecError::OutOfRange {
            value: i.to_string(),
            target: field_type.to_string(),
        }),
        other => Err(mismatch(field_type, other)),
    }
}

fn mismatch(expected: FieldType, found: &Value) -> CodecError {
    CodecError::TypeMismatch {
        expected: expected.to_string(),
        found: found.kind().to_string(),
    }
}

fn wire_mismatch(expected: ScalarType, found: &serde_json::Value) -> CodecError {
    CodecError::TypeMismatch {
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

fn decode_i64(json: &serde_json::Value) -> Result<i64, CodecError> {
    match json.as_i64() {
        Some(i) => Ok(i),
        None if json.is_u64() => Err(CodecError::OutOfRange {
            value: json.to_string(),
            target: ScalarType::Int64.to_string(),
        }),
        None => Err(wire_mismatch(ScalarType::Int64, json)),
    }
}

fn decode_u64(json: &serde_json::Value) -> Result<u64, CodecError> {
    match json.as_u64() {
        Some(u) => Ok(u),
        None if json.is_i64() => Err(CodecError::OutOfRange {
            value: json.to_string(),
            target: ScalarType::UInt64.to_string(),
        }),
        None => Err(wire_mismatch(ScalarType::UInt64, json)),
    }
}

fn decode_i32(json: &serde_json::Value) -> Result<i32, CodecError> {
    let i = decode_i64(json).map_err(|_| wire_mismatch(ScalarType::Int32, json))?;
    i32::try_from(i).map_err(|_| CodecError::OutOfRange {
        value: i.to_string(),
        target: ScalarType::Int32.to_string(),
    })
}

fn decode_u32(json: &serde_json::Value) -> Result<u32, CodecError> {
    let u = decode_u64(json)?;
    u32::try_from(u).map_err(|_| CodecError::OutOfRange {
        value: u.to_string(),
        target: ScalarType::UInt32.to_string(),
    })
}

fn decode_f64(json: &serde_json::Value) -> Result<f64, CodecError> {
    json.as_f64()
        .ok_or_else(|| wire_mismatch(ScalarType::Double, json))
}

fn decode_f32(json: &serde_json::Value) -> Result<f32, CodecError> {
    json.as_f64()
        .map(|f| f as f32)
        .ok_or_else(|| wire_mismatch(ScalarType::Float, json))
}

fn decode_bool(json: &serde_json::Value) -> Result<bool, CodecError> {
    json.as_bool()
        .ok_or_else(|| wire_mismatch(ScalarType::Bool, json))
}

fn decode_string(json: &serde_json::Value) -> Result<String, CodecError> {
    json.as_str()
        .map(str::to_string)
        .ok_or_else(|| wire_mismatch(ScalarType::String, json))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> FieldAddress {
        FieldAddress {
            class_keyword: "DemoObject".to_string(),
            uuid: "1234".to_string(),
            keyword: "proxyIntVector".to_string(),
        }
    }

    #[test]
    fn test_scalar_round_trip() {
        let cases = [
            (Value::Int(-41), FieldType::Scalar(ScalarType::Int32)),
            (Value::UInt(41), FieldType::Scalar(ScalarType::UInt32)),
            (Value::Int(i64::MIN), FieldType::Scalar(ScalarType::Int64)),
            (Value::UInt(u64::MAX), FieldType::Scalar(ScalarType::UInt64)),
            (Value::from(0.1f32), FieldType::Scalar(ScalarType::Float)),
            (Value::Float(99.5), FieldType::Scalar(ScalarType::Double)),
            (Value::Bool(true), FieldType::Scalar(ScalarType::Bool)),
            (Value::from("AnotherValue"), FieldType::Scalar(ScalarType::String)),
            (Value::Null, FieldType::Scalar(ScalarType::String)),
        ];

        for (value, field_type) in cases {
            let wire = encode(&value, field_type).unwrap();
            assert_eq!(decode(&wire, field_type).unwrap(), value, "{field_type}");
        }
    }

    #[test]
    fn test_array_round_trip() {
        let cases = [
            Value::from(vec![1, 4, 42]),
            Value::from(vec![1u32, 2, 3]),
            Value::from(vec![i64::MAX, -1]),
            Value::from(vec![u64::MAX]),
            Value::from(vec![1.0f32, 3.0, -42.0]),
            Value::from(vec![0.25f64, 1e10]),
            Value::from(vec![true, false]),
            Value::from(vec!["a".to_string(), "b".to_string()]),
        ];

        for value in cases {
            let Value::Array(array) = &value else {
                unreachable!()
            };
            let field_type = FieldType::Array(array.element_type());
            let wire = encode(&value, field_type).unwrap();
            assert_eq!(decode(&wire, field_type).unwrap(), value, "{field_type}");
        }
    }

    #[test]
    fn test_decode_follows_declared_type() {
        let double = FieldType::Scalar(ScalarType::Double);
        assert_eq!(decode(&json!(41), double).unwrap(), Value::Float(41.0));

        let int = FieldType::Scalar(ScalarType::Int32);
        assert!(matches!(
            decode(&json!("41"), int),
            Err(CodecError::TypeMismatch { .. })
        ));
        assert!(matches!(
            decode(&json!(i64::from(i32::MAX) + 1), int),
            Err(CodecError::OutOfRange { .. })
        ));
        assert!(matches!(
            decode(&json!({ "keyword": "DemoObject" }), FieldType::Object),
            Err(CodecError::ObjectType(FieldType::Object))
        ));
    }

    #[test]
    fn test_encode_rejects_mismatched_values() {
        let uint = FieldType::Scalar(ScalarType::UInt32);
        assert!(matches!(
            encode(&Value::Int(-1), uint),
            Err(CodecError::OutOfRange { .. })
        ));
        assert!(matches!(
            encode(&Value::from("x"), FieldType::Scalar(ScalarType::Bool)),
            Err(CodecError::TypeMismatch { .. })
        ));
        assert!(matches!(
            encode(&Value::from(vec![1, 2]), FieldType::Array(ScalarType::Double)),
            Err(CodecError::TypeMismatch { .. })
        ));
        // Integers are accepted where floating point values are declared
        assert_eq!(
            encode(&Value::Int(3), FieldType::Scalar(ScalarType::Double)).unwrap(),
            json!(3.0)
        );
    }

    #[test]
    fn test_chunk_boundaries() {
        for (len, data_chunks) in [(0usize, 0usize), (1, 1), (4096, 1), (4097, 2), (8192, 2)] {
            let array = Array::Int32((0..len as i32).collect());
            let chunks = chunk_array(field(), &array);

            assert_eq!(chunks.len(), data_chunks + 2, "length {len}");
            assert_eq!(
                chunks.first(),
                Some(&ArrayChunk::Header {
                    field: field(),
                    value_count: len as u64
                })
            );
            assert_eq!(chunks.last(), Some(&ArrayChunk::End));

            let data: Vec<Array> = chunks
                .into_iter()
                .filter_map(|chunk| match chunk {
                    ArrayChunk::Data(data) => Some(data),
                    _ => None,
                })
                .collect();
            assert!(data.iter().all(|d| d.len() <= CHUNK_SIZE && !d.is_empty()));
            assert_eq!(concat_chunks(ScalarType::Int32, data).unwrap(), array);
        }
    }

    #[test]
    fn test_concat_rejects_foreign_chunks() {
        let chunks = vec![Array::Double(vec![1.0]), Array::Int32(vec![2])];
        assert!(matches!(
            concat_chunks(ScalarType::Double, chunks),
            Err(CodecError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_decode_chunked_reply() {
        let reply = FieldReply::Chunks(vec![Array::Float(vec![1.0, 2.0]), Array::Float(vec![3.0])]);
        assert_eq!(
            decode_reply(reply, FieldType::Array(ScalarType::Float)).unwrap(),
            Value::from(vec![1.0f32, 2.0, 3.0])
        );
    }
}
