//! Method descriptors and dispatch.
//!
//! A method call is one `ExecuteMethod` round trip. The argument payload starts from the
//! method's template, where every declared slot is `null`, and only the slots supplied by the
//! caller are overwritten.
use super::{ObjectError, ProxyObject, factory::Mode, factory::ObjectFactory};
use crate::{
    codec::Value,
    schema::{FieldType, SchemaError},
    transport::MethodRequest,
};
use serde_json::json;
use tracing::debug;

const LABELLED_ARGUMENTS: &str = "labelledArguments";
const POSITIONAL_ARGUMENTS: &str = "positionalArguments";
const RETURNS: &str = "returns";

/// The call signature of one method, as declared by the class schema.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDescriptor {
    pub name: String,
    /// Named argument slots, when the method accepts labelled arguments.
    pub labelled: Option<Vec<(String, FieldType)>>,
    /// Ordered argument slots, when the method accepts positional arguments.
    pub positional: Option<Vec<FieldType>>,
    pub returns: Option<FieldType>,
}

impl MethodDescriptor {
    /// Parses the reserved `methods` property of a class schema.
    pub(crate) fn from_methods_schema(schema: &serde_json::Value) -> Result<Vec<Self>, SchemaError> {
        let Some(methods) = schema.get("properties").and_then(|p| p.as_object()) else {
            return Ok(Vec::new());
        };

        methods
            .iter()
            .map(|(name, schema)| Self::from_schema(name, schema))
            .collect()
    }

    /// Parses the schema of a single method.
    ///
    /// The argument declarations may sit at the top level or inside a `properties` object.
    pub fn from_schema(name: &str, schema: &serde_json::Value) -> Result<Self, SchemaError> {
        let declares = |s: &serde_json::Value| {
            [LABELLED_ARGUMENTS, POSITIONAL_ARGUMENTS, RETURNS]
                .iter()
                .any(|key| s.get(key).is_some())
        };
        let body = match schema.get("properties") {
            Some(inner) if !declares(schema) => inner,
            _ => schema,
        };

        let invalid = |detail: &str| SchemaError::InvalidSchema {
            location: format!("method '{name}'"),
            detail: detail.to_string(),
        };

        let labelled = match body.get(LABELLED_ARGUMENTS) {
            None => None,
            Some(arguments) => {
                let slots = match arguments.get("properties") {
                    None => Vec::new(),
                    Some(properties) => properties
                        .as_object()
                        .ok_or_else(|| invalid("'labelledArguments.properties' must be an object"))?
                        .iter()
                        .map(|(argument, schema)| {
                            let field_type =
                                FieldType::from_schema(&format!("{name}.{argument}"), schema)?;
                            Ok((argument.clone(), field_type))
                        })
                        .collect::<Result<_, SchemaError>>()?,
                };
                Some(slots)
            }
        };

        let positional = match body.get(POSITIONAL_ARGUMENTS) {
            None => None,
            Some(arguments) => {
                let slots = match arguments.get("items") {
                    None => Vec::new(),
                    Some(items) => items
                        .as_array()
                        .ok_or_else(|| invalid("'positionalArguments.items' must be an array"))?
                        .iter()
                        .enumerate()
                        .map(|(i, schema)| FieldType::from_schema(&format!("{name}.{i}"), schema))
                        .collect::<Result<_, SchemaError>>()?,
                };
                Some(slots)
            }
        };

        let returns = match body.get(RETURNS) {
            Some(schema) if schema.as_object().is_some_and(|o| !o.is_empty()) => {
                Some(FieldType::from_schema(&format!("{name}.returns"), schema)?)
            }
            _ => None,
        };

        Ok(Self {
            name: name.to_string(),
            labelled,
            positional,
            returns,
        })
    }

    /// Parses a method descriptor as listed by the server, named by `name` or `keyword`.
    pub(crate) fn from_listing(schema: &serde_json::Value) -> Result<Self, SchemaError> {
        let name = schema
            .get("name")
            .or_else(|| schema.get("keyword"))
            .and_then(|n| n.as_str())
            .ok_or_else(|| SchemaError::InvalidSchema {
                location: "method listing".to_string(),
                detail: format!("method without a name: '{schema}'"),
            })?;
        Self::from_schema(name, schema)
    }

    fn labelled_template(&self) -> Option<serde_json::Map<String, serde_json::Value>> {
        self.labelled.as_ref().map(|slots| {
            slots
                .iter()
                .map(|(name, _)| (name.clone(), serde_json::Value::Null))
                .collect()
        })
    }

    fn positional_template(&self) -> Option<Vec<serde_json::Value>> {
        self.positional
            .as_ref()
            .map(|slots| vec![serde_json::Value::Null; slots.len()])
    }

    /// The payload sent when the method is called without arguments.
    pub fn template(&self) -> serde_json::Value {
        if let Some(labelled) = self.labelled_template() {
            json!({ LABELLED_ARGUMENTS: labelled })
        } else if let Some(positional) = self.positional_template() {
            json!({ POSITIONAL_ARGUMENTS: positional })
        } else {
            json!({})
        }
    }
}

/// The arguments of one call. Labelled and positional arguments cannot be mixed.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Arguments {
    #[default]
    None,
    Labelled(Vec<(String, Value)>),
    Positional(Vec<Value>),
}

impl Arguments {
    pub fn labelled<I, K, V>(arguments: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Arguments::Labelled(
            arguments
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn positional<I, V>(arguments: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Arguments::Positional(arguments.into_iter().map(Into::into).collect())
    }
}

/// The interpreted result of a method call.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodOutput {
    /// The server answered with an object. It is a local snapshot of that object.
    Object(ProxyObject),
    /// A value decoded through the declared return type.
    Value(Value),
    /// A value with no declared type, passed through as is.
    Json(serde_json::Value),
}

impl MethodOutput {
    pub fn into_object(self) -> Option<ProxyObject> {
        match self {
            MethodOutput::Object(object) | MethodOutput::Value(Value::Object(object)) => {
                Some(object)
            }
            _ => None,
        }
    }

    /// The output in wire form.
    pub async fn to_json(&self) -> Result<serde_json::Value, ObjectError> {
        match self {
            MethodOutput::Object(object) => object.to_json().await,
            MethodOutput::Value(value) => match value {
                Value::Object(object) => object.to_json().await,
                Value::Objects(_) => ObjectFactory::encode(value, FieldType::ObjectArray).await,
                other => Ok(value_to_json(other)),
            },
            MethodOutput::Json(json) => Ok(json.clone()),
        }
    }
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null | Value::Object(_) | Value::Objects(_) => serde_json::Value::Null,
        Value::Bool(b) => json!(b),
        Value::Int(i) => json!(i),
        Value::UInt(u) => json!(u),
        Value::Float(f) => json!(f),
        Value::String(s) => json!(s),
        Value::Array(array) => array.to_json(),
    }
}

/// A method bound to the object it is invoked on.
#[derive(Debug, Clone, Copy)]
pub struct Method<'a> {
    object: &'a ProxyObject,
    descriptor: &'a MethodDescriptor,
}

impl<'a> Method<'a> {
    pub(crate) fn new(object: &'a ProxyObject, descriptor: &'a MethodDescriptor) -> Self {
        Self { object, descriptor }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &MethodDescriptor {
        self.descriptor
    }

    fn unknown_argument(&self, argument: impl Into<String>) -> ObjectError {
        ObjectError::UnknownArgument {
            method: self.descriptor.name.clone(),
            argument: argument.into(),
        }
    }

    /// Builds the wire payload of a call with `arguments`.
    pub async fn payload(&self, arguments: &Arguments) -> Result<serde_json::Value, ObjectError> {
        match arguments {
            Arguments::None => Ok(self.descriptor.template()),
            Arguments::Labelled(supplied) => {
                let slots = self.descriptor.labelled.as_deref().unwrap_or_default();
                let mut payload = self.descriptor.labelled_template().unwrap_or_default();

                for (name, value) in supplied {
                    let (_, field_type) = slots
                        .iter()
                        .find(|(slot, _)| slot == name)
                        .ok_or_else(|| self.unknown_argument(name))?;
                    payload.insert(name.clone(), ObjectFactory::encode(value, *field_type).await?);
                }
                Ok(json!({ LABELLED_ARGUMENTS: payload }))
            }
            Arguments::Positional(supplied) => {
                let slots = self.descriptor.positional.as_deref().unwrap_or_default();
                let mut payload = self.descriptor.positional_template().unwrap_or_default();

                for (index, value) in supplied.iter().enumerate() {
                    let field_type = slots
                        .get(index)
                        .ok_or_else(|| self.unknown_argument(format!("#{index}")))?;
                    payload[index] = ObjectFactory::encode(value, *field_type).await?;
                }
                Ok(json!({ POSITIONAL_ARGUMENTS: payload }))
            }
        }
    }

    /// Converts wire arguments into [`Arguments`] using the declared slot types.
    ///
    /// A JSON object is read as labelled arguments and a JSON array as positional ones.
    pub async fn arguments_from_json(
        &self,
        json: &serde_json::Value,
    ) -> Result<Arguments, ObjectError> {
        let factory = self.object.factory();

        match json {
            serde_json::Value::Null => Ok(Arguments::None),
            serde_json::Value::Object(map) => {
                let slots = self.descriptor.labelled.as_deref().unwrap_or_default();
                let mut arguments = Vec::with_capacity(map.len());
                for (name, value) in map {
                    let (_, field_type) = slots
                        .iter()
                        .find(|(slot, _)| slot == name)
                        .ok_or_else(|| self.unknown_argument(name))?;
                    let value = factory.decode(value, *field_type, Mode::Local).await?;
                    arguments.push((name.clone(), value));
                }
                Ok(Arguments::Labelled(arguments))
            }
            serde_json::Value::Array(items) => {
                let slots = self.descriptor.positional.as_deref().unwrap_or_default();
                let mut arguments = Vec::with_capacity(items.len());
                for (index, value) in items.iter().enumerate() {
                    let field_type = slots
                        .get(index)
                        .ok_or_else(|| self.unknown_argument(format!("#{index}")))?;
                    arguments.push(factory.decode(value, *field_type, Mode::Local).await?);
                }
                Ok(Arguments::Positional(arguments))
            }
            other => Err(self.unknown_argument(other.to_string())),
        }
    }

    /// Executes the method on the server and interprets its result.
    ///
    /// `None` means the method returned nothing.
    pub async fn call(&self, arguments: Arguments) -> Result<Option<MethodOutput>, ObjectError> {
        let detached = || ObjectError::Detached(self.object.keyword().to_string());
        let object = self.object.handle().ok_or_else(detached)?;
        let connection = self.object.factory().connection().ok_or_else(detached)?;

        let arguments = self.payload(&arguments).await?;
        debug!(
            "Executing method {}::{} with {}",
            object.keyword, self.descriptor.name, arguments
        );

        let request = MethodRequest {
            object,
            method: self.descriptor.name.clone(),
            arguments,
        };
        let result = connection
            .execute_method(&request)
            .await
            .map_err(|e| ObjectError::ExecutionFailed {
                method: self.descriptor.name.clone(),
                detail: e.detail(),
            })?;

        self.interpret(result).await
    }

    async fn interpret(
        &self,
        result: serde_json::Value,
    ) -> Result<Option<MethodOutput>, ObjectError> {
        let factory = self.object.factory();

        if !result.is_object() {
            return Ok((!result.is_null()).then_some(MethodOutput::Json(result)));
        }
        let Some(map) = result.as_object() else {
            return Ok(None);
        };

        if map.contains_key("keyword") {
            let object = factory.materialize(&result, Mode::Local).await?;
            return Ok(Some(MethodOutput::Object(object)));
        }

        match (map.get("value"), self.descriptor.returns) {
            (None | Some(serde_json::Value::Null), _) => Ok(None),
            (Some(value), Some(returns)) => {
                let value = factory.decode(value, returns, Mode::Local).await?;
                Ok(Some(MethodOutput::Value(value)))
            }
            (Some(value), None) if value.get("keyword").is_some() => {
                let object = factory.materialize(value, Mode::Local).await?;
                Ok(Some(MethodOutput::Object(object)))
            }
            (Some(value), None) => Ok(Some(MethodOutput::Json(value.clone()))),
        }
    }
}
