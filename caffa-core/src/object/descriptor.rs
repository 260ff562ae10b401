use super::method::MethodDescriptor;
use crate::schema::{FieldType, PropertyMap, SchemaError};
use std::collections::BTreeMap;
use tracing::warn;

/// Property names that describe the class rather than a field of it.
const KEYWORD_PROPERTY: &str = "keyword";
const METHODS_PROPERTY: &str = "methods";

/// How a field may be accessed, from the `readOnly` / `writeOnly` schema flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Access {
    #[default]
    ReadWrite,
    ReadOnly,
    WriteOnly,
}

impl Access {
    fn from_schema(property: &str, schema: &serde_json::Value) -> Self {
        let flag = |name: &str| schema.get(name).and_then(|f| f.as_bool()).unwrap_or(false);

        match (flag("readOnly"), flag("writeOnly")) {
            (true, true) => {
                warn!(
                    "Property '{}' is both readOnly and writeOnly, treating it as readOnly",
                    property
                );
                Access::ReadOnly
            }
            (true, false) => Access::ReadOnly,
            (false, true) => Access::WriteOnly,
            (false, false) => Access::ReadWrite,
        }
    }

    pub fn is_readable(&self) -> bool {
        !matches!(self, Access::WriteOnly)
    }

    pub fn is_writable(&self) -> bool {
        !matches!(self, Access::ReadOnly)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
    pub access: Access,
}

/// The sealed shape of one class: its fields and its methods.
///
/// Built once per keyword by [`crate::ObjectFactory`] and shared by every instance of the class.
/// Nothing outside this set of fields can be read or written through a [`crate::ProxyObject`].
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    pub keyword: String,
    pub fields: BTreeMap<String, FieldDescriptor>,
    pub methods: BTreeMap<String, MethodDescriptor>,
}

impl TypeDescriptor {
    /// Synthesizes the descriptor of `keyword` from its flattened properties.
    ///
    /// Fails on the first property whose type tag cannot be resolved.
    pub fn from_properties(keyword: &str, properties: &PropertyMap) -> Result<Self, SchemaError> {
        let mut fields = BTreeMap::new();
        let mut methods = BTreeMap::new();

        for (name, schema) in properties {
            match name.as_str() {
                KEYWORD_PROPERTY => {}
                METHODS_PROPERTY => {
                    for method in MethodDescriptor::from_methods_schema(schema)? {
                        methods.insert(method.name.clone(), method);
                    }
                }
                _ => {
                    let field = FieldDescriptor {
                        name: name.clone(),
                        field_type: FieldType::from_schema(name, schema)?,
                        access: Access::from_schema(name, schema),
                    };
                    fields.insert(name.clone(), field);
                }
            }
        }

        Ok(Self {
            keyword: keyword.to_string(),
            fields,
            methods,
        })
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }
}
