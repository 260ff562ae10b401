//! Dotted field paths such as `demoObject.children[2].name`.
use anyhow::{Context, bail};
use caffa_core::{FieldType, ProxyObject, Value, object::factory::Mode};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub name: String,
    pub index: Option<usize>,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}[{}]", self.name, index),
            None => f.write_str(&self.name),
        }
    }
}

impl FromStr for Segment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, index) = match s.split_once('[') {
            Some((name, rest)) => {
                let index = rest
                    .strip_suffix(']')
                    .with_context(|| format!("Unterminated index in '{s}'"))?
                    .parse()
                    .with_context(|| format!("Invalid index in '{s}'"))?;
                (name, Some(index))
            }
            None => (s, None),
        };

        if name.is_empty() {
            bail!("Empty field name in path");
        }
        Ok(Segment {
            name: name.to_string(),
            index,
        })
    }
}

/// A path of fields, starting at a document root. The empty path (or `.`) is the root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(pub Vec<Segment>);

impl FromStr for FieldPath {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_matches('.');
        if s.is_empty() {
            return Ok(FieldPath::default());
        }
        s.split('.').map(str::parse).collect::<Result<_, _>>().map(FieldPath)
    }
}

impl FieldPath {
    /// Splits the path into the path of the owning object and the last segment.
    pub fn split_last(&self) -> Option<(FieldPath, &Segment)> {
        let (last, parent) = self.0.split_last()?;
        Some((FieldPath(parent.to_vec()), last))
    }
}

/// Follows `path` from `root` through object fields.
pub async fn resolve_object(root: &ProxyObject, path: &FieldPath) -> anyhow::Result<ProxyObject> {
    let mut current = root.clone();
    for segment in &path.0 {
        let value = current.get(&segment.name).await?;
        current = match (value, segment.index) {
            (Value::Object(object), None) => object,
            (Value::Objects(objects), Some(index)) => objects
                .get(index)
                .cloned()
                .with_context(|| format!("'{segment}' is out of bounds ({})", objects.len()))?,
            (Value::Null, _) => bail!("'{segment}' is not set"),
            (other, _) => bail!("'{segment}' holds {}, not an object", other.kind()),
        };
    }
    Ok(current)
}

/// Reads the field at `path` in wire form.
pub async fn read(root: &ProxyObject, path: &FieldPath) -> anyhow::Result<serde_json::Value> {
    let Some((parent, last)) = path.split_last() else {
        return Ok(root.to_json().await?);
    };
    let object = resolve_object(root, &parent).await?;

    match last.index {
        None => Ok(object.get_json(&last.name).await?),
        Some(index) => {
            let json = object.get_json(&last.name).await?;
            json.get(index)
                .cloned()
                .with_context(|| format!("'{last}' is out of bounds"))
        }
    }
}

/// Writes the field at `path` from its wire form. An indexed last segment replaces one element.
pub async fn write(
    root: &ProxyObject,
    path: &FieldPath,
    json: &serde_json::Value,
) -> anyhow::Result<()> {
    let Some((parent, last)) = path.split_last() else {
        bail!("Cannot overwrite the document itself");
    };
    let object = resolve_object(root, &parent).await?;

    let Some(index) = last.index else {
        object.set_json(&last.name, json).await?;
        return Ok(());
    };

    let field_type = object
        .descriptor()
        .field(&last.name)
        .map(|field| field.field_type)
        .with_context(|| format!("'{}' has no field '{}'", object.keyword(), last.name))?;
    let element_type = match field_type {
        FieldType::Array(element) => FieldType::Scalar(element),
        FieldType::ObjectArray => FieldType::Object,
        other => bail!("'{last}' is indexed but '{}' is of type {other}", last.name),
    };

    let value = object
        .factory()
        .decode(json, element_type, Mode::Local)
        .await?;
    object.set_at(&last.name, value, index as u64).await?;
    Ok(())
}
