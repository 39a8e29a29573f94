use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use gray_matter::engine::YAML;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::core::{ArcStr, ResourceId};
use crate::error::MetadataError;

/// Separates the levels of a resource type, e.g. `shader/vertex`.
pub const TYPE_SEPARATOR: char = '/';

/// Everything known about a resource before it is loaded.
///
/// A descriptor is usually read from a metadata file (see [`ResourceDescriptor::load`]),
/// but it can be assembled by hand as well:
///
/// ```rust
/// use tsumiki::ResourceDescriptor;
///
/// let program = ResourceDescriptor::new("basic", "shader_program")
///     .implementation("glsl")
///     .depends_on("basic_vertex")
///     .depends_on("basic_fragment");
///
/// assert_eq!(program.dependencies.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    /// Globally unique identifier.
    pub id: ResourceId,
    /// Full type tag, possibly with subtypes.
    pub kind: ArcStr,
    /// Name of the implementation variant, if any.
    pub implementation: Option<ArcStr>,
    /// Where the resource itself is stored.
    pub path: Utf8PathBuf,
    /// Identifiers of the resources that must be loaded before this one.
    pub dependencies: Vec<ResourceId>,
    /// Metadata file this descriptor was read from.
    pub source: Option<Utf8PathBuf>,
    /// Every other field found in the metadata.
    pub attributes: Map<String, Value>,
}

/// Shape of the front matter in a metadata file.
#[derive(Deserialize)]
struct Metadata {
    #[serde(default, deserialize_with = "scalar")]
    id: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "scalar")]
    kind: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    implementation: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    filename: Option<String>,
    #[serde(default, deserialize_with = "scalars")]
    dependencies: Vec<String>,
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

impl ResourceDescriptor {
    pub fn new(id: impl Into<ResourceId>, kind: impl Into<ArcStr>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            implementation: None,
            path: Utf8PathBuf::new(),
            dependencies: Vec::new(),
            source: None,
            attributes: Map::new(),
        }
    }

    pub fn implementation(mut self, implementation: impl Into<ArcStr>) -> Self {
        self.implementation = Some(implementation.into());
        self
    }

    pub fn path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    pub fn depends_on(mut self, id: impl Into<ResourceId>) -> Self {
        self.dependencies.push(id.into());
        self
    }

    pub fn attribute_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Reads a descriptor from a metadata file.
    ///
    /// The file carries YAML front matter with at least `id`, `type` and
    /// `filename`. The storage path is `filename` resolved against the
    /// directory holding the metadata file.
    pub fn load(path: &Utf8Path) -> Result<Self, MetadataError> {
        let content =
            fs::read_to_string(path).map_err(|e| MetadataError::Io(path.to_owned(), e))?;
        Self::parse(path, &content)
    }

    /// Same as [`ResourceDescriptor::load`], with the file content already in memory.
    pub fn parse(path: &Utf8Path, content: &str) -> Result<Self, MetadataError> {
        let meta = parse_yaml::<Metadata>(content)
            .map_err(|e| MetadataError::Malformed(path.to_owned(), e.to_string()))?;

        let missing = |field| MetadataError::MissingField(path.to_owned(), field);

        let id = meta.id.filter(|id| !id.is_empty()).ok_or_else(|| missing("id"))?;
        let kind = meta
            .kind
            .filter(|kind| !kind.is_empty())
            .ok_or_else(|| missing("type"))?;
        let filename = meta
            .filename
            .filter(|filename| !filename.is_empty())
            .ok_or_else(|| missing("filename"))?;

        let dir = path.parent().unwrap_or(Utf8Path::new(""));

        Ok(Self {
            id: id.into(),
            kind: kind.into(),
            implementation: meta
                .implementation
                .filter(|implementation| !implementation.is_empty())
                .map(Into::into),
            path: dir.join(filename),
            dependencies: meta.dependencies.into_iter().map(Into::into).collect(),
            source: Some(path.to_owned()),
            attributes: meta.attributes,
        })
    }

    /// Returns the type segment at `level`, or an empty string if the type
    /// tag is not that deep. Level 0 is the main type.
    pub fn subtype(&self, level: usize) -> &str {
        self.kind.split(TYPE_SEPARATOR).nth(level).unwrap_or("")
    }

    /// Deserializes an additional metadata field.
    pub fn attribute<T>(&self, name: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let value = self.attributes.get(name)?;
        match serde_json::from_value(value.clone()) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(id = %self.id, attribute = name, "malformed attribute: {err}");
                None
            }
        }
    }
}

/// Reads any YAML scalar as a string, so that `id: 42` names resource "42".
fn scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => scalar_to_string(value).map(Some),
    }
}

fn scalars<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<Vec<Value>>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(values) => values.into_iter().map(scalar_to_string).collect(),
    }
}

fn scalar_to_string<E>(value: Value) -> Result<String, E>
where
    E: serde::de::Error,
{
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(E::custom(format!("expected a scalar, found {other}"))),
    }
}

/// Generate the functions used to read metadata files. These functions parse
/// the front matter using engines from crate `gray_matter`.
macro_rules! matter_parser {
	($name:ident, $engine:path) => {
		#[doc = concat!(
			"Extracts `D` from the front matter of a document.\n",
			"Configured to use [`", stringify!($engine), "`] as the engine of the parser."
		)]
		fn $name<D>(content: &str) -> Result<D, anyhow::Error>
		where
			D: for<'de> serde::Deserialize<'de>,
		{
			use gray_matter::{Matter, Pod};

			static PARSER: std::sync::LazyLock<Matter<$engine>> = std::sync::LazyLock::new(Matter::<$engine>::new);

			let entity = PARSER.parse(content)?;
			let object = entity
				.data
				.unwrap_or_else(Pod::new_hash)
				.deserialize::<D>()
				.map_err(|e| anyhow::anyhow!("{e}"))?;

			Ok(object)
		}
	};
}

matter_parser!(parse_yaml, YAML);
