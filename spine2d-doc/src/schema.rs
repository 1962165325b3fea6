//! Spine 3.8 skeleton JSON document.
//!
//! Fields the editing operations read or rewrite are typed; everything else is kept in flattened
//! `extra` maps so it is written back as it was read.

use crate::{Error, HierarchyNode, Vertices};
use indexmap::IndexMap;
use serde::de::{self, DeserializeOwned};
use serde::ser::{self, SerializeMap};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::path::Path;

/// Fields carried through verbatim.
pub type Extra = Map<String, Value>;

/// Keyframes of one channel.
pub type Track = Vec<Keyframe>;

/// Channel name (`rotate`, `color`, `position`, ...) to keyframes.
pub type Channels = IndexMap<String, Track>;

/// Slot name to attachment name to attachment.
pub type SlotAttachments = IndexMap<String, IndexMap<String, Attachment>>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SkeletonJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skeleton: Option<SkeletonHeader>,
    #[serde(default)]
    pub bones: Vec<Bone>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slots: Vec<Slot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ik: Vec<IkConstraint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transform: Vec<TransformConstraint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<PathConstraint>,
    #[serde(default, deserialize_with = "deserialize_skins")]
    pub skins: Vec<Skin>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub animations: IndexMap<String, Animation>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl SkeletonJson {
    pub fn from_json_str(input: &str) -> Result<Self, Error> {
        serde_json::from_str(input).map_err(|e| Error::JsonParse {
            message: e.to_string(),
        })
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|e| Error::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&input)
    }

    /// Pretty-printed JSON, the way the editor exports it.
    pub fn to_json_string(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(|e| Error::JsonParse {
            message: e.to_string(),
        })
    }

    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let output = self.to_json_string()?;
        std::fs::write(path, output).map_err(|e| Error::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SkeletonHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Inherit {
    #[default]
    Normal,
    OnlyTranslation,
    NoRotationOrReflection,
    NoScale,
    NoScaleOrReflection,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, rename = "scaleX", skip_serializing_if = "Option::is_none")]
    pub scale_x: Option<f64>,
    #[serde(default, rename = "scaleY", skip_serializing_if = "Option::is_none")]
    pub scale_y: Option<f64>,
    /// Inheritance mode; the 3.8 export names this field `transform`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Inherit>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Bone {
    pub fn new(name: impl Into<String>, parent: Option<&str>) -> Self {
        Self {
            name: name.into(),
            parent: parent.map(str::to_string),
            ..Self::default()
        }
    }
}

impl HierarchyNode for Bone {
    fn name(&self) -> &str {
        &self.name
    }

    fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub name: String,
    pub bone: String,
    /// RRGGBBAA.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Slot {
    pub fn new(name: impl Into<String>, bone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bone: bone.into(),
            ..Self::default()
        }
    }
}

/// Execution order bookkeeping shared by the IK, transform and path constraints.
pub trait Constraint {
    fn name(&self) -> &str;
    fn order(&self) -> Option<i64>;
    fn set_order(&mut self, order: i64);
}

macro_rules! impl_constraint {
    ($($ty:ty),*) => {$(
        impl Constraint for $ty {
            fn name(&self) -> &str {
                &self.name
            }

            fn order(&self) -> Option<i64> {
                self.order
            }

            fn set_order(&mut self, order: i64) {
                self.order = Some(order);
            }
        }
    )*};
}

impl_constraint!(IkConstraint, TransformConstraint, PathConstraint);

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IkConstraint {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default)]
    pub bones: Vec<String>,
    pub target: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformConstraint {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default)]
    pub bones: Vec<String>,
    pub target: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PathConstraint {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default)]
    pub bones: Vec<String>,
    /// Slot holding the path attachment.
    pub target: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Skin {
    pub name: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attachments: SlotAttachments,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bones: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ik: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transform: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Skin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn attachment(&self, slot: &str, name: &str) -> Option<&Attachment> {
        self.attachments.get(slot).and_then(|slot| slot.get(name))
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SkinsDef {
    Array(Vec<Skin>),
    /// Pre-3.8 layout: skin name to slot map.
    Map(IndexMap<String, SlotAttachments>),
}

fn deserialize_skins<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Skin>, D::Error> {
    Ok(match SkinsDef::deserialize(deserializer)? {
        SkinsDef::Array(skins) => skins,
        SkinsDef::Map(skins) => skins
            .into_iter()
            .map(|(name, attachments)| Skin {
                name,
                attachments,
                ..Skin::default()
            })
            .collect(),
    })
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionAttachment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshAttachment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub uvs: Vec<f64>,
    #[serde(default)]
    pub triangles: Vec<u32>,
    pub vertices: Vertices,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hull: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edges: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkedMeshAttachment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub parent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathAttachment {
    #[serde(default)]
    pub lengths: Vec<f64>,
    #[serde(rename = "vertexCount")]
    pub vertex_count: usize,
    pub vertices: Vertices,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClippingAttachment {
    /// Last slot clipped by this attachment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(rename = "vertexCount")]
    pub vertex_count: usize,
    pub vertices: Vertices,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBoxAttachment {
    #[serde(rename = "vertexCount")]
    pub vertex_count: usize,
    pub vertices: Vertices,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A skin attachment, keyed by the JSON `type` field (`region` when absent).
#[derive(Clone, Debug, PartialEq)]
pub enum Attachment {
    Region(RegionAttachment),
    Mesh(MeshAttachment),
    LinkedMesh(LinkedMeshAttachment),
    Path(PathAttachment),
    Clipping(ClippingAttachment),
    BoundingBox(BoundingBoxAttachment),
    /// Attachment types the editing operations never look into (`point`, ...).
    Other { kind: String, fields: Extra },
}

impl Attachment {
    pub fn kind(&self) -> &str {
        match self {
            Self::Region(_) => "region",
            Self::Mesh(_) => "mesh",
            Self::LinkedMesh(_) => "linkedmesh",
            Self::Path(_) => "path",
            Self::Clipping(_) => "clipping",
            Self::BoundingBox(_) => "boundingbox",
            Self::Other { kind, .. } => kind,
        }
    }

    pub fn vertices(&self) -> Option<&Vertices> {
        match self {
            Self::Mesh(a) => Some(&a.vertices),
            Self::Path(a) => Some(&a.vertices),
            Self::Clipping(a) => Some(&a.vertices),
            Self::BoundingBox(a) => Some(&a.vertices),
            Self::Region(_) | Self::LinkedMesh(_) | Self::Other { .. } => None,
        }
    }

    pub fn vertices_mut(&mut self) -> Option<&mut Vertices> {
        match self {
            Self::Mesh(a) => Some(&mut a.vertices),
            Self::Path(a) => Some(&mut a.vertices),
            Self::Clipping(a) => Some(&mut a.vertices),
            Self::BoundingBox(a) => Some(&mut a.vertices),
            Self::Region(_) | Self::LinkedMesh(_) | Self::Other { .. } => None,
        }
    }

    /// The image path, for attachment types that carry one.
    pub fn path_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::Region(a) => a.path.as_mut(),
            Self::Mesh(a) => a.path.as_mut(),
            Self::LinkedMesh(a) => a.path.as_mut(),
            Self::Other { fields, .. } => match fields.get_mut("path") {
                Some(Value::String(path)) => Some(path),
                _ => None,
            },
            Self::Path(_) | Self::Clipping(_) | Self::BoundingBox(_) => None,
        }
    }
}

impl Serialize for Attachment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let body = match self {
            Self::Region(a) => serde_json::to_value(a),
            Self::Mesh(a) => serde_json::to_value(a),
            Self::LinkedMesh(a) => serde_json::to_value(a),
            Self::Path(a) => serde_json::to_value(a),
            Self::Clipping(a) => serde_json::to_value(a),
            Self::BoundingBox(a) => serde_json::to_value(a),
            Self::Other { fields, .. } => Ok(Value::Object(fields.clone())),
        }
        .map_err(<S::Error as ser::Error>::custom)?;
        let Value::Object(body) = body else {
            return Err(ser::Error::custom("attachment did not serialize to an object"));
        };

        let is_region = matches!(self, Self::Region(_));
        let mut map = serializer.serialize_map(Some(body.len() + usize::from(!is_region)))?;
        if !is_region {
            map.serialize_entry("type", self.kind())?;
        }
        for (key, value) in &body {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Attachment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        fn body<T: DeserializeOwned, E: de::Error>(fields: Extra) -> Result<T, E> {
            serde_json::from_value(Value::Object(fields)).map_err(E::custom)
        }

        let mut fields = Extra::deserialize(deserializer)?;
        let kind = match fields.remove("type") {
            None => "region".to_string(),
            Some(Value::String(kind)) => kind,
            Some(other) => {
                return Err(de::Error::custom(format!(
                    "attachment type must be a string, got {other}"
                )));
            }
        };

        Ok(match kind.as_str() {
            "region" => Self::Region(body(fields)?),
            "mesh" => Self::Mesh(body(fields)?),
            "linkedmesh" => Self::LinkedMesh(body(fields)?),
            "path" => Self::Path(body(fields)?),
            "clipping" => Self::Clipping(body(fields)?),
            "boundingbox" => Self::BoundingBox(body(fields)?),
            _ => Self::Other { kind, fields },
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub slots: IndexMap<String, Channels>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub bones: IndexMap<String, Channels>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub ik: IndexMap<String, Track>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub transform: IndexMap<String, Track>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub path: IndexMap<String, Channels>,
    /// Skin to slot to attachment to keyframes.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub deform: IndexMap<String, IndexMap<String, IndexMap<String, Track>>>,
    #[serde(
        default,
        rename = "drawOrder",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub draw_order: Vec<DrawOrderKey>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// One keyframe. Values and curve parameters are opaque.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
    #[serde(flatten)]
    pub fields: Extra,
}

impl Keyframe {
    pub fn at(time: f64) -> Self {
        Self {
            time: Some(time),
            fields: Extra::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawOrderKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offsets: Option<Vec<DrawOrderOffset>>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawOrderOffset {
    pub slot: String,
    #[serde(default)]
    pub offset: i64,
    #[serde(flatten)]
    pub extra: Extra,
}
