//! Bone addressing for attachment vertex arrays.
//!
//! Weighted vertices are stored by Spine as repeating groups of
//! `[pointCount, (bone, x, y, weight) × pointCount]` where `bone` is an index into the skeleton's
//! bone array. While a document is being edited the index is replaced by the bone name, so bone
//! reordering, merging and renaming cannot invalidate it. The codec converts between the two forms.

use crate::{Error, HierarchyNode, Result, Skin};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::collections::HashMap;

/// Length of the unweighted four-point shorthand, which can look like a weighted group.
pub const UNWEIGHTED_QUAD_LEN: usize = 8;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VertexValue {
    Number(Number),
    Bone(String),
}

impl VertexValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            Self::Bone(_) => None,
        }
    }

    pub fn as_bone(&self) -> Option<&str> {
        match self {
            Self::Bone(name) => Some(name),
            Self::Number(_) => None,
        }
    }

    fn is_integer(&self) -> bool {
        match self {
            Self::Number(n) => {
                n.is_u64()
                    || n.is_i64()
                    || n.as_f64().is_some_and(|v| v.is_finite() && v.fract() == 0.0)
            }
            Self::Bone(_) => false,
        }
    }

    fn as_index(&self) -> Option<u64> {
        let Self::Number(n) = self else {
            return None;
        };
        if let Some(v) = n.as_u64() {
            return Some(v);
        }
        let v = n.as_f64()?;
        (v.is_finite() && v.fract() == 0.0 && v >= 0.0).then_some(v as u64)
    }
}

/// Fails for NaN and infinities, which JSON cannot represent.
impl TryFrom<f64> for VertexValue {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Number::from_f64(value)
            .map(Self::Number)
            .ok_or_else(|| Error::InvalidVertexData {
                message: format!("non-finite coordinate {value}"),
            })
    }
}

impl From<u64> for VertexValue {
    fn from(value: u64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<&str> for VertexValue {
    fn from(value: &str) -> Self {
        Self::Bone(value.to_string())
    }
}

/// A vertex array plus whether it uses the weighted group layout.
///
/// The layout is decided once, when the array is parsed, and carried from then on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<VertexValue>", into = "Vec<VertexValue>")]
pub struct Vertices {
    weighted: bool,
    values: Vec<VertexValue>,
}

impl Vertices {
    /// Wraps a raw array, detecting the weighted layout from its shape.
    ///
    /// An array is weighted when it already carries bone names, or when its first two numbers are
    /// integers and it is not the eight-number quad shorthand.
    pub fn parse(values: Vec<VertexValue>) -> Self {
        let weighted = if values.iter().any(|v| v.as_bone().is_some()) {
            true
        } else {
            values.len() != UNWEIGHTED_QUAD_LEN
                && values.len() >= 2
                && values[0].is_integer()
                && values[1].is_integer()
        };
        Self { weighted, values }
    }

    pub fn weighted(values: Vec<VertexValue>) -> Self {
        Self {
            weighted: true,
            values,
        }
    }

    pub fn unweighted(values: Vec<VertexValue>) -> Self {
        Self {
            weighted: false,
            values,
        }
    }

    pub fn is_weighted(&self) -> bool {
        self.weighted
    }

    pub fn values(&self) -> &[VertexValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bone names referenced by a name-addressed array.
    pub fn bone_names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().filter_map(VertexValue::as_bone)
    }

    pub(crate) fn rename_bones(&mut self, rename: &dyn Fn(&str) -> String) {
        for value in &mut self.values {
            if let VertexValue::Bone(name) = value {
                *name = rename(name);
            }
        }
    }
}

impl From<Vec<VertexValue>> for Vertices {
    fn from(values: Vec<VertexValue>) -> Self {
        Self::parse(values)
    }
}

impl From<Vertices> for Vec<VertexValue> {
    fn from(vertices: Vertices) -> Self {
        vertices.values
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Addressing {
    /// Bone references are names.
    ByName,
    /// Bone references are positions in the bone array.
    ByIndex,
}

fn invalid(message: String) -> Error {
    Error::InvalidVertexData { message }
}

/// Replaces the bone indices of a weighted array with bone names, resolved by position in `bones`.
///
/// Unweighted arrays are returned unchanged. Bone names already present are kept.
pub fn to_name_addressed<B: HierarchyNode>(vertices: &Vertices, bones: &[B]) -> Result<Vertices> {
    if !vertices.weighted {
        return Ok(vertices.clone());
    }

    let values = &vertices.values;
    let mut out = Vec::with_capacity(values.len());
    let mut i = 0usize;
    while i < values.len() {
        let count = values[i]
            .as_index()
            .ok_or_else(|| invalid(format!("expected a point count at position {i}")))?;
        out.push(values[i].clone());

        for j in 0..count as usize {
            let base = i + j * 4;
            let group = values.get(base + 1..base + 5).ok_or_else(|| {
                invalid(format!(
                    "group at position {i} declares {count} points but the array ends early"
                ))
            })?;
            let bone = match &group[0] {
                VertexValue::Bone(name) => VertexValue::Bone(name.clone()),
                index @ VertexValue::Number(_) => {
                    let index = index.as_index().ok_or_else(|| {
                        invalid(format!("bone index at position {} is not an integer", base + 1))
                    })?;
                    let bone = usize::try_from(index)
                        .ok()
                        .and_then(|index| bones.get(index))
                        .ok_or(Error::BoneIndexOutOfRange {
                            index,
                            bone_count: bones.len(),
                        })?;
                    VertexValue::Bone(bone.name().to_string())
                }
            };
            out.push(bone);
            out.extend_from_slice(&group[1..]);
        }

        i = out.len();
    }

    Ok(Vertices {
        weighted: true,
        values: out,
    })
}

/// Replaces every bone name with the position of the first bone of that name in `bones`.
///
/// This is a flat substitution: names only ever occupy the bone slots written by
/// [`to_name_addressed`], so no group walk is needed.
pub fn to_index_addressed<B: HierarchyNode>(vertices: &Vertices, bones: &[B]) -> Result<Vertices> {
    if vertices.values.iter().all(|v| v.as_bone().is_none()) {
        return Ok(vertices.clone());
    }

    let mut index = HashMap::<&str, usize>::with_capacity(bones.len());
    for (i, bone) in bones.iter().enumerate() {
        index.entry(bone.name()).or_insert(i);
    }

    let values = vertices
        .values
        .iter()
        .map(|value| match value {
            VertexValue::Bone(name) => index
                .get(name.as_str())
                .map(|&i| VertexValue::Number(Number::from(i)))
                .ok_or_else(|| Error::UnknownVertexBone { name: name.clone() }),
            number => Ok(number.clone()),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Vertices {
        weighted: vertices.weighted,
        values,
    })
}

/// Copies `skins`, converting every attachment vertex array to the requested addressing.
pub fn convert_skins<B: HierarchyNode>(
    skins: &[Skin],
    bones: &[B],
    addressing: Addressing,
) -> Result<Vec<Skin>> {
    let mut out = skins.to_vec();
    for skin in &mut out {
        for attachments in skin.attachments.values_mut() {
            for attachment in attachments.values_mut() {
                let Some(vertices) = attachment.vertices_mut() else {
                    continue;
                };
                *vertices = match addressing {
                    Addressing::ByName => to_name_addressed(vertices, bones)?,
                    Addressing::ByIndex => to_index_addressed(vertices, bones)?,
                };
            }
        }
    }
    Ok(out)
}
