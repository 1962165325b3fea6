use crate::{
    Addressing, Animation, Attachment, Bone, Constraint, Error, Extra, Hierarchy, IkConstraint,
    PathConstraint, ROOT_BONE, Result, SPINE_EXPORT_MAJOR, SPINE_EXPORT_MINOR, SkeletonHeader,
    SkeletonJson, Skin, Slot, TransformConstraint, convert_skins, is_supported_spine_version,
};
use indexmap::IndexMap;

/// Name of the skin attachments go to when no skin is named.
pub const DEFAULT_SKIN: &str = "default";

/// An editable skeleton document.
///
/// Bones live in a [`Hierarchy`] and every weighted vertex refers to its bone by name, so bones can
/// be added, removed, renamed or merged without renumbering anything. Indices are restored by
/// [`SkeletonDocument::to_wire`].
#[derive(Clone, Debug)]
pub struct SkeletonDocument {
    pub skeleton: Option<SkeletonHeader>,
    pub(crate) bones: Hierarchy<Bone>,
    /// Draw order: the first slot is drawn first, behind the rest.
    pub slots: Vec<Slot>,
    pub skins: Vec<Skin>,
    pub animations: IndexMap<String, Animation>,
    pub ik: Vec<IkConstraint>,
    pub transform: Vec<TransformConstraint>,
    pub path: Vec<PathConstraint>,
    /// Top-level sections that are carried through untouched (`events`, ...).
    pub extra: Extra,
    pub(crate) root: String,
}

impl SkeletonDocument {
    pub fn from_wire(json: SkeletonJson) -> Result<Self> {
        let SkeletonJson {
            skeleton,
            bones,
            slots,
            ik,
            transform,
            path,
            skins,
            animations,
            extra,
        } = json;

        let version = skeleton.as_ref().and_then(|s| s.spine.as_deref());
        if let Some(version) = version.filter(|v| !is_supported_spine_version(v)) {
            log::warn!(
                "skeleton was exported by Spine {version}; editing assumes \
                 {SPINE_EXPORT_MAJOR}.{SPINE_EXPORT_MINOR} data"
            );
        }

        let graph = Hierarchy::from_nodes(bones.iter().cloned())?;
        if !graph.contains(ROOT_BONE) {
            return Err(Error::MissingRoot {
                name: ROOT_BONE.to_string(),
            });
        }
        let skins = convert_skins(&skins, &bones, Addressing::ByName)?;

        log::debug!(
            "loaded skeleton: {} bones, {} slots, {} skins, {} animations",
            graph.len(),
            slots.len(),
            skins.len(),
            animations.len()
        );

        Ok(Self {
            skeleton,
            bones: graph,
            slots,
            skins,
            animations,
            ik,
            transform,
            path,
            extra,
            root: ROOT_BONE.to_string(),
        })
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        Self::from_wire(SkeletonJson::from_json_str(input)?)
    }

    /// Rebuilds the wire document.
    ///
    /// Bones are written in traversal order from the root, and vertices are re-indexed against
    /// that order. Bones not reachable from the root are dropped.
    pub fn to_wire(&self) -> Result<SkeletonJson> {
        let bones: Vec<Bone> = self
            .bones
            .traverse(&self.root, None)?
            .into_iter()
            .cloned()
            .collect();
        if bones.len() != self.bones.len() {
            log::warn!(
                "dropping {} bone(s) not reachable from '{}'",
                self.bones.len() - bones.len(),
                self.root
            );
        }
        let skins = convert_skins(&self.skins, &bones, Addressing::ByIndex)?;

        Ok(SkeletonJson {
            skeleton: self.skeleton.clone(),
            bones,
            slots: self.slots.clone(),
            ik: self.ik.clone(),
            transform: self.transform.clone(),
            path: self.path.clone(),
            skins,
            animations: self.animations.clone(),
            extra: self.extra.clone(),
        })
    }

    pub fn to_json_string(&self) -> Result<String> {
        self.to_wire()?.to_json_string()
    }

    pub fn root_name(&self) -> &str {
        &self.root
    }

    pub fn bones(&self) -> &Hierarchy<Bone> {
        &self.bones
    }

    pub fn skin(&self, name: &str) -> Option<&Skin> {
        self.skins.iter().find(|s| s.name == name)
    }

    pub fn skin_mut(&mut self, name: &str) -> Option<&mut Skin> {
        self.skins.iter_mut().find(|s| s.name == name)
    }

    pub fn default_skin(&self) -> Option<&Skin> {
        self.skin(DEFAULT_SKIN)
    }

    /// Adds an attachment under `slot` in the named skin, replacing any attachment of the same
    /// name.
    pub fn add_attachment(
        &mut self,
        skin: &str,
        slot: &str,
        name: &str,
        attachment: Attachment,
    ) -> Result<()> {
        let target = self.skin_mut(skin).ok_or_else(|| Error::UnknownSkin {
            name: skin.to_string(),
        })?;
        target
            .attachments
            .entry(slot.to_string())
            .or_default()
            .insert(name.to_string(), attachment);
        Ok(())
    }

    /// Inserts `slot` at draw-order position `order`, clamped to the end. Order 0 is drawn first.
    pub fn add_slot(&mut self, slot: Slot, order: usize) {
        let index = order.min(self.slots.len());
        self.slots.insert(index, slot);
    }

    pub fn add_bone(&mut self, bone: Bone) -> Result<()> {
        self.bones.insert([bone])
    }

    pub fn remove_bone(&mut self, name: &str) {
        self.bones.remove([name]);
    }

    pub fn traverse_bones(&self, root: &str, max_depth: Option<usize>) -> Result<Vec<&Bone>> {
        self.bones.traverse(root, max_depth)
    }

    /// Slots bound to the given bones, grouped per bone in request order. Within a group slots
    /// keep their draw order.
    pub fn slots_for_bones<S: AsRef<str>>(&self, bones: &[S]) -> Vec<&Slot> {
        let mut by_bone = IndexMap::<&str, Vec<&Slot>>::new();
        for slot in &self.slots {
            by_bone.entry(slot.bone.as_str()).or_default().push(slot);
        }
        bones
            .iter()
            .filter_map(|bone| by_bone.get(bone.as_ref()))
            .flatten()
            .copied()
            .collect()
    }

    /// Highest execution order among the IK, transform and path constraints. A constraint without
    /// an order counts as 0.
    pub fn max_constraint_order(&self) -> Option<i64> {
        let ik = self.ik.iter().map(Constraint::order);
        let transform = self.transform.iter().map(Constraint::order);
        let path = self.path.iter().map(Constraint::order);
        ik.chain(transform)
            .chain(path)
            .map(|order| order.unwrap_or(0))
            .max()
    }
}
