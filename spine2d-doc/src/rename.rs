//! Identifier renaming across every structure of a document.
//!
//! Each operation applies a pure `old -> new` function to one identifier class. Map keys that
//! collide after renaming overwrite each other; bone renames are the exception because the bone
//! hierarchy rejects duplicate names.

use crate::{Attachment, Bone, Hierarchy, Result, SkeletonDocument};
use indexmap::IndexMap;
use serde_json::Value;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RenameBoneOptions {
    /// Leave the root bone's name alone.
    pub ignore_root: bool,
}

impl Default for RenameBoneOptions {
    fn default() -> Self {
        Self { ignore_root: true }
    }
}

fn rekey<V>(map: &mut IndexMap<String, V>, rename: &dyn Fn(&str) -> String) {
    let old = std::mem::take(map);
    for (key, value) in old {
        map.insert(rename(&key), value);
    }
}

fn rename_in_place(name: &mut String, rename: &dyn Fn(&str) -> String) {
    *name = rename(name);
}

fn rename_all(names: &mut [String], rename: &dyn Fn(&str) -> String) {
    for name in names {
        rename_in_place(name, rename);
    }
}

impl SkeletonDocument {
    /// Renames bones everywhere they are referenced: the hierarchy, slots, constraints, skin bone
    /// lists, animation bone tracks, weighted vertices and linked mesh parents.
    ///
    /// The renamed hierarchy is validated before anything is changed, so a rename that produces a
    /// duplicate name or a cycle fails and leaves the document untouched.
    pub fn rename_bones(
        &mut self,
        rename: impl Fn(&str) -> String,
        options: RenameBoneOptions,
    ) -> Result<()> {
        let root = self.root.clone();
        let rename = |name: &str| {
            if options.ignore_root && name == root {
                name.to_string()
            } else {
                rename(name)
            }
        };
        let rename: &dyn Fn(&str) -> String = &rename;

        let mut bones = Vec::with_capacity(self.bones.len());
        for bone in self.bones.iter() {
            if let Some(inherit) = bone.transform {
                log::warn!(
                    "bone '{}' uses inheritance mode {inherit:?}; renaming it may change what it inherits",
                    bone.name
                );
            }
            bones.push(Bone {
                name: rename(&bone.name),
                parent: bone.parent.as_deref().map(rename),
                ..bone.clone()
            });
        }
        self.bones = Hierarchy::from_nodes(bones)?;
        self.root = rename(&root);

        for slot in &mut self.slots {
            rename_in_place(&mut slot.bone, rename);
        }
        for ik in &mut self.ik {
            rename_all(&mut ik.bones, rename);
            rename_in_place(&mut ik.target, rename);
        }
        for transform in &mut self.transform {
            rename_all(&mut transform.bones, rename);
            rename_in_place(&mut transform.target, rename);
        }
        for path in &mut self.path {
            rename_all(&mut path.bones, rename);
        }
        for animation in self.animations.values_mut() {
            rekey(&mut animation.bones, rename);
        }
        for skin in &mut self.skins {
            rename_all(&mut skin.bones, rename);
            for attachment in skin.attachments.values_mut().flat_map(|a| a.values_mut()) {
                if let Some(vertices) = attachment.vertices_mut() {
                    vertices.rename_bones(rename);
                }
                if let Attachment::LinkedMesh(linked) = attachment {
                    rename_in_place(&mut linked.parent, rename);
                }
            }
        }
        Ok(())
    }

    /// Renames slots in the slot list, skins, path constraint targets, clipping end slots and
    /// animation slot, deform and draw order tracks.
    pub fn rename_slots(&mut self, rename: impl Fn(&str) -> String) {
        let rename: &dyn Fn(&str) -> String = &rename;

        for path in &mut self.path {
            rename_in_place(&mut path.target, rename);
        }
        for slot in &mut self.slots {
            rename_in_place(&mut slot.name, rename);
        }
        for skin in &mut self.skins {
            rekey(&mut skin.attachments, rename);
            for attachment in skin.attachments.values_mut().flat_map(|a| a.values_mut()) {
                if let Attachment::Clipping(clipping) = attachment {
                    if let Some(end) = clipping.end.as_mut() {
                        rename_in_place(end, rename);
                    }
                }
            }
        }
        for animation in self.animations.values_mut() {
            rekey(&mut animation.slots, rename);
            for slots in animation.deform.values_mut() {
                rekey(slots, rename);
            }
            for key in &mut animation.draw_order {
                for offset in key.offsets.iter_mut().flatten() {
                    rename_in_place(&mut offset.slot, rename);
                }
            }
        }
    }

    /// Renames attachments in slot setup poses, skins, attachment image paths and animation
    /// attachment and deform tracks.
    pub fn rename_attachments(&mut self, rename: impl Fn(&str) -> String) {
        let rename: &dyn Fn(&str) -> String = &rename;

        for slot in &mut self.slots {
            if let Some(attachment) = slot.attachment.as_mut() {
                rename_in_place(attachment, rename);
            }
        }
        for skin in &mut self.skins {
            for attachments in skin.attachments.values_mut() {
                rekey(attachments, rename);
                for attachment in attachments.values_mut() {
                    if let Some(path) = attachment.path_mut() {
                        rename_in_place(path, rename);
                    }
                }
            }
        }
        for animation in self.animations.values_mut() {
            for channels in animation.slots.values_mut() {
                let Some(keys) = channels.get_mut("attachment") else {
                    continue;
                };
                for key in keys {
                    if let Some(Value::String(name)) = key.fields.get_mut("name") {
                        rename_in_place(name, rename);
                    }
                }
            }
            for attachments in animation.deform.values_mut().flat_map(|s| s.values_mut()) {
                rekey(attachments, rename);
            }
        }
    }

    pub fn rename_animations(&mut self, rename: impl Fn(&str) -> String) {
        rekey(&mut self.animations, &rename);
    }

    pub fn rename_transform_constraints(&mut self, rename: impl Fn(&str) -> String) {
        let rename: &dyn Fn(&str) -> String = &rename;
        for transform in &mut self.transform {
            rename_in_place(&mut transform.name, rename);
        }
        for skin in &mut self.skins {
            rename_all(&mut skin.transform, rename);
        }
        for animation in self.animations.values_mut() {
            rekey(&mut animation.transform, rename);
        }
    }

    pub fn rename_ik_constraints(&mut self, rename: impl Fn(&str) -> String) {
        let rename: &dyn Fn(&str) -> String = &rename;
        for ik in &mut self.ik {
            rename_in_place(&mut ik.name, rename);
        }
        for skin in &mut self.skins {
            rename_all(&mut skin.ik, rename);
        }
        for animation in self.animations.values_mut() {
            rekey(&mut animation.ik, rename);
        }
    }

    pub fn rename_path_constraints(&mut self, rename: impl Fn(&str) -> String) {
        let rename: &dyn Fn(&str) -> String = &rename;
        for path in &mut self.path {
            rename_in_place(&mut path.name, rename);
        }
        for skin in &mut self.skins {
            rename_all(&mut skin.path, rename);
        }
        for animation in self.animations.values_mut() {
            rekey(&mut animation.path, rename);
        }
    }
}
