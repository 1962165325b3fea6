//! Combining two skeleton documents.

use crate::{Bone, Constraint, Error, Extra, Result, SkeletonDocument};
use serde_json::Value;

/// Deep-merges `sub` into `main`: objects merge key by key, arrays concatenate and any other value
/// replaces what was there.
pub fn merge_json(main: &mut Value, sub: Value) {
    match sub {
        Value::Object(sub) => {
            if !main.is_object() {
                *main = Value::Object(Extra::new());
            }
            if let Value::Object(main) = main {
                merge_json_map(main, sub);
            }
        }
        Value::Array(items) => match main {
            Value::Array(existing) => existing.extend(items),
            other => *other = Value::Array(items),
        },
        scalar => *main = scalar,
    }
}

pub fn merge_json_map(main: &mut Extra, sub: Extra) {
    for (key, value) in sub {
        merge_json(main.entry(key).or_insert(Value::Null), value);
    }
}

fn json_error(e: serde_json::Error) -> Error {
    Error::JsonParse {
        message: e.to_string(),
    }
}

fn rebase<C: Constraint>(constraints: Vec<C>, base: i64) -> impl Iterator<Item = C> {
    constraints.into_iter().map(move |mut c| {
        c.set_order(c.order().unwrap_or(0) + base);
        c
    })
}

impl SkeletonDocument {
    /// Merges `other` into this document.
    ///
    /// - `other`'s skeleton header is dropped.
    /// - Animations and other top-level sections are deep-merged (see [`merge_json`]).
    /// - `other`'s slots are drawn first, behind this document's slots.
    /// - `other`'s bones, except its root, join this hierarchy.
    /// - Skins merge by name; attachments merge slot by slot.
    /// - `other`'s constraints run after all of this document's constraints.
    ///
    /// A bone name or a `(skin, slot, attachment)` key present in both documents is an error;
    /// rename identifiers first when the documents may overlap. Collisions are checked before
    /// anything is changed.
    pub fn merge(&mut self, other: SkeletonDocument) -> Result<()> {
        let incoming_bones: Vec<Bone> = other
            .bones
            .traverse(&other.root, None)?
            .into_iter()
            .filter(|bone| bone.name != other.root)
            .cloned()
            .collect();
        self.check_collisions(&other, &incoming_bones)?;

        let SkeletonDocument {
            skeleton: _,
            bones: _,
            slots,
            skins,
            animations,
            ik,
            transform,
            path,
            extra,
            root: _,
        } = other;

        if !animations.is_empty() {
            let mut merged = serde_json::to_value(&self.animations).map_err(json_error)?;
            merge_json(
                &mut merged,
                serde_json::to_value(animations).map_err(json_error)?,
            );
            self.animations = serde_json::from_value(merged).map_err(json_error)?;
        }
        merge_json_map(&mut self.extra, extra);

        self.slots.splice(0..0, slots);

        log::debug!("merging {} bone(s)", incoming_bones.len());
        self.bones.insert(incoming_bones)?;

        for skin in skins {
            let Some(target) = self.skin_mut(&skin.name) else {
                self.skins.push(skin);
                continue;
            };
            for (slot, attachments) in skin.attachments {
                target
                    .attachments
                    .entry(slot)
                    .or_default()
                    .extend(attachments);
            }
            target.bones.extend(skin.bones);
            target.ik.extend(skin.ik);
            target.transform.extend(skin.transform);
            target.path.extend(skin.path);
            merge_json_map(&mut target.extra, skin.extra);
        }

        let base = self.max_constraint_order().map_or(0, |max| max + 1);
        self.transform.extend(rebase(transform, base));
        self.ik.extend(rebase(ik, base));
        self.path.extend(rebase(path, base));
        Ok(())
    }

    fn check_collisions(&self, other: &SkeletonDocument, incoming_bones: &[Bone]) -> Result<()> {
        if let Some(bone) = incoming_bones.iter().find(|b| self.bones.contains(&b.name)) {
            return Err(Error::DuplicateBone {
                name: bone.name.clone(),
            });
        }
        for skin in &other.skins {
            let Some(target) = self.skin(&skin.name) else {
                continue;
            };
            for (slot, attachments) in &skin.attachments {
                let Some(existing) = target.attachments.get(slot) else {
                    continue;
                };
                if let Some(name) = attachments.keys().find(|name| existing.contains_key(*name)) {
                    return Err(Error::DuplicateAttachment {
                        skin: skin.name.clone(),
                        slot: slot.clone(),
                        attachment: name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
