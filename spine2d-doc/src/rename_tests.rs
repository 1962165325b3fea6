use crate::{Attachment, Error, RenameBoneOptions, SkeletonDocument};
use serde_json::{Value, json};

const JSON: &str = r#"
{
  "skeleton": { "spine": "3.8.99" },
  "bones": [
    { "name": "root" },
    { "name": "hip", "parent": "root" },
    { "name": "torso", "parent": "hip", "transform": "noScale" },
    { "name": "head", "parent": "torso" }
  ],
  "slots": [
    { "name": "legs", "bone": "hip", "attachment": "legs" },
    { "name": "body", "bone": "torso", "attachment": "body" },
    { "name": "clip", "bone": "root", "attachment": "clip" },
    { "name": "face", "bone": "head", "attachment": "face" }
  ],
  "ik": [ { "name": "aim", "order": 1, "bones": ["torso"], "target": "head" } ],
  "transform": [ { "name": "follow", "order": 0, "bones": ["head"], "target": "hip" } ],
  "path": [ { "name": "spine", "order": 2, "bones": ["torso"], "target": "body" } ],
  "skins": [
    {
      "name": "default",
      "bones": ["hip"],
      "ik": ["aim"],
      "transform": ["follow"],
      "path": ["spine"],
      "attachments": {
        "legs": { "legs": { "path": "legs", "width": 10, "height": 10 } },
        "body": {
          "body": {
            "type": "mesh",
            "path": "body",
            "uvs": [0, 0, 1, 0, 1, 1],
            "triangles": [0, 1, 2],
            "vertices": [1, 1, 0, 0, 1, 1, 2, 10, 0, 1, 1, 3, 10, 10, 1],
            "hull": 3
          }
        },
        "clip": {
          "clip": {
            "type": "clipping",
            "end": "face",
            "vertexCount": 3,
            "vertices": [0.5, 0, 1, 0, 1, 1]
          }
        },
        "face": {
          "face": { "width": 32, "height": 32 },
          "smile": { "type": "linkedmesh", "parent": "head", "skin": "default" }
        }
      }
    }
  ],
  "animations": {
    "walk": {
      "bones": {
        "hip": { "rotate": [ { "time": 0, "angle": 0 }, { "time": 1, "angle": 10 } ] },
        "root": { "translate": [ { "time": 0.5, "x": 4, "y": 0 } ] }
      },
      "slots": {
        "face": { "attachment": [ { "time": 0.5, "name": "face" }, { "time": 0.75, "name": null } ] }
      },
      "deform": {
        "default": { "body": { "body": [ { "time": 0, "vertices": [0, 1] } ] } }
      },
      "drawOrder": [ { "time": 0.2, "offsets": [ { "slot": "face", "offset": -1 } ] } ],
      "ik": { "aim": [ { "time": 0, "mix": 1 } ] },
      "transform": { "follow": [ { "time": 0 } ] },
      "path": { "spine": { "position": [ { "time": 0, "position": 1 } ] } }
    }
  }
}
"#;

fn doc() -> SkeletonDocument {
    SkeletonDocument::from_json_str(JSON).unwrap()
}

fn prefixed(prefix: &'static str) -> impl Fn(&str) -> String {
    move |name: &str| format!("{prefix}{name}")
}

fn only(from: &'static str, to: &'static str) -> impl Fn(&str) -> String {
    move |name: &str| {
        if name == from {
            to.to_string()
        } else {
            name.to_string()
        }
    }
}

fn wire_json(doc: &SkeletonDocument) -> Value {
    serde_json::to_value(doc.to_wire().unwrap()).unwrap()
}

#[test]
fn renaming_hip_to_pelvis_updates_slot_and_parent() {
    let json = r#"
    {
      "bones": [ { "name": "root" }, { "name": "hip", "parent": "root" } ],
      "slots": [ { "name": "s1", "bone": "hip" } ]
    }"#;
    let mut doc = SkeletonDocument::from_json_str(json).unwrap();
    doc.rename_bones(only("hip", "pelvis"), RenameBoneOptions::default())
        .unwrap();

    assert_eq!(doc.slots[0].bone, "pelvis");
    let wire = doc.to_wire().unwrap();
    let names: Vec<&str> = wire.bones.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["root", "pelvis"]);
    assert_eq!(wire.bones[1].parent.as_deref(), Some("root"));
}

#[test]
fn rename_bones_rewrites_every_reference() {
    let mut doc = doc();
    doc.rename_bones(prefixed("b_"), RenameBoneOptions::default())
        .unwrap();

    assert_eq!(doc.root_name(), "root");
    let hip = doc.bones().get("b_hip").unwrap();
    assert_eq!(hip.parent.as_deref(), Some("root"));
    assert_eq!(
        doc.bones().get("b_head").unwrap().parent.as_deref(),
        Some("b_torso")
    );

    let slot_bones: Vec<&str> = doc.slots.iter().map(|s| s.bone.as_str()).collect();
    assert_eq!(slot_bones, ["b_hip", "b_torso", "root", "b_head"]);

    assert_eq!(doc.ik[0].bones, ["b_torso"]);
    assert_eq!(doc.ik[0].target, "b_head");
    assert_eq!(doc.transform[0].bones, ["b_head"]);
    assert_eq!(doc.transform[0].target, "b_hip");
    assert_eq!(doc.path[0].bones, ["b_torso"]);
    // Path constraint targets are slots.
    assert_eq!(doc.path[0].target, "body");

    let skin = doc.default_skin().unwrap();
    assert_eq!(skin.bones, ["b_hip"]);
    let mesh = skin.attachment("body", "body").unwrap();
    let names: Vec<&str> = mesh.vertices().unwrap().bone_names().collect();
    assert_eq!(names, ["b_hip", "b_torso", "b_head"]);
    let Some(Attachment::LinkedMesh(smile)) = skin.attachment("face", "smile") else {
        panic!("expected a linked mesh");
    };
    assert_eq!(smile.parent, "b_head");

    let walk = &doc.animations["walk"];
    let tracks: Vec<&str> = walk.bones.keys().map(String::as_str).collect();
    assert_eq!(tracks, ["b_hip", "root"]);

    // Indices survive the rename.
    let wire = wire_json(&doc);
    assert_eq!(
        wire["skins"][0]["attachments"]["body"]["body"]["vertices"],
        json!([1, 1, 0, 0, 1, 1, 2, 10, 0, 1, 1, 3, 10, 10, 1])
    );
}

#[test]
fn rename_bones_can_include_root() {
    let mut doc = doc();
    doc.rename_bones(prefixed("b_"), RenameBoneOptions { ignore_root: false })
        .unwrap();

    assert_eq!(doc.root_name(), "b_root");
    assert!(doc.bones().get("root").is_none());
    assert_eq!(doc.slots[2].bone, "b_root");

    let wire = doc.to_wire().unwrap();
    assert_eq!(wire.bones[0].name, "b_root");
    assert_eq!(wire.bones.len(), 4);
}

#[test]
fn rename_bones_keeps_inheritance_tagged_bones() {
    let mut doc = doc();
    doc.rename_bones(only("torso", "chest"), RenameBoneOptions::default())
        .unwrap();
    let chest = doc.bones().get("chest").unwrap();
    assert!(chest.transform.is_some());
}

#[test]
fn colliding_bone_rename_fails_without_changes() {
    let mut doc = doc();
    let before = wire_json(&doc);

    let err = doc
        .rename_bones(only("hip", "torso"), RenameBoneOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateBone { name } if name == "torso"));
    assert_eq!(wire_json(&doc), before);
}

#[test]
fn identity_renames_change_nothing() {
    let mut doc = doc();
    let before = wire_json(&doc);

    let same = |name: &str| name.to_string();
    doc.rename_bones(same, RenameBoneOptions { ignore_root: false })
        .unwrap();
    doc.rename_slots(same);
    doc.rename_attachments(same);
    doc.rename_animations(same);
    doc.rename_ik_constraints(same);
    doc.rename_transform_constraints(same);
    doc.rename_path_constraints(same);

    assert_eq!(wire_json(&doc), before);
}

#[test]
fn rename_slots_rewrites_every_reference() {
    let mut doc = doc();
    doc.rename_slots(prefixed("s_"));

    let names: Vec<&str> = doc.slots.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["s_legs", "s_body", "s_clip", "s_face"]);
    assert_eq!(doc.path[0].target, "s_body");

    let skin = doc.default_skin().unwrap();
    let keys: Vec<&str> = skin.attachments.keys().map(String::as_str).collect();
    assert_eq!(keys, ["s_legs", "s_body", "s_clip", "s_face"]);
    let Some(Attachment::Clipping(clip)) = skin.attachment("s_clip", "clip") else {
        panic!("expected a clipping attachment");
    };
    assert_eq!(clip.end.as_deref(), Some("s_face"));

    let walk = &doc.animations["walk"];
    assert!(walk.slots.contains_key("s_face"));
    assert!(walk.deform["default"].contains_key("s_body"));
    let offsets = walk.draw_order[0].offsets.as_ref().unwrap();
    assert_eq!(offsets[0].slot, "s_face");
    assert_eq!(offsets[0].offset, -1);

    // Attachment names are a separate class.
    assert_eq!(doc.slots[3].attachment.as_deref(), Some("face"));
}

#[test]
fn rename_attachments_rewrites_every_reference() {
    let mut doc = doc();
    doc.rename_attachments(prefixed("a_"));

    assert_eq!(doc.slots[0].attachment.as_deref(), Some("a_legs"));

    let skin = doc.default_skin().unwrap();
    let Some(Attachment::Region(legs)) = skin.attachment("legs", "a_legs") else {
        panic!("expected a region");
    };
    assert_eq!(legs.path.as_deref(), Some("a_legs"));
    let Some(Attachment::Mesh(body)) = skin.attachment("body", "a_body") else {
        panic!("expected a mesh");
    };
    assert_eq!(body.path.as_deref(), Some("a_body"));
    assert!(skin.attachment("face", "a_smile").is_some());

    let walk = &doc.animations["walk"];
    let keys = &walk.slots["face"]["attachment"];
    assert_eq!(keys[0].fields["name"], json!("a_face"));
    assert_eq!(keys[1].fields["name"], Value::Null);
    assert!(walk.deform["default"]["body"].contains_key("a_body"));
}

#[test]
fn rename_animations_rekeys_in_order() {
    let mut doc = doc();
    doc.animations
        .insert("idle".to_string(), doc.animations["walk"].clone());
    doc.rename_animations(prefixed("anim_"));

    let names: Vec<&str> = doc.animations.keys().map(String::as_str).collect();
    assert_eq!(names, ["anim_walk", "anim_idle"]);
}

#[test]
fn colliding_animation_rename_keeps_the_last_writer() {
    let mut doc = doc();
    let mut idle = doc.animations["walk"].clone();
    idle.bones.clear();
    doc.animations.insert("idle".to_string(), idle);

    doc.rename_animations(|_| "anim".to_string());
    assert_eq!(doc.animations.len(), 1);
    assert!(doc.animations["anim"].bones.is_empty());
}

#[test]
fn constraint_renames_cover_skins_and_animations() {
    let mut doc = doc();
    doc.rename_ik_constraints(prefixed("ik_"));
    doc.rename_transform_constraints(prefixed("tc_"));
    doc.rename_path_constraints(prefixed("pc_"));

    assert_eq!(doc.ik[0].name, "ik_aim");
    assert_eq!(doc.transform[0].name, "tc_follow");
    assert_eq!(doc.path[0].name, "pc_spine");

    let skin = doc.default_skin().unwrap();
    assert_eq!(skin.ik, ["ik_aim"]);
    assert_eq!(skin.transform, ["tc_follow"]);
    assert_eq!(skin.path, ["pc_spine"]);

    let walk = &doc.animations["walk"];
    assert!(walk.ik.contains_key("ik_aim"));
    assert!(walk.transform.contains_key("tc_follow"));
    assert!(walk.path.contains_key("pc_spine"));
}
