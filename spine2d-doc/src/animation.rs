use crate::{Animation, DrawOrderKey, Error, Keyframe, Result, SkeletonDocument};
use indexmap::IndexMap;

/// A keyframe with a time, which defaults to 0 when absent.
trait Timed: Clone {
    fn time(&self) -> f64;
    fn set_time(&mut self, time: f64);
}

impl Timed for Keyframe {
    fn time(&self) -> f64 {
        self.time.unwrap_or(0.0)
    }

    fn set_time(&mut self, time: f64) {
        self.time = Some(time);
    }
}

impl Timed for DrawOrderKey {
    fn time(&self) -> f64 {
        self.time.unwrap_or(0.0)
    }

    fn set_time(&mut self, time: f64) {
        self.time = Some(time);
    }
}

fn last_time<'a, K: Timed + 'a>(keys: impl IntoIterator<Item = &'a K>) -> f64 {
    keys.into_iter().map(|key| key.time()).fold(0.0, f64::max)
}

/// Appends `repeat - 1` copies of the track, copy `n` shifted by `n * duration`.
fn repeat_track<K: Timed>(keys: &mut Vec<K>, repeat: u32, duration: f64) {
    if repeat <= 1 {
        return;
    }
    let original = keys.clone();
    keys.reserve(original.len() * (repeat as usize - 1));
    for n in 1..repeat {
        let offset = f64::from(n) * duration;
        keys.extend(original.iter().map(|key| {
            let mut key = key.clone();
            key.set_time(key.time() + offset);
            key
        }));
    }
}

impl Animation {
    /// Time of the last bone, slot, deform or draw order key.
    pub fn duration(&self) -> f64 {
        let bones = self.bones.values().flat_map(IndexMap::values).flatten();
        let slots = self.slots.values().flat_map(IndexMap::values).flatten();
        let deform = self
            .deform
            .values()
            .flat_map(IndexMap::values)
            .flat_map(IndexMap::values)
            .flatten();

        last_time(bones.chain(slots).chain(deform)).max(last_time(&self.draw_order))
    }

    /// Loops every channel `repeat` times in place, keeping the original keys.
    pub fn extend(&mut self, repeat: u32) {
        let duration = self.duration();

        let channels = self
            .bones
            .values_mut()
            .chain(self.slots.values_mut())
            .chain(self.path.values_mut())
            .flat_map(IndexMap::values_mut);
        let deform = self
            .deform
            .values_mut()
            .flat_map(IndexMap::values_mut)
            .flat_map(IndexMap::values_mut);
        let constraints = self.ik.values_mut().chain(self.transform.values_mut());

        for track in channels.chain(deform).chain(constraints) {
            repeat_track(track, repeat, duration);
        }
        repeat_track(&mut self.draw_order, repeat, duration);
    }
}

impl SkeletonDocument {
    /// Length in seconds of the named animation, or `None` if there is no such animation.
    pub fn animation_duration(&self, name: &str) -> Option<f64> {
        let Some(animation) = self.animations.get(name) else {
            log::warn!("animation_duration: unknown animation '{name}'");
            return None;
        };
        Some(animation.duration())
    }

    pub fn animation_durations(&self) -> IndexMap<String, f64> {
        self.animations
            .iter()
            .map(|(name, animation)| (name.clone(), animation.duration()))
            .collect()
    }

    /// Makes the named animation play `repeat` times by duplicating the keys of every channel.
    pub fn extend_animation(&mut self, name: &str, repeat: u32) -> Result<()> {
        let animation = self
            .animations
            .get_mut(name)
            .ok_or_else(|| Error::UnknownAnimation {
                name: name.to_string(),
            })?;
        animation.extend(repeat);
        Ok(())
    }
}
