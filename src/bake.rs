//! Fixed-rate animation baking
//!
//! Layered, curve-based animation is collapsed into per-node, per-component
//! sample arrays by evaluating the provider's local transform at a uniform
//! period across each take's span. Rotation samples are folded with the
//! node's pre/post rotation and re-expressed as XYZ euler angles, so a
//! consumer can replay them without knowing the authored rotation order.

use crate::errors::warn;
use crate::provider::{SceneProvider, TransformProperty};
use crate::rotation;
use crate::traverse::SceneIndex;

/// Which scalar transform component a channel animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelTarget {
    TranslateX,
    TranslateY,
    TranslateZ,
    RotateX,
    RotateY,
    RotateZ,
    ScaleX,
    ScaleY,
    ScaleZ,
}

impl ChannelTarget {
    const TRANSLATE: [Self; 3] = [Self::TranslateX, Self::TranslateY, Self::TranslateZ];
    const ROTATE: [Self; 3] = [Self::RotateX, Self::RotateY, Self::RotateZ];
    const SCALE: [Self; 3] = [Self::ScaleX, Self::ScaleY, Self::ScaleZ];
}

/// One baked scalar track: `samples[f]` is the value at frame `f`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationChannel {
    /// Flat node index the track drives.
    pub node: u32,
    pub target: ChannelTarget,
    pub samples: Vec<f64>,
}

/// One take, baked at a fixed rate. Channels exist only for properties the
/// provider reports as animated within this take.
#[derive(Debug, Clone, PartialEq)]
pub struct Take {
    pub name: String,
    pub sample_rate: f64,
    pub frame_count: u32,
    pub channels: Vec<AnimationChannel>,
}

/// Bakes every take in the scene at `sample_rate` frames per second.
///
/// Takes with an inverted span or an empty frame window are skipped with a
/// warning rather than failing the call.
pub(crate) fn bake_takes<P: SceneProvider>(
    provider: &mut P,
    index: &SceneIndex,
    sample_rate: f64,
    warnings: &mut Vec<String>,
) -> Vec<Take> {
    let period = 1.0 / sample_rate;
    let mut takes = Vec::with_capacity(provider.take_count());

    for take in 0..provider.take_count() {
        let name = provider.take_name(take);
        let (start, stop) = provider
            .take_local_span(take)
            .unwrap_or_else(|| provider.default_span());

        if stop < start {
            warn(
                warnings,
                format!("Take '{name}' has an inverted time span and was skipped"),
            );
            continue;
        }

        let frame_count = ((stop - start) * sample_rate).ceil() as u32;
        if frame_count == 0 {
            warn(warnings, format!("Take '{name}' spans no frames and was skipped"));
            continue;
        }

        provider.select_take(take, period);

        let mut channels = Vec::new();
        for (flat, &node) in index.order.iter().enumerate() {
            let flat = flat as u32;

            if provider.property_animated(node, TransformProperty::Translation) {
                let mut tracks = component_tracks(ChannelTarget::TRANSLATE, flat, frame_count);
                for frame in 0..frame_count {
                    let time = start + f64::from(frame) * period;
                    let value = provider.evaluate_local(node, TransformProperty::Translation, time);
                    tracks[0].samples.push(value.x);
                    tracks[1].samples.push(value.y);
                    tracks[2].samples.push(value.z);
                }
                channels.extend(tracks);
            }

            if provider.property_animated(node, TransformProperty::Rotation) {
                let order = provider.rotation_order(node);
                let pre = rotation::matrix_from_euler(order, provider.pre_rotation(node));
                let post = rotation::matrix_from_euler(order, provider.post_rotation(node));
                let mut tracks = component_tracks(ChannelTarget::ROTATE, flat, frame_count);
                for frame in 0..frame_count {
                    let time = start + f64::from(frame) * period;
                    let sampled = provider.evaluate_local(node, TransformProperty::Rotation, time);
                    let folded = rotation::compose(&pre, order, sampled, &post);
                    tracks[0].samples.push(folded.x);
                    tracks[1].samples.push(folded.y);
                    tracks[2].samples.push(folded.z);
                }
                channels.extend(tracks);
            }

            if provider.property_animated(node, TransformProperty::Scaling) {
                let mut tracks = component_tracks(ChannelTarget::SCALE, flat, frame_count);
                for frame in 0..frame_count {
                    let time = start + f64::from(frame) * period;
                    let value = provider.evaluate_local(node, TransformProperty::Scaling, time);
                    tracks[0].samples.push(value.x);
                    tracks[1].samples.push(value.y);
                    tracks[2].samples.push(value.z);
                }
                channels.extend(tracks);
            }
        }

        takes.push(Take {
            name,
            sample_rate,
            frame_count,
            channels,
        });
    }

    takes
}

fn component_tracks(targets: [ChannelTarget; 3], node: u32, frames: u32) -> Vec<AnimationChannel> {
    targets
        .into_iter()
        .map(|target| AnimationChannel {
            node,
            target,
            samples: Vec::with_capacity(frames as usize),
        })
        .collect()
}
