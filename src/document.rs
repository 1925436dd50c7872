use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::json;

use crate::{
    color::ColorSample,
    core::{Canvas, FrameIndex, FrameRange, Fps},
    error::{PolylotError, PolylotResult},
    sample::PathSample,
};

const LOTTIE_VERSION: &str = "5.5.2";

/// Generator/author strings written into the document's `meta` block.
#[derive(Clone, Debug)]
pub struct DocumentMeta {
    pub generator: String,
    pub author: Option<String>,
}

impl Default for DocumentMeta {
    fn default() -> Self {
        Self {
            generator: concat!("polylot ", env!("CARGO_PKG_VERSION")).to_string(),
            author: None,
        }
    }
}

/// Assembles the Lottie object graph, one group per polygon.
///
/// The builder only does structural assembly. Which keyframes exist, and in
/// what order, is the delta encoder's responsibility.
#[derive(Debug)]
pub struct DocumentBuilder {
    canvas: Canvas,
    range: FrameRange,
    fps: Fps,
    name: String,
    groups: Vec<GroupSlot>,
}

#[derive(Debug)]
struct GroupSlot {
    name: String,
    path: Option<AnimatedProperty<PathSample>>,
    fill: Option<AnimatedProperty<ColorSample>>,
}

/// Index of a group within the builder, in creation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroupHandle(usize);

/// Handle to the single path shape of one group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathHandle(usize);

/// Handle to the single fill paint of one group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FillHandle(usize);

impl DocumentBuilder {
    pub fn new(canvas: Canvas, range: FrameRange, fps: Fps, name: impl Into<String>) -> Self {
        Self {
            canvas,
            range,
            fps,
            name: name.into(),
            groups: Vec::new(),
        }
    }

    /// Append a new group. Groups serialize in creation order.
    pub fn add_group(&mut self, name: impl Into<String>) -> GroupHandle {
        self.groups.push(GroupSlot {
            name: name.into(),
            path: None,
            fill: None,
        });
        GroupHandle(self.groups.len() - 1)
    }

    /// Seed the group's path shape with its initial sample.
    pub fn add_path(
        &mut self,
        group: GroupHandle,
        initial: PathSample,
    ) -> PolylotResult<PathHandle> {
        let start = self.range.start;
        let slot = self.group_mut(group.0)?;
        if slot.path.is_some() {
            return Err(PolylotError::validation(format!(
                "group '{}' already has a path shape",
                slot.name
            )));
        }
        slot.path = Some(AnimatedProperty::new(start, initial));
        Ok(PathHandle(group.0))
    }

    /// Seed the group's fill paint with its initial sample.
    pub fn add_fill(
        &mut self,
        group: GroupHandle,
        initial: ColorSample,
    ) -> PolylotResult<FillHandle> {
        let start = self.range.start;
        let slot = self.group_mut(group.0)?;
        if slot.fill.is_some() {
            return Err(PolylotError::validation(format!(
                "group '{}' already has a fill paint",
                slot.name
            )));
        }
        slot.fill = Some(AnimatedProperty::new(start, initial));
        Ok(FillHandle(group.0))
    }

    /// Append a path keyframe. Frames must arrive in increasing order.
    pub fn push_path_key(
        &mut self,
        handle: PathHandle,
        frame: FrameIndex,
        sample: PathSample,
    ) -> PolylotResult<()> {
        let slot = self.group_mut(handle.0)?;
        let prop = slot
            .path
            .as_mut()
            .ok_or_else(|| PolylotError::validation("path handle points at an empty group"))?;
        prop.push_key(frame, sample);
        Ok(())
    }

    /// Append a fill keyframe. Frames must arrive in increasing order.
    pub fn push_fill_key(
        &mut self,
        handle: FillHandle,
        frame: FrameIndex,
        sample: ColorSample,
    ) -> PolylotResult<()> {
        let slot = self.group_mut(handle.0)?;
        let prop = slot
            .fill
            .as_mut()
            .ok_or_else(|| PolylotError::validation("fill handle points at an empty group"))?;
        prop.push_key(frame, sample);
        Ok(())
    }

    /// Assemble the final document.
    pub fn finalize(self, meta: DocumentMeta) -> PolylotResult<Document> {
        let mut groups = Vec::with_capacity(self.groups.len());
        for slot in self.groups {
            let (Some(path), Some(fill)) = (slot.path, slot.fill) else {
                return Err(PolylotError::validation(format!(
                    "group '{}' is missing its path or fill",
                    slot.name
                )));
            };
            groups.push(Group {
                ty: "gr",
                nm: slot.name,
                it: (
                    PathShape { ty: "sh", ks: path },
                    FillShape {
                        ty: "fl",
                        o: StaticScalar { a: 0, k: 100.0 },
                        c: fill,
                    },
                    TransformShape::default(),
                ),
            });
        }

        Ok(Document {
            v: LOTTIE_VERSION,
            nm: self.name.clone(),
            fr: self.fps.as_f64(),
            ip: self.range.start.0 as f64,
            op: self.range.end.0 as f64,
            w: self.canvas.width,
            h: self.canvas.height,
            ddd: 0,
            assets: Vec::new(),
            meta: Some(Meta {
                generator: meta.generator,
                author: meta.author,
            }),
            layers: vec![ShapeLayer {
                ty: 4,
                ind: 0,
                ip: self.range.start.0 as f64,
                op: self.range.end.0 as f64,
                st: 0.0,
                nm: self.name,
                ks: LayerTransform::default(),
                shapes: groups,
            }],
        })
    }

    fn group_mut(&mut self, index: usize) -> PolylotResult<&mut GroupSlot> {
        let count = self.groups.len();
        self.groups.get_mut(index).ok_or_else(|| {
            PolylotError::validation(format!(
                "group handle {index} is out of bounds ({count} groups)"
            ))
        })
    }
}

/// Finished Lottie animation, ready for serialization.
#[derive(Debug, serde::Serialize)]
pub struct Document {
    v: &'static str,
    nm: String,
    fr: f64,
    ip: f64,
    op: f64,
    w: u32,
    h: u32,
    ddd: u8,
    assets: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<Meta>,
    layers: Vec<ShapeLayer>,
}

/// Keyframe accounting across every group, initial values included.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DocumentStats {
    pub groups: usize,
    pub path_keyframes: usize,
    pub fill_keyframes: usize,
}

impl Document {
    pub fn stats(&self) -> DocumentStats {
        let mut stats = DocumentStats {
            groups: 0,
            path_keyframes: 0,
            fill_keyframes: 0,
        };
        for layer in &self.layers {
            stats.groups += layer.shapes.len();
            for group in &layer.shapes {
                stats.path_keyframes += group.it.0.ks.entry_count();
                stats.fill_keyframes += group.it.1.c.entry_count();
            }
        }
        stats
    }
}

#[derive(Debug, serde::Serialize)]
struct Meta {
    #[serde(rename = "g")]
    generator: String,
    #[serde(rename = "a", skip_serializing_if = "Option::is_none")]
    author: Option<String>,
}

#[derive(Debug, serde::Serialize)]
struct ShapeLayer {
    ty: u8,
    ind: u32,
    ip: f64,
    op: f64,
    st: f64,
    nm: String,
    ks: LayerTransform,
    shapes: Vec<Group>,
}

#[derive(Debug, serde::Serialize)]
struct Group {
    ty: &'static str,
    nm: String,
    // The wire format requires the group transform as the last item.
    it: (PathShape, FillShape, TransformShape),
}

#[derive(Debug, serde::Serialize)]
struct PathShape {
    ty: &'static str,
    ks: AnimatedProperty<PathSample>,
}

#[derive(Debug, serde::Serialize)]
struct FillShape {
    ty: &'static str,
    o: StaticScalar,
    c: AnimatedProperty<ColorSample>,
}

#[derive(Debug, serde::Serialize)]
struct TransformShape {
    ty: &'static str,
    a: StaticVec2,
    p: StaticVec2,
    s: StaticVec2,
    r: StaticScalar,
    o: StaticScalar,
}

impl Default for TransformShape {
    fn default() -> Self {
        Self {
            ty: "tr",
            a: StaticVec2::at(0.0, 0.0),
            p: StaticVec2::at(0.0, 0.0),
            s: StaticVec2::at(100.0, 100.0),
            r: StaticScalar { a: 0, k: 0.0 },
            o: StaticScalar { a: 0, k: 100.0 },
        }
    }
}

#[derive(Debug, serde::Serialize)]
struct LayerTransform {
    a: StaticVec2,
    p: StaticVec2,
    s: StaticVec2,
    r: StaticScalar,
    o: StaticScalar,
}

impl Default for LayerTransform {
    fn default() -> Self {
        Self {
            a: StaticVec2::at(0.0, 0.0),
            p: StaticVec2::at(0.0, 0.0),
            s: StaticVec2::at(100.0, 100.0),
            r: StaticScalar { a: 0, k: 0.0 },
            o: StaticScalar { a: 0, k: 100.0 },
        }
    }
}

#[derive(Debug, serde::Serialize)]
struct StaticScalar {
    a: u8,
    k: f64,
}

#[derive(Debug, serde::Serialize)]
struct StaticVec2 {
    a: u8,
    k: [f64; 2],
}

impl StaticVec2 {
    fn at(x: f64, y: f64) -> Self {
        Self { a: 0, k: [x, y] }
    }
}

/// A property that serializes static (`"a":0`) until the first delta keyframe
/// arrives, then as a keyframe list seeded with the initial value.
#[derive(Debug)]
struct AnimatedProperty<T> {
    start: FrameIndex,
    initial: T,
    keys: Vec<Keyframe<T>>,
}

#[derive(Debug)]
struct Keyframe<T> {
    frame: FrameIndex,
    value: T,
}

impl<T> AnimatedProperty<T> {
    fn new(start: FrameIndex, initial: T) -> Self {
        Self {
            start,
            initial,
            keys: Vec::new(),
        }
    }

    fn push_key(&mut self, frame: FrameIndex, value: T) {
        self.keys.push(Keyframe { frame, value });
    }

    /// Emitted entries: the initial value plus every delta keyframe.
    fn entry_count(&self) -> usize {
        1 + self.keys.len()
    }
}

/// Conversion into the wire format's value encodings.
trait LottieValue {
    /// Value for a static property's `k`.
    fn static_value(&self) -> serde_json::Value;
    /// Value for a keyframe's `s`.
    fn keyframe_value(&self) -> serde_json::Value;
}

impl LottieValue for ColorSample {
    fn static_value(&self) -> serde_json::Value {
        json!(self.0)
    }

    fn keyframe_value(&self) -> serde_json::Value {
        json!(self.0)
    }
}

impl LottieValue for PathSample {
    fn static_value(&self) -> serde_json::Value {
        bezier_json(self)
    }

    fn keyframe_value(&self) -> serde_json::Value {
        json!([bezier_json(self)])
    }
}

/// Closed polygon as a Lottie bezier: straight edges, zero tangents.
fn bezier_json(path: &PathSample) -> serde_json::Value {
    let v: Vec<[f64; 2]> = path.points().iter().map(|p| [p.x, p.y]).collect();
    let tangents = vec![[0.0, 0.0]; v.len()];
    json!({
        "c": true,
        "v": v,
        "i": tangents.clone(),
        "o": tangents,
    })
}

impl<T: LottieValue> Serialize for AnimatedProperty<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;
        if self.keys.is_empty() {
            map.serialize_entry("a", &0)?;
            map.serialize_entry("k", &self.initial.static_value())?;
        } else {
            map.serialize_entry("a", &1)?;
            let mut frames = Vec::with_capacity(1 + self.keys.len());
            frames.push(json!({
                "t": self.start.0,
                "s": self.initial.keyframe_value(),
            }));
            for key in &self.keys {
                frames.push(json!({
                    "t": key.frame.0,
                    "s": key.value.keyframe_value(),
                }));
            }
            map.serialize_entry("k", &frames)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> DocumentBuilder {
        DocumentBuilder::new(
            Canvas {
                width: 640,
                height: 360,
            },
            FrameRange::new(FrameIndex(1), FrameIndex(10)).unwrap(),
            Fps::new(24, 1).unwrap(),
            "scene",
        )
    }

    fn triangle() -> PathSample {
        PathSample::from_screen_points([(0.0, 0.0), (10.0, 0.0), (5.0, 8.0)], 2)
    }

    #[test]
    fn static_property_serializes_unanimated() {
        let mut b = builder();
        let g = b.add_group("poly 0");
        b.add_path(g, triangle()).unwrap();
        b.add_fill(g, ColorSample([1.0, 0.5, 0.0])).unwrap();
        let doc = b.finalize(DocumentMeta::default()).unwrap();

        let json = serde_json::to_value(&doc).unwrap();
        let path_ks = &json["layers"][0]["shapes"][0]["it"][0]["ks"];
        assert_eq!(path_ks["a"], 0);
        assert_eq!(path_ks["k"]["c"], true);
        assert_eq!(path_ks["k"]["v"][2][0], 5.0);

        let fill = &json["layers"][0]["shapes"][0]["it"][1];
        assert_eq!(fill["ty"], "fl");
        assert_eq!(fill["c"]["a"], 0);
        assert_eq!(fill["c"]["k"][1], 0.5);
    }

    #[test]
    fn first_delta_key_promotes_property_to_animated() {
        let mut b = builder();
        let g = b.add_group("poly 0");
        b.add_path(g, triangle()).unwrap();
        let fill = b.add_fill(g, ColorSample([1.0, 1.0, 1.0])).unwrap();
        b.push_fill_key(fill, FrameIndex(4), ColorSample([0.0, 0.0, 0.0]))
            .unwrap();
        let doc = b.finalize(DocumentMeta::default()).unwrap();

        let json = serde_json::to_value(&doc).unwrap();
        let c = &json["layers"][0]["shapes"][0]["it"][1]["c"];
        assert_eq!(c["a"], 1);
        // Initial value becomes the first keyframe, pinned at range start.
        assert_eq!(c["k"][0]["t"], 1);
        assert_eq!(c["k"][0]["s"][0], 1.0);
        assert_eq!(c["k"][1]["t"], 4);
        assert_eq!(c["k"][1]["s"][0], 0.0);
    }

    #[test]
    fn animated_path_keyframes_wrap_bezier_in_array() {
        let mut b = builder();
        let g = b.add_group("poly 0");
        let path = b.add_path(g, triangle()).unwrap();
        b.add_fill(g, ColorSample([1.0, 1.0, 1.0])).unwrap();
        b.push_path_key(
            path,
            FrameIndex(3),
            PathSample::from_screen_points([(1.0, 1.0), (11.0, 1.0), (6.0, 9.0)], 2),
        )
        .unwrap();
        let doc = b.finalize(DocumentMeta::default()).unwrap();

        let json = serde_json::to_value(&doc).unwrap();
        let ks = &json["layers"][0]["shapes"][0]["it"][0]["ks"];
        assert_eq!(ks["a"], 1);
        assert_eq!(ks["k"][1]["s"][0]["v"][0][0], 1.0);
    }

    #[test]
    fn groups_serialize_in_creation_order_with_transform_last() {
        let mut b = builder();
        for i in 0..3 {
            let g = b.add_group(format!("poly {i}"));
            b.add_path(g, triangle()).unwrap();
            b.add_fill(g, ColorSample([0.0, 0.0, 0.0])).unwrap();
        }
        let doc = b.finalize(DocumentMeta::default()).unwrap();

        let json = serde_json::to_value(&doc).unwrap();
        let shapes = json["layers"][0]["shapes"].as_array().unwrap();
        assert_eq!(shapes.len(), 3);
        assert_eq!(shapes[1]["nm"], "poly 1");
        let items = shapes[0]["it"].as_array().unwrap();
        assert_eq!(items[0]["ty"], "sh");
        assert_eq!(items[1]["ty"], "fl");
        assert_eq!(items[2]["ty"], "tr");
    }

    #[test]
    fn document_header_carries_timeline_and_canvas() {
        let mut b = builder();
        let g = b.add_group("poly 0");
        b.add_path(g, triangle()).unwrap();
        b.add_fill(g, ColorSample([0.0, 0.0, 0.0])).unwrap();
        let doc = b
            .finalize(DocumentMeta {
                generator: "polylot test".to_string(),
                author: Some("someone".to_string()),
            })
            .unwrap();

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["v"], "5.5.2");
        assert_eq!(json["fr"], 24.0);
        assert_eq!(json["ip"], 1.0);
        assert_eq!(json["op"], 10.0);
        assert_eq!(json["w"], 640);
        assert_eq!(json["h"], 360);
        assert_eq!(json["layers"][0]["ty"], 4);
        assert_eq!(json["meta"]["g"], "polylot test");
        assert_eq!(json["meta"]["a"], "someone");
    }

    #[test]
    fn stale_handles_are_rejected() {
        let mut b = builder();
        let g = b.add_group("poly 0");
        let path = b.add_path(g, triangle()).unwrap();
        assert!(b.add_path(g, triangle()).is_err());
        assert!(b.push_path_key(PathHandle(7), FrameIndex(2), triangle()).is_err());
        assert!(b.push_path_key(path, FrameIndex(2), triangle()).is_ok());
    }

    #[test]
    fn finalize_rejects_half_built_groups() {
        let mut b = builder();
        let g = b.add_group("poly 0");
        b.add_path(g, triangle()).unwrap();
        assert!(b.finalize(DocumentMeta::default()).is_err());
    }

    #[test]
    fn stats_count_initial_and_delta_entries() {
        let mut b = builder();
        let g = b.add_group("poly 0");
        b.add_path(g, triangle()).unwrap();
        let fill = b.add_fill(g, ColorSample([1.0, 1.0, 1.0])).unwrap();
        b.push_fill_key(fill, FrameIndex(2), ColorSample([0.0, 0.0, 0.0]))
            .unwrap();
        b.push_fill_key(fill, FrameIndex(3), ColorSample([1.0, 1.0, 1.0]))
            .unwrap();
        let doc = b.finalize(DocumentMeta::default()).unwrap();

        assert_eq!(
            doc.stats(),
            DocumentStats {
                groups: 1,
                path_keyframes: 1,
                fill_keyframes: 3,
            }
        );
    }
}
