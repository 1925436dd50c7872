use std::collections::BTreeMap;

use crate::{
    color::ColorSample,
    core::{FrameIndex, FrameRange},
    document::{DocumentBuilder, FillHandle, PathHandle},
    error::{PolylotError, PolylotResult},
    sample::{PathSample, ShapeSample},
};

/// Stateful timeline walker that turns per-frame samples into sparse keyframes.
///
/// Each polygon owns two independent channels, path and fill. A channel emits
/// a keyframe exactly when its quantized sample differs from the previous
/// frame's sample; long static runs collapse to the initial value alone.
#[derive(Debug)]
pub struct DeltaEncoder {
    range: FrameRange,
    next_frame: FrameIndex,
    tracks: BTreeMap<u32, PolygonTrack>,
}

#[derive(Debug)]
struct PolygonTrack {
    path: PathHandle,
    fill: FillHandle,
    last_path: PathSample,
    last_fill: ColorSample,
}

impl DeltaEncoder {
    /// Start an export over `range`. Rejects empty and inverted timelines.
    pub fn new(range: FrameRange) -> PolylotResult<Self> {
        if range.end.0 <= range.start.0 {
            return Err(PolylotError::timeline(format!(
                "export range [{}, {}) contains no frames",
                range.start.0, range.end.0
            )));
        }
        Ok(Self {
            range,
            next_frame: range.start,
            tracks: BTreeMap::new(),
        })
    }

    /// Encode one frame's samples, in mesh index order.
    ///
    /// Frames must arrive strictly consecutively from `range.start`; the first
    /// frame creates every polygon track, later frames only update them.
    pub fn encode_frame(
        &mut self,
        frame: FrameIndex,
        samples: &[ShapeSample],
        builder: &mut DocumentBuilder,
    ) -> PolylotResult<()> {
        if !self.range.contains(frame) {
            return Err(PolylotError::validation(format!(
                "frame {} is outside export range [{}, {})",
                frame.0, self.range.start.0, self.range.end.0
            )));
        }
        if frame != self.next_frame {
            return Err(PolylotError::validation(format!(
                "frames must be encoded in order: expected {}, got {}",
                self.next_frame.0, frame.0
            )));
        }

        if frame == self.range.start {
            self.begin_tracks(samples, builder)?;
        } else {
            self.advance_tracks(frame, samples, builder)?;
        }

        self.next_frame = FrameIndex(frame.0 + 1);
        Ok(())
    }

    fn begin_tracks(
        &mut self,
        samples: &[ShapeSample],
        builder: &mut DocumentBuilder,
    ) -> PolylotResult<()> {
        for sample in samples {
            if self.tracks.contains_key(&sample.index) {
                return Err(PolylotError::validation(format!(
                    "polygon index {} appears twice in the first frame",
                    sample.index
                )));
            }
            let group = builder.add_group(format!("poly {}", sample.index));
            let path = builder.add_path(group, sample.path.clone())?;
            let fill = builder.add_fill(group, sample.fill)?;
            self.tracks.insert(
                sample.index,
                PolygonTrack {
                    path,
                    fill,
                    last_path: sample.path.clone(),
                    last_fill: sample.fill,
                },
            );
        }
        Ok(())
    }

    fn advance_tracks(
        &mut self,
        frame: FrameIndex,
        samples: &[ShapeSample],
        builder: &mut DocumentBuilder,
    ) -> PolylotResult<()> {
        if samples.len() != self.tracks.len() {
            return Err(PolylotError::topology(format!(
                "frame {} has {} polygons, export started with {}",
                frame.0,
                samples.len(),
                self.tracks.len()
            )));
        }

        for sample in samples {
            let track = self.tracks.get_mut(&sample.index).ok_or_else(|| {
                PolylotError::topology(format!(
                    "polygon {} first appeared after the export start frame",
                    sample.index
                ))
            })?;

            if sample.path != track.last_path {
                builder.push_path_key(track.path, frame, sample.path.clone())?;
            }
            if sample.fill != track.last_fill {
                builder.push_fill_key(track.fill, frame, sample.fill)?;
            }

            // Comparison baseline is the previous frame, not the last emitted
            // key: a one-frame spike draws both the spike and the return.
            track.last_path = sample.path.clone();
            track.last_fill = sample.fill;
        }
        Ok(())
    }
}
