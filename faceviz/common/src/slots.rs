use api::{Body, BodyFrame, FaceFrameResult, FaceFrameSource, FrameDescription, SourceId};
use log::{debug, trace};

use crate::validation::{validate_face_box_and_points, ValidationFailure};

/// Fixed set of face tracking slots. Slot `i` pairs face source `i` with body `i`
/// of every body frame; the pairing is positional, not by tracking id.
pub struct SlotTable {
    sources: Vec<Option<Box<dyn FaceFrameSource>>>,
    results: Vec<Option<FaceFrameResult>>,
    bodies: Vec<Body>,
}

impl SlotTable {
    pub fn new(sources: Vec<Box<dyn FaceFrameSource>>) -> Self {
        let count = sources.len();
        Self {
            sources: sources.into_iter().map(Some).collect(),
            results: vec![None; count],
            bodies: vec![Body::default(); count],
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn source(&self, slot: usize) -> Option<&dyn FaceFrameSource> {
        self.sources.get(slot)?.as_deref()
    }

    pub fn face_result(&self, slot: usize) -> Option<&FaceFrameResult> {
        self.results.get(slot)?.as_ref()
    }

    pub fn is_tracking_id_valid(&self, slot: usize) -> bool {
        self.source(slot).is_some_and(|s| s.is_tracking_id_valid())
    }

    /// The stored result of `slot`, if the slot is bound to a live body.
    pub fn drawable(&self, slot: usize) -> Option<&FaceFrameResult> {
        if self.is_tracking_id_valid(slot) {
            self.face_result(slot)
        } else {
            None
        }
    }

    pub fn slot_of(&self, source: SourceId) -> Option<usize> {
        self.sources
            .iter()
            .position(|s| s.as_ref().is_some_and(|s| s.id() == source))
    }

    pub fn refresh_bodies(&mut self, frame: &BodyFrame) {
        frame.get_and_refresh_body_data(&mut self.bodies);
    }

    /// Binds every idle slot whose body is tracked. Slots with a valid tracking id
    /// keep their binding until the driver drops it. Returns how many slots were bound.
    pub fn associate(&mut self) -> usize {
        let mut bound = 0;
        for (i, source) in self.sources.iter_mut().enumerate() {
            let Some(source) = source.as_mut() else {
                continue;
            };
            if source.is_tracking_id_valid() {
                continue;
            }
            let body = &self.bodies[i];
            if body.is_tracked {
                debug!(
                    "Slot {}: binding {} to body {}",
                    i,
                    source.id(),
                    body.tracking_id
                );
                source.set_tracking_id(body.tracking_id);
                // anything stored belonged to the previous body
                self.results[i] = None;
                bound += 1;
            }
        }
        bound
    }

    /// Stores the latest face result of `slot`, or clears the slot if the result
    /// does not validate against `display`.
    pub fn store_face_result(
        &mut self,
        slot: usize,
        result: Option<FaceFrameResult>,
        display: FrameDescription,
    ) -> Result<(), ValidationFailure> {
        let Some(stored) = self.results.get_mut(slot) else {
            return Err(ValidationFailure::Missing);
        };
        match validate_face_box_and_points(result.as_ref(), display) {
            Ok(()) => {
                *stored = result;
                Ok(())
            }
            Err(e) => {
                *stored = None;
                Err(e)
            }
        }
    }

    /// Disposes every face source. Disposed slots report no valid tracking id.
    pub fn dispose_sources(&mut self) {
        for (i, source) in self.sources.iter_mut().enumerate() {
            if let Some(mut source) = source.take() {
                trace!("Disposing {} (slot {})", source.id(), i);
                source.dispose();
            }
        }
        self.results.iter_mut().for_each(|r| *r = None);
    }
}
