use std::sync::Arc;

use api::{
    BodyFrame, DrawingContext, EventSink, FaceFrame, FrameReference, SensorDriver, SensorEvent,
};
use log::trace;

use crate::config::RenderStyle;
use crate::lifecycle::{LifecycleError, LifecycleState, SensorLifecycle};
use crate::renderer::{FrameRenderer, RenderSummary};
use crate::status::StatusProperty;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOutcome {
    pub sequence: u64,
    /// Slots bound to a body during this frame.
    pub bound: usize,
    pub summary: RenderSummary,
}

/// Single owner of all slot and body state. Every sensor notification goes
/// through [`FaceViewer::handle_event`] on one thread, in arrival order.
pub struct FaceViewer {
    lifecycle: SensorLifecycle,
    renderer: FrameRenderer,
    sequence: u64,
}

impl FaceViewer {
    pub fn new(driver: Box<dyn SensorDriver>, style: RenderStyle, status: Arc<StatusProperty>) -> Self {
        let lifecycle = SensorLifecycle::new(driver, status);
        let renderer = FrameRenderer::new(lifecycle.display(), style);
        Self {
            lifecycle,
            renderer,
            sequence: 0,
        }
    }

    pub fn open(&mut self, sink: EventSink) -> Result<(), LifecycleError> {
        self.lifecycle.open(sink)?;
        self.renderer = FrameRenderer::new(self.lifecycle.display(), *self.renderer.style());
        Ok(())
    }

    pub fn close(&mut self) {
        self.lifecycle.close();
    }

    pub fn lifecycle(&self) -> &SensorLifecycle {
        &self.lifecycle
    }

    pub fn renderer(&self) -> &FrameRenderer {
        &self.renderer
    }

    /// Applies one notification. Body frames produce a drawn frame on `dc`.
    pub fn handle_event(
        &mut self,
        event: SensorEvent,
        dc: &mut dyn DrawingContext,
    ) -> Option<FrameOutcome> {
        match event {
            SensorEvent::BodyFrameArrived(reference) => self.on_body_frame(reference, dc),
            SensorEvent::FaceFrameArrived(reference) => {
                self.on_face_frame(reference);
                None
            }
            SensorEvent::AvailabilityChanged { is_available } => {
                self.lifecycle.on_availability_changed(is_available);
                None
            }
        }
    }

    /// Refreshes the body snapshot, binds idle slots and draws the frame.
    pub fn on_body_frame(
        &mut self,
        reference: FrameReference<BodyFrame>,
        dc: &mut dyn DrawingContext,
    ) -> Option<FrameOutcome> {
        if self.lifecycle.state() != LifecycleState::Open {
            return None;
        }
        let Some(frame) = reference.acquire_frame() else {
            trace!("Body frame expired before it was acquired");
            return None;
        };

        let slots = self.lifecycle.slots_mut();
        slots.refresh_bodies(frame);
        let bound = slots.associate();

        let mapper = self.lifecycle.mapper()?;
        let summary = self.renderer.render(self.lifecycle.slots(), mapper, dc);
        self.sequence += 1;
        Some(FrameOutcome {
            sequence: self.sequence,
            bound,
            summary,
        })
    }

    /// Stores the result of a face frame in the slot of its source.
    pub fn on_face_frame(&mut self, reference: FrameReference<FaceFrame>) {
        if self.lifecycle.state() != LifecycleState::Open {
            return;
        }
        let Some(frame) = reference.acquire_frame() else {
            return;
        };
        let display = self.lifecycle.display();
        let slots = self.lifecycle.slots_mut();
        let Some(slot) = slots.slot_of(frame.source) else {
            trace!("Face frame from unknown {}", frame.source);
            return;
        };
        if let Err(e) = slots.store_face_result(slot, frame.result.clone(), display) {
            trace!("Slot {}: discarding face result: {}", slot, e);
        }
    }
}
