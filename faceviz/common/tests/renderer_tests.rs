mod support;

use api::{Body, Color, CommandRecorder, DetectionResult, DrawCommand, FaceProperty};
use common::anchor::{face_text_position_in_color_space, TEXT_LAYOUT_OFFSET_X, TEXT_LAYOUT_OFFSET_Y};
use common::renderer::{face_text, slot_color, FACE_NOT_TRACKED_TEXT, FACE_PALETTE};
use common::{FrameRenderer, RenderStyle, SlotTable};
use glam::{Quat, Vec2, Vec3};
use std::collections::BTreeMap;
use support::{body_frame, display, mock_sources, tracked_body, valid_face, IdentityMapper};

fn renderer() -> FrameRenderer {
    FrameRenderer::new(display(), RenderStyle::default())
}

fn bound_slots(n: usize, tracked: &[usize]) -> SlotTable {
    let (sources, _) = mock_sources(n);
    let mut slots = SlotTable::new(sources);
    let bodies = (0..n)
        .map(|i| {
            if tracked.contains(&i) {
                tracked_body(10 + i as u64, Vec3::new(1.0, 2.0, 2.5))
            } else {
                Body::default()
            }
        })
        .collect();
    slots.refresh_bodies(&body_frame(bodies));
    slots.associate();
    slots
}

#[test]
fn nothing_tracked_draws_only_the_placeholder() {
    let (sources, _) = mock_sources(6);
    let mut slots = SlotTable::new(sources);
    // stored but unbound results must not be drawn
    slots.store_face_result(3, Some(valid_face(1)), display()).unwrap();

    let mut dc = CommandRecorder::new();
    let summary = renderer().render(&slots, &IdentityMapper, &mut dc);

    assert_eq!(summary.faces_drawn, 0);
    let commands = dc.commands();
    assert_eq!(commands.len(), 3, "background, placeholder, clip: {:?}", commands);
    assert!(matches!(commands[0], DrawCommand::FillRect { color: Color::BLACK, .. }));
    match &commands[1] {
        DrawCommand::DrawText { text, origin, color, .. } => {
            assert_eq!(text, FACE_NOT_TRACKED_TEXT);
            assert_eq!(*origin, Vec2::new(10.0, 10.0));
            assert_eq!(*color, Color::WHITE);
        }
        other => panic!("expected placeholder text, got {:?}", other),
    }
    assert!(matches!(commands[2], DrawCommand::Clip { .. }));
}

#[test]
fn bound_slot_without_result_draws_nothing() {
    let slots = bound_slots(2, &[0, 1]);
    let mut dc = CommandRecorder::new();
    let summary = renderer().render(&slots, &IdentityMapper, &mut dc);
    assert_eq!(summary.faces_drawn, 0);
    assert_eq!(dc.texts().collect::<Vec<_>>(), vec![FACE_NOT_TRACKED_TEXT]);
}

#[test]
fn face_draws_box_points_and_text_in_slot_color() {
    let mut slots = bound_slots(3, &[2]);
    let mut face = valid_face(12);
    face.rotation = Some(Quat::IDENTITY);
    slots.store_face_result(2, Some(face), display()).unwrap();

    let mut dc = CommandRecorder::new();
    let summary = renderer().render(&slots, &IdentityMapper, &mut dc);
    assert_eq!(summary.faces_drawn, 1);
    assert_eq!(summary.texts_skipped, 0);

    let color = FACE_PALETTE[2];
    let commands = dc.commands();
    let boxes: Vec<_> = commands
        .iter()
        .filter(|c| matches!(c, DrawCommand::StrokeRect { .. }))
        .collect();
    assert_eq!(boxes.len(), 1);
    match boxes[0] {
        DrawCommand::StrokeRect { color: c, thickness, rect } => {
            assert_eq!(*c, color);
            assert_eq!(*thickness, 8.0);
            assert_eq!((rect.x, rect.y, rect.width, rect.height), (850.0, 350.0, 200.0, 200.0));
        }
        _ => unreachable!(),
    }

    let points = commands
        .iter()
        .filter(|cmd| matches!(cmd, DrawCommand::StrokeEllipse { color: col, radius_x, .. } if *col == color && *radius_x == 1.0))
        .count();
    assert_eq!(points, 3);

    let texts: Vec<_> = dc.texts().collect();
    assert_eq!(texts.len(), 1, "placeholder must not be drawn when a face is");
    assert_eq!(texts[0], "FaceYaw : 0\nFacePitch : 0\nFaceRoll : 0\n");
    assert!(!texts[0].contains(FACE_NOT_TRACKED_TEXT));
}

#[test]
fn text_is_skipped_when_anchor_fails_but_box_still_draws() {
    let mut slots = bound_slots(1, &[0]);
    slots.store_face_result(0, Some(valid_face(10)), display()).unwrap();
    // body lost between association and drawing: the source keeps its binding
    slots.refresh_bodies(&body_frame(vec![Body::default()]));

    let mut dc = CommandRecorder::new();
    let summary = renderer().render(&slots, &IdentityMapper, &mut dc);
    assert_eq!(summary.faces_drawn, 1);
    assert_eq!(summary.texts_skipped, 1);
    assert_eq!(dc.texts().count(), 0);
    assert!(dc
        .commands()
        .iter()
        .any(|c| matches!(c, DrawCommand::StrokeRect { .. })));
}

#[test]
fn text_is_skipped_when_head_cannot_be_projected() {
    struct BehindSensor;
    impl api::CoordinateMapper for BehindSensor {
        fn map_camera_point_to_color_space(&self, _point: api::CameraSpacePoint) -> api::ColorSpacePoint {
            Vec2::splat(f32::NEG_INFINITY)
        }
    }

    let mut slots = bound_slots(1, &[0]);
    slots.store_face_result(0, Some(valid_face(10)), display()).unwrap();

    let mut dc = CommandRecorder::new();
    let summary = renderer().render(&slots, &BehindSensor, &mut dc);
    assert_eq!(summary.faces_drawn, 1);
    assert_eq!(summary.texts_skipped, 1);
    assert_eq!(dc.texts().count(), 0);

    let frame = api::RenderedFrame {
        sequence: 1,
        width: display().width,
        height: display().height,
        status: "Running".to_string(),
        faces_drawn: summary.faces_drawn,
        commands: dc.take(),
    };
    let json = serde_json::to_string(&frame).unwrap();
    let back: api::RenderedFrame = serde_json::from_str(&json).expect("frame must stay readable");
    assert_eq!(back, frame);
}

#[test]
fn properties_are_listed_in_declared_order_and_maybe_is_kept() {
    let mut face = valid_face(1);
    let mut properties = BTreeMap::new();
    properties.insert(FaceProperty::LookingAway, DetectionResult::No);
    properties.insert(FaceProperty::Happy, DetectionResult::Maybe);
    properties.insert(FaceProperty::WearingGlasses, DetectionResult::Yes);
    properties.insert(FaceProperty::Engaged, DetectionResult::Unknown);
    face.properties = Some(properties);
    face.rotation = Some(Quat::from_rotation_y(37f32.to_radians()));

    assert_eq!(
        face_text(&face),
        "Happy : Maybe\n\
         Engaged : Unknown\n\
         WearingGlasses : Yes\n\
         LookingAway : No\n\
         FaceYaw : 35\n\
         FacePitch : 0\n\
         FaceRoll : 0\n"
    );
}

#[test]
fn palette_falls_back_to_first_color() {
    assert_eq!(slot_color(1), Color::ORANGE);
    assert_eq!(slot_color(FACE_PALETTE.len()), FACE_PALETTE[0]);
}

#[test]
fn anchor_fails_for_untracked_body() {
    let bodies = vec![Body::default()];
    assert!(face_text_position_in_color_space(&bodies, 0, &IdentityMapper).is_none());
    assert!(face_text_position_in_color_space(&bodies, 5, &IdentityMapper).is_none());
}

#[test]
fn anchor_applies_offset_to_head_joint() {
    let bodies = vec![Body::default(), tracked_body(3, Vec3::new(0.4, 0.2, 1.8))];
    let anchor = face_text_position_in_color_space(&bodies, 1, &IdentityMapper).expect("tracked");
    assert!((anchor.x - (0.4 + TEXT_LAYOUT_OFFSET_X)).abs() < 1e-6);
    assert!((anchor.y - (0.2 + TEXT_LAYOUT_OFFSET_Y)).abs() < 1e-6);
}

#[test]
fn anchor_keeps_depth_for_projection() {
    struct DepthMapper;
    impl api::CoordinateMapper for DepthMapper {
        fn map_camera_point_to_color_space(&self, point: api::CameraSpacePoint) -> api::ColorSpacePoint {
            Vec2::new(point.z, point.z)
        }
    }
    let bodies = vec![tracked_body(3, Vec3::new(0.4, 0.2, 1.8))];
    let anchor = face_text_position_in_color_space(&bodies, 0, &DepthMapper).unwrap();
    assert_eq!(anchor, Vec2::new(1.8, 1.8));
}
