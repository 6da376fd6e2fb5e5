mod common;

use approx::assert_abs_diff_eq;

use refscale_core::error::ScalerError;
use refscale_core::geometry::{CanvasPoint, ScreenPoint};
use refscale_core::session::{Session, SessionEvent};
use refscale_core::tool::{CropStep, LineStep, ToolKind, ToolState};

use common::board_with_image;

fn click(session: &mut Session, x: f64, y: f64) -> SessionEvent {
    let event = session.pointer_down(ScreenPoint::new(x, y));
    session.pointer_up();
    event
}

/// Session over one 200x150 image at the canvas origin, selected.
fn session() -> Session {
    let (board, id) = board_with_image(200, 150);
    let mut session = Session::new(board);
    session.select(Some(id)).unwrap();
    session
}

fn only_id(session: &Session) -> refscale_core::reference::ImageId {
    session.board().images()[0].id()
}

// ---------------------------------------------------------------------------
// Selection and dragging
// ---------------------------------------------------------------------------

#[test]
fn test_image_tool_needs_selection() {
    let (board, _) = board_with_image(200, 150);
    let mut session = Session::new(board);
    let result = session.select_tool(ToolKind::Crop);
    assert!(matches!(result, Err(ScalerError::NoImageSelected(ToolKind::Crop))));
    assert_eq!(session.tool().kind(), ToolKind::Select);
}

#[test]
fn test_click_selects_and_drag_moves() {
    let (board, id) = board_with_image(200, 150);
    let mut session = Session::new(board);

    let event = session.pointer_down(ScreenPoint::new(50.0, 50.0));
    assert!(matches!(event, SessionEvent::Selected(Some(got)) if got == id));
    assert_eq!(session.selected(), Some(id));

    let event = session.pointer_move(ScreenPoint::new(70.0, 80.0));
    assert!(matches!(event, SessionEvent::Moved { .. }));
    session.pointer_up();
    assert_eq!(session.board().get(id).unwrap().position(), CanvasPoint::new(20.0, 30.0));

    // Motion without a held button does nothing.
    assert!(matches!(session.pointer_move(ScreenPoint::new(0.0, 0.0)), SessionEvent::Nothing));
}

#[test]
fn test_rejected_move_ends_drag() {
    let (board, id) = board_with_image(200, 150);
    let mut session = Session::new(board);
    session.pointer_down(ScreenPoint::new(50.0, 50.0));

    let event = session.pointer_move(ScreenPoint::new(f64::NAN, 80.0));
    assert!(matches!(event, SessionEvent::Rejected(ScalerError::InvalidDimensionInput(_))));
    assert_eq!(*session.tool(), ToolState::default());

    // The button is still held, but the drag is over.
    assert!(matches!(session.pointer_move(ScreenPoint::new(70.0, 80.0)), SessionEvent::Nothing));
    assert_eq!(session.board().get(id).unwrap().position(), CanvasPoint::new(0.0, 0.0));
}

#[test]
fn test_click_empty_deselects() {
    let mut session = session();
    click(&mut session, 600.0, 600.0);
    assert_eq!(session.selected(), None);
}

// ---------------------------------------------------------------------------
// Set scale
// ---------------------------------------------------------------------------

#[test]
fn test_set_scale_flow() {
    let mut session = session();
    let id = only_id(&session);
    session.select_tool(ToolKind::SetScale).unwrap();

    assert!(matches!(
        click(&mut session, 10.0, 10.0),
        SessionEvent::PointCollected { collected: 1, needed: 2 }
    ));
    match click(&mut session, 155.0, 10.0) {
        SessionEvent::LengthRequested { pixel_distance } => assert_abs_diff_eq!(pixel_distance, 145.0),
        other => panic!("unexpected event {other:?}"),
    }

    // Unreadable text keeps the dialog open.
    let event = session.submit_length("eighty");
    assert!(matches!(event, SessionEvent::Rejected(ScalerError::InvalidDimensionInput(_))));
    assert!(session.tool().awaiting_input());

    match session.submit_length("6'-8\"") {
        SessionEvent::Calibrated { id: got, factor } => {
            assert_eq!(got, id);
            assert_abs_diff_eq!(factor, 160.0 / 145.0, epsilon = 1e-9);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(session.tool().kind(), ToolKind::Select);
    assert_abs_diff_eq!(session.board().get(id).unwrap().size().width, 220.6897, epsilon = 1e-3);
}

#[test]
fn test_set_scale_short_line_restarts() {
    let mut session = session();
    let id = only_id(&session);
    session.select_tool(ToolKind::SetScale).unwrap();
    click(&mut session, 10.0, 10.0);
    click(&mut session, 12.0, 10.0);

    let event = session.submit_length("80");
    assert!(matches!(event, SessionEvent::Rejected(ScalerError::PixelDistanceTooSmall { .. })));
    assert_eq!(
        *session.tool(),
        ToolState::SetScale {
            target: id,
            step: LineStep::AwaitingFirst
        }
    );
    assert!(session.board().get(id).unwrap().calibration().is_none());
}

#[test]
fn test_cancel_dialog_leaves_image() {
    let mut session = session();
    let id = only_id(&session);
    session.select_tool(ToolKind::SetScale).unwrap();
    click(&mut session, 10.0, 10.0);
    click(&mut session, 110.0, 10.0);
    session.cancel();
    assert_eq!(session.tool().kind(), ToolKind::Select);
    assert_abs_diff_eq!(session.board().get(id).unwrap().size().width, 200.0);
}

// ---------------------------------------------------------------------------
// Measure
// ---------------------------------------------------------------------------

#[test]
fn test_measure_reports_real_length() {
    let mut session = session();
    session.select_tool(ToolKind::Measure).unwrap();
    click(&mut session, 0.0, 0.0);
    match click(&mut session, 96.0, 0.0) {
        SessionEvent::Measured {
            real_inches, label, ..
        } => {
            assert_abs_diff_eq!(real_inches, 48.0, epsilon = 1e-9);
            assert_eq!(label, "4'-0\"");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Crop
// ---------------------------------------------------------------------------

#[test]
fn test_crop_flow() {
    let mut session = session();
    let id = only_id(&session);
    session.select_tool(ToolKind::Crop).unwrap();
    click(&mut session, 20.0, 20.0);
    assert!(matches!(
        click(&mut session, 120.0, 80.0),
        SessionEvent::CropConfirmationRequested
    ));
    match session.confirm_crop() {
        SessionEvent::Cropped { rect, .. } => assert_eq!((rect.width, rect.height), (100, 60)),
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(session.board().get(id).unwrap().pixels().dimensions(), (100, 60));
}

#[test]
fn test_crop_too_small_keeps_tool_active() {
    let mut session = session();
    let id = only_id(&session);
    session.select_tool(ToolKind::Crop).unwrap();
    click(&mut session, 20.0, 20.0);
    click(&mut session, 25.0, 80.0);
    let event = session.confirm_crop();
    assert!(matches!(event, SessionEvent::Rejected(ScalerError::CropTooSmall { .. })));
    assert_eq!(
        *session.tool(),
        ToolState::Crop {
            target: id,
            step: CropStep::AwaitingFirst
        }
    );
    assert_eq!(session.board().get(id).unwrap().pixels().dimensions(), (200, 150));
}

// ---------------------------------------------------------------------------
// Perspective fix
// ---------------------------------------------------------------------------

#[test]
fn test_perspective_flow() {
    let mut session = session();
    let id = only_id(&session);
    session.select_tool(ToolKind::PerspectiveFix).unwrap();
    click(&mut session, 10.0, 10.0);
    click(&mut session, 190.0, 5.0);
    click(&mut session, 195.0, 140.0);
    let event = click(&mut session, 5.0, 145.0);
    assert!(matches!(event, SessionEvent::Rectified { id: got } if got == id));
    assert_eq!(session.tool().kind(), ToolKind::Select);
    assert_ne!(session.board().get(id).unwrap().pixels().dimensions(), (200, 150));
}

#[test]
fn test_perspective_collinear_resets_corners() {
    let mut session = session();
    let id = only_id(&session);
    session.select_tool(ToolKind::PerspectiveFix).unwrap();
    click(&mut session, 10.0, 10.0);
    click(&mut session, 50.0, 50.0);
    click(&mut session, 90.0, 90.0);
    let event = click(&mut session, 10.0, 140.0);
    assert!(matches!(event, SessionEvent::Rejected(ScalerError::SingularSystem)));
    assert_eq!(
        *session.tool(),
        ToolState::PerspectiveFix {
            target: id,
            corners: Vec::new()
        }
    );
    assert_eq!(session.board().get(id).unwrap().pixels().dimensions(), (200, 150));
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

#[test]
fn test_pan_then_hit_test_in_canvas_space() {
    let (board, id) = board_with_image(200, 150);
    let mut session = Session::new(board);
    session.select_tool(ToolKind::Pan).unwrap();
    session.pointer_down(ScreenPoint::new(0.0, 0.0));
    assert!(matches!(session.pointer_move(ScreenPoint::new(300.0, 0.0)), SessionEvent::Panned));
    session.pointer_up();
    assert_abs_diff_eq!(session.viewport().pan_x, 300.0);

    session.select_tool(ToolKind::Select).unwrap();
    // Screen 50 is now canvas -250: off the image.
    click(&mut session, 50.0, 50.0);
    assert_eq!(session.selected(), None);
    click(&mut session, 350.0, 50.0);
    assert_eq!(session.selected(), Some(id));
}

#[test]
fn test_zoomed_set_scale_measures_canvas_pixels() {
    let mut session = session();
    session.viewport_mut().zoom = 2.0;
    session.select_tool(ToolKind::SetScale).unwrap();
    click(&mut session, 20.0, 20.0);
    match click(&mut session, 220.0, 20.0) {
        SessionEvent::LengthRequested { pixel_distance } => assert_abs_diff_eq!(pixel_distance, 100.0),
        other => panic!("unexpected event {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Image lifecycle
// ---------------------------------------------------------------------------

#[test]
fn test_remove_selected_image_resets_tool() {
    let mut session = session();
    let id = only_id(&session);
    session.select_tool(ToolKind::Crop).unwrap();
    session.remove_image(id).unwrap();
    assert_eq!(session.selected(), None);
    assert_eq!(session.tool().kind(), ToolKind::Select);
    assert!(session.board().is_empty());
}
