use refscale_core::error::ScalerError;
use refscale_core::geometry::{CanvasPoint, ImageFrame, LocalPoint, ScreenPoint, Size};
use refscale_core::reference::ImageId;
use refscale_core::tool::{
    CropStep, LineStep, PointerContext, ToolEffect, ToolKind, ToolState, PERSPECTIVE_CORNERS,
};

const TARGET: ImageId = ImageId(1);

fn target_frame() -> ImageFrame {
    ImageFrame {
        position: CanvasPoint::new(100.0, 100.0),
        size: Size::new(200.0, 150.0),
        native_width: 400,
        native_height: 300,
    }
}

/// Pointer at canvas `(x, y)` with zoom 1 and no pan, over the target image.
fn at(x: f64, y: f64) -> PointerContext {
    let frame = target_frame();
    let canvas = CanvasPoint::new(x, y);
    PointerContext {
        screen: ScreenPoint::new(x, y),
        canvas,
        hit: frame
            .contains_canvas(canvas)
            .then_some((TARGET, frame.position)),
        target: Some(frame),
    }
}

// ---------------------------------------------------------------------------
// Entering tools
// ---------------------------------------------------------------------------

#[test]
fn test_enter_image_tools_requires_selection() {
    for &kind in ToolKind::ALL {
        let result = ToolState::enter(kind, None);
        if kind.requires_image() {
            assert!(matches!(result, Err(ScalerError::NoImageSelected(k)) if k == kind));
        } else {
            assert_eq!(result.unwrap().kind(), kind);
        }
    }
}

#[test]
fn test_enter_sets_target() {
    let state = ToolState::enter(ToolKind::Crop, Some(TARGET)).unwrap();
    assert_eq!(state.target(), Some(TARGET));
    assert_eq!(
        state,
        ToolState::Crop {
            target: TARGET,
            step: CropStep::AwaitingFirst
        }
    );
}

#[test]
fn test_tool_kind_display() {
    assert_eq!(ToolKind::SetScale.to_string(), "Set Scale");
    assert_eq!(ToolKind::PerspectiveFix.to_string(), "Perspective Fix");
}

// ---------------------------------------------------------------------------
// Select and pan
// ---------------------------------------------------------------------------

#[test]
fn test_select_press_on_image_starts_drag() {
    let state = ToolState::default();
    let t = state.on_press(&at(150.0, 130.0));
    assert_eq!(t.effect, Some(ToolEffect::Select(Some(TARGET))));

    let t = t.next.on_drag(&at(160.0, 150.0));
    assert_eq!(
        t.effect,
        Some(ToolEffect::MoveImage {
            id: TARGET,
            position: CanvasPoint::new(110.0, 120.0)
        })
    );

    let t = t.next.on_release();
    assert_eq!(t.next, ToolState::Select { drag: None });
}

#[test]
fn test_select_press_on_empty_clears_selection() {
    let t = ToolState::default().on_press(&at(10.0, 10.0));
    assert_eq!(t.effect, Some(ToolEffect::Select(None)));
    assert!(t.next.on_drag(&at(20.0, 20.0)).effect.is_none());
}

#[test]
fn test_pan_emits_screen_deltas() {
    let state = ToolState::enter(ToolKind::Pan, None).unwrap();
    assert!(state.on_drag(&at(5.0, 5.0)).effect.is_none());

    let t = state.on_press(&at(10.0, 10.0));
    let t = t.next.on_drag(&at(15.0, 7.0));
    assert_eq!(t.effect, Some(ToolEffect::PanBy { dx: 5.0, dy: -3.0 }));
    let t = t.next.on_drag(&at(16.0, 8.0));
    assert_eq!(t.effect, Some(ToolEffect::PanBy { dx: 1.0, dy: 1.0 }));
}

// ---------------------------------------------------------------------------
// Set scale
// ---------------------------------------------------------------------------

#[test]
fn test_set_scale_two_clicks_then_length() {
    let state = ToolState::enter(ToolKind::SetScale, Some(TARGET)).unwrap();
    let t = state.on_press(&at(110.0, 120.0));
    assert_eq!(
        t.next,
        ToolState::SetScale {
            target: TARGET,
            step: LineStep::AwaitingSecond(LocalPoint::new(10.0, 20.0))
        }
    );

    let t = t.next.on_press(&at(140.0, 160.0));
    assert_eq!(t.effect, Some(ToolEffect::RequestLength { pixel_distance: 50.0 }));
    assert!(t.next.awaiting_input());

    // Further clicks are ignored while the dialog is open.
    let ignored = t.next.on_press(&at(200.0, 200.0));
    assert_eq!(ignored.next, t.next);
    assert!(ignored.effect.is_none());

    let done = t.next.submit_length(80.0);
    assert_eq!(done.next, ToolState::default());
    assert_eq!(
        done.effect,
        Some(ToolEffect::Calibrate {
            target: TARGET,
            pixel_distance: 50.0,
            real_inches: 80.0
        })
    );
}

#[test]
fn test_submit_length_outside_dialog_is_ignored() {
    let state = ToolState::enter(ToolKind::SetScale, Some(TARGET)).unwrap();
    let t = state.submit_length(10.0);
    assert_eq!(t.next, state);
    assert!(t.effect.is_none());
}

// ---------------------------------------------------------------------------
// Measure
// ---------------------------------------------------------------------------

#[test]
fn test_measure_two_clicks() {
    let state = ToolState::enter(ToolKind::Measure, None).unwrap();
    let t = state.on_press(&at(0.0, 0.0));
    assert_eq!(t.effect, Some(ToolEffect::PointCollected { collected: 1, needed: 2 }));
    let t = t.next.on_press(&at(30.0, 40.0));
    assert_eq!(t.next, ToolState::default());
    match t.effect {
        Some(ToolEffect::Measure { pixel_distance, .. }) => assert_eq!(pixel_distance, 50.0),
        other => panic!("unexpected effect {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Crop
// ---------------------------------------------------------------------------

#[test]
fn test_crop_needs_confirmation() {
    let state = ToolState::enter(ToolKind::Crop, Some(TARGET)).unwrap();
    let t = state.on_press(&at(110.0, 110.0));
    let t = t.next.on_press(&at(210.0, 190.0));
    assert_eq!(t.effect, Some(ToolEffect::RequestCropConfirmation));
    assert!(t.next.awaiting_input());

    let done = t.next.confirm_crop();
    assert_eq!(
        done.effect,
        Some(ToolEffect::Crop {
            target: TARGET,
            a: LocalPoint::new(10.0, 10.0),
            b: LocalPoint::new(110.0, 90.0)
        })
    );
    assert_eq!(done.next, ToolState::default());
}

#[test]
fn test_confirm_crop_early_is_ignored() {
    let state = ToolState::enter(ToolKind::Crop, Some(TARGET)).unwrap();
    let t = state.on_press(&at(110.0, 110.0));
    let still = t.next.confirm_crop();
    assert_eq!(still.next, t.next);
    assert!(still.effect.is_none());
}

// ---------------------------------------------------------------------------
// Perspective fix
// ---------------------------------------------------------------------------

#[test]
fn test_perspective_collects_four_corners() {
    let mut state = ToolState::enter(ToolKind::PerspectiveFix, Some(TARGET)).unwrap();
    let clicks = [(110.0, 110.0), (290.0, 105.0), (295.0, 240.0), (105.0, 245.0)];
    for (i, &(x, y)) in clicks.iter().enumerate() {
        let t = state.on_press(&at(x, y));
        if i + 1 < PERSPECTIVE_CORNERS {
            assert_eq!(
                t.effect,
                Some(ToolEffect::PointCollected {
                    collected: i + 1,
                    needed: PERSPECTIVE_CORNERS
                })
            );
        } else {
            assert_eq!(
                t.effect,
                Some(ToolEffect::Rectify {
                    target: TARGET,
                    corners: [
                        LocalPoint::new(10.0, 10.0),
                        LocalPoint::new(190.0, 5.0),
                        LocalPoint::new(195.0, 140.0),
                        LocalPoint::new(5.0, 145.0),
                    ]
                })
            );
            assert_eq!(t.next, ToolState::default());
        }
        state = t.next;
    }
}

#[test]
fn test_perspective_ignores_clicks_off_image() {
    let state = ToolState::enter(ToolKind::PerspectiveFix, Some(TARGET)).unwrap();
    let t = state.on_press(&at(20.0, 20.0));
    assert!(t.effect.is_none());
    assert_eq!(t.next, state);
}

#[test]
fn test_image_tool_without_target_frame_stays() {
    let state = ToolState::enter(ToolKind::SetScale, Some(TARGET)).unwrap();
    let mut ctx = at(110.0, 110.0);
    ctx.target = None;
    let t = state.on_press(&ctx);
    assert_eq!(t.next, state);
    assert!(t.effect.is_none());
}

// ---------------------------------------------------------------------------
// Cancel
// ---------------------------------------------------------------------------

#[test]
fn test_cancel_returns_to_select() {
    let state = ToolState::enter(ToolKind::PerspectiveFix, Some(TARGET)).unwrap();
    let t = state.on_press(&at(110.0, 110.0));
    assert_eq!(t.next.cancel(), ToolState::default());
}
