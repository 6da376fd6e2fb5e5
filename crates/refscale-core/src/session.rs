//! Interactive editing session: board, active tool, viewport and selection.
//!
//! Pointer input arrives in screen space and is routed to the active
//! [`ToolState`]. Effects produced by a transition are applied to the board
//! here; when one fails the board is left as it was and the tool falls back
//! to a state from which the user can retry.

use tracing::{debug, warn};

use crate::board::Board;
use crate::calibration::measure_inches;
use crate::crop::CropRect;
use crate::error::{Result, ScalerError};
use crate::geometry::{CanvasPoint, ScreenPoint, Viewport};
use crate::reference::ImageId;
use crate::tool::{CropStep, LineStep, PointerContext, ToolEffect, ToolKind, ToolState, Transition};
use crate::units::{format_feet_inches, parse_length_inches, DraftingScale};

/// What a session input led to.
#[derive(Debug)]
pub enum SessionEvent {
    Nothing,
    Selected(Option<ImageId>),
    Moved { id: ImageId, position: CanvasPoint },
    Panned,
    PointCollected { collected: usize, needed: usize },
    LengthRequested { pixel_distance: f64 },
    CropConfirmationRequested,
    Measured {
        pixel_distance: f64,
        real_inches: f64,
        label: String,
    },
    Calibrated { id: ImageId, factor: f64 },
    Cropped { id: ImageId, rect: CropRect },
    Rectified { id: ImageId },
    Rejected(ScalerError),
}

pub struct Session {
    board: Board,
    tool: ToolState,
    viewport: Viewport,
    selected: Option<ImageId>,
    pointer_down: bool,
}

impl Session {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            tool: ToolState::default(),
            viewport: Viewport::default(),
            selected: None,
            pointer_down: false,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn into_board(self) -> Board {
        self.board
    }

    pub fn tool(&self) -> &ToolState {
        &self.tool
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn selected(&self) -> Option<ImageId> {
        self.selected
    }

    pub fn select(&mut self, id: Option<ImageId>) -> Result<()> {
        if let Some(id) = id {
            self.board.get(id)?;
        }
        self.selected = id;
        Ok(())
    }

    /// Switch tools, discarding anything the previous tool had collected.
    pub fn select_tool(&mut self, kind: ToolKind) -> Result<()> {
        if let Some(id) = self.selected {
            if self.board.get(id).is_err() {
                self.selected = None;
            }
        }
        self.tool = ToolState::enter(kind, self.selected)?;
        self.pointer_down = false;
        debug!(tool = %kind, "Tool selected");
        Ok(())
    }

    pub fn set_drafting_scale(&mut self, scale: DraftingScale) {
        self.board.set_drafting_scale(scale);
    }

    pub fn reset_image(&mut self, id: ImageId) -> Result<()> {
        self.board.reset_image(id)?;
        if self.tool.target() == Some(id) {
            self.tool = ToolState::default();
        }
        Ok(())
    }

    pub fn remove_image(&mut self, id: ImageId) -> Result<()> {
        self.board.remove_image(id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.tool.target() == Some(id) {
            self.tool = ToolState::default();
        }
        Ok(())
    }

    pub fn pointer_down(&mut self, screen: ScreenPoint) -> SessionEvent {
        self.pointer_down = true;
        let ctx = self.pointer_context(screen);
        let transition = self.tool.on_press(&ctx);
        self.dispatch(transition)
    }

    /// Pointer motion; only meaningful while the button is held.
    pub fn pointer_move(&mut self, screen: ScreenPoint) -> SessionEvent {
        if !self.pointer_down {
            return SessionEvent::Nothing;
        }
        let ctx = self.pointer_context(screen);
        let transition = self.tool.on_drag(&ctx);
        self.dispatch(transition)
    }

    pub fn pointer_up(&mut self) -> SessionEvent {
        self.pointer_down = false;
        let transition = self.tool.on_release();
        self.dispatch(transition)
    }

    /// Commit the set-scale length dialog with the user's text.
    ///
    /// Unreadable or non-positive input keeps the dialog open.
    pub fn submit_length(&mut self, text: &str) -> SessionEvent {
        if !matches!(
            self.tool,
            ToolState::SetScale {
                step: LineStep::AwaitingLength(..),
                ..
            }
        ) {
            return SessionEvent::Nothing;
        }
        match parse_length_inches(text) {
            Ok(inches) => {
                let transition = self.tool.submit_length(inches);
                self.dispatch(transition)
            }
            Err(e) => SessionEvent::Rejected(e),
        }
    }

    pub fn confirm_crop(&mut self) -> SessionEvent {
        let transition = self.tool.confirm_crop();
        self.dispatch(transition)
    }

    /// Dismiss any dialog or confirmation and drop pending points.
    pub fn cancel(&mut self) {
        self.tool = self.tool.cancel();
        self.pointer_down = false;
    }

    fn pointer_context(&self, screen: ScreenPoint) -> PointerContext {
        let canvas = self.viewport.screen_to_canvas(screen);
        let hit = self
            .board
            .image_at(canvas)
            .and_then(|id| self.board.get(id).ok())
            .map(|img| (img.id(), img.position()));
        let target = self
            .tool
            .target()
            .and_then(|id| self.board.get(id).ok())
            .map(|img| img.frame());
        PointerContext {
            screen,
            canvas,
            hit,
            target,
        }
    }

    fn dispatch(&mut self, transition: Transition) -> SessionEvent {
        let previous = std::mem::replace(&mut self.tool, transition.next);
        let Some(effect) = transition.effect else {
            return SessionEvent::Nothing;
        };
        match self.apply(&effect) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Tool action rejected");
                self.tool = recovery_state(&previous, &effect, &e);
                SessionEvent::Rejected(e)
            }
        }
    }

    fn apply(&mut self, effect: &ToolEffect) -> Result<SessionEvent> {
        Ok(match *effect {
            ToolEffect::Select(id) => {
                self.selected = id;
                SessionEvent::Selected(id)
            }
            ToolEffect::MoveImage { id, position } => {
                self.board.move_image(id, position)?;
                SessionEvent::Moved { id, position }
            }
            ToolEffect::PanBy { dx, dy } => {
                self.viewport.pan_by(dx, dy);
                SessionEvent::Panned
            }
            ToolEffect::PointCollected { collected, needed } => {
                SessionEvent::PointCollected { collected, needed }
            }
            ToolEffect::RequestLength { pixel_distance } => {
                SessionEvent::LengthRequested { pixel_distance }
            }
            ToolEffect::Measure { pixel_distance, .. } => {
                let real_inches = measure_inches(
                    pixel_distance,
                    self.board.drafting_scale(),
                    self.board.pixels_per_inch(),
                );
                SessionEvent::Measured {
                    pixel_distance,
                    real_inches,
                    label: format_feet_inches(real_inches),
                }
            }
            ToolEffect::RequestCropConfirmation => SessionEvent::CropConfirmationRequested,
            ToolEffect::Calibrate {
                target,
                pixel_distance,
                real_inches,
            } => {
                let factor = self.board.calibrate(target, pixel_distance, real_inches)?;
                SessionEvent::Calibrated { id: target, factor }
            }
            ToolEffect::Crop { target, a, b } => {
                let rect = self.board.crop(target, a, b)?;
                SessionEvent::Cropped { id: target, rect }
            }
            ToolEffect::Rectify { target, corners } => {
                self.board.rectify(target, &corners)?;
                SessionEvent::Rectified { id: target }
            }
        })
    }
}

/// Tool state to return to after `effect` failed with `err`.
fn recovery_state(previous: &ToolState, effect: &ToolEffect, err: &ScalerError) -> ToolState {
    if matches!(err, ScalerError::ImageNotFound(_)) {
        return ToolState::default();
    }
    match *effect {
        // Bad length text keeps the dialog open; a too-short line starts over.
        ToolEffect::Calibrate { target, .. } => match err {
            ScalerError::InvalidDimensionInput(_) => previous.clone(),
            _ => ToolState::SetScale {
                target,
                step: LineStep::AwaitingFirst,
            },
        },
        ToolEffect::Crop { target, .. } => ToolState::Crop {
            target,
            step: CropStep::AwaitingFirst,
        },
        ToolEffect::Rectify { target, .. } => ToolState::PerspectiveFix {
            target,
            corners: Vec::new(),
        },
        // A rejected move ends the drag.
        ToolEffect::MoveImage { .. } => ToolState::default(),
        _ => previous.clone(),
    }
}
