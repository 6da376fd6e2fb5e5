//! Interaction tools as an explicit state machine.
//!
//! `ToolState` holds everything an active tool has collected so far. The
//! transition methods are pure: they return the next state plus an optional
//! [`ToolEffect`] for the caller to apply to the board.

use std::fmt;

use crate::error::{Result, ScalerError};
use crate::geometry::{CanvasPoint, ImageFrame, LocalPoint, ScreenPoint};
use crate::reference::ImageId;

/// Number of corners a perspective fix needs.
pub const PERSPECTIVE_CORNERS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Select,
    Pan,
    SetScale,
    Measure,
    Crop,
    PerspectiveFix,
}

impl ToolKind {
    pub const ALL: &[Self] = &[
        Self::Select,
        Self::Pan,
        Self::SetScale,
        Self::Measure,
        Self::Crop,
        Self::PerspectiveFix,
    ];

    /// Tools that act on the selected image.
    pub fn requires_image(&self) -> bool {
        matches!(self, Self::SetScale | Self::Crop | Self::PerspectiveFix)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select => write!(f, "Select"),
            Self::Pan => write!(f, "Pan"),
            Self::SetScale => write!(f, "Set Scale"),
            Self::Measure => write!(f, "Measure"),
            Self::Crop => write!(f, "Crop"),
            Self::PerspectiveFix => write!(f, "Perspective Fix"),
        }
    }
}

/// An image being dragged by the select tool.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Drag {
    pub image: ImageId,
    /// Pointer position relative to the image's top-left when the drag began.
    pub grab_x: f64,
    pub grab_y: f64,
}

/// Progress of the two-click set-scale gesture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LineStep {
    AwaitingFirst,
    AwaitingSecond(LocalPoint),
    /// Both ends placed; the length dialog is open.
    AwaitingLength(LocalPoint, LocalPoint),
}

/// Progress of the crop gesture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CropStep {
    AwaitingFirst,
    AwaitingSecond(LocalPoint),
    /// Both corners placed; waiting for confirmation.
    Confirming(LocalPoint, LocalPoint),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ToolState {
    Select { drag: Option<Drag> },
    Pan { last: Option<ScreenPoint> },
    SetScale { target: ImageId, step: LineStep },
    Measure { first: Option<CanvasPoint> },
    Crop { target: ImageId, step: CropStep },
    PerspectiveFix { target: ImageId, corners: Vec<LocalPoint> },
}

impl Default for ToolState {
    fn default() -> Self {
        Self::Select { drag: None }
    }
}

/// What the pointer is over when an event arrives.
#[derive(Clone, Copy, Debug)]
pub struct PointerContext {
    pub screen: ScreenPoint,
    pub canvas: CanvasPoint,
    /// Topmost image under the pointer and its top-left corner.
    pub hit: Option<(ImageId, CanvasPoint)>,
    /// Placement of the image the active tool targets.
    pub target: Option<ImageFrame>,
}

/// A request produced by a transition, for the caller to carry out.
#[derive(Clone, Debug, PartialEq)]
pub enum ToolEffect {
    Select(Option<ImageId>),
    MoveImage { id: ImageId, position: CanvasPoint },
    PanBy { dx: f64, dy: f64 },
    PointCollected { collected: usize, needed: usize },
    /// The set-scale line is complete; ask for its real-world length.
    RequestLength { pixel_distance: f64 },
    Measure { from: CanvasPoint, to: CanvasPoint, pixel_distance: f64 },
    RequestCropConfirmation,
    Calibrate { target: ImageId, pixel_distance: f64, real_inches: f64 },
    Crop { target: ImageId, a: LocalPoint, b: LocalPoint },
    Rectify { target: ImageId, corners: [LocalPoint; PERSPECTIVE_CORNERS] },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub next: ToolState,
    pub effect: Option<ToolEffect>,
}

impl Transition {
    fn stay(state: &ToolState) -> Self {
        Self {
            next: state.clone(),
            effect: None,
        }
    }

    fn to(next: ToolState, effect: ToolEffect) -> Self {
        Self {
            next,
            effect: Some(effect),
        }
    }
}

impl ToolState {
    /// Fresh state for `kind`. Image tools need a selected image.
    pub fn enter(kind: ToolKind, selected: Option<ImageId>) -> Result<Self> {
        let target = || selected.ok_or(ScalerError::NoImageSelected(kind));
        Ok(match kind {
            ToolKind::Select => Self::Select { drag: None },
            ToolKind::Pan => Self::Pan { last: None },
            ToolKind::Measure => Self::Measure { first: None },
            ToolKind::SetScale => Self::SetScale {
                target: target()?,
                step: LineStep::AwaitingFirst,
            },
            ToolKind::Crop => Self::Crop {
                target: target()?,
                step: CropStep::AwaitingFirst,
            },
            ToolKind::PerspectiveFix => Self::PerspectiveFix {
                target: target()?,
                corners: Vec::with_capacity(PERSPECTIVE_CORNERS),
            },
        })
    }

    pub fn kind(&self) -> ToolKind {
        match self {
            Self::Select { .. } => ToolKind::Select,
            Self::Pan { .. } => ToolKind::Pan,
            Self::SetScale { .. } => ToolKind::SetScale,
            Self::Measure { .. } => ToolKind::Measure,
            Self::Crop { .. } => ToolKind::Crop,
            Self::PerspectiveFix { .. } => ToolKind::PerspectiveFix,
        }
    }

    /// The image this tool operates on, if any.
    pub fn target(&self) -> Option<ImageId> {
        match self {
            Self::SetScale { target, .. }
            | Self::Crop { target, .. }
            | Self::PerspectiveFix { target, .. } => Some(*target),
            _ => None,
        }
    }

    /// True while a modal step (length dialog, crop confirmation) is open.
    pub fn awaiting_input(&self) -> bool {
        matches!(
            self,
            Self::SetScale {
                step: LineStep::AwaitingLength(..),
                ..
            } | Self::Crop {
                step: CropStep::Confirming(..),
                ..
            }
        )
    }

    pub fn on_press(&self, ctx: &PointerContext) -> Transition {
        match self {
            Self::Select { .. } => match ctx.hit {
                Some((id, origin)) => Transition::to(
                    Self::Select {
                        drag: Some(Drag {
                            image: id,
                            grab_x: ctx.canvas.x - origin.x,
                            grab_y: ctx.canvas.y - origin.y,
                        }),
                    },
                    ToolEffect::Select(Some(id)),
                ),
                None => Transition::to(Self::Select { drag: None }, ToolEffect::Select(None)),
            },

            Self::Pan { .. } => Transition {
                next: Self::Pan {
                    last: Some(ctx.screen),
                },
                effect: None,
            },

            Self::SetScale { target, step } => {
                let Some(frame) = ctx.target else {
                    return Transition::stay(self);
                };
                let p = frame.canvas_to_local(ctx.canvas);
                match *step {
                    LineStep::AwaitingFirst => Transition::to(
                        Self::SetScale {
                            target: *target,
                            step: LineStep::AwaitingSecond(p),
                        },
                        ToolEffect::PointCollected {
                            collected: 1,
                            needed: 2,
                        },
                    ),
                    LineStep::AwaitingSecond(a) => Transition::to(
                        Self::SetScale {
                            target: *target,
                            step: LineStep::AwaitingLength(a, p),
                        },
                        ToolEffect::RequestLength {
                            pixel_distance: a.distance_to(&p),
                        },
                    ),
                    LineStep::AwaitingLength(..) => Transition::stay(self),
                }
            }

            Self::Measure { first } => match first {
                None => Transition::to(
                    Self::Measure {
                        first: Some(ctx.canvas),
                    },
                    ToolEffect::PointCollected {
                        collected: 1,
                        needed: 2,
                    },
                ),
                Some(from) => Transition::to(
                    Self::default(),
                    ToolEffect::Measure {
                        from: *from,
                        to: ctx.canvas,
                        pixel_distance: from.distance_to(&ctx.canvas),
                    },
                ),
            },

            Self::Crop { target, step } => {
                let Some(frame) = ctx.target else {
                    return Transition::stay(self);
                };
                let p = frame.canvas_to_local(ctx.canvas);
                match *step {
                    CropStep::AwaitingFirst => Transition::to(
                        Self::Crop {
                            target: *target,
                            step: CropStep::AwaitingSecond(p),
                        },
                        ToolEffect::PointCollected {
                            collected: 1,
                            needed: 2,
                        },
                    ),
                    CropStep::AwaitingSecond(a) => Transition::to(
                        Self::Crop {
                            target: *target,
                            step: CropStep::Confirming(a, p),
                        },
                        ToolEffect::RequestCropConfirmation,
                    ),
                    CropStep::Confirming(..) => Transition::stay(self),
                }
            }

            Self::PerspectiveFix { target, corners } => {
                let Some(frame) = ctx.target else {
                    return Transition::stay(self);
                };
                let p = frame.canvas_to_local(ctx.canvas);
                // Clicks off the image do not use up a corner
                if !frame.contains_local(p) {
                    return Transition::stay(self);
                }
                let mut collected = corners.clone();
                collected.push(p);
                match <[LocalPoint; PERSPECTIVE_CORNERS]>::try_from(collected.as_slice()) {
                    Ok(quad) => Transition::to(
                        Self::default(),
                        ToolEffect::Rectify {
                            target: *target,
                            corners: quad,
                        },
                    ),
                    Err(_) => {
                        let count = collected.len();
                        Transition::to(
                            Self::PerspectiveFix {
                                target: *target,
                                corners: collected,
                            },
                            ToolEffect::PointCollected {
                                collected: count,
                                needed: PERSPECTIVE_CORNERS,
                            },
                        )
                    }
                }
            }
        }
    }

    /// Pointer moved with the button held.
    pub fn on_drag(&self, ctx: &PointerContext) -> Transition {
        match self {
            Self::Select { drag: Some(drag) } => Transition::to(
                self.clone(),
                ToolEffect::MoveImage {
                    id: drag.image,
                    position: CanvasPoint::new(ctx.canvas.x - drag.grab_x, ctx.canvas.y - drag.grab_y),
                },
            ),
            Self::Pan { last: Some(last) } => Transition::to(
                Self::Pan {
                    last: Some(ctx.screen),
                },
                ToolEffect::PanBy {
                    dx: ctx.screen.x - last.x,
                    dy: ctx.screen.y - last.y,
                },
            ),
            _ => Transition::stay(self),
        }
    }

    pub fn on_release(&self) -> Transition {
        match self {
            Self::Select { .. } => Transition {
                next: Self::Select { drag: None },
                effect: None,
            },
            Self::Pan { .. } => Transition {
                next: Self::Pan { last: None },
                effect: None,
            },
            _ => Transition::stay(self),
        }
    }

    /// Commit the length dialog. Ignored unless a set-scale line is complete.
    pub fn submit_length(&self, real_inches: f64) -> Transition {
        match self {
            Self::SetScale {
                target,
                step: LineStep::AwaitingLength(a, b),
            } => Transition::to(
                Self::default(),
                ToolEffect::Calibrate {
                    target: *target,
                    pixel_distance: a.distance_to(b),
                    real_inches,
                },
            ),
            _ => Transition::stay(self),
        }
    }

    /// Accept the pending crop. Ignored unless both corners are placed.
    pub fn confirm_crop(&self) -> Transition {
        match self {
            Self::Crop {
                target,
                step: CropStep::Confirming(a, b),
            } => Transition::to(
                Self::default(),
                ToolEffect::Crop {
                    target: *target,
                    a: *a,
                    b: *b,
                },
            ),
            _ => Transition::stay(self),
        }
    }

    /// Abandon any pending points or dialog.
    pub fn cancel(&self) -> ToolState {
        Self::default()
    }
}
