use anyhow::{bail, Result};
use clap::Args;
use refscale_core::reference::ImageId;
use refscale_core::session::SessionEvent;
use refscale_core::tool::{ToolKind, PERSPECTIVE_CORNERS};

use super::{click_image, parse_id, parse_point, Workspace};

#[derive(Args)]
pub struct RectifyArgs {
    /// Image id, e.g. img-1
    #[arg(value_parser = parse_id)]
    pub id: ImageId,

    /// Four corners in image display pixels, clockwise from top-left: x,y x,y x,y x,y
    #[arg(long, value_parser = parse_point, num_args = 4, required = true)]
    pub corners: Vec<(f64, f64)>,
}

pub fn run(ws: &mut Workspace, args: &RectifyArgs) -> Result<()> {
    if args.corners.len() != PERSPECTIVE_CORNERS {
        bail!("Need {PERSPECTIVE_CORNERS} corners, got {}", args.corners.len());
    }

    ws.with_session(|session| {
        session.select(Some(args.id))?;
        session.select_tool(ToolKind::PerspectiveFix)?;
        let mut last = SessionEvent::Nothing;
        for &(x, y) in &args.corners {
            last = click_image(session, args.id, x, y)?;
        }
        match last {
            SessionEvent::Rectified { .. } => Ok(()),
            other => bail!("Perspective fix did not complete: {other:?}"),
        }
    })?;

    let img = ws.board.get(args.id)?;
    println!(
        "Rectified {} to {}x{} px",
        args.id,
        img.original_width(),
        img.original_height()
    );
    ws.save()
}
