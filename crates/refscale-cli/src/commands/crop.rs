use anyhow::{bail, Result};
use clap::Args;
use refscale_core::reference::ImageId;
use refscale_core::session::SessionEvent;
use refscale_core::tool::ToolKind;

use super::{accept, click_image, parse_id, parse_point, Workspace};

#[derive(Args)]
pub struct CropArgs {
    /// Image id, e.g. img-1
    #[arg(value_parser = parse_id)]
    pub id: ImageId,

    /// One corner in image display pixels: x,y
    #[arg(long, value_parser = parse_point)]
    pub from: (f64, f64),

    /// Opposite corner in image display pixels: x,y
    #[arg(long, value_parser = parse_point)]
    pub to: (f64, f64),
}

pub fn run(ws: &mut Workspace, args: &CropArgs) -> Result<()> {
    let rect = ws.with_session(|session| {
        session.select(Some(args.id))?;
        session.select_tool(ToolKind::Crop)?;
        click_image(session, args.id, args.from.0, args.from.1)?;
        click_image(session, args.id, args.to.0, args.to.1)?;
        match accept(session.confirm_crop())? {
            SessionEvent::Cropped { rect, .. } => Ok(rect),
            other => bail!("Crop did not complete: {other:?}"),
        }
    })?;

    println!(
        "Cropped {} to {}x{} at ({}, {})",
        args.id, rect.width, rect.height, rect.x, rect.y
    );
    ws.save()
}
