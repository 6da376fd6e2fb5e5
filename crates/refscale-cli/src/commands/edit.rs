use anyhow::Result;
use clap::Args;
use refscale_core::geometry::CanvasPoint;
use refscale_core::reference::ImageId;

use super::{parse_id, parse_point, Workspace};

#[derive(Args)]
pub struct IdArgs {
    /// Image id, e.g. img-1
    #[arg(value_parser = parse_id)]
    pub id: ImageId,
}

#[derive(Args)]
pub struct MoveArgs {
    /// Image id, e.g. img-1
    #[arg(value_parser = parse_id)]
    pub id: ImageId,

    /// New top-left corner in board pixels: x,y
    #[arg(long, value_parser = parse_point)]
    pub to: (f64, f64),
}

pub fn reset(ws: &mut Workspace, args: &IdArgs) -> Result<()> {
    ws.with_session(|session| Ok(session.reset_image(args.id)?))?;
    println!("Reset {} to its original pixels", args.id);
    ws.save()
}

pub fn remove(ws: &mut Workspace, args: &IdArgs) -> Result<()> {
    ws.with_session(|session| Ok(session.remove_image(args.id)?))?;
    println!("Removed {}", args.id);
    ws.save()
}

pub fn move_image(ws: &mut Workspace, args: &MoveArgs) -> Result<()> {
    let (x, y) = args.to;
    ws.board.move_image(args.id, CanvasPoint::new(x, y))?;
    println!("Moved {} to ({x:.1}, {y:.1})", args.id);
    ws.save()
}
