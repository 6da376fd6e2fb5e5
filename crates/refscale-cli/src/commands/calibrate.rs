use anyhow::{bail, Result};
use clap::Args;
use refscale_core::reference::ImageId;
use refscale_core::session::SessionEvent;
use refscale_core::tool::ToolKind;
use refscale_core::units::format_feet_inches;

use super::{accept, click_image, parse_id, parse_point, Workspace};

#[derive(Args)]
pub struct CalibrateArgs {
    /// Image id, e.g. img-1
    #[arg(value_parser = parse_id)]
    pub id: ImageId,

    /// Line start in image display pixels: x,y
    #[arg(long, value_parser = parse_point)]
    pub from: (f64, f64),

    /// Line end in image display pixels: x,y
    #[arg(long, value_parser = parse_point)]
    pub to: (f64, f64),

    /// Real-world length of the line, e.g. 80, 6'-8", 12' 6 1/2"
    #[arg(long)]
    pub length: String,
}

pub fn run(ws: &mut Workspace, args: &CalibrateArgs) -> Result<()> {
    let factor = ws.with_session(|session| {
        session.select(Some(args.id))?;
        session.select_tool(ToolKind::SetScale)?;
        click_image(session, args.id, args.from.0, args.from.1)?;
        click_image(session, args.id, args.to.0, args.to.1)?;
        match accept(session.submit_length(&args.length))? {
            SessionEvent::Calibrated { factor, .. } => Ok(factor),
            other => bail!("Calibration did not complete: {other:?}"),
        }
    })?;

    let img = ws.board.get(args.id)?;
    let cal = img.calibration();
    println!("Calibrated {} by x{factor:.4}", args.id);
    println!(
        "  Display size: {:.1} x {:.1} px",
        img.size().width,
        img.size().height
    );
    if let Some(cal) = cal {
        println!(
            "  Reference:    {:.1} px = {}",
            cal.reference_pixel_distance,
            format_feet_inches(cal.reference_inches)
        );
    }
    ws.save()
}
