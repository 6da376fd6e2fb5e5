use anyhow::Result;
use clap::Args;
use refscale_core::units::DraftingScale;

use super::Workspace;

#[derive(Args)]
pub struct ScaleArgs {
    /// Drafting scale: `1/4" = 1'-0"`, `1:48` or inches per foot (`0.25`)
    pub scale: DraftingScale,
}

pub fn run(ws: &mut Workspace, args: &ScaleArgs) -> Result<()> {
    ws.with_session(|session| {
        session.set_drafting_scale(args.scale);
        Ok(())
    })?;
    let calibrated = ws
        .board
        .images()
        .iter()
        .filter(|img| img.calibration().is_some())
        .count();
    println!("Drafting scale: {} ({calibrated} calibrated image(s) resized)", args.scale);
    ws.save()
}
