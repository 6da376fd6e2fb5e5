use anyhow::Result;
use clap::Args;
use refscale_core::board::{Orientation, PaperSize};

use super::Workspace;

#[derive(Args)]
pub struct PaperArgs {
    /// letter, legal, tabloid, a4, a3, archc or archd
    pub size: PaperSize,

    /// Lay the paper on its side
    #[arg(long)]
    pub landscape: bool,
}

pub fn run(ws: &mut Workspace, args: &PaperArgs) -> Result<()> {
    let orientation = if args.landscape {
        Orientation::Landscape
    } else {
        Orientation::Portrait
    };
    ws.board.set_paper(args.size, orientation);
    let (w, h) = ws.board.paper_inches();
    println!("Paper: {} {} ({w:.2}\" x {h:.2}\")", args.size, orientation);
    ws.save()
}
