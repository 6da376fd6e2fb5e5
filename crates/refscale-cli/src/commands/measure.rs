use anyhow::{bail, Result};
use clap::Args;
use refscale_core::geometry::{CanvasPoint, ScreenPoint};
use refscale_core::session::{Session, SessionEvent};
use refscale_core::tool::ToolKind;

use super::{accept, parse_point, Workspace};

#[derive(Args)]
pub struct MeasureArgs {
    /// Start point in board pixels: x,y
    #[arg(long, value_parser = parse_point)]
    pub from: (f64, f64),

    /// End point in board pixels: x,y
    #[arg(long, value_parser = parse_point)]
    pub to: (f64, f64),
}

pub fn run(ws: &Workspace, args: &MeasureArgs) -> Result<()> {
    // Measuring never changes the board, so work on a copy.
    let mut session = Session::new(ws.board.clone());
    session.select_tool(ToolKind::Measure)?;
    for (x, y) in [args.from, args.to] {
        let screen: ScreenPoint = session.viewport().canvas_to_screen(CanvasPoint::new(x, y));
        let event = accept(session.pointer_down(screen))?;
        session.pointer_up();
        if let SessionEvent::Measured {
            pixel_distance,
            real_inches,
            label,
        } = event
        {
            println!("{label}  ({real_inches:.2} in, {pixel_distance:.1} px at {})", ws.board.drafting_scale());
            return Ok(());
        }
    }
    bail!("Measurement did not complete")
}
