use anyhow::Result;

use super::Workspace;
use crate::summary::print_board_summary;

pub fn run(ws: &Workspace) -> Result<()> {
    print_board_summary(&ws.board);
    Ok(())
}
