pub mod add;
pub mod calibrate;
pub mod config;
pub mod crop;
pub mod edit;
pub mod export;
pub mod info;
pub mod measure;
pub mod paper;
pub mod rectify;
pub mod scale;

use std::path::Path;

use anyhow::{Context, Result};
use refscale_core::board::Board;
use refscale_core::config::ScalerConfig;
use refscale_core::geometry::LocalPoint;
use refscale_core::persist::{load_board, save_board, FileStore};
use refscale_core::reference::ImageId;
use refscale_core::session::{Session, SessionEvent};
use tracing::debug;

/// The stored board plus the config it is edited under.
pub struct Workspace {
    store: FileStore,
    config: ScalerConfig,
    pub board: Board,
}

impl Workspace {
    pub fn open(dir: &Path, config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => load_config(path)?,
            None => ScalerConfig::default(),
        };
        let store = FileStore::open(dir)
            .with_context(|| format!("Failed to open board store {}", dir.display()))?;
        let board = load_board(&store, &config.storage_key, config.clone())
            .with_context(|| format!("Failed to load board from {}", dir.display()))?
            .unwrap_or_else(|| Board::new(config.clone()));
        debug!(images = board.len(), store = %dir.display(), "Opened board");
        Ok(Self {
            store,
            config,
            board,
        })
    }

    pub fn save(&mut self) -> Result<()> {
        save_board(&mut self.store, &self.config.storage_key, &self.board).with_context(|| {
            format!("Failed to save board to {}", self.store.dir().display())
        })
    }

    /// Run `f` against an interactive session over the board.
    pub fn with_session<T>(&mut self, f: impl FnOnce(&mut Session) -> Result<T>) -> Result<T> {
        let mut session = Session::new(std::mem::take(&mut self.board));
        let result = f(&mut session);
        self.board = session.into_board();
        result
    }
}

fn load_config(path: &Path) -> Result<ScalerConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: ScalerConfig = toml::from_str(&text)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Click at a point given in the image's local display pixels.
pub fn click_image(session: &mut Session, id: ImageId, x: f64, y: f64) -> Result<SessionEvent> {
    let frame = session.board().get(id)?.frame();
    let canvas = frame.local_to_canvas(LocalPoint::new(x, y));
    let screen = session.viewport().canvas_to_screen(canvas);
    let event = session.pointer_down(screen);
    session.pointer_up();
    accept(event)
}

/// Turn a rejected session event into an error.
pub fn accept(event: SessionEvent) -> Result<SessionEvent> {
    match event {
        SessionEvent::Rejected(e) => Err(e.into()),
        other => Ok(other),
    }
}

pub fn parse_id(s: &str) -> std::result::Result<ImageId, String> {
    s.parse().map_err(|e: refscale_core::error::ScalerError| e.to_string())
}

/// `x,y` in pixels.
pub fn parse_point(s: &str) -> std::result::Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got '{s}'"))?;
    let x: f64 = x.trim().parse().map_err(|_| format!("bad x in '{s}'"))?;
    let y: f64 = y.trim().parse().map_err(|_| format!("bad y in '{s}'"))?;
    if x.is_finite() && y.is_finite() {
        Ok((x, y))
    } else {
        Err(format!("point '{s}' is not finite"))
    }
}
