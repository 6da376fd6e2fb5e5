pub mod consts;
pub mod error;
pub mod config;
pub mod geometry;
pub mod solver;
pub mod homography;
pub mod raster;
pub mod units;
pub mod reference;
pub mod calibration;
pub mod crop;
pub mod rectify;
pub mod board;
pub mod tool;
pub mod session;
pub mod persist;
pub mod export;
