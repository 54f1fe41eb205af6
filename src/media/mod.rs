//! Media concatenation
//!
//! This module provides a trait-based architecture for joining video files. The
//! production implementation shells out to ffmpeg; the trait seam lets the
//! merge pipeline run against other implementations (tests use an in-process
//! byte concatenation).
//!
//! ## Architecture
//!
//! - [`ConcatHandler`]: joins an ordered list of inputs into one output
//! - [`FfmpegConcatHandler`]: stream-copy concatenation via the ffmpeg concat demuxer
//! - [`UnavailableConcatHandler`]: stand-in when ffmpeg is missing
//! - [`ConcatManifest`]: the `file '<path>'` listing consumed by the demuxer
//! - [`run_tool`]: runs an external command and turns a nonzero exit into
//!   [`Error::ToolExecution`](crate::Error::ToolExecution)
//!
//! ## Usage
//!
//! ```no_run
//! use vidmerge::media::{ConcatHandler, FfmpegConcatHandler};
//! use std::path::{Path, PathBuf};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let handler = FfmpegConcatHandler::from_path(2000)
//!         .expect("ffmpeg binary not found");
//!
//!     let inputs = [PathBuf::from("/tmp/work/1.mp4"), PathBuf::from("/tmp/work/2.mp4")];
//!     handler
//!         .concat(&inputs, Path::new("/tmp/work"), Path::new("/tmp/work/out.mp4"))
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

mod ffmpeg;
mod manifest;
mod process;
mod traits;
mod unavailable;

pub use ffmpeg::FfmpegConcatHandler;
pub use manifest::ConcatManifest;
pub use process::{run_tool, truncate_output};
pub use traits::ConcatHandler;
pub use unavailable::UnavailableConcatHandler;
