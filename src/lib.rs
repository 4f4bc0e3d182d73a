//! # Vidmill SDK for Rust
//!
//! Official Rust client for the [Vidmill](https://vidmill.com) video
//! encoding API. Describe an encoding job as a small configuration
//! document, submit it, poll for completion, and look up probed media
//! metadata -- all with idiomatic async Rust.
//!
//! ## Quick start
//!
//! ```no_run
//! use vidmill::{Client, ConfigBuilder};
//!
//! #[tokio::main]
//! async fn main() -> vidmill::Result<()> {
//!     let client = Client::new("vm_live_your_api_key");
//!
//!     let config = ConfigBuilder::new()
//!         .var("s3", "s3://accesskey:secretkey@my-bucket")
//!         .source("https://example.com/video.mp4")
//!         .webhook("https://mysite.com/encoding-hook")
//!         .output("mp4", "$s3/video.mp4")
//!         .output("webm", "$s3/video.webm")
//!         .build()?;
//!
//!     // Submit and wait for the encoding to finish
//!     let job = client.encode(&config, None).await?;
//!
//!     println!("job {} -> {}", job.id, job.status);
//!     if let Some(url) = job.output_url("mp4") {
//!         println!("mp4 written to {url}");
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Config documents
//!
//! A job is described by a plain-text document with three sections:
//! variables (`var`), settings (`set`), and output targets (`->`). Values
//! may reference variables with `$name`; the service performs the
//! substitution server-side.
//!
//! ```text
//! var s3 = s3://accesskey:secretkey@my-bucket
//!
//! set source = https://example.com/video.mp4
//! set webhook = https://mysite.com/encoding-hook
//!
//! -> mp4 = $s3/video.mp4
//! -> webm = $s3/video.webm
//! ```
//!
//! [`ConfigBuilder`] produces this text deterministically (sections in a
//! fixed order, keys sorted) and can merge entries over a base document
//! kept on disk:
//!
//! ```no_run
//! use vidmill::ConfigBuilder;
//!
//! # fn example() -> vidmill::Result<String> {
//! let config = ConfigBuilder::new()
//!     .base_file("vidmill.conf")
//!     .var("vid", 1234)
//!     .source("https://example.com/1234.mp4")
//!     .build()?;
//! # Ok(config)
//! # }
//! ```

mod client;
mod config;
mod errors;
mod models;

pub use client::{Client, ClientBuilder};
pub use config::{ConfigBuilder, VarValue};
pub use errors::{Result, VidmillError};
pub use models::{Job, Metadata, WaitOptions};
