//! Sesami MCU Library
//!
//! Blocking client for the Sesame smart-lock cloud API, small enough for a
//! microcontroller.
//!
//! This crate provides:
//! - `Transport` / `Connection` traits that platform crates implement with
//!   their HTTPS stack
//! - `Client`, which runs the three cloud operations over any transport
//!
//! # Example implementations
//! - ESP32: see `sesami-esp32` (`EspHttpConnection`)
//! - Host: see `sesami-cli` (`reqwest::blocking`)
//!
//! # Note
//! Request framing, signing and response handling live in `sesami-proto`;
//! this crate only adds the I/O seam.

pub mod client;
pub mod clock;
pub mod transport;

pub use client::*;
pub use clock::*;
pub use transport::*;

pub use sesami_proto::{
    generate_tag, Command, Method, Request, Response, SecretKey, Tag, DEFAULT_BASE_URL,
};
