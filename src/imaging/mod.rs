//! Pixel work — pure Rust, zero external dependencies.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode / encode JPEG** | `image` crate via [`RustCodec`] |
//! | **Redaction** | [`redact`] — channel zeroing over region bounds |
//!
//! The module is split into:
//! - **Codec**: [`ImageCodec`] trait + shared types ([`Quality`], [`Dimensions`])
//! - **RustCodec**: the production `image`-crate implementation
//! - **Redact**: pixel-zeroing functions (pure, unit testable)

pub mod codec;
pub mod redact;
pub mod rust_codec;

pub use codec::{CodecError, Dimensions, ImageCodec, Quality};
pub use redact::{apply_region, apply_regions};
pub use rust_codec::RustCodec;
