//! Generate RPC bindings for kite services from protobuf service schemas.
//!
//! The schema is handed over already parsed ([`FileSchema`]); each file with at
//! least one service becomes one generated Go file, following one of two
//! calling conventions ([`Mode`]).

#[macro_use]
mod printer;

pub mod comment;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod file;
pub mod generator;
pub mod go_type;
pub mod ident;
pub mod service;
pub mod shape;

#[cfg(test)]
mod test_util;

pub use config::Config;
pub use error::{GenerateError, Result};
pub use file::FileSchema;
pub use generator::{generate_content, generate_file, GeneratedFile, Generator, Mode};
pub use printer::Printer;
pub use service::{MethodRef, MethodSchema, ServiceSchema};
pub use shape::{classify, CallShape};
