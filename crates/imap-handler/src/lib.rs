//! # imap-handler
//!
//! A strict parser for single IMAP server response lines (RFC 3501 grammar)
//! that produces a generic, strongly-typed attribute tree.
//!
//! ## Features
//!
//! - **Sans-I/O**: takes one already-delimited line, never touches a socket
//! - **Typed tree**: atoms, `NIL`, quoted strings, literals, sequence sets,
//!   nested lists, `[section]` qualifiers and `<start.end>` partial ranges
//! - **Status responses**: response codes and human-readable text of
//!   `OK`/`NO`/`BAD`/`PREAUTH`/`BYE` are split apart
//! - **LITERAL+**: optional `{n+}` literal announcements (RFC 7888)
//! - **Precise errors**: every error carries the character offset where
//!   parsing stopped
//!
//! The parser does not know what the attributes of a given command mean; it
//! only exposes their syntax for the calling code to interpret.
//!
//! ## Quick Start
//!
//! ```
//! use imap_handler::{Attribute, Options, parse};
//!
//! let response = parse("A1 OK [READ-WRITE] SELECT completed", Options::default())?;
//!
//! assert_eq!(response.tag, "A1");
//! assert_eq!(response.command, "OK");
//! assert_eq!(
//!     response.response_code(),
//!     Some(&[Attribute::atom("READ-WRITE")][..])
//! );
//! assert_eq!(response.human_readable(), Some("SELECT completed"));
//! # Ok::<(), imap_handler::Error>(())
//! ```
//!
//! ## Modules
//!
//! - [`parser`]: the response line parser
//! - [`syntax`]: IMAP formal syntax character classes
//! - [`types`]: parsed response and attribute types

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
mod options;
pub mod parser;
pub mod syntax;
pub mod types;

pub use error::{Error, Result};
pub use options::Options;
pub use parser::{ResponseParser, parse};
pub use types::{Attribute, Partial, Response};
