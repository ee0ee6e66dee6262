#![deny(missing_docs)]
// This is an HTML parser. HTML can be untrusted input from the internet.
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod default_emitter;
mod emitter;
mod entities;
mod error;
mod machine;
mod machine_helper;
mod reader;
mod state;
mod tokenizer;
mod utils;

pub use default_emitter::{Attribute, DefaultEmitter, Doctype, EndTag, StartTag, Token};
pub use emitter::{naive_next_state, Emitter};
pub use entities::EntityTable;
pub use error::Error;
pub use reader::{Position, ReadError, Readable, SeekOrigin, Utf8Reader};
pub use state::State;
pub use tokenizer::Tokenizer;
