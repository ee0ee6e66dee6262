use std::io::{Read, Seek};

use crate::machine;
use crate::machine_helper::MachineHelper;
use crate::reader::{Position, ReadError, Readable, Utf8Reader};
use crate::utils::{control_pat, noncharacter_pat, ControlToken};
use crate::{DefaultEmitter, Emitter, EntityTable, Error, State};

/// An HTML tokenizer. See crate-level docs for basic usage.
///
/// The tokenizer is a pull pipeline: iterating over it drives the state
/// machine, which in turn pulls code points out of the reader. The stream
/// always terminates with the emitter's end-of-file token, exactly once, even
/// when the input is undecodable (that case additionally reports
/// [`Error::MalformedInput`]).
pub struct Tokenizer<S: Read + Seek, E: Emitter = DefaultEmitter, N: EntityTable = ()> {
    eof: bool,
    pub(crate) emitter: E,
    pub(crate) reader: Utf8Reader<S>,
    pub(crate) machine_helper: MachineHelper,
    pub(crate) entities: N,
    /// High-water mark of validated code points. Reconsumed code points sit
    /// below it and are not validated twice.
    chars_validated: u64,
}

impl<S: Read + Seek> Tokenizer<S> {
    /// Create a new tokenizer from some input.
    ///
    /// `input` can be a string, a byte slice or a [`std::fs::File`], as those
    /// are the types for which [`crate::Readable`] is implemented. Any other
    /// `Read + Seek` byte source works through [`Utf8Reader::new`] and
    /// [`Tokenizer::from_reader`].
    ///
    /// Named character references do not resolve until a table is supplied
    /// with [`Tokenizer::with_entities`].
    pub fn new<'a, I: Readable<'a, Source = S>>(input: I) -> Self {
        Tokenizer::new_with_emitter(input, DefaultEmitter::default())
    }
}

impl<S: Read + Seek, E: Emitter> Tokenizer<S, E> {
    /// Construct a new tokenizer from some input and a custom emitter.
    ///
    /// Use this method over [`Tokenizer::new`] when you want to have more
    /// control over string allocation for tokens, or to install an error sink
    /// on a [`DefaultEmitter`].
    pub fn new_with_emitter<'a, I: Readable<'a, Source = S>>(input: I, emitter: E) -> Self {
        Tokenizer::from_reader(Utf8Reader::new(input.to_source()), emitter)
    }

    /// Construct a new tokenizer from an already-built reader.
    pub fn from_reader(reader: Utf8Reader<S>, emitter: E) -> Self {
        Tokenizer {
            eof: false,
            emitter,
            reader,
            machine_helper: MachineHelper::default(),
            entities: (),
            chars_validated: 0,
        }
    }
}

impl<S: Read + Seek, E: Emitter, N: EntityTable> Tokenizer<S, E, N> {
    /// Swap in a named character reference table.
    ///
    /// Without one, `&amp;` and friends are passed through as text (and
    /// reported as [`Error::UnknownNamedCharacterReference`] where WHATWG
    /// requires it).
    pub fn with_entities<N2: EntityTable>(self, entities: N2) -> Tokenizer<S, E, N2> {
        Tokenizer {
            eof: self.eof,
            emitter: self.emitter,
            reader: self.reader,
            machine_helper: self.machine_helper,
            entities,
            chars_validated: self.chars_validated,
        }
    }

    /// Switch the tokenizer to one of the externally reachable states.
    ///
    /// The correct state after a start tag depends on the tag name and on
    /// tree construction; see [`crate::naive_next_state`].
    pub fn set_state(&mut self, state: State) {
        self.machine_helper.switch_to(state.into());
    }

    /// Set the statemachine to start/continue in [plaintext
    /// state](https://html.spec.whatwg.org/#plaintext-state).
    ///
    /// This tokenizer never gets into that state naturally.
    pub fn set_plaintext_state(&mut self) {
        self.set_state(State::PlainText);
    }

    /// Override the name of the most recently emitted start tag, which the
    /// "appropriate end tag" check compares against.
    ///
    /// Useful for fragment parsing and for testing.
    pub fn set_last_start_tag(&mut self, last_start_tag: Option<&str>) {
        self.emitter.set_last_start_tag(last_start_tag);
    }

    /// The reader position after the most recently consumed code point, for
    /// diagnostics.
    pub fn position(&self) -> Position {
        self.reader.position()
    }

    /// Access the emitter.
    pub fn emitter_mut(&mut self) -> &mut E {
        &mut self.emitter
    }

    /// Read one code point, validating freshly decoded ones.
    pub(crate) fn read_char(&mut self) -> Result<Option<char>, ReadError> {
        let c = self.reader.read()?;
        if let Some(c) = c {
            if self.reader.chars_consumed() > self.chars_validated {
                self.chars_validated = self.reader.chars_consumed();
                self.validate_char(c);
            }
        }
        Ok(c)
    }

    /// Input-stream preprocessing errors. Surrogates cannot occur here; the
    /// reader's strict UTF-8 decoding already rejects them.
    fn validate_char(&mut self, c: char) {
        match c as u32 {
            noncharacter_pat!() => {
                self.emitter.emit_error(Error::NoncharacterInInputStream);
            }
            x @ control_pat!()
                if !matches!(x, 0x0000 | 0x0009 | 0x000a | 0x000c | 0x000d | 0x0020) =>
            {
                self.emitter
                    .emit_error(Error::ControlCharacterInInputStream);
            }
            _ => (),
        }
    }

    /// Consume the given string if and only if it comes next in the input.
    ///
    /// Implemented with the reader's fixed-length lookahead so that a failed
    /// match leaves the position untouched.
    pub(crate) fn try_read_string(
        &mut self,
        s: &str,
        case_sensitive: bool,
    ) -> Result<bool, ReadError> {
        debug_assert!(!s.is_empty());
        debug_assert!(!s.contains('\r') && !s.contains('\n'));

        let mut buf = ['\0'; 8];
        let needed = s.len();
        debug_assert!(s.is_ascii() && needed <= buf.len());
        if self.reader.peek_into(&mut buf[..needed])? < needed {
            return Ok(false);
        }
        let matched = s
            .chars()
            .zip(buf[..needed].iter())
            .all(|(expected, actual)| {
                expected == *actual || (!case_sensitive && expected.eq_ignore_ascii_case(actual))
            });
        if matched {
            for _ in 0..needed {
                let _ = self.read_char()?;
            }
        }
        Ok(matched)
    }
}

impl<S: Read + Seek, E: Emitter, N: EntityTable> Iterator for Tokenizer<S, E, N> {
    type Item = E::Token;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.emitter.pop_token() {
                break Some(token);
            } else if !self.eof {
                match machine::consume(self) {
                    Ok(ControlToken::Continue) => (),
                    Ok(ControlToken::Eof) => {
                        self.eof = true;
                        self.emitter.emit_eof();
                    }
                    Err(e) => {
                        // undecodable input ends tokenization; the stream
                        // still terminates with the end-of-file token
                        log::debug!("tokenization aborted: {}", e);
                        self.emitter.emit_error(Error::MalformedInput);
                        self.eof = true;
                        self.emitter.emit_eof();
                    }
                }
            } else {
                break None;
            }
        }
    }
}
