use std::collections::BTreeSet;
use std::collections::VecDeque;
use std::fmt::{Debug, Formatter};

use crate::emitter::naive_next_state;
use crate::{Emitter, Error, State};

/// An HTML attribute with its source-ordered position preserved.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Attribute {
    /// The attribute name, lowercased during tokenization.
    pub name: String,
    /// The attribute value. Empty if the attribute had none.
    pub value: String,
}

/// An HTML start/open tag, such as `<p>` or `<a>`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StartTag {
    /// Whether this tag is self-closing. If it is self-closing, no following [`EndTag`] should be
    /// expected.
    pub self_closing: bool,

    /// The start tag's name, such as `"p"` or `"a"`.
    pub name: String,

    /// The tag's attributes, in source order.
    ///
    /// Duplicate attributes are dropped after the first one as per WHATWG spec; a
    /// [`crate::Error::DuplicateAttribute`] error is reported for each dropped duplicate.
    pub attributes: Vec<Attribute>,
}

impl StartTag {
    /// The value of the first attribute with the given name, if any.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name == name)
            .map(|attribute| attribute.value.as_str())
    }
}

/// An HTML end/close tag, such as `</p>` or `</a>`.
///
/// An emitted end tag never carries attributes or a self-closing flag; when the source contains
/// them the tokenizer reports [`crate::Error::EndTagWithAttributes`] or
/// [`crate::Error::EndTagWithTrailingSolidus`] and discards them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EndTag {
    /// The ending tag's name, such as `"p"` or `"a"`.
    pub name: String,
}

/// A doctype. Some examples:
///
/// * `<!DOCTYPE {name}>`
/// * `<!DOCTYPE {name} PUBLIC '{public_identifier}'>`
/// * `<!DOCTYPE {name} SYSTEM '{system_identifier}'>`
/// * `<!DOCTYPE {name} PUBLIC '{public_identifier}' '{system_identifier}'>`
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Doctype {
    /// The ["force quirks"](https://html.spec.whatwg.org/#force-quirks-flag) flag.
    pub force_quirks: bool,

    /// The doctype's name, lowercased. `None` when the doctype has no name, which is distinct
    /// from an empty one.
    pub name: Option<String>,

    /// The doctype's public identifier. `None` when missing, `Some("")` when present but empty.
    pub public_identifier: Option<String>,

    /// The doctype's system identifier. `None` when missing, `Some("")` when present but empty.
    pub system_identifier: Option<String>,
}

/// The token type used by default. You can define your own token type by implementing the
/// [`crate::Emitter`] trait and using [`crate::Tokenizer::new_with_emitter`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Token {
    /// One character of text.
    Character(char),
    /// An HTML start tag.
    StartTag(StartTag),
    /// An HTML end tag.
    EndTag(EndTag),
    /// An HTML comment.
    Comment(String),
    /// An HTML doctype declaration.
    Doctype(Doctype),
    /// The end of the input. Yielded exactly once, as the last token.
    EndOfFile,
}

/// The default implementation of [`crate::Emitter`], used to produce ("emit") tokens.
///
/// Parse errors do not appear in the token stream; they are forwarded to an optional sink
/// closure installed with [`DefaultEmitter::with_error_sink`] and are otherwise discarded.
#[derive(Default)]
pub struct DefaultEmitter {
    current_token: Option<Token>,
    last_start_tag: String,
    current_attribute: Option<Attribute>,
    seen_attributes: BTreeSet<String>,
    emitted_tokens: VecDeque<Token>,
    error_sink: Option<Box<dyn FnMut(Error)>>,
    switch_states: bool,
    cdata_allowed: bool,
}

impl Debug for DefaultEmitter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultEmitter")
            .field("current_token", &self.current_token)
            .field("last_start_tag", &self.last_start_tag)
            .field("current_attribute", &self.current_attribute)
            .field("emitted_tokens", &self.emitted_tokens)
            .field("has_error_sink", &self.error_sink.is_some())
            .field("switch_states", &self.switch_states)
            .field("cdata_allowed", &self.cdata_allowed)
            .finish()
    }
}

impl DefaultEmitter {
    /// Create a new emitter that discards parse errors.
    pub fn new() -> Self {
        DefaultEmitter::default()
    }

    /// Install a sink that every parse error is reported to, in the order the errors are
    /// discovered.
    pub fn with_error_sink(mut self, sink: impl FnMut(Error) + 'static) -> Self {
        self.error_sink = Some(Box::new(sink));
        self
    }

    /// Whether to use [`naive_next_state`] to switch states automatically after a start tag.
    ///
    /// The default is off.
    pub fn switch_states(&mut self, yes: bool) {
        self.switch_states = yes;
    }

    /// Whether `<![CDATA[` opens a real CDATA section.
    ///
    /// This stands in for the adjusted-current-node check of a tree builder. The default is
    /// false: CDATA sections in HTML content are tokenized as bogus comments.
    pub fn set_cdata_allowed(&mut self, yes: bool) {
        self.cdata_allowed = yes;
    }

    fn emit_token(&mut self, token: Token) {
        self.emitted_tokens.push_back(token);
    }

    fn flush_current_attribute(&mut self) {
        if let Some(attribute) = self.current_attribute.take() {
            match self.current_token {
                Some(Token::StartTag(ref mut tag)) => {
                    if tag
                        .attributes
                        .iter()
                        .any(|existing| existing.name == attribute.name)
                    {
                        self.emit_error(Error::DuplicateAttribute);
                    } else {
                        tag.attributes.push(attribute);
                    }
                }
                Some(Token::EndTag(_)) => {
                    if !self.seen_attributes.insert(attribute.name) {
                        self.emit_error(Error::DuplicateAttribute);
                    }
                }
                _ => {
                    debug_assert!(false);
                }
            }
        }
    }
}

impl Emitter for DefaultEmitter {
    type Token = Token;

    fn set_last_start_tag(&mut self, last_start_tag: Option<&str>) {
        self.last_start_tag.clear();
        self.last_start_tag.push_str(last_start_tag.unwrap_or_default());
    }

    fn emit_eof(&mut self) {
        self.emit_token(Token::EndOfFile);
    }

    fn emit_error(&mut self, error: Error) {
        if let Some(sink) = &mut self.error_sink {
            sink(error);
        }
    }

    fn pop_token(&mut self) -> Option<Self::Token> {
        self.emitted_tokens.pop_front()
    }

    fn emit_string(&mut self, s: &str) {
        self.emitted_tokens.extend(s.chars().map(Token::Character));
    }

    fn init_start_tag(&mut self) {
        self.current_token = Some(Token::StartTag(StartTag::default()));
    }

    fn init_end_tag(&mut self) {
        self.current_token = Some(Token::EndTag(EndTag::default()));
        self.seen_attributes.clear();
    }

    fn init_comment(&mut self) {
        self.current_token = Some(Token::Comment(String::new()));
    }

    fn emit_current_tag(&mut self) -> Option<State> {
        self.flush_current_attribute();
        let mut token = self.current_token.take().unwrap();
        match token {
            Token::EndTag(_) => {
                if !self.seen_attributes.is_empty() {
                    self.emit_error(Error::EndTagWithAttributes);
                }
                self.seen_attributes.clear();
                self.set_last_start_tag(None);
            }
            Token::StartTag(ref mut tag) => {
                self.set_last_start_tag(Some(&tag.name));
            }
            _ => debug_assert!(false),
        }
        self.emit_token(token);
        if self.switch_states {
            naive_next_state(&self.last_start_tag)
        } else {
            None
        }
    }

    fn emit_current_comment(&mut self) {
        let comment = self.current_token.take().unwrap();
        debug_assert!(matches!(comment, Token::Comment(_)));
        self.emit_token(comment);
    }

    fn emit_current_doctype(&mut self) {
        let doctype = self.current_token.take().unwrap();
        debug_assert!(matches!(doctype, Token::Doctype(_)));
        self.emit_token(doctype);
    }

    fn set_self_closing(&mut self) {
        let tag = self.current_token.as_mut().unwrap();
        match tag {
            Token::StartTag(StartTag {
                ref mut self_closing,
                ..
            }) => {
                *self_closing = true;
            }
            Token::EndTag(_) => {
                self.emit_error(Error::EndTagWithTrailingSolidus);
            }
            _ => {
                debug_assert!(false);
            }
        }
    }

    fn set_force_quirks(&mut self) {
        match self.current_token {
            Some(Token::Doctype(ref mut doctype)) => doctype.force_quirks = true,
            _ => debug_assert!(false),
        }
    }

    fn push_tag_name(&mut self, s: &str) {
        match self.current_token {
            Some(
                Token::StartTag(StartTag { ref mut name, .. })
                | Token::EndTag(EndTag { ref mut name, .. }),
            ) => {
                name.push_str(s);
            }
            _ => debug_assert!(false),
        }
    }

    fn push_comment(&mut self, s: &str) {
        match self.current_token {
            Some(Token::Comment(ref mut data)) => data.push_str(s),
            _ => debug_assert!(false),
        }
    }

    fn push_doctype_name(&mut self, s: &str) {
        match self.current_token {
            Some(Token::Doctype(ref mut doctype)) => {
                doctype.name.get_or_insert_with(String::new).push_str(s);
            }
            _ => debug_assert!(false),
        }
    }

    fn init_doctype(&mut self) {
        self.current_token = Some(Token::Doctype(Doctype::default()));
    }

    fn init_attribute(&mut self) {
        self.flush_current_attribute();
        self.current_attribute = Some(Attribute::default());
    }

    fn push_attribute_name(&mut self, s: &str) {
        self.current_attribute.as_mut().unwrap().name.push_str(s);
    }

    fn push_attribute_value(&mut self, s: &str) {
        self.current_attribute.as_mut().unwrap().value.push_str(s);
    }

    fn set_doctype_public_identifier(&mut self, value: &str) {
        if let Some(Token::Doctype(Doctype {
            ref mut public_identifier,
            ..
        })) = self.current_token
        {
            *public_identifier = Some(value.to_owned());
        } else {
            debug_assert!(false);
        }
    }

    fn set_doctype_system_identifier(&mut self, value: &str) {
        if let Some(Token::Doctype(Doctype {
            ref mut system_identifier,
            ..
        })) = self.current_token
        {
            *system_identifier = Some(value.to_owned());
        } else {
            debug_assert!(false);
        }
    }

    fn push_doctype_public_identifier(&mut self, s: &str) {
        if let Some(Token::Doctype(Doctype {
            public_identifier: Some(ref mut id),
            ..
        })) = self.current_token
        {
            id.push_str(s);
        } else {
            debug_assert!(false);
        }
    }

    fn push_doctype_system_identifier(&mut self, s: &str) {
        if let Some(Token::Doctype(Doctype {
            system_identifier: Some(ref mut id),
            ..
        })) = self.current_token
        {
            id.push_str(s);
        } else {
            debug_assert!(false);
        }
    }

    fn current_is_appropriate_end_tag_token(&mut self) -> bool {
        match self.current_token {
            Some(Token::EndTag(ref tag)) => {
                !self.last_start_tag.is_empty() && self.last_start_tag == tag.name
            }
            _ => false,
        }
    }

    fn adjusted_current_node_present_but_not_in_html_namespace(&mut self) -> bool {
        self.cdata_allowed
    }
}

#[test]
fn first_attribute_wins() {
    let mut emitter = DefaultEmitter::new();
    emitter.init_start_tag();
    emitter.push_tag_name("div");
    emitter.init_attribute();
    emitter.push_attribute_name("a");
    emitter.push_attribute_value("1");
    emitter.init_attribute();
    emitter.push_attribute_name("a");
    emitter.push_attribute_value("2");
    let _ = emitter.emit_current_tag();
    match emitter.pop_token() {
        Some(Token::StartTag(tag)) => {
            assert_eq!(tag.attribute("a"), Some("1"));
            assert_eq!(tag.attributes.len(), 1);
        }
        other => panic!("unexpected token: {:?}", other),
    }
}
