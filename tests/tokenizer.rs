//! End-to-end scenarios driven through the public API.

use std::cell::RefCell;
use std::rc::Rc;

use chevron::{
    Attribute, DefaultEmitter, Doctype, EndTag, Error, StartTag, Token, Tokenizer,
};
use pretty_assertions::assert_eq;

const ENTITIES: &[(&str, &str)] = &[("amp", "&"), ("amp;", "&")];

fn collect(input: &str) -> (Vec<Token>, Vec<Error>) {
    let errors = Rc::new(RefCell::new(Vec::new()));
    let sink = {
        let errors = Rc::clone(&errors);
        move |error: Error| errors.borrow_mut().push(error)
    };
    let tokenizer = Tokenizer::new_with_emitter(input, DefaultEmitter::new().with_error_sink(sink))
        .with_entities(ENTITIES);
    let tokens = tokenizer.collect();
    let errors = errors.borrow().clone();
    (tokens, errors)
}

#[test]
fn simple_element() {
    let (tokens, errors) = collect("<p>hi</p>");
    assert_eq!(
        tokens,
        vec![
            Token::StartTag(StartTag {
                name: "p".into(),
                ..StartTag::default()
            }),
            Token::Character('h'),
            Token::Character('i'),
            Token::EndTag(EndTag { name: "p".into() }),
            Token::EndOfFile,
        ]
    );
    assert_eq!(errors, vec![]);
}

#[test]
fn names_are_lowercased() {
    let (tokens, errors) = collect("<P CLASS=\"a\">x");
    assert_eq!(
        tokens,
        vec![
            Token::StartTag(StartTag {
                name: "p".into(),
                attributes: vec![Attribute {
                    name: "class".into(),
                    value: "a".into(),
                }],
                self_closing: false,
            }),
            Token::Character('x'),
            Token::EndOfFile,
        ]
    );
    assert_eq!(errors, vec![]);
}

#[test]
fn self_closing_tag() {
    let (tokens, errors) = collect("<br/>");
    assert_eq!(
        tokens,
        vec![
            Token::StartTag(StartTag {
                name: "br".into(),
                self_closing: true,
                ..StartTag::default()
            }),
            Token::EndOfFile,
        ]
    );
    assert_eq!(errors, vec![]);
}

#[test]
fn comment() {
    let (tokens, errors) = collect("<!--a-->");
    assert_eq!(
        tokens,
        vec![Token::Comment("a".into()), Token::EndOfFile]
    );
    assert_eq!(errors, vec![]);
}

#[test]
fn duplicate_attributes_keep_the_first() {
    let (tokens, errors) = collect("<div a=1 a=2>");
    assert_eq!(
        tokens,
        vec![
            Token::StartTag(StartTag {
                name: "div".into(),
                attributes: vec![Attribute {
                    name: "a".into(),
                    value: "1".into(),
                }],
                self_closing: false,
            }),
            Token::EndOfFile,
        ]
    );
    assert_eq!(errors, vec![Error::DuplicateAttribute]);
}

#[test]
fn named_reference() {
    let (tokens, errors) = collect("a&amp;b");
    assert_eq!(
        tokens,
        vec![
            Token::Character('a'),
            Token::Character('&'),
            Token::Character('b'),
            Token::EndOfFile,
        ]
    );
    assert_eq!(errors, vec![]);
}

#[test]
fn doctype() {
    let (tokens, errors) = collect("<!DOCTYPE html>");
    assert_eq!(
        tokens,
        vec![
            Token::Doctype(Doctype {
                name: Some("html".into()),
                ..Doctype::default()
            }),
            Token::EndOfFile,
        ]
    );
    assert_eq!(errors, vec![]);
}

#[test]
fn null_after_tag_open_goes_through_data_state() {
    let (tokens, errors) = collect("<\0>");
    assert_eq!(
        tokens,
        vec![
            Token::Character('<'),
            Token::Character('\0'),
            Token::Character('>'),
            Token::EndOfFile,
        ]
    );
    assert_eq!(
        errors,
        vec![
            Error::InvalidFirstCharacterOfTagName,
            Error::UnexpectedNullCharacter,
        ]
    );
}

#[test]
fn end_of_file_token_comes_exactly_once_and_last() {
    for input in ["", "x", "<p>", "<!--", "<p", "&"] {
        let (tokens, _) = collect(input);
        assert_eq!(
            tokens
                .iter()
                .filter(|token| matches!(token, Token::EndOfFile))
                .count(),
            1,
            "input: {:?}",
            input
        );
        assert_eq!(tokens.last(), Some(&Token::EndOfFile), "input: {:?}", input);
    }
}

#[test]
fn malformed_input_terminates_the_stream() {
    let errors = Rc::new(RefCell::new(Vec::new()));
    let sink = {
        let errors = Rc::clone(&errors);
        move |error: Error| errors.borrow_mut().push(error)
    };
    let input: &[u8] = b"ab\xc0\xafcd";
    let tokenizer = Tokenizer::new_with_emitter(input, DefaultEmitter::new().with_error_sink(sink));
    let tokens: Vec<Token> = tokenizer.collect();
    assert_eq!(
        tokens,
        vec![
            Token::Character('a'),
            Token::Character('b'),
            Token::EndOfFile,
        ]
    );
    assert_eq!(*errors.borrow(), vec![Error::MalformedInput]);
}

#[test]
fn cdata_section_with_predicate() {
    let mut emitter = DefaultEmitter::new();
    emitter.set_cdata_allowed(true);
    let tokens: Vec<Token> = Tokenizer::new_with_emitter("<![CDATA[x]]>", emitter).collect();
    assert_eq!(
        tokens,
        vec![Token::Character('x'), Token::EndOfFile]
    );
}

#[test]
fn state_switching_via_emitter() {
    let mut emitter = DefaultEmitter::new();
    emitter.switch_states(true);
    let tokens: Vec<Token> =
        Tokenizer::new_with_emitter("<script>a<b</script>x", emitter).collect();
    assert_eq!(
        tokens,
        vec![
            Token::StartTag(StartTag {
                name: "script".into(),
                ..StartTag::default()
            }),
            Token::Character('a'),
            Token::Character('<'),
            Token::Character('b'),
            Token::EndTag(EndTag {
                name: "script".into()
            }),
            Token::Character('x'),
            Token::EndOfFile,
        ]
    );
}

#[test]
fn plaintext_state_never_ends() {
    let mut tokenizer = Tokenizer::new("a</b>");
    tokenizer.set_plaintext_state();
    let text: String = tokenizer
        .filter_map(|token| match token {
            Token::Character(c) => Some(c),
            _ => None,
        })
        .collect();
    assert_eq!(text, "a</b>");
}

#[test]
fn carriage_returns_are_normalized() {
    let (tokens, errors) = collect("a\r\nb\rc");
    assert_eq!(
        tokens,
        vec![
            Token::Character('a'),
            Token::Character('\n'),
            Token::Character('b'),
            Token::Character('\n'),
            Token::Character('c'),
            Token::EndOfFile,
        ]
    );
    assert_eq!(errors, vec![]);
}

#[test]
fn position_tracks_lines() {
    let mut tokenizer = Tokenizer::new("ab\ncd");
    assert_eq!(tokenizer.position().line, 1);
    while tokenizer.next().is_some() {}
    let position = tokenizer.position();
    assert_eq!(position.line, 2);
    assert_eq!(position.character, 2);
}

#[test]
fn control_characters_in_input_are_reported_once() {
    let (tokens, errors) = collect("a\u{1}b");
    assert_eq!(
        tokens,
        vec![
            Token::Character('a'),
            Token::Character('\u{1}'),
            Token::Character('b'),
            Token::EndOfFile,
        ]
    );
    assert_eq!(errors, vec![Error::ControlCharacterInInputStream]);
}

#[test]
fn attribute_lookup_prefers_the_first() {
    let (tokens, _) = collect("<a x=1 y=2>");
    match &tokens[0] {
        Token::StartTag(tag) => {
            assert_eq!(tag.attribute("x"), Some("1"));
            assert_eq!(tag.attribute("y"), Some("2"));
            assert_eq!(tag.attribute("z"), None);
        }
        other => panic!("unexpected token: {:?}", other),
    }
}
