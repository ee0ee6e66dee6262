//! Runs the html5lib-format fixture files under `tests/fixtures/`.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::rc::Rc;

use chevron::{DefaultEmitter, Error, State, Token, Tokenizer};
use pretty_assertions::assert_eq;
use serde::{de::Error as _, Deserialize};

/// The fixtures only use references from this table; real embedders supply
/// the full WHATWG table.
const ENTITIES: &[(&str, &str)] = &[
    ("amp", "&"),
    ("amp;", "&"),
    ("gt", ">"),
    ("gt;", ">"),
    ("lt", "<"),
    ("lt;", "<"),
    ("not", "\u{ac}"),
    ("notin;", "\u{2209}"),
    ("quot", "\""),
    ("quot;", "\""),
];

#[derive(Debug, Eq, PartialEq)]
enum TestToken {
    Doctype {
        name: Option<String>,
        public_identifier: Option<String>,
        system_identifier: Option<String>,
        force_quirks: bool,
    },
    StartTag {
        name: String,
        attributes: BTreeMap<String, String>,
        self_closing: bool,
    },
    EndTag {
        name: String,
    },
    Comment(String),
    Characters(String),
}

struct ExpectedOutputTokens(Vec<TestToken>);

impl<'de> Deserialize<'de> for ExpectedOutputTokens {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // this macro is a horrible way to define a type that deserializes only from a particular
        // string. Together with serde(untagged) this gives us really flexible enum tagging with really
        // terrible error messages.
        macro_rules! def_const {
            ($str:expr, $ty:ident) => {
                #[derive(Deserialize)]
                enum $ty {
                    #[serde(rename = $str)]
                    $ty,
                }
            };
        }

        def_const!("DOCTYPE", DoctypeConst);
        def_const!("StartTag", StartTagConst);
        def_const!("EndTag", EndTagConst);
        def_const!("Comment", CommentConst);
        def_const!("Character", CharacterConst);

        type Attributes = BTreeMap<String, String>;

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OutputToken {
            // "DOCTYPE", name, public_id, system_id, correctness
            Doctype(
                DoctypeConst,
                Option<String>,
                Option<String>,
                Option<String>,
                bool,
            ),
            // "StartTag", name, attributes, self_closing
            StartTag(StartTagConst, String, Attributes),
            StartTag2(StartTagConst, String, Attributes, bool),
            // "EndTag", name
            EndTag(EndTagConst, String),
            // "Comment", data
            Comment(CommentConst, String),
            // "Character", data
            Character(CharacterConst, String),
        }

        Ok(ExpectedOutputTokens(
            Vec::deserialize(deserializer)?
                .into_iter()
                .map(|output_token| match output_token {
                    OutputToken::Doctype(
                        _,
                        name,
                        public_identifier,
                        system_identifier,
                        correctness,
                    ) => TestToken::Doctype {
                        name,
                        public_identifier,
                        system_identifier,
                        force_quirks: !correctness,
                    },
                    OutputToken::StartTag(_, name, attributes) => TestToken::StartTag {
                        name,
                        attributes,
                        self_closing: false,
                    },
                    OutputToken::StartTag2(_, name, attributes, self_closing) => {
                        TestToken::StartTag {
                            name,
                            attributes,
                            self_closing,
                        }
                    }
                    OutputToken::EndTag(_, name) => TestToken::EndTag { name },
                    OutputToken::Comment(_, data) => TestToken::Comment(data),
                    OutputToken::Character(_, data) => TestToken::Characters(data),
                })
                .collect::<Vec<TestToken>>(),
        ))
    }
}

struct InitialState(State);

impl<'de> Deserialize<'de> for InitialState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        enum RawInitialState {
            #[serde(rename = "Data state")]
            Data,
            #[serde(rename = "PLAINTEXT state")]
            PlainText,
            #[serde(rename = "RCDATA state")]
            RcData,
            #[serde(rename = "RAWTEXT state")]
            RawText,
            #[serde(rename = "Script data state")]
            ScriptData,
            #[serde(rename = "CDATA section state")]
            CdataSection,
        }

        Ok(Self(match RawInitialState::deserialize(deserializer)? {
            RawInitialState::Data => State::Data,
            RawInitialState::PlainText => State::PlainText,
            RawInitialState::RcData => State::RcData,
            RawInitialState::RawText => State::RawText,
            RawInitialState::ScriptData => State::ScriptData,
            RawInitialState::CdataSection => State::CdataSection,
        }))
    }
}

fn initial_states_default() -> Vec<InitialState> {
    vec![InitialState(State::Data)]
}

#[derive(Debug, Eq, PartialEq)]
struct ParseErrorInner(Error);

impl<'de> Deserialize<'de> for ParseErrorInner {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let str_err = String::deserialize(deserializer)?;
        let err: Error = str_err
            .parse()
            .map_err(|_| D::Error::custom(format!("failed to deserialize error: {}", str_err)))?;
        Ok(ParseErrorInner(err))
    }
}

#[derive(Deserialize, Debug, Eq, PartialEq)]
struct ParseError {
    code: ParseErrorInner,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Test {
    description: String,
    input: String,
    output: ExpectedOutputTokens,
    #[serde(default = "initial_states_default")]
    initial_states: Vec<InitialState>,
    #[serde(default)]
    last_start_tag: Option<String>,
    #[serde(default)]
    errors: Vec<ParseError>,
}

#[derive(Deserialize)]
struct Tests {
    tests: Vec<Test>,
}

#[test]
fn fixture_files() {
    let mut ran = 0;
    for entry in glob::glob("tests/fixtures/*.test").unwrap() {
        let path = entry.unwrap();
        let fname = path.file_name().unwrap().to_str().unwrap().to_owned();
        let f = File::open(&path).unwrap();
        let tests: Tests = serde_json::from_reader(BufReader::new(f)).unwrap();

        for (i, test) in tests.tests.into_iter().enumerate() {
            run_test(&fname, i, test);
            ran += 1;
        }
    }
    assert!(ran > 0, "no fixture files found");
}

fn run_test(fname: &str, test_i: usize, test: Test) {
    for state in &test.initial_states {
        println!(
            "==== FILE {}, TEST {} ({}), STATE {:?} ====",
            fname, test_i, test.description, state.0
        );

        let errors = Rc::new(RefCell::new(Vec::new()));
        let sink = {
            let errors = Rc::clone(&errors);
            move |error: Error| errors.borrow_mut().push(ParseError {
                code: ParseErrorInner(error),
            })
        };

        let mut tokenizer = Tokenizer::new_with_emitter(
            test.input.as_str(),
            DefaultEmitter::new().with_error_sink(sink),
        )
        .with_entities(ENTITIES);
        tokenizer.set_state(state.0);
        tokenizer.set_last_start_tag(test.last_start_tag.as_deref());

        let mut actual_tokens = Vec::new();
        let mut saw_eof = false;

        for token in tokenizer {
            assert!(!saw_eof, "tokens after EndOfFile");
            match token {
                Token::EndOfFile => saw_eof = true,
                Token::Character(c) => match actual_tokens.last_mut() {
                    Some(TestToken::Characters(data)) => data.push(c),
                    _ => actual_tokens.push(TestToken::Characters(c.to_string())),
                },
                Token::StartTag(tag) => actual_tokens.push(TestToken::StartTag {
                    name: tag.name.clone(),
                    attributes: tag
                        .attributes
                        .iter()
                        .map(|attribute| (attribute.name.clone(), attribute.value.clone()))
                        .collect(),
                    self_closing: tag.self_closing,
                }),
                Token::EndTag(tag) => actual_tokens.push(TestToken::EndTag { name: tag.name }),
                Token::Comment(data) => actual_tokens.push(TestToken::Comment(data)),
                Token::Doctype(doctype) => actual_tokens.push(TestToken::Doctype {
                    name: doctype.name,
                    public_identifier: doctype.public_identifier,
                    system_identifier: doctype.system_identifier,
                    force_quirks: doctype.force_quirks,
                }),
            }
        }

        assert!(saw_eof, "missing EndOfFile token");
        assert_eq!(test.output.0, actual_tokens);
        assert_eq!(test.errors, *errors.borrow());
    }
}
