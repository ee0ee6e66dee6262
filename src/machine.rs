use std::io::{Read, Seek};

use crate::machine_helper::{
    cont, emit_current_tag_and_switch_to, enter_state, eof, exit_state, mutate_character_reference,
    reconsume_in, reconsume_in_return_state, switch_to,
};
use crate::reader::ReadError;
use crate::utils::{
    ascii_digit_pat, control_pat, ctostr, noncharacter_pat, surrogate_pat, whitespace_pat,
    ControlToken, MachineState as State,
};
use crate::{Emitter, EntityTable, Error, Tokenizer};

/// Consume one code point (or a short lookahead) in the current state.
///
/// Returning `ControlToken::Continue` means the caller should keep driving the
/// machine; `ControlToken::Eof` means the end of input was handled and the
/// emitter's end-of-file token is due.
pub(crate) fn consume<S: Read + Seek, E: Emitter, N: EntityTable>(
    slf: &mut Tokenizer<S, E, N>,
) -> Result<ControlToken, ReadError> {
    match slf.machine_helper.state {
        State::Data => match slf.read_char()? {
            Some('&') => enter_state!(slf, CharacterReference),
            Some('<') => switch_to!(slf, TagOpen),
            Some('\0') => {
                slf.emitter.emit_error(Error::UnexpectedNullCharacter);
                slf.emitter.emit_string("\0");
                cont!()
            }
            Some(x) => {
                slf.emitter.emit_string(ctostr!(x));
                cont!()
            }
            None => eof!(),
        },
        State::RcData => match slf.read_char()? {
            Some('&') => enter_state!(slf, CharacterReference),
            Some('<') => switch_to!(slf, RcDataLessThanSign),
            Some('\0') => {
                slf.emitter.emit_error(Error::UnexpectedNullCharacter);
                slf.emitter.emit_string("\u{fffd}");
                cont!()
            }
            Some(x) => {
                slf.emitter.emit_string(ctostr!(x));
                cont!()
            }
            None => eof!(),
        },
        State::RawText => match slf.read_char()? {
            Some('<') => switch_to!(slf, RawTextLessThanSign),
            Some('\0') => {
                slf.emitter.emit_error(Error::UnexpectedNullCharacter);
                slf.emitter.emit_string("\u{fffd}");
                cont!()
            }
            Some(x) => {
                slf.emitter.emit_string(ctostr!(x));
                cont!()
            }
            None => eof!(),
        },
        State::ScriptData => match slf.read_char()? {
            Some('<') => switch_to!(slf, ScriptDataLessThanSign),
            Some('\0') => {
                slf.emitter.emit_error(Error::UnexpectedNullCharacter);
                slf.emitter.emit_string("\u{fffd}");
                cont!()
            }
            Some(x) => {
                slf.emitter.emit_string(ctostr!(x));
                cont!()
            }
            None => eof!(),
        },
        State::PlainText => match slf.read_char()? {
            Some('\0') => {
                slf.emitter.emit_error(Error::UnexpectedNullCharacter);
                slf.emitter.emit_string("\u{fffd}");
                cont!()
            }
            Some(x) => {
                slf.emitter.emit_string(ctostr!(x));
                cont!()
            }
            None => eof!(),
        },
        State::TagOpen => match slf.read_char()? {
            Some('!') => switch_to!(slf, MarkupDeclarationOpen),
            Some('/') => switch_to!(slf, EndTagOpen),
            Some(x) if x.is_ascii_alphabetic() => {
                slf.emitter.init_start_tag();
                reconsume_in!(slf, Some(x), TagName)
            }
            c @ Some('?') => {
                slf.emitter
                    .emit_error(Error::UnexpectedQuestionMarkInsteadOfTagName);
                slf.emitter.init_comment();
                reconsume_in!(slf, c, BogusComment)
            }
            None => {
                slf.emitter.emit_error(Error::EofBeforeTagName);
                slf.emitter.emit_string("<");
                eof!()
            }
            c @ Some(_) => {
                slf.emitter
                    .emit_error(Error::InvalidFirstCharacterOfTagName);
                slf.emitter.emit_string("<");
                reconsume_in!(slf, c, Data)
            }
        },
        State::EndTagOpen => match slf.read_char()? {
            Some(x) if x.is_ascii_alphabetic() => {
                slf.emitter.init_end_tag();
                reconsume_in!(slf, Some(x), TagName)
            }
            Some('>') => {
                slf.emitter.emit_error(Error::MissingEndTagName);
                switch_to!(slf, Data)
            }
            None => {
                slf.emitter.emit_error(Error::EofBeforeTagName);
                slf.emitter.emit_string("</");
                eof!()
            }
            c @ Some(_) => {
                slf.emitter
                    .emit_error(Error::InvalidFirstCharacterOfTagName);
                slf.emitter.init_comment();
                reconsume_in!(slf, c, BogusComment)
            }
        },
        State::TagName => match slf.read_char()? {
            Some(whitespace_pat!()) => switch_to!(slf, BeforeAttributeName),
            Some('/') => switch_to!(slf, SelfClosingStartTag),
            Some('>') => emit_current_tag_and_switch_to!(slf, Data),
            Some('\0') => {
                slf.emitter.emit_error(Error::UnexpectedNullCharacter);
                slf.emitter.push_tag_name("\u{fffd}");
                cont!()
            }
            Some(x) => {
                slf.emitter.push_tag_name(ctostr!(x.to_ascii_lowercase()));
                cont!()
            }
            None => {
                slf.emitter.emit_error(Error::EofInTag);
                eof!()
            }
        },
        State::RcDataLessThanSign => match slf.read_char()? {
            Some('/') => {
                slf.machine_helper.temporary_buffer.clear();
                switch_to!(slf, RcDataEndTagOpen)
            }
            c => {
                slf.emitter.emit_string("<");
                reconsume_in!(slf, c, RcData)
            }
        },
        State::RcDataEndTagOpen => match slf.read_char()? {
            Some(x) if x.is_ascii_alphabetic() => {
                slf.emitter.init_end_tag();
                reconsume_in!(slf, Some(x), RcDataEndTagName)
            }
            c => {
                slf.emitter.emit_string("</");
                reconsume_in!(slf, c, RcData)
            }
        },
        State::RcDataEndTagName => match slf.read_char()? {
            Some(whitespace_pat!()) if slf.emitter.current_is_appropriate_end_tag_token() => {
                switch_to!(slf, BeforeAttributeName)
            }
            Some('/') if slf.emitter.current_is_appropriate_end_tag_token() => {
                switch_to!(slf, SelfClosingStartTag)
            }
            Some('>') if slf.emitter.current_is_appropriate_end_tag_token() => {
                emit_current_tag_and_switch_to!(slf, Data)
            }
            Some(x) if x.is_ascii_alphabetic() => {
                slf.emitter.push_tag_name(ctostr!(x.to_ascii_lowercase()));
                slf.machine_helper.temporary_buffer.push(x);
                cont!()
            }
            c => {
                slf.emitter.emit_string("</");
                slf.machine_helper
                    .flush_buffer_characters(&mut slf.emitter);
                reconsume_in!(slf, c, RcData)
            }
        },
        State::RawTextLessThanSign => match slf.read_char()? {
            Some('/') => {
                slf.machine_helper.temporary_buffer.clear();
                switch_to!(slf, RawTextEndTagOpen)
            }
            c => {
                slf.emitter.emit_string("<");
                reconsume_in!(slf, c, RawText)
            }
        },
        State::RawTextEndTagOpen => match slf.read_char()? {
            Some(x) if x.is_ascii_alphabetic() => {
                slf.emitter.init_end_tag();
                reconsume_in!(slf, Some(x), RawTextEndTagName)
            }
            c => {
                slf.emitter.emit_string("</");
                reconsume_in!(slf, c, RawText)
            }
        },
        State::RawTextEndTagName => match slf.read_char()? {
            Some(whitespace_pat!()) if slf.emitter.current_is_appropriate_end_tag_token() => {
                switch_to!(slf, BeforeAttributeName)
            }
            Some('/') if slf.emitter.current_is_appropriate_end_tag_token() => {
                switch_to!(slf, SelfClosingStartTag)
            }
            Some('>') if slf.emitter.current_is_appropriate_end_tag_token() => {
                emit_current_tag_and_switch_to!(slf, Data)
            }
            Some(x) if x.is_ascii_alphabetic() => {
                slf.emitter.push_tag_name(ctostr!(x.to_ascii_lowercase()));
                slf.machine_helper.temporary_buffer.push(x);
                cont!()
            }
            c => {
                slf.emitter.emit_string("</");
                slf.machine_helper
                    .flush_buffer_characters(&mut slf.emitter);
                reconsume_in!(slf, c, RawText)
            }
        },
        State::ScriptDataLessThanSign => match slf.read_char()? {
            Some('/') => {
                slf.machine_helper.temporary_buffer.clear();
                switch_to!(slf, ScriptDataEndTagOpen)
            }
            Some('!') => {
                slf.emitter.emit_string("<!");
                switch_to!(slf, ScriptDataEscapeStart)
            }
            c => {
                slf.emitter.emit_string("<");
                reconsume_in!(slf, c, ScriptData)
            }
        },
        State::ScriptDataEndTagOpen => match slf.read_char()? {
            Some(x) if x.is_ascii_alphabetic() => {
                slf.emitter.init_end_tag();
                reconsume_in!(slf, Some(x), ScriptDataEndTagName)
            }
            c => {
                slf.emitter.emit_string("</");
                reconsume_in!(slf, c, ScriptData)
            }
        },
        State::ScriptDataEndTagName => match slf.read_char()? {
            Some(whitespace_pat!()) if slf.emitter.current_is_appropriate_end_tag_token() => {
                switch_to!(slf, BeforeAttributeName)
            }
            Some('/') if slf.emitter.current_is_appropriate_end_tag_token() => {
                switch_to!(slf, SelfClosingStartTag)
            }
            Some('>') if slf.emitter.current_is_appropriate_end_tag_token() => {
                emit_current_tag_and_switch_to!(slf, Data)
            }
            Some(x) if x.is_ascii_alphabetic() => {
                slf.emitter.push_tag_name(ctostr!(x.to_ascii_lowercase()));
                slf.machine_helper.temporary_buffer.push(x);
                cont!()
            }
            c => {
                slf.emitter.emit_string("</");
                slf.machine_helper
                    .flush_buffer_characters(&mut slf.emitter);
                reconsume_in!(slf, c, ScriptData)
            }
        },
        State::ScriptDataEscapeStart => match slf.read_char()? {
            Some('-') => {
                slf.emitter.emit_string("-");
                switch_to!(slf, ScriptDataEscapeStartDash)
            }
            c => reconsume_in!(slf, c, ScriptData),
        },
        State::ScriptDataEscapeStartDash => match slf.read_char()? {
            Some('-') => {
                slf.emitter.emit_string("-");
                switch_to!(slf, ScriptDataEscapedDashDash)
            }
            c => reconsume_in!(slf, c, ScriptData),
        },
        State::ScriptDataEscaped => match slf.read_char()? {
            Some('-') => {
                slf.emitter.emit_string("-");
                switch_to!(slf, ScriptDataEscapedDash)
            }
            Some('<') => switch_to!(slf, ScriptDataEscapedLessThanSign),
            Some('\0') => {
                slf.emitter.emit_error(Error::UnexpectedNullCharacter);
                slf.emitter.emit_string("\u{fffd}");
                cont!()
            }
            None => {
                slf.emitter
                    .emit_error(Error::EofInScriptHtmlCommentLikeText);
                eof!()
            }
            Some(x) => {
                slf.emitter.emit_string(ctostr!(x));
                cont!()
            }
        },
        State::ScriptDataEscapedDash => match slf.read_char()? {
            Some('-') => {
                slf.emitter.emit_string("-");
                switch_to!(slf, ScriptDataEscapedDashDash)
            }
            Some('<') => switch_to!(slf, ScriptDataEscapedLessThanSign),
            Some('\0') => {
                slf.emitter.emit_error(Error::UnexpectedNullCharacter);
                slf.emitter.emit_string("\u{fffd}");
                switch_to!(slf, ScriptDataEscaped)
            }
            None => {
                slf.emitter
                    .emit_error(Error::EofInScriptHtmlCommentLikeText);
                eof!()
            }
            Some(x) => {
                slf.emitter.emit_string(ctostr!(x));
                switch_to!(slf, ScriptDataEscaped)
            }
        },
        State::ScriptDataEscapedDashDash => match slf.read_char()? {
            Some('-') => {
                slf.emitter.emit_string("-");
                cont!()
            }
            Some('<') => switch_to!(slf, ScriptDataEscapedLessThanSign),
            Some('>') => {
                slf.emitter.emit_string(">");
                switch_to!(slf, ScriptData)
            }
            Some('\0') => {
                slf.emitter.emit_error(Error::UnexpectedNullCharacter);
                slf.emitter.emit_string("\u{fffd}");
                switch_to!(slf, ScriptDataEscaped)
            }
            None => {
                slf.emitter
                    .emit_error(Error::EofInScriptHtmlCommentLikeText);
                eof!()
            }
            Some(x) => {
                slf.emitter.emit_string(ctostr!(x));
                switch_to!(slf, ScriptDataEscaped)
            }
        },
        State::ScriptDataEscapedLessThanSign => match slf.read_char()? {
            Some('/') => {
                slf.machine_helper.temporary_buffer.clear();
                switch_to!(slf, ScriptDataEscapedEndTagOpen)
            }
            Some(x) if x.is_ascii_alphabetic() => {
                slf.machine_helper.temporary_buffer.clear();
                slf.emitter.emit_string("<");
                reconsume_in!(slf, Some(x), ScriptDataDoubleEscapeStart)
            }
            c => {
                slf.emitter.emit_string("<");
                reconsume_in!(slf, c, ScriptDataEscaped)
            }
        },
        State::ScriptDataEscapedEndTagOpen => match slf.read_char()? {
            Some(x) if x.is_ascii_alphabetic() => {
                slf.emitter.init_end_tag();
                reconsume_in!(slf, Some(x), ScriptDataEscapedEndTagName)
            }
            c => {
                slf.emitter.emit_string("</");
                reconsume_in!(slf, c, ScriptDataEscaped)
            }
        },
        State::ScriptDataEscapedEndTagName => match slf.read_char()? {
            Some(whitespace_pat!()) if slf.emitter.current_is_appropriate_end_tag_token() => {
                switch_to!(slf, BeforeAttributeName)
            }
            Some('/') if slf.emitter.current_is_appropriate_end_tag_token() => {
                switch_to!(slf, SelfClosingStartTag)
            }
            Some('>') if slf.emitter.current_is_appropriate_end_tag_token() => {
                emit_current_tag_and_switch_to!(slf, Data)
            }
            Some(x) if x.is_ascii_alphabetic() => {
                slf.emitter.push_tag_name(ctostr!(x.to_ascii_lowercase()));
                slf.machine_helper.temporary_buffer.push(x);
                cont!()
            }
            c => {
                slf.emitter.emit_string("</");
                slf.machine_helper
                    .flush_buffer_characters(&mut slf.emitter);
                reconsume_in!(slf, c, ScriptDataEscaped)
            }
        },
        State::ScriptDataDoubleEscapeStart => match slf.read_char()? {
            Some(x @ (whitespace_pat!() | '/' | '>')) => {
                if slf.machine_helper.temporary_buffer == "script" {
                    slf.emitter.emit_string(ctostr!(x));
                    switch_to!(slf, ScriptDataDoubleEscaped)
                } else {
                    slf.emitter.emit_string(ctostr!(x));
                    switch_to!(slf, ScriptDataEscaped)
                }
            }
            Some(x) if x.is_ascii_alphabetic() => {
                slf.machine_helper
                    .temporary_buffer
                    .push(x.to_ascii_lowercase());
                slf.emitter.emit_string(ctostr!(x));
                cont!()
            }
            c => reconsume_in!(slf, c, ScriptDataEscaped),
        },
        State::ScriptDataDoubleEscaped => match slf.read_char()? {
            Some('-') => {
                slf.emitter.emit_string("-");
                switch_to!(slf, ScriptDataDoubleEscapedDash)
            }
            Some('<') => {
                slf.emitter.emit_string("<");
                switch_to!(slf, ScriptDataDoubleEscapedLessThanSign)
            }
            Some('\0') => {
                slf.emitter.emit_error(Error::UnexpectedNullCharacter);
                slf.emitter.emit_string("\u{fffd}");
                cont!()
            }
            None => {
                slf.emitter
                    .emit_error(Error::EofInScriptHtmlCommentLikeText);
                eof!()
            }
            Some(x) => {
                slf.emitter.emit_string(ctostr!(x));
                cont!()
            }
        },
        State::ScriptDataDoubleEscapedDash => match slf.read_char()? {
            Some('-') => {
                slf.emitter.emit_string("-");
                switch_to!(slf, ScriptDataDoubleEscapedDashDash)
            }
            Some('<') => {
                slf.emitter.emit_string("<");
                switch_to!(slf, ScriptDataDoubleEscapedLessThanSign)
            }
            Some('\0') => {
                slf.emitter.emit_error(Error::UnexpectedNullCharacter);
                slf.emitter.emit_string("\u{fffd}");
                switch_to!(slf, ScriptDataDoubleEscaped)
            }
            None => {
                slf.emitter
                    .emit_error(Error::EofInScriptHtmlCommentLikeText);
                eof!()
            }
            Some(x) => {
                slf.emitter.emit_string(ctostr!(x));
                switch_to!(slf, ScriptDataDoubleEscaped)
            }
        },
        State::ScriptDataDoubleEscapedDashDash => match slf.read_char()? {
            Some('-') => {
                slf.emitter.emit_string("-");
                cont!()
            }
            Some('<') => {
                slf.emitter.emit_string("<");
                switch_to!(slf, ScriptDataDoubleEscapedLessThanSign)
            }
            Some('>') => {
                slf.emitter.emit_string(">");
                switch_to!(slf, ScriptData)
            }
            Some('\0') => {
                slf.emitter.emit_error(Error::UnexpectedNullCharacter);
                slf.emitter.emit_string("\u{fffd}");
                switch_to!(slf, ScriptDataDoubleEscaped)
            }
            None => {
                slf.emitter
                    .emit_error(Error::EofInScriptHtmlCommentLikeText);
                eof!()
            }
            Some(x) => {
                slf.emitter.emit_string(ctostr!(x));
                switch_to!(slf, ScriptDataDoubleEscaped)
            }
        },
        State::ScriptDataDoubleEscapedLessThanSign => match slf.read_char()? {
            Some('/') => {
                slf.machine_helper.temporary_buffer.clear();
                slf.emitter.emit_string("/");
                switch_to!(slf, ScriptDataDoubleEscapeEnd)
            }
            c => reconsume_in!(slf, c, ScriptDataDoubleEscaped),
        },
        State::ScriptDataDoubleEscapeEnd => match slf.read_char()? {
            Some(x @ (whitespace_pat!() | '/' | '>')) => {
                if slf.machine_helper.temporary_buffer == "script" {
                    slf.emitter.emit_string(ctostr!(x));
                    switch_to!(slf, ScriptDataEscaped)
                } else {
                    slf.emitter.emit_string(ctostr!(x));
                    switch_to!(slf, ScriptDataDoubleEscaped)
                }
            }
            Some(x) if x.is_ascii_alphabetic() => {
                slf.machine_helper
                    .temporary_buffer
                    .push(x.to_ascii_lowercase());
                slf.emitter.emit_string(ctostr!(x));
                cont!()
            }
            c => reconsume_in!(slf, c, ScriptDataDoubleEscaped),
        },
        State::BeforeAttributeName => match slf.read_char()? {
            Some(whitespace_pat!()) => cont!(),
            c @ (Some('/' | '>') | None) => reconsume_in!(slf, c, AfterAttributeName),
            Some('=') => {
                slf.emitter
                    .emit_error(Error::UnexpectedEqualsSignBeforeAttributeName);
                slf.emitter.init_attribute();
                slf.emitter.push_attribute_name("=");
                switch_to!(slf, AttributeName)
            }
            Some(x) => {
                slf.emitter.init_attribute();
                reconsume_in!(slf, Some(x), AttributeName)
            }
        },
        State::AttributeName => match slf.read_char()? {
            c @ (Some(whitespace_pat!() | '/' | '>') | None) => {
                reconsume_in!(slf, c, AfterAttributeName)
            }
            Some('=') => switch_to!(slf, BeforeAttributeValue),
            Some('\0') => {
                slf.emitter.emit_error(Error::UnexpectedNullCharacter);
                slf.emitter.push_attribute_name("\u{fffd}");
                cont!()
            }
            Some(x @ ('"' | '\'' | '<')) => {
                slf.emitter
                    .emit_error(Error::UnexpectedCharacterInAttributeName);
                slf.emitter
                    .push_attribute_name(ctostr!(x.to_ascii_lowercase()));
                cont!()
            }
            Some(x) => {
                slf.emitter
                    .push_attribute_name(ctostr!(x.to_ascii_lowercase()));
                cont!()
            }
        },
        State::AfterAttributeName => match slf.read_char()? {
            Some(whitespace_pat!()) => cont!(),
            Some('/') => switch_to!(slf, SelfClosingStartTag),
            Some('=') => switch_to!(slf, BeforeAttributeValue),
            Some('>') => emit_current_tag_and_switch_to!(slf, Data),
            None => {
                slf.emitter.emit_error(Error::EofInTag);
                eof!()
            }
            Some(x) => {
                slf.emitter.init_attribute();
                reconsume_in!(slf, Some(x), AttributeName)
            }
        },
        State::BeforeAttributeValue => match slf.read_char()? {
            Some(whitespace_pat!()) => cont!(),
            Some('"') => switch_to!(slf, AttributeValueDoubleQuoted),
            Some('\'') => switch_to!(slf, AttributeValueSingleQuoted),
            Some('>') => {
                slf.emitter.emit_error(Error::MissingAttributeValue);
                emit_current_tag_and_switch_to!(slf, Data)
            }
            c => reconsume_in!(slf, c, AttributeValueUnquoted),
        },
        State::AttributeValueDoubleQuoted => match slf.read_char()? {
            Some('"') => switch_to!(slf, AfterAttributeValueQuoted),
            Some('&') => enter_state!(slf, CharacterReference),
            Some('\0') => {
                slf.emitter.emit_error(Error::UnexpectedNullCharacter);
                slf.emitter.push_attribute_value("\u{fffd}");
                cont!()
            }
            None => {
                slf.emitter.emit_error(Error::EofInTag);
                eof!()
            }
            Some(x) => {
                slf.emitter.push_attribute_value(ctostr!(x));
                cont!()
            }
        },
        State::AttributeValueSingleQuoted => match slf.read_char()? {
            Some('\'') => switch_to!(slf, AfterAttributeValueQuoted),
            Some('&') => enter_state!(slf, CharacterReference),
            Some('\0') => {
                slf.emitter.emit_error(Error::UnexpectedNullCharacter);
                slf.emitter.push_attribute_value("\u{fffd}");
                cont!()
            }
            None => {
                slf.emitter.emit_error(Error::EofInTag);
                eof!()
            }
            Some(x) => {
                slf.emitter.push_attribute_value(ctostr!(x));
                cont!()
            }
        },
        State::AttributeValueUnquoted => match slf.read_char()? {
            Some(whitespace_pat!()) => switch_to!(slf, BeforeAttributeName),
            Some('&') => enter_state!(slf, CharacterReference),
            Some('>') => emit_current_tag_and_switch_to!(slf, Data),
            Some('\0') => {
                slf.emitter.emit_error(Error::UnexpectedNullCharacter);
                slf.emitter.push_attribute_value("\u{fffd}");
                cont!()
            }
            Some(x @ ('"' | '\'' | '<' | '=' | '`')) => {
                slf.emitter
                    .emit_error(Error::UnexpectedCharacterInUnquotedAttributeValue);
                slf.emitter.push_attribute_value(ctostr!(x));
                cont!()
            }
            None => {
                slf.emitter.emit_error(Error::EofInTag);
                eof!()
            }
            Some(x) => {
                slf.emitter.push_attribute_value(ctostr!(x));
                cont!()
            }
        },
        State::AfterAttributeValueQuoted => match slf.read_char()? {
            Some(whitespace_pat!()) => switch_to!(slf, BeforeAttributeName),
            Some('/') => switch_to!(slf, SelfClosingStartTag),
            Some('>') => emit_current_tag_and_switch_to!(slf, Data),
            None => {
                slf.emitter.emit_error(Error::EofInTag);
                eof!()
            }
            Some(x) => {
                slf.emitter
                    .emit_error(Error::MissingWhitespaceBetweenAttributes);
                reconsume_in!(slf, Some(x), BeforeAttributeName)
            }
        },
        State::SelfClosingStartTag => match slf.read_char()? {
            Some('>') => {
                slf.emitter.set_self_closing();
                emit_current_tag_and_switch_to!(slf, Data)
            }
            None => {
                slf.emitter.emit_error(Error::EofInTag);
                eof!()
            }
            Some(x) => {
                slf.emitter.emit_error(Error::UnexpectedSolidusInTag);
                reconsume_in!(slf, Some(x), BeforeAttributeName)
            }
        },
        State::BogusComment => match slf.read_char()? {
            Some('>') => {
                slf.emitter.emit_current_comment();
                switch_to!(slf, Data)
            }
            None => {
                slf.emitter.emit_current_comment();
                eof!()
            }
            Some('\0') => {
                slf.emitter.emit_error(Error::UnexpectedNullCharacter);
                slf.emitter.push_comment("\u{fffd}");
                cont!()
            }
            Some(x) => {
                slf.emitter.push_comment(ctostr!(x));
                cont!()
            }
        },
        State::MarkupDeclarationOpen => match slf.read_char()? {
            Some('-') if slf.try_read_string("-", true)? => {
                slf.emitter.init_comment();
                switch_to!(slf, CommentStart)
            }
            Some('d' | 'D') if slf.try_read_string("octype", false)? => {
                switch_to!(slf, Doctype)
            }
            Some('[') if slf.try_read_string("CDATA[", true)? => {
                if slf
                    .emitter
                    .adjusted_current_node_present_but_not_in_html_namespace()
                {
                    switch_to!(slf, CdataSection)
                } else {
                    slf.emitter.emit_error(Error::CdataInHtmlContent);
                    slf.emitter.init_comment();
                    slf.emitter.push_comment("[CDATA[");
                    switch_to!(slf, BogusComment)
                }
            }
            c => {
                slf.emitter.emit_error(Error::IncorrectlyOpenedComment);
                slf.emitter.init_comment();
                reconsume_in!(slf, c, BogusComment)
            }
        },
        State::CommentStart => match slf.read_char()? {
            Some('-') => switch_to!(slf, CommentStartDash),
            Some('>') => {
                slf.emitter.emit_error(Error::AbruptClosingOfEmptyComment);
                slf.emitter.emit_current_comment();
                switch_to!(slf, Data)
            }
            c => reconsume_in!(slf, c, Comment),
        },
        State::CommentStartDash => match slf.read_char()? {
            Some('-') => switch_to!(slf, CommentEnd),
            Some('>') => {
                slf.emitter.emit_error(Error::AbruptClosingOfEmptyComment);
                slf.emitter.emit_current_comment();
                switch_to!(slf, Data)
            }
            None => {
                slf.emitter.emit_error(Error::EofInComment);
                slf.emitter.emit_current_comment();
                eof!()
            }
            c @ Some(_) => {
                slf.emitter.push_comment("-");
                reconsume_in!(slf, c, Comment)
            }
        },
        State::Comment => match slf.read_char()? {
            Some('<') => {
                slf.emitter.push_comment("<");
                switch_to!(slf, CommentLessThanSign)
            }
            Some('-') => switch_to!(slf, CommentEndDash),
            Some('\0') => {
                slf.emitter.emit_error(Error::UnexpectedNullCharacter);
                slf.emitter.push_comment("\u{fffd}");
                cont!()
            }
            None => {
                slf.emitter.emit_error(Error::EofInComment);
                slf.emitter.emit_current_comment();
                eof!()
            }
            Some(x) => {
                slf.emitter.push_comment(ctostr!(x));
                cont!()
            }
        },
        State::CommentLessThanSign => match slf.read_char()? {
            Some('!') => {
                slf.emitter.push_comment("!");
                switch_to!(slf, CommentLessThanSignBang)
            }
            Some('<') => {
                slf.emitter.push_comment("<");
                cont!()
            }
            c => reconsume_in!(slf, c, Comment),
        },
        State::CommentLessThanSignBang => match slf.read_char()? {
            Some('-') => switch_to!(slf, CommentLessThanSignBangDash),
            c => reconsume_in!(slf, c, Comment),
        },
        State::CommentLessThanSignBangDash => match slf.read_char()? {
            Some('-') => switch_to!(slf, CommentLessThanSignBangDashDash),
            c => reconsume_in!(slf, c, CommentEndDash),
        },
        State::CommentLessThanSignBangDashDash => match slf.read_char()? {
            c @ (Some('>') | None) => reconsume_in!(slf, c, CommentEnd),
            c => {
                slf.emitter.emit_error(Error::NestedComment);
                reconsume_in!(slf, c, CommentEnd)
            }
        },
        State::CommentEndDash => match slf.read_char()? {
            Some('-') => switch_to!(slf, CommentEnd),
            None => {
                slf.emitter.emit_error(Error::EofInComment);
                slf.emitter.emit_current_comment();
                eof!()
            }
            c => {
                slf.emitter.push_comment("-");
                reconsume_in!(slf, c, Comment)
            }
        },
        State::CommentEnd => match slf.read_char()? {
            Some('>') => {
                slf.emitter.emit_current_comment();
                switch_to!(slf, Data)
            }
            Some('!') => switch_to!(slf, CommentEndBang),
            Some('-') => {
                slf.emitter.push_comment("-");
                cont!()
            }
            None => {
                slf.emitter.emit_error(Error::EofInComment);
                slf.emitter.emit_current_comment();
                eof!()
            }
            c @ Some(_) => {
                slf.emitter.push_comment("--");
                reconsume_in!(slf, c, Comment)
            }
        },
        State::CommentEndBang => match slf.read_char()? {
            Some('-') => {
                slf.emitter.push_comment("--!");
                switch_to!(slf, CommentEndDash)
            }
            Some('>') => {
                slf.emitter.emit_error(Error::IncorrectlyClosedComment);
                slf.emitter.emit_current_comment();
                switch_to!(slf, Data)
            }
            None => {
                slf.emitter.emit_error(Error::EofInComment);
                slf.emitter.emit_current_comment();
                eof!()
            }
            c @ Some(_) => {
                slf.emitter.push_comment("--!");
                reconsume_in!(slf, c, Comment)
            }
        },
        State::Doctype => match slf.read_char()? {
            Some(whitespace_pat!()) => switch_to!(slf, BeforeDoctypeName),
            c @ Some('>') => reconsume_in!(slf, c, BeforeDoctypeName),
            None => {
                slf.emitter.emit_error(Error::EofInDoctype);
                slf.emitter.init_doctype();
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
            c @ Some(_) => {
                slf.emitter
                    .emit_error(Error::MissingWhitespaceBeforeDoctypeName);
                reconsume_in!(slf, c, BeforeDoctypeName)
            }
        },
        State::BeforeDoctypeName => match slf.read_char()? {
            Some(whitespace_pat!()) => cont!(),
            Some('\0') => {
                slf.emitter.emit_error(Error::UnexpectedNullCharacter);
                slf.emitter.init_doctype();
                slf.emitter.push_doctype_name("\u{fffd}");
                switch_to!(slf, DoctypeName)
            }
            Some('>') => {
                slf.emitter.emit_error(Error::MissingDoctypeName);
                slf.emitter.init_doctype();
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                switch_to!(slf, Data)
            }
            None => {
                slf.emitter.emit_error(Error::EofInDoctype);
                slf.emitter.init_doctype();
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
            Some(x) => {
                slf.emitter.init_doctype();
                slf.emitter
                    .push_doctype_name(ctostr!(x.to_ascii_lowercase()));
                switch_to!(slf, DoctypeName)
            }
        },
        State::DoctypeName => match slf.read_char()? {
            Some(whitespace_pat!()) => switch_to!(slf, AfterDoctypeName),
            Some('>') => {
                slf.emitter.emit_current_doctype();
                switch_to!(slf, Data)
            }
            Some('\0') => {
                slf.emitter.emit_error(Error::UnexpectedNullCharacter);
                slf.emitter.push_doctype_name("\u{fffd}");
                cont!()
            }
            None => {
                slf.emitter.emit_error(Error::EofInDoctype);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
            Some(x) => {
                slf.emitter
                    .push_doctype_name(ctostr!(x.to_ascii_lowercase()));
                cont!()
            }
        },
        State::AfterDoctypeName => match slf.read_char()? {
            Some(whitespace_pat!()) => cont!(),
            Some('>') => {
                slf.emitter.emit_current_doctype();
                switch_to!(slf, Data)
            }
            None => {
                slf.emitter.emit_error(Error::EofInDoctype);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
            Some('p' | 'P') if slf.try_read_string("ublic", false)? => {
                switch_to!(slf, AfterDoctypePublicKeyword)
            }
            Some('s' | 'S') if slf.try_read_string("ystem", false)? => {
                switch_to!(slf, AfterDoctypeSystemKeyword)
            }
            c @ Some(_) => {
                slf.emitter
                    .emit_error(Error::InvalidCharacterSequenceAfterDoctypeName);
                slf.emitter.set_force_quirks();
                reconsume_in!(slf, c, BogusDoctype)
            }
        },
        State::AfterDoctypePublicKeyword => match slf.read_char()? {
            Some(whitespace_pat!()) => switch_to!(slf, BeforeDoctypePublicIdentifier),
            Some('"') => {
                slf.emitter
                    .emit_error(Error::MissingWhitespaceAfterDoctypePublicKeyword);
                slf.emitter.set_doctype_public_identifier("");
                switch_to!(slf, DoctypePublicIdentifierDoubleQuoted)
            }
            Some('\'') => {
                slf.emitter
                    .emit_error(Error::MissingWhitespaceAfterDoctypePublicKeyword);
                slf.emitter.set_doctype_public_identifier("");
                switch_to!(slf, DoctypePublicIdentifierSingleQuoted)
            }
            Some('>') => {
                slf.emitter
                    .emit_error(Error::MissingDoctypePublicIdentifier);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                switch_to!(slf, Data)
            }
            None => {
                slf.emitter.emit_error(Error::EofInDoctype);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
            c @ Some(_) => {
                slf.emitter
                    .emit_error(Error::MissingQuoteBeforeDoctypePublicIdentifier);
                slf.emitter.set_force_quirks();
                reconsume_in!(slf, c, BogusDoctype)
            }
        },
        State::BeforeDoctypePublicIdentifier => match slf.read_char()? {
            Some(whitespace_pat!()) => cont!(),
            Some('"') => {
                slf.emitter.set_doctype_public_identifier("");
                switch_to!(slf, DoctypePublicIdentifierDoubleQuoted)
            }
            Some('\'') => {
                slf.emitter.set_doctype_public_identifier("");
                switch_to!(slf, DoctypePublicIdentifierSingleQuoted)
            }
            Some('>') => {
                slf.emitter
                    .emit_error(Error::MissingDoctypePublicIdentifier);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                switch_to!(slf, Data)
            }
            None => {
                slf.emitter.emit_error(Error::EofInDoctype);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
            c @ Some(_) => {
                slf.emitter
                    .emit_error(Error::MissingQuoteBeforeDoctypePublicIdentifier);
                slf.emitter.set_force_quirks();
                reconsume_in!(slf, c, BogusDoctype)
            }
        },
        State::DoctypePublicIdentifierDoubleQuoted => match slf.read_char()? {
            Some('"') => switch_to!(slf, AfterDoctypePublicIdentifier),
            Some('\0') => {
                slf.emitter.emit_error(Error::UnexpectedNullCharacter);
                slf.emitter.push_doctype_public_identifier("\u{fffd}");
                cont!()
            }
            Some('>') => {
                slf.emitter
                    .emit_error(Error::AbruptDoctypePublicIdentifier);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                switch_to!(slf, Data)
            }
            None => {
                slf.emitter.emit_error(Error::EofInDoctype);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
            Some(x) => {
                slf.emitter.push_doctype_public_identifier(ctostr!(x));
                cont!()
            }
        },
        State::DoctypePublicIdentifierSingleQuoted => match slf.read_char()? {
            Some('\'') => switch_to!(slf, AfterDoctypePublicIdentifier),
            Some('\0') => {
                slf.emitter.emit_error(Error::UnexpectedNullCharacter);
                slf.emitter.push_doctype_public_identifier("\u{fffd}");
                cont!()
            }
            Some('>') => {
                slf.emitter
                    .emit_error(Error::AbruptDoctypePublicIdentifier);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                switch_to!(slf, Data)
            }
            None => {
                slf.emitter.emit_error(Error::EofInDoctype);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
            Some(x) => {
                slf.emitter.push_doctype_public_identifier(ctostr!(x));
                cont!()
            }
        },
        State::AfterDoctypePublicIdentifier => match slf.read_char()? {
            Some(whitespace_pat!()) => {
                switch_to!(slf, BetweenDoctypePublicAndSystemIdentifiers)
            }
            Some('>') => {
                slf.emitter.emit_current_doctype();
                switch_to!(slf, Data)
            }
            Some('"') => {
                slf.emitter
                    .emit_error(Error::MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers);
                slf.emitter.set_doctype_system_identifier("");
                switch_to!(slf, DoctypeSystemIdentifierDoubleQuoted)
            }
            Some('\'') => {
                slf.emitter
                    .emit_error(Error::MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers);
                slf.emitter.set_doctype_system_identifier("");
                switch_to!(slf, DoctypeSystemIdentifierSingleQuoted)
            }
            None => {
                slf.emitter.emit_error(Error::EofInDoctype);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
            c @ Some(_) => {
                slf.emitter
                    .emit_error(Error::MissingQuoteBeforeDoctypeSystemIdentifier);
                slf.emitter.set_force_quirks();
                reconsume_in!(slf, c, BogusDoctype)
            }
        },
        State::BetweenDoctypePublicAndSystemIdentifiers => match slf.read_char()? {
            Some(whitespace_pat!()) => cont!(),
            Some('>') => {
                slf.emitter.emit_current_doctype();
                switch_to!(slf, Data)
            }
            Some('"') => {
                slf.emitter.set_doctype_system_identifier("");
                switch_to!(slf, DoctypeSystemIdentifierDoubleQuoted)
            }
            Some('\'') => {
                slf.emitter.set_doctype_system_identifier("");
                switch_to!(slf, DoctypeSystemIdentifierSingleQuoted)
            }
            None => {
                slf.emitter.emit_error(Error::EofInDoctype);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
            c @ Some(_) => {
                slf.emitter
                    .emit_error(Error::MissingQuoteBeforeDoctypeSystemIdentifier);
                slf.emitter.set_force_quirks();
                reconsume_in!(slf, c, BogusDoctype)
            }
        },
        State::AfterDoctypeSystemKeyword => match slf.read_char()? {
            Some(whitespace_pat!()) => switch_to!(slf, BeforeDoctypeSystemIdentifier),
            Some('"') => {
                slf.emitter
                    .emit_error(Error::MissingWhitespaceAfterDoctypeSystemKeyword);
                slf.emitter.set_doctype_system_identifier("");
                switch_to!(slf, DoctypeSystemIdentifierDoubleQuoted)
            }
            Some('\'') => {
                slf.emitter
                    .emit_error(Error::MissingWhitespaceAfterDoctypeSystemKeyword);
                slf.emitter.set_doctype_system_identifier("");
                switch_to!(slf, DoctypeSystemIdentifierSingleQuoted)
            }
            Some('>') => {
                slf.emitter
                    .emit_error(Error::MissingDoctypeSystemIdentifier);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                switch_to!(slf, Data)
            }
            None => {
                slf.emitter.emit_error(Error::EofInDoctype);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
            c @ Some(_) => {
                slf.emitter
                    .emit_error(Error::MissingQuoteBeforeDoctypeSystemIdentifier);
                slf.emitter.set_force_quirks();
                reconsume_in!(slf, c, BogusDoctype)
            }
        },
        State::BeforeDoctypeSystemIdentifier => match slf.read_char()? {
            Some(whitespace_pat!()) => cont!(),
            Some('"') => {
                slf.emitter.set_doctype_system_identifier("");
                switch_to!(slf, DoctypeSystemIdentifierDoubleQuoted)
            }
            Some('\'') => {
                slf.emitter.set_doctype_system_identifier("");
                switch_to!(slf, DoctypeSystemIdentifierSingleQuoted)
            }
            Some('>') => {
                slf.emitter
                    .emit_error(Error::MissingDoctypeSystemIdentifier);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                switch_to!(slf, Data)
            }
            None => {
                slf.emitter.emit_error(Error::EofInDoctype);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
            c @ Some(_) => {
                slf.emitter
                    .emit_error(Error::MissingQuoteBeforeDoctypeSystemIdentifier);
                slf.emitter.set_force_quirks();
                reconsume_in!(slf, c, BogusDoctype)
            }
        },
        State::DoctypeSystemIdentifierDoubleQuoted => match slf.read_char()? {
            Some('"') => switch_to!(slf, AfterDoctypeSystemIdentifier),
            Some('\0') => {
                slf.emitter.emit_error(Error::UnexpectedNullCharacter);
                slf.emitter.push_doctype_system_identifier("\u{fffd}");
                cont!()
            }
            Some('>') => {
                slf.emitter
                    .emit_error(Error::AbruptDoctypeSystemIdentifier);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                switch_to!(slf, Data)
            }
            None => {
                slf.emitter.emit_error(Error::EofInDoctype);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
            Some(x) => {
                slf.emitter.push_doctype_system_identifier(ctostr!(x));
                cont!()
            }
        },
        State::DoctypeSystemIdentifierSingleQuoted => match slf.read_char()? {
            Some('\'') => switch_to!(slf, AfterDoctypeSystemIdentifier),
            Some('\0') => {
                slf.emitter.emit_error(Error::UnexpectedNullCharacter);
                slf.emitter.push_doctype_system_identifier("\u{fffd}");
                cont!()
            }
            Some('>') => {
                slf.emitter
                    .emit_error(Error::AbruptDoctypeSystemIdentifier);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                switch_to!(slf, Data)
            }
            None => {
                slf.emitter.emit_error(Error::EofInDoctype);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
            Some(x) => {
                slf.emitter.push_doctype_system_identifier(ctostr!(x));
                cont!()
            }
        },
        State::AfterDoctypeSystemIdentifier => match slf.read_char()? {
            Some(whitespace_pat!()) => cont!(),
            Some('>') => {
                slf.emitter.emit_current_doctype();
                switch_to!(slf, Data)
            }
            None => {
                slf.emitter.emit_error(Error::EofInDoctype);
                slf.emitter.set_force_quirks();
                slf.emitter.emit_current_doctype();
                eof!()
            }
            c @ Some(_) => {
                slf.emitter
                    .emit_error(Error::UnexpectedCharacterAfterDoctypeSystemIdentifier);
                reconsume_in!(slf, c, BogusDoctype)
            }
        },
        State::BogusDoctype => match slf.read_char()? {
            Some('>') => {
                slf.emitter.emit_current_doctype();
                switch_to!(slf, Data)
            }
            Some('\0') => {
                slf.emitter.emit_error(Error::UnexpectedNullCharacter);
                cont!()
            }
            None => {
                slf.emitter.emit_current_doctype();
                eof!()
            }
            Some(_) => cont!(),
        },
        State::CdataSection => match slf.read_char()? {
            Some(']') => switch_to!(slf, CdataSectionBracket),
            None => {
                slf.emitter.emit_error(Error::EofInCdata);
                eof!()
            }
            Some(x) => {
                slf.emitter.emit_string(ctostr!(x));
                cont!()
            }
        },
        State::CdataSectionBracket => match slf.read_char()? {
            Some(']') => switch_to!(slf, CdataSectionEnd),
            c => {
                slf.emitter.emit_string("]");
                reconsume_in!(slf, c, CdataSection)
            }
        },
        State::CdataSectionEnd => match slf.read_char()? {
            Some(']') => {
                slf.emitter.emit_string("]");
                cont!()
            }
            Some('>') => switch_to!(slf, Data),
            c => {
                slf.emitter.emit_string("]]");
                reconsume_in!(slf, c, CdataSection)
            }
        },
        State::CharacterReference => {
            slf.machine_helper.temporary_buffer.clear();
            slf.machine_helper.temporary_buffer.push('&');
            match slf.read_char()? {
                Some(x) if x.is_ascii_alphanumeric() => {
                    reconsume_in!(slf, Some(x), NamedCharacterReference)
                }
                Some('#') => {
                    slf.machine_helper.temporary_buffer.push('#');
                    switch_to!(slf, NumericCharacterReference)
                }
                c => {
                    slf.machine_helper
                        .flush_code_points_consumed_as_character_reference(&mut slf.emitter);
                    reconsume_in_return_state!(slf, c)
                }
            }
        }
        State::NamedCharacterReference => {
            // Consume the longest run of code points that is a name in the
            // reference table, then give back everything past the longest
            // exact match. Candidate names are ASCII, so byte counts equal
            // code-point counts here.
            let mut candidate = String::new();
            let mut matched = 0;
            loop {
                let c = match slf.reader.peek()? {
                    Some(c) if c.is_ascii_alphanumeric() || c == ';' => c,
                    _ => break,
                };
                candidate.push(c);
                if !slf.entities.contains_prefix(&candidate) {
                    candidate.pop();
                    break;
                }
                slf.read_char()?;
                if slf.entities.expansion(&candidate).is_some() {
                    matched = candidate.len();
                }
                if c == ';' {
                    break;
                }
            }
            if candidate.len() > matched {
                slf.reader.backtrack_by(candidate.len() - matched)?;
                candidate.truncate(matched);
            }

            if matched == 0 {
                slf.machine_helper
                    .flush_code_points_consumed_as_character_reference(&mut slf.emitter);
                switch_to!(slf, AmbiguousAmpersand)
            } else {
                let ends_with_semicolon = candidate.ends_with(';');
                let next_character = slf.reader.peek()?;
                if slf.machine_helper.is_consumed_as_part_of_an_attribute()
                    && !ends_with_semicolon
                    && matches!(next_character, Some(x) if x == '=' || x.is_ascii_alphanumeric())
                {
                    // historical quirk: inside attributes, `&ampx` stays as-is
                    slf.machine_helper.temporary_buffer.push_str(&candidate);
                    slf.machine_helper
                        .flush_code_points_consumed_as_character_reference(&mut slf.emitter);
                    exit_state!(slf)
                } else {
                    if !ends_with_semicolon {
                        slf.emitter
                            .emit_error(Error::MissingSemicolonAfterCharacterReference);
                    }
                    let expansion = slf.entities.expansion(&candidate).unwrap_or("");
                    slf.machine_helper.temporary_buffer.clear();
                    slf.machine_helper.temporary_buffer.push_str(expansion);
                    slf.machine_helper
                        .flush_code_points_consumed_as_character_reference(&mut slf.emitter);
                    exit_state!(slf)
                }
            }
        }
        State::AmbiguousAmpersand => match slf.read_char()? {
            Some(x) if x.is_ascii_alphanumeric() => {
                if slf.machine_helper.is_consumed_as_part_of_an_attribute() {
                    slf.emitter.push_attribute_value(ctostr!(x));
                } else {
                    slf.emitter.emit_string(ctostr!(x));
                }
                cont!()
            }
            c @ Some(';') => {
                slf.emitter
                    .emit_error(Error::UnknownNamedCharacterReference);
                reconsume_in_return_state!(slf, c)
            }
            c => reconsume_in_return_state!(slf, c),
        },
        State::NumericCharacterReference => {
            slf.machine_helper.character_reference_code = 0;
            match slf.read_char()? {
                Some(x @ ('x' | 'X')) => {
                    slf.machine_helper.temporary_buffer.push(x);
                    switch_to!(slf, HexadecimalCharacterReferenceStart)
                }
                c => reconsume_in!(slf, c, DecimalCharacterReferenceStart),
            }
        }
        State::HexadecimalCharacterReferenceStart => match slf.read_char()? {
            c @ Some('0'..='9' | 'A'..='F' | 'a'..='f') => {
                reconsume_in!(slf, c, HexadecimalCharacterReference)
            }
            c => {
                slf.emitter
                    .emit_error(Error::AbsenceOfDigitsInNumericCharacterReference);
                slf.machine_helper
                    .flush_code_points_consumed_as_character_reference(&mut slf.emitter);
                reconsume_in_return_state!(slf, c)
            }
        },
        State::DecimalCharacterReferenceStart => match slf.read_char()? {
            c @ Some(ascii_digit_pat!()) => reconsume_in!(slf, c, DecimalCharacterReference),
            c => {
                slf.emitter
                    .emit_error(Error::AbsenceOfDigitsInNumericCharacterReference);
                slf.machine_helper
                    .flush_code_points_consumed_as_character_reference(&mut slf.emitter);
                reconsume_in_return_state!(slf, c)
            }
        },
        State::HexadecimalCharacterReference => match slf.read_char()? {
            Some(x @ ascii_digit_pat!()) => {
                mutate_character_reference!(slf, *16 + x - 0x0030);
                cont!()
            }
            Some(x @ 'A'..='F') => {
                mutate_character_reference!(slf, *16 + x - 0x0037);
                cont!()
            }
            Some(x @ 'a'..='f') => {
                mutate_character_reference!(slf, *16 + x - 0x0057);
                cont!()
            }
            Some(';') => switch_to!(slf, NumericCharacterReferenceEnd),
            c => {
                slf.emitter
                    .emit_error(Error::MissingSemicolonAfterCharacterReference);
                reconsume_in!(slf, c, NumericCharacterReferenceEnd)
            }
        },
        State::DecimalCharacterReference => match slf.read_char()? {
            Some(x @ ascii_digit_pat!()) => {
                mutate_character_reference!(slf, *10 + x - 0x0030);
                cont!()
            }
            Some(';') => switch_to!(slf, NumericCharacterReferenceEnd),
            c => {
                slf.emitter
                    .emit_error(Error::MissingSemicolonAfterCharacterReference);
                reconsume_in!(slf, c, NumericCharacterReferenceEnd)
            }
        },
        State::NumericCharacterReferenceEnd => {
            match slf.machine_helper.character_reference_code {
                0x00 => {
                    slf.emitter.emit_error(Error::NullCharacterReference);
                    slf.machine_helper.character_reference_code = 0xfffd;
                }
                0x0011_0000.. => {
                    slf.emitter
                        .emit_error(Error::CharacterReferenceOutsideUnicodeRange);
                    slf.machine_helper.character_reference_code = 0xfffd;
                }
                surrogate_pat!() => {
                    slf.emitter.emit_error(Error::SurrogateCharacterReference);
                    slf.machine_helper.character_reference_code = 0xfffd;
                }
                noncharacter_pat!() => {
                    slf.emitter
                        .emit_error(Error::NoncharacterCharacterReference);
                }
                // a control that is not whitespace
                x @ control_pat!() if !matches!(x, 0x0009 | 0x000a | 0x000c | 0x0020) => {
                    slf.emitter.emit_error(Error::ControlCharacterReference);
                    slf.machine_helper.character_reference_code = match x {
                        0x80 => 0x20AC, // EURO SIGN (€)
                        0x82 => 0x201A, // SINGLE LOW-9 QUOTATION MARK (‚)
                        0x83 => 0x0192, // LATIN SMALL LETTER F WITH HOOK (ƒ)
                        0x84 => 0x201E, // DOUBLE LOW-9 QUOTATION MARK („)
                        0x85 => 0x2026, // HORIZONTAL ELLIPSIS (…)
                        0x86 => 0x2020, // DAGGER (†)
                        0x87 => 0x2021, // DOUBLE DAGGER (‡)
                        0x88 => 0x02C6, // MODIFIER LETTER CIRCUMFLEX ACCENT (ˆ)
                        0x89 => 0x2030, // PER MILLE SIGN (‰)
                        0x8A => 0x0160, // LATIN CAPITAL LETTER S WITH CARON (Š)
                        0x8B => 0x2039, // SINGLE LEFT-POINTING ANGLE QUOTATION MARK (‹)
                        0x8C => 0x0152, // LATIN CAPITAL LIGATURE OE (Œ)
                        0x8E => 0x017D, // LATIN CAPITAL LETTER Z WITH CARON (Ž)
                        0x91 => 0x2018, // LEFT SINGLE QUOTATION MARK (')
                        0x92 => 0x2019, // RIGHT SINGLE QUOTATION MARK (')
                        0x93 => 0x201C, // LEFT DOUBLE QUOTATION MARK (")
                        0x94 => 0x201D, // RIGHT DOUBLE QUOTATION MARK (")
                        0x95 => 0x2022, // BULLET (•)
                        0x96 => 0x2013, // EN DASH (–)
                        0x97 => 0x2014, // EM DASH (—)
                        0x98 => 0x02DC, // SMALL TILDE (˜)
                        0x99 => 0x2122, // TRADE MARK SIGN (™)
                        0x9A => 0x0161, // LATIN SMALL LETTER S WITH CARON (š)
                        0x9B => 0x203A, // SINGLE RIGHT-POINTING ANGLE QUOTATION MARK (›)
                        0x9C => 0x0153, // LATIN SMALL LIGATURE OE (œ)
                        0x9E => 0x017E, // LATIN SMALL LETTER Z WITH CARON (ž)
                        0x9F => 0x0178, // LATIN CAPITAL LETTER Y WITH DIAERESIS (Ÿ)
                        _ => slf.machine_helper.character_reference_code,
                    };
                }
                _ => (),
            }

            let replacement = char::from_u32(slf.machine_helper.character_reference_code)
                .unwrap_or('\u{fffd}');
            slf.machine_helper.temporary_buffer.clear();
            slf.machine_helper.temporary_buffer.push(replacement);
            slf.machine_helper
                .flush_code_points_consumed_as_character_reference(&mut slf.emitter);
            exit_state!(slf)
        }
    }
}
