use crate::utils::MachineState as State;
use crate::Emitter;

/// Scratch state of the tokenization machine: current and return state, the
/// temporary buffer, and the numeric character reference accumulator.
#[derive(Debug)]
pub(crate) struct MachineHelper {
    pub(crate) temporary_buffer: String,
    pub(crate) character_reference_code: u32,
    pub(crate) state: State,
    return_state: Option<State>,
}

impl Default for MachineHelper {
    fn default() -> Self {
        MachineHelper {
            temporary_buffer: String::new(),
            character_reference_code: 0,
            state: State::Data,
            return_state: None,
        }
    }
}

impl MachineHelper {
    pub(crate) fn is_consumed_as_part_of_an_attribute(&self) -> bool {
        matches!(
            self.return_state,
            Some(
                State::AttributeValueDoubleQuoted
                    | State::AttributeValueSingleQuoted
                    | State::AttributeValueUnquoted
            )
        )
    }

    pub(crate) fn flush_code_points_consumed_as_character_reference<E: Emitter>(
        &mut self,
        emitter: &mut E,
    ) {
        if self.is_consumed_as_part_of_an_attribute() {
            emitter.push_attribute_value(&self.temporary_buffer);
            self.temporary_buffer.clear();
        } else {
            self.flush_buffer_characters(emitter);
        }
    }

    pub(crate) fn flush_buffer_characters<E: Emitter>(&mut self, emitter: &mut E) {
        emitter.emit_string(&self.temporary_buffer);
        self.temporary_buffer.clear();
    }

    pub(crate) fn enter_state(&mut self, state: State) {
        debug_assert!(self.return_state.is_none());
        self.return_state = Some(self.state);
        self.switch_to(state);
    }

    pub(crate) fn pop_return_state(&mut self) -> State {
        self.return_state.take().unwrap()
    }

    pub(crate) fn switch_to(&mut self, state: State) {
        log::trace!("state: {:?} -> {:?}", self.state, state);
        self.state = state;
    }
}

macro_rules! mutate_character_reference {
    ($slf:expr, * $mul:literal + $x:ident - $sub:literal) => {
        match $slf
            .machine_helper
            .character_reference_code
            .checked_mul($mul)
            .and_then(|cr| cr.checked_add($x as u32 - $sub))
        {
            Some(cr) => $slf.machine_helper.character_reference_code = cr,
            None => {
                // provoke the out-of-range branch of NumericCharacterReferenceEnd
                $slf.machine_helper.character_reference_code = 0x110000;
            }
        };
    };
}

pub(crate) use mutate_character_reference;

macro_rules! switch_to {
    ($slf:expr, $state:ident) => {{
        $slf.machine_helper.switch_to(State::$state);
        Ok(ControlToken::Continue)
    }};
}

pub(crate) use switch_to;

macro_rules! enter_state {
    ($slf:expr, $state:ident) => {{
        $slf.machine_helper.enter_state(State::$state);
        Ok(ControlToken::Continue)
    }};
}

pub(crate) use enter_state;

macro_rules! exit_state {
    ($slf:expr) => {{
        let state = $slf.machine_helper.pop_return_state();
        $slf.machine_helper.switch_to(state);
        Ok(ControlToken::Continue)
    }};
}

pub(crate) use exit_state;

/// Push the code point back into the reader and re-dispatch it in the given
/// state. `None` (end of input) is not pushed back; the reader re-reports it.
macro_rules! reconsume_in {
    ($slf:expr, $c:expr, $state:ident) => {{
        if $c.is_some() {
            $slf.reader.backtrack()?;
        }
        $slf.machine_helper.switch_to(State::$state);
        Ok(ControlToken::Continue)
    }};
}

pub(crate) use reconsume_in;

macro_rules! reconsume_in_return_state {
    ($slf:expr, $c:expr) => {{
        if $c.is_some() {
            $slf.reader.backtrack()?;
        }
        let state = $slf.machine_helper.pop_return_state();
        $slf.machine_helper.switch_to(state);
        Ok(ControlToken::Continue)
    }};
}

pub(crate) use reconsume_in_return_state;

macro_rules! emit_current_tag_and_switch_to {
    ($slf:expr, $state:ident) => {{
        let state = $slf.emitter.emit_current_tag().map(State::from);
        $slf.machine_helper.switch_to(state.unwrap_or(State::$state));
        Ok(ControlToken::Continue)
    }};
}

pub(crate) use emit_current_tag_and_switch_to;

macro_rules! eof {
    () => {{
        Ok(ControlToken::Eof)
    }};
}

pub(crate) use eof;

macro_rules! cont {
    () => {{
        Ok(ControlToken::Continue)
    }};
}

pub(crate) use cont;
