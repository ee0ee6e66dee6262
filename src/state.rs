use crate::utils::MachineState;

/// States that the tokenizer can be switched to from outside.
///
/// The correct state to continue in after a start tag depends on tree
/// construction, which this crate does not implement. Consumers that know the
/// document structure (or accept the approximation in
/// [`crate::naive_next_state`]) use [`crate::Tokenizer::set_state`] to steer
/// the machine into these content states.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
    /// The data state.
    Data,
    /// The PLAINTEXT state.
    PlainText,
    /// The RCDATA state.
    RcData,
    /// The RAWTEXT state.
    RawText,
    /// The script data state.
    ScriptData,
    /// The CDATA section state.
    CdataSection,
}

impl From<State> for MachineState {
    fn from(state: State) -> Self {
        match state {
            State::Data => MachineState::Data,
            State::PlainText => MachineState::PlainText,
            State::RcData => MachineState::RcData,
            State::RawText => MachineState::RawText,
            State::ScriptData => MachineState::ScriptData,
            State::CdataSection => MachineState::CdataSection,
        }
    }
}
