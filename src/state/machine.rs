use super::error::{StateError, StateResult};
use super::{EditorEvent, EditorState, StateTransition};

#[derive(Debug)]
pub struct StateMachine {
    state: EditorState,
    transition_history: Vec<StateTransition>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: EditorState::default(),
            transition_history: Vec::new(),
        }
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn history(&self) -> &[StateTransition] {
        &self.transition_history
    }

    pub fn can_transition(&self, event: EditorEvent) -> bool {
        self.next_state(event).is_some()
    }

    pub fn next_state(&self, event: EditorEvent) -> Option<EditorState> {
        use EditorEvent::*;
        match (self.state, event) {
            (_, ImageRequested) => Some(EditorState::Decoding),
            (EditorState::Decoding, ImageDecoded) => Some(EditorState::Ready),
            (EditorState::Decoding, ImageFailed) => Some(EditorState::Failed),
            // The host may still report failure for an image it already delivered.
            (EditorState::Ready, ImageFailed) => Some(EditorState::Failed),
            _ => None,
        }
    }

    pub fn transition(&mut self, event: EditorEvent) -> StateResult<EditorState> {
        tracing::debug!(from = ?self.state, event = ?event, "request state transition");
        let next = self.next_state(event).ok_or_else(|| {
            let from = self.state;
            tracing::warn!(from = ?from, event = ?event, "invalid state transition requested");
            StateError::InvalidStateTransition { from, event }
        })?;

        let record = StateTransition::new(Some(self.state), event, next);
        self.state = next;
        self.transition_history.push(record);

        Ok(self.state)
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
