/// Lifecycle of the image the crop editor is working on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorState {
    #[default]
    Empty,
    Decoding,
    /// Metrics are resolved; gestures and extraction are available.
    Ready,
    /// The host reported a failed decode, or the decoded image was unusable.
    Failed,
}

impl EditorState {
    pub const fn accepts_input(self) -> bool {
        matches!(self, Self::Ready)
    }
}
