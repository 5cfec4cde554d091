use crate::PromptHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Keep the browser from showing its own install UI for this event.
    SuppressDefaultPrompt { prompt: PromptHandle },
    /// Invoke the deferred prompt. The handle is already cleared from state.
    ShowPrompt { prompt: PromptHandle },
    /// Navigate the current page.
    Navigate { url: String },
}
