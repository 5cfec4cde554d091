use crate::view_model::InstallViewModel;

/// Opaque one-shot handle to a deferred install prompt, issued by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PromptHandle(pub u64);

/// Install controller state for a single page session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InstallState {
    start_url: String,
    deferred_prompt: Option<PromptHandle>,
    prompts_shown: u32,
}

impl InstallState {
    pub fn new(start_url: impl Into<String>) -> Self {
        Self {
            start_url: start_url.into(),
            ..Self::default()
        }
    }

    pub fn view(&self) -> InstallViewModel {
        InstallViewModel {
            install_available: self.deferred_prompt.is_some(),
            start_url: self.start_url.clone(),
            prompts_shown: self.prompts_shown,
        }
    }

    pub fn start_url(&self) -> &str {
        &self.start_url
    }

    pub fn deferred_prompt(&self) -> Option<PromptHandle> {
        self.deferred_prompt
    }

    /// Stores a freshly captured prompt, dropping any older one.
    pub(crate) fn defer_prompt(&mut self, prompt: PromptHandle) -> Option<PromptHandle> {
        self.deferred_prompt.replace(prompt)
    }

    /// Consumes the held prompt. A consumed handle is never returned twice.
    pub(crate) fn take_prompt(&mut self) -> Option<PromptHandle> {
        let prompt = self.deferred_prompt.take();
        if prompt.is_some() {
            self.prompts_shown += 1;
        }
        prompt
    }
}
