#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Browser signalled install eligibility (`beforeinstallprompt`).
    BeforeInstallPrompt(crate::PromptHandle),
    /// Browser reported a completed install (`appinstalled`).
    AppInstalled,
    /// User activated the install button.
    InstallButtonClicked,
}
