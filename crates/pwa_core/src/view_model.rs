#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InstallViewModel {
    /// True while a deferred prompt is held and the button would do something.
    pub install_available: bool,
    pub start_url: String,
    pub prompts_shown: u32,
}
