//! Page-side install controller: feeds browser signals through the pure
//! `pwa_core::update` and executes the resulting effects against the page.

use pwa_core::{update, Effect, InstallState, InstallViewModel, Msg, PromptHandle};
use pwa_logging::{pwa_debug, pwa_info};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("install prompt {prompt:?} rejected: {reason}")]
pub struct PromptError {
    pub prompt: PromptHandle,
    pub reason: String,
}

/// The browser page the controller drives.
pub trait Page {
    fn prevent_default(&mut self, prompt: PromptHandle);
    fn prompt(&mut self, prompt: PromptHandle) -> Result<(), PromptError>;
    fn navigate(&mut self, url: &str);
}

/// One per page load. Owns the deferred prompt state.
pub struct InstallController<P: Page> {
    state: InstallState,
    page: P,
}

impl<P: Page> InstallController<P> {
    pub fn new(start_url: impl Into<String>, page: P) -> Self {
        Self {
            state: InstallState::new(start_url),
            page,
        }
    }

    pub fn view(&self) -> InstallViewModel {
        self.state.view()
    }

    #[cfg(test)]
    pub fn page(&self) -> &P {
        &self.page
    }

    /// Handles one signal to completion. A rejected prompt surfaces here;
    /// the handle is gone either way.
    pub fn dispatch(&mut self, msg: Msg) -> Result<(), PromptError> {
        pwa_debug!("install controller <- {:?}", msg);
        let (next, effects) = update(std::mem::take(&mut self.state), msg);
        self.state = next;
        for effect in effects {
            match effect {
                Effect::SuppressDefaultPrompt { prompt } => self.page.prevent_default(prompt),
                Effect::ShowPrompt { prompt } => {
                    pwa_info!("showing install prompt {:?}", prompt);
                    self.page.prompt(prompt)?;
                }
                Effect::Navigate { url } => {
                    pwa_info!("app installed, navigating to {}", url);
                    self.page.navigate(&url);
                }
            }
        }
        Ok(())
    }
}

/// Page that reports every effect on stdout.
#[derive(Debug, Default)]
pub struct ConsolePage;

impl Page for ConsolePage {
    fn prevent_default(&mut self, prompt: PromptHandle) {
        println!("prevent default install UI (prompt {})", prompt.0);
    }

    fn prompt(&mut self, prompt: PromptHandle) -> Result<(), PromptError> {
        println!("install prompt {} shown", prompt.0);
        Ok(())
    }

    fn navigate(&mut self, url: &str) {
        println!("navigate to {url}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct RecordingPage {
        prevented: Vec<PromptHandle>,
        prompted: Vec<PromptHandle>,
        navigations: Vec<String>,
        reject: bool,
    }

    impl Page for RecordingPage {
        fn prevent_default(&mut self, prompt: PromptHandle) {
            self.prevented.push(prompt);
        }

        fn prompt(&mut self, prompt: PromptHandle) -> Result<(), PromptError> {
            self.prompted.push(prompt);
            if self.reject {
                return Err(PromptError {
                    prompt,
                    reason: "user gesture required".to_string(),
                });
            }
            Ok(())
        }

        fn navigate(&mut self, url: &str) {
            self.navigations.push(url.to_string());
        }
    }

    #[test]
    fn prompt_invoked_once_per_capture() {
        let mut controller = InstallController::new("/app/", RecordingPage::default());

        controller
            .dispatch(Msg::BeforeInstallPrompt(PromptHandle(1)))
            .unwrap();
        controller.dispatch(Msg::InstallButtonClicked).unwrap();
        controller.dispatch(Msg::InstallButtonClicked).unwrap();

        assert_eq!(controller.page().prevented, vec![PromptHandle(1)]);
        assert_eq!(controller.page().prompted, vec![PromptHandle(1)]);
        assert!(!controller.view().install_available);
    }

    #[test]
    fn click_without_signal_touches_nothing() {
        let mut controller = InstallController::new("/app/", RecordingPage::default());

        assert!(controller.dispatch(Msg::InstallButtonClicked).is_ok());
        assert!(controller.page().prompted.is_empty());
        assert!(controller.page().navigations.is_empty());
    }

    #[test]
    fn installed_navigates_to_start_url() {
        let mut controller = InstallController::new("/app/", RecordingPage::default());
        controller.dispatch(Msg::AppInstalled).unwrap();

        assert_eq!(controller.page().navigations, vec!["/app/".to_string()]);
    }

    #[test]
    fn rejected_prompt_propagates_and_is_not_retried() {
        let page = RecordingPage {
            reject: true,
            ..RecordingPage::default()
        };
        let mut controller = InstallController::new("/app/", page);
        controller
            .dispatch(Msg::BeforeInstallPrompt(PromptHandle(4)))
            .unwrap();

        let err = controller.dispatch(Msg::InstallButtonClicked).unwrap_err();
        assert_eq!(err.prompt, PromptHandle(4));

        controller.dispatch(Msg::InstallButtonClicked).unwrap();
        assert_eq!(controller.page().prompted, vec![PromptHandle(4)]);
    }
}
