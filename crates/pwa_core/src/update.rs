use crate::{Effect, InstallState, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: InstallState, msg: Msg) -> (InstallState, Vec<Effect>) {
    let effects = match msg {
        Msg::BeforeInstallPrompt(prompt) => {
            // Only one handle is live; a newer signal replaces the old one.
            let _stale = state.defer_prompt(prompt);
            vec![Effect::SuppressDefaultPrompt { prompt }]
        }
        Msg::InstallButtonClicked => match state.take_prompt() {
            Some(prompt) => vec![Effect::ShowPrompt { prompt }],
            None => Vec::new(),
        },
        Msg::AppInstalled => vec![Effect::Navigate {
            url: state.start_url().to_string(),
        }],
    };

    (state, effects)
}
