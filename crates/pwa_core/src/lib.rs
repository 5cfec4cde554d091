//! PWA core: pure install-controller state machine, worker lifecycle and
//! the web app manifest / installer guidance data.
mod effect;
mod installer;
mod lifecycle;
mod manifest;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use installer::{BrowserFamily, InstallGuidance, InstallerGuide, UNSUPPORTED_BROWSER_URL};
pub use lifecycle::{LifecycleError, WorkerState};
pub use manifest::{
    Manifest, ManifestError, SettingsSource, DEFAULT_SETTINGS_PREFIX, MANIFEST_FIELDS, REQUIRED_FIELDS,
};
pub use msg::Msg;
pub use state::{InstallState, PromptHandle};
pub use update::update;
pub use view_model::InstallViewModel;
