//! Picks the install flow to present for a visitor's browser.

use std::collections::HashMap;
use std::fmt;

pub const UNSUPPORTED_BROWSER_URL: &str =
    "https://mobilesyrup.com/2020/05/24/how-install-progressive-web-app-pwa-android-ios-pc-mac/";

const AUTO_INSTALL_TEMPLATE: &str = "pwa/partials/auto_install.md";
const UNSUPPORTED_TEMPLATE: &str = "pwa/partials/unsupported_browser.md";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrowserFamily {
    Chrome,
    ChromeMobile,
    ChromeMobileIos,
    Edge,
    Opera,
    Firefox,
    FirefoxMobile,
    FirefoxIos,
    Safari,
    MobileSafari,
    Other,
}

const IOS_DEVICES: [&str; 4] = ["iPhone", "iPad", "iPod", "iOS"];

impl BrowserFamily {
    /// Classifies a `User-Agent` header with the woothee browser database.
    pub fn from_user_agent(user_agent: &str) -> Self {
        let Some(parsed) = woothee::parser::Parser::new().parse(user_agent) else {
            return BrowserFamily::Other;
        };
        let ios = IOS_DEVICES.contains(&parsed.os);
        let handheld = matches!(parsed.category, "smartphone" | "mobilephone");
        match parsed.name {
            "Chrome" if ios => BrowserFamily::ChromeMobileIos,
            "Chrome" if handheld => BrowserFamily::ChromeMobile,
            "Chrome" => BrowserFamily::Chrome,
            "Firefox" if ios => BrowserFamily::FirefoxIos,
            "Firefox" if handheld => BrowserFamily::FirefoxMobile,
            "Firefox" => BrowserFamily::Firefox,
            "Safari" if handheld => BrowserFamily::MobileSafari,
            "Safari" => BrowserFamily::Safari,
            "Edge" => BrowserFamily::Edge,
            "Opera" => BrowserFamily::Opera,
            _ => BrowserFamily::Other,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BrowserFamily::Chrome => "Chrome",
            BrowserFamily::ChromeMobile => "Chrome Mobile",
            BrowserFamily::ChromeMobileIos => "Chrome Mobile iOS",
            BrowserFamily::Edge => "Edge",
            BrowserFamily::Opera => "Opera",
            BrowserFamily::Firefox => "Firefox",
            BrowserFamily::FirefoxMobile => "Firefox Mobile",
            BrowserFamily::FirefoxIos => "Firefox iOS",
            BrowserFamily::Safari => "Safari",
            BrowserFamily::MobileSafari => "Mobile Safari",
            BrowserFamily::Other => "Other",
        }
    }
}

impl fmt::Display for BrowserFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallGuidance {
    /// The browser fires `beforeinstallprompt`; the install button drives it.
    AutoInstall { template: String },
    /// The user has to follow browser-specific manual steps.
    Instructions { template: String },
    /// Refer the user to general PWA install documentation.
    Unsupported { template: String, help_url: String },
}

#[derive(Debug, Clone)]
pub struct InstallerGuide {
    pub auto_install_browsers: Vec<BrowserFamily>,
    pub auto_install_template: String,
    pub instruction_templates: HashMap<BrowserFamily, String>,
    pub unsupported_template: String,
    pub unsupported_browser_url: String,
}

impl Default for InstallerGuide {
    fn default() -> Self {
        Self {
            auto_install_browsers: vec![BrowserFamily::Chrome, BrowserFamily::ChromeMobile],
            auto_install_template: AUTO_INSTALL_TEMPLATE.to_string(),
            instruction_templates: HashMap::new(),
            unsupported_template: UNSUPPORTED_TEMPLATE.to_string(),
            unsupported_browser_url: UNSUPPORTED_BROWSER_URL.to_string(),
        }
    }
}

impl InstallerGuide {
    pub fn guidance_for(&self, user_agent: &str) -> InstallGuidance {
        self.guidance(BrowserFamily::from_user_agent(user_agent))
    }

    pub fn guidance(&self, family: BrowserFamily) -> InstallGuidance {
        if self.auto_install_browsers.contains(&family) {
            return InstallGuidance::AutoInstall {
                template: self.auto_install_template.clone(),
            };
        }
        if let Some(template) = self.instruction_templates.get(&family) {
            return InstallGuidance::Instructions {
                template: template.clone(),
            };
        }
        InstallGuidance::Unsupported {
            template: self.unsupported_template.clone(),
            help_url: self.unsupported_browser_url.clone(),
        }
    }
}
