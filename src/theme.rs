//! Splash theme selection.

use crate::error::{Result, StartupError};
use std::fmt;

/// Theme the splash screen is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplashTheme {
    /// Light appearance.
    Default,
    /// Dark appearance.
    Night,
}

impl SplashTheme {
    /// Resolve a configured theme name.
    ///
    /// # Errors
    ///
    /// Any name other than `default`/`night` is a programming error and
    /// returns [`StartupError::UnsupportedTheme`].
    pub fn resolve(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "night" => Ok(Self::Night),
            _ => Err(StartupError::UnsupportedTheme(name.to_owned())),
        }
    }

    /// Style resource the host applies before drawing the splash.
    #[must_use]
    pub fn style_name(self) -> &'static str {
        match self {
            Self::Default => "theme.splash",
            Self::Night => "theme.night.splash",
        }
    }

    pub fn is_night(self) -> bool {
        matches!(self, Self::Night)
    }
}

impl fmt::Display for SplashTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Night => write!(f, "night"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_themes() {
        assert_eq!(SplashTheme::resolve("default").ok(), Some(SplashTheme::Default));
        assert_eq!(SplashTheme::resolve(" Night ").ok(), Some(SplashTheme::Night));
        assert!(SplashTheme::resolve("night").is_ok_and(SplashTheme::is_night));
    }

    #[test]
    fn unknown_theme_is_rejected() {
        for alias in ["light", "dark"] {
            assert!(SplashTheme::resolve(alias).is_err(), "{alias} is not a theme name");
        }
        match SplashTheme::resolve("sepia") {
            Err(StartupError::UnsupportedTheme(name)) => assert_eq!(name, "sepia"),
            other => panic!("expected UnsupportedTheme, got {other:?}"),
        }
    }

    #[test]
    fn style_names_differ() {
        assert_ne!(
            SplashTheme::Default.style_name(),
            SplashTheme::Night.style_name()
        );
    }
}
