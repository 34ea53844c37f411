use std::ffi::OsString;

use serde::{Deserialize, Serialize};

/// Environment variable pinned for the duration of a run so that the
/// output of external commands is stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleSetting {
    #[serde(default = "default_var")]
    pub var: String,
    #[serde(default = "default_value")]
    pub value: String,
}

fn default_var() -> String {
    "LC_ALL".into()
}

fn default_value() -> String {
    "C".into()
}

impl Default for LocaleSetting {
    fn default() -> Self {
        Self {
            var: default_var(),
            value: default_value(),
        }
    }
}

/// Sets an environment variable and restores its previous state on drop.
///
/// The variable is process-wide: hold one pin around the whole run rather
/// than one per dependency.
#[must_use = "the variable is restored as soon as the pin is dropped"]
#[derive(Debug)]
pub struct LocalePin {
    var: String,
    previous: Option<OsString>,
}

impl LocalePin {
    pub fn acquire(setting: &LocaleSetting) -> Self {
        let previous = std::env::var_os(&setting.var);
        std::env::set_var(&setting.var, &setting.value);
        tracing::trace!(var = %setting.var, value = %setting.value, "pinned locale");
        Self {
            var: setting.var.clone(),
            previous,
        }
    }
}

impl Drop for LocalePin {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(value) => std::env::set_var(&self.var, value),
            None => std::env::remove_var(&self.var),
        }
        tracing::trace!(var = %self.var, "restored locale");
    }
}
