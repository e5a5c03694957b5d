//! Settings use-case service.
//!
//! # Responsibility
//! - Typed access to names and theme on top of the settings repository.
//! - Derive "setup complete" from stored names and publish it.
//!
//! # Invariants
//! - Setup completion is recomputed from storage on every read; never cached.
//! - Only writes made through this service publish to the [`SetupSignal`].
//! - Names are trimmed before storage; blank names are rejected.

use crate::model::setting::{
    SettingValidationError, Theme, PARTNER_NAME_KEY, THEME_KEY, USER_NAME_KEY,
};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::settings_repo::SettingsRepository;
use crate::service::setup_signal::{SetupSignal, SetupSnapshot};
use log::info;

/// The two participant names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoupleNames {
    pub user_name: Option<String>,
    pub partner_name: Option<String>,
}

impl CoupleNames {
    /// Both names present and non-blank.
    pub fn is_complete(&self) -> bool {
        is_filled(self.user_name.as_deref()) && is_filled(self.partner_name.as_deref())
    }
}

/// Settings facade over repository implementations.
pub struct SettingsService<R: SettingsRepository> {
    repo: R,
    signal: SetupSignal,
}

impl<R: SettingsRepository> SettingsService<R> {
    /// Creates a facade that publishes setup changes to `signal`.
    pub fn new(repo: R, signal: SetupSignal) -> Self {
        Self { repo, signal }
    }

    pub fn get(&mut self, key: &str) -> RepoResult<Option<String>> {
        self.repo.get_setting(key)
    }

    /// Upserts one setting; name keys refresh the setup signal.
    pub fn set(&mut self, key: &str, value: &str) -> RepoResult<()> {
        self.repo.set_setting(key, value)?;
        if key == USER_NAME_KEY || key == PARTNER_NAME_KEY {
            self.refresh_setup()?;
        }
        Ok(())
    }

    pub fn names(&mut self) -> RepoResult<CoupleNames> {
        Ok(CoupleNames {
            user_name: self.repo.get_setting(USER_NAME_KEY)?,
            partner_name: self.repo.get_setting(PARTNER_NAME_KEY)?,
        })
    }

    pub fn is_setup_complete(&mut self) -> RepoResult<bool> {
        Ok(self.names()?.is_complete())
    }

    /// Recomputes setup completion from storage and publishes it.
    pub fn refresh_setup(&mut self) -> RepoResult<SetupSnapshot> {
        let complete = self.is_setup_complete()?;
        Ok(self.signal.publish(complete))
    }

    /// Stored theme, or the default for missing/unknown ids.
    pub fn theme(&mut self) -> RepoResult<Theme> {
        let stored = self.repo.get_setting(THEME_KEY)?;
        Ok(Theme::from_id_or_default(stored.as_deref()))
    }

    pub fn set_theme(&mut self, theme: Theme) -> RepoResult<()> {
        self.repo.set_setting(THEME_KEY, theme.id())
    }

    /// First-run setup: stores both names and the theme in one transaction.
    ///
    /// # Errors
    /// - `InvalidSetting` when either name is blank; nothing is written.
    /// - `InconsistentState` when the read-back does not match the input.
    pub fn complete_setup(
        &mut self,
        user_name: &str,
        partner_name: &str,
        theme: Theme,
    ) -> RepoResult<SetupSnapshot> {
        let (user_name, partner_name) = validate_names(user_name, partner_name)?;
        self.repo.set_settings(&[
            (USER_NAME_KEY, user_name),
            (PARTNER_NAME_KEY, partner_name),
            (THEME_KEY, theme.id()),
        ])?;

        let saved = self.names()?;
        if saved.user_name.as_deref() != Some(user_name)
            || saved.partner_name.as_deref() != Some(partner_name)
        {
            return Err(RepoError::InconsistentState(
                "saved names differ from setup input",
            ));
        }

        let snapshot = self.refresh_setup()?;
        info!(
            "event=setup_complete module=service status=ok theme={}",
            theme.id()
        );
        Ok(snapshot)
    }

    /// Replaces both names atomically.
    pub fn update_names(
        &mut self,
        user_name: &str,
        partner_name: &str,
    ) -> RepoResult<SetupSnapshot> {
        let (user_name, partner_name) = validate_names(user_name, partner_name)?;
        self.repo.set_settings(&[
            (USER_NAME_KEY, user_name),
            (PARTNER_NAME_KEY, partner_name),
        ])?;
        self.refresh_setup()
    }
}

fn validate_names<'a>(
    user_name: &'a str,
    partner_name: &'a str,
) -> Result<(&'a str, &'a str), SettingValidationError> {
    let user_name = user_name.trim();
    if user_name.is_empty() {
        return Err(SettingValidationError::BlankName(USER_NAME_KEY));
    }
    let partner_name = partner_name.trim();
    if partner_name.is_empty() {
        return Err(SettingValidationError::BlankName(PARTNER_NAME_KEY));
    }
    Ok((user_name, partner_name))
}

fn is_filled(value: Option<&str>) -> bool {
    value.is_some_and(|value| !value.trim().is_empty())
}
