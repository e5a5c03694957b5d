use sweetdates_core::{
    RecordStore, RepoError, SettingValidationError, SettingsRepository, SettingsService,
    SetupSignal, SqliteSettingsRepository, Theme, PARTNER_NAME_KEY, THEME_KEY, USER_NAME_KEY,
};

fn service<'a>(
    store: &'a mut RecordStore,
    signal: &SetupSignal,
) -> SettingsService<SqliteSettingsRepository<'a>> {
    SettingsService::new(SqliteSettingsRepository::new(store), signal.clone())
}

#[test]
fn missing_key_reads_as_none() {
    let mut store = RecordStore::in_memory().unwrap();
    let signal = SetupSignal::new();

    assert_eq!(service(&mut store, &signal).get("nothing").unwrap(), None);
}

#[test]
fn set_then_get_returns_last_write() {
    let mut store = RecordStore::in_memory().unwrap();
    let signal = SetupSignal::new();
    let mut settings = service(&mut store, &signal);

    for value in ["first", "", "  padded  ", "ünïcødé ❤", "last"] {
        settings.set("k", value).unwrap();
        assert_eq!(settings.get("k").unwrap().as_deref(), Some(value));
    }
}

#[test]
fn upsert_keeps_row_identity() {
    let mut store = RecordStore::in_memory().unwrap();
    let mut repo = SqliteSettingsRepository::new(&mut store);

    repo.set_setting("theme", "rose").unwrap();
    let before = repo.list_settings().unwrap();
    repo.set_setting("theme", "mint").unwrap();
    let after = repo.list_settings().unwrap();

    assert_eq!(before.len(), 1);
    assert_eq!(after.len(), 1);
    assert_eq!(before[0].id, after[0].id);
    assert_eq!(after[0].value, "mint");
}

#[test]
fn setup_requires_both_names_non_blank() {
    let mut store = RecordStore::in_memory().unwrap();
    let signal = SetupSignal::new();
    let mut settings = service(&mut store, &signal);

    assert!(!settings.is_setup_complete().unwrap());

    settings.set(USER_NAME_KEY, "Alex").unwrap();
    assert!(!settings.is_setup_complete().unwrap());

    settings.set(PARTNER_NAME_KEY, "   ").unwrap();
    assert!(!settings.is_setup_complete().unwrap());
    assert!(!signal.is_complete());

    settings.set(PARTNER_NAME_KEY, "Sam").unwrap();
    assert!(settings.is_setup_complete().unwrap());
    assert!(signal.is_complete());

    settings.set(USER_NAME_KEY, "").unwrap();
    assert!(!settings.is_setup_complete().unwrap());
    assert!(!signal.is_complete());
}

#[test]
fn unrelated_keys_do_not_publish() {
    let mut store = RecordStore::in_memory().unwrap();
    let signal = SetupSignal::new();
    let mut subscriber = signal.subscribe();

    service(&mut store, &signal).set(THEME_KEY, "sky").unwrap();
    assert_eq!(subscriber.changed(), None);
}

#[test]
fn complete_setup_trims_names_and_publishes() {
    let mut store = RecordStore::in_memory().unwrap();
    let signal = SetupSignal::new();
    let mut subscriber = signal.subscribe();
    let mut settings = service(&mut store, &signal);

    let snapshot = settings
        .complete_setup("  Alex ", "Sam  ", Theme::Rose)
        .unwrap();

    assert!(snapshot.complete);
    assert_eq!(settings.get(USER_NAME_KEY).unwrap().as_deref(), Some("Alex"));
    assert_eq!(settings.get(PARTNER_NAME_KEY).unwrap().as_deref(), Some("Sam"));
    assert_eq!(settings.theme().unwrap(), Theme::Rose);
    assert!(subscriber.changed().unwrap().complete);
}

#[test]
fn complete_setup_rejects_blank_names_without_writing() {
    let mut store = RecordStore::in_memory().unwrap();
    let signal = SetupSignal::new();
    let mut settings = service(&mut store, &signal);

    let err = settings
        .complete_setup("Alex", " \t ", Theme::Lilac)
        .unwrap_err();

    assert!(err.is_validation());
    assert!(matches!(
        err,
        RepoError::InvalidSetting(SettingValidationError::BlankName(PARTNER_NAME_KEY))
    ));
    assert_eq!(settings.get(USER_NAME_KEY).unwrap(), None);
    assert_eq!(settings.get(THEME_KEY).unwrap(), None);
    assert!(!signal.is_complete());
}

#[test]
fn update_names_replaces_both() {
    let mut store = RecordStore::in_memory().unwrap();
    let signal = SetupSignal::new();
    let mut settings = service(&mut store, &signal);
    settings.complete_setup("Alex", "Sam", Theme::Lilac).unwrap();

    settings.update_names("Alexandra", " Samuel").unwrap();

    let names = settings.names().unwrap();
    assert_eq!(names.user_name.as_deref(), Some("Alexandra"));
    assert_eq!(names.partner_name.as_deref(), Some("Samuel"));
    assert!(names.is_complete());

    let err = settings.update_names("", "Samuel").unwrap_err();
    assert!(matches!(
        err,
        RepoError::InvalidSetting(SettingValidationError::BlankName(USER_NAME_KEY))
    ));
    assert_eq!(
        settings.get(USER_NAME_KEY).unwrap().as_deref(),
        Some("Alexandra")
    );
}

#[test]
fn theme_defaults_to_lilac_and_ignores_unknown_ids() {
    let mut store = RecordStore::in_memory().unwrap();
    let signal = SetupSignal::new();
    let mut settings = service(&mut store, &signal);

    assert_eq!(settings.theme().unwrap(), Theme::Lilac);

    settings.set_theme(Theme::Mint).unwrap();
    assert_eq!(settings.get(THEME_KEY).unwrap().as_deref(), Some("mint"));
    assert_eq!(settings.theme().unwrap(), Theme::Mint);

    settings.set(THEME_KEY, "neon").unwrap();
    assert_eq!(settings.theme().unwrap(), Theme::Lilac);
}
