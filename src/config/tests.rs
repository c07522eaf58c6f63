use super::*;

#[test]
fn defaults_match_documented_values() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.public_addr.port(), DEFAULT_PORT);
    assert_eq!(settings.feed.page_size.get(), 10);
    assert!(settings.cache.enabled);
    assert_eq!(settings.cache.ttl, Duration::from_secs(20));
    assert_eq!(settings.auth.user_header.as_str(), "x-remote-user");
    assert_eq!(settings.auth.login_url, "/auth/login/");
    assert!(settings.database.url.is_none());
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());
    raw.feed.page_size = Some(25);

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        feed_page_size: Some(5),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.public_addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.feed.page_size.get(), 5);
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn zero_page_size_is_rejected() {
    let mut raw = RawSettings::default();
    raw.feed.page_size = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero page size");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "feed.page_size",
            ..
        }
    ));
}

#[test]
fn zero_cache_ttl_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.ttl_seconds = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero ttl");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.ttl_seconds",
            ..
        }
    ));
}

#[test]
fn invalid_user_header_is_rejected() {
    let mut raw = RawSettings::default();
    raw.auth.user_header = Some("not a header".to_string());

    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn login_url_accepts_paths_and_absolute_urls() {
    let mut raw = RawSettings::default();
    raw.auth.login_url = Some("https://id.example.com/login".to_string());
    let settings = Settings::from_raw(raw).expect("absolute url");
    assert_eq!(settings.auth.login_url, "https://id.example.com/login");

    let mut raw = RawSettings::default();
    raw.auth.login_url = Some("login".to_string());
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["yatube"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "yatube",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--database-url",
        "postgres://override",
        "--cache-enabled",
        "false",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(
                serve.overrides.database_url.as_deref(),
                Some("postgres://override")
            );
            assert_eq!(serve.overrides.cache_enabled, Some(false));
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_group_create_arguments() {
    let args = CliArgs::parse_from([
        "yatube",
        "groups",
        "--database-url",
        "postgres://example",
        "create",
        "--title",
        "Лев Толстой",
        "--description",
        "Russian classics",
    ]);

    match args.command.expect("groups command") {
        Command::Groups(groups) => {
            assert_eq!(
                groups.database.database_url.as_deref(),
                Some("postgres://example")
            );
            match groups.command {
                GroupsCommand::Create(create) => {
                    assert_eq!(create.title, "Лев Толстой");
                    assert_eq!(create.slug, None);
                    assert_eq!(create.description, "Russian classics");
                }
                _ => panic!("wrong groups command parsed"),
            }
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_group_delete_arguments() {
    let args = CliArgs::parse_from(["yatube", "groups", "delete", "cats"]);

    match args.command.expect("groups command") {
        Command::Groups(groups) => match groups.command {
            GroupsCommand::Delete(delete) => assert_eq!(delete.slug, "cats"),
            _ => panic!("wrong groups command parsed"),
        },
        _ => panic!("wrong command parsed"),
    }
}
