use std::path::{Path, PathBuf};

use clap::Parser;
use qtd2pg_packer::VideoInput;

use super::*;
use crate::pack::{collect_videos, list_subfolders, parse_video};

fn videos(folders: &[&str]) -> Vec<VideoInput> {
    folders.iter().map(|f| VideoInput::new(*f)).collect()
}

#[test]
fn parses_pack_into_new_database() {
    let cli = Cli::try_parse_from([
        "qtd2pg",
        "pack",
        "--new-db",
        "geo_db",
        "--point-table",
        "pts",
        "--line-table",
        "lns",
        "--video",
        "/data/flight1",
        "--video",
        "/data/flight2=evening",
    ])
    .expect("expected valid cli args");

    let Commands::Pack(args) = cli.command else {
        panic!("expected pack command");
    };
    assert_eq!(args.new_db.as_deref(), Some("geo_db"));
    assert!(args.db.is_none());
    assert_eq!(args.tables.mode, GeometryMode::Both);
    assert_eq!(args.videos.len(), 2);
    assert_eq!(args.videos[0].folder, PathBuf::from("/data/flight1"));
    assert_eq!(args.videos[0].alias, None);
    assert_eq!(args.videos[1].alias.as_deref(), Some("evening"));
}

#[test]
fn pack_requires_a_target() {
    assert!(Cli::try_parse_from(["qtd2pg", "pack", "--video", "/data/a"]).is_err());
}

#[test]
fn pack_rejects_both_targets() {
    assert!(Cli::try_parse_from([
        "qtd2pg", "pack", "--new-db", "a", "--db", "b", "--video", "/data/a"
    ])
    .is_err());
}

#[test]
fn mode_is_case_insensitive() {
    let cli = Cli::try_parse_from(["qtd2pg", "pack", "--db", "gis", "--mode", "LINE"])
        .expect("expected valid cli args");
    let Commands::Pack(args) = cli.command else {
        panic!("expected pack command");
    };
    assert_eq!(args.tables.mode, GeometryMode::Line);
}

#[test]
fn unknown_mode_is_rejected() {
    assert!(Cli::try_parse_from(["qtd2pg", "pack", "--db", "gis", "--mode", "polygon"]).is_err());
}

#[test]
fn parses_check_command() {
    let cli = Cli::try_parse_from([
        "qtd2pg",
        "check",
        "--db",
        "gis",
        "--mode",
        "point",
        "--point-table",
        "pts",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Check {
            ref db,
            tables: TableArgs {
                mode: GeometryMode::Point,
                ref point_table,
                ..
            },
            ..
        } if db == "gis" && point_table.as_deref() == Some("pts")
    ));
}

#[test]
fn parses_db_columns_command() {
    let cli = Cli::try_parse_from([
        "qtd2pg", "db", "columns", "--db", "gis", "--table", "pts",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Db {
            command: DbCommands::Columns { ref db, ref table, .. }
        } if db == "gis" && table == "pts"
    ));
}

#[test]
fn db_ping_defaults_to_maintenance_database() {
    let cli = Cli::try_parse_from(["qtd2pg", "db", "ping"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Db {
            command: DbCommands::Ping { db: None, .. }
        }
    ));
}

#[test]
fn table_args_fall_back_to_configured_names() {
    let settings = Settings::default();
    let args = TableArgs {
        mode: GeometryMode::Both,
        point_table: None,
        line_table: Some("lns".to_string()),
    };
    assert_eq!(
        args.resolve(&settings).unwrap(),
        TargetTables::Both {
            point: "gps_points".to_string(),
            line: "lns".to_string(),
        }
    );
}

#[test]
fn line_mode_uses_the_line_table() {
    let args = TableArgs {
        mode: GeometryMode::Line,
        point_table: Some("pts".to_string()),
        line_table: None,
    };
    assert_eq!(
        args.resolve(&Settings::default()).unwrap(),
        TargetTables::Line {
            line: "gps_lines".to_string(),
        }
    );
}

#[test]
fn same_point_and_line_table_is_rejected() {
    let args = TableArgs {
        mode: GeometryMode::Both,
        point_table: Some("t".to_string()),
        line_table: Some("t".to_string()),
    };
    assert!(args.resolve(&Settings::default()).is_err());
}

#[test]
fn video_alias_is_optional() {
    assert_eq!(parse_video("/a").unwrap(), VideoInput::new("/a"));
    assert_eq!(parse_video("/a=").unwrap(), VideoInput::new("/a"));
    assert_eq!(
        parse_video("/a= dawn ").unwrap(),
        VideoInput::new("/a").with_alias("dawn")
    );
    assert!(parse_video("=alias").is_err());
}

#[test]
fn duplicate_videos_keep_first_occurrence() {
    let explicit = vec![
        VideoInput::new("/d/a").with_alias("first"),
        VideoInput::new("/d/b"),
        VideoInput::new("/d/a"),
    ];
    let collected =
        collect_videos(explicit, vec![PathBuf::from("/d/b"), PathBuf::from("/d/c")], 20).unwrap();

    assert_eq!(
        collected,
        vec![
            VideoInput::new("/d/a").with_alias("first"),
            VideoInput::new("/d/b"),
            VideoInput::new("/d/c"),
        ]
    );
}

#[test]
fn input_limit_caps_the_batch() {
    assert!(collect_videos(videos(&["/1", "/2", "/3"]), Vec::new(), 3).is_ok());
    let err = collect_videos(videos(&["/1", "/2", "/3"]), Vec::new(), 2).unwrap_err();
    assert!(err.to_string().contains("input limit of 2"), "{err}");
}

#[test]
fn empty_batch_is_an_error() {
    assert!(collect_videos(Vec::new(), Vec::new(), 20).is_err());
}

#[test]
fn subfolders_are_sorted_directories_only() {
    let root = tempfile::tempdir().unwrap();
    std::fs::create_dir(root.path().join("b_flight")).unwrap();
    std::fs::create_dir(root.path().join("a_flight")).unwrap();
    std::fs::write(root.path().join("notes.txt"), b"").unwrap();

    let folders = list_subfolders(root.path()).unwrap();
    let names: Vec<&str> = folders
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
        .collect();
    assert_eq!(names, vec!["a_flight", "b_flight"]);
}

#[test]
fn missing_parent_directory_is_an_error() {
    assert!(list_subfolders(Path::new("/definitely/not/here")).is_err());
}

#[test]
fn credentials_prefer_explicit_user() {
    let config = AppConfig {
        db_host: "localhost".to_string(),
        db_port: 5432,
        db_user: "postgres".to_string(),
        db_password: Some("secret".to_string()),
        maintenance_db: "postgres".to_string(),
        exiftool_path: PathBuf::from("exiftool"),
        settings_path: PathBuf::from("./config/settings.yaml"),
        log_level: "info".to_string(),
        db_max_connections: 5,
        db_min_connections: 1,
        db_acquire_timeout_secs: 10,
    };
    let mut settings = Settings::default();
    settings.default_user = Some("from_settings".to_string());

    let explicit = credentials(&config, &settings, Some("cli_user".to_string()));
    assert_eq!(explicit.user, "cli_user");

    let fallback = credentials(&config, &settings, None);
    assert_eq!(fallback.user, "from_settings");
    assert_eq!(fallback.secret.as_deref(), Some("secret"));

    settings.default_user = None;
    assert_eq!(credentials(&config, &settings, None).user, "postgres");
}
