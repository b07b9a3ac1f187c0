//! Command surface of the `ggforge` binary.

use clap::{CommandFactory, Parser};
use ggforge_cli::{Cli, Commands, handlers};
use ggforge_core::tables::load_custom_flags;
use ggforge_core::{Language, PlatformTag, Translator, tables};

#[test]
fn help_lists_every_command() {
    let help = Cli::command().render_long_help().to_string();
    for name in ["detect", "probe", "list-configs", "install", "create-config"] {
        assert!(help.contains(name), "{name} missing from help");
    }
}

#[test]
fn every_listed_tag_is_accepted_by_install() {
    for tag in PlatformTag::LISTED {
        let cli = Cli::try_parse_from(["ggforge", "install", "--hardware", tag.as_str()]).unwrap();
        match cli.command {
            Some(Commands::Install { hardware, .. }) => assert_eq!(hardware, Some(tag)),
            _ => panic!("expected install"),
        }
    }
}

#[test]
fn created_config_feeds_install() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("termux.txt");
    let t = Translator::new(Language::Pl);

    handlers::create_config::execute(&output, PlatformTag::Termux, &t).unwrap();

    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.starts_with('#'));
    assert_eq!(
        load_custom_flags(&output).unwrap(),
        tables::static_flags(PlatformTag::Termux)
    );
}
