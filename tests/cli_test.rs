//! Tests for CLI parsing, dispatch and exit codes
//!
//! Commands run against an in-memory store wired through the service container.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use clap::Parser;
use rstest::rstest;

use mailroom::application::{ApplicationError, OutputMode};
use mailroom::cli::commands::{dispatch, interrupt_handler, request_context, CommandOutput};
use mailroom::cli::{Cli, CliError};
use mailroom::config::Settings;
use mailroom::domain::{Alias, AliasState, DomainError, Item};
use mailroom::exitcode;
use mailroom::infrastructure::di::ServiceContainer;
use mailroom::infrastructure::memory::MemoryStore;
use mailroom::infrastructure::traits::StoreError;
use mailroom::util::testing::init_test_setup;

fn alias(id: &str, state: AliasState) -> Alias {
    Alias {
        id: id.to_string(),
        email: format!("{id}@alias.test"),
        domain: "example.com".to_string(),
        state,
        description: String::new(),
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
        last_message_at: None,
    }
}

fn container(store: Arc<MemoryStore>) -> ServiceContainer {
    ServiceContainer::with_deps(Settings::default(), store.clone(), store)
}

fn run(store: Arc<MemoryStore>, args: &[&str]) -> Result<CommandOutput, CliError> {
    init_test_setup();
    let cli = Cli::try_parse_from(args).unwrap();
    let ctx = request_context(&cli, &Settings::default());
    dispatch(&container(store), &ctx, &cli.command)
}

// ============================================================
// Argument parsing
// ============================================================

#[test]
fn given_id_and_domain_when_parsing_then_rejected() {
    let result =
        Cli::try_parse_from(["mailroom", "alias", "disable", "a1", "--domain", "x.com"]);
    assert!(result.is_err());
}

#[test]
fn given_mail_move_without_ids_when_parsing_then_rejected() {
    let result = Cli::try_parse_from(["mailroom", "mail", "move", "--to", "Archive"]);
    assert!(result.is_err());
}

#[test]
fn given_global_flags_after_subcommand_when_parsing_then_accepted() {
    let cli = Cli::try_parse_from(["mailroom", "alias", "enable", "a1", "--json", "-n", "-dd"])
        .unwrap();

    assert!(cli.json);
    assert!(cli.dry_run);
    assert_eq!(cli.debug, 2);
}

#[test]
fn given_json_flag_when_building_context_then_overrides_settings_output() {
    let cli = Cli::try_parse_from(["mailroom", "--json", "alias", "list"]).unwrap();

    let ctx = request_context(&cli, &Settings::default());

    assert_eq!(ctx.output, OutputMode::Json);
    assert!(ctx.cancel.remaining().is_some());
}

// ============================================================
// dispatch() tests
// ============================================================

#[test]
fn given_domain_flag_when_disabling_then_bulk_report_for_normalized_domain() {
    // Arrange
    let store = Arc::new(MemoryStore::with_aliases(vec![
        alias("a1", AliasState::Enabled),
        alias("a2", AliasState::Pending),
    ]));

    // Act
    let out = run(
        store.clone(),
        &["mailroom", "alias", "disable", "--domain", "https://Example.COM/"],
    )
    .unwrap();

    // Assert
    assert_eq!(out.text, "Disabled 2 aliases for example.com");
    assert_eq!(out.failed, 0);
    assert_eq!(store.alias("a2").unwrap().state, AliasState::Disabled);
}

#[test]
fn given_partial_failure_when_deleting_domain_then_counts_reported() {
    // Arrange
    let store = Arc::new(MemoryStore::with_aliases(vec![
        alias("a1", AliasState::Enabled),
        alias("a2", AliasState::Enabled),
    ]));
    store.fail_on("a1", StoreError::Transport("timeout".into()));

    // Act
    let out = run(
        store,
        &["mailroom", "alias", "delete", "--domain", "example.com"],
    )
    .unwrap();

    // Assert
    assert_eq!(out.failed, 1);
    assert_eq!(out.total, 2);
    assert!(out
        .text
        .starts_with("Deleted 1 aliases for example.com, 1 failed:\n  a1: "));
}

#[test]
fn given_single_id_with_dry_run_when_enabling_then_preview_text() {
    let store = Arc::new(MemoryStore::with_aliases(vec![alias("a1", AliasState::Disabled)]));

    let out = run(store.clone(), &["mailroom", "-n", "alias", "enable", "a1"]).unwrap();

    assert_eq!(out.text, "Would enable alias a1 (disabled -> enabled)");
    assert!(store.mutations().is_empty());
}

#[test]
fn given_json_output_when_marking_read_then_structured_result() {
    let store = Arc::new(MemoryStore::with_items(vec![Item {
        id: "m1".into(),
        mailbox: "Inbox".into(),
        subject: String::new(),
        read: false,
        received_at: None,
    }]));

    let out = run(store, &["mailroom", "--json", "mail", "mark-read", "m1"]).unwrap();

    let json: serde_json::Value = serde_json::from_str(&out.text).unwrap();
    assert_eq!(json, serde_json::json!({"succeeded": ["m1"], "failed": []}));
}

#[test]
fn given_invalid_domain_when_showing_then_usage_exit_code() {
    let store = Arc::new(MemoryStore::new());

    let err = run(store.clone(), &["mailroom", "alias", "show", "--domain", "not a domain"]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::USAGE);
    assert!(store.calls().is_empty());
}

#[rstest]
#[case::mail_path(&["mailroom", "mail", "delete", "m1", "../aliases/a1"])]
#[case::alias_query(&["mailroom", "alias", "disable", "a1?x=1"])]
#[case::comma_list(&["mailroom", "mail", "mark-read", "m1,m2"])]
fn given_id_with_url_syntax_when_dispatching_then_usage_error_before_any_call(
    #[case] args: &[&str],
) {
    // Arrange
    let store = Arc::new(MemoryStore::with_aliases(vec![alias("a1", AliasState::Enabled)]));

    // Act
    let err = run(store.clone(), args).unwrap_err();

    // Assert
    assert_eq!(err.exit_code(), exitcode::USAGE);
    assert!(store.calls().is_empty());
}

#[test]
fn given_interrupt_during_domain_run_when_disabling_then_remaining_cancelled_and_reported() {
    // Arrange
    init_test_setup();
    let store = Arc::new(MemoryStore::with_aliases(vec![
        alias("a1", AliasState::Enabled),
        alias("a2", AliasState::Enabled),
        alias("a3", AliasState::Enabled),
    ]));
    let cli = Cli::try_parse_from(["mailroom", "alias", "disable", "--domain", "example.com"])
        .unwrap();
    let ctx = request_context(&cli, &Settings::default());
    store.interrupt_after(1, interrupt_handler(ctx.cancel.clone()));

    // Act
    let out = dispatch(&container(store.clone()), &ctx, &cli.command).unwrap();

    // Assert
    assert_eq!(out.total, 3);
    assert_eq!(out.failed, 2);
    assert!(out
        .text
        .starts_with("Disabled 1 aliases for example.com, 2 failed:\n  a2: "));
    // the remaining members were still attempted
    assert_eq!(store.mutations().len(), 3);
    assert_eq!(store.alias("a1").unwrap().state, AliasState::Disabled);
    assert_eq!(store.alias("a3").unwrap().state, AliasState::Enabled);
}

// ============================================================
// CliError::exit_code() tests
// ============================================================

#[rstest]
#[case::validation(DomainError::Validation("x".into()).into(), exitcode::USAGE)]
#[case::group_not_found(DomainError::GroupNotFound("d".into()).into(), exitcode::NOINPUT)]
#[case::alias_not_found(DomainError::AliasNotFound("a".into()).into(), exitcode::NOINPUT)]
#[case::already_in_state(
    DomainError::AlreadyInState { id: "a".into(), state: AliasState::Enabled }.into(),
    exitcode::DATAERR
)]
#[case::store(
    ApplicationError::Store { operation: "fetch alias".into(), source: StoreError::Transport("x".into()) },
    exitcode::UNAVAILABLE
)]
#[case::deadline(
    ApplicationError::Store { operation: "fetch alias".into(), source: StoreError::DeadlineExceeded },
    exitcode::TEMPFAIL
)]
#[case::config(ApplicationError::Config { message: "bad".into() }, exitcode::CONFIG)]
fn given_application_error_when_mapping_exit_code_then_matches(
    #[case] error: ApplicationError,
    #[case] expected: i32,
) {
    assert_eq!(CliError::from(error).exit_code(), expected);
}
