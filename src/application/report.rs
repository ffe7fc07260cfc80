//! Result reporter: one formatting contract for every outcome.
//!
//! Text summaries follow
//! `"<Action> <n> <target>"` and, with failures,
//! `"<Action> <n> <target>, <f> failed:"` plus one `"  <id>: <message>"` line
//! per failure. Counts are bare integers without plural adjustment.

use itertools::Itertools;
use serde::Serialize;

use crate::application::bulk::{ItemFailure, PlanEntry};
use crate::application::context::OutputMode;
use crate::application::outcome::{
    AliasListing, BulkOutcome, DescriptionChange, GroupPreview, GroupReport, ItemOutcome,
    ItemPreview, ItemReport, ResolveOutcome, SingleOutcome,
};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{Action, Alias};

/// Summary line(s) for an aggregate outcome.
///
/// `target` is an optional qualifier ("to Inbox", "as read"); pass `""` for none.
pub fn summary(action: &str, target: &str, succeeded: usize, failures: &[ItemFailure]) -> String {
    let head = if target.is_empty() {
        format!("{action} {succeeded}")
    } else {
        format!("{action} {succeeded} {target}")
    };
    if failures.is_empty() {
        return head;
    }
    let mut out = format!("{head}, {} failed:", failures.len());
    for failure in failures {
        out.push_str(&format!("\n  {}: {}", failure.item_id, failure.message));
    }
    out
}

/// Preview header plus one line per planned entry.
fn plan_lines(header: String, entries: &[PlanEntry]) -> String {
    std::iter::once(header)
        .chain(
            entries
                .iter()
                .map(|e| format!("  {}: {} -> {}", e.id, e.current_state, e.new_state)),
        )
        .join("\n")
}

/// Anything the CLI can print in either output mode.
pub trait Render: Serialize {
    /// Human-readable form.
    fn text(&self) -> String;

    fn render(&self, mode: OutputMode) -> ApplicationResult<String> {
        match mode {
            OutputMode::Text => Ok(self.text()),
            OutputMode::Json => {
                serde_json::to_string_pretty(self).map_err(|e| ApplicationError::OperationFailed {
                    context: "serialize output".into(),
                    source: Box::new(e),
                })
            }
        }
    }
}

impl Render for SingleOutcome {
    fn text(&self) -> String {
        match self {
            SingleOutcome::Preview(p) => format!(
                "Would {} alias {} ({} -> {})",
                Action::for_state(&p.new_state).verb,
                p.id,
                p.current_state,
                p.new_state
            ),
            SingleOutcome::Committed(c) => {
                format!("{} alias {}", Action::for_state(&c.state).past, c.id)
            }
        }
    }
}

impl Render for GroupPreview {
    fn text(&self) -> String {
        plan_lines(
            format!(
                "Would {} {} aliases for {}:",
                Action::for_state(&self.target).verb,
                self.count,
                self.group_key
            ),
            &self.items,
        )
    }
}

impl Render for GroupReport {
    fn text(&self) -> String {
        if self.dry_run {
            return format!(
                "Would {} 0 aliases for {}, {} unchanged",
                Action::for_state(&self.state).verb,
                self.group_key,
                self.succeeded
            );
        }
        summary(
            Action::for_state(&self.state).past,
            &format!("aliases for {}", self.group_key),
            self.succeeded,
            &self.errors,
        )
    }
}

impl Render for BulkOutcome {
    fn text(&self) -> String {
        match self {
            BulkOutcome::Preview(p) => p.text(),
            BulkOutcome::Applied(r) => r.text(),
        }
    }
}

impl Render for ItemPreview {
    fn text(&self) -> String {
        let header = if self.action.qualifier.is_empty() {
            format!("Would {} {}:", self.action.verb, self.count)
        } else {
            format!(
                "Would {} {} {}:",
                self.action.verb, self.count, self.action.qualifier
            )
        };
        plan_lines(header, &self.items)
    }
}

impl Render for ItemReport {
    fn text(&self) -> String {
        if self.dry_run {
            let target = match self.action.qualifier.as_str() {
                "" => "0".to_string(),
                qualifier => format!("0 {qualifier}"),
            };
            return format!(
                "Would {} {}, {} unchanged",
                self.action.verb,
                target,
                self.result.succeeded_count()
            );
        }
        summary(
            self.action.past,
            &self.action.qualifier,
            self.result.succeeded_count(),
            &self.result.failed,
        )
    }
}

impl Render for ItemOutcome {
    fn text(&self) -> String {
        match self {
            ItemOutcome::Preview(p) => p.text(),
            ItemOutcome::Applied(r) => r.text(),
        }
    }
}

fn alias_line(alias: &Alias) -> String {
    let description = if alias.description.is_empty() {
        String::new()
    } else {
        format!("  {}", alias.description)
    };
    format!(
        "{:<24} {:<9} {:<36} {}{}",
        alias.id, alias.state, alias.email, alias.domain, description
    )
}

impl Render for ResolveOutcome {
    fn text(&self) -> String {
        match self {
            ResolveOutcome::Resolved(r) if r.created => {
                format!("Created {} ({})", r.alias.email, r.alias.state)
            }
            ResolveOutcome::Resolved(r) => format!("{} ({})", r.alias.email, r.alias.state),
            ResolveOutcome::WouldCreate(p) => format!("Would create alias for {}", p.domain),
        }
    }
}

impl Render for DescriptionChange {
    fn text(&self) -> String {
        if self.dry_run {
            format!(
                "Would set description of alias {} to {:?}",
                self.id, self.description
            )
        } else {
            format!("Updated description of alias {}", self.id)
        }
    }
}

impl Render for Alias {
    fn text(&self) -> String {
        alias_line(self)
    }
}

impl Render for AliasListing {
    fn text(&self) -> String {
        self.aliases.iter().map(alias_line).join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::bulk::{BulkOperationResult, FailureKind};
    use crate::application::outcome::{ItemAction, StateChange, StatePreview};
    use crate::domain::AliasState;

    fn failure(id: &str, message: &str) -> ItemFailure {
        ItemFailure::new(FailureKind::Transport, id, message)
    }

    #[test]
    fn given_no_failures_and_no_target_when_summarizing_then_action_and_count() {
        assert_eq!(summary("Deleted", "", 3, &[]), "Deleted 3");
    }

    #[test]
    fn given_target_qualifier_when_summarizing_then_appended() {
        assert_eq!(summary("Moved", "to Inbox", 2, &[]), "Moved 2 to Inbox");
    }

    #[test]
    fn given_failures_when_summarizing_then_header_and_indented_details() {
        let failures = vec![failure("id1", "boom"), failure("id2", "nope")];

        let text = summary("Marked", "as read", 1, &failures);

        assert_eq!(text, "Marked 1 as read, 2 failed:\n  id1: boom\n  id2: nope");
    }

    #[test]
    fn given_failures_without_target_when_summarizing_then_no_double_space() {
        let text = summary("Deleted", "", 0, &[failure("m1", "gone")]);
        assert_eq!(text, "Deleted 0, 1 failed:\n  m1: gone");
    }

    #[test]
    fn given_single_count_when_summarizing_then_no_plural_adjustment() {
        let report = GroupReport {
            dry_run: false,
            group_key: "example.com".into(),
            state: AliasState::Disabled,
            succeeded: 1,
            failed: 0,
            errors: vec![],
        };
        assert_eq!(report.text(), "Disabled 1 aliases for example.com");
    }

    #[test]
    fn given_single_preview_when_rendering_json_then_camel_case_fields() {
        let outcome = SingleOutcome::Preview(StatePreview {
            dry_run: true,
            id: "a1".into(),
            current_state: AliasState::Enabled,
            new_state: AliasState::Disabled,
        });

        let json: serde_json::Value =
            serde_json::from_str(&outcome.render(OutputMode::Json).unwrap()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "dryRun": true,
                "id": "a1",
                "currentState": "enabled",
                "newState": "disabled"
            })
        );
        assert_eq!(
            outcome.text(),
            "Would disable alias a1 (enabled -> disabled)"
        );
    }

    #[test]
    fn given_committed_change_when_rendering_then_id_and_state() {
        let outcome = SingleOutcome::Committed(StateChange {
            id: "a1".into(),
            state: AliasState::Deleted,
        });

        assert_eq!(outcome.text(), "Deleted alias a1");
        let json: serde_json::Value =
            serde_json::from_str(&outcome.render(OutputMode::Json).unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({"id": "a1", "state": "deleted"}));
    }

    #[test]
    fn given_group_report_with_errors_when_rendering_json_then_tagged_failures() {
        let report = GroupReport {
            dry_run: false,
            group_key: "example.com".into(),
            state: AliasState::Enabled,
            succeeded: 2,
            failed: 1,
            errors: vec![ItemFailure::new(FailureKind::Rejected, "a3", "no")],
        };

        let json: serde_json::Value =
            serde_json::from_str(&report.render(OutputMode::Json).unwrap()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "groupKey": "example.com",
                "state": "enabled",
                "succeeded": 2,
                "failed": 1,
                "errors": [{"kind": "rejected", "itemId": "a3", "message": "no"}]
            })
        );
    }

    #[test]
    fn given_group_preview_when_rendering_then_lists_planned_entries() {
        let preview = GroupPreview {
            dry_run: true,
            group_key: "example.com".into(),
            target: AliasState::Disabled,
            count: 2,
            items: vec![
                PlanEntry {
                    id: "a1".into(),
                    current_state: "enabled".into(),
                    new_state: "disabled".into(),
                },
                PlanEntry {
                    id: "a2".into(),
                    current_state: "pending".into(),
                    new_state: "disabled".into(),
                },
            ],
        };

        assert_eq!(
            preview.text(),
            "Would disable 2 aliases for example.com:\n  a1: enabled -> disabled\n  a2: pending -> disabled"
        );
        let json: serde_json::Value =
            serde_json::from_str(&preview.render(OutputMode::Json).unwrap()).unwrap();
        assert_eq!(json["dryRun"], true);
        assert_eq!(json["groupKey"], "example.com");
        assert_eq!(json["count"], 2);
        assert_eq!(json["items"][0]["currentState"], "enabled");
        assert!(json.get("target").is_none());
    }

    #[test]
    fn given_dry_run_with_nothing_pending_when_rendering_group_report_then_preview_wording() {
        // Arrange
        let report = GroupReport {
            dry_run: true,
            group_key: "example.com".into(),
            state: AliasState::Disabled,
            succeeded: 2,
            failed: 0,
            errors: vec![],
        };

        // Act
        let json: serde_json::Value =
            serde_json::from_str(&report.render(OutputMode::Json).unwrap()).unwrap();

        // Assert
        assert_eq!(
            report.text(),
            "Would disable 0 aliases for example.com, 2 unchanged"
        );
        assert_eq!(json["dryRun"], true);
        assert_eq!(json["succeeded"], 2);
    }

    #[test]
    fn given_dry_run_with_nothing_pending_when_rendering_item_report_then_preview_wording() {
        let report = ItemReport {
            action: ItemAction {
                verb: "move",
                past: "Moved",
                qualifier: "to Archive".into(),
            },
            dry_run: true,
            result: BulkOperationResult::all_succeeded(["m1"]),
        };

        let json: serde_json::Value =
            serde_json::from_str(&report.render(OutputMode::Json).unwrap()).unwrap();

        assert_eq!(report.text(), "Would move 0 to Archive, 1 unchanged");
        assert_eq!(
            json,
            serde_json::json!({"dryRun": true, "succeeded": ["m1"], "failed": []})
        );
    }
}
