//! Per-tool command builders
//!
//! Each builder is a pure function of its [`ValidatedArguments`]. List-style
//! tools always request the same `--json` field set so callers can rely on a
//! stable output shape.

use crate::command::{CommandBuilder, ExternalCommand};
use crate::validate::ValidatedArguments;

/// Name of the GitHub CLI program
pub const GH_PROGRAM: &str = "gh";

/// Reference used by `gh_workflow_run` when none is given
pub const DEFAULT_REF: &str = "main";

pub const REPO_LIST_FIELDS: &str = "name,description,isPrivate,url,updatedAt,stargazerCount";
pub const REPO_VIEW_FIELDS: &str = "name,description,isPrivate,url,stargazerCount,forkCount,\
primaryLanguage,repositoryTopics,createdAt,updatedAt,pushedAt";
pub const ISSUE_LIST_FIELDS: &str = "number,title,state,author,createdAt,updatedAt,labels";
pub const PR_LIST_FIELDS: &str =
    "number,title,state,author,createdAt,updatedAt,headRefName,baseRefName";
pub const WORKFLOW_LIST_FIELDS: &str = "id,name,state";

/// `owner/repo` from two required fields
fn qualified_repo(args: &ValidatedArguments) -> String {
    format!(
        "{}/{}",
        args.str("owner").unwrap_or_default(),
        args.str("repo").unwrap_or_default()
    )
}

/// `owner/repo` only when both optional fields are set
fn optional_repo(args: &ValidatedArguments) -> Option<String> {
    match (args.str("owner"), args.str("repo")) {
        (Some(owner), Some(repo)) => Some(format!("{}/{}", owner, repo)),
        _ => None,
    }
}

/// Comma-joined list, `None` when unset or empty
fn joined(args: &ValidatedArguments, name: &str) -> Option<String> {
    args.list(name)
        .filter(|items| !items.is_empty())
        .map(|items| items.join(","))
}

pub fn repo_list(args: &ValidatedArguments) -> ExternalCommand {
    let mut cmd = CommandBuilder::new(GH_PROGRAM, &["repo", "list"])
        .option_if("--limit", args.integer("limit").map(|n| n.to_string()))
        .option("--json", REPO_LIST_FIELDS);

    cmd = match args.str("type") {
        Some("owner") => cmd.switch("--owner"),
        Some("member") => cmd.switch("--member"),
        _ => cmd,
    };

    cmd.positional_if(args.str("owner")).build()
}

pub fn repo_info(args: &ValidatedArguments) -> ExternalCommand {
    CommandBuilder::new(GH_PROGRAM, &["repo", "view"])
        .option("--json", REPO_VIEW_FIELDS)
        .positional(qualified_repo(args))
        .build()
}

pub fn repo_create(args: &ValidatedArguments) -> ExternalCommand {
    let name = args.str("name").unwrap_or_default();
    let target = match args.str("org") {
        Some(org) => format!("{}/{}", org, name),
        None => name.to_string(),
    };
    let visibility = if args.flag("private") {
        "--private"
    } else {
        "--public"
    };

    CommandBuilder::new(GH_PROGRAM, &["repo", "create"])
        .option_if("--description", args.str("description"))
        .switch(visibility)
        .positional(target)
        .build()
}

pub fn issue_list(args: &ValidatedArguments) -> ExternalCommand {
    CommandBuilder::new(GH_PROGRAM, &["issue", "list"])
        .option_if("--repo", optional_repo(args))
        .option_if("--state", args.str("state"))
        .option_if("--limit", args.integer("limit").map(|n| n.to_string()))
        .option("--json", ISSUE_LIST_FIELDS)
        .build()
}

pub fn issue_create(args: &ValidatedArguments) -> ExternalCommand {
    CommandBuilder::new(GH_PROGRAM, &["issue", "create"])
        .option("--repo", qualified_repo(args))
        .option("--title", args.str("title").unwrap_or_default())
        .option_if("--body", args.str("body"))
        .option_if("--label", joined(args, "labels"))
        .option_if("--assignee", joined(args, "assignees"))
        .build()
}

pub fn pr_list(args: &ValidatedArguments) -> ExternalCommand {
    CommandBuilder::new(GH_PROGRAM, &["pr", "list"])
        .option_if("--repo", optional_repo(args))
        .option_if("--state", args.str("state"))
        .option_if("--limit", args.integer("limit").map(|n| n.to_string()))
        .option("--json", PR_LIST_FIELDS)
        .build()
}

pub fn pr_create(args: &ValidatedArguments) -> ExternalCommand {
    CommandBuilder::new(GH_PROGRAM, &["pr", "create"])
        .option("--repo", qualified_repo(args))
        .option("--title", args.str("title").unwrap_or_default())
        .option("--head", args.str("head").unwrap_or_default())
        .option("--base", args.str("base").unwrap_or_default())
        .option_if("--body", args.str("body"))
        .switch_if(args.flag("draft"), "--draft")
        .build()
}

pub fn workflow_list(args: &ValidatedArguments) -> ExternalCommand {
    CommandBuilder::new(GH_PROGRAM, &["workflow", "list"])
        .option("--repo", qualified_repo(args))
        .option("--json", WORKFLOW_LIST_FIELDS)
        .build()
}

pub fn workflow_run(args: &ValidatedArguments) -> ExternalCommand {
    CommandBuilder::new(GH_PROGRAM, &["workflow", "run"])
        .option("--repo", qualified_repo(args))
        .option("--ref", args.str("ref").unwrap_or(DEFAULT_REF))
        .positional(args.str("workflow").unwrap_or_default())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{self, Registry};
    use crate::validate::validate;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn build(tool: &str, raw: Value) -> ExternalCommand {
        let registry = Registry::with_builtins();
        let descriptor = registry.lookup(tool).unwrap();
        let args = validate(descriptor, &raw).unwrap();
        descriptor.build_command(&args)
    }

    #[test]
    fn repo_list_defaults() {
        let cmd = build(registry::REPO_LIST, json!({}));
        assert_eq!(
            cmd.tokens(),
            vec!["gh", "repo", "list", "--limit", "30", "--json", REPO_LIST_FIELDS]
        );
    }

    #[test]
    fn repo_list_owner_and_type() {
        let cmd = build(
            registry::REPO_LIST,
            json!({"owner": "octo", "type": "member", "limit": 5}),
        );
        assert_eq!(
            cmd.args(),
            &["repo", "list", "--limit", "5", "--json", REPO_LIST_FIELDS, "--member", "--", "octo"]
        );
    }

    #[test]
    fn repo_info_targets_qualified_name() {
        let cmd = build(registry::REPO_INFO, json!({"owner": "octo", "repo": "demo"}));
        assert_eq!(
            cmd.args(),
            &["repo", "view", "--json", REPO_VIEW_FIELDS, "--", "octo/demo"]
        );
    }

    #[test]
    fn repo_create_user_scoped_is_public_by_default() {
        let cmd = build(registry::REPO_CREATE, json!({"name": "foo"}));
        insta::assert_snapshot!(cmd.to_string(), @"gh repo create --public -- foo");
    }

    #[test]
    fn repo_create_org_rebuilds_the_name() {
        let cmd = build(
            registry::REPO_CREATE,
            json!({"name": "foo", "org": "bar", "private": true, "description": "Demo repo"}),
        );
        assert_eq!(
            cmd.args(),
            &["repo", "create", "--description", "Demo repo", "--private", "--", "bar/foo"]
        );
        assert!(!cmd.args().iter().any(|a| a == "--org"));
        assert!(!cmd.args().iter().any(|a| a == "foo"));
    }

    #[test]
    fn repo_create_description_is_one_token() {
        let description = "a \" malicious && rm -rf /";
        let cmd = build(
            registry::REPO_CREATE,
            json!({"name": "foo", "description": description}),
        );

        let position = cmd.args().iter().position(|a| a == "--description").unwrap();
        assert_eq!(cmd.args()[position + 1], description);
        assert_eq!(cmd.args().iter().filter(|a| a.contains("rm -rf")).count(), 1);
        assert!(!cmd.args().iter().any(|a| a == "&&"));
        insta::assert_snapshot!(
            cmd.to_string(),
            @r#"gh repo create --description 'a " malicious && rm -rf /' --public -- foo"#
        );
    }

    #[test]
    fn issue_list_scopes_only_with_owner_and_repo() {
        let scoped = build(
            registry::ISSUE_LIST,
            json!({"owner": "octo", "repo": "demo", "state": "closed"}),
        );
        assert_eq!(
            scoped.args(),
            &[
                "issue", "list", "--repo", "octo/demo", "--state", "closed", "--limit", "30",
                "--json", ISSUE_LIST_FIELDS
            ]
        );

        let owner_only = build(registry::ISSUE_LIST, json!({"owner": "octo"}));
        assert!(!owner_only.args().iter().any(|a| a == "--repo"));
    }

    #[test]
    fn issue_create_joins_lists() {
        let cmd = build(
            registry::ISSUE_CREATE,
            json!({
                "owner": "octo",
                "repo": "demo",
                "title": "Crash on start",
                "body": "Steps:\n1. run",
                "labels": ["bug", "p1"],
                "assignees": ["alice", "bob"]
            }),
        );
        assert_eq!(
            cmd.args(),
            &[
                "issue",
                "create",
                "--repo",
                "octo/demo",
                "--title",
                "Crash on start",
                "--body",
                "Steps:\n1. run",
                "--label",
                "bug,p1",
                "--assignee",
                "alice,bob"
            ]
        );
    }

    #[test]
    fn issue_create_skips_empty_lists() {
        let cmd = build(
            registry::ISSUE_CREATE,
            json!({"owner": "o", "repo": "r", "title": "t", "labels": []}),
        );
        assert_eq!(cmd.args(), &["issue", "create", "--repo", "o/r", "--title", "t"]);
    }

    #[test]
    fn pr_list_merged_state() {
        let cmd = build(registry::PR_LIST, json!({"state": "merged", "limit": 10}));
        assert_eq!(
            cmd.args(),
            &["pr", "list", "--state", "merged", "--limit", "10", "--json", PR_LIST_FIELDS]
        );
    }

    #[test]
    fn pr_create_draft() {
        let cmd = build(
            registry::PR_CREATE,
            json!({
                "owner": "octo",
                "repo": "demo",
                "title": "Add feature",
                "head": "feature",
                "base": "main",
                "draft": true
            }),
        );
        insta::assert_snapshot!(
            cmd.to_string(),
            @"gh pr create --repo octo/demo --title 'Add feature' --head feature --base main --draft"
        );
    }

    #[test]
    fn pr_create_not_draft_by_default() {
        let cmd = build(
            registry::PR_CREATE,
            json!({"owner": "o", "repo": "r", "title": "t", "head": "h", "base": "b"}),
        );
        assert!(!cmd.args().iter().any(|a| a == "--draft"));
    }

    #[test]
    fn workflow_list_shape() {
        let cmd = build(registry::WORKFLOW_LIST, json!({"owner": "octo", "repo": "demo"}));
        assert_eq!(
            cmd.args(),
            &["workflow", "list", "--repo", "octo/demo", "--json", WORKFLOW_LIST_FIELDS]
        );
    }

    #[test]
    fn workflow_run_defaults_ref_to_main() {
        let cmd = build(
            registry::WORKFLOW_RUN,
            json!({"owner": "octo", "repo": "demo", "workflow": "ci.yml"}),
        );
        assert_eq!(
            cmd.args(),
            &["workflow", "run", "--repo", "octo/demo", "--ref", "main", "--", "ci.yml"]
        );
    }

    #[test]
    fn workflow_run_leading_dash_stays_positional() {
        let cmd = build(
            registry::WORKFLOW_RUN,
            json!({"owner": "o", "repo": "r", "workflow": "--help", "ref": "release/1.0"}),
        );
        let marker = cmd.args().iter().position(|a| a == "--").unwrap();
        assert_eq!(cmd.args()[marker + 1], "--help");
        assert_eq!(cmd.args().len(), marker + 2);
    }
}
