//! Tool registry
//!
//! The registry is built once at startup and handed to the
//! [`Dispatcher`](crate::Dispatcher). It is never mutated while serving.
//!
//! | Tool | Required | Optional (default) |
//! |------|----------|--------------------|
//! | `gh_repo_list` | | owner, limit (30), type (all\|owner\|member, all) |
//! | `gh_repo_info` | owner, repo | |
//! | `gh_repo_create` | name | description, private (false), org |
//! | `gh_issue_list` | | owner, repo, state (open\|closed\|all, open), limit (30) |
//! | `gh_issue_create` | owner, repo, title | body, labels, assignees |
//! | `gh_pr_list` | | owner, repo, state (open\|closed\|merged\|all, open), limit (30) |
//! | `gh_pr_create` | owner, repo, title, head, base | body, draft (false) |
//! | `gh_workflow_list` | owner, repo | |
//! | `gh_workflow_run` | owner, repo, workflow | ref ("main") |

use crate::builders;
use crate::schema::{ParamDefault, ParamSpec, StderrPolicy, ToolDescriptor};

pub const REPO_LIST: &str = "gh_repo_list";
pub const REPO_INFO: &str = "gh_repo_info";
pub const REPO_CREATE: &str = "gh_repo_create";
pub const ISSUE_LIST: &str = "gh_issue_list";
pub const ISSUE_CREATE: &str = "gh_issue_create";
pub const PR_LIST: &str = "gh_pr_list";
pub const PR_CREATE: &str = "gh_pr_create";
pub const WORKFLOW_LIST: &str = "gh_workflow_list";
pub const WORKFLOW_RUN: &str = "gh_workflow_run";

const DEFAULT_LIMIT: i64 = 30;

const WARNINGS: StderrPolicy = StderrPolicy::Advisory {
    heading: "Warnings:",
};

/// Ordered collection of tool descriptors with unique names
#[derive(Debug, Clone, Default)]
pub struct Registry {
    tools: Vec<ToolDescriptor>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Create a registry holding the nine GitHub CLI tools.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for tool in builtin_tools() {
            registry.register(tool);
        }
        registry
    }

    /// Add a tool. A tool with the same name is replaced in place,
    /// keeping its position in the advertised order.
    pub fn register(&mut self, tool: ToolDescriptor) {
        match self.tools.iter_mut().find(|t| t.name == tool.name) {
            Some(existing) => *existing = tool,
            None => self.tools.push(tool),
        }
    }

    /// All tools in stable advertised order
    pub fn list(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn lookup(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

fn owner() -> ParamSpec {
    ParamSpec::string("owner", "Repository owner")
}

fn repo() -> ParamSpec {
    ParamSpec::string("repo", "Repository name")
}

fn limit(description: &'static str) -> ParamSpec {
    ParamSpec::integer("limit", description).with_default(ParamDefault::Integer(DEFAULT_LIMIT))
}

fn builtin_tools() -> Vec<ToolDescriptor> {
    vec![
        // Repositories
        ToolDescriptor::new(
            REPO_LIST,
            "List repositories",
            "Repositories:",
            StderrPolicy::Strict,
            builders::repo_list,
        )
        .with_param(ParamSpec::string(
            "owner",
            "Repository owner (default: authenticated user)",
        ))
        .with_param(limit("Number of repositories to list"))
        .with_param(
            ParamSpec::string("type", "Repository type filter")
                .one_of(&["all", "owner", "member"])
                .with_default(ParamDefault::Str("all")),
        ),
        ToolDescriptor::new(
            REPO_INFO,
            "Get detailed repository information",
            "Repository Info:",
            StderrPolicy::Strict,
            builders::repo_info,
        )
        .with_param(owner().required())
        .with_param(repo().required()),
        ToolDescriptor::new(
            REPO_CREATE,
            "Create a new repository",
            "Repository Created:",
            WARNINGS,
            builders::repo_create,
        )
        .with_param(ParamSpec::string("name", "Repository name").required())
        .with_param(ParamSpec::string("description", "Repository description"))
        .with_param(
            ParamSpec::boolean("private", "Create as private repository")
                .with_default(ParamDefault::Boolean(false)),
        )
        .with_param(ParamSpec::string("org", "Organization to create repo in")),
        // Issues
        ToolDescriptor::new(
            ISSUE_LIST,
            "List issues",
            "Issues:",
            StderrPolicy::Strict,
            builders::issue_list,
        )
        .with_param(owner())
        .with_param(repo())
        .with_param(
            ParamSpec::string("state", "Issue state")
                .one_of(&["open", "closed", "all"])
                .with_default(ParamDefault::Str("open")),
        )
        .with_param(limit("Number of issues to list")),
        ToolDescriptor::new(
            ISSUE_CREATE,
            "Create a new issue",
            "Issue Created:",
            WARNINGS,
            builders::issue_create,
        )
        .with_param(owner().required())
        .with_param(repo().required())
        .with_param(ParamSpec::string("title", "Issue title").required())
        .with_param(ParamSpec::string("body", "Issue body/description"))
        .with_param(ParamSpec::string_array("labels", "Labels to add"))
        .with_param(ParamSpec::string_array("assignees", "Users to assign")),
        // Pull requests
        ToolDescriptor::new(
            PR_LIST,
            "List pull requests",
            "Pull Requests:",
            StderrPolicy::Strict,
            builders::pr_list,
        )
        .with_param(owner())
        .with_param(repo())
        .with_param(
            ParamSpec::string("state", "PR state")
                .one_of(&["open", "closed", "merged", "all"])
                .with_default(ParamDefault::Str("open")),
        )
        .with_param(limit("Number of PRs to list")),
        ToolDescriptor::new(
            PR_CREATE,
            "Create a new pull request",
            "Pull Request Created:",
            WARNINGS,
            builders::pr_create,
        )
        .with_param(owner().required())
        .with_param(repo().required())
        .with_param(ParamSpec::string("title", "Pull request title").required())
        .with_param(ParamSpec::string("body", "Pull request body/description"))
        .with_param(ParamSpec::string("head", "Branch to merge from").required())
        .with_param(ParamSpec::string("base", "Branch to merge into").required())
        .with_param(
            ParamSpec::boolean("draft", "Create as draft PR")
                .with_default(ParamDefault::Boolean(false)),
        ),
        // Workflows
        ToolDescriptor::new(
            WORKFLOW_LIST,
            "List GitHub Actions workflows",
            "Workflows:",
            StderrPolicy::Strict,
            builders::workflow_list,
        )
        .with_param(owner().required())
        .with_param(repo().required()),
        ToolDescriptor::new(
            WORKFLOW_RUN,
            "Trigger a GitHub Actions workflow",
            "Workflow Triggered:",
            StderrPolicy::Advisory { heading: "Info:" },
            builders::workflow_run,
        )
        .with_param(owner().required())
        .with_param(repo().required())
        .with_param(ParamSpec::string("workflow", "Workflow ID or filename").required())
        .with_param(
            ParamSpec::string("ref", "Git reference to run workflow on")
                .with_default(ParamDefault::Str(builders::DEFAULT_REF)),
        ),
    ]
}
