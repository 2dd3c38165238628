//! Issue detection from page locations.
//!
//! A location is checked against an ordered rule table; the first rule whose
//! pattern matches decides the service and builds the canonical issue id.
//! Several rules can match the same location (both Jira rules, for
//! instance), so the table order is part of the contract.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::types::{DetectedIssue, Service};

struct IssuePattern {
    service: Service,
    regex: Regex,
    extract_id: fn(&Captures<'_>) -> String,
}

fn owner_repo_number(caps: &Captures<'_>) -> String {
    format!("{}/{}#{}", &caps[1], &caps[2], &caps[3])
}

fn path_number(caps: &Captures<'_>) -> String {
    format!("{}#{}", &caps[1], &caps[2])
}

fn issue_key(caps: &Captures<'_>) -> String {
    caps[1].to_owned()
}

// Character classes are spelled out in ASCII: the regex crate's `\w` and `\d`
// are Unicode-aware, browser regexes are not.
static PATTERNS: LazyLock<Vec<IssuePattern>> = LazyLock::new(|| {
    let rule = |service: Service, pattern: &str, extract_id: fn(&Captures<'_>) -> String| {
        IssuePattern {
            service,
            regex: Regex::new(pattern).expect("issue pattern compiles"),
            extract_id,
        }
    };
    vec![
        rule(
            Service::Github,
            r"github\.com/([0-9A-Za-z_.-]+)/([0-9A-Za-z_.-]+)/issues/([0-9]+)",
            owner_repo_number,
        ),
        rule(
            Service::Gitlab,
            r"gitlab\.com/([0-9A-Za-z_./-]+)/-/issues/([0-9]+)",
            path_number,
        ),
        rule(
            Service::Bitbucket,
            r"bitbucket\.org/([0-9A-Za-z_.-]+)/([0-9A-Za-z_.-]+)/issues/([0-9]+)",
            owner_repo_number,
        ),
        rule(
            Service::Jira,
            r"atlassian\.net/browse/([A-Z][0-9A-Za-z_]+-[0-9]+)",
            issue_key,
        ),
        rule(
            Service::Jira,
            r"atlassian\.net/jira/software/.*selectedIssue=([A-Z][0-9A-Za-z_]+-[0-9]+)",
            issue_key,
        ),
        rule(
            Service::Linear,
            r"linear\.app/[0-9A-Za-z_-]+/issue/([A-Z][0-9A-Za-z_]*-[0-9]+)",
            issue_key,
        ),
    ]
});

/// Classify a page location.
///
/// Returns the issue built by the first matching rule, or `None` when the
/// location is not an issue page on a supported tracker. Pure: the same input
/// always yields the same output.
pub fn detect_issue(url: &str) -> Option<DetectedIssue> {
    PATTERNS.iter().find_map(|p| {
        p.regex.captures(url).map(|caps| DetectedIssue {
            service: p.service,
            issue_id: (p.extract_id)(&caps),
            source_url: url.to_owned(),
        })
    })
}
