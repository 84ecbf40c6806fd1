//! Terminal and markdown output.

use std::sync::LazyLock;

use chrono::{Local, NaiveDate};
use regex::Regex;

use crate::github::PrInfo;

const SEPARATOR_WIDTH: usize = 66;

static MARKDOWN_SPECIAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\\`*_{}\[\]()#+\-.!|<>])").expect("valid regex"));

/// ANSI escape codes, or empty strings when colour is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colors {
    pub red: &'static str,
    pub green: &'static str,
    pub yellow: &'static str,
    pub blue: &'static str,
    pub bold: &'static str,
    pub reset: &'static str,
}

impl Colors {
    pub const ANSI: Colors = Colors {
        red: "\x1b[0;31m",
        green: "\x1b[0;32m",
        yellow: "\x1b[1;33m",
        blue: "\x1b[0;34m",
        bold: "\x1b[1m",
        reset: "\x1b[0m",
    };

    pub const PLAIN: Colors = Colors {
        red: "",
        green: "",
        yellow: "",
        blue: "",
        bold: "",
        reset: "",
    };

    pub fn new(no_color: bool) -> Self {
        if no_color {
            Self::PLAIN
        } else {
            Self::ANSI
        }
    }
}

/// Format an integer with comma thousands separators (`100000` → `100,000`).
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Backslash-escape characters with special meaning in markdown.
pub fn escape_markdown(text: &str) -> String {
    MARKDOWN_SPECIAL_RE.replace_all(text, r"\$1").into_owned()
}

fn separator(c: &Colors) -> String {
    format!("{}{}{}", c.blue, "━".repeat(SEPARATOR_WIDTH), c.reset)
}

pub fn format_header(pr: &PrInfo, c: &Colors) -> String {
    let sep = separator(c);
    [
        sep.clone(),
        format!("{}🔍 Parc Fermé PR Review{}", c.blue, c.reset),
        sep,
        format!("{}PR #{}:{} {}", c.green, pr.number, c.reset, pr.title),
        format!("{}Author:{} {}", c.green, c.reset, pr.author),
        format!("{}Base:{} {}", c.green, c.reset, pr.base_branch),
        format!("{}URL:{} {}", c.green, c.reset, pr.url),
    ]
    .join("\n")
}

/// The changed-file listing, or an empty string when there are none.
pub fn format_changed_files(files: &[String], c: &Colors) -> String {
    if files.is_empty() {
        return String::new();
    }
    let mut lines = vec![format!("\n{}📁 Changed files:{}", c.yellow, c.reset)];
    lines.extend(files.iter().map(|f| format!("   {f}")));
    lines.join("\n")
}

pub fn format_review_start(c: &Colors) -> String {
    let sep = separator(c);
    format!(
        "\n{sep}\n{}🤖 Starting Claude Review...{}\n{sep}\n",
        c.blue, c.reset
    )
}

pub fn format_review_end(c: &Colors) -> String {
    format!("\n{}\n{}✅ Review complete{}", separator(c), c.green, c.reset)
}

/// Markdown body for the PR comment, dated today.
pub fn format_comment(pr: &PrInfo, review: &str, profile_name: &str) -> String {
    format_comment_on(pr, review, profile_name, Local::now().date_naive())
}

pub fn format_comment_on(pr: &PrInfo, review: &str, profile_name: &str, date: NaiveDate) -> String {
    format!(
        "## 🔍 Parc Fermé PR Review — PR #{}: {}\n\n\
         **Profile**: `{}` | **Reviewed**: {}\n\n\
         ---\n\n\
         {}\n\n\
         ---\n\
         *Automated review by parc-ferme*",
        pr.number,
        escape_markdown(&pr.title),
        profile_name,
        date.format("%Y-%m-%d"),
        review
    )
}
