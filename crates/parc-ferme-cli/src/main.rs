//! Parc Fermé - automated PR code reviews using Claude
//!
//! The `parc-ferme` command fetches a pull request with `gh`, renders a
//! review prompt from the selected profile and pipes the diff to `claude`.
//!
//! ## Exit codes
//!
//! - `0`: review finished (or `--list-profiles` / `--dry-run`)
//! - `1`: configuration, lookup or collaborator failure, or `--strict` with
//!   CRITICAL findings
//! - `130`: interrupted with Ctrl-C

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::builder::FalseyValueParser;
use clap::{Parser, ValueEnum};
use tracing::{debug, info, warn, Level};

use parc_ferme_core::format::{
    format_changed_files, format_comment, format_count, format_header, format_review_end,
    format_review_start, Colors,
};
use parc_ferme_core::{
    build_prompt, check_claude_available, check_gh_available, get_profile, has_critical_issues,
    list_profiles, load_config, CommentMode, GitHubClient, MergedConfig, Profile, Reviewer,
    MAX_DIFF_CHARS,
};

#[derive(Parser, Debug)]
#[command(name = "parc-ferme")]
#[command(version = parc_ferme_core::VERSION)]
#[command(about = "Automated PR code reviews using Claude AI", long_about = None)]
struct Cli {
    /// PR number or URL (e.g. 123 or https://github.com/owner/repo/pull/123)
    pr: Option<String>,

    /// Review profile to use (default/security/performance/angular or a custom one)
    #[arg(short, long)]
    profile: Option<String>,

    /// Post the review as a PR comment
    #[arg(short, long)]
    comment: bool,

    /// Create a new comment or update the last one (default: create)
    #[arg(long, value_enum)]
    comment_mode: Option<CommentModeArg>,

    /// Path to config file (overrides auto-discovery)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Repository in OWNER/REPO format (passed to gh)
    #[arg(short = 'R', long, value_name = "OWNER/REPO")]
    repo: Option<String>,

    /// List all available profiles and exit
    #[arg(long)]
    list_profiles: bool,

    /// Show the prompt that would be sent without calling Claude
    #[arg(long)]
    dry_run: bool,

    /// Save review output to a file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Review timeout in seconds (default: review_timeout from config, or 300)
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Exit with code 1 if CRITICAL issues are found in the review
    #[arg(long)]
    strict: bool,

    /// Disable colored terminal output
    #[arg(long, env = "NO_COLOR", value_parser = FalseyValueParser::new())]
    no_color: bool,

    /// Show debug information
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json_logs: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum CommentModeArg {
    Create,
    Update,
}

impl From<CommentModeArg> for CommentMode {
    fn from(arg: CommentModeArg) -> Self {
        match arg {
            CommentModeArg::Create => CommentMode::Create,
            CommentModeArg::Update => CommentMode::Update,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    parc_ferme_core::init_tracing(cli.json_logs, level);

    let colors = Colors::new(cli.no_color);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            print_error(&colors, &e.into());
            return ExitCode::FAILURE;
        }
    };

    if cli.list_profiles {
        print!("{}", format_profile_list(&list_profiles(config.custom_profiles.as_ref())));
        return ExitCode::SUCCESS;
    }

    let Some(pr) = cli.pr.as_deref() else {
        print_error(
            &colors,
            &anyhow::anyhow!("PR number or URL is required. Use --help for usage."),
        );
        return ExitCode::FAILURE;
    };

    tokio::select! {
        result = review(&cli, pr, &config, &colors) => match result {
            Ok(code) => code,
            Err(e) => {
                print_error(&colors, &e);
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            println!("\n{}Review cancelled.{}", colors.red, colors.reset);
            ExitCode::from(130)
        }
    }
}

/// Review one PR end to end, returning the process exit code.
async fn review(cli: &Cli, pr: &str, config: &MergedConfig, c: &Colors) -> Result<ExitCode> {
    check_gh_available()?;
    if !cli.dry_run {
        check_claude_available()?;
    }

    let profile_name = cli.profile.as_deref().unwrap_or(&config.default_profile);
    let profile = get_profile(profile_name, config.custom_profiles.as_ref())?;
    info!(profile = %profile_name, "resolved review profile");

    let gh = GitHubClient::new(cli.repo.clone())?;

    let pr_info = gh.get_pr_info(pr).await?;
    println!("{}", format_header(&pr_info, c));

    let changed_files = gh.get_changed_files(pr).await?;
    let listing = format_changed_files(&changed_files, c);
    if !listing.is_empty() {
        println!("{listing}");
    }

    let prompt = build_prompt(&pr_info, &profile);

    if cli.verbose {
        println!("\n{}[verbose] Profile: {profile_name}{}", c.yellow, c.reset);
        println!(
            "{}[verbose] Model: {}{}",
            c.yellow,
            config.claude_model.as_deref().unwrap_or("default"),
            c.reset
        );
    }

    if cli.dry_run {
        println!("\n{}--- DRY RUN: Prompt that would be sent ---{}\n", c.yellow, c.reset);
        println!("{prompt}");
        println!(
            "\n{}--- End of prompt (diff would follow via stdin) ---{}",
            c.yellow, c.reset
        );
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", format_review_start(c));

    let diff = gh.get_pr_diff(pr).await?;
    let diff_chars = diff.chars().count();
    if diff_chars > MAX_DIFF_CHARS {
        println!(
            "\n{}⚠️  Diff is {} chars, exceeding {} limit. It will be truncated.{}",
            c.yellow,
            format_count(diff_chars),
            format_count(MAX_DIFF_CHARS),
            c.reset
        );
    }

    let timeout = Duration::from_secs(cli.timeout.unwrap_or(config.review_timeout));
    let review = Reviewer::new(config.claude_model.clone(), timeout)
        .run(&prompt, &diff)
        .await?;
    println!("{review}");
    println!("{}", format_review_end(c));

    if let Some(path) = &cli.output {
        match std::fs::write(path, format!("{review}\n")) {
            Ok(()) => println!("\n{}📄 Review saved to {}{}", c.green, path.display(), c.reset),
            Err(e) => eprintln!(
                "\n{}Could not write to {}: {e}{}",
                c.yellow,
                path.display(),
                c.reset
            ),
        }
    }

    if let Some(mode) = comment_mode(cli, config) {
        let body = format_comment(&pr_info, &review, profile_name);
        debug!(mode = %mode, "posting review comment");
        match gh.post_comment(pr, &body, mode == CommentMode::Update).await {
            Ok(()) => println!("\n{}💬 Review posted as PR comment{}", c.green, c.reset),
            Err(e) => {
                warn!(error = %e, "comment not posted");
                eprintln!("\n{}⚠️  Could not post comment: {e}{}", c.yellow, c.reset);
            }
        }
    }

    if cli.strict && has_critical_issues(&review) {
        println!(
            "\n{}Strict mode: CRITICAL issues found, exiting with code 1{}",
            c.red, c.reset
        );
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

/// Whether to comment, and how. The `-c` flag or `comment.enabled` turns
/// commenting on; `--comment-mode` takes precedence over `comment.mode`.
fn comment_mode(cli: &Cli, config: &MergedConfig) -> Option<CommentMode> {
    if !(cli.comment || config.comment.enabled) {
        return None;
    }
    Some(cli.comment_mode.map_or(config.comment.mode, CommentMode::from))
}

fn format_profile_list(profiles: &BTreeMap<String, Profile>) -> String {
    let mut out = String::from("Available profiles:\n\n");
    for (name, profile) in profiles {
        out.push_str(&format!("  {name:15}  {}\n", profile.description));
    }
    out
}

fn print_error(c: &Colors, err: &anyhow::Error) {
    eprintln!("{}Error: {err:#}{}", c.red, c.reset);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use parc_ferme_core::CommentSettings;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("parc-ferme").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_full_invocation() {
        let cli = parse(&[
            "123",
            "-p",
            "security",
            "-c",
            "--comment-mode",
            "update",
            "-R",
            "owner/repo",
            "-o",
            "review.md",
            "--timeout",
            "60",
            "--strict",
        ]);
        assert_eq!(cli.pr.as_deref(), Some("123"));
        assert_eq!(cli.profile.as_deref(), Some("security"));
        assert!(cli.comment);
        assert_eq!(cli.comment_mode, Some(CommentModeArg::Update));
        assert_eq!(cli.repo.as_deref(), Some("owner/repo"));
        assert_eq!(cli.output, Some(PathBuf::from("review.md")));
        assert_eq!(cli.timeout, Some(60));
        assert!(cli.strict);
    }

    #[test]
    fn test_pr_is_optional_for_listing() {
        let cli = parse(&["--list-profiles"]);
        assert!(cli.list_profiles);
        assert!(cli.pr.is_none());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        assert!(Cli::try_parse_from(["parc-ferme", "1", "--timeout", "0"]).is_err());
        assert!(Cli::try_parse_from(["parc-ferme", "1", "--timeout", "soon"]).is_err());
    }

    #[test]
    fn test_rejects_unknown_comment_mode() {
        assert!(Cli::try_parse_from(["parc-ferme", "1", "--comment-mode", "append"]).is_err());
    }

    #[test]
    fn test_comment_mode_precedence() {
        let mut config = MergedConfig::default();
        assert_eq!(comment_mode(&parse(&["1"]), &config), None);
        assert_eq!(comment_mode(&parse(&["1", "-c"]), &config), Some(CommentMode::Create));

        config.comment = CommentSettings {
            enabled: true,
            mode: CommentMode::Update,
        };
        assert_eq!(comment_mode(&parse(&["1"]), &config), Some(CommentMode::Update));
        assert_eq!(
            comment_mode(&parse(&["1", "--comment-mode", "create"]), &config),
            Some(CommentMode::Create)
        );
    }

    #[test]
    fn test_profile_list_is_sorted_and_aligned() {
        let listing = format_profile_list(&list_profiles(None));
        let lines: Vec<_> = listing.lines().collect();
        assert_eq!(lines[0], "Available profiles:");
        assert_eq!(lines[1], "");
        assert!(lines[2].starts_with("  angular          "));
        assert!(lines[3].starts_with("  default          General code review"));
        assert_eq!(lines.len(), 6);
    }
}
