//! semver-next - CLI entry point.

use std::env;
use std::process;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};

use semver_next::github::get_github_token;
use semver_next::{
    NextOptions, NextResult, OctocrabClient, Policy, RepoId, check_pull_request, compute_next,
    create_release_tag, enforce_policy,
};

/// Compute the next semantic version from merged pull requests and commits.
#[derive(Parser, Debug)]
#[command(name = "semver-next")]
#[command(about = "Compute the next semantic version from merged pull requests and commits")]
#[command(version)]
struct Cli {
    /// GitHub token (falls back to GITHUB_TOKEN, GH_TOKEN, then `gh auth token`)
    #[arg(long, global = true)]
    github_token: Option<String>,

    /// GitHub API base URL, for GitHub Enterprise (falls back to GITHUB_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Give up after this many seconds
    #[arg(long, default_value_t = 120, global = true)]
    timeout: u64,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the next version for a repository
    Next(NextArgs),
    /// Check that a pull request will classify once merged
    CheckPr(CheckPrArgs),
}

#[derive(Args, Debug)]
struct NextArgs {
    /// Repository as OWNER/REPO
    repo: String,

    /// Ref to compute the next version for
    #[arg(long = "ref")]
    git_ref: String,

    /// Ref of the previous release (defaults to the latest release's tag)
    #[arg(long)]
    prev_ref: Option<String>,

    /// Previous version (defaults to the version in the previous ref)
    #[arg(long)]
    prev_version: Option<String>,

    /// Minimum bump: none, patch, minor or major
    #[arg(long, default_value = "none")]
    min_bump: String,

    /// Maximum bump: none, patch, minor or major
    #[arg(long, default_value = "major")]
    max_bump: String,

    /// Fail when a merged pull request has no recognized label
    #[arg(long)]
    require_labels: bool,

    /// Exit 10 when the version does not change
    #[arg(long)]
    require_change: bool,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,

    /// Create a release tag for the next version at --ref
    #[arg(long)]
    create_tag: bool,

    /// Prefix for the created tag
    #[arg(long, default_value = "v")]
    tag_prefix: String,
}

#[derive(Args, Debug)]
struct CheckPrArgs {
    /// Repository as OWNER/REPO
    repo: String,

    /// Pull request number
    number: u64,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Write to stderr so logs never mix with the printed version
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    let timeout = Duration::from_secs(cli.timeout);
    let outcome = match tokio::time::timeout(timeout, run(cli)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(anyhow!("timed out after {}s", timeout.as_secs())),
    };

    match outcome {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");

            let mut source = e.source();
            while let Some(err) = source {
                eprintln!("  Caused by: {err}");
                source = err.source();
            }

            process::exit(1);
        }
    }
}

/// How to reach GitHub. The client is built only after input validation.
struct Connection {
    github_token: Option<String>,
    api_url: Option<String>,
}

impl Connection {
    fn client(&self) -> Result<OctocrabClient> {
        let token = get_github_token(self.github_token.as_deref())?;
        let api_url = self
            .api_url
            .clone()
            .or_else(|| env::var("GITHUB_API_URL").ok())
            .filter(|url| !url.trim().is_empty());
        OctocrabClient::new(&token, api_url.as_deref()).context("Failed to create GitHub client")
    }
}

/// Run the selected command and return the process exit code.
async fn run(cli: Cli) -> Result<i32> {
    let connection = Connection {
        github_token: cli.github_token,
        api_url: cli.api_url,
    };

    match cli.command {
        Command::Next(args) => run_next(&connection, args).await,
        Command::CheckPr(args) => run_check(&connection, args).await,
    }
}

async fn run_next(connection: &Connection, args: NextArgs) -> Result<i32> {
    let options = NextOptions {
        repo: args.repo.clone(),
        base: args.prev_ref.clone().unwrap_or_default(),
        head: args.git_ref.clone(),
        previous_version: args.prev_version.clone().unwrap_or_default(),
        min_bump: args.min_bump.clone(),
        max_bump: args.max_bump.clone(),
    };
    options.validate()?;

    let client = connection.client()?;
    let result = compute_next(&client, &options)
        .await
        .with_context(|| format!("Failed to compute next version of {}", args.repo))?;

    print_result(&result, args.json)?;

    let policy = Policy {
        require_labels: args.require_labels,
        require_change: args.require_change,
    };
    if let Err(violation) = enforce_policy(&result, policy) {
        eprintln!("Error: {violation}");
        return Ok(violation.exit_code());
    }

    if args.create_tag && result.has_change() {
        let repo: RepoId = args
            .repo
            .parse()
            .map_err(|_| anyhow!("repo must be in the form owner/name"))?;
        let tag_name = format!("{}{}", args.tag_prefix, result.next_version);

        create_release_tag(&client, &repo.owner, &repo.name, &tag_name, &args.git_ref)
            .await
            .with_context(|| format!("Failed to create tag {}", tag_name))?;
    }

    Ok(0)
}

fn print_result(result: &NextResult, json: bool) -> Result<()> {
    if json {
        let rendered =
            serde_json::to_string_pretty(result).context("Failed to serialize result")?;
        println!("{}", rendered);
    } else {
        println!("{}", result.next_version);
    }
    Ok(())
}

async fn run_check(connection: &Connection, args: CheckPrArgs) -> Result<i32> {
    if args.repo.parse::<RepoId>().is_err() {
        bail!("repo must be in the form owner/name (got '{}')", args.repo);
    }

    let client = connection.client()?;
    let check = check_pull_request(&client, &args.repo, args.number)
        .await
        .with_context(|| {
            format!(
                "Pull request #{} of {} failed the check",
                args.number, args.repo
            )
        })?;

    println!("#{}: {}", check.number, check.change_level);
    Ok(0)
}
