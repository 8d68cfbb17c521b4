mod analysis;
mod config;
mod github;
mod llm;
mod session;

use clap::Parser;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use github::GitHubSource;
use llm::LlmClient;
use session::AnalysisSession;

/// repo-mentor — points an AI at a GitHub repository, gets a summary and
/// one suggested improvement, then judges whether a follow-up commit
/// addresses that suggestion.
#[derive(Parser, Debug)]
#[command(name = "repo-mentor", version, about)]
struct Cli {
    /// GitHub repository URL (e.g., https://github.com/org/repo)
    repo_url: String,

    /// Commit URL to verify right after the analysis, instead of being
    /// prompted for one
    #[arg(short, long)]
    commit: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!(repo_url = %cli.repo_url, "parsing repository URL");
    let repo = github::parse_repo_url(&cli.repo_url)?;
    debug!(owner = %repo.owner, name = %repo.name, "parsed repository URL");

    info!("loading configuration");
    let config = config::Config::load()?;
    let token = config.github_token().ok_or(
        "GitHub token not found. Set GITHUB_TOKEN or [github] token in .repo-mentor.toml",
    )?;
    let api_key = config.llm_api_key().ok_or(
        "LLM API key not found. Set OPENAI_API_KEY or [llm] api_key in .repo-mentor.toml",
    )?;
    let llm = LlmClient::new(config.llm_base_url(), api_key, config.llm_model());

    let mut session = AnalysisSession::new(repo, token);
    let source = GitHubSource::new(session.token.clone());

    info!("fetching repository files");
    session.files = github::crawler::crawl(&source, &session.repo).await?;
    info!(files = session.files.len(), "collected file corpus");

    info!("analyzing repository with AI");
    let proposal = analysis::propose(&mut session, &llm).await?;

    println!();
    println!("{}", "Repository Summary".bold().underline());
    println!("{}", proposal.summary);
    println!();
    println!("{}", "Suggested Change".bold().underline());
    println!("{}", proposal.suggested_change.yellow());
    println!();

    match cli.commit {
        Some(commit_url) => {
            let verdict = verify_commit(&session, &source, &llm, &commit_url).await?;
            print_verdict(&verdict);
        }
        None => prompt_and_verify(&session, &source, &llm).await?,
    }

    Ok(())
}

/// Interactive verification loop: ask for a commit URL, verify it, and on
/// failure re-offer the prompt so the user can retry. Blank input or EOF
/// ends the session without verification.
async fn prompt_and_verify(
    session: &AnalysisSession,
    source: &GitHubSource,
    llm: &LlmClient,
) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = io::stdin();
    loop {
        print!("Commit URL to verify (blank to quit): ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let commit_url = line.trim();
        if commit_url.is_empty() {
            break;
        }

        match verify_commit(session, source, llm, commit_url).await {
            Ok(verdict) => {
                print_verdict(&verdict);
                break;
            }
            Err(err) => {
                error!(error = %err, "verification failed");
                eprintln!("{} {err}", "Error:".red().bold());
            }
        }
    }
    Ok(())
}

/// Run the verification stage for one commit URL: parse it, check it
/// belongs to the analyzed repository, fetch its changed files, and ask the
/// AI for a verdict.
async fn verify_commit(
    session: &AnalysisSession,
    source: &GitHubSource,
    llm: &LlmClient,
    commit_url: &str,
) -> Result<analysis::Verdict, Box<dyn std::error::Error>> {
    let commit = github::parse_commit_url(commit_url)?;
    commit.ensure_matches(&session.repo)?;

    info!(hash = %commit.hash, "fetching commit changes");
    let changes = source.fetch_commit_changes(&session.repo, &commit.hash).await?;

    info!(files = changes.changed_files.len(), "verifying changes with AI");
    let verdict = analysis::verify(session, &changes, llm).await?;
    Ok(verdict)
}

fn print_verdict(verdict: &analysis::Verdict) {
    println!();
    println!("{}", "Verification Result".bold().underline());
    println!("{}", verdict.result);
    println!();
}
