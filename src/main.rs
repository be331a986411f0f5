use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use tracing::info;

use interview_orchestrator::backend::{BackendClient, LoginRequest, SignupRequest};
use interview_orchestrator::config::OrchestratorConfig;
use interview_orchestrator::core::voice::{DiscardPlayer, NullCapture};
use interview_orchestrator::{
    AdvanceOutcome, CandidateSession, Recommendation, RoundKind, RoundStateMachine, SessionEvent,
    VoiceSessionClient, VoiceSessionConfig,
};

/// Interview Orchestrator - three-round candidate assessment client
#[derive(Parser, Debug)]
#[command(name = "interview-orchestrator")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register a new candidate account
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        full_name: String,
    },

    /// Log in and show current progress
    Login {
        #[arg(long)]
        email: String,
    },

    /// Show round progress for the logged-in candidate
    Status {
        #[arg(long)]
        email: String,
    },

    /// Take an MCQ round interactively (1 = aptitude, 2 = DSA)
    Quiz {
        #[arg(long)]
        email: String,
        /// Round number to take
        round: u8,
    },

    /// Run the voice interview round, streaming the transcript
    Interview {
        #[arg(long)]
        email: String,
    },

    /// List archived attempts for the logged-in candidate
    History {
        #[arg(long)]
        email: String,
    },

    /// Show final results for a finished interview session
    Results {
        #[arg(long)]
        email: String,
        session_id: String,
    },

    /// Admin: show the interview agent's evaluation for a candidate
    Analysis {
        #[arg(long)]
        email: String,
        candidate_id: String,
    },

    /// Admin: archive a candidate's attempt and unlock a fresh one
    GrantReattempt {
        #[arg(long)]
        email: String,
        candidate_id: String,
    },

    /// Admin: withdraw a granted re-attempt before it is started
    RevokeReattempt {
        #[arg(long)]
        email: String,
        candidate_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => OrchestratorConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => OrchestratorConfig::from_env()?,
    };

    let client = BackendClient::new(&config.api_base_url, config.request_timeout_secs)?;

    match cli.command {
        Commands::Signup { email, full_name } => {
            let password = prompt("Password: ")?;
            let auth = client
                .signup(&SignupRequest {
                    email,
                    password,
                    full_name,
                })
                .await?;
            println!("Registered {} ({})", auth.user.full_name, auth.user.email);
        }

        Commands::Login { email } => {
            login(&client, email).await?;
            let session = CandidateSession::sync(&client, config.round_question_count as u32).await?;
            print_progress(&session, config.round_question_count as u32);
        }

        Commands::Status { email } => {
            login(&client, email).await?;
            let session = CandidateSession::sync(&client, config.round_question_count as u32).await?;
            print_progress(&session, config.round_question_count as u32);
        }

        Commands::Quiz { email, round } => {
            login(&client, email).await?;
            let round = match round {
                1 => RoundKind::Aptitude,
                2 => RoundKind::Dsa,
                other => return Err(anyhow!("round {other} is not an MCQ round")),
            };
            run_quiz(&client, &config, round).await?;
        }

        Commands::Interview { email } => {
            login(&client, email).await?;
            run_interview(&client, &config).await?;
        }

        Commands::History { email } => {
            login(&client, email).await?;
            let attempts = client.attempt_history().await?;
            if attempts.is_empty() {
                println!("No archived attempts.");
            }
            for record in attempts {
                let overall = record
                    .overall_score
                    .map(|s| format!("{s:.1}%"))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "Attempt #{}: {} (overall {}{})",
                    record.attempt_number,
                    record.overall_status,
                    overall,
                    record
                        .recommendation
                        .map(|r| format!(", {r}"))
                        .unwrap_or_default()
                );
            }
        }

        Commands::Results { email, session_id } => {
            login(&client, email).await?;
            let results = client.interview_results(&session_id).await?;
            println!("Results for {} ({})", results.candidate_name, results.job_role);
            for report in &results.rounds {
                println!(
                    "  Round {}: {:.1}% {}",
                    report.round_number,
                    report.score,
                    if report.passed { "passed" } else { "failed" }
                );
            }
            println!("Overall: {:.1}% - {}", results.overall_score, results.recommendation);
        }

        Commands::Analysis { email, candidate_id } => {
            login(&client, email).await?;
            let analysis = client.candidate_analysis(&candidate_id).await?;
            println!("Candidate {}", analysis.candidate_id);
            if !analysis.key_strengths.is_empty() {
                println!("Key strengths:");
                for strength in &analysis.key_strengths {
                    println!("  - {strength}");
                }
            }
            if !analysis.areas_to_improve.is_empty() {
                println!("Areas to improve:");
                for area in &analysis.areas_to_improve {
                    println!("  - {area}");
                }
            }
            println!("\n{}", analysis.summary);
        }

        Commands::GrantReattempt { email, candidate_id } => {
            login(&client, email).await?;
            let ack = client.grant_reattempt(&candidate_id).await?;
            println!("{}", ack.message.unwrap_or_else(|| "Re-attempt granted".to_string()));
        }

        Commands::RevokeReattempt { email, candidate_id } => {
            login(&client, email).await?;
            let ack = client.revoke_reattempt(&candidate_id).await?;
            println!("{}", ack.message.unwrap_or_else(|| "Re-attempt revoked".to_string()));
        }
    }

    Ok(())
}

async fn login(client: &BackendClient, email: String) -> anyhow::Result<()> {
    let password = prompt("Password: ")?;
    let auth = client.login(&LoginRequest { email, password }).await?;
    info!(user = %auth.user.email, "Logged in");
    Ok(())
}

async fn run_quiz(
    client: &BackendClient,
    config: &OrchestratorConfig,
    round: RoundKind,
) -> anyhow::Result<()> {
    let round_size = config.round_question_count as u32;
    let session = CandidateSession::sync(client, round_size).await?;
    let mut machine = RoundStateMachine::with_attempt(
        client,
        config.round_question_count,
        session.attempt,
    );

    machine.enter(round)?;
    println!("{} - {} questions", round.title(), config.round_question_count);

    loop {
        let question = machine
            .current_question()
            .ok_or_else(|| anyhow!("no question presented"))?
            .clone();
        let (position, total) = machine.progress().unwrap_or((0, 0));

        println!("\n[{}/{}] {}", position + 1, total, question.prompt);
        for choice in &question.options {
            println!("  {}) {}", choice.id, choice.text);
        }

        let selection = prompt("Answer: ")?;
        let option = question
            .options
            .iter()
            .find(|c| c.id.eq_ignore_ascii_case(selection.trim()))
            .ok_or_else(|| anyhow!("pick one of the listed options"))?;
        machine.answer(&question.id, &option.id)?;

        match machine.advance().await? {
            AdvanceOutcome::NextQuestion => {}
            AdvanceOutcome::RoundSubmitted(outcome) => {
                if let Some(score) = &outcome.score {
                    println!(
                        "\n{}: {}/{} - {}",
                        outcome.round,
                        score.correct,
                        score.total,
                        if outcome.passed { "passed" } else { "failed" }
                    );
                }
                if !outcome.reported {
                    println!("(score could not be reported to the backend)");
                }
                break;
            }
        }
    }

    Ok(())
}

async fn run_interview(client: &BackendClient, config: &OrchestratorConfig) -> anyhow::Result<()> {
    let round_size = config.round_question_count as u32;
    let session = CandidateSession::sync(client, round_size).await?;
    let candidate_name = session.user.full_name.clone();

    let mut machine =
        RoundStateMachine::with_attempt(client, config.round_question_count, session.attempt);
    machine.enter(RoundKind::Voice)?;

    let voice_config = VoiceSessionConfig::new(&config.ws_url, &config.job_role, candidate_name);
    let (voice, mut events) = VoiceSessionClient::new(
        voice_config,
        Arc::new(DiscardPlayer),
        Arc::new(NullCapture),
    );
    voice.connect().await?;
    println!("Interview started. Waiting for the agent...");

    while let Some(event) = events.recv().await {
        match event {
            SessionEvent::TranscriptAppended(entry) => {
                println!("{:?}: {}", entry.role, entry.text);
            }
            SessionEvent::StatusUpdate(message) => println!("... {message}"),
            SessionEvent::ServerError(message) => eprintln!("agent error: {message}"),
            SessionEvent::Completed(summary) => {
                let outcome = machine.complete_voice(&summary).await?;
                println!(
                    "\nInterview complete: {:.1}% ({} questions)",
                    summary.scores.total_score, summary.total_questions
                );
                println!("{}", Recommendation::from_score(summary.scores.total_score));
                if !outcome.reported {
                    println!("(completion could not be reported to the backend)");
                }
            }
            SessionEvent::Closed { completed } => {
                if !completed {
                    println!("Session ended before completion");
                }
                break;
            }
            _ => {}
        }
    }

    voice.disconnect().await;
    Ok(())
}

fn print_progress(session: &CandidateSession, round_size: u32) {
    println!("Candidate: {} ({})", session.user.full_name, session.user.email);
    println!("Attempt #{}", session.attempt.number);
    for round in [RoundKind::Aptitude, RoundKind::Dsa, RoundKind::Voice] {
        let status = session.attempt.status(round);
        println!("  {}: {:?}", round, status);
    }
    if let Some(overall) = session.attempt.overall_score(round_size) {
        println!(
            "Overall: {:.1}% - {}",
            overall,
            Recommendation::from_score(overall)
        );
    }
    if session.can_reattempt {
        println!("A re-attempt has been granted.");
    }
}

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{label}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
