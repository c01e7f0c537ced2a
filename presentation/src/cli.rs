use application::auth_service::AuthService;
use application::rag_service::{Answer, AnswerSource, QueryOutcome, RagSettings};
use application::session::Session;
use clap::Parser;
use colored::Colorize;
use domain::errors::RagError;
use infrastructure::config::Config;
use infrastructure::drive_client::DriveClient;
use infrastructure::gemini_client::GeminiClient;
use infrastructure::oauth::OAuthFlow;
use shared::confirmation::{ask_confirmation, ask_text};
use shared::types::Result;

type DriveSession = Session<DriveClient, GeminiClient, GeminiClient>;

const SWITCH_COMMAND: &str = ":switch";

#[derive(Parser, Debug)]
#[command(name = "driveqa")]
#[command(about = "Ask questions about the documents in your Google Drive")]
pub struct Cli {
    /// Number of documents used as context for the answer
    #[arg(short = 'k', long, value_parser = parse_top_k)]
    pub top_k: Option<usize>,

    /// Forget the saved login and choose another account
    #[arg(long)]
    pub switch_account: bool,

    /// Copy each answer to the clipboard
    #[arg(long)]
    pub copy: bool,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub verbose: bool,

    /// Question to answer; without one an interactive prompt starts
    #[arg(trailing_var_arg = true)]
    pub question: Vec<String>,
}

fn parse_top_k(raw: &str) -> std::result::Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(k) if k >= 1 => Ok(k),
        _ => Err(format!("`{raw}` is not a positive integer")),
    }
}

pub fn render_sources(sources: &[AnswerSource]) -> String {
    sources
        .iter()
        .enumerate()
        .map(|(i, source)| {
            format!(
                "{}. {}  (similarity: {:.3})\n   {}",
                i + 1,
                source.name,
                source.score,
                source.link
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// What the user sees for a failed question; the session stays usable.
pub fn describe_error(err: &RagError) -> String {
    match err {
        RagError::EmptyCorpus => {
            "No readable documents were found in this Drive account; questions cannot be answered yet."
                .to_string()
        }
        RagError::DimensionMismatch { .. } => format!("Query rejected: {err}"),
        RagError::Authentication(_) => {
            format!("{err}. Type {SWITCH_COMMAND} or restart to sign in again.")
        }
        other => other.to_string(),
    }
}

pub struct CliApp {
    config: Config,
    auth: AuthService,
    copy_answers: bool,
}

impl CliApp {
    pub fn new(config: Config) -> Self {
        let auth = AuthService::new(OAuthFlow::from_config(&config));
        Self {
            config,
            auth,
            copy_answers: false,
        }
    }

    pub async fn run(&mut self, cli: Cli) -> Result<()> {
        self.copy_answers = cli.copy;
        if let Some(k) = cli.top_k {
            self.config.top_k = k;
        }
        if cli.switch_account {
            self.auth.switch_account()?;
        }

        let question = cli.question.join(" ");
        let question = question.trim();
        let one_shot = !question.is_empty();
        loop {
            let session = match self.open_session().await {
                Ok(session) => session,
                Err(err) => {
                    if retry_login(one_shot, || ask_confirmation("Try signing in again?", true))? {
                        continue;
                    }
                    return Err(err.into());
                }
            };
            self.print_banner(&session);
            self.prepare(&session).await;

            if one_shot {
                self.handle_question(&session, question).await;
                session.close();
                return Ok(());
            }

            let switch = self.interactive(&session).await?;
            session.close();
            if !switch {
                return Ok(());
            }
            self.auth.switch_account()?;
        }
    }

    async fn open_session(&self) -> std::result::Result<DriveSession, RagError> {
        let token = match self.auth.login().await {
            Ok(token) => token,
            Err(err) => {
                tracing::error!(error = %err, "login failed");
                println!("{} {}", "Login failed:".red().bold(), err.to_string().red());
                return Err(err);
            }
        };
        let drive = DriveClient::new(&self.config, token);
        let gemini = GeminiClient::new(&self.config);
        let settings = RagSettings::from_config(&self.config);
        Ok(Session::open(drive, gemini.clone(), gemini, settings).await)
    }

    fn print_banner(&self, session: &DriveSession) {
        let account = session.account();
        println!(
            "{} {} <{}>",
            "Signed in as".green(),
            account.name.bold(),
            account.email
        );
    }

    async fn prepare(&self, session: &DriveSession) {
        eprintln!("Indexing Drive files and generating embeddings...");
        match session.rag().corpus().await {
            Ok(corpus) => println!(
                "{}",
                format!("Ready: {} documents indexed.", corpus.len()).green()
            ),
            Err(err) => println!("{}", describe_error(&err).red()),
        }
    }

    /// Returns `true` when the user asked to switch accounts.
    async fn interactive(&self, session: &DriveSession) -> Result<bool> {
        println!("Ask a question. Type '{SWITCH_COMMAND}' to use another account, 'exit' to quit.");
        loop {
            let input = ask_text("Question")?;
            if input.is_empty() {
                continue;
            }
            if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
                return Ok(false);
            }
            if input == SWITCH_COMMAND {
                if ask_confirmation("Sign in with another account?", false)? {
                    return Ok(true);
                }
                continue;
            }
            self.handle_question(session, &input).await;
        }
    }

    async fn handle_question(&self, session: &DriveSession, question: &str) {
        eprintln!("Searching your documents...");
        match session.rag().ask(question).await {
            Ok(QueryOutcome::NoMatches) => {
                println!("{}", "No documents related to your question were found.".yellow());
            }
            Ok(QueryOutcome::Answered(answer)) => {
                self.print_answer(&answer);
                if self.copy_answers {
                    copy_to_clipboard(&answer.text);
                }
            }
            Err(err) => {
                tracing::debug!(error = ?err, "question failed");
                println!("{}", describe_error(&err).red());
            }
        }
    }

    fn print_answer(&self, answer: &Answer) {
        println!("\n{}", "Documents used for the answer:".cyan().bold());
        println!("{}", render_sources(&answer.sources));
        println!("\n{}", "Answer:".green().bold());
        println!("{}\n", answer.text);
    }
}

fn retry_login(one_shot: bool, confirm: impl FnOnce() -> Result<bool>) -> Result<bool> {
    if one_shot {
        return Ok(false);
    }
    confirm()
}

fn copy_to_clipboard(text: &str) {
    match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text.to_owned())) {
        Ok(()) => println!("{}", "Copied to clipboard.".green()),
        Err(err) => {
            tracing::warn!(error = %err, "clipboard unavailable");
            eprintln!("{} {}", "Clipboard copy failed:".red(), err);
        }
    }
}
