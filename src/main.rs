mod completion;
mod config;
mod export;
mod literature;
mod markdown;
mod plan;

pub const USER_AGENT: &str = concat!("labplan/", env!("CARGO_PKG_VERSION"));

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use reqwest::Client;
use tracing::{error, info, warn};

use completion::GroqClient;
use config::{Config, Overrides};
use export::ExportedDocument;
use literature::{LiteratureOutcome, SemanticScholarClient};
use plan::{Lang, PipelineError, PlanReport, PlanRequest};

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Global HTTP client timeout; plan synthesis on large models can be slow.
const HTTP_TIMEOUT: Duration = Duration::from_secs(120);
/// Exit code for a run that was refused before any request (e.g. empty idea).
const EXIT_NO_INPUT: u8 = 2;

/// Turn a research idea into a literature-grounded work plan.
///
/// Configuration via environment variables:
/// - `GROQ_API_KEY`: completion API credential (required)
/// - `GROQ_MODEL`, `GROQ_API_URL`: completion model and endpoint (optional)
/// - `SEMANTIC_SCHOLAR_API_KEY`, `SEMANTIC_SCHOLAR_API_URL`: paper search (optional)
#[derive(Parser, Debug)]
#[command(name = "labplan", version)]
struct Cli {
    /// Research idea; pass "-" to read it from stdin
    #[arg(value_name = "IDEA")]
    idea: Option<String>,

    /// Read the research idea from a file
    #[arg(short = 'f', long, value_name = "PATH", conflicts_with = "idea")]
    idea_file: Option<PathBuf>,

    /// Where to write the .docx plan (a directory gets the default file name)
    #[arg(short, long, value_name = "PATH", default_value = export::DEFAULT_FILE_NAME)]
    output: PathBuf,

    /// Print the plan without writing a document
    #[arg(long)]
    no_export: bool,

    /// Language of the generated plan
    #[arg(long, value_enum, default_value_t = Lang::En)]
    lang: Lang,

    /// Completion model identifier
    #[arg(long, value_name = "MODEL")]
    model: Option<String>,

    /// Number of papers requested from the search API
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u8).range(1..=100))]
    search_limit: Option<u8>,

    /// Number of abstracts embedded in the plan prompt
    #[arg(long, value_name = "N")]
    context_limit: Option<usize>,

    /// TOML file holding GROQ_API_KEY / SEMANTIC_SCHOLAR_API_KEY
    #[arg(long, value_name = "PATH")]
    secrets: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            model: self.model.clone(),
            search_limit: self.search_limit,
            context_limit: self.context_limit,
            secrets: self.secrets.clone(),
        }
    }

    fn read_idea(&self) -> std::io::Result<String> {
        if let Some(path) = &self.idea_file {
            return std::fs::read_to_string(path);
        }
        match self.idea.as_deref() {
            Some("-") => {
                let mut idea = String::new();
                std::io::stdin().read_to_string(&mut idea)?;
                Ok(idea)
            }
            Some(idea) => Ok(idea.to_string()),
            None => Ok(String::new()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("labplan=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.overrides())
        .inspect_err(|e| error!("configuration error: {e}"))?;
    let idea = cli.read_idea()?;

    let http = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(HTTP_TIMEOUT)
        .build()?;
    let completion = GroqClient::new(http.clone(), &config.completion);
    let literature = SemanticScholarClient::new(http, &config.literature);

    let req = PlanRequest {
        idea: &idea,
        lang: cli.lang,
        context_limit: config.literature.context_limit,
    };
    info!(model = completion.model(), lang = ?req.lang, "starting labplan");

    let report = match plan::run(&completion, &literature, &req).await {
        Ok(report) => report,
        Err(PipelineError::EmptyIdea) => {
            warn!("please enter a research idea first");
            return Ok(ExitCode::from(EXIT_NO_INPUT));
        }
        Err(e) => {
            error!("{e}. Please try again.");
            return Ok(ExitCode::FAILURE);
        }
    };

    info!(degraded = report.is_degraded(), "plan ready");
    print!("{}", render_summary(&report, config.literature.context_limit));

    if !cli.no_export {
        let doc = export::export_plan(&report.idea, &report.plan)?;
        let path = write_document(&cli.output, &doc)?;
        if doc.unpaired_markers > 0 {
            warn!(
                unpaired = doc.unpaired_markers,
                "some bold markers had no partner and were kept as plain text in the document"
            );
        }
        info!(
            path = %path.display(),
            title = %doc.title,
            mime = doc.mime_type,
            headings = doc.headings,
            "plan document written"
        );
    }

    Ok(ExitCode::SUCCESS)
}

fn render_summary(report: &PlanReport, context_limit: usize) -> String {
    let mut output = format!("**Search terms:** {}\n\n", report.search_terms);

    match &report.literature {
        LiteratureOutcome::Found(records) => {
            output.push_str("**Literature used:**\n");
            for record in records.iter().take(context_limit) {
                output.push_str(&format!("- {}\n", markdown::sanitize_heading(&record.title)));
            }
            output.push('\n');
        }
        LiteratureOutcome::Empty => output.push_str(
            "> Note: no articles with abstracts were found. The plan is based on general knowledge only.\n\n",
        ),
        LiteratureOutcome::Unavailable(e) => output.push_str(&format!(
            "> Note: the literature search failed ({e}). The plan is based on general knowledge only.\n\n"
        )),
    }

    output.push_str(&report.plan);
    output.push('\n');
    output
}

fn write_document(output: &Path, doc: &ExportedDocument) -> std::io::Result<PathBuf> {
    let path = if output.is_dir() {
        output.join(doc.file_name)
    } else {
        output.to_path_buf()
    };
    std::fs::write(&path, &doc.bytes)?;
    Ok(path)
}
