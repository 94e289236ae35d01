use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use gcp_api_clients::bigquery::{
    BigQuery, CreateDatasetOptions, CreateTableOptions, DropDatasetOptions, DumpOptions,
    ExtractOptions, JobOutcome, ListOptions, LoadData, LoadOptions, QueryOutcome, SelectOptions,
    Target, BIGQUERY_SCOPE,
};
use gcp_api_clients::config::Config;
use gcp_api_clients::gcp::http::format_gcp_error;
use gcp_api_clients::pubsub::{self, PubSub, PullOptions, SubscriptionOptions, PUBSUB_SCOPE};
use gcp_api_clients::VERSION;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Command line client for BigQuery and Pub/Sub
#[derive(Parser, Debug)]
#[command(name = "gapi", version = VERSION, about, long_about = None)]
struct Args {
    /// GCP project to use
    #[arg(short, long, global = true)]
    project: Option<String>,

    /// Default BigQuery dataset
    #[arg(short, long, global = true)]
    dataset: Option<String>,

    /// Service account email
    #[arg(long, global = true)]
    service_account: Option<String>,

    /// Service account JSON key file
    #[arg(long, global = true)]
    private_key: Option<PathBuf>,

    /// OAuth scope (repeatable)
    #[arg(long = "scope", global = true)]
    scopes: Vec<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// BigQuery datasets, tables and jobs
    #[command(subcommand)]
    Bq(BqCommand),
    /// Pub/Sub topics, subscriptions and messages
    #[command(subcommand)]
    Pubsub(PubsubCommand),
    /// Show or change the saved configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum BqCommand {
    /// List datasets
    Datasets {
        /// Include hidden datasets
        #[arg(long)]
        all: bool,
    },
    /// List tables in the dataset
    Tables,
    CreateDataset {
        dataset_id: String,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    DropDataset {
        dataset_id: String,
        /// Also delete every table in the dataset
        #[arg(long)]
        delete_contents: bool,
    },
    CreateTable {
        table_id: String,
        /// JSON file holding the field list
        #[arg(long)]
        schema: Option<PathBuf>,
        /// Create a view over this query instead
        #[arg(long)]
        view_query: Option<String>,
    },
    DropTable {
        table_id: String,
    },
    InfoTable {
        table_id: String,
    },
    /// Run a query and print its rows
    Query {
        sql: String,
        #[arg(long = "async")]
        asynchronous: bool,
        /// Seconds to wait for the job
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Print every row of a table
    Dump {
        table_id: String,
        #[arg(long)]
        max_results: Option<u32>,
    },
    /// Load a local file, a gs:// URI or literal data into a table
    Load {
        table_id: String,
        source: String,
        #[arg(long)]
        source_format: Option<String>,
        #[arg(long)]
        skip_leading_rows: Option<u32>,
        /// JSON file holding the field list
        #[arg(long)]
        schema: Option<PathBuf>,
        #[arg(long = "async")]
        asynchronous: bool,
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Export a table to Cloud Storage
    Extract {
        table_id: String,
        #[arg(required = true)]
        destination_uris: Vec<String>,
        #[arg(long = "async")]
        asynchronous: bool,
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Wait for a job to finish
    Wait {
        job_id: String,
        #[arg(long)]
        timeout: Option<u64>,
    },
}

#[derive(Subcommand, Debug)]
enum PubsubCommand {
    Topics,
    Subscriptions,
    TopicSubscriptions {
        topic: String,
    },
    CreateTopic {
        topic: String,
    },
    DropTopic {
        topic: String,
    },
    CreateSubscription {
        subscription: String,
        topic: String,
        #[arg(long)]
        ack_deadline: Option<u32>,
        #[arg(long)]
        push_endpoint: Option<String>,
    },
    DropSubscription {
        subscription: String,
    },
    Publish {
        topic: String,
        #[arg(required = true)]
        messages: Vec<String>,
    },
    Pull {
        subscription: String,
        #[arg(long)]
        max_messages: Option<u32>,
        /// Acknowledge what was pulled
        #[arg(long)]
        ack: bool,
    },
    Ack {
        subscription: String,
        #[arg(required = true)]
        ack_ids: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    Show,
    SetProject { project_id: String },
    SetDataset { dataset_id: String },
}

/// Effective settings for one invocation
struct Session {
    config: Config,
    project: Option<String>,
    dataset: Option<String>,
}

impl Session {
    fn new(args: &Args) -> Self {
        let mut config = Config::load();
        if args.service_account.is_some() {
            config.service_account = args.service_account.clone();
        }
        if args.private_key.is_some() {
            config.private_key = args.private_key.clone();
        }
        if !args.scopes.is_empty() {
            config.scope = args.scopes.clone();
        }

        Self {
            project: config.effective_project(args.project.as_deref()),
            dataset: config.effective_dataset(args.dataset.as_deref()),
            config,
        }
    }

    fn project(&self) -> Result<&str> {
        self.project.as_deref().context(
            "No GCP project configured. Set GOOGLE_CLOUD_PROJECT or use --project flag",
        )
    }

    async fn bigquery(&self) -> Result<BigQuery> {
        let credentials = self.config.credentials(BIGQUERY_SCOPE).await?;
        let bq = BigQuery::build_from(self.config.discovery_url(), self.project()?, credentials)
            .await
            .context("loading the BigQuery API description")?;

        Ok(match &self.dataset {
            Some(dataset) => bq.with_dataset(dataset),
            None => bq,
        })
    }

    async fn pubsub(&self) -> Result<PubSub> {
        let credentials = self.config.credentials(PUBSUB_SCOPE).await?;
        PubSub::build_from(self.config.discovery_url(), self.project()?, credentials)
            .await
            .context("loading the Pub/Sub API description")
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Cannot open log file {:?}: {}", log_path, e);
            return None;
        },
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("gapi {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("gapi").join("gapi.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".gapi").join("gapi.log");
    }
    PathBuf::from("gapi.log")
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            eprintln!("Error: {}", format_gcp_error(&err));
            ExitCode::FAILURE
        },
    }
}

async fn run(args: Args) -> Result<()> {
    let session = Session::new(&args);

    match args.command {
        Command::Bq(command) => run_bigquery(&session, command).await,
        Command::Pubsub(command) => run_pubsub(&session, command).await,
        // Saved as loaded, without this invocation's overrides
        Command::Config(command) => run_config(Config::load(), command),
    }
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_schema(path: Option<&Path>) -> Result<Option<Value>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading schema {}", path.display()))?;
    let schema = serde_json::from_str(&content)
        .with_context(|| format!("parsing schema {}", path.display()))?;
    Ok(Some(schema))
}

fn created(result: Option<Value>) -> Value {
    result.unwrap_or_else(|| json!({ "alreadyExists": true }))
}

fn job_output(outcome: JobOutcome) -> Value {
    match outcome {
        JobOutcome::Pending(job) => json!({ "jobId": job.id() }),
        JobOutcome::Done(job) => job,
    }
}

async fn run_bigquery(session: &Session, command: BqCommand) -> Result<()> {
    let bq = session.bigquery().await?;

    let output = match command {
        BqCommand::Datasets { all } => {
            let opts = ListOptions {
                all: all.then_some(true),
                ..Default::default()
            };
            json!(bq.show_datasets(&opts).await?)
        },
        BqCommand::Tables => json!(bq.show_tables(&ListOptions::default()).await?),
        BqCommand::CreateDataset {
            dataset_id,
            location,
            description,
        } => {
            let opts = CreateDatasetOptions {
                location,
                description,
                ..Default::default()
            };
            created(bq.create_dataset(&dataset_id, &opts).await?)
        },
        BqCommand::DropDataset {
            dataset_id,
            delete_contents,
        } => {
            let opts = DropDatasetOptions {
                delete_contents,
                ..Default::default()
            };
            json!({ "deleted": bq.drop_dataset(&dataset_id, &opts).await? })
        },
        BqCommand::CreateTable {
            table_id,
            schema,
            view_query,
        } => {
            let opts = CreateTableOptions {
                schema: read_schema(schema.as_deref())?,
                query: view_query,
                ..Default::default()
            };
            created(bq.create_table(&table_id, &opts).await?)
        },
        BqCommand::DropTable { table_id } => {
            json!({ "deleted": bq.drop_table(&table_id, &Target::default()).await? })
        },
        BqCommand::InfoTable { table_id } => bq
            .info_table(&table_id, &Target::default())
            .await?
            .unwrap_or(Value::Null),
        BqCommand::Query {
            sql,
            asynchronous,
            timeout,
        } => {
            let opts = SelectOptions {
                asynchronous,
                timeout: timeout.map(Duration::from_secs),
                ..Default::default()
            };
            match bq.select(&sql, &opts).await? {
                QueryOutcome::Pending(job) => json!({ "jobId": job.id() }),
                QueryOutcome::Rows(rows) => json!(rows),
            }
        },
        BqCommand::Dump {
            table_id,
            max_results,
        } => {
            let opts = DumpOptions {
                max_results,
                ..Default::default()
            };
            json!(bq.dump_table(&table_id, &opts).await?)
        },
        BqCommand::Load {
            table_id,
            source,
            source_format,
            skip_leading_rows,
            schema,
            asynchronous,
            timeout,
        } => {
            let opts = LoadOptions {
                source_format,
                skip_leading_rows,
                schema: read_schema(schema.as_deref())?,
                asynchronous,
                timeout: timeout.map(Duration::from_secs),
                ..Default::default()
            };
            job_output(bq.load(&table_id, LoadData::infer(&source), &opts).await?)
        },
        BqCommand::Extract {
            table_id,
            destination_uris,
            asynchronous,
            timeout,
        } => {
            let opts = ExtractOptions {
                asynchronous,
                timeout: timeout.map(Duration::from_secs),
                ..Default::default()
            };
            job_output(bq.extract(&table_id, &destination_uris, &opts).await?)
        },
        BqCommand::Wait { job_id, timeout } => {
            bq.wait_job(&job_id, timeout.map(Duration::from_secs))
                .await?
        },
    };

    print_json(&output)
}

async fn run_pubsub(session: &Session, command: PubsubCommand) -> Result<()> {
    let ps = session.pubsub().await?;
    let list = pubsub::ListOptions::default();

    let output = match command {
        PubsubCommand::Topics => json!(ps.list_topics(&list).await?),
        PubsubCommand::Subscriptions => json!(ps.list_subscriptions(&list).await?),
        PubsubCommand::TopicSubscriptions { topic } => {
            json!(ps.list_topic_subscriptions(&topic, &list).await?)
        },
        PubsubCommand::CreateTopic { topic } => created(ps.create_topic(&topic, None).await?),
        PubsubCommand::DropTopic { topic } => {
            json!({ "deleted": ps.drop_topic(&topic, None).await? })
        },
        PubsubCommand::CreateSubscription {
            subscription,
            topic,
            ack_deadline,
            push_endpoint,
        } => {
            let opts = SubscriptionOptions {
                ack_deadline_seconds: ack_deadline,
                push_config: push_endpoint.map(|endpoint| json!({ "pushEndpoint": endpoint })),
                ..Default::default()
            };
            created(ps.create_subscription(&subscription, &topic, &opts).await?)
        },
        PubsubCommand::DropSubscription { subscription } => {
            json!({ "deleted": ps.drop_subscription(&subscription, None).await? })
        },
        PubsubCommand::Publish { topic, messages } => {
            json!({ "messageIds": ps.publish(&topic, &messages, None).await? })
        },
        PubsubCommand::Pull {
            subscription,
            max_messages,
            ack,
        } => {
            let opts = PullOptions {
                max_messages,
                ..Default::default()
            };
            let received = ps.pull(&subscription, &opts).await?;

            let mut messages = Vec::with_capacity(received.len());
            for r in &received {
                messages.push(json!({
                    "ackId": r.ack_id,
                    "messageId": r.message.message_id,
                    "publishTime": r.message.publish_time,
                    "attributes": r.message.attributes,
                    "data": String::from_utf8_lossy(&r.message.decode_data()?),
                }));
            }

            if ack && !received.is_empty() {
                let ack_ids: Vec<&str> = received.iter().map(|r| r.ack_id.as_str()).collect();
                ps.acknowledge(&subscription, &ack_ids, None).await?;
            }
            json!(messages)
        },
        PubsubCommand::Ack {
            subscription,
            ack_ids,
        } => {
            ps.ack(&subscription, &ack_ids, None).await?;
            json!({ "acknowledged": ack_ids.len() })
        },
    };

    print_json(&output)
}

fn run_config(mut config: Config, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            if let Some(path) = Config::config_path() {
                eprintln!("# {}", path.display());
            }
            print_json(&serde_json::to_value(&config)?)
        },
        ConfigCommand::SetProject { project_id } => config.set_project(&project_id),
        ConfigCommand::SetDataset { dataset_id } => config.set_dataset(&dataset_id),
    }
}
