use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use search_core::{
    paginate, process_queries, remove_duplicates_with, DocId, DocumentStatus, ExecutionMode, RequestQueue, SearchServer,
};
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

const STOP_WORDS_ENV: &str = "SEARCH_STOP_WORDS";

#[derive(Debug, Deserialize)]
struct InputDoc {
    id: DocId,
    text: String,
    #[serde(default)]
    status: DocumentStatus,
    #[serde(default)]
    ratings: Vec<i32>,
}

#[derive(Parser)]
#[command(name = "search-cli")]
#[command(about = "Search JSON/JSONL documents with an in-memory TF-IDF index", long_about = None)]
struct Cli {
    /// Space-separated stop words; falls back to $SEARCH_STOP_WORDS
    #[arg(long, global = true)]
    stop_words: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Seq,
    Par,
}

impl From<Mode> for ExecutionMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Seq => ExecutionMode::Sequential,
            Mode::Par => ExecutionMode::Parallel,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Status {
    Actual,
    Irrelevant,
    Banned,
    Removed,
}

impl From<Status> for DocumentStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Actual => DocumentStatus::Actual,
            Status::Irrelevant => DocumentStatus::Irrelevant,
            Status::Banned => DocumentStatus::Banned,
            Status::Removed => DocumentStatus::Removed,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the top documents for each query as JSON lines
    Search {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        #[arg(long, required = true)]
        query: Vec<String>,
        #[arg(long, value_enum, default_value_t = Mode::Seq)]
        mode: Mode,
        #[arg(long, value_enum, default_value_t = Status::Actual)]
        status: Status,
    },
    /// Print the query words found in one document
    Match {
        #[arg(long)]
        input: String,
        #[arg(long)]
        query: String,
        #[arg(long)]
        id: DocId,
        #[arg(long, value_enum, default_value_t = Mode::Seq)]
        mode: Mode,
    },
    /// Remove documents whose word sets repeat an earlier document
    Dedup {
        #[arg(long)]
        input: String,
        #[arg(long, value_enum, default_value_t = Mode::Seq)]
        mode: Mode,
    },
    /// Run a file of queries (one per line) in parallel and print paged results
    Batch {
        #[arg(long)]
        input: String,
        #[arg(long)]
        queries: String,
        #[arg(long, default_value_t = 5)]
        page_size: usize,
    },
    /// Replay a file of queries through the request history and report empty results
    Audit {
        #[arg(long)]
        input: String,
        #[arg(long)]
        queries: String,
        /// Print the query and results recorded under this request number
        #[arg(long)]
        show: Option<u64>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let stop_words = cli.stop_words.or_else(|| std::env::var(STOP_WORDS_ENV).ok()).unwrap_or_default();

    match cli.command {
        Commands::Search { input, query, mode, status } => {
            let server = load_server(&input, &stop_words)?;
            for q in &query {
                let docs = server.find_top_documents_with(mode.into(), q, DocumentStatus::from(status))?;
                println!("{}", serde_json::json!({ "query": q, "results": docs }));
            }
        }
        Commands::Match { input, query, id, mode } => {
            let server = load_server(&input, &stop_words)?;
            let (words, status) = server.match_document_with(mode.into(), &query, id)?;
            println!("{}", serde_json::json!({ "id": id, "words": words, "status": status }));
        }
        Commands::Dedup { input, mode } => {
            let mut server = load_server(&input, &stop_words)?;
            println!("Before duplicates removed: {}", server.document_count());
            let removed = remove_duplicates_with(&mut server, mode.into())?;
            for id in &removed {
                println!("Found duplicate document id {id}");
            }
            println!("After duplicates removed: {}", server.document_count());
        }
        Commands::Batch { input, queries, page_size } => {
            let server = load_server(&input, &stop_words)?;
            let queries = read_queries(Path::new(&queries))?;
            let results = process_queries(&server, &queries)?;
            for (query, docs) in queries.iter().zip(&results) {
                println!("{} documents for query [{}]", docs.len(), query);
                for (n, page) in paginate(docs, page_size).into_iter().enumerate() {
                    println!("{}", serde_json::json!({ "page": n + 1, "results": page }));
                }
            }
        }
        Commands::Audit { input, queries, show } => {
            let server = load_server(&input, &stop_words)?;
            let queries = read_queries(Path::new(&queries))?;
            let mut queue = RequestQueue::new(&server);
            for query in &queries {
                queue.add_find_request(query)?;
            }
            println!("Requests in window: {}", queue.query_size());
            println!("Total empty requests: {}", queue.no_result_requests());
            if let Some(number) = show {
                match queue.result_by_request_number(number) {
                    Some((query, docs)) => {
                        println!("{}", serde_json::json!({ "request": number, "query": query, "results": docs }))
                    }
                    None => println!("R# : {number} : is not found"),
                }
            }
        }
    }
    Ok(())
}

fn load_server(input: &str, stop_words: &str) -> Result<SearchServer> {
    let mut server = SearchServer::new(stop_words)?;
    let files = collect_input_files(Path::new(input));
    for file in &files {
        for doc in read_docs(file)? {
            server
                .add_document(doc.id, &doc.text, doc.status, &doc.ratings)
                .with_context(|| format!("document {} in {}", doc.id, file.display()))?;
        }
    }
    tracing::info!(files = files.len(), documents = server.document_count(), "documents loaded");
    Ok(server)
}

fn collect_input_files(input_path: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    }
    files
}

fn read_docs(file: &Path) -> Result<Vec<InputDoc>> {
    let reader = BufReader::new(File::open(file).with_context(|| format!("opening {}", file.display()))?);
    if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
        let mut docs = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() { continue; }
            docs.push(serde_json::from_str(&line)?);
        }
        return Ok(docs);
    }
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    match json {
        serde_json::Value::Array(arr) => arr.into_iter().map(|v| Ok(serde_json::from_value(v)?)).collect(),
        serde_json::Value::Object(_) => Ok(vec![serde_json::from_value(json)?]),
        _ => Ok(Vec::new()),
    }
}

fn read_queries(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(text.lines().map(str::trim).filter(|l| !l.is_empty()).map(String::from).collect())
}
