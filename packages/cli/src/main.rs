use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use sandbench_host::{ExerciseManifest, Session};
use sandbench_kv::{JsonFileStore, SharedStore};
use sandbench_mockapi::{reset_mock_db, ApiRequest, Method, MockBackend};

/// Sandbench - command-line host for coding-practice exercises
#[derive(Parser, Debug)]
#[command(name = "sandbench")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory for persisted state (edits and mock databases)
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble an exercise into one executable HTML document
    Assemble {
        /// Exercise manifest (JSON)
        #[arg(long)]
        manifest: PathBuf,

        /// Write the document here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Send one request to an exercise's mock backend
    Mock {
        /// Exercise manifest (JSON)
        #[arg(long)]
        manifest: PathBuf,

        /// HTTP method (GET, POST, PUT, PATCH, DELETE)
        method: String,

        /// Request path, e.g. /api/products
        path: String,

        /// JSON request body
        #[arg(long)]
        body: Option<String>,
    },

    /// Clear persisted state for an exercise
    Reset {
        /// Exercise manifest (JSON)
        #[arg(long)]
        manifest: PathBuf,

        /// Clear only the saved file edits
        #[arg(long)]
        edits: bool,

        /// Clear only the mock database
        #[arg(long)]
        mockdb: bool,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(args.state_dir)?;

    match args.command {
        Command::Assemble { manifest, out } => {
            let manifest = load_manifest(&manifest)?;
            let mut session = Session::open(manifest, store)?;
            let document = session.run()?;
            match out {
                Some(path) => {
                    fs::write(&path, document.as_str())?;
                    println!("Wrote {} bytes to {}", document.len(), path.display());
                }
                None => println!("{}", document),
            }
        }

        Command::Mock {
            manifest,
            method,
            path,
            body,
        } => {
            let manifest = load_manifest(&manifest)?;
            let method: Method = method.parse()?;

            let mut backend = MockBackend::new(manifest.id.clone(), store)
                .with_chaos(manifest.chaos())
                .with_rules(manifest.collection_rules());
            if let Some(seed) = manifest.api_seed() {
                backend = backend.with_seed(seed);
            }

            let mut request = ApiRequest {
                method,
                url: path,
                body: None,
            };
            if let Some(body) = body {
                request = request.with_raw_body(body);
            }

            let response = backend.fetch(&request);
            println!("{} {}", response.status, response.status_text);
            if !response.body.is_null() {
                println!("{}", serde_json::to_string_pretty(&response.body)?);
            }
        }

        Command::Reset {
            manifest,
            edits,
            mockdb,
        } => {
            let manifest = load_manifest(&manifest)?;
            // No flag means both.
            let all = !edits && !mockdb;
            let mut store = store;

            if edits || all {
                sandbench_files::EditStore::new(&mut store).clear(&manifest.id)?;
                println!("Cleared saved edits for '{}'", manifest.id);
            }
            if mockdb || all {
                reset_mock_db(&mut store, &manifest.id)?;
                println!("Cleared mock database for '{}'", manifest.id);
            }
        }
    }

    Ok(())
}

fn open_store(state_dir: Option<PathBuf>) -> Result<SharedStore, Box<dyn std::error::Error>> {
    let root = match state_dir {
        Some(dir) => dir,
        None => dirs::data_dir()
            .ok_or("no platform data directory; pass --state-dir")?
            .join("sandbench"),
    };
    fs::create_dir_all(&root)?;
    Ok(SharedStore::new(JsonFileStore::new(root)?))
}

fn load_manifest(path: &PathBuf) -> Result<ExerciseManifest, Box<dyn std::error::Error>> {
    let raw = fs::read_to_string(path)?;
    Ok(ExerciseManifest::from_json(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_manifest(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("exercise.json");
        fs::write(
            &path,
            r#"{
                "id": "cli-demo",
                "files": {
                    "/index.html": { "code": "<html><head></head><body><script src=\"/main.js\"></script></body></html>" },
                    "/main.js": { "code": "console.log('hi');" }
                },
                "entry": "/index.html",
                "mock": { "mockNet": { "slowMs": 0 } }
            }"#,
        )
        .unwrap();
        path
    }

    #[test]
    fn assemble_writes_a_document() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = write_manifest(dir.path());
        let out = dir.path().join("preview.html");

        run(Args {
            state_dir: Some(dir.path().join("state")),
            command: Command::Assemble {
                manifest,
                out: Some(out.clone()),
            },
        })
        .unwrap();

        let html = fs::read_to_string(out).unwrap();
        assert!(html.contains("console.log('hi');"));
        assert!(html.contains("sandbox-console"));
    }

    #[test]
    fn mock_round_trip_and_reset() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = write_manifest(dir.path());
        let state_dir = dir.path().join("state");

        run(Args {
            state_dir: Some(state_dir.clone()),
            command: Command::Mock {
                manifest: manifest.clone(),
                method: "POST".to_string(),
                path: "/api/notes".to_string(),
                body: Some(r#"{"text":"remember"}"#.to_string()),
            },
        })
        .unwrap();

        assert!(state_dir.join("mockdb.cli-demo.json").is_file());

        run(Args {
            state_dir: Some(state_dir.clone()),
            command: Command::Reset {
                manifest,
                edits: false,
                mockdb: false,
            },
        })
        .unwrap();

        assert!(!state_dir.join("mockdb.cli-demo.json").exists());
    }

    #[test]
    fn unknown_method_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = write_manifest(dir.path());

        let result = run(Args {
            state_dir: Some(dir.path().join("state")),
            command: Command::Mock {
                manifest,
                method: "TRACE".to_string(),
                path: "/api/notes".to_string(),
                body: None,
            },
        });
        assert!(result.is_err());
    }
}
