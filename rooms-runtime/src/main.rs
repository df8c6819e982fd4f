use anyhow::{anyhow, Result};
use clap::{arg, ArgAction, ArgMatches, Command};
use rooms_algorithms::breakout_rooms::seq_vnd::{self, Config};
use rooms_challenges::breakout_rooms::{Challenge, Difficulty, Solution};
use rooms_structs::core::{GenerateSettings, OutputData};
use rooms_utils::{compress_obj, decompress_obj, dejsonify, jsonify};
use serde_json::{Map, Value};
use std::{fs, io::Read, path::PathBuf, time::Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("rooms-runtime")
        .about("Computes, verifies or generates breakout room assignments")
        .arg_required_else_help(true)
        .arg(
            arg!(--verbose "Log every accepted move")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("compute_solution")
                .about("Computes a solution")
                .arg(
                    arg!(<INPUT> "Instance file (text format or .json), or '-' for stdin")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--hyperparameters [HYPERPARAMETERS] "Hyperparameters json string or path to json file")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--output [OUTPUT_FILE] "If set, the output will be saved to this file path")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--format [FORMAT] "Output format")
                        .default_value("json")
                        .value_parser(["json", "text"]),
                )
                .arg(
                    arg!(--compress "Compress the json output file as zlib")
                        .action(ArgAction::SetTrue)
                        .requires("output"),
                ),
        )
        .subcommand(
            Command::new("verify_solution")
                .about("Verifies a solution")
                .arg(
                    arg!(<INPUT> "Instance file (text format, .json or zlib compressed json)")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(<SOLUTION> "Solution file (text format, .json or zlib compressed json), or '-' for stdin")
                        .value_parser(clap::value_parser!(String)),
                ),
        )
        .subcommand(
            Command::new("generate_instance")
                .about("Generates a random instance")
                .arg(
                    arg!(<SETTINGS> "Settings json string or path to json file")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(<RAND_HASH> "A string used in seed generation")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(arg!(<NONCE> "Nonce value").value_parser(clap::value_parser!(u64)))
                .arg(
                    arg!(--output [OUTPUT_FILE] "If set, the instance will be saved to this file path")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
}

fn required<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, id: &str) -> Result<T> {
    matches
        .get_one::<T>(id)
        .cloned()
        .ok_or_else(|| anyhow!("Missing argument <{}>", id))
}

fn enable_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let matches = cli().get_matches();
    enable_tracing(matches.get_flag("verbose"));

    if let Err(e) = run(&matches) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("compute_solution", sub_m)) => compute_solution(
            required::<String>(sub_m, "INPUT")?,
            sub_m.get_one::<String>("hyperparameters").cloned(),
            sub_m.get_one::<PathBuf>("output").cloned(),
            required::<String>(sub_m, "format")?,
            sub_m.get_flag("compress"),
        ),
        Some(("verify_solution", sub_m)) => verify_solution(
            required::<String>(sub_m, "INPUT")?,
            required::<String>(sub_m, "SOLUTION")?,
        ),
        Some(("generate_instance", sub_m)) => generate_instance(
            required::<String>(sub_m, "SETTINGS")?,
            required::<String>(sub_m, "RAND_HASH")?,
            required::<u64>(sub_m, "NONCE")?,
            sub_m.get_one::<PathBuf>("output").cloned(),
        ),
        _ => Err(anyhow!("Invalid subcommand")),
    }
}

pub fn compute_solution(
    input: String,
    hyperparameters: Option<String>,
    output_file: Option<PathBuf>,
    format: String,
    compress: bool,
) -> Result<()> {
    if compress && format == "text" {
        return Err(anyhow!("--compress only applies to json output"));
    }
    let challenge = load_challenge(&input)?;
    let hyperparameters = hyperparameters
        .map(|h| load_hyperparameters(&h))
        .transpose()?;
    let config = Config::initialize(&hyperparameters);
    info!(
        num_students = challenge.num_students(),
        num_edges = challenge.edges().len(),
        stress_budget = challenge.stress_budget(),
        ?config,
        "solving"
    );

    let start = Instant::now();
    let descent = seq_vnd::solve(&challenge, &config);
    let runtime_ms = start.elapsed().as_millis() as u64;

    let solution = descent.to_solution();
    let total_happiness = challenge
        .verify_solution(&solution)
        .map_err(|e| anyhow!("Solver produced an invalid solution: {}", e))?;

    if format == "text" {
        let text = solution.to_output_string();
        return match output_file {
            Some(path) => {
                fs::write(&path, text)?;
                println!("solution written to: {:?}", path);
                Ok(())
            }
            None => {
                print!("{}", text);
                Ok(())
            }
        };
    }

    let output_data = OutputData {
        num_students: challenge.num_students(),
        num_rooms: solution.num_rooms,
        total_happiness,
        accepted_moves: descent.steps.len(),
        neighborhood_evaluations: descent.evaluations,
        runtime_ms,
        hyperparameters,
        solution: match serde_json::to_value(&solution)? {
            Value::Object(map) => map,
            _ => return Err(anyhow!("Solution did not serialize to a json object")),
        },
    };
    match output_file {
        Some(path) => {
            if compress {
                fs::write(&path, compress_obj(&output_data)?)?;
            } else {
                fs::write(&path, jsonify(&output_data)?)?;
            }
            println!("output_data written to: {:?}", path);
        }
        None => println!("{}", jsonify(&output_data)?),
    }
    Ok(())
}

pub fn verify_solution(input: String, solution_path: String) -> Result<()> {
    let challenge = load_challenge(&input)?;
    let solution = load_solution(&solution_path)?;
    let total_happiness = challenge
        .verify_solution(&solution)
        .map_err(|e| anyhow!("Invalid solution: {}", e))?;
    println!("Solution is valid");
    println!("Total Happiness: {}", total_happiness);
    Ok(())
}

pub fn generate_instance(
    settings: String,
    rand_hash: String,
    nonce: u64,
    output_file: Option<PathBuf>,
) -> Result<()> {
    let settings = dejsonify::<GenerateSettings>(&read_json_arg(&settings)?)
        .map_err(|e| anyhow!("Failed to parse settings: {}", e))?;
    let seed = settings.calc_seed(&rand_hash, nonce)?;
    let challenge = Challenge::generate_instance(
        &seed,
        &Difficulty {
            num_students: settings.num_students,
            stress_budget: settings.stress_budget,
        },
    )?;

    let text = challenge.to_input_string();
    match output_file {
        Some(path) => {
            fs::write(&path, text)?;
            println!("instance written to: {:?}", path);
        }
        None => print!("{}", text),
    }
    Ok(())
}

enum Contents {
    Json(Map<String, Value>),
    Text(String),
}

fn read_bytes(source: &str) -> Result<Vec<u8>> {
    if source == "-" {
        let mut buffer = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buffer)
            .map_err(|e| anyhow!("Failed to read from stdin: {}", e))?;
        Ok(buffer)
    } else {
        fs::read(source).map_err(|e| anyhow!("Failed to read file {}: {}", source, e))
    }
}

// Compressed json is recognised by content, anything else by extension.
fn read_contents(source: &str) -> Result<Contents> {
    let bytes = read_bytes(source)?;
    if let Ok(map) = decompress_obj::<Map<String, Value>>(&bytes) {
        return Ok(Contents::Json(map));
    }
    let text = String::from_utf8(bytes)
        .map_err(|e| anyhow!("{} is neither text nor compressed json: {}", source, e))?;
    if source.ends_with(".json") {
        dejsonify::<Map<String, Value>>(&text)
            .map(Contents::Json)
            .map_err(|e| anyhow!("Failed to parse {}: {}", source, e))
    } else {
        Ok(Contents::Text(text))
    }
}

// Inline json, or a path ending in .json
fn read_json_arg(arg: &str) -> Result<String> {
    if arg.ends_with(".json") {
        fs::read_to_string(arg).map_err(|e| anyhow!("Failed to read file {}: {}", arg, e))
    } else {
        Ok(arg.to_string())
    }
}

fn load_challenge(input: &str) -> Result<Challenge> {
    match read_contents(input)? {
        Contents::Json(map) => serde_json::from_value::<Challenge>(Value::Object(map))
            .map_err(|e| anyhow!("Failed to parse instance: {}", e)),
        Contents::Text(text) => Challenge::from_input_string(&text),
    }
}

fn load_hyperparameters(hyperparameters: &str) -> Result<Map<String, Value>> {
    dejsonify::<Map<String, Value>>(&read_json_arg(hyperparameters)?)
        .map_err(|e| anyhow!("Failed to parse hyperparameters: {}", e))
}

// Accepts a bare solution or the output_data written by compute_solution.
fn load_solution(solution: &str) -> Result<Solution> {
    let mut map = match read_contents(solution)? {
        Contents::Text(text) => return Solution::from_output_string(&text),
        Contents::Json(map) => map,
    };
    if let Some(Value::Object(inner)) = map.remove("solution") {
        map = inner;
    }
    Solution::try_from(map).map_err(|e| anyhow!("Invalid solution. Cannot convert to Solution: {}", e))
}
