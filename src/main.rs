use clap::{value_parser, Arg, ArgAction, Command};
use std::fs;
use std::path::Path;
use uwsc::config::DEFAULT_MAX_CALL_DEPTH;
use uwsc::{logging, InterpreterConfig, Object};

fn main() {
    let matches = Command::new("uwsc")
        .about("An interpreter for a UWSC-style BASIC dialect")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("file")
                .help("The script file to execute")
                .value_name("FILE")
                .index(1),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .help("Start in interactive REPL mode")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("max-depth")
                .long("max-depth")
                .value_name("N")
                .help("Maximum nesting of user function calls [default: 200]")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log verbosity (-v, -vv, -vvv)")
                .action(ArgAction::Count),
        )
        .get_matches();

    let max_depth = matches
        .get_one::<usize>("max-depth")
        .copied()
        .unwrap_or(DEFAULT_MAX_CALL_DEPTH);
    let config = InterpreterConfig::default()
        .with_max_call_depth(max_depth)
        .with_verbosity(matches.get_count("verbose"));
    logging::init(&config.log_filter);

    match matches.get_one::<String>("file") {
        Some(file_path) => {
            let succeeded = run_file(file_path, &config);
            if matches.get_flag("interactive") {
                uwsc::start_repl(&config);
            }
            if !succeeded {
                std::process::exit(1);
            }
        }
        None => uwsc::start_repl(&config),
    }
}

fn run_file(path: &str, config: &InterpreterConfig) -> bool {
    let path = Path::new(path);

    if !path.exists() {
        eprintln!("Error: File '{}' not found", path.display());
        return false;
    }

    match fs::read_to_string(path) {
        Ok(source) => {
            let filename = path.display().to_string();
            match uwsc::run(&source, Some(&filename), config) {
                Some(Object::Null | Object::Empty) => true,
                Some(value) => {
                    println!("{}", value);
                    true
                }
                None => false,
            }
        }
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            false
        }
    }
}
