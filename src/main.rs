use clap::{App, Arg, ArgMatches};
use std::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};
use tagcloud::build::{build, render};
use tagcloud::config::Config;
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();

    let matches = App::new("tagcloud")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Renders a template with a weighted tag cloud of a blog's posts")
        .arg(
            Arg::with_name("project")
                .short("p")
                .long("project")
                .value_name("DIR")
                .takes_value(true)
                .help("Directory to search (along with its parents) for tagcloud.yaml"),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .value_name("FILE")
                .takes_value(true)
                .help("Write the rendered page here instead of the configured output"),
        )
        .arg(
            Arg::with_name("stdout")
                .long("stdout")
                .conflicts_with("output")
                .help("Print the rendered page instead of writing it to a file"),
        )
        .get_matches();

    if let Err(err) = run(&matches) {
        eprintln!("Error: {}", err);
        let mut source = err.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = cause.source();
        }
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let project = matches.value_of("project").map_or_else(
        || std::env::current_dir(),
        |dir| Ok(PathBuf::from(dir)),
    )?;
    let mut config = Config::from_directory(Path::new(&project))?;
    if let Some(output) = matches.value_of("output") {
        config.output = PathBuf::from(output);
    }

    if matches.is_present("stdout") {
        let output = render(&config)?;
        std::io::stdout().write_all(output.as_bytes())?;
    } else {
        build(&config)?;
    }
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
