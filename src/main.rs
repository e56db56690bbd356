use clap::{error::ErrorKind, Parser, ValueEnum};
use color_eyre::eyre::{Result, WrapErr};
use cube::{
    heap::GcConfig,
    interpreter::{context::StdioContext, InterpreterConfig, TreeWalkInterpreter},
    lexer::{
        formatter::{BasicFormatter, DebugFormatter, ToFormatter, TokenFormatter},
        Lexer, TokenKind,
    },
    parser::{
        formatter::{BasicParserFormatter, ParserFormatter, PrettyParserFormatter},
        Parser as SourceParser, Program,
    },
    value::formatter::{BasicFormatter as BasicValueFormatter, PrettyFormatter, ValueFormatter},
};
use std::{
    fs::read_to_string,
    io::{BufRead, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

const EXIT_USAGE: u8 = 64;
const EXIT_DATA: u8 = 65;
const EXIT_SOFTWARE: u8 = 70;

#[derive(Debug, Parser)]
#[clap(name = "cube", version, about = "Interpreter for the cube scripting language")]
pub struct CLArgs {
    /// Script to run. Starts an interactive session when omitted.
    pub path: Option<PathBuf>,
    /// Extra directory to search for imported modules. May be repeated.
    #[clap(long = "search-path", value_name = "DIR", env = "CUBE_PATH", value_delimiter = ':')]
    pub search_paths: Vec<PathBuf>,
    /// Young generation size that triggers a collection.
    #[clap(long)]
    pub young_threshold: Option<usize>,
    /// Old generation size that forces a full collection.
    #[clap(long)]
    pub old_threshold: Option<usize>,
    /// Minor collections an object survives before promotion.
    #[clap(long)]
    pub promotion_age: Option<u32>,
    /// Minor collections between two full collections.
    #[clap(long)]
    pub major_every: Option<u32>,
    #[clap(long = "format", value_enum, default_value = "basic")]
    pub format: ErrorFormat,
    /// Print the token stream instead of running the script.
    #[clap(long = "emit", value_enum, default_value = "run")]
    pub emit: Emit,
    /// Print heap statistics to stderr on exit.
    #[clap(long)]
    pub gc_stats: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ErrorFormat {
    Basic,
    Pretty,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Emit {
    Run,
    Tokens,
    TokensDebug,
}

impl CLArgs {
    fn gc_config(&self) -> GcConfig {
        let mut config = GcConfig::default();
        if let Some(threshold) = self.young_threshold {
            config = config.with_young_threshold(threshold);
        }
        if let Some(threshold) = self.old_threshold {
            config = config.with_old_threshold(threshold);
        }
        if let Some(age) = self.promotion_age {
            config = config.with_promotion_age(age);
        }
        if let Some(every) = self.major_every {
            config = config.with_major_every(every);
        }
        config
    }

    /// The script's own directory first, then the working directory, then configured paths.
    fn interpreter_config(&self) -> InterpreterConfig {
        let mut config = InterpreterConfig::default().with_gc(self.gc_config());
        if let Some(directory) = self.path.as_deref().and_then(Path::parent) {
            let directory = if directory.as_os_str().is_empty() {
                Path::new(".")
            } else {
                directory
            };
            config = config.with_search_path(directory);
        }
        if let Ok(cwd) = std::env::current_dir() {
            config = config.with_search_path(cwd);
        }
        for path in self.search_paths.iter() {
            config = config.with_search_path(path.clone());
        }
        config
    }
}

fn main() -> ExitCode {
    match cube_main() {
        Ok(code) => code,
        Err(report) => {
            eprintln!("{report:?}");
            ExitCode::from(EXIT_USAGE)
        }
    }
}

fn cube_main() -> Result<ExitCode> {
    color_eyre::install()?;
    init_tracing();

    let args = match CLArgs::try_parse() {
        Ok(args) => args,
        Err(error) => {
            let code = match error.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(EXIT_USAGE),
            };
            error.print()?;
            return Ok(code);
        }
    };

    let Some(path) = args.path.clone() else {
        return run_prompt(&args);
    };
    let src = read_to_string(&path).wrap_err_with(|| format!("Could not read {path:?}"))?;
    match args.emit {
        Emit::Run => Ok(run_file(&args, &path, &src)),
        Emit::Tokens | Emit::TokensDebug => Ok(tokenize(&src, args.emit)),
    }
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var("CUBE_LOG")
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_filter(filter))
        .init();
}

fn parse(args: &CLArgs, path: &Path, src: &str) -> Option<Program> {
    let mut parser = SourceParser::new(src);
    match parser.parse() {
        Ok(program) => Some(program),
        Err(errors) => {
            let formatter: Box<dyn ParserFormatter + '_> = match args.format {
                ErrorFormat::Basic => Box::new(BasicParserFormatter::new(src)),
                ErrorFormat::Pretty => Box::new(PrettyParserFormatter::new(src, path)),
            };
            for error in errors.iter() {
                eprintln!("{}", formatter.format_error(error));
            }
            None
        }
    }
}

fn run_file(args: &CLArgs, path: &Path, src: &str) -> ExitCode {
    let Some(program) = parse(args, path, src) else {
        return ExitCode::from(EXIT_DATA);
    };

    let mut interpreter = TreeWalkInterpreter::new(StdioContext, args.interpreter_config());
    let result = interpreter.run(&program);
    let code = match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let formatter: Box<dyn ValueFormatter + '_> = match args.format {
                ErrorFormat::Basic => Box::new(BasicValueFormatter::new(src)),
                ErrorFormat::Pretty => Box::new(PrettyFormatter::new(src, path)),
            };
            eprintln!("{}", formatter.format_error(&error));
            ExitCode::from(EXIT_SOFTWARE)
        }
    };

    let (_, stats) = interpreter.shutdown();
    if args.gc_stats {
        eprintln!("[gc] {stats}");
    }
    code
}

fn run_prompt(args: &CLArgs) -> Result<ExitCode> {
    let mut interpreter = TreeWalkInterpreter::new(StdioContext, args.interpreter_config());
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let path = Path::new("<stdin>");
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let Some(program) = parse(args, path, &line) else {
            continue;
        };
        if let Err(error) = interpreter.run(&program) {
            let formatter: Box<dyn ValueFormatter + '_> = match args.format {
                ErrorFormat::Basic => Box::new(BasicValueFormatter::new(&line)),
                ErrorFormat::Pretty => Box::new(PrettyFormatter::new(&line, path)),
            };
            eprintln!("{}", formatter.format_error(&error));
        }
    }

    let (_, stats) = interpreter.shutdown();
    if args.gc_stats {
        eprintln!("[gc] {stats}");
    }
    Ok(ExitCode::SUCCESS)
}

fn tokenize(src: &str, emit: Emit) -> ExitCode {
    let mut scanner = Lexer::new(src);
    let formatter: Box<dyn TokenFormatter + '_> = match emit {
        Emit::TokensDebug => Box::new(ToFormatter::<DebugFormatter>::create_formatter(&scanner)),
        _ => Box::new(ToFormatter::<BasicFormatter>::create_formatter(&scanner)),
    };
    let mut succeeded = true;
    loop {
        match scanner.next_token() {
            Ok(token) => {
                println!("{}", formatter.format(&token));
                if matches!(token.kind, TokenKind::Eof) {
                    break;
                }
            }
            Err(error) => {
                eprintln!("{}", formatter.format_lexical_error(&error));
                succeeded = false;
            }
        }
    }
    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_DATA)
    }
}
