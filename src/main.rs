use std::{fs, path::PathBuf};

use actix_web::{middleware::Logger, App, HttpServer};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info, trace};

use codeforge::{
    client::HttpCompiler,
    compile,
    config::Config,
    lang::{Lang, SUPPORTED_LANGUAGES},
    session::Session,
    terminal::LineKind,
    theme::{FileThemeStore, ThemeContext, THEMES},
};

#[derive(Parser)]
#[command(name = "codeforge", version, about = "Online code compiler with a mock compile API")]
struct Opts {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve {
        /// Config file path
        #[arg(short, long, default_value = "/etc/codeforge/config.yaml")]
        config: PathBuf,
    },
    /// Send one program to a running server and print its output
    Run {
        /// Language id, see `codeforge languages`
        #[arg(short, long)]
        language: String,
        /// Source file, defaults to the language's sample program
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Text passed to the program as stdin
        #[arg(short, long)]
        input: Option<String>,
        /// Base url of the server
        #[arg(short, long, default_value = "http://127.0.0.1:8080")]
        server: String,
    },
    /// List supported languages
    Languages,
    /// List themes, optionally selecting one
    Themes {
        /// Theme id to apply and remember
        #[arg(long)]
        select: Option<String>,
    },
}

#[actix_web::main]
async fn main() -> Result<()> {
    env_logger::init();
    let options = Opts::parse();

    match options.command {
        Command::Serve { config } => serve(config).await,
        Command::Run {
            language,
            file,
            input,
            server,
        } => run(&language, file, input, &server).await,
        Command::Languages => {
            for lang in Lang::ALL {
                println!("{:<12} {:<12} .{}", lang.id(), lang.name(), lang.extension());
            }
            Ok(())
        }
        Command::Themes { select } => themes(select),
    }
}

async fn serve(config_path: PathBuf) -> Result<()> {
    info!("starting up ...");

    debug!("loading config file at {}", config_path.display());
    let config = Config::load_or_default(&config_path)?;
    trace!("config loaded successfully with content: {:#?}", config);

    let host = config.api.host.clone();
    let port = config.api.port;
    let compile_config = config.compile;

    info!("Starting server on {}:{}", host, port);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(compile::configure(compile_config.clone()))
    })
    .bind((host, port))?
    .run()
    .await?;
    Ok(())
}

async fn run(
    language: &str,
    file: Option<PathBuf>,
    input: Option<String>,
    server: &str,
) -> Result<()> {
    let compiler = HttpCompiler::new(server)?;
    let mut session = Session::new(compiler, FileThemeStore::default());
    if !session.change_language(language) {
        bail!(
            "unsupported language {}, expected one of: {}",
            language,
            SUPPORTED_LANGUAGES.join(", ")
        );
    }
    if let Some(path) = file {
        let code = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        session.set_code(code);
    }
    if let Some(input) = input {
        session.input_mut().set(input);
    }

    session.run().await;

    println!("$ program execution [{}]", session.status().label());
    for line in session.output().lines() {
        println!("{}{}{}", line.kind.ansi(), line.text, LineKind::Plain.ansi());
    }
    Ok(())
}

fn themes(select: Option<String>) -> Result<()> {
    let mut context = ThemeContext::load(FileThemeStore::default());
    if let Some(id) = select {
        let theme = context.select(&id)?;
        info!(
            "theme {} saved to {}",
            theme.id,
            context.store().path().display()
        );
    }

    for theme in THEMES.iter() {
        let marker = if theme.id == context.current().id { "*" } else { " " };
        println!("{} {:<16} {}", marker, theme.id, theme.name);
    }
    Ok(())
}
