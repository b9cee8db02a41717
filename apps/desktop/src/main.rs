use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    load_settings, normalize_base_url, read_upload, AuthMode, Backend, HttpBackend, Tab,
    ViewController,
};
use shared::claim::ClaimField;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod render;
mod shell;

use shell::{Action, AgentAction, FraudAction};

#[derive(Parser, Debug)]
#[command(about = "Terminal client for the E2ERA backend")]
struct Args {
    /// Backend base URL; overrides e2era.toml and the environment.
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long)]
    log_filter: Option<String>,
}

enum Flow {
    Render,
    Quiet,
    Quit,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings();
    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(log_filter) = args.log_filter {
        settings.log_filter = log_filter;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .with_writer(std::io::stderr)
        .init();

    let base_url = normalize_base_url(&settings.base_url)?;
    info!(%base_url, "starting terminal client");
    let backend = HttpBackend::new(base_url).context("failed to build backend http client")?;
    let mut controller = ViewController::new(backend);

    controller.start().await;
    println!("{}", render::render(controller.state()));
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let action = match shell::parse_line(&line) {
            Ok(Some(action)) => action,
            Ok(None) => continue,
            Err(message) => {
                println!("{}", message.trim_end());
                continue;
            }
        };

        match dispatch(&mut controller, action).await {
            Flow::Render => println!("\n{}", render::render(controller.state())),
            Flow::Quiet => {}
            Flow::Quit => break,
        }
    }

    info!("terminal client exiting");
    Ok(())
}

async fn dispatch(controller: &mut ViewController<HttpBackend>, action: Action) -> Flow {
    if action == Action::Health {
        match controller.backend().health().await {
            Ok(health) => println!(
                "{} is {}",
                health.app.as_deref().unwrap_or("backend"),
                health.status
            ),
            Err(err) => println!("health check failed: {err}"),
        }
        return Flow::Quiet;
    }

    let state = controller.state_mut();
    let command = match action {
        Action::Quit => return Flow::Quit,
        Action::Show => return Flow::Render,
        Action::Health => return Flow::Quiet,
        Action::Tab { name } => match Tab::from_id(&name.to_ascii_lowercase()) {
            Some(tab) => state.select_tab(tab),
            None => {
                println!("unknown tab '{name}' (overview, account, projects, fraud)");
                return Flow::Quiet;
            }
        },
        Action::Login { username, password } => {
            state.auth.mode = AuthMode::Login;
            state.auth.username = username;
            state.auth.password = password;
            state.submit_auth()
        }
        Action::Register {
            username,
            password,
            email,
        } => {
            state.auth.mode = AuthMode::Register;
            state.auth.username = username;
            state.auth.password = password;
            state.auth.email = email;
            state.submit_auth()
        }
        Action::Logout => state.logout(),
        Action::Projects => {
            state.tab = Tab::Projects;
            state.refresh_projects()
        }
        Action::Create { title, description } => {
            state.tab = Tab::Projects;
            state.projects.new_title = title;
            state.projects.new_description = description;
            state.submit_project()
        }
        Action::Open { id } => {
            state.tab = Tab::Projects;
            let project_id = shared::domain::ProjectId(id);
            let command = state.open_project(project_id);
            if command.is_none() {
                println!("no project #{id} in the list");
            }
            command
        }
        Action::Close => {
            state.close_project();
            None
        }
        Action::Refresh => state.refresh_selected_project(),
        Action::Upload { path } => {
            let Some(project_id) = state.projects.selected_id() else {
                println!("open a project before uploading");
                return Flow::Quiet;
            };
            match load_upload(&path).await {
                Some(upload) => state.upload_document(project_id, upload),
                None => return Flow::Quiet,
            }
        }
        Action::Note { words } => {
            state.projects.note_draft = words.join(" ");
            state.submit_note()
        }
        Action::Agent(AgentAction::Refresh) => state.refresh_agent(),
        Action::Agent(AgentAction::Run) => state.run_agent(),
        Action::Fraud(FraudAction::Set { field, value }) => {
            match ClaimField::from_name(&field) {
                Some(field) => state.fraud.form.set(field, value.join(" ")),
                None => {
                    let known: Vec<_> = ClaimField::ALL.iter().map(|f| f.name()).collect();
                    println!("unknown claim field '{field}'; one of: {}", known.join(", "));
                    return Flow::Quiet;
                }
            }
            None
        }
        Action::Fraud(FraudAction::Submit) => {
            state.tab = Tab::Fraud;
            state.submit_fraud()
        }
        Action::Fraud(FraudAction::Reset) => {
            state.reset_fraud();
            None
        }
        Action::Fraud(FraudAction::Model) => state.load_fraud_model(),
    };

    controller.run(command).await;
    Flow::Render
}

async fn load_upload(path: &Path) -> Option<shared::protocol::DocumentUpload> {
    match read_upload(path).await {
        Ok(upload) => Some(upload),
        Err(err) => {
            warn!(path = %path.display(), "could not read upload: {err:#}");
            println!("could not read {}: {err:#}", path.display());
            None
        }
    }
}
