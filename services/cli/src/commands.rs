use crate::cli::{PreviewArgs, QuizArgs};
use crate::render::{self, Palette};
use crate::terminal;
use civic_sense::access::{AccountSession, IdentityProvider, InMemoryIdentityProvider};
use civic_sense::config::AppConfig;
use civic_sense::error::AppError;
use civic_sense::quiz::presenter::displayed_ids;
use civic_sense::quiz::{
    ranking_defect, results_view, DetailExpander, HttpQuizGateway, ManifestoId, QuizController,
    ResultsPayload,
};
use std::fs;
use std::io::{self, Write};
use tracing::{info, warn};

pub(crate) async fn run_quiz(config: &AppConfig, args: QuizArgs) -> Result<(), AppError> {
    let QuizArgs {
        account,
        password,
        json,
        ..
    } = args;

    let provider = InMemoryIdentityProvider::new();
    provider.subscribe(Box::new(|session: Option<&AccountSession>| match session {
        Some(session) => info!(account = %session.account_id, "identity session started"),
        None => info!("identity session ended"),
    }));

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout().lock();

    let session = terminal::sign_in(&provider, &account, password, &mut input, &mut out)?;
    writeln!(out, "Signed in as {}", session.email)?;

    let gateway = HttpQuizGateway::new(&config.api);
    info!(environment = ?config.environment, api = %gateway.base_url(), "starting quiz");
    let mut controller = QuizController::start(gateway).await;
    terminal::drive(&mut controller, &mut input, &mut out, Palette::detect()).await?;

    if json {
        serde_json::to_writer_pretty(&mut out, &controller.view())?;
        writeln!(out)?;
    }

    provider.sign_out();
    Ok(())
}

pub(crate) fn run_preview(args: PreviewArgs) -> Result<(), AppError> {
    let PreviewArgs {
        payload,
        expand,
        json,
    } = args;

    let raw = fs::read_to_string(&payload)?;
    let payload: ResultsPayload = serde_json::from_str(&raw)?;
    if let Some(defect) = ranking_defect(&payload.alignment_results) {
        warn!(%defect, "saved results are out of order");
    }

    let mut expander = DetailExpander::new();
    if let Some(id) = expand.map(ManifestoId::from) {
        if displayed_ids(&payload.alignment_results).any(|shown| *shown == id) {
            expander.toggle(&id);
        } else {
            warn!(manifesto = %id, "requested breakdown is not among the top matches");
        }
    }

    let view = results_view(&payload, &expander);
    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &view)?;
        writeln!(out)?;
    } else {
        render::results(&mut out, Palette::detect(), &view)?;
    }
    Ok(())
}

pub(crate) async fn run_catalog(config: &AppConfig) -> Result<(), AppError> {
    let gateway = HttpQuizGateway::new(&config.api);
    let manifestos = gateway.manifestos().await?;
    info!(count = manifestos.len(), "manifesto catalog loaded");

    let mut out = io::stdout().lock();
    render::catalog(&mut out, Palette::detect(), &manifestos)?;
    Ok(())
}

pub(crate) async fn run_health(config: &AppConfig) -> Result<(), AppError> {
    let gateway = HttpQuizGateway::new(&config.api);
    let report = gateway.health().await?;

    let mut out = io::stdout().lock();
    render::health(&mut out, Palette::detect(), &report)?;
    Ok(())
}
