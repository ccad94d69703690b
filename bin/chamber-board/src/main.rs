//! # Chamber-Board Binary
//!
//! The entry point that assembles the application from settings and
//! compile-time features.

use actix_files::Files;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use cb_api::middleware::{cors_policy, json_config, security_headers, standard_middleware};
use cb_api::{configure_routes, AppState};
use cb_auth_token::TokenAuthProvider;
use cb_config::Settings;
use cb_core::models::{Event, Job};
use cb_core::traits::Mailer;
use cb_core::RetentionPolicy;
use cb_storage_local::LocalMediaStore;
use cb_store_json::{JsonFileStore, JsonlSubmissionLog};

#[cfg(feature = "mail-smtp")]
use cb_mail_smtp::SmtpMailer;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let settings = Settings::load().context("loading settings")?;

    // 1. Listings and submission logs
    let jobs = JsonFileStore::<Job>::new(settings.jobs_file())
        .with_retention(RetentionPolicy::from_days(settings.job_retention_days));
    let events = JsonFileStore::<Event>::new(settings.events_file());
    let submissions = JsonlSubmissionLog::new(&settings.applications_dir);

    // 2. Uploads
    let store = LocalMediaStore::new(&settings.uploads_dir);

    // 3. Admin gate
    let auth = TokenAuthProvider::new(settings.admin_token.clone());
    if !auth.is_configured() {
        log::warn!("ADMIN_TOKEN is not set; every create, update and delete will be refused");
    }

    // 4. Outgoing mail
    let mailer = build_mailer(&settings)?;

    let state = web::Data::new(AppState {
        jobs: Box::new(jobs),
        events: Box::new(events),
        submissions: Box::new(submissions),
        store: Box::new(store),
        auth: Box::new(auth),
        mailer,
        max_upload_bytes: settings.max_upload_bytes,
    });

    let static_dir = settings.static_dir.clone();
    let allowed_origin = settings.allowed_origin.clone();
    log::info!(
        "chamber-board listening on http://{}:{} (site root {})",
        settings.host,
        settings.port,
        static_dir.display()
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(json_config())
            .wrap(cors_policy(allowed_origin.as_deref()))
            .wrap(security_headers())
            .wrap(standard_middleware())
            .configure(configure_routes)
            .service(Files::new("/", &static_dir).index_file("index.html"))
    })
    .bind((settings.host.as_str(), settings.port))
    .with_context(|| format!("binding {}:{}", settings.host, settings.port))?
    .run()
    .await?;

    Ok(())
}

#[cfg(feature = "mail-smtp")]
fn build_mailer(settings: &Settings) -> anyhow::Result<Option<Box<dyn Mailer>>> {
    let Some(smtp) = &settings.smtp else {
        log::warn!("SMTP is not configured; submissions are only saved locally");
        return Ok(None);
    };
    let mailer = SmtpMailer::new(&smtp.host, smtp.port, &smtp.user, &smtp.password, &smtp.from)
        .context("configuring SMTP")?;
    log::info!("mail notifications via {}:{} as {}", smtp.host, smtp.port, smtp.from);
    Ok(Some(Box::new(mailer)))
}

#[cfg(not(feature = "mail-smtp"))]
fn build_mailer(_settings: &Settings) -> anyhow::Result<Option<Box<dyn Mailer>>> {
    log::info!("built without mail-smtp; submissions are only saved locally");
    Ok(None)
}
