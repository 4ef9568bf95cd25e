//! `formkeep` - CLI for the formkeep signup form engine
//!
//! This binary edits the saved draft, submits it, and manages saved images
//! using the same stores a front end would.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;

use formkeep::cli::{
    Cli, Command, ConfigCommand, DraftCommand, ImagesCommand, ResetCommand, SubmissionsCommand,
};
use formkeep::form::{COUNTRIES, HOBBIES};
use formkeep::storage::local::LocalFileStore;
use formkeep::storage::sqlite::SqliteKeyValueStore;
use formkeep::storage::StoreKeys;
use formkeep::{
    init_logging, CapturedImage, Config, DraftForm, ErrorMap, Field, FieldValue, FormController,
    FormDataStore, ImageStore, Notifier, SubmitOutcome, Validator,
};

/// Stores opened from the configuration.
struct App {
    config: Config,
    forms: FormDataStore<SqliteKeyValueStore>,
    images: ImageStore<LocalFileStore>,
}

impl App {
    fn open(config: Config) -> anyhow::Result<Self> {
        let db_path = config.database_path();
        let kv = SqliteKeyValueStore::open(&db_path)
            .with_context(|| format!("opening database {}", db_path.display()))?;
        let forms = FormDataStore::new(kv, StoreKeys::from(&config.storage));
        let images = ImageStore::new(LocalFileStore::new(), config.image_dir());
        Ok(Self {
            config,
            forms,
            images,
        })
    }

    fn controller(self) -> FormController<SqliteKeyValueStore> {
        FormController::new(
            self.forms,
            Validator::new(self.config.validation.clone()),
            Notifier::new(self.config.notification_duration()),
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Config(cmd) => handle_config(&config, cmd),
        command => {
            let app = App::open(config)?;
            match command {
                Command::Status(cmd) => handle_status(&app, cmd.json).await,
                Command::Draft(cmd) => handle_draft(app, cmd).await,
                Command::Submit => handle_submit(app).await,
                Command::Submissions(cmd) => handle_submissions(&app, cmd).await,
                Command::Images(cmd) => handle_images(&app, cmd).await,
                Command::Reset(cmd) => handle_reset(&app, &cmd).await,
                Command::Config(_) => Ok(()),
            }
        }
    }
}

async fn handle_status(app: &App, json: bool) -> anyhow::Result<()> {
    let stats = app.forms.get_stats().await;
    let image_count = app.images.list_saved_images().await.len();
    let image_bytes = app.images.total_storage_size().await;

    if json {
        let status = serde_json::json!({
            "hasDraft": stats.has_draft,
            "submittedCount": stats.submitted_count,
            "lastSubmittedAt": stats.last_submitted_at,
            "imageCount": image_count,
            "imageBytes": image_bytes,
            "databasePath": app.config.database_path(),
            "imageDir": app.images.directory(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("formkeep status");
        println!("---------------");
        println!("Draft saved:    {}", if stats.has_draft { "yes" } else { "no" });
        println!("Submissions:    {}", stats.submitted_count);
        if let Some(at) = stats.last_submitted_at {
            println!("Last submitted: {}", at.to_rfc3339());
        }
        println!("Images:         {image_count} ({image_bytes} bytes)");
        println!("Database:       {}", app.config.database_path().display());
        println!("Image dir:      {}", app.images.directory().display());
    }
    Ok(())
}

async fn handle_draft(app: App, cmd: DraftCommand) -> anyhow::Result<()> {
    match cmd {
        DraftCommand::Show { json } => match app.forms.get_draft().await {
            Some(draft) if json => println!("{}", serde_json::to_string_pretty(&draft)?),
            Some(draft) => print_draft(&draft),
            None => println!("No saved draft."),
        },
        DraftCommand::Set { field, value } => {
            let field: Field = field.parse()?;
            let value = FieldValue::parse(field, &value)?;

            let mut controller = app.controller();
            controller.load_draft().await;
            controller.update(field, value)?;
            controller.save_draft().await?;
            println!("Set {field}.");
        }
        DraftCommand::Validate => {
            let draft = app.forms.get_draft().await.unwrap_or_default();
            let errors = Validator::new(app.config.validation.clone()).validate(&draft);
            if errors.is_empty() {
                println!("Draft is valid.");
            } else {
                print_errors(&errors);
            }
        }
        DraftCommand::Clear => {
            app.forms.clear_draft().await?;
            println!("Draft cleared.");
        }
    }
    Ok(())
}

async fn handle_submit(app: App) -> anyhow::Result<()> {
    let mut controller = app.controller();
    if !controller.load_draft().await {
        println!("No saved draft to submit.");
        return Ok(());
    }

    let outcome = controller.submit().await;
    if let Some(toast) = controller.notifier().last() {
        println!("{}", toast.message);
    }

    match outcome? {
        SubmitOutcome::Submitted(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        SubmitOutcome::Rejected(errors) => {
            print_errors(&errors);
            bail!("{} field(s) failed validation", errors.len())
        }
        SubmitOutcome::AlreadySubmitted => Ok(()),
    }
}

async fn handle_submissions(app: &App, cmd: SubmissionsCommand) -> anyhow::Result<()> {
    match cmd {
        SubmissionsCommand::List { json } => {
            let forms = app.forms.get_submitted_forms().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&forms)?);
            } else if forms.is_empty() {
                println!("No submitted forms.");
            } else {
                for (i, form) in forms.iter().enumerate() {
                    println!(
                        "{:>3}  {}  {} <{}>",
                        i + 1,
                        form.submitted_at.to_rfc3339(),
                        form.full_name,
                        form.email
                    );
                }
            }
        }
    }
    Ok(())
}

async fn handle_images(app: &App, cmd: ImagesCommand) -> anyhow::Result<()> {
    match cmd {
        ImagesCommand::Save { files } => {
            let captures = files
                .iter()
                .map(CapturedImage::from_path)
                .collect::<formkeep::Result<Vec<_>>>()?;
            let saved = app.images.save_images(&captures).await?;
            for image in saved {
                println!("{}", image.uri.display());
            }
        }
        ImagesCommand::List => {
            for path in app.images.list_saved_images().await {
                println!("{}", path.display());
            }
        }
        ImagesCommand::Delete { file } => {
            let path = resolve_image_path(app.images.directory(), &file);
            app.images.delete_image(&path).await;
            println!("Deleted {}.", path.display());
        }
        ImagesCommand::Clear => {
            let removed = app.images.clear_all_images().await;
            println!("Removed {removed} image(s).");
        }
        ImagesCommand::Size => {
            println!("{}", app.images.total_storage_size().await);
        }
    }
    Ok(())
}

async fn handle_reset(app: &App, cmd: &ResetCommand) -> anyhow::Result<()> {
    if !cmd.yes {
        println!("This deletes the draft, every submission and every saved image.");
        println!("Use --yes to confirm.");
        return Ok(());
    }
    app.forms.clear_all().await?;
    let removed = app.images.clear_all_images().await;
    println!("Cleared form data and {removed} image(s).");
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Image directory:    {}", config.image_dir().display());
                println!("  Draft key:          {}", config.storage.draft_key);
                println!("  Submitted key:      {}", config.storage.submitted_key);
                println!();
                println!("[Validation]");
                println!("  Min name length:    {}", config.validation.min_name_length);
                println!(
                    "  Min password length: {}",
                    config.validation.min_password_length
                );
                println!("  Min bio length:     {}", config.validation.min_bio_length);
                println!("  Min age (years):    {}", config.validation.min_age_years);
                println!();
                println!("[Notifications]");
                println!("  Display (ms):       {}", config.notifications.display_ms);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

/// Bare file names refer to the image directory.
fn resolve_image_path(dir: &Path, file: &Path) -> PathBuf {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => file.to_path_buf(),
        _ => dir.join(file),
    }
}

fn print_draft(draft: &DraftForm) {
    let country = COUNTRIES
        .iter()
        .find(|(code, _)| *code == draft.country)
        .map_or(draft.country.as_str(), |(_, label)| *label);
    let masked = |s: &str| if s.is_empty() { String::new() } else { "*".repeat(8) };

    println!("{:<17} {}", "Full name:", draft.full_name);
    println!("{:<17} {}", "Email:", draft.email);
    println!("{:<17} {}", "Password:", masked(&draft.password));
    println!("{:<17} {}", "Confirm password:", masked(&draft.confirm_password));
    println!("{:<17} {}", "Bio:", draft.bio);
    println!("{:<17} {country}", "Country:");
    println!("{:<17} {}", "Gender:", draft.gender);
    println!("{:<17} {}", "Accept terms:", draft.accept_terms);
    println!(
        "{:<17} {} (choices: {})",
        "Hobbies:",
        draft.hobbies.join(", "),
        HOBBIES.join(", ")
    );
    println!(
        "{:<17} {}",
        "Date of birth:",
        draft
            .date_of_birth
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    );
}

fn print_errors(errors: &ErrorMap) {
    for (field, error) in errors.iter() {
        println!("  {:<16} {}", field.label(), error.message);
    }
}
