use anyhow::Context;
use clap::Parser;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use media_diary::catalog::{Catalog, TmdbClient};
use media_diary::cli::{Cli, Commands, EditArgs};
use media_diary::config::Config;
use media_diary::error::DiaryError;
use media_diary::store::{group_by_watched_date, DiaryEntry, DiaryStore, JsonStore, NewEntry};
use media_diary::{backfill, import};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load().context("failed to load config")?;

    match cli.command {
        Commands::Search { query, page } => {
            let client = TmdbClient::from_config(&config)?;
            let results = client
                .search(&query, page)
                .await
                .with_context(|| format!("search for \"{}\" failed", query))?;

            if results.is_empty() {
                println!("No results for \"{}\"", query);
            }
            for candidate in &results {
                println!(
                    "{:<6} {} ({}) #{}",
                    candidate.kind.as_str(),
                    candidate.title,
                    year_label(candidate.year),
                    candidate.external_id
                );
                if let Some(poster) = &candidate.poster {
                    println!("       {}", poster);
                }
            }
        }

        Commands::Show { kind, id } => {
            let client = TmdbClient::from_config(&config)?;
            let detail = client
                .fetch_detail(kind, id)
                .await
                .with_context(|| format!("failed to fetch {} #{}", kind.as_str(), id))?;

            println!("{} ({})", detail.title, year_label(detail.year));
            if let Some(status) = &detail.status {
                println!("  Status:  {}", status);
            }
            if !detail.genres.is_empty() {
                println!("  Genres:  {}", detail.genres.join(", "));
            }
            if !detail.studios.is_empty() {
                println!("  Studios: {}", detail.studios.join(", "));
            }
            if let Some(runtime) = detail.runtime {
                println!("  Runtime: {} min", runtime);
            }
            if let Some(rating) = detail.rating {
                println!("  Rating:  {:.1}", rating);
            }
            if let Some(poster) = &detail.poster {
                println!("  Poster:  {}", poster);
            }
            if let Some(overview) = &detail.overview {
                println!("\n{}", overview);
            }
            if !detail.cast.is_empty() {
                println!("\nCast:");
                for person in &detail.cast {
                    let name = person.name.as_deref().unwrap_or("?");
                    match &person.character {
                        Some(character) if !character.is_empty() => {
                            println!("  {} as {}", name, character)
                        }
                        _ => println!("  {}", name),
                    }
                }
            }
        }

        Commands::Add {
            kind,
            title,
            external_id,
            poster,
            date,
            rating,
            review,
        } => {
            let mut store = open_store(&config)?;
            let entry = store.create(NewEntry {
                external_id,
                kind,
                title,
                poster_url: poster,
                date_watched: date,
                rating,
                review: review.filter(|r| !r.trim().is_empty()),
            })?;
            store.commit()?;
            println!("✔ Added #{} {}", entry.id, entry.title);
        }

        Commands::List { json } => {
            let store = open_store(&config)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&store.list())?);
            } else if store.is_empty() {
                println!("The diary is empty");
            } else {
                for (date, entries) in group_by_watched_date(store.list()) {
                    match date {
                        Some(date) => println!("{}", date.format("%Y-%m-%d")),
                        None => println!("Undated"),
                    }
                    for entry in &entries {
                        println!("  {}", entry_line(entry));
                    }
                }
            }
        }

        Commands::Edit {
            id,
            title,
            date,
            clear_date,
            rating,
            clear_rating,
            review,
        } => {
            let patch = EditArgs {
                title,
                date,
                clear_date,
                rating,
                clear_rating,
                review,
            }
            .into_patch();

            if patch.is_empty() {
                println!("Nothing to change");
                return Ok(());
            }

            let mut store = open_store(&config)?;
            let entry = store.update(id, patch).map_err(DiaryError::from)?;
            store.commit()?;
            println!("✔ Updated {}", entry_line(&entry));
        }

        Commands::Delete { id } => {
            let mut store = open_store(&config)?;
            let entry = store.delete(id).map_err(DiaryError::from)?;
            store.commit()?;
            println!("✔ Deleted #{} {}", entry.id, entry.title);
        }

        Commands::Import { file } => {
            let client = TmdbClient::from_config(&config)?;
            let mut store = open_store(&config)?;
            println!("Importing {}", file.display());

            let progress = progress_bar();
            let report = import::import_file(&file, &client, &mut store, &progress)
                .await
                .with_context(|| format!("import of {} failed", file.display()))?;

            println!("✔ {}", report);
            println!(
                "  {} lookups, {} cache hits, {} lookup failures",
                report.lookups, report.cache_hits, report.lookup_failures
            );
        }

        Commands::Backfill => {
            let client = TmdbClient::from_config(&config)?;
            let mut store = open_store(&config)?;

            let progress = progress_bar();
            let report = backfill::backfill_posters(
                &client,
                &mut store,
                config.missing_report_limit,
                &progress,
            )
            .await
            .context("poster backfill failed")?;

            println!("✔ {}", report);
            if report.missing_total() > 0 {
                println!("No poster found for:");
                for title in &report.missing {
                    println!("  - {}", title);
                }
                if report.missing_overflow > 0 {
                    println!("  ... and {} more", report.missing_overflow);
                }
            }
        }

        Commands::Reset { yes } => {
            let mut store = open_store(&config)?;
            if store.is_empty() {
                println!("The diary is already empty");
                return Ok(());
            }

            let confirmed = yes
                || Confirm::new()
                    .with_prompt(format!("Delete all {} diary entries?", store.len()))
                    .default(false)
                    .interact()?;
            if !confirmed {
                println!("Cancelled");
                return Ok(());
            }

            let removed = store.clear();
            store.commit()?;
            println!("✔ Removed {} entries", removed);
        }

        Commands::Config {
            set_bearer,
            set_api_key,
            show,
        } => {
            let mut config = config;

            if let Some(token) = set_bearer {
                if token.trim().is_empty() {
                    return Err(DiaryError::InvalidInput("bearer token is empty".into()).into());
                }
                config.set_bearer(token)?;
                println!("✔ Bearer token saved");
            }

            if let Some(key) = set_api_key {
                if key.trim().is_empty() {
                    return Err(DiaryError::InvalidInput("API key is empty".into()).into());
                }
                config.set_api_key(key)?;
                println!("✔ API key saved");
            }

            if show {
                println!("Settings ({}):", Config::config_path()?.display());
                println!("  Language:     {}", config.language);
                println!("  Timeout:      {}s", config.timeout_seconds);
                println!("  Data file:    {}", config.data_file()?.display());
                println!("  Bearer token: {}", set_or_not(config.tmdb_bearer.is_some()));
                println!("  API key:      {}", set_or_not(config.tmdb_api_key.is_some()));
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "media_diary=debug,media_diary_common=debug"
    } else {
        "media_diary=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_store(config: &Config) -> anyhow::Result<JsonStore> {
    let path = config.data_file()?;
    JsonStore::open(path.clone())
        .with_context(|| format!("failed to open diary {}", path.display()))
}

fn progress_bar() -> ProgressBar {
    let progress = ProgressBar::new(0);
    let template = "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}";
    if let Ok(style) = ProgressStyle::with_template(template) {
        progress.set_style(style.progress_chars("=> "));
    }
    progress
}

fn set_or_not(present: bool) -> &'static str {
    if present {
        "set"
    } else {
        "not set"
    }
}

fn year_label(year: Option<i32>) -> String {
    year.map_or_else(|| "----".to_string(), |y| y.to_string())
}

fn entry_line(entry: &DiaryEntry) -> String {
    let mut line = format!("#{} {} [{}]", entry.id, entry.title, entry.kind.as_str());
    if let Some(rating) = entry.rating {
        line.push_str(&format!(" {}/10", rating));
    }
    if !entry.has_poster() {
        line.push_str(" (no poster)");
    }
    line
}
