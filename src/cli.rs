use crate::store::EntryPatch;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use media_diary_common::MediaKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "diary")]
#[command(about = "Movie and series watch diary with TMDb posters", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search TMDb for movies and series
    Search {
        /// Title to search for
        #[arg(required = true)]
        query: String,

        /// Result page
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// Show catalog details for a movie or series
    Show {
        /// movie or series
        kind: MediaKind,

        /// TMDb id
        id: u64,
    },

    /// Log a watch
    Add {
        /// movie or series
        #[arg(short, long, default_value = "movie")]
        kind: MediaKind,

        #[arg(short, long)]
        title: String,

        /// TMDb id
        #[arg(long)]
        external_id: Option<String>,

        /// Poster URL
        #[arg(long)]
        poster: Option<String>,

        /// Watched date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Rating 1-10
        #[arg(short, long, value_parser = clap::value_parser!(i32).range(1..=10))]
        rating: Option<i32>,

        #[arg(long)]
        review: Option<String>,
    },

    /// List the diary grouped by watched date
    List {
        /// Print entries as JSON, newest first
        #[arg(long)]
        json: bool,
    },

    /// Edit an entry
    Edit {
        id: u64,

        /// New title (empty keeps the current one)
        #[arg(short, long)]
        title: Option<String>,

        /// Watched date (YYYY-MM-DD)
        #[arg(short, long, conflicts_with = "clear_date")]
        date: Option<NaiveDate>,

        #[arg(long)]
        clear_date: bool,

        /// Rating 1-10
        #[arg(
            short,
            long,
            value_parser = clap::value_parser!(i32).range(1..=10),
            conflicts_with = "clear_rating"
        )]
        rating: Option<i32>,

        #[arg(long)]
        clear_rating: bool,

        /// Review text (empty clears it)
        #[arg(long)]
        review: Option<String>,
    },

    /// Delete an entry
    Delete { id: u64 },

    /// Import a Letterboxd CSV export (diary.csv, watched.csv, ratings.csv)
    Import {
        #[arg(required = true)]
        file: PathBuf,
    },

    /// Find posters for entries that have none
    Backfill,

    /// Delete every diary entry
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show or edit settings
    Config {
        /// Set the TMDb v4 read access token
        #[arg(long)]
        set_bearer: Option<String>,

        /// Set the TMDb v3 API key
        #[arg(long)]
        set_api_key: Option<String>,

        /// Show settings
        #[arg(long)]
        show: bool,
    },
}

/// Changes requested by `diary edit`
#[derive(Debug, Clone, Default)]
pub struct EditArgs {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub clear_date: bool,
    pub rating: Option<i32>,
    pub clear_rating: bool,
    pub review: Option<String>,
}

impl EditArgs {
    pub fn into_patch(self) -> EntryPatch {
        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let date_watched = if self.clear_date {
            Some(None)
        } else {
            self.date.map(Some)
        };

        let rating = if self.clear_rating {
            Some(None)
        } else {
            self.rating.map(Some)
        };

        let review = self.review.map(|r| {
            let r = r.trim().to_string();
            if r.is_empty() {
                None
            } else {
                Some(r)
            }
        });

        EntryPatch {
            title,
            poster_url: None,
            date_watched,
            rating,
            review,
        }
    }
}
