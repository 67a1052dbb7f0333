use std::path::PathBuf;

use clap::Parser;

use crate::extract::{ExtractRules, DEFAULT_PRICE_PATTERN, DEFAULT_ROOMS_WORD};
use crate::filter::FilterWindow;
use crate::pipeline::Modes;
use crate::plot::DEFAULT_PLOT_PATH;
use crate::scrapers::types::DEFAULT_PAGES;
use crate::scrapers::{Credentials, Group, GroupParams};
use crate::store::DEFAULT_DB_PATH;

/// Scrape rental listings from social-network groups, filter them by budget and size,
/// and plot price against room count
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Opts {
    /// Fetch new posts from the groups and store them
    #[arg(long)]
    pub scrape: bool,

    /// Print posts that pass the filters
    #[arg(long)]
    pub display: bool,

    /// Render a price/rooms density plot of stored posts
    #[arg(long)]
    pub plot: bool,

    #[arg(long = "minimum_price", default_value_t = 5000)]
    pub minimum_price: i64,

    #[arg(long = "maximum_price", default_value_t = 6000)]
    pub maximum_price: i64,

    #[arg(long = "minimum_rooms", default_value_t = 3, allow_negative_numbers = true)]
    pub minimum_rooms: i64,

    #[arg(long = "maximum_rooms", default_value_t = 3, allow_negative_numbers = true)]
    pub maximum_rooms: i64,

    /// SQLite file holding the posts table
    #[arg(long, default_value = DEFAULT_DB_PATH)]
    pub database: PathBuf,

    /// Where the density plot is written (SVG)
    #[arg(long, default_value = DEFAULT_PLOT_PATH)]
    pub plot_output: PathBuf,

    /// Group id to scrape; repeat for several. Defaults to the built-in rental groups
    #[arg(long = "group")]
    pub groups: Vec<String>,

    /// Pages fetched per group
    #[arg(long, default_value_t = DEFAULT_PAGES)]
    pub pages: u32,

    /// Scrape through headless Chrome instead of plain HTTP
    #[arg(long)]
    pub browser: bool,

    /// Save every page fetched by the browser here
    #[arg(long, requires = "browser")]
    pub debug_dir: Option<PathBuf>,

    /// Word following the room count in post text
    #[arg(long, default_value = DEFAULT_ROOMS_WORD)]
    pub rooms_word: String,

    /// Regex whose first group captures the price
    #[arg(long, default_value = DEFAULT_PRICE_PATTERN)]
    pub price_pattern: String,

    /// Write the printed posts to this file as JSON
    #[arg(long)]
    pub export: Option<PathBuf>,

    #[arg(long, env = "FB_USERNAME", hide_env_values = true)]
    pub username: Option<String>,

    #[arg(long, env = "FB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl Opts {
    pub fn modes(&self) -> Modes {
        Modes {
            scrape: self.scrape,
            display: self.display,
            plot: self.plot,
        }
    }

    pub fn filter_window(&self) -> FilterWindow {
        FilterWindow {
            min_price: self.minimum_price,
            max_price: self.maximum_price,
            min_rooms: self.minimum_rooms,
            max_rooms: self.maximum_rooms,
        }
    }

    pub fn extract_rules(&self) -> ExtractRules {
        ExtractRules {
            price_pattern: self.price_pattern.clone(),
            rooms_word: self.rooms_word.clone(),
        }
    }

    /// Credentials only when both parts are set
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) if !username.is_empty() => Some(Credentials {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }

    pub fn group_params(&self) -> GroupParams {
        let groups = if self.groups.is_empty() {
            Group::defaults()
        } else {
            self.groups.iter().map(Group::new).collect()
        };
        GroupParams {
            groups,
            pages: self.pages,
            credentials: self.credentials(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Opts {
        Opts::try_parse_from(std::iter::once("rental-scout").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let opts = parse(&[]);
        assert_eq!(opts.modes(), Modes::default());
        assert_eq!(opts.filter_window(), FilterWindow::default());
        assert_eq!(opts.extract_rules(), ExtractRules::default());
        assert_eq!(opts.database, PathBuf::from("posts.db"));

        let params = opts.group_params();
        assert_eq!(params.groups, Group::defaults());
        assert_eq!(params.pages, 10);
    }

    #[test]
    fn underscore_flags() {
        let opts = parse(&[
            "--scrape",
            "--display",
            "--plot",
            "--minimum_price",
            "4000",
            "--maximum_price",
            "7000",
            "--minimum_rooms",
            "2",
            "--maximum_rooms",
            "4",
        ]);
        assert_eq!(
            opts.modes(),
            Modes {
                scrape: true,
                display: true,
                plot: true
            }
        );
        assert_eq!(
            opts.filter_window(),
            FilterWindow {
                min_price: 4000,
                max_price: 7000,
                min_rooms: 2,
                max_rooms: 4,
            }
        );
    }

    #[test]
    fn negative_room_bounds_parse() {
        let opts = parse(&["--minimum_rooms=-1", "--maximum_rooms", "2"]);
        assert_eq!(opts.filter_window().min_rooms, -1);
        assert_eq!(opts.filter_window().max_rooms, 2);

        let opts = parse(&["--minimum_rooms", "-3", "--maximum_rooms", "-1"]);
        assert_eq!(opts.filter_window().min_rooms, -3);
        assert_eq!(opts.filter_window().max_rooms, -1);
    }

    #[test]
    fn groups_override_defaults() {
        let opts = parse(&["--group", "1", "--group", "2", "--pages", "3"]);
        let params = opts.group_params();
        assert_eq!(params.groups, vec![Group::new("1"), Group::new("2")]);
        assert_eq!(params.pages, 3);
    }

    #[test]
    fn credentials_need_both_parts() {
        let opts = parse(&["--username", "me@example.com"]);
        assert!(opts.credentials().is_none());

        let opts = parse(&["--username", "me@example.com", "--password", "secret"]);
        let credentials = opts.credentials().unwrap();
        assert_eq!(credentials.username, "me@example.com");
        assert_eq!(credentials.password, "secret");
    }

    #[test]
    fn debug_dir_requires_browser() {
        let result = Opts::try_parse_from(["rental-scout", "--debug-dir", "debug"]);
        assert!(result.is_err());
    }
}
