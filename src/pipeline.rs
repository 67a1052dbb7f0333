use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::extract::Extractor;
use crate::filter::FilterWindow;
use crate::models::Post;
use crate::plot::{price_room_pairs, render_joint_density};
use crate::scrapers::{GroupParams, GroupSource};
use crate::store::PostStore;

/// Which parts of the pipeline a run executes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modes {
    pub scrape: bool,
    pub display: bool,
    pub plot: bool,
}

#[derive(Debug, Default)]
pub struct ScrapeSummary {
    pub fetched: usize,
    pub saved: usize,
    /// Posts printed while scraping, in scrape order
    pub shown: Vec<Post>,
}

/// The rooms line shows the count found in the text, not the stored value
pub fn write_post(out: &mut impl Write, post: &Post, text_rooms: Option<u32>) -> io::Result<()> {
    writeln!(out, "\n-----------Post----------\n")?;
    match post.price {
        Some(price) => writeln!(out, "\n PRICE: {price}\n")?,
        None => writeln!(out, "\n PRICE: None\n")?,
    }
    if let Some(rooms) = text_rooms {
        writeln!(out, "\n number_of_rooms: {rooms}\n")?;
    }
    writeln!(out, "{}", post.text)
}

/// Runs scrape, display and plot against one store
pub struct Driver<'a> {
    store: &'a PostStore,
    extractor: &'a Extractor,
    window: FilterWindow,
}

impl<'a> Driver<'a> {
    pub fn new(store: &'a PostStore, extractor: &'a Extractor, window: FilterWindow) -> Self {
        Self {
            store,
            extractor,
            window,
        }
    }

    fn print_if_passes(&self, post: &Post, out: &mut impl Write) -> Result<bool> {
        if !self.window.passes(post) {
            return Ok(false);
        }
        let text_rooms = self.extractor.extract_rooms(&post.text);
        write_post(out, post, text_rooms).context("Failed to print post")?;
        Ok(true)
    }

    /// Print stored posts that pass the filters, in load order.
    /// Extraction runs in memory only; the store is not touched.
    pub fn display_stored<W: Write>(&self, out: &mut W) -> Result<Vec<Post>> {
        let mut shown = Vec::new();
        for mut post in self.store.load_all()? {
            self.extractor.append_details(&mut post);
            if self.print_if_passes(&post, out)? {
                shown.push(post);
            }
        }
        info!("Displayed {} stored posts", shown.len());
        Ok(shown)
    }

    /// Render the density of stored posts having both price and rooms.
    /// Returns how many posts were plotted.
    pub fn plot_stored(&self, path: &Path) -> Result<usize> {
        let points = price_room_pairs(&self.store.load_all()?);
        if points.len() < 2 {
            warn!(
                "Only {} posts with price and rooms, skipping plot",
                points.len()
            );
            return Ok(0);
        }
        render_joint_density(&points, path)?;
        Ok(points.len())
    }

    /// Fetch every configured group page by page, extracting and saving each post
    /// before the next one is looked at. With `display`, passing posts are printed
    /// as they are saved.
    pub async fn scrape<W: Write>(
        &self,
        source: &dyn GroupSource,
        params: &GroupParams,
        display: bool,
        out: &mut W,
    ) -> Result<ScrapeSummary> {
        let mut summary = ScrapeSummary::default();

        for group in &params.groups {
            info!(
                group = %group.id,
                group_name = group.name.as_deref().unwrap_or(""),
                pages = params.pages,
                source = source.source_name(),
                "Scraping group"
            );

            let mut cursor: Option<String> = None;
            for page_no in 1..=params.pages {
                let page = source
                    .fetch_page(group, cursor.as_deref())
                    .await
                    .with_context(|| {
                        format!("Failed to fetch page {page_no} of group {}", group.id)
                    })?;
                debug!(
                    group = %group.id,
                    page = page_no,
                    posts = page.posts.len(),
                    "Fetched page"
                );

                for raw in page.posts {
                    summary.fetched += 1;
                    let mut post = Post::from_raw(raw);
                    self.extractor.append_details(&mut post);
                    self.store.save(&post)?;
                    summary.saved += 1;
                    debug!(
                        post_id = %post.post_id,
                        price = ?post.price,
                        rooms = ?post.rooms,
                        "Saved post"
                    );

                    if display && self.print_if_passes(&post, out)? {
                        summary.shown.push(post);
                    }
                }

                match page.next_page {
                    Some(next) => cursor = Some(next),
                    None => break,
                }
            }
        }

        info!(
            fetched = summary.fetched,
            saved = summary.saved,
            shown = summary.shown.len(),
            "Scrape finished"
        );
        Ok(summary)
    }

    /// Execute the modes in order: stored display (only without scrape), plot, scrape.
    /// `make_source` is called only when scraping. Returns the posts printed.
    pub async fn run<W, F>(
        &self,
        modes: Modes,
        params: &GroupParams,
        plot_path: &Path,
        make_source: F,
        out: &mut W,
    ) -> Result<Vec<Post>>
    where
        W: Write,
        F: FnOnce() -> Result<Box<dyn GroupSource>>,
    {
        let mut shown = Vec::new();

        if modes.display && !modes.scrape {
            shown.extend(self.display_stored(out)?);
        }

        if modes.plot {
            self.plot_stored(plot_path)?;
        }

        if modes.scrape {
            let source = make_source()?;
            let summary = self
                .scrape(source.as_ref(), params, modes.display, out)
                .await?;
            shown.extend(summary.shown);
        }

        Ok(shown)
    }
}
