use crate::models::RawPost;

/// Pages fetched per group when nothing else is asked for
pub const DEFAULT_PAGES: u32 = 10;

/// A social-network group publishing rental listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: String,
    pub name: Option<String>,
}

impl Group {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    fn named(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: Some(name.to_string()),
        }
    }

    /// Rental groups for Ramat Gan and Givatayim
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::named("253957624766723", "דירות להשכרה ברמת גן"),
            Self::named("115046608513246", "דירות מפה לאוזן בגבעתיים"),
            Self::named("246902125410185", "דירות להשכרה ברמת גן / גבעתיים"),
        ]
    }
}

/// Login passed through to sources that can use it
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// What to scrape and how far back to go
#[derive(Debug, Clone)]
pub struct GroupParams {
    pub groups: Vec<Group>,
    /// Maximum pages fetched per group
    pub pages: u32,
    pub credentials: Option<Credentials>,
}

impl Default for GroupParams {
    fn default() -> Self {
        Self {
            groups: Group::defaults(),
            pages: DEFAULT_PAGES,
            credentials: None,
        }
    }
}

/// One page of a group feed
#[derive(Debug, Clone, Default)]
pub struct GroupPage {
    pub posts: Vec<RawPost>,
    /// Absolute URL of the following page, if the feed goes on
    pub next_page: Option<String>,
}
