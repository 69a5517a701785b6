// ABOUTME: Static product catalog and URL classification for the workspace shell.
// ABOUTME: Maps URLs to their owning product and decides in-workspace vs external.

use regex::{Regex, RegexBuilder};
use url::Url;

pub const DEFAULT_ENTRY_URL: &str = "https://id.atlassian.com/login";

/// Hostname suffixes that keep a URL inside the app regardless of whether a
/// specific product pattern matches (the login host matches no product).
const WORKSPACE_DOMAIN_SUFFIXES: &[&str] = &[
    "atlassian.net",
    "atlassian.com",
    "bitbucket.org",
    "trello.com",
];

/// Provider domain family used for the default-product fallback.
const PROVIDER_DOMAIN_SUFFIXES: &[&str] = &["atlassian.net", "atlassian.com"];

/// One workspace product surface with its matching rules and window defaults.
///
/// Example:
/// ```rust,ignore
/// let product = catalog.product_by_id("jira").unwrap();
/// assert_eq!(product.default_size, (1200, 900));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: &'static str,
    pub name: &'static str,
    pub patterns: &'static [&'static str],
    pub default_size: (u32, u32),
    pub background_color: &'static str,
}

/// Catalog declaration order is the tie-break: the first matching pattern
/// wins, not the most specific one.
const PRODUCTS: &[Product] = &[
    Product {
        id: "jira",
        name: "Jira",
        patterns: &["*.atlassian.net/jira", "*.atlassian.net/secure"],
        default_size: (1200, 900),
        background_color: "#0052CC",
    },
    Product {
        id: "confluence",
        name: "Confluence",
        patterns: &["*.atlassian.net/wiki"],
        default_size: (1200, 900),
        background_color: "#172B4D",
    },
    Product {
        id: "bitbucket",
        name: "Bitbucket",
        patterns: &["bitbucket.org", "*.atlassian.net/bitbucket"],
        default_size: (1400, 1000),
        background_color: "#0052CC",
    },
    Product {
        id: "trello",
        name: "Trello",
        patterns: &["trello.com"],
        default_size: (1300, 900),
        background_color: "#026AA7",
    },
    Product {
        id: "teams",
        name: "Atlassian Teams",
        patterns: &["*.atlassian.net/people", "teams.atlassian.com"],
        default_size: (1100, 800),
        background_color: "#172B4D",
    },
    Product {
        id: "studio",
        name: "Atlassian Studio",
        patterns: &["*.atlassian.net/studio", "studio.atlassian.com"],
        default_size: (1400, 1000),
        background_color: "#172B4D",
    },
];

/// Descriptor attached to workspace links whose product cannot be identified.
const GENERIC_PRODUCT: Product = Product {
    id: "atlassian",
    name: "Atlassian",
    patterns: &[],
    default_size: (1200, 900),
    background_color: "#172B4D",
};

/// Immutable product table with precompiled match patterns.
///
/// Example:
/// ```rust,ignore
/// let catalog = ProductCatalog::new();
/// let product = catalog.identify_product("https://acme.atlassian.net/wiki/home");
/// ```
pub struct ProductCatalog {
    compiled: Vec<(Regex, &'static Product)>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        let mut compiled = Vec::new();
        for product in PRODUCTS {
            for pattern in product.patterns {
                compiled.push((glob_pattern(pattern), product));
            }
        }
        Self { compiled }
    }

    /// Resolves the product owning a URL, or `None` for URLs outside the
    /// workspace. Unparsable input is never an error, just `None`.
    pub fn identify_product(&self, url: &str) -> Option<&'static Product> {
        let parsed = Url::parse(url).ok()?;
        let host = parsed.host_str().unwrap_or("").to_lowercase();
        let full = format!("{}{}", host, parsed.path().to_lowercase());

        for (regex, product) in &self.compiled {
            if regex.is_match(&full) {
                return Some(product);
            }
        }

        // Provider-family hosts with no product match still belong to the
        // workspace and get the default product.
        if PROVIDER_DOMAIN_SUFFIXES
            .iter()
            .any(|suffix| host_matches_suffix(&host, suffix))
        {
            return Some(self.default_product());
        }

        None
    }

    pub fn product_by_id(&self, id: &str) -> Option<&'static Product> {
        PRODUCTS.iter().find(|product| product.id == id)
    }

    pub fn default_product(&self) -> &'static Product {
        &PRODUCTS[0]
    }

    pub fn generic_product(&self) -> &'static Product {
        &GENERIC_PRODUCT
    }

    pub fn products(&self) -> impl Iterator<Item = &'static Product> {
        PRODUCTS.iter()
    }
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// True if the URL should stay inside the app's window set: its hostname is
/// on the workspace suffix allow-list, or it is prefix-equal to the current
/// entry URL. Malformed URLs are not in the workspace.
pub fn is_in_workspace(url: &str, entry_url: &str) -> bool {
    if !entry_url.is_empty() && url.starts_with(entry_url) {
        return true;
    }
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.to_lowercase();
    WORKSPACE_DOMAIN_SUFFIXES
        .iter()
        .any(|suffix| host_matches_suffix(&host, suffix))
}

fn host_matches_suffix(host: &str, suffix: &str) -> bool {
    host == suffix || host.ends_with(&format!(".{}", suffix))
}

fn glob_pattern(pattern: &str) -> Regex {
    let escaped = regex::escape(pattern).replace("\\*", ".*");
    RegexBuilder::new(&escaped)
        .case_insensitive(true)
        .build()
        .expect("catalog pattern must compile")
}

/// Parses a `#RRGGBB` color into its channels, for window background colors.
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}
