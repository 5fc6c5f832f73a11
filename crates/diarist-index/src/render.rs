//! Post list rendering and template substitution.

use std::fmt::Write as _;
use std::sync::LazyLock;

use diarist_extract::PostMetadata;
use regex::{Captures, Regex};

use crate::config::SiteConfig;

/// Stands in for the posts block when there are no posts.
const NO_POSTS: &str = "    <!-- no posts -->";

/// Stands in for the recent links block when there are no posts.
const NO_RECENT_POSTS: &str = "          <!-- no recent posts -->";

/// A placeholder recognized in the index template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    PostsBlock,
    RecentLinks,
    SiteTitle,
    SiteDescription,
    SiteSub,
    SiteOwner,
}

impl Placeholder {
    /// Every placeholder, in substitution order.
    pub const ALL: [Placeholder; 6] = [
        Self::PostsBlock,
        Self::RecentLinks,
        Self::SiteTitle,
        Self::SiteDescription,
        Self::SiteSub,
        Self::SiteOwner,
    ];

    /// Literal token text as it appears in the template.
    pub fn token(self) -> &'static str {
        match self {
            Self::PostsBlock => "{{ posts_block }}",
            Self::RecentLinks => "{{ recent_links }}",
            Self::SiteTitle => "{{ site_title }}",
            Self::SiteDescription => "{{ site_description }}",
            Self::SiteSub => "{{ site_sub }}",
            Self::SiteOwner => "{{ site_owner }}",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.token() == token)
    }
}

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives: Vec<String> = Placeholder::ALL
        .iter()
        .map(|p| regex::escape(p.token()))
        .collect();
    Regex::new(&alternatives.join("|")).expect("Invalid placeholder regex")
});

/// Sort posts newest first by sort key.
///
/// The sort is stable and compares keys as plain strings, so non-ISO keys
/// order lexicographically rather than chronologically.
pub fn sort_posts(posts: &mut [PostMetadata]) {
    posts.sort_by(|a, b| b.sort_key.cmp(&a.sort_key));
}

/// Render the full index page from unsorted posts.
pub fn render_index(mut posts: Vec<PostMetadata>, template: &str, site: &SiteConfig) -> String {
    sort_posts(&mut posts);

    let posts_block = render_posts_block(&posts);
    let recent_links = render_recent_links(&posts);

    substitute(template, &posts_block, &recent_links, site)
}

/// The article list, one fragment per post.
pub fn render_posts_block(posts: &[PostMetadata]) -> String {
    if posts.is_empty() {
        return NO_POSTS.to_string();
    }
    posts
        .iter()
        .map(render_post)
        .collect::<Vec<_>>()
        .join("\n")
}

/// The recent posts navigation list.
pub fn render_recent_links(posts: &[PostMetadata]) -> String {
    if posts.is_empty() {
        return NO_RECENT_POSTS.to_string();
    }
    posts
        .iter()
        .map(render_recent_link)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_post(post: &PostMetadata) -> String {
    let mut out = String::new();
    let date = &post.date;
    let url = escape_html(&post.url);

    let _ = writeln!(out, r#"    <article class="post" data-date="{date}">"#);
    let _ = writeln!(out, r#"      <time class="post-date" datetime="{date}">{date}</time>"#);
    let _ = writeln!(
        out,
        r#"      <h2 class="post-title"><a href="{url}">{}</a></h2>"#,
        escape_html(&post.title)
    );
    let _ = writeln!(
        out,
        r#"      <div class="post-body"><p>{}</p></div>"#,
        escape_html(&post.excerpt)
    );
    out.push_str("    </article>\n");
    out
}

fn render_recent_link(post: &PostMetadata) -> String {
    format!(
        r#"          <li><a href="{}">{} — {}</a></li>"#,
        escape_html(&post.url),
        escape_html(&post.title),
        post.date
    )
}

/// Replace every placeholder token in `template` in a single pass.
///
/// Inserted text is never rescanned, so a post title that happens to contain
/// a token survives literally. Site strings are escaped here; the generated
/// blocks arrive already escaped.
pub fn substitute(template: &str, posts_block: &str, recent_links: &str, site: &SiteConfig) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| {
            match Placeholder::from_token(&caps[0]) {
                Some(Placeholder::PostsBlock) => posts_block.to_string(),
                Some(Placeholder::RecentLinks) => recent_links.to_string(),
                Some(Placeholder::SiteTitle) => escape_html(&site.title),
                Some(Placeholder::SiteDescription) => escape_html(&site.description),
                Some(Placeholder::SiteSub) => escape_html(&site.subtitle),
                Some(Placeholder::SiteOwner) => escape_html(&site.owner),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Escape HTML special characters, quotes included.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
