use axum::{
    extract::{ConnectInfo, Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Router,
};
use serde::Deserialize;

use iconseek_core::{FavoritesStore, IconRecord};
use iconseek_search::SearchSession;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/search", get(search))
        .route("/favorites", get(favorites))
}

#[derive(Deserialize)]
pub struct SearchParams {
    q: Option<String>,
}

async fn index() -> Html<String> {
    Html(layout(
        "Icon Search",
        &format!(
            r#"<section class="hero">
    <h1>Find the right icon</h1>
    {}
</section>"#,
            search_form("")
        ),
    ))
}

/// GET /search?q=<query> - Results page. A blank query renders the empty form
/// without contacting the upstream API.
async fn search(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<std::net::SocketAddr>,
    Query(params): Query<SearchParams>,
) -> (StatusCode, Html<String>) {
    let q = params.q.unwrap_or_default();
    let mut session = SearchSession::new();

    let mut status = StatusCode::OK;
    let mut limited = None;
    if !q.trim().is_empty() {
        match state.search_limiter.admit(addr.ip()) {
            Ok(()) => {
                session.run(&*state.upstream, &q).await;
            }
            Err(e) => {
                status = StatusCode::TOO_MANY_REQUESTS;
                limited = Some(e.to_string());
            }
        }
    }

    let favorites = state.favorites.lock().await;
    let body = render_results(&session, limited.as_deref(), &favorites);
    (
        status,
        Html(layout("Search results", &format!("{}\n{}", search_form(&q), body))),
    )
}

/// GET /favorites - Saved icons in the order they were added.
async fn favorites(State(state): State<AppState>) -> Html<String> {
    let favorites = state.favorites.lock().await;

    let content = if favorites.is_empty() {
        r#"<p class="empty">No favorites yet. Search for icons and save the ones you like.</p>"#
            .to_string()
    } else {
        let cards: String = favorites
            .records()
            .iter()
            .zip(favorites.ids())
            .map(|(icon, id)| {
                format!(
                    r#"<li class="icon-card">
    {}
    <span class="icon-name">{}</span>
    <form method="post" action="/favorites/remove">
        <input type="hidden" name="id" value="{}">
        <button type="submit">Remove</button>
    </form>
</li>"#,
                    preview(icon),
                    escape_html(icon.display_name()),
                    escape_html(id.as_str())
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        format!(r#"<ul class="icon-grid">{cards}</ul>"#)
    };

    Html(layout(
        "Favorites",
        &format!(
            "<h1>Favorites ({})</h1>\n{}",
            favorites.count(),
            content
        ),
    ))
}

fn render_results(
    session: &SearchSession,
    limited: Option<&str>,
    favorites: &FavoritesStore,
) -> String {
    if let Some(message) = limited.or(session.error()) {
        return format!(r#"<p class="error">{}</p>"#, escape_html(message));
    }
    if session.query().is_empty() {
        return String::new();
    }
    if session.results().is_empty() {
        return format!(
            r#"<p class="empty">No icons found for "{}".</p>"#,
            escape_html(session.query())
        );
    }

    let return_to = format!(
        "/search?q={}",
        url::form_urlencoded::byte_serialize(session.query().as_bytes()).collect::<String>()
    );

    let cards: String = session
        .results()
        .iter()
        .enumerate()
        .map(|(i, icon)| {
            let saved = favorites.is_favorite(icon, Some(i));
            let icon_json = serde_json::to_string(icon).unwrap_or_default();
            format!(
                r#"<li class="icon-card">
    {}
    <span class="icon-name">{}</span>
    <form method="post" action="/favorites/toggle">
        <input type="hidden" name="icon" value="{}">
        <input type="hidden" name="index" value="{}">
        <input type="hidden" name="return_to" value="{}">
        <button type="submit" data-saved="{}">{}</button>
    </form>
</li>"#,
                preview(icon),
                escape_html(icon.display_name()),
                escape_html(&icon_json),
                i,
                escape_html(&return_to),
                saved,
                if saved { "Remove from favorites" } else { "Add to favorites" }
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<p class="summary">{} results for "{}"</p>
<ul class="icon-grid">{}</ul>"#,
        session.results().len(),
        escape_html(session.query()),
        cards
    )
}

fn preview(icon: &IconRecord) -> String {
    match icon.preview_url() {
        Some(url) => format!(
            r#"<img src="{}" alt="{}" width="64" height="64" loading="lazy">"#,
            escape_html(url),
            escape_html(icon.display_name())
        ),
        None => r#"<div class="no-preview">?</div>"#.to_string(),
    }
}

fn search_form(q: &str) -> String {
    format!(
        r#"<form method="get" action="/search" class="search-form">
    <input type="search" name="q" value="{}" placeholder="Search icons" autofocus>
    <button type="submit">Search</button>
</form>"#,
        escape_html(q)
    )
}

fn layout(title: &str, content: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - Iconseek</title>
</head>
<body>
    <nav>
        <a href="/">Home</a>
        <a href="/favorites">Favorites</a>
    </nav>
    <main>
{content}
    </main>
</body>
</html>"##
    )
}

/// Minimal escaping for text and attribute values.
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
