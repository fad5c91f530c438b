//! Home, about and mailing-list pages.

use std::sync::Arc;

use axum::{
  Form,
  extract::{Query, State},
  response::{Html, Redirect},
};
use gamedex_api::AppState;
use gamedex_core::{Error as CoreError, console::Console, game::Game, store::Backend};
use serde::Deserialize;
use tracing::{error, info};

use crate::{error::Result, html};

/// `GET /`
pub async fn home<S: Backend>(State(state): State<Arc<AppState<S>>>) -> Result<Html<String>> {
  let games = state.catalog.count::<Game>().await?;
  let consoles = state.catalog.count::<Console>().await?;

  let body = format!(
    "<p>A catalog of video games and the consoles they run on.</p>\n\
     <ul>\n\
     <li><a href=\"/games\">{games} game(s)</a></li>\n\
     <li><a href=\"/consoles\">{consoles} console(s)</a></li>\n\
     </ul>\n"
  );
  Ok(html::layout("Gamedex", &body))
}

#[derive(Debug, Deserialize)]
pub struct AboutParams {
  pub subscription_message: Option<String>,
}

/// `GET /about`
pub async fn about(Query(params): Query<AboutParams>) -> Html<String> {
  let body = format!(
    "<p>Gamedex keeps sales figures for games and production runs for consoles. \
     Deleted entries are archived, never lost.</p>\n\
     <p><a href=\"/about_me\">Who runs Gamedex?</a></p>\n\
     <h2>Newsletter</h2>\n\
     {notice}\
     <form method=\"post\" action=\"/subscribe\">\n\
     <label>Email <input type=\"email\" name=\"email\"></label>\n\
     <button type=\"submit\">Subscribe</button>\n\
     </form>\n",
    notice = html::notice("notice", params.subscription_message.as_deref()),
  );
  html::layout("About", &body)
}

/// `GET /about_me`. A static page about who runs the catalog.
pub async fn about_me() -> Html<String> {
  html::layout(
    "About me",
    "<p>I collect sales figures for games and consoles and keep them here in \
     one searchable place.</p>\n\
     <p>Found a wrong number? Edit the entry, or subscribe on the \
     <a href=\"/about\">about page</a> to hear when the catalog changes.</p>\n",
  )
}

#[derive(Debug, Deserialize)]
pub struct SubscribeForm {
  #[serde(default)]
  pub email: String,
}

/// `POST /subscribe`. Always lands back on the about page with a message.
pub async fn subscribe<S: Backend>(
  State(state): State<Arc<AppState<S>>>,
  Form(form): Form<SubscribeForm>,
) -> Redirect {
  let email = form.email.trim();
  let message = match state.subscribers.subscribe(email).await {
    Ok(_) => format!("Thanks for subscribing, {email}!"),
    Err(CoreError::Conflict(_)) => format!("{email} is already subscribed."),
    Err(CoreError::Validation(_)) => "Please enter a valid email address.".to_owned(),
    Err(e) => {
      error!("subscription failed: {e}");
      "Subscription failed, please try again later.".to_owned()
    }
  };
  info!(%message, "subscribe form handled");
  Redirect::to(&format!("/about?subscription_message={}", html::query_value(&message)))
}

/// `GET /subscribers`
pub async fn subscribers<S: Backend>(State(state): State<Arc<AppState<S>>>) -> Result<Html<String>> {
  let all = state.subscribers.list().await?;
  let rows = all
    .iter()
    .map(|s| (vec![s.id.to_string(), s.email.clone(), s.subscribed_at.to_rfc3339()], String::new()));
  Ok(html::layout("Subscribers", &html::table(&["id", "email", "subscribed_at"], rows)))
}
