//! DOM parsing for the listing and settings pages.
//!
//! Pure functions over an HTML snapshot; no I/O.

use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};

use crate::models::UserRecord;
use crate::utils::{collapse_whitespace, strip_label};

/// Where user data lives in the site's markup.
///
/// Every selector is CSS. Defaults match the current site; any of them can be
/// overridden when the markup moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLayout {
    /// One repeated container per user on the listing page
    pub card: String,
    pub card_name: String,
    pub card_email: String,
    pub card_id: String,
    /// Literal text preceding the id inside its element
    pub id_label: String,
    /// Candidate forms on the settings page; the first with four inputs wins
    pub settings_form: String,
    /// Inputs of that form, in order: id, first name, last name, email
    pub settings_inputs: String,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            card: "div.bg-white.rounded-lg.shadow".to_string(),
            card_name: "h3".to_string(),
            card_email: "p.text-gray-600".to_string(),
            card_id: "p.text-sm.text-gray-500".to_string(),
            id_label: "ID:".to_string(),
            settings_form: "form".to_string(),
            settings_inputs: "input".to_string(),
        }
    }
}

/// Positions of the settings form inputs
const SETTINGS_ID: usize = 0;
const SETTINGS_FIRST_NAME: usize = 1;
const SETTINGS_LAST_NAME: usize = 2;
const SETTINGS_EMAIL: usize = 3;

/// A `PageLayout` with every selector parsed
#[derive(Debug, Clone)]
pub struct Selectors {
    card: Selector,
    card_name: Selector,
    card_email: Selector,
    card_id: Selector,
    id_label: String,
    settings_form: Selector,
    settings_inputs: Selector,
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {:?}: {:?}", css, e))
}

impl Selectors {
    pub fn compile(layout: &PageLayout) -> Result<Self> {
        Ok(Self {
            card: parse_selector(&layout.card)?,
            card_name: parse_selector(&layout.card_name)?,
            card_email: parse_selector(&layout.card_email)?,
            card_id: parse_selector(&layout.card_id)?,
            id_label: layout.id_label.clone(),
            settings_form: parse_selector(&layout.settings_form)?,
            settings_inputs: parse_selector(&layout.settings_inputs)?,
        })
    }
}

/// Text of the first match inside `scope`, whitespace-collapsed; empty if none
fn first_text(scope: &ElementRef<'_>, selector: &Selector) -> String {
    scope
        .select(selector)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .unwrap_or_default()
}

/// One record per card. Missing sub-elements leave the field empty.
pub fn parse_user_cards(html: &str, selectors: &Selectors) -> Vec<UserRecord> {
    let document = Html::parse_document(html);
    document
        .select(&selectors.card)
        .map(|card| {
            let id = first_text(&card, &selectors.card_id);
            UserRecord::new(
                strip_label(&id, &selectors.id_label),
                first_text(&card, &selectors.card_name),
                first_text(&card, &selectors.card_email),
            )
        })
        .collect()
}

/// Number of positional inputs the settings form carries
const SETTINGS_INPUT_COUNT: usize = 4;

/// The signed-in user from the settings form, or `None` if the page has no
/// form with all four positional inputs.
///
/// Smaller forms matching the same selector (a logout button with a CSRF
/// field, a search box) are skipped.
pub fn parse_settings_form(html: &str, selectors: &Selectors) -> Option<UserRecord> {
    let document = Html::parse_document(html);

    let values: Vec<&str> = document
        .select(&selectors.settings_form)
        .map(|form| {
            form.select(&selectors.settings_inputs)
                .map(|input| input.value().attr("value").unwrap_or_default())
                .collect::<Vec<_>>()
        })
        .find(|values| values.len() >= SETTINGS_INPUT_COUNT)?;

    Some(UserRecord::from_name_parts(
        values[SETTINGS_ID],
        values[SETTINGS_FIRST_NAME],
        values[SETTINGS_LAST_NAME],
        values[SETTINGS_EMAIL],
    ))
}
