//! Renderer: customer context → HTML through handlebars templates.
//!
//! `content` is the fragment written into the content panel, `page` is the
//! full host page with its three panels. `{{value}}` expansions are
//! HTML-escaped by handlebars.

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::RenderError;
use crate::types::{CustomerContext, RiskScore, SupportTicket};
use crate::view::{ViewState, WidgetPage};

const CONTENT_TEMPLATE: &str = include_str!("../templates/content.hbs");
const PAGE_TEMPLATE: &str = include_str!("../templates/page.hbs");

#[derive(Serialize)]
struct ContentView<'a> {
    account_value: String,
    risk_score: String,
    risk_color: Option<&'static str>,
    support_tier: &'a str,
    last_contact: Option<&'a str>,
    tickets: &'a [SupportTicket],
    account_info: Vec<InfoItem>,
}

#[derive(Serialize)]
struct InfoItem {
    label: String,
    value: String,
}

#[derive(Serialize)]
struct PageView<'a> {
    title: &'a str,
    panels: Vec<PanelView<'a>>,
}

#[derive(Serialize)]
struct PanelView<'a> {
    id: &'static str,
    class: Option<&'static str>,
    visible: bool,
    inner_html: &'a str,
}

pub struct Renderer {
    handlebars: Handlebars<'static>,
}

impl Renderer {
    pub fn new() -> Result<Self, RenderError> {
        let mut handlebars = Handlebars::new();

        // Register helpers
        handlebars.register_helper("lowercase", Box::new(lowercase_helper));

        handlebars
            .register_template_string("content", CONTENT_TEMPLATE)
            .map_err(|e| RenderError::Template(e.to_string()))?;
        handlebars
            .register_template_string("page", PAGE_TEMPLATE)
            .map_err(|e| RenderError::Template(e.to_string()))?;

        Ok(Self { handlebars })
    }

    /// Write the rendered context into the content panel and show it. On
    /// failure the page is left untouched.
    pub fn render(&self, context: &CustomerContext, page: &mut WidgetPage) -> Result<(), RenderError> {
        let html = self.render_context(context)?;
        page.set_content_html(html);
        page.set_view(ViewState::Content);
        Ok(())
    }

    /// Content panel markup for `context`.
    pub fn render_context(&self, context: &CustomerContext) -> Result<String, RenderError> {
        let summary = &context.summary;
        let account_info = context
            .account_info
            .iter()
            .flatten()
            .map(|(key, value)| InfoItem {
                label: key.replace('_', " "),
                value: match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                },
            })
            .collect();

        let view = ContentView {
            account_value: format_account_value(summary.account_value),
            risk_score: summary.risk_score.to_string(),
            risk_color: risk_color(&summary.risk_score),
            support_tier: &summary.support_tier,
            last_contact: summary.last_contact.as_deref(),
            tickets: &context.recent_tickets,
            account_info,
        };

        self.render_template("content", &view)
    }

    /// Full host page, hidden panels carrying `display: none`.
    pub fn render_page(&self, page: &WidgetPage, title: &str) -> Result<String, RenderError> {
        let panels = [
            (ViewState::Loading, Some("loading")),
            (ViewState::Content, None),
            (ViewState::Error, Some("error")),
        ]
        .into_iter()
        .map(|(state, class)| {
            let panel = page.panel(state);
            PanelView {
                id: state.panel_id(),
                class,
                visible: panel.visible,
                inner_html: &panel.inner_html,
            }
        })
        .collect();

        self.render_template("page", &PageView { title, panels })
    }

    fn render_template<T: Serialize>(&self, name: &str, data: &T) -> Result<String, RenderError> {
        self.handlebars
            .render(name, data)
            .map_err(|e| RenderError::Render(e.to_string()))
    }
}

fn risk_color(risk: &RiskScore) -> Option<&'static str> {
    match risk.as_label()?.to_lowercase().as_str() {
        "low" => Some("#28a745"),
        "medium" => Some("#ffc107"),
        "high" => Some("#dc3545"),
        _ => None,
    }
}

// Handlebars helpers

/// Lowercases its argument. Helper output bypasses handlebars escaping, so
/// the result is escaped here.
fn lowercase_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    let param = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
    out.write(&handlebars::html_escape(&param.to_lowercase()))?;
    Ok(())
}

/// `$` followed by the en-US rendering of `value`: comma thousands
/// separators, at most three fraction digits rounded half-up from the
/// shortest decimal representation, trailing zeros dropped.
pub fn format_account_value(value: f64) -> String {
    if !value.is_finite() {
        return format!("${value}");
    }

    let shortest = format!("{}", value.abs());
    let (int_part, frac_part) = round_fraction(&shortest, 3);
    let is_zero = int_part.bytes().all(|b| b == b'0') && frac_part.is_empty();

    let mut out = String::with_capacity(int_part.len() + frac_part.len() + 8);
    out.push('$');
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&group_thousands(&int_part));
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(&frac_part);
    }
    out
}

/// Round a plain decimal string to `places` fraction digits, half-up.
/// Returns the integer digits and the fraction digits without trailing zeros.
fn round_fraction(decimal: &str, places: usize) -> (String, String) {
    let (int_part, frac_part) = decimal.split_once('.').unwrap_or((decimal, ""));
    if frac_part.len() <= places {
        return (
            int_part.to_string(),
            frac_part.trim_end_matches('0').to_string(),
        );
    }

    let round_up = frac_part.as_bytes()[places] >= b'5';
    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part[..places].bytes())
        .collect();

    if round_up {
        let mut carry = true;
        for d in digits.iter_mut().rev() {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
    }

    let split = digits.len() - places;
    let int_digits = String::from_utf8_lossy(&digits[..split]).into_owned();
    let frac_digits = String::from_utf8_lossy(&digits[split..])
        .trim_end_matches('0')
        .to_string();
    (int_digits, frac_digits)
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
