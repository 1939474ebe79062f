//! Server-side HTML for the wizard. One form per page; Back and Next post to different routes.

use folio_core::domain::industry::INDUSTRIES;
use folio_core::domain::persona::RiskLevel;
use folio_core::domain::profile::HoldingPeriod;
use folio_core::wizard::{ResultsView, Step, Wizard};
use std::fmt::Write;

/// Message shown above the step controls.
#[derive(Debug, Clone, PartialEq)]
pub enum Flash {
    Error(String),
    Info(String),
}

pub fn page(wizard: &Wizard, flash: Option<&Flash>) -> String {
    let step = wizard.step();
    let mut body = String::new();

    let _ = write!(
        body,
        "<progress value=\"{}\" max=\"{}\"></progress><p class=\"step\">Step {} of {}</p>",
        step.index() + 1,
        Step::ALL.len(),
        step.index() + 1,
        Step::ALL.len()
    );

    match flash {
        Some(Flash::Error(msg)) => {
            let _ = write!(body, "<p class=\"error\" role=\"alert\">{}</p>", escape(msg));
        }
        Some(Flash::Info(msg)) => {
            let _ = write!(body, "<p class=\"info\">{}</p>", escape(msg));
        }
        None => {}
    }

    body.push_str("<form method=\"post\" action=\"/next\">");
    match step {
        Step::Persona => persona_step(wizard, &mut body),
        Step::Scenario => scenario_step(wizard, &mut body),
        Step::Risk => risk_step(wizard, &mut body),
        Step::Holding => holding_step(wizard, &mut body),
        Step::Industries => industries_step(wizard, &mut body),
        Step::Review => review_step(wizard, &mut body),
        Step::Results => match wizard.results() {
            Some(view) => results_step(view, &mut body),
            None if wizard.is_generating() => body.push_str(
                "<p class=\"notice\">Your recommendations are being prepared. Refresh in a moment.</p>",
            ),
            None => body.push_str("<p>Results are not available. Go back and try again.</p>"),
        },
    }

    body.push_str("<div class=\"nav\">");
    if !step.is_initial() {
        body.push_str("<button type=\"submit\" formaction=\"/back\">Back</button>");
    }
    if step.is_terminal() {
        if wizard.results().is_some() {
            body.push_str("<button type=\"submit\" formaction=\"/save\">Save report</button>");
        }
        body.push_str("<button type=\"submit\" formaction=\"/reset\">Start over</button>");
    } else {
        body.push_str("<button type=\"submit\">Next</button>");
    }
    body.push_str("</div></form>");

    layout(&body)
}

fn persona_step(wizard: &Wizard, out: &mut String) {
    out.push_str("<h2>Who are you investing as?</h2><select name=\"persona\">");
    let selected = &wizard.answers().persona_key;
    for persona in wizard.catalog().iter() {
        let _ = write!(
            out,
            "<option value=\"{}\"{}>{}</option>",
            escape(persona.key),
            checked_attr(persona.key == selected.as_str(), "selected"),
            escape(persona.name)
        );
    }
    out.push_str("</select>");

    if let Some(persona) = wizard.catalog().get(selected) {
        let _ = write!(
            out,
            "<p class=\"hint\"><strong>Goal:</strong> {}<br>{}</p>",
            escape(persona.goal),
            escape(persona.description)
        );
    }
}

fn scenario_step(wizard: &Wizard, out: &mut String) {
    let _ = write!(
        out,
        "<h2>Describe your investment scenario</h2>\
         <textarea name=\"scenario\" rows=\"4\" placeholder=\"e.g. recession-proof income\">{}</textarea>\
         <p class=\"hint\">Leave blank for balanced long-term growth.</p>",
        escape(&wizard.answers().scenario)
    );
}

fn risk_step(wizard: &Wizard, out: &mut String) {
    out.push_str("<h2>How much risk are you comfortable with?</h2>");
    let prefill = wizard.risk_prefill();
    for risk in RiskLevel::SELECTABLE {
        radio(out, "risk", risk.as_str(), risk == prefill);
    }
}

fn holding_step(wizard: &Wizard, out: &mut String) {
    out.push_str("<h2>How long do you plan to hold?</h2>");
    let prefill = wizard.holding_prefill();
    for holding in HoldingPeriod::ALL {
        radio(out, "holding", holding.as_str(), holding == prefill);
    }
}

fn industries_step(wizard: &Wizard, out: &mut String) {
    out.push_str("<h2>Any preferred industries?</h2>");
    let chosen = &wizard.answers().industries;
    for industry in &INDUSTRIES {
        let _ = write!(
            out,
            "<label><input type=\"checkbox\" name=\"industry\" value=\"{0}\"{1}> {0}</label>",
            escape(industry.label),
            checked_attr(chosen.iter().any(|c| c == industry.label), "checked")
        );
    }

    if chosen.is_empty() {
        out.push_str("<p class=\"hint\">No specific industries selected.</p>");
    } else {
        out.push_str("<div class=\"pills\">");
        for label in chosen {
            let _ = write!(out, "<span class=\"pill\">{}</span>", escape(label));
        }
        out.push_str("</div>");
    }
}

fn review_step(wizard: &Wizard, out: &mut String) {
    let s = wizard.summary();
    out.push_str("<h2>Review your answers</h2><dl>");
    for (term, value) in [
        ("Persona", s.persona.as_str()),
        ("Goal", s.goal.as_str()),
        ("Scenario", s.scenario.as_str()),
        ("Risk tolerance", s.risk.as_str()),
        ("Holding period", s.holding.as_str()),
        ("Industries", s.industries.as_str()),
    ] {
        let _ = write!(out, "<dt>{term}</dt><dd>{}</dd>", escape(value));
    }
    out.push_str("</dl>");
}

fn results_step(view: &ResultsView, out: &mut String) {
    out.push_str("<h2>Your recommendations</h2>");

    if let Some(notice) = &view.notice {
        let _ = write!(out, "<p class=\"notice\">{}</p>", escape(notice));
    } else {
        out.push_str("<ul class=\"recommendations\">");
        for block in &view.blocks {
            let _ = write!(out, "<li><strong>{}</strong>", escape(&block.lead));
            for line in &block.details {
                let _ = write!(out, "<br>{}", escape(line));
            }
            if let Some(note) = &view.alignment_note {
                let _ = write!(out, "<p class=\"aligned\"><em>{}</em></p>", escape(note));
            }
            out.push_str("</li>");
        }
        out.push_str("</ul>");
    }

    if !view.tickers.is_empty() {
        let _ = write!(
            out,
            "<p class=\"hint\">Tickers considered: {}</p>",
            escape(&view.tickers.join(", "))
        );
    }
    let _ = write!(out, "<p class=\"disclaimer\">{}</p>", escape(view.disclaimer));
}

fn radio(out: &mut String, name: &str, value: &str, checked: bool) {
    let _ = write!(
        out,
        "<label><input type=\"radio\" name=\"{name}\" value=\"{0}\"{1}> {0}</label>",
        escape(value),
        checked_attr(checked, "checked")
    );
}

fn checked_attr(on: bool, attr: &str) -> String {
    if on {
        format!(" {attr}")
    } else {
        String::new()
    }
}

fn layout(body: &str) -> String {
    format!(
        "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>Investment Questionnaire</title>\
         <style>{STYLE}</style></head><body><main><h1>Investment Questionnaire</h1>{body}</main></body></html>"
    )
}

const STYLE: &str = "body{font-family:sans-serif;max-width:42rem;margin:2rem auto}\
progress{width:100%}label{display:block;margin:.25rem 0}\
.error{color:#b00020}.info{color:#1b5e20}.hint{color:#555}\
.pill{display:inline-block;background:#e3f2fd;border-radius:1rem;padding:.1rem .6rem;margin:.1rem}\
.disclaimer{font-size:.85rem;color:#777}.nav{margin-top:1rem}";

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
