//! HTTP request handlers

use std::fmt::Write as _;
use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::export::ModelMetadata;
use crate::schema::{vocabulary, Placement, StudentProfile};

use super::error::{Result, ServerError};
use super::state::AppState;

// ============================================================================
// Inference Handlers
// ============================================================================

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: Placement,
    pub label: u8,
    pub message: &'static str,
    pub probability: f64,
}

fn run_prediction(state: &AppState, profile: &StudentProfile) -> Result<(Placement, f64)> {
    let pipeline = state.model.get()?;
    let (placement, probability) = pipeline.predict_one_with_proba(profile)?;
    info!(%placement, probability, "Prediction served");
    Ok((placement, probability))
}

/// JSON prediction endpoint
pub async fn predict_json(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<StudentProfile>, JsonRejection>,
) -> Result<Json<PredictResponse>> {
    let Json(profile) = payload.map_err(|e| ServerError::Unprocessable(e.body_text()))?;
    let (placement, probability) = run_prediction(&state, &profile)?;

    Ok(Json(PredictResponse {
        prediction: placement,
        label: placement.label(),
        message: placement.message(),
        probability,
    }))
}

/// Form submission endpoint: renders the page with the outcome
pub async fn predict_form(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Form<StudentProfile>, FormRejection>,
) -> Response {
    let profile = match payload {
        Ok(Form(profile)) => profile,
        Err(rejection) => {
            warn!(reason = %rejection.body_text(), "Rejected form submission");
            let outcome = Outcome::Failure(rejection.body_text());
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(render_page(None, Some(&outcome))),
            )
                .into_response();
        }
    };

    match run_prediction(&state, &profile) {
        Ok((placement, _)) => {
            Html(render_page(Some(&profile), Some(&Outcome::Predicted(placement)))).into_response()
        }
        Err(err) => {
            let status = err.status();
            let outcome = Outcome::Failure(err.public_message());
            (status, Html(render_page(Some(&profile), Some(&outcome)))).into_response()
        }
    }
}

// ============================================================================
// Model / System Handlers
// ============================================================================

pub async fn model_info(State(state): State<Arc<AppState>>) -> Result<Json<ModelMetadata>> {
    let pipeline = state.model.get()?;
    let metadata = pipeline
        .metadata()
        .cloned()
        .ok_or_else(|| ServerError::NotFound("Model metadata unavailable".to_string()))?;
    Ok(Json(metadata))
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model_loaded": state.model.is_loaded(),
        "uptime_secs": chrono::Utc::now().signed_duration_since(state.started_at).num_seconds(),
    }))
}

// ============================================================================
// UI Handler
// ============================================================================

pub async fn serve_index() -> Html<String> {
    Html(render_page(None, None))
}

/// What the result block shows
#[derive(Debug)]
enum Outcome {
    Predicted(Placement),
    Failure(String),
}

fn field_label(column: &str) -> &'static str {
    match column {
        "gender" => "Gender",
        "ssc_p" => "SSC Percentage (%)",
        "ssc_b" => "SSC Board",
        "hsc_p" => "HSC Percentage (%)",
        "hsc_b" => "HSC Board",
        "hsc_s" => "HSC Stream",
        "degree_p" => "Degree Percentage (%)",
        "degree_t" => "Degree Type",
        "workex" => "Work Experience",
        "etest_p" => "E-Test Percentage (%)",
        "specialisation" => "MBA Specialisation",
        "mba_p" => "MBA Percentage (%)",
        _ => "",
    }
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
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

fn select_field(html: &mut String, column: &str, current: Option<&str>) {
    let _ = write!(
        html,
        r#"<label>{label}<select name="{column}" required>"#,
        label = field_label(column),
        column = column
    );
    for option in vocabulary(column) {
        let selected = if current == Some(*option) { " selected" } else { "" };
        let value = escape_html(option);
        let _ = write!(html, r#"<option value="{value}"{selected}>{value}</option>"#);
    }
    html.push_str("</select></label>");
}

fn number_field(html: &mut String, column: &str, current: Option<f64>) {
    let value = current.map(|v| v.to_string()).unwrap_or_else(|| "0".to_string());
    let _ = write!(
        html,
        r#"<label>{label}<input type="number" name="{column}" min="0" max="100" step="0.1" value="{value}" required></label>"#,
        label = field_label(column),
        column = column,
        value = value
    );
}

/// Render the form page, prefilled with `profile` and showing `outcome` when given
fn render_page(profile: Option<&StudentProfile>, outcome: Option<&Outcome>) -> String {
    let mut columns = [String::new(), String::new(), String::new()];

    select_field(&mut columns[0], "gender", profile.map(|p| p.gender.as_str()));
    number_field(&mut columns[0], "ssc_p", profile.map(|p| p.ssc_p));
    number_field(&mut columns[0], "hsc_p", profile.map(|p| p.hsc_p));
    number_field(&mut columns[0], "degree_p", profile.map(|p| p.degree_p));

    select_field(&mut columns[1], "ssc_b", profile.map(|p| p.ssc_b.as_str()));
    select_field(&mut columns[1], "hsc_b", profile.map(|p| p.hsc_b.as_str()));
    number_field(&mut columns[1], "etest_p", profile.map(|p| p.etest_p));
    number_field(&mut columns[1], "mba_p", profile.map(|p| p.mba_p));

    select_field(&mut columns[2], "hsc_s", profile.map(|p| p.hsc_s.as_str()));
    select_field(&mut columns[2], "degree_t", profile.map(|p| p.degree_t.as_str()));
    select_field(&mut columns[2], "workex", profile.map(|p| p.workex.as_str()));
    select_field(&mut columns[2], "specialisation", profile.map(|p| p.specialisation.as_str()));

    let result = match outcome {
        Some(Outcome::Predicted(placement)) if placement.is_placed() => {
            format!(r#"<div class="result success">{}</div>"#, placement.message())
        }
        Some(Outcome::Predicted(placement)) => {
            format!(r#"<div class="result error">{}</div>"#, placement.message())
        }
        Some(Outcome::Failure(message)) => format!(
            r#"<div class="result error">Prediction failed: {}</div>"#,
            escape_html(message)
        ),
        None => String::new(),
    };

    INDEX_TEMPLATE
        .replace("{{column_1}}", &columns[0])
        .replace("{{column_2}}", &columns[1])
        .replace("{{column_3}}", &columns[2])
        .replace("{{result}}", &result)
}

const INDEX_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Placement Predictor</title>
    <style>
        body{background:radial-gradient(circle at 10% 30%,#2c0a3a 10%,#1a0022 90%);color:#fff;font-family:system-ui,sans-serif;min-height:100vh;margin:0}
        main{max-width:1100px;margin:0 auto;padding:2rem}
        .title{font-size:2.6rem;font-weight:800;text-align:center;color:#ff9d00;margin-bottom:.5rem}
        .subtitle{color:#d0c4e4;text-align:center;margin-bottom:2rem;font-weight:300}
        .grid{display:grid;grid-template-columns:repeat(3,1fr);gap:1.25rem}
        .col{background:rgba(255,255,255,.03);border:1px solid rgba(255,140,0,.1);border-radius:16px;padding:1.25rem}
        label{display:block;margin-bottom:1rem;font-size:.9rem;color:#d0c4e4}
        input,select{display:block;width:100%;box-sizing:border-box;margin-top:.35rem;padding:.6rem .8rem;border-radius:12px;border:1px solid rgba(255,140,0,.3);background:rgba(255,255,255,.08);color:#fff}
        option{color:#000}
        button{display:block;margin:2rem auto 0;padding:.8rem 2.5rem;border:0;border-radius:12px;background:linear-gradient(45deg,#ff9d00,#ff6b00);color:#fff;font-weight:700;cursor:pointer}
        .result{margin-top:1.5rem;padding:1rem 1.25rem;border-radius:12px;font-weight:600;text-align:center}
        .success{background:rgba(0,200,83,.15);border:1px solid rgba(0,200,83,.5)}
        .error{background:rgba(255,59,48,.15);border:1px solid rgba(255,59,48,.5)}
        footer{text-align:center;color:#8a7fa0;margin-top:3rem;font-size:.85rem}
    </style>
</head>
<body>
    <main>
        <div class="title">🎓 Placement Predictor</div>
        <div class="subtitle">Empower your decisions with data-driven insights</div>
        <form method="post" action="/predict">
            <div class="grid">
                <div class="col">{{column_1}}</div>
                <div class="col">{{column_2}}</div>
                <div class="col">{{column_3}}</div>
            </div>
            <button type="submit">Predict Placement</button>
        </form>
        {{result}}
        <footer>Served by the placement predictor</footer>
    </main>
</body>
</html>
"#;
