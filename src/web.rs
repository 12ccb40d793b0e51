//! Prediction form served over HTTP.
//!
//! `GET /` renders the form, `POST /predict` runs the pipeline on a form
//! submission and renders the form again with the outcome, `POST /api/predict`
//! does the same for a JSON body.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use log::{error, info};
use serde_json::json;

use crate::artifacts::Predictor;
use crate::classifier::RiskLabel;
use crate::error::PredictError;
use crate::records::{Attribute, HeartRecord, Value};

pub type SharedPredictor = Arc<Predictor>;

pub fn router(predictor: SharedPredictor) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(submit))
        .route("/api/predict", post(api_predict))
        .route("/health", get(health))
        .with_state(predictor)
}

pub async fn serve(predictor: SharedPredictor, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("serving prediction form on http://{}", listener.local_addr()?);
    axum::serve(listener, router(predictor)).await
}

enum Outcome {
    Risk(RiskLabel),
    Error(String),
}

impl From<Result<RiskLabel, PredictError>> for Outcome {
    fn from(result: Result<RiskLabel, PredictError>) -> Self {
        match result {
            Ok(risk) => Outcome::Risk(risk),
            Err(e) => Outcome::Error(e.to_string()),
        }
    }
}

async fn index() -> Html<String> {
    Html(render_page(&default_record(), None))
}

async fn submit(
    State(predictor): State<SharedPredictor>,
    form: Result<Form<HeartRecord>, FormRejection>,
) -> Html<String> {
    match form {
        Ok(Form(record)) => {
            let outcome = Outcome::from(predictor.predict(&record));
            if let Outcome::Error(message) = &outcome {
                error!("prediction failed: {}", message);
            }
            Html(render_page(&record, Some(outcome)))
        }
        Err(rejection) => {
            error!("bad submission: {}", rejection.body_text());
            let outcome =
                Outcome::Error(PredictError::Submission(rejection.body_text()).to_string());
            Html(render_page(&default_record(), Some(outcome)))
        }
    }
}

async fn api_predict(
    State(predictor): State<SharedPredictor>,
    body: Result<Json<HeartRecord>, JsonRejection>,
) -> Response {
    let result = body
        .map_err(|rejection| PredictError::Submission(rejection.body_text()))
        .and_then(|Json(record)| predictor.predict(&record));
    match result {
        Ok(risk) => Json(json!({
            "label": risk.label(),
            "risk": risk.name(),
            "message": risk.message(),
        }))
        .into_response(),
        Err(e) => {
            let status = StatusCode::UNPROCESSABLE_ENTITY;
            let body = Json(json!({
                "error": e.to_string(),
                "status": status.as_u16(),
            }));
            (status, body).into_response()
        }
    }
}

async fn health(State(predictor): State<SharedPredictor>) -> String {
    format!("ok {} columns\n", predictor.schema().len())
}

fn default_record() -> HeartRecord {
    HeartRecord {
        age: 45,
        sex: "M".to_string(),
        chest_pain_type: "ATA".to_string(),
        resting_bp: 120,
        cholesterol: 200,
        fasting_bs: 0,
        resting_ecg: "Normal".to_string(),
        max_hr: 150,
        exercise_angina: "Y".to_string(),
        oldpeak: 0.0,
        st_slope: "Up".to_string(),
    }
}

enum Widget {
    Slider { min: u32, max: u32 },
    Number { min: f64, max: f64, step: f64 },
    Select,
}

fn widget(attribute: Attribute) -> Widget {
    match attribute {
        Attribute::Age => Widget::Slider { min: 18, max: 100 },
        Attribute::MaxHr => Widget::Slider { min: 60, max: 220 },
        Attribute::RestingBp => Widget::Number { min: 80.0, max: 200.0, step: 1.0 },
        Attribute::Cholesterol => Widget::Number { min: 0.0, max: 600.0, step: 1.0 },
        Attribute::Oldpeak => Widget::Number { min: 0.0, max: 6.0, step: 0.1 },
        _ => Widget::Select,
    }
}

// left and right column of the form
const LAYOUT: [&[Attribute]; 2] = [
    &[
        Attribute::Age,
        Attribute::Sex,
        Attribute::ChestPainType,
        Attribute::RestingBp,
        Attribute::Cholesterol,
    ],
    &[
        Attribute::FastingBs,
        Attribute::RestingEcg,
        Attribute::MaxHr,
        Attribute::ExerciseAngina,
        Attribute::Oldpeak,
        Attribute::StSlope,
    ],
];

fn option_label(attribute: Attribute, option: &str) -> &str {
    match (attribute, option) {
        (Attribute::FastingBs, "0") => "No",
        (Attribute::FastingBs, "1") => "Yes",
        _ => option,
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

fn render_field(out: &mut String, attribute: Attribute, record: &HeartRecord) {
    let name = attribute.column();
    let current = match record.value(attribute) {
        Value::Number(x) => x.to_string(),
        Value::Category(c) => c.to_string(),
    };
    out.push_str(&format!("<label for=\"{0}\">{1}</label>", name, attribute.label()));
    match widget(attribute) {
        Widget::Slider { min, max } => {
            out.push_str(&format!(
                "<input type=\"range\" id=\"{0}\" name=\"{0}\" min=\"{1}\" max=\"{2}\" value=\"{3}\" \
                 oninput=\"this.nextElementSibling.value=this.value\"><output>{3}</output>",
                name,
                min,
                max,
                escape(&current)
            ));
        }
        Widget::Number { min, max, step } => {
            out.push_str(&format!(
                "<input type=\"number\" id=\"{0}\" name=\"{0}\" min=\"{1}\" max=\"{2}\" step=\"{3}\" value=\"{4}\">",
                name,
                min,
                max,
                step,
                escape(&current)
            ));
        }
        Widget::Select => {
            out.push_str(&format!("<select id=\"{0}\" name=\"{0}\">", name));
            for option in attribute.options().unwrap_or(&[]) {
                let selected = if *option == current { " selected" } else { "" };
                out.push_str(&format!(
                    "<option value=\"{0}\"{1}>{2}</option>",
                    option,
                    selected,
                    option_label(attribute, option)
                ));
            }
            out.push_str("</select>");
        }
    }
}

fn render_page(record: &HeartRecord, outcome: Option<Outcome>) -> String {
    let mut out = String::from(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\">\
         <title>Heart Stroke Prediction</title><style>\
         body{font-family:sans-serif;max-width:760px;margin:2em auto}\
         .cols{display:flex;gap:2em}.col{flex:1;display:flex;flex-direction:column;gap:.4em}\
         .error{background:#fde2e2;padding:1em}.success{background:#e0f5e6;padding:1em}\
         aside{background:#e8f0fb;padding:1em;margin-top:2em}\
         </style></head><body>\
         <h1>❤️ Heart Stroke Risk Predictor</h1>\
         <p>Enter your medical details below to assess heart stroke risk.</p>\
         <form method=\"post\" action=\"/predict\"><div class=\"cols\">",
    );
    for column in LAYOUT {
        out.push_str("<div class=\"col\">");
        for &attribute in column {
            render_field(&mut out, attribute, record);
        }
        out.push_str("</div>");
    }
    out.push_str("</div><p><button type=\"submit\">Predict Risk</button></p></form>");

    match outcome {
        Some(Outcome::Risk(RiskLabel::High)) => {
            out.push_str(&format!("<div class=\"error\">{}</div>", RiskLabel::High.message()));
        }
        Some(Outcome::Risk(RiskLabel::Low)) => {
            out.push_str(&format!("<div class=\"success\">{}</div>", RiskLabel::Low.message()));
        }
        Some(Outcome::Error(message)) => {
            out.push_str(&format!(
                "<div class=\"error\">An error occurred: {}</div>",
                escape(&message)
            ));
        }
        None => {}
    }

    out.push_str(
        "<aside>This app uses a K-Nearest Neighbors (KNN) model to predict heart failure risk.</aside>\
         </body></html>",
    );
    out
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use tower::ServiceExt;

    use super::*;
    use crate::artifacts::tests::write_artifacts;

    fn app() -> (tempfile::TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_artifacts(dir.path());
        let predictor = Predictor::load(&paths, "HeartDisease", 3).unwrap();
        (dir, router(Arc::new(predictor)))
    }

    const SAMPLE_FORM: &str = "Age=45&Sex=M&ChestPainType=ATA&RestingBP=120&Cholesterol=200\
        &FastingBS=0&RestingECG=Normal&MaxHR=150&ExerciseAngina=N&Oldpeak=0.0&ST_Slope=Up";

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn post(uri: &str, content_type: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn index_renders_every_field() {
        let (_dir, app) = app();
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        for attribute in Attribute::ALL {
            assert!(html.contains(&format!("name=\"{}\"", attribute.column())));
        }
        assert!(html.contains("min=\"18\" max=\"100\""));
        assert!(html.contains("step=\"0.1\""));
        assert!(html.contains("<option value=\"1\">Yes</option>"));
        assert!(!html.contains("An error occurred"));
    }

    #[tokio::test]
    async fn submission_renders_one_message() {
        let (_dir, app) = app();
        let response = app
            .oneshot(post("/predict", "application/x-www-form-urlencoded", SAMPLE_FORM))
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains(RiskLabel::Low.message()));
        assert!(!html.contains(RiskLabel::High.message()));
    }

    #[tokio::test]
    async fn malformed_submission_shows_error_and_server_keeps_serving() {
        let (_dir, app) = app();
        let bad = SAMPLE_FORM.replace("Age=45", "Age=<old>");
        let response = app
            .clone()
            .oneshot(post("/predict", "application/x-www-form-urlencoded", &bad))
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains("An error occurred: invalid submission"));
        assert!(!html.contains("<old>"));

        let response = app
            .oneshot(post("/predict", "application/x-www-form-urlencoded", SAMPLE_FORM))
            .await
            .unwrap();
        assert!(body_text(response).await.contains(RiskLabel::Low.message()));
    }

    #[tokio::test]
    async fn nan_submission_shows_error_and_server_keeps_serving() {
        let (_dir, app) = app();
        let nan = SAMPLE_FORM.replace("Oldpeak=0.0", "Oldpeak=NaN");
        let response = app
            .clone()
            .oneshot(post("/predict", "application/x-www-form-urlencoded", &nan))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("An error occurred: KNeighborsClassifier: Input X contains NaN"));
        assert!(!html.contains(RiskLabel::Low.message()));
        assert!(!html.contains(RiskLabel::High.message()));

        let response = app
            .oneshot(post("/predict", "application/x-www-form-urlencoded", SAMPLE_FORM))
            .await
            .unwrap();
        assert!(body_text(response).await.contains(RiskLabel::Low.message()));
    }

    #[tokio::test]
    async fn json_endpoint_reports_label() {
        let (_dir, app) = app();
        let record = serde_json::to_string(&crate::records::sample_record()).unwrap();
        let response = app
            .clone()
            .oneshot(post("/api/predict", "application/json", &record))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["label"], 0);
        assert_eq!(body["risk"], "low");

        let response = app
            .oneshot(post("/api/predict", "application/json", "{\"Age\": 45}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn escapes_error_text() {
        assert_eq!(escape("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }
}
