use std::time::Duration;

use actix_web::{
    get,
    http::{header::CACHE_CONTROL, StatusCode},
    post, web, HttpResponse, ResponseError,
};
use log::{debug, error, info, trace, warn};
use rand::Rng;
use thiserror::Error;
use uuid::Uuid;

use crate::code::{Capabilities, CompilationRequest, CompilationResult};
use crate::config::CompileConfig;
use crate::lang::{Lang, SUPPORTED_LANGUAGES};

pub const SERVICE_NAME: &str = "Online Code Compiler API";
pub const SERVICE_VERSION: &str = "1.0.0";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CompileError {
    #[error("Missing required fields: language and code")]
    MissingFields,
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("Code too long (max {} characters)", group_thousands(.0))]
    CodeTooLong(usize),
    #[error("Input too long (max {} characters)", group_thousands(.0))]
    InputTooLong(usize),
    #[error("Internal server error")]
    Internal,
}

impl ResponseError for CompileError {
    fn status_code(&self) -> StatusCode {
        match self {
            CompileError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header((CACHE_CONTROL, "no-cache"))
            .json(CompilationResult::failure(self.to_string()))
    }
}

/// A request that passed validation.
#[derive(Debug, PartialEq, Eq)]
pub struct Submission<'a> {
    pub lang: Lang,
    pub code: &'a str,
    pub input: &'a str,
}

/// Checks a request against the allow-list and size limits.
///
/// Checks run in a fixed order and the first failing one is reported.
/// Lengths are counted in characters, not bytes.
pub fn validate<'a>(
    request: &'a CompilationRequest,
    limits: &CompileConfig,
) -> Result<Submission<'a>, CompileError> {
    let language = request.language.as_deref().unwrap_or_default();
    let code = request.code.as_deref().unwrap_or_default();
    if language.is_empty() || code.is_empty() {
        return Err(CompileError::MissingFields);
    }

    let lang = Lang::from_id(language)
        .ok_or_else(|| CompileError::UnsupportedLanguage(language.to_string()))?;

    if code.chars().count() > limits.max_code_chars {
        return Err(CompileError::CodeTooLong(limits.max_code_chars));
    }

    let input = request.input.as_deref().unwrap_or_default();
    if input.chars().count() > limits.max_input_chars {
        return Err(CompileError::InputTooLong(limits.max_input_chars));
    }

    Ok(Submission { lang, code, input })
}

/// Validates the request, waits out the simulated latency and fabricates
/// the program output.
pub async fn compile(
    request: &CompilationRequest,
    config: &CompileConfig,
) -> Result<CompilationResult, CompileError> {
    let submission = validate(request, config)?;

    let delay = random_delay(config);
    if !delay.is_zero() {
        trace!("simulating {}ms of compilation", delay.as_millis());
        tokio::time::sleep(delay).await;
    }

    let output = submission
        .lang
        .fabricate_output(submission.code, submission.input);
    Ok(CompilationResult::ok(output, random_execution_time()))
}

pub fn capabilities() -> Capabilities {
    Capabilities {
        message: SERVICE_NAME.to_string(),
        version: SERVICE_VERSION.to_string(),
        supported_languages: SUPPORTED_LANGUAGES.iter().map(|id| id.to_string()).collect(),
    }
}

fn random_delay(config: &CompileConfig) -> Duration {
    if config.delay_max_ms == 0 {
        return Duration::ZERO;
    }
    let millis = rand::thread_rng().gen_range(config.delay_min_ms..=config.delay_max_ms);
    Duration::from_millis(millis)
}

fn random_execution_time() -> u64 {
    rand::thread_rng().gen_range(100..600)
}

fn group_thousands(value: &usize) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

#[post("/api/compile")]
pub async fn post_compile_route(
    body: web::Bytes,
    config: web::Data<CompileConfig>,
) -> Result<HttpResponse, CompileError> {
    let id = Uuid::new_v4();
    trace!("[{}] request body: {:?}", id, body);

    let request: CompilationRequest = serde_json::from_slice(&body).map_err(|e| {
        error!("[{}] cannot decode compile request: {}", id, e);
        CompileError::Internal
    })?;
    debug!(
        "[{}] received compile request (language: {:?})",
        id, request.language
    );

    let result = compile(&request, config.get_ref()).await;
    match result {
        Ok(result) => {
            info!(
                "[{}] compilation finished in {:?}ms",
                id, result.execution_time
            );
            Ok(HttpResponse::Ok()
                .insert_header((CACHE_CONTROL, "no-cache"))
                .json(result))
        }
        Err(e) => {
            warn!("[{}] rejected compile request: {}", id, e);
            Err(e)
        }
    }
}

#[get("/api/compile")]
pub async fn get_compile_route() -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((CACHE_CONTROL, "public, max-age=3600"))
        .json(capabilities())
}

/// Largest accepted request body for the given limits.
///
/// Limits are in characters while the body cap is in bytes: a character can
/// take up to 12 bytes once JSON-escaped as a surrogate pair.
pub fn payload_limit(config: &CompileConfig) -> usize {
    const ESCAPED_CHAR_BYTES: usize = 12;
    const ENVELOPE_BYTES: usize = 64 * 1024;

    (config.max_code_chars + config.max_input_chars) * ESCAPED_CHAR_BYTES + ENVELOPE_BYTES
}

/// Registers the compile routes, their limits and the body size cap.
pub fn configure(config: CompileConfig) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::PayloadConfig::new(payload_limit(&config)))
            .app_data(web::Data::new(config))
            .service(post_compile_route)
            .service(get_compile_route);
    }
}

#[cfg(test)]
mod test {
    use actix_web::{test as actix_test, App};
    use serde_json::json;

    use super::*;

    fn limits() -> CompileConfig {
        CompileConfig::without_delay()
    }

    fn request(language: &str, code: &str, input: Option<&str>) -> CompilationRequest {
        CompilationRequest {
            language: Some(language.to_string()),
            code: Some(code.to_string()),
            input: input.map(str::to_string),
        }
    }

    struct Posted {
        status: StatusCode,
        cache_control: Option<String>,
        result: CompilationResult,
    }

    async fn post_raw(payload: String) -> Posted {
        let app = actix_test::init_service(App::new().configure(configure(limits()))).await;
        let req = actix_test::TestRequest::post()
            .uri("/api/compile")
            .insert_header(("content-type", "application/json"))
            .set_payload(payload)
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        let status = resp.status();
        let cache_control = resp
            .headers()
            .get(CACHE_CONTROL)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        Posted {
            status,
            cache_control,
            result: actix_test::read_body_json(resp).await,
        }
    }

    async fn post(body: serde_json::Value) -> (StatusCode, CompilationResult) {
        let posted = post_raw(body.to_string()).await;
        (posted.status, posted.result)
    }

    /// `count` copies of U+1F600 written as escaped surrogate pairs.
    fn escaped_code(count: usize) -> String {
        format!(
            r#"{{"language":"python","code":"{}"}}"#,
            r"\ud83d\ude00".repeat(count)
        )
    }

    #[test]
    fn test_missing_fields() {
        for body in [
            CompilationRequest::default(),
            request("", "x", None),
            request("python", "", None),
            CompilationRequest {
                code: Some("x".to_string()),
                ..Default::default()
            },
        ] {
            assert_eq!(validate(&body, &limits()), Err(CompileError::MissingFields));
        }
        assert_eq!(
            CompileError::MissingFields.to_string(),
            "Missing required fields: language and code"
        );
    }

    #[test]
    fn test_missing_fields_win_over_language() {
        let body = request("ocaml", "", None);
        assert_eq!(validate(&body, &limits()), Err(CompileError::MissingFields));
    }

    #[test]
    fn test_unsupported_language_is_named() {
        let body = request("ocaml", "x", None);
        let err = validate(&body, &limits()).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported language: ocaml");
    }

    #[test]
    fn test_code_length_boundary() {
        let ok = request("python", &"a".repeat(50_000), None);
        assert!(validate(&ok, &limits()).is_ok());

        let too_long = request("python", &"a".repeat(50_001), None);
        let err = validate(&too_long, &limits()).unwrap_err();
        assert_eq!(err.to_string(), "Code too long (max 50,000 characters)");
    }

    #[test]
    fn test_code_length_counts_characters() {
        let body = request("python", &"é".repeat(50_000), None);
        assert!(validate(&body, &limits()).is_ok());
    }

    #[test]
    fn test_input_length_boundary() {
        let ok = request("c", "x", Some(&"i".repeat(10_000)));
        assert!(validate(&ok, &limits()).is_ok());

        let too_long = request("c", "x", Some(&"i".repeat(10_001)));
        let err = validate(&too_long, &limits()).unwrap_err();
        assert_eq!(err.to_string(), "Input too long (max 10,000 characters)");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(&0), "0");
        assert_eq!(group_thousands(&999), "999");
        assert_eq!(group_thousands(&1000), "1,000");
        assert_eq!(group_thousands(&1234567), "1,234,567");
    }

    #[actix_web::test]
    async fn test_compile_every_language() {
        for id in SUPPORTED_LANGUAGES.iter() {
            let result = compile(&request(id, "x", Some("42")), &limits())
                .await
                .unwrap();
            assert!(result.success);
            assert!(result.output.contains("42"), "{}", id);
            let time = result.execution_time.unwrap();
            assert!((100..600).contains(&time));
        }
    }

    #[test]
    fn test_random_delay_bounds() {
        let config = CompileConfig {
            delay_min_ms: 5,
            delay_max_ms: 10,
            ..CompileConfig::default()
        };
        for _ in 0..100 {
            let delay = random_delay(&config);
            assert!(delay >= Duration::from_millis(5), "{:?}", delay);
            assert!(delay <= Duration::from_millis(10), "{:?}", delay);
        }
        assert_eq!(random_delay(&limits()), Duration::ZERO);
    }

    #[test]
    fn test_payload_limit_covers_escaped_text() {
        let config = CompileConfig::default();
        assert!(payload_limit(&config) >= escaped_code(50_000).len() + 10_000 * 12);
    }

    #[actix_web::test]
    async fn test_compile_waits_for_delay() {
        let config = CompileConfig {
            delay_min_ms: 5,
            delay_max_ms: 10,
            ..CompileConfig::default()
        };
        let started = std::time::Instant::now();
        let result = compile(&request("go", "x", None), &config).await.unwrap();
        assert!(result.success);
        assert!(started.elapsed() >= Duration::from_millis(5));
    }

    #[actix_web::test]
    async fn test_post_python_hello() {
        let body = json!({"language": "python", "code": "print('hi')"});
        let posted = post_raw(body.to_string()).await;
        assert_eq!(posted.status, StatusCode::OK);
        assert_eq!(posted.cache_control.as_deref(), Some("no-cache"));
        assert!(posted.result.success);
        assert!(posted.result.output.contains("Hello, World!"));
        assert!(posted.result.error.is_none());
    }

    #[actix_web::test]
    async fn test_post_unsupported_language() {
        let posted = post_raw(json!({"language": "ocaml", "code": "x"}).to_string()).await;
        assert_eq!(posted.status, StatusCode::BAD_REQUEST);
        assert_eq!(posted.cache_control.as_deref(), Some("no-cache"));
        assert!(!posted.result.success);
        assert_eq!(posted.result.output, "");
        assert_eq!(
            posted.result.error.as_deref(),
            Some("Unsupported language: ocaml")
        );
    }

    #[actix_web::test]
    async fn test_post_escaped_code_at_limit() {
        let posted = post_raw(escaped_code(50_000)).await;
        assert_eq!(posted.status, StatusCode::OK);
        assert!(posted.result.success);
    }

    #[actix_web::test]
    async fn test_post_escaped_code_over_limit() {
        let posted = post_raw(escaped_code(50_001)).await;
        assert_eq!(posted.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            posted.result.error.as_deref(),
            Some("Code too long (max 50,000 characters)")
        );
    }

    #[actix_web::test]
    async fn test_post_control_chars_at_limit() {
        let code = "\u{1}".repeat(50_000);
        let (status, result) = post(json!({"language": "python", "code": code})).await;
        assert_eq!(status, StatusCode::OK);
        assert!(result.success);
    }

    #[actix_web::test]
    async fn test_post_numeric_language() {
        let (status, result) = post(json!({"language": 12, "code": "x"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(result.error.as_deref(), Some("Unsupported language: 12"));
    }

    #[actix_web::test]
    async fn test_post_missing_code() {
        let (status, result) = post(json!({"language": "rust"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            result.error.as_deref(),
            Some("Missing required fields: language and code")
        );
    }

    #[actix_web::test]
    async fn test_post_malformed_body() {
        let (status, result) = post(json!({"language": "python", "code": ["x"]})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(result.error.as_deref(), Some("Internal server error"));
        assert_eq!(result.output, "");
    }

    #[actix_web::test]
    async fn test_get_capabilities() {
        let app =
            actix_test::init_service(App::new().configure(configure(CompileConfig::default())))
                .await;
        let req = actix_test::TestRequest::get().uri("/api/compile").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(CACHE_CONTROL).unwrap(),
            "public, max-age=3600"
        );
        let body: Capabilities = actix_test::read_body_json(resp).await;
        assert_eq!(body.message, SERVICE_NAME);
        assert_eq!(body.version, SERVICE_VERSION);
        assert_eq!(body.supported_languages, *SUPPORTED_LANGUAGES);
    }
}
