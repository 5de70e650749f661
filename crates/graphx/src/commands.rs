use axum::http::Request;
use colored::Colorize;
use graph_client::{dispatch_async, ClientConfig, GraphApi, HttpGraphClient, HttpMethod, Params};
use graph_web::{RequestContext, WebClient, WebContext, WebSettings};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// The synthetic hosted request a call is made from.
pub struct RequestOpts {
    pub app_id: Option<String>,
    pub token: Option<String>,
    pub secure: bool,
    pub referrer: Option<String>,
    pub cookie: Option<String>,
    pub beta: bool,
    pub timeout_ms: u64,
}

/// Parse `key=value` pairs. Values that are valid JSON keep their type,
/// anything else is sent as a string.
pub fn parse_params(raw: &[String]) -> Result<Params, String> {
    let mut params = Params::new();
    for pair in raw {
        let (k, v) = pair
            .split_once('=')
            .ok_or_else(|| format!("parse param '{pair}': expected key=value"))?;
        if k.is_empty() {
            return Err(format!("parse param '{pair}': empty key"));
        }
        let value = serde_json::from_str(v).unwrap_or_else(|_| Value::String(v.to_string()));
        params.insert(k.to_string(), value);
    }
    Ok(params)
}

pub fn build_context(opts: &RequestOpts) -> Result<RequestContext, String> {
    let mut settings = WebSettings::from_env().map_err(|e| format!("parse environment: {e}"))?;
    if opts.app_id.is_some() {
        settings.app_id = opts.app_id.clone();
    }
    settings.use_facebook_beta |= opts.beta;

    let scheme = if opts.secure { "https" } else { "http" };
    let mut req = Request::builder().uri(format!("{scheme}://localhost/"));
    if let Some(referrer) = &opts.referrer {
        req = req.header("referer", referrer);
    }
    if let Some(cookie) = &opts.cookie {
        req = req.header("cookie", cookie);
    }
    let req = req.body(()).map_err(|e| format!("parse request: {e}"))?;

    let mut ctx = RequestContext::from_request(&req, settings);
    if let Some(token) = &opts.token {
        ctx = ctx.with_access_token(token.clone());
    }
    Ok(ctx)
}

pub fn call(
    opts: &RequestOpts,
    method: HttpMethod,
    path: &str,
    raw_params: &[String],
    run_async: bool,
) -> Result<(), String> {
    let params = parse_params(raw_params)?;
    let ctx = Arc::new(build_context(opts)?);

    let config = ClientConfig {
        timeout_ms: opts.timeout_ms,
        ..Default::default()
    };
    let http = HttpGraphClient::new(config).map_err(|e| e.to_string())?;
    let client = WebClient::new(http, Some(ctx.clone() as Arc<dyn WebContext>))
        .map_err(|e| e.to_string())?;
    debug!(
        secure = client.is_secure_connection(),
        beta = client.use_beta(),
        "request context resolved"
    );

    let result = if run_async {
        let rt = tokio::runtime::Runtime::new().map_err(|e| format!("runtime: {e}"))?;
        let event = rt.block_on(dispatch_async(
            &client,
            path,
            Some(&params),
            method,
            Value::String(path.to_string()),
        ));
        event.result
    } else {
        client.api(path, Some(&params), method)
    };

    for cookie in ctx.take_response_cookies() {
        if let Ok(c) = cookie.to_str() {
            eprintln!("{} {}", "Set-Cookie:".dimmed(), c.yellow());
        }
    }

    let value = result.map_err(|e| e.to_string())?;
    println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
    Ok(())
}
