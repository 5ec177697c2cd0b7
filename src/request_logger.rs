use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Data, Request, Response};
use std::time::Instant;

/// Fairing that writes one access-log line per request.
///
/// Server errors go to `warn`, probes of the health endpoint to `debug`,
/// everything else to `info`.
pub struct RequestLogger;

struct RequestStart(Instant);

#[rocket::async_trait]
impl Fairing for RequestLogger {
    fn info(&self) -> Info {
        Info {
            name: "Request Logger",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _: &mut Data<'_>) {
        request.local_cache(|| RequestStart(Instant::now()));
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let started = request.local_cache(|| RequestStart(Instant::now()));
        let elapsed_ms = started.0.elapsed().as_secs_f64() * 1000.0;
        let status = response.status();
        let client = request
            .client_ip()
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "-".to_string());

        let level = if status.code >= 500 {
            log::Level::Warn
        } else if request.uri().path().ends_with("/health") {
            log::Level::Debug
        } else {
            log::Level::Info
        };

        log::log!(
            level,
            "{} {} {} -> {} ({:.2}ms)",
            client,
            request.method(),
            request.uri(),
            status.code,
            elapsed_ms
        );
    }
}
