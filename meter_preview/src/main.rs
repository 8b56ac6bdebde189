//! Animates balance meters against a live endpoint without a browser and
//! logs what each one ends up showing.
//!
//! Useful as a smoke check of the balance endpoint: the process exits
//! non-zero if any meter could not fetch its balance.

use balance_meter::{
    MeterPhase, MeterReport,
    meter::{
        HttpBalanceSource, Interval, Ticker, VisualState,
        config::{FIXED_COSTS_ATTRIBUTE, METER_ATTRIBUTE},
        schedule::TokioTicker,
        setup_meters,
    },
    page::{
        Element, Page,
        memory::{MemoryElement, MemoryPage},
    },
};
use reqwest::Url;
use serde::Deserialize;
use tokio::task::LocalSet;
use tracing::{info, warn};
use um_app::ContextProvider;

type Error = Box<dyn std::error::Error>;

fn default_endpoint_url() -> String {
    "/api/balance".to_string()
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080/".to_string()
}

const fn default_target() -> f64 {
    1000.0
}

const fn default_fixed_costs() -> f64 {
    200.0
}

const fn default_meters() -> usize {
    1
}

#[derive(Debug, Clone, Deserialize)]
struct Config {
    #[serde(default = "default_endpoint_url")]
    endpoint_url: String,
    #[serde(default = "default_base_url")]
    base_url: String,
    #[serde(default = "default_target")]
    target: f64,
    #[serde(default = "default_fixed_costs")]
    fixed_costs: f64,
    #[serde(default = "default_meters")]
    meters: usize,
}

impl Config {
    fn validate(&self) -> Result<(), Error> {
        if self.meters == 0 {
            return Err("UMVERTEILER_METERS must be at least 1".into());
        }
        if !self.target.is_finite() {
            return Err("UMVERTEILER_TARGET must be a finite number".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct AppContext {
    config: Config,
    client: reqwest::Client,
}

impl ContextProvider<Config> for AppContext {
    async fn new(config: Config) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

/// What one container displays once its meter has finished.
#[derive(Debug, Clone, PartialEq)]
struct Display {
    current: String,
    period: String,
    state: Option<VisualState>,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Summary {
    done: usize,
    failed: usize,
}

const CONTAINER_MARKUP: &str = r#"
    <section class="box">
      <p><strong class="current"></strong></p>
      <progress class="progress"></progress>
      <p><span class="period"></span></p>
    </section>
"#;

/// A page with `config.meters` identical meter containers.
fn build_page(config: &Config) -> (MemoryPage, Vec<MemoryElement>) {
    let page = MemoryPage::parse(&CONTAINER_MARKUP.repeat(config.meters));
    let containers = page.query_selector_all("section.box");

    for container in &containers {
        container.set_attribute(METER_ATTRIBUTE, &config.endpoint_url);
        if let Some(progress) = container.query_selector(".progress") {
            progress.set_attribute("max", &config.target.to_string());
        }
        if let Some(period) = container.query_selector(".period") {
            period.set_attribute(
                FIXED_COSTS_ATTRIBUTE,
                &config.fixed_costs.to_string(),
            );
        }
    }

    (page, containers)
}

fn read_display(container: &MemoryElement) -> Display {
    let text = |selector: &str| {
        container
            .query_selector(selector)
            .map(|node| node.text())
            .unwrap_or_default()
    };

    let state = container.query_selector(".progress").and_then(|progress| {
        [VisualState::Success, VisualState::Warning, VisualState::Danger]
            .into_iter()
            .find(|state| progress.has_class(state.class_name()))
    });

    Display {
        current: text(".current"),
        period: text(".period"),
        state,
    }
}

/// Run one meter per configured container to completion, each waiting on a
/// ticker from `make_ticker`.
async fn preview<T, F>(
    context: &AppContext,
    make_ticker: F,
) -> Result<(Summary, Vec<Display>), Error>
where
    T: Ticker + 'static,
    F: Fn() -> T,
{
    let config = &context.config;
    config.validate()?;

    let base_url = Url::parse(&config.base_url)?;
    let source =
        HttpBalanceSource::new(context.client.clone(), Some(base_url));
    let (page, containers) = build_page(config);

    let meters = setup_meters(&page, &source);
    if meters.len() != containers.len() {
        return Err(format!(
            "set up {} of {} meters",
            meters.len(),
            containers.len()
        )
        .into());
    }

    info!(
        "animating {} meter(s) from {}",
        meters.len(),
        config.endpoint_url
    );

    let local = LocalSet::new();
    let reports: Vec<MeterReport> = local
        .run_until(async {
            let handles: Vec<_> = meters
                .into_iter()
                .map(|meter| {
                    tokio::task::spawn_local(
                        meter.run(Interval::new(make_ticker())),
                    )
                })
                .collect();

            let mut reports = Vec::with_capacity(handles.len());
            for handle in handles {
                reports.push(handle.await?);
            }
            Ok::<_, tokio::task::JoinError>(reports)
        })
        .await?;

    let mut summary = Summary::default();
    let mut displays = Vec::with_capacity(containers.len());

    for (index, (report, container)) in
        reports.iter().zip(&containers).enumerate()
    {
        let shown = read_display(container);

        match report.phase {
            MeterPhase::Done => {
                summary.done += 1;
                info!(
                    "meter #{}: {} ({} periods, {}) after {} ticks",
                    index,
                    shown.current,
                    shown.period,
                    shown.state.map_or("no state", VisualState::class_name),
                    report.ticks
                );
            }
            phase => {
                summary.failed += 1;
                warn!(
                    "meter #{}: ended {:?} showing {}",
                    index, phase, shown.current
                );
            }
        }

        displays.push(shown);
    }

    Ok((summary, displays))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    let context = um_app::create_app_context::<AppContext, Config>().await?;

    let (summary, _) = preview(&context, TokioTicker::default).await?;

    info!("{} done, {} failed", summary.done, summary.failed);

    if summary.failed > 0 {
        return Err(format!("{} meter(s) failed", summary.failed).into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::{Json, Router, http::StatusCode, routing::get};
    use serde_json::json;

    use super::*;

    struct Immediate;

    impl Ticker for Immediate {
        async fn tick(&mut self) {}
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/")
    }

    fn config(base_url: String, meters: usize) -> Config {
        Config {
            endpoint_url: default_endpoint_url(),
            base_url,
            target: 1000.0,
            fixed_costs: 200.0,
            meters,
        }
    }

    async fn context(config: Config) -> AppContext {
        AppContext::new(config).await
    }

    #[test]
    fn test_config_defaults() {
        figment::Jail::expect_with(|_jail| {
            let config: Config = um_app::figment().extract()?;

            assert_eq!(config.endpoint_url, "/api/balance");
            assert_eq!(config.base_url, "http://127.0.0.1:8080/");
            assert!((config.target - 1000.0).abs() < f64::EPSILON);
            assert!((config.fixed_costs - 200.0).abs() < f64::EPSILON);
            assert_eq!(config.meters, 1);
            Ok(())
        });
    }

    #[test]
    fn test_config_from_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("UMVERTEILER_ENDPOINT_URL", "https://example.org/b");
            jail.set_env("UMVERTEILER_TARGET", "2500.5");
            jail.set_env("UMVERTEILER_FIXED_COSTS", "0");
            jail.set_env("UMVERTEILER_METERS", "3");

            let config: Config = um_app::figment().extract()?;

            assert_eq!(config.endpoint_url, "https://example.org/b");
            assert!((config.target - 2500.5).abs() < f64::EPSILON);
            assert!(config.fixed_costs.abs() < f64::EPSILON);
            assert_eq!(config.meters, 3);
            Ok(())
        });
    }

    #[test]
    fn test_config_rejects_non_numeric_target() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("UMVERTEILER_TARGET", "lots");

            assert!(um_app::figment().extract::<Config>().is_err());
            Ok(())
        });
    }

    #[test]
    fn test_validate() {
        assert!(config(default_base_url(), 1).validate().is_ok());
        assert!(config(default_base_url(), 0).validate().is_err());

        let mut infinite = config(default_base_url(), 1);
        infinite.target = f64::INFINITY;
        assert!(infinite.validate().is_err());
    }

    #[test]
    fn test_build_page_lays_out_containers() {
        let (page, containers) = build_page(&config(default_base_url(), 2));

        assert_eq!(containers.len(), 2);
        assert_eq!(page.query_selector_all("body > section").len(), 2);

        let progress = containers[0].query_selector(".progress").unwrap();
        assert_eq!(progress.attribute("max").as_deref(), Some("1000"));
        let period = containers[1].query_selector(".period").unwrap();
        assert_eq!(
            period.attribute(FIXED_COSTS_ATTRIBUTE).as_deref(),
            Some("200")
        );
        assert_eq!(
            containers[0].attribute(METER_ATTRIBUTE).as_deref(),
            Some("/api/balance")
        );
    }

    #[tokio::test]
    async fn test_preview_animates_every_meter() {
        let base_url = serve(Router::new().route(
            "/api/balance",
            get(|| async { Json(json!({ "balance": 300 })) }),
        ))
        .await;
        let context = context(config(base_url, 3)).await;

        let (summary, displays) = preview(&context, || Immediate).await.unwrap();

        assert_eq!(summary, Summary { done: 3, failed: 0 });
        assert_eq!(displays.len(), 3);
        for shown in displays {
            assert_eq!(
                shown,
                Display {
                    current: "300".to_string(),
                    period: "1".to_string(),
                    state: Some(VisualState::Warning),
                }
            );
        }
    }

    #[tokio::test]
    async fn test_preview_counts_failed_meters() {
        let base_url = serve(Router::new().route(
            "/api/balance",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        ))
        .await;
        let context = context(config(base_url, 2)).await;

        let (summary, displays) = preview(&context, || Immediate).await.unwrap();

        assert_eq!(summary, Summary { done: 0, failed: 2 });
        assert!(displays.iter().all(|d| d.current == "unavailable"
            && d.period == "N/A"
            && d.state.is_none()));
    }

    #[tokio::test]
    async fn test_preview_rejects_invalid_base_url() {
        let context = context(config("not a url".to_string(), 1)).await;

        assert!(preview(&context, || Immediate).await.is_err());
    }

    #[tokio::test]
    async fn test_preview_rejects_zero_meters() {
        let context = context(config(default_base_url(), 0)).await;

        assert!(preview(&context, || Immediate).await.is_err());
    }
}
