//! Shared fixtures for the balance_meter integration tests.
//!
//! A stub balance endpoint served by axum on an ephemeral port, and a page
//! with meter containers laid out the way the real site does it.
#![allow(dead_code)]

use axum::{Json, Router, http::StatusCode, routing::get};
use balance_meter::{
    meter::{Ticker, config::{FIXED_COSTS_ATTRIBUTE, METER_ATTRIBUTE}},
    page::{
        Element, Page,
        memory::{MemoryElement, MemoryPage},
    },
};
use serde_json::Value;

pub const BALANCE_PATH: &str = "/api/balance";

/// Serve `router` on 127.0.0.1 and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind stub server");
    let addr = listener.local_addr().expect("stub server has no address");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("stub server failed");
    });

    format!("http://{addr}/")
}

/// An endpoint answering every request with `body`.
pub fn balance_endpoint(body: Value) -> Router {
    Router::new().route(
        BALANCE_PATH,
        get(move || {
            let body = body.clone();
            async move { Json(body) }
        }),
    )
}

/// An endpoint answering with a bare status code.
pub fn failing_endpoint(status: StatusCode) -> Router {
    Router::new().route(BALANCE_PATH, get(move || async move { status }))
}

/// An endpoint answering 200 with a body that is not JSON.
pub fn garbage_endpoint() -> Router {
    Router::new().route(BALANCE_PATH, get(|| async { "balance: lots" }))
}

/// A base URL nothing is listening on.
pub async fn closed_port() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind");
    let addr = listener.local_addr().expect("no address");
    drop(listener);
    format!("http://{addr}/")
}

/// Handles to one meter's nodes.
pub struct MeterNodes {
    pub container: MemoryElement,
    pub current: MemoryElement,
    pub progress: MemoryElement,
    pub period: MemoryElement,
}

impl MeterNodes {
    pub fn mutations(&self) -> usize {
        self.current.mutations() + self.progress.mutations() + self.period.mutations()
    }
}

/// Markup of one meter container.
pub fn meter_markup(url: &str, max: &str, fixed_costs: &str) -> String {
    format!(
        r#"<section class="box" {METER_ATTRIBUTE}="{url}">
             <p><strong class="current"></strong><span> EUR</span></p>
             <progress class="progress is-large" max="{max}"></progress>
             <p><span class="period" {FIXED_COSTS_ATTRIBUTE}="{fixed_costs}"></span></p>
           </section>"#
    )
}

impl MeterNodes {
    /// Nodes of the `index`th meter container on `page`.
    pub fn nth(page: &MemoryPage, index: usize) -> Self {
        let container = page
            .query_selector_all(&format!("[{METER_ATTRIBUTE}]"))
            .into_iter()
            .nth(index)
            .expect("no such meter container");
        let find = |selectors: &str| {
            container
                .query_selector(selectors)
                .expect("meter container is missing a node")
        };

        Self {
            current: find(".current"),
            progress: find(".progress"),
            period: find(".period"),
            container: container.clone(),
        }
    }
}

/// A page holding a single meter container.
pub fn meter_page(url: &str, max: &str, fixed_costs: &str) -> (MemoryPage, MeterNodes) {
    let page = MemoryPage::parse(&meter_markup(url, max, fixed_costs));
    let nodes = MeterNodes::nth(&page, 0);
    (page, nodes)
}

/// A ticker that never waits.
pub struct Immediate;

impl Ticker for Immediate {
    async fn tick(&mut self) {}
}
