//! Browser bindings.
//!
//! The page calls [`init`] once from its bootstrap script after the
//! document has loaded:
//!
//! ```js
//! import init_wasm, { init } from "./balance_meter.js";
//! await init_wasm();
//! init();
//! ```

use wasm_bindgen::{JsCast, prelude::*};

use super::{ClickEvent, Element, InvalidClassName, Page};
use crate::{
    meter::{
        HttpBalanceSource, Interval, MeterPhase, schedule::TimeoutTicker,
        setup_meters,
    },
    toggler::ClassToggler,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebElement(web_sys::Element);

impl WebElement {
    fn progress(&self) -> Option<&web_sys::HtmlProgressElement> {
        self.0.dyn_ref::<web_sys::HtmlProgressElement>()
    }
}

fn elements(list: &web_sys::NodeList) -> Vec<WebElement> {
    (0..list.length())
        .filter_map(|index| list.item(index))
        .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
        .map(WebElement)
        .collect()
}

impl Element for WebElement {
    fn attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn query_selector(&self, selectors: &str) -> Option<Self> {
        self.0.query_selector(selectors).ok().flatten().map(Self)
    }

    fn query_selector_all(&self, selectors: &str) -> Vec<Self> {
        self.0
            .query_selector_all(selectors)
            .map(|list| elements(&list))
            .unwrap_or_default()
    }

    fn has_class(&self, class: &str) -> bool {
        self.0.class_list().contains(class)
    }

    fn add_class(&self, class: &str) {
        let _ = self.0.class_list().add_1(class);
    }

    fn toggle_class(&self, class: &str) -> Result<bool, InvalidClassName> {
        self.0
            .class_list()
            .toggle(class)
            .map_err(|_| InvalidClassName(class.to_string()))
    }

    fn text(&self) -> String {
        self.0.text_content().unwrap_or_default()
    }

    fn set_text(&self, text: &str) {
        self.0.set_text_content(Some(text));
    }

    fn progress_max(&self) -> f64 {
        self.progress().map_or(1.0, web_sys::HtmlProgressElement::max)
    }

    fn set_progress_value(&self, value: f64) {
        if let Some(progress) = self.progress() {
            progress.set_value(value);
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebPage(web_sys::Document);

impl Page for WebPage {
    type Element = WebElement;

    fn query_selector(&self, selectors: &str) -> Option<WebElement> {
        self.0.query_selector(selectors).ok().flatten().map(WebElement)
    }

    fn query_selector_all(&self, selectors: &str) -> Vec<WebElement> {
        self.0
            .query_selector_all(selectors)
            .map(|list| elements(&list))
            .unwrap_or_default()
    }
}

pub struct WebClick(web_sys::MouseEvent);

impl ClickEvent for WebClick {
    type Element = WebElement;

    fn target(&self) -> Option<WebElement> {
        self.0
            .target()
            .and_then(|target| target.dyn_into::<web_sys::Element>().ok())
            .map(WebElement)
    }

    fn prevent_default(&self) {
        self.0.prevent_default();
    }

    fn stop_propagation(&self) {
        self.0.stop_propagation();
    }
}

/// Wire up the page: one delegated click listener for class toggles, and a
/// balance meter for every `[data-balance-meter]` container.
///
/// # Errors
///
/// If there is no window or document, or the listener can't be registered.
#[wasm_bindgen]
pub fn init() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let page = WebPage(document.clone());

    {
        let page = page.clone();
        let closure =
            Closure::<dyn FnMut(_)>::new(move |event: web_sys::MouseEvent| {
                if let Err(e) = ClassToggler.handle_click(&page, &WebClick(event)) {
                    tracing::error!("class toggle failed: {}", e);
                    web_sys::console::error_1(&JsValue::from_str(&e.to_string()));
                }
            });
        document
            .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        // the listener lives as long as the page
        closure.forget();
    }

    let source = HttpBalanceSource::with_base_url(&window.location().href()?)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    for meter in setup_meters(&page, &source) {
        let endpoint_url = meter.config().endpoint_url.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let report = meter.run(Interval::new(TimeoutTicker::default())).await;
            if report.phase == MeterPhase::Failed {
                web_sys::console::warn_1(&JsValue::from_str(&format!(
                    "balance unavailable from {endpoint_url}"
                )));
            }
        });
    }

    Ok(())
}
