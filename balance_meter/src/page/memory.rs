//! An in-memory document.
//!
//! Pages are parsed from HTML with `scraper` and queried with its selector
//! engine, so lookups behave like `querySelector` in a browser. Writes go
//! straight into the parsed tree. Every write is counted per element so
//! callers can check when a node was last touched.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    fmt,
    rc::Rc,
};

use ego_tree::NodeId;
use html5ever::{Attribute, LocalName, Namespace, QualName};
use scraper::{
    ElementRef, Html, Node, Selector,
    node::{Element as HtmlElement, Text},
};

use super::{ClickEvent, Element, InvalidClassName, Page, check_class_name};

struct Document {
    html: Html,
    mutations: HashMap<NodeId, usize>,
}

impl Document {
    fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.html.tree.get(id).and_then(ElementRef::wrap)
    }

    fn touch(&mut self, id: NodeId) {
        *self.mutations.entry(id).or_default() += 1;
    }

    /// Rewrite the attributes of element `id`.
    ///
    /// The element is rebuilt rather than edited in place so the id and
    /// class lists `scraper` derives from the attributes stay in sync.
    fn update_attributes<F>(&mut self, id: NodeId, update: F)
    where
        F: FnOnce(&mut Vec<(String, String)>),
    {
        let Some(mut node) = self.html.tree.get_mut(id) else {
            return;
        };
        let Node::Element(element) = node.value() else {
            return;
        };

        let name = element.name.clone();
        let mut attributes: Vec<(String, String)> = element
            .attrs()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        update(&mut attributes);

        let attributes = attributes
            .into_iter()
            .map(|(name, value)| Attribute {
                name: QualName::new(None, Namespace::from(""), LocalName::from(name)),
                value: value.into(),
            })
            .collect();
        *node.value() = Node::Element(HtmlElement::new(name, attributes));

        self.touch(id);
    }
}

fn parse_selector(selectors: &str) -> Option<Selector> {
    match Selector::parse(selectors) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::warn!("invalid selector {:?}: {:?}", selectors, e);
            None
        }
    }
}

fn set_entry(attributes: &mut Vec<(String, String)>, name: &str, value: String) {
    match attributes.iter_mut().find(|(key, _)| key == name) {
        Some(entry) => entry.1 = value,
        None => attributes.push((name.to_string(), value)),
    }
}

fn class_list(attributes: &[(String, String)]) -> Vec<String> {
    attributes
        .iter()
        .find(|(key, _)| key == "class")
        .map(|(_, value)| {
            value.split_ascii_whitespace().map(str::to_string).collect()
        })
        .unwrap_or_default()
}

/// Handle to an element of a [`MemoryPage`].
#[derive(Clone)]
pub struct MemoryElement {
    document: Rc<RefCell<Document>>,
    id: NodeId,
}

impl PartialEq for MemoryElement {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.document, &other.document) && self.id == other.id
    }
}

impl Eq for MemoryElement {}

impl fmt::Debug for MemoryElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryElement")
            .field("id", &self.id)
            .field("tag", &self.tag())
            .finish()
    }
}

impl MemoryElement {
    fn read<T>(&self, read: impl FnOnce(ElementRef<'_>) -> T) -> Option<T> {
        let document = self.document.borrow();
        document.element(self.id).map(read)
    }

    fn select(&self, selectors: &str) -> Vec<Self> {
        let Some(selector) = parse_selector(selectors) else {
            return Vec::new();
        };

        let ids: Vec<NodeId> = self
            .read(|scope| {
                scope
                    .select(&selector)
                    .map(|found| found.id())
                    .filter(|id| *id != self.id)
                    .collect()
            })
            .unwrap_or_default();

        ids_to_elements(&self.document, ids)
    }

    /// Set an attribute, replacing any previous value.
    pub fn set_attribute(&self, name: &str, value: &str) {
        self.document
            .borrow_mut()
            .update_attributes(self.id, |attributes| {
                set_entry(attributes, name, value.to_string());
            });
    }

    /// Lowercase tag name.
    #[must_use]
    pub fn tag(&self) -> String {
        self.read(|element| element.value().name().to_string())
            .unwrap_or_default()
    }

    /// Class list in attribute order.
    #[must_use]
    pub fn classes(&self) -> Vec<String> {
        self.attribute("class")
            .map(|classes| {
                classes.split_ascii_whitespace().map(str::to_string).collect()
            })
            .unwrap_or_default()
    }

    /// The last value written by [`Element::set_progress_value`].
    #[must_use]
    pub fn progress_value(&self) -> Option<f64> {
        self.attribute("value")
            .and_then(|value| value.parse().ok())
    }

    /// Number of writes made to this element since the page was parsed.
    #[must_use]
    pub fn mutations(&self) -> usize {
        self.document
            .borrow()
            .mutations
            .get(&self.id)
            .copied()
            .unwrap_or_default()
    }

    /// Serialized markup of this element and its descendants.
    #[must_use]
    pub fn outer_html(&self) -> String {
        self.read(|element| element.html()).unwrap_or_default()
    }
}

impl Element for MemoryElement {
    fn attribute(&self, name: &str) -> Option<String> {
        self.read(|element| element.value().attr(name).map(str::to_string))
            .flatten()
    }

    fn query_selector(&self, selectors: &str) -> Option<Self> {
        self.select(selectors).into_iter().next()
    }

    fn query_selector_all(&self, selectors: &str) -> Vec<Self> {
        self.select(selectors)
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes().iter().any(|c| c == class)
    }

    fn add_class(&self, class: &str) {
        self.document
            .borrow_mut()
            .update_attributes(self.id, |attributes| {
                let mut classes = class_list(attributes);
                if !classes.iter().any(|c| c == class) {
                    classes.push(class.to_string());
                }
                set_entry(attributes, "class", classes.join(" "));
            });
    }

    fn toggle_class(&self, class: &str) -> Result<bool, InvalidClassName> {
        check_class_name(class)?;

        let mut present = false;
        self.document
            .borrow_mut()
            .update_attributes(self.id, |attributes| {
                let mut classes = class_list(attributes);
                if let Some(index) = classes.iter().position(|c| c == class) {
                    classes.remove(index);
                } else {
                    classes.push(class.to_string());
                    present = true;
                }
                set_entry(attributes, "class", classes.join(" "));
            });

        Ok(present)
    }

    fn text(&self) -> String {
        self.read(|element| element.text().collect())
            .unwrap_or_default()
    }

    fn set_text(&self, text: &str) {
        let mut document = self.document.borrow_mut();

        let children: Vec<NodeId> = document
            .html
            .tree
            .get(self.id)
            .map(|node| node.children().map(|child| child.id()).collect())
            .unwrap_or_default();
        for child in children {
            if let Some(mut child) = document.html.tree.get_mut(child) {
                child.detach();
            }
        }

        let Some(mut node) = document.html.tree.get_mut(self.id) else {
            return;
        };
        if !text.is_empty() {
            node.append(Node::Text(Text { text: text.into() }));
        }
        document.touch(self.id);
    }

    fn progress_max(&self) -> f64 {
        self.attribute("max")
            .and_then(|max| max.trim().parse::<f64>().ok())
            .filter(|max| max.is_finite() && *max > 0.0)
            .unwrap_or(1.0)
    }

    fn set_progress_value(&self, value: f64) {
        self.set_attribute("value", &value.to_string());
    }
}

/// A parsed HTML document.
#[derive(Clone)]
pub struct MemoryPage {
    document: Rc<RefCell<Document>>,
}

impl fmt::Debug for MemoryPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryPage").finish_non_exhaustive()
    }
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::parse("")
    }
}

impl MemoryPage {
    /// Parse `html` as a full document. Missing `html`, `head` and `body`
    /// elements are implied the way a browser implies them.
    #[must_use]
    pub fn parse(html: &str) -> Self {
        Self {
            document: Rc::new(RefCell::new(Document {
                html: Html::parse_document(html),
                mutations: HashMap::new(),
            })),
        }
    }

    /// Serialized markup of the whole document.
    #[must_use]
    pub fn html(&self) -> String {
        self.document.borrow().html.html()
    }
}

impl Page for MemoryPage {
    type Element = MemoryElement;

    fn query_selector(&self, selectors: &str) -> Option<MemoryElement> {
        self.query_selector_all(selectors).into_iter().next()
    }

    fn query_selector_all(&self, selectors: &str) -> Vec<MemoryElement> {
        let Some(selector) = parse_selector(selectors) else {
            return Vec::new();
        };

        let ids: Vec<NodeId> = self
            .document
            .borrow()
            .html
            .select(&selector)
            .map(|found| found.id())
            .collect();

        ids_to_elements(&self.document, ids)
    }
}

fn ids_to_elements(
    document: &Rc<RefCell<Document>>,
    ids: Vec<NodeId>,
) -> Vec<MemoryElement> {
    ids.into_iter()
        .map(|id| MemoryElement {
            document: Rc::clone(document),
            id,
        })
        .collect()
}

/// A click on an in-memory element. Records whether the listener
/// suppressed it.
#[derive(Debug)]
pub struct MemoryClick {
    target: Option<MemoryElement>,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl MemoryClick {
    #[must_use]
    pub fn on(target: &MemoryElement) -> Self {
        Self {
            target: Some(target.clone()),
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    /// A click whose target is not an element, e.g. the document itself.
    #[must_use]
    pub const fn without_target() -> Self {
        Self {
            target: None,
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    #[must_use]
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

impl ClickEvent for MemoryClick {
    type Element = MemoryElement;

    fn target(&self) -> Option<MemoryElement> {
        self.target.clone()
    }

    fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }
}
