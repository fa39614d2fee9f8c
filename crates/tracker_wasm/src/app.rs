use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, error, info, warn};
use tracker_core::contents::{ErrorBody, SheetContents};
use tracker_core::row::{Field, Row};
use tracker_core::view::{TableRenderer, TableView};
use url::Url;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, HtmlInputElement};

use crate::errors::{Result, WasmError};

pub const DEFAULT_API_PATH: &str = "/api/data";
pub const DEFAULT_TABLE_BODY_ID: &str = "vehicle-table-body";
pub const DEFAULT_COUNT_ID: &str = "vehicle-count";
pub const DEFAULT_SEARCH_INPUT_ID: &str = "search-input";

/// Elements the tracker page draws into.
#[derive(Debug)]
struct Dom {
    document: Document,
    table_body: Element,
    count: Element,
    search_input: HtmlInputElement,
}

impl Dom {
    fn lookup(document: Document, table_body_id: &str, count_id: &str, search_id: &str) -> Result<Self> {
        let get = |id: &str| {
            document
                .get_element_by_id(id)
                .ok_or_else(|| WasmError::new(format!("missing element with id '{id}'")))
        };

        let table_body = get(table_body_id)?;
        let count = get(count_id)?;
        let search_input = get(search_id)?
            .dyn_into::<HtmlInputElement>()
            .map_err(|_| WasmError::new(format!("element '{search_id}' is not an input")))?;

        Ok(Dom {
            document,
            table_body,
            count,
            search_input,
        })
    }

    /// Replace the table contents and count with the given view.
    fn paint(&self, view: &TableView<'_>) -> Result<()> {
        self.table_body.set_text_content(None);
        for row in view.rows() {
            let tr = self.row_element(row)?;
            self.table_body.append_child(&tr)?;
        }
        self.count.set_text_content(Some(&view.count_label()));
        Ok(())
    }

    // Cell text is only ever set through `text_content`, sheet values are not
    // trusted markup.
    fn row_element(&self, row: &Row) -> Result<Element> {
        let tr = self.document.create_element("tr")?;
        for field in Field::ALL {
            let td = self.document.create_element("td")?;
            if field == Field::Status {
                let status = row.status();
                let span = self.document.create_element("span")?;
                span.set_class_name(&format!("status-circle {}", status.css_class()));
                td.append_child(&span)?;
                let text = self.document.create_text_node(&status.to_string());
                td.append_child(&text)?;
            } else {
                td.set_text_content(Some(row.get(field)));
            }
            tr.append_child(&td)?;
        }
        Ok(tr)
    }
}

#[derive(Debug)]
struct AppInner {
    api_url: Url,
    renderer: RefCell<TableRenderer>,
    dom: Dom,
}

impl AppInner {
    /// Paint the current search query against the loaded dataset.
    ///
    /// Does nothing if the dataset hasn't arrived yet.
    fn repaint(&self) -> Result<()> {
        let query = self.dom.search_input.value();
        let renderer = self.renderer.borrow();
        if let Some(view) = renderer.filter(&query) {
            debug!(%query, rows = view.len(), "painting table");
            self.dom.paint(&view)?;
        }
        Ok(())
    }

    async fn fetch(&self) -> Result<SheetContents> {
        let resp = reqwest::get(self.api_url.clone()).await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(WasmError::new(describe_failure(status.as_u16(), &body)));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch the dataset and paint it. Failures are logged and leave the
    /// table as it was.
    async fn load(self: Rc<Self>) {
        let fetched = self.fetch().await;
        let applied = self.renderer.borrow_mut().apply(fetched);
        match applied {
            Ok(()) => {
                info!("loaded vehicle data");
                if let Err(e) = self.repaint() {
                    error!(%e, "failed to paint table");
                }
            }
            Err(e) => error!(%e, url = %self.api_url, "failed to fetch vehicle data"),
        }
    }
}

/// Message for a non-success response from the data api.
pub fn describe_failure(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) => format!(
            "data api returned {status} ({}, retryable: {}): {}",
            err.kind, err.retryable, err.message
        ),
        Err(_) => format!("data api returned {status}"),
    }
}

/// The vehicle table on a page.
///
/// Fetches the dataset once on creation, then filters it as the search input
/// changes. Must be kept alive for as long as the page is, dropping it
/// detaches the search listener.
#[wasm_bindgen]
#[derive(Debug)]
pub struct TrackerApp {
    inner: Rc<AppInner>,
    _on_input: Closure<dyn FnMut(Event)>,
}

#[wasm_bindgen]
impl TrackerApp {
    /// Attach to the page using the default element ids.
    ///
    /// `api_url` is resolved against the page location, defaulting to
    /// `/api/data` on the same origin.
    pub fn try_new(api_url: Option<String>) -> Result<TrackerApp> {
        Self::try_new_with_ids(
            api_url,
            DEFAULT_TABLE_BODY_ID.to_string(),
            DEFAULT_COUNT_ID.to_string(),
            DEFAULT_SEARCH_INPUT_ID.to_string(),
        )
    }

    pub fn try_new_with_ids(
        api_url: Option<String>,
        table_body_id: String,
        count_id: String,
        search_input_id: String,
    ) -> Result<TrackerApp> {
        let window = web_sys::window().ok_or_else(|| WasmError::new("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| WasmError::new("no document"))?;

        let base = Url::parse(&window.location().href()?)?;
        let api_url = base.join(api_url.as_deref().unwrap_or(DEFAULT_API_PATH))?;

        let dom = Dom::lookup(document, &table_body_id, &count_id, &search_input_id)?;
        let inner = Rc::new(AppInner {
            api_url,
            renderer: RefCell::new(TableRenderer::new()),
            dom,
        });

        let on_input = {
            let inner = inner.clone();
            Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
                if let Err(e) = inner.repaint() {
                    warn!(%e, "failed to filter table");
                }
            })
        };
        inner
            .dom
            .search_input
            .add_event_listener_with_callback("input", on_input.as_ref().unchecked_ref())?;

        debug!(url = %inner.api_url, "fetching vehicle data");
        spawn_local(inner.clone().load());

        Ok(TrackerApp {
            inner,
            _on_input: on_input,
        })
    }

    /// Filter the table by VIN, same as typing into the search input.
    pub fn filter(&self, query: String) -> Result<()> {
        self.inner.dom.search_input.set_value(&query);
        self.inner.repaint()
    }

    /// Whether the dataset has arrived.
    pub fn is_loaded(&self) -> bool {
        self.inner.renderer.borrow().is_loaded()
    }

    /// Number of rows currently displayed, or zero before load.
    pub fn displayed_count(&self) -> usize {
        let query = self.inner.dom.search_input.value();
        self.inner
            .renderer
            .borrow()
            .filter(&query)
            .map(|view| view.len())
            .unwrap_or(0)
    }
}
