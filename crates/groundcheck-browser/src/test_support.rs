//! Scripted session and DOM fixtures for unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::dom::{DomNode, DomSnapshot, NodeRef, Rect, SelectOption, Viewport};
use crate::error::SessionError;
use crate::session::{Session, SessionProvider};
use crate::settings::{AutomationSettings, Timings, UiVocabulary};

pub const TARGET_URL: &str = "https://matchapro.test";
pub const LISTING_URL: &str = "https://matchapro.test/dirgc";

/// Settings pointed at [`TARGET_URL`] with no settle delays.
pub fn test_settings() -> AutomationSettings {
    AutomationSettings {
        target_url: TARGET_URL.to_string(),
        listing_path: "/dirgc".to_string(),
        login_timeout_ticks: 5,
        timings: Timings::immediate(),
        vocabulary: UiVocabulary::default(),
    }
}

/// Builds a [`DomSnapshot`] tree.
///
/// Nodes must be added in document order (parents before children, earlier
/// siblings first). Each node's `text` is set as its own text; `build`
/// composes `textContent` from the subtree the way the page script reports
/// it.
pub struct Fixture {
    url: String,
    viewport: Viewport,
    nodes: Vec<DomNode>,
}

impl Fixture {
    pub const HTML: NodeRef = NodeRef(0);
    pub const BODY: NodeRef = NodeRef(1);

    pub fn new(url: &str) -> Self {
        let page_rect = Rect {
            x: 0.0,
            y: 0.0,
            width: 1280.0,
            height: 800.0,
        };
        let html = DomNode {
            tag: "html".into(),
            rect: page_rect,
            ..DomNode::default()
        };
        let body = DomNode {
            parent: Some(0),
            tag: "body".into(),
            rect: page_rect,
            ..DomNode::default()
        };
        Self {
            url: url.to_string(),
            viewport: Viewport {
                width: 1280.0,
                height: 800.0,
            },
            nodes: vec![html, body],
        }
    }

    pub fn add(&mut self, parent: NodeRef, tag: &str, f: impl FnOnce(&mut DomNode)) -> NodeRef {
        let mut node = DomNode {
            parent: Some(parent.0),
            tag: tag.to_string(),
            ..DomNode::default()
        };
        f(&mut node);
        self.nodes.push(node);
        NodeRef(self.nodes.len() - 1)
    }

    pub fn build(mut self) -> DomSnapshot {
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        for (index, node) in self.nodes.iter().enumerate() {
            if let Some(parent) = node.parent {
                children[parent].push(index);
            }
        }

        let mut full: Vec<String> = vec![String::new(); self.nodes.len()];
        for index in (0..self.nodes.len()).rev() {
            let mut parts = vec![self.nodes[index].text.clone()];
            parts.extend(children[index].iter().map(|c| full[*c].clone()));
            full[index] = parts
                .into_iter()
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
                .trim()
                .to_string();
        }

        for (node, text) in self.nodes.iter_mut().zip(full) {
            node.text_len = text.chars().count();
            node.text = text.chars().take(1024).collect();
        }

        DomSnapshot {
            url: self.url,
            viewport: self.viewport,
            nodes: self.nodes,
        }
    }
}

/// Gives a node a layout box and marks it rendered.
pub fn place(node: &mut DomNode, x: f64, y: f64, width: f64, height: f64) {
    node.rect = Rect {
        x,
        y,
        width,
        height,
    };
    node.rendered = true;
}

pub fn option(text: &str, value: &str) -> SelectOption {
    SelectOption {
        text: text.to_string(),
        value: value.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Navigate(String),
    Snapshot,
    Click(NodeRef),
    ClickAt(f64, f64),
    Fill(NodeRef, String),
    Select(NodeRef, String),
    Screenshot,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Navigate,
    Snapshot,
    Click,
    ClickAt,
    Fill,
    Select,
    Screenshot,
}

const START_PAGE: &str = "start";

#[derive(Default)]
struct FakeState {
    url: String,
    current: String,
    pages: HashMap<String, DomSnapshot>,
    routes: HashMap<String, String>,
    clicks: HashMap<(String, NodeRef), String>,
    point_clicks: HashMap<String, String>,
    queued: VecDeque<Option<DomSnapshot>>,
    failing: HashSet<ActionKind>,
    actions: Vec<Action>,
}

/// In-memory [`Session`] over named fixture pages.
///
/// Navigation switches to the page routed for that URL; clicks switch pages
/// along registered transitions. Every call is logged for assertions.
/// Clones share the page state and the action log.
#[derive(Clone)]
pub struct FakeSession {
    state: Arc<Mutex<FakeState>>,
}

impl FakeSession {
    /// Starts on `page`, at the page's own URL.
    pub fn new(page: DomSnapshot) -> Self {
        let mut state = FakeState {
            url: page.url.clone(),
            current: START_PAGE.to_string(),
            ..FakeState::default()
        };
        state.pages.insert(START_PAGE.to_string(), page);
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn with_page(self, name: &str, page: DomSnapshot) -> Self {
        self.lock().pages.insert(name.to_string(), page);
        self
    }

    /// Navigating to `url` shows `page`.
    pub fn route(self, url: &str, page: &str) -> Self {
        self.lock()
            .routes
            .insert(url.to_string(), page.to_string());
        self
    }

    /// Clicking `node` while on `from` shows `to`.
    pub fn on_click(self, from: &str, node: NodeRef, to: &str) -> Self {
        self.lock()
            .clicks
            .insert((from.to_string(), node), to.to_string());
        self
    }

    /// A raw pointer click while on `from` shows `to`.
    pub fn on_point_click(self, from: &str, to: &str) -> Self {
        self.lock()
            .point_clicks
            .insert(from.to_string(), to.to_string());
        self
    }

    /// Every call of `kind` fails with a script error.
    pub fn failing(self, kind: ActionKind) -> Self {
        self.lock().failing.insert(kind);
        self
    }

    /// Snapshots served before falling back to the current page. `None`
    /// makes that snapshot call fail.
    pub fn queue_snapshots(self, snapshots: Vec<Option<DomSnapshot>>) -> Self {
        self.lock().queued.extend(snapshots);
        self
    }

    pub fn actions(&self) -> Vec<Action> {
        self.lock().actions.clone()
    }

    pub fn count(&self, predicate: impl Fn(&Action) -> bool) -> usize {
        self.lock().actions.iter().filter(|a| predicate(a)).count()
    }

    pub fn current_page(&self) -> String {
        self.lock().current.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake session lock")
    }

    fn begin(
        &self,
        action: Action,
        kind: ActionKind,
    ) -> Result<std::sync::MutexGuard<'_, FakeState>, SessionError> {
        let mut state = self.lock();
        state.actions.push(action);
        if state.failing.contains(&kind) {
            return Err(SessionError::Script(format!("injected {kind:?} fault")));
        }
        Ok(state)
    }
}

#[async_trait]
impl Session for FakeSession {
    async fn current_url(&self) -> Result<String, SessionError> {
        Ok(self.lock().url.clone())
    }

    async fn navigate(&self, url: &str, _timeout: Duration) -> Result<(), SessionError> {
        let mut state = self.begin(Action::Navigate(url.to_string()), ActionKind::Navigate)?;
        state.url = url.to_string();
        if let Some(page) = state.routes.get(url).cloned() {
            state.current = page;
        }
        Ok(())
    }

    async fn snapshot(&self) -> Result<DomSnapshot, SessionError> {
        let mut state = self.begin(Action::Snapshot, ActionKind::Snapshot)?;
        if let Some(queued) = state.queued.pop_front() {
            return queued.ok_or_else(|| SessionError::Script("queued snapshot failure".into()));
        }
        let mut page = state
            .pages
            .get(&state.current)
            .cloned()
            .unwrap_or_default();
        page.url.clone_from(&state.url);
        Ok(page)
    }

    async fn click(&self, node: NodeRef) -> Result<(), SessionError> {
        let mut state = self.begin(Action::Click(node), ActionKind::Click)?;
        let key = (state.current.clone(), node);
        if let Some(next) = state.clicks.get(&key).cloned() {
            state.current = next;
        }
        Ok(())
    }

    async fn click_at(&self, x: f64, y: f64) -> Result<(), SessionError> {
        let mut state = self.begin(Action::ClickAt(x, y), ActionKind::ClickAt)?;
        if let Some(next) = state.point_clicks.get(&state.current).cloned() {
            state.current = next;
        }
        Ok(())
    }

    async fn fill(&self, node: NodeRef, value: &str) -> Result<(), SessionError> {
        let mut state = self.begin(Action::Fill(node, value.to_string()), ActionKind::Fill)?;
        let current = state.current.clone();
        if let Some(el) = state
            .pages
            .get_mut(&current)
            .and_then(|p| p.nodes.get_mut(node.0))
        {
            el.value = value.to_string();
        }
        Ok(())
    }

    async fn select(&self, node: NodeRef, option_value: &str) -> Result<(), SessionError> {
        let mut state =
            self.begin(Action::Select(node, option_value.to_string()), ActionKind::Select)?;
        let current = state.current.clone();
        if let Some(el) = state
            .pages
            .get_mut(&current)
            .and_then(|p| p.nodes.get_mut(node.0))
        {
            el.value = option_value.to_string();
        }
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, SessionError> {
        self.begin(Action::Screenshot, ActionKind::Screenshot)?;
        Ok(b"\x89PNG\r\n\x1a\n".to_vec())
    }

    async fn close(&self) -> Result<(), SessionError> {
        self.lock().actions.push(Action::Close);
        Ok(())
    }
}

/// Hands out one prepared [`FakeSession`], or fails to attach.
pub struct FakeProvider {
    session: Mutex<Option<FakeSession>>,
}

impl FakeProvider {
    /// The caller keeps a clone to inspect the session after the run.
    pub fn with(session: FakeSession) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            session: Mutex::new(None),
        }
    }
}

#[async_trait]
impl SessionProvider for FakeProvider {
    type Session = FakeSession;

    async fn acquire(&self) -> Result<FakeSession, SessionError> {
        self.session
            .lock()
            .expect("fake provider lock")
            .take()
            .ok_or_else(|| SessionError::Connect {
                endpoint: "http://127.0.0.1:9222".to_string(),
                reason: "connection refused".to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Target app pages
// ---------------------------------------------------------------------------

/// Node handles into the pages built by [`listing_session`].
#[derive(Debug, Clone, Copy)]
pub struct FlowRefs {
    pub menu: NodeRef,
    pub filter_toggle: NodeRef,
    pub id_input: NodeRef,
    pub result_card: NodeRef,
    pub latitude: NodeRef,
    pub longitude: NodeRef,
    pub dropdown: NodeRef,
    pub submit: NodeRef,
}

fn dashboard() -> DomSnapshot {
    let mut fx = Fixture::new(TARGET_URL);
    fx.add(Fixture::BODY, "nav", |n| n.class_name = "sidebar".into());
    fx.add(Fixture::BODY, "div", |n| n.class_name = "user-avatar".into());
    fx.build()
}

fn listing_page() -> (DomSnapshot, NodeRef) {
    let mut fx = Fixture::new(LISTING_URL);
    let nav = fx.add(Fixture::BODY, "nav", |n| {
        n.class_name = "sidebar".into();
        place(n, 0.0, 0.0, 240.0, 800.0);
    });
    let menu = fx.add(nav, "a", |n| {
        n.text = "Ground Check Direktori".into();
        n.href = "#dirgc".into();
        place(n, 10.0, 120.0, 220.0, 30.0);
    });
    (fx.build(), menu)
}

fn search_page(record_id: &str) -> (DomSnapshot, NodeRef, NodeRef, NodeRef) {
    let mut fx = Fixture::new(LISTING_URL);
    let toggle = fx.add(Fixture::BODY, "button", |n| {
        n.text = "Filter".into();
        place(n, 260.0, 20.0, 80.0, 30.0);
    });
    let panel = fx.add(Fixture::BODY, "div", |n| {
        n.class_name = "filter-panel".into();
        place(n, 260.0, 60.0, 600.0, 60.0);
    });
    let input = fx.add(panel, "input", |n| {
        n.input_type = Some("text".into());
        n.placeholder = "IDSBR".into();
        place(n, 270.0, 70.0, 200.0, 30.0);
    });
    let card = fx.add(Fixture::BODY, "div", |n| {
        n.class_name = "card usaha-card".into();
        place(n, 260.0, 200.0, 600.0, 90.0);
    });
    fx.add(card, "h6", |n| n.text = "Toko Sumber Rejeki".into());
    fx.add(card, "small", |n| n.text = format!("IDSBR {record_id}"));
    (fx.build(), toggle, input, card)
}

fn form_page(latitude: &str, longitude: &str) -> (DomSnapshot, [NodeRef; 4]) {
    let mut fx = Fixture::new(LISTING_URL);
    let form = fx.add(Fixture::BODY, "form", |n| place(n, 260.0, 100.0, 600.0, 500.0));
    let lat = fx.add(form, "input", |n| {
        n.input_type = Some("text".into());
        n.name = "latitude".into();
        n.value = latitude.to_string();
    });
    let lon = fx.add(form, "input", |n| {
        n.input_type = Some("text".into());
        n.name = "longitude".into();
        n.value = longitude.to_string();
    });
    let select = fx.add(form, "select", |n| {
        n.name = "keberadaan_usaha".into();
        n.options = vec![
            option("-- Pilih --", ""),
            option("Ditemukan", "1"),
            option("Tutup", "4"),
            option("Ganda", "9"),
        ];
    });
    let submit = fx.add(form, "button", |n| {
        n.text = "TANDAI SUDAH DICEK".into();
        place(n, 700.0, 560.0, 140.0, 32.0);
    });
    (fx.build(), [lat, lon, select, submit])
}

/// A session on the dashboard that walks listing → search → form → saved
/// along the expected clicks.
pub fn listing_session(record_id: &str, latitude: &str, longitude: &str) -> (FakeSession, FlowRefs) {
    let (listing, menu) = listing_page();
    let (search, filter_toggle, id_input, result_card) = search_page(record_id);
    let (form, [lat, lon, dropdown, submit]) = form_page(latitude, longitude);

    let session = FakeSession::new(dashboard())
        .with_page("listing", listing)
        .with_page("search", search)
        .with_page("form", form)
        .with_page("saved", dashboard())
        .route(LISTING_URL, "listing")
        .on_click("listing", menu, "search")
        .on_click("search", result_card, "form")
        .on_click("form", submit, "saved");

    let refs = FlowRefs {
        menu,
        filter_toggle,
        id_input,
        result_card,
        latitude: lat,
        longitude: lon,
        dropdown,
        submit,
    };
    (session, refs)
}
