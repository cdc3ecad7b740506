//! Scripted in-memory document implementing [`BrowserDriver`].
//!
//! Elements are registered against the locators that should find them, and may carry
//! click/key effects that mutate the document (hide a modal, change the URL, reveal
//! results). Every interaction is logged so tests can assert on what the engine did.

use crate::commands::{Key, Locator};
use crate::driver::{BrowserDriver, ElementRef, ElementState, FrameScope};
use crate::error::{AdapterError, AdapterErrorKind};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

/// Document mutation applied when an element is clicked or receives a key.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    Hide(ElementId),
    Show(ElementId),
    Remove(ElementId),
    SetUrl(String),
    SetCss(ElementId, String, String),
    SetText(ElementId, String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Interaction {
    Navigate(String),
    Click(ElementId),
    ScriptClick(ElementId),
    Clear(ElementId),
    SendKeys(ElementId, String),
    PressKey(ElementId, Key),
    Select(ElementId, String),
    ScrollIntoView(ElementId),
    SwitchToFrame(usize),
    SwitchToDefault,
    Script(String),
    Screenshot,
}

/// Element blueprint; consumed by [`FakeDriver::add`].
#[derive(Clone, Debug)]
pub struct FakeElement {
    locators: HashSet<Locator>,
    text: String,
    value: Option<String>,
    attributes: HashMap<String, String>,
    css: HashMap<String, String>,
    displayed: bool,
    enabled: bool,
    interactable: bool,
    in_viewport: bool,
    options: Option<Vec<String>>,
    parent: Option<ElementId>,
    appears_after_polls: u32,
}

impl Default for FakeElement {
    fn default() -> Self {
        Self {
            locators: HashSet::new(),
            text: String::new(),
            value: None,
            attributes: HashMap::new(),
            css: HashMap::new(),
            displayed: true,
            enabled: true,
            interactable: true,
            in_viewport: true,
            options: None,
            parent: None,
            appears_after_polls: 0,
        }
    }
}

impl FakeElement {
    pub fn matching(locator: &Locator) -> Self {
        Self::default().also_matching(locator)
    }

    pub fn also_matching(mut self, locator: &Locator) -> Self {
        self.locators.insert(locator.clone());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn css(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.css.insert(property.into(), value.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Displayed, but pointer clicks are intercepted by an overlay.
    pub fn obscured(mut self) -> Self {
        self.interactable = false;
        self
    }

    pub fn below_fold(mut self) -> Self {
        self.in_viewport = false;
        self
    }

    /// Native `<select>` with the given option labels.
    pub fn select(mut self, options: &[&str]) -> Self {
        self.options = Some(options.iter().map(|o| o.to_string()).collect());
        self
    }

    pub fn child_of(mut self, parent: ElementId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Element joins the document only after `polls` queries have looked for it.
    pub fn appears_after_polls(mut self, polls: u32) -> Self {
        self.appears_after_polls = polls;
        self
    }
}

#[derive(Debug)]
struct Node {
    spec: FakeElement,
    document: usize,
    attached: bool,
    polls_seen: u32,
    on_click: Vec<Effect>,
    on_key: Vec<(Key, Effect)>,
}

impl Node {
    fn in_tree(&self) -> bool {
        self.attached && self.polls_seen >= self.spec.appears_after_polls
    }
}

#[derive(Debug)]
struct FakeState {
    url: String,
    ready_state: String,
    frames: usize,
    failing_frames: HashSet<usize>,
    scope: FrameScope,
    nodes: Vec<Node>,
    interactions: Vec<Interaction>,
}

impl FakeState {
    fn document_index(scope: FrameScope) -> usize {
        match scope {
            FrameScope::TopLevel => 0,
            FrameScope::Frame(index) => index + 1,
        }
    }

    fn node(&self, element: &ElementRef) -> Result<(ElementId, &Node), AdapterError> {
        let id = parse_handle(&element.handle)?;
        let node = self
            .nodes
            .get(id.0)
            .filter(|node| node.in_tree())
            .ok_or_else(|| {
                AdapterError::new(AdapterErrorKind::StaleElement)
                    .with_hint(format!("{element} is no longer attached"))
            })?;
        Ok((id, node))
    }

    fn node_mut(&mut self, element: &ElementRef) -> Result<(ElementId, &mut Node), AdapterError> {
        let (id, _) = self.node(element)?;
        Ok((id, &mut self.nodes[id.0]))
    }

    fn apply(&mut self, effect: &Effect) {
        match effect {
            Effect::Hide(id) => self.nodes[id.0].spec.displayed = false,
            Effect::Show(id) => {
                let node = &mut self.nodes[id.0];
                node.spec.displayed = true;
                node.attached = true;
                node.polls_seen = node.polls_seen.max(node.spec.appears_after_polls);
            }
            Effect::Remove(id) => self.nodes[id.0].attached = false,
            Effect::SetUrl(url) => self.url = url.clone(),
            Effect::SetCss(id, property, value) => {
                self.nodes[id.0]
                    .spec
                    .css
                    .insert(property.clone(), value.clone());
            }
            Effect::SetText(id, text) => self.nodes[id.0].spec.text = text.clone(),
        }
    }

    fn fire_click(&mut self, id: ElementId) {
        let effects = self.nodes[id.0].on_click.clone();
        for effect in &effects {
            self.apply(effect);
        }
    }
}

fn handle_for(id: ElementId) -> String {
    format!("fake-{}", id.0)
}

fn parse_handle(handle: &str) -> Result<ElementId, AdapterError> {
    handle
        .strip_prefix("fake-")
        .and_then(|raw| raw.parse::<usize>().ok())
        .map(ElementId)
        .ok_or_else(|| {
            AdapterError::new(AdapterErrorKind::StaleElement)
                .with_hint(format!("unknown handle {handle}"))
        })
}

/// Scripted document backend.
#[derive(Debug)]
pub struct FakeDriver {
    state: Mutex<FakeState>,
}

impl FakeDriver {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(FakeState {
                url: url.into(),
                ready_state: "complete".to_string(),
                frames: 0,
                failing_frames: HashSet::new(),
                scope: FrameScope::TopLevel,
                nodes: Vec::new(),
                interactions: Vec::new(),
            }),
        }
    }

    /// Adds an element to the top-level document.
    pub fn add(&self, element: FakeElement) -> ElementId {
        self.insert(element, 0)
    }

    /// Adds an embedded document and returns its frame index.
    pub fn add_frame(&self) -> usize {
        let mut state = self.state.lock();
        state.frames += 1;
        state.frames - 1
    }

    pub fn add_in_frame(&self, frame: usize, element: FakeElement) -> ElementId {
        self.insert(element, frame + 1)
    }

    /// Every query inside `frame` fails with a transport error.
    pub fn fail_frame(&self, frame: usize) {
        self.state.lock().failing_frames.insert(frame);
    }

    fn insert(&self, element: FakeElement, document: usize) -> ElementId {
        let mut state = self.state.lock();
        state.nodes.push(Node {
            spec: element,
            document,
            attached: true,
            polls_seen: 0,
            on_click: Vec::new(),
            on_key: Vec::new(),
        });
        ElementId(state.nodes.len() - 1)
    }

    pub fn on_click(&self, id: ElementId, effect: Effect) {
        self.state.lock().nodes[id.0].on_click.push(effect);
    }

    pub fn on_key(&self, id: ElementId, key: Key, effect: Effect) {
        self.state.lock().nodes[id.0].on_key.push((key, effect));
    }

    pub fn set_ready_state(&self, ready_state: impl Into<String>) {
        self.state.lock().ready_state = ready_state.into();
    }

    pub fn apply(&self, effect: Effect) {
        self.state.lock().apply(&effect);
    }

    pub fn interactions(&self) -> Vec<Interaction> {
        self.state.lock().interactions.clone()
    }

    pub fn count(&self, predicate: impl Fn(&Interaction) -> bool) -> usize {
        self.state
            .lock()
            .interactions
            .iter()
            .filter(|i| predicate(*i))
            .count()
    }

    pub fn value_of(&self, id: ElementId) -> Option<String> {
        self.state.lock().nodes[id.0].spec.value.clone()
    }

    pub fn is_displayed(&self, id: ElementId) -> bool {
        let state = self.state.lock();
        let node = &state.nodes[id.0];
        node.in_tree() && node.spec.displayed
    }

    pub fn url(&self) -> String {
        self.state.lock().url.clone()
    }

    fn record(&self, interaction: Interaction) {
        self.state.lock().interactions.push(interaction);
    }
}

#[async_trait]
impl BrowserDriver for FakeDriver {
    async fn navigate(&self, url: &str, _deadline: Duration) -> Result<(), AdapterError> {
        let mut state = self.state.lock();
        state.url = url.to_string();
        state.scope = FrameScope::TopLevel;
        state.interactions.push(Interaction::Navigate(url.to_string()));
        Ok(())
    }

    async fn current_url(&self) -> Result<String, AdapterError> {
        Ok(self.url())
    }

    async fn ready_state(&self) -> Result<String, AdapterError> {
        Ok(self.state.lock().ready_state.clone())
    }

    async fn query(&self, locator: &Locator) -> Result<Vec<ElementRef>, AdapterError> {
        let mut state = self.state.lock();
        let scope = state.scope;
        if let FrameScope::Frame(index) = scope {
            if state.failing_frames.contains(&index) {
                return Err(AdapterError::new(AdapterErrorKind::CdpIo)
                    .with_hint(format!("frame {index} stopped responding")));
            }
        }
        let document = FakeState::document_index(scope);
        let mut found = Vec::new();
        for (index, node) in state.nodes.iter_mut().enumerate() {
            if node.document != document || !node.attached || !node.spec.locators.contains(locator)
            {
                continue;
            }
            node.polls_seen = node.polls_seen.saturating_add(1);
            if node.in_tree() {
                found.push(ElementRef::new(handle_for(ElementId(index)), scope));
            }
        }
        Ok(found)
    }

    async fn element_state(&self, element: &ElementRef) -> Result<ElementState, AdapterError> {
        let state = self.state.lock();
        let (_, node) = state.node(element)?;
        Ok(ElementState {
            displayed: node.spec.displayed,
            enabled: node.spec.enabled,
        })
    }

    async fn click(&self, element: &ElementRef) -> Result<(), AdapterError> {
        let mut state = self.state.lock();
        let (id, node) = state.node(element)?;
        if !node.spec.displayed || !node.spec.interactable {
            return Err(AdapterError::new(AdapterErrorKind::NotInteractable)
                .with_hint(format!("click on {element} intercepted")));
        }
        state.interactions.push(Interaction::Click(id));
        state.fire_click(id);
        Ok(())
    }

    async fn script_click(&self, element: &ElementRef) -> Result<(), AdapterError> {
        let mut state = self.state.lock();
        let (id, _) = state.node(element)?;
        state.interactions.push(Interaction::ScriptClick(id));
        state.fire_click(id);
        Ok(())
    }

    async fn clear(&self, element: &ElementRef) -> Result<(), AdapterError> {
        let mut state = self.state.lock();
        let (id, node) = state.node_mut(element)?;
        node.spec.value = Some(String::new());
        state.interactions.push(Interaction::Clear(id));
        Ok(())
    }

    async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<(), AdapterError> {
        let mut state = self.state.lock();
        let (id, node) = state.node_mut(element)?;
        node.spec
            .value
            .get_or_insert_with(String::new)
            .push_str(text);
        state
            .interactions
            .push(Interaction::SendKeys(id, text.to_string()));
        Ok(())
    }

    async fn press_key(&self, element: &ElementRef, key: Key) -> Result<(), AdapterError> {
        let mut state = self.state.lock();
        let (id, node) = state.node(element)?;
        let effects: Vec<Effect> = node
            .on_key
            .iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, effect)| effect.clone())
            .collect();
        state.interactions.push(Interaction::PressKey(id, key));
        for effect in &effects {
            state.apply(effect);
        }
        Ok(())
    }

    async fn select_by_visible_text(
        &self,
        element: &ElementRef,
        text: &str,
    ) -> Result<(), AdapterError> {
        let mut state = self.state.lock();
        let (id, node) = state.node_mut(element)?;
        let options = node.spec.options.as_ref().ok_or_else(|| {
            AdapterError::new(AdapterErrorKind::NotSelectable)
                .with_hint(format!("{element} is not a native select"))
        })?;
        if !options.iter().any(|option| option.trim() == text.trim()) {
            return Err(AdapterError::new(AdapterErrorKind::OptionNotFound)
                .with_hint(format!("no option labelled '{text}'")));
        }
        node.spec.value = Some(text.trim().to_string());
        state
            .interactions
            .push(Interaction::Select(id, text.to_string()));
        Ok(())
    }

    async fn text(&self, element: &ElementRef) -> Result<String, AdapterError> {
        let state = self.state.lock();
        let (_, node) = state.node(element)?;
        Ok(node.spec.text.trim().to_string())
    }

    async fn attribute(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, AdapterError> {
        let state = self.state.lock();
        let (_, node) = state.node(element)?;
        if name == "value" {
            if let Some(value) = &node.spec.value {
                return Ok(Some(value.clone()));
            }
        }
        Ok(node.spec.attributes.get(name).cloned())
    }

    async fn css_value(
        &self,
        element: &ElementRef,
        property: &str,
    ) -> Result<Option<String>, AdapterError> {
        let state = self.state.lock();
        let (_, node) = state.node(element)?;
        Ok(node.spec.css.get(property).cloned())
    }

    async fn parent(&self, element: &ElementRef) -> Result<Option<ElementRef>, AdapterError> {
        let state = self.state.lock();
        let (_, node) = state.node(element)?;
        Ok(node
            .spec
            .parent
            .map(|parent| ElementRef::new(handle_for(parent), element.scope)))
    }

    async fn scroll_into_view(&self, element: &ElementRef) -> Result<(), AdapterError> {
        let mut state = self.state.lock();
        let (id, node) = state.node_mut(element)?;
        node.spec.in_viewport = true;
        state.interactions.push(Interaction::ScrollIntoView(id));
        Ok(())
    }

    async fn in_viewport(&self, element: &ElementRef) -> Result<bool, AdapterError> {
        let state = self.state.lock();
        let (_, node) = state.node(element)?;
        Ok(node.spec.in_viewport)
    }

    async fn execute_script(&self, script: &str) -> Result<Value, AdapterError> {
        self.record(Interaction::Script(script.to_string()));
        Ok(Value::Null)
    }

    async fn frame_count(&self) -> Result<usize, AdapterError> {
        Ok(self.state.lock().frames)
    }

    async fn switch_to_frame(&self, index: usize) -> Result<(), AdapterError> {
        let mut state = self.state.lock();
        if index >= state.frames {
            return Err(AdapterError::new(AdapterErrorKind::NoSuchFrame)
                .with_hint(format!("frame index {index} out of range")));
        }
        state.scope = FrameScope::Frame(index);
        state.interactions.push(Interaction::SwitchToFrame(index));
        Ok(())
    }

    async fn switch_to_default(&self) -> Result<(), AdapterError> {
        let mut state = self.state.lock();
        state.scope = FrameScope::TopLevel;
        state.interactions.push(Interaction::SwitchToDefault);
        Ok(())
    }

    fn current_scope(&self) -> FrameScope {
        self.state.lock().scope
    }

    async fn screenshot(&self) -> Result<Vec<u8>, AdapterError> {
        self.record(Interaction::Screenshot);
        Ok(PNG_SIGNATURE.to_vec())
    }
}
