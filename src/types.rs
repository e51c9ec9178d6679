//! Core types - virtual nodes, attribute classification, events.
//!
//! A [`VNode`] is a disposable description of what should be on screen. Views
//! build a fresh tree on every render; the renderer diffs it against the
//! previous one and patches the live [`Document`](crate::engine::Document).
//!
//! # Example
//!
//! ```ignore
//! use spark_vdom::{Element, VNode};
//!
//! let view: VNode = Element::new("ul")
//!     .attr("class", "todo-list")
//!     .child(Element::new("li").child("first"))
//!     .child(Element::new("li").child("second"))
//!     .into();
//! ```

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::engine::NodeId;

// =============================================================================
// Events
// =============================================================================

/// Handler stored in a node's handler slot table.
pub type EventHandler = Rc<dyn Fn(&Event)>;

/// The closed set of event kinds the root container delegates.
///
/// Adding a kind means adding a variant here and a flag in [`EventKinds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Keydown,
    Change,
    Input,
    Submit,
}

impl EventKind {
    /// Every supported kind, in installation order.
    pub const ALL: [EventKind; 5] = [
        EventKind::Click,
        EventKind::Keydown,
        EventKind::Change,
        EventKind::Input,
        EventKind::Submit,
    ];

    /// Event name as used in handler slot tables (`"click"`, ...).
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::Keydown => "keydown",
            EventKind::Change => "change",
            EventKind::Input => "input",
            EventKind::Submit => "submit",
        }
    }

    /// Look up a supported kind by name. Case-sensitive; slot names are
    /// already lowercased by [`AttrKind::classify`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// The flag for this kind.
    pub fn flag(self) -> EventKinds {
        match self {
            EventKind::Click => EventKinds::CLICK,
            EventKind::Keydown => EventKinds::KEYDOWN,
            EventKind::Change => EventKinds::CHANGE,
            EventKind::Input => EventKinds::INPUT,
            EventKind::Submit => EventKinds::SUBMIT,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags::bitflags! {
    /// Set of event kinds. Used to track which root listeners are installed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EventKinds: u8 {
        const CLICK = 1 << 0;
        const KEYDOWN = 1 << 1;
        const CHANGE = 1 << 2;
        const INPUT = 1 << 3;
        const SUBMIT = 1 << 4;
    }
}

/// A native event as delivered to listeners and handlers.
///
/// No normalization happens: handlers see exactly what the caller dispatched.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    /// The node the event originated at.
    pub target: NodeId,
    /// Key name for keydown events (e.g. `"Enter"`).
    pub key: Option<String>,
    /// Current value for input/change events.
    pub value: Option<String>,
}

impl Event {
    pub fn new(kind: EventKind, target: NodeId) -> Self {
        Self {
            kind,
            target,
            key: None,
            value: None,
        }
    }

    pub fn click(target: NodeId) -> Self {
        Self::new(EventKind::Click, target)
    }

    pub fn submit(target: NodeId) -> Self {
        Self::new(EventKind::Submit, target)
    }

    pub fn keydown(target: NodeId, key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::new(EventKind::Keydown, target)
        }
    }

    pub fn input(target: NodeId, value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::new(EventKind::Input, target)
        }
    }

    pub fn change(target: NodeId, value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::new(EventKind::Change, target)
        }
    }
}

// =============================================================================
// Attributes
// =============================================================================

/// Attribute names starting with this prefix are event handlers.
pub const EVENT_PREFIX: &str = "on";

/// Value of a virtual attribute.
#[derive(Clone)]
pub enum AttrValue {
    Str(String),
    Bool(bool),
    Handler(EventHandler),
}

impl AttrValue {
    /// Wrap a closure as a handler value.
    pub fn handler<F>(f: F) -> Self
    where
        F: Fn(&Event) + 'static,
    {
        AttrValue::Handler(Rc::new(f))
    }

    /// Truthiness used for boolean properties.
    pub fn is_truthy(&self) -> bool {
        match self {
            AttrValue::Str(s) => !s.is_empty(),
            AttrValue::Bool(b) => *b,
            AttrValue::Handler(_) => true,
        }
    }

    /// String form written to the display layer. Handlers have none.
    pub fn as_attribute(&self) -> Option<String> {
        match self {
            AttrValue::Str(s) => Some(s.clone()),
            AttrValue::Bool(b) => Some(b.to_string()),
            AttrValue::Handler(_) => None,
        }
    }

    pub fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            AttrValue::Handler(h) => Some(h),
            _ => None,
        }
    }
}

impl fmt::Debug for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Str(s) => f.debug_tuple("Str").field(s).finish(),
            AttrValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            AttrValue::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Str(s)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

/// Attributes that map to live boolean properties instead of string attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolProp {
    Checked,
    Disabled,
    Selected,
}

impl BoolProp {
    pub const ALL: [BoolProp; 3] = [BoolProp::Checked, BoolProp::Disabled, BoolProp::Selected];

    pub fn name(self) -> &'static str {
        match self {
            BoolProp::Checked => "checked",
            BoolProp::Disabled => "disabled",
            BoolProp::Selected => "selected",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|prop| prop.name() == name)
    }

    pub fn flag(self) -> Properties {
        match self {
            BoolProp::Checked => Properties::CHECKED,
            BoolProp::Disabled => Properties::DISABLED,
            BoolProp::Selected => Properties::SELECTED,
        }
    }
}

bitflags::bitflags! {
    /// Live boolean properties of a display element.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Properties: u8 {
        const CHECKED = 1 << 0;
        const DISABLED = 1 << 1;
        const SELECTED = 1 << 2;
    }
}

/// How an attribute key is applied to the display layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrKind {
    /// Routed to the handler slot table under the lowercased event name.
    Event(String),
    /// Set as a live boolean property.
    Property(BoolProp),
    /// Written as a string attribute.
    Plain,
}

impl AttrKind {
    /// Classify an attribute key. `"onClick"` → `Event("click")`,
    /// `"checked"` → `Property(Checked)`, anything else → `Plain`.
    pub fn classify(key: &str) -> Self {
        if let Some(rest) = key.strip_prefix(EVENT_PREFIX) {
            if !rest.is_empty() {
                return AttrKind::Event(rest.to_lowercase());
            }
        }
        match BoolProp::from_name(key) {
            Some(prop) => AttrKind::Property(prop),
            None => AttrKind::Plain,
        }
    }
}

// =============================================================================
// Virtual Nodes
// =============================================================================

/// Ordered attribute mapping of a virtual element.
pub type Attrs = IndexMap<String, AttrValue>;

/// A virtual element: tag, attributes, children.
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    pub attrs: Attrs,
    pub children: Vec<VNode>,
    /// Name under which the live node is published after each render.
    pub node_ref: Option<String>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Register a handler for `event` (stored under `on{event}`).
    pub fn on<F>(mut self, event: &str, handler: F) -> Self
    where
        F: Fn(&Event) + 'static,
    {
        self.attrs
            .insert(format!("{EVENT_PREFIX}{event}"), AttrValue::handler(handler));
        self
    }

    pub fn child(mut self, child: impl Into<VNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<VNode>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Publish the live node under `name` (see
    /// [`RenderSession::node_ref`](crate::pipeline::RenderSession::node_ref)).
    pub fn node_ref(mut self, name: impl Into<String>) -> Self {
        self.node_ref = Some(name.into());
        self
    }

    /// Children with `Empty` entries filtered out.
    pub fn rendered_children(&self) -> impl Iterator<Item = &VNode> {
        self.children.iter().filter(|child| !child.is_empty())
    }
}

/// Declarative description of display content.
#[derive(Debug, Clone, Default)]
pub enum VNode {
    /// Nothing rendered.
    #[default]
    Empty,
    Text(String),
    Element(Element),
}

impl VNode {
    pub fn text(text: impl Into<String>) -> Self {
        VNode::Text(text.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, VNode::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            VNode::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            VNode::Element(el) => Some(el),
            _ => None,
        }
    }
}

impl From<Element> for VNode {
    fn from(el: Element) -> Self {
        VNode::Element(el)
    }
}

impl From<&str> for VNode {
    fn from(s: &str) -> Self {
        VNode::Text(s.to_string())
    }
}

impl From<String> for VNode {
    fn from(s: String) -> Self {
        VNode::Text(s)
    }
}

impl<T: Into<VNode>> From<Option<T>> for VNode {
    fn from(node: Option<T>) -> Self {
        node.map_or(VNode::Empty, Into::into)
    }
}

macro_rules! text_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for VNode {
                fn from(n: $t) -> Self {
                    VNode::Text(n.to_string())
                }
            }
        )*
    };
}

text_from_number!(i32, i64, u32, u64, usize);

// Non-finite values use the `Infinity`/`NaN` spelling
macro_rules! text_from_float {
    ($($t:ty),*) => {
        $(
            impl From<$t> for VNode {
                fn from(n: $t) -> Self {
                    let text = if n.is_nan() {
                        "NaN".to_string()
                    } else if n == <$t>::INFINITY {
                        "Infinity".to_string()
                    } else if n == <$t>::NEG_INFINITY {
                        "-Infinity".to_string()
                    } else {
                        n.to_string()
                    };
                    VNode::Text(text)
                }
            }
        )*
    };
}

text_from_float!(f32, f64);

// =============================================================================
// TESTS
// =============================================================================
